//! Process-wide logger

use std::sync::OnceLock;

use crate::logger::Logger;

static GLOBAL: OnceLock<Logger> = OnceLock::new();

/// The process-wide logger, created with a stdout default sink on first use
pub fn global() -> &'static Logger {
    GLOBAL.get_or_init(Logger::new)
}

/// Install `logger` as the process-wide instance.
///
/// # Errors
/// Hands the logger back when one is already in place.
pub fn install(logger: Logger) -> Result<(), Logger> {
    GLOBAL.set(logger)
}

/// Flush and close the process-wide logger's sinks, if it was ever created
pub fn shutdown() {
    if let Some(logger) = GLOBAL.get() {
        logger.shutdown();
    }
}
