//! SinkHandle - name-based access to one sink

use std::fmt;

use contracts::{Level, LogError, SourceLocation};

use crate::logger::Logger;
use crate::metrics::MetricsSnapshot;

/// Handle addressing a sink by name.
///
/// It never holds the sink itself: every call goes through the logger, so a handle
/// stays valid across re-registration and resolves to `"default"` once the sink is
/// unregistered. Its `log`/`replay`/`critical` mirror [`Logger`], so the logging
/// macros accept a handle in place of a logger.
#[derive(Clone)]
pub struct SinkHandle {
    name: String,
    logger: Logger,
}

impl SinkHandle {
    pub(crate) fn new(name: &str, logger: Logger) -> Self {
        Self {
            name: name.to_string(),
            logger,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub fn log(&self, level: Level, message: impl fmt::Display, location: &SourceLocation) {
        self.logger.log_to(&self.name, level, message, location);
    }

    pub fn replay(&self, message: impl fmt::Display, location: &SourceLocation) {
        self.logger.replay_to(&self.name, message, location);
    }

    pub fn critical(&self, message: impl fmt::Display, location: &SourceLocation) -> ! {
        self.logger.critical_to(&self.name, message, location)
    }

    /// False once the sink has been unregistered (or before it is registered)
    pub fn is_registered(&self) -> bool {
        self.logger.is_registered(&self.name)
    }

    /// Threshold applied to calls through this handle
    pub fn threshold(&self) -> Level {
        self.logger.threshold(&self.name)
    }

    pub fn set_threshold(&self, level: Level) {
        self.logger.set_scope_threshold(&self.name, level);
    }

    /// # Errors
    /// See [`Logger::set_sink_pattern`].
    pub fn set_pattern(&self, pattern: &str) -> Result<(), LogError> {
        self.logger.set_sink_pattern(&self.name, pattern)
    }

    pub fn metrics(&self) -> Option<MetricsSnapshot> {
        self.logger.sink_metrics(&self.name)
    }
}

impl fmt::Debug for SinkHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SinkHandle").field("name", &self.name).finish()
    }
}
