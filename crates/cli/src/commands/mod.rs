//! Command implementations.

mod emit;
mod levels;
mod stress;
mod validate;

pub use emit::run_emit;
pub use levels::run_levels;
pub use stress::run_stress;
pub use validate::run_validate;

use std::path::Path;

use anyhow::{Context, Result};
use config_loader::ConfigLoader;
use contracts::Level;
use dispatcher::Logger;
use tracing::debug;

use crate::error::CliError;

/// Logger from an optional configuration file, with an optional threshold override
fn build_logger(config: Option<&Path>, threshold: Option<Level>) -> Result<Logger> {
    let logger = match config {
        Some(path) => {
            if !path.exists() {
                return Err(CliError::config_not_found(path.display().to_string()).into());
            }
            let config = ConfigLoader::load_from_path(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?;
            Logger::from_config(&config).map_err(CliError::from)?
        }
        None => Logger::new(),
    };

    if let Some(level) = threshold {
        debug!(threshold = %level, "Threshold overridden");
        logger.set_threshold(level);
    }
    Ok(logger)
}
