//! Error types for CLI operations.

use contracts::LogError;
use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Argument accepted by clap but meaningless for the command
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// Logger setup failed
    #[error(transparent)]
    Logger(#[from] LogError),
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}
