//! Layered error definitions
//!
//! Categorized by source: config / sink / general

use std::path::PathBuf;

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum LogError {
    // ===== Configuration Errors =====
    /// Level label outside the label table
    #[error("unknown level label '{label}'")]
    UnknownLevel { label: String },

    /// Format pattern could not be parsed
    #[error("invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    /// No sink named "default" was configured
    #[error("no sink named 'default' is configured")]
    MissingDefaultSink,

    /// Operation not allowed on the default sink
    #[error("sink '{name}' is reserved and cannot be removed")]
    ReservedSink { name: String },

    /// Sink name not present in the registry
    #[error("sink '{name}' is not registered")]
    UnknownSink { name: String },

    // ===== Sink Errors =====
    /// Backing file could not be opened or created
    #[error("cannot open log file '{}': {source}", path.display())]
    SinkOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Sink write error
    #[error("sink '{sink_name}' write error: {message}")]
    SinkWrite { sink_name: String, message: String },

    /// Sink was closed and no longer accepts lines
    #[error("sink '{sink_name}' is closed")]
    SinkClosed { sink_name: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl LogError {
    /// Create unknown level error
    pub fn unknown_level(label: impl Into<String>) -> Self {
        Self::UnknownLevel {
            label: label.into(),
        }
    }

    /// Create invalid pattern error
    pub fn invalid_pattern(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            message: message.into(),
        }
    }

    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create sink open error
    pub fn sink_open(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::SinkOpen {
            path: path.into(),
            source,
        }
    }

    /// Create sink write error
    pub fn sink_write(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkWrite {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }

    /// Create sink closed error
    pub fn sink_closed(sink_name: impl Into<String>) -> Self {
        Self::SinkClosed {
            sink_name: sink_name.into(),
        }
    }

    /// Whether the error belongs to the setup-time configuration category
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::UnknownLevel { .. }
                | Self::InvalidPattern { .. }
                | Self::ConfigParse { .. }
                | Self::ConfigValidation { .. }
                | Self::MissingDefaultSink
                | Self::ReservedSink { .. }
                | Self::UnknownSink { .. }
                | Self::SinkOpen { .. }
        )
    }
}
