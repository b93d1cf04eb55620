//! Severity levels and the authoritative label table.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::LogError;

/// Message severity, totally ordered from `Trace` to `Off`.
///
/// `Off` is only meaningful as a threshold: it suppresses every message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum Level {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
    Critical = 5,
    Off = 6,
}

/// Label of the replay pseudo-level. It is never a threshold.
pub const REPLAY_LABEL: &str = "replay";

/// The single level → label table, in severity order.
///
/// Index `i` holds the level whose discriminant is `i`.
pub const LEVEL_LABELS: [(Level, &str); 7] = [
    (Level::Trace, "trace"),
    (Level::Debug, "debug"),
    (Level::Info, "info"),
    (Level::Warn, "warning"),
    (Level::Error, "error"),
    (Level::Critical, "critical"),
    (Level::Off, "off"),
];

impl Level {
    /// Label as printed in log lines
    pub const fn label(self) -> &'static str {
        LEVEL_LABELS[self as usize].1
    }

    /// Exact inverse of [`Level::label`].
    ///
    /// # Errors
    /// [`LogError::UnknownLevel`] for anything outside the label table,
    /// including `"replay"`.
    pub fn from_label(label: &str) -> Result<Self, LogError> {
        LEVEL_LABELS
            .iter()
            .find(|(_, l)| *l == label)
            .map(|(level, _)| *level)
            .ok_or_else(|| LogError::unknown_level(label))
    }

    /// All levels in ascending severity
    pub fn all() -> impl Iterator<Item = Level> {
        LEVEL_LABELS.iter().map(|(level, _)| *level)
    }

    /// All labels in ascending severity
    pub fn labels() -> impl Iterator<Item = &'static str> {
        LEVEL_LABELS.iter().map(|(_, label)| *label)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Level {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, LogError> {
        Self::from_label(s)
    }
}

impl TryFrom<String> for Level {
    type Error = LogError;

    fn try_from(value: String) -> Result<Self, LogError> {
        Self::from_label(&value)
    }
}

impl From<Level> for &'static str {
    fn from(level: Level) -> Self {
        level.label()
    }
}
