//! LineSink trait - Registry output interface
//!
//! Defines the abstract interface for log destinations.

use std::path::Path;

use crate::LogError;

/// Line output trait
///
/// All sink implementations must implement this trait. Calls are serialized by the
/// logger, so implementations never see two lines at once.
pub trait LineSink: Send {
    /// Short description used in diagnostics (e.g. `stdout`, `file:/var/log/app.log`)
    fn describe(&self) -> String;

    /// Write one formatted line followed by a line terminator
    ///
    /// # Errors
    /// Returns write error (should include context)
    fn write_line(&mut self, line: &str) -> Result<(), LogError>;

    /// Flush buffer (if any)
    fn flush(&mut self) -> Result<(), LogError>;

    /// Close sink
    fn close(&mut self) -> Result<(), LogError> {
        self.flush()
    }

    /// Backing file, for sinks that write to one
    fn path(&self) -> Option<&Path> {
        None
    }
}

impl<S: LineSink + ?Sized> LineSink for Box<S> {
    fn describe(&self) -> String {
        (**self).describe()
    }

    fn write_line(&mut self, line: &str) -> Result<(), LogError> {
        (**self).write_line(line)
    }

    fn flush(&mut self) -> Result<(), LogError> {
        (**self).flush()
    }

    fn close(&mut self) -> Result<(), LogError> {
        (**self).close()
    }

    fn path(&self) -> Option<&Path> {
        (**self).path()
    }
}
