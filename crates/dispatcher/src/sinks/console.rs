//! ConsoleSink - writes lines to stdout or stderr

use std::io::{self, Write};

use contracts::{LineSink, LogError};

/// Console stream selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsoleTarget {
    #[default]
    Stdout,
    Stderr,
}

/// Sink that writes lines to the process console
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSink {
    target: ConsoleTarget,
}

impl ConsoleSink {
    pub fn stdout() -> Self {
        Self {
            target: ConsoleTarget::Stdout,
        }
    }

    pub fn stderr() -> Self {
        Self {
            target: ConsoleTarget::Stderr,
        }
    }

    pub fn target(&self) -> ConsoleTarget {
        self.target
    }

    fn write_to(&self, line: &str) -> io::Result<()> {
        match self.target {
            ConsoleTarget::Stdout => {
                let mut out = io::stdout().lock();
                out.write_all(line.as_bytes())?;
                out.write_all(b"\n")
            }
            ConsoleTarget::Stderr => {
                let mut out = io::stderr().lock();
                out.write_all(line.as_bytes())?;
                out.write_all(b"\n")
            }
        }
    }
}

impl LineSink for ConsoleSink {
    fn describe(&self) -> String {
        match self.target {
            ConsoleTarget::Stdout => "stdout".to_string(),
            ConsoleTarget::Stderr => "stderr".to_string(),
        }
    }

    fn write_line(&mut self, line: &str) -> Result<(), LogError> {
        self.write_to(line)
            .map_err(|e| LogError::sink_write(self.describe(), e.to_string()))
    }

    fn flush(&mut self) -> Result<(), LogError> {
        let result = match self.target {
            ConsoleTarget::Stdout => io::stdout().flush(),
            ConsoleTarget::Stderr => io::stderr().flush(),
        };
        result.map_err(|e| LogError::sink_write(self.describe(), e.to_string()))
    }
}
