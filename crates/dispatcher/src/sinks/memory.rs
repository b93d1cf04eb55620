//! MemorySink - keeps lines in memory for tests and replay capture

use std::sync::Arc;

use contracts::{LineSink, LogError};
use parking_lot::Mutex;

#[derive(Debug, Default)]
struct Buffer {
    lines: Vec<String>,
    flushes: u64,
    broken: bool,
}

/// In-memory sink.
///
/// Clones share the same buffer, so a test keeps one clone and registers the other.
/// [`MemorySink::set_broken`] makes every later write fail, which simulates a stream
/// that has become unusable.
#[derive(Debug, Clone)]
pub struct MemorySink {
    label: Arc<str>,
    buffer: Arc<Mutex<Buffer>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::labeled("memory")
    }

    pub fn labeled(label: &str) -> Self {
        Self {
            label: Arc::from(label),
            buffer: Arc::default(),
        }
    }

    /// Copy of all lines written so far
    pub fn lines(&self) -> Vec<String> {
        self.buffer.lock().lines.clone()
    }

    pub fn len(&self) -> usize {
        self.buffer.lock().lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total bytes written, terminators included
    pub fn byte_count(&self) -> usize {
        self.buffer.lock().lines.iter().map(|l| l.len() + 1).sum()
    }

    pub fn flush_count(&self) -> u64 {
        self.buffer.lock().flushes
    }

    pub fn clear(&self) {
        self.buffer.lock().lines.clear();
    }

    pub fn set_broken(&self, broken: bool) {
        self.buffer.lock().broken = broken;
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new()
    }
}

impl LineSink for MemorySink {
    fn describe(&self) -> String {
        format!("memory:{}", self.label)
    }

    fn write_line(&mut self, line: &str) -> Result<(), LogError> {
        let mut buffer = self.buffer.lock();
        if buffer.broken {
            return Err(LogError::sink_write(self.describe(), "stream is broken"));
        }
        buffer.lines.push(line.to_string());
        Ok(())
    }

    fn flush(&mut self) -> Result<(), LogError> {
        let mut buffer = self.buffer.lock();
        if buffer.broken {
            return Err(LogError::sink_write(self.describe(), "stream is broken"));
        }
        buffer.flushes += 1;
        Ok(())
    }
}
