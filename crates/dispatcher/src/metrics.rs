//! Sink metrics for observability

/// Counters for a single registry entry.
///
/// Entries are only touched while the logger lock is held, so plain integers suffice.
#[derive(Debug, Default, Clone)]
pub struct SinkMetrics {
    /// Lines accepted by at least one destination
    write_count: u64,
    /// Destination write or flush failures
    failure_count: u64,
    /// Lines redirected to the default sink after every destination failed
    fallback_count: u64,
    /// Lines lost because the default sink failed as well
    dropped_count: u64,
    /// Explicit or policy-driven flushes
    flush_count: u64,
}

impl SinkMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_count(&self) -> u64 {
        self.write_count
    }

    pub fn inc_write_count(&mut self) {
        self.write_count += 1;
    }

    pub fn failure_count(&self) -> u64 {
        self.failure_count
    }

    pub fn inc_failure_count(&mut self) {
        self.failure_count += 1;
    }

    pub fn fallback_count(&self) -> u64 {
        self.fallback_count
    }

    pub fn inc_fallback_count(&mut self) {
        self.fallback_count += 1;
    }

    pub fn dropped_count(&self) -> u64 {
        self.dropped_count
    }

    pub fn inc_dropped_count(&mut self) {
        self.dropped_count += 1;
    }

    pub fn flush_count(&self) -> u64 {
        self.flush_count
    }

    pub fn inc_flush_count(&mut self) {
        self.flush_count += 1;
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            write_count: self.write_count,
            failure_count: self.failure_count,
            fallback_count: self.fallback_count,
            dropped_count: self.dropped_count,
            flush_count: self.flush_count,
        }
    }
}

/// Snapshot of sink metrics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub write_count: u64,
    pub failure_count: u64,
    pub fallback_count: u64,
    pub dropped_count: u64,
    pub flush_count: u64,
}
