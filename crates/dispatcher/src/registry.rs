//! SinkRegistry - sink name to output destinations
//!
//! The `"default"` entry lives in its own field so it can never be missing.
//! Every lookup of an unknown name resolves to it.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use contracts::{Level, LineSink, LogError, DEFAULT_SINK};
use tracing::{debug, warn};

use crate::formatter::Pattern;
use crate::metrics::{MetricsSnapshot, SinkMetrics};

/// Outcome of delivering one line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// At least one destination of the resolved sink accepted the line
    Written,
    /// The resolved sink failed entirely and the default sink took the line
    FellBack,
    /// Nothing accepted the line
    Dropped,
}

/// One named sink: its destinations plus format and flush policy
pub struct SinkEntry {
    name: String,
    destinations: Vec<Box<dyn LineSink>>,
    pattern: Option<Pattern>,
    flush_level: Option<Level>,
    metrics: SinkMetrics,
}

impl SinkEntry {
    fn new(name: impl Into<String>, destination: Box<dyn LineSink>) -> Self {
        Self {
            name: name.into(),
            destinations: vec![destination],
            pattern: None,
            flush_level: None,
            metrics: SinkMetrics::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pattern(&self) -> Option<&Pattern> {
        self.pattern.as_ref()
    }

    pub fn set_pattern(&mut self, pattern: Option<Pattern>) {
        self.pattern = pattern;
    }

    pub fn flush_level(&self) -> Option<Level> {
        self.flush_level
    }

    pub fn set_flush_level(&mut self, level: Option<Level>) {
        self.flush_level = level;
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Descriptions of every destination, in registration order
    pub fn destinations(&self) -> Vec<String> {
        self.destinations.iter().map(|d| d.describe()).collect()
    }

    /// Write `line` to every destination. True when at least one accepted it.
    fn write(&mut self, line: &str) -> bool {
        let mut accepted = false;
        for destination in self.destinations.iter_mut() {
            match destination.write_line(line) {
                Ok(()) => accepted = true,
                Err(e) => {
                    self.metrics.inc_failure_count();
                    warn!(
                        sink = %self.name,
                        destination = %destination.describe(),
                        error = %e,
                        "Destination write failed"
                    );
                }
            }
        }
        if accepted {
            self.metrics.inc_write_count();
        }
        accepted
    }

    fn flush(&mut self) {
        for destination in self.destinations.iter_mut() {
            if let Err(e) = destination.flush() {
                self.metrics.inc_failure_count();
                warn!(sink = %self.name, error = %e, "Destination flush failed");
            }
        }
        self.metrics.inc_flush_count();
    }

    fn close(&mut self) {
        for mut destination in self.destinations.drain(..) {
            if let Err(e) = destination.close() {
                warn!(sink = %self.name, error = %e, "Destination close failed");
            }
        }
    }

    /// Render with this entry's pattern, write, then flush when `level` reaches the
    /// entry's flush level (or `default_flush` when the entry has none).
    fn deliver<F>(&mut self, level: Option<Level>, default_flush: Option<Level>, render: &F) -> bool
    where
        F: Fn(Option<&Pattern>) -> String,
    {
        let line = render(self.pattern.as_ref());
        if !self.write(&line) {
            return false;
        }
        let flush_at = self.flush_level.or(default_flush);
        if let (Some(level), Some(flush_at)) = (level, flush_at) {
            if level >= flush_at {
                self.flush();
            }
        }
        true
    }

    /// Swap every destination for `destination`; pattern, flush level and metrics stay.
    fn replace(&mut self, destination: Box<dyn LineSink>) {
        self.close();
        self.destinations.push(destination);
    }

    /// Add a destination, or replace the one already writing to the same file
    fn append(&mut self, destination: Box<dyn LineSink>) {
        let existing = destination.path().and_then(|path| {
            self.destinations
                .iter()
                .position(|d| d.path().is_some_and(|p| same_file(p, path)))
        });
        match existing {
            Some(index) => {
                let mut old = std::mem::replace(&mut self.destinations[index], destination);
                if let Err(e) = old.close() {
                    warn!(sink = %self.name, error = %e, "Replaced destination failed to close");
                }
            }
            None => self.destinations.push(destination),
        }
    }

    fn flush_path(&mut self, path: &Path) {
        for destination in self.destinations.iter_mut() {
            if destination.path().is_some_and(|p| same_file(p, path)) {
                if let Err(e) = destination.flush() {
                    warn!(sink = %self.name, error = %e, "Destination flush failed");
                }
            }
        }
    }
}

/// Registry of named sinks with an always-present default
pub struct SinkRegistry {
    default: SinkEntry,
    named: HashMap<String, SinkEntry>,
}

impl SinkRegistry {
    pub fn new(default: Box<dyn LineSink>) -> Self {
        Self {
            default: SinkEntry::new(DEFAULT_SINK, default),
            named: HashMap::new(),
        }
    }

    /// True for `"default"` and every registered name
    pub fn contains(&self, name: &str) -> bool {
        name == DEFAULT_SINK || self.named.contains_key(name)
    }

    /// Registered names, `"default"` first, the rest sorted
    pub fn names(&self) -> Vec<String> {
        let mut named: Vec<String> = self.named.keys().cloned().collect();
        named.sort();
        std::iter::once(DEFAULT_SINK.to_string()).chain(named).collect()
    }

    pub fn get(&self, name: &str) -> Option<&SinkEntry> {
        if name == DEFAULT_SINK {
            Some(&self.default)
        } else {
            self.named.get(name)
        }
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut SinkEntry> {
        if name == DEFAULT_SINK {
            Some(&mut self.default)
        } else {
            self.named.get_mut(name)
        }
    }

    /// Exact match, else the default entry. Never fails.
    pub fn lookup(&self, name: &str) -> &SinkEntry {
        self.named.get(name).unwrap_or(&self.default)
    }

    pub fn lookup_mut(&mut self, name: &str) -> &mut SinkEntry {
        match self.named.get_mut(name) {
            Some(entry) => entry,
            None => &mut self.default,
        }
    }

    pub fn default_entry(&self) -> &SinkEntry {
        &self.default
    }

    pub fn default_mut(&mut self) -> &mut SinkEntry {
        &mut self.default
    }

    /// Create `name` with a single destination, or replace all of its destinations
    pub fn replace(&mut self, name: &str, destination: Box<dyn LineSink>) {
        match self.get_mut(name) {
            Some(entry) => {
                entry.replace(destination);
                debug!(sink = %name, "Sink destinations replaced");
            }
            None => {
                self.named
                    .insert(name.to_string(), SinkEntry::new(name, destination));
                debug!(sink = %name, "Sink registered");
            }
        }
    }

    /// Create `name`, or add a destination to it (same-file destinations are replaced)
    pub fn append(&mut self, name: &str, destination: Box<dyn LineSink>) {
        match self.get_mut(name) {
            Some(entry) => {
                entry.append(destination);
                debug!(sink = %name, destinations = entry.destinations.len(), "Sink extended");
            }
            None => {
                self.named
                    .insert(name.to_string(), SinkEntry::new(name, destination));
                debug!(sink = %name, "Sink registered");
            }
        }
    }

    /// Flush the destinations of `name` that write to `path`
    pub fn flush_path(&mut self, name: &str, path: &Path) {
        if let Some(entry) = self.get_mut(name) {
            entry.flush_path(path);
        }
    }

    /// Remove and close a named sink.
    ///
    /// # Errors
    /// [`LogError::ReservedSink`] for `"default"`.
    pub fn unregister(&mut self, name: &str) -> Result<bool, LogError> {
        if name == DEFAULT_SINK {
            return Err(LogError::ReservedSink {
                name: name.to_string(),
            });
        }
        Ok(match self.named.remove(name) {
            Some(mut entry) => {
                entry.close();
                debug!(sink = %name, "Sink unregistered");
                true
            }
            None => false,
        })
    }

    /// Deliver one rendered line to `name`, falling back to the default sink when
    /// every destination of `name` fails.
    pub fn deliver<F>(
        &mut self,
        name: &str,
        level: Option<Level>,
        default_flush: Option<Level>,
        render: F,
    ) -> Delivery
    where
        F: Fn(Option<&Pattern>) -> String,
    {
        if let Some(entry) = self.named.get_mut(name) {
            if entry.deliver(level, default_flush, &render) {
                return Delivery::Written;
            }
            entry.metrics.inc_fallback_count();
            warn!(sink = %name, "Every destination failed, writing to default sink");

            if self.default.deliver(level, default_flush, &render) {
                return Delivery::FellBack;
            }
        } else if self.default.deliver(level, default_flush, &render) {
            return Delivery::Written;
        }

        self.default.metrics.inc_dropped_count();
        warn!(sink = %name, "Default sink failed, line dropped");
        Delivery::Dropped
    }

    pub fn flush_all(&mut self) {
        self.default.flush();
        for entry in self.named.values_mut() {
            entry.flush();
        }
    }

    /// Close every destination. Entries stay registered but have no destinations.
    pub fn close_all(&mut self) {
        for entry in self.named.values_mut() {
            entry.close();
        }
        self.default.close();
    }

    pub fn metrics(&self) -> Vec<(String, MetricsSnapshot)> {
        self.names()
            .into_iter()
            .filter_map(|name| {
                let snapshot = self.get(&name)?.metrics();
                Some((name, snapshot))
            })
            .collect()
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
