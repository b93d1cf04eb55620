//! Logger - dispatch engine
//!
//! All shared state (registry, thresholds, thread names, formatter settings, RNG)
//! sits behind one `parking_lot::Mutex`. A log call holds it from the threshold
//! check until the line is written, so registration never interleaves with a write
//! and lines from different threads never interleave inside a sink.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle, ThreadId};
use std::time::Duration;

use contracts::{
    FileSinkConfig, Level, LineSink, LogError, LoggerConfig, SinkConfig, SinkType,
    SourceLocation, TimeGranularity, DEFAULT_SINK,
};
use parking_lot::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::delay::DelayInjector;
use crate::formatter::{Formatter, FunctionNameReplacer, Pattern, Record, UNKNOWN_THREAD};
use crate::handle::SinkHandle;
use crate::metrics::MetricsSnapshot;
use crate::policy::LevelPolicy;
use crate::registry::{Delivery, SinkRegistry};
use crate::sinks::{ConsoleSink, RotatingFileSink};

struct LoggerState {
    registry: SinkRegistry,
    policy: LevelPolicy,
    formatter: Formatter,
    thread_names: HashMap<ThreadId, String>,
    delay: Option<DelayInjector>,
    default_flush_level: Option<Level>,
}

impl LoggerState {
    fn new(default: Box<dyn LineSink>) -> Self {
        Self {
            registry: SinkRegistry::new(default),
            policy: LevelPolicy::default(),
            formatter: Formatter::new(TimeGranularity::default()),
            thread_names: HashMap::new(),
            delay: None,
            default_flush_level: None,
        }
    }
}

struct Inner {
    state: Mutex<LoggerState>,
    flusher: Mutex<Option<Flusher>>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.flusher.get_mut().take();
        self.state.get_mut().registry.close_all();
    }
}

/// Background thread that flushes every sink at a fixed interval
struct Flusher {
    stop: mpsc::Sender<()>,
    thread: Option<JoinHandle<()>>,
}

impl Flusher {
    fn spawn(inner: Weak<Inner>, interval: Duration) -> Result<Self, LogError> {
        let (stop, stopped) = mpsc::channel::<()>();
        let thread = thread::Builder::new()
            .name("loghub-flusher".to_string())
            .spawn(move || loop {
                match stopped.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        let Some(inner) = inner.upgrade() else { break };
                        inner.state.lock().registry.flush_all();
                    }
                    _ => break,
                }
            })?;
        debug!(interval_ms = interval.as_millis() as u64, "Flusher started");
        Ok(Self {
            stop,
            thread: Some(thread),
        })
    }
}

impl Drop for Flusher {
    fn drop(&mut self) {
        let _ = self.stop.send(());
        if let Some(thread) = self.thread.take() {
            // the flusher may hold the last reference to the logger
            if thread.thread().id() != thread::current().id() {
                let _ = thread.join();
            }
        }
    }
}

/// Process-wide logging facility.
///
/// Cloning is cheap and every clone shares the same sinks and settings.
///
/// ```no_run
/// use dispatcher::{log_error, Level, Logger};
///
/// let logger = Logger::new();
/// logger.set_threshold(Level::Info);
/// log_error!(logger = logger; "disk {} is full", "/dev/sda1");
/// ```
#[derive(Clone)]
pub struct Logger {
    inner: Arc<Inner>,
}

impl Logger {
    /// Logger whose default sink is stdout
    pub fn new() -> Self {
        Self::with_default_sink(ConsoleSink::stdout())
    }

    pub fn with_default_sink(sink: impl LineSink + 'static) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(LoggerState::new(Box::new(sink))),
                flusher: Mutex::new(None),
            }),
        }
    }

    /// Build a live logger from configuration.
    ///
    /// # Errors
    /// - [`LogError::MissingDefaultSink`] when no sink is named `"default"`
    /// - [`LogError::SinkOpen`] when a file sink cannot be opened
    /// - [`LogError::InvalidPattern`] for a bad default or per-sink pattern
    #[instrument(name = "logger_from_config", skip(config), fields(sinks = config.sinks.len()))]
    pub fn from_config(config: &LoggerConfig) -> Result<Self, LogError> {
        let default = config
            .sink(DEFAULT_SINK)
            .ok_or(LogError::MissingDefaultSink)?;
        let logger = Self::with_default_sink(open_destination(default)?);

        logger.set_threshold(config.threshold);
        for (scope, level) in &config.scopes {
            logger.set_scope_threshold(scope, *level);
        }
        logger.set_time_granularity(config.time_granularity);
        if let Some(pattern) = &config.pattern {
            logger.set_default_pattern(pattern)?;
        }
        logger.set_default_flush_level(config.flush_level);

        for sink in &config.sinks {
            if sink.name != DEFAULT_SINK {
                match sink.sink_type {
                    SinkType::Stdout => logger.register_stdout_sink(&sink.name),
                    SinkType::Stderr => logger.register_stderr_sink(&sink.name),
                    SinkType::File => logger
                        .register_file_sink_with(&sink.name, FileSinkConfig::from_params(&sink.params)?)?,
                }
            }
            if let Some(pattern) = &sink.pattern {
                logger.set_sink_pattern(&sink.name, pattern)?;
            }
            if sink.flush_level.is_some() {
                logger.set_sink_flush_level(&sink.name, sink.flush_level)?;
            }
        }

        if let Some(delay) = config.delay {
            logger.enable_delay(delay.max_delay_micros, delay.seed);
        }
        if let Some(secs) = config.flush_interval_secs {
            logger.set_flush_interval(Duration::from_secs(secs))?;
        }

        info!(sinks = ?logger.sink_names(), threshold = %config.threshold, "Logger configured");
        Ok(logger)
    }

    // ========================================================================
    // Sink registration
    // ========================================================================

    /// Replace the default sink with a rotating file.
    ///
    /// # Errors
    /// [`LogError::SinkOpen`] when the file cannot be opened.
    pub fn register_default_file_sink(
        &self,
        path: impl Into<PathBuf>,
        max_size_mib: u64,
        max_rotated_files: usize,
    ) -> Result<(), LogError> {
        let config = FileSinkConfig::new(path).with_limits(max_size_mib, max_rotated_files);
        let mut state = self.inner.state.lock();
        state.registry.flush_path(DEFAULT_SINK, &config.path);
        let sink = RotatingFileSink::open(config)?;
        info!(path = %sink.config().path.display(), "Default sink now writes to file");
        state.registry.replace(DEFAULT_SINK, Box::new(sink));
        Ok(())
    }

    /// Add a rotating file destination to `name`.
    ///
    /// A file already registered under `name` on the same path is replaced, so
    /// registering twice is harmless.
    ///
    /// # Errors
    /// [`LogError::SinkOpen`] when the file cannot be opened.
    pub fn register_file_sink(
        &self,
        path: impl Into<PathBuf>,
        name: &str,
        max_size_mib: u64,
        max_rotated_files: usize,
    ) -> Result<(), LogError> {
        let config = FileSinkConfig::new(path).with_limits(max_size_mib, max_rotated_files);
        self.register_file_sink_with(name, config)
    }

    /// [`Logger::register_file_sink`] with full file settings
    ///
    /// # Errors
    /// [`LogError::SinkOpen`] when the file cannot be opened.
    #[instrument(name = "logger_register_file_sink", skip(self, config), fields(sink = %name, path = %config.path.display()))]
    pub fn register_file_sink_with(&self, name: &str, config: FileSinkConfig) -> Result<(), LogError> {
        let mut state = self.inner.state.lock();
        state.registry.flush_path(name, &config.path);
        let sink = RotatingFileSink::open(config)?;
        state.registry.append(name, Box::new(sink));
        Ok(())
    }

    /// Point `name` at stdout, replacing whatever it wrote to before
    pub fn register_stdout_sink(&self, name: &str) {
        self.inner
            .state
            .lock()
            .registry
            .replace(name, Box::new(ConsoleSink::stdout()));
    }

    /// Point `name` at stderr, replacing whatever it wrote to before
    pub fn register_stderr_sink(&self, name: &str) {
        self.inner
            .state
            .lock()
            .registry
            .replace(name, Box::new(ConsoleSink::stderr()));
    }

    /// Add a caller-supplied destination to `name`
    pub fn register_custom_sink(&self, name: &str, sink: impl LineSink + 'static) {
        self.inner.state.lock().registry.append(name, Box::new(sink));
    }

    /// # Errors
    /// [`LogError::ReservedSink`] for `"default"`.
    pub fn unregister_sink(&self, name: &str) -> Result<bool, LogError> {
        self.inner.state.lock().registry.unregister(name)
    }

    pub fn sink_names(&self) -> Vec<String> {
        self.inner.state.lock().registry.names()
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.inner.state.lock().registry.contains(name)
    }

    /// Name-based handle; the sink does not have to exist yet
    pub fn sink(&self, name: &str) -> SinkHandle {
        SinkHandle::new(name, self.clone())
    }

    // ========================================================================
    // Thresholds
    // ========================================================================

    pub fn set_threshold(&self, level: Level) {
        self.inner.state.lock().policy.set_global(level);
    }

    pub fn set_scope_threshold(&self, scope: &str, level: Level) {
        self.inner.state.lock().policy.set_scope(scope, level);
    }

    pub fn clear_scope_threshold(&self, scope: &str) -> Option<Level> {
        self.inner.state.lock().policy.clear_scope(scope)
    }

    /// Effective threshold for calls addressed to `scope`
    pub fn threshold(&self, scope: &str) -> Level {
        self.inner.state.lock().policy.threshold(scope)
    }

    // ========================================================================
    // Formatting
    // ========================================================================

    pub fn set_time_granularity(&self, granularity: TimeGranularity) {
        self.inner.state.lock().formatter.set_granularity(granularity);
    }

    /// Name the calling thread in every line it logs
    pub fn register_thread_name(&self, name: impl Into<String>) {
        let id = thread::current().id();
        self.inner.state.lock().thread_names.insert(id, name.into());
    }

    /// # Errors
    /// [`LogError::InvalidPattern`] when the pattern does not parse.
    pub fn set_default_pattern(&self, pattern: &str) -> Result<(), LogError> {
        let pattern = Pattern::parse(pattern)?;
        self.inner
            .state
            .lock()
            .formatter
            .set_default_pattern(Some(pattern));
        Ok(())
    }

    pub fn clear_default_pattern(&self) {
        self.inner.state.lock().formatter.set_default_pattern(None);
    }

    /// # Errors
    /// [`LogError::InvalidPattern`] for a bad pattern, [`LogError::UnknownSink`]
    /// when `name` is not registered.
    pub fn set_sink_pattern(&self, name: &str, pattern: &str) -> Result<(), LogError> {
        let pattern = Pattern::parse(pattern)?;
        let mut state = self.inner.state.lock();
        let entry = state.registry.get_mut(name).ok_or_else(|| unknown_sink(name))?;
        entry.set_pattern(Some(pattern));
        Ok(())
    }

    pub fn set_function_name_replacer<F>(&self, replacer: F)
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        let replacer: FunctionNameReplacer = Arc::new(replacer);
        self.inner
            .state
            .lock()
            .formatter
            .set_function_name_replacer(Some(replacer));
    }

    // ========================================================================
    // Flushing
    // ========================================================================

    /// Flush every sink periodically. `Duration::ZERO` stops periodic flushing.
    ///
    /// # Errors
    /// [`LogError::Io`] when the flusher thread cannot be spawned.
    pub fn set_flush_interval(&self, interval: Duration) -> Result<(), LogError> {
        let mut flusher = self.inner.flusher.lock();
        *flusher = None;
        if !interval.is_zero() {
            *flusher = Some(Flusher::spawn(Arc::downgrade(&self.inner), interval)?);
        }
        Ok(())
    }

    /// Flush a sink right after writing any line at or above `level`.
    /// Applies to sinks without their own flush level.
    pub fn set_default_flush_level(&self, level: Option<Level>) {
        self.inner.state.lock().default_flush_level = level;
    }

    /// # Errors
    /// [`LogError::UnknownSink`] when `name` is not registered.
    pub fn set_sink_flush_level(&self, name: &str, level: Option<Level>) -> Result<(), LogError> {
        let mut state = self.inner.state.lock();
        let entry = state.registry.get_mut(name).ok_or_else(|| unknown_sink(name))?;
        entry.set_flush_level(level);
        Ok(())
    }

    pub fn flush(&self) {
        self.inner.state.lock().registry.flush_all();
    }

    // ========================================================================
    // Delay injection
    // ========================================================================

    /// Sleep a seeded random delay before every emitted line
    pub fn enable_delay(&self, max_delay_micros: u64, seed: u64) {
        self.inner.state.lock().delay = Some(DelayInjector::new(max_delay_micros, seed));
        debug!(max_delay_micros, seed, "Delay injection enabled");
    }

    pub fn disable_delay(&self) {
        self.inner.state.lock().delay = None;
    }

    /// Delays drawn since the injector was last enabled
    pub fn injected_delays(&self) -> u64 {
        self.inner
            .state
            .lock()
            .delay
            .as_ref()
            .map_or(0, DelayInjector::draws)
    }

    // ========================================================================
    // Logging
    // ========================================================================

    pub fn log(&self, level: Level, message: impl fmt::Display, location: &SourceLocation) {
        self.emit(DEFAULT_SINK, Some(level), Gate::Threshold, &message, location);
    }

    pub fn log_to(&self, sink: &str, level: Level, message: impl fmt::Display, location: &SourceLocation) {
        self.emit(sink, Some(level), Gate::Threshold, &message, location);
    }

    /// Write a replay line regardless of thresholds
    pub fn replay(&self, message: impl fmt::Display, location: &SourceLocation) {
        self.emit(DEFAULT_SINK, None, Gate::Bypass, &message, location);
    }

    pub fn replay_to(&self, sink: &str, message: impl fmt::Display, location: &SourceLocation) {
        self.emit(sink, None, Gate::Bypass, &message, location);
    }

    /// Log at `critical`, flush every sink and abort the process
    ///
    /// The line is written even when the threshold would suppress it.
    pub fn critical(&self, message: impl fmt::Display, location: &SourceLocation) -> ! {
        self.critical_to(DEFAULT_SINK, message, location)
    }

    pub fn critical_to(&self, sink: &str, message: impl fmt::Display, location: &SourceLocation) -> ! {
        self.emit(sink, Some(Level::Critical), Gate::Bypass, &message, location);
        self.flush();
        std::process::abort()
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Per-sink counters, `"default"` first
    pub fn metrics(&self) -> Vec<(String, MetricsSnapshot)> {
        self.inner.state.lock().registry.metrics()
    }

    pub fn sink_metrics(&self, name: &str) -> Option<MetricsSnapshot> {
        self.inner
            .state
            .lock()
            .registry
            .get(name)
            .map(|entry| entry.metrics())
    }

    /// Back to a stdout default with no other sinks, default thresholds,
    /// no thread names, no delay and the built-in layout
    #[instrument(name = "logger_reset", skip(self))]
    pub fn reset(&self) {
        let mut state = self.inner.state.lock();
        state.registry.close_all();
        let granularity = state.formatter.granularity();
        *state = LoggerState::new(Box::new(ConsoleSink::stdout()));
        state.formatter.set_granularity(granularity);
        debug!("Logger reset");
    }

    /// Stop periodic flushing, then flush and close every sink
    #[instrument(name = "logger_shutdown", skip(self))]
    pub fn shutdown(&self) {
        self.inner.flusher.lock().take();
        let mut state = self.inner.state.lock();
        state.registry.close_all();
        debug!("Logger shut down");
    }

    fn emit(
        &self,
        sink: &str,
        level: Option<Level>,
        gate: Gate,
        message: &dyn fmt::Display,
        location: &SourceLocation,
    ) {
        let mut guard = self.inner.state.lock();
        let state = &mut *guard;

        if let (Gate::Threshold, Some(level)) = (gate, level) {
            if !state.policy.should_emit(sink, level) {
                return;
            }
        }

        if let Some(delay) = state.delay.as_mut() {
            let pause = delay.next_delay();
            if !pause.is_zero() {
                thread::sleep(pause);
            }
        }

        let message = message.to_string();
        let thread = state
            .thread_names
            .get(&thread::current().id())
            .map_or(UNKNOWN_THREAD, String::as_str);
        let formatter = &state.formatter;

        let delivery = state.registry.deliver(sink, level, state.default_flush_level, |pattern| {
            match level {
                Some(level) => formatter.format(
                    &Record {
                        level,
                        message: &message,
                        location,
                        thread,
                        sink,
                    },
                    pattern,
                ),
                None => formatter.format_replay(location.function, &message),
            }
        });

        if delivery == Delivery::Dropped {
            warn!(sink = %sink, "Log line dropped");
        }
    }
}

/// Whether a line goes through the level policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gate {
    Threshold,
    Bypass,
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("sinks", &self.sink_names())
            .finish()
    }
}

fn open_destination(config: &SinkConfig) -> Result<Box<dyn LineSink>, LogError> {
    Ok(match config.sink_type {
        SinkType::Stdout => Box::new(ConsoleSink::stdout()),
        SinkType::Stderr => Box::new(ConsoleSink::stderr()),
        SinkType::File => Box::new(RotatingFileSink::open(FileSinkConfig::from_params(&config.params)?)?),
    })
}

fn unknown_sink(name: &str) -> LogError {
    LogError::UnknownSink {
        name: name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sinks::MemorySink;
    use std::fs;
    use std::time::Instant;
    use tempfile::tempdir;

    const HERE: SourceLocation = SourceLocation::new("src/app/main.rs", "app::main::run", 7);

    fn memory_logger() -> (Logger, MemorySink) {
        let probe = MemorySink::labeled("default");
        let logger = Logger::with_default_sink(probe.clone());
        logger.set_time_granularity(TimeGranularity::None);
        (logger, probe)
    }

    #[test]
    fn test_threshold_law() {
        for threshold in Level::all() {
            let (logger, probe) = memory_logger();
            logger.set_threshold(threshold);
            for level in Level::all().filter(|l| *l != Level::Off) {
                logger.log(level, "m", &HERE);
            }
            let expected = Level::all()
                .filter(|l| *l != Level::Off && *l >= threshold)
                .count();
            assert_eq!(probe.len(), expected, "threshold {threshold}");
        }
    }

    #[test]
    fn test_default_threshold_is_warning() {
        let (logger, probe) = memory_logger();
        logger.log(Level::Info, "hidden", &HERE);
        logger.log(Level::Error, "shown", &HERE);
        assert_eq!(
            probe.lines(),
            ["[error] main::run[7]{UNKNOWN_THREAD}: shown"]
        );
    }

    #[test]
    fn test_scope_threshold_uses_requested_name() {
        let (logger, probe) = memory_logger();
        logger.set_scope_threshold("chatty", Level::Trace);

        // unregistered name still resolves to default, filtered by its own scope
        logger.log_to("chatty", Level::Debug, "kept", &HERE);
        logger.log(Level::Debug, "dropped", &HERE);
        assert_eq!(probe.len(), 1);

        logger.clear_scope_threshold("chatty");
        assert_eq!(logger.threshold("chatty"), Level::Warn);
    }

    #[test]
    fn test_thread_names() {
        let (logger, probe) = memory_logger();
        logger.register_thread_name("main-loop");
        logger.log(Level::Warn, "named", &HERE);

        let worker = logger.clone();
        thread::spawn(move || worker.log(Level::Warn, "anon", &HERE))
            .join()
            .unwrap();

        let lines = probe.lines();
        assert!(lines[0].contains("{main-loop}"));
        assert!(lines[1].contains("{UNKNOWN_THREAD}"));
    }

    #[test]
    fn test_replay_bypasses_off() {
        let (logger, probe) = memory_logger();
        logger.set_threshold(Level::Off);
        logger.log(Level::Critical, "suppressed", &HERE);
        logger.replay("step=4", &HERE);
        assert_eq!(probe.lines(), ["[replay] run: step=4"]);
    }

    #[test]
    fn test_sink_pattern_and_unknown_sink() {
        let (logger, probe) = memory_logger();
        let net = MemorySink::labeled("net");
        logger.register_custom_sink("net", net.clone());
        logger.set_sink_pattern("net", "{sink}:{level}:{message}").unwrap();

        logger.log_to("net", Level::Error, format_args!("code {}", 3), &HERE);
        assert_eq!(net.lines(), ["net:error:code 3"]);
        assert!(probe.is_empty());

        assert!(matches!(
            logger.set_sink_pattern("ghost", "{message}"),
            Err(LogError::UnknownSink { .. })
        ));
        assert!(matches!(
            logger.set_default_pattern("{bogus}"),
            Err(LogError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_fallback_to_default() {
        let (logger, probe) = memory_logger();
        let broken = MemorySink::labeled("broken");
        broken.set_broken(true);
        logger.register_custom_sink("net", broken);

        logger.log_to("net", Level::Error, "rescued", &HERE);

        assert_eq!(probe.len(), 1);
        assert!(probe.lines()[0].ends_with("rescued"));
        let net = logger.sink_metrics("net").unwrap();
        assert_eq!(net.fallback_count, 1);
    }

    #[test]
    fn test_unregister_default_refused() {
        let (logger, _) = memory_logger();
        assert!(matches!(
            logger.unregister_sink(DEFAULT_SINK),
            Err(LogError::ReservedSink { .. })
        ));
    }

    #[test]
    fn test_file_reregistration_is_idempotent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("net.log");
        let (logger, _) = memory_logger();

        logger.register_file_sink(&path, "net", 5, 3).unwrap();
        logger.log_to("net", Level::Error, "one", &HERE);
        logger.register_file_sink(&path, "net", 5, 3).unwrap();
        logger.log_to("net", Level::Error, "two", &HERE);
        logger.flush();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.lines().next().unwrap().ends_with("one"));
    }

    #[test]
    fn test_register_file_sink_fails_fast() {
        let dir = tempdir().unwrap();
        let (logger, _) = memory_logger();
        let err = logger.register_file_sink(dir.path(), "net", 5, 3).unwrap_err();
        assert!(matches!(err, LogError::SinkOpen { .. }));
        assert!(!logger.is_registered("net"));
    }

    #[test]
    fn test_default_file_sink() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");
        let (logger, probe) = memory_logger();

        logger.register_default_file_sink(&path, 5, 3).unwrap();
        logger.log(Level::Warn, "to file", &HERE);
        logger.flush();

        assert!(probe.is_empty());
        assert!(fs::read_to_string(&path).unwrap().contains("to file"));
    }

    #[test]
    fn test_flush_levels() {
        let (logger, probe) = memory_logger();
        logger.set_default_flush_level(Some(Level::Error));
        logger.log(Level::Warn, "w", &HERE);
        assert_eq!(probe.flush_count(), 0);
        logger.log(Level::Error, "e", &HERE);
        assert_eq!(probe.flush_count(), 1);

        logger.set_sink_flush_level(DEFAULT_SINK, Some(Level::Warn)).unwrap();
        logger.log(Level::Warn, "w", &HERE);
        assert_eq!(probe.flush_count(), 2);
    }

    #[test]
    fn test_flush_interval() {
        let (logger, probe) = memory_logger();
        logger.set_flush_interval(Duration::from_millis(10)).unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while probe.flush_count() == 0 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert!(probe.flush_count() > 0);

        logger.set_flush_interval(Duration::ZERO).unwrap();
        let settled = probe.flush_count();
        thread::sleep(Duration::from_millis(50));
        assert_eq!(probe.flush_count(), settled);
    }

    #[test]
    fn test_delay_drawn_only_for_emitted_lines() {
        let (logger, _) = memory_logger();
        logger.enable_delay(50, 9);

        logger.log(Level::Debug, "filtered", &HERE);
        logger.log(Level::Error, "emitted", &HERE);
        logger.replay("emitted", &HERE);
        assert_eq!(logger.injected_delays(), 2);

        logger.disable_delay();
        assert_eq!(logger.injected_delays(), 0);
    }

    #[test]
    fn test_function_name_replacer() {
        let (logger, probe) = memory_logger();
        logger.set_function_name_replacer(|f| f.to_uppercase());
        logger.log(Level::Error, "x", &HERE);
        assert!(probe.lines()[0].contains("main::APP::MAIN::RUN[7]"));
    }

    #[test]
    fn test_reset() {
        let (logger, probe) = memory_logger();
        logger.register_custom_sink("net", MemorySink::new());
        logger.set_threshold(Level::Trace);
        logger.enable_delay(10, 1);

        logger.reset();

        assert_eq!(logger.sink_names(), ["default"]);
        assert_eq!(logger.threshold(DEFAULT_SINK), Level::Warn);
        assert_eq!(logger.injected_delays(), 0);
        logger.log(Level::Error, "to stdout now", &HERE);
        assert!(probe.is_empty());
    }

    #[test]
    fn test_concurrent_lines_never_interleave() {
        let (logger, probe) = memory_logger();
        logger.set_threshold(Level::Trace);

        let workers: Vec<_> = (0..8)
            .map(|t| {
                let logger = logger.clone();
                thread::spawn(move || {
                    logger.register_thread_name(format!("w{t}"));
                    for i in 0..100 {
                        logger.log(Level::Info, format_args!("t{t}-m{i}"), &HERE);
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        let lines = probe.lines();
        assert_eq!(lines.len(), 800);
        for line in &lines {
            let (tag, message) = line.split_once("}: ").unwrap();
            let thread = tag.rsplit('{').next().unwrap();
            assert!(message.starts_with(&format!("t{}-", &thread[1..])), "{line}");
        }
    }

    #[test]
    fn test_from_config_requires_default() {
        let config = LoggerConfig {
            sinks: vec![SinkConfig::stdout("other")],
            ..LoggerConfig::default()
        };
        assert!(matches!(
            Logger::from_config(&config),
            Err(LogError::MissingDefaultSink)
        ));
    }

    #[test]
    fn test_from_config_builds_sinks() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("net.log");
        let mut net = SinkConfig::file("net", &path);
        net.pattern = Some("{level} {message}".to_string());

        let mut config = LoggerConfig {
            threshold: Level::Info,
            time_granularity: TimeGranularity::None,
            sinks: vec![SinkConfig::stdout(DEFAULT_SINK), net],
            ..LoggerConfig::default()
        };
        config.scopes.insert("net".to_string(), Level::Debug);

        let logger = Logger::from_config(&config).unwrap();
        assert_eq!(logger.sink_names(), ["default", "net"]);
        assert_eq!(logger.threshold("net"), Level::Debug);

        logger.log_to("net", Level::Debug, "configured", &HERE);
        logger.flush();
        assert_eq!(fs::read_to_string(&path).unwrap(), "debug configured\n");
    }
}
