//! `stress` command implementation.

use std::thread;
use std::time::Instant;

use anyhow::{Context, Result};
use contracts::{Level, DEFAULT_SINK};
use dispatcher::{source_location, Logger, MetricsSnapshot};
use serde::Serialize;
use tracing::info;

use crate::cli::StressArgs;
use crate::commands::build_logger;
use crate::error::CliError;

#[derive(Serialize)]
struct StressReport {
    threads: usize,
    messages_per_thread: usize,
    elapsed_ms: u128,
    injected_delays: u64,
    sinks: Vec<SinkReport>,
}

#[derive(Serialize)]
struct SinkReport {
    name: String,
    writes: u64,
    failures: u64,
    fallbacks: u64,
    dropped: u64,
    flushes: u64,
}

impl SinkReport {
    fn new(name: String, snapshot: MetricsSnapshot) -> Self {
        Self {
            name,
            writes: snapshot.write_count,
            failures: snapshot.failure_count,
            fallbacks: snapshot.fallback_count,
            dropped: snapshot.dropped_count,
            flushes: snapshot.flush_count,
        }
    }
}

/// Execute the `stress` command
pub fn run_stress(args: &StressArgs) -> Result<()> {
    if args.level == Level::Off {
        return Err(CliError::invalid_argument("'off' is a threshold, not a message level").into());
    }

    let logger = build_logger(args.config.as_deref(), args.threshold)?;
    if let Some(path) = &args.file {
        logger
            .register_default_file_sink(path, args.max_size_mib, args.max_rotated_files)
            .map_err(CliError::from)?;
    }
    if let Some(max_delay_micros) = args.max_delay_micros {
        logger.enable_delay(max_delay_micros, args.seed);
    }

    info!(threads = args.threads, messages = args.messages, "Stress run starting");
    let started = Instant::now();
    hammer(&logger, args);
    logger.flush();
    let elapsed = started.elapsed();

    let report = StressReport {
        threads: args.threads,
        messages_per_thread: args.messages,
        elapsed_ms: elapsed.as_millis(),
        injected_delays: logger.injected_delays(),
        sinks: logger
            .metrics()
            .into_iter()
            .map(|(name, snapshot)| SinkReport::new(name, snapshot))
            .collect(),
    };
    logger.shutdown();

    if args.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize stress report")?;
        println!("{json}");
    } else {
        print_report(&report);
    }
    Ok(())
}

fn hammer(logger: &Logger, args: &StressArgs) {
    let sink = args.sink.as_deref().unwrap_or(DEFAULT_SINK);
    thread::scope(|scope| {
        for t in 0..args.threads {
            scope.spawn(move || {
                logger.register_thread_name(format!("stress-{t}"));
                let location = source_location!();
                for seq in 0..args.messages {
                    logger.log_to(sink, args.level, format_args!("thread={t} seq={seq}"), &location);
                }
            });
        }
    });
}

fn print_report(report: &StressReport) {
    println!(
        "\n{} threads x {} lines in {} ms ({} injected delays)",
        report.threads, report.messages_per_thread, report.elapsed_ms, report.injected_delays
    );
    println!(
        "\n  {:<16} {:>10} {:>10} {:>10} {:>10} {:>10}",
        "sink", "writes", "failures", "fallbacks", "dropped", "flushes"
    );
    for sink in &report.sinks {
        println!(
            "  {:<16} {:>10} {:>10} {:>10} {:>10} {:>10}",
            sink.name, sink.writes, sink.failures, sink.fallbacks, sink.dropped, sink.flushes
        );
    }
}
