//! Race Probe Example
//!
//! Several threads run an unsynchronized read-modify-write on a shared counter and
//! log between the read and the write. The delay injector stretches that window,
//! so lost updates show up reliably; the seed makes a run repeatable.
//!
//! Run with: cargo run -p demos --bin race_probe -- [config.toml] [seed]

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;

use config_loader::ConfigLoader;
use contracts::Level;
use dispatcher::{log_debug, log_error, log_info, log_replay, log_warning, Logger};

const THREADS: u64 = 4;
const ROUNDS: u64 = 50;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    observability::init_with_config(observability::ObservabilityConfig {
        log_format: observability::LogFormat::Compact,
        default_log_level: "info".to_string(),
    })?;

    let mut args = std::env::args().skip(1);

    // ==== Stage 1: Build the process-wide logger ====
    let logger = match args.next() {
        Some(path) => {
            tracing::info!(path = %path, "Loading logger config");
            Logger::from_config(&ConfigLoader::load_from_path(Path::new(&path))?)?
        }
        None => Logger::new(),
    };
    let seed = args.next().map(|s| s.parse()).transpose()?.unwrap_or(42);

    logger.set_threshold(Level::Info);
    logger.set_scope_threshold("probe", Level::Debug);
    logger.enable_delay(200, seed);
    if dispatcher::install(logger).is_err() {
        return Err("process-wide logger already installed".into());
    }

    dispatcher::global().register_thread_name("main");
    log_info!("probing with {} threads x {} rounds, seed {}", THREADS, ROUNDS, seed);

    // ==== Stage 2: Racing writers ====
    let counter = AtomicU64::new(0);
    thread::scope(|scope| {
        for t in 0..THREADS {
            let counter = &counter;
            scope.spawn(move || {
                dispatcher::global().register_thread_name(format!("racer-{t}"));
                for round in 0..ROUNDS {
                    let seen = counter.load(Ordering::SeqCst);
                    log_debug!(sink = "probe"; "round {round}: read {seen}");
                    counter.store(seen + 1, Ordering::SeqCst);
                }
                log_replay!("racer {} done", t);
            });
        }
    });

    // ==== Stage 3: Report ====
    let expected = THREADS * ROUNDS;
    let actual = counter.load(Ordering::SeqCst);
    if actual == expected {
        log_info!("no lost updates ({actual}/{expected})");
    } else if actual * 2 > expected {
        log_warning!("{} lost updates ({actual}/{expected})", expected - actual);
    } else {
        log_error!("{} lost updates ({actual}/{expected})", expected - actual);
    }

    for (name, metrics) in dispatcher::global().metrics() {
        tracing::info!(sink = %name, writes = metrics.write_count, fallbacks = metrics.fallback_count, "Sink metrics");
    }
    tracing::info!(delays = dispatcher::global().injected_delays(), "Delay injector");

    dispatcher::shutdown();
    Ok(())
}
