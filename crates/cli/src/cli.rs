//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use contracts::{Level, TimeGranularity};
use observability::LogFormat;
use std::path::PathBuf;
use std::str::FromStr;

/// loghub - multi-sink logging registry
#[derive(Parser, Debug)]
#[command(
    name = "loghub",
    author,
    version,
    about = "Multi-sink logging registry and dispatcher",
    long_about = "Drives the loghub logging registry from the command line.\n\n\
                  Loads a logger configuration, emits lines through named sinks, \n\
                  validates configuration files and stress-tests concurrent writers."
)]
pub struct Cli {
    /// Increase diagnostics verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "LOGHUB_VERBOSE")]
    pub verbose: u8,

    /// Only report loghub's own errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Format of loghub's own diagnostics: json, pretty or compact (always written to stderr)
    #[arg(
        long,
        value_parser = LogFormat::from_str,
        default_value = "compact",
        global = true,
        env = "LOGHUB_DIAGNOSTICS"
    )]
    pub diagnostics: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Emit one log line
    Emit(EmitArgs),

    /// Validate a configuration file
    Validate(ValidateArgs),

    /// Print the level label table
    Levels(LevelsArgs),

    /// Hammer the logger from several threads and report sink metrics
    Stress(StressArgs),
}

/// Arguments for the `emit` command
#[derive(Parser, Debug, Clone)]
pub struct EmitArgs {
    /// Logger configuration (TOML or JSON); stdout default sink when omitted
    #[arg(short, long, env = "LOGHUB_CONFIG")]
    pub config: Option<PathBuf>,

    /// Global threshold, overrides the configuration
    #[arg(short, long, env = "LOGHUB_LEVEL")]
    pub threshold: Option<Level>,

    /// Level label of the line (trace..critical, or replay)
    #[arg(short, long, default_value = "info")]
    pub level: String,

    /// Target sink name (unknown names go to the default sink)
    #[arg(short, long)]
    pub sink: Option<String>,

    /// Thread name shown in the line
    #[arg(long)]
    pub thread_name: Option<String>,

    /// Timestamp granularity: none, seconds or milliseconds
    #[arg(long)]
    pub granularity: Option<TimeGranularity>,

    /// Message text
    #[arg(required = true, num_args = 1..)]
    pub message: Vec<String>,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "loghub.toml", env = "LOGHUB_CONFIG")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `levels` command
#[derive(Parser, Debug)]
pub struct LevelsArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `stress` command
#[derive(Parser, Debug, Clone)]
pub struct StressArgs {
    /// Logger configuration (TOML or JSON); stdout default sink when omitted
    #[arg(short, long, env = "LOGHUB_CONFIG")]
    pub config: Option<PathBuf>,

    /// Global threshold, overrides the configuration
    #[arg(short, long, env = "LOGHUB_LEVEL")]
    pub threshold: Option<Level>,

    /// Writer threads
    #[arg(long, default_value = "4")]
    pub threads: usize,

    /// Lines per thread
    #[arg(long, default_value = "1000")]
    pub messages: usize,

    /// Level label of every line
    #[arg(short, long, default_value = "error")]
    pub level: Level,

    /// Target sink name
    #[arg(short, long)]
    pub sink: Option<String>,

    /// Send the default sink to this rotating file instead of stdout
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Size limit of the rotating file in MiB
    #[arg(long, default_value = "5")]
    pub max_size_mib: u64,

    /// Rotated files to keep
    #[arg(long, default_value = "3")]
    pub max_rotated_files: usize,

    /// Enable delay injection with this upper bound (microseconds)
    #[arg(long)]
    pub max_delay_micros: Option<u64>,

    /// Seed of the delay injector
    #[arg(long, default_value = "0")]
    pub seed: u64,

    /// Output the report as JSON
    #[arg(long)]
    pub json: bool,
}
