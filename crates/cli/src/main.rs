//! # loghub CLI
//!
//! 命令行接口入口点。
//!
//! 提供：
//! - 配置加载与验证
//! - 单条日志发送 (含 critical 终止与 replay)
//! - 级别表查询
//! - 多线程压测与 sink 指标输出

mod cli;
mod commands;
mod error;

use anyhow::Result;
use clap::Parser;
use tracing::debug;

use cli::{Cli, Commands};
use commands::{run_emit, run_levels, run_stress, run_validate};

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    init_diagnostics(&cli)?;

    debug!(version = env!("CARGO_PKG_VERSION"), "loghub CLI starting");

    let result = match &cli.command {
        Commands::Emit(args) => run_emit(args),
        Commands::Validate(args) => run_validate(args),
        Commands::Levels(args) => run_levels(args),
        Commands::Stress(args) => run_stress(args),
    };

    if let Err(ref e) = result {
        tracing::error!(error = %e, "Command failed");
    }

    result
}

/// Diagnostics about loghub itself go to stderr; stdout carries the log stream.
fn init_diagnostics(cli: &Cli) -> Result<()> {
    let default_log_level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    observability::init_with_config(observability::ObservabilityConfig {
        log_format: cli.diagnostics,
        default_log_level: default_log_level.to_string(),
    })
}
