//! `emit` command implementation.

use anyhow::Result;
use contracts::{Level, DEFAULT_SINK, REPLAY_LABEL};
use dispatcher::source_location;

use crate::cli::EmitArgs;
use crate::commands::build_logger;
use crate::error::CliError;

/// Execute the `emit` command
///
/// A `critical` line terminates the process once it is written.
pub fn run_emit(args: &EmitArgs) -> Result<()> {
    let logger = build_logger(args.config.as_deref(), args.threshold)?;

    if let Some(granularity) = args.granularity {
        logger.set_time_granularity(granularity);
    }
    if let Some(name) = &args.thread_name {
        logger.register_thread_name(name.as_str());
    }

    let sink = args.sink.as_deref().unwrap_or(DEFAULT_SINK);
    let message = args.message.join(" ");
    let location = source_location!();

    if args.level == REPLAY_LABEL {
        logger.replay_to(sink, &message, &location);
    } else {
        match Level::from_label(&args.level).map_err(CliError::from)? {
            Level::Off => {
                return Err(CliError::invalid_argument("'off' is a threshold, not a message level").into())
            }
            Level::Critical => logger.critical_to(sink, &message, &location),
            level => logger.log_to(sink, level, &message, &location),
        }
    }

    logger.shutdown();
    Ok(())
}
