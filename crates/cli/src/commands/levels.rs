//! `levels` command implementation.

use anyhow::{Context, Result};
use contracts::{Level, REPLAY_LABEL};
use serde::Serialize;

use crate::cli::LevelsArgs;

#[derive(Serialize)]
struct LevelInfo {
    label: &'static str,
    /// Position in the ordering; `None` for labels outside it
    rank: Option<u8>,
}

fn level_table() -> Vec<LevelInfo> {
    Level::all()
        .map(|level| LevelInfo {
            label: level.label(),
            rank: Some(level as u8),
        })
        .chain(std::iter::once(LevelInfo {
            label: REPLAY_LABEL,
            rank: None,
        }))
        .collect()
}

/// Execute the `levels` command
pub fn run_levels(args: &LevelsArgs) -> Result<()> {
    let table = level_table();

    if args.json {
        let json = serde_json::to_string_pretty(&table).context("Failed to serialize level table")?;
        println!("{json}");
        return Ok(());
    }

    for info in &table {
        match info.rank {
            Some(rank) => println!("{rank}  {}", info.label),
            None => println!("-  {}  (bypasses thresholds)", info.label),
        }
    }
    Ok(())
}
