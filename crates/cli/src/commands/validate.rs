//! `validate` command implementation.

use std::collections::{HashMap, HashSet};

use anyhow::{Context, Result};
use contracts::{FileSinkConfig, Level, LoggerConfig, SinkType};
use dispatcher::Pattern;
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    threshold: Level,
    time_granularity: String,
    sinks: Vec<String>,
    scopes: Vec<String>,
    delay_injection: bool,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{json}");
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return invalid(config_path, format!("File not found: {}", args.config.display()));
    }

    let config = match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(config) => config,
        Err(e) => return invalid(config_path, e.to_string()),
    };

    if let Err(e) = check_patterns(&config) {
        return invalid(config_path, e);
    }

    let warnings = collect_warnings(&config);
    ValidationResult {
        valid: true,
        config_path,
        error: None,
        warnings: (!warnings.is_empty()).then_some(warnings),
        summary: Some(ConfigSummary {
            version: format!("{:?}", config.version),
            threshold: config.threshold,
            time_granularity: config.time_granularity.to_string(),
            sinks: config
                .sinks
                .iter()
                .map(|s| format!("{} ({:?})", s.name, s.sink_type))
                .collect(),
            scopes: config
                .scopes
                .iter()
                .map(|(scope, level)| format!("{scope}={level}"))
                .collect(),
            delay_injection: config.delay.is_some(),
        }),
    }
}

fn invalid(config_path: String, error: String) -> ValidationResult {
    ValidationResult {
        valid: false,
        config_path,
        error: Some(error),
        warnings: None,
        summary: None,
    }
}

/// Patterns are parsed by the dispatcher, so the loader cannot check them
fn check_patterns(config: &LoggerConfig) -> Result<(), String> {
    let sink_patterns = config
        .sinks
        .iter()
        .filter_map(|s| s.pattern.as_deref());
    for pattern in config.pattern.as_deref().into_iter().chain(sink_patterns) {
        Pattern::parse(pattern).map_err(|e| e.to_string())?;
    }
    Ok(())
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &LoggerConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.threshold == Level::Off && config.scopes.is_empty() {
        warnings.push("threshold is 'off' - only replay lines will be written".to_string());
    }

    let sink_names: HashSet<&str> = config.sinks.iter().map(|s| s.name.as_str()).collect();
    for scope in config.scopes.keys() {
        if !sink_names.contains(scope.as_str()) {
            warnings.push(format!(
                "scope '{scope}' has no sink of that name - its lines go to the default sink"
            ));
        }
    }

    let mut owners: HashMap<std::path::PathBuf, &str> = HashMap::new();
    for sink in config.sinks.iter().filter(|s| s.sink_type == SinkType::File) {
        if let Ok(file) = FileSinkConfig::from_params(&sink.params) {
            if let Some(other) = owners.insert(file.path.clone(), &sink.name) {
                warnings.push(format!(
                    "sinks '{other}' and '{}' write to the same file {}",
                    sink.name,
                    file.path.display()
                ));
            }
        }
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Threshold: {}", summary.threshold);
            println!("  Time granularity: {}", summary.time_granularity);
            println!("  Sinks: {}", summary.sinks.join(", "));
            if !summary.scopes.is_empty() {
                println!("  Scopes: {}", summary.scopes.join(", "));
            }
            if summary.delay_injection {
                println!("  Delay injection: enabled");
            }
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {warning}");
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {error}");
        }
    }
}
