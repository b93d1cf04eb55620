//! # Config Loader
//!
//! 日志配置加载模块。
//!
//! 负责：
//! - 解析 TOML/JSON 配置文件
//! - 校验配置合法性
//! - 生成 `LoggerConfig`
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let config = ConfigLoader::load_from_path(Path::new("loghub.toml")).unwrap();
//! println!("threshold: {}", config.threshold);
//! ```

mod parser;
mod validator;

pub use contracts::LoggerConfig;
pub use parser::ConfigFormat;

use contracts::LogError;
use std::path::Path;
use tracing::{debug, instrument};

/// Configuration loader
///
/// Provides static methods to load configuration from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file path
    ///
    /// Format is taken from the file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    #[instrument(name = "config_load_from_path", skip(path), fields(path = %path.display()))]
    pub fn load_from_path(path: &Path) -> Result<LoggerConfig, LogError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        Self::load_from_str(&content, format)
    }

    /// Load configuration from string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(content: &str, format: ConfigFormat) -> Result<LoggerConfig, LogError> {
        let config = parser::parse(content, format)?;
        validator::validate(&config)?;
        debug!(sinks = config.sinks.len(), ?format, "Config loaded");
        Ok(config)
    }

    /// Serialize LoggerConfig to TOML string
    pub fn to_toml(config: &LoggerConfig) -> Result<String, LogError> {
        toml::to_string_pretty(config)
            .map_err(|e| LogError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize LoggerConfig to JSON string
    pub fn to_json(config: &LoggerConfig) -> Result<String, LogError> {
        serde_json::to_string_pretty(config)
            .map_err(|e| LogError::config_parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    /// Infer configuration format from file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, LogError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| LogError::config_parse("cannot determine file format from extension"))?;

        ConfigFormat::from_extension(ext)
            .ok_or_else(|| LogError::config_parse(format!("unsupported config format: .{ext}")))
    }

    fn read_file(path: &Path) -> Result<String, LogError> {
        Ok(std::fs::read_to_string(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{Level, SinkType, TimeGranularity};

    const FULL_TOML: &str = r#"
threshold = "info"
time_granularity = "seconds"
pattern = "{time} [{level}] {message}"
flush_interval_secs = 2
flush_level = "error"

[scopes]
net = "debug"

[delay]
max_delay_micros = 200
seed = 7

[[sinks]]
name = "default"
sink_type = "stdout"

[[sinks]]
name = "net"
sink_type = "file"
pattern = "{level} {message}"
flush_level = "warning"
[sinks.params]
path = "logs/net.log"
max_size_mib = "2"
max_rotated_files = "4"
"#;

    #[test]
    fn test_load_from_str_toml() {
        let result = ConfigLoader::load_from_str(FULL_TOML, ConfigFormat::Toml);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.threshold, Level::Info);
        assert_eq!(config.time_granularity, TimeGranularity::Seconds);
        assert_eq!(config.scopes.get("net"), Some(&Level::Debug));
        assert_eq!(config.delay.map(|d| d.seed), Some(7));

        let net = config.sink("net").unwrap();
        assert_eq!(net.sink_type, SinkType::File);
        assert_eq!(net.flush_level, Some(Level::Warn));
    }

    #[test]
    fn test_round_trip_toml() {
        let config = ConfigLoader::load_from_str(FULL_TOML, ConfigFormat::Toml).unwrap();
        let serialized = ConfigLoader::to_toml(&config).unwrap();
        let again = ConfigLoader::load_from_str(&serialized, ConfigFormat::Toml).unwrap();
        assert_eq!(again.threshold, config.threshold);
        assert_eq!(again.sinks.len(), config.sinks.len());
        assert_eq!(again.pattern, config.pattern);
    }

    #[test]
    fn test_round_trip_json() {
        let config = ConfigLoader::load_from_str(FULL_TOML, ConfigFormat::Toml).unwrap();
        let json = ConfigLoader::to_json(&config).unwrap();
        assert!(json.contains("\"warning\""));
        let again = ConfigLoader::load_from_str(&json, ConfigFormat::Json).unwrap();
        assert_eq!(again.scopes, config.scopes);
    }

    #[test]
    fn test_validation_runs_after_parse() {
        let content = r#"
[[sinks]]
name = "net"
sink_type = "stdout"
"#;
        let result = ConfigLoader::load_from_str(content, ConfigFormat::Toml);
        assert!(matches!(result, Err(LogError::MissingDefaultSink)));
    }

    #[test]
    fn test_load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("loghub.toml");
        std::fs::write(&path, FULL_TOML).unwrap();
        let config = ConfigLoader::load_from_path(&path).unwrap();
        assert_eq!(config.sinks.len(), 2);

        let bad = dir.path().join("loghub.yaml");
        std::fs::write(&bad, "").unwrap();
        let err = ConfigLoader::load_from_path(&bad).unwrap_err();
        assert!(err.to_string().contains("unsupported config format"));
    }
}
