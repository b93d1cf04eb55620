//! 配置校验模块
//!
//! 校验规则：
//! - 存在名为 `default` 的 sink
//! - sink 名称非空且唯一
//! - file sink 参数合法 (`path` 必填, 数值可解析, `max_size_mib > 0`)
//! - 作用域名称非空
//! - 延迟上限 > 0

use std::collections::HashSet;

use contracts::{FileSinkConfig, LogError, LoggerConfig, SinkType, DEFAULT_SINK};

/// 校验 LoggerConfig 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(config: &LoggerConfig) -> Result<(), LogError> {
    validate_sink_names(config)?;
    validate_default_sink(config)?;
    validate_file_params(config)?;
    validate_scopes(config)?;
    validate_delay(config)?;
    Ok(())
}

/// 校验 sink 名称非空且唯一
fn validate_sink_names(config: &LoggerConfig) -> Result<(), LogError> {
    let mut seen = HashSet::new();
    for (idx, sink) in config.sinks.iter().enumerate() {
        if sink.name.trim().is_empty() {
            return Err(LogError::config_validation(
                format!("sinks[{idx}].name"),
                "sink name cannot be empty",
            ));
        }
        if !seen.insert(sink.name.as_str()) {
            return Err(LogError::config_validation(
                format!("sinks[name={}]", sink.name),
                "duplicate sink name",
            ));
        }
    }
    Ok(())
}

/// 校验默认 sink 存在
fn validate_default_sink(config: &LoggerConfig) -> Result<(), LogError> {
    match config.sink(DEFAULT_SINK) {
        Some(_) => Ok(()),
        None => Err(LogError::MissingDefaultSink),
    }
}

/// 校验 file sink 参数
fn validate_file_params(config: &LoggerConfig) -> Result<(), LogError> {
    for sink in config.sinks.iter().filter(|s| s.sink_type == SinkType::File) {
        FileSinkConfig::from_params(&sink.params).map_err(|e| match e {
            LogError::ConfigValidation { field, message } => {
                LogError::config_validation(format!("sinks[{}].{field}", sink.name), message)
            }
            other => other,
        })?;
    }
    Ok(())
}

/// 校验作用域名称
fn validate_scopes(config: &LoggerConfig) -> Result<(), LogError> {
    if config.scopes.keys().any(|scope| scope.trim().is_empty()) {
        return Err(LogError::config_validation(
            "scopes",
            "scope name cannot be empty",
        ));
    }
    Ok(())
}

/// 校验延迟注入配置
fn validate_delay(config: &LoggerConfig) -> Result<(), LogError> {
    match config.delay {
        Some(delay) if delay.max_delay_micros == 0 => Err(LogError::config_validation(
            "delay.max_delay_micros",
            "max_delay_micros must be > 0, omit [delay] to disable",
        )),
        _ => Ok(()),
    }
}
