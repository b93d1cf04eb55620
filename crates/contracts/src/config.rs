//! LoggerConfig - Config Loader 输出
//!
//! 描述完整的日志配置：全局/作用域阈值、时间精度、格式、刷新策略、延迟注入、输出路由。

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::{Level, LogError};

/// 默认 sink 名称，未知名称的日志都会路由到这里
pub const DEFAULT_SINK: &str = "default";

/// 未设置作用域阈值时使用的全局阈值
pub const DEFAULT_THRESHOLD: Level = Level::Warn;

/// 配置版本
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// 完整的日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggerConfig {
    /// 配置版本
    #[serde(default)]
    pub version: ConfigVersion,

    /// 全局阈值
    #[serde(default = "default_threshold")]
    pub threshold: Level,

    /// 作用域 (sink 名称) -> 阈值
    #[serde(default)]
    pub scopes: BTreeMap<String, Level>,

    /// 时间戳精度
    #[serde(default)]
    pub time_granularity: TimeGranularity,

    /// 默认格式模板 (None = 内置布局)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    /// 周期刷新间隔 (秒)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flush_interval_secs: Option<u64>,

    /// 达到该级别时立即刷新
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flush_level: Option<Level>,

    /// 延迟注入 (仅用于测试)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<DelayConfig>,

    /// 输出路由配置
    #[serde(default = "default_sinks")]
    pub sinks: Vec<SinkConfig>,
}

fn default_threshold() -> Level {
    DEFAULT_THRESHOLD
}

fn default_sinks() -> Vec<SinkConfig> {
    vec![SinkConfig::stdout(DEFAULT_SINK)]
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            version: ConfigVersion::default(),
            threshold: DEFAULT_THRESHOLD,
            scopes: BTreeMap::new(),
            time_granularity: TimeGranularity::default(),
            pattern: None,
            flush_interval_secs: None,
            flush_level: None,
            delay: None,
            sinks: default_sinks(),
        }
    }
}

impl LoggerConfig {
    /// 查找指定名称的 sink 配置
    pub fn sink(&self, name: &str) -> Option<&SinkConfig> {
        self.sinks.iter().find(|s| s.name == name)
    }
}

/// 时间戳精度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeGranularity {
    /// 不输出时间戳
    None,
    /// 整秒
    Seconds,
    /// 毫秒 (补零到 3 位)
    #[default]
    Milliseconds,
}

impl TimeGranularity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Seconds => "seconds",
            Self::Milliseconds => "milliseconds",
        }
    }
}

impl fmt::Display for TimeGranularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeGranularity {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "seconds" => Ok(Self::Seconds),
            "milliseconds" => Ok(Self::Milliseconds),
            other => Err(LogError::config_validation(
                "time_granularity",
                format!("expected none|seconds|milliseconds, got '{other}'"),
            )),
        }
    }
}

/// 延迟注入配置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayConfig {
    /// 单次延迟上限 (微秒)
    pub max_delay_micros: u64,

    /// 随机种子
    #[serde(default)]
    pub seed: u64,
}

/// Sink 输出配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Sink 名称
    pub name: String,

    /// Sink 类型
    pub sink_type: SinkType,

    /// 该 sink 专用格式模板
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    /// 该 sink 专用刷新级别
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flush_level: Option<Level>,

    /// 类型特定参数
    #[serde(default)]
    pub params: HashMap<String, String>,
}

impl SinkConfig {
    /// 标准输出 sink
    pub fn stdout(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sink_type: SinkType::Stdout,
            pattern: None,
            flush_level: None,
            params: HashMap::new(),
        }
    }

    /// 文件 sink
    pub fn file(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        let path: PathBuf = path.into();
        let mut params = HashMap::new();
        params.insert("path".to_string(), path.display().to_string());
        Self {
            name: name.into(),
            sink_type: SinkType::File,
            pattern: None,
            flush_level: None,
            params,
        }
    }
}

/// Sink 类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkType {
    /// 标准输出
    Stdout,
    /// 标准错误
    Stderr,
    /// 滚动文件
    File,
}

/// 滚动文件 sink 参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSinkConfig {
    /// 日志文件路径
    pub path: PathBuf,
    /// 单个文件大小上限 (MiB)
    pub max_size_mib: u64,
    /// 保留的历史文件数量
    pub max_rotated_files: usize,
    /// 打开时先滚动已有文件
    pub rotate_on_open: bool,
}

impl FileSinkConfig {
    pub const DEFAULT_MAX_SIZE_MIB: u64 = 5;
    pub const DEFAULT_MAX_ROTATED_FILES: usize = 3;

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_size_mib: Self::DEFAULT_MAX_SIZE_MIB,
            max_rotated_files: Self::DEFAULT_MAX_ROTATED_FILES,
            rotate_on_open: false,
        }
    }

    pub fn with_limits(mut self, max_size_mib: u64, max_rotated_files: usize) -> Self {
        self.max_size_mib = max_size_mib;
        self.max_rotated_files = max_rotated_files;
        self
    }

    /// 文件大小上限 (字节)
    pub fn max_bytes(&self) -> u64 {
        self.max_size_mib.saturating_mul(1024 * 1024)
    }

    /// 从参数表解析
    ///
    /// 必填 `path`；可选 `max_size_mib` (默认 5)、`max_rotated_files` (默认 3)、
    /// `rotate_on_open` (默认 false)。
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, LogError> {
        let path = params
            .get("path")
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| LogError::config_validation("params.path", "file sink requires 'path'"))?;

        let max_size_mib = parse_param(params, "max_size_mib", Self::DEFAULT_MAX_SIZE_MIB)?;
        if max_size_mib == 0 {
            return Err(LogError::config_validation(
                "params.max_size_mib",
                "max_size_mib must be > 0",
            ));
        }

        Ok(Self {
            path: PathBuf::from(path),
            max_size_mib,
            max_rotated_files: parse_param(
                params,
                "max_rotated_files",
                Self::DEFAULT_MAX_ROTATED_FILES,
            )?,
            rotate_on_open: parse_param(params, "rotate_on_open", false)?,
        })
    }
}

fn parse_param<T>(params: &HashMap<String, String>, key: &str, default: T) -> Result<T, LogError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match params.get(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e| {
            LogError::config_validation(format!("params.{key}"), format!("invalid value '{raw}': {e}"))
        }),
    }
}
