//! # Dispatcher
//!
//! 日志注册表与分发引擎。
//!
//! 负责：
//! - 维护 sink 名称 -> 输出目标的注册表 (`"default"` 始终存在)
//! - 按全局/作用域阈值过滤日志
//! - 格式化日志行 (时间、级别、位置、线程名、消息)
//! - 写入失败时回退到默认 sink
//! - 测试用的随机延迟注入
//!
//! ```no_run
//! use dispatcher::{log_error, log_info, Level};
//!
//! dispatcher::global().set_threshold(Level::Info);
//! dispatcher::global().register_thread_name("main");
//! log_info!("starting {} workers", 4);
//! log_error!(sink = "net"; "connection refused");
//! dispatcher::shutdown();
//! ```

#[macro_use]
mod macros;

pub mod delay;
pub mod formatter;
pub mod global;
pub mod handle;
pub mod logger;
pub mod metrics;
pub mod policy;
pub mod registry;
pub mod sinks;

pub use contracts::{
    FileSinkConfig, Level, LineSink, LogError, LoggerConfig, SinkConfig, SinkType,
    SourceLocation, TimeGranularity, DEFAULT_SINK, DEFAULT_THRESHOLD,
};
pub use delay::DelayInjector;
pub use formatter::{simplify_file_name, simplify_function_name, Pattern, UNKNOWN_THREAD};
pub use global::{global, install, shutdown};
pub use handle::SinkHandle;
pub use logger::Logger;
pub use metrics::{MetricsSnapshot, SinkMetrics};
pub use registry::Delivery;
pub use sinks::{ConsoleSink, MemorySink, RotatingFileSink};
