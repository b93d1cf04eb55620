//! Logging macros
//!
//! Every macro captures `file!()`, `line!()` and the enclosing function, then
//! forwards to a [`Logger`](crate::Logger). Accepted forms:
//!
//! ```text
//! log_info!("fmt", args..)                          process-wide logger, "default"
//! log_info!(sink = "net"; "fmt", args..)            process-wide logger, named sink
//! log_info!(logger = l; "fmt", args..)              explicit logger or SinkHandle
//! log_info!(logger = l, sink = "net"; "fmt", args..)
//! ```

/// Path of the enclosing function, e.g. `app::net::Conn::open`
#[macro_export]
macro_rules! function_name {
    () => {{
        fn __loghub_probe() {}
        fn __loghub_type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        let name = __loghub_type_name_of(__loghub_probe);
        name.strip_suffix("::__loghub_probe").unwrap_or(name)
    }};
}

/// [`SourceLocation`](crate::SourceLocation) of the call site
#[macro_export]
macro_rules! source_location {
    () => {
        $crate::SourceLocation::new(::std::file!(), $crate::function_name!(), ::std::line!())
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __log {
    ($method:ident, $method_to:ident, [$($lead:expr),*]; logger = $logger:expr, sink = $sink:expr; $($arg:tt)+) => {
        $logger.$method_to($sink, $($lead,)* ::std::format_args!($($arg)+), &$crate::source_location!())
    };
    ($method:ident, $method_to:ident, [$($lead:expr),*]; logger = $logger:expr; $($arg:tt)+) => {
        $logger.$method($($lead,)* ::std::format_args!($($arg)+), &$crate::source_location!())
    };
    ($method:ident, $method_to:ident, [$($lead:expr),*]; sink = $sink:expr; $($arg:tt)+) => {
        $crate::global().$method_to($sink, $($lead,)* ::std::format_args!($($arg)+), &$crate::source_location!())
    };
    ($method:ident, $method_to:ident, [$($lead:expr),*]; $($arg:tt)+) => {
        $crate::global().$method($($lead,)* ::std::format_args!($($arg)+), &$crate::source_location!())
    };
}

#[macro_export]
macro_rules! log_trace {
    ($($arg:tt)+) => { $crate::__log!(log, log_to, [$crate::Level::Trace]; $($arg)+) };
}

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)+) => { $crate::__log!(log, log_to, [$crate::Level::Debug]; $($arg)+) };
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)+) => { $crate::__log!(log, log_to, [$crate::Level::Info]; $($arg)+) };
}

#[macro_export]
macro_rules! log_warning {
    ($($arg:tt)+) => { $crate::__log!(log, log_to, [$crate::Level::Warn]; $($arg)+) };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)+) => { $crate::__log!(log, log_to, [$crate::Level::Error]; $($arg)+) };
}

/// Logs at `critical`, flushes every sink and aborts the process
#[macro_export]
macro_rules! log_critical {
    ($($arg:tt)+) => { $crate::__log!(critical, critical_to, []; $($arg)+) };
}

/// Writes `[replay] <function>: <message>` whatever the thresholds
#[macro_export]
macro_rules! log_replay {
    ($($arg:tt)+) => { $crate::__log!(replay, replay_to, []; $($arg)+) };
}
