//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约快照测试 (级别标签表)
//! - 配置 -> Logger -> 文件 的端到端流程
//! - 并发写入、默认 sink 回退、重复注册
//! - 延迟注入的确定性

#[cfg(test)]
mod contract_tests {
    use contracts::{Level, LogError, REPLAY_LABEL};

    #[test]
    fn test_label_round_trip() {
        for level in Level::all() {
            assert_eq!(Level::from_label(level.label()).unwrap(), level);
        }
        assert_eq!(
            Level::labels().collect::<Vec<_>>(),
            ["trace", "debug", "info", "warning", "error", "critical", "off"]
        );
    }

    #[test]
    fn test_replay_is_not_a_level() {
        assert!(matches!(
            Level::from_label(REPLAY_LABEL),
            Err(LogError::UnknownLevel { .. })
        ));
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::collections::HashMap;
    use std::fs;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;

    use config_loader::{ConfigFormat, ConfigLoader};
    use dispatcher::sinks::rotated_path;
    use dispatcher::{
        log_error, log_info, log_replay, log_warning, Level, LogError, Logger, MemorySink,
        TimeGranularity,
    };
    use tempfile::tempdir;

    /// Config file -> Logger -> rotating file sinks
    ///
    /// 验证完整的数据流：
    /// 1. ConfigLoader 解析并校验 TOML
    /// 2. Logger::from_config 打开文件 sink
    /// 3. 作用域阈值、格式模板、文件滚动生效
    #[test]
    fn test_config_to_files() {
        let dir = tempdir().unwrap();
        let net_log = dir.path().join("net.log");
        let app_log = dir.path().join("app.log");
        let content = format!(
            r#"
threshold = "warning"
time_granularity = "none"

[scopes]
net = "debug"

[[sinks]]
name = "default"
sink_type = "file"
[sinks.params]
path = "{}"

[[sinks]]
name = "net"
sink_type = "file"
pattern = "{{level}} {{sink}} {{message}}"
[sinks.params]
path = "{}"
max_rotated_files = "2"
"#,
            app_log.display(),
            net_log.display()
        );

        let config = ConfigLoader::load_from_str(&content, ConfigFormat::Toml).unwrap();
        let logger = Logger::from_config(&config).unwrap();
        logger.register_thread_name("e2e");

        log_info!(logger = logger, sink = "net"; "connected to {}", "10.0.0.1");
        log_info!(logger = logger; "hidden at warning");
        log_warning!(logger = logger; "disk at {}%", 91);
        logger.shutdown();

        assert_eq!(fs::read_to_string(&net_log).unwrap(), "info net connected to 10.0.0.1\n");
        let app = fs::read_to_string(&app_log).unwrap();
        assert_eq!(app.lines().count(), 1);
        assert!(app.starts_with("[warning] lib::test_config_to_files["), "{app}");
        assert!(app.ends_with("{e2e}: disk at 91%\n"), "{app}");
    }

    #[test]
    fn test_unwritable_path_fails_fast() {
        let dir = tempdir().unwrap();
        let content = format!(
            r#"
[[sinks]]
name = "default"
sink_type = "file"
[sinks.params]
path = "{}"
"#,
            dir.path().display()
        );
        let config = ConfigLoader::load_from_str(&content, ConfigFormat::Toml).unwrap();
        assert!(matches!(
            Logger::from_config(&config),
            Err(LogError::SinkOpen { .. })
        ));
    }

    #[test]
    fn test_rotation_through_logger() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("big.log");
        let logger = Logger::with_default_sink(MemorySink::new());
        logger.set_time_granularity(TimeGranularity::None);
        logger.register_file_sink(&path, "big", 1, 2).unwrap();
        logger.set_sink_pattern("big", "{message}").unwrap();

        // 5 lines of 300 KiB overflow a 1 MiB file once
        let payload = "x".repeat(300 * 1024);
        for _ in 0..5 {
            log_error!(logger = logger, sink = "big"; "{payload}");
        }
        logger.shutdown();

        assert_eq!(fs::read_to_string(&path).unwrap().lines().count(), 2);
        assert_eq!(
            fs::read_to_string(rotated_path(&path, 1)).unwrap().lines().count(),
            3
        );
        assert!(!rotated_path(&path, 2).exists());
    }

    /// N threads x M lines: every line arrives whole and per-thread order is kept
    #[test]
    fn test_concurrent_writers_to_file() {
        const THREADS: usize = 8;
        const LINES: usize = 250;

        let dir = tempdir().unwrap();
        let path = dir.path().join("shared.log");
        let logger = Logger::with_default_sink(MemorySink::new());
        logger.register_file_sink(&path, "shared", 5, 1).unwrap();
        logger.set_sink_pattern("shared", "{thread}|{message}").unwrap();
        logger.enable_delay(30, 11);

        thread::scope(|scope| {
            for t in 0..THREADS {
                let logger = &logger;
                scope.spawn(move || {
                    logger.register_thread_name(format!("w{t}"));
                    for i in 0..LINES {
                        log_error!(logger = logger, sink = "shared"; "{t}:{i}");
                    }
                });
            }
        });
        logger.flush();

        let content = fs::read_to_string(&path).unwrap();
        let mut next = [0usize; THREADS];
        for line in content.lines() {
            let (thread, message) = line.split_once('|').unwrap();
            let (t, i) = message.split_once(':').unwrap();
            let t: usize = t.parse().unwrap();
            assert_eq!(thread, format!("w{t}"));
            assert_eq!(i.parse::<usize>().unwrap(), next[t], "thread {t} out of order");
            next[t] += 1;
        }
        assert_eq!(next, [LINES; THREADS]);
        assert_eq!(logger.injected_delays(), (THREADS * LINES) as u64);
    }

    #[test]
    fn test_fallback_keeps_line() {
        let fallback = MemorySink::new();
        let broken = MemorySink::labeled("broken");
        broken.set_broken(true);

        let logger = Logger::with_default_sink(fallback.clone());
        logger.register_custom_sink("net", broken.clone());

        log_error!(logger = logger, sink = "net"; "first");
        broken.set_broken(false);
        log_error!(logger = logger, sink = "net"; "second");

        assert_eq!(fallback.len(), 1);
        assert!(fallback.lines()[0].ends_with("first"));
        assert_eq!(broken.lines().len(), 1);
        assert!(broken.lines()[0].ends_with("second"));
    }

    #[test]
    fn test_file_reregistration_is_idempotent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("again.log");
        let logger = Logger::with_default_sink(MemorySink::new());

        for round in 0..3 {
            logger.register_file_sink(&path, "again", 5, 3).unwrap();
            log_error!(logger = logger, sink = "again"; "round {round}");
        }
        logger.shutdown();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 3);
    }

    /// Registration racing with writers: every line is whole and lands
    /// either on the default sink or on the "net" destinations, never both
    #[test]
    fn test_registration_races_with_writers() {
        const THREADS: usize = 4;
        const LINES: usize = 300;

        let dir = tempdir().unwrap();
        let first = dir.path().join("net-a.log");
        let second = dir.path().join("net-b.log");
        let fallback = MemorySink::labeled("fallback");
        let captured = MemorySink::labeled("net");

        let logger = Logger::with_default_sink(fallback.clone());
        logger.set_default_pattern("{message}").unwrap();
        let done = AtomicBool::new(false);

        thread::scope(|scope| {
            let registrar = {
                let (logger, done) = (&logger, &done);
                let (first, second, captured) = (&first, &second, &captured);
                scope.spawn(move || {
                    let mut rounds = 0;
                    while !done.load(Ordering::Acquire) || rounds == 0 {
                        logger.register_file_sink(first, "net", 5, 1).unwrap();
                        logger.register_file_sink(first, "net", 5, 1).unwrap();
                        logger.register_file_sink(second, "net", 5, 1).unwrap();
                        logger.register_custom_sink("net", captured.clone());
                        thread::yield_now();
                        assert!(logger.unregister_sink("net").unwrap());
                        rounds += 1;
                    }
                })
            };

            let writers: Vec<_> = (0..THREADS)
                .map(|t| {
                    let logger = &logger;
                    scope.spawn(move || {
                        for i in 0..LINES {
                            log_error!(logger = logger, sink = "net"; "{t}:{i}");
                        }
                    })
                })
                .collect();
            for writer in writers {
                writer.join().unwrap();
            }
            done.store(true, Ordering::Release);
            registrar.join().unwrap();
        });
        logger.shutdown();

        // message -> (default hits, net hits per destination)
        let mut seen: HashMap<String, (usize, [usize; 3])> = HashMap::new();
        let file_lines = |path: &std::path::Path| -> Vec<String> {
            fs::read_to_string(path)
                .map(|c| c.lines().map(str::to_string).collect())
                .unwrap_or_default()
        };
        for line in fallback.lines() {
            seen.entry(line).or_default().0 += 1;
        }
        let net_sources = [
            file_lines(first.as_path()),
            file_lines(second.as_path()),
            captured.lines(),
        ];
        for (slot, lines) in net_sources.into_iter().enumerate() {
            for line in lines {
                seen.entry(line).or_default().1[slot] += 1;
            }
        }

        assert_eq!(seen.len(), THREADS * LINES);
        for (line, (default_hits, net_hits)) in &seen {
            let (t, i) = line.split_once(':').unwrap_or_else(|| panic!("torn line {line:?}"));
            assert!(t.parse::<usize>().unwrap() < THREADS, "{line:?}");
            assert!(i.parse::<usize>().unwrap() < LINES, "{line:?}");

            assert!(net_hits.iter().all(|&hits| hits <= 1), "{line:?} duplicated: {net_hits:?}");
            let on_net = net_hits.iter().any(|&hits| hits == 1);
            assert!(
                (*default_hits == 1) ^ on_net,
                "{line:?} default={default_hits} net={net_hits:?}"
            );
        }
    }

    #[test]
    fn test_replay_bypasses_off_threshold() {
        let probe = MemorySink::new();
        let logger = Logger::with_default_sink(probe.clone());
        logger.set_threshold(Level::Off);

        log_error!(logger = logger; "suppressed");
        log_replay!(logger = logger; "frame={}", 12);

        assert_eq!(
            probe.lines(),
            ["[replay] test_replay_bypasses_off_threshold: frame=12"]
        );
    }

    /// 相同种子 + 相同调用序列 => 相同延迟序列
    #[test]
    fn test_delay_sequence_is_reproducible() {
        let draw = |seed| {
            let mut injector = dispatcher::DelayInjector::new(1_000, seed);
            (0..64).map(|_| injector.next_delay()).collect::<Vec<_>>()
        };
        assert_eq!(draw(5), draw(5));
        assert_ne!(draw(5), draw(6));
        assert!(draw(5).iter().all(|d| d.as_micros() <= 1_000));
    }
}
