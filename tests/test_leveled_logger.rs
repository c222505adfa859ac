use std::fs;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Arc, Barrier};
use std::thread;

use levelgate::exceptions::LevelGateResult;
use levelgate::sinks::Sink;
use levelgate::{
    EncoderConfig, Field, Level, LeveledLog, LeveledLogger, LogConfig, LogFormat, Logger, Severity,
};
use tempfile::TempDir;

fn file_logger(dir: &Path) -> LeveledLogger {
    LeveledLogger::with_config(LogConfig {
        log_dir: dir.to_path_buf(),
        log_file: "app.log".to_string(),
        ..LogConfig::default()
    })
}

fn log_path(dir: &TempDir) -> PathBuf {
    dir.path().join("app.log")
}

fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn test_gate_threshold_property() {
    let logger = LeveledLogger::with_config(LogConfig {
        to_stderr: true,
        ..LogConfig::default()
    });

    for l1 in -3..8 {
        for l2 in l1..8 {
            logger.set_level(Level(l1));
            assert!(logger.v(Level(l2)).is_enabled(), "gate {} v({})", l1, l2);
            logger.set_level(Level(l2 + 1));
            assert!(!logger.v(Level(l2)).is_enabled(), "gate {} v({})", l2 + 1, l2);
        }
    }
}

#[test]
fn test_warn_gate_writes_one_error_record() -> LevelGateResult<()> {
    let dir = TempDir::new()?;
    let logger = file_logger(dir.path());
    logger.set_level(Level::WARN);

    assert!(!logger.v(Level::DEBUG).is_enabled());
    let handle = logger.v(Level::ERROR);
    assert!(handle.is_enabled());
    assert_eq!(handle.level(), Level::ERROR);

    handle.info("disk full", &[Field::string("mount", "/data")]);
    logger.flush()?;

    let lines = read_lines(&log_path(&dir));
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("disk full"));
    assert!(lines[0].contains("mount=/data"));
    assert!(lines[0].contains("v=2"));
    Ok(())
}

#[test]
fn test_disabled_handle_writes_nothing() -> LevelGateResult<()> {
    let dir = TempDir::new()?;
    let logger = file_logger(dir.path());
    logger.set_level(Level(Level::FATAL.get() + 1));

    logger.v(Level::INFO).info("dropped", &[]);
    logger.v(Level::PANIC).panic("dropped", &[]);
    logger.v(Level::FATAL).fatal("dropped", &[]);
    logger.v(Level::ERROR).write(Severity::Info, "dropped", &[]);

    assert!(!logger.is_built());
    assert!(!log_path(&dir).exists());
    Ok(())
}

#[test]
fn test_level_change_applies_to_next_call() -> LevelGateResult<()> {
    let dir = TempDir::new()?;
    let logger = file_logger(dir.path());

    logger.v(Level::DEBUG).info("before", &[]);
    logger.set_level(Level::DEBUG);
    logger.v(Level::DEBUG).info("after", &[]);
    logger.flush()?;

    let lines = read_lines(&log_path(&dir));
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("after"));
    Ok(())
}

#[test]
fn test_flush_before_any_write() -> LevelGateResult<()> {
    let dir = TempDir::new()?;
    let logger = file_logger(dir.path());
    assert!(!logger.is_built());
    logger.flush()?;
    assert!(logger.is_built());
    Ok(())
}

#[test]
fn test_concurrent_first_use_builds_one_logger() {
    let logger = Arc::new(LeveledLogger::with_config(LogConfig {
        to_stderr: true,
        ..LogConfig::default()
    }));
    let threads = 16;
    let barrier = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let logger = Arc::clone(&logger);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                logger.logger() as *const Logger as usize
            })
        })
        .collect();

    let addresses: Vec<usize> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();
    assert!(addresses.iter().all(|address| *address == addresses[0]));
    assert!(std::ptr::eq(
        logger.logger(),
        addresses[0] as *const Logger
    ));
}

#[test]
fn test_concurrent_writes_and_level_changes() -> LevelGateResult<()> {
    let dir = TempDir::new()?;
    let logger = Arc::new(file_logger(dir.path()));
    logger.set_level(Level::INFO);

    thread::scope(|scope| {
        for worker in 0..4 {
            let logger = Arc::clone(&logger);
            scope.spawn(move || {
                for i in 0..50 {
                    logger
                        .v(Level::ERROR)
                        .info("worker record", &[Field::int("worker", worker), Field::int("i", i)]);
                }
            });
        }
        let logger = Arc::clone(&logger);
        scope.spawn(move || {
            for i in 0..100 {
                logger.set_level(Level(i % 3));
            }
        });
    });
    logger.flush()?;

    let lines = read_lines(&log_path(&dir));
    assert_eq!(lines.len(), 200);
    assert!(lines.iter().all(|line| line.contains("worker record")));
    Ok(())
}

#[test]
fn test_add_caller_skip_is_additive() {
    let logger = LeveledLogger::new();
    let initial = logger.caller_skip();
    logger.add_caller_skip(2);
    logger.add_caller_skip(3);
    assert_eq!(logger.caller_skip(), initial + 5);
    logger.add_caller_skip(0);
    assert_eq!(logger.caller_skip(), initial + 5);
}

#[test]
fn test_caller_annotation() -> LevelGateResult<()> {
    let dir = TempDir::new()?;
    let logger = file_logger(dir.path());
    logger.v(Level::INFO).info("annotated", &[]);
    logger.flush()?;

    let lines = read_lines(&log_path(&dir));
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("caller="));
    assert!(lines[0].contains("test_leveled_logger.rs:"));
    Ok(())
}

#[test]
fn test_caller_skip_leaves_caller_field_at_call_site() -> LevelGateResult<()> {
    let dir = TempDir::new()?;
    let logger = file_logger(dir.path());
    logger.add_caller_skip(5);

    let line = line!() + 1;
    logger.v(Level::INFO).info("skipped frames", &[]);
    logger.flush()?;

    let lines = read_lines(&log_path(&dir));
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains(&format!("test_leveled_logger.rs:{}", line)));
    Ok(())
}

#[test]
fn test_caller_annotation_disabled() -> LevelGateResult<()> {
    let dir = TempDir::new()?;
    let logger = file_logger(dir.path());
    logger.configure(|config| config.add_caller = false);
    logger.v(Level::INFO).info("plain", &[]);
    logger.flush()?;

    let lines = read_lines(&log_path(&dir));
    assert_eq!(lines.len(), 1);
    assert!(!lines[0].contains("caller="));
    Ok(())
}

#[test]
fn test_custom_encoder_before_first_use() -> LevelGateResult<()> {
    let dir = TempDir::new()?;
    let logger = file_logger(dir.path());
    logger.set_encoder_config(EncoderConfig {
        format: LogFormat::Json,
        ..EncoderConfig::production()
    });
    logger.v(Level::INFO).info("json record", &[]);
    logger.flush()?;

    let lines = read_lines(&log_path(&dir));
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with('{'));
    assert!(lines[0].contains("\"message\":\"json record\""));
    Ok(())
}

#[test]
fn test_encoder_change_after_first_use_is_not_applied() -> LevelGateResult<()> {
    let dir = TempDir::new()?;
    let logger = file_logger(dir.path());
    logger.v(Level::INFO).info("first", &[]);
    logger.set_encoder_config(EncoderConfig {
        format: LogFormat::Json,
        ..EncoderConfig::production()
    });
    logger.v(Level::INFO).info("second", &[]);
    logger.flush()?;

    let lines = read_lines(&log_path(&dir));
    assert_eq!(lines.len(), 2);
    assert!(lines.iter().all(|line| !line.starts_with('{')));
    Ok(())
}

#[test]
fn test_default_timestamp_is_iso8601() -> LevelGateResult<()> {
    let dir = TempDir::new()?;
    let logger = file_logger(dir.path());
    logger.v(Level::INFO).info("stamped", &[]);
    logger.flush()?;

    let lines = read_lines(&log_path(&dir));
    let stamp: Vec<char> = lines[0].chars().take(19).collect();
    assert_eq!(stamp[4], '-');
    assert_eq!(stamp[7], '-');
    assert_eq!(stamp[10], 'T');
    assert_eq!(stamp[13], ':');
    assert_eq!(stamp[16], ':');
    Ok(())
}

#[test]
fn test_sink_topologies() -> LevelGateResult<()> {
    let dir = TempDir::new()?;

    let console = file_logger(dir.path());
    console.configure(|config| config.to_stderr = true);
    assert!(matches!(console.logger().sinks(), [Sink::Stderr]));

    let file = file_logger(dir.path());
    match file.logger().sinks() {
        [Sink::File(sink)] => assert_eq!(sink.path(), log_path(&dir)),
        other => panic!("unexpected sinks: {:?}", other),
    }

    let tee = file_logger(dir.path());
    tee.configure(|config| config.also_to_stderr = true);
    assert!(matches!(tee.logger().sinks(), [Sink::File(_), Sink::Stderr]));
    tee.v(Level::INFO).info("teed", &[]);
    tee.flush()?;
    assert!(read_lines(&log_path(&dir))
        .iter()
        .any(|line| line.contains("teed")));

    // Console-only mode takes precedence over tee.
    let both = file_logger(dir.path());
    both.configure(|config| {
        config.to_stderr = true;
        config.also_to_stderr = true;
    });
    assert!(matches!(both.logger().sinks(), [Sink::Stderr]));
    Ok(())
}

#[test]
fn test_panic_writes_record_with_stacktrace() -> LevelGateResult<()> {
    let dir = TempDir::new()?;
    let logger = file_logger(dir.path());

    let result = catch_unwind(AssertUnwindSafe(|| {
        logger.v(Level::PANIC).panic("unrecoverable state", &[Field::bool("fatal", false)]);
    }));
    assert!(result.is_err());
    logger.flush()?;

    let contents = fs::read_to_string(log_path(&dir))?;
    assert!(contents.contains("unrecoverable state"));
    assert!(contents.contains("severity=\"PANIC\""));
    assert!(contents.contains("stacktrace="));
    Ok(())
}

#[test]
fn test_panic_through_write() {
    let logger = LeveledLogger::with_config(LogConfig {
        to_stderr: true,
        ..LogConfig::default()
    });
    let result = catch_unwind(AssertUnwindSafe(|| {
        logger.v(Level::INFO).write(Severity::Panic, "tagged panic", &[]);
    }));
    let payload = result.unwrap_err();
    let message = payload
        .downcast_ref::<String>()
        .cloned()
        .unwrap_or_default();
    assert_eq!(message, "tagged panic");
}

fn report_startup(log: &dyn LeveledLog) -> LevelGateResult<()> {
    log.set_level(Level::WARN);
    log.add_caller_skip(1);
    log.v(Level::INFO).info("hidden startup detail", &[]);
    log.v(Level::ERROR).info("startup failed", &[Field::uint("retries", 3)]);
    log.flush()
}

#[test]
fn test_logger_used_through_trait_object() -> LevelGateResult<()> {
    let dir = TempDir::new()?;
    let logger = file_logger(dir.path());
    let initial_skip = logger.caller_skip();

    report_startup(&logger)?;

    assert_eq!(logger.level(), Level::WARN);
    assert_eq!(logger.caller_skip(), initial_skip + 1);
    let lines = read_lines(&log_path(&dir));
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("startup failed"));
    assert!(lines[0].contains("retries=3"));
    Ok(())
}

const FATAL_CHILD_DIR: &str = "LEVELGATE_TEST_FATAL_CHILD_DIR";

#[test]
fn test_fatal_writes_record_then_exits() -> LevelGateResult<()> {
    // Re-run as a child process, since fatal ends the process.
    if let Ok(dir) = std::env::var(FATAL_CHILD_DIR) {
        let logger = file_logger(Path::new(&dir));
        logger
            .v(Level::FATAL)
            .fatal("cannot continue", &[Field::int("code", 7)]);
        panic!("fatal returned to its caller");
    }

    let dir = TempDir::new()?;
    let status = Command::new(std::env::current_exe()?)
        .arg("test_fatal_writes_record_then_exits")
        .arg("--exact")
        .arg("--nocapture")
        .env(FATAL_CHILD_DIR, dir.path())
        .status()?;
    assert_eq!(status.code(), Some(1));

    let contents = fs::read_to_string(log_path(&dir))?;
    assert!(contents.contains("cannot continue"));
    assert!(contents.contains("code=7"));
    assert!(contents.contains("severity=\"FATAL\""));
    assert!(contents.contains("stacktrace="));
    Ok(())
}
