//! ## Logger configuration
//!
//! [`LogConfig`] collects everything the logger factory needs to build the underlying
//! logger: destination flags, the file location, rotation limits, and the encoder.
//! [`LogFlags`] is the command-line face of the same settings, built with `clap` so
//! applications can flatten it into their own argument parser.
//!
//! Destination, file, and encoder settings are read once, when the logger is first built.
//! Changing them afterwards has no effect on the running logger.

use crate::level::Level;
use clap::{ArgAction, Args};
use std::path::{Path, PathBuf};

/// Default maximum size of the log file in megabytes before it is rotated.
pub const LOG_FILE_DEFAULT_MAX_SIZE_MB: u64 = 1024;
/// Default number of rotated log files to keep.
pub const LOG_FILE_DEFAULT_MAX_BACKUPS: usize = 7;
/// Default number of days to keep rotated log files.
pub const LOG_FILE_DEFAULT_MAX_AGE_DAYS: u64 = 7;

/// The layout of each record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable single line with all fields.
    #[default]
    Full,
    /// Shorter human-readable line.
    Compact,
    /// One JSON object per line.
    Json,
}

/// How the record timestamp is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeFormat {
    /// Local time as `2006-01-02T15:04:05.000-0700`.
    #[default]
    Iso8601,
    /// UTC time in RFC 3339 form.
    Rfc3339,
    /// No timestamp.
    None,
}

/// Encoder settings applied to every sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderConfig {
    pub format: LogFormat,
    pub time: TimeFormat,
    /// Colorize console output. File output is never colorized.
    pub ansi: bool,
    pub target: bool,
    pub level: bool,
    pub thread_ids: bool,
    pub thread_names: bool,
}

impl EncoderConfig {
    /// The encoder used when none was supplied: console layout, ISO-8601 timestamps.
    pub fn production() -> Self {
        Self {
            format: LogFormat::Full,
            time: TimeFormat::Iso8601,
            ansi: false,
            target: false,
            level: true,
            thread_ids: false,
            thread_names: false,
        }
    }
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self::production()
    }
}

/// Settings consumed by the logger factory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Write to standard error instead of the log file.
    pub to_stderr: bool,
    /// Write to standard error as well as the log file.
    pub also_to_stderr: bool,
    /// Annotate each record with the file and line of the logging call.
    pub add_caller: bool,
    pub log_dir: PathBuf,
    pub log_file: String,
    /// Size in megabytes at which the log file is rotated. `0` disables size rotation.
    pub max_size_mb: u64,
    /// Number of rotated files to keep. `0` keeps all of them.
    pub max_backups: usize,
    /// Days to keep rotated files. `0` disables age-based removal.
    pub max_age_days: u64,
    /// Custom encoder. `None` selects [`EncoderConfig::production`].
    pub encoder: Option<EncoderConfig>,
}

impl LogConfig {
    /// Full path of the active log file.
    pub fn file_path(&self) -> PathBuf {
        self.log_dir.join(&self.log_file)
    }

    /// The encoder in effect, falling back to the production default.
    pub fn encoder_or_default(&self) -> EncoderConfig {
        self.encoder.clone().unwrap_or_default()
    }

    /// Maximum log file size in bytes, `0` meaning unlimited.
    pub fn max_size_bytes(&self) -> u64 {
        self.max_size_mb.saturating_mul(1024 * 1024)
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        let program = program_path();
        Self {
            to_stderr: false,
            also_to_stderr: false,
            add_caller: true,
            log_dir: program_dir(&program),
            log_file: format!("{}.log", program_name(&program)),
            max_size_mb: LOG_FILE_DEFAULT_MAX_SIZE_MB,
            max_backups: LOG_FILE_DEFAULT_MAX_BACKUPS,
            max_age_days: LOG_FILE_DEFAULT_MAX_AGE_DAYS,
            encoder: None,
        }
    }
}

fn program_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .or_else(|| std::env::args_os().next().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_PKG_NAME")))
}

fn program_name(program: &Path) -> String {
    program
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string())
}

fn program_dir(program: &Path) -> PathBuf {
    let dir = program
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    std::path::absolute(&dir).unwrap_or(dir)
}

/// Command-line flags for the logger.
///
/// Flatten into an application parser with `#[command(flatten)]` and hand the parsed value
/// to [`crate::LeveledLogger::init_flags`] (or [`crate::logging::init_flags`] for the global
/// logger) before the first log call.
#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct LogFlags {
    /// Log to standard error instead of files.
    #[arg(long = "logtostderr")]
    pub to_stderr: bool,

    /// Log to standard error as well as files.
    #[arg(long = "logalsotostderr")]
    pub also_to_stderr: bool,

    /// Annotate each message with the file and line number of the logging call.
    #[arg(
        long = "logaddcaller",
        action = ArgAction::Set,
        num_args = 0..=1,
        default_value_t = true,
        default_missing_value = "true"
    )]
    pub add_caller: bool,

    /// If non-empty, write log files in this directory.
    #[arg(long = "logdir", value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// If non-empty, use this log file name.
    #[arg(long = "logfile", value_name = "NAME")]
    pub log_file: Option<String>,

    /// Maximum size a log file can grow to, in megabytes. 0 means unlimited.
    #[arg(long = "logfilemaxsize", value_name = "MB", default_value_t = LOG_FILE_DEFAULT_MAX_SIZE_MB)]
    pub max_size_mb: u64,

    /// Maximum number of old log files to retain.
    #[arg(long = "logfilemaxbackups", value_name = "COUNT", default_value_t = LOG_FILE_DEFAULT_MAX_BACKUPS)]
    pub max_backups: usize,

    /// Maximum number of days to retain old log files.
    #[arg(long = "logfilemaxage", value_name = "DAYS", default_value_t = LOG_FILE_DEFAULT_MAX_AGE_DAYS)]
    pub max_age_days: u64,

    /// Number for the log level verbosity.
    #[arg(short = 'v', long = "verbosity", value_name = "LEVEL", default_value_t = Level::INFO, allow_hyphen_values = true)]
    pub verbosity: Level,
}

impl LogFlags {
    /// Copies the flag values into `config`. Unset path flags keep the config's values.
    pub fn apply(&self, config: &mut LogConfig) {
        config.to_stderr = self.to_stderr;
        config.also_to_stderr = self.also_to_stderr;
        config.add_caller = self.add_caller;
        if let Some(dir) = self.log_dir.as_ref().filter(|dir| !dir.as_os_str().is_empty()) {
            config.log_dir = dir.clone();
        }
        if let Some(file) = self.log_file.as_ref().filter(|file| !file.is_empty()) {
            config.log_file = file.clone();
        }
        config.max_size_mb = self.max_size_mb;
        config.max_backups = self.max_backups;
        config.max_age_days = self.max_age_days;
    }
}

impl Default for LogFlags {
    fn default() -> Self {
        Self {
            to_stderr: false,
            also_to_stderr: false,
            add_caller: true,
            log_dir: None,
            log_file: None,
            max_size_mb: LOG_FILE_DEFAULT_MAX_SIZE_MB,
            max_backups: LOG_FILE_DEFAULT_MAX_BACKUPS,
            max_age_days: LOG_FILE_DEFAULT_MAX_AGE_DAYS,
            verbosity: Level::INFO,
        }
    }
}
