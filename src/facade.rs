//! ## Leveled logger
//!
//! [`LeveledLogger`] ties a [`VerbosityGate`] to a [`LoggerFactory`]. Every write goes through
//! [`LeveledLogger::v`], which compares the requested tier with the gate on each call and
//! returns a [`Verbose`] handle that is either live or a no-op.
//!
//! Two kinds of settings exist:
//!
//! - **live**: the verbosity threshold and the caller-skip depth, read on every call;
//! - **build-time**: destinations, file location, rotation limits, caller annotation, and the
//!   encoder. These are frozen when the first enabled write or [`LeveledLogger::flush`] builds
//!   the underlying logger, so set them first.
//!
//! ### Example
//!
//! ```rust
//! use levelgate::{Field, Level, LeveledLogger, LogConfig};
//!
//! let dir = tempfile::tempdir().unwrap();
//! let logger = LeveledLogger::with_config(LogConfig {
//!     log_dir: dir.path().to_path_buf(),
//!     log_file: "app.log".into(),
//!     ..LogConfig::default()
//! });
//! logger.set_level(Level::WARN);
//!
//! logger.v(Level::DEBUG).info("dropped", &[]);
//! logger.v(Level::ERROR).info("disk full", &[Field::string("mount", "/data")]);
//! logger.flush().unwrap();
//!
//! let contents = std::fs::read_to_string(dir.path().join("app.log")).unwrap();
//! assert!(contents.contains("disk full"));
//! assert!(!contents.contains("dropped"));
//! ```

use crate::exceptions::LevelGateResult;
use crate::factory::{Logger, LoggerFactory};
use crate::level::{Level, VerbosityGate};
use crate::settings::{EncoderConfig, LogConfig, LogFlags};
use crate::verbose::Verbose;
use std::sync::atomic::{AtomicUsize, Ordering};

/// The operations shared by every leveled logger, so code can take a logger without naming
/// its concrete type.
pub trait LeveledLog: Send + Sync {
    /// See [`LeveledLogger::init_flags`].
    fn init_flags(&self, flags: &LogFlags);

    /// See [`LeveledLogger::set_encoder_config`].
    fn set_encoder_config(&self, encoder: EncoderConfig);

    /// See [`LeveledLogger::add_caller_skip`].
    fn add_caller_skip(&self, delta: usize);

    /// See [`LeveledLogger::set_level`].
    fn set_level(&self, level: Level);

    /// See [`LeveledLogger::v`].
    fn v(&self, level: Level) -> Verbose<'_>;

    /// See [`LeveledLogger::flush`].
    fn flush(&self) -> LevelGateResult<()>;
}

/// Frames skipped by default: the handle method that received the call.
const DEFAULT_CALLER_SKIP: usize = 1;

/// A logger whose output is gated by a runtime-adjustable verbosity threshold.
#[derive(Debug)]
pub struct LeveledLogger {
    verbosity: VerbosityGate,
    caller_skip: AtomicUsize,
    factory: LoggerFactory,
}

impl LeveledLogger {
    /// Creates a logger with the default configuration and an `INFO` threshold.
    pub fn new() -> Self {
        Self::with_config(LogConfig::default())
    }

    /// Creates a logger that will be built from `config`.
    pub fn with_config(config: LogConfig) -> Self {
        Self {
            verbosity: VerbosityGate::default(),
            caller_skip: AtomicUsize::new(DEFAULT_CALLER_SKIP),
            factory: LoggerFactory::new(config),
        }
    }

    /// Applies parsed command-line flags. The verbosity takes effect immediately, the rest
    /// only if the underlying logger has not been built yet.
    pub fn init_flags(&self, flags: &LogFlags) {
        self.factory.configure(|config| flags.apply(config));
        self.set_level(flags.verbosity);
    }

    /// Edits the build-time configuration.
    pub fn configure<F>(&self, f: F)
    where
        F: FnOnce(&mut LogConfig),
    {
        self.factory.configure(f);
    }

    /// Replaces the encoder. Only effective before the underlying logger is built.
    pub fn set_encoder_config(&self, encoder: EncoderConfig) {
        self.factory.configure(|config| config.encoder = Some(encoder));
    }

    /// Increases the number of stack frames elided from Panic and Fatal stack traces.
    /// Wrappers around the logger call this once for each frame they add.
    ///
    /// The skip never moves the `caller` field. That field is the location captured by
    /// `#[track_caller]`, so wrappers that should report their own caller must be
    /// `#[track_caller]` themselves.
    pub fn add_caller_skip(&self, delta: usize) {
        self.caller_skip.fetch_add(delta, Ordering::SeqCst);
    }

    pub fn caller_skip(&self) -> usize {
        self.caller_skip.load(Ordering::SeqCst)
    }

    /// Sets the verbosity threshold. Effective for the next [`LeveledLogger::v`] call.
    pub fn set_level(&self, level: Level) {
        self.verbosity.set(level);
    }

    pub fn level(&self) -> Level {
        self.verbosity.get()
    }

    /// Returns a live handle if the threshold is at or below `level`, otherwise a no-op handle.
    #[inline]
    pub fn v(&self, level: Level) -> Verbose<'_> {
        if self.verbosity.allows(level) {
            Verbose::enabled(self.factory.logger(), level, self.caller_skip())
        } else {
            Verbose::disabled(level)
        }
    }

    /// Flushes all pending output, building the underlying logger if needed.
    pub fn flush(&self) -> LevelGateResult<()> {
        self.factory.logger().flush()
    }

    /// The underlying logger, built on first access.
    pub fn logger(&self) -> &Logger {
        self.factory.logger()
    }

    /// Reports whether the underlying logger has been built.
    pub fn is_built(&self) -> bool {
        self.factory.is_built()
    }

    /// A snapshot of the build-time configuration.
    pub fn config(&self) -> LogConfig {
        self.factory.config()
    }
}

impl Default for LeveledLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl LeveledLog for LeveledLogger {
    fn init_flags(&self, flags: &LogFlags) {
        LeveledLogger::init_flags(self, flags);
    }

    fn set_encoder_config(&self, encoder: EncoderConfig) {
        LeveledLogger::set_encoder_config(self, encoder);
    }

    fn add_caller_skip(&self, delta: usize) {
        LeveledLogger::add_caller_skip(self, delta);
    }

    fn set_level(&self, level: Level) {
        LeveledLogger::set_level(self, level);
    }

    fn v(&self, level: Level) -> Verbose<'_> {
        LeveledLogger::v(self, level)
    }

    fn flush(&self) -> LevelGateResult<()> {
        LeveledLogger::flush(self)
    }
}
