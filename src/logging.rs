//! ## Global Logger
//!
//! A process-wide [`LeveledLogger`] for applications that only need one. It is created with the
//! default configuration and one extra caller-skip frame for the free functions below, which
//! all delegate to it. Independent loggers can still be created with [`LeveledLogger::new`].
//!
//! The global logger is initialized at program startup using the `ctor` crate. Its initial
//! verbosity can be set with the `LEVELGATE_V` environment variable:
//!
//! - **Unset or empty** (default): the threshold stays at `INFO` (0).
//! - **An integer**: the threshold is set to that level, for example `-1` for debug output.
//! - **Anything else**: ignored, and a warning is emitted through `tracing`.
//!
//! ### Usage Example
//!
//! ```sh
//! export LEVELGATE_V=-1
//! ```

use crate::exceptions::LevelGateResult;
use crate::facade::LeveledLogger;
use crate::level::Level;
use crate::settings::{EncoderConfig, LogFlags};
use crate::verbose::{Field, Verbose};
use ctor::ctor;
use std::sync::LazyLock;

/// Environment variable read at startup for the initial global verbosity.
pub const VERBOSITY_ENV: &str = "LEVELGATE_V";

static LOGGING: LazyLock<LeveledLogger> = LazyLock::new(|| {
    let logging = LeveledLogger::new();
    logging.add_caller_skip(1);
    logging
});

#[ctor]
fn init_global_logging() {
    let logging = global();
    let Ok(value) = std::env::var(VERBOSITY_ENV) else {
        return;
    };
    if value.trim().is_empty() {
        return;
    }
    match value.parse::<Level>() {
        Ok(level) => logging.set_level(level),
        Err(err) => tracing::warn!(%err, "ignoring {}", VERBOSITY_ENV),
    }
}

/// The global logger.
pub fn global() -> &'static LeveledLogger {
    &LOGGING
}

/// Applies parsed command-line flags to the global logger.
pub fn init_flags(flags: &LogFlags) {
    global().init_flags(flags);
}

/// Replaces the global logger's encoder. Call before the first log.
pub fn set_encoder_config(encoder: EncoderConfig) {
    global().set_encoder_config(encoder);
}

/// Increases the global logger's caller skip.
pub fn add_caller_skip(delta: usize) {
    global().add_caller_skip(delta);
}

/// Sets the global verbosity threshold.
pub fn set_level(level: Level) {
    global().set_level(level);
}

/// Returns a handle on the global logger for `level`.
pub fn v(level: Level) -> Verbose<'static> {
    global().v(level)
}

/// Flushes the global logger.
pub fn flush() -> LevelGateResult<()> {
    global().flush()
}

/// Writes a DEBUG level record.
#[track_caller]
pub fn debug(msg: &str, fields: &[Field]) {
    v(Level::DEBUG).info(msg, fields);
}

/// Writes an INFO level record.
#[track_caller]
pub fn info(msg: &str, fields: &[Field]) {
    v(Level::INFO).info(msg, fields);
}

/// Writes a WARN level record.
#[track_caller]
pub fn warn(msg: &str, fields: &[Field]) {
    v(Level::WARN).info(msg, fields);
}

/// Writes an ERROR level record.
#[track_caller]
pub fn error(msg: &str, fields: &[Field]) {
    v(Level::ERROR).info(msg, fields);
}

/// Writes a PANIC level record and panics, unless the threshold is above [`Level::PANIC`].
#[track_caller]
pub fn panic(msg: &str, fields: &[Field]) {
    v(Level::PANIC).panic(msg, fields);
}

/// Writes a FATAL level record and exits, unless the threshold is above [`Level::FATAL`].
#[track_caller]
pub fn fatal(msg: &str, fields: &[Field]) {
    v(Level::FATAL).fatal(msg, fields);
}
