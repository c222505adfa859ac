//! # levelgate
//!
//! A verbosity-gated logging facade built on `tracing`.
//!
//! A [`LeveledLogger`] holds an atomic verbosity threshold and a lazily built logger that
//! writes to standard error, to a size-bounded rotating file, or to both. Every write passes
//! through [`LeveledLogger::v`], which returns a [`Verbose`] handle that is live only when the
//! requested tier is at or above the threshold.
//!
//! The [`logging`] module provides a process-wide logger with free functions (`debug`, `info`,
//! `warn`, `error`, `panic`, `fatal`) for programs that only need one logger.
//!
//! ```rust,no_run
//! use clap::Parser;
//! use levelgate::{logging, Field, LogFlags};
//!
//! #[derive(Parser)]
//! struct Cli {
//!     #[command(flatten)]
//!     log: LogFlags,
//! }
//!
//! let cli = Cli::parse();
//! logging::init_flags(&cli.log);
//! logging::info("service started", &[Field::uint("port", 8080)]);
//! logging::flush().ok();
//! ```

pub mod exceptions;
pub mod facade;
pub mod factory;
pub mod level;
pub mod logging;
pub mod settings;
pub mod sinks;
pub mod verbose;

pub use exceptions::{LevelGateError, LevelGateResult};
pub use facade::{LeveledLog, LeveledLogger};
pub use factory::{Logger, LoggerFactory};
pub use level::{Level, VerbosityGate};
pub use settings::{EncoderConfig, LogConfig, LogFlags, LogFormat, TimeFormat};
pub use verbose::{Field, FieldValue, Severity, Verbose};
