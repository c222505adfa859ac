//! ## Custom Errors for levelgate
//!
//! This module defines the error types returned by the library.
//! It uses the `thiserror` crate to derive the `Error` trait for them.
//!
//! Verbosity-gate misses are never errors: a disabled handle silently drops the record.
//! The variants below cover the remaining failure points, which are parsing a verbosity
//! level from text (for example a command-line value) and I/O on a sink.
//!
//! ### Example
//!
//! ```rust
//! use levelgate::exceptions::{LevelGateError, LevelGateResult};
//! use levelgate::Level;
//!
//! fn parse_verbosity(text: &str) -> LevelGateResult<Level> {
//!     text.parse::<Level>()
//! }
//!
//! assert!(matches!(parse_verbosity("loud"), Err(LevelGateError::InvalidLevel { .. })));
//! ```

use std::num::ParseIntError;
use thiserror::Error;

/// Errors specific to the levelgate library.
#[derive(Debug, Error)]
pub enum LevelGateError {
    /// Wraps underlying I/O errors from a sink.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// A verbosity level could not be parsed from text.
    #[error("Invalid verbosity level '{value}': {source}")]
    InvalidLevel {
        value: String,
        #[source]
        source: ParseIntError,
    },
}

/// A convenient result type for levelgate operations.
pub type LevelGateResult<T> = std::result::Result<T, LevelGateError>;
