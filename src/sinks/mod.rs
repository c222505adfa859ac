//! # Output Sinks
//!
//! The destinations a record can be written to: standard error and a rotating log file.

pub mod rotating;

pub use rotating::{RotatingFile, RotatingWriter};

use std::io::{self, Write};

/// A destination that the logger can flush.
#[derive(Debug, Clone)]
pub enum Sink {
    Stderr,
    File(RotatingFile),
}

impl Sink {
    pub fn flush(&self) -> io::Result<()> {
        match self {
            Sink::Stderr => io::stderr().flush(),
            Sink::File(file) => file.flush(),
        }
    }
}
