//! ## Verbosity levels and the verbosity gate
//!
//! A [`Level`] is a signed verbosity rank. Lower values are more severe and always shown,
//! higher values are more verbose and only shown when requested. The six named levels are
//! points on this scale, but any integer is a valid tier, so callers can gate fine-grained
//! debug output with something like `Level(7)`.
//!
//! The [`VerbosityGate`] holds the current threshold in an atomic integer. Reads and writes
//! never block each other and may race freely with concurrent log calls.

use crate::exceptions::{LevelGateError, LevelGateResult};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicI32, Ordering};

/// A verbosity rank. See the module documentation for the ordering convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Level(pub i32);

impl Level {
    pub const DEBUG: Level = Level(-1);
    pub const INFO: Level = Level(0);
    pub const WARN: Level = Level(1);
    pub const ERROR: Level = Level(2);
    // 3 is reserved for a development-only panic tier and has no name here.
    pub const PANIC: Level = Level(4);
    pub const FATAL: Level = Level(5);

    /// Returns the raw integer rank.
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl Default for Level {
    fn default() -> Self {
        Level::INFO
    }
}

impl From<i32> for Level {
    fn from(value: i32) -> Self {
        Level(value)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Level {
    type Err = LevelGateError;

    fn from_str(s: &str) -> LevelGateResult<Self> {
        s.trim()
            .parse::<i32>()
            .map(Level)
            .map_err(|source| LevelGateError::InvalidLevel {
                value: s.to_string(),
                source,
            })
    }
}

/// The current verbosity threshold, readable and writable from any thread.
#[derive(Debug)]
pub struct VerbosityGate(AtomicI32);

impl VerbosityGate {
    /// Creates a gate set to `level`.
    pub const fn new(level: Level) -> Self {
        Self(AtomicI32::new(level.0))
    }

    /// Returns the current threshold.
    #[inline]
    pub fn get(&self) -> Level {
        Level(self.0.load(Ordering::SeqCst))
    }

    /// Replaces the current threshold.
    #[inline]
    pub fn set(&self, level: Level) {
        self.0.store(level.0, Ordering::SeqCst);
    }

    /// Parses `value` and stores it. The gate is left unchanged on error.
    pub fn set_from_str(&self, value: &str) -> LevelGateResult<()> {
        let level = value.parse::<Level>()?;
        self.set(level);
        Ok(())
    }

    /// Reports whether a record at `level` passes the gate.
    #[inline]
    pub fn allows(&self, level: Level) -> bool {
        self.get() <= level
    }
}

impl Default for VerbosityGate {
    fn default() -> Self {
        Self::new(Level::INFO)
    }
}

impl fmt::Display for VerbosityGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.get().fmt(f)
    }
}
