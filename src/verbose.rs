//! ## Verbosity-gated write handles
//!
//! [`Verbose`] is what [`crate::LeveledLogger::v`] hands back. It is bound to one verbosity
//! tier and either carries the underlying logger (the gate let the tier through) or nothing
//! (the gate rejected it). Every write on a disabled handle is a cheap no-op.
//!
//! Writes are tagged with a [`Severity`]. `Info` records the message and returns. `Panic`
//! records the message with a stack trace and then panics. `Fatal` records the message with
//! a stack trace, flushes every sink, and exits the process with status 1.

use crate::factory::Logger;
use crate::level::Level;
use std::borrow::Cow;
use std::fmt;
use std::panic::Location;

/// The kind of write performed through a [`Verbose`] handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    /// Panics after the record is written.
    Panic,
    /// Exits the process after the record is written and flushed.
    Fatal,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Panic => "PANIC",
            Severity::Fatal => "FATAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed value attached to a record.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Str(String),
    I64(i64),
    U64(u64),
    F64(f64),
    Bool(bool),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Str(value) if value.is_empty() || value.contains(char::is_whitespace) => {
                write!(f, "{:?}", value)
            }
            FieldValue::Str(value) => f.write_str(value),
            FieldValue::I64(value) => write!(f, "{}", value),
            FieldValue::U64(value) => write!(f, "{}", value),
            FieldValue::F64(value) => write!(f, "{}", value),
            FieldValue::Bool(value) => write!(f, "{}", value),
        }
    }
}

/// A key-value pair attached to a record, rendered as `key=value`.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub key: Cow<'static, str>,
    pub value: FieldValue,
}

impl Field {
    pub fn string(key: impl Into<Cow<'static, str>>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: FieldValue::Str(value.into()),
        }
    }

    pub fn int(key: impl Into<Cow<'static, str>>, value: i64) -> Self {
        Self {
            key: key.into(),
            value: FieldValue::I64(value),
        }
    }

    pub fn uint(key: impl Into<Cow<'static, str>>, value: u64) -> Self {
        Self {
            key: key.into(),
            value: FieldValue::U64(value),
        }
    }

    pub fn float(key: impl Into<Cow<'static, str>>, value: f64) -> Self {
        Self {
            key: key.into(),
            value: FieldValue::F64(value),
        }
    }

    pub fn bool(key: impl Into<Cow<'static, str>>, value: bool) -> Self {
        Self {
            key: key.into(),
            value: FieldValue::Bool(value),
        }
    }

    /// Records any `Display` value as a string.
    pub fn display(key: impl Into<Cow<'static, str>>, value: impl fmt::Display) -> Self {
        Self::string(key, value.to_string())
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// Joins `fields` into a single `key=value key=value` string, or `None` when empty.
pub(crate) fn render_fields(fields: &[Field]) -> Option<String> {
    if fields.is_empty() {
        return None;
    }
    let rendered: Vec<String> = fields.iter().map(Field::to_string).collect();
    Some(rendered.join(" "))
}

/// A write handle for one verbosity tier. See the module documentation.
#[derive(Debug, Clone, Copy)]
pub struct Verbose<'a> {
    logger: Option<&'a Logger>,
    level: Level,
    caller_skip: usize,
}

impl<'a> Verbose<'a> {
    pub(crate) fn enabled(logger: &'a Logger, level: Level, caller_skip: usize) -> Self {
        Self {
            logger: Some(logger),
            level,
            caller_skip,
        }
    }

    pub(crate) fn disabled(level: Level) -> Self {
        Self {
            logger: None,
            level,
            caller_skip: 0,
        }
    }

    /// Reports whether the gate let this tier through.
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.logger.is_some()
    }

    /// The tier this handle was requested at.
    pub fn level(&self) -> Level {
        self.level
    }

    /// The underlying logger, if the handle is enabled.
    pub fn logger(&self) -> Option<&'a Logger> {
        self.logger
    }

    /// Writes an informational record.
    #[track_caller]
    pub fn info(&self, msg: &str, fields: &[Field]) {
        if let Some(logger) = self.logger {
            logger.emit(
                Severity::Info,
                self.level,
                msg,
                fields,
                Location::caller(),
                self.caller_skip,
            );
        }
    }

    /// Writes a record with a stack trace, then panics with `msg`.
    #[track_caller]
    pub fn panic(&self, msg: &str, fields: &[Field]) {
        if let Some(logger) = self.logger {
            logger.emit(
                Severity::Panic,
                self.level,
                msg,
                fields,
                Location::caller(),
                self.caller_skip,
            );
            panic!("{}", msg);
        }
    }

    /// Writes a record with a stack trace, flushes, then exits the process with status 1.
    #[track_caller]
    pub fn fatal(&self, msg: &str, fields: &[Field]) {
        if let Some(logger) = self.logger {
            logger.emit(
                Severity::Fatal,
                self.level,
                msg,
                fields,
                Location::caller(),
                self.caller_skip,
            );
            // Exiting anyway; a failed flush has nowhere left to be reported.
            let _ = logger.flush();
            std::process::exit(1);
        }
    }

    /// Writes a record tagged with `severity`.
    #[track_caller]
    pub fn write(&self, severity: Severity, msg: &str, fields: &[Field]) {
        match severity {
            Severity::Info => self.info(msg, fields),
            Severity::Panic => self.panic(msg, fields),
            Severity::Fatal => self.fatal(msg, fields),
        }
    }
}
