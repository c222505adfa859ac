//! ## Logger construction
//!
//! The [`LoggerFactory`] owns the logger configuration and builds the underlying [`Logger`]
//! the first time it is needed. Construction happens at most once, even when several threads
//! ask for the logger at the same time; every caller observes the same fully built instance.
//!
//! The logger is a `tracing` dispatcher with one `fmt` layer per sink. The sink topology is
//! chosen from the configuration:
//!
//! - **console only** when `to_stderr` is set,
//! - **file only** by default, writing to a size-bounded [`RotatingWriter`],
//! - **tee** when `also_to_stderr` is set, duplicating every record to the file and stderr.
//!
//! Once built, the logger is immutable. Later configuration changes are stored but only a
//! fresh factory would pick them up.

use crate::exceptions::LevelGateResult;
use crate::level::Level;
use crate::settings::{EncoderConfig, LogConfig, LogFormat, TimeFormat};
use crate::sinks::{RotatingFile, RotatingWriter, Sink};
use crate::verbose::{render_fields, Field, Severity};
use parking_lot::Mutex;
use std::backtrace::Backtrace;
use std::panic::Location;
use std::sync::OnceLock;
use tracing::{dispatcher, Dispatch};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::format::{DefaultFields, Format, Full};
use tracing_subscriber::fmt::time::{ChronoLocal, ChronoUtc, FormatTime};
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::Registry;
use tracing_subscriber::Layer;

const ISO8601_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%z";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// The built logger shared by every handle of one [`crate::LeveledLogger`].
pub struct Logger {
    dispatch: Dispatch,
    sinks: Vec<Sink>,
    add_caller: bool,
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("sinks", &self.sinks)
            .field("add_caller", &self.add_caller)
            .finish_non_exhaustive()
    }
}

impl Logger {
    /// Builds a logger from `config`. The log file, if any, is opened on the first write.
    pub fn build(config: &LogConfig) -> Self {
        let encoder = config.encoder_or_default();
        let mut sinks = Vec::new();
        let mut layers: Vec<BoxedLayer> = Vec::new();

        if config.to_stderr {
            layers.push(encoder_layer(&encoder, std::io::stderr, encoder.ansi));
            sinks.push(Sink::Stderr);
        } else {
            let file = RotatingFile::new(RotatingWriter::new(
                config.file_path(),
                config.max_size_bytes(),
                config.max_backups,
                config.max_age_days,
            ));
            layers.push(encoder_layer(&encoder, file.clone(), false));
            sinks.push(Sink::File(file));

            if config.also_to_stderr {
                layers.push(encoder_layer(&encoder, std::io::stderr, encoder.ansi));
                sinks.push(Sink::Stderr);
            }
        }

        tracing::debug!(
            to_stderr = config.to_stderr,
            also_to_stderr = config.also_to_stderr,
            path = %config.file_path().display(),
            "built levelgate logger"
        );

        Self {
            dispatch: Dispatch::new(Registry::default().with(layers)),
            sinks,
            add_caller: config.add_caller,
        }
    }

    /// The sinks this logger writes to, in the order they were wired.
    pub fn sinks(&self) -> &[Sink] {
        &self.sinks
    }

    /// The `tracing` dispatcher backing this logger.
    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    /// Flushes every sink, returning the first error after trying all of them.
    pub fn flush(&self) -> LevelGateResult<()> {
        let mut first_error = None;
        for sink in &self.sinks {
            if let Err(err) = sink.flush() {
                first_error.get_or_insert(err);
            }
        }
        match first_error {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }

    #[inline(never)]
    pub(crate) fn emit(
        &self,
        severity: Severity,
        level: Level,
        msg: &str,
        fields: &[Field],
        caller: &Location<'_>,
        caller_skip: usize,
    ) {
        let caller = self
            .add_caller
            .then(|| format!("{}:{}", caller.file(), caller.line()));
        let fields = render_fields(fields);
        let v = level.get();

        dispatcher::with_default(&self.dispatch, || match severity {
            Severity::Info => tracing::info!(
                v,
                caller = caller.as_deref(),
                fields = fields.as_deref(),
                "{}",
                msg
            ),
            Severity::Panic | Severity::Fatal => {
                let stacktrace = capture_stack(caller_skip);
                tracing::error!(
                    severity = severity.as_str(),
                    v,
                    caller = caller.as_deref(),
                    fields = fields.as_deref(),
                    stacktrace = %stacktrace,
                    "{}",
                    msg
                )
            }
        });
    }
}

fn encoder_layer<W>(encoder: &EncoderConfig, writer: W, ansi: bool) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(encoder.target)
        .with_level(encoder.level)
        .with_thread_ids(encoder.thread_ids)
        .with_thread_names(encoder.thread_names)
        .with_file(false)
        .with_line_number(false);

    match encoder.time {
        TimeFormat::Iso8601 => with_format(
            layer.with_timer(ChronoLocal::new(ISO8601_FORMAT.to_string())),
            encoder.format,
        ),
        TimeFormat::Rfc3339 => with_format(layer.with_timer(ChronoUtc::rfc_3339()), encoder.format),
        TimeFormat::None => with_format(layer.without_time(), encoder.format),
    }
}

fn with_format<W, T>(
    layer: fmt::Layer<Registry, DefaultFields, Format<Full, T>, W>,
    format: LogFormat,
) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    T: FormatTime + Send + Sync + 'static,
{
    match format {
        LogFormat::Full => Box::new(layer.with_filter(LevelFilter::INFO)),
        LogFormat::Compact => Box::new(layer.compact().with_filter(LevelFilter::INFO)),
        LogFormat::Json => Box::new(layer.json().with_filter(LevelFilter::INFO)),
    }
}

#[inline(never)]
fn capture_stack(caller_skip: usize) -> String {
    let trace = Backtrace::force_capture().to_string();
    trim_frames(&trace, "Logger::emit", caller_skip)
}

fn is_frame_header(line: &str) -> bool {
    line.trim_start()
        .split_once(':')
        .is_some_and(|(index, _)| !index.is_empty() && index.bytes().all(|b| b.is_ascii_digit()))
}

/// Drops every frame up to and including the last one naming `marker`, then `skip` more.
/// Returns the trace unchanged when `marker` is absent (for example without symbols).
fn trim_frames(trace: &str, marker: &str, skip: usize) -> String {
    let mut frames: Vec<Vec<&str>> = Vec::new();
    for line in trace.lines() {
        match frames.last_mut() {
            Some(frame) if !is_frame_header(line) => frame.push(line),
            _ => frames.push(vec![line]),
        }
    }

    let start = frames
        .iter()
        .rposition(|frame| frame[0].contains(marker))
        .map_or(0, |index| index + 1 + skip);

    frames
        .iter()
        .skip(start)
        .flatten()
        .copied()
        .collect::<Vec<_>>()
        .join("\n")
}

/// Builds the [`Logger`] once from a mutable [`LogConfig`].
#[derive(Debug)]
pub struct LoggerFactory {
    config: Mutex<LogConfig>,
    logger: OnceLock<Logger>,
}

impl LoggerFactory {
    pub fn new(config: LogConfig) -> Self {
        Self {
            config: Mutex::new(config),
            logger: OnceLock::new(),
        }
    }

    /// Returns the logger, building it on first use.
    #[inline]
    pub fn logger(&self) -> &Logger {
        self.logger
            .get_or_init(|| Logger::build(&self.config.lock()))
    }

    /// Reports whether the logger has been built.
    pub fn is_built(&self) -> bool {
        self.logger.get().is_some()
    }

    /// Edits the configuration. Has no effect on a logger that was already built.
    pub fn configure<F>(&self, f: F)
    where
        F: FnOnce(&mut LogConfig),
    {
        let mut config = self.config.lock();
        f(&mut config);
        if self.is_built() {
            tracing::debug!("levelgate configuration changed after the logger was built");
        }
    }

    /// A snapshot of the current configuration.
    pub fn config(&self) -> LogConfig {
        self.config.lock().clone()
    }
}

impl Default for LoggerFactory {
    fn default() -> Self {
        Self::new(LogConfig::default())
    }
}
