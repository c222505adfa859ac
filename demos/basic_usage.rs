// Run `cargo run --example basic_usage` to execute this example

use levelgate::exceptions::LevelGateResult;
use levelgate::{logging, EncoderConfig, Field, Level, LeveledLog, LogFlags, LogFormat};

// Library code can take any leveled logger instead of reaching for the global one
fn connect(log: &dyn LeveledLog, attempts: u64) {
    for attempt in 1..=attempts {
        log.v(Level(3))
            .info("connecting", &[Field::uint("attempt", attempt)]);
    }
    log.v(Level::WARN)
        .info("connection is slow", &[Field::uint("attempts", attempts)]);
}

fn main() -> LevelGateResult<()> {
    // Build-time settings must be in place before the first record is written
    logging::init_flags(&LogFlags {
        to_stderr: true,
        verbosity: Level::DEBUG,
        ..LogFlags::default()
    });
    logging::set_encoder_config(EncoderConfig {
        format: LogFormat::Compact,
        ..EncoderConfig::default()
    });

    logging::debug("starting up", &[Field::string("mode", "demo")]);
    logging::info("listening", &[Field::uint("port", 8080)]);

    // Only tiers at or above the threshold are written
    connect(logging::global(), 2);
    logging::set_level(Level::INFO);
    connect(logging::global(), 2);

    logging::error("request failed", &[Field::bool("retryable", true)]);
    logging::flush()
}
