use clap::Parser;
use levelgate::exceptions::LevelGateResult;
use levelgate::{logging, Field, Level, LogFlags};

/// Writes one record at each named level below PANIC using the global logger.
#[derive(Debug, Parser)]
#[command(name = "levelgate", version, about)]
struct Cli {
    #[command(flatten)]
    log: LogFlags,

    /// Message to write.
    #[arg(long, default_value = "hello from levelgate")]
    message: String,

    /// Also write at this extra verbosity tier.
    #[arg(long, allow_hyphen_values = true)]
    tier: Option<Level>,
}

fn main() -> LevelGateResult<()> {
    let cli = Cli::parse();
    logging::init_flags(&cli.log);

    let fields = [Field::display("verbosity", cli.log.verbosity)];
    logging::debug(&cli.message, &fields);
    logging::info(&cli.message, &fields);
    logging::warn(&cli.message, &fields);
    logging::error(&cli.message, &fields);

    if let Some(tier) = cli.tier {
        logging::v(tier).info(&cli.message, &[Field::display("tier", tier)]);
    }

    logging::flush()
}
