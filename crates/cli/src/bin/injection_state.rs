use std::path::PathBuf;

use anyhow::anyhow;
use clap::Parser;
use deflector::export;
use deflector::mission::{ConfiguredEphemeris, calculate_injection_state};

#[path = "common/settings.rs"]
mod settings;

/// Heliocentric state of the mitigation vehicle at the end of its ascent.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Heliocentric injection state calculator"
)]
struct Cli {
    /// Launch epoch (ISO-8601 UTC)
    #[arg(long)]
    launch: String,

    /// Steering profile selector (1, 2, other)
    #[arg(long)]
    profile: Option<i64>,

    /// JSON output path (`-` for stdout)
    #[arg(long, default_value = "-")]
    output: PathBuf,

    #[command(flatten)]
    settings: settings::ConfigArgs,
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();
    let cli = Cli::parse();
    let config = cli.settings.load()?;
    let provider = ConfiguredEphemeris::from_config(&config.ephemeris)?;

    let injection = calculate_injection_state(&provider, &config, &cli.launch, cli.profile)
        .map_err(|err| anyhow!("injection state failed ({:?}): {err}", err.kind()))?;
    export::write_json(&cli.output, &injection.to_payload())?;
    Ok(())
}
