use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::{Context, anyhow};
use clap::Parser;
use deflector::ephemeris::{EphemerisProvider, EphemerisSession, normalize_epoch_text};
use deflector::export::{self, injection::Xyz};
use deflector::mission::{ConfiguredEphemeris, impactor_position};
use serde::Serialize;

#[path = "common/settings.rs"]
mod settings;

/// Interpolated position of a precomputed object from a CZML document.
#[derive(Parser, Debug)]
#[command(author, version, about = "Impactor position lookup (km)")]
struct Cli {
    /// CZML document containing the sampled object
    #[arg(long)]
    czml: PathBuf,

    /// Query epoch (ISO-8601 UTC)
    #[arg(long)]
    at: String,

    /// Packet id (defaults to the configured impactor id)
    #[arg(long)]
    id: Option<String>,

    #[command(flatten)]
    settings: settings::ConfigArgs,
}

#[derive(Serialize)]
struct PositionReport<'a> {
    id: &'a str,
    epoch: String,
    position: Xyz,
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();
    let cli = Cli::parse();
    let config = cli.settings.load()?;
    let provider = ConfiguredEphemeris::from_config(&config.ephemeris)?;
    let id = cli
        .id
        .clone()
        .unwrap_or_else(|| config.presentation.impactor_id.clone());

    let file = File::open(&cli.czml).with_context(|| format!("opening {}", cli.czml.display()))?;
    let document: serde_json::Value = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing {}", cli.czml.display()))?;

    let session = provider.load()?;
    let query_et = session.epoch_from_text(&normalize_epoch_text(&cli.at)?)?;
    let position = impactor_position(&session, &document, &id, query_et)
        .map_err(|err| anyhow!("impactor lookup failed ({:?}): {err}", err.kind()))?;

    let report = PositionReport {
        id: &id,
        epoch: session.format_epoch(query_et)?,
        position: position.into(),
    };
    export::write_json(&PathBuf::from("-"), &report)?;
    Ok(())
}
