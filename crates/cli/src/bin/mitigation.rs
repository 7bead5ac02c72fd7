use std::path::{Path, PathBuf};

use anyhow::anyhow;
use clap::Parser;
use deflector::export::{self, trajectory_csv};
use deflector::mission::{
    ConfiguredEphemeris, MitigationRequest, plan_batch, plan_mitigation_trajectory,
};

#[path = "common/settings.rs"]
mod settings;

/// Plan mitigation-vehicle trajectories (ascent + parking orbit) and write them as CZML.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Mitigation vehicle trajectory generator (CZML)"
)]
struct Cli {
    /// Launch epoch (ISO-8601 UTC); repeat to plan several launches in parallel
    #[arg(long = "launch", required = true)]
    launches: Vec<String>,

    /// Steering profile selector (1 = 1.0°, 2 = 1.5°, other = 2.0° pitch-over)
    #[arg(long)]
    profile: Option<i64>,

    /// CZML output path (`-` for stdout); batches get an index suffix
    #[arg(long, default_value = "-")]
    output: PathBuf,

    /// Optional CSV of the combined trajectory (time_s,x_m,y_m,z_m)
    #[arg(long)]
    csv: Option<PathBuf>,

    #[command(flatten)]
    settings: settings::ConfigArgs,
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();
    let cli = Cli::parse();
    let config = cli.settings.load()?;
    let provider = ConfiguredEphemeris::from_config(&config.ephemeris)?;

    let requests: Vec<MitigationRequest> = cli
        .launches
        .iter()
        .map(|launch| MitigationRequest::new(launch.clone(), cli.profile))
        .collect();
    let results = if requests.len() == 1 {
        vec![plan_mitigation_trajectory(&provider, &config, &requests[0])]
    } else {
        plan_batch(&provider, &config, &requests)
    };

    let count = requests.len();
    for (index, (request, result)) in requests.iter().zip(results).enumerate() {
        let plan = result.map_err(|err| {
            anyhow!(
                "launch {} failed ({:?}): {err}",
                request.launch_epoch,
                err.kind()
            )
        })?;

        let output = indexed_path(&cli.output, index, count);
        export::write_json(&output, &plan.czml_document(&config.presentation)?)?;

        if let Some(csv) = &cli.csv {
            let csv_path = indexed_path(csv, index, count);
            let mut writer = export::writer_for_path(&csv_path)?;
            trajectory_csv::write_segment(&mut writer, &plan.combined()?)?;
        }

        eprintln!(
            "[{}] profile {:?}: ascent {:.1} s ({} samples), orbit {} samples, injection radius {:.3} km, speed {:.4} km/s",
            plan.start_iso,
            plan.profile,
            plan.ascent_duration_s,
            plan.ascent.len(),
            plan.orbit.len(),
            plan.injection.radius_km(),
            plan.injection.speed_km_s()
        );
    }

    Ok(())
}

fn indexed_path(path: &Path, index: usize, count: usize) -> PathBuf {
    if count <= 1 || path == Path::new("-") {
        return path.to_path_buf();
    }
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("trajectory");
    let name = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{stem}_{index}.{ext}"),
        None => format!("{stem}_{index}"),
    };
    path.with_file_name(name)
}
