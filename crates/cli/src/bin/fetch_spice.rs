//! Download the SPICE kernels used by the `spice` ephemeris provider.
//!
//! The kernel directory and kernel list come from the mission configuration
//! (`[ephemeris]`), so the same file drives both download and loading.

use clap::Parser;
use deflector::ephemeris::kernels;
use deflector::importer::{self, KernelStatus};
use log::info;

#[path = "common/settings.rs"]
mod settings;

#[derive(Parser, Debug)]
#[command(author, version, about = "Fetch SPICE kernels into the configured kernel directory")]
struct Cli {
    /// Only these catalog kernels (defaults to `ephemeris.kernels`, or the whole catalog)
    #[arg(long = "kernel")]
    kernels: Vec<String>,

    #[command(flatten)]
    settings: settings::ConfigArgs,
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();
    let cli = Cli::parse();
    let config = cli.settings.load()?;
    let dir = config.ephemeris.kernel_dir.clone();
    let names = if cli.kernels.is_empty() {
        &config.ephemeris.kernels
    } else {
        &cli.kernels
    };

    let descriptors = importer::select_kernels(names)?;
    info!("fetching {} kernels into {}", descriptors.len(), dir.display());
    for status in importer::download_kernels(&dir, &descriptors)? {
        match status {
            KernelStatus::Downloaded { path, bytes } => {
                println!("[downloaded] {} ({})", path.display(), format_size(bytes))
            }
            KernelStatus::AlreadyPresent(path) => println!("[present]    {}", path.display()),
        }
    }

    match kernels::kernel_summaries(&dir) {
        Ok(summaries) => {
            println!("\nKernel directory {}:", dir.display());
            for summary in summaries {
                println!(
                    "  {:<27} {:<26} {:>9}  {}",
                    summary.descriptor.filename,
                    summary.descriptor.kind.label(),
                    format_size(summary.file_size_bytes),
                    summary.descriptor.description,
                );
            }
        }
        Err(err) => eprintln!("[warn] catalog incomplete in {}: {err}", dir.display()),
    }

    Ok(())
}

fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}
