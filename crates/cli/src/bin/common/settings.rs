use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, ValueEnum};
use deflector::config::{MissionConfig, ProviderKind, load_mission_config};
use log::debug;

/// Configuration file picked up when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "configs/mission.toml";

/// Flags shared by every trajectory binary.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Mission configuration file (TOML or YAML); defaults to configs/mission.toml when present
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Ephemeris provider override
    #[arg(long, value_enum)]
    pub provider: Option<ProviderArg>,

    /// Kernel directory for the SPICE provider
    #[arg(long)]
    pub kernel_dir: Option<PathBuf>,
}

#[derive(Copy, Clone, ValueEnum, Debug)]
pub enum ProviderArg {
    Analytic,
    Spice,
}

impl ConfigArgs {
    /// Load the configuration file (or built-in defaults) and apply flag overrides.
    pub fn load(&self) -> anyhow::Result<MissionConfig> {
        let mut config = match &self.config {
            Some(path) => load_mission_config(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                load_mission_config(DEFAULT_CONFIG_PATH)
                    .with_context(|| format!("loading {DEFAULT_CONFIG_PATH}"))?
            }
            None => {
                debug!("no configuration file found, using built-in defaults");
                MissionConfig::default()
            }
        };
        if let Some(provider) = self.provider {
            config.ephemeris.provider = match provider {
                ProviderArg::Analytic => ProviderKind::Analytic,
                ProviderArg::Spice => ProviderKind::Spice,
            };
        }
        if let Some(dir) = &self.kernel_dir {
            config.ephemeris.kernel_dir = dir.clone();
        }
        Ok(config)
    }
}
