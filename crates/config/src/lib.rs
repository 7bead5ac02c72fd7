//! Configuration models and loaders for the Deflector trajectory engine.
//!
//! Every section is optional in the file; missing keys fall back to the
//! values the ascent and orbit models were calibrated with.

use std::fs::File;
use std::path::{Path, PathBuf};

use deflector_core::constants::{
    EARTH_EQUATORIAL_RADIUS_KM, EARTH_POLAR_RADIUS_KM, MU_EARTH_KM3_S2,
};
use serde::Deserialize;
use thiserror::Error;

/// Complete configuration for one mitigation-vehicle trajectory run.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct MissionConfig {
    pub launch_site: LaunchSiteConfig,
    pub ascent: AscentConfig,
    pub orbit: OrbitConfig,
    pub frames: FrameConfig,
    pub ephemeris: EphemerisConfig,
    pub presentation: PresentationConfig,
}

/// Geodetic launch site and its reference ellipsoid.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LaunchSiteConfig {
    pub name: String,
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_km: f64,
    pub equatorial_radius_km: f64,
    pub polar_radius_km: f64,
}

impl Default for LaunchSiteConfig {
    fn default() -> Self {
        Self {
            name: "Cape Canaveral LC-39A".to_string(),
            latitude_deg: 28.5729,
            longitude_deg: -80.6490,
            altitude_km: 0.0,
            equatorial_radius_km: EARTH_EQUATORIAL_RADIUS_KM,
            polar_radius_km: EARTH_POLAR_RADIUS_KM,
        }
    }
}

/// Simplified ascent model constants (kilometres and seconds).
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AscentConfig {
    pub surface_gravity_km_s2: f64,
    pub thrust_acceleration_km_s2: f64,
    pub burn_duration_s: f64,
    pub vertical_duration_s: f64,
    pub target_altitude_km: f64,
    pub time_step_s: f64,
    pub max_duration_s: f64,
    /// Steering profile used when a request does not name one.
    pub default_profile: u8,
}

impl Default for AscentConfig {
    fn default() -> Self {
        Self {
            surface_gravity_km_s2: 9.81e-3,
            thrust_acceleration_km_s2: 0.03,
            burn_duration_s: 150.0,
            vertical_duration_s: 10.0,
            target_altitude_km: 100.0,
            time_step_s: 0.5,
            max_duration_s: 3_600.0,
            default_profile: 1,
        }
    }
}

/// Numerical scheme used after ascent.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PropagationMethod {
    /// Closed-form universal-variable two-body solution.
    #[default]
    Kepler,
    /// Fixed-step RK4 with substeps bounded by the local dynamical time.
    Integrated,
}

/// Post-injection propagation settings.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OrbitConfig {
    pub mu_km3_s2: f64,
    pub sample_count: usize,
    pub periods: f64,
    pub method: PropagationMethod,
    /// Largest RK4 step as a fraction of `sqrt(r³/μ)` (integrated method only).
    pub max_step_fraction: f64,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            mu_km3_s2: MU_EARTH_KM3_S2,
            sample_count: 200,
            periods: 2.0,
            method: PropagationMethod::Kepler,
            max_step_fraction: 0.01,
        }
    }
}

/// Frame and body names handed to the ephemeris session.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct FrameConfig {
    /// Rotating frame of the central body (`ITRF93` needs the high-precision
    /// Earth orientation kernel; `IAU_EARTH` only the text PCK).
    pub body_fixed: String,
    pub inertial: String,
    pub central_body: String,
    pub primary_body: String,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            body_fixed: "IAU_EARTH".to_string(),
            inertial: "J2000".to_string(),
            central_body: "EARTH".to_string(),
            primary_body: "SUN".to_string(),
        }
    }
}

/// Which ephemeris provider backs a run.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    #[default]
    Analytic,
    Spice,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EphemerisConfig {
    pub provider: ProviderKind,
    pub kernel_dir: PathBuf,
    /// Catalog file names to furnish; empty means the full catalog.
    pub kernels: Vec<String>,
}

impl Default for EphemerisConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Analytic,
            kernel_dir: PathBuf::from("data/spice"),
            kernels: Vec::new(),
        }
    }
}

/// Cosmetic CZML settings for the exported document.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PresentationConfig {
    pub document_name: String,
    pub entity_id: String,
    pub entity_name: String,
    pub clock_multiplier: f64,
    pub model_uri: String,
    pub model_scale: f64,
    pub model_minimum_pixel_size: f64,
    pub path_color_rgba: [u8; 4],
    pub path_width: f64,
    pub path_resolution: f64,
    pub interpolation_degree: u32,
    /// Packet id of the precomputed impactor in sampler inputs.
    pub impactor_id: String,
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            document_name: "Mitigation Vehicle Trajectory".to_string(),
            entity_id: "mitigation_vehicle".to_string(),
            entity_name: "Mitigation Vehicle".to_string(),
            clock_multiplier: 100.0,
            model_uri: "/SLS.glb".to_string(),
            model_scale: 20_000.0,
            model_minimum_pixel_size: 64.0,
            path_color_rgba: [0, 255, 255, 255],
            path_width: 2.0,
            path_resolution: 120.0,
            interpolation_degree: 5,
            impactor_id: "impactor2025".to_string(),
        }
    }
}

/// Errors that can occur while loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl MissionConfig {
    /// Reject values the numerical models cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = |field: &'static str, value: f64| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be positive and finite (got {value})"),
                })
            }
        };

        positive("ascent.surface_gravity_km_s2", self.ascent.surface_gravity_km_s2)?;
        positive("ascent.time_step_s", self.ascent.time_step_s)?;
        positive("ascent.target_altitude_km", self.ascent.target_altitude_km)?;
        positive("ascent.max_duration_s", self.ascent.max_duration_s)?;
        positive("orbit.mu_km3_s2", self.orbit.mu_km3_s2)?;
        positive("orbit.periods", self.orbit.periods)?;
        positive("orbit.max_step_fraction", self.orbit.max_step_fraction)?;
        positive(
            "launch_site.equatorial_radius_km",
            self.launch_site.equatorial_radius_km,
        )?;
        positive("launch_site.polar_radius_km", self.launch_site.polar_radius_km)?;

        if self.orbit.sample_count < 2 {
            return Err(ConfigError::Invalid {
                field: "orbit.sample_count",
                reason: format!("need at least two samples (got {})", self.orbit.sample_count),
            });
        }
        if !(-90.0..=90.0).contains(&self.launch_site.latitude_deg) {
            return Err(ConfigError::Invalid {
                field: "launch_site.latitude_deg",
                reason: format!("{} is outside [-90, 90]", self.launch_site.latitude_deg),
            });
        }
        for (field, value) in [
            ("frames.body_fixed", &self.frames.body_fixed),
            ("frames.inertial", &self.frames.inertial),
            ("frames.central_body", &self.frames.central_body),
            ("frames.primary_body", &self.frames.primary_body),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "must not be empty".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Load and validate a mission configuration from a TOML (by extension) or YAML file.
pub fn load_mission_config<P: AsRef<Path>>(path: P) -> Result<MissionConfig, ConfigError> {
    let config: MissionConfig = load_record(path)?;
    config.validate()?;
    Ok(config)
}

fn load_record<T, P>(path: P) -> Result<T, ConfigError>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if path.extension().map(|ext| ext == "toml").unwrap_or(false) {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    } else {
        let reader = File::open(path)?;
        Ok(serde_yaml::from_reader(reader)?)
    }
}
