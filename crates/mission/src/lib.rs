//! Mission facade: mitigation-vehicle trajectories, heliocentric injection
//! states and impactor position lookups, plus error classification for callers.

use deflector_ascent::AscentError;
use deflector_config::ConfigError;
use deflector_core::trajectory::SegmentError;
use deflector_ephem_spice::EphemerisError;
use deflector_frames::FrameError;
use deflector_orbits::OrbitError;
use deflector_sampler::SamplerError;
use thiserror::Error;

pub mod impactor;
pub mod injection;
pub mod provider;
pub mod trajectory;

pub use impactor::impactor_position;
pub use injection::{InjectionState, calculate_injection_state, calculate_injection_state_at};
pub use provider::{ConfiguredEphemeris, ConfiguredSession};
pub use trajectory::{
    MitigationPlan, MitigationRequest, plan_batch, plan_mitigation_trajectory,
    plan_mitigation_trajectory_at,
};

/// Coarse failure categories reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Required input absent or unparsable.
    MissingInput,
    /// Ephemeris or frame data not loaded, or loading failed.
    CollaboratorUnavailable,
    /// Degenerate geometry or a solver that did not converge.
    NumericalDivergence,
    /// Requested identifier absent from a time series document.
    DataNotFound,
    /// Document present but structurally invalid.
    MalformedData,
}

#[derive(Debug, Error)]
pub enum MissionError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("ephemeris error: {0}")]
    Ephemeris(#[from] EphemerisError),
    #[error("ascent error: {0}")]
    Ascent(#[from] AscentError),
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),
    #[error("orbit error: {0}")]
    Orbit(#[from] OrbitError),
    #[error("sampler error: {0}")]
    Sampler(#[from] SamplerError),
    #[error("trajectory error: {0}")]
    Segment(#[from] SegmentError),
    #[error("ephemeris provider `{provider}` is not available in this build")]
    ProviderUnavailable { provider: &'static str },
}

impl MissionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(ConfigError::Io(_)) => ErrorKind::MissingInput,
            Self::Config(_) => ErrorKind::MalformedData,
            Self::Ephemeris(err) => ephemeris_kind(err),
            Self::Ascent(AscentError::InvalidParameter { .. }) => ErrorKind::MissingInput,
            Self::Ascent(AscentError::AltitudeNotReached { .. }) => ErrorKind::NumericalDivergence,
            Self::Frame(FrameError::Ephemeris(err)) => ephemeris_kind(err),
            Self::Frame(_) => ErrorKind::NumericalDivergence,
            Self::Orbit(_) => ErrorKind::NumericalDivergence,
            Self::Sampler(SamplerError::NotFound { .. }) => ErrorKind::DataNotFound,
            Self::Sampler(SamplerError::Ephemeris(err)) => ephemeris_kind(err),
            Self::Sampler(_) => ErrorKind::MalformedData,
            Self::Segment(_) => ErrorKind::NumericalDivergence,
            Self::ProviderUnavailable { .. } => ErrorKind::CollaboratorUnavailable,
        }
    }
}

fn ephemeris_kind(err: &EphemerisError) -> ErrorKind {
    if err.is_input_error() {
        ErrorKind::MissingInput
    } else {
        ErrorKind::CollaboratorUnavailable
    }
}
