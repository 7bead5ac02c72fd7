//! Topocentric ENU to body-fixed to inertial conversions for launch trajectories.

use deflector_core::trajectory::SegmentError;
use deflector_ephem_spice::EphemerisError;
use thiserror::Error;

pub mod geodesy;
pub mod pipeline;

pub use geodesy::{Ellipsoid, EnuBasis, LaunchSite};
pub use pipeline::{FramePair, FramePipeline};

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("degenerate {component} axis for the launch site")]
    Degenerate { component: &'static str },
    #[error(transparent)]
    Ephemeris(#[from] EphemerisError),
    #[error("invalid trajectory segment: {0}")]
    Segment(#[from] SegmentError),
}
