//! Heliocentric injection state at the end of the ascent.

use deflector_config::MissionConfig;
use deflector_core::state::{Inertial, StateVector};
use deflector_core::vector::Vector3;
use deflector_ephem_spice::{EphemerisProvider, EphemerisSession, normalize_epoch_text};
use deflector_export::injection::InjectionPayload;
use log::debug;

use crate::MissionError;
use crate::trajectory::{InertialAscent, inertial_ascent, steering_profile};

/// Vehicle state relative to the primary body plus the central body's position (km, km/s).
#[derive(Debug, Clone, PartialEq)]
pub struct InjectionState {
    pub epoch: String,
    pub epoch_et: f64,
    pub state: StateVector<Inertial>,
    pub reference_body_position_km: Vector3,
}

impl InjectionState {
    /// Vector sum of the central body's primary-relative state and the
    /// vehicle's central-body-relative state.
    pub fn compose(
        epoch: impl Into<String>,
        epoch_et: f64,
        central_body: &StateVector<Inertial>,
        vehicle: &StateVector<Inertial>,
    ) -> Self {
        Self {
            epoch: epoch.into(),
            epoch_et,
            state: central_body.compose(vehicle),
            reference_body_position_km: central_body.position_km,
        }
    }

    pub fn to_payload(&self) -> InjectionPayload {
        InjectionPayload {
            epoch: self.epoch.clone(),
            position: self.state.position_km.into(),
            velocity: self.state.velocity_km_s.into(),
            reference_body_position: self.reference_body_position_km.into(),
        }
    }
}

/// Injection state for a launch at `launch_et` using an already loaded session.
pub fn calculate_injection_state_at<S: EphemerisSession + ?Sized>(
    session: &S,
    config: &MissionConfig,
    launch_et: f64,
    profile: Option<i64>,
) -> Result<InjectionState, MissionError> {
    let InertialAscent {
        result,
        final_state,
        ..
    } = inertial_ascent(session, config, launch_et, steering_profile(config, profile))?;

    let injection_et = launch_et + result.duration_s;
    let central_body = session.relative_state(
        &config.frames.central_body,
        &config.frames.primary_body,
        &config.frames.inertial,
        injection_et,
    )?;
    let epoch = session.format_epoch(injection_et)?;
    debug!(
        "injection at {epoch}: vehicle {:.3} km from {}, {} at {:.0} km from {}",
        final_state.radius_km(),
        config.frames.central_body,
        config.frames.central_body,
        central_body.radius_km(),
        config.frames.primary_body
    );
    Ok(InjectionState::compose(
        epoch,
        injection_et,
        &central_body,
        &final_state,
    ))
}

/// Load a session, resolve the launch timestamp and compute the injection state.
pub fn calculate_injection_state<P: EphemerisProvider>(
    provider: &P,
    config: &MissionConfig,
    launch_epoch: &str,
    profile: Option<i64>,
) -> Result<InjectionState, MissionError> {
    let session = provider.load()?;
    let launch_et = session.epoch_from_text(&normalize_epoch_text(launch_epoch)?)?;
    calculate_injection_state_at(&session, config, launch_et, profile)
}
