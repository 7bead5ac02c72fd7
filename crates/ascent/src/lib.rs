//! Simplified launch ascent in the launch site's East-North-Up frame.
//!
//! Point mass, flat ground, constant gravity, constant thrust acceleration.
//! Integration is semi-implicit Euler with a fixed step: velocity first, then
//! position with the updated velocity. The loop ends on the first step whose
//! altitude reaches the target, without root finding, so the exit altitude
//! overshoots by at most one step's displacement.

use deflector_config::AscentConfig;
use deflector_core::state::{StateVector, Topocentric};
use deflector_core::vector::{self, Vector3};
use log::debug;
use thiserror::Error;

/// Pitch-over schedule selected by the caller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SteeringProfile {
    Shallow,
    Moderate,
    Steep,
}

impl SteeringProfile {
    /// Selector 1 and 2 map to the first two profiles; anything else to the steepest.
    pub fn from_selector(selector: i64) -> Self {
        match selector {
            1 => Self::Shallow,
            2 => Self::Moderate,
            _ => Self::Steep,
        }
    }

    pub fn pitch_over_deg(self) -> f64 {
        match self {
            Self::Shallow => 1.0,
            Self::Moderate => 1.5,
            Self::Steep => 2.0,
        }
    }

    /// Fixed thrust direction used when the vehicle has no velocity to follow.
    pub fn pitch_over_direction(self) -> Vector3 {
        let elevation = (90.0 - self.pitch_over_deg()).to_radians();
        [elevation.sin(), 0.0, elevation.cos()]
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum AscentError {
    #[error("ascent parameter `{name}` must be positive and finite (got {value})")]
    InvalidParameter { name: &'static str, value: f64 },
    #[error("target altitude {target_km} km not reached after {elapsed_s} s (altitude {altitude_km} km)")]
    AltitudeNotReached {
        target_km: f64,
        altitude_km: f64,
        elapsed_s: f64,
    },
}

/// Inputs of one ascent run (kilometres, seconds).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AscentParameters {
    pub profile: SteeringProfile,
    pub surface_gravity_km_s2: f64,
    pub thrust_acceleration_km_s2: f64,
    pub burn_duration_s: f64,
    pub vertical_duration_s: f64,
    pub target_altitude_km: f64,
    pub time_step_s: f64,
    pub max_duration_s: f64,
}

impl AscentParameters {
    pub fn from_config(config: &AscentConfig, profile: SteeringProfile) -> Self {
        Self {
            profile,
            surface_gravity_km_s2: config.surface_gravity_km_s2,
            thrust_acceleration_km_s2: config.thrust_acceleration_km_s2,
            burn_duration_s: config.burn_duration_s,
            vertical_duration_s: config.vertical_duration_s,
            target_altitude_km: config.target_altitude_km,
            time_step_s: config.time_step_s,
            max_duration_s: config.max_duration_s,
        }
    }

    fn validate(&self) -> Result<(), AscentError> {
        for (name, value) in [
            ("surface_gravity_km_s2", self.surface_gravity_km_s2),
            ("time_step_s", self.time_step_s),
            ("target_altitude_km", self.target_altitude_km),
            ("max_duration_s", self.max_duration_s),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(AscentError::InvalidParameter { name, value });
            }
        }
        for (name, value) in [
            ("thrust_acceleration_km_s2", self.thrust_acceleration_km_s2),
            ("burn_duration_s", self.burn_duration_s),
            ("vertical_duration_s", self.vertical_duration_s),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(AscentError::InvalidParameter { name, value });
            }
        }
        Ok(())
    }

    /// Unit thrust direction at `time_s`. The zero-velocity fallback is
    /// checked on every step after the vertical phase.
    pub fn thrust_direction(&self, time_s: f64, velocity: &Vector3) -> Vector3 {
        if time_s < self.vertical_duration_s {
            return vector::UNIT_Z;
        }
        vector::normalize(velocity).unwrap_or_else(|| self.profile.pitch_over_direction())
    }
}

impl Default for AscentParameters {
    fn default() -> Self {
        Self::from_config(&AscentConfig::default(), SteeringProfile::Shallow)
    }
}

/// ENU position recorded after an integration step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AscentSample {
    pub time_s: f64,
    pub position_km: Vector3,
}

/// Result of a completed ascent.
#[derive(Debug, Clone, PartialEq)]
pub struct AscentResult {
    pub samples: Vec<AscentSample>,
    pub final_state: StateVector<Topocentric>,
    pub duration_s: f64,
}

impl AscentResult {
    pub fn final_altitude_km(&self) -> f64 {
        self.final_state.position_km[2]
    }
}

/// Integrate from rest at the origin of `site`'s ENU frame until the up
/// component reaches the target altitude. The final state is centred on `site`.
pub fn integrate(params: &AscentParameters, site: &str) -> Result<AscentResult, AscentError> {
    params.validate()?;

    let dt = params.time_step_s;
    let gravity = [0.0, 0.0, -params.surface_gravity_km_s2];
    let mut position = vector::ZERO;
    let mut velocity = vector::ZERO;
    let mut time_s = 0.0;
    let mut samples = Vec::new();

    while position[2] < params.target_altitude_km {
        if time_s >= params.max_duration_s {
            return Err(AscentError::AltitudeNotReached {
                target_km: params.target_altitude_km,
                altitude_km: position[2],
                elapsed_s: time_s,
            });
        }

        let thrust = if time_s < params.burn_duration_s {
            vector::scale(
                &params.thrust_direction(time_s, &velocity),
                params.thrust_acceleration_km_s2,
            )
        } else {
            vector::ZERO
        };
        let acceleration = vector::add(&thrust, &gravity);

        velocity = vector::add(&velocity, &vector::scale(&acceleration, dt));
        position = vector::add(&position, &vector::scale(&velocity, dt));
        time_s += dt;
        samples.push(AscentSample {
            time_s,
            position_km: position,
        });
    }

    debug!(
        "ascent ({:?}) reached {:.3} km after {} steps / {:.1} s",
        params.profile,
        position[2],
        samples.len(),
        time_s
    );

    Ok(AscentResult {
        samples,
        final_state: StateVector::new(position, velocity, site),
        duration_s: time_s,
    })
}
