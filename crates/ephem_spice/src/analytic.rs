//! Closed-form Earth/Sun ephemeris for running the engine without SPICE kernels.
//!
//! - Earth orientation: rotation about the J2000 pole by the Earth Rotation
//!   Angle (IERS 2010), precession and nutation ignored. `ITRF93` and
//!   `IAU_EARTH` share this model.
//! - Earth heliocentric state: mean Keplerian elements of the Earth-Moon
//!   barycentre (Standish, valid 1800–2050), solved with Newton iteration.
//! - Time scales: see [`crate::time`].

use std::f64::consts::TAU;

use deflector_core::constants::{AU_KM, MU_SUN_KM3_S2, SECONDS_PER_DAY};
use deflector_core::matrix::{self, IDENTITY3, Matrix6};
use deflector_core::state::{Inertial, StateVector};
use deflector_core::time::julian_centuries;
use deflector_core::vector::{self, Vector3};
use log::debug;

use crate::{EphemerisError, EphemerisProvider, EphemerisSession, time};

/// Mean obliquity of the ecliptic at J2000 (rad), 84381.448 arcsec.
const OBLIQUITY_J2000_RAD: f64 = 84_381.448 / 3_600.0 * std::f64::consts::PI / 180.0;
const ERA_AT_J2000_TURNS: f64 = 0.779_057_273_264_0;
const ERA_RATE_TURNS_PER_DAY: f64 = 1.002_737_811_911_354_48;
const KEPLER_TOLERANCE: f64 = 1e-14;
const KEPLER_MAX_ITERATIONS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AnalyticFrame {
    J2000,
    EclipJ2000,
    EarthFixed,
}

impl AnalyticFrame {
    fn parse(name: &str) -> Result<Self, EphemerisError> {
        match name.trim().to_ascii_uppercase().as_str() {
            "J2000" | "EME2000" => Ok(Self::J2000),
            "ECLIPJ2000" => Ok(Self::EclipJ2000),
            "ITRF93" | "IAU_EARTH" | "EARTH_FIXED" => Ok(Self::EarthFixed),
            _ => Err(EphemerisError::UnknownFrame {
                frame: name.to_string(),
            }),
        }
    }

    fn is_inertial(self) -> bool {
        !matches!(self, Self::EarthFixed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AnalyticBody {
    Sun,
    Earth,
}

impl AnalyticBody {
    fn parse(name: &str) -> Result<Self, EphemerisError> {
        match name.trim().to_ascii_uppercase().as_str() {
            "SUN" | "10" => Ok(Self::Sun),
            "EARTH" | "399" | "EARTH BARYCENTER" | "3" => Ok(Self::Earth),
            _ => Err(EphemerisError::UnknownBody {
                body: name.to_string(),
            }),
        }
    }
}

/// Mean element set: value at J2000 and rate per Julian century.
struct MeanElements {
    semi_major_axis_au: (f64, f64),
    eccentricity: (f64, f64),
    inclination_deg: (f64, f64),
    mean_longitude_deg: (f64, f64),
    perihelion_longitude_deg: (f64, f64),
    node_longitude_deg: (f64, f64),
}

const EARTH_MOON_BARYCENTER: MeanElements = MeanElements {
    semi_major_axis_au: (1.000_002_61, 0.000_005_62),
    eccentricity: (0.016_711_23, -0.000_043_92),
    inclination_deg: (-0.000_015_31, -0.012_946_68),
    mean_longitude_deg: (100.464_571_66, 35_999.372_449_81),
    perihelion_longitude_deg: (102.937_681_93, 0.323_273_64),
    node_longitude_deg: (0.0, 0.0),
};

/// Analytical provider. Loading is free, so sessions never contend.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyticEphemeris;

impl AnalyticEphemeris {
    pub fn new() -> Self {
        Self
    }
}

impl EphemerisProvider for AnalyticEphemeris {
    type Session<'a> = AnalyticSession<'a>;

    fn load(&self) -> Result<Self::Session<'_>, EphemerisError> {
        debug!("analytical ephemeris session opened");
        Ok(AnalyticSession { _provider: self })
    }

    fn name(&self) -> &'static str {
        "analytic"
    }
}

/// Query handle for [`AnalyticEphemeris`].
#[derive(Debug)]
pub struct AnalyticSession<'a> {
    _provider: &'a AnalyticEphemeris,
}

impl Drop for AnalyticSession<'_> {
    fn drop(&mut self) {
        debug!("analytical ephemeris session closed");
    }
}

impl AnalyticSession<'_> {
    /// State transform taking `frame` coordinates into J2000.
    fn to_j2000(&self, frame: AnalyticFrame, et: f64) -> Result<Matrix6, EphemerisError> {
        let zero = [[0.0; 3]; 3];
        match frame {
            AnalyticFrame::J2000 => Ok(matrix::state_transform(&IDENTITY3, &zero)),
            AnalyticFrame::EclipJ2000 => Ok(matrix::state_transform(
                &matrix::rot_x(OBLIQUITY_J2000_RAD),
                &zero,
            )),
            AnalyticFrame::EarthFixed => {
                let (angle, rate) = earth_rotation_angle(et)?;
                Ok(matrix::state_transform(
                    &matrix::rot_z(angle),
                    &matrix::rot_z_rate(angle, rate),
                ))
            }
        }
    }

    fn heliocentric_ecliptic(
        &self,
        body: AnalyticBody,
        et: f64,
    ) -> Result<(Vector3, Vector3), EphemerisError> {
        match body {
            AnalyticBody::Sun => Ok((vector::ZERO, vector::ZERO)),
            AnalyticBody::Earth => mean_element_state(&EARTH_MOON_BARYCENTER, et),
        }
    }
}

impl EphemerisSession for AnalyticSession<'_> {
    fn state_transform(&self, from: &str, to: &str, et: f64) -> Result<Matrix6, EphemerisError> {
        let from = AnalyticFrame::parse(from)?;
        let to = AnalyticFrame::parse(to)?;
        let from_to_j2000 = self.to_j2000(from, et)?;
        let j2000_to_target = matrix::invert_state_transform(&self.to_j2000(to, et)?);
        Ok(matrix::mul6(&j2000_to_target, &from_to_j2000))
    }

    fn relative_state(
        &self,
        target: &str,
        observer: &str,
        frame: &str,
        et: f64,
    ) -> Result<StateVector<Inertial>, EphemerisError> {
        let frame_id = AnalyticFrame::parse(frame)?;
        if !frame_id.is_inertial() {
            return Err(EphemerisError::FrameNotInertial {
                frame: frame.to_string(),
            });
        }
        let (target_r, target_v) = self.heliocentric_ecliptic(AnalyticBody::parse(target)?, et)?;
        let (observer_r, observer_v) =
            self.heliocentric_ecliptic(AnalyticBody::parse(observer)?, et)?;
        let position = vector::sub(&target_r, &observer_r);
        let velocity = vector::sub(&target_v, &observer_v);

        let transform = self.state_transform("ECLIPJ2000", frame, et)?;
        let (position, velocity) = matrix::apply_state(&transform, &position, &velocity);
        Ok(StateVector::new(position, velocity, observer.trim().to_ascii_uppercase()))
    }

    fn epoch_from_text(&self, text: &str) -> Result<f64, EphemerisError> {
        time::utc_to_et(&time::parse_utc(text)?)
    }

    fn format_epoch(&self, et: f64) -> Result<String, EphemerisError> {
        time::format_iso(et)
    }
}

/// Earth rotation angle (rad, wrapped to [0, 2π)) and its rate (rad/s) at `et`.
fn earth_rotation_angle(et: f64) -> Result<(f64, f64), EphemerisError> {
    let ut1_days = time::et_to_utc_seconds(et)? / SECONDS_PER_DAY;
    let turns = ERA_AT_J2000_TURNS + ERA_RATE_TURNS_PER_DAY * ut1_days;
    let angle = TAU * turns.rem_euclid(1.0);
    let rate = TAU * ERA_RATE_TURNS_PER_DAY / SECONDS_PER_DAY;
    Ok((angle, rate))
}

fn mean_element_state(
    elements: &MeanElements,
    et: f64,
) -> Result<(Vector3, Vector3), EphemerisError> {
    let t = julian_centuries(et);
    let at = |(base, rate): (f64, f64)| base + rate * t;

    let a_km = at(elements.semi_major_axis_au) * AU_KM;
    let e = at(elements.eccentricity);
    let inclination = at(elements.inclination_deg).to_radians();
    let mean_longitude = at(elements.mean_longitude_deg).to_radians();
    let perihelion_longitude = at(elements.perihelion_longitude_deg).to_radians();
    let node = at(elements.node_longitude_deg).to_radians();

    let argument_of_perihelion = perihelion_longitude - node;
    let mean_anomaly = (mean_longitude - perihelion_longitude).rem_euclid(TAU);
    let eccentric_anomaly = solve_kepler(mean_anomaly, e).ok_or_else(|| {
        EphemerisError::InvalidEpoch {
            epoch: format!("ET {et} (Kepler iteration did not converge)"),
        }
    })?;

    let (sin_e, cos_e) = eccentric_anomaly.sin_cos();
    let mean_motion = (MU_SUN_KM3_S2 / a_km.powi(3)).sqrt();
    let e_dot = mean_motion / (1.0 - e * cos_e);
    let root = (1.0 - e * e).sqrt();

    let orbital_position = [a_km * (cos_e - e), a_km * root * sin_e, 0.0];
    let orbital_velocity = [-a_km * sin_e * e_dot, a_km * root * cos_e * e_dot, 0.0];

    let to_ecliptic = matrix::mul(
        &matrix::rot_z(node),
        &matrix::mul(
            &matrix::rot_x(inclination),
            &matrix::rot_z(argument_of_perihelion),
        ),
    );
    Ok((
        matrix::mul_vec(&to_ecliptic, &orbital_position),
        matrix::mul_vec(&to_ecliptic, &orbital_velocity),
    ))
}

fn solve_kepler(mean_anomaly: f64, eccentricity: f64) -> Option<f64> {
    let mut estimate = if eccentricity < 0.8 {
        mean_anomaly
    } else {
        std::f64::consts::PI
    };
    for _ in 0..KEPLER_MAX_ITERATIONS {
        let residual = estimate - eccentricity * estimate.sin() - mean_anomaly;
        let step = residual / (1.0 - eccentricity * estimate.cos());
        estimate -= step;
        if step.abs() < KEPLER_TOLERANCE {
            return Some(estimate);
        }
    }
    None
}
