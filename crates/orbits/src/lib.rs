//! Post-injection orbit propagation around the central body.
//!
//! The propagator samples `periods` nominal periods of the seed state at a
//! fixed count of evenly spaced times. The nominal period uses the seed
//! radius, `T = 2π·sqrt(r³/μ)`, not the osculating semi-major axis.

use std::f64::consts::TAU;

use deflector_config::{OrbitConfig, PropagationMethod};
use deflector_core::state::{Inertial, StateVector};
use deflector_core::trajectory::{SegmentError, TrajectorySample, TrajectorySegment};
use deflector_core::units::km_to_m3;
use deflector_core::vector;
use log::debug;
use thiserror::Error;

pub mod integrator;
pub mod kepler;

use integrator::OrbitalState;

#[derive(Debug, Error, PartialEq)]
pub enum OrbitError {
    #[error("seed position has zero radius")]
    ZeroRadius,
    #[error("gravitational parameter must be positive (got {mu})")]
    InvalidMu { mu: f64 },
    #[error("need at least two samples (got {count})")]
    TooFewSamples { count: usize },
    #[error("number of periods must be positive (got {periods})")]
    InvalidPeriods { periods: f64 },
    #[error("universal anomaly did not converge for a {time_s} s step")]
    NoConvergence { time_s: f64 },
    #[error("integration exceeded {steps} steps")]
    StepLimit { steps: usize },
    #[error("invalid orbit segment: {0}")]
    Segment(#[from] SegmentError),
}

/// Two-body propagator settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitPropagator {
    pub mu_km3_s2: f64,
    pub sample_count: usize,
    pub periods: f64,
    pub method: PropagationMethod,
    pub max_step_fraction: f64,
}

impl OrbitPropagator {
    pub fn from_config(config: &OrbitConfig) -> Self {
        Self {
            mu_km3_s2: config.mu_km3_s2,
            sample_count: config.sample_count,
            periods: config.periods,
            method: config.method,
            max_step_fraction: config.max_step_fraction,
        }
    }

    pub fn with_method(mut self, method: PropagationMethod) -> Self {
        self.method = method;
        self
    }

    fn validate(&self) -> Result<(), OrbitError> {
        if !(self.mu_km3_s2.is_finite() && self.mu_km3_s2 > 0.0) {
            return Err(OrbitError::InvalidMu { mu: self.mu_km3_s2 });
        }
        if self.sample_count < 2 {
            return Err(OrbitError::TooFewSamples {
                count: self.sample_count,
            });
        }
        if !(self.periods.is_finite() && self.periods > 0.0) {
            return Err(OrbitError::InvalidPeriods {
                periods: self.periods,
            });
        }
        Ok(())
    }

    /// Nominal period for a seed radius.
    pub fn period_s(&self, radius_km: f64) -> Result<f64, OrbitError> {
        if !(radius_km.is_finite() && radius_km > 0.0) {
            return Err(OrbitError::ZeroRadius);
        }
        if !(self.mu_km3_s2.is_finite() && self.mu_km3_s2 > 0.0) {
            return Err(OrbitError::InvalidMu { mu: self.mu_km3_s2 });
        }
        Ok(TAU * (radius_km.powi(3) / self.mu_km3_s2).sqrt())
    }

    /// Evenly spaced offsets from 0 to `periods · T`, both ends included.
    pub fn sample_offsets(&self, radius_km: f64) -> Result<Vec<f64>, OrbitError> {
        self.validate()?;
        let span = self.periods * self.period_s(radius_km)?;
        let last = (self.sample_count - 1) as f64;
        Ok((0..self.sample_count)
            .map(|i| span * i as f64 / last)
            .collect())
    }

    /// Propagate an inertial seed state and sample it.
    ///
    /// Sample times are `seed_time_s + offset` relative to `epoch_et`, so the
    /// first sample sits exactly at the seed time. Positions are in metres.
    pub fn propagate(
        &self,
        seed: &StateVector<Inertial>,
        seed_time_s: f64,
        epoch_et: f64,
    ) -> Result<TrajectorySegment, OrbitError> {
        self.validate()?;
        let radius = seed.radius_km();
        let offsets = self.sample_offsets(radius)?;
        let mut segment = TrajectorySegment::with_capacity(epoch_et, offsets.len());

        match self.method {
            PropagationMethod::Kepler => {
                for offset in &offsets {
                    let (position, velocity) = kepler::propagate(
                        &seed.position_km,
                        &seed.velocity_km_s,
                        *offset,
                        self.mu_km3_s2,
                    )?;
                    segment.push(
                        TrajectorySample::new(seed_time_s + offset, km_to_m3(&position))
                            .with_velocity(km_to_m3(&velocity)),
                    )?;
                }
            }
            PropagationMethod::Integrated => {
                let mut state = OrbitalState {
                    position_km: seed.position_km,
                    velocity_km_s: seed.velocity_km_s,
                };
                let mut previous = 0.0;
                for offset in &offsets {
                    state = integrator::advance(
                        &state,
                        offset - previous,
                        self.mu_km3_s2,
                        self.max_step_fraction,
                    )?;
                    previous = *offset;
                    segment.push(
                        TrajectorySample::new(
                            seed_time_s + offset,
                            km_to_m3(&state.position_km),
                        )
                        .with_velocity(km_to_m3(&state.velocity_km_s)),
                    )?;
                }
            }
        }

        debug!(
            "{:?} propagation: {} samples over {:.1} s (seed radius {:.3} km, speed {:.4} km/s)",
            self.method,
            segment.len(),
            offsets.last().copied().unwrap_or(0.0),
            radius,
            vector::norm(&seed.velocity_km_s)
        );
        Ok(segment)
    }
}

impl Default for OrbitPropagator {
    fn default() -> Self {
        Self::from_config(&OrbitConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use deflector_core::constants::MU_EARTH_KM3_S2;

    fn circular_seed(radius_km: f64) -> StateVector<Inertial> {
        let speed = (MU_EARTH_KM3_S2 / radius_km).sqrt();
        StateVector::new([radius_km, 0.0, 0.0], [0.0, speed, 0.0], "EARTH")
    }

    #[test]
    fn stumpff_series_matches_closed_form_near_zero() {
        let (c_series, s_series) = kepler::stumpff(1e-7);
        assert_relative_eq!(c_series, 0.5, epsilon = 1e-8);
        assert_relative_eq!(s_series, 1.0 / 6.0, epsilon = 1e-8);
        let (c, s) = kepler::stumpff(1e-3);
        let (c_neg, s_neg) = kepler::stumpff(-1e-3);
        assert_relative_eq!(c, c_neg, epsilon = 1e-4);
        assert_relative_eq!(s, s_neg, epsilon = 1e-4);
    }

    #[test]
    fn kepler_returns_to_start_after_one_period() {
        let seed = circular_seed(7_000.0);
        let propagator = OrbitPropagator::default();
        let period = propagator.period_s(7_000.0).unwrap();
        let (r, v) =
            kepler::propagate(&seed.position_km, &seed.velocity_km_s, period, MU_EARTH_KM3_S2)
                .unwrap();
        for i in 0..3 {
            assert_relative_eq!(r[i], seed.position_km[i], epsilon = 1e-6);
            assert_relative_eq!(v[i], seed.velocity_km_s[i], epsilon = 1e-9);
        }
    }

    #[test]
    fn kepler_quarter_period_of_circular_orbit() {
        let seed = circular_seed(7_000.0);
        let period = OrbitPropagator::default().period_s(7_000.0).unwrap();
        let (r, _) = kepler::propagate(
            &seed.position_km,
            &seed.velocity_km_s,
            period / 4.0,
            MU_EARTH_KM3_S2,
        )
        .unwrap();
        assert_relative_eq!(r[0], 0.0, epsilon = 1e-6);
        assert_relative_eq!(r[1], 7_000.0, epsilon = 1e-6);
    }

    #[test]
    fn kepler_handles_hyperbolic_seed() {
        let radius = 7_000.0;
        let escape = (2.0 * MU_EARTH_KM3_S2 / radius).sqrt();
        let r0 = [radius, 0.0, 0.0];
        let v0 = [0.0, escape * 1.2, 0.0];
        let energy = |r: &[f64; 3], v: &[f64; 3]| {
            0.5 * vector::dot(v, v) - MU_EARTH_KM3_S2 / vector::norm(r)
        };
        let (r, v) = kepler::propagate(&r0, &v0, 20_000.0, MU_EARTH_KM3_S2).unwrap();
        assert!(vector::norm(&r) > radius * 5.0);
        assert_relative_eq!(energy(&r, &v), energy(&r0, &v0), max_relative = 1e-9);
    }

    #[test]
    fn rk4_agrees_with_kepler_over_one_period() {
        let seed = circular_seed(6_778.0);
        let period = OrbitPropagator::default().period_s(6_778.0).unwrap();
        let state = OrbitalState {
            position_km: seed.position_km,
            velocity_km_s: seed.velocity_km_s,
        };
        let integrated = integrator::advance(&state, period * 0.7, MU_EARTH_KM3_S2, 0.01).unwrap();
        let (analytic, _) = kepler::propagate(
            &seed.position_km,
            &seed.velocity_km_s,
            period * 0.7,
            MU_EARTH_KM3_S2,
        )
        .unwrap();
        let error = vector::norm(&vector::sub(&integrated.position_km, &analytic));
        assert!(error < 1e-3, "RK4 drift {error} km");
    }

    #[test]
    fn offsets_span_requested_periods() {
        let propagator = OrbitPropagator::default();
        let offsets = propagator.sample_offsets(6_778.0).unwrap();
        assert_eq!(offsets.len(), 200);
        assert_eq!(offsets[0], 0.0);
        let period = propagator.period_s(6_778.0).unwrap();
        assert_relative_eq!(offsets[199], 2.0 * period, epsilon = 1e-9);
    }

    #[test]
    fn rejects_degenerate_inputs() {
        let propagator = OrbitPropagator::default();
        let zero = StateVector::<Inertial>::new([0.0; 3], [1.0, 0.0, 0.0], "EARTH");
        assert_eq!(propagator.propagate(&zero, 0.0, 0.0), Err(OrbitError::ZeroRadius));

        let mut bad_mu = propagator;
        bad_mu.mu_km3_s2 = 0.0;
        assert!(matches!(
            bad_mu.propagate(&circular_seed(7_000.0), 0.0, 0.0),
            Err(OrbitError::InvalidMu { .. })
        ));

        let mut one_sample = propagator;
        one_sample.sample_count = 1;
        assert_eq!(
            one_sample.propagate(&circular_seed(7_000.0), 0.0, 0.0),
            Err(OrbitError::TooFewSamples { count: 1 })
        );
    }
}
