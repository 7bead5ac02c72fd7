//! Universal-variable two-body propagation (Stumpff functions).
//!
//! Valid for elliptic, parabolic and hyperbolic conics. The universal
//! anomaly equation is monotonic in χ, so Newton steps are safeguarded by a
//! bracket and fall back to bisection when they leave it.

use std::f64::consts::TAU;

use deflector_core::vector::{self, Vector3};

use crate::OrbitError;

const TOLERANCE: f64 = 1e-12;
const MAX_ITERATIONS: usize = 200;
const SERIES_THRESHOLD: f64 = 1e-6;

/// Stumpff functions `(C(z), S(z))`.
pub fn stumpff(z: f64) -> (f64, f64) {
    if z > SERIES_THRESHOLD {
        let sz = z.sqrt();
        ((1.0 - sz.cos()) / z, (sz - sz.sin()) / (sz * z))
    } else if z < -SERIES_THRESHOLD {
        let sz = (-z).sqrt();
        ((sz.cosh() - 1.0) / -z, (sz.sinh() - sz) / (sz * -z))
    } else {
        (
            0.5 - z / 24.0 + z * z / 720.0,
            1.0 / 6.0 - z / 120.0 + z * z / 5_040.0,
        )
    }
}

/// Propagate `(r0, v0)` by `dt` seconds under gravitational parameter `mu`.
pub fn propagate(
    position_km: &Vector3,
    velocity_km_s: &Vector3,
    dt: f64,
    mu: f64,
) -> Result<(Vector3, Vector3), OrbitError> {
    let r0 = vector::norm(position_km);
    if r0 <= 0.0 || !r0.is_finite() {
        return Err(OrbitError::ZeroRadius);
    }
    if dt == 0.0 {
        return Ok((*position_km, *velocity_km_s));
    }

    let sqrt_mu = mu.sqrt();
    let v0_sq = vector::dot(velocity_km_s, velocity_km_s);
    let radial = vector::dot(position_km, velocity_km_s) / r0;
    // Reciprocal semi-major axis; positive for bound orbits.
    let alpha = 2.0 / r0 - v0_sq / mu;

    let mut dt = dt;
    if alpha > SERIES_THRESHOLD / r0 {
        let period = TAU / (sqrt_mu * alpha.powf(1.5));
        dt = dt.rem_euclid(period);
        if dt == 0.0 {
            return Ok((*position_km, *velocity_km_s));
        }
    }

    let anomaly_equation = |chi: f64| {
        let z = alpha * chi * chi;
        let (c, s) = stumpff(z);
        let value = r0 * radial / sqrt_mu * chi * chi * c
            + (1.0 - alpha * r0) * chi.powi(3) * s
            + r0 * chi
            - sqrt_mu * dt;
        let slope = r0 * radial / sqrt_mu * chi * (1.0 - z * s)
            + (1.0 - alpha * r0) * chi * chi * c
            + r0;
        (value, slope)
    };

    let (mut lower, mut upper) = bracket(dt, alpha, sqrt_mu, r0, &anomaly_equation)?;
    let mut chi = if alpha > 0.0 {
        (sqrt_mu * alpha * dt).clamp(lower, upper)
    } else {
        0.5 * (lower + upper)
    };

    let mut converged = false;
    for _ in 0..MAX_ITERATIONS {
        let (value, slope) = anomaly_equation(chi);
        if value.abs() <= TOLERANCE * sqrt_mu * dt.abs().max(1.0) {
            converged = true;
            break;
        }
        if value > 0.0 {
            upper = chi;
        } else {
            lower = chi;
        }
        let newton = chi - value / slope;
        chi = if slope > 0.0 && newton > lower && newton < upper {
            newton
        } else {
            0.5 * (lower + upper)
        };
        if (upper - lower).abs() <= TOLERANCE * chi.abs().max(1.0) {
            converged = true;
            break;
        }
    }
    if !converged {
        return Err(OrbitError::NoConvergence { time_s: dt });
    }

    let z = alpha * chi * chi;
    let (c, s) = stumpff(z);
    let f = 1.0 - chi * chi / r0 * c;
    let g = dt - chi.powi(3) / sqrt_mu * s;
    let position = vector::add(
        &vector::scale(position_km, f),
        &vector::scale(velocity_km_s, g),
    );
    let r = vector::norm(&position);
    if r <= 0.0 || !r.is_finite() {
        return Err(OrbitError::NoConvergence { time_s: dt });
    }
    let f_dot = sqrt_mu / (r * r0) * (z * chi * s - chi);
    let g_dot = 1.0 - chi * chi / r * c;
    let velocity = vector::add(
        &vector::scale(position_km, f_dot),
        &vector::scale(velocity_km_s, g_dot),
    );
    Ok((position, velocity))
}

/// Interval of χ that contains the root for a forward step.
fn bracket(
    dt: f64,
    alpha: f64,
    sqrt_mu: f64,
    r0: f64,
    equation: &dyn Fn(f64) -> (f64, f64),
) -> Result<(f64, f64), OrbitError> {
    if alpha > 0.0 {
        // One full revolution spans χ ∈ [0, 2π/√α] and dt was reduced below a period.
        return Ok((0.0, TAU / alpha.sqrt()));
    }
    if dt < 0.0 {
        return Err(OrbitError::NoConvergence { time_s: dt });
    }
    let mut upper = (sqrt_mu * dt / r0).max(1.0);
    for _ in 0..MAX_ITERATIONS {
        if equation(upper).0 >= 0.0 {
            return Ok((0.0, upper));
        }
        upper *= 2.0;
    }
    Err(OrbitError::NoConvergence { time_s: dt })
}
