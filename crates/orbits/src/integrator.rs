//! Fixed-step RK4 for point-mass two-body motion.

use deflector_core::vector::{self, Vector3};

use crate::OrbitError;

/// Upper bound on RK4 steps for one call to [`advance`].
const MAX_STEPS: usize = 5_000_000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitalState {
    pub position_km: Vector3,
    pub velocity_km_s: Vector3,
}

fn acceleration(position: &Vector3, mu: f64) -> Vector3 {
    let r = vector::norm(position);
    vector::scale(position, -mu / (r * r * r))
}

fn derivative(state: &OrbitalState, mu: f64) -> (Vector3, Vector3) {
    (state.velocity_km_s, acceleration(&state.position_km, mu))
}

fn offset(state: &OrbitalState, k: &(Vector3, Vector3), h: f64) -> OrbitalState {
    OrbitalState {
        position_km: vector::add(&state.position_km, &vector::scale(&k.0, h)),
        velocity_km_s: vector::add(&state.velocity_km_s, &vector::scale(&k.1, h)),
    }
}

/// Single RK4 step of length `h`.
pub fn rk4_step(state: &OrbitalState, h: f64, mu: f64) -> OrbitalState {
    let k1 = derivative(state, mu);
    let k2 = derivative(&offset(state, &k1, h * 0.5), mu);
    let k3 = derivative(&offset(state, &k2, h * 0.5), mu);
    let k4 = derivative(&offset(state, &k3, h), mu);

    let combine = |a: &Vector3, b: &Vector3, c: &Vector3, d: &Vector3| {
        [
            (a[0] + 2.0 * b[0] + 2.0 * c[0] + d[0]) * (h / 6.0),
            (a[1] + 2.0 * b[1] + 2.0 * c[1] + d[1]) * (h / 6.0),
            (a[2] + 2.0 * b[2] + 2.0 * c[2] + d[2]) * (h / 6.0),
        ]
    };

    OrbitalState {
        position_km: vector::add(
            &state.position_km,
            &combine(&k1.0, &k2.0, &k3.0, &k4.0),
        ),
        velocity_km_s: vector::add(
            &state.velocity_km_s,
            &combine(&k1.1, &k2.1, &k3.1, &k4.1),
        ),
    }
}

/// Advance `state` by `duration` seconds. Each substep is capped at
/// `step_fraction · sqrt(r³/μ)` evaluated at the start of the substep.
pub fn advance(
    state: &OrbitalState,
    duration: f64,
    mu: f64,
    step_fraction: f64,
) -> Result<OrbitalState, OrbitError> {
    let mut current = *state;
    let mut remaining = duration;
    let mut steps = 0usize;
    while remaining > 0.0 {
        let r = vector::norm(&current.position_km);
        if r <= 0.0 || !r.is_finite() {
            return Err(OrbitError::ZeroRadius);
        }
        let h = (step_fraction * (r * r * r / mu).sqrt()).min(remaining);
        current = rk4_step(&current, h, mu);
        remaining -= h;
        steps += 1;
        if steps > MAX_STEPS {
            return Err(OrbitError::StepLimit { steps: MAX_STEPS });
        }
    }
    Ok(current)
}
