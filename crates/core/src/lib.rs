//! Core units, constants, and shared primitives for the Deflector workspace.

pub mod matrix;
pub mod state;
pub mod trajectory;

/// Physical constants expressed in SI units (unless stated otherwise).
pub mod constants {
    /// Earth gravitational parameter (km³/s²).
    pub const MU_EARTH_KM3_S2: f64 = 398_600.4418;
    /// Sun gravitational parameter (km³/s²).
    pub const MU_SUN_KM3_S2: f64 = 1.327_124_400_18e11;
    /// Kilometres per astronomical unit.
    pub const AU_KM: f64 = 149_597_870.7;
    /// Seconds per Julian day.
    pub const SECONDS_PER_DAY: f64 = 86_400.0;
    /// Earth equatorial radius (km), IAU 2009 / pck00011 value.
    pub const EARTH_EQUATORIAL_RADIUS_KM: f64 = 6_378.1366;
    /// Earth polar radius (km), IAU 2009 / pck00011 value.
    pub const EARTH_POLAR_RADIUS_KM: f64 = 6_356.7519;
}

/// Basic unit conversion helpers.
pub mod units {
    use super::vector::Vector3;

    /// Convert kilometres to metres.
    #[inline]
    pub fn km_to_m(v: f64) -> f64 {
        v * 1_000.0
    }

    /// Convert metres to kilometres.
    #[inline]
    pub fn m_to_km(v: f64) -> f64 {
        v / 1_000.0
    }

    /// Convert a kilometre vector to metres.
    #[inline]
    pub fn km_to_m3(v: &Vector3) -> Vector3 {
        [km_to_m(v[0]), km_to_m(v[1]), km_to_m(v[2])]
    }

    /// Convert a metre vector to kilometres.
    #[inline]
    pub fn m_to_km3(v: &Vector3) -> Vector3 {
        [m_to_km(v[0]), m_to_km(v[1]), m_to_km(v[2])]
    }
}

/// Lightweight time utilities shared across crates.
pub mod time {
    use super::constants::SECONDS_PER_DAY;

    /// Convert seconds to days.
    #[inline]
    pub fn seconds_to_days(seconds: f64) -> f64 {
        seconds / SECONDS_PER_DAY
    }

    /// Julian centuries of TDB elapsed since J2000 for an ephemeris time.
    #[inline]
    pub fn julian_centuries(et: f64) -> f64 {
        seconds_to_days(et) / 36_525.0
    }
}

/// Minimal vector helpers to avoid ad-hoc `[f64; 3]` math everywhere.
pub mod vector {
    /// Alias for a 3D vector in kilometres or km/s depending on context.
    pub type Vector3 = [f64; 3];

    /// The zero vector.
    pub const ZERO: Vector3 = [0.0, 0.0, 0.0];

    /// Unit vector along +Z.
    pub const UNIT_Z: Vector3 = [0.0, 0.0, 1.0];

    /// Euclidean norm of a vector.
    #[inline]
    pub fn norm(v: &Vector3) -> f64 {
        dot(v, v).sqrt()
    }

    /// Dot product of two vectors.
    #[inline]
    pub fn dot(a: &Vector3, b: &Vector3) -> f64 {
        a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
    }

    /// Cross product `a × b`.
    #[inline]
    pub fn cross(a: &Vector3, b: &Vector3) -> Vector3 {
        [
            a[1] * b[2] - a[2] * b[1],
            a[2] * b[0] - a[0] * b[2],
            a[0] * b[1] - a[1] * b[0],
        ]
    }

    /// Vector addition.
    #[inline]
    pub fn add(a: &Vector3, b: &Vector3) -> Vector3 {
        [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
    }

    /// Vector subtraction.
    #[inline]
    pub fn sub(a: &Vector3, b: &Vector3) -> Vector3 {
        [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
    }

    /// Scale a vector by a scalar.
    #[inline]
    pub fn scale(v: &Vector3, s: f64) -> Vector3 {
        [v[0] * s, v[1] * s, v[2] * s]
    }

    /// Unit vector in the direction of `v`, or `None` for a zero (or non-finite) norm.
    #[inline]
    pub fn normalize(v: &Vector3) -> Option<Vector3> {
        let n = norm(v);
        if n > 0.0 && n.is_finite() {
            Some(scale(v, 1.0 / n))
        } else {
            None
        }
    }

    /// Linear interpolation `a + t (b - a)`, component-wise.
    #[inline]
    pub fn lerp(a: &Vector3, b: &Vector3, t: f64) -> Vector3 {
        [
            a[0] + t * (b[0] - a[0]),
            a[1] + t * (b[1] - a[1]),
            a[2] + t * (b[2] - a[2]),
        ]
    }
}
