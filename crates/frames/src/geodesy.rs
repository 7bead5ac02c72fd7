//! Launch-site geodesy: ellipsoid coordinates and the local ENU basis.

use deflector_config::LaunchSiteConfig;
use deflector_core::matrix::{self, Matrix3};
use deflector_core::vector::{self, Vector3};

use crate::FrameError;

/// Below this norm `ẑ × up` has no usable direction (site on the polar axis).
const DEGENERATE_AXIS_NORM: f64 = 1e-12;

/// Oblate spheroid described by its equatorial and polar radii (km).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    pub equatorial_radius_km: f64,
    pub polar_radius_km: f64,
}

impl Ellipsoid {
    pub fn flattening(&self) -> f64 {
        (self.equatorial_radius_km - self.polar_radius_km) / self.equatorial_radius_km
    }

    /// Body-fixed Cartesian position of a geodetic point (radians, km).
    pub fn geodetic_to_rectangular(&self, longitude: f64, latitude: f64, altitude_km: f64) -> Vector3 {
        let f = self.flattening();
        let e2 = f * (2.0 - f);
        let (sin_lat, cos_lat) = latitude.sin_cos();
        let (sin_lon, cos_lon) = longitude.sin_cos();
        let prime_vertical = self.equatorial_radius_km / (1.0 - e2 * sin_lat * sin_lat).sqrt();
        [
            (prime_vertical + altitude_km) * cos_lat * cos_lon,
            (prime_vertical + altitude_km) * cos_lat * sin_lon,
            (prime_vertical * (1.0 - e2) + altitude_km) * sin_lat,
        ]
    }
}

/// Orthonormal East-North-Up axes expressed in the body-fixed frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnuBasis {
    pub east: Vector3,
    pub north: Vector3,
    pub up: Vector3,
}

impl EnuBasis {
    /// Basis at a body-fixed site: up along the site vector, east = ẑ × up.
    pub fn at(site_km: &Vector3) -> Result<Self, FrameError> {
        let up = vector::normalize(site_km).ok_or(FrameError::Degenerate { component: "up" })?;
        let east_raw = vector::cross(&vector::UNIT_Z, &up);
        if vector::norm(&east_raw) < DEGENERATE_AXIS_NORM {
            return Err(FrameError::Degenerate { component: "east" });
        }
        let east = vector::normalize(&east_raw).ok_or(FrameError::Degenerate { component: "east" })?;
        let north = vector::cross(&up, &east);
        Ok(Self { east, north, up })
    }

    /// Matrix with columns east, north, up (ENU to body-fixed).
    pub fn to_body_fixed(&self) -> Matrix3 {
        matrix::from_columns(&self.east, &self.north, &self.up)
    }

    /// Transpose of [`Self::to_body_fixed`].
    pub fn from_body_fixed(&self) -> Matrix3 {
        matrix::transpose(&self.to_body_fixed())
    }
}

/// Geodetic launch site with its derived body-fixed position and ENU axes.
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchSite {
    pub name: String,
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_km: f64,
    pub ellipsoid: Ellipsoid,
    position_km: Vector3,
    basis: EnuBasis,
}

impl LaunchSite {
    pub fn new(
        name: impl Into<String>,
        latitude_deg: f64,
        longitude_deg: f64,
        altitude_km: f64,
        ellipsoid: Ellipsoid,
    ) -> Result<Self, FrameError> {
        let position_km = ellipsoid.geodetic_to_rectangular(
            longitude_deg.to_radians(),
            latitude_deg.to_radians(),
            altitude_km,
        );
        let basis = EnuBasis::at(&position_km)?;
        Ok(Self {
            name: name.into(),
            latitude_deg,
            longitude_deg,
            altitude_km,
            ellipsoid,
            position_km,
            basis,
        })
    }

    pub fn from_config(config: &LaunchSiteConfig) -> Result<Self, FrameError> {
        Self::new(
            config.name.clone(),
            config.latitude_deg,
            config.longitude_deg,
            config.altitude_km,
            Ellipsoid {
                equatorial_radius_km: config.equatorial_radius_km,
                polar_radius_km: config.polar_radius_km,
            },
        )
    }

    /// Site position in the central body's body-fixed frame (km).
    pub fn position_km(&self) -> Vector3 {
        self.position_km
    }

    pub fn basis(&self) -> &EnuBasis {
        &self.basis
    }
}
