//! Frame-tagged state vectors.
//!
//! The frame is part of the type, so a topocentric state cannot be handed to
//! code that expects an inertial one without going through a transform that
//! produces the new tag.

use std::fmt;
use std::marker::PhantomData;

use crate::vector::{self, Vector3};

/// Reference frame families used by the trajectory pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
    /// Local East-North-Up frame anchored at a surface site.
    TopocentricEnu,
    /// Frame rotating with the central body (e.g. ITRF93, IAU_EARTH).
    BodyFixed,
    /// Non-rotating frame (e.g. J2000).
    Inertial,
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::TopocentricEnu => "topocentric-ENU",
            Self::BodyFixed => "body-fixed",
            Self::Inertial => "inertial",
        };
        f.write_str(label)
    }
}

/// Marker trait implemented by the frame tags below.
pub trait Frame: fmt::Debug + Clone + Copy + PartialEq + Send + Sync + 'static {
    const KIND: FrameKind;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Topocentric;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyFixed;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inertial;

impl Frame for Topocentric {
    const KIND: FrameKind = FrameKind::TopocentricEnu;
}

impl Frame for BodyFixed {
    const KIND: FrameKind = FrameKind::BodyFixed;
}

impl Frame for Inertial {
    const KIND: FrameKind = FrameKind::Inertial;
}

/// Position (km) and velocity (km/s) relative to `center`, expressed in frame `F`.
#[derive(Debug, Clone, PartialEq)]
pub struct StateVector<F: Frame> {
    pub position_km: Vector3,
    pub velocity_km_s: Vector3,
    pub center: String,
    frame: PhantomData<F>,
}

impl<F: Frame> StateVector<F> {
    pub fn new(position_km: Vector3, velocity_km_s: Vector3, center: impl Into<String>) -> Self {
        Self {
            position_km,
            velocity_km_s,
            center: center.into(),
            frame: PhantomData,
        }
    }

    pub fn frame_kind(&self) -> FrameKind {
        F::KIND
    }

    pub fn radius_km(&self) -> f64 {
        vector::norm(&self.position_km)
    }

    pub fn speed_km_s(&self) -> f64 {
        vector::norm(&self.velocity_km_s)
    }
}

impl StateVector<Inertial> {
    /// Chain a state relative to `self.center` onto this state.
    ///
    /// `self` is the intermediate body relative to the primary; `relative` is
    /// the object relative to that intermediate body. Both must share the
    /// same inertial axes.
    pub fn compose(&self, relative: &StateVector<Inertial>) -> StateVector<Inertial> {
        StateVector::new(
            vector::add(&self.position_km, &relative.position_km),
            vector::add(&self.velocity_km_s, &relative.velocity_km_s),
            self.center.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_tag_is_carried_by_the_type() {
        let state = StateVector::<BodyFixed>::new([1.0, 0.0, 0.0], [0.0; 3], "EARTH");
        assert_eq!(state.frame_kind(), FrameKind::BodyFixed);
        assert_eq!(state.frame_kind().to_string(), "body-fixed");
    }

    #[test]
    fn compose_keeps_the_outer_center() {
        let earth = StateVector::<Inertial>::new([10.0, 0.0, 0.0], [0.0, 1.0, 0.0], "SUN");
        let vehicle = StateVector::<Inertial>::new([1.0, 2.0, 0.0], [0.5, 0.0, 0.0], "EARTH");
        let composed = earth.compose(&vehicle);
        assert_eq!(composed.position_km, [11.0, 2.0, 0.0]);
        assert_eq!(composed.velocity_km_s, [0.5, 1.0, 0.0]);
        assert_eq!(composed.center, "SUN");
    }
}
