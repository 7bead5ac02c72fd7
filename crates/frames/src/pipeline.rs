//! Frame pipeline bound to one launch site, one frame pair and one session.
//!
//! Positions go ENU → body-fixed by the basis matrix and site offset, then
//! body-fixed → inertial by a rotation at the sample's absolute time.
//! Velocities always go through the 6×6 state transform so the rotating
//! frame's transport term is kept.

use deflector_config::FrameConfig;
use deflector_core::matrix;
use deflector_core::state::{BodyFixed, Inertial, StateVector, Topocentric};
use deflector_core::trajectory::{TrajectorySample, TrajectorySegment};
use deflector_core::units::km_to_m3;
use deflector_core::vector::{self, Vector3};
use deflector_ephem_spice::EphemerisSession;
use log::debug;

use crate::FrameError;
use crate::geodesy::LaunchSite;

/// Names of the rotating and inertial frames, plus the body both are centred on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramePair {
    pub body_fixed: String,
    pub inertial: String,
    pub central_body: String,
}

impl FramePair {
    pub fn new(
        body_fixed: impl Into<String>,
        inertial: impl Into<String>,
        central_body: impl Into<String>,
    ) -> Self {
        Self {
            body_fixed: body_fixed.into(),
            inertial: inertial.into(),
            central_body: central_body.into(),
        }
    }

    pub fn from_config(config: &FrameConfig) -> Self {
        Self::new(&config.body_fixed, &config.inertial, &config.central_body)
    }
}

pub struct FramePipeline<'s, S: EphemerisSession + ?Sized> {
    session: &'s S,
    site: &'s LaunchSite,
    frames: FramePair,
    launch_et: f64,
}

impl<'s, S: EphemerisSession + ?Sized> FramePipeline<'s, S> {
    pub fn new(session: &'s S, site: &'s LaunchSite, frames: FramePair, launch_et: f64) -> Self {
        Self {
            session,
            site,
            frames,
            launch_et,
        }
    }

    pub fn frames(&self) -> &FramePair {
        &self.frames
    }

    pub fn launch_et(&self) -> f64 {
        self.launch_et
    }

    /// Site-anchored body-fixed state of an ENU state. The site does not move in the body-fixed frame.
    pub fn enu_to_body_fixed(&self, state: &StateVector<Topocentric>) -> StateVector<BodyFixed> {
        let basis = self.site.basis().to_body_fixed();
        let offset = matrix::mul_vec(&basis, &state.position_km);
        StateVector::new(
            vector::add(&self.site.position_km(), &offset),
            matrix::mul_vec(&basis, &state.velocity_km_s),
            self.frames.central_body.clone(),
        )
    }

    pub fn body_fixed_to_inertial(
        &self,
        state: &StateVector<BodyFixed>,
        et: f64,
    ) -> Result<StateVector<Inertial>, FrameError> {
        let transform =
            self.session
                .state_transform(&self.frames.body_fixed, &self.frames.inertial, et)?;
        let (position, velocity) =
            matrix::apply_state(&transform, &state.position_km, &state.velocity_km_s);
        Ok(StateVector::new(position, velocity, state.center.clone()))
    }

    /// ENU state at `elapsed_s` after launch to the central-body-centred inertial frame.
    pub fn to_inertial(
        &self,
        state: &StateVector<Topocentric>,
        elapsed_s: f64,
    ) -> Result<StateVector<Inertial>, FrameError> {
        self.body_fixed_to_inertial(&self.enu_to_body_fixed(state), self.launch_et + elapsed_s)
    }

    /// ENU position at `elapsed_s` after launch to inertial kilometres.
    pub fn position_to_inertial(
        &self,
        enu_km: &Vector3,
        elapsed_s: f64,
    ) -> Result<Vector3, FrameError> {
        let basis = self.site.basis().to_body_fixed();
        let fixed = vector::add(&self.site.position_km(), &matrix::mul_vec(&basis, enu_km));
        let rotation = self.session.rotation(
            &self.frames.body_fixed,
            &self.frames.inertial,
            self.launch_et + elapsed_s,
        )?;
        Ok(matrix::mul_vec(&rotation, &fixed))
    }

    /// Inverse chain: inertial → body-fixed → ENU.
    pub fn inertial_to_enu(
        &self,
        state: &StateVector<Inertial>,
        elapsed_s: f64,
    ) -> Result<StateVector<Topocentric>, FrameError> {
        let transform = self.session.state_transform(
            &self.frames.inertial,
            &self.frames.body_fixed,
            self.launch_et + elapsed_s,
        )?;
        let (fixed_position, fixed_velocity) =
            matrix::apply_state(&transform, &state.position_km, &state.velocity_km_s);
        let to_enu = self.site.basis().from_body_fixed();
        let offset = vector::sub(&fixed_position, &self.site.position_km());
        Ok(StateVector::new(
            matrix::mul_vec(&to_enu, &offset),
            matrix::mul_vec(&to_enu, &fixed_velocity),
            self.site.name.clone(),
        ))
    }

    /// Convert `(elapsed_s, enu_km)` samples into an inertial segment in metres, epoch = launch.
    pub fn transform_samples<I>(&self, samples: I) -> Result<TrajectorySegment, FrameError>
    where
        I: IntoIterator<Item = (f64, Vector3)>,
    {
        let iter = samples.into_iter();
        let mut segment = TrajectorySegment::with_capacity(self.launch_et, iter.size_hint().0);
        for (elapsed_s, enu_km) in iter {
            let inertial_km = self.position_to_inertial(&enu_km, elapsed_s)?;
            segment.push(TrajectorySample::new(elapsed_s, km_to_m3(&inertial_km)))?;
        }
        debug!(
            "transformed {} samples {} -> {}",
            segment.len(),
            self.frames.body_fixed,
            self.frames.inertial
        );
        Ok(segment)
    }
}
