//! Ascent plus parking-orbit trajectory for the mitigation vehicle.

use deflector_ascent::{self as ascent, AscentParameters, AscentResult, SteeringProfile};
use deflector_config::{MissionConfig, PresentationConfig};
use deflector_core::state::{Inertial, StateVector};
use deflector_core::trajectory::TrajectorySegment;
use deflector_ephem_spice::{EphemerisProvider, EphemerisSession, normalize_epoch_text};
use deflector_export::czml::{self, DocumentStyle, Packet};
use deflector_frames::{FramePair, FramePipeline, LaunchSite};
use deflector_orbits::OrbitPropagator;
use log::{debug, info};
use rayon::prelude::*;

use crate::MissionError;

/// One trajectory request: launch timestamp text and steering selector.
#[derive(Debug, Clone, PartialEq)]
pub struct MitigationRequest {
    pub launch_epoch: String,
    /// Steering selector; `None` uses the configured default.
    pub profile: Option<i64>,
}

impl MitigationRequest {
    pub fn new(launch_epoch: impl Into<String>, profile: Option<i64>) -> Self {
        Self {
            launch_epoch: launch_epoch.into(),
            profile,
        }
    }
}

/// Result of one mitigation trajectory run.
#[derive(Debug, Clone)]
pub struct MitigationPlan {
    pub launch_et: f64,
    pub profile: SteeringProfile,
    pub ascent_duration_s: f64,
    /// Ascent samples in the inertial frame (metres, seconds after launch).
    pub ascent: TrajectorySegment,
    /// Parking-orbit samples, starting at the ascent end time.
    pub orbit: TrajectorySegment,
    /// Central-body-relative inertial state at the end of the ascent (km, km/s).
    pub injection: StateVector<Inertial>,
    pub start_iso: String,
    pub end_iso: String,
}

impl MitigationPlan {
    /// Ascent followed by orbit, sharing the launch epoch.
    pub fn combined(&self) -> Result<TrajectorySegment, MissionError> {
        let mut combined = self.ascent.clone();
        combined.append(self.orbit.clone())?;
        Ok(combined)
    }

    /// CZML document (document packet + vehicle packet) for the combined trajectory.
    pub fn czml_document(&self, presentation: &PresentationConfig) -> Result<Vec<Packet>, MissionError> {
        Ok(czml::trajectory_document(
            &document_style(presentation),
            &self.combined()?,
            &self.start_iso,
            &self.end_iso,
        ))
    }
}

pub fn document_style(presentation: &PresentationConfig) -> DocumentStyle {
    DocumentStyle {
        document_name: presentation.document_name.clone(),
        entity_id: presentation.entity_id.clone(),
        entity_name: presentation.entity_name.clone(),
        clock_multiplier: presentation.clock_multiplier,
        model_uri: presentation.model_uri.clone(),
        model_scale: presentation.model_scale,
        model_minimum_pixel_size: presentation.model_minimum_pixel_size,
        path_color_rgba: presentation.path_color_rgba,
        path_width: presentation.path_width,
        path_resolution: presentation.path_resolution,
        interpolation_degree: presentation.interpolation_degree,
    }
}

pub(crate) fn steering_profile(config: &MissionConfig, selector: Option<i64>) -> SteeringProfile {
    SteeringProfile::from_selector(selector.unwrap_or(i64::from(config.ascent.default_profile)))
}

/// Ascent run and its conversion to the inertial frame, shared with the injection calculator.
pub(crate) struct InertialAscent {
    pub result: AscentResult,
    pub segment: TrajectorySegment,
    pub final_state: StateVector<Inertial>,
}

pub(crate) fn inertial_ascent<S: EphemerisSession + ?Sized>(
    session: &S,
    config: &MissionConfig,
    launch_et: f64,
    profile: SteeringProfile,
) -> Result<InertialAscent, MissionError> {
    let site = LaunchSite::from_config(&config.launch_site)?;
    let pipeline = FramePipeline::new(session, &site, FramePair::from_config(&config.frames), launch_et);

    let result = ascent::integrate(
        &AscentParameters::from_config(&config.ascent, profile),
        &site.name,
    )?;
    let segment = pipeline.transform_samples(
        result
            .samples
            .iter()
            .map(|sample| (sample.time_s, sample.position_km)),
    )?;
    let final_state = pipeline.to_inertial(&result.final_state, result.duration_s)?;
    Ok(InertialAscent {
        result,
        segment,
        final_state,
    })
}

/// Plan a trajectory on an already loaded session from a launch ephemeris time.
pub fn plan_mitigation_trajectory_at<S: EphemerisSession + ?Sized>(
    session: &S,
    config: &MissionConfig,
    launch_et: f64,
    profile: Option<i64>,
) -> Result<MitigationPlan, MissionError> {
    let profile = steering_profile(config, profile);
    let InertialAscent {
        result,
        segment: ascent,
        final_state,
    } = inertial_ascent(session, config, launch_et, profile)?;

    let orbit = OrbitPropagator::from_config(&config.orbit).propagate(
        &final_state,
        result.duration_s,
        launch_et,
    )?;

    let start_iso = session.format_epoch(launch_et)?;
    let end_iso = session.format_epoch(orbit.end_et())?;
    debug!(
        "planned {:?}: ascent {} samples / {:.1} s, orbit {} samples, {start_iso} -> {end_iso}",
        profile,
        ascent.len(),
        result.duration_s,
        orbit.len()
    );

    Ok(MitigationPlan {
        launch_et,
        profile,
        ascent_duration_s: result.duration_s,
        ascent,
        orbit,
        injection: final_state,
        start_iso,
        end_iso,
    })
}

/// Load a session from `provider`, resolve the launch timestamp and plan the trajectory.
///
/// The session is released when this function returns, on success or error.
pub fn plan_mitigation_trajectory<P: EphemerisProvider>(
    provider: &P,
    config: &MissionConfig,
    request: &MitigationRequest,
) -> Result<MitigationPlan, MissionError> {
    let session = provider.load()?;
    let launch_et = session.epoch_from_text(&normalize_epoch_text(&request.launch_epoch)?)?;
    plan_mitigation_trajectory_at(&session, config, launch_et, request.profile)
}

/// Plan independent requests in parallel. Each worker loads its own session.
pub fn plan_batch<P: EphemerisProvider>(
    provider: &P,
    config: &MissionConfig,
    requests: &[MitigationRequest],
) -> Vec<Result<MitigationPlan, MissionError>> {
    info!(
        "planning {} trajectories with the {} provider",
        requests.len(),
        provider.name()
    );
    requests
        .par_iter()
        .map(|request| plan_mitigation_trajectory(provider, config, request))
        .collect()
}
