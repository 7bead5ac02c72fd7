use deflector::config::{MissionConfig, PropagationMethod, ProviderKind};
use deflector::ephemeris::{
    AnalyticEphemeris, EphemerisError, EphemerisProvider, EphemerisSession,
};
use deflector::mission::{
    ConfiguredEphemeris, ErrorKind, MissionError, InjectionState, MitigationRequest, calculate_injection_state,
    calculate_injection_state_at, plan_batch, plan_mitigation_trajectory,
    plan_mitigation_trajectory_at,
};
use deflector::primitives::constants::AU_KM;
use deflector::primitives::state::{Inertial, StateVector};
use deflector::primitives::vector;

const LAUNCH: &str = "2025-10-14T23:28:58Z";

fn request(profile: Option<i64>) -> MitigationRequest {
    MitigationRequest::new(LAUNCH, profile)
}

#[test]
fn orbit_segment_starts_exactly_at_ascent_end() {
    let config = MissionConfig::default();
    let provider = AnalyticEphemeris::new();
    for profile in [1, 2, 3] {
        let plan = plan_mitigation_trajectory(&provider, &config, &request(Some(profile))).unwrap();
        assert_eq!(plan.orbit.start_time_s(), plan.ascent.end_time_s());
        assert_eq!(plan.orbit.start_time_s(), Some(plan.ascent_duration_s));
        assert_eq!(plan.orbit.len(), config.orbit.sample_count);

        let combined = plan.combined().unwrap();
        assert_eq!(combined.len(), plan.ascent.len() + plan.orbit.len());
        for pair in combined.samples().windows(2) {
            assert!(pair[1].time_s >= pair[0].time_s);
        }
    }
}

#[test]
fn orbit_seed_matches_last_ascent_sample() {
    let config = MissionConfig::default();
    let plan = plan_mitigation_trajectory(&AnalyticEphemeris::new(), &config, &request(None))
        .unwrap();
    let last_ascent = plan.ascent.samples().last().unwrap().position_m;
    let first_orbit = plan.orbit.samples()[0].position_m;
    for i in 0..3 {
        assert!(
            (last_ascent[i] - first_orbit[i]).abs() < 1e-3,
            "component {i}: {} vs {}",
            last_ascent[i],
            first_orbit[i]
        );
    }
    let altitude_km = vector::norm(&last_ascent) / 1_000.0 - 6_378.1366;
    assert!(altitude_km > 70.0 && altitude_km < 110.0, "altitude {altitude_km}");
}

#[test]
fn integrated_method_tracks_kepler_solution() {
    let mut config = MissionConfig::default();
    config.orbit.sample_count = 25;
    let provider = AnalyticEphemeris::new();
    let kepler = plan_mitigation_trajectory(&provider, &config, &request(Some(1))).unwrap();
    config.orbit.method = PropagationMethod::Integrated;
    let integrated = plan_mitigation_trajectory(&provider, &config, &request(Some(1))).unwrap();

    assert_eq!(kepler.orbit.len(), integrated.orbit.len());
    let start = kepler.ascent_duration_s;
    for (a, b) in kepler.orbit.samples().iter().zip(integrated.orbit.samples()) {
        assert_eq!(a.time_s, b.time_s);
        assert!(b.position_m.iter().all(|c| c.is_finite()));
        // The seed arc stays well clear of periapsis for the first few minutes.
        if a.time_s - start < 900.0 {
            let separation_m = vector::norm(&vector::sub(&a.position_m, &b.position_m));
            assert!(separation_m < 1.0, "separation {separation_m} m at t={}", a.time_s);
        }
    }
}

#[test]
fn czml_document_has_document_and_vehicle_packets() {
    let config = MissionConfig::default();
    let plan = plan_mitigation_trajectory(&AnalyticEphemeris::new(), &config, &request(Some(2)))
        .unwrap();
    let packets = plan.czml_document(&config.presentation).unwrap();
    assert_eq!(packets.len(), 2);

    let json = serde_json::to_value(&packets).unwrap();
    let document = &json[0];
    assert_eq!(document["id"], "document");
    assert_eq!(document["version"], "1.0");
    assert_eq!(document["name"], "Mitigation Vehicle Trajectory");
    assert_eq!(document["clock"]["multiplier"], 100.0);
    assert_eq!(document["clock"]["range"], "LOOP_STOP");
    assert_eq!(document["clock"]["currentTime"], plan.start_iso.as_str());
    assert_eq!(
        document["clock"]["interval"],
        format!("{}/{}", plan.start_iso, plan.end_iso).as_str()
    );
    assert!(document.get("position").is_none());

    let vehicle = &json[1];
    assert_eq!(vehicle["id"], "mitigation_vehicle");
    assert_eq!(vehicle["model"]["gltf"], "/SLS.glb");
    assert_eq!(vehicle["model"]["minimumPixelSize"], 64.0);
    assert_eq!(
        vehicle["path"]["material"]["solidColor"]["color"]["rgba"],
        serde_json::json!([0, 255, 255, 255])
    );
    let position = &vehicle["position"];
    assert_eq!(position["interpolationAlgorithm"], "LAGRANGE");
    assert_eq!(position["interpolationDegree"], 5);
    assert_eq!(position["referenceFrame"], "INERTIAL");
    assert_eq!(position["epoch"], plan.start_iso.as_str());
    let cartesian = position["cartesian"].as_array().unwrap();
    assert_eq!(cartesian.len() % 4, 0);
    assert_eq!(cartesian.len() / 4, plan.ascent.len() + plan.orbit.len());
    assert!(plan.start_iso.starts_with("2025-10-14T23:28:58"));
}

#[test]
fn injection_velocity_is_a_pure_vector_sum() {
    let central = StateVector::<Inertial>::new([1.0e8, 0.0, 0.0], [0.0, 0.0, 0.0], "SUN");
    let vehicle = StateVector::<Inertial>::new([6_500.0, 0.0, 0.0], [1.0, 2.0, 3.0], "EARTH");
    let injection = InjectionState::compose("2025-01-01T00:00:00.000", 0.0, &central, &vehicle);
    assert_eq!(injection.state.velocity_km_s, [1.0, 2.0, 3.0]);
    assert_eq!(injection.state.position_km, [1.0e8 + 6_500.0, 0.0, 0.0]);
    assert_eq!(injection.reference_body_position_km, [1.0e8, 0.0, 0.0]);
    assert_eq!(injection.state.center, "SUN");

    let payload = serde_json::to_value(injection.to_payload()).unwrap();
    assert_eq!(payload["velocity"], serde_json::json!({"x": 1.0, "y": 2.0, "z": 3.0}));
    assert!(payload.get("referenceBodyPosition").is_some());
}

#[test]
fn injection_state_is_heliocentric() {
    let config = MissionConfig::default();
    let provider = AnalyticEphemeris::new();
    let injection = calculate_injection_state(&provider, &config, LAUNCH, Some(1)).unwrap();

    let au = vector::norm(&injection.state.position_km) / AU_KM;
    assert!(au > 0.98 && au < 1.02, "distance {au} AU");
    let speed = vector::norm(&injection.state.velocity_km_s);
    assert!(speed > 27.0 && speed < 33.0, "speed {speed} km/s");

    let offset = vector::sub(&injection.state.position_km, &injection.reference_body_position_km);
    let altitude = vector::norm(&offset) - 6_378.1366;
    assert!(altitude > 70.0 && altitude < 110.0, "vehicle altitude {altitude} km");

    let session = provider.load().unwrap();
    let launch_et = session.epoch_from_text("2025-10-14 23:28:58").unwrap();
    let plan = plan_mitigation_trajectory_at(&session, &config, launch_et, Some(1)).unwrap();
    assert!((injection.epoch_et - (launch_et + plan.ascent_duration_s)).abs() < 1e-6);
    let again = calculate_injection_state_at(&session, &config, launch_et, Some(1)).unwrap();
    assert_eq!(again, injection);
}

#[test]
fn batch_matches_sequential_planning() {
    let config = MissionConfig::default();
    let provider = AnalyticEphemeris::new();
    let requests = vec![
        MitigationRequest::new("2025-10-14T23:28:58Z", Some(1)),
        MitigationRequest::new("2026-03-01T06:00:00Z", Some(2)),
        MitigationRequest::new("2027-07-04T18:30:00+02:00", Some(3)),
    ];
    let batch = plan_batch(&provider, &config, &requests);
    assert_eq!(batch.len(), requests.len());
    for (request, result) in requests.iter().zip(batch) {
        let parallel = result.unwrap();
        let sequential = plan_mitigation_trajectory(&provider, &config, request).unwrap();
        assert_eq!(parallel.launch_et, sequential.launch_et);
        assert_eq!(parallel.orbit, sequential.orbit);
        assert_eq!(parallel.ascent, sequential.ascent);
    }
}

#[test]
fn errors_are_classified() {
    let config = MissionConfig::default();
    let provider = AnalyticEphemeris::new();

    for bad in ["", "not a timestamp", "1960-01-01"] {
        let err = plan_mitigation_trajectory(&provider, &config, &MitigationRequest::new(bad, None))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingInput, "{bad:?}: {err}");
    }

    let mut unknown_frame = MissionConfig::default();
    unknown_frame.frames.body_fixed = "MOON_ME".to_string();
    let err = plan_mitigation_trajectory(&provider, &unknown_frame, &request(None)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CollaboratorUnavailable);

    let mut no_thrust = MissionConfig::default();
    no_thrust.ascent.thrust_acceleration_km_s2 = 0.0;
    let err = plan_mitigation_trajectory(&provider, &no_thrust, &request(None)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NumericalDivergence);

    let mut one_sample = MissionConfig::default();
    one_sample.orbit.sample_count = 1;
    let err = plan_mitigation_trajectory(&provider, &one_sample, &request(None)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NumericalDivergence);
}

#[test]
fn failed_time_conversions_are_split_by_cause() {
    let failure = |short: &str| EphemerisError::Spice {
        short: short.to_string(),
        message: "str2et failed".to_string(),
    };
    let unparsed = MissionError::from(failure("SPICE(UNPARSEDTIME)").for_epoch_text("soon"));
    assert_eq!(unparsed.kind(), ErrorKind::MissingInput);

    let no_leapseconds =
        MissionError::from(failure("SPICE(NOLEAPSECONDS)").for_epoch_text("2025-10-14 23:28:58"));
    assert_eq!(no_leapseconds.kind(), ErrorKind::CollaboratorUnavailable);
}

#[cfg(not(feature = "spice"))]
#[test]
fn spice_provider_is_unavailable_without_feature() {
    let mut config = MissionConfig::default();
    config.ephemeris.provider = ProviderKind::Spice;
    let err = ConfiguredEphemeris::from_config(&config.ephemeris).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CollaboratorUnavailable);
}

#[test]
fn configured_analytic_provider_plans_like_the_bare_provider() {
    let config = MissionConfig::default();
    let configured = ConfiguredEphemeris::from_config(&config.ephemeris).unwrap();
    assert_eq!(configured.name(), "analytic");
    let a = plan_mitigation_trajectory(&configured, &config, &request(Some(1))).unwrap();
    let b = plan_mitigation_trajectory(&AnalyticEphemeris::new(), &config, &request(Some(1)))
        .unwrap();
    assert_eq!(a.orbit, b.orbit);
    assert_eq!(a.start_iso, b.start_iso);
}
