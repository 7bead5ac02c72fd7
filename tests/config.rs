use std::io::Write;
use std::path::Path;

use deflector::config::{
    ConfigError, MissionConfig, PropagationMethod, ProviderKind, load_mission_config,
};
use tempfile::NamedTempFile;

fn yaml_file(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn bundled_mission_file_matches_defaults() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("configs/mission.toml");
    let config = load_mission_config(&path).expect("bundled config should load");
    let defaults = MissionConfig::default();

    assert_eq!(config.launch_site.name, defaults.launch_site.name);
    assert_eq!(config.launch_site.latitude_deg, defaults.launch_site.latitude_deg);
    assert_eq!(config.ascent.time_step_s, defaults.ascent.time_step_s);
    assert_eq!(config.ascent.default_profile, 1);
    assert_eq!(config.orbit.mu_km3_s2, defaults.orbit.mu_km3_s2);
    assert_eq!(config.orbit.sample_count, 200);
    assert_eq!(config.orbit.method, PropagationMethod::Kepler);
    assert_eq!(config.frames.body_fixed, "IAU_EARTH");
    assert_eq!(config.ephemeris.provider, ProviderKind::Analytic);
    assert!(config.ephemeris.kernels.is_empty());
    assert_eq!(config.presentation.path_color_rgba, [0, 255, 255, 255]);
    assert_eq!(config.presentation.impactor_id, "impactor2025");
}

#[test]
fn partial_yaml_keeps_defaults_for_missing_keys() {
    let file = yaml_file(
        "launch_site:\n  name: Kourou\n  latitude_deg: 5.239\n  longitude_deg: -52.768\n\
         orbit:\n  method: integrated\n  sample_count: 50\n",
    );
    let config = load_mission_config(file.path()).unwrap();
    assert_eq!(config.launch_site.name, "Kourou");
    assert_eq!(config.launch_site.latitude_deg, 5.239);
    assert_eq!(config.launch_site.altitude_km, 0.0);
    assert_eq!(config.orbit.method, PropagationMethod::Integrated);
    assert_eq!(config.orbit.sample_count, 50);
    assert_eq!(config.orbit.periods, 2.0);
    assert_eq!(config.ascent.target_altitude_km, 100.0);
    assert_eq!(config.presentation.clock_multiplier, 100.0);
}

#[test]
fn invalid_values_are_rejected_with_the_field_name() {
    let file = yaml_file("ascent:\n  time_step_s: 0.0\n");
    match load_mission_config(file.path()) {
        Err(ConfigError::Invalid { field, .. }) => assert_eq!(field, "ascent.time_step_s"),
        other => panic!("expected Invalid, got {other:?}"),
    }

    let file = yaml_file("launch_site:\n  latitude_deg: 91.0\n");
    assert!(matches!(
        load_mission_config(file.path()),
        Err(ConfigError::Invalid {
            field: "launch_site.latitude_deg",
            ..
        })
    ));

    let mut config = MissionConfig::default();
    config.frames.inertial = "  ".to_string();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::Invalid {
            field: "frames.inertial",
            ..
        })
    ));
}

#[test]
fn unreadable_and_unparsable_files_are_distinguished() {
    assert!(matches!(
        load_mission_config("does/not/exist.toml"),
        Err(ConfigError::Io(_))
    ));

    let file = yaml_file("orbit:\n  method: leapfrog\n");
    assert!(matches!(
        load_mission_config(file.path()),
        Err(ConfigError::Parse(_))
    ));

    let mut toml = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    toml.write_all(b"[orbit\nsample_count = 3").unwrap();
    assert!(matches!(
        load_mission_config(toml.path()),
        Err(ConfigError::Toml(_))
    ));
}
