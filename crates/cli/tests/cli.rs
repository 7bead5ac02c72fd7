use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

const LAUNCH: &str = "2025-10-14T23:28:58Z";

fn read_json(path: &std::path::Path) -> serde_json::Value {
    let text = fs::read_to_string(path).expect("output file");
    serde_json::from_str(&text).expect("valid JSON")
}

#[test]
fn mitigation_writes_czml_and_csv() {
    let dir = tempfile::tempdir().expect("tempdir");
    let czml_path = dir.path().join("vehicle.czml");
    let csv_path = dir.path().join("vehicle.csv");

    Command::cargo_bin("mitigation")
        .expect("mitigation bin")
        .args([
            "--launch",
            LAUNCH,
            "--profile",
            "2",
            "--output",
            czml_path.to_str().unwrap(),
            "--csv",
            csv_path.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("orbit 200 samples"));

    let document = read_json(&czml_path);
    let packets = document.as_array().expect("packet array");
    assert_eq!(packets.len(), 2);
    assert_eq!(packets[0]["id"], "document");
    assert_eq!(packets[1]["id"], "mitigation_vehicle");
    let cartesian = packets[1]["position"]["cartesian"].as_array().unwrap();
    assert_eq!(cartesian.len() % 4, 0);

    let csv = fs::read_to_string(&csv_path).expect("csv output");
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("time_s,x_m,y_m,z_m"));
    assert_eq!(lines.count(), cartesian.len() / 4);
}

#[test]
fn mitigation_batch_writes_one_document_per_launch() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = dir.path().join("plan.czml");

    Command::cargo_bin("mitigation")
        .expect("mitigation bin")
        .args([
            "--launch",
            LAUNCH,
            "--launch",
            "2026-01-15T12:00:00Z",
            "--output",
            output.to_str().unwrap(),
        ])
        .assert()
        .success();

    for index in 0..2 {
        let document = read_json(&dir.path().join(format!("plan_{index}.czml")));
        assert_eq!(document.as_array().map(Vec::len), Some(2));
    }
    assert!(!output.exists());
}

#[test]
fn injection_state_prints_heliocentric_payload() {
    let output = Command::cargo_bin("injection_state")
        .expect("injection_state bin")
        .args(["--launch", LAUNCH])
        .output()
        .expect("run injection_state");
    assert!(output.status.success());

    let payload: serde_json::Value = serde_json::from_slice(&output.stdout).expect("JSON payload");
    for key in ["epoch", "position", "velocity", "referenceBodyPosition"] {
        assert!(payload.get(key).is_some(), "missing `{key}`");
    }
    assert!(payload["epoch"].as_str().unwrap().starts_with("2025-10-14T23:30"));
    let x = payload["position"]["x"].as_f64().unwrap();
    let y = payload["position"]["y"].as_f64().unwrap();
    let z = payload["position"]["z"].as_f64().unwrap();
    let au = (x * x + y * y + z * z).sqrt() / 149_597_870.7;
    assert!((0.98..1.02).contains(&au), "distance {au} AU");
}

#[test]
fn impactor_position_interpolates_the_czml_track() {
    let dir = tempfile::tempdir().expect("tempdir");
    let czml_path = dir.path().join("impactor.czml");
    let document = serde_json::json!([
        {"id": "document", "version": "1.0"},
        {
            "id": "impactor2025",
            "position": {
                "epoch": "2025-01-01T00:00:00Z",
                "cartesian": [0.0, 0.0, 0.0, 0.0, 2.0, 10000.0, 0.0, 0.0]
            }
        }
    ]);
    fs::write(&czml_path, document.to_string()).expect("write czml");

    let output = Command::cargo_bin("impactor_position")
        .expect("impactor_position bin")
        .args([
            "--czml",
            czml_path.to_str().unwrap(),
            "--at",
            "2025-01-01T00:00:01Z",
        ])
        .output()
        .expect("run impactor_position");
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).expect("JSON report");
    assert_eq!(report["id"], "impactor2025");
    assert_eq!(report["epoch"], "2025-01-01T00:00:01.000");
    let x = report["position"]["x"].as_f64().unwrap();
    assert!((x - 5.0).abs() < 1e-6, "x = {x} km");
    assert_eq!(report["position"]["y"], 0.0);

    Command::cargo_bin("impactor_position")
        .expect("impactor_position bin")
        .args([
            "--czml",
            czml_path.to_str().unwrap(),
            "--at",
            "2025-01-01T00:00:01Z",
            "--id",
            "apophis",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn malformed_launch_epoch_is_reported() {
    Command::cargo_bin("mitigation")
        .expect("mitigation bin")
        .args(["--launch", "not-a-date"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("MissingInput"));
}

#[cfg(not(feature = "spice"))]
#[test]
fn spice_provider_requires_the_feature() {
    Command::cargo_bin("injection_state")
        .expect("injection_state bin")
        .args(["--launch", LAUNCH, "--provider", "spice"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not available"));
}
