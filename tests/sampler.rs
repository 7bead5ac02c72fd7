use deflector::ephemeris::{AnalyticEphemeris, EphemerisProvider, EphemerisSession};
use deflector::sampler::{self, EphemerisTimeSeries, SamplerError};
use serde_json::{Value, json};

fn impactor_document(epoch: &str, cartesian: Value) -> Value {
    json!([
        {"id": "document", "version": "1.0"},
        {
            "id": "impactor2025",
            "position": {
                "epoch": epoch,
                "referenceFrame": "INERTIAL",
                "cartesian": cartesian
            }
        }
    ])
}

#[test]
fn linear_interpolation_between_two_samples() {
    let series =
        EphemerisTimeSeries::new(0.0, vec![0.0, 2.0], vec![[0.0; 3], [10.0, 0.0, 0.0]]).unwrap();
    assert_eq!(series.position_at(1.0), [5.0, 0.0, 0.0]);
    assert_eq!(series.position_at(-5.0), [0.0, 0.0, 0.0]);
    assert_eq!(series.position_at(7.0), [10.0, 0.0, 0.0]);
    assert_eq!(series.position_at(0.0), [0.0, 0.0, 0.0]);
}

#[test]
fn flat_cartesian_is_grouped_by_four() {
    let series =
        EphemerisTimeSeries::from_flat_cartesian(50.0, &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0])
            .unwrap();
    assert_eq!(series.len(), 2);
    assert_eq!(series.epoch_et(), 50.0);
    assert_eq!(series.position_at(54.0), [5.0, 6.0, 7.0]);
    assert_eq!(series.position_at(52.0), [3.0, 4.0, 5.0]);
    assert!(matches!(
        EphemerisTimeSeries::from_flat_cartesian(0.0, &[]),
        Err(SamplerError::Empty)
    ));
    assert!(matches!(
        EphemerisTimeSeries::from_flat_cartesian(0.0, &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]),
        Err(SamplerError::PartialSample { len: 6 })
    ));
}

#[test]
fn czml_packet_is_loaded_relative_to_its_epoch() {
    let provider = AnalyticEphemeris::new();
    let session = provider.load().unwrap();
    let document = impactor_document(
        "2025-01-01T00:00:00Z",
        json!([0.0, 0.0, 0.0, 0.0, 2.0, 10_000.0, 0.0, 0.0]),
    );
    let series = sampler::from_czml(&document, "impactor2025", &session).unwrap();
    let epoch_et = session.epoch_from_text("2025-01-01 00:00:00").unwrap();
    assert_eq!(series.epoch_et(), epoch_et);

    let km = series.metres_to_km();
    let midpoint = km.position_at(epoch_et + 1.0);
    assert!((midpoint[0] - 5.0).abs() < 1e-9);
    assert_eq!(km.position_at(epoch_et + 100.0), [10.0, 0.0, 0.0]);
}

#[test]
fn offset_epochs_resolve_to_the_same_instant() {
    let provider = AnalyticEphemeris::new();
    let session = provider.load().unwrap();
    let cartesian = json!([0.0, 1.0, 1.0, 1.0]);
    let zulu = sampler::from_czml(
        &impactor_document("2025-01-01T02:00:00Z", cartesian.clone()),
        "impactor2025",
        &session,
    )
    .unwrap();
    let shifted = sampler::from_czml(
        &impactor_document("2025-01-01T04:00:00+02:00", cartesian),
        "impactor2025",
        &session,
    )
    .unwrap();
    assert_eq!(zulu.epoch_et(), shifted.epoch_et());
}

#[test]
fn missing_packet_is_not_found() {
    let provider = AnalyticEphemeris::new();
    let session = provider.load().unwrap();
    let document = impactor_document("2025-01-01T00:00:00Z", json!([0.0, 0.0, 0.0, 0.0]));
    match sampler::from_czml(&document, "apophis", &session) {
        Err(SamplerError::NotFound { id }) => assert_eq!(id, "apophis"),
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[test]
fn malformed_packets_are_reported() {
    let provider = AnalyticEphemeris::new();
    let session = provider.load().unwrap();

    let short = impactor_document("2025-01-01T00:00:00Z", json!([0.0, 1.0, 2.0, 3.0, 4.0, 5.0]));
    assert!(matches!(
        sampler::from_czml(&short, "impactor2025", &session),
        Err(SamplerError::Malformed { .. })
    ));

    let no_position = json!([{
        "id": "impactor2025",
        "availability": "2025-01-01T00:00:00Z/2025-01-02T00:00:00Z"
    }]);
    match sampler::from_czml(&no_position, "impactor2025", &session) {
        Err(SamplerError::Malformed { reason, .. }) => assert!(reason.contains("`position`")),
        other => panic!("expected Malformed, got {other:?}"),
    }

    let no_cartesian = json!([{
        "id": "impactor2025",
        "position": {"epoch": "2025-01-01T00:00:00Z"}
    }]);
    match sampler::from_czml(&no_cartesian, "impactor2025", &session) {
        Err(SamplerError::Malformed { reason, .. }) => assert!(reason.contains("cartesian")),
        other => panic!("expected Malformed, got {other:?}"),
    }

    let no_epoch = json!([{"id": "impactor2025", "position": {"cartesian": [0.0, 0.0, 0.0, 0.0]}}]);
    match sampler::from_czml(&no_epoch, "impactor2025", &session) {
        Err(SamplerError::Malformed { reason, .. }) => assert!(reason.contains("epoch")),
        other => panic!("expected Malformed, got {other:?}"),
    }

    let not_numbers = impactor_document("2025-01-01T00:00:00Z", json!([0.0, "x", 0.0, 0.0]));
    assert!(matches!(
        sampler::from_czml(&not_numbers, "impactor2025", &session),
        Err(SamplerError::Malformed { .. })
    ));

    let decreasing = impactor_document(
        "2025-01-01T00:00:00Z",
        json!([5.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0]),
    );
    assert!(matches!(
        sampler::from_czml(&decreasing, "impactor2025", &session),
        Err(SamplerError::Malformed { .. })
    ));

    let bad_epoch = impactor_document("yesterday", json!([0.0, 0.0, 0.0, 0.0]));
    assert!(matches!(
        sampler::from_czml(&bad_epoch, "impactor2025", &session),
        Err(SamplerError::Ephemeris(_))
    ));
}
