use approx::assert_relative_eq;
use deflector::config::{OrbitConfig, PropagationMethod};
use deflector::orbits::{OrbitError, OrbitPropagator};
use deflector::primitives::constants::MU_EARTH_KM3_S2;
use deflector::primitives::state::{Inertial, StateVector};
use deflector::primitives::vector;

const LEO_RADIUS_KM: f64 = 6_778.0;

fn circular_seed() -> StateVector<Inertial> {
    let speed = (MU_EARTH_KM3_S2 / LEO_RADIUS_KM).sqrt();
    StateVector::new([LEO_RADIUS_KM, 0.0, 0.0], [0.0, speed, 0.0], "EARTH")
}

fn radii_km(propagator: &OrbitPropagator, seed: &StateVector<Inertial>) -> Vec<f64> {
    propagator
        .propagate(seed, 0.0, 0.0)
        .unwrap()
        .samples()
        .iter()
        .map(|sample| vector::norm(&sample.position_m) / 1_000.0)
        .collect()
}

#[test]
fn circular_orbit_keeps_its_radius_with_both_methods() {
    let seed = circular_seed();
    for (method, tolerance) in [
        (PropagationMethod::Kepler, 1e-6),
        (PropagationMethod::Integrated, 1e-5),
    ] {
        let propagator = OrbitPropagator::default().with_method(method);
        let radii = radii_km(&propagator, &seed);
        assert_eq!(radii.len(), 200);
        let min = radii.iter().copied().fold(f64::INFINITY, f64::min);
        let max = radii.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        assert!(
            (max - LEO_RADIUS_KM).abs() / LEO_RADIUS_KM < tolerance
                && (min - LEO_RADIUS_KM).abs() / LEO_RADIUS_KM < tolerance,
            "{method:?}: radius band [{min}, {max}]"
        );
    }
}

#[test]
fn samples_start_at_the_seed_and_span_two_nominal_periods() {
    let seed = circular_seed();
    let propagator = OrbitPropagator::default();
    let segment = propagator.propagate(&seed, 120.0, 1_000.0).unwrap();
    assert_eq!(segment.epoch_et, 1_000.0);

    let first = segment.samples()[0];
    assert_eq!(first.time_s, 120.0);
    for i in 0..3 {
        assert!((first.position_m[i] - seed.position_km[i] * 1_000.0).abs() < 1e-6);
    }
    let velocity = first.velocity_m_s.expect("orbit samples carry velocity");
    assert!((velocity[1] - seed.velocity_km_s[1] * 1_000.0).abs() < 1e-6);

    let period = propagator.period_s(LEO_RADIUS_KM).unwrap();
    let span = segment.end_time_s().unwrap() - segment.start_time_s().unwrap();
    assert_relative_eq!(span, 2.0 * period, epsilon = 1e-6);
    let last = segment.samples().last().unwrap();
    for i in 0..3 {
        assert!(
            (last.position_m[i] - seed.position_km[i] * 1_000.0).abs() < 1.0,
            "circular orbit returns to the seed after whole periods"
        );
    }
}

#[test]
fn suborbital_seed_propagates_with_both_methods() {
    let seed = StateVector::<Inertial>::new(
        [5_600.0, 3_100.0, 1_200.0],
        [0.9, 1.1, 0.8],
        "EARTH",
    );
    let config = OrbitConfig {
        sample_count: 50,
        ..OrbitConfig::default()
    };
    for method in [PropagationMethod::Kepler, PropagationMethod::Integrated] {
        let propagator = OrbitPropagator::from_config(&config).with_method(method);
        let segment = propagator.propagate(&seed, 99.5, 0.0).unwrap();
        assert_eq!(segment.len(), 50);
        assert_eq!(segment.start_time_s(), Some(99.5));
        for sample in segment.samples() {
            assert!(sample.position_m.iter().all(|c| c.is_finite()));
            assert!(vector::norm(&sample.position_m) < 7_000_000.0);
        }
    }
}

#[test]
fn degenerate_inputs_are_rejected() {
    let propagator = OrbitPropagator::default();
    let at_centre = StateVector::<Inertial>::new([0.0; 3], [1.0, 0.0, 0.0], "EARTH");
    assert_eq!(
        propagator.propagate(&at_centre, 0.0, 0.0).unwrap_err(),
        OrbitError::ZeroRadius
    );

    let config = OrbitConfig {
        sample_count: 1,
        ..OrbitConfig::default()
    };
    assert_eq!(
        OrbitPropagator::from_config(&config)
            .propagate(&circular_seed(), 0.0, 0.0)
            .unwrap_err(),
        OrbitError::TooFewSamples { count: 1 }
    );
}
