mod test_signals;

use approx::assert_abs_diff_eq;
use trimic::aoa::{AoaResolver, ArrayGeometry};
use trimic::config::CorrelationMethod;
use trimic::signal_processing::{DelayTriple, angle_error, estimate_delay};
use trimic::simulation::{
    BurstConfig, DEFAULT_DELAY_SCALE_SECS, NoiseConfig, generate_noisy_recording_for_angle,
    generate_recording_for_angle,
};
use trimic::{AngleEstimator, EstimatorConfig};

use test_signals::burst;

fn short_burst() -> BurstConfig {
    BurstConfig {
        num_frames: 2000,
        center_secs: 0.03,
        ..BurstConfig::default()
    }
}

fn estimator() -> AngleEstimator {
    let mut config = EstimatorConfig::default();
    config.conditioning.remove_dc = true;
    AngleEstimator::new(config).unwrap()
}

#[test]
fn test_positive_lag_means_first_argument_is_late() {
    let early = burst(512, 200.0, 1.0);
    let late = burst(512, 207.0, 1.0);
    for method in [CorrelationMethod::Direct, CorrelationMethod::Fft] {
        assert_abs_diff_eq!(estimate_delay(&late, &early, method).unwrap(), 7.0);
        assert_abs_diff_eq!(estimate_delay(&early, &late, method).unwrap(), -7.0);
    }
}

#[test]
fn test_measured_triple_is_consistent() {
    let m1 = burst(400, 150.0, 1.0);
    let m2 = burst(400, 162.0, 1.0);
    let m3 = burst(400, 141.0, 1.0);
    let (delays, _) = DelayTriple::measure(&m1, &m2, &m3, CorrelationMethod::Auto).unwrap();
    assert_eq!(delays, DelayTriple::new(12.0, -9.0, -21.0));
    assert_abs_diff_eq!(delays.closure_error(), 0.0);
}

#[test]
fn test_synthesized_triples_round_trip_through_resolver() {
    let resolver = AoaResolver::default();
    for bearing in [0.0, 15.0, 120.0, 179.0, 181.0, 270.0, 359.0] {
        let delays = ArrayGeometry::delays_for_angle(bearing, 149.0);
        let angle = resolver.resolve(&delays).unwrap();
        assert!(angle_error(angle.degrees(), bearing).abs() < 1e-9);
    }
}

#[test]
fn test_bearing_sweep_clean() {
    let estimator = estimator();
    let config = short_burst();

    for i in 0..12 {
        let bearing = i as f64 * 30.0 + 10.0;
        let recording =
            generate_recording_for_angle(&config, bearing, DEFAULT_DELAY_SCALE_SECS).unwrap();
        let angle = estimator.estimate_recording(&recording).unwrap();
        let error = angle_error(angle.degrees(), bearing);
        assert!(
            error.abs() < 1.0,
            "bearing {} estimated as {} (error {:.2})",
            bearing,
            angle,
            error
        );
    }
}

#[test]
fn test_bearings_near_seam() {
    let estimator = estimator();
    let config = short_burst();

    for bearing in [355.0, 0.0, 2.5] {
        let recording =
            generate_recording_for_angle(&config, bearing, DEFAULT_DELAY_SCALE_SECS).unwrap();
        let angle = estimator.estimate_recording(&recording).unwrap();
        assert!((0.0..360.0).contains(&angle.degrees()));
        assert!(angle_error(angle.degrees(), bearing).abs() < 1.0, "{}", angle);
    }
}

#[test]
fn test_bearing_with_noise() {
    let estimator = estimator();
    let config = short_burst();

    for (seed, bearing) in [(1u64, 40.0), (2, 150.0), (3, 330.0)] {
        let noise = NoiseConfig::default().with_seed(seed).with_awgn(20.0);
        let recording =
            generate_noisy_recording_for_angle(&config, bearing, DEFAULT_DELAY_SCALE_SECS, &noise)
                .unwrap();
        let angle = estimator.estimate_recording(&recording).unwrap();
        let error = angle_error(angle.degrees(), bearing);
        assert!(error.abs() < 2.0, "bearing {} error {:.2}", bearing, error);
    }
}
