mod test_signals;

use std::fs;
use std::path::{Path, PathBuf};

use approx::assert_abs_diff_eq;
use trimic::batch::{AngleGroup, BatchConfig, BatchRunner, WrapPolicy};
use trimic::output::{OutputFormat, create_formatter, render};
use trimic::signal_processing::angle_error;
use trimic::simulation::{
    BurstConfig, DEFAULT_DELAY_SCALE_SECS, NoiseConfig, generate_noisy_recording_for_angle,
};
use trimic::{AngleEstimator, AoaError, EstimatorConfig, Recording};

use test_signals::{ADC_BIAS, NUM_CHANNELS, reference_recording, write_recording};

fn burst_config() -> BurstConfig {
    BurstConfig {
        num_frames: 2000,
        center_secs: 0.03,
        ..BurstConfig::default()
    }
}

fn write_group(dir: &Path, bearing: f64, trials: u64) -> AngleGroup {
    let config = burst_config();
    let files = (0..trials)
        .map(|trial| {
            let noise = NoiseConfig::default()
                .with_seed(trial * 1000 + bearing as u64)
                .with_awgn(25.0);
            let recording =
                generate_noisy_recording_for_angle(&config, bearing, DEFAULT_DELAY_SCALE_SECS, &noise)
                    .unwrap();
            write_recording(dir, &format!("a{:03}_t{}.bin", bearing as i32, trial), &recording)
        })
        .collect();
    AngleGroup {
        label: format!("{}deg", bearing),
        reference_deg: Some(bearing),
        files,
    }
}

fn runner(policy: WrapPolicy) -> BatchRunner {
    let mut config = EstimatorConfig::default();
    config.conditioning.remove_dc = true;
    BatchRunner::new(AngleEstimator::new(config).unwrap(), policy)
}

#[test]
fn test_groups_summarize_around_reference() {
    let dir = tempfile::tempdir().unwrap();
    let groups = [write_group(dir.path(), 60.0, 3), write_group(dir.path(), 240.0, 3)];

    let results = runner(WrapPolicy::Circular).run(&groups).unwrap();
    assert_eq!(results.len(), 2);
    for (result, reference) in results.iter().zip([60.0, 240.0]) {
        assert_eq!(result.files.len(), 3);
        assert_eq!(result.failures(), 0);
        let stats = result.statistics.as_ref().unwrap();
        assert_eq!(stats.count, 3);
        assert!(stats.mean_error_deg.unwrap().abs() < 2.0, "{:?}", stats);
        assert!(angle_error(stats.mean_deg, reference).abs() < 2.0);
        assert!(stats.std_dev_deg < 2.0);
    }
}

#[test]
fn test_seam_group_under_each_policy() {
    let dir = tempfile::tempdir().unwrap();
    let group = write_group(dir.path(), 0.0, 4);

    let circular = runner(WrapPolicy::Circular).run_group(&group).unwrap();
    let stats = circular.statistics.unwrap();
    assert!(angle_error(stats.mean_deg, 0.0).abs() < 2.0, "{:?}", stats);
    assert!(stats.std_dev_deg < 2.0);

    // Estimates straddle 0°/360°, so unwrapping at 180° keeps them together.
    let unwrapped = runner(WrapPolicy::Unwrap { threshold_deg: 180.0 })
        .run_group(&group)
        .unwrap();
    let stats = unwrapped.statistics.unwrap();
    assert!(angle_error(stats.mean_deg, 0.0).abs() < 2.0, "{:?}", stats);
    assert!(stats.min_deg > 180.0);
}

#[test]
fn test_failed_file_is_reported_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let good = write_recording(dir.path(), "good.bin", &reference_recording());
    let bad = dir.path().join("bad.bin");
    fs::write(&bad, [1u8, 2, 3, 4]).unwrap();

    let group = AngleGroup {
        label: "mixed".into(),
        reference_deg: Some(120.0),
        files: vec![good, bad.clone()],
    };

    let result = runner(WrapPolicy::None).run_group(&group).unwrap();
    assert_eq!(result.failures(), 1);
    assert_eq!(result.files[1].path, bad);
    assert!(result.files[1].error.as_ref().unwrap().contains("Malformed"));
    let stats = result.statistics.unwrap();
    assert_eq!(stats.count, 1);
    assert_abs_diff_eq!(stats.mean_deg, 120.0, epsilon = 1e-9);

    let fail_fast = runner(WrapPolicy::None).with_fail_fast(true);
    assert!(fail_fast.run_group(&group).is_err());
}

#[test]
fn test_filter_spec_error_aborts_batch() {
    let dir = tempfile::tempdir().unwrap();
    let good = write_recording(dir.path(), "good.bin", &reference_recording());
    // 2.5 kHz high cut is above Nyquist at 4 kHz
    let slow = Recording::new(
        1.0 / 4000.0,
        NUM_CHANNELS,
        vec![ADC_BIAS as u16; 600 * NUM_CHANNELS],
    )
    .unwrap();
    let slow_a = write_recording(dir.path(), "slow_a.bin", &slow);
    let slow_b = write_recording(dir.path(), "slow_b.bin", &slow);

    let mut config = EstimatorConfig::default();
    config.conditioning.remove_dc = true;
    config.recording.sample_rate_from_recording = true;
    let runner = BatchRunner::new(AngleEstimator::new(config).unwrap(), WrapPolicy::Circular);

    let group = AngleGroup {
        label: "mixed_rates".into(),
        reference_deg: Some(120.0),
        files: vec![good.clone(), slow_a, slow_b],
    };
    assert!(matches!(
        runner.run_group(&group),
        Err(AoaError::InvalidFilterSpec(_))
    ));

    let later = AngleGroup {
        label: "good_only".into(),
        reference_deg: Some(120.0),
        files: vec![good],
    };
    assert!(runner.run(&[later, group]).is_err());
}

#[test]
fn test_batch_file_drives_runner() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("data");
    fs::create_dir(&data).unwrap();
    write_recording(&data, "ref_1.bin", &reference_recording());
    write_recording(&data, "ref_2.bin", &reference_recording());

    let batch_path = dir.path().join("batch.toml");
    fs::write(
        &batch_path,
        r#"
data_dir = "data"

[estimator.conditioning]
remove_dc = true

[aggregation]
wrap_policy = { kind = "none" }

[[group]]
label = "ref"
reference_deg = 120.0
files = ["ref_1.bin", "ref_2.bin"]
"#,
    )
    .unwrap();

    let batch = BatchConfig::load(&batch_path).unwrap();
    let groups = batch.resolved_groups();
    assert_eq!(groups[0].files[0], data.join("ref_1.bin"));

    let runner = BatchRunner::new(
        AngleEstimator::new(batch.estimator.clone()).unwrap(),
        batch.aggregation.wrap_policy,
    )
    .with_windows(true);
    let results = runner.run(&groups).unwrap();
    let stats = results[0].statistics.as_ref().unwrap();
    assert_eq!(stats.count, 2);
    assert_abs_diff_eq!(stats.std_dev_deg, 0.0);
    assert!(results[0].files[0].windows.is_some());

    let csv = render(create_formatter(OutputFormat::Csv, false).as_ref(), &results);
    let row = csv.lines().nth(1).unwrap();
    assert!(row.starts_with("ref,120.00,2,0,120.00,"), "{}", row);

    let json = render(create_formatter(OutputFormat::Json, false).as_ref(), &results);
    let value: serde_json::Value = serde_json::from_str(json.trim()).unwrap();
    assert_eq!(value["files"][0]["windows"].as_array().unwrap().len(), 3);
}

#[test]
fn test_generated_batch_file_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let mut batch = BatchConfig::default();
    batch.estimator.conditioning.remove_dc = true;
    batch.groups.push(AngleGroup {
        label: "ref".into(),
        reference_deg: Some(120.0),
        files: vec![PathBuf::from("ref.bin")],
    });
    write_recording(dir.path(), "ref.bin", &reference_recording());

    let path = dir.path().join("batch.toml");
    fs::write(&path, batch.to_toml_string().unwrap()).unwrap();

    let loaded = BatchConfig::load(&path).unwrap();
    assert_eq!(loaded.groups, batch.groups);
    let results = runner(loaded.aggregation.wrap_policy)
        .run(&loaded.resolved_groups())
        .unwrap();
    assert_eq!(results[0].angles().len(), 1);
}
