use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;

use trimic::batch::{AngleGroup, BatchConfig, BatchRunner, WrapPolicy};
use trimic::config::{CorrelationMethod, EstimatorConfig};
use trimic::output::{OutputFormat, create_formatter, render};
use trimic::{AngleEstimator, Recording, save_wav};

#[derive(Parser, Debug)]
#[command(name = "trimic")]
#[command(about = "Estimate the bearing of acoustic events recorded by a three-microphone array", long_about = None)]
struct Args {
    /// Recording files to analyze as one group
    #[arg(required_unless_present = "batch")]
    files: Vec<PathBuf>,

    /// Batch file listing groups of recordings (TOML)
    #[arg(short = 'b', long, conflicts_with = "files")]
    batch: Option<PathBuf>,

    /// Estimator configuration file (TOML); overrides a batch's [estimator]
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Output format: text, csv, json
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Increase output verbosity
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// True bearing of the command-line files, for error statistics
    #[arg(short = 'r', long)]
    reference_angle: Option<f64>,

    /// Interleaved channels per frame
    #[arg(long)]
    channels: Option<usize>,

    /// Sampling rate in Hz used for filter design
    #[arg(long)]
    sample_rate: Option<f64>,

    /// Take the sampling rate from each recording's header
    #[arg(long)]
    rate_from_recording: bool,

    /// Bandpass filter lower cutoff in Hz
    #[arg(long)]
    bandpass_low: Option<f64>,

    /// Bandpass filter upper cutoff in Hz
    #[arg(long)]
    bandpass_high: Option<f64>,

    /// Butterworth prototype order
    #[arg(long)]
    order: Option<usize>,

    /// Upsampling factor
    #[arg(short = 'u', long)]
    upsample: Option<usize>,

    /// Cross-correlation method: auto, direct, fft
    #[arg(short = 'm', long, value_enum)]
    method: Option<CorrelationMethod>,

    /// Remove DC offset before filtering
    #[arg(long)]
    remove_dc: bool,

    /// Angle wrapping for group statistics: none, unwrap, circular
    #[arg(short = 'w', long, value_enum)]
    wrap: Option<WrapMode>,

    /// Estimates below this angle get 360° added in unwrap mode
    #[arg(long, default_value = "180")]
    unwrap_threshold: f64,

    /// Dump conditioned microphone channels to WAV files in this directory
    #[arg(long)]
    dump_audio: Option<PathBuf>,

    /// Stop at the first recording that fails
    #[arg(long)]
    fail_fast: bool,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum WrapMode {
    None,
    Unwrap,
    Circular,
}

impl WrapMode {
    fn policy(self, threshold_deg: f64) -> WrapPolicy {
        match self {
            WrapMode::None => WrapPolicy::None,
            WrapMode::Unwrap => WrapPolicy::Unwrap { threshold_deg },
            WrapMode::Circular => WrapPolicy::Circular,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let (mut config, mut policy, groups) = match &args.batch {
        Some(path) => {
            let batch = BatchConfig::load(path)
                .with_context(|| format!("Failed to load batch {}", path.display()))?;
            let groups = batch.resolved_groups();
            (batch.estimator, batch.aggregation.wrap_policy, groups)
        }
        None => (
            EstimatorConfig::default(),
            WrapPolicy::default(),
            vec![AngleGroup {
                label: "files".to_string(),
                reference_deg: args.reference_angle,
                files: args.files.clone(),
            }],
        ),
    };

    if let Some(ref path) = args.config {
        config = EstimatorConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?;
    }
    apply_overrides(&mut config, &args);
    if let Some(mode) = args.wrap {
        policy = mode.policy(args.unwrap_threshold);
    }

    log::info!(
        "Band-pass {}-{} Hz order {}, upsample x{}, {:?} correlation",
        config.filter.low_cut_hz,
        config.filter.high_cut_hz,
        config.filter.order,
        config.conditioning.upsample_factor,
        config.correlation.method
    );

    let estimator = AngleEstimator::new(config).context("Invalid estimator configuration")?;

    if let Some(ref dir) = args.dump_audio {
        fs::create_dir_all(dir).context("Failed to create dump directory")?;
        for path in groups.iter().flat_map(|g| g.files.iter()) {
            if let Err(e) = dump_conditioned(&estimator, path, dir) {
                log::warn!("Skipping dump of {}: {:#}", path.display(), e);
            }
        }
    }

    let runner = BatchRunner::new(estimator, policy)
        .with_fail_fast(args.fail_fast)
        .with_windows(matches!(args.format, OutputFormat::Json) && args.verbose > 0);
    let results = runner.run(&groups)?;

    let formatter = create_formatter(args.format, args.verbose > 0);
    print!("{}", render(formatter.as_ref(), &results));

    Ok(())
}

fn apply_overrides(config: &mut EstimatorConfig, args: &Args) {
    if let Some(channels) = args.channels {
        config.recording.num_channels = channels;
    }
    if let Some(rate) = args.sample_rate {
        config.recording.sample_rate_hz = rate;
    }
    if args.rate_from_recording {
        config.recording.sample_rate_from_recording = true;
    }
    if let Some(low) = args.bandpass_low {
        config.filter.low_cut_hz = low;
    }
    if let Some(high) = args.bandpass_high {
        config.filter.high_cut_hz = high;
    }
    if let Some(order) = args.order {
        config.filter.order = order;
    }
    if let Some(factor) = args.upsample {
        config.conditioning.upsample_factor = factor;
    }
    if let Some(method) = args.method {
        config.correlation.method = method;
    }
    if args.remove_dc {
        config.conditioning.remove_dc = true;
    }
}

fn dump_conditioned(estimator: &AngleEstimator, path: &Path, dir: &Path) -> anyhow::Result<()> {
    let recording = Recording::open(path, estimator.config().recording.num_channels)?;
    let [m1, m2, m3] = estimator.condition_microphones(&recording)?;
    let rate = estimator.conditioned_rate_hz(&recording).round() as u32;

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string());
    let dump_path = dir.join(format!("{}_mics.wav", stem));
    eprintln!("Writing {} samples to {}", m1.len(), dump_path.display());
    save_wav(&dump_path, &[m1.as_slice(), m2.as_slice(), m3.as_slice()], rate)?;
    Ok(())
}
