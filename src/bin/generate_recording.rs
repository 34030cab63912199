use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::PathBuf;

use trimic::batch::{AngleGroup, BatchConfig};
use trimic::signal_processing::normalize_degrees;
use trimic::simulation::{
    BurstConfig, DEFAULT_DELAY_SCALE_SECS, NoiseConfig, generate_noisy_recording_for_angle,
};

const DEFAULT_STEP_DEG: f64 = 15.0;

#[derive(Parser, Debug)]
#[command(name = "generate_recording")]
#[command(about = "Generate synthetic three-microphone recordings and a batch file for them")]
struct Args {
    /// TOML burst configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output directory
    #[arg(short, long, default_value = "data/synthetic")]
    output_dir: PathBuf,

    /// Angles and ranges, comma-separated (e.g., "40,60,330", "0..345:15",
    /// "350..10:5" across the seam)
    #[arg(short, long, allow_hyphen_values = true, default_value = "0..345:15")]
    angles: String,

    /// Number of trials per angle
    #[arg(short, long, default_value_t = 5)]
    trials: u32,

    /// Base seed for reproducibility
    #[arg(short, long)]
    seed: Option<u64>,

    /// AWGN SNR in dB; no noise when absent
    #[arg(long)]
    snr: Option<f64>,

    /// Travel time across one array radius in seconds
    #[arg(long, default_value_t = DEFAULT_DELAY_SCALE_SECS)]
    delay_scale: f64,

    /// Frames per recording (overrides the config file)
    #[arg(long)]
    frames: Option<usize>,

    /// Output filename prefix
    #[arg(long, default_value = "synth")]
    prefix: String,
}

/// Parse a comma-separated list of angles and `start..end[:step]` ranges
///
/// Ranges run counter-clockwise and wrap through 0° when `end` is below
/// `start`, so `350..10:5` covers the seam. Angles are folded into [0, 360)
/// and a range never repeats a bearing after a full turn.
fn parse_angles(s: &str) -> Result<Vec<f64>> {
    let mut angles = Vec::new();
    for item in s.split(',').map(str::trim).filter(|item| !item.is_empty()) {
        match item.split_once("..") {
            Some((start, rest)) => angles.extend(parse_range(start, rest)?),
            None => {
                let angle: f64 = item
                    .parse()
                    .with_context(|| format!("Invalid angle value '{}'", item))?;
                angles.push(normalize_degrees(angle));
            }
        }
    }
    if angles.is_empty() {
        anyhow::bail!("No angles given");
    }
    Ok(angles)
}

fn parse_range(start: &str, rest: &str) -> Result<Vec<f64>> {
    let (end, step) = match rest.split_once(':') {
        Some((end, step)) => (end, step.trim().parse().context("Invalid step value")?),
        None => (rest, DEFAULT_STEP_DEG),
    };
    if !(step.is_finite() && step > 0.0) {
        anyhow::bail!("Step must be positive");
    }
    let start: f64 = start.trim().parse().context("Invalid start value")?;
    let end: f64 = end.trim().parse().context("Invalid end value")?;
    if !(start.is_finite() && end.is_finite()) {
        anyhow::bail!("Range bounds must be finite");
    }

    let mut span = end - start;
    if span < 0.0 {
        span += 360.0 * (-span / 360.0).ceil();
    }
    let count = (span / step + 1e-9).floor() as usize;
    Ok((0..=count)
        .map(|i| i as f64 * step)
        .take_while(|&offset| offset < 360.0)
        .map(|offset| normalize_degrees(start + offset))
        .collect())
}

fn load_burst_config(path: &PathBuf) -> Result<BurstConfig> {
    let content = fs::read_to_string(path).context("Failed to read config file")?;
    toml::from_str(&content).context("Failed to parse config file")
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    fs::create_dir_all(&args.output_dir).context("Failed to create output directory")?;

    let mut burst = match args.config {
        Some(ref path) => load_burst_config(path)?,
        None => BurstConfig::default(),
    };
    if let Some(frames) = args.frames {
        burst.num_frames = frames;
    }

    let angles = parse_angles(&args.angles)?;
    let base_seed = args.seed.unwrap_or(0);

    let mut batch = BatchConfig::default();
    batch.estimator.recording.num_channels = burst.num_channels;
    batch.estimator.recording.mic_channels = burst.mic_channels;
    batch.estimator.recording.sample_rate_hz = burst.sample_rate_hz;
    // Synthetic recordings carry a constant ADC bias on every channel.
    batch.estimator.conditioning.remove_dc = true;

    let total_files = angles.len() * args.trials as usize;
    let mut file_count = 0;

    for &angle in &angles {
        let mut group = AngleGroup {
            label: format!("{:03}deg", angle as i32),
            reference_deg: Some(angle),
            files: Vec::new(),
        };

        for trial in 0..args.trials {
            let seed = base_seed + trial as u64 * 1000 + angle as u64;
            let mut noise = NoiseConfig::default().with_seed(seed);
            if let Some(snr) = args.snr {
                noise = noise.with_awgn(snr);
            }

            let recording =
                generate_noisy_recording_for_angle(&burst, angle, args.delay_scale, &noise)?;

            let filename = format!("{}_a{:03}_t{:02}.bin", args.prefix, angle as i32, trial);
            recording
                .save(args.output_dir.join(&filename))
                .context("Failed to write recording")?;
            group.files.push(PathBuf::from(filename));

            file_count += 1;
            eprint!("\rGenerating: {}/{}", file_count, total_files);
        }

        batch.groups.push(group);
    }
    eprintln!();

    let batch_path = args.output_dir.join("batch.toml");
    fs::write(&batch_path, batch.to_toml_string()?).context("Failed to write batch file")?;
    eprintln!("Batch written to: {}", batch_path.display());

    eprintln!(
        "Generated {} files in {}",
        total_files,
        args.output_dir.display()
    );
    Ok(())
}
