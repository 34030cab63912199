use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

#[derive(Clone, Debug, Default, serde::Deserialize)]
pub struct NoiseConfig {
    pub seed: Option<u64>,
    pub additive: Option<AdditiveNoiseConfig>,
}

impl NoiseConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_awgn(mut self, snr_db: f64) -> Self {
        self.additive = Some(AdditiveNoiseConfig { snr_db });
        self
    }
}

/// White Gaussian noise at a fixed SNR relative to each channel's power
#[derive(Clone, Debug, serde::Deserialize)]
pub struct AdditiveNoiseConfig {
    pub snr_db: f64,
}

fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => rand::make_rng(),
    }
}

pub fn signal_power(signal: &[f64]) -> f64 {
    if signal.is_empty() {
        return 0.0;
    }
    signal.iter().map(|&x| x * x).sum::<f64>() / signal.len() as f64
}

fn apply_additive_noise(signal: &mut [f64], config: &AdditiveNoiseConfig, rng: &mut ChaCha8Rng) {
    let sig_power = signal_power(signal);
    if sig_power == 0.0 {
        return;
    }

    let snr_linear = 10.0_f64.powf(config.snr_db / 10.0);
    let noise_std = (sig_power / snr_linear).sqrt();

    let Ok(normal) = Normal::new(0.0, noise_std) else {
        log::warn!("Skipping noise with invalid deviation {}", noise_std);
        return;
    };

    for sample in signal.iter_mut() {
        *sample += normal.sample(rng);
    }
}

/// Apply the configured impairments to every channel in place
///
/// Channels draw from one generator in order, so a seeded config gives the
/// same noise on every run while the channels stay uncorrelated.
pub fn apply_noise(channels: &mut [Vec<f64>], config: &NoiseConfig) {
    let mut rng = create_rng(config.seed);

    if let Some(ref additive) = config.additive {
        for channel in channels.iter_mut() {
            apply_additive_noise(channel, additive, &mut rng);
        }
    }
}
