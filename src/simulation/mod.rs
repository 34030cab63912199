mod noise;
mod signal;

pub use noise::{AdditiveNoiseConfig, NoiseConfig, apply_noise, signal_power};
pub use signal::{
    BurstConfig, DEFAULT_DELAY_SCALE_SECS, generate_mic_signals, generate_recording_for_angle,
    generate_recording_with_offsets, to_recording,
};

use crate::aoa::ArrayGeometry;
use crate::error::Result;
use crate::recording::Recording;

/// Far-field burst from `bearing_deg` with noise added before quantization
pub fn generate_noisy_recording_for_angle(
    config: &BurstConfig,
    bearing_deg: f64,
    delay_scale_secs: f64,
    noise: &NoiseConfig,
) -> Result<Recording> {
    let offsets = ArrayGeometry::arrival_offsets(bearing_deg, delay_scale_secs);
    let mut mics = generate_mic_signals(config, offsets);
    apply_noise(&mut mics, noise);
    to_recording(config, &mics)
}
