use std::f64::consts::PI;

use crate::aoa::ArrayGeometry;
use crate::error::{AoaError, Result};
use crate::recording::Recording;

/// Travel time across one array radius for a ~10 cm array in air
pub const DEFAULT_DELAY_SCALE_SECS: f64 = 2.9e-4;

/// Shape of the synthetic acoustic event and the recording that carries it
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default)]
pub struct BurstConfig {
    pub sample_rate_hz: f64,
    pub num_frames: usize,
    pub num_channels: usize,
    pub mic_channels: [usize; 3],
    /// Tone inside the Gaussian envelope
    pub carrier_hz: f64,
    /// Standard deviation of the envelope
    pub width_secs: f64,
    /// Time of the envelope peak at the array centroid
    pub center_secs: f64,
    /// Peak amplitude in ADC counts
    pub amplitude: f64,
    /// ADC bias added to every channel
    pub dc_offset: f64,
}

impl Default for BurstConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: 32125.0,
            num_frames: 4000,
            num_channels: 5,
            mic_channels: [2, 3, 4],
            carrier_hz: 1200.0,
            width_secs: 1e-3,
            center_secs: 0.06,
            amplitude: 1000.0,
            dc_offset: 2048.0,
        }
    }
}

impl BurstConfig {
    /// Zero-mean burst at time `t`, delayed by `offset_secs`
    pub fn waveform(&self, t: f64, offset_secs: f64) -> f64 {
        let tau = t - self.center_secs - offset_secs;
        let envelope = (-0.5 * (tau / self.width_secs).powi(2)).exp();
        self.amplitude * envelope * (2.0 * PI * self.carrier_hz * tau).sin()
    }
}

/// Microphone signals for arrival offsets in seconds, in mic order
///
/// The waveform is evaluated analytically so fractional-sample offsets are
/// exact.
pub fn generate_mic_signals(config: &BurstConfig, offsets_secs: [f64; 3]) -> [Vec<f64>; 3] {
    offsets_secs.map(|offset| {
        (0..config.num_frames)
            .map(|i| config.waveform(i as f64 / config.sample_rate_hz, offset))
            .collect()
    })
}

/// Bias, round and clamp microphone signals into an interleaved recording
///
/// Channels that are not microphones carry the bias only.
pub fn to_recording(config: &BurstConfig, mics: &[Vec<f64>; 3]) -> Result<Recording> {
    if mics.iter().any(|m| m.len() != config.num_frames) {
        return Err(AoaError::Config(format!(
            "microphone signals must have {} frames",
            config.num_frames
        )));
    }
    if let Some(&ch) = config.mic_channels.iter().find(|&&c| c >= config.num_channels) {
        return Err(AoaError::Config(format!(
            "microphone channel {} out of range for {} channels",
            ch, config.num_channels
        )));
    }

    let quantize = |v: f64| (v + config.dc_offset).round().clamp(0.0, u16::MAX as f64) as u16;
    let bias = quantize(0.0);

    let mut samples = vec![bias; config.num_frames * config.num_channels];
    for (mic, &ch) in mics.iter().zip(config.mic_channels.iter()) {
        for (frame, &v) in mic.iter().enumerate() {
            samples[frame * config.num_channels + ch] = quantize(v);
        }
    }

    Recording::new(1.0 / config.sample_rate_hz, config.num_channels, samples)
}

/// Recording of a burst reaching the microphones at the given offsets
pub fn generate_recording_with_offsets(config: &BurstConfig, offsets_secs: [f64; 3]) -> Result<Recording> {
    to_recording(config, &generate_mic_signals(config, offsets_secs))
}

/// Recording of a far-field burst arriving from `bearing_deg`
pub fn generate_recording_for_angle(
    config: &BurstConfig,
    bearing_deg: f64,
    delay_scale_secs: f64,
) -> Result<Recording> {
    let offsets = ArrayGeometry::arrival_offsets(bearing_deg, delay_scale_secs);
    generate_recording_with_offsets(config, offsets)
}
