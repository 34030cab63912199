use std::f64::consts::PI;
use std::path::{Path, PathBuf};

use trimic::Recording;

pub const SAMPLE_RATE_HZ: f64 = 32125.0;
pub const NUM_CHANNELS: usize = 5;
pub const MIC_CHANNELS: [usize; 3] = [2, 3, 4];
pub const ADC_BIAS: f64 = 2048.0;

/// Gaussian-windowed 1.2 kHz tone, zero mean, centred on `center`
pub fn burst(num_frames: usize, center: f64, amplitude: f64) -> Vec<f64> {
    let width = 1e-3 * SAMPLE_RATE_HZ;
    (0..num_frames)
        .map(|i| {
            let n = i as f64 - center;
            let envelope = (-0.5 * (n / width).powi(2)).exp();
            amplitude * envelope * (2.0 * PI * 1200.0 * n / SAMPLE_RATE_HZ).sin()
        })
        .collect()
}

/// Five-channel recording with the same burst on every microphone, each
/// microphone delayed by a whole number of frames
///
/// Channels 0 and 1 hold the ADC bias only.
pub fn shifted_recording(num_frames: usize, center: f64, shifts: [usize; 3]) -> Recording {
    let source = burst(num_frames, center, 1000.0);
    let mut samples = vec![ADC_BIAS as u16; num_frames * NUM_CHANNELS];

    for (&shift, &ch) in shifts.iter().zip(MIC_CHANNELS.iter()) {
        for frame in 0..num_frames {
            let v = if frame >= shift { source[frame - shift] } else { 0.0 };
            samples[frame * NUM_CHANNELS + ch] = (ADC_BIAS + v).round() as u16;
        }
    }

    Recording::new(1.0 / SAMPLE_RATE_HZ, NUM_CHANNELS, samples).unwrap()
}

/// Mic 2 and mic 3 trail mic 1 by 5 and 10 frames
pub fn reference_recording() -> Recording {
    shifted_recording(600, 300.0, [0, 5, 10])
}

pub fn write_recording(dir: &Path, name: &str, recording: &Recording) -> PathBuf {
    let path = dir.join(name);
    recording.save(&path).unwrap();
    path
}
