use std::path::Path;

use hound::{WavSpec, WavWriter};

use crate::error::{AoaError, Result};

/// Write equal-length channels to a 32-bit float WAV, one channel per slice
///
/// Samples are scaled by `1 / peak` over all channels so relative levels are
/// kept and the file does not clip.
pub fn save_wav<P: AsRef<Path>>(path: P, channels: &[&[f64]], sample_rate: u32) -> Result<()> {
    let Some(first) = channels.first() else {
        return Err(AoaError::Config("no channels to write".into()));
    };
    let len = first.len();
    if channels.iter().any(|c| c.len() != len) {
        return Err(AoaError::Config("channels differ in length".into()));
    }
    let num_channels = u16::try_from(channels.len())
        .map_err(|_| AoaError::Config(format!("too many channels: {}", channels.len())))?;

    let spec = WavSpec {
        channels: num_channels,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };

    let peak = channels
        .iter()
        .flat_map(|c| c.iter())
        .fold(0.0f64, |m, v| m.max(v.abs()));
    let scale = if peak > 0.0 { 1.0 / peak } else { 1.0 };

    let mut writer = WavWriter::create(path, spec).map_err(wav_error)?;
    for i in 0..len {
        for channel in channels {
            writer
                .write_sample((channel[i] * scale) as f32)
                .map_err(wav_error)?;
        }
    }
    writer.finalize().map_err(wav_error)?;
    Ok(())
}

fn wav_error(e: hound::Error) -> AoaError {
    match e {
        hound::Error::IoError(io) => AoaError::Io(io),
        other => AoaError::Config(format!("WAV write failed: {}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_three_channels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mics.wav");
        let a = [0.0, 2.0, -4.0];
        let b = [1.0, 1.0, 1.0];
        let c = [0.0, 0.0, 0.0];
        save_wav(&path, &[&a[..], &b[..], &c[..]], 514000).unwrap();

        let mut reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().channels, 3);
        assert_eq!(reader.spec().sample_rate, 514000);
        let samples: Vec<f32> = reader.samples::<f32>().map(|s| s.unwrap()).collect();
        assert_eq!(samples.len(), 9);
        assert_eq!(samples[6], -1.0);
        assert_eq!(samples[4], 0.25);
    }

    #[test]
    fn test_rejects_ragged_channels() {
        let dir = tempfile::tempdir().unwrap();
        let result = save_wav(dir.path().join("x.wav"), &[&[0.0, 1.0][..], &[0.0][..]], 8000);
        assert!(matches!(result, Err(AoaError::Config(_))));
    }
}
