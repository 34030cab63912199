//! Raw multi-channel recordings.
//!
//! A recording file is a little-endian byte stream: one `f64` sample period in
//! seconds followed by interleaved `u16` ADC samples, one row per frame.
//!
//! ```text
//! [f64 period][ch0 ch1 .. chN-1][ch0 ch1 .. chN-1] ...
//! ```
//!
//! Samples that do not complete a final row are dropped.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::constants::{SAMPLE_BYTES, SAMPLE_PERIOD_BYTES};
use crate::error::{AoaError, Result};

/// One multiplexed capture: a sample period and a frames × channels matrix
#[derive(Debug, Clone, PartialEq)]
pub struct Recording {
    sample_period_secs: f64,
    num_channels: usize,
    samples: Vec<u16>,
}

impl Recording {
    /// Build a recording from row-major interleaved samples
    ///
    /// # Errors
    /// Returns `AoaError::MalformedRecording` if the sample count is not a
    /// whole number of frames, there are no frames, or the period is not a
    /// positive finite number.
    pub fn new(sample_period_secs: f64, num_channels: usize, samples: Vec<u16>) -> Result<Self> {
        if num_channels == 0 {
            return Err(AoaError::MalformedRecording(
                "channel count must be positive".into(),
            ));
        }
        if !(sample_period_secs.is_finite() && sample_period_secs > 0.0) {
            return Err(AoaError::MalformedRecording(format!(
                "invalid sample period {}",
                sample_period_secs
            )));
        }
        if samples.is_empty() || samples.len() % num_channels != 0 {
            return Err(AoaError::MalformedRecording(format!(
                "{} samples do not form whole frames of {} channels",
                samples.len(),
                num_channels
            )));
        }
        Ok(Self {
            sample_period_secs,
            num_channels,
            samples,
        })
    }

    /// Parse a recording from a byte stream
    pub fn read_from<R: Read>(mut reader: R, num_channels: usize) -> Result<Self> {
        if num_channels == 0 {
            return Err(AoaError::MalformedRecording(
                "channel count must be positive".into(),
            ));
        }

        let mut header = [0u8; SAMPLE_PERIOD_BYTES];
        reader.read_exact(&mut header).map_err(|e| {
            AoaError::MalformedRecording(format!("truncated sample period header: {}", e))
        })?;
        let sample_period_secs = f64::from_le_bytes(header);

        let mut body = Vec::new();
        reader.read_to_end(&mut body)?;

        let count = body.len() / SAMPLE_BYTES;
        let num_frames = count / num_channels;
        if num_frames == 0 {
            return Err(AoaError::MalformedRecording(format!(
                "{} bytes of samples do not fill one frame of {} channels",
                body.len(),
                num_channels
            )));
        }

        let used = num_frames * num_channels;
        if used != count || body.len() % SAMPLE_BYTES != 0 {
            log::debug!(
                "Dropping {} trailing samples ({} stray bytes)",
                count - used,
                body.len() % SAMPLE_BYTES
            );
        }

        let samples = body
            .chunks_exact(SAMPLE_BYTES)
            .take(used)
            .map(|b| u16::from_le_bytes([b[0], b[1]]))
            .collect();

        Self::new(sample_period_secs, num_channels, samples)
    }

    /// Open and parse a recording file
    pub fn open<P: AsRef<Path>>(path: P, num_channels: usize) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::read_from(BufReader::new(file), num_channels)
    }

    /// Serialize in the on-disk layout
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        writer.write_all(&self.sample_period_secs.to_le_bytes())?;
        for &sample in &self.samples {
            writer.write_all(&sample.to_le_bytes())?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Write the recording to a file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path.as_ref())?;
        self.write_to(BufWriter::new(file))
    }

    pub fn sample_period_secs(&self) -> f64 {
        self.sample_period_secs
    }

    /// Sampling rate implied by the sample period
    pub fn sample_rate_hz(&self) -> f64 {
        1.0 / self.sample_period_secs
    }

    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    pub fn num_frames(&self) -> usize {
        self.samples.len() / self.num_channels
    }

    /// One row of the matrix
    pub fn frame(&self, index: usize) -> Option<&[u16]> {
        let start = index.checked_mul(self.num_channels)?;
        self.samples.get(start..start.checked_add(self.num_channels)?)
    }

    /// Raw samples of one channel starting at frame `skip_frames`
    pub fn channel_raw_from(&self, channel: usize, skip_frames: usize) -> Result<Vec<u16>> {
        if channel >= self.num_channels {
            return Err(AoaError::Config(format!(
                "channel {} out of range for {} channels",
                channel, self.num_channels
            )));
        }
        let offset = skip_frames
            .saturating_mul(self.num_channels)
            .saturating_add(channel);
        Ok(self
            .samples
            .iter()
            .skip(offset)
            .step_by(self.num_channels)
            .copied()
            .collect())
    }

    /// One channel widened to `f64`, starting at frame `skip_frames`
    pub fn channel_from(&self, channel: usize, skip_frames: usize) -> Result<Vec<f64>> {
        Ok(self
            .channel_raw_from(channel, skip_frames)?
            .into_iter()
            .map(f64::from)
            .collect())
    }

    /// One full channel widened to `f64`
    pub fn channel(&self, channel: usize) -> Result<Vec<f64>> {
        self.channel_from(channel, 0)
    }
}
