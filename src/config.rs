//! Configuration for the trimic angle-of-arrival estimator.
//!
//! ## Channel Assignment
//!
//! The reference array records five interleaved channels. Channels 0 and 1
//! carry reference signals and are ignored; microphones 1, 2 and 3 sit on
//! channels 2, 3 and 4. To rewire the array, change `mic_channels` in
//! `RecordingConfig::default()` or in the TOML file:
//!
//! ```toml
//! [recording]
//! num_channels = 5
//! mic_channels = [2, 3, 4]
//! ```
//!
//! Every field has a default, so a TOML file only needs the values it changes.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_DEGENERATE_TOLERANCE;
use crate::error::{AoaError, Result};

/// Cross-correlation algorithm
///
/// Both methods produce the same full linear correlation; they differ only in
/// cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationMethod {
    /// Direct summation for short inputs, FFT otherwise
    #[default]
    Auto,
    /// O(Na * Nb) direct summation
    Direct,
    /// Zero-padded FFT correlation
    Fft,
}

/// System-wide estimator configuration
///
/// Use `EstimatorConfig::default()` for the reference array.
///
/// # Example
/// ```
/// use trimic::config::EstimatorConfig;
///
/// let mut config = EstimatorConfig::default();
/// config.conditioning.upsample_factor = 32;
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    /// Recording layout
    pub recording: RecordingConfig,
    /// Band-pass filter design
    pub filter: FilterConfig,
    /// Filtering and upsampling of each microphone channel
    pub conditioning: ConditioningConfig,
    /// Delay estimation
    pub correlation: CorrelationConfig,
    /// Triangulation
    pub geometry: GeometryConfig,
}

/// Recording layout configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordingConfig {
    /// Number of interleaved channels per frame
    pub num_channels: usize,
    /// Channel indices carrying microphones 1, 2 and 3, in that order
    pub mic_channels: [usize; 3],
    /// Leading frames dropped before conditioning (ADC start-up garbage)
    pub skip_frames: usize,
    /// Sampling rate used for filter design in Hz
    pub sample_rate_hz: f64,
    /// Derive the sampling rate from each recording's sample period instead
    /// of using `sample_rate_hz`
    pub sample_rate_from_recording: bool,
}

/// Butterworth band-pass configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Lower cutoff in Hz
    pub low_cut_hz: f64,
    /// Upper cutoff in Hz
    pub high_cut_hz: f64,
    /// Prototype order (the band-pass has twice as many poles)
    pub order: usize,
}

/// Channel conditioning configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConditioningConfig {
    /// Integer upsampling factor; one lag step is one upsampled sample
    pub upsample_factor: usize,
    /// Leading upsampled samples discarded to drop the filter start-up transient
    pub transient_discard: usize,
    /// Subtract the channel mean before filtering
    pub remove_dc: bool,
}

/// Delay estimation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrelationConfig {
    /// Correlation algorithm
    pub method: CorrelationMethod,
    /// Half-width in lags of the correlation window kept for diagnostics
    pub window_half_width: usize,
}

/// Triangulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryConfig {
    /// Both triangulation terms below this magnitude make the bearing undefined
    pub degenerate_tolerance: f64,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            num_channels: 5,
            mic_channels: [2, 3, 4],
            skip_frames: 5,
            sample_rate_hz: 32125.0,
            sample_rate_from_recording: false,
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            low_cut_hz: 250.0,
            high_cut_hz: 2500.0,
            order: 9,
        }
    }
}

impl Default for ConditioningConfig {
    fn default() -> Self {
        Self {
            upsample_factor: 16,
            transient_discard: 1000,
            remove_dc: false,
        }
    }
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            method: CorrelationMethod::Auto,
            window_half_width: 200,
        }
    }
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            degenerate_tolerance: DEFAULT_DEGENERATE_TOLERANCE,
        }
    }
}

impl EstimatorConfig {
    /// Parse a configuration from TOML text
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| AoaError::Config(e.to_string()))
    }

    /// Load a configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        log::debug!("Loaded estimator configuration from {}", path.display());
        Ok(config)
    }

    /// Check structural constraints that do not depend on a recording
    ///
    /// Filter cutoffs are checked separately when the filter is designed,
    /// since that check depends on the sampling rate.
    pub fn validate(&self) -> Result<()> {
        let rec = &self.recording;
        if rec.num_channels == 0 {
            return Err(AoaError::Config("num_channels must be positive".into()));
        }
        if let Some(&ch) = rec.mic_channels.iter().find(|&&ch| ch >= rec.num_channels) {
            return Err(AoaError::Config(format!(
                "microphone channel {} out of range for {} channels",
                ch, rec.num_channels
            )));
        }
        if !rec.sample_rate_from_recording
            && !(rec.sample_rate_hz.is_finite() && rec.sample_rate_hz > 0.0)
        {
            return Err(AoaError::Config(format!(
                "sample rate must be positive, got {}",
                rec.sample_rate_hz
            )));
        }
        if self.conditioning.upsample_factor == 0 {
            return Err(AoaError::Config("upsample_factor must be at least 1".into()));
        }
        let tolerance = self.geometry.degenerate_tolerance;
        if tolerance.is_nan() || tolerance < 0.0 {
            return Err(AoaError::Config(
                "degenerate_tolerance must be non-negative".into(),
            ));
        }
        Ok(())
    }

    /// Reference configuration with a different channel count
    pub fn with_num_channels(mut self, num_channels: usize) -> Self {
        self.recording.num_channels = num_channels;
        self
    }
}
