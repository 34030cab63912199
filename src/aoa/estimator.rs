use std::path::Path;

use serde::Serialize;

use crate::aoa::{AngleEstimate, AoaResolver};
use crate::config::EstimatorConfig;
use crate::error::Result;
use crate::recording::Recording;
use crate::signal_processing::{
    BandpassDesign, ChannelConditioner, CorrelationPoint, DelayTriple, FilterSpec,
};

/// Everything the pipeline learned about one recording
#[derive(Debug, Clone, Serialize)]
pub struct AngleAnalysis {
    pub angle: AngleEstimate,
    pub delays: DelayTriple,
    /// Sampling rate of the conditioned channels the delays are counted in
    pub conditioned_rate_hz: f64,
    /// Correlation around zero lag for the (2,1), (3,1) and (3,2) pairs
    pub windows: [Vec<CorrelationPoint>; 3],
}

impl AngleAnalysis {
    /// Delays converted to seconds
    pub fn delays_secs(&self) -> DelayTriple {
        let s = 1.0 / self.conditioned_rate_hz;
        DelayTriple::new(self.delays.d21 * s, self.delays.d31 * s, self.delays.d32 * s)
    }
}

/// The full estimation pipeline: read, condition, correlate, triangulate
///
/// The estimator is immutable after construction and can be shared across
/// threads; each call owns its buffers.
#[derive(Debug, Clone)]
pub struct AngleEstimator {
    config: EstimatorConfig,
    conditioner: Option<ChannelConditioner>,
    resolver: AoaResolver,
}

impl AngleEstimator {
    /// Create an estimator
    ///
    /// With a fixed sampling rate the band-pass is designed here, so a bad
    /// filter configuration fails before any recording is touched.
    ///
    /// # Errors
    /// Returns `AoaError::Config` for structural problems and
    /// `AoaError::InvalidFilterSpec` for cutoffs outside `(0, Nyquist)`.
    pub fn new(config: EstimatorConfig) -> Result<Self> {
        config.validate()?;

        let conditioner = if config.recording.sample_rate_from_recording {
            None
        } else {
            Some(Self::build_conditioner(&config, config.recording.sample_rate_hz)?)
        };

        Ok(Self {
            resolver: AoaResolver::new(config.geometry.degenerate_tolerance),
            conditioner,
            config,
        })
    }

    fn build_conditioner(config: &EstimatorConfig, sample_rate_hz: f64) -> Result<ChannelConditioner> {
        let design = BandpassDesign::new(FilterSpec::from_config(&config.filter, sample_rate_hz))?;
        ChannelConditioner::new(design, &config.conditioning)
    }

    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Read a recording file and estimate its bearing
    pub fn estimate_file<P: AsRef<Path>>(&self, path: P) -> Result<AngleEstimate> {
        Ok(self.analyze_file(path)?.angle)
    }

    /// Read a recording file and keep the intermediate results
    pub fn analyze_file<P: AsRef<Path>>(&self, path: P) -> Result<AngleAnalysis> {
        let path = path.as_ref();
        let recording = Recording::open(path, self.config.recording.num_channels)?;
        log::debug!(
            "Read {}: {} frames at {:.1} Hz",
            path.display(),
            recording.num_frames(),
            recording.sample_rate_hz()
        );
        self.analyze_recording(&recording)
    }

    /// Estimate the bearing of an in-memory recording
    pub fn estimate_recording(&self, recording: &Recording) -> Result<AngleEstimate> {
        Ok(self.analyze_recording(recording)?.angle)
    }

    /// Run the pipeline and keep the intermediate results
    pub fn analyze_recording(&self, recording: &Recording) -> Result<AngleAnalysis> {
        let [mic1, mic2, mic3] = self.condition_microphones(recording)?;
        let conditioned_rate_hz = self.conditioned_rate_hz(recording);

        let (delays, correlations) =
            DelayTriple::measure(&mic1, &mic2, &mic3, self.config.correlation.method)?;
        let angle = self.resolver.resolve(&delays)?;

        let half_width = self.config.correlation.window_half_width;
        Ok(AngleAnalysis {
            angle,
            delays,
            conditioned_rate_hz,
            windows: [
                correlations.c21.window(half_width),
                correlations.c31.window(half_width),
                correlations.c32.window(half_width),
            ],
        })
    }

    /// Filtered, upsampled and transient-trimmed microphone channels, in mic order
    pub fn condition_microphones(&self, recording: &Recording) -> Result<[Vec<f64>; 3]> {
        let per_recording;
        let conditioner = match &self.conditioner {
            Some(c) => c,
            None => {
                per_recording = Self::build_conditioner(&self.config, recording.sample_rate_hz())?;
                &per_recording
            }
        };

        let skip = self.config.recording.skip_frames;
        let [c1, c2, c3] = self.config.recording.mic_channels;
        Ok([
            conditioner.condition_trimmed(&recording.channel_from(c1, skip)?)?,
            conditioner.condition_trimmed(&recording.channel_from(c2, skip)?)?,
            conditioner.condition_trimmed(&recording.channel_from(c3, skip)?)?,
        ])
    }

    /// Sampling rate of the conditioned channels for this recording
    pub fn conditioned_rate_hz(&self, recording: &Recording) -> f64 {
        let base = if self.config.recording.sample_rate_from_recording {
            recording.sample_rate_hz()
        } else {
            self.config.recording.sample_rate_hz
        };
        base * self.config.conditioning.upsample_factor as f64
    }
}

/// Estimate the bearing of one recording file with the reference configuration
pub fn estimate_angle<P: AsRef<Path>>(path: P, num_channels: usize) -> Result<AngleEstimate> {
    AngleEstimator::new(EstimatorConfig::default().with_num_channels(num_channels))?
        .estimate_file(path)
}
