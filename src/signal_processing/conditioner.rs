use crate::config::ConditioningConfig;
use crate::error::{AoaError, Result};
use crate::signal_processing::{BandpassDesign, upsample};

/// Band-pass filters and upsamples one microphone channel
///
/// The output has `len * upsample_factor` samples. Its head still carries the
/// filter start-up transient; [`ChannelConditioner::condition_trimmed`] drops
/// the configured prefix before the channel is correlated.
#[derive(Debug, Clone)]
pub struct ChannelConditioner {
    design: BandpassDesign,
    upsample_factor: usize,
    transient_discard: usize,
    remove_dc: bool,
}

impl ChannelConditioner {
    /// Create a conditioner around an existing filter design
    ///
    /// # Errors
    /// Returns `AoaError::Config` if the upsampling factor is 0.
    pub fn new(design: BandpassDesign, config: &ConditioningConfig) -> Result<Self> {
        if config.upsample_factor == 0 {
            return Err(AoaError::Config("upsample_factor must be at least 1".into()));
        }
        Ok(Self {
            design,
            upsample_factor: config.upsample_factor,
            transient_discard: config.transient_discard,
            remove_dc: config.remove_dc,
        })
    }

    pub fn design(&self) -> &BandpassDesign {
        &self.design
    }

    pub fn upsample_factor(&self) -> usize {
        self.upsample_factor
    }

    /// Sampling rate of conditioned output
    pub fn output_rate_hz(&self) -> f64 {
        self.design.spec().sample_rate_hz * self.upsample_factor as f64
    }

    /// Filter then upsample, keeping the transient
    pub fn condition(&self, samples: &[f64]) -> Result<Vec<f64>> {
        let mut filtered = samples.to_vec();

        if self.remove_dc && !filtered.is_empty() {
            let mean = filtered.iter().sum::<f64>() / filtered.len() as f64;
            for x in filtered.iter_mut() {
                *x -= mean;
            }
        }

        self.design.filter().process_buffer(&mut filtered);
        upsample(&filtered, self.upsample_factor)
    }

    /// Condition and drop the leading transient
    ///
    /// # Errors
    /// Returns `AoaError::InsufficientData` if nothing is left after the
    /// transient is removed.
    pub fn condition_trimmed(&self, samples: &[f64]) -> Result<Vec<f64>> {
        let mut conditioned = self.condition(samples)?;
        if conditioned.len() <= self.transient_discard {
            return Err(AoaError::InsufficientData {
                needed: self.transient_discard.saturating_add(1),
                available: conditioned.len(),
            });
        }
        conditioned.drain(..self.transient_discard);
        Ok(conditioned)
    }
}
