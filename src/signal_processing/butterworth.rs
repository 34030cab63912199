use iir_filters::filter::{DirectForm2Transposed, Filter};
use iir_filters::filter_design::{FilterType, butter};
use iir_filters::sos::{Sos, zpk2sos};
use num_complex::Complex64;
use serde::Serialize;

use crate::config::FilterConfig;
use crate::error::{AoaError, Result};

/// Band-pass design request
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FilterSpec {
    pub low_cut_hz: f64,
    pub high_cut_hz: f64,
    pub sample_rate_hz: f64,
    pub order: usize,
}

impl FilterSpec {
    pub fn new(low_cut_hz: f64, high_cut_hz: f64, sample_rate_hz: f64, order: usize) -> Self {
        Self {
            low_cut_hz,
            high_cut_hz,
            sample_rate_hz,
            order,
        }
    }

    pub fn from_config(config: &FilterConfig, sample_rate_hz: f64) -> Self {
        Self::new(config.low_cut_hz, config.high_cut_hz, sample_rate_hz, config.order)
    }

    /// Cutoffs as fractions of the Nyquist frequency
    pub fn normalized_cutoffs(&self) -> (f64, f64) {
        let nyquist = 0.5 * self.sample_rate_hz;
        (self.low_cut_hz / nyquist, self.high_cut_hz / nyquist)
    }

    fn validate(&self) -> Result<()> {
        if self.order == 0 {
            return Err(AoaError::InvalidFilterSpec("order must be positive".into()));
        }
        if !(self.sample_rate_hz.is_finite() && self.sample_rate_hz > 0.0) {
            return Err(AoaError::InvalidFilterSpec(format!(
                "sample rate must be positive, got {}",
                self.sample_rate_hz
            )));
        }
        let (low, high) = self.normalized_cutoffs();
        if !(low.is_finite() && high.is_finite()) || low <= 0.0 || high >= 1.0 || low >= high {
            return Err(AoaError::InvalidFilterSpec(format!(
                "need 0 < low < high < 1 (Nyquist-normalized), got low={:.4}, high={:.4} \
                 ({} Hz - {} Hz at {} Hz)",
                low, high, self.low_cut_hz, self.high_cut_hz, self.sample_rate_hz
            )));
        }
        Ok(())
    }
}

/// Validated digital Butterworth band-pass in second-order-section form
///
/// The cascade is derived once and is immutable afterwards. Each channel
/// gets its own [`BandpassFilter`] so filter state never leaks between
/// channels.
#[derive(Debug, Clone)]
pub struct BandpassDesign {
    spec: FilterSpec,
    sos: Sos,
    poles: Vec<Complex64>,
}

impl BandpassDesign {
    /// Design a Butterworth band-pass filter
    ///
    /// # Errors
    /// Returns `AoaError::InvalidFilterSpec` if the cutoffs are not strictly
    /// inside `(0, Nyquist)` in increasing order, or if the design fails.
    pub fn new(spec: FilterSpec) -> Result<Self> {
        spec.validate()?;

        let zpk = butter(
            spec.order as u32,
            FilterType::BandPass(spec.low_cut_hz, spec.high_cut_hz),
            spec.sample_rate_hz,
        )
        .map_err(|e| AoaError::InvalidFilterSpec(format!("{:?}", e)))?;
        let sos = zpk2sos(&zpk, None).map_err(|e| AoaError::InvalidFilterSpec(format!("{:?}", e)))?;

        log::debug!(
            "Designed order {} Butterworth band-pass {}-{} Hz at {} Hz ({} sections)",
            spec.order,
            spec.low_cut_hz,
            spec.high_cut_hz,
            spec.sample_rate_hz,
            sos.num_sections()
        );
        Ok(Self {
            spec,
            sos,
            poles: zpk.p,
        })
    }

    pub fn spec(&self) -> &FilterSpec {
        &self.spec
    }

    pub fn normalized_cutoffs(&self) -> (f64, f64) {
        self.spec.normalized_cutoffs()
    }

    /// Second-order sections of the cascade
    pub fn sections(&self) -> &Sos {
        &self.sos
    }

    /// Number of biquad sections in the cascade
    pub fn num_sections(&self) -> usize {
        self.sos.num_sections()
    }

    /// Digital poles of the design, two per section
    pub fn poles(&self) -> &[Complex64] {
        &self.poles
    }

    /// True when every pole lies strictly inside the unit circle
    pub fn is_stable(&self) -> bool {
        self.poles.iter().all(|p| p.norm() < 1.0)
    }

    /// Fresh filter instance with zeroed state
    pub fn filter(&self) -> BandpassFilter {
        BandpassFilter {
            filter: DirectForm2Transposed::new(&self.sos),
        }
    }

    /// First `len` samples of the response to a unit impulse
    pub fn impulse_response(&self, len: usize) -> Vec<f64> {
        let mut response = vec![0.0; len];
        if let Some(first) = response.first_mut() {
            *first = 1.0;
        }
        self.filter().process_buffer(&mut response);
        response
    }
}

/// Causal biquad cascade, one section feeding the next
pub struct BandpassFilter {
    filter: DirectForm2Transposed,
}

impl BandpassFilter {
    /// Filter single sample
    pub fn process(&mut self, sample: f64) -> f64 {
        self.filter.filter(sample)
    }

    /// Filter entire buffer in-place
    pub fn process_buffer(&mut self, buffer: &mut [f64]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }
}
