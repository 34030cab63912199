//! Cross-correlation and delay estimation.
//!
//! For inputs `a` (length Na) and `b` (length Nb) the full linear
//! cross-correlation has Na + Nb - 1 values:
//!
//! ```text
//! corr[i] = sum_n a[n + k] * b[n],   k = i - (Nb - 1)
//! ```
//!
//! The delay is the index of the largest magnitude minus the center index
//! `(len - 1) / 2`. A positive delay means `a` is a delayed copy of `b`.

use num_complex::Complex64;
use rustfft::FftPlanner;
use serde::Serialize;

use crate::config::CorrelationMethod;
use crate::constants::DIRECT_CORRELATION_MAX_WORK;
use crate::error::{AoaError, Result};

/// Full linear cross-correlation of two sequences
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationResult {
    values: Vec<f64>,
}

/// One point of a correlation window, for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CorrelationPoint {
    pub lag: f64,
    pub value: f64,
}

impl CorrelationResult {
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Index of zero lag for equal-length inputs
    pub fn center(&self) -> f64 {
        (self.values.len() as f64 - 1.0) / 2.0
    }

    /// Index of the largest magnitude; the lowest index wins ties
    pub fn peak_index(&self) -> usize {
        let mut best = 0;
        let mut best_magnitude = f64::NEG_INFINITY;
        for (i, v) in self.values.iter().enumerate() {
            if v.abs() > best_magnitude {
                best = i;
                best_magnitude = v.abs();
            }
        }
        best
    }

    /// Peak position relative to the center, in samples
    pub fn peak_lag(&self) -> f64 {
        self.peak_index() as f64 - self.center()
    }

    /// Values within `half_width` lags either side of the center
    pub fn window(&self, half_width: usize) -> Vec<CorrelationPoint> {
        if self.values.is_empty() {
            return Vec::new();
        }
        let center = self.center();
        let mid = center.floor() as usize;
        let start = mid.saturating_sub(half_width);
        let end = (mid + half_width + 1).min(self.values.len());
        (start..end)
            .map(|i| CorrelationPoint {
                lag: i as f64 - center,
                value: self.values[i],
            })
            .collect()
    }
}

/// Compute the full linear cross-correlation of `a` against `b`
///
/// # Errors
/// Returns `AoaError::InsufficientData` if either input is empty.
pub fn cross_correlate(a: &[f64], b: &[f64], method: CorrelationMethod) -> Result<CorrelationResult> {
    if a.is_empty() || b.is_empty() {
        return Err(AoaError::InsufficientData {
            needed: 1,
            available: 0,
        });
    }

    let use_fft = match method {
        CorrelationMethod::Direct => false,
        CorrelationMethod::Fft => true,
        CorrelationMethod::Auto => a.len().saturating_mul(b.len()) > DIRECT_CORRELATION_MAX_WORK,
    };

    let values = if use_fft {
        correlate_fft(a, b)
    } else {
        correlate_direct(a, b)
    };
    Ok(CorrelationResult { values })
}

/// Delay of `a` relative to `b` in samples
pub fn estimate_delay(a: &[f64], b: &[f64], method: CorrelationMethod) -> Result<f64> {
    Ok(cross_correlate(a, b, method)?.peak_lag())
}

fn correlate_direct(a: &[f64], b: &[f64]) -> Vec<f64> {
    let na = a.len() as isize;
    let nb = b.len() as isize;
    (0..na + nb - 1)
        .map(|i| {
            let k = i - (nb - 1);
            let n_start = (-k).max(0);
            let n_end = nb.min(na - k);
            (n_start..n_end)
                .map(|n| a[(n + k) as usize] * b[n as usize])
                .sum()
        })
        .collect()
}

fn correlate_fft(a: &[f64], b: &[f64]) -> Vec<f64> {
    let out_len = a.len() + b.len() - 1;
    let size = out_len.next_power_of_two();

    let mut planner = FftPlanner::<f64>::new();
    let forward = planner.plan_fft_forward(size);
    let inverse = planner.plan_fft_inverse(size);

    let to_padded = |x: &[f64]| {
        let mut buf: Vec<Complex64> = x.iter().map(|&v| Complex64::new(v, 0.0)).collect();
        buf.resize(size, Complex64::new(0.0, 0.0));
        buf
    };

    let mut spec_a = to_padded(a);
    let mut spec_b = to_padded(b);
    forward.process(&mut spec_a);
    forward.process(&mut spec_b);

    for (x, y) in spec_a.iter_mut().zip(spec_b.iter()) {
        *x *= y.conj();
    }
    inverse.process(&mut spec_a);

    // Circular lag k sits at index k mod size; lag k = i - (Nb - 1).
    let scale = 1.0 / size as f64;
    let offset = size - (b.len() - 1);
    (0..out_len)
        .map(|i| spec_a[(i + offset) % size].re * scale)
        .collect()
}

/// Pairwise delays between the three microphones, in upsampled samples
///
/// `d21` is the delay of mic 2 relative to mic 1, `d31` of mic 3 relative to
/// mic 1 and `d32` of mic 3 relative to mic 2. The triangulation formula
/// depends on exactly this ordering.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct DelayTriple {
    pub d21: f64,
    pub d31: f64,
    pub d32: f64,
}

/// Correlations behind a [`DelayTriple`]
#[derive(Debug, Clone)]
pub struct PairCorrelations {
    pub c21: CorrelationResult,
    pub c31: CorrelationResult,
    pub c32: CorrelationResult,
}

impl DelayTriple {
    pub fn new(d21: f64, d31: f64, d32: f64) -> Self {
        Self { d21, d31, d32 }
    }

    /// Correlate the three conditioned microphone channels
    pub fn measure(
        mic1: &[f64],
        mic2: &[f64],
        mic3: &[f64],
        method: CorrelationMethod,
    ) -> Result<(Self, PairCorrelations)> {
        let c21 = cross_correlate(mic2, mic1, method)?;
        let c31 = cross_correlate(mic3, mic1, method)?;
        let c32 = cross_correlate(mic3, mic2, method)?;
        let delays = Self::new(c21.peak_lag(), c31.peak_lag(), c32.peak_lag());
        log::debug!(
            "Pairwise delays: d21={} d31={} d32={}",
            delays.d21,
            delays.d31,
            delays.d32
        );
        Ok((delays, PairCorrelations { c21, c31, c32 }))
    }

    /// Mismatch between `d31` and `d21 + d32`; zero for a single clean source
    pub fn closure_error(&self) -> f64 {
        self.d31 - (self.d21 + self.d32)
    }
}
