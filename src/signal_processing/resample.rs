use num_complex::Complex64;
use rustfft::FftPlanner;

use crate::error::{AoaError, Result};

/// Bandlimited integer-factor upsampling in the Fourier domain
///
/// The input spectrum is zero-padded to `len * factor` bins and transformed
/// back, which interpolates with a periodic sinc kernel. Content below the
/// original Nyquist frequency is preserved exactly; for even lengths the
/// Nyquist bin is split evenly between the positive and negative halves so the
/// output stays real.
///
/// A factor of 1 returns the input unchanged.
///
/// # Errors
/// Returns `AoaError::Config` if `factor` is 0 or the output length overflows.
pub fn upsample(input: &[f64], factor: usize) -> Result<Vec<f64>> {
    if factor == 0 {
        return Err(AoaError::Config("upsample factor must be at least 1".into()));
    }
    let n = input.len();
    if factor == 1 || n == 0 {
        return Ok(input.to_vec());
    }
    let m = n
        .checked_mul(factor)
        .ok_or_else(|| AoaError::Config(format!("upsampling {} samples by {} overflows", n, factor)))?;

    let mut planner = FftPlanner::<f64>::new();

    let mut spectrum: Vec<Complex64> = input.iter().map(|&x| Complex64::new(x, 0.0)).collect();
    planner.plan_fft_forward(n).process(&mut spectrum);

    let mut padded = vec![Complex64::new(0.0, 0.0); m];
    let nyquist_bin = n / 2;
    padded[0] = spectrum[0];
    for k in 1..=nyquist_bin {
        padded[k] = spectrum[k];
        padded[m - k] = spectrum[k].conj();
    }
    if n % 2 == 0 {
        let half = spectrum[nyquist_bin] * 0.5;
        padded[nyquist_bin] = half;
        padded[m - nyquist_bin] = half.conj();
    }

    planner.plan_fft_inverse(m).process(&mut padded);

    // rustfft does not normalize; 1/m for the inverse, m/n for the new rate.
    let scale = 1.0 / n as f64;
    Ok(padded.iter().map(|c| c.re * scale).collect())
}
