//! Numeric constants shared across the estimation pipeline.

/// Width in bytes of the sample period header of a recording.
pub const SAMPLE_PERIOD_BYTES: usize = 8;

/// Width in bytes of one raw ADC sample.
pub const SAMPLE_BYTES: usize = 2;

/// Default tolerance below which both triangulation terms are treated as zero.
/// Correlation lags are whole upsampled samples, so any real bearing puts at
/// least one term at magnitude >= 1.
pub const DEFAULT_DEGENERATE_TOLERANCE: f64 = 1e-9;

/// Largest `len(a) * len(b)` for which `CorrelationMethod::Auto` correlates
/// directly instead of going through the FFT.
pub const DIRECT_CORRELATION_MAX_WORK: usize = 1 << 18;

/// Floor applied to the mean resultant length before taking its logarithm
/// in circular statistics.
pub const MIN_RESULTANT_LENGTH: f64 = 1e-12;
