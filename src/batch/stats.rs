//! Per-group statistics over bearing estimates.
//!
//! Bearings live on a circle, so a group whose true bearing sits near 0°/360°
//! produces estimates on both sides of the seam. [`WrapPolicy`] decides how
//! that is handled before the mean and spread are taken.

use rolling_stats::Stats;
use serde::{Deserialize, Serialize};

use crate::constants::MIN_RESULTANT_LENGTH;
use crate::signal_processing::{angle_error, normalize_degrees, radians_to_bearing};

/// How estimates are unwrapped before averaging
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WrapPolicy {
    /// Plain linear statistics on [0, 360) values
    None,
    /// Add 360° to every estimate below `threshold_deg`, then linear statistics
    Unwrap { threshold_deg: f64 },
    /// Circular mean and circular standard deviation
    #[default]
    Circular,
}

/// Summary of one group of estimates
///
/// `mean_deg` is always in [0, 360). `min_deg` and `max_deg` are in the
/// unwrapped domain the policy works in, so they may fall outside it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AngleStatistics {
    pub count: usize,
    pub mean_deg: f64,
    pub std_dev_deg: f64,
    pub min_deg: f64,
    pub max_deg: f64,
    /// Signed error of the mean against the reference bearing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean_error_deg: Option<f64>,
}

/// Summarize estimates under a wrap policy
///
/// Returns `None` for an empty slice. The linear policies report the sample
/// standard deviation (n - 1 denominator).
pub fn summarize(angles: &[f64], policy: WrapPolicy, reference_deg: Option<f64>) -> Option<AngleStatistics> {
    if angles.is_empty() {
        return None;
    }

    let (mean_deg, std_dev_deg, min_deg, max_deg) = match policy {
        WrapPolicy::None => linear(angles.iter().copied()),
        WrapPolicy::Unwrap { threshold_deg } => linear(
            angles
                .iter()
                .map(|&a| if a < threshold_deg { a + 360.0 } else { a }),
        ),
        WrapPolicy::Circular => {
            let mean = circular_mean_degrees(angles);
            let (lo, hi) = angles
                .iter()
                .map(|&a| angle_error(a, mean))
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), d| {
                    (lo.min(d), hi.max(d))
                });
            (mean, circular_std_degrees(angles), mean + lo, mean + hi)
        }
    };

    let mean_deg = normalize_degrees(mean_deg);
    Some(AngleStatistics {
        count: angles.len(),
        mean_deg,
        std_dev_deg,
        min_deg,
        max_deg,
        mean_error_deg: reference_deg.map(|r| angle_error(mean_deg, r)),
    })
}

fn linear(values: impl Iterator<Item = f64>) -> (f64, f64, f64, f64) {
    let mut stats: Stats<f64> = Stats::new();
    for v in values {
        stats.update(v);
    }
    let std_dev = if stats.count > 1 { stats.std_dev } else { 0.0 };
    (stats.mean, std_dev, stats.min, stats.max)
}

/// Direction of the mean resultant vector, in [0, 360)
pub fn circular_mean_degrees(angles: &[f64]) -> f64 {
    let (s, c) = angles.iter().fold((0.0, 0.0), |(s, c), a| {
        let r = a.to_radians();
        (s + r.sin(), c + r.cos())
    });
    radians_to_bearing(s.atan2(c))
}

/// Mean resultant length R in [0, 1]; 1 means every angle agrees
pub fn mean_resultant_length(angles: &[f64]) -> f64 {
    if angles.is_empty() {
        return 0.0;
    }
    let (s, c) = angles.iter().fold((0.0, 0.0), |(s, c), a| {
        let r = a.to_radians();
        (s + r.sin(), c + r.cos())
    });
    (s.hypot(c) / angles.len() as f64).min(1.0)
}

/// Circular standard deviation `sqrt(-2 ln R)` in degrees
pub fn circular_std_degrees(angles: &[f64]) -> f64 {
    let r = mean_resultant_length(angles).max(MIN_RESULTANT_LENGTH);
    (-2.0 * r.ln()).max(0.0).sqrt().to_degrees()
}
