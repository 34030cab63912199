//! Closed-form triangulation for an equilateral three-microphone array.
//!
//! ## Array layout
//!
//! The microphones sit on a circle around the array centroid, 120° apart.
//! Angles are measured counter-clockwise from the x axis, which is parallel
//! to the mic 2 → mic 3 edge:
//!
//! ```text
//!              mic 1 (90°)
//!                 /\
//!                /  \
//!               /    \
//!   mic 2 (210°) ---- mic 3 (330°)      → 0°
//! ```
//!
//! With mic 1, 2, 3 on recording channels 2, 3, 4 and the delays ordered as in
//! [`DelayTriple`], a far-field source at bearing θ gives
//!
//! ```text
//! θ = atan2( √3 · (d21 + d31), d21 − d31 − 2·d32 )
//! ```
//!
//! The delays only enter as ratios, so their unit (upsampled samples) and the
//! array radius drop out.

use serde::Serialize;

use crate::constants::DEFAULT_DEGENERATE_TOLERANCE;
use crate::error::{AoaError, Result};
use crate::signal_processing::{DelayTriple, radians_to_bearing};

/// Bearing in degrees, always in [0, 360)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct AngleEstimate(f64);

impl AngleEstimate {
    /// Wrap any finite angle into [0, 360)
    pub fn from_degrees(degrees: f64) -> Self {
        Self(crate::signal_processing::normalize_degrees(degrees))
    }

    pub fn degrees(&self) -> f64 {
        self.0
    }

    pub fn radians(&self) -> f64 {
        self.0.to_radians()
    }
}

impl std::fmt::Display for AngleEstimate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}°", self.0)
    }
}

/// Numerator and denominator of the triangulation `atan2`
pub fn triangulation_terms(delays: &DelayTriple) -> (f64, f64) {
    let numerator = 3f64.sqrt() * (delays.d21 + delays.d31);
    let denominator = delays.d21 - delays.d31 - 2.0 * delays.d32;
    (numerator, denominator)
}

/// Turns pairwise delays into a bearing
#[derive(Debug, Clone, Copy)]
pub struct AoaResolver {
    degenerate_tolerance: f64,
}

impl Default for AoaResolver {
    fn default() -> Self {
        Self::new(DEFAULT_DEGENERATE_TOLERANCE)
    }
}

impl AoaResolver {
    pub fn new(degenerate_tolerance: f64) -> Self {
        Self {
            degenerate_tolerance,
        }
    }

    /// Resolve a delay triple to a bearing in [0, 360)
    ///
    /// # Errors
    /// Returns `AoaError::DegenerateGeometry` when both triangulation terms
    /// are within the tolerance of zero. Equal delays on all three pairs
    /// (a source equidistant from every microphone) land here instead of
    /// silently reading as 0°.
    pub fn resolve(&self, delays: &DelayTriple) -> Result<AngleEstimate> {
        let (numerator, denominator) = triangulation_terms(delays);
        if !(numerator.is_finite() && denominator.is_finite()) {
            return Err(AoaError::DegenerateGeometry {
                numerator,
                denominator,
            });
        }
        if numerator.abs() <= self.degenerate_tolerance
            && denominator.abs() <= self.degenerate_tolerance
        {
            return Err(AoaError::DegenerateGeometry {
                numerator,
                denominator,
            });
        }
        Ok(AngleEstimate(radians_to_bearing(numerator.atan2(denominator))))
    }
}

/// Equilateral array geometry, used to synthesize delays for a known bearing
pub struct ArrayGeometry;

impl ArrayGeometry {
    /// Angular position of mic 1, 2 and 3 around the centroid
    pub const MIC_ANGLES_DEG: [f64; 3] = [90.0, 210.0, 330.0];

    /// Arrival time of a far-field wavefront at each microphone relative to
    /// the centroid, in units of `delay_scale` (the travel time across one
    /// array radius)
    pub fn arrival_offsets(bearing_deg: f64, delay_scale: f64) -> [f64; 3] {
        let theta = bearing_deg.to_radians();
        Self::MIC_ANGLES_DEG.map(|phi| -delay_scale * (theta - phi.to_radians()).cos())
    }

    /// Delay triple a source at `bearing_deg` produces
    pub fn delays_for_angle(bearing_deg: f64, delay_scale: f64) -> DelayTriple {
        let [t1, t2, t3] = Self::arrival_offsets(bearing_deg, delay_scale);
        DelayTriple::new(t2 - t1, t3 - t1, t3 - t2)
    }
}
