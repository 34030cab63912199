/// Fold an angle in degrees into [0, 360)
pub fn normalize_degrees(degrees: f64) -> f64 {
    let folded = degrees.rem_euclid(360.0);
    // rem_euclid rounds tiny negative inputs up to exactly 360.0
    if folded >= 360.0 || folded == 0.0 {
        0.0
    } else {
        folded
    }
}

/// Convert an angle in radians to a bearing in [0, 360)
pub fn radians_to_bearing(radians: f64) -> f64 {
    normalize_degrees(radians.to_degrees())
}

/// Signed difference `measured - expected` wrapped to [-180, 180)
pub fn angle_error(measured: f64, expected: f64) -> f64 {
    let e = (measured - expected).rem_euclid(360.0);
    if e >= 180.0 { e - 360.0 } else { e }
}
