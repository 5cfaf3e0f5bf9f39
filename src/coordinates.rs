//! Conversion from decimal degrees to FIT semicircles

use thiserror::Error;

/// One degree in semicircles: 2^31 / 180.
const SEMICIRCLES_PER_DEGREE: f64 = (1u64 << 31) as f64 / 180.0;

#[derive(Error, Debug)]
pub enum CoordinateError {
    #[error("Coordinate {0} is outside the valid range [-180, 180] degrees")]
    OutOfRange(f64),
}

/// Converts an angle in decimal degrees into FIT semicircles.
///
/// Rounds half away from zero. +180.0 scales to exactly 2^31, one past
/// `i32::MAX`, and is clamped to `i32::MAX`; -180.0 encodes exactly as
/// `i32::MIN`. Anything outside [-180, 180], including NaN, is rejected.
pub fn to_semicircles(degrees: f64) -> Result<i32, CoordinateError> {
    if !degrees.is_finite() || !(-180.0..=180.0).contains(&degrees) {
        return Err(CoordinateError::OutOfRange(degrees));
    }
    let scaled = (degrees * SEMICIRCLES_PER_DEGREE).round();
    if scaled > i32::MAX as f64 {
        Ok(i32::MAX)
    } else {
        Ok(scaled as i32)
    }
}
