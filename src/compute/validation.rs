//! Validation for positions and time windows.

use crate::config::TimeFrame;
use crate::error::{Result, TraceError};
use geo::Point;

/// Validates that a position has finite coordinates.
///
/// Coordinates are not range-checked because layers may use projected
/// coordinate reference systems.
///
/// # Examples
///
/// ```
/// use tracelayer::compute::validation::validate_point;
/// use geo::Point;
///
/// assert!(validate_point(&Point::new(-74.0060, 40.7128)).is_ok());
/// assert!(validate_point(&Point::new(f64::NAN, 40.0)).is_err());
/// ```
pub fn validate_point(point: &Point) -> Result<()> {
    let (x, y) = (point.x(), point.y());

    if !x.is_finite() {
        return Err(TraceError::InvalidInput(format!(
            "X coordinate must be finite, got: {}",
            x
        )));
    }

    if !y.is_finite() {
        return Err(TraceError::InvalidInput(format!(
            "Y coordinate must be finite, got: {}",
            y
        )));
    }

    Ok(())
}

/// Validates multiple points, reporting the index of the first bad one.
pub fn validate_points(points: &[Point]) -> Result<()> {
    for (idx, point) in points.iter().enumerate() {
        validate_point(point)
            .map_err(|e| TraceError::InvalidInput(format!("Point at index {}: {}", idx, e)))?;
    }
    Ok(())
}

/// Validates a display window width.
///
/// ```
/// use tracelayer::compute::validation::validate_time_frame;
/// use tracelayer::TimeFrame;
///
/// assert!(validate_time_frame(TimeFrame::minutes(5)).is_ok());
/// assert!(validate_time_frame(TimeFrame::seconds(0)).is_ok());
/// assert!(validate_time_frame(TimeFrame::seconds(-1)).is_err());
/// ```
pub fn validate_time_frame(frame: TimeFrame) -> Result<()> {
    if frame.width() < chrono::Duration::zero() {
        return Err(TraceError::InvalidInput(format!(
            "Time frame width must not be negative, got {} seconds",
            frame.width().num_seconds()
        )));
    }
    Ok(())
}

/// Validates an epoch window `[start, end)`.
pub fn validate_window(start_epoch: i64, end_epoch: i64) -> Result<()> {
    if start_epoch > end_epoch {
        return Err(TraceError::InvalidInput(format!(
            "Window start {} is after window end {}",
            start_epoch, end_epoch
        )));
    }
    Ok(())
}
