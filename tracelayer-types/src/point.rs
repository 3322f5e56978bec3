use geo::Point;
use serde::{Deserialize, Serialize};

/// A single recorded observation: where an entity was at a given instant.
///
/// Timestamps are whole seconds since the Unix epoch (UTC).
///
/// # Examples
///
/// ```
/// use tracelayer_types::point::Sample;
/// use geo::Point;
///
/// let sample = Sample::new(10, Point::new(1.0, 2.0));
/// assert_eq!(sample.x(), 1.0);
/// assert_eq!(sample.y(), 2.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp: i64,
    pub position: Point<f64>,
}

impl Sample {
    pub fn new(timestamp: i64, position: Point<f64>) -> Self {
        Self {
            timestamp,
            position,
        }
    }

    /// Get the x coordinate (longitude).
    pub fn x(&self) -> f64 {
        self.position.x()
    }

    /// Get the y coordinate (latitude).
    pub fn y(&self) -> f64 {
        self.position.y()
    }

    /// Seconds elapsed from this sample to `other` (negative if `other` is earlier).
    #[inline]
    pub fn seconds_until(&self, other: &Sample) -> i64 {
        other.timestamp.saturating_sub(self.timestamp)
    }
}

impl From<(i64, Point<f64>)> for Sample {
    fn from((timestamp, position): (i64, Point<f64>)) -> Self {
        Self::new(timestamp, position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_creation() {
        let s = Sample::new(1_000, Point::new(-74.0, 40.7));
        assert_eq!(s.timestamp, 1_000);
        assert_eq!(s.x(), -74.0);
        assert_eq!(s.y(), 40.7);
    }

    #[test]
    fn test_seconds_until() {
        let a = Sample::new(100, Point::new(0.0, 0.0));
        let b = Sample::new(160, Point::new(1.0, 1.0));
        assert_eq!(a.seconds_until(&b), 60);
        assert_eq!(b.seconds_until(&a), -60);

        let first = Sample::new(i64::MIN, Point::new(0.0, 0.0));
        let last = Sample::new(i64::MAX, Point::new(0.0, 0.0));
        assert_eq!(first.seconds_until(&last), i64::MAX);
    }

    #[test]
    fn test_from_tuple() {
        let s: Sample = (5, Point::new(5.0, 5.0)).into();
        assert_eq!(s, Sample::new(5, Point::new(5.0, 5.0)));
    }
}
