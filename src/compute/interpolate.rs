//! Point-in-time position estimation over a [`SampleStore`].
//!
//! Positions between two samples are blended linearly by elapsed time. Queries
//! outside an entity's sample range clamp to the nearest end; nothing is
//! extrapolated.

use crate::compute::store::SampleStore;
use geo::Point;
use tracelayer_types::entity::EntityId;
use tracelayer_types::point::Sample;

/// Types that can be linearly blended between two states.
pub trait Interpolatable: Copy {
    /// Move `elapsed / span` of the way from `self` to `other`.
    fn lerp(&self, other: &Self, elapsed: f64, span: f64) -> Self;
}

impl Interpolatable for Point<f64> {
    #[inline]
    fn lerp(&self, other: &Self, elapsed: f64, span: f64) -> Self {
        // Scale before dividing so integral inputs stay exact.
        let x = self.x() + (other.x() - self.x()) * elapsed / span;
        let y = self.y() + (other.y() - self.y()) * elapsed / span;
        Point::new(x, y)
    }
}

/// Estimate the position at `at` from samples sorted ascending by timestamp.
///
/// Returns `None` only for an empty slice. When several samples share the
/// queried timestamp the last of them wins.
///
/// ```
/// use tracelayer::compute::interpolate::position_at;
/// use tracelayer_types::point::Sample;
/// use geo::Point;
///
/// let samples = [
///     Sample::new(0, Point::new(0.0, 0.0)),
///     Sample::new(10, Point::new(10.0, 10.0)),
/// ];
/// assert_eq!(position_at(&samples, 4), Some(Point::new(4.0, 4.0)));
/// assert_eq!(position_at(&samples, -5), Some(Point::new(0.0, 0.0)));
/// assert_eq!(position_at(&samples, 99), Some(Point::new(10.0, 10.0)));
/// ```
pub fn position_at(samples: &[Sample], at: i64) -> Option<Point<f64>> {
    let first = samples.first()?;

    // Index of the first sample strictly after `at`.
    let upper = samples.partition_point(|s| s.timestamp <= at);

    if upper == 0 {
        return Some(first.position);
    }
    if upper == samples.len() {
        return samples.last().map(|s| s.position);
    }

    let before = &samples[upper - 1];
    let after = &samples[upper];
    // before.timestamp <= at < after.timestamp, so the span is positive
    let span = (after.timestamp as i128 - before.timestamp as i128) as f64;
    let elapsed = (at as i128 - before.timestamp as i128) as f64;

    Some(before.position.lerp(&after.position, elapsed, span))
}

/// Linear position interpolator over an immutable sample store.
#[derive(Debug, Clone, Default)]
pub struct LinearInterpolator {
    store: SampleStore,
}

impl LinearInterpolator {
    pub fn new(store: SampleStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &SampleStore {
        &self.store
    }

    /// Estimated position of `id` for the window `[start_epoch, end_epoch)`.
    ///
    /// The estimate is taken at the window start; `end_epoch` does not
    /// influence the result. Unknown entities yield `None`.
    pub fn query(&self, id: &EntityId, start_epoch: i64, _end_epoch: i64) -> Option<Point<f64>> {
        position_at(self.store.samples(id)?, start_epoch)
    }
}
