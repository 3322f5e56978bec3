//! Per-entity, time-ordered sample index.
//!
//! The store is built once from the complete feature collection of a layer and
//! never mutated afterwards. Each entity's samples are sorted ascending by
//! timestamp with a stable sort, so samples sharing a timestamp keep the order
//! in which they were read.

use crate::compute::validation::validate_point;
use crate::error::{Result, TraceError};
use crate::time::timeval_to_epoch;
use rustc_hash::{FxHashMap, FxHashSet};
use tracelayer_types::entity::{EntityId, EntityIdScheme};
use tracelayer_types::feature::Feature;
use tracelayer_types::point::Sample;

/// Derive the entity id of `feature` under `scheme`.
///
/// Returns `Ok(None)` when the id attribute is present but null, and an error
/// when the attribute does not exist on the feature at all.
pub(crate) fn entity_id_of(feature: &Feature, scheme: &EntityIdScheme) -> Result<Option<EntityId>> {
    match scheme {
        EntityIdScheme::SingleStream => Ok(Some(EntityId::Default)),
        EntityIdScheme::PerAttribute(name) => {
            let value = feature.attribute(name).ok_or_else(|| {
                TraceError::MissingAttribute(format!(
                    "feature {} has no id attribute '{}'",
                    feature.id, name
                ))
            })?;
            Ok(EntityId::from_attr(value))
        }
    }
}

/// Counters collected while building a [`SampleStore`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub ingested: usize,
    pub skipped_geometry: usize,
    pub skipped_null_id: usize,
    /// Points with NaN or infinite coordinates
    pub skipped_non_finite: usize,
}

/// Immutable mapping from entity id to its time-ordered samples.
#[derive(Debug, Clone, Default)]
pub struct SampleStore {
    samples: FxHashMap<EntityId, Vec<Sample>>,
    universe: FxHashSet<EntityId>,
    stats: BuildStats,
}

impl SampleStore {
    /// Build the store from every feature of a layer.
    ///
    /// Each feature contributes one sample at the instant given by
    /// `from_time_attribute`. Features without a single point geometry, or
    /// whose point has non-finite coordinates, are skipped with a warning but
    /// their ids still join the universe.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tracelayer::compute::store::SampleStore;
    /// use tracelayer_types::entity::{EntityId, EntityIdScheme};
    /// use tracelayer_types::feature::Feature;
    /// use geo::Point;
    ///
    /// let features = vec![
    ///     Feature::point(1, Point::new(10.0, 10.0)).with_attribute("t", 10_i64).with_attribute("id", "A"),
    ///     Feature::point(2, Point::new(0.0, 0.0)).with_attribute("t", 0_i64).with_attribute("id", "A"),
    /// ];
    /// let scheme = EntityIdScheme::PerAttribute("id".into());
    /// let store = SampleStore::build(&features, &scheme, "t", "%Y-%m-%d %H:%M:%S")?;
    ///
    /// let samples = store.samples(&EntityId::from("A")).unwrap();
    /// assert_eq!(samples[0].timestamp, 0);
    /// assert_eq!(samples[1].timestamp, 10);
    /// # Ok::<(), tracelayer::TraceError>(())
    /// ```
    pub fn build<'a, I>(
        features: I,
        scheme: &EntityIdScheme,
        from_time_attribute: &str,
        time_format: &str,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = &'a Feature>,
    {
        let mut samples: FxHashMap<EntityId, Vec<Sample>> = FxHashMap::default();
        let mut universe = FxHashSet::default();
        let mut stats = BuildStats::default();

        for feature in features {
            let Some(id) = entity_id_of(feature, scheme)? else {
                log::warn!("Ignoring feature {} with a NULL id attribute", feature.id);
                stats.skipped_null_id += 1;
                continue;
            };
            universe.insert(id.clone());

            let Some(position) = feature.as_point() else {
                log::warn!("Ignoring 1 non-point geometry (feature {})", feature.id);
                stats.skipped_geometry += 1;
                continue;
            };
            if let Err(e) = validate_point(&position) {
                log::warn!("Ignoring feature {}: {}", feature.id, e);
                stats.skipped_non_finite += 1;
                continue;
            }

            let raw_time = feature.attribute(from_time_attribute).ok_or_else(|| {
                TraceError::MissingAttribute(format!(
                    "feature {} has no time attribute '{}'",
                    feature.id, from_time_attribute
                ))
            })?;
            let timestamp = timeval_to_epoch(raw_time, time_format)?;

            samples
                .entry(id)
                .or_default()
                .push(Sample::new(timestamp, position));
            stats.ingested += 1;
        }

        for sequence in samples.values_mut() {
            sequence.sort_by_key(|s| s.timestamp);
        }

        if !scheme.has_id_attribute() {
            universe.insert(EntityId::Default);
        }

        log::debug!(
            "Built sample store: {} samples across {} entities ({} non-point, {} non-finite, {} null ids skipped)",
            stats.ingested,
            samples.len(),
            stats.skipped_geometry,
            stats.skipped_non_finite,
            stats.skipped_null_id
        );

        Ok(Self {
            samples,
            universe,
            stats,
        })
    }

    /// Samples of `id`, ascending by timestamp.
    pub fn samples(&self, id: &EntityId) -> Option<&[Sample]> {
        self.samples.get(id).map(Vec::as_slice)
    }

    /// Every entity id observed at construction time.
    pub fn universe(&self) -> &FxHashSet<EntityId> {
        &self.universe
    }

    /// First and last timestamp recorded for `id`.
    pub fn time_range(&self, id: &EntityId) -> Option<(i64, i64)> {
        let samples = self.samples.get(id)?;
        Some((samples.first()?.timestamp, samples.last()?.timestamp))
    }

    pub fn entity_count(&self) -> usize {
        self.samples.len()
    }

    pub fn sample_count(&self) -> usize {
        self.samples.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn stats(&self) -> BuildStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::DEFAULT_FORMAT;
    use geo::{LineString, Point};

    fn sample_feature(fid: i64, id: &str, t: i64, x: f64, y: f64) -> Feature {
        Feature::point(fid, Point::new(x, y))
            .with_attribute("id", id)
            .with_attribute("t", t)
    }

    fn per_id() -> EntityIdScheme {
        EntityIdScheme::PerAttribute("id".into())
    }

    #[test]
    fn test_samples_sorted_per_entity() {
        let features = vec![
            sample_feature(1, "A", 30, 3.0, 3.0),
            sample_feature(2, "B", 5, 5.0, 5.0),
            sample_feature(3, "A", 10, 1.0, 1.0),
            sample_feature(4, "A", 20, 2.0, 2.0),
        ];

        let store = SampleStore::build(&features, &per_id(), "t", DEFAULT_FORMAT).unwrap();

        let a: Vec<i64> = store
            .samples(&EntityId::from("A"))
            .unwrap()
            .iter()
            .map(|s| s.timestamp)
            .collect();
        assert_eq!(a, vec![10, 20, 30]);
        assert_eq!(store.entity_count(), 2);
        assert_eq!(store.sample_count(), 4);
        assert_eq!(store.time_range(&EntityId::from("A")), Some((10, 30)));
        assert_eq!(store.time_range(&EntityId::from("Z")), None);
    }

    #[test]
    fn test_duplicate_timestamps_keep_arrival_order() {
        let features = vec![
            sample_feature(1, "A", 10, 1.0, 0.0),
            sample_feature(2, "A", 0, 0.0, 0.0),
            sample_feature(3, "A", 10, 2.0, 0.0),
        ];

        let store = SampleStore::build(&features, &per_id(), "t", DEFAULT_FORMAT).unwrap();
        let xs: Vec<f64> = store
            .samples(&EntityId::from("A"))
            .unwrap()
            .iter()
            .map(|s| s.x())
            .collect();
        assert_eq!(xs, vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_single_stream_collapses_ids() {
        let features = vec![
            sample_feature(1, "A", 0, 0.0, 0.0),
            sample_feature(2, "B", 5, 5.0, 5.0),
        ];

        let store =
            SampleStore::build(&features, &EntityIdScheme::SingleStream, "t", DEFAULT_FORMAT)
                .unwrap();
        assert_eq!(store.entity_count(), 1);
        assert_eq!(store.universe().len(), 1);
        assert!(store.universe().contains(&EntityId::Default));
        assert_eq!(store.samples(&EntityId::Default).unwrap().len(), 2);
    }

    #[test]
    fn test_single_stream_universe_without_features() {
        let store = SampleStore::build(
            std::iter::empty::<&Feature>(),
            &EntityIdScheme::SingleStream,
            "t",
            DEFAULT_FORMAT,
        )
        .unwrap();
        assert!(store.is_empty());
        assert!(store.universe().contains(&EntityId::Default));
    }

    #[test]
    fn test_non_point_skipped_but_id_observed() {
        let line = Feature::new(9)
            .with_geometry(LineString::from(vec![(0.0, 0.0), (1.0, 1.0)]))
            .with_attribute("id", "L")
            .with_attribute("t", 0_i64);
        let features = vec![sample_feature(1, "A", 0, 0.0, 0.0), line];

        let store = SampleStore::build(&features, &per_id(), "t", DEFAULT_FORMAT).unwrap();
        assert!(store.samples(&EntityId::from("L")).is_none());
        assert!(store.universe().contains(&EntityId::from("L")));
        assert_eq!(store.stats().skipped_geometry, 1);
        assert_eq!(store.stats().ingested, 1);
    }

    #[test]
    fn test_non_finite_position_skipped() {
        let features = vec![
            sample_feature(1, "A", 0, 0.0, 0.0),
            sample_feature(2, "B", 5, f64::NAN, 0.0),
            sample_feature(3, "B", 8, 1.0, f64::INFINITY),
            sample_feature(4, "B", 9, 2.0, 2.0),
        ];

        let store = SampleStore::build(&features, &per_id(), "t", DEFAULT_FORMAT).unwrap();
        assert_eq!(store.stats().skipped_non_finite, 2);
        assert_eq!(store.stats().ingested, 2);
        assert_eq!(store.time_range(&EntityId::from("B")), Some((9, 9)));
        assert!(store.universe().contains(&EntityId::from("B")));
    }

    #[test]
    fn test_null_id_skipped() {
        let features = vec![
            Feature::point(1, Point::new(0.0, 0.0))
                .with_attribute("id", tracelayer_types::feature::AttrValue::Null)
                .with_attribute("t", 0_i64),
        ];
        let store = SampleStore::build(&features, &per_id(), "t", DEFAULT_FORMAT).unwrap();
        assert!(store.universe().is_empty());
        assert_eq!(store.stats().skipped_null_id, 1);
    }

    #[test]
    fn test_missing_attributes_fail() {
        let no_id = vec![Feature::point(1, Point::new(0.0, 0.0)).with_attribute("t", 0_i64)];
        let err = SampleStore::build(&no_id, &per_id(), "t", DEFAULT_FORMAT).unwrap_err();
        assert!(matches!(err, TraceError::MissingAttribute(_)));

        let no_time = vec![Feature::point(1, Point::new(0.0, 0.0)).with_attribute("id", "A")];
        let err = SampleStore::build(&no_time, &per_id(), "t", DEFAULT_FORMAT).unwrap_err();
        assert!(matches!(err, TraceError::MissingAttribute(_)));
    }

    #[test]
    fn test_text_timestamps_parsed_as_utc() {
        let features = vec![
            Feature::point(1, Point::new(0.0, 0.0))
                .with_attribute("id", "A")
                .with_attribute("t", "1970-01-01 00:00:10"),
        ];
        let store = SampleStore::build(&features, &per_id(), "t", DEFAULT_FORMAT).unwrap();
        assert_eq!(store.samples(&EntityId::from("A")).unwrap()[0].timestamp, 10);
    }

    #[test]
    fn test_bad_time_value_fails() {
        let features = vec![
            Feature::point(1, Point::new(0.0, 0.0))
                .with_attribute("id", "A")
                .with_attribute("t", "not a time"),
        ];
        let err = SampleStore::build(&features, &per_id(), "t", DEFAULT_FORMAT).unwrap_err();
        assert!(matches!(err, TraceError::InvalidTimeValue(_)));
    }
}
