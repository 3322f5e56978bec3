//! Which entities are absent from the currently displayed frame.

use crate::compute::store::entity_id_of;
use crate::error::Result;
use rustc_hash::FxHashSet;
use tracelayer_types::entity::{EntityId, EntityIdScheme};
use tracelayer_types::feature::Feature;

/// Set difference between the id universe and the ids rendered in a frame.
#[derive(Debug, Clone)]
pub struct FrameDiffer {
    scheme: EntityIdScheme,
}

impl FrameDiffer {
    pub fn new(scheme: EntityIdScheme) -> Self {
        Self { scheme }
    }

    pub fn scheme(&self) -> &EntityIdScheme {
        &self.scheme
    }

    /// Ids present among `frame`, extracted with the same rule used to build
    /// the sample store. Non-point and null-id features are skipped.
    pub fn present_ids<'a, I>(&self, frame: I) -> Result<FxHashSet<EntityId>>
    where
        I: IntoIterator<Item = &'a Feature>,
    {
        let mut present = FxHashSet::default();
        for feature in frame {
            if !feature.is_single_point() {
                log::warn!("Ignoring 1 non-point geometry (feature {})", feature.id);
                continue;
            }
            match entity_id_of(feature, &self.scheme)? {
                Some(id) => {
                    present.insert(id);
                }
                None => log::warn!("Ignoring feature {} with a NULL id attribute", feature.id),
            }
        }
        Ok(present)
    }

    /// `universe - present(frame)`. An empty result means nothing needs
    /// interpolating.
    pub fn missing_ids<'a, I>(
        &self,
        frame: I,
        universe: &FxHashSet<EntityId>,
    ) -> Result<FxHashSet<EntityId>>
    where
        I: IntoIterator<Item = &'a Feature>,
    {
        let present = self.present_ids(frame)?;
        Ok(universe.difference(&present).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{LineString, Point};

    fn feature(fid: i64, id: &str) -> Feature {
        Feature::point(fid, Point::new(0.0, 0.0)).with_attribute("id", id)
    }

    fn universe(ids: &[&str]) -> FxHashSet<EntityId> {
        ids.iter().map(|id| EntityId::from(*id)).collect()
    }

    #[test]
    fn test_missing_is_set_difference() {
        let differ = FrameDiffer::new(EntityIdScheme::PerAttribute("id".into()));
        let frame = vec![feature(1, "A"), feature(2, "C"), feature(3, "A")];

        let missing = differ
            .missing_ids(&frame, &universe(&["A", "B", "C", "D"]))
            .unwrap();
        assert_eq!(missing, universe(&["B", "D"]));
    }

    #[test]
    fn test_all_present_yields_empty() {
        let differ = FrameDiffer::new(EntityIdScheme::PerAttribute("id".into()));
        let frame = vec![feature(1, "A"), feature(2, "B")];
        let missing = differ.missing_ids(&frame, &universe(&["A", "B"])).unwrap();
        assert!(missing.is_empty());
    }

    #[test]
    fn test_ids_outside_universe_ignored() {
        let differ = FrameDiffer::new(EntityIdScheme::PerAttribute("id".into()));
        let frame = vec![feature(1, "X")];
        let missing = differ.missing_ids(&frame, &universe(&["A"])).unwrap();
        assert_eq!(missing, universe(&["A"]));
    }

    #[test]
    fn test_single_stream() {
        let differ = FrameDiffer::new(EntityIdScheme::SingleStream);
        let all: FxHashSet<EntityId> = [EntityId::Default].into_iter().collect();

        let empty_frame: Vec<Feature> = Vec::new();
        assert_eq!(differ.missing_ids(&empty_frame, &all).unwrap(), all);

        let frame = vec![Feature::point(1, Point::new(1.0, 1.0))];
        assert!(differ.missing_ids(&frame, &all).unwrap().is_empty());
    }

    #[test]
    fn test_non_point_features_do_not_count_as_present() {
        let differ = FrameDiffer::new(EntityIdScheme::PerAttribute("id".into()));
        let line = Feature::new(1)
            .with_geometry(LineString::from(vec![(0.0, 0.0), (1.0, 1.0)]))
            .with_attribute("id", "A");
        let missing = differ.missing_ids([&line], &universe(&["A"])).unwrap();
        assert_eq!(missing, universe(&["A"]));
    }
}
