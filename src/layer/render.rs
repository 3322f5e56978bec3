//! Keeps an overlay layer in step with the interpolated positions of the
//! entities missing from the current frame.

use crate::compute::interpolate::LinearInterpolator;
use crate::compute::validation::validate_window;
use crate::error::{Result, TraceError};
use crate::storage::OverlayLayer;
use geo::Point;
use rustc_hash::FxHashSet;
use tracelayer_types::entity::EntityId;
use tracelayer_types::feature::{AttrValue, Feature, FeatureId};

/// Attribute written on every stand-in feature, naming the entity it stands for.
pub const ENTITY_ATTRIBUTE: &str = "entity_id";

/// One stand-in point in the overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayEntry {
    pub feature_id: FeatureId,
    pub entity: EntityId,
    pub position: Point<f64>,
}

/// Everything the overlay currently shows, as written by the last refresh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlayFrame {
    /// Window start the entries were computed for; `None` after a clear
    pub start_epoch: Option<i64>,
    pub entries: Vec<OverlayEntry>,
}

impl OverlayFrame {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn feature_ids(&self) -> Vec<FeatureId> {
        self.entries.iter().map(|e| e.feature_id).collect()
    }
}

/// Sole writer of an overlay layer.
///
/// Each refresh replaces the overlay contents wholesale. If the overlay
/// rejects a bulk operation its contents are no longer known, so the sync
/// poisons itself and refuses further refreshes. A successful [`clear`]
/// empties the overlay and lifts the poison.
///
/// [`clear`]: RenderSync::clear
#[derive(Debug)]
pub struct RenderSync<O: OverlayLayer> {
    overlay: O,
    frame: OverlayFrame,
    poisoned: bool,
}

impl<O: OverlayLayer> RenderSync<O> {
    pub fn new(overlay: O) -> Self {
        Self {
            overlay,
            frame: OverlayFrame::default(),
            poisoned: false,
        }
    }

    pub fn overlay(&self) -> &O {
        &self.overlay
    }

    pub fn frame(&self) -> &OverlayFrame {
        &self.frame
    }

    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Positions currently shown, in feature id order.
    pub fn points(&self) -> Vec<Point<f64>> {
        self.frame.entries.iter().map(|e| e.position).collect()
    }

    /// Replace the overlay with stand-ins for `missing` at `start_epoch`.
    ///
    /// Returns the number of stand-ins written. Entities the interpolator
    /// knows nothing about are skipped.
    pub fn refresh(
        &mut self,
        interpolator: &LinearInterpolator,
        missing: &FxHashSet<EntityId>,
        start_epoch: i64,
        end_epoch: i64,
    ) -> Result<usize> {
        self.ensure_usable()?;
        validate_window(start_epoch, end_epoch)?;

        // Sorted so a repeated refresh assigns the same feature ids.
        let mut ids: Vec<&EntityId> = missing.iter().collect();
        ids.sort();

        let entries: Vec<OverlayEntry> = ids
            .into_iter()
            .filter_map(|id| {
                let position = interpolator.query(id, start_epoch, end_epoch)?;
                Some((id.clone(), position))
            })
            .enumerate()
            .map(|(i, (entity, position))| OverlayEntry {
                feature_id: start_epoch.wrapping_add(i as i64),
                entity,
                position,
            })
            .collect();

        if entries.is_empty() && self.frame.is_empty() {
            log::debug!(
                "Refresh at {}: nothing to interpolate for overlay '{}'",
                start_epoch,
                self.overlay.name()
            );
            self.frame.start_epoch = Some(start_epoch);
            return Ok(0);
        }

        let stale = self.frame.feature_ids();
        if !stale.is_empty()
            && let Err(e) = self.overlay.delete_features(&stale)
        {
            return Err(self.poison("delete", e));
        }

        if !entries.is_empty() {
            let features = entries.iter().map(stand_in_feature).collect();
            if let Err(e) = self.overlay.add_features(features) {
                return Err(self.poison("insert", e));
            }
        }

        self.overlay.trigger_repaint();
        log::debug!(
            "Refresh at {}: {} missing, {} stand-ins drawn, {} removed",
            start_epoch,
            missing.len(),
            entries.len(),
            stale.len()
        );

        let written = entries.len();
        self.frame = OverlayFrame {
            start_epoch: Some(start_epoch),
            entries,
        };
        Ok(written)
    }

    /// Remove every stand-in from the overlay.
    ///
    /// A poisoned sync no longer knows what it wrote, so it deletes whatever
    /// the overlay reports instead and becomes usable again on success.
    pub fn clear(&mut self) -> Result<()> {
        let stale = if self.poisoned {
            log::info!(
                "Clearing poisoned overlay '{}' from its reported contents",
                self.overlay.name()
            );
            self.overlay.features().iter().map(|f| f.id).collect()
        } else {
            self.frame.feature_ids()
        };
        if !stale.is_empty()
            && let Err(e) = self.overlay.delete_features(&stale)
        {
            return Err(self.poison("delete", e));
        }
        self.overlay.trigger_repaint();
        log::debug!(
            "Cleared {} stand-ins from overlay '{}'",
            stale.len(),
            self.overlay.name()
        );

        self.frame = OverlayFrame::default();
        self.poisoned = false;
        Ok(())
    }

    fn ensure_usable(&self) -> Result<()> {
        if self.poisoned {
            return Err(TraceError::OverlayPoisoned);
        }
        Ok(())
    }

    fn poison(&mut self, operation: &str, cause: TraceError) -> TraceError {
        self.poisoned = true;
        log::error!(
            "Bulk {} on overlay '{}' failed, overlay is out of sync: {}",
            operation,
            self.overlay.name(),
            cause
        );
        TraceError::OverlayDesync(format!(
            "bulk {} on '{}' failed: {}",
            operation,
            self.overlay.layer_id(),
            cause
        ))
    }
}

fn stand_in_feature(entry: &OverlayEntry) -> Feature {
    let entity = match &entry.entity {
        EntityId::Default => AttrValue::Null,
        EntityId::Int(v) => AttrValue::Int(*v),
        EntityId::Text(s) => AttrValue::Text(s.clone()),
    };
    Feature::point(entry.feature_id, entry.position).with_attribute(ENTITY_ATTRIBUTE, entity)
}
