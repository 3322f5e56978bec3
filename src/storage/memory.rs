//! In-memory overlay layer with an R-tree point index.

use super::{OverlayLayer, OverlayStats};
use crate::compute::validation::validate_point;
use crate::error::{Result, TraceError};
use rstar::{AABB, Point as RstarPoint, RTree};
use rustc_hash::{FxHashMap, FxHashSet};
use tracelayer_types::feature::{Feature, FeatureId};

/// 2D point for R-tree indexing, tagged with its feature id.
#[derive(Debug, Clone, Copy, PartialEq)]
struct IndexedPoint {
    x: f64,
    y: f64,
    id: FeatureId,
}

impl RstarPoint for IndexedPoint {
    type Scalar = f64;
    const DIMENSIONS: usize = 2;

    fn generate(mut generator: impl FnMut(usize) -> Self::Scalar) -> Self {
        Self {
            x: generator(0),
            y: generator(1),
            id: 0,
        }
    }

    fn nth(&self, index: usize) -> Self::Scalar {
        match index {
            0 => self.x,
            1 => self.y,
            _ => unreachable!(),
        }
    }

    fn nth_mut(&mut self, index: usize) -> &mut Self::Scalar {
        match index {
            0 => &mut self.x,
            1 => &mut self.y,
            _ => unreachable!(),
        }
    }
}

/// Rendering style of a layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerStyle {
    /// RGB colour
    pub color: [u8; 3],
    /// Opacity in `[0.0, 1.0]`
    pub opacity: f64,
}

impl Default for LayerStyle {
    fn default() -> Self {
        Self {
            color: [0, 0, 0],
            opacity: 1.0,
        }
    }
}

/// In-memory point layer.
#[derive(Debug)]
pub struct MemoryLayer {
    id: String,
    name: String,
    crs: String,
    style: LayerStyle,
    features: FxHashMap<FeatureId, Feature>,
    index: RTree<IndexedPoint>,
    stats: OverlayStats,
}

impl MemoryLayer {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: format!("{}_{}", name, uuid::Uuid::new_v4().simple()),
            name,
            crs: "EPSG:4326".to_string(),
            style: LayerStyle::default(),
            features: FxHashMap::default(),
            index: RTree::new(),
            stats: OverlayStats::default(),
        }
    }

    pub fn with_crs(mut self, crs: impl Into<String>) -> Self {
        self.crs = crs.into();
        self
    }

    pub fn with_style(mut self, style: LayerStyle) -> Self {
        self.style = style;
        self
    }

    pub fn crs(&self) -> &str {
        &self.crs
    }

    pub fn style(&self) -> LayerStyle {
        self.style
    }

    pub fn get(&self, id: FeatureId) -> Option<&Feature> {
        self.features.get(&id)
    }

    /// Ids of features whose point lies inside the rectangle, sorted ascending.
    pub fn query_within_bbox(&self, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Vec<FeatureId> {
        let envelope = AABB::from_corners(
            IndexedPoint {
                x: min_x,
                y: min_y,
                id: 0,
            },
            IndexedPoint {
                x: max_x,
                y: max_y,
                id: 0,
            },
        );
        let mut ids: Vec<FeatureId> = self
            .index
            .locate_in_envelope(&envelope)
            .map(|p| p.id)
            .collect();
        ids.sort_unstable();
        ids
    }
}

impl OverlayLayer for MemoryLayer {
    fn layer_id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn add_features(&mut self, features: Vec<Feature>) -> Result<()> {
        let mut incoming = FxHashSet::default();
        for feature in &features {
            let Some(point) = feature.as_point() else {
                return Err(TraceError::InvalidGeometry(format!(
                    "feature {} is not a single point",
                    feature.id
                )));
            };
            validate_point(&point)?;
            if self.features.contains_key(&feature.id) || !incoming.insert(feature.id) {
                return Err(TraceError::InvalidInput(format!(
                    "feature id {} already exists in layer '{}'",
                    feature.id, self.name
                )));
            }
        }

        for feature in features {
            if let Some(p) = feature.as_point() {
                self.index.insert(IndexedPoint {
                    x: p.x(),
                    y: p.y(),
                    id: feature.id,
                });
            }
            self.features.insert(feature.id, feature);
        }
        self.stats.operations_count += 1;

        Ok(())
    }

    fn delete_features(&mut self, ids: &[FeatureId]) -> Result<()> {
        for id in ids {
            if let Some(feature) = self.features.remove(id)
                && let Some(p) = feature.as_point()
            {
                self.index.remove(&IndexedPoint {
                    x: p.x(),
                    y: p.y(),
                    id: *id,
                });
            }
        }
        self.stats.operations_count += 1;

        Ok(())
    }

    fn trigger_repaint(&mut self) {
        self.stats.repaint_count += 1;
    }

    fn feature_count(&self) -> usize {
        self.features.len()
    }

    fn features(&self) -> Vec<Feature> {
        let mut features: Vec<Feature> = self.features.values().cloned().collect();
        features.sort_by_key(|f| f.id);
        features
    }

    fn stats(&self) -> OverlayStats {
        OverlayStats {
            feature_count: self.features.len(),
            ..self.stats
        }
    }
}
