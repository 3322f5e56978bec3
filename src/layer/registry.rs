//! Shared map-layer registry and scoped overlay ownership.

use crate::error::Result;
use crate::storage::{MemoryLayer, OverlayLayer, OverlayStats};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::sync::Arc;
use tracelayer_types::feature::{Feature, FeatureId};

pub type SharedLayer = Arc<RwLock<MemoryLayer>>;

/// Registry of map layers visible to the host, keyed by layer id.
///
/// Cloning the registry yields another handle to the same set of layers.
#[derive(Debug, Clone, Default)]
pub struct LayerRegistry {
    layers: Arc<RwLock<FxHashMap<String, SharedLayer>>>,
}

impl LayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a layer and return a shared handle to it.
    pub fn add_map_layer(&self, layer: MemoryLayer) -> SharedLayer {
        let id = layer.layer_id().to_string();
        let shared = Arc::new(RwLock::new(layer));
        self.layers.write().insert(id, shared.clone());
        shared
    }

    /// Remove a layer; returns whether it was registered.
    pub fn remove_map_layer(&self, layer_id: &str) -> bool {
        self.layers.write().remove(layer_id).is_some()
    }

    pub fn get(&self, layer_id: &str) -> Option<SharedLayer> {
        self.layers.read().get(layer_id).cloned()
    }

    pub fn contains(&self, layer_id: &str) -> bool {
        self.layers.read().contains_key(layer_id)
    }

    pub fn layer_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.layers.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.layers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.read().is_empty()
    }

    /// Register `layer` and tie its registration to the returned guard.
    pub fn acquire_overlay(&self, layer: MemoryLayer) -> OverlayGuard {
        let layer_id = layer.layer_id().to_string();
        let name = layer.name().to_string();
        let shared = self.add_map_layer(layer);
        log::debug!("Registered overlay layer '{}'", layer_id);
        OverlayGuard {
            registry: self.clone(),
            layer_id,
            name,
            layer: shared,
        }
    }
}

/// An overlay layer registered for as long as the guard lives.
///
/// Dropping the guard removes the layer from the registry exactly once,
/// including when the owner fails halfway through construction.
#[derive(Debug)]
pub struct OverlayGuard {
    registry: LayerRegistry,
    layer_id: String,
    name: String,
    layer: SharedLayer,
}

impl OverlayGuard {
    pub fn shared(&self) -> &SharedLayer {
        &self.layer
    }
}

impl OverlayLayer for OverlayGuard {
    fn layer_id(&self) -> &str {
        &self.layer_id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn add_features(&mut self, features: Vec<Feature>) -> Result<()> {
        self.layer.write().add_features(features)
    }

    fn delete_features(&mut self, ids: &[FeatureId]) -> Result<()> {
        self.layer.write().delete_features(ids)
    }

    fn trigger_repaint(&mut self) {
        self.layer.write().trigger_repaint();
    }

    fn feature_count(&self) -> usize {
        self.layer.read().feature_count()
    }

    fn features(&self) -> Vec<Feature> {
        self.layer.read().features()
    }

    fn stats(&self) -> OverlayStats {
        self.layer.read().stats()
    }
}

impl Drop for OverlayGuard {
    fn drop(&mut self) {
        if self.registry.remove_map_layer(&self.layer_id) {
            log::info!("Removed overlay layer '{}' from registry", self.layer_id);
        } else {
            log::warn!(
                "Overlay layer '{}' was already removed from registry",
                self.layer_id
            );
        }
    }
}
