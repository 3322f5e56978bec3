//! Overlay layer abstraction for tracelayer
//!
//! An overlay layer is a writable point layer that only holds rendering-side
//! features. This module provides the trait the refresh cycle writes through,
//! and an in-memory implementation.

use crate::error::Result;
use tracelayer_types::feature::{Feature, FeatureId};

mod memory;

pub use memory::{LayerStyle, MemoryLayer};

/// Trait for writable overlay point layers.
///
/// Bulk operations either apply completely or report an error and leave the
/// layer untouched.
pub trait OverlayLayer {
    /// Unique id of the layer, as known to the layer registry
    fn layer_id(&self) -> &str;

    /// Display name
    fn name(&self) -> &str;

    /// Insert features; fails if any id is already present or any geometry is not a point
    fn add_features(&mut self, features: Vec<Feature>) -> Result<()>;

    /// Delete features by id; ids that are not present are ignored
    fn delete_features(&mut self, ids: &[FeatureId]) -> Result<()>;

    /// Request a redraw
    fn trigger_repaint(&mut self);

    fn feature_count(&self) -> usize;

    /// Snapshot of all stored features, ordered by id
    fn features(&self) -> Vec<Feature>;

    fn stats(&self) -> OverlayStats;
}

/// Overlay layer statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OverlayStats {
    /// Features currently stored
    pub feature_count: usize,
    /// Number of successful bulk add/delete calls
    pub operations_count: u64,
    /// Number of repaint requests
    pub repaint_count: u64,
}
