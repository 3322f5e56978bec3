//! Compute layer for interpolation and frame processing.
//!
//! This module separates the interpolation logic from layer and overlay
//! storage concerns. It provides:
//! - `store`: per-entity sample index built once per layer
//! - `interpolate`: bracketing search and linear position estimation
//! - `frame`: which entities are missing from the displayed frame
//! - `geojson`: feature collection import/export
//! - `validation`: position and time window checks

pub mod frame;
#[cfg(feature = "geojson")]
pub mod geojson;
pub mod interpolate;
pub mod store;
pub mod validation;
