//! # tracelayer-types
//!
//! Core data types shared by the tracelayer crates.
//!
//! - **Point types**: `Sample`, a single timestamped position observation
//! - **Entity types**: `EntityId`, `EntityIdScheme`
//! - **Feature types**: `Feature`, `FeatureId`, `AttrValue`
//!
//! All types are serializable with Serde and built on top of the `geo` crate's
//! geometric primitives.
//!
//! ## Examples
//!
//! ```rust
//! use tracelayer_types::entity::EntityId;
//! use tracelayer_types::point::Sample;
//! use geo::Point;
//!
//! let sample = Sample::new(1_640_995_200, Point::new(-74.0060, 40.7128));
//! let id = EntityId::from("truck_001");
//! assert_eq!(sample.timestamp, 1_640_995_200);
//! assert_eq!(id.to_string(), "truck_001");
//! ```

pub mod entity;
pub mod feature;
pub mod point;
