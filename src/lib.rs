//! Time-filtered map layers with linear position interpolation.
//!
//! A time layer shows the features valid in the current window. Wrapping it in
//! an [`InterpolatedLayer`] additionally draws, into a separate overlay layer,
//! an estimated position for every tracked entity the window does not show.
//!
//! ```rust
//! use tracelayer::prelude::*;
//! use chrono::TimeZone;
//!
//! let features = vec![
//!     Feature::point(1, Point::new(0.0, 0.0)).with_attribute("t", 0_i64).with_attribute("id", "A"),
//!     Feature::point(2, Point::new(10.0, 10.0)).with_attribute("t", 10_i64).with_attribute("id", "A"),
//! ];
//! let settings = LayerSettings::new("t").with_id_attribute("id");
//! let base = TimeVectorLayer::new(VectorLayer::from_features("gps", features), settings)?;
//!
//! let registry = LayerRegistry::new();
//! let mut layer = InterpolatedLayer::new(base, &registry)?;
//!
//! let position = chrono::Utc.timestamp_opt(4, 0).unwrap();
//! layer.set_time_restriction(position, TimeFrame::seconds(1))?;
//! assert_eq!(layer.overlay_points(), vec![Point::new(4.0, 4.0)]);
//! # Ok::<(), tracelayer::TraceError>(())
//! ```

pub mod compute;
pub mod config;
pub mod error;
pub mod layer;
pub mod storage;
pub mod time;

pub use config::{LayerSettings, TimeFrame};
pub use error::{Result, TraceError};

pub use geo::Point;

pub use compute::frame::FrameDiffer;
pub use compute::interpolate::{Interpolatable, LinearInterpolator, position_at};
pub use compute::store::{BuildStats, SampleStore};

pub use layer::{
    InterpolatedLayer, LayerRegistry, OverlayEntry, OverlayFrame, OverlayGuard, RenderSync,
    SharedLayer, SourceLayer, TimeLayer, TimeVectorLayer, VectorLayer, open_time_layer,
};

pub use storage::{LayerStyle, MemoryLayer, OverlayLayer, OverlayStats};

pub use tracelayer_types::entity::{EntityId, EntityIdScheme};
pub use tracelayer_types::feature::{AttrValue, Feature, FeatureId, GeometryType};
pub use tracelayer_types::point::Sample;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{LayerSettings, Result, TimeFrame, TraceError};

    pub use geo::Point;

    pub use crate::{
        InterpolatedLayer, LayerRegistry, SourceLayer, TimeLayer, TimeVectorLayer, VectorLayer,
    };

    pub use crate::{MemoryLayer, OverlayLayer};

    pub use crate::{AttrValue, EntityId, Feature};
}
