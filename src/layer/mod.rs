//! Map layers: source feature layers, time-filtered layers and the
//! interpolating variant that renders stand-ins for missing entities.
//!
//! A [`TimeLayer`] computes display windows and filters its source features by
//! time. [`InterpolatedLayer`] wraps any `TimeLayer` and, after every window
//! change, fills an overlay layer with estimated positions of the entities the
//! window does not show.

use crate::config::{LayerSettings, TimeFrame};
use crate::error::{Result, TraceError};
use crate::storage::LayerStyle;
use chrono::{DateTime, Utc};
use tracelayer_types::feature::{Feature, GeometryType};

mod interpolated;
mod registry;
mod render;
mod time_vector;
mod vector;

pub use interpolated::InterpolatedLayer;
pub use registry::{LayerRegistry, OverlayGuard, SharedLayer};
pub use render::{OverlayEntry, OverlayFrame, RenderSync};
pub use time_vector::TimeVectorLayer;
pub use vector::VectorLayer;

/// A layer holding a fixed collection of features.
pub trait SourceLayer {
    fn name(&self) -> &str;

    /// Declared geometry type of the layer
    fn geometry_type(&self) -> GeometryType;

    /// Coordinate reference system identifier, e.g. `EPSG:4326`
    fn crs(&self) -> &str;

    fn style(&self) -> LayerStyle;

    /// Every feature of the layer, regardless of any time filter
    fn features(&self) -> &[Feature];
}

/// Contract of a time-filtered layer.
pub trait TimeLayer {
    fn source(&self) -> &dyn SourceLayer;

    fn settings(&self) -> &LayerSettings;

    /// Start of the window displayed for slider `position`.
    ///
    /// Fails when the shifted time falls outside the representable range.
    fn start_time(&self, position: DateTime<Utc>, _frame: TimeFrame) -> Result<DateTime<Utc>> {
        let offset = self.settings().offset_seconds;
        chrono::Duration::try_seconds(offset)
            .and_then(|delta| position.checked_add_signed(delta))
            .ok_or_else(|| {
                TraceError::InvalidTimeValue(format!(
                    "window start {} shifted by {} seconds is out of range",
                    position, offset
                ))
            })
    }

    /// End of the window displayed for slider `position`.
    fn end_time(&self, position: DateTime<Utc>, frame: TimeFrame) -> Result<DateTime<Utc>> {
        let start = self.start_time(position, frame)?;
        start.checked_add_signed(frame.width()).ok_or_else(|| {
            TraceError::InvalidTimeValue(format!(
                "window end {} plus {} seconds is out of range",
                start,
                frame.width().num_seconds()
            ))
        })
    }

    /// Active window as `(start, end)` epoch seconds, if any.
    fn time_restriction(&self) -> Option<(i64, i64)>;

    fn set_time_restriction(&mut self, position: DateTime<Utc>, frame: TimeFrame) -> Result<()>;

    fn delete_time_restriction(&mut self) -> Result<()>;

    /// Features shown under the active window (all features when unrestricted).
    fn visible_features(&self) -> Vec<&Feature>;

    /// Serialized layer settings used to restore the layer.
    fn save_string(&self) -> String;

    fn is_interpolation_enabled(&self) -> bool {
        false
    }
}

/// Build the time layer described by `settings` over `source`.
///
/// With `interpolation_enabled` the layer is an [`InterpolatedLayer`] whose
/// overlay is registered in `registry`; otherwise a plain [`TimeVectorLayer`].
pub fn open_time_layer<S>(
    source: S,
    settings: LayerSettings,
    registry: &LayerRegistry,
) -> Result<Box<dyn TimeLayer>>
where
    S: SourceLayer + 'static,
{
    let name = source.name().to_string();
    let interpolate = settings.interpolation_enabled;
    let base =
        TimeVectorLayer::new(source, settings).map_err(|e| TraceError::invalid_layer(&name, e))?;

    if interpolate {
        Ok(Box::new(InterpolatedLayer::new(base, registry)?))
    } else {
        log::info!("Created time layer for '{}'", name);
        Ok(Box::new(base))
    }
}
