use super::registry::{LayerRegistry, OverlayGuard};
use super::render::RenderSync;
use super::{SourceLayer, TimeLayer};
use crate::compute::frame::FrameDiffer;
use crate::compute::interpolate::LinearInterpolator;
use crate::compute::store::SampleStore;
use crate::config::{LayerSettings, TimeFrame};
use crate::error::{Result, TraceError};
use crate::storage::{LayerStyle, MemoryLayer, OverlayLayer};
use crate::time::datetime_to_epoch;
use chrono::{DateTime, Utc};
use geo::Point;
use tracelayer_types::feature::{Feature, GeometryType};

/// A time layer that also draws interpolated stand-ins for every entity the
/// current window does not show.
///
/// The stand-ins live in a separate overlay layer registered under
/// `interpolated_points_for_<source name>`. The overlay stays registered for
/// as long as this layer lives.
#[derive(Debug)]
pub struct InterpolatedLayer<L: TimeLayer> {
    base: L,
    interpolator: LinearInterpolator,
    differ: FrameDiffer,
    render: RenderSync<OverlayGuard>,
}

impl<L: TimeLayer> InterpolatedLayer<L> {
    /// Wrap `base`, indexing every feature of its source layer.
    ///
    /// Any failure is reported as [`TraceError::InvalidLayer`] with the cause
    /// attached; an overlay registered before the failure is unregistered
    /// again.
    pub fn new(base: L, registry: &LayerRegistry) -> Result<Self> {
        let name = base.source().name().to_string();
        Self::build(base, registry).map_err(|e| TraceError::invalid_layer(name, e))
    }

    fn build(base: L, registry: &LayerRegistry) -> Result<Self> {
        let source = base.source();
        let settings = base.settings();

        if source.geometry_type() != GeometryType::Point {
            return Err(TraceError::InvalidGeometry(format!(
                "interpolation needs a point layer, '{}' holds {:?} geometries",
                source.name(),
                source.geometry_type()
            )));
        }

        let overlay = MemoryLayer::new(format!("interpolated_points_for_{}", source.name()))
            .with_crs(source.crs())
            .with_style(LayerStyle {
                color: source.style().color,
                opacity: settings.overlay_opacity,
            });
        let overlay = registry.acquire_overlay(overlay);

        let scheme = settings.id_scheme();
        let store = SampleStore::build(
            source.features(),
            &scheme,
            &settings.from_time_attribute,
            &settings.time_format,
        )?;

        log::info!(
            "Created interpolated layer for '{}': {} entities, {} samples, overlay '{}'",
            source.name(),
            store.entity_count(),
            store.sample_count(),
            overlay.layer_id()
        );

        Ok(Self {
            interpolator: LinearInterpolator::new(store),
            differ: FrameDiffer::new(scheme),
            render: RenderSync::new(overlay),
            base,
        })
    }

    /// Redraw the stand-ins for the window `[start_epoch, end_epoch)`.
    ///
    /// Returns the number of stand-ins drawn.
    pub fn refresh(&mut self, start_epoch: i64, end_epoch: i64) -> Result<usize> {
        let missing = self
            .differ
            .missing_ids(self.base.visible_features(), self.interpolator.store().universe())?;
        self.render
            .refresh(&self.interpolator, &missing, start_epoch, end_epoch)
    }

    pub fn base(&self) -> &L {
        &self.base
    }

    pub fn id_attribute(&self) -> Option<&str> {
        self.differ.scheme().attribute()
    }

    pub fn has_id_attribute(&self) -> bool {
        self.differ.scheme().has_id_attribute()
    }

    pub fn store(&self) -> &SampleStore {
        self.interpolator.store()
    }

    pub fn overlay(&self) -> &OverlayGuard {
        self.render.overlay()
    }

    pub fn overlay_layer_id(&self) -> &str {
        self.render.overlay().layer_id()
    }

    /// Stand-in positions currently drawn.
    pub fn overlay_points(&self) -> Vec<Point<f64>> {
        self.render.points()
    }

    pub fn render_sync(&self) -> &RenderSync<OverlayGuard> {
        &self.render
    }
}

impl<L: TimeLayer> TimeLayer for InterpolatedLayer<L> {
    fn source(&self) -> &dyn SourceLayer {
        self.base.source()
    }

    fn settings(&self) -> &LayerSettings {
        self.base.settings()
    }

    fn start_time(&self, position: DateTime<Utc>, frame: TimeFrame) -> Result<DateTime<Utc>> {
        self.base.start_time(position, frame)
    }

    fn end_time(&self, position: DateTime<Utc>, frame: TimeFrame) -> Result<DateTime<Utc>> {
        self.base.end_time(position, frame)
    }

    fn time_restriction(&self) -> Option<(i64, i64)> {
        self.base.time_restriction()
    }

    fn set_time_restriction(&mut self, position: DateTime<Utc>, frame: TimeFrame) -> Result<()> {
        self.base.set_time_restriction(position, frame)?;
        let start = datetime_to_epoch(&self.base.start_time(position, frame)?);
        let end = datetime_to_epoch(&self.base.end_time(position, frame)?);
        self.refresh(start, end)?;
        Ok(())
    }

    fn delete_time_restriction(&mut self) -> Result<()> {
        self.base.delete_time_restriction()?;
        self.render.clear()
    }

    fn visible_features(&self) -> Vec<&Feature> {
        self.base.visible_features()
    }

    fn save_string(&self) -> String {
        self.base.save_string()
    }

    fn is_interpolation_enabled(&self) -> bool {
        true
    }
}
