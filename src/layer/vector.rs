use super::SourceLayer;
#[cfg(feature = "geojson")]
use crate::error::Result;
use crate::storage::LayerStyle;
use tracelayer_types::feature::{Feature, GeometryType};

/// In-memory source layer.
#[derive(Debug, Clone)]
pub struct VectorLayer {
    name: String,
    geometry_type: GeometryType,
    crs: String,
    style: LayerStyle,
    features: Vec<Feature>,
}

impl VectorLayer {
    pub fn new(name: impl Into<String>, geometry_type: GeometryType) -> Self {
        Self {
            name: name.into(),
            geometry_type,
            crs: "EPSG:4326".to_string(),
            style: LayerStyle::default(),
            features: Vec::new(),
        }
    }

    /// Create a layer whose geometry type is taken from the first feature
    /// that has a geometry.
    pub fn from_features(name: impl Into<String>, features: Vec<Feature>) -> Self {
        let geometry_type = features
            .iter()
            .find_map(Feature::geometry_type)
            .unwrap_or(GeometryType::Unknown);
        Self {
            features,
            ..Self::new(name, geometry_type)
        }
    }

    /// Load a layer from a GeoJSON FeatureCollection.
    #[cfg(feature = "geojson")]
    pub fn from_geojson(name: impl Into<String>, text: &str) -> Result<Self> {
        let features = crate::compute::geojson::features_from_geojson(text)?;
        Ok(Self::from_features(name, features))
    }

    pub fn with_crs(mut self, crs: impl Into<String>) -> Self {
        self.crs = crs.into();
        self
    }

    pub fn with_style(mut self, style: LayerStyle) -> Self {
        self.style = style;
        self
    }

    /// Append a feature. An untyped layer takes the type of the first
    /// geometry pushed into it.
    pub fn push(&mut self, feature: Feature) {
        if self.geometry_type == GeometryType::Unknown
            && let Some(geometry_type) = feature.geometry_type()
        {
            self.geometry_type = geometry_type;
        }
        self.features.push(feature);
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

impl SourceLayer for VectorLayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn geometry_type(&self) -> GeometryType {
        self.geometry_type
    }

    fn crs(&self) -> &str {
        &self.crs
    }

    fn style(&self) -> LayerStyle {
        self.style
    }

    fn features(&self) -> &[Feature] {
        &self.features
    }
}
