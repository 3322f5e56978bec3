//! GeoJSON conversion for feature collections.

use crate::error::{Result, TraceError};
use geojson::{FeatureCollection, GeoJson, Geometry, JsonObject, JsonValue, Value};
use tracelayer_types::feature::{AttrValue, Feature};

fn attr_from_json(value: &JsonValue) -> AttrValue {
    match value {
        JsonValue::Null => AttrValue::Null,
        JsonValue::Bool(b) => AttrValue::Text(b.to_string()),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => AttrValue::Int(i),
            None => AttrValue::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        JsonValue::String(s) => AttrValue::Text(s.clone()),
        other => AttrValue::Text(other.to_string()),
    }
}

fn attr_to_json(value: &AttrValue) -> JsonValue {
    match value {
        AttrValue::Null => JsonValue::Null,
        AttrValue::Int(i) => JsonValue::from(*i),
        AttrValue::Float(f) => JsonValue::from(*f),
        AttrValue::Text(s) => JsonValue::from(s.as_str()),
        AttrValue::DateTime(dt) => JsonValue::from(dt.to_rfc3339()),
    }
}

fn feature_id(feature: &geojson::Feature, index: usize) -> i64 {
    match &feature.id {
        Some(geojson::feature::Id::Number(n)) => n.as_i64().unwrap_or(index as i64),
        Some(geojson::feature::Id::String(s)) => s.parse().unwrap_or(index as i64),
        None => index as i64,
    }
}

/// Parses a GeoJSON FeatureCollection (or a single Feature) into features.
///
/// Numeric ids are kept; features without one are numbered by position.
///
/// ```
/// use tracelayer::compute::geojson::features_from_geojson;
///
/// let text = r#"{
///   "type": "FeatureCollection",
///   "features": [
///     {"type": "Feature", "id": 7,
///      "geometry": {"type": "Point", "coordinates": [1.0, 2.0]},
///      "properties": {"time": "2015-03-01 12:00:00", "vehicle": "bus-1"}}
///   ]
/// }"#;
/// let features = features_from_geojson(text).unwrap();
/// assert_eq!(features[0].id, 7);
/// assert!(features[0].is_single_point());
/// ```
pub fn features_from_geojson(text: &str) -> Result<Vec<Feature>> {
    let parsed: GeoJson = text
        .parse()
        .map_err(|e| TraceError::GeoJson(format!("Failed to parse GeoJSON: {}", e)))?;

    let collection = match parsed {
        GeoJson::FeatureCollection(fc) => fc.features,
        GeoJson::Feature(f) => vec![f],
        GeoJson::Geometry(_) => {
            return Err(TraceError::GeoJson(
                "Expected a Feature or FeatureCollection, got a bare Geometry".to_string(),
            ));
        }
    };

    let mut features = Vec::with_capacity(collection.len());
    for (index, gj_feature) in collection.iter().enumerate() {
        let mut feature = Feature::new(feature_id(gj_feature, index));

        if let Some(geometry) = &gj_feature.geometry {
            let converted = geo::Geometry::<f64>::try_from(geometry.value.clone()).map_err(|e| {
                TraceError::GeoJson(format!("Feature at index {}: {}", index, e))
            })?;
            feature.geometry = Some(converted);
        }

        if let Some(properties) = &gj_feature.properties {
            for (name, value) in properties {
                feature
                    .attributes
                    .insert(name.clone(), attr_from_json(value));
            }
        }

        features.push(feature);
    }

    Ok(features)
}

/// Converts features to a GeoJSON FeatureCollection string.
pub fn features_to_geojson(features: &[Feature]) -> Result<String> {
    let collection = FeatureCollection {
        bbox: None,
        features: features
            .iter()
            .map(|f| {
                let properties: JsonObject = f
                    .attributes
                    .iter()
                    .map(|(name, value)| (name.clone(), attr_to_json(value)))
                    .collect();
                geojson::Feature {
                    bbox: None,
                    geometry: f.geometry.as_ref().map(|g| Geometry::new(Value::from(g))),
                    id: Some(geojson::feature::Id::Number(f.id.into())),
                    properties: Some(properties),
                    foreign_members: None,
                }
            })
            .collect(),
        foreign_members: None,
    };

    serde_json::to_string(&collection).map_err(TraceError::from)
}
