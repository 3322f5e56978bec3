use chrono::{DateTime, Utc};
use geo::{Geometry, Point};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Identifier of a feature within a single layer.
pub type FeatureId = i64;

/// An attribute value as stored on a map feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttrValue {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
    DateTime(DateTime<Utc>),
}

impl AttrValue {
    pub fn is_null(&self) -> bool {
        matches!(self, AttrValue::Null)
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Null => write!(f, "NULL"),
            AttrValue::Int(i) => write!(f, "{}", i),
            AttrValue::Float(x) => write!(f, "{}", x),
            AttrValue::Text(s) => write!(f, "{}", s),
            AttrValue::DateTime(dt) => write!(f, "{}", dt.to_rfc3339()),
        }
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Int(value)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        AttrValue::Float(value)
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Text(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Text(value)
    }
}

impl From<DateTime<Utc>> for AttrValue {
    fn from(value: DateTime<Utc>) -> Self {
        AttrValue::DateTime(value)
    }
}

/// Coarse geometry classification of a layer or feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeometryType {
    Point,
    Line,
    Polygon,
    Unknown,
}

impl GeometryType {
    pub fn of(geometry: &Geometry<f64>) -> Self {
        match geometry {
            Geometry::Point(_) | Geometry::MultiPoint(_) => GeometryType::Point,
            Geometry::Line(_) | Geometry::LineString(_) | Geometry::MultiLineString(_) => {
                GeometryType::Line
            }
            Geometry::Polygon(_)
            | Geometry::MultiPolygon(_)
            | Geometry::Rect(_)
            | Geometry::Triangle(_) => GeometryType::Polygon,
            Geometry::GeometryCollection(_) => GeometryType::Unknown,
        }
    }
}

/// A map feature: id, optional geometry and named attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub id: FeatureId,
    pub geometry: Option<Geometry<f64>>,
    pub attributes: BTreeMap<String, AttrValue>,
}

impl Feature {
    pub fn new(id: FeatureId) -> Self {
        Self {
            id,
            geometry: None,
            attributes: BTreeMap::new(),
        }
    }

    /// Create a feature with a single point geometry and no attributes.
    pub fn point(id: FeatureId, point: Point<f64>) -> Self {
        Self::new(id).with_geometry(Geometry::Point(point))
    }

    pub fn with_geometry(mut self, geometry: impl Into<Geometry<f64>>) -> Self {
        self.geometry = Some(geometry.into());
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&AttrValue> {
        self.attributes.get(name)
    }

    /// The position of this feature if its geometry is a single point.
    ///
    /// Multi-point geometries are not single points, even with one member.
    pub fn as_point(&self) -> Option<Point<f64>> {
        match self.geometry {
            Some(Geometry::Point(p)) => Some(p),
            _ => None,
        }
    }

    pub fn is_single_point(&self) -> bool {
        self.as_point().is_some()
    }

    pub fn geometry_type(&self) -> Option<GeometryType> {
        self.geometry.as_ref().map(GeometryType::of)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{LineString, MultiPoint};

    #[test]
    fn test_point_feature() {
        let f = Feature::point(1, Point::new(3.0, 4.0)).with_attribute("name", "a");
        assert!(f.is_single_point());
        assert_eq!(f.as_point(), Some(Point::new(3.0, 4.0)));
        assert_eq!(f.attribute("name"), Some(&AttrValue::Text("a".into())));
        assert_eq!(f.geometry_type(), Some(GeometryType::Point));
    }

    #[test]
    fn test_non_point_geometries() {
        let line = Feature::new(2).with_geometry(LineString::from(vec![(0.0, 0.0), (1.0, 1.0)]));
        assert!(!line.is_single_point());
        assert_eq!(line.geometry_type(), Some(GeometryType::Line));

        let multi = Feature::new(3).with_geometry(MultiPoint::from(vec![(0.0, 0.0)]));
        assert!(!multi.is_single_point());
        assert_eq!(multi.geometry_type(), Some(GeometryType::Point));

        let empty = Feature::new(4);
        assert!(!empty.is_single_point());
        assert_eq!(empty.geometry_type(), None);
    }

    #[test]
    fn test_attr_display() {
        assert_eq!(AttrValue::Null.to_string(), "NULL");
        assert_eq!(AttrValue::from(5).to_string(), "5");
        assert_eq!(AttrValue::from("x").to_string(), "x");
    }
}
