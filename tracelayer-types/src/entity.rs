use crate::feature::AttrValue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a persistent real-world object whose position is sampled over time.
///
/// `Default` is the implicit id shared by every feature of a layer that does
/// not distinguish individual entities; all of its samples form one timeline.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityId {
    Default,
    Int(i64),
    Text(String),
}

impl EntityId {
    /// Derive an entity id from an attribute value.
    ///
    /// Returns `None` for null values. Integral floats collapse onto the
    /// matching integer id so `7` and `7.0` name the same entity.
    ///
    /// ```
    /// use tracelayer_types::entity::EntityId;
    /// use tracelayer_types::feature::AttrValue;
    ///
    /// assert_eq!(EntityId::from_attr(&AttrValue::Float(7.0)), Some(EntityId::Int(7)));
    /// assert_eq!(EntityId::from_attr(&AttrValue::Null), None);
    /// ```
    pub fn from_attr(value: &AttrValue) -> Option<Self> {
        match value {
            AttrValue::Null => None,
            AttrValue::Int(i) => Some(EntityId::Int(*i)),
            AttrValue::Float(f) => {
                if f.is_finite()
                    && f.fract() == 0.0
                    && *f >= i64::MIN as f64
                    && *f <= i64::MAX as f64
                {
                    Some(EntityId::Int(*f as i64))
                } else {
                    Some(EntityId::Text(f.to_string()))
                }
            }
            AttrValue::Text(s) => Some(EntityId::Text(s.clone())),
            AttrValue::DateTime(dt) => Some(EntityId::Text(dt.to_rfc3339())),
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, EntityId::Default)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Default => write!(f, "<default>"),
            EntityId::Int(i) => write!(f, "{}", i),
            EntityId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for EntityId {
    fn from(value: i64) -> Self {
        EntityId::Int(value)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        EntityId::Text(value.to_string())
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        EntityId::Text(value)
    }
}

/// How entity ids are derived from features, resolved once per layer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EntityIdScheme {
    /// Entities are not distinguished; every feature maps to `EntityId::Default`.
    #[default]
    SingleStream,
    /// The named attribute carries the entity id.
    PerAttribute(String),
}

impl EntityIdScheme {
    /// Resolve the scheme from an optional attribute name. A missing or
    /// blank name means a single stream.
    pub fn from_attribute(attribute: Option<&str>) -> Self {
        match attribute.map(str::trim) {
            Some(name) if !name.is_empty() => EntityIdScheme::PerAttribute(name.to_string()),
            _ => EntityIdScheme::SingleStream,
        }
    }

    pub fn attribute(&self) -> Option<&str> {
        match self {
            EntityIdScheme::SingleStream => None,
            EntityIdScheme::PerAttribute(name) => Some(name),
        }
    }

    pub fn has_id_attribute(&self) -> bool {
        matches!(self, EntityIdScheme::PerAttribute(_))
    }
}
