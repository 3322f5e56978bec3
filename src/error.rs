//! Error types for tracelayer.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TraceError>;

#[derive(Debug, Error)]
pub enum TraceError {
    /// Building an interpolated layer failed; the layer was never created.
    #[error("invalid time layer '{layer}': {source}")]
    InvalidLayer {
        layer: String,
        #[source]
        source: Box<TraceError>,
    },

    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("missing attribute: {0}")]
    MissingAttribute(String),

    #[error("invalid time value: {0}")]
    InvalidTimeValue(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A bulk delete or insert against the overlay layer reported failure.
    #[error("overlay layer out of sync: {0}")]
    OverlayDesync(String),

    #[error("overlay layer state is untrusted after an earlier failure")]
    OverlayPoisoned,

    #[error("layer not found in registry: {0}")]
    LayerNotFound(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("geojson error: {0}")]
    GeoJson(String),

    #[error("{0}")]
    Other(String),
}

impl TraceError {
    /// Wrap any construction-time failure as an `InvalidLayer` error for `layer`.
    pub fn invalid_layer(layer: impl Into<String>, source: TraceError) -> Self {
        TraceError::InvalidLayer {
            layer: layer.into(),
            source: Box::new(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_invalid_layer_keeps_cause() {
        let err = TraceError::invalid_layer(
            "gps",
            TraceError::InvalidGeometry("want point geometry".into()),
        );
        assert_eq!(
            err.to_string(),
            "invalid time layer 'gps': invalid geometry: want point geometry"
        );
        let cause = err.source().expect("cause attached");
        assert_eq!(cause.to_string(), "invalid geometry: want point geometry");
    }
}
