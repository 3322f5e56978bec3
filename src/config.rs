//! Layer settings for time-filtered and interpolated layers.
//!
//! Settings are plain serde structs with defaults, `with_*` builders and a
//! `validate` step that runs on every deserialization.
use chrono::{DateTime, Duration, Utc};
use serde::de::Error;
use tracelayer_types::entity::EntityIdScheme;

use crate::time::DEFAULT_FORMAT;

/// Settings of a time-filtered vector layer.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayerSettings {
    /// Attribute holding each feature's start time (and sample time).
    pub from_time_attribute: String,

    /// Attribute holding each feature's end time. Falls back to the start time.
    #[serde(default)]
    pub to_time_attribute: Option<String>,

    /// Attribute identifying the moving entity a feature belongs to.
    #[serde(default)]
    pub id_attribute: Option<String>,

    #[serde(default = "LayerSettings::default_time_format")]
    pub time_format: String,

    /// Shift applied to the slider position before computing the window.
    #[serde(default)]
    pub offset_seconds: i64,

    #[serde(default = "LayerSettings::default_enabled")]
    pub enabled: bool,

    #[serde(default)]
    pub interpolation_enabled: bool,

    /// Opacity of interpolated stand-in points, in `[0.0, 1.0]`.
    #[serde(default = "LayerSettings::default_overlay_opacity")]
    pub overlay_opacity: f64,
}

impl LayerSettings {
    fn default_time_format() -> String {
        DEFAULT_FORMAT.to_string()
    }

    const fn default_enabled() -> bool {
        true
    }

    const fn default_overlay_opacity() -> f64 {
        0.5
    }

    pub fn new(from_time_attribute: impl Into<String>) -> Self {
        Self {
            from_time_attribute: from_time_attribute.into(),
            to_time_attribute: None,
            id_attribute: None,
            time_format: Self::default_time_format(),
            offset_seconds: 0,
            enabled: Self::default_enabled(),
            interpolation_enabled: false,
            overlay_opacity: Self::default_overlay_opacity(),
        }
    }

    pub fn with_to_time_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.to_time_attribute = Some(attribute.into());
        self
    }

    pub fn with_id_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.id_attribute = Some(attribute.into());
        self
    }

    pub fn with_time_format(mut self, format: impl Into<String>) -> Self {
        self.time_format = format.into();
        self
    }

    pub fn with_offset_seconds(mut self, offset: i64) -> Self {
        self.offset_seconds = offset;
        self
    }

    pub fn with_interpolation(mut self, enabled: bool) -> Self {
        self.interpolation_enabled = enabled;
        self
    }

    pub fn with_overlay_opacity(mut self, opacity: f64) -> Self {
        assert!(
            (0.0..=1.0).contains(&opacity),
            "Overlay opacity must be within [0.0, 1.0]"
        );
        self.overlay_opacity = opacity;
        self
    }

    /// The attribute carrying the end time, or the start attribute if none is set.
    pub fn effective_to_time_attribute(&self) -> &str {
        match self.to_time_attribute.as_deref() {
            Some(attr) if !attr.trim().is_empty() => attr,
            _ => &self.from_time_attribute,
        }
    }

    pub fn id_scheme(&self) -> EntityIdScheme {
        EntityIdScheme::from_attribute(self.id_attribute.as_deref())
    }

    pub fn has_id_attribute(&self) -> bool {
        self.id_scheme().has_id_attribute()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.from_time_attribute.trim().is_empty() {
            return Err("From-time attribute must not be empty".to_string());
        }

        if self.time_format.is_empty() {
            return Err("Time format must not be empty".to_string());
        }

        let span = DateTime::<Utc>::MAX_UTC.signed_duration_since(DateTime::<Utc>::MIN_UTC);
        if self.offset_seconds.unsigned_abs() > span.num_seconds().unsigned_abs() {
            return Err(format!(
                "Offset of {} seconds is out of range",
                self.offset_seconds
            ));
        }

        if !self.overlay_opacity.is_finite() || !(0.0..=1.0).contains(&self.overlay_opacity) {
            return Err(format!(
                "Overlay opacity must be within [0.0, 1.0], got {}",
                self.overlay_opacity
            ));
        }

        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let settings: LayerSettings = serde_json::from_str(json)?;
        if let Err(e) = settings.validate() {
            return Err(serde_json::Error::custom(e));
        }
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        let settings: LayerSettings = toml::from_str(toml_str)?;
        if let Err(e) = settings.validate() {
            return Err(toml::de::Error::custom(e));
        }
        Ok(settings)
    }

    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// Width of the displayed time window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeFrame(Duration);

impl TimeFrame {
    pub fn new(width: Duration) -> Self {
        Self(width)
    }

    pub fn seconds(secs: i64) -> Self {
        Self(Duration::seconds(secs))
    }

    pub fn minutes(mins: i64) -> Self {
        Self(Duration::minutes(mins))
    }

    pub fn hours(hours: i64) -> Self {
        Self(Duration::hours(hours))
    }

    pub fn width(&self) -> Duration {
        self.0
    }
}

impl From<Duration> for TimeFrame {
    fn from(width: Duration) -> Self {
        Self(width)
    }
}
