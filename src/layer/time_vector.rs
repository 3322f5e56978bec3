use super::{SourceLayer, TimeLayer};
use crate::compute::validation::validate_time_frame;
use crate::config::{LayerSettings, TimeFrame};
use crate::error::{Result, TraceError};
use crate::time::{datetime_to_epoch, timeval_to_epoch};
use chrono::{DateTime, Utc};
use tracelayer_types::feature::Feature;

/// Time-filtered view over a source layer.
///
/// A feature with validity interval `[from, to]` is visible in the window
/// `[start, end)` when `from < end && to >= start`. Without a to-time
/// attribute a feature is valid only at its from-time instant.
#[derive(Debug, Clone)]
pub struct TimeVectorLayer<S: SourceLayer> {
    source: S,
    settings: LayerSettings,
    /// Validity interval per feature, index-aligned with `source.features()`.
    intervals: Vec<Option<(i64, i64)>>,
    restriction: Option<(i64, i64)>,
}

impl<S: SourceLayer> TimeVectorLayer<S> {
    pub fn new(source: S, settings: LayerSettings) -> Result<Self> {
        settings.validate().map_err(TraceError::InvalidInput)?;

        let from_attr = settings.from_time_attribute.as_str();
        let to_attr = settings.effective_to_time_attribute();
        let intervals = source
            .features()
            .iter()
            .map(|f| feature_interval(f, from_attr, to_attr, &settings.time_format))
            .collect();

        Ok(Self {
            source,
            settings,
            intervals,
            restriction: None,
        })
    }

    pub fn into_source(self) -> S {
        self.source
    }
}

fn feature_interval(
    feature: &Feature,
    from_attr: &str,
    to_attr: &str,
    format: &str,
) -> Option<(i64, i64)> {
    let epoch_of = |attr: &str| -> Result<i64> {
        let value = feature.attribute(attr).ok_or_else(|| {
            TraceError::MissingAttribute(format!("feature {} has no '{}'", feature.id, attr))
        })?;
        timeval_to_epoch(value, format)
    };

    match (epoch_of(from_attr), epoch_of(to_attr)) {
        (Ok(from), Ok(to)) => Some((from, to)),
        (Err(e), _) | (_, Err(e)) => {
            log::warn!("Feature {} is never shown: {}", feature.id, e);
            None
        }
    }
}

impl<S: SourceLayer> TimeLayer for TimeVectorLayer<S> {
    fn source(&self) -> &dyn SourceLayer {
        &self.source
    }

    fn settings(&self) -> &LayerSettings {
        &self.settings
    }

    fn time_restriction(&self) -> Option<(i64, i64)> {
        self.restriction
    }

    fn set_time_restriction(&mut self, position: DateTime<Utc>, frame: TimeFrame) -> Result<()> {
        validate_time_frame(frame)?;
        let start = datetime_to_epoch(&self.start_time(position, frame)?);
        let end = datetime_to_epoch(&self.end_time(position, frame)?);
        self.restriction = Some((start, end));
        Ok(())
    }

    fn delete_time_restriction(&mut self) -> Result<()> {
        self.restriction = None;
        Ok(())
    }

    fn visible_features(&self) -> Vec<&Feature> {
        let features = self.source.features();
        match self.restriction {
            Some((start, end)) if self.settings.enabled => features
                .iter()
                .zip(&self.intervals)
                .filter_map(|(feature, interval)| match interval {
                    Some((from, to)) if *from < end && *to >= start => Some(feature),
                    _ => None,
                })
                .collect(),
            _ => features.iter().collect(),
        }
    }

    fn save_string(&self) -> String {
        let s = &self.settings;
        format!(
            "{};{};{};{};{};{}",
            self.source.name(),
            s.from_time_attribute,
            s.to_time_attribute.as_deref().unwrap_or(""),
            s.enabled,
            s.time_format,
            s.offset_seconds
        )
    }
}
