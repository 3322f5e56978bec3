//! Conversions between attribute time values, UTC datetimes and epoch seconds.
//!
//! Textual times are parsed with the layer's configured pattern first, then with
//! a fixed list of common patterns, then as RFC 3339. Naive values are always
//! interpreted as UTC.

use crate::error::{Result, TraceError};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tracelayer_types::feature::AttrValue;

/// Pattern used when a layer does not configure its own.
pub const DEFAULT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Date-time patterns tried after the configured one.
pub const SUPPORTED_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%d.%m.%Y %H:%M:%S",
];

/// Date-only patterns; the time of day is midnight UTC.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y"];

pub fn datetime_to_epoch(dt: &DateTime<Utc>) -> i64 {
    dt.timestamp()
}

pub fn epoch_to_datetime(epoch: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp(epoch, 0).ok_or_else(|| {
        TraceError::InvalidTimeValue(format!("epoch {} is out of range", epoch))
    })
}

/// Format an epoch timestamp with a chrono pattern.
///
/// ```
/// use tracelayer::time::{epoch_to_str, DEFAULT_FORMAT};
///
/// assert_eq!(epoch_to_str(0, DEFAULT_FORMAT).unwrap(), "1970-01-01 00:00:00");
/// ```
pub fn epoch_to_str(epoch: i64, format: &str) -> Result<String> {
    Ok(epoch_to_datetime(epoch)?.format(format).to_string())
}

/// Parse a textual time into a UTC datetime.
pub fn str_to_datetime(value: &str, format: &str) -> Result<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
        return Ok(naive.and_utc());
    }

    for candidate in SUPPORTED_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, candidate) {
            return Ok(naive.and_utc());
        }
    }

    for candidate in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, candidate)
            && let Some(naive) = date.and_hms_opt(0, 0, 0)
        {
            return Ok(naive.and_utc());
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }

    Err(TraceError::InvalidTimeValue(format!(
        "'{}' does not match '{}' or any supported format",
        value, format
    )))
}

/// Convert a raw attribute time value to epoch seconds.
///
/// Integers are taken as epoch seconds, floats are truncated, numeric strings
/// are epoch seconds and any other string is parsed as a date-time.
///
/// ```
/// use tracelayer::time::{timeval_to_epoch, DEFAULT_FORMAT};
/// use tracelayer_types::feature::AttrValue;
///
/// let v = AttrValue::from("1970-01-01 00:01:40");
/// assert_eq!(timeval_to_epoch(&v, DEFAULT_FORMAT).unwrap(), 100);
/// assert_eq!(timeval_to_epoch(&AttrValue::Int(42), DEFAULT_FORMAT).unwrap(), 42);
/// ```
pub fn timeval_to_epoch(value: &AttrValue, format: &str) -> Result<i64> {
    match value {
        AttrValue::Int(i) => Ok(*i),
        AttrValue::Float(f) if f.is_finite() => Ok(f.trunc() as i64),
        AttrValue::Float(f) => Err(TraceError::InvalidTimeValue(format!(
            "non-finite time value {}",
            f
        ))),
        AttrValue::DateTime(dt) => Ok(datetime_to_epoch(dt)),
        AttrValue::Text(s) => {
            if let Ok(epoch) = s.trim().parse::<i64>() {
                return Ok(epoch);
            }
            str_to_datetime(s, format).map(|dt| datetime_to_epoch(&dt))
        }
        AttrValue::Null => Err(TraceError::InvalidTimeValue("NULL time value".into())),
    }
}
