//! Location record produced from a receiver line.
//!
//! The receiver firmware prints one JSON object per fix, for example
//! `{"latitude":-23.55,"longitude":-46.63,"fixAgeMs":120,"ts":1700000000000}`.
//! Only `latitude` and `longitude` are required.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Why a parsed JSON document was not accepted as a fix.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("field '{0}' is missing")]
    Missing(&'static str),
    #[error("field '{0}' is not a number")]
    NotNumeric(&'static str),
}

/// The most recent position reported by the receiver.
///
/// Immutable once built; a newer fix replaces the whole record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    pub latitude: f64,
    pub longitude: f64,
    /// Age of the receiver's last satellite fix, as reported by the device.
    #[serde(rename = "fixAgeMs")]
    pub fix_age_ms: Option<i64>,
    /// Device timestamp, or the wall clock when the line was processed.
    #[serde(rename = "ts")]
    pub observed_at_ms: i64,
}

impl LocationRecord {
    /// Validate a decoded JSON document and build a record from it.
    ///
    /// `now_ms` is used as the timestamp when the document carries no `ts`.
    /// Values are taken as reported; no range checks are applied.
    pub fn from_json(value: &Value, now_ms: i64) -> Result<Self, FieldError> {
        let latitude = required_number(value, "latitude")?;
        let longitude = required_number(value, "longitude")?;
        let fix_age_ms = value.get("fixAgeMs").and_then(as_millis);
        let observed_at_ms = value.get("ts").and_then(as_millis).unwrap_or(now_ms);

        Ok(Self {
            latitude,
            longitude,
            fix_age_ms,
            observed_at_ms,
        })
    }
}

fn required_number(value: &Value, field: &'static str) -> Result<f64, FieldError> {
    match value.get(field) {
        None | Some(Value::Null) => Err(FieldError::Missing(field)),
        Some(Value::Number(n)) => n.as_f64().ok_or(FieldError::NotNumeric(field)),
        Some(_) => Err(FieldError::NotNumeric(field)),
    }
}

/// Millisecond values may arrive as integers or floats; anything else is absent.
fn as_millis(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64)),
        _ => None,
    }
}

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
