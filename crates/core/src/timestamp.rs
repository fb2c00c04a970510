//! Lenient timestamp decoding for payloads written by other producers.
//!
//! Queue payloads carry times either as epoch seconds (integer or float) or
//! as RFC 3339 strings. Serialization always emits RFC 3339.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, de::Error as _};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    EpochSeconds(f64),
    Rfc3339(String),
}

/// Convert fractional epoch seconds, rounded to the nanosecond.
pub fn from_epoch_seconds(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() {
        return None;
    }
    let whole = secs.floor();
    let nanos = ((secs - whole) * 1e9).round().min(999_999_999.0) as u32;
    if whole < i64::MIN as f64 || whole > i64::MAX as f64 {
        return None;
    }
    DateTime::from_timestamp(whole as i64, nanos)
}

/// `deserialize_with` helper for optional timestamps.
///
/// Use together with `#[serde(default)]` so a missing field reads as `None`.
pub fn deserialize_optional<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<RawTimestamp>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawTimestamp::EpochSeconds(secs)) => from_epoch_seconds(secs)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("epoch seconds out of range: {secs}"))),
        Some(RawTimestamp::Rfc3339(raw)) => DateTime::parse_from_rfc3339(&raw)
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .map_err(|e| D::Error::custom(format!("invalid timestamp {raw:?}: {e}"))),
    }
}
