//! Fields shared by every record: string id, creation and update timestamps.
//!
//! Also holds the helpers entities use to read typed values out of a JSON body.

use chrono::{DateTime, SubsecRound, Utc};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::errors::ModelError;

/// Plain mapping form of a request body or of a serialized record.
pub type Fields = Map<String, Value>;

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Current time truncated to microseconds so it survives every backing medium unchanged.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Timestamp for a mutation of a record created at `created_at`; never earlier than it.
pub fn touched(created_at: DateTime<Utc>) -> DateTime<Utc> {
    now().max(created_at)
}

/// `%Y-%m-%dT%H:%M:%S.%f` (de)serialization used in the mapping form.
pub mod timestamp {
    use chrono::{DateTime, NaiveDateTime, ParseError, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&ts.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }

    /// Accepts the naive mapping format (taken as UTC) or RFC 3339.
    pub fn parse(raw: &str) -> Result<DateTime<Utc>, ParseError> {
        match NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
            Ok(naive) => Ok(naive.and_utc()),
            Err(_) => DateTime::parse_from_rfc3339(raw).map(|d| d.with_timezone(&Utc)),
        }
    }
}

pub(crate) fn required<'a>(fields: &'a Fields, key: &str) -> Result<&'a Value, ModelError> {
    match fields.get(key) {
        None | Some(Value::Null) => Err(ModelError::missing(key)),
        Some(v) => Ok(v),
    }
}

pub(crate) fn string(key: &str, value: &Value) -> Result<String, ModelError> {
    value.as_str().map(str::to_owned).ok_or_else(|| ModelError::invalid(key))
}

pub(crate) fn opt_string(key: &str, value: &Value) -> Result<Option<String>, ModelError> {
    match value {
        Value::Null => Ok(None),
        v => string(key, v).map(Some),
    }
}

pub(crate) fn int(key: &str, value: &Value) -> Result<i32, ModelError> {
    value
        .as_i64()
        .and_then(|n| i32::try_from(n).ok())
        .ok_or_else(|| ModelError::invalid(key))
}

pub(crate) fn opt_float(key: &str, value: &Value) -> Result<Option<f64>, ModelError> {
    match value {
        Value::Null => Ok(None),
        v => v.as_f64().map(Some).ok_or_else(|| ModelError::invalid(key)),
    }
}

pub(crate) fn required_string(fields: &Fields, key: &str) -> Result<String, ModelError> {
    string(key, required(fields, key)?)
}

pub(crate) fn optional<T>(
    fields: &Fields,
    key: &str,
    read: fn(&str, &Value) -> Result<Option<T>, ModelError>,
) -> Result<Option<T>, ModelError> {
    match fields.get(key) {
        None => Ok(None),
        Some(v) => read(key, v),
    }
}
