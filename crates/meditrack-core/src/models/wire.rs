//! Lenient decoding for backend payloads.
//!
//! The backend stores whatever the legacy client sent, so numbers may arrive
//! as strings and populated references may arrive as bare IDs.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

use super::DoctorRef;

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Int(i64),
    Float(f64),
    Text(String),
}

/// Decode each record independently, dropping the ones that do not fit `T`.
pub fn decode_records<T: DeserializeOwned>(values: Vec<serde_json::Value>, kind: &str) -> Vec<T> {
    let total = values.len();
    let decoded: Vec<T> = values
        .into_iter()
        .filter_map(|value| match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::debug!(kind, error = %e, "dropping undecodable record");
                None
            }
        })
        .collect();

    if decoded.len() < total {
        tracing::debug!(kind, total, kept = decoded.len(), "decoded record list");
    }
    decoded
}

pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrText>::deserialize(deserializer)? {
        None => Ok(0.0),
        Some(NumberOrText::Int(i)) => Ok(i as f64),
        Some(NumberOrText::Float(f)) => Ok(f),
        Some(NumberOrText::Text(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| serde::de::Error::custom(format!("not a number: {:?}", s))),
    }
}

pub(crate) fn lenient_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrText>::deserialize(deserializer)? {
        None => Ok(0),
        Some(NumberOrText::Int(i)) => Ok(i),
        Some(NumberOrText::Float(f)) if f.fract() == 0.0 => Ok(f as i64),
        Some(NumberOrText::Float(f)) => Err(serde::de::Error::custom(format!(
            "not an integer: {}",
            f
        ))),
        Some(NumberOrText::Text(s)) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| serde::de::Error::custom(format!("not an integer: {:?}", s))),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DoctorField {
    Populated(DoctorRef),
    Bare(String),
}

/// `doctorId` is either a populated `{_id, name}` object or a bare ID.
pub(crate) fn doctor_ref<'de, D>(deserializer: D) -> Result<Option<DoctorRef>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<DoctorField>::deserialize(deserializer)?.map(|field| match field {
            DoctorField::Populated(doctor) => doctor,
            DoctorField::Bare(id) => DoctorRef {
                id: Some(id),
                name: None,
            },
        }),
    )
}

/// `null` reads as an empty string, like a missing key.
pub(crate) fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Unparseable timestamps become `None` instead of failing the record.
///
/// Accepts RFC 3339, offset-less date-times and bare dates (both read as
/// UTC), and epoch milliseconds.
pub(crate) fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(serde_json::Value::String(s)) => parse_timestamp(s.trim()),
        Some(serde_json::Value::Number(n)) => n
            .as_i64()
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single()),
        _ => None,
    })
}

fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, pattern) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
