//! Lenient numeric decoding for controller/dashboard payloads.
//!
//! The controller firmware and the dashboard both send numbers as JSON
//! numbers or numeric strings. These helpers accept either, and reject
//! anything else with a descriptive error so the caller can surface a
//! validation failure instead of defaulting silently.
//!
//! All helpers are meant for `Option<_>` fields declared with
//! `#[serde(default, deserialize_with = "...")]`; JSON `null` decodes as
//! `None`.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Decodes an optional integer. Floats truncate toward zero.
pub fn opt_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value_to_i64(&value)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("expected an integer, got `{value}`"))),
    }
}

/// Decodes an optional finite float.
pub fn opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value_to_f64(&value)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("expected a number, got `{value}`"))),
    }
}

/// Decodes an optional boolean from `true/false`, `0/1`-style numbers or
/// `"true"/"false"` strings.
pub fn opt_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value_to_bool(&value)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("expected a boolean, got `{value}`"))),
    }
}

/// Decodes an optional integer list. Length is not checked here.
pub fn opt_i64_list<'de, D>(deserializer: D) -> Result<Option<Vec<i64>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                value_to_i64(item)
                    .ok_or_else(|| D::Error::custom(format!("expected an integer, got `{item}`")))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some),
        Some(value) => Err(D::Error::custom(format!(
            "expected a list of integers, got `{value}`"
        ))),
    }
}

pub(crate) fn value_to_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().and_then(truncate_f64)),
        Value::String(text) => {
            let trimmed = text.trim();
            trimmed
                .parse::<i64>()
                .ok()
                .or_else(|| trimmed.parse::<f64>().ok().and_then(truncate_f64))
        }
        _ => None,
    }
}

pub(crate) fn value_to_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    parsed.is_finite().then_some(parsed)
}

pub(crate) fn value_to_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(flag) => Some(*flag),
        Value::Number(number) => number.as_f64().map(|n| n != 0.0),
        Value::String(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn truncate_f64(value: f64) -> Option<i64> {
    if !value.is_finite() {
        return None;
    }
    let truncated = value.trunc();
    if truncated < i64::MIN as f64 || truncated > i64::MAX as f64 {
        return None;
    }
    Some(truncated as i64)
}
