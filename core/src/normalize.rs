//! Tolerant field lookup over raw API payloads.
//!
//! # Design
//! The backend serializer is inconsistent: the same resource may arrive as a
//! bare array or wrapped in `data`/`Data`, with camelCase, PascalCase or
//! snake_case keys. Each view model declares its keys once, in that order,
//! and these helpers return the first candidate that is present and usable.
//! Everything here is pure.

use serde_json::Value;
use tracing::warn;

/// A view model that can be built from one raw JSON record.
pub trait Normalize: Sized {
    /// Resource name used in log messages.
    const KIND: &'static str;

    /// Builds the view model, or `None` when the record has no usable id.
    fn from_record(record: &Value) -> Option<Self>;
}

/// Returns the list carried by `payload`: the payload itself when it is an
/// array, else the array under `data` or `Data`. Anything else is empty.
pub fn unwrap_list(payload: &Value) -> &[Value] {
    if let Some(items) = payload.as_array() {
        return items;
    }
    ["data", "Data"]
        .iter()
        .filter_map(|key| payload.get(key))
        .find_map(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Returns the single record carried by `payload`, unwrapping a `data` /
/// `Data` envelope when it holds an object.
pub fn unwrap_record(payload: &Value) -> &Value {
    ["data", "Data"]
        .iter()
        .filter_map(|key| payload.get(key))
        .find(|inner| inner.is_object())
        .unwrap_or(payload)
}

/// Normalizes every record of a list payload, dropping (and logging) those
/// without a resolvable id. Order is preserved.
pub fn normalize_list<T: Normalize>(payload: &Value) -> Vec<T> {
    unwrap_list(payload)
        .iter()
        .enumerate()
        .filter_map(|(index, record)| {
            let item = T::from_record(record);
            if item.is_none() {
                warn!(kind = T::KIND, index, "Dropping record without a valid id");
            }
            item
        })
        .collect()
}

/// Normalizes a single-record payload.
pub fn normalize_one<T: Normalize>(payload: &Value) -> Option<T> {
    let item = T::from_record(unwrap_record(payload));
    if item.is_none() {
        warn!(kind = T::KIND, "Record without a valid id");
    }
    item
}

/// First value under `keys` that is present, non-null, not an empty string
/// and not a non-finite number.
pub fn field<'a>(record: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| record.get(key))
        .find(|value| is_usable(value))
}

fn is_usable(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Number(n) => n.as_f64().map_or(true, f64::is_finite),
        _ => true,
    }
}

pub fn field_str(record: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| record.get(key))
        .filter_map(|value| match value {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .next()
}

/// First key whose value coerces to an integer id.
pub fn field_i64(record: &Value, keys: &[&str]) -> Option<i64> {
    keys.iter()
        .filter_map(|key| record.get(key))
        .find_map(value_as_i64)
}

/// First key whose value coerces to a finite number.
pub fn field_f64(record: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter()
        .filter_map(|key| record.get(key))
        .find_map(value_as_f64)
}

/// First key holding an array, rendered as display strings. Object items
/// contribute their skill name; unusable items are skipped.
pub fn field_str_list(record: &Value, keys: &[&str]) -> Vec<String> {
    keys.iter()
        .filter_map(|key| record.get(key))
        .find_map(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
                    Value::Number(n) => Some(n.to_string()),
                    Value::Object(_) => field_str(item, SKILL_NAME_KEYS),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default()
}

pub(crate) const SKILL_NAME_KEYS: &[&str] = &[
    "nome",
    "Nome",
    "nmHabilidade",
    "NmHabilidade",
    "nome_habilidade",
];

/// Coerces a JSON number or numeric string to a finite `f64`.
pub fn value_as_f64(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

/// Coerces a JSON number or numeric string to an integer. Fractional values
/// are rejected.
pub fn value_as_i64(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    let number = value_as_f64(value)?;
    (number.fract() == 0.0 && number.abs() < i64::MAX as f64).then_some(number as i64)
}
