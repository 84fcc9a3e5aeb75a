//! Field extraction
//!
//! Locates the record set inside a decoded response body by walking a
//! field path: an ordered list of object keys. All functions here are pure;
//! a body that does not have the expected shape yields no records rather
//! than an error.

use crate::types::{JsonValue, Record};
use tracing::debug;

/// Walk `path` into `data`
///
/// An empty path returns `data` itself. Returns `None` when an intermediate
/// value is not an object, a key is missing, or the value found is `null`.
pub fn extract_field<'a, S: AsRef<str>>(data: &'a JsonValue, path: &[S]) -> Option<&'a JsonValue> {
    let mut current = data;
    for key in path {
        current = current.as_object()?.get(key.as_ref())?;
        if current.is_null() {
            return None;
        }
    }
    Some(current)
}

/// Derive the record values found at `path`
///
/// - empty path: the body itself, only if it is an object
/// - non-empty path: an array is used as-is, any other value becomes a
///   single-element set
pub fn extract_records<S: AsRef<str>>(data: &JsonValue, path: &[S]) -> Vec<JsonValue> {
    let Some(extracted) = extract_field(data, path) else {
        return Vec::new();
    };

    if path.is_empty() {
        return if extracted.is_object() {
            vec![extracted.clone()]
        } else {
            Vec::new()
        };
    }

    match extracted {
        JsonValue::Array(items) => items.clone(),
        other => vec![other.clone()],
    }
}

/// Keep the object values as records, dropping anything else
pub fn into_records(stream: &str, values: Vec<JsonValue>) -> Vec<Record> {
    let total = values.len();
    let records: Vec<Record> = values
        .into_iter()
        .filter_map(|value| match value {
            JsonValue::Object(obj) => Some(obj),
            _ => None,
        })
        .collect();

    if records.len() < total {
        debug!(
            "{stream}: dropped {} non-object value(s) from the record set",
            total - records.len()
        );
    }
    records
}

/// Whether a response body carries anything worth extracting
///
/// `null`, `{}` and `[]` count as no data.
pub fn has_data(body: &JsonValue) -> bool {
    match body {
        JsonValue::Null => false,
        JsonValue::Object(obj) => !obj.is_empty(),
        JsonValue::Array(items) => !items.is_empty(),
        _ => true,
    }
}

#[cfg(test)]
mod tests;
