//! Missing-value sanitizer
//!
//! Stores reject documents that still carry [`Value::Missing`]; this pass
//! strips every such leaf from maps and arrays, at any depth.

use super::value::{Document, Value};

/// Removes missing leaves from `value`. Returns `None` if `value` itself is missing.
pub fn sanitize(value: Value) -> Option<Value> {
    match value {
        Value::Missing => None,
        Value::Array(values) => Some(Value::Array(
            values.into_iter().filter_map(sanitize).collect(),
        )),
        Value::Map(document) => Some(Value::Map(sanitize_document(document))),
        other => Some(other),
    }
}

/// Removes missing fields from a document, recursively.
pub fn sanitize_document(document: Document) -> Document {
    document
        .into_iter()
        .filter_map(|(key, value)| sanitize(value).map(|value| (key, value)))
        .collect()
}
