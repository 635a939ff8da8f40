//! Document values

use std::collections::BTreeMap;

use jiff::Timestamp;
use rust_decimal::Decimal;

/// A document: an ordered map of field names to values.
pub type Document = BTreeMap<String, Value>;

/// A value stored in a document.
///
/// `Missing` marks a leaf the encoder had nothing for. It must be removed by
/// [`sanitize`](super::sanitize) before a document reaches a store; `Null` is
/// a legitimate stored value and is kept.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// No value at all.
    Missing,

    /// Explicit null.
    Null,

    /// Boolean.
    Bool(bool),

    /// Whole number.
    Integer(i64),

    /// Exact decimal number.
    Number(Decimal),

    /// Text.
    String(String),

    /// Native timestamp.
    Timestamp(Timestamp),

    /// Ordered list.
    Array(Vec<Value>),

    /// Nested document.
    Map(Document),
}

impl Value {
    /// Whether this is the missing marker.
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    /// Whether the missing marker appears anywhere in this value.
    pub fn contains_missing(&self) -> bool {
        match self {
            Value::Missing => true,
            Value::Array(values) => values.iter().any(Value::contains_missing),
            Value::Map(document) => document.values().any(Value::contains_missing),
            _ => false,
        }
    }

    /// Text content.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(value) => Some(value),
            _ => None,
        }
    }

    /// Numeric content as a decimal; integers widen losslessly.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Value::Number(value) => Some(*value),
            Value::Integer(value) => Some(Decimal::from(*value)),
            _ => None,
        }
    }

    /// Timestamp content.
    pub fn as_timestamp(&self) -> Option<Timestamp> {
        match self {
            Value::Timestamp(value) => Some(*value),
            _ => None,
        }
    }

    /// Nested document.
    pub fn as_map(&self) -> Option<&Document> {
        match self {
            Value::Map(document) => Some(document),
            _ => None,
        }
    }

    /// List content.
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(values) => Some(values),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&String> for Value {
    fn from(value: &String) -> Self {
        Value::String(value.clone())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Integer(i64::from(value))
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        i64::try_from(value).map_or_else(|_| Value::Number(Decimal::from(value)), Value::Integer)
    }
}

impl From<Decimal> for Value {
    fn from(value: Decimal) -> Self {
        Value::Number(value)
    }
}

impl From<Timestamp> for Value {
    fn from(value: Timestamp) -> Self {
        Value::Timestamp(value)
    }
}

impl From<Document> for Value {
    fn from(value: Document) -> Self {
        Value::Map(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Array(value)
    }
}

/// Looks up a dotted field path such as `trackingStages.placed.status`.
pub fn get_path<'a>(document: &'a Document, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let first = document.get(segments.next()?)?;

    segments.try_fold(first, |value, segment| value.as_map()?.get(segment))
}

/// Writes `value` at a dotted field path, creating or replacing intermediate maps.
pub fn set_path(document: &mut Document, path: &str, value: Value) {
    match path.split_once('.') {
        None => {
            document.insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let child = document
                .entry(head.to_string())
                .or_insert_with(|| Value::Map(Document::new()));

            if !matches!(child, Value::Map(_)) {
                *child = Value::Map(Document::new());
            }

            if let Value::Map(child) = child {
                set_path(child, rest, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Document {
        let mut placed = Document::new();
        placed.insert("status".to_string(), Value::from("completed"));

        let mut stages = Document::new();
        stages.insert("placed".to_string(), Value::Map(placed));

        let mut document = Document::new();
        document.insert("trackingStages".to_string(), Value::Map(stages));
        document.insert("status".to_string(), Value::from("pending"));
        document
    }

    #[test]
    fn get_path_walks_nested_maps() {
        let document = sample();

        assert_eq!(
            get_path(&document, "trackingStages.placed.status").and_then(Value::as_str),
            Some("completed")
        );
        assert_eq!(get_path(&document, "status").and_then(Value::as_str), Some("pending"));
        assert_eq!(get_path(&document, "status.nested"), None);
        assert_eq!(get_path(&document, "trackingStages.shipped"), None);
    }

    #[test]
    fn set_path_replaces_only_the_addressed_leaf() {
        let mut document = sample();

        set_path(&mut document, "trackingStages.shipped.status", Value::from("completed"));
        set_path(&mut document, "status", Value::from("shipped"));

        assert_eq!(
            get_path(&document, "trackingStages.placed.status").and_then(Value::as_str),
            Some("completed")
        );
        assert_eq!(
            get_path(&document, "trackingStages.shipped.status").and_then(Value::as_str),
            Some("completed")
        );
        assert_eq!(get_path(&document, "status").and_then(Value::as_str), Some("shipped"));
    }

    #[test]
    fn set_path_overwrites_scalars_on_the_way() {
        let mut document = sample();

        set_path(&mut document, "status.code", Value::from(3_u32));

        assert_eq!(get_path(&document, "status.code"), Some(&Value::Integer(3)));
    }

    #[test]
    fn contains_missing_is_recursive() {
        let mut document = sample();

        assert!(!Value::Map(document.clone()).contains_missing());

        set_path(
            &mut document,
            "items",
            Value::Array(vec![Value::Null, Value::Missing]),
        );

        assert!(Value::Map(document).contains_missing());
    }

    #[test]
    fn integers_widen_to_decimals() {
        assert_eq!(Value::Integer(7).as_decimal(), Some(Decimal::from(7)));
        assert_eq!(Value::from(u64::MAX).as_decimal(), Some(Decimal::from(u64::MAX)));
    }
}
