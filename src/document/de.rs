//! Deserializing from documents
//!
//! `&Value` is a [`serde::Deserializer`], so stored documents decode through
//! the same derives that encode them. Missing leaves read as absent fields,
//! timestamps are handed to visitors as RFC 3339 strings, and every error
//! carries the dotted path of the field that failed (`items.0.price`).

use std::{collections::btree_map, fmt::Display, iter::Enumerate, slice};

use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde::{
    Deserialize,
    de::{self, DeserializeSeed, Expected, Unexpected, Visitor, value::BorrowedStrDeserializer},
};
use thiserror::Error;

use super::value::{Document, Value};

/// Errors raised when a stored document does not have the expected shape.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// A required field is absent.
    #[error("missing field `{0}`")]
    MissingField(String),

    /// A field holds the wrong kind of value.
    #[error("field `{field}` should be {expected}")]
    WrongType {
        /// Field path.
        field: String,

        /// What the target type accepts.
        expected: String,
    },

    /// A field holds an unrecognised value.
    #[error("field `{field}` has unrecognised value `{value}`")]
    InvalidValue {
        /// Field path.
        field: String,

        /// The stored value.
        value: String,
    },

    /// Raised by a `Deserialize` implementation.
    #[error("field `{field}`: {message}")]
    Other {
        /// Field path.
        field: String,

        /// Error message.
        message: String,
    },
}

impl DecodeError {
    /// Dotted path of the field that failed; empty for the document itself.
    pub fn field(&self) -> &str {
        match self {
            DecodeError::MissingField(field)
            | DecodeError::WrongType { field, .. }
            | DecodeError::InvalidValue { field, .. }
            | DecodeError::Other { field, .. } => field,
        }
    }

    fn at(mut self, segment: &str) -> Self {
        let (DecodeError::MissingField(field)
        | DecodeError::WrongType { field, .. }
        | DecodeError::InvalidValue { field, .. }
        | DecodeError::Other { field, .. }) = &mut self;

        *field = if field.is_empty() {
            segment.to_string()
        } else {
            format!("{segment}.{field}")
        };

        self
    }
}

impl de::Error for DecodeError {
    fn custom<T: Display>(msg: T) -> Self {
        DecodeError::Other {
            field: String::new(),
            message: msg.to_string(),
        }
    }

    fn invalid_type(_unexp: Unexpected<'_>, exp: &dyn Expected) -> Self {
        DecodeError::WrongType {
            field: String::new(),
            expected: exp.to_string(),
        }
    }

    fn invalid_value(unexp: Unexpected<'_>, _exp: &dyn Expected) -> Self {
        let value = match unexp {
            Unexpected::Str(value) => value.to_string(),
            Unexpected::Signed(value) => value.to_string(),
            Unexpected::Unsigned(value) => value.to_string(),
            Unexpected::Float(value) => value.to_string(),
            other => other.to_string(),
        };

        DecodeError::InvalidValue {
            field: String::new(),
            value,
        }
    }

    fn unknown_variant(variant: &str, _expected: &'static [&'static str]) -> Self {
        DecodeError::InvalidValue {
            field: String::new(),
            value: variant.to_string(),
        }
    }

    fn missing_field(field: &'static str) -> Self {
        DecodeError::MissingField(field.to_string())
    }
}

/// Decodes a stored value.
///
/// # Errors
///
/// Returns a [`DecodeError`] naming the first field that does not fit `T`.
pub fn from_value<'de, T: Deserialize<'de>>(value: &'de Value) -> Result<T, DecodeError> {
    T::deserialize(value)
}

/// Decodes a stored document.
///
/// # Errors
///
/// Returns a [`DecodeError`] naming the first field that does not fit `T`.
pub fn from_document<'de, T: Deserialize<'de>>(document: &'de Document) -> Result<T, DecodeError> {
    T::deserialize(DocumentDeserializer(document))
}

fn unexpected(value: &Value) -> Unexpected<'_> {
    match value {
        Value::Missing | Value::Null => Unexpected::Unit,
        Value::Bool(value) => Unexpected::Bool(*value),
        Value::Integer(value) => Unexpected::Signed(*value),
        Value::Number(_) => Unexpected::Other("number"),
        Value::String(value) => Unexpected::Str(value),
        Value::Timestamp(_) => Unexpected::Other("timestamp"),
        Value::Array(_) => Unexpected::Seq,
        Value::Map(_) => Unexpected::Map,
    }
}

// Whole numbers go through `visit_i64` so integer targets accept them.
fn visit_number<'de, V: Visitor<'de>>(number: Decimal, visitor: V) -> Result<V::Value, DecodeError> {
    if let Some(whole) = number.fract().is_zero().then(|| number.to_i64()).flatten() {
        return visitor.visit_i64(whole);
    }

    match number.to_f64() {
        Some(float) => visitor.visit_f64(float),
        None => Err(de::Error::invalid_value(
            Unexpected::Other("number"),
            &"a number representable as f64",
        )),
    }
}

impl<'de> de::Deserializer<'de> for &'de Value {
    type Error = DecodeError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        match self {
            Value::Missing | Value::Null => visitor.visit_unit(),
            Value::Bool(value) => visitor.visit_bool(*value),
            Value::Integer(value) => visitor.visit_i64(*value),
            Value::Number(value) => visit_number(*value, visitor),
            Value::String(value) => visitor.visit_borrowed_str(value),
            Value::Timestamp(value) => visitor.visit_string(value.to_string()),
            Value::Array(values) => visitor.visit_seq(SeqAccess {
                values: values.iter().enumerate(),
            }),
            Value::Map(document) => visitor.visit_map(MapAccess::new(document)),
        }
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        match self {
            Value::Missing | Value::Null => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, DecodeError> {
        visitor.visit_newtype_struct(self)
    }

    /// Unit variants are stored as their name; the others as a single-key map.
    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, DecodeError> {
        let (variant, value) = match self {
            Value::String(variant) => (variant.as_str(), None),
            Value::Map(document) => match (document.iter().next(), document.len()) {
                (Some((variant, value)), 1) => (variant.as_str(), Some(value)),
                _ => {
                    return Err(de::Error::invalid_value(
                        Unexpected::Map,
                        &"a map with a single key",
                    ));
                }
            },
            other => return Err(de::Error::invalid_type(unexpected(other), &"an enum")),
        };

        visitor.visit_enum(EnumAccess { variant, value })
    }

    serde::forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple tuple_struct map struct
        identifier ignored_any
    }
}

struct DocumentDeserializer<'de>(&'de Document);

impl<'de> de::Deserializer<'de> for DocumentDeserializer<'de> {
    type Error = DecodeError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        visitor.visit_map(MapAccess::new(self.0))
    }

    serde::forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf option unit unit_struct newtype_struct seq tuple
        tuple_struct map struct enum identifier ignored_any
    }
}

struct MapAccess<'de> {
    entries: btree_map::Iter<'de, String, Value>,
    pending: Option<(&'de str, &'de Value)>,
}

impl<'de> MapAccess<'de> {
    fn new(document: &'de Document) -> Self {
        Self {
            entries: document.iter(),
            pending: None,
        }
    }
}

impl<'de> de::MapAccess<'de> for MapAccess<'de> {
    type Error = DecodeError;

    fn next_key_seed<K: DeserializeSeed<'de>>(
        &mut self,
        seed: K,
    ) -> Result<Option<K::Value>, DecodeError> {
        let Some((key, value)) = self.entries.find(|(_, value)| !value.is_missing()) else {
            return Ok(None);
        };

        self.pending = Some((key.as_str(), value));

        seed.deserialize(BorrowedStrDeserializer::<DecodeError>::new(key))
            .map(Some)
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value, DecodeError> {
        let Some((key, value)) = self.pending.take() else {
            return Err(de::Error::custom("value requested before its key"));
        };

        seed.deserialize(value).map_err(|error| error.at(key))
    }
}

struct SeqAccess<'de> {
    values: Enumerate<slice::Iter<'de, Value>>,
}

impl<'de> de::SeqAccess<'de> for SeqAccess<'de> {
    type Error = DecodeError;

    fn next_element_seed<T: DeserializeSeed<'de>>(
        &mut self,
        seed: T,
    ) -> Result<Option<T::Value>, DecodeError> {
        let Some((index, value)) = self.values.find(|(_, value)| !value.is_missing()) else {
            return Ok(None);
        };

        seed.deserialize(value)
            .map(Some)
            .map_err(|error| error.at(&index.to_string()))
    }
}

struct EnumAccess<'de> {
    variant: &'de str,
    value: Option<&'de Value>,
}

impl<'de> de::EnumAccess<'de> for EnumAccess<'de> {
    type Error = DecodeError;
    type Variant = VariantAccess<'de>;

    fn variant_seed<V: DeserializeSeed<'de>>(
        self,
        seed: V,
    ) -> Result<(V::Value, VariantAccess<'de>), DecodeError> {
        let variant = seed.deserialize(BorrowedStrDeserializer::<DecodeError>::new(self.variant))?;

        Ok((variant, VariantAccess { value: self.value }))
    }
}

struct VariantAccess<'de> {
    value: Option<&'de Value>,
}

impl<'de> VariantAccess<'de> {
    fn content(self, expected: &str) -> Result<&'de Value, DecodeError> {
        self.value
            .ok_or_else(|| de::Error::invalid_type(Unexpected::UnitVariant, &expected))
    }
}

impl<'de> de::VariantAccess<'de> for VariantAccess<'de> {
    type Error = DecodeError;

    fn unit_variant(self) -> Result<(), DecodeError> {
        match self.value {
            None | Some(Value::Null) => Ok(()),
            Some(other) => Err(de::Error::invalid_type(unexpected(other), &"a unit variant")),
        }
    }

    fn newtype_variant_seed<T: DeserializeSeed<'de>>(self, seed: T) -> Result<T::Value, DecodeError> {
        seed.deserialize(self.content("a newtype variant")?)
    }

    fn tuple_variant<V: Visitor<'de>>(self, _len: usize, visitor: V) -> Result<V::Value, DecodeError> {
        de::Deserializer::deserialize_seq(self.content("a tuple variant")?, visitor)
    }

    fn struct_variant<V: Visitor<'de>>(
        self,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, DecodeError> {
        de::Deserializer::deserialize_map(self.content("a struct variant")?, visitor)
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use serde::Serialize;
    use testresult::TestResult;

    use crate::document::{set_path, to_document};

    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Parcel {
        label: String,
        weight: Decimal,
        count: u32,
        note: Option<String>,
        sent_at: Option<Timestamp>,
        lines: Vec<Line>,
        kind: Kind,
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Line {
        sku: String,
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    enum Kind {
        Carton,
        Envelope,
        Pallet(u32),
    }

    fn stored() -> Document {
        Document::from([
            ("label".to_string(), Value::from("fragile")),
            ("weight".to_string(), Value::Number(Decimal::new(1250, 3))),
            ("count".to_string(), Value::Number(Decimal::from(2))),
            ("note".to_string(), Value::Null),
            ("sentAt".to_string(), Value::Timestamp(Timestamp::UNIX_EPOCH)),
            (
                "lines".to_string(),
                Value::Array(vec![Value::Map(Document::from([(
                    "sku".to_string(),
                    Value::from("A-1"),
                )]))]),
            ),
            ("kind".to_string(), Value::from("envelope")),
        ])
    }

    #[test]
    fn decodes_native_values() -> TestResult {
        let parcel: Parcel = from_document(&stored())?;

        assert_eq!(
            parcel,
            Parcel {
                label: "fragile".to_string(),
                weight: Decimal::new(125, 2),
                count: 2,
                note: None,
                sent_at: Some(Timestamp::UNIX_EPOCH),
                lines: vec![Line {
                    sku: "A-1".to_string()
                }],
                kind: Kind::Envelope,
            }
        );

        Ok(())
    }

    #[test]
    fn missing_leaves_read_as_absent() {
        let mut document = stored();

        document.insert("note".to_string(), Value::Missing);
        document.insert("label".to_string(), Value::Missing);

        assert_eq!(
            from_document::<Parcel>(&document),
            Err(DecodeError::MissingField("label".to_string()))
        );
    }

    #[test]
    fn errors_carry_the_field_path() {
        let mut document = stored();

        set_path(&mut document, "lines", Value::Array(vec![Value::Map(Document::new())]));

        let missing = from_document::<Parcel>(&document);

        assert_eq!(missing, Err(DecodeError::MissingField("lines.0.sku".to_string())));

        set_path(&mut document, "label", Value::Bool(true));

        assert_eq!(
            from_document::<Parcel>(&document),
            Err(DecodeError::WrongType {
                field: "label".to_string(),
                expected: "a string".to_string(),
            })
        );
    }

    #[test]
    fn unknown_variants_and_out_of_range_numbers_are_invalid() {
        let mut document = stored();

        document.insert("kind".to_string(), Value::from("crate"));

        assert_eq!(
            from_document::<Parcel>(&document),
            Err(DecodeError::InvalidValue {
                field: "kind".to_string(),
                value: "crate".to_string(),
            })
        );

        document.insert("kind".to_string(), Value::from("carton"));
        document.insert("count".to_string(), Value::Integer(-1));

        let negative = from_document::<Parcel>(&document);

        assert!(
            matches!(&negative, Err(DecodeError::InvalidValue { field, value }) if field == "count" && value == "-1"),
            "expected InvalidValue at count, got {negative:?}"
        );
    }

    #[test]
    fn data_variants_survive_a_round_trip() -> TestResult {
        let parcel = Parcel {
            note: Some("leave at door".to_string()),
            kind: Kind::Pallet(4),
            ..from_document(&stored())?
        };

        let document = to_document(&parcel)?;

        assert_eq!(
            document.get("kind"),
            Some(&Value::Map(Document::from([(
                "pallet".to_string(),
                Value::Integer(4)
            )])))
        );
        assert_eq!(from_document::<Parcel>(&document)?, parcel);

        Ok(())
    }
}
