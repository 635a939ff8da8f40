//! Serializing into documents
//!
//! A [`serde::Serializer`] whose output is a [`Value`] tree, so the serde
//! attributes on the domain types define the persisted shape. `None`
//! becomes [`Value::Missing`] and unit becomes [`Value::Null`]; fields
//! serialized through [`timestamp`] stay native timestamps.

use std::fmt::Display;

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Serialize, ser};
use thiserror::Error;

use super::value::{Document, Value};

const TIMESTAMP_TOKEN: &str = "$orebi::document::Timestamp";

/// Errors raised when a value has no document representation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodeError {
    /// Map keys must serialize to strings.
    #[error("map keys must be strings")]
    KeyMustBeString,

    /// The top-level value did not serialize to a map.
    #[error("value is not a document")]
    NotADocument,

    /// A float that does not fit a decimal.
    #[error("number `{0}` cannot be stored")]
    InvalidNumber(String),

    /// A timestamp field did not serialize to an RFC 3339 string.
    #[error("invalid timestamp `{0}`")]
    InvalidTimestamp(String),

    /// Raised by a `Serialize` implementation.
    #[error("{0}")]
    Custom(String),
}

impl ser::Error for EncodeError {
    fn custom<T: Display>(msg: T) -> Self {
        EncodeError::Custom(msg.to_string())
    }
}

/// `serialize_with` helpers that keep [`Timestamp`] fields native.
///
/// Other serializers see the plain RFC 3339 string jiff writes.
pub mod timestamp {
    use jiff::Timestamp;
    use serde::Serializer;

    use super::TIMESTAMP_TOKEN;

    /// Serializes a timestamp field.
    ///
    /// # Errors
    ///
    /// Propagates the serializer's error.
    pub fn serialize<S: Serializer>(value: &Timestamp, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_newtype_struct(TIMESTAMP_TOKEN, value)
    }

    /// Serializes an optional timestamp, writing `None` as an explicit null.
    ///
    /// # Errors
    ///
    /// Propagates the serializer's error.
    #[expect(
        clippy::ref_option,
        reason = "serde passes `serialize_with` fields by reference"
    )]
    pub fn serialize_nullable<S: Serializer>(
        value: &Option<Timestamp>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(value) => serialize(value, serializer),
            None => serializer.serialize_unit(),
        }
    }
}

/// Serializes `value` into a [`Value`].
///
/// # Errors
///
/// Returns an [`EncodeError`] when part of `value` has no document form.
pub fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<Value, EncodeError> {
    value.serialize(ValueSerializer)
}

/// Serializes `value` into a [`Document`]. The result may contain missing markers.
///
/// # Errors
///
/// Returns [`EncodeError::NotADocument`] unless `value` serializes to a map.
pub fn to_document<T: Serialize + ?Sized>(value: &T) -> Result<Document, EncodeError> {
    match to_value(value)? {
        Value::Map(document) => Ok(document),
        _ => Err(EncodeError::NotADocument),
    }
}

fn number(value: impl Display) -> Result<Value, EncodeError> {
    let text = value.to_string();

    text.parse::<Decimal>()
        .map(Value::Number)
        .map_err(|_parse_error| EncodeError::InvalidNumber(text.clone()))
}

fn tagged(variant: &str, value: Value) -> Value {
    Value::Map(Document::from([(variant.to_string(), value)]))
}

struct ValueSerializer;

impl ser::Serializer for ValueSerializer {
    type Ok = Value;
    type Error = EncodeError;

    type SerializeSeq = SerializeVec;
    type SerializeTuple = SerializeVec;
    type SerializeTupleStruct = SerializeVec;
    type SerializeTupleVariant = SerializeVec;
    type SerializeMap = SerializeMap;
    type SerializeStruct = SerializeMap;
    type SerializeStructVariant = SerializeMap;

    fn serialize_bool(self, v: bool) -> Result<Value, EncodeError> {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value, EncodeError> {
        Ok(Value::Integer(i64::from(v)))
    }

    fn serialize_i16(self, v: i16) -> Result<Value, EncodeError> {
        Ok(Value::Integer(i64::from(v)))
    }

    fn serialize_i32(self, v: i32) -> Result<Value, EncodeError> {
        Ok(Value::Integer(i64::from(v)))
    }

    fn serialize_i64(self, v: i64) -> Result<Value, EncodeError> {
        Ok(Value::Integer(v))
    }

    fn serialize_u8(self, v: u8) -> Result<Value, EncodeError> {
        Ok(Value::Integer(i64::from(v)))
    }

    fn serialize_u16(self, v: u16) -> Result<Value, EncodeError> {
        Ok(Value::Integer(i64::from(v)))
    }

    fn serialize_u32(self, v: u32) -> Result<Value, EncodeError> {
        Ok(Value::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<Value, EncodeError> {
        Ok(Value::from(v))
    }

    fn serialize_f32(self, v: f32) -> Result<Value, EncodeError> {
        number(v)
    }

    fn serialize_f64(self, v: f64) -> Result<Value, EncodeError> {
        number(v)
    }

    fn serialize_char(self, v: char) -> Result<Value, EncodeError> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Value, EncodeError> {
        Ok(Value::from(v))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value, EncodeError> {
        Ok(Value::Array(
            v.iter().map(|byte| Value::Integer(i64::from(*byte))).collect(),
        ))
    }

    fn serialize_none(self) -> Result<Value, EncodeError> {
        Ok(Value::Missing)
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<Value, EncodeError> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value, EncodeError> {
        Ok(Value::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value, EncodeError> {
        Ok(Value::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Value, EncodeError> {
        Ok(Value::from(variant))
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        name: &'static str,
        value: &T,
    ) -> Result<Value, EncodeError> {
        if name != TIMESTAMP_TOKEN {
            return value.serialize(self);
        }

        match value.serialize(self)? {
            Value::String(text) => text
                .parse::<Timestamp>()
                .map(Value::Timestamp)
                .map_err(|_parse_error| EncodeError::InvalidTimestamp(text.clone())),
            other => Err(EncodeError::InvalidTimestamp(format!("{other:?}"))),
        }
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value, EncodeError> {
        Ok(tagged(variant, to_value(value)?))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeVec, EncodeError> {
        Ok(SerializeVec {
            variant: None,
            values: Vec::with_capacity(len.unwrap_or_default()),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<SerializeVec, EncodeError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<SerializeVec, EncodeError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeVec, EncodeError> {
        Ok(SerializeVec {
            variant: Some(variant),
            values: Vec::with_capacity(len),
        })
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<SerializeMap, EncodeError> {
        Ok(SerializeMap::default())
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<SerializeMap, EncodeError> {
        Ok(SerializeMap::default())
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<SerializeMap, EncodeError> {
        Ok(SerializeMap {
            variant: Some(variant),
            ..SerializeMap::default()
        })
    }
}

struct SerializeVec {
    variant: Option<&'static str>,
    values: Vec<Value>,
}

impl SerializeVec {
    fn push<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), EncodeError> {
        self.values.push(to_value(value)?);

        Ok(())
    }

    fn finish(self) -> Value {
        let array = Value::Array(self.values);

        match self.variant {
            Some(variant) => tagged(variant, array),
            None => array,
        }
    }
}

impl ser::SerializeSeq for SerializeVec {
    type Ok = Value;
    type Error = EncodeError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), EncodeError> {
        self.push(value)
    }

    fn end(self) -> Result<Value, EncodeError> {
        Ok(self.finish())
    }
}

impl ser::SerializeTuple for SerializeVec {
    type Ok = Value;
    type Error = EncodeError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), EncodeError> {
        self.push(value)
    }

    fn end(self) -> Result<Value, EncodeError> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleStruct for SerializeVec {
    type Ok = Value;
    type Error = EncodeError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), EncodeError> {
        self.push(value)
    }

    fn end(self) -> Result<Value, EncodeError> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleVariant for SerializeVec {
    type Ok = Value;
    type Error = EncodeError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), EncodeError> {
        self.push(value)
    }

    fn end(self) -> Result<Value, EncodeError> {
        Ok(self.finish())
    }
}

#[derive(Default)]
struct SerializeMap {
    variant: Option<&'static str>,
    document: Document,
    key: Option<String>,
}

impl SerializeMap {
    fn insert<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<(), EncodeError> {
        self.document.insert(key.to_string(), to_value(value)?);

        Ok(())
    }

    fn finish(self) -> Value {
        let map = Value::Map(self.document);

        match self.variant {
            Some(variant) => tagged(variant, map),
            None => map,
        }
    }
}

impl ser::SerializeMap for SerializeMap {
    type Ok = Value;
    type Error = EncodeError;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<(), EncodeError> {
        match to_value(key)? {
            Value::String(key) => {
                self.key = Some(key);

                Ok(())
            }
            _ => Err(EncodeError::KeyMustBeString),
        }
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), EncodeError> {
        let key = self.key.take().ok_or(EncodeError::KeyMustBeString)?;

        self.insert(&key, value)
    }

    fn end(self) -> Result<Value, EncodeError> {
        Ok(self.finish())
    }
}

impl ser::SerializeStruct for SerializeMap {
    type Ok = Value;
    type Error = EncodeError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), EncodeError> {
        self.insert(key, value)
    }

    fn end(self) -> Result<Value, EncodeError> {
        Ok(self.finish())
    }
}

impl ser::SerializeStructVariant for SerializeMap {
    type Ok = Value;
    type Error = EncodeError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), EncodeError> {
        self.insert(key, value)
    }

    fn end(self) -> Result<Value, EncodeError> {
        Ok(self.finish())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use testresult::TestResult;

    use super::*;

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Shipment {
        #[serde(serialize_with = "timestamp::serialize")]
        shipped_at: Timestamp,

        #[serde(serialize_with = "timestamp::serialize_nullable")]
        delivered_at: Option<Timestamp>,

        carrier: Option<String>,
        weight: f64,
        parcels: u32,
        state: State,
    }

    #[derive(Serialize)]
    #[serde(rename_all = "lowercase")]
    enum State {
        Moving,
    }

    #[test]
    fn struct_fields_map_onto_values() -> TestResult {
        let shipped_at = Timestamp::from_second(1_700_000_000)?;
        let document = to_document(&Shipment {
            shipped_at,
            delivered_at: None,
            carrier: None,
            weight: 2.75,
            parcels: 3,
            state: State::Moving,
        })?;

        assert_eq!(document.get("shippedAt"), Some(&Value::Timestamp(shipped_at)));
        assert_eq!(document.get("deliveredAt"), Some(&Value::Null));
        assert_eq!(document.get("carrier"), Some(&Value::Missing));
        assert_eq!(document.get("weight"), Some(&Value::Number(Decimal::new(275, 2))));
        assert_eq!(document.get("parcels"), Some(&Value::Integer(3)));
        assert_eq!(document.get("state"), Some(&Value::from("moving")));

        Ok(())
    }

    #[test]
    fn plain_timestamps_stay_strings() -> TestResult {
        let at = Timestamp::from_second(1_700_000_000)?;

        assert_eq!(to_value(&at)?, Value::from(at.to_string()));

        Ok(())
    }

    #[test]
    fn non_string_keys_and_scalars_are_rejected() {
        let numbered = BTreeMap::from([(1_u8, "one")]);

        assert_eq!(to_document(&numbered), Err(EncodeError::KeyMustBeString));
        assert_eq!(to_document(&"text"), Err(EncodeError::NotADocument));
        assert_eq!(
            to_value(&f64::NAN),
            Err(EncodeError::InvalidNumber("NaN".to_string()))
        );
    }
}
