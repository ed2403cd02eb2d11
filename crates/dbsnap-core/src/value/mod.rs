//! Value Model
//!
//! Every cell read from a data source is normalized into a [`Value`], a
//! closed set of semantic types that expectations are checked against.
//!
//! ## Equality
//!
//! - DATE and DATE_TIME at midnight on the same day are equal (and hash alike)
//! - NUMBER compares the exact decimal, never a float approximation
//! - TEXT is exact and case-sensitive; BYTES is byte-exact
//! - NULL equals only NULL

mod number;
mod raw;
mod temporal;

pub use number::Number;
pub use raw::{normalize, RawCell};
pub use temporal::{DateTimeValue, DateValue, TimeValue};

use crate::errors::{DbSnapError, Result};
use base64::Engine;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

/// Semantic type tag of a [`Value`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueType {
    Boolean,
    Number,
    Text,
    Date,
    Time,
    DateTime,
    Bytes,
    NotIdentified,
    Null,
}

impl ValueType {
    /// Types an expectation of this type accepts
    pub fn compatible_types(&self) -> &'static [ValueType] {
        match self {
            ValueType::Date | ValueType::DateTime => &[ValueType::Date, ValueType::DateTime],
            ValueType::Boolean => &[ValueType::Boolean],
            ValueType::Number => &[ValueType::Number],
            ValueType::Text => &[ValueType::Text],
            ValueType::Time => &[ValueType::Time],
            ValueType::Bytes => &[ValueType::Bytes],
            ValueType::NotIdentified => &[ValueType::NotIdentified],
            ValueType::Null => &[ValueType::Null],
        }
    }

    pub fn is_compatible_with(&self, other: ValueType) -> bool {
        self.compatible_types().contains(&other)
    }
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ValueType::Boolean => "BOOLEAN",
            ValueType::Number => "NUMBER",
            ValueType::Text => "TEXT",
            ValueType::Date => "DATE",
            ValueType::Time => "TIME",
            ValueType::DateTime => "DATE_TIME",
            ValueType::Bytes => "BYTES",
            ValueType::NotIdentified => "NOT_IDENTIFIED",
            ValueType::Null => "NULL",
        };
        f.write_str(name)
    }
}

/// A normalized cell
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Boolean(bool),
    Number(Number),
    Text(String),
    Date(DateValue),
    Time(TimeValue),
    DateTime(DateTimeValue),
    Bytes(Vec<u8>),
    /// Driver value with no semantic mapping, kept as its text rendering
    NotIdentified(String),
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Null => ValueType::Null,
            Value::Boolean(_) => ValueType::Boolean,
            Value::Number(_) => ValueType::Number,
            Value::Text(_) => ValueType::Text,
            Value::Date(_) => ValueType::Date,
            Value::Time(_) => ValueType::Time,
            Value::DateTime(_) => ValueType::DateTime,
            Value::Bytes(_) => ValueType::Bytes,
            Value::NotIdentified(_) => ValueType::NotIdentified,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    fn mismatch(&self, expected: &[ValueType]) -> DbSnapError {
        DbSnapError::TypeMismatch {
            value: self.to_string(),
            actual: self.value_type(),
            expected: expected.to_vec(),
            index: None,
        }
    }

    /// Check that this value is of one of `expected`.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` naming the actual type and every expected one.
    pub fn expect_type(&self, expected: &[ValueType]) -> Result<()> {
        if expected.contains(&self.value_type()) {
            Ok(())
        } else {
            Err(self.mismatch(expected))
        }
    }

    /// Compare this (actual) value with an expected one.
    ///
    /// An expected NULL matches only NULL. A NULL actual against a non-null
    /// expectation is `Ok(false)`.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` when the expected value's type cannot be compared with
    /// this value's type.
    pub fn is_equal_to(&self, expected: &Value) -> Result<bool> {
        if expected.is_null() || self.is_null() {
            return Ok(self.is_null() && expected.is_null());
        }
        let expected_type = expected.value_type();
        if !expected_type.is_compatible_with(self.value_type()) {
            return Err(self.mismatch(expected_type.compatible_types()));
        }
        Ok(self == expected)
    }

    /// Order two values of comparable types.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` for values of incomparable types, reported against
    /// `other`.
    pub fn compare(&self, other: &Value) -> Result<Ordering> {
        match (self, other) {
            (Value::Null, Value::Null) => Ok(Ordering::Equal),
            (Value::Boolean(a), Value::Boolean(b)) => Ok(a.cmp(b)),
            (Value::Number(a), Value::Number(b)) => Ok(a.cmp(b)),
            (Value::Text(a), Value::Text(b)) => Ok(a.cmp(b)),
            (Value::Time(a), Value::Time(b)) => Ok(a.cmp(b)),
            (Value::Bytes(a), Value::Bytes(b)) => Ok(a.cmp(b)),
            (Value::NotIdentified(a), Value::NotIdentified(b)) => Ok(a.cmp(b)),
            _ => match (self.as_chronological(), other.as_chronological()) {
                (Some(a), Some(b)) => Ok(a.cmp(&b)),
                _ => Err(other.mismatch(self.value_type().compatible_types())),
            },
        }
    }

    fn as_chronological(&self) -> Option<DateTimeValue> {
        match self {
            Value::Date(d) => Some(DateTimeValue::of_date(*d)),
            Value::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    /// # Errors
    ///
    /// `TypeMismatch` for any other variant.
    pub fn as_bool(&self) -> Result<bool> {
        match self {
            Value::Boolean(b) => Ok(*b),
            _ => Err(self.mismatch(&[ValueType::Boolean])),
        }
    }

    /// # Errors
    ///
    /// `TypeMismatch` for any other variant.
    pub fn as_number(&self) -> Result<&Number> {
        match self {
            Value::Number(n) => Ok(n),
            _ => Err(self.mismatch(&[ValueType::Number])),
        }
    }

    /// # Errors
    ///
    /// `TypeMismatch` for any other variant.
    pub fn as_text(&self) -> Result<&str> {
        match self {
            Value::Text(s) => Ok(s),
            _ => Err(self.mismatch(&[ValueType::Text])),
        }
    }

    /// The date of a DATE, or of a DATE_TIME at midnight
    ///
    /// # Errors
    ///
    /// `TypeMismatch` for other variants and for a DATE_TIME with a time of
    /// day.
    pub fn as_date(&self) -> Result<DateValue> {
        match self {
            Value::Date(d) => Ok(*d),
            Value::DateTime(dt) if dt.is_date_only() => Ok(dt.date()),
            _ => Err(self.mismatch(&[ValueType::Date])),
        }
    }

    /// # Errors
    ///
    /// `TypeMismatch` for any other variant.
    pub fn as_time(&self) -> Result<TimeValue> {
        match self {
            Value::Time(t) => Ok(*t),
            _ => Err(self.mismatch(&[ValueType::Time])),
        }
    }

    /// A DATE_TIME, or a DATE taken as midnight
    ///
    /// # Errors
    ///
    /// `TypeMismatch` for any other variant.
    pub fn as_date_time(&self) -> Result<DateTimeValue> {
        self.as_chronological()
            .ok_or_else(|| self.mismatch(&[ValueType::Date, ValueType::DateTime]))
    }

    /// # Errors
    ///
    /// `TypeMismatch` for any other variant.
    pub fn as_bytes(&self) -> Result<&[u8]> {
        match self {
            Value::Bytes(b) => Ok(b),
            _ => Err(self.mismatch(&[ValueType::Bytes])),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::Time(a), Value::Time(b)) => a == b,
            (Value::DateTime(a), Value::DateTime(b)) => a == b,
            (Value::Date(d), Value::DateTime(dt)) | (Value::DateTime(dt), Value::Date(d)) => {
                dt.is_date_only() && dt.date() == *d
            }
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::NotIdentified(a), Value::NotIdentified(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Value::Null => 0u8.hash(state),
            Value::Boolean(b) => {
                1u8.hash(state);
                b.hash(state);
            }
            Value::Number(n) => {
                2u8.hash(state);
                n.hash(state);
            }
            Value::Text(s) => {
                3u8.hash(state);
                s.hash(state);
            }
            Value::Date(d) => {
                4u8.hash(state);
                d.hash(state);
            }
            // Midnight date/times must land in the same bucket as the date.
            Value::DateTime(dt) if dt.is_date_only() => {
                4u8.hash(state);
                dt.date().hash(state);
            }
            Value::DateTime(dt) => {
                5u8.hash(state);
                dt.hash(state);
            }
            Value::Time(t) => {
                6u8.hash(state);
                t.hash(state);
            }
            Value::Bytes(b) => {
                7u8.hash(state);
                b.hash(state);
            }
            Value::NotIdentified(s) => {
                8u8.hash(state);
                s.hash(state);
            }
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) => f.write_str(s),
            Value::Date(d) => write!(f, "{}", d),
            Value::Time(t) => write!(f, "{}", t),
            Value::DateTime(dt) => write!(f, "{}", dt),
            Value::Bytes(b) => f.write_str(&hex::encode(b)),
            Value::NotIdentified(s) => f.write_str(s),
        }
    }
}

/// Serialized as `{"type": "NUMBER", "value": "1.50"}`; bytes are base64.
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Value", 2)?;
        state.serialize_field("type", &self.value_type())?;
        match self {
            Value::Null => state.serialize_field("value", &None::<()>)?,
            Value::Boolean(b) => state.serialize_field("value", b)?,
            Value::Number(n) => state.serialize_field("value", n)?,
            Value::Text(s) | Value::NotIdentified(s) => state.serialize_field("value", s)?,
            Value::Date(d) => state.serialize_field("value", d)?,
            Value::Time(t) => state.serialize_field("value", t)?,
            Value::DateTime(dt) => state.serialize_field("value", dt)?,
            Value::Bytes(b) => {
                let encoded = base64::engine::general_purpose::STANDARD.encode(b);
                state.serialize_field("value", &encoded)?
            }
        }
        state.end()
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Number(Number::from(i))
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Number(Number::from(i))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<DateValue> for Value {
    fn from(d: DateValue) -> Self {
        Value::Date(d)
    }
}

impl From<TimeValue> for Value {
    fn from(t: TimeValue) -> Self {
        Value::Time(t)
    }
}

impl From<DateTimeValue> for Value {
    fn from(dt: DateTimeValue) -> Self {
        Value::DateTime(dt)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Bytes(b)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of(value: &Value) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    fn midnight(y: i32, m: u32, d: u32) -> (Value, Value) {
        let date = DateValue::of(y, m, d).unwrap();
        (Value::Date(date), Value::DateTime(DateTimeValue::of_date(date)))
    }

    #[test]
    fn test_midnight_date_time_equals_date_and_hashes_alike() {
        let (date, date_time) = midnight(2014, 5, 24);
        assert_eq!(date, date_time);
        assert_eq!(hash_of(&date), hash_of(&date_time));
    }

    #[test]
    fn test_non_midnight_date_time_differs_from_date() {
        let date = DateValue::of(2014, 5, 24).unwrap();
        let dt = DateTimeValue::of(date, TimeValue::of(0, 0, 1).unwrap());
        assert_ne!(Value::Date(date), Value::DateTime(dt));
    }

    #[test]
    fn test_text_is_case_sensitive() {
        assert_ne!(Value::from("Text"), Value::from("text"));
    }

    #[test]
    fn test_null_expectations() {
        assert!(Value::Null.is_equal_to(&Value::Null).unwrap());
        assert!(!Value::Null.is_equal_to(&Value::from(1)).unwrap());
        assert!(!Value::from(1).is_equal_to(&Value::Null).unwrap());
    }

    #[test]
    fn test_is_equal_to_rejects_incompatible_types() {
        let err = Value::from(1).is_equal_to(&Value::from("1")).unwrap_err();
        assert_eq!(
            err,
            DbSnapError::TypeMismatch {
                value: "1".to_string(),
                actual: ValueType::Number,
                expected: vec![ValueType::Text],
                index: None,
            }
        );
    }

    #[test]
    fn test_date_expectation_on_number_names_both_temporal_types() {
        let date = Value::Date(DateValue::of(2014, 5, 24).unwrap());
        let err = Value::from(1).is_equal_to(&date).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Expecting <1> to be of type <[DATE, DATE_TIME]> but was of type <NUMBER>"
        );
    }

    #[test]
    fn test_compare_within_and_across_temporal_types() {
        let (date, _) = midnight(2014, 5, 24);
        let later = Value::DateTime(DateTimeValue::parse("2014-05-24T00:00:01").unwrap());
        assert_eq!(date.compare(&later).unwrap(), Ordering::Less);
        assert_eq!(
            Value::from(false).compare(&Value::from(true)).unwrap(),
            Ordering::Less
        );
        assert!(Value::from(1).compare(&Value::from("a")).is_err());
    }

    #[test]
    fn test_typed_accessors() {
        let (date, date_time) = midnight(2020, 1, 2);
        assert_eq!(date_time.as_date().unwrap(), date.as_date().unwrap());
        assert!(Value::from("x").as_bool().is_err());
        assert_eq!(Value::from(vec![1u8, 2]).as_bytes().unwrap(), &[1, 2]);
    }

    #[test]
    fn test_display_and_serialize() {
        assert_eq!(Value::from(vec![0xca, 0xfe]).to_string(), "cafe");
        assert_eq!(Value::Null.to_string(), "null");
        let json = serde_json::to_value(Value::Number(Number::parse("1.50").unwrap())).unwrap();
        assert_eq!(json, serde_json::json!({"type": "NUMBER", "value": "1.50"}));
        let bytes = serde_json::to_value(Value::from(vec![1u8, 2, 3])).unwrap();
        assert_eq!(bytes, serde_json::json!({"type": "BYTES", "value": "AQID"}));
    }
}
