//! Runtime values - one variant per value kind
//!
//! The factory never inspects types reflectively: an argument is a tagged
//! [`Value`], and a handler accepts it when its tag fits the handler's kind.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::catalog::ValueKind;
use crate::error::{BundleError, Result};

/// A parcelable object: its class plus its written fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParcelObject {
    #[serde(rename = "class")]
    pub class_name: String,
    #[serde(default)]
    pub fields: serde_json::Map<String, JsonValue>,
}

impl ParcelObject {
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            fields: serde_json::Map::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Boolean(bool),
    BooleanArray(Vec<bool>),
    Byte(i8),
    ByteArray(Vec<i8>),
    Char(char),
    CharArray(Vec<char>),
    CharSequence(String),
    CharSequenceArray(Vec<String>),
    CharSequenceArrayList(Vec<String>),
    Double(f64),
    DoubleArray(Vec<f64>),
    Float(f32),
    FloatArray(Vec<f32>),
    Int(i32),
    IntArray(Vec<i32>),
    IntegerArrayList(Vec<i32>),
    Long(i64),
    LongArray(Vec<i64>),
    Parcelable(ParcelObject),
    ParcelableArray(Vec<ParcelObject>),
    ParcelableArrayList(Vec<ParcelObject>),
    Serializable(JsonValue),
    Short(i16),
    ShortArray(Vec<i16>),
    SparseParcelableArray(BTreeMap<i32, ParcelObject>),
    String(String),
    StringArray(Vec<String>),
    StringArrayList(Vec<String>),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Boolean(_) => ValueKind::Boolean,
            Value::BooleanArray(_) => ValueKind::BooleanArray,
            Value::Byte(_) => ValueKind::Byte,
            Value::ByteArray(_) => ValueKind::ByteArray,
            Value::Char(_) => ValueKind::Char,
            Value::CharArray(_) => ValueKind::CharArray,
            Value::CharSequence(_) => ValueKind::CharSequence,
            Value::CharSequenceArray(_) => ValueKind::CharSequenceArray,
            Value::CharSequenceArrayList(_) => ValueKind::CharSequenceArrayList,
            Value::Double(_) => ValueKind::Double,
            Value::DoubleArray(_) => ValueKind::DoubleArray,
            Value::Float(_) => ValueKind::Float,
            Value::FloatArray(_) => ValueKind::FloatArray,
            Value::Int(_) => ValueKind::Int,
            Value::IntArray(_) => ValueKind::IntArray,
            Value::IntegerArrayList(_) => ValueKind::IntegerArrayList,
            Value::Long(_) => ValueKind::Long,
            Value::LongArray(_) => ValueKind::LongArray,
            Value::Parcelable(_) => ValueKind::Parcelable,
            Value::ParcelableArray(_) => ValueKind::ParcelableArray,
            Value::ParcelableArrayList(_) => ValueKind::ParcelableArrayList,
            Value::Serializable(_) => ValueKind::Serializable,
            Value::Short(_) => ValueKind::Short,
            Value::ShortArray(_) => ValueKind::ShortArray,
            Value::SparseParcelableArray(_) => ValueKind::SparseParcelableArray,
            Value::String(_) => ValueKind::String,
            Value::StringArray(_) => ValueKind::StringArray,
            Value::StringArrayList(_) => ValueKind::StringArrayList,
        }
    }

    /// Convert into a value of `kind`, if it fits.
    ///
    /// Strings are char sequences, so string values (and arrays/lists of
    /// them) fit the matching `CharSequence*` kinds.
    pub fn into_kind(self, kind: ValueKind) -> std::result::Result<Value, Value> {
        if self.kind() == kind {
            return Ok(self);
        }
        match (self, kind) {
            (Value::String(s), ValueKind::CharSequence) => Ok(Value::CharSequence(s)),
            (Value::StringArray(v), ValueKind::CharSequenceArray) => Ok(Value::CharSequenceArray(v)),
            (Value::StringArrayList(v), ValueKind::CharSequenceArrayList) => {
                Ok(Value::CharSequenceArrayList(v))
            }
            (value, _) => Err(value),
        }
    }

    /// Build a value of `kind` from JSON. `key` only names the argument in
    /// errors. JSON `null` is not a value; callers treat it as absent.
    pub fn from_json(kind: ValueKind, key: &str, json: &JsonValue) -> Result<Value> {
        let invalid = |reason: String| BundleError::InvalidArgument {
            key: key.to_string(),
            reason,
        };
        let expected = |what: &str| invalid(format!("expected {what}, found {json}"));

        let value = match kind {
            ValueKind::Boolean => Value::Boolean(json.as_bool().ok_or_else(|| expected("a boolean"))?),
            ValueKind::Byte => Value::Byte(integer(json).ok_or_else(|| expected("a byte"))?),
            ValueKind::Short => Value::Short(integer(json).ok_or_else(|| expected("a short"))?),
            ValueKind::Int => Value::Int(integer(json).ok_or_else(|| expected("an int"))?),
            ValueKind::Long => Value::Long(integer(json).ok_or_else(|| expected("a long"))?),
            ValueKind::Float => {
                Value::Float(json.as_f64().ok_or_else(|| expected("a float"))? as f32)
            }
            ValueKind::Double => Value::Double(json.as_f64().ok_or_else(|| expected("a double"))?),
            ValueKind::Char => Value::Char(single_char(json).ok_or_else(|| expected("a single character"))?),
            ValueKind::String => Value::String(text(json).ok_or_else(|| expected("a string"))?),
            ValueKind::CharSequence => {
                Value::CharSequence(text(json).ok_or_else(|| expected("a string"))?)
            }
            ValueKind::Serializable => Value::Serializable(json.clone()),

            ValueKind::BooleanArray => Value::BooleanArray(
                elements(json, JsonValue::as_bool).ok_or_else(|| expected("an array of booleans"))?,
            ),
            ValueKind::ByteArray => {
                Value::ByteArray(elements(json, integer).ok_or_else(|| expected("an array of bytes"))?)
            }
            ValueKind::ShortArray => Value::ShortArray(
                elements(json, integer).ok_or_else(|| expected("an array of shorts"))?,
            ),
            ValueKind::IntArray => {
                Value::IntArray(elements(json, integer).ok_or_else(|| expected("an array of ints"))?)
            }
            ValueKind::IntegerArrayList => Value::IntegerArrayList(
                elements(json, integer).ok_or_else(|| expected("an array of ints"))?,
            ),
            ValueKind::LongArray => {
                Value::LongArray(elements(json, integer).ok_or_else(|| expected("an array of longs"))?)
            }
            ValueKind::FloatArray => Value::FloatArray(
                elements(json, |v| v.as_f64().map(|f| f as f32))
                    .ok_or_else(|| expected("an array of floats"))?,
            ),
            ValueKind::DoubleArray => Value::DoubleArray(
                elements(json, JsonValue::as_f64).ok_or_else(|| expected("an array of doubles"))?,
            ),
            ValueKind::CharArray => {
                let chars = match json {
                    JsonValue::String(s) => Some(s.chars().collect()),
                    other => elements(other, single_char),
                };
                Value::CharArray(chars.ok_or_else(|| expected("a string or an array of characters"))?)
            }
            ValueKind::StringArray => {
                Value::StringArray(elements(json, text).ok_or_else(|| expected("an array of strings"))?)
            }
            ValueKind::StringArrayList => Value::StringArrayList(
                elements(json, text).ok_or_else(|| expected("an array of strings"))?,
            ),
            ValueKind::CharSequenceArray => Value::CharSequenceArray(
                elements(json, text).ok_or_else(|| expected("an array of strings"))?,
            ),
            ValueKind::CharSequenceArrayList => Value::CharSequenceArrayList(
                elements(json, text).ok_or_else(|| expected("an array of strings"))?,
            ),

            ValueKind::Parcelable => Value::Parcelable(parcel(json).map_err(&invalid)?),
            ValueKind::ParcelableArray => Value::ParcelableArray(parcels(json).map_err(&invalid)?),
            ValueKind::ParcelableArrayList => {
                Value::ParcelableArrayList(parcels(json).map_err(&invalid)?)
            }
            ValueKind::SparseParcelableArray => Value::SparseParcelableArray(
                serde_json::from_value(json.clone())
                    .map_err(|e| invalid(format!("expected an object of index -> parcelable: {e}")))?,
            ),
        };
        Ok(value)
    }

    pub fn to_json(&self) -> JsonValue {
        serde_json::to_value(self).unwrap_or(JsonValue::Null)
    }
}

fn integer<T: TryFrom<i64>>(json: &JsonValue) -> Option<T> {
    json.as_i64().and_then(|n| T::try_from(n).ok())
}

fn text(json: &JsonValue) -> Option<String> {
    json.as_str().map(str::to_string)
}

fn single_char(json: &JsonValue) -> Option<char> {
    let mut chars = json.as_str()?.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

fn elements<T>(json: &JsonValue, element: impl Fn(&JsonValue) -> Option<T>) -> Option<Vec<T>> {
    json.as_array()?.iter().map(element).collect()
}

fn parcel(json: &JsonValue) -> std::result::Result<ParcelObject, String> {
    serde_json::from_value(json.clone())
        .map_err(|e| format!("expected {{\"class\": .., \"fields\": {{..}}}}: {e}"))
}

fn parcels(json: &JsonValue) -> std::result::Result<Vec<ParcelObject>, String> {
    match json.as_array() {
        Some(items) => items.iter().map(parcel).collect(),
        None => Err(format!("expected an array of parcelables, found {json}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kinds_follow_variants() {
        assert_eq!(Value::Int(5).kind(), ValueKind::Int);
        assert_eq!(Value::String("x".into()).kind(), ValueKind::String);
        assert_eq!(
            Value::SparseParcelableArray(BTreeMap::new()).kind(),
            ValueKind::SparseParcelableArray
        );
    }

    #[test]
    fn strings_fit_char_sequences() {
        let value = Value::String("x".into()).into_kind(ValueKind::CharSequence).unwrap();
        assert_eq!(value, Value::CharSequence("x".into()));
        assert!(Value::Int(1).into_kind(ValueKind::Long).is_err());
        assert!(Value::CharSequence("x".into()).into_kind(ValueKind::String).is_err());
    }

    #[test]
    fn numbers_are_range_checked() {
        assert_eq!(
            Value::from_json(ValueKind::Byte, "b", &json!(-12)).unwrap(),
            Value::Byte(-12)
        );
        let err = Value::from_json(ValueKind::Byte, "b", &json!(300)).unwrap_err();
        assert!(err.to_string().contains("'b'"));
        assert!(Value::from_json(ValueKind::Int, "i", &json!(1.5)).is_err());
    }

    #[test]
    fn char_arrays_accept_strings() {
        assert_eq!(
            Value::from_json(ValueKind::CharArray, "c", &json!("ab")).unwrap(),
            Value::CharArray(vec!['a', 'b'])
        );
        assert_eq!(
            Value::from_json(ValueKind::CharArray, "c", &json!(["a", "b"])).unwrap(),
            Value::CharArray(vec!['a', 'b'])
        );
        assert!(Value::from_json(ValueKind::Char, "c", &json!("ab")).is_err());
    }

    #[test]
    fn parcelables_need_a_class() {
        let value = Value::from_json(
            ValueKind::Parcelable,
            "p",
            &json!({"class": "com.example.User", "fields": {"id": 7}}),
        )
        .unwrap();
        assert_eq!(
            value,
            Value::Parcelable(ParcelObject::new("com.example.User").with_field("id", 7))
        );
        assert!(Value::from_json(ValueKind::Parcelable, "p", &json!({"id": 7})).is_err());
    }

    #[test]
    fn sparse_arrays_use_integer_keys() {
        let value = Value::from_json(
            ValueKind::SparseParcelableArray,
            "s",
            &json!({"3": {"class": "a.P"}}),
        )
        .unwrap();
        let Value::SparseParcelableArray(map) = &value else {
            panic!("wrong variant: {value:?}");
        };
        assert_eq!(map[&3].class_name, "a.P");
        assert_eq!(value.to_json(), json!({"3": {"class": "a.P", "fields": {}}}));
    }

    #[test]
    fn serializable_keeps_any_json() {
        let value = Value::from_json(ValueKind::Serializable, "s", &json!({"a": [1]})).unwrap();
        assert_eq!(value.to_json(), json!({"a": [1]}));
    }
}
