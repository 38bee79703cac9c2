//! Bundle - the key-value container every factory fills
//!
//! Entries keep insertion order. A key holds exactly one value; putting a
//! key again replaces the previous value, like the Android container does.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value as JsonValue;

use super::value::Value;
use crate::catalog::ValueKind;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Bundle {
    entries: IndexMap<String, Value>,
}

impl Bundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, key: impl Into<String>, value: Value) {
        self.entries.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Kind of the value stored under `key`.
    pub fn kind_of(&self, key: &str) -> Option<ValueKind> {
        self.entries.get(key).map(Value::kind)
    }

    pub fn get_boolean(&self, key: &str) -> Option<bool> {
        match self.entries.get(key) {
            Some(Value::Boolean(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn get_int(&self, key: &str) -> Option<i32> {
        match self.entries.get(key) {
            Some(Value::Int(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn get_long(&self, key: &str) -> Option<i64> {
        match self.entries.get(key) {
            Some(Value::Long(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn get_double(&self, key: &str) -> Option<f64> {
        match self.entries.get(key) {
            Some(Value::Double(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn get_string(&self, key: &str) -> Option<&str> {
        match self.entries.get(key) {
            Some(Value::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Strings are char sequences too.
    pub fn get_char_sequence(&self, key: &str) -> Option<&str> {
        match self.entries.get(key) {
            Some(Value::CharSequence(s) | Value::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_json(&self) -> JsonValue {
        JsonValue::Object(
            self.entries
                .iter()
                .map(|(key, value)| (key.clone(), value.to_json()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn typed_getters_check_the_variant() {
        let mut bundle = Bundle::new();
        bundle.put("a", Value::Int(5));
        bundle.put("b", Value::String("x".into()));

        assert_eq!(bundle.get_int("a"), Some(5));
        assert_eq!(bundle.get_long("a"), None);
        assert_eq!(bundle.get_string("b"), Some("x"));
        assert_eq!(bundle.get_char_sequence("b"), Some("x"));
        assert_eq!(bundle.kind_of("b"), Some(ValueKind::String));
        assert!(bundle.get("missing").is_none());
    }

    #[test]
    fn put_replaces_and_keeps_order() {
        let mut bundle = Bundle::new();
        bundle.put("first", Value::Boolean(true));
        bundle.put("second", Value::Long(2));
        bundle.put("first", Value::Boolean(false));

        assert_eq!(bundle.len(), 2);
        assert_eq!(bundle.keys().collect::<Vec<_>>(), vec!["first", "second"]);
        assert_eq!(bundle.get_boolean("first"), Some(false));
    }

    #[test]
    fn serializes_as_a_plain_object() {
        let mut bundle = Bundle::new();
        bundle.put("a", Value::Int(5));
        bundle.put("tags", Value::StringArrayList(vec!["x".into()]));
        assert_eq!(bundle.to_json(), json!({"a": 5, "tags": ["x"]}));
        assert_eq!(serde_json::to_value(&bundle).unwrap(), bundle.to_json());
    }
}
