//! Parameter handlers - one per method parameter
//!
//! A handler is the compiled form of a parameter annotation: which key to
//! write, what kind of value it takes, and whether it may be absent.

use serde::Serialize;

use super::bundle::Bundle;
use super::value::Value;
use crate::catalog::ValueKind;
use crate::error::{BundleError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterHandler {
    pub position: usize,
    pub kind: ValueKind,
    pub key: String,
    pub required: bool,
}

impl ParameterHandler {
    pub fn new(position: usize, kind: ValueKind, key: impl Into<String>, required: bool) -> Self {
        Self {
            position,
            kind,
            key: key.into(),
            required,
        }
    }

    /// Check one argument against this handler.
    ///
    /// Returns the value to write, converted to the handler's kind, or
    /// `None` when an optional argument is absent.
    pub fn prepare(&self, argument: Option<&Value>) -> Result<Option<Value>> {
        let Some(value) = argument else {
            if self.required {
                return Err(BundleError::MissingRequired {
                    key: self.key.clone(),
                });
            }
            return Ok(None);
        };
        value
            .clone()
            .into_kind(self.kind)
            .map(Some)
            .map_err(|value| BundleError::ArgumentType {
                position: self.position,
                key: self.key.clone(),
                expected: self.kind,
                actual: value.kind(),
            })
    }

    /// Write a prepared value under this handler's key.
    pub fn write(&self, bundle: &mut Bundle, value: Value) {
        bundle.put(self.key.clone(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_handlers_reject_absent_values() {
        let handler = ParameterHandler::new(0, ValueKind::Int, "a", true);
        let err = handler.prepare(None).unwrap_err();
        assert!(matches!(err, BundleError::MissingRequired { ref key } if key == "a"));
    }

    #[test]
    fn optional_absent_values_are_skipped() {
        let handler = ParameterHandler::new(1, ValueKind::StringArray, "tags", false);
        assert_eq!(handler.prepare(None).unwrap(), None);
    }

    #[test]
    fn values_are_written_with_the_handler_kind() {
        let handler = ParameterHandler::new(0, ValueKind::CharSequence, "title", false);
        let value = handler
            .prepare(Some(&Value::String("hi".into())))
            .unwrap()
            .unwrap();
        let mut bundle = Bundle::new();
        handler.write(&mut bundle, value);
        assert_eq!(bundle.kind_of("title"), Some(ValueKind::CharSequence));
    }

    #[test]
    fn mismatched_kinds_are_argument_errors() {
        let handler = ParameterHandler::new(2, ValueKind::Int, "a", false);
        let err = handler.prepare(Some(&Value::Long(1))).unwrap_err();
        assert!(matches!(
            err,
            BundleError::ArgumentType {
                position: 2,
                expected: ValueKind::Int,
                actual: ValueKind::Long,
                ..
            }
        ));
    }
}
