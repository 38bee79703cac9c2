//! Field binding - one annotated field of a host type

use serde::Serialize;

use crate::catalog::ValueKind;
use crate::types::TypeRef;

/// How one field maps to one container key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldBinding {
    pub name: String,
    pub kind: ValueKind,
    pub key: String,
    pub declared_type: TypeRef,
    pub required: bool,
    /// Free-form `desc` of the annotation, empty when absent
    pub description: String,
}

impl FieldBinding {
    pub fn new(
        name: impl Into<String>,
        kind: ValueKind,
        key: impl Into<String>,
        declared_type: TypeRef,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            key: key.into(),
            declared_type,
            required: false,
            description: String::new(),
        }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}
