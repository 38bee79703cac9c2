//! Method descriptors - the reflected shape of a service method
//!
//! A [`MethodDescriptor`] is what a factory is compiled from. Its
//! [`MethodId`] (owner, name, erased parameter types) is the cache key, so
//! overloads get distinct factories.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::{AnnotationUse, TypeKind};
use crate::types::TypeRef;

/// Identity of a method: declaring type, name and parameter types.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodId {
    pub owner: String,
    pub name: String,
    pub parameter_types: Vec<TypeRef>,
}

impl fmt::Display for MethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.owner.is_empty() {
            write!(f, "{}(", self.name)?;
        } else {
            write!(f, "{}.{}(", self.owner, self.name)?;
        }
        for (i, ty) in self.parameter_types.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{ty}")?;
        }
        f.write_str(")")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParameterDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub declared_type: TypeRef,
    #[serde(default)]
    pub annotations: Vec<AnnotationUse>,
}

impl ParameterDescriptor {
    pub fn new(declared_type: TypeRef) -> Self {
        Self {
            name: None,
            declared_type,
            annotations: Vec::new(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn annotated(mut self, annotation: AnnotationUse) -> Self {
        self.annotations.push(annotation);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MethodDescriptor {
    /// Set by the program model when the method is attached to its type.
    #[serde(default, skip_serializing)]
    pub owner: String,
    pub name: String,
    #[serde(rename = "returns")]
    pub return_type: TypeRef,
    #[serde(default)]
    pub parameters: Vec<ParameterDescriptor>,
}

impl MethodDescriptor {
    pub fn new(owner: impl Into<String>, name: impl Into<String>, return_type: TypeRef) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            return_type,
            parameters: Vec::new(),
        }
    }

    pub fn param(mut self, parameter: ParameterDescriptor) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn id(&self) -> MethodId {
        MethodId {
            owner: self.owner.clone(),
            name: self.name.clone(),
            parameter_types: self
                .parameters
                .iter()
                .map(|p| p.declared_type.clone())
                .collect(),
        }
    }
}

/// A type whose methods can be called through a binder.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceInterface {
    pub name: String,
    pub kind: TypeKind,
    pub methods: Vec<MethodDescriptor>,
}

impl ServiceInterface {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: TypeKind::Interface,
            methods: Vec::new(),
        }
    }

    /// Add a method, taking ownership of it for this interface.
    pub fn method(mut self, mut method: MethodDescriptor) -> Self {
        method.owner = self.name.clone();
        self.methods.push(method);
        self
    }

    /// First method declared with `name`.
    pub fn method_named(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.iter().find(|m| m.name == name)
    }
}
