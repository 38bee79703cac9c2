//! Program Model - what the resolver knows about the program
//!
//! The compile-time resolver never talks to a compiler directly. It asks a
//! [`ProgramModel`] for plain records:
//! - [`TypeElement`]: a declared type with its kind, modifiers and supertypes
//! - [`AnnotatedElement`]: a field or method parameter with its annotations
//!
//! Any semantic-analysis layer can implement the trait; [`ProgramIndex`] is
//! the in-memory implementation loaded from YAML.

mod program;

pub use program::ProgramIndex;

use serde::{Deserialize, Serialize};

use crate::types::{self, TypeRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    #[default]
    Class,
    Interface,
    Enum,
    Annotation,
    Record,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modifier {
    Public,
    Protected,
    Private,
    Static,
    Final,
    Abstract,
    Transient,
    Volatile,
}

/// One annotation as written on an element: `@IntValue(value = "k", desc = "..")`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationUse {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
}

impl AnnotationUse {
    /// Annotation without arguments, e.g. `@Required`.
    pub fn marker(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
            desc: None,
        }
    }

    /// Annotation with a `value`, e.g. `@IntValue("count")`.
    pub fn keyed(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
            desc: None,
        }
    }

    pub fn with_desc(mut self, desc: impl Into<String>) -> Self {
        self.desc = Some(desc.into());
        self
    }

    pub fn simple_name(&self) -> &str {
        types::simple_name(&self.name)
    }
}

/// A declared type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeElement {
    /// Fully qualified name
    pub name: String,
    pub kind: TypeKind,
    pub modifiers: Vec<Modifier>,
    pub superclass: Option<String>,
    pub interfaces: Vec<String>,
}

impl TypeElement {
    pub fn class(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: TypeKind::Class,
            modifiers: Vec::new(),
            superclass: None,
            interfaces: Vec::new(),
        }
    }

    pub fn extends(mut self, superclass: impl Into<String>) -> Self {
        self.superclass = Some(superclass.into());
        self
    }

    pub fn with_kind(mut self, kind: TypeKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.modifiers.push(modifier);
        self
    }

    pub fn has_modifier(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }
}

/// Where an annotated element lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Enclosing {
    /// A field of this type
    Type(String),
    /// A parameter of `owner.method`
    Method { owner: String, method: String },
}

impl Enclosing {
    pub fn owner(&self) -> &str {
        match self {
            Enclosing::Type(owner) | Enclosing::Method { owner, .. } => owner,
        }
    }
}

/// A field or parameter carrying annotations.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedElement {
    pub name: String,
    pub declared_type: TypeRef,
    pub modifiers: Vec<Modifier>,
    pub annotations: Vec<AnnotationUse>,
    pub enclosing: Enclosing,
}

impl AnnotatedElement {
    pub fn field(owner: impl Into<String>, name: impl Into<String>, declared_type: TypeRef) -> Self {
        Self {
            name: name.into(),
            declared_type,
            modifiers: Vec::new(),
            annotations: Vec::new(),
            enclosing: Enclosing::Type(owner.into()),
        }
    }

    pub fn annotated(mut self, annotation: AnnotationUse) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.modifiers.push(modifier);
        self
    }

    pub fn has_modifier(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }

    pub fn has_annotation(&self, name: &str) -> bool {
        let wanted = types::simple_name(name);
        self.annotations.iter().any(|a| a.simple_name() == wanted)
    }
}

/// Program-model provider consumed by the binding resolver.
pub trait ProgramModel {
    /// Every element bearing the annotation `name` (matched by simple name),
    /// in declaration order.
    fn elements_annotated_with(&self, name: &str) -> Vec<&AnnotatedElement>;

    fn type_element(&self, name: &str) -> Option<&TypeElement>;

    /// Superclass of `ty`, when it is part of the model.
    fn superclass_of(&self, ty: &TypeElement) -> Option<&TypeElement> {
        ty.superclass
            .as_deref()
            .and_then(|name| self.type_element(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn annotation_names_match_on_simple_name() {
        let element = AnnotatedElement::field("a.B", "count", TypeRef::parse("int").unwrap())
            .annotated(AnnotationUse::keyed("autobundle.annotation.IntValue", "count"));
        assert!(element.has_annotation("IntValue"));
        assert!(element.has_annotation("x.y.IntValue"));
        assert!(!element.has_annotation("LongValue"));
    }

    #[test]
    fn enclosing_owner() {
        let method = Enclosing::Method {
            owner: "a.Api".into(),
            method: "login".into(),
        };
        assert_eq!(method.owner(), "a.Api");
        assert_eq!(Enclosing::Type("a.B".into()).owner(), "a.B");
    }

    #[test]
    fn type_kind_parses_lowercase() {
        let kind: TypeKind = serde_yaml::from_str("interface").unwrap();
        assert_eq!(kind, TypeKind::Interface);
        let modifiers: Vec<Modifier> = serde_yaml::from_str("[private, static]").unwrap();
        assert_eq!(modifiers, vec![Modifier::Private, Modifier::Static]);
    }
}
