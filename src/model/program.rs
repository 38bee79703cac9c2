//! YAML-backed program model
//!
//! ```yaml
//! types:
//!   - name: com.example.LoginActivity
//!     superclass: com.example.BaseActivity
//!     fields:
//!       - name: userId
//!         type: int
//!         annotations:
//!           - { name: IntValue, value: user_id }
//!           - { name: Required }
//!   - name: com.example.Bundles
//!     kind: interface
//!     methods:
//!       - name: login
//!         returns: android.os.Bundle
//!         parameters:
//!           - { name: user, type: java.lang.String, annotations: [{ name: StringValue, value: user }] }
//! ```

use std::path::Path;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use super::{AnnotatedElement, AnnotationUse, Enclosing, Modifier, ProgramModel, TypeElement, TypeKind};
use crate::error::{BundleError, Result};
use crate::runtime::{MethodDescriptor, ServiceInterface};
use crate::types::{TypeRef, TypeTable};

static QUALIFIED_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*(\.[A-Za-z_$][A-Za-z0-9_$]*)*$").unwrap()
});

static IDENTIFIER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").unwrap());

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProgramFile {
    #[serde(default)]
    types: Vec<TypeDecl>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TypeDecl {
    name: String,
    #[serde(default)]
    kind: TypeKind,
    #[serde(default)]
    modifiers: Vec<Modifier>,
    superclass: Option<String>,
    #[serde(default)]
    interfaces: Vec<String>,
    #[serde(default)]
    fields: Vec<FieldDecl>,
    #[serde(default)]
    methods: Vec<MethodDescriptor>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FieldDecl {
    name: String,
    #[serde(rename = "type")]
    declared_type: TypeRef,
    #[serde(default)]
    modifiers: Vec<Modifier>,
    #[serde(default)]
    annotations: Vec<AnnotationUse>,
}

/// In-memory [`ProgramModel`] with its own type hierarchy.
#[derive(Debug, Clone)]
pub struct ProgramIndex {
    types: IndexMap<String, TypeElement>,
    elements: Vec<AnnotatedElement>,
    methods: IndexMap<String, Vec<MethodDescriptor>>,
    hierarchy: TypeTable,
}

impl Default for ProgramIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgramIndex {
    /// Empty program on top of the JDK/Android type facts.
    pub fn new() -> Self {
        Self {
            types: IndexMap::new(),
            elements: Vec::new(),
            methods: IndexMap::new(),
            hierarchy: TypeTable::jdk(),
        }
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let file: ProgramFile =
            serde_yaml::from_str(yaml).map_err(|e| BundleError::ProgramParse {
                details: e.to_string(),
            })?;

        let mut index = Self::new();
        for decl in file.types {
            let owner = decl.name.clone();
            index.add_type(TypeElement {
                name: decl.name,
                kind: decl.kind,
                modifiers: decl.modifiers,
                superclass: decl.superclass,
                interfaces: decl.interfaces,
            })?;
            for field in decl.fields {
                index.add_element(AnnotatedElement {
                    name: field.name,
                    declared_type: field.declared_type,
                    modifiers: field.modifiers,
                    annotations: field.annotations,
                    enclosing: Enclosing::Type(owner.clone()),
                })?;
            }
            for method in decl.methods {
                index.add_method(&owner, method)?;
            }
        }
        Ok(index)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }

    /// Declare a type. Its superclass and interfaces join the hierarchy.
    pub fn add_type(&mut self, ty: TypeElement) -> Result<()> {
        check_qualified(&ty.name)?;
        if let Some(superclass) = &ty.superclass {
            check_qualified(superclass)?;
        }
        for interface in &ty.interfaces {
            check_qualified(interface)?;
        }
        if self.types.contains_key(&ty.name) {
            return Err(BundleError::InvalidProgram {
                reason: format!("type '{}' is declared twice", ty.name),
            });
        }

        self.hierarchy.declare(
            ty.name.clone(),
            ty.superclass.iter().chain(&ty.interfaces).cloned(),
        );
        self.types.insert(ty.name.clone(), ty);
        Ok(())
    }

    /// Add an annotated field or parameter. Its enclosing type must exist.
    pub fn add_element(&mut self, element: AnnotatedElement) -> Result<()> {
        check_identifier(&element.name)?;
        let owner = element.enclosing.owner();
        if !self.types.contains_key(owner) {
            return Err(BundleError::InvalidProgram {
                reason: format!("'{}' belongs to undeclared type '{}'", element.name, owner),
            });
        }
        self.elements.push(element);
        Ok(())
    }

    /// Add a method to a declared type; its parameters become annotated
    /// elements enclosed by the method.
    pub fn add_method(&mut self, owner: &str, mut method: MethodDescriptor) -> Result<()> {
        check_identifier(&method.name)?;
        method.owner = owner.to_string();
        for (position, parameter) in method.parameters.iter().enumerate() {
            let name = parameter
                .name
                .clone()
                .unwrap_or_else(|| format!("arg{position}"));
            self.add_element(AnnotatedElement {
                name,
                declared_type: parameter.declared_type.clone(),
                modifiers: Vec::new(),
                annotations: parameter.annotations.clone(),
                enclosing: Enclosing::Method {
                    owner: owner.to_string(),
                    method: method.name.clone(),
                },
            })?;
        }
        self.methods.entry(owner.to_string()).or_default().push(method);
        Ok(())
    }

    pub fn hierarchy(&self) -> &TypeTable {
        &self.hierarchy
    }

    pub fn types(&self) -> impl Iterator<Item = &TypeElement> {
        self.types.values()
    }

    pub fn elements(&self) -> &[AnnotatedElement] {
        &self.elements
    }

    /// The methods of `name` as a service interface.
    pub fn service(&self, name: &str) -> Result<ServiceInterface> {
        let ty = self.types.get(name).ok_or_else(|| BundleError::InvalidProgram {
            reason: format!("unknown type '{name}'"),
        })?;
        let methods = self.methods.get(name).cloned().unwrap_or_default();
        Ok(ServiceInterface {
            name: ty.name.clone(),
            kind: ty.kind,
            methods,
        })
    }
}

fn check_qualified(name: &str) -> Result<()> {
    if QUALIFIED_NAME_RE.is_match(name) {
        Ok(())
    } else {
        Err(BundleError::InvalidProgram {
            reason: format!("'{name}' is not a valid qualified name"),
        })
    }
}

fn check_identifier(name: &str) -> Result<()> {
    if IDENTIFIER_RE.is_match(name) {
        Ok(())
    } else {
        Err(BundleError::InvalidProgram {
            reason: format!("'{name}' is not a valid identifier"),
        })
    }
}

impl ProgramModel for ProgramIndex {
    fn elements_annotated_with(&self, name: &str) -> Vec<&AnnotatedElement> {
        self.elements
            .iter()
            .filter(|element| element.has_annotation(name))
            .collect()
    }

    fn type_element(&self, name: &str) -> Option<&TypeElement> {
        self.types.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{is_subtype, TypeHierarchy};

    const PROGRAM: &str = r#"
types:
  - name: com.example.BaseActivity
    superclass: android.app.Activity
    fields:
      - name: token
        type: java.lang.String
        annotations:
          - { name: StringValue, value: token }
  - name: com.example.LoginActivity
    superclass: com.example.BaseActivity
    interfaces: [java.io.Serializable]
    fields:
      - name: userId
        type: int
        annotations:
          - { name: IntValue, value: user_id, desc: "signed-in user" }
          - { name: Required }
  - name: com.example.Bundles
    kind: interface
    methods:
      - name: login
        returns: android.os.Bundle
        parameters:
          - name: user
            type: java.lang.String
            annotations: [{ name: StringValue, value: user }]
"#;

    #[test]
    fn loads_types_fields_and_methods() {
        let index = ProgramIndex::from_yaml(PROGRAM).unwrap();
        assert_eq!(index.types().count(), 3);
        assert_eq!(index.elements().len(), 3);

        let login = index.type_element("com.example.LoginActivity").unwrap();
        assert_eq!(login.superclass.as_deref(), Some("com.example.BaseActivity"));
        let base = index.superclass_of(login).unwrap();
        assert_eq!(base.name, "com.example.BaseActivity");
        assert!(index.superclass_of(base).is_none());
    }

    #[test]
    fn method_parameters_are_enclosed_by_their_method() {
        let index = ProgramIndex::from_yaml(PROGRAM).unwrap();
        let strings = index.elements_annotated_with("StringValue");
        assert_eq!(strings.len(), 2);
        assert!(matches!(
            &strings[1].enclosing,
            Enclosing::Method { owner, method } if owner == "com.example.Bundles" && method == "login"
        ));
    }

    #[test]
    fn service_collects_methods_with_owner() {
        let index = ProgramIndex::from_yaml(PROGRAM).unwrap();
        let service = index.service("com.example.Bundles").unwrap();
        assert_eq!(service.kind, TypeKind::Interface);
        assert_eq!(service.methods.len(), 1);
        assert_eq!(service.methods[0].owner, "com.example.Bundles");
        assert!(index.service("com.example.Missing").is_err());
    }

    #[test]
    fn declared_types_join_the_hierarchy() {
        let index = ProgramIndex::from_yaml(PROGRAM).unwrap();
        let hierarchy = index.hierarchy();
        assert_eq!(
            hierarchy.direct_supertypes("com.example.LoginActivity"),
            &["com.example.BaseActivity".to_string(), "java.io.Serializable".to_string()]
        );
        assert!(is_subtype(hierarchy, "com.example.LoginActivity", "java.io.Serializable"));
    }

    #[test]
    fn rejects_bad_names_and_duplicates() {
        let bad_type = "types:\n  - name: com..Broken\n";
        assert!(matches!(
            ProgramIndex::from_yaml(bad_type),
            Err(BundleError::InvalidProgram { .. })
        ));

        let duplicate = "types:\n  - name: a.B\n  - name: a.B\n";
        assert!(ProgramIndex::from_yaml(duplicate).is_err());

        let bad_field = "types:\n  - name: a.B\n    fields:\n      - { name: \"not valid\", type: int }\n";
        assert!(ProgramIndex::from_yaml(bad_field).is_err());
    }

    #[test]
    fn reports_yaml_errors() {
        let err = ProgramIndex::from_yaml("types: [").unwrap_err();
        assert!(err.to_string().contains("BW-001"));

        let bad_type = "types:\n  - name: a.B\n    fields:\n      - { name: x, type: \"int<\" }\n";
        assert!(ProgramIndex::from_yaml(bad_type).is_err());
    }

    #[test]
    fn elements_need_a_declared_owner() {
        let mut index = ProgramIndex::new();
        let orphan = AnnotatedElement::field("a.Missing", "x", TypeRef::parse("int").unwrap());
        assert!(index.add_element(orphan).is_err());
    }
}
