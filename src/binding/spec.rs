//! Binding specification - all field bindings of one host type
//!
//! A specification optionally links to the specification of its nearest
//! bound ancestor. The link is an `Arc` to a finished specification: parents
//! are always built before their children.

use std::sync::Arc;

use serde::Serialize;

use super::field::FieldBinding;
use crate::emit::{GeneratedFile, SourceEmitter};
use crate::types;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BindingSpec {
    host: String,
    fields: Vec<FieldBinding>,
    #[serde(serialize_with = "serialize_parent")]
    parent: Option<Arc<BindingSpec>>,
}

fn serialize_parent<S>(parent: &Option<Arc<BindingSpec>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match parent {
        Some(parent) => serializer.serialize_some(parent.host()),
        None => serializer.serialize_none(),
    }
}

impl BindingSpec {
    pub fn builder(host: impl Into<String>) -> BindingSpecBuilder {
        BindingSpecBuilder::new(host)
    }

    /// Qualified name of the host type
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn simple_name(&self) -> &str {
        types::simple_name(&self.host)
    }

    pub fn package(&self) -> &str {
        types::package_name(&self.host)
    }

    /// Host path inside its package; `Outer.Inner` for nested types.
    pub fn class_path(&self) -> &str {
        types::class_path(&self.host)
    }

    /// Bindings declared on the host itself, in discovery order
    pub fn fields(&self) -> &[FieldBinding] {
        &self.fields
    }

    pub fn parent(&self) -> Option<&Arc<BindingSpec>> {
        self.parent.as_ref()
    }

    /// Nearest ancestor first
    pub fn ancestors(&self) -> impl Iterator<Item = &BindingSpec> {
        std::iter::successors(self.parent.as_deref(), |spec| spec.parent.as_deref())
    }

    pub fn field_by_key(&self, key: &str) -> Option<&FieldBinding> {
        self.fields.iter().find(|field| field.key == key)
    }

    /// Hand the specification to a source emitter.
    pub fn brew<E: SourceEmitter + ?Sized>(&self, emitter: &E) -> GeneratedFile {
        emitter.emit(self)
    }
}

/// Accumulates fields while the resolver scans elements.
#[derive(Debug, Clone)]
pub struct BindingSpecBuilder {
    host: String,
    fields: Vec<FieldBinding>,
    parent: Option<Arc<BindingSpec>>,
}

impl BindingSpecBuilder {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            fields: Vec::new(),
            parent: None,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn find_by_key(&self, key: &str) -> Option<&FieldBinding> {
        self.fields.iter().find(|field| field.key == key)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&FieldBinding> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn add_field(&mut self, field: FieldBinding) -> &mut Self {
        self.fields.push(field);
        self
    }

    pub fn set_parent(&mut self, parent: Arc<BindingSpec>) -> &mut Self {
        self.parent = Some(parent);
        self
    }

    pub fn build(self) -> BindingSpec {
        BindingSpec {
            host: self.host,
            fields: self.fields,
            parent: self.parent,
        }
    }
}
