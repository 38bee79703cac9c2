//! Bundlewire - annotation-driven bundle bindings
//!
//! Two engines over a typed key-value [`Bundle`](runtime::Bundle):
//! - compile time: [`BindingResolver`] scans a [`ProgramModel`] for binding
//!   annotations and produces one inheritance-aware [`BindingSpec`] per host
//!   type, ready for a [`SourceEmitter`]
//! - run time: [`Binder`] compiles service methods into cached
//!   [`MethodFactory`](runtime::MethodFactory)s that fill bundles from
//!   arguments

pub mod binding;
pub mod catalog;
pub mod config;
pub mod diagnostics;
pub mod emit;
pub mod error;
pub mod model;
pub mod runtime;
pub mod types;

pub use binding::{BindingResolver, BindingSpec, FieldBinding, Resolution};
pub use catalog::ValueKind;
pub use config::BundlewireConfig;
pub use diagnostics::{Diagnostic, DiagnosticCode, Diagnostics};
pub use emit::{GeneratedFile, JavaEmitter, SourceEmitter};
pub use error::{BundleError, FixSuggestion, Result};
pub use model::{ProgramIndex, ProgramModel};
pub use runtime::{Binder, Bundle, FactoryCache, ServiceInterface, Value};
pub use types::{TypeHierarchy, TypeRef};
