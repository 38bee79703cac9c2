//! Binding Module - compile-time field bindings
//!
//! - `field`: one annotated field ([`FieldBinding`])
//! - `spec`: all bindings of one host type, linked to its bound ancestor ([`BindingSpec`])
//! - `resolve`: program-wide scan, validation and inheritance linking ([`BindingResolver`])
//!
//! Data flow:
//! ```text
//! ProgramModel ──► BindingResolver ──► Resolution { specs, diagnostics }
//!                                              │
//!                                   BindingSpec::brew(emitter)
//!                                              ▼
//!                                        GeneratedFile
//! ```

mod field;
mod resolve;
mod spec;

pub use field::FieldBinding;
pub use resolve::{BindingResolver, Resolution};
pub use spec::{BindingSpec, BindingSpecBuilder};
