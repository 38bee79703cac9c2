//! Compile-time diagnostics
//!
//! The resolver reports problems against the offending element and keeps
//! going, so a single pass can surface every broken binding. Codes live in
//! the BW-100 range to keep them apart from [`crate::error::BundleError`].

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DiagnosticCode {
    /// Binding could not be read (unknown host, missing key)
    UnparsableBinding,
    /// Field is private or static
    InaccessibleField,
    /// Host is not a class
    NotInClass,
    /// Host class is private
    PrivateHost,
    /// Host lives in a reserved framework namespace
    ReservedNamespace,
    /// Container key already bound in the same host
    DuplicateKey,
    /// Field already bound by another annotation
    DuplicateName,
    /// Superclass chain loops back on itself
    SuperclassCycle,
    /// Generated source could not be written
    WriteFailed,
}

impl DiagnosticCode {
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticCode::UnparsableBinding => "BW-100",
            DiagnosticCode::InaccessibleField => "BW-101",
            DiagnosticCode::NotInClass => "BW-102",
            DiagnosticCode::PrivateHost => "BW-103",
            DiagnosticCode::ReservedNamespace => "BW-104",
            DiagnosticCode::DuplicateKey => "BW-110",
            DiagnosticCode::DuplicateName => "BW-111",
            DiagnosticCode::SuperclassCycle => "BW-120",
            DiagnosticCode::WriteFailed => "BW-130",
        }
    }

    /// How to fix it
    pub fn help(self) -> &'static str {
        match self {
            DiagnosticCode::UnparsableBinding => {
                "Give the annotation a key and make sure its class is part of the program"
            }
            DiagnosticCode::InaccessibleField => "Drop 'private'/'static' from the field",
            DiagnosticCode::NotInClass => "Move the field into a class",
            DiagnosticCode::PrivateHost => "Make the enclosing class at least package-private",
            DiagnosticCode::ReservedNamespace => "Move the class out of the framework package",
            DiagnosticCode::DuplicateKey => "Use a distinct key for each field of a class",
            DiagnosticCode::DuplicateName => "Keep a single binding annotation per field",
            DiagnosticCode::SuperclassCycle => "Break the cycle in the superclass declarations",
            DiagnosticCode::WriteFailed => "Check the output directory is writable",
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reported problem, attached to `host.element`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: DiagnosticCode,
    pub message: String,
    /// Qualified name of the enclosing type
    pub host: String,
    /// Offending element; `None` for diagnostics about the whole type
    pub element: Option<String>,
}

impl Diagnostic {
    pub fn error(code: DiagnosticCode, host: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
            host: host.into(),
            element: None,
        }
    }

    pub fn on(mut self, element: impl Into<String>) -> Self {
        self.element = Some(element.into());
        self
    }

    /// `host.element` or just `host`
    pub fn location(&self) -> String {
        match &self.element {
            Some(element) => format!("{}.{}", self.host, element),
            None => self.host.clone(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}] {}: {}",
            self.severity,
            self.code,
            self.location(),
            self.message
        )
    }
}

/// Collected diagnostics of one resolution pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        tracing::debug!(code = %diagnostic.code, location = %diagnostic.location(), "{}", diagnostic.message);
        self.items.push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    pub fn error_count(&self) -> usize {
        self.items
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    /// Diagnostics with the given code
    pub fn with_code(&self, code: DiagnosticCode) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(move |d| d.code == code)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
