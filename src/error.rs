//! Error types with error codes and fix suggestions
//!
//! Error code ranges:
//! - BW-000-009: Input, program model and configuration errors
//! - BW-010-019: Method signature errors (factory compilation)
//! - BW-020-029: Invocation errors
//! - BW-030-039: Binder / service errors
//!
//! Compile-time binding problems are not errors: they are reported as
//! [`crate::diagnostics::Diagnostic`]s (BW-1xx) so one pass can surface many.

use thiserror::Error;

use crate::catalog::ValueKind;
use crate::runtime::MethodId;

pub type Result<T> = std::result::Result<T, BundleError>;

/// Trait for errors that provide fix suggestions
pub trait FixSuggestion {
    fn fix_suggestion(&self) -> Option<&str>;
}

#[derive(Error, Debug)]
pub enum BundleError {
    // ═══════════════════════════════════════════
    // INPUT ERRORS (000-009)
    // ═══════════════════════════════════════════
    #[error("[BW-001] Failed to parse program model: {details}")]
    ProgramParse { details: String },

    #[error("[BW-002] Invalid program model: {reason}")]
    InvalidProgram { reason: String },

    #[error("[BW-003] Invalid type '{input}': {reason}")]
    TypeParse { input: String, reason: String },

    #[error("[BW-004] Configuration error: {reason}")]
    ConfigError { reason: String },

    #[error("[BW-005] IO error: {0}")]
    Io(#[from] std::io::Error),

    // ═══════════════════════════════════════════
    // SIGNATURE ERRORS (010-019)
    // ═══════════════════════════════════════════
    #[error("[BW-010] Method {method} must return {expected}, found {actual}")]
    ReturnType {
        method: MethodId,
        expected: String,
        actual: String,
    },

    #[error("[BW-011] No binding annotation found. (parameter #{position} of {method})")]
    MissingAnnotation { method: MethodId, position: usize },

    #[error(
        "[BW-012] Multiple binding annotations found, only one allowed. (parameter #{position} of {method})"
    )]
    MultipleAnnotations { method: MethodId, position: usize },

    #[error(
        "[BW-013] @{annotation} requires {expected}, found {actual}. (parameter #{position} of {method})"
    )]
    ParameterType {
        method: MethodId,
        position: usize,
        annotation: &'static str,
        expected: String,
        actual: String,
    },

    #[error("[BW-014] @{annotation} has no key. (parameter #{position} of {method})")]
    MissingKey {
        method: MethodId,
        position: usize,
        annotation: &'static str,
    },

    // ═══════════════════════════════════════════
    // INVOCATION ERRORS (020-029)
    // ═══════════════════════════════════════════
    #[error("[BW-020] Argument count ({actual}) doesn't match expected count ({expected})")]
    ArgumentCount { expected: usize, actual: usize },

    #[error("[BW-021] Missing required value for key '{key}'")]
    MissingRequired { key: String },

    #[error("[BW-022] Argument #{position} for key '{key}' must be {expected:?}, found {actual:?}")]
    ArgumentType {
        position: usize,
        key: String,
        expected: ValueKind,
        actual: ValueKind,
    },

    #[error("[BW-023] Invalid argument for key '{key}': {reason}")]
    InvalidArgument { key: String, reason: String },

    // ═══════════════════════════════════════════
    // BINDER ERRORS (030-039)
    // ═══════════════════════════════════════════
    #[error("[BW-030] '{service}' is not an interface")]
    NotAnInterface { service: String },

    #[error("[BW-031] Service '{service}' has no method '{method}'")]
    UnknownMethod { service: String, method: String },

    #[error("[BW-032] A default binder is already installed")]
    AlreadyInstalled,

    #[error("[BW-033] Binding resolution failed with {count} error(s)")]
    ResolutionFailed { count: usize },
}

impl FixSuggestion for BundleError {
    fn fix_suggestion(&self) -> Option<&str> {
        match self {
            BundleError::ProgramParse { .. } => Some("Check YAML syntax: indentation and quoting"),
            BundleError::InvalidProgram { .. } => {
                Some("Use fully qualified names like com.example.LoginActivity")
            }
            BundleError::TypeParse { .. } => {
                Some("Write types as int, java.lang.String[] or java.util.ArrayList<java.lang.String>")
            }
            BundleError::ConfigError { .. } => Some("Check bundlewire.toml syntax"),
            BundleError::Io(_) => Some("Check file path and permissions"),
            BundleError::ReturnType { .. } => Some("Declare the method as returning android.os.Bundle"),
            BundleError::MissingAnnotation { .. } => {
                Some("Annotate every parameter with one binding annotation such as @IntValue(\"key\")")
            }
            BundleError::MultipleAnnotations { .. } => {
                Some("Keep a single binding annotation per parameter")
            }
            BundleError::ParameterType { .. } => {
                Some("Change the parameter type or pick the annotation matching its type")
            }
            BundleError::MissingKey { .. } => Some("Give the annotation a key: @StringValue(\"key\")"),
            BundleError::ArgumentCount { .. } => {
                Some("Pass exactly one argument per method parameter")
            }
            BundleError::MissingRequired { .. } => {
                Some("Pass a value or drop @Required from the parameter")
            }
            BundleError::ArgumentType { .. } => {
                Some("Pass a value of the kind the parameter annotation declares")
            }
            BundleError::InvalidArgument { .. } => {
                Some("Check the JSON shape of the argument (arrays for *Array kinds, objects for parcelables)")
            }
            BundleError::NotAnInterface { .. } => Some("Only interfaces can be turned into services"),
            BundleError::UnknownMethod { .. } => Some("Check the method name on the service interface"),
            BundleError::AlreadyInstalled => Some("Install the default binder once at startup"),
            BundleError::ResolutionFailed { .. } => Some("Fix the reported diagnostics and rerun"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_carry_codes() {
        let err = BundleError::MissingRequired { key: "a".into() };
        assert!(err.to_string().starts_with("[BW-021]"));
        assert!(err.to_string().contains("'a'"));
    }

    #[test]
    fn every_variant_has_a_suggestion() {
        let errors = [
            BundleError::ArgumentCount { expected: 3, actual: 2 },
            BundleError::AlreadyInstalled,
            BundleError::NotAnInterface { service: "x.Y".into() },
        ];
        for err in &errors {
            assert!(err.fix_suggestion().is_some(), "{err}");
        }
    }
}
