//! Build-time and construction-time error types.
//!
//! Build errors abort the compilation of a whole schema. Validation errors are
//! collected into a [`ValidationErrors`] batch so every problem with a set of
//! arguments can be reported at once.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors raised while compiling a JSON Schema into model definitions.
#[derive(Debug, Error)]
pub enum BuildError {
    /// A `$ref` pointer is non-local or names a segment that does not exist.
    #[error("Unresolved reference '{pointer}'{}", describe_segment(.segment, .available))]
    UnresolvedReference {
        /// The pointer as written in the schema.
        pointer: String,
        /// The segment that could not be found, `None` for non-local pointers.
        segment: Option<String>,
        /// Keys (or indices) available where the lookup failed.
        available: Vec<String>,
    },

    /// A keyword combination outside the supported subset.
    #[error("Unsupported schema construct at '{path}': {message}")]
    UnsupportedSchemaConstruct {
        /// Where in the document the construct was found.
        path: String,
        /// What was wrong with it.
        message: String,
    },

    /// Two distinct sources derive the same identifier.
    #[error("Naming collision in {scope}: '{existing}' and '{incoming}' both map to '{identifier}'")]
    NamingCollision {
        /// The namespace the clash happened in (enum, model fields, models).
        scope: String,
        /// The derived identifier both sources produce.
        identifier: String,
        /// The source that claimed the identifier first.
        existing: String,
        /// The source that clashed with it.
        incoming: String,
    },

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn describe_segment(segment: &Option<String>, available: &[String]) -> String {
    match segment {
        None => ": only local references are supported".to_string(),
        Some(segment) if available.is_empty() => format!(": could not find '{segment}'"),
        Some(segment) => format!(
            ": could not find '{segment}' (available: {})",
            available.join(", ")
        ),
    }
}

fn join_variants(expected: &[String]) -> String {
    expected.join(" | ")
}

impl BuildError {
    /// Create an unresolved reference error for a missing segment.
    #[must_use]
    pub fn missing_segment(
        pointer: impl Into<String>,
        segment: impl Into<String>,
        available: Vec<String>,
    ) -> Self {
        Self::UnresolvedReference {
            pointer: pointer.into(),
            segment: Some(segment.into()),
            available,
        }
    }

    /// Create an unresolved reference error for a non-local pointer.
    #[must_use]
    pub fn non_local(pointer: impl Into<String>) -> Self {
        Self::UnresolvedReference {
            pointer: pointer.into(),
            segment: None,
            available: Vec::new(),
        }
    }

    /// Create an unsupported construct error.
    #[must_use]
    pub fn unsupported(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UnsupportedSchemaConstruct {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a naming collision error.
    #[must_use]
    pub fn collision(
        scope: impl Into<String>,
        identifier: impl Into<String>,
        existing: impl Into<String>,
        incoming: impl Into<String>,
    ) -> Self {
        Self::NamingCollision {
            scope: scope.into(),
            identifier: identifier.into(),
            existing: existing.into(),
            incoming: incoming.into(),
        }
    }

    /// Check if this is an unresolved reference error.
    #[must_use]
    pub fn is_unresolved_reference(&self) -> bool {
        matches!(self, Self::UnresolvedReference { .. })
    }

    /// Check if this is a naming collision.
    #[must_use]
    pub fn is_naming_collision(&self) -> bool {
        matches!(self, Self::NamingCollision { .. })
    }
}

/// Result type for schema compilation.
pub type BuildResult<T> = Result<T, BuildError>;

/// Kind of a single validation failure, without its details.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationErrorKind {
    /// A required field was absent.
    MissingRequiredField,
    /// A value did not have the expected type.
    TypeMismatch,
    /// No member of a union accepted the value.
    UnionNoVariantMatched,
    /// A key was supplied that a closed model does not declare.
    UnexpectedField,
}

/// A single violation found while constructing an instance.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationError {
    /// A required field was absent.
    #[error("{path}: field required")]
    MissingRequiredField {
        /// Location of the field.
        path: String,
    },

    /// A value did not have the expected type.
    #[error("{path}: expected {expected}, got {actual}")]
    TypeMismatch {
        /// Location of the value.
        path: String,
        /// Description of the expected type.
        expected: String,
        /// Description of the value actually found.
        actual: String,
    },

    /// No member of a union accepted the value.
    #[error("{path}: value did not match any of {}", join_variants(.expected))]
    UnionNoVariantMatched {
        /// Location of the value.
        path: String,
        /// Descriptions of every variant that was tried, in order.
        expected: Vec<String>,
    },

    /// A key was supplied that a closed model does not declare.
    #[error("{path}: extra fields not permitted")]
    UnexpectedField {
        /// Location of the unexpected key.
        path: String,
    },
}

impl ValidationError {
    /// Location of the violation, e.g. `address.lines[2]`.
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::MissingRequiredField { path }
            | Self::TypeMismatch { path, .. }
            | Self::UnionNoVariantMatched { path, .. }
            | Self::UnexpectedField { path } => path,
        }
    }

    /// The kind of this violation.
    #[must_use]
    pub fn kind(&self) -> ValidationErrorKind {
        match self {
            Self::MissingRequiredField { .. } => ValidationErrorKind::MissingRequiredField,
            Self::TypeMismatch { .. } => ValidationErrorKind::TypeMismatch,
            Self::UnionNoVariantMatched { .. } => ValidationErrorKind::UnionNoVariantMatched,
            Self::UnexpectedField { .. } => ValidationErrorKind::UnexpectedField,
        }
    }
}

/// Every violation found while constructing one instance.
///
/// Never empty: a construction that produced no violations succeeds instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors {
    /// Name of the model that rejected the input.
    pub model: String,
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub(crate) fn new(model: impl Into<String>, errors: Vec<ValidationError>) -> Self {
        debug_assert!(!errors.is_empty());
        Self {
            model: model.into(),
            errors,
        }
    }

    /// The individual violations, in the order they were found.
    #[must_use]
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Number of violations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Always false; kept for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Iterate over the violations.
    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.errors.iter()
    }

    /// Count the violations of a given kind.
    #[must_use]
    pub fn count(&self, kind: ValidationErrorKind) -> usize {
        self.errors.iter().filter(|e| e.kind() == kind).count()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let noun = if self.errors.len() == 1 { "error" } else { "errors" };
        write!(
            f,
            "{} validation {} for {}",
            self.errors.len(),
            noun,
            self.model
        )?;
        for err in &self.errors {
            write!(f, "\n  {err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}
