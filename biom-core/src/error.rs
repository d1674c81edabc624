//! Structured error types for the BIOM crates.

use thiserror::Error;

/// The two broad classes every [`BiomError`] falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A value had the wrong runtime type for the field it was assigned to.
    Type,
    /// A well-typed value violated a data invariant.
    Domain,
}

/// Unified error type for all BIOM table operations.
#[derive(Debug, Error)]
pub enum BiomError {
    /// Wrong runtime type for a field (e.g. a number assigned to `id`).
    #[error("type error: {0}")]
    Type(String),

    /// A row or column id that is not present on its axis.
    #[error("unknown {axis} id: {id}")]
    UnknownId { axis: &'static str, id: String },

    /// An id that appears more than once on one axis.
    #[error("duplicate {axis} id: {id}")]
    DuplicateId { axis: &'static str, id: String },

    /// A value outside a field's controlled vocabulary.
    #[error("{field} must be part of the controlled vocabulary, got {value:?}")]
    Vocabulary { field: &'static str, value: String },

    /// A sequence whose length does not match the axis it is applied to.
    #[error("length mismatch for {what}: expected {expected}, got {actual}")]
    LengthMismatch {
        what: String,
        expected: usize,
        actual: usize,
    },

    /// Matrix payload inconsistent with the table shape.
    #[error("shape error: {0}")]
    Shape(String),

    /// Bad combination of call arguments.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Malformed JSON text.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Input was not JSON and no conversion service was available to try.
    #[error("input is not valid JSON and no conversion service is configured: {0}")]
    NotJson(String),

    /// The conversion service failed or reported an error.
    #[error("conversion service error: {0}")]
    Conversion(String),
}

impl BiomError {
    /// Classify this error as a type error or a domain error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            BiomError::Type(_) => ErrorKind::Type,
            _ => ErrorKind::Domain,
        }
    }

    /// Shorthand for a length mismatch.
    pub fn length_mismatch(what: impl Into<String>, expected: usize, actual: usize) -> Self {
        BiomError::LengthMismatch {
            what: what.into(),
            expected,
            actual,
        }
    }
}

/// Convenience alias used throughout the BIOM crates.
pub type Result<T> = std::result::Result<T, BiomError>;
