//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Why a raw string could not be turned into a [`crate::NodePath`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("path is empty")]
    Empty,

    #[error("path '{raw}' has an empty segment at position {position}")]
    EmptySegment { raw: String, position: usize },

    #[error("segment '{0}' contains a path delimiter")]
    InvalidSegment(String),
}

/// Domain-level error.
///
/// Deterministic input failures only. Storage and transport faults belong to
/// the layers that own those collaborators.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A field failed validation.
    #[error("validation failed for '{field}': {detail}")]
    Validation { field: &'static str, detail: String },

    #[error("invalid path: {0}")]
    InvalidPath(#[from] PathError),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn validation(field: &'static str, detail: impl Into<String>) -> Self {
        Self::Validation {
            field,
            detail: detail.into(),
        }
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }
}
