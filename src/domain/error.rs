//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Errors raised by container operations.
///
/// Every variant is reported at the call that violated the contract; a failing
/// operation never leaves the container partially modified.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructuredError {
    #[error("invalid key `{key}`: {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("this container does not have structure @ `{name}`")]
    AttributeNotFound { name: String },

    #[error("this container does not have structure @ {key}")]
    KeyNotFound { key: String },

    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// Raised by a root group when delegated an index past its end.
    #[error("index {index} out of range for group of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// Raised by a root payload that cannot answer the delegated key.
    #[error("{kind} payload cannot be indexed by {key}")]
    NotIndexable { key: String, kind: &'static str },
}

impl StructuredError {
    pub(crate) fn invalid_key(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidKey {
            key: key.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn attribute_not_found(name: impl Into<String>) -> Self {
        Self::AttributeNotFound { name: name.into() }
    }

    /// True for the two lookup failures (attribute and bracket).
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::AttributeNotFound { .. } | Self::KeyNotFound { .. }
        )
    }
}

/// Result type for domain operations.
pub type StructuredResult<T> = Result<T, StructuredError>;
