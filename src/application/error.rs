//! Application-level errors (wraps domain errors)

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::StructuredError;

/// Application errors wrap domain errors and add loading and settings context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Structured(#[from] StructuredError),

    #[error("unsupported document format: {0}")]
    UnsupportedFormat(PathBuf),

    #[error("cannot parse {format} document: {message}")]
    Parse {
        format: &'static str,
        message: String,
    },

    #[error("unsupported shape at `{path}`: {reason}")]
    UnsupportedShape { path: String, reason: String },

    #[error("config error: {message}")]
    Config { message: String },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ApplicationError {
    pub(crate) fn unsupported_shape(path: &str, reason: impl Into<String>) -> Self {
        Self::UnsupportedShape {
            path: if path.is_empty() { "<document>".into() } else { path.into() },
            reason: reason.into(),
        }
    }
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
