//! Error conversion helpers for reading and parsing documents
//!
//! I/O failures get the path attached, parser failures the format name.

use std::fmt::Display;
use std::io;
use std::path::Path;

use crate::application::{ApplicationError, ApplicationResult};

/// Extension trait for converting `io::Result` to `ApplicationResult` with context.
pub trait IoResultExt<T> {
    /// Add path context to an I/O error.
    ///
    /// # Example
    /// ```ignore
    /// fs::read_to_string(&path).with_path_context("read document", &path)?;
    /// ```
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::OperationFailed {
            context: format!("{}: {}", action, path.display()),
            source: Box::new(e),
        })
    }
}

/// Extension trait for parser results (`toml`, `serde_json`).
pub trait ParseResultExt<T> {
    /// Report a parser error as [`ApplicationError::Parse`] for `format`.
    fn for_format(self, format: &'static str) -> ApplicationResult<T>;
}

impl<T, E: Display> ParseResultExt<T> for Result<T, E> {
    fn for_format(self, format: &'static str) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::Parse {
            format,
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_missing_file_when_reading_then_context_names_path() {
        let path = Path::new("/nonexistent/structured/doc.toml");
        let err = std::fs::read_to_string(path)
            .with_path_context("read document", path)
            .unwrap_err();
        assert!(err.to_string().contains("read document: /nonexistent/structured/doc.toml"));
    }

    #[test]
    fn given_parser_error_when_converted_then_keeps_format_and_message() {
        let err = serde_json::from_str::<serde_json::Value>("{")
            .for_format("json")
            .unwrap_err();
        assert!(matches!(err, ApplicationError::Parse { format: "json", message } if !message.is_empty()));
    }
}
