//! Application layer: document loading and payload types
//!
//! This layer turns TOML/JSON documents into structured containers.

pub mod document;
pub mod error;
pub mod error_ext;
pub mod scalar;

pub use document::{Document, Format};
pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::{IoResultExt, ParseResultExt};
pub use scalar::Scalar;
