//! Domain layer: the structured container and its algorithms
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod builder;
pub mod dict;
pub mod error;
pub mod key;
pub mod project;
pub mod render;
pub mod slot;
pub mod structured;

pub use builder::StructuredBuilder;
pub use dict::{Dict, DictValue};
pub use error::{StructuredError, StructuredResult};
pub use key::{is_identifier, validate_key, Key, RESERVED_MARKER, ROOT};
pub use project::{Attribute, Project};
pub use render::Renderer;
pub use slot::{Leaf, Slot, SlotRef};
pub use structured::{Iter, Metadata, PrepareItem, SimplifyOptions, Simplified, Structured};
