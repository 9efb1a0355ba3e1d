//! Order-preserving nested containers over an arbitrary payload type.
//!
//! See [`domain::Structured`] for the container itself; [`application`]
//! loads TOML/JSON documents into containers and [`cli`] drives the
//! `structured` binary.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod util;

pub use domain::{Key, Slot, SlotRef, Structured, StructuredError, StructuredResult};
