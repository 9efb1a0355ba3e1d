//! Mapped attributes: projecting a named attribute onto every leaf

use super::slot::Slot;
use super::structured::Structured;

/// Payloads that expose named attributes for projection.
///
/// Only consulted for names registered as mapped attributes on the container
/// and absent as slots.
pub trait Project {
    type Output;

    /// Value of attribute `name`, or `None` if this payload has no such attribute.
    fn project(&self, name: &str) -> Option<Self::Output>;
}

/// Result of [`Structured::attr`].
#[derive(Debug)]
pub enum Attribute<'a, T: Project> {
    /// The slot stored under the name.
    Slot(&'a Slot<T>),
    /// The attribute projected onto every leaf, same shape as the source.
    Mapped(Structured<T::Output>),
}

impl<'a, T: Project> Attribute<'a, T> {
    pub fn as_slot(&self) -> Option<&'a Slot<T>> {
        match self {
            Attribute::Slot(slot) => Some(slot),
            Attribute::Mapped(_) => None,
        }
    }

    pub fn into_mapped(self) -> Option<Structured<T::Output>> {
        match self {
            Attribute::Slot(_) => None,
            Attribute::Mapped(mapped) => Some(mapped),
        }
    }
}
