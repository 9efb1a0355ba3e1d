//! Slot payloads: a value, a one-level group of values, or a nested container

use serde::ser::{Serialize, SerializeSeq, Serializer};

use super::structured::Structured;

/// Contents of one named storage location.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot<T> {
    Value(T),
    /// Ordered group of values; groups never hold containers.
    Group(Vec<T>),
    Nested(Structured<T>),
}

impl<T> Slot<T> {
    pub fn value(value: T) -> Self {
        Slot::Value(value)
    }

    pub fn group(values: impl IntoIterator<Item = T>) -> Self {
        Slot::Group(values.into_iter().collect())
    }

    pub fn nested(structured: Structured<T>) -> Self {
        Slot::Nested(structured)
    }

    /// Borrowed view of this slot.
    pub fn as_ref(&self) -> SlotRef<'_, T> {
        match self {
            Slot::Value(value) => SlotRef::Value(value),
            Slot::Group(values) => SlotRef::Group(values),
            Slot::Nested(nested) => SlotRef::Nested(nested),
        }
    }

    pub fn as_value(&self) -> Option<&T> {
        match self {
            Slot::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_group(&self) -> Option<&[T]> {
        match self {
            Slot::Group(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_nested(&self) -> Option<&Structured<T>> {
        match self {
            Slot::Nested(nested) => Some(nested),
            _ => None,
        }
    }

    pub fn is_nested(&self) -> bool {
        matches!(self, Slot::Nested(_))
    }

    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        self.as_ref().kind()
    }
}

impl<T> From<Structured<T>> for Slot<T> {
    fn from(structured: Structured<T>) -> Self {
        Slot::Nested(structured)
    }
}

/// Borrowed slot contents, as produced by bracket access and iteration.
#[derive(Debug)]
pub enum SlotRef<'a, T> {
    Value(&'a T),
    Group(&'a [T]),
    Nested(&'a Structured<T>),
}

// Derives would require `T: Clone`/`T: Copy`.
impl<T> Clone for SlotRef<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for SlotRef<'_, T> {}

impl<T: PartialEq> PartialEq for SlotRef<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (SlotRef::Value(a), SlotRef::Value(b)) => a == b,
            (SlotRef::Group(a), SlotRef::Group(b)) => a == b,
            (SlotRef::Nested(a), SlotRef::Nested(b)) => a == b,
            _ => false,
        }
    }
}

impl<'a, T> SlotRef<'a, T> {
    pub fn as_value(&self) -> Option<&'a T> {
        match *self {
            SlotRef::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_group(&self) -> Option<&'a [T]> {
        match *self {
            SlotRef::Group(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_nested(&self) -> Option<&'a Structured<T>> {
        match *self {
            SlotRef::Nested(nested) => Some(nested),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SlotRef::Value(_) => "value",
            SlotRef::Group(_) => "group",
            SlotRef::Nested(_) => "nested",
        }
    }
}

impl<T: Clone> SlotRef<'_, T> {
    pub fn to_owned_slot(&self) -> Slot<T> {
        match *self {
            SlotRef::Value(value) => Slot::Value(value.clone()),
            SlotRef::Group(values) => Slot::Group(values.to_vec()),
            SlotRef::Nested(nested) => Slot::Nested(nested.clone()),
        }
    }
}

/// Input of a one-level map: nested containers reach the callback unopened.
#[derive(Debug)]
pub enum Leaf<'a, T> {
    Value(&'a T),
    Nested(&'a Structured<T>),
}

impl<T: Serialize> Serialize for Slot<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Slot::Value(value) => value.serialize(serializer),
            Slot::Group(values) => {
                let mut seq = serializer.serialize_seq(Some(values.len()))?;
                for value in values {
                    seq.serialize_element(value)?;
                }
                seq.end()
            }
            Slot::Nested(nested) => nested.serialize(serializer),
        }
    }
}
