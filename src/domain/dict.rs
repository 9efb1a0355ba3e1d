//! Plain ordered-mapping view of a container

use indexmap::IndexMap;
use serde::Serialize;
use tracing::instrument;

use super::error::StructuredResult;
use super::slot::Slot;
use super::structured::Structured;

/// Ordered key/value mapping produced by [`Structured::to_dict`].
pub type Dict<T> = IndexMap<String, DictValue<T>>;

/// Entry of a [`Dict`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DictValue<T> {
    Value(T),
    Group(Vec<T>),
    /// A nested container left as is (`recurse = false`).
    Nested(Structured<T>),
    /// A nested container converted to a mapping.
    Dict(Dict<T>),
}

impl<T: Clone> Structured<T> {
    /// Convert to a plain mapping, `root` first.
    ///
    /// With `recurse`, nested containers become mappings too; otherwise they
    /// are surfaced unchanged.
    #[instrument(level = "trace", skip(self))]
    pub fn to_dict(&self, recurse: bool) -> Dict<T> {
        self.entries()
            .map(|(key, slot)| {
                let value = match slot {
                    Slot::Value(value) => DictValue::Value(value.clone()),
                    Slot::Group(values) => DictValue::Group(values.clone()),
                    Slot::Nested(nested) if recurse => DictValue::Dict(nested.to_dict(true)),
                    Slot::Nested(nested) => DictValue::Nested(nested.clone()),
                };
                (key.to_string(), value)
            })
            .collect()
    }
}

impl<T> Structured<T> {
    /// Rebuild a container from a mapping; `"root"` becomes the root slot.
    pub fn from_dict(dict: Dict<T>) -> StructuredResult<Self> {
        let slots = dict
            .into_iter()
            .map(|(key, value)| {
                let slot = match value {
                    DictValue::Value(value) => Slot::Value(value),
                    DictValue::Group(values) => Slot::Group(values),
                    DictValue::Nested(nested) => Slot::Nested(nested),
                    DictValue::Dict(dict) => Slot::Nested(Self::from_dict(dict)?),
                };
                Ok((key, slot))
            })
            .collect::<StructuredResult<Vec<_>>>()?;
        Self::new(None, slots)
    }
}
