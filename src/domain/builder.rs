//! Builder for containers with side tables and a prepare hook

use std::collections::BTreeSet;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{instrument, trace};

use super::error::StructuredResult;
use super::key::{validate_key, ROOT};
use super::slot::Slot;
use super::structured::{Metadata, PrepareItem, Structured};

/// Collects the initial slots of a [`Structured`] container.
///
/// Keys are validated in [`build`](Self::build); the prepare hook, if any, is
/// applied to every slot (root included) as it is stored.
pub struct StructuredBuilder<T> {
    root: Option<Slot<T>>,
    slots: Vec<(String, Slot<T>)>,
    mapped_attrs: BTreeSet<String>,
    metadata: Option<Arc<Metadata>>,
    prepare: Option<PrepareItem<T>>,
}

impl<T> Default for StructuredBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> StructuredBuilder<T> {
    pub fn new() -> Self {
        Self {
            root: None,
            slots: Vec::new(),
            mapped_attrs: BTreeSet::new(),
            metadata: None,
            prepare: None,
        }
    }

    /// Root payload. Takes precedence over a slot explicitly named `root`.
    pub fn root(mut self, root: Slot<T>) -> Self {
        self.root = Some(root);
        self
    }

    pub fn slot(mut self, name: impl Into<String>, slot: Slot<T>) -> Self {
        self.slots.push((name.into(), slot));
        self
    }

    pub fn slots<K, I>(mut self, slots: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Slot<T>)>,
    {
        self.slots
            .extend(slots.into_iter().map(|(key, slot)| (key.into(), slot)));
        self
    }

    pub fn value(self, name: impl Into<String>, value: T) -> Self {
        self.slot(name, Slot::Value(value))
    }

    pub fn group(self, name: impl Into<String>, values: impl IntoIterator<Item = T>) -> Self {
        self.slot(name, Slot::group(values))
    }

    pub fn nested(self, name: impl Into<String>, nested: Structured<T>) -> Self {
        self.slot(name, Slot::Nested(nested))
    }

    pub fn mapped_attr(mut self, name: impl Into<String>) -> Self {
        self.mapped_attrs.insert(name.into());
        self
    }

    pub fn mapped_attrs<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.mapped_attrs.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(Arc::new(metadata));
        self
    }

    /// Share an existing metadata handle instead of copying it.
    pub fn shared_metadata(mut self, metadata: Option<Arc<Metadata>>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Install the hook run on every slot entering the container.
    pub fn prepare<F>(mut self, prepare: F) -> Self
    where
        F: Fn(&str, Slot<T>) -> Slot<T> + Send + Sync + 'static,
    {
        self.prepare = Some(Arc::new(prepare));
        self
    }

    /// Validate keys and assemble the container; `root` is placed first.
    #[instrument(level = "trace", skip(self), fields(slots = self.slots.len()))]
    pub fn build(self) -> StructuredResult<Structured<T>> {
        for (key, _) in &self.slots {
            validate_key(key)?;
        }

        let prepare = |key: &str, slot: Slot<T>| match &self.prepare {
            Some(prepare) => prepare(key, slot),
            None => slot,
        };
        let mut slots = IndexMap::with_capacity(self.slots.len() + 1);
        let has_root = self.root.is_some();
        if let Some(root) = self.root {
            slots.insert(ROOT.to_string(), prepare(ROOT, root));
        }
        for (key, slot) in self.slots {
            if has_root && key == ROOT {
                trace!("explicit root overrides slot named root");
                continue;
            }
            let slot = prepare(&key, slot);
            slots.insert(key, slot);
        }

        Ok(Structured::from_parts(
            slots,
            Arc::new(self.mapped_attrs),
            self.metadata,
            self.prepare,
        ))
    }
}
