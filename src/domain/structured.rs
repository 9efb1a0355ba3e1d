//! The structured container: named slots over an arbitrary payload type.
//!
//! A container layers structure onto payloads of type `T` in two ways: by key
//! (named slots, possibly holding nested containers) and by group (a slot
//! holding an ordered sequence of payloads). The slot named `root` is special:
//! when it is the only slot, bracket access and iteration look straight
//! through the container to the root payload.
//!
//! ```
//! use structured::domain::{Slot, Structured};
//!
//! let s = Structured::builder()
//!     .root(Slot::group([1, 2]))
//!     .value("b", 3)
//!     .group("c", [4, 5])
//!     .build()
//!     .unwrap();
//!
//! let items: Vec<_> = s.iter().map(|item| item.to_owned_slot()).collect();
//! assert_eq!(items, vec![Slot::group([1, 2]), Slot::value(3), Slot::group([4, 5])]);
//!
//! let bumped = s.map(|x| x + 1);
//! assert_eq!(bumped.get("b").unwrap(), &Slot::value(4));
//! ```

use std::collections::BTreeSet;
use std::convert::Infallible;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::{debug, instrument, trace};

use super::builder::StructuredBuilder;
use super::error::{StructuredError, StructuredResult};
use super::key::{validate_key, Key, ROOT};
use super::project::{Attribute, Project};
use super::slot::{Leaf, Slot, SlotRef};

/// Hook applied to every payload as it enters a container.
///
/// Receives the key and the raw slot, returns the slot to store.
pub type PrepareItem<T> = Arc<dyn Fn(&str, Slot<T>) -> Slot<T> + Send + Sync>;

/// Passenger data carried through copies, never interpreted by the container.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

pub(crate) type Slots<T> = IndexMap<String, Slot<T>>;

pub struct Structured<T> {
    slots: Slots<T>,
    mapped_attrs: Arc<BTreeSet<String>>,
    metadata: Option<Arc<Metadata>>,
    prepare: Option<PrepareItem<T>>,
}

/// Options for [`Structured::simplify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimplifyOptions {
    /// Simplify nested containers as well.
    pub recurse: bool,
    /// Allow returning the bare root payload.
    pub unwrap: bool,
    /// Replace this container's slots instead of building a new container.
    pub inplace: bool,
}

impl Default for SimplifyOptions {
    fn default() -> Self {
        Self {
            recurse: true,
            unwrap: true,
            inplace: false,
        }
    }
}

impl SimplifyOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recurse(mut self, recurse: bool) -> Self {
        self.recurse = recurse;
        self
    }

    pub fn unwrap(mut self, unwrap: bool) -> Self {
        self.unwrap = unwrap;
        self
    }

    pub fn inplace(mut self, inplace: bool) -> Self {
        self.inplace = inplace;
        self
    }
}

/// Outcome of a simplification.
#[derive(Debug)]
pub enum Simplified<'a, T> {
    /// The walk ended on a bare payload (only with `unwrap`).
    Unwrapped(Slot<T>),
    /// A new container sharing mapped attributes and metadata with the source.
    Structured(Structured<T>),
    /// The source container itself, with its slots replaced.
    InPlace(&'a mut Structured<T>),
}

impl<T> Simplified<'_, T> {
    pub fn as_structured(&self) -> Option<&Structured<T>> {
        match self {
            Simplified::Unwrapped(_) => None,
            Simplified::Structured(structured) => Some(structured),
            Simplified::InPlace(structured) => Some(structured),
        }
    }

    pub fn as_unwrapped(&self) -> Option<&Slot<T>> {
        match self {
            Simplified::Unwrapped(slot) => Some(slot),
            _ => None,
        }
    }
}

impl<T> Structured<T> {
    pub(crate) fn from_parts(
        slots: Slots<T>,
        mapped_attrs: Arc<BTreeSet<String>>,
        metadata: Option<Arc<Metadata>>,
        prepare: Option<PrepareItem<T>>,
    ) -> Self {
        Self {
            slots,
            mapped_attrs,
            metadata,
            prepare,
        }
    }

    /// An empty container without side tables.
    pub fn empty() -> Self {
        Self::from_parts(IndexMap::new(), Arc::default(), None, None)
    }

    pub fn builder() -> StructuredBuilder<T> {
        StructuredBuilder::new()
    }

    /// Build a container from an optional root and named slots.
    ///
    /// Fails with `InvalidKey` if any name is not a valid, non-reserved identifier.
    pub fn new<K, I>(root: Option<Slot<T>>, slots: I) -> StructuredResult<Self>
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Slot<T>)>,
    {
        let mut builder = StructuredBuilder::new();
        if let Some(root) = root {
            builder = builder.root(root);
        }
        builder.slots(slots).build()
    }

    /// A container holding nothing but `root`.
    pub fn from_root(root: Slot<T>) -> Self {
        let mut slots = IndexMap::new();
        slots.insert(ROOT.to_string(), root);
        Self::from_parts(slots, Arc::default(), None, None)
    }

    /// Same side tables and hook, different slots.
    fn with_slots(&self, slots: Slots<T>) -> Self {
        Self::from_parts(
            slots,
            Arc::clone(&self.mapped_attrs),
            self.metadata.clone(),
            self.prepare.clone(),
        )
    }

    pub(crate) fn prepare_item(&self, key: &str, slot: Slot<T>) -> Slot<T> {
        match &self.prepare {
            Some(prepare) => prepare(key, slot),
            None => slot,
        }
    }

    pub fn has_root(&self) -> bool {
        self.slots.contains_key(ROOT)
    }

    /// False only when the container holds exactly `root` and nothing else.
    pub fn has_structure(&self) -> bool {
        !(self.slots.len() == 1 && self.has_root())
    }

    fn is_bare_root(&self) -> bool {
        self.has_root() && !self.has_structure()
    }

    pub fn root(&self) -> Option<&Slot<T>> {
        self.slots.get(ROOT)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    /// Slot names, `root` first.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries().map(|(key, _)| key)
    }

    /// Slots in presentation order: `root` first, then insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &Slot<T>)> + '_ {
        let root = self.root().map(|slot| (ROOT, slot));
        root.into_iter().chain(
            self.slots
                .iter()
                .filter(|(key, _)| key.as_str() != ROOT)
                .map(|(key, slot)| (key.as_str(), slot)),
        )
    }

    pub fn mapped_attrs(&self) -> &BTreeSet<String> {
        &self.mapped_attrs
    }

    /// Register `name` for projection onto the leaves.
    pub fn add_mapped_attr(&mut self, name: impl Into<String>) {
        Arc::make_mut(&mut self.mapped_attrs).insert(name.into());
    }

    pub fn metadata(&self) -> Option<&Metadata> {
        self.metadata.as_deref()
    }

    /// Shared handle to the metadata, for passing on to other containers.
    pub fn shared_metadata(&self) -> Option<Arc<Metadata>> {
        self.metadata.clone()
    }

    pub fn set_metadata(&mut self, metadata: Option<Metadata>) {
        self.metadata = metadata.map(Arc::new);
    }

    /// Attribute read: the stored slot named `name`.
    pub fn get(&self, name: &str) -> StructuredResult<&Slot<T>> {
        self.slots
            .get(name)
            .ok_or_else(|| StructuredError::attribute_not_found(name))
    }

    /// Attribute read with mapped-attribute fallback.
    ///
    /// A stored slot wins. Otherwise, if `name` is a mapped attribute, it is
    /// projected onto every leaf and the results are returned in a container
    /// of the same shape.
    #[instrument(level = "trace", skip(self))]
    pub fn attr(&self, name: &str) -> StructuredResult<Attribute<'_, T>>
    where
        T: Project,
    {
        if let Some(slot) = self.slots.get(name) {
            return Ok(Attribute::Slot(slot));
        }
        if !self.mapped_attrs.contains(name) {
            return Err(StructuredError::attribute_not_found(name));
        }
        debug!(name, "projecting mapped attribute onto leaves");
        self.try_map(|leaf| {
            leaf.project(name)
                .ok_or_else(|| StructuredError::attribute_not_found(name))
        })
        .map(Attribute::Mapped)
    }

    /// Attribute and bracket write: insert or overwrite slot `name`.
    ///
    /// An existing slot keeps its position; a new one is appended.
    #[instrument(level = "trace", skip(self, slot))]
    pub fn set(&mut self, name: &str, slot: Slot<T>) -> StructuredResult<()> {
        validate_key(name)?;
        let slot = self.prepare_item(name, slot);
        self.slots.insert(name.to_string(), slot);
        Ok(())
    }

    /// Bracket read.
    ///
    /// A bare root forwards the key to the root payload. Otherwise `Key::Root`
    /// and `"root"` select the root slot and names select their slot.
    pub fn index(&self, key: impl Into<Key>) -> StructuredResult<SlotRef<'_, T>> {
        let key = key.into();
        trace!(%key, "bracket read");
        if let Some(root) = self.root().filter(|_| self.is_bare_root()) {
            return Self::delegate(root, key);
        }
        if key.is_root() {
            if let Some(root) = self.root() {
                return Ok(root.as_ref());
            }
        }
        if let Key::Name(name) = &key {
            if validate_key(name).is_ok() {
                if let Some(slot) = self.slots.get(name) {
                    return Ok(slot.as_ref());
                }
            }
        }
        Err(StructuredError::KeyNotFound {
            key: key.to_string(),
        })
    }

    fn delegate(root: &Slot<T>, key: Key) -> StructuredResult<SlotRef<'_, T>> {
        trace!(%key, kind = root.kind(), "delegating to root payload");
        match (root, key) {
            (Slot::Nested(nested), key) => nested.index(key),
            (Slot::Group(values), Key::Index(index)) => values
                .get(index)
                .map(SlotRef::Value)
                .ok_or(StructuredError::IndexOutOfRange {
                    index,
                    len: values.len(),
                }),
            (slot, key) => Err(StructuredError::NotIndexable {
                key: key.to_string(),
                kind: slot.kind(),
            }),
        }
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self)
    }

    /// Apply `f` to every leaf payload, recursing into nested containers.
    ///
    /// Groups are mapped element-wise. The result is a fresh container
    /// without mapped attributes, metadata or hook.
    pub fn map<U, F>(&self, mut f: F) -> Structured<U>
    where
        F: FnMut(&T) -> U,
    {
        match self.try_map(|value| Ok::<U, Infallible>(f(value))) {
            Ok(mapped) => mapped,
            Err(never) => match never {},
        }
    }

    /// Fallible [`map`](Self::map); the first error aborts the traversal.
    pub fn try_map<U, E, F>(&self, mut f: F) -> Result<Structured<U>, E>
    where
        F: FnMut(&T) -> Result<U, E>,
    {
        self.try_map_inner(&mut f)
    }

    fn try_map_inner<U, E, F>(&self, f: &mut F) -> Result<Structured<U>, E>
    where
        F: FnMut(&T) -> Result<U, E>,
    {
        let mut slots = IndexMap::with_capacity(self.slots.len());
        for (key, slot) in &self.slots {
            let mapped = match slot {
                Slot::Value(value) => Slot::Value(f(value)?),
                Slot::Group(values) => {
                    Slot::Group(values.iter().map(&mut *f).collect::<Result<_, E>>()?)
                }
                Slot::Nested(nested) => Slot::Nested(nested.try_map_inner(f)?),
            };
            slots.insert(key.clone(), mapped);
        }
        Ok(Structured::from_parts(slots, Arc::default(), None, None))
    }

    /// One-level map: nested containers are handed to `f` unopened.
    pub fn map_shallow<U, F>(&self, mut f: F) -> Structured<U>
    where
        F: FnMut(Leaf<'_, T>) -> U,
    {
        let slots = self
            .slots
            .iter()
            .map(|(key, slot)| {
                let mapped = match slot {
                    Slot::Value(value) => Slot::Value(f(Leaf::Value(value))),
                    Slot::Group(values) => {
                        Slot::Group(values.iter().map(|value| f(Leaf::Value(value))).collect())
                    }
                    Slot::Nested(nested) => Slot::Value(f(Leaf::Nested(nested))),
                };
                (key.clone(), mapped)
            })
            .collect();
        Structured::from_parts(slots, Arc::default(), None, None)
    }

    /// Collapse chains of root-only containers.
    ///
    /// Walks down through containers holding only a root while either
    /// `unwrap` is set or the root is itself a container. With `recurse`,
    /// nested containers in the result are simplified too (always with
    /// `unwrap`). `inplace` together with `unwrap` is rejected before anything
    /// is touched.
    #[instrument(level = "debug", skip(self))]
    pub fn simplify(&mut self, options: SimplifyOptions) -> StructuredResult<Simplified<'_, T>>
    where
        T: Clone,
    {
        if options.inplace && options.unwrap {
            return Err(StructuredError::InvalidOperation(
                "cannot simplify in place when `unwrap` is set".to_string(),
            ));
        }
        let slots = match self.collapse(options.unwrap) {
            Collapsed::Payload(slot) => return Ok(Simplified::Unwrapped(slot.clone())),
            Collapsed::Container(target) => target.simplified_slots(options.recurse),
        };
        if options.inplace {
            self.slots = slots;
            return Ok(Simplified::InPlace(self));
        }
        Ok(Simplified::Structured(self.with_slots(slots)))
    }

    /// Non-mutating simplification, used for nested slots.
    fn simplified(&self, recurse: bool, unwrap: bool) -> Slot<T>
    where
        T: Clone,
    {
        match self.collapse(unwrap) {
            Collapsed::Payload(slot) => slot.clone(),
            Collapsed::Container(target) => {
                Slot::Nested(self.with_slots(target.simplified_slots(recurse)))
            }
        }
    }

    fn collapse(&self, unwrap: bool) -> Collapsed<'_, T> {
        let mut current = self;
        let mut depth = 0usize;
        while let Some(root) = current.root().filter(|_| current.is_bare_root()) {
            match root {
                Slot::Nested(inner) => current = inner,
                payload if unwrap => {
                    trace!(depth, "unwrapped bare root payload");
                    return Collapsed::Payload(payload);
                }
                _ => break,
            }
            depth += 1;
        }
        trace!(depth, "collapsed root-only wrappers");
        Collapsed::Container(current)
    }

    fn simplified_slots(&self, recurse: bool) -> Slots<T>
    where
        T: Clone,
    {
        if !recurse {
            return self.slots.clone();
        }
        self.slots
            .iter()
            .map(|(key, slot)| {
                let simplified = match slot {
                    Slot::Nested(nested) => nested.simplified(true, true),
                    other => other.clone(),
                };
                (key.clone(), simplified)
            })
            .collect()
    }

    /// A new container with `root` and/or `slots` overlaid on this one.
    ///
    /// Untouched slots keep their order, new keys are appended in the order
    /// supplied. Mapped attributes and metadata are shared with `self`.
    #[instrument(level = "trace", skip_all)]
    pub fn update<K, I>(&self, root: Option<Slot<T>>, slots: I) -> StructuredResult<Self>
    where
        T: Clone,
        K: Into<String>,
        I: IntoIterator<Item = (K, Slot<T>)>,
    {
        let replacements = slots
            .into_iter()
            .map(|(key, slot)| {
                let key = key.into();
                validate_key(&key).map(|()| (key, slot))
            })
            .collect::<StructuredResult<Vec<_>>>()?;

        let mut updated = self.slots.clone();
        let root = root.map(|slot| (ROOT.to_string(), slot));
        for (key, slot) in root.into_iter().chain(replacements) {
            let slot = self.prepare_item(&key, slot);
            updated.insert(key, slot);
        }
        Ok(self.with_slots(updated))
    }
}

enum Collapsed<'a, T> {
    Payload(&'a Slot<T>),
    Container(&'a Structured<T>),
}

impl<T> Default for Structured<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: Clone> Clone for Structured<T> {
    fn clone(&self) -> Self {
        Self::from_parts(
            self.slots.clone(),
            Arc::clone(&self.mapped_attrs),
            self.metadata.clone(),
            self.prepare.clone(),
        )
    }
}

impl<T: fmt::Debug> fmt::Debug for Structured<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Structured")
            .field("slots", &self.slots)
            .field("mapped_attrs", &self.mapped_attrs)
            .field("metadata", &self.metadata)
            .field("prepare", &self.prepare.as_ref().map(|_| "<hook>"))
            .finish()
    }
}

/// Slot maps are compared key for key, ignoring order.
impl<T: PartialEq> PartialEq for Structured<T> {
    fn eq(&self, other: &Self) -> bool {
        self.slots == other.slots
    }
}

impl<T: Serialize> Serialize for Structured<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, slot) in self.entries() {
            map.serialize_entry(key, slot)?;
        }
        map.end()
    }
}

/// Iterator over a container, see [`Structured::iter`].
pub struct Iter<'a, T> {
    state: IterState<'a, T>,
}

enum IterState<'a, T> {
    /// Bare root holding a group: its elements.
    Flat(std::slice::Iter<'a, T>),
    /// Root first as a single item, then every other slot.
    Slots {
        root: Option<&'a Slot<T>>,
        rest: indexmap::map::Iter<'a, String, Slot<T>>,
    },
}

impl<'a, T> Iter<'a, T> {
    fn new(structured: &'a Structured<T>) -> Self {
        let state = match structured.root() {
            Some(Slot::Group(values)) if structured.is_bare_root() => {
                IterState::Flat(values.iter())
            }
            root => IterState::Slots {
                root,
                rest: structured.slots.iter(),
            },
        };
        Self { state }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = SlotRef<'a, T>;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.state {
            IterState::Flat(values) => values.next().map(SlotRef::Value),
            IterState::Slots { root, rest } => {
                if let Some(root) = root.take() {
                    return Some(root.as_ref());
                }
                rest.find(|(key, _)| key.as_str() != ROOT)
                    .map(|(_, slot)| slot.as_ref())
            }
        }
    }
}

impl<'a, T> IntoIterator for &'a Structured<T> {
    type Item = SlotRef<'a, T>;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Structured<i64> {
        Structured::builder()
            .root(Slot::group([1, 2]))
            .value("b", 3)
            .group("c", [4, 5])
            .build()
            .unwrap()
    }

    #[test]
    fn root_is_listed_first() {
        let mut s = Structured::builder().value("a", 1).build().unwrap();
        s.set("root", Slot::value(0)).unwrap();
        assert_eq!(s.keys().collect::<Vec<_>>(), vec!["root", "a"]);
        let items: Vec<_> = s.iter().filter_map(|item| item.as_value().copied()).collect();
        assert_eq!(items, vec![0, 1]);
    }

    #[test]
    fn structure_flags() {
        assert!(Structured::<i64>::empty().has_structure());
        assert!(!Structured::from_root(Slot::value(1)).has_structure());
        assert!(sample().has_structure());
        assert!(sample().has_root());
    }

    #[test]
    fn set_overwrites_in_place() {
        let mut s = sample();
        s.set("b", Slot::value(30)).unwrap();
        assert_eq!(s.keys().collect::<Vec<_>>(), vec!["root", "b", "c"]);
        assert_eq!(s.get("b").unwrap(), &Slot::value(30));
    }

    #[test]
    fn delegated_index_out_of_range() {
        let s = Structured::from_root(Slot::group([1, 2, 3]));
        assert_eq!(s.index(1usize).unwrap(), SlotRef::Value(&2));
        assert_eq!(
            s.index(3usize).unwrap_err(),
            StructuredError::IndexOutOfRange { index: 3, len: 3 }
        );
        assert!(matches!(
            s.index("a").unwrap_err(),
            StructuredError::NotIndexable { kind: "group", .. }
        ));
    }

    #[test]
    fn try_map_stops_at_first_error() {
        let s = sample();
        let mut seen = 0;
        let result: Result<Structured<i64>, String> = s.try_map(|x| {
            seen += 1;
            if *x == 3 {
                Err(format!("bad {x}"))
            } else {
                Ok(*x)
            }
        });
        assert_eq!(result.unwrap_err(), "bad 3");
        assert_eq!(seen, 3);
    }
}
