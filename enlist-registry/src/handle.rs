//! Deferred references to registered entries.

use std::{any::Any, cell::OnceCell, fmt, marker::PhantomData, rc::Rc};

use enlist_core::ResourceId;

use crate::{Error, KindKey, Result};

/// One (name, kind) slot of the registration table.
///
/// A slot moves from unbound to bound exactly once, during the register walk.
/// Redeclaring the same (name, kind) reuses the slot, so handles taken before
/// the redeclaration observe the replacement.
pub(crate) struct Slot {
    id: ResourceId,
    kind: KindKey,
    value: OnceCell<Rc<dyn Any>>,
}

impl Slot {
    pub(crate) fn new(id: ResourceId, kind: KindKey) -> Rc<Self> {
        Rc::new(Self {
            id,
            kind,
            value: OnceCell::new(),
        })
    }

    pub(crate) fn id(&self) -> &ResourceId {
        &self.id
    }

    pub(crate) fn kind(&self) -> &KindKey {
        &self.kind
    }

    pub(crate) fn is_bound(&self) -> bool {
        self.value.get().is_some()
    }

    /// Bind the constructed object. Returns false if the slot was already bound.
    pub(crate) fn bind(&self, object: Rc<dyn Any>) -> bool {
        self.value.set(object).is_ok()
    }
}

/// A deferred reference to an entry that may not be constructed yet.
///
/// Before the register walk binds the entry, [`get`](Self::get) fails with
/// [`Error::NotYetPresent`]. Afterwards it returns the same cached object on
/// every call; the object is shared and never mutated through the handle.
pub struct LazyHandle<T> {
    slot: Rc<Slot>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: 'static> LazyHandle<T> {
    pub(crate) fn new(slot: Rc<Slot>) -> Self {
        Self {
            slot,
            _marker: PhantomData,
        }
    }

    /// Fully qualified identifier of the entry.
    pub fn id(&self) -> &ResourceId {
        self.slot.id()
    }

    /// Entry name (the path part of [`id`](Self::id)).
    pub fn name(&self) -> &str {
        self.slot.id().path()
    }

    pub fn kind(&self) -> &KindKey {
        self.slot.kind()
    }

    /// Whether the register walk has bound this entry.
    pub fn is_present(&self) -> bool {
        self.slot.is_bound()
    }

    /// Resolve the entry.
    pub fn get(&self) -> Result<Rc<T>> {
        let object = self.slot.value.get().ok_or_else(|| Error::NotYetPresent {
            id: self.slot.id().clone(),
            kind: self.slot.kind().to_string(),
        })?;

        Rc::clone(object)
            .downcast::<T>()
            .map_err(|_| Error::TypeMismatch {
                id: self.slot.id().clone(),
                kind: self.slot.kind().to_string(),
            })
    }

    /// Resolve the entry if it is present.
    pub fn try_get(&self) -> Option<Rc<T>> {
        self.get().ok()
    }

    /// Whether both handles point at the same slot.
    pub fn same_entry(&self, other: &LazyHandle<T>) -> bool {
        Rc::ptr_eq(&self.slot, &other.slot)
    }
}

impl<T> Clone for LazyHandle<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Rc::clone(&self.slot),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for LazyHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyHandle")
            .field("id", &self.slot.id)
            .field("kind", &self.slot.kind)
            .field("present", &self.slot.is_bound())
            .finish()
    }
}
