//! The name × kind registration table.
//!
//! The table is the single source of truth for what has been declared. Each
//! (name, kind) pair owns one [`Slot`]; declaring the pair again replaces the
//! construction thunk but keeps the slot, so every handle already given out
//! resolves to whatever the last declaration built.

use std::{any::Any, rc::Rc};

use enlist_core::ResourceId;
use eyre::eyre;
use indexmap::IndexMap;

use crate::{
    Diagnostic, Error, KindKey, LazyHandle, ObjectKind, Result,
    handle::Slot,
};

type Thunk = Box<dyn FnOnce(&ResourceId) -> eyre::Result<Rc<dyn Any>>>;
type RegisterCallback = Box<dyn FnOnce(&dyn Any) -> eyre::Result<()>>;

/// Host capability for publishing constructed objects, scoped by kind.
///
/// The register walk hands every constructed entry to the sink before binding
/// it into its [`LazyHandle`].
pub trait RegisterSink {
    fn publish(&mut self, kind: &KindKey, id: &ResourceId, object: Rc<dyn Any>)
    -> eyre::Result<()>;
}

struct Registration {
    slot: Rc<Slot>,
    thunk: Option<Thunk>,
}

/// An entry taken out of the table for construction.
pub(crate) struct PendingEntry {
    slot: Rc<Slot>,
    thunk: Thunk,
    callbacks: Vec<RegisterCallback>,
}

/// Composite-keyed store of declared entries.
///
/// Kinds are kept in first-declaration order, and entries within a kind in
/// declaration order; a redeclaration keeps the original position.
pub struct RegistrationTable {
    namespace: String,
    entries: IndexMap<KindKey, IndexMap<String, Registration>>,
    callbacks: IndexMap<(String, KindKey), Vec<RegisterCallback>>,
}

impl RegistrationTable {
    /// Create an empty table whose entries live in `namespace`.
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            entries: IndexMap::new(),
            callbacks: IndexMap::new(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Store a construction thunk for (name, kind).
    ///
    /// Returns the handle bound to the slot and whether an earlier declaration
    /// was replaced.
    pub fn declare<T, F>(
        &mut self,
        name: &str,
        kind: &ObjectKind<T>,
        thunk: F,
    ) -> Result<(LazyHandle<T>, bool)>
    where
        T: 'static,
        F: FnOnce(&ResourceId) -> eyre::Result<T> + 'static,
    {
        let id = self.id_for(name)?;
        let thunk: Thunk = Box::new(move |id: &ResourceId| {
            thunk(id).map(|object| Rc::new(object) as Rc<dyn Any>)
        });

        let by_name = self.entries.entry(kind.key().clone()).or_default();
        if let Some(existing) = by_name.get_mut(name) {
            existing.thunk = Some(thunk);
            return Ok((LazyHandle::new(Rc::clone(&existing.slot)), true));
        }

        let slot = Slot::new(id, kind.key().clone());
        by_name.insert(
            name.to_string(),
            Registration {
                slot: Rc::clone(&slot),
                thunk: Some(thunk),
            },
        );
        Ok((LazyHandle::new(slot), false))
    }

    /// Whether (name, kind) has been declared.
    pub fn contains(&self, name: &str, kind: &KindKey) -> bool {
        self.entries
            .get(kind)
            .is_some_and(|by_name| by_name.contains_key(name))
    }

    /// Look up a declared entry without constructing it.
    pub fn lookup<T: 'static>(&self, name: &str, kind: &ObjectKind<T>) -> Result<LazyHandle<T>> {
        self.entries
            .get(kind.key())
            .and_then(|by_name| by_name.get(name))
            .map(|registration| LazyHandle::new(Rc::clone(&registration.slot)))
            .ok_or_else(|| Error::UnknownRegistration {
                name: name.to_string(),
                kind: kind.name().to_string(),
            })
    }

    /// Snapshot of every entry of `kind`, in declaration order.
    ///
    /// The returned vector is detached from the table; later declarations do
    /// not show up in it.
    pub fn all_of_kind<T: 'static>(&self, kind: &ObjectKind<T>) -> Vec<LazyHandle<T>> {
        self.entries
            .get(kind.key())
            .map(|by_name| {
                by_name
                    .values()
                    .map(|registration| LazyHandle::new(Rc::clone(&registration.slot)))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Kinds with at least one declared entry, in first-declaration order.
    pub fn kinds(&self) -> Vec<KindKey> {
        self.entries
            .iter()
            .filter(|(_, by_name)| !by_name.is_empty())
            .map(|(kind, _)| kind.clone())
            .collect()
    }

    /// Number of declared entries across all kinds.
    pub fn len(&self) -> usize {
        self.entries.values().map(IndexMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Queue a callback to run once (name, kind) has been constructed and bound.
    ///
    /// The entry does not need to be declared yet.
    pub fn add_register_callback<T, F>(&mut self, name: &str, kind: &ObjectKind<T>, callback: F)
    where
        T: 'static,
        F: FnOnce(&T) -> eyre::Result<()> + 'static,
    {
        let kind_name = kind.name().to_string();
        let callback: RegisterCallback =
            Box::new(move |object: &dyn Any| match object.downcast_ref::<T>() {
                Some(object) => callback(object),
                None => Err(eyre!(
                    "register callback expected a different type for kind `{kind_name}`"
                )),
            });
        self.callbacks
            .entry((name.to_string(), kind.key().clone()))
            .or_default()
            .push(callback);
    }

    /// Take every unconstructed entry of `kind` out of the table.
    pub(crate) fn take_kind(&mut self, kind: &KindKey) -> Vec<PendingEntry> {
        let Some(by_name) = self.entries.get_mut(kind) else {
            return Vec::new();
        };

        let mut pending = Vec::with_capacity(by_name.len());
        for (name, registration) in by_name.iter_mut() {
            let Some(thunk) = registration.thunk.take() else {
                continue;
            };
            let callbacks = self
                .callbacks
                .shift_remove(&(name.clone(), kind.clone()))
                .unwrap_or_default();
            pending.push(PendingEntry {
                slot: Rc::clone(&registration.slot),
                thunk,
                callbacks,
            });
        }
        pending
    }

    fn id_for(&self, name: &str) -> Result<ResourceId> {
        ResourceId::new(self.namespace.as_str(), name).map_err(|source| Error::InvalidName {
            name: name.to_string(),
            source,
        })
    }
}

/// Construct, publish and bind the pending entries of one kind, in order.
///
/// Stops at the first failure; entries after it stay unbound. Returns the
/// number of entries bound.
pub(crate) fn register_pending(
    kind: &KindKey,
    pending: Vec<PendingEntry>,
    sink: &mut dyn RegisterSink,
) -> std::result::Result<usize, Diagnostic> {
    let mut bound = 0;

    for entry in pending {
        let id = entry.slot.id().clone();
        let fail = |stage: &str, err: eyre::Report| {
            Diagnostic::error("register", kind.name(), format!("{stage}: {err:#}")).at(id.to_string())
        };

        let object = (entry.thunk)(&id).map_err(|err| fail("construction failed", err))?;
        sink.publish(kind, &id, Rc::clone(&object))
            .map_err(|err| fail("host rejected entry", err))?;
        entry.slot.bind(Rc::clone(&object));
        tracing::debug!(kind = %kind, id = %id, "bound entry");

        for callback in entry.callbacks {
            callback(&*object).map_err(|err| fail("register callback failed", err))?;
        }
        bound += 1;
    }

    Ok(bound)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::MemoryRegistry;

    #[derive(Debug, PartialEq)]
    struct Block(&'static str);

    #[test]
    fn test_declare_then_lookup() {
        let blocks = ObjectKind::<Block>::new("block");
        let mut table = RegistrationTable::new("demo");

        let (handle, replaced) = table.declare("torch", &blocks, |_| Ok(Block("x"))).unwrap();

        assert!(!replaced);
        assert_eq!(handle.id().to_string(), "demo:torch");
        let looked_up = table.lookup("torch", &blocks).unwrap();
        assert!(looked_up.same_entry(&handle));
        assert!(!looked_up.is_present());
    }

    #[test]
    fn test_lookup_unknown() {
        let blocks = ObjectKind::<Block>::new("block");
        let table = RegistrationTable::new("demo");

        let err = table.lookup("torch", &blocks).unwrap_err();
        assert_eq!(err.to_string(), "unknown registration 'torch' of kind `block`");
    }

    #[test]
    fn test_same_name_different_kind_is_separate() {
        let blocks = ObjectKind::<Block>::new("block");
        let items = ObjectKind::<Block>::new("item");
        let mut table = RegistrationTable::new("demo");

        table.declare("torch", &blocks, |_| Ok(Block("b"))).unwrap();
        table.declare("torch", &items, |_| Ok(Block("i"))).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.kinds(), vec![blocks.key().clone(), items.key().clone()]);
    }

    #[test]
    fn test_redeclare_keeps_slot() {
        let blocks = ObjectKind::<Block>::new("block");
        let mut table = RegistrationTable::new("demo");

        let (first, _) = table.declare("torch", &blocks, |_| Ok(Block("first"))).unwrap();
        let (second, replaced) = table.declare("torch", &blocks, |_| Ok(Block("second"))).unwrap();

        assert!(replaced);
        assert!(first.same_entry(&second));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_invalid_name() {
        let blocks = ObjectKind::<Block>::new("block");
        let mut table = RegistrationTable::new("demo");

        let err = table.declare("Torch", &blocks, |_| Ok(Block("x"))).unwrap_err();
        assert!(matches!(err, Error::InvalidName { .. }));
    }

    #[test]
    fn test_take_kind_runs_nothing_and_empties_thunks() {
        let blocks = ObjectKind::<Block>::new("block");
        let mut table = RegistrationTable::new("demo");
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        table
            .declare("torch", &blocks, move |_| {
                counter.set(counter.get() + 1);
                Ok(Block("x"))
            })
            .unwrap();

        assert_eq!(table.take_kind(blocks.key()).len(), 1);
        assert_eq!(calls.get(), 0);
        assert!(table.take_kind(blocks.key()).is_empty());
    }

    #[test]
    fn test_register_pending_fails_fast() {
        let blocks = ObjectKind::<Block>::new("block");
        let mut table = RegistrationTable::new("demo");
        let (a, _) = table.declare("a", &blocks, |_| Ok(Block("a"))).unwrap();
        let (b, _) = table.declare("b", &blocks, |_| Err(eyre!("no light level"))).unwrap();
        let (c, _) = table.declare("c", &blocks, |_| Ok(Block("c"))).unwrap();

        let mut host = MemoryRegistry::new();
        let pending = table.take_kind(blocks.key());
        let err = register_pending(blocks.key(), pending, &mut host).unwrap_err();

        assert_eq!(err.entry.as_deref(), Some("demo:b"));
        assert!(err.message.contains("no light level"));
        assert!(a.is_present());
        assert!(!b.is_present());
        assert!(!c.is_present());
        assert_eq!(host.len(), 1);
    }

    #[test]
    fn test_register_callback_sees_object() {
        let blocks = ObjectKind::<Block>::new("block");
        let mut table = RegistrationTable::new("demo");
        let seen = Rc::new(Cell::new(""));
        let sink = Rc::clone(&seen);

        table.add_register_callback("torch", &blocks, move |block: &Block| {
            sink.set(block.0);
            Ok(())
        });
        table.declare("torch", &blocks, |_| Ok(Block("lit"))).unwrap();

        let pending = table.take_kind(blocks.key());
        register_pending(blocks.key(), pending, &mut MemoryRegistry::new()).unwrap();

        assert_eq!(seen.get(), "lit");
    }
}
