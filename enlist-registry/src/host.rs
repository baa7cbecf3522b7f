//! In-memory stand-in for the host's object registry.

use std::{any::Any, rc::Rc};

use enlist_core::ResourceId;
use eyre::{Result, bail};
use indexmap::IndexMap;

use crate::{KindKey, ObjectKind, table::RegisterSink};

/// A host registry that keeps published objects in memory.
///
/// Rejects a second publication of the same (kind, id), like a frozen host
/// registry would.
#[derive(Default)]
pub struct MemoryRegistry {
    objects: IndexMap<(KindKey, ResourceId), Rc<dyn Any>>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a published object by kind and id.
    pub fn get<T: 'static>(&self, kind: &ObjectKind<T>, id: &ResourceId) -> Option<Rc<T>> {
        self.objects
            .get(&(kind.key().clone(), id.clone()))
            .and_then(|object| Rc::clone(object).downcast::<T>().ok())
    }

    /// Ids published under `kind`, in publication order.
    pub fn ids(&self, kind: &KindKey) -> Vec<&ResourceId> {
        self.objects
            .keys()
            .filter(|(k, _)| k == kind)
            .map(|(_, id)| id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl RegisterSink for MemoryRegistry {
    fn publish(&mut self, kind: &KindKey, id: &ResourceId, object: Rc<dyn Any>) -> Result<()> {
        let key = (kind.clone(), id.clone());
        if self.objects.contains_key(&key) {
            bail!("'{id}' is already published under `{kind}`");
        }
        self.objects.insert(key, object);
        Ok(())
    }
}
