//! Data-generator callback dispatch.
//!
//! Callbacks are stored two ways, per generator kind:
//!
//! - entry-associated: at most one per (entry, generator kind), replaced on
//!   every [`DispatchTable::set_for_entry`]. An entry is a (name, object kind)
//!   pair, so a block and an item that share a name keep separate callbacks;
//! - unassociated: an append-only log per kind, never replaced or
//!   deduplicated.
//!
//! Invoking a kind runs the union of both, each callback exactly once.

use std::{any::Any, rc::Rc};

use eyre::eyre;
use indexmap::IndexMap;

use crate::{DataGenerator, Diagnostic, GeneratorKind, KindKey};

pub(crate) type Callback = Rc<dyn Fn(&mut dyn Any) -> eyre::Result<()>>;

/// (entry name, object kind, generator kind)
type EntryKey = (String, KindKey, KindKey);

/// A callback pulled out of the table for one invocation.
#[derive(Clone)]
pub(crate) struct Subscription {
    /// Entry name and object kind, for entry-associated callbacks.
    entry: Option<(String, KindKey)>,
    callback: Callback,
}

/// Entry-associated callbacks plus per-kind unassociated callback logs.
#[derive(Default)]
pub struct DispatchTable {
    by_entry: IndexMap<EntryKey, Callback>,
    unassociated: IndexMap<KindKey, Vec<Callback>>,
}

impl DispatchTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the callback of entry (`name`, `object`) for `kind`, replacing any
    /// previous one.
    ///
    /// Returns true if a previous callback was replaced.
    pub fn set_for_entry<G, F>(
        &mut self,
        name: &str,
        object: &KindKey,
        kind: &GeneratorKind<G>,
        callback: F,
    ) -> bool
    where
        G: DataGenerator,
        F: Fn(&mut G) -> eyre::Result<()> + 'static,
    {
        let key = (name.to_string(), object.clone(), kind.key().clone());
        self.by_entry.insert(key, erase(kind, callback)).is_some()
    }

    /// Append an unassociated callback for `kind`.
    pub fn add_unassociated<G, F>(&mut self, kind: &GeneratorKind<G>, callback: F)
    where
        G: DataGenerator,
        F: Fn(&mut G) -> eyre::Result<()> + 'static,
    {
        self.unassociated
            .entry(kind.key().clone())
            .or_default()
            .push(erase(kind, callback));
    }

    /// Whether entry (`name`, `object`) has a callback for `kind`.
    pub fn has_entry_callback(&self, name: &str, object: &KindKey, kind: &KindKey) -> bool {
        self.by_entry
            .contains_key(&(name.to_string(), object.clone(), kind.clone()))
    }

    /// Entries (name and object kind) with a callback for `kind`, in first-set
    /// order.
    pub fn entries_for(&self, kind: &KindKey) -> Vec<(&str, &KindKey)> {
        self.by_entry
            .keys()
            .filter(|(_, _, k)| k == kind)
            .map(|(name, object, _)| (name.as_str(), object))
            .collect()
    }

    /// Total number of callbacks that would run for `kind`.
    pub fn callback_count(&self, kind: &KindKey) -> usize {
        let associated = self.by_entry.keys().filter(|(_, _, k)| k == kind).count();
        let unassociated = self.unassociated.get(kind).map_or(0, Vec::len);
        associated + unassociated
    }

    /// Run every callback for `kind` against `generator`.
    ///
    /// A failing callback does not stop the rest; failures are logged and
    /// returned.
    pub fn invoke<G: DataGenerator>(
        &self,
        kind: &GeneratorKind<G>,
        generator: &mut G,
    ) -> Vec<Diagnostic> {
        run_subscriptions(kind.key(), self.subscriptions(kind.key()), generator)
    }

    /// Snapshot of the callbacks for `kind`: entry-associated first, then the
    /// unassociated log in insertion order.
    pub(crate) fn subscriptions(&self, kind: &KindKey) -> Vec<Subscription> {
        let associated = self
            .by_entry
            .iter()
            .filter(|((_, _, k), _)| k == kind)
            .map(|((name, object, _), callback)| Subscription {
                entry: Some((name.clone(), object.clone())),
                callback: Rc::clone(callback),
            });
        let unassociated = self
            .unassociated
            .get(kind)
            .into_iter()
            .flatten()
            .map(|callback| Subscription {
                entry: None,
                callback: Rc::clone(callback),
            });
        associated.chain(unassociated).collect()
    }
}

fn erase<G, F>(kind: &GeneratorKind<G>, callback: F) -> Callback
where
    G: DataGenerator,
    F: Fn(&mut G) -> eyre::Result<()> + 'static,
{
    let identifier = kind.identifier().to_string();
    Rc::new(move |generator: &mut dyn Any| match generator.downcast_mut::<G>() {
        Some(generator) => callback(generator),
        None => Err(eyre!("generator passed to `{identifier}` callback has the wrong type")),
    })
}

/// Run subscriptions in order, isolating failures.
pub(crate) fn run_subscriptions(
    kind: &KindKey,
    subscriptions: Vec<Subscription>,
    generator: &mut dyn Any,
) -> Vec<Diagnostic> {
    let mut failures = Vec::new();

    for subscription in subscriptions {
        if let Err(err) = (subscription.callback)(&mut *generator) {
            let diagnostic = Diagnostic::error("generate", kind.name(), format!("{err:#}"));
            let diagnostic = match subscription.entry {
                Some((name, object)) => {
                    tracing::error!(kind = %kind, entry = %name, object = %object, "data callback failed: {err:#}");
                    diagnostic.at(name)
                }
                None => {
                    tracing::error!(kind = %kind, "unassociated data callback failed: {err:#}");
                    diagnostic
                }
            };
            failures.push(diagnostic);
        }
    }

    failures
}
