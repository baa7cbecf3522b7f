//! The owning registrar: lookup API and the two signal-driven walks.

use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};

use enlist_core::ResourceId;
use indexmap::IndexMap;
use serde::Deserialize;

use crate::{
    AuthoringSession, BuildContext, DataGenerator, Diagnostic, Error, GenerateOutput,
    GenerateSignal, GeneratorKind, KindKey, LazyHandle, ObjectKind, Result, SimpleBuilder,
    dispatch::{DispatchTable, run_subscriptions},
    generator::registered_kinds,
    table::{RegisterSink, RegistrationTable, register_pending},
};

/// Registrar settings, usually read from the `[registrar]` table of a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistrarConfig {
    /// Namespace of every entry declared through this registrar.
    pub namespace: String,
    /// Reject a second declaration of the same (name, kind) instead of
    /// silently replacing the first.
    #[serde(default)]
    pub strict: bool,
    /// Log register-phase failures instead of failing the walk.
    #[serde(default)]
    pub skip_errors: bool,
}

impl RegistrarConfig {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            strict: false,
            skip_errors: false,
        }
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn skip_errors(mut self, skip_errors: bool) -> Self {
        self.skip_errors = skip_errors;
        self
    }
}

/// Lifecycle of a registrar. Each walk runs at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Authoring,
    Registering,
    Registered,
    Generating,
    Generated,
}

/// Summary of a register walk.
#[derive(Debug, Default)]
pub struct RegisterReport {
    /// Number of entries published and bound.
    pub published: usize,
    /// Entries bound per kind name, in walk order.
    pub by_kind: IndexMap<String, usize>,
    /// Failures that were logged instead of raised (`skip_errors`).
    pub skipped: Vec<Diagnostic>,
}

type KindCallback = Box<dyn FnOnce() -> eyre::Result<()>>;

struct State {
    config: RegistrarConfig,
    phase: Phase,
    table: RegistrationTable,
    dispatch: DispatchTable,
    kind_callbacks: IndexMap<KindKey, Vec<KindCallback>>,
}

/// Owner of the registration table and the data-generator dispatch table.
///
/// `Registrar` is a cheap handle; clones share the same tables. It is not
/// thread-safe and is meant to be driven from the authoring thread only.
///
/// # Example
///
/// ```ignore
/// let registrar = Registrar::new("demo")?;
/// let blocks = ObjectKind::<Block>::new("block");
///
/// let torch = registrar
///     .session()
///     .open("torch")
///     .simple(&blocks, |_| Ok(Block::lit(14)))?
///     .register()?;
///
/// registrar.register_all(&mut host)?;
/// assert_eq!(torch.get()?.light, 14);
/// ```
#[derive(Clone)]
pub struct Registrar {
    inner: Rc<RefCell<State>>,
}

/// Non-owning reference to a [`Registrar`], held by data callbacks.
#[derive(Clone)]
pub struct WeakRegistrar {
    inner: Weak<RefCell<State>>,
}

impl WeakRegistrar {
    pub fn upgrade(&self) -> Result<Registrar> {
        self.inner
            .upgrade()
            .map(|inner| Registrar { inner })
            .ok_or(Error::RegistrarDropped)
    }
}

impl Registrar {
    /// Create a registrar with default settings.
    pub fn new(namespace: &str) -> Result<Self> {
        Self::with_config(RegistrarConfig::new(namespace))
    }

    pub fn with_config(config: RegistrarConfig) -> Result<Self> {
        // Validate the namespace once, up front.
        ResourceId::new(config.namespace.as_str(), "probe").map_err(|source| {
            Error::InvalidName {
                name: config.namespace.clone(),
                source,
            }
        })?;

        Ok(Self {
            inner: Rc::new(RefCell::new(State {
                table: RegistrationTable::new(config.namespace.as_str()),
                config,
                phase: Phase::Authoring,
                dispatch: DispatchTable::new(),
                kind_callbacks: IndexMap::new(),
            })),
        })
    }

    pub fn namespace(&self) -> String {
        self.inner.borrow().config.namespace.clone()
    }

    pub fn config(&self) -> RegistrarConfig {
        self.inner.borrow().config.clone()
    }

    pub fn phase(&self) -> Phase {
        self.inner.borrow().phase
    }

    pub fn downgrade(&self) -> WeakRegistrar {
        WeakRegistrar {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Start a fluent authoring session. Sessions never share a current name.
    pub fn session(&self) -> AuthoringSession {
        AuthoringSession::new(self.clone())
    }

    /// Start a builder for an explicitly named entry.
    pub fn simple<T, F>(&self, name: &str, kind: &ObjectKind<T>, factory: F) -> SimpleBuilder<T, ()>
    where
        T: 'static,
        F: FnOnce(&BuildContext) -> eyre::Result<T> + 'static,
    {
        SimpleBuilder::new(self.clone(), (), name, kind, factory)
    }

    /// Declare (name, kind) with a deferred construction thunk.
    ///
    /// A second declaration of the same pair replaces the first unless the
    /// registrar is strict.
    pub fn declare<T, F>(&self, name: &str, kind: &ObjectKind<T>, thunk: F) -> Result<LazyHandle<T>>
    where
        T: 'static,
        F: FnOnce(&ResourceId) -> eyre::Result<T> + 'static,
    {
        let mut state = self.inner.borrow_mut();

        if state.phase != Phase::Authoring {
            return Err(Error::LateRegistration {
                name: name.to_string(),
                kind: kind.name().to_string(),
            });
        }
        if state.config.strict && state.table.contains(name, kind.key()) {
            return Err(Error::DuplicateRegistration {
                name: name.to_string(),
                kind: kind.name().to_string(),
            });
        }

        let (handle, replaced) = state.table.declare(name, kind, thunk)?;
        if replaced {
            tracing::warn!(kind = %kind.key(), id = %handle.id(), "entry declared again; last declaration wins");
        } else {
            tracing::debug!(kind = %kind.key(), id = %handle.id(), "declared entry");
        }
        Ok(handle)
    }

    /// Handle for a declared entry. Never constructs anything.
    pub fn get<T: 'static>(&self, name: &str, kind: &ObjectKind<T>) -> Result<LazyHandle<T>> {
        self.inner.borrow().table.lookup(name, kind)
    }

    /// Snapshot of every entry of `kind`, in declaration order.
    pub fn get_all<T: 'static>(&self, kind: &ObjectKind<T>) -> Vec<LazyHandle<T>> {
        self.inner.borrow().table.all_of_kind(kind)
    }

    /// Whether any entry of `kind` has been declared.
    pub fn is_registered<T: 'static>(&self, kind: &ObjectKind<T>) -> bool {
        self.inner.borrow().table.kinds().contains(kind.key())
    }

    /// Number of declared entries across all kinds.
    pub fn len(&self) -> usize {
        self.inner.borrow().table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run `callback` with the constructed object once (name, kind) is bound.
    ///
    /// A failing callback counts as a failure of that entry.
    pub fn on_register<T, F>(&self, name: &str, kind: &ObjectKind<T>, callback: F)
    where
        T: 'static,
        F: FnOnce(&T) -> eyre::Result<()> + 'static,
    {
        self.inner
            .borrow_mut()
            .table
            .add_register_callback(name, kind, callback);
    }

    /// Run `callback` after every entry of `kind` has been bound.
    pub fn after_kind_registered<T, F>(&self, kind: &ObjectKind<T>, callback: F)
    where
        T: 'static,
        F: FnOnce() -> eyre::Result<()> + 'static,
    {
        self.inner
            .borrow_mut()
            .kind_callbacks
            .entry(kind.key().clone())
            .or_default()
            .push(Box::new(callback));
    }

    /// Add an unassociated data callback for `kind`. Never replaces.
    pub fn add_data_generator<G, F>(&self, kind: &GeneratorKind<G>, callback: F)
    where
        G: DataGenerator,
        F: Fn(&mut G) -> eyre::Result<()> + 'static,
    {
        self.inner
            .borrow_mut()
            .dispatch
            .add_unassociated(kind, callback);
    }

    /// Set the data callback of entry (`name`, `object`) for `kind`, replacing
    /// any previous one. Entries of other object kinds with the same name keep
    /// their own callbacks.
    pub fn set_data_generator<T, G, F>(
        &self,
        name: &str,
        object: &ObjectKind<T>,
        kind: &GeneratorKind<G>,
        callback: F,
    ) where
        T: 'static,
        G: DataGenerator,
        F: Fn(&mut G) -> eyre::Result<()> + 'static,
    {
        let replaced = self
            .inner
            .borrow_mut()
            .dispatch
            .set_for_entry(name, object.key(), kind, callback);
        if replaced {
            tracing::debug!(kind = %kind.key(), object = %object.key(), entry = name, "replaced entry data callback");
        }
    }

    /// Whether entry (`name`, `object`) has a data callback for `kind`.
    pub fn has_data_generator<T: 'static>(
        &self,
        name: &str,
        object: &ObjectKind<T>,
        kind: &KindKey,
    ) -> bool {
        self.inner
            .borrow()
            .dispatch
            .has_entry_callback(name, object.key(), kind)
    }

    /// Number of data callbacks that will run for `kind`.
    pub fn data_callback_count(&self, kind: &KindKey) -> usize {
        self.inner.borrow().dispatch.callback_count(kind)
    }

    /// The register signal: construct, publish and bind every declared entry.
    ///
    /// Kinds are walked in first-declaration order. A failing entry aborts the
    /// rest of its kind; other kinds still run. Failures are then raised
    /// together as [`Error::RegistrationFailed`], or logged and reported in
    /// [`RegisterReport::skipped`] when `skip_errors` is set.
    pub fn register_all(&self, sink: &mut dyn RegisterSink) -> Result<RegisterReport> {
        let kinds = {
            let mut state = self.inner.borrow_mut();
            if state.phase != Phase::Authoring {
                return Err(Error::PhaseAlreadyRan("register"));
            }
            state.phase = Phase::Registering;
            state.table.kinds()
        };

        let mut report = RegisterReport::default();
        let mut failures = Vec::new();

        for kind in kinds {
            let pending = self.inner.borrow_mut().table.take_kind(&kind);
            match register_pending(&kind, pending, sink) {
                Ok(bound) => {
                    report.published += bound;
                    report.by_kind.insert(kind.name().to_string(), bound);
                    if let Err(diagnostic) = self.run_kind_callbacks(&kind) {
                        failures.push(diagnostic);
                    }
                }
                Err(diagnostic) => failures.push(diagnostic),
            }
        }

        let skip_errors = {
            let mut state = self.inner.borrow_mut();
            state.phase = Phase::Registered;
            state.config.skip_errors
        };

        tracing::info!(
            published = report.published,
            kinds = report.by_kind.len(),
            failures = failures.len(),
            "register phase complete"
        );

        if failures.is_empty() {
            Ok(report)
        } else if skip_errors {
            for failure in &failures {
                tracing::error!("skipped registration failure: {failure}");
            }
            report.skipped = failures;
            Ok(report)
        } else {
            Err(Error::RegistrationFailed { failures })
        }
    }

    fn run_kind_callbacks(&self, kind: &KindKey) -> std::result::Result<(), Diagnostic> {
        let callbacks = self
            .inner
            .borrow_mut()
            .kind_callbacks
            .shift_remove(kind)
            .unwrap_or_default();

        for callback in callbacks {
            callback().map_err(|err| {
                Diagnostic::error(
                    "register",
                    kind.name(),
                    format!("kind callback failed: {err:#}"),
                )
            })?;
        }
        Ok(())
    }

    /// The generate signal: run every active-side generator kind.
    ///
    /// One generator is built per kind; its dispatch callbacks run in order
    /// with failures isolated, then it is finished into artifacts. Nothing is
    /// written; the returned artifacts are for the host to write.
    pub fn generate(&self, signal: &GenerateSignal) -> Result<GenerateOutput> {
        {
            let mut state = self.inner.borrow_mut();
            match state.phase {
                Phase::Authoring | Phase::Registering => return Err(Error::NotRegistered),
                Phase::Generating | Phase::Generated => {
                    return Err(Error::PhaseAlreadyRan("generate"));
                }
                Phase::Registered => state.phase = Phase::Generating,
            }
        }

        let mut output = GenerateOutput::default();

        for kind in registered_kinds() {
            if !signal.sides.contains(kind.side) {
                tracing::debug!(kind = %kind.key, side = %kind.side, "side inactive; skipping generator");
                continue;
            }

            let mut generator = (kind.factory)(self, &signal.session);
            let subscriptions = self.inner.borrow().dispatch.subscriptions(&kind.key);
            let failures = run_subscriptions(&kind.key, subscriptions, generator.as_any_mut());
            output.failures.extend(failures);

            match generator.finish_boxed() {
                Ok(artifacts) => output.artifacts.extend(artifacts),
                Err(err) => {
                    tracing::error!(kind = %kind.key, "generator failed to finish: {err:#}");
                    output.failures.push(Diagnostic::error(
                        "generate",
                        kind.key.name(),
                        format!("generator failed to finish: {err:#}"),
                    ));
                }
            }
            output.generators.push(kind.key.name().to_string());
        }

        self.inner.borrow_mut().phase = Phase::Generated;
        tracing::info!(
            generators = output.generators.len(),
            artifacts = output.artifacts.len(),
            failures = output.failures.len(),
            "generate phase complete"
        );

        Ok(output)
    }
}
