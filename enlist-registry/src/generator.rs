//! Open registry of data-generator kinds.
//!
//! Any crate can add a generator kind with [`register_generator`]; the core
//! never needs to know the full list. Each call returns a fresh
//! [`GeneratorKind`] token, and callbacks attach to that token rather than to
//! the identifier string, so registering the same identifier twice yields two
//! independent kinds. [`lookup_generator`] resolves an identifier to the most
//! recent kind registered under it and exists for diagnostics only.
//!
//! The registry is per-thread: the framework is single-threaded, and each
//! thread that authors content sees the kinds registered on it.

use std::{
    any::Any,
    cell::RefCell,
    fmt,
    marker::PhantomData,
    rc::Rc,
};

use enlist_core::{Artifact, Side, Sides};
use indexmap::IndexMap;

use crate::{Diagnostic, KindKey, Registrar};

/// A generator instance, built once per generate run for its kind.
///
/// Dispatch callbacks receive `&mut Self` to contribute data; `finish` then
/// turns the accumulated data into artifact write tasks.
pub trait DataGenerator: 'static {
    fn finish(self) -> eyre::Result<Vec<Artifact>>
    where
        Self: Sized;
}

pub(crate) trait ErasedGenerator {
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn finish_boxed(self: Box<Self>) -> eyre::Result<Vec<Artifact>>;
}

impl<G: DataGenerator> ErasedGenerator for G {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn finish_boxed(self: Box<Self>) -> eyre::Result<Vec<Artifact>> {
        (*self).finish()
    }
}

type Factory = Rc<dyn Fn(&Registrar, &GenerationSession) -> Box<dyn ErasedGenerator>>;

/// A registered generator kind.
#[derive(Clone)]
pub(crate) struct KindEntry {
    pub(crate) key: KindKey,
    pub(crate) side: Side,
    pub(crate) factory: Factory,
}

#[derive(Default)]
struct GeneratorKinds {
    entries: Vec<KindEntry>,
    by_identifier: IndexMap<String, KindKey>,
}

thread_local! {
    static KINDS: RefCell<GeneratorKinds> = RefCell::new(GeneratorKinds::default());
}

/// Identity token for one category of data generation.
pub struct GeneratorKind<G> {
    key: KindKey,
    side: Side,
    _marker: PhantomData<fn() -> G>,
}

impl<G> GeneratorKind<G> {
    pub fn key(&self) -> &KindKey {
        &self.key
    }

    /// The identifier this kind was registered under.
    pub fn identifier(&self) -> &str {
        self.key.name()
    }

    pub fn side(&self) -> Side {
        self.side
    }
}

impl<G> Clone for GeneratorKind<G> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            side: self.side,
            _marker: PhantomData,
        }
    }
}

impl<G> fmt::Debug for GeneratorKind<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratorKind")
            .field("key", &self.key)
            .field("side", &self.side)
            .finish()
    }
}

/// Register a generator kind on this thread's registry.
///
/// `factory` builds one generator per generate run, given the registrar being
/// generated and the host's generation session.
///
/// # Example
///
/// ```ignore
/// thread_local! {
///     static LANG: GeneratorKind<LangGenerator> =
///         register_generator("lang", Side::Presentation, |_, session| {
///             LangGenerator::new(session.namespace())
///         });
/// }
/// ```
pub fn register_generator<G, F>(identifier: &str, side: Side, factory: F) -> GeneratorKind<G>
where
    G: DataGenerator,
    F: Fn(&Registrar, &GenerationSession) -> G + 'static,
{
    let key = KindKey::fresh(identifier);
    let factory: Factory = Rc::new(move |registrar: &Registrar, session: &GenerationSession| {
        Box::new(factory(registrar, session)) as Box<dyn ErasedGenerator>
    });

    KINDS.with(|kinds| {
        let mut kinds = kinds.borrow_mut();
        if let Some(previous) = kinds
            .by_identifier
            .insert(identifier.to_string(), key.clone())
        {
            tracing::warn!(
                identifier,
                previous = ?previous,
                current = ?key,
                "generator identifier registered again; lookups now resolve to the newer kind"
            );
        }
        kinds.entries.push(KindEntry {
            key: key.clone(),
            side,
            factory,
        });
    });

    GeneratorKind {
        key,
        side,
        _marker: PhantomData,
    }
}

/// Most recent generator kind registered under `identifier`.
pub fn lookup_generator(identifier: &str) -> Option<KindKey> {
    KINDS.with(|kinds| kinds.borrow().by_identifier.get(identifier).cloned())
}

/// Every registered generator kind, in registration order.
pub(crate) fn registered_kinds() -> Vec<KindEntry> {
    KINDS.with(|kinds| kinds.borrow().entries.clone())
}

/// Host-provided context for one generate run.
///
/// Artifact paths are relative; where they land is up to the host.
#[derive(Debug, Clone)]
pub struct GenerationSession {
    namespace: String,
}

impl GenerationSession {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    /// Namespace artifacts are generated for.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}

/// The generate signal delivered by the host.
#[derive(Debug, Clone)]
pub struct GenerateSignal {
    pub sides: Sides,
    pub session: GenerationSession,
}

impl GenerateSignal {
    pub fn new(sides: Sides, session: GenerationSession) -> Self {
        Self { sides, session }
    }
}

/// Result of a generate run.
#[derive(Debug, Default)]
pub struct GenerateOutput {
    /// Artifacts for the host to write, grouped by generator kind in
    /// registration order.
    pub artifacts: Vec<Artifact>,
    /// Isolated failures (callbacks or generators that returned an error).
    pub failures: Vec<Diagnostic>,
    /// Identifiers of the generator kinds that ran.
    pub generators: Vec<String>,
}

impl GenerateOutput {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}
