//! Deferred registration and data-generator dispatch.
//!
//! A [`Registrar`] collects named entries of arbitrary kinds and postpones
//! their construction until the host delivers the register signal
//! ([`Registrar::register_all`]). Data-generator callbacks attached along the
//! way run when the host delivers the generate signal
//! ([`Registrar::generate`]).
//!
//! # Module Organization
//!
//! - [`kind`] - Identity tokens for object kinds ([`ObjectKind`], [`KindKey`])
//! - [`handle`] - Deferred references to constructed entries ([`LazyHandle`])
//! - [`table`] - The name × kind registration table and register walk
//! - [`generator`] - Open generator-kind registry ([`GeneratorKind`], [`DataGenerator`])
//! - [`dispatch`] - Entry-associated and unassociated data callbacks
//! - [`builder`] - The builder protocol ([`Builder`], [`SimpleBuilder`])
//! - [`session`] - The fluent authoring context ([`AuthoringSession`])
//! - [`host`] - In-memory host registry for tests and tools
//!
//! # Threading
//!
//! Everything here is single-threaded. [`Registrar`] and [`LazyHandle`] are
//! `!Send`; authoring, registration and generation all happen on one thread.

pub mod builder;
mod diagnostic;
pub mod dispatch;
mod error;
pub mod generator;
pub mod handle;
pub mod host;
pub mod kind;
mod registrar;
pub mod session;
pub mod table;

pub use builder::{BuildContext, Builder, DataContext, SimpleBuilder};
pub use diagnostic::Diagnostic;
pub use error::{Error, Result};
pub use generator::{
    DataGenerator, GenerateOutput, GenerateSignal, GenerationSession, GeneratorKind,
    lookup_generator, register_generator,
};
pub use handle::LazyHandle;
pub use host::MemoryRegistry;
pub use kind::{KindKey, ObjectKind};
pub use registrar::{Phase, RegisterReport, Registrar, RegistrarConfig, WeakRegistrar};
pub use session::AuthoringSession;
pub use table::RegisterSink;
