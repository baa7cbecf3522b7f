use enlist_core::{IdError, ResourceId};
use thiserror::Error;

use crate::Diagnostic;

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the registrar.
///
/// Precondition violations (`CurrentNameNotSet`, `UnknownRegistration`,
/// `NotYetPresent`) are programmer errors and are meant to be propagated to
/// the call site, not recovered.
#[derive(Debug, Error)]
pub enum Error {
    #[error("current name not set: call `open(name)` before using the current name")]
    CurrentNameNotSet,

    #[error("unknown registration '{name}' of kind `{kind}`")]
    UnknownRegistration { name: String, kind: String },

    #[error("entry '{id}' of kind `{kind}` is not yet present: the register phase has not bound it")]
    NotYetPresent { id: ResourceId, kind: String },

    #[error("entry '{id}' of kind `{kind}` does not hold a value of the requested type")]
    TypeMismatch { id: ResourceId, kind: String },

    #[error("duplicate registration '{name}' of kind `{kind}` (strict mode)")]
    DuplicateRegistration { name: String, kind: String },

    #[error("cannot declare '{name}' of kind `{kind}`: the register phase has already started")]
    LateRegistration { name: String, kind: String },

    #[error("invalid entry name '{name}'")]
    InvalidName {
        name: String,
        #[source]
        source: IdError,
    },

    #[error("the {0} phase has already run")]
    PhaseAlreadyRan(&'static str),

    #[error("cannot generate data before the register phase has run")]
    NotRegistered,

    #[error("the owning registrar has been dropped")]
    RegistrarDropped,

    #[error("registration failed:\n{}", render_failures(.failures))]
    RegistrationFailed { failures: Vec<Diagnostic> },
}

fn render_failures(failures: &[Diagnostic]) -> String {
    failures
        .iter()
        .map(|d| format!("  {d}"))
        .collect::<Vec<_>>()
        .join("\n")
}
