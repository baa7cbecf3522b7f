//! Parsing and validation of `enlist.toml` content manifests.
//!
//! A manifest configures the registrar and lists the entries to declare:
//!
//! ```toml
//! [registrar]
//! namespace = "demo"
//!
//! [output]
//! dir = "generated"
//!
//! [[entries]]
//! name = "torch"
//! kind = "block"
//! lang = "Wall Torch"
//! tags = ["demo:lights"]
//!
//! [[entries]]
//! name = "torch"
//! kind = "item"
//! parent = "block"
//! ```
//!
//! Errors carry the manifest source so they render with labels through
//! `miette`.

// Miette's derive macro generates code that triggers these warnings
#![allow(unused_assignments)]

mod error;
mod file;
mod manifest;
mod validate;

pub use error::{Error, Result, SourceContext};
pub use file::EnlistToml;
pub use manifest::{EntrySpec, Manifest, OutputConfig, parse_manifest, resolve_id};
