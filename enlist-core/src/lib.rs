//! Core identifiers and artifact types for the Enlist registration framework.
//!
//! This crate holds the small vocabulary shared by the registry, the data
//! generators and the host binary: namespaced identifiers, the side
//! partition of generated data, and the artifact write tasks handed back to
//! the host after generation.

mod artifact;
mod id;
mod side;
mod utils;

// Artifact write tasks
pub use artifact::{Artifact, Overwrite, WriteResult};
// Identifiers
pub use id::{IdError, ResourceId};
pub use side::{Side, Sides};
// String utilities
pub use utils::to_english_name;
