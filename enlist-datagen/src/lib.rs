//! Data generators built on the Enlist dispatch API.
//!
//! Two generator kinds ship here:
//!
//! - [`lang_kind`]: display names, written to
//!   `assets/<namespace>/lang/en_us.json`;
//! - [`tags_kind`]: tag membership lists, written to
//!   `data/<namespace>/tags/<kind>/<tag>.json`.
//!
//! Each kind is registered lazily on first access. Builders pick up the
//! [`LangExt`] and [`TagsExt`] extension methods for attaching entry data.
//! [`ArtifactSet`] collects the generated artifacts for preview or writing.

mod artifacts;
mod lang;
mod tags;

pub use artifacts::{ArtifactSet, PreviewEntry, WriteStats};
pub use lang::{LangExt, LangGenerator, lang_kind};
pub use tags::{TagsExt, TagsGenerator, tags_kind};
