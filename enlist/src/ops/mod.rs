//! Core operations.
//!
//! This module contains the business logic for enlist commands,
//! separated from CLI argument parsing and output rendering.

pub mod bake;
pub mod check;
pub mod declare;
pub mod pipeline;

pub use bake::{BakeOptions, bake};
pub use check::check;
