use std::{
    fs,
    path::{Path, PathBuf},
};

use eyre::{Result, WrapErr};

use crate::Side;

/// Outcome of [`Artifact::write`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteResult {
    Written,
    /// Left alone: the file exists and the artifact is `IfMissing`.
    Skipped,
}

/// What to do when the target file already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Overwrite {
    /// Always overwrite (generated data)
    #[default]
    Always,
    /// Only create if file doesn't exist (hand-edited seeds)
    IfMissing,
}

/// A "write this artifact" task produced by a data generator.
///
/// Generators never touch the filesystem themselves; they hand artifacts back
/// to the host, which decides where and whether to write them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    path: PathBuf,
    content: String,
    side: Side,
    generator: String,
    overwrite: Overwrite,
}

impl Artifact {
    /// Create a new artifact with a path relative to the output root (default: always overwrite)
    pub fn new(
        path: impl Into<PathBuf>,
        content: impl Into<String>,
        side: Side,
        generator: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            side,
            generator: generator.into(),
            overwrite: Overwrite::Always,
        }
    }

    /// Override the overwrite behavior.
    pub fn with_overwrite(mut self, overwrite: Overwrite) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Relative path from the output root
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn side(&self) -> Side {
        self.side
    }

    /// Identifier of the generator kind that produced this artifact
    pub fn generator(&self) -> &str {
        &self.generator
    }

    pub fn overwrite(&self) -> Overwrite {
        self.overwrite
    }

    /// Get the full path for this artifact under `base`.
    pub fn full_path(&self, base: &Path) -> PathBuf {
        base.join(&self.path)
    }

    /// Write the artifact under `base` according to its overwrite rule.
    ///
    /// Missing parent directories are created.
    pub fn write(&self, base: &Path) -> Result<WriteResult> {
        let target = self.full_path(base);
        if self.overwrite == Overwrite::IfMissing && target.exists() {
            return Ok(WriteResult::Skipped);
        }

        if let Some(dir) = target.parent() {
            fs::create_dir_all(dir)
                .wrap_err_with(|| format!("Failed to create {}", dir.display()))?;
        }
        fs::write(&target, &self.content)
            .wrap_err_with(|| format!("Failed to write {}", target.display()))?;
        Ok(WriteResult::Written)
    }
}
