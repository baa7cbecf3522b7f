//! Collected output of a generate run.
//!
//! Generators return artifacts; the host gathers them in an [`ArtifactSet`]
//! to preview or write them. Artifacts come out ordered by side, then by path,
//! so a dry run and a real run list files the same way.
//!
//! # Example
//!
//! ```ignore
//! let output = registrar.generate(&signal)?;
//! let artifacts = ArtifactSet::from_artifacts(output.artifacts);
//!
//! let stats = artifacts.write_all(&output_dir)?;
//! println!("{} written, {} skipped", stats.written, stats.skipped);
//! ```

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use enlist_core::{Artifact, Overwrite, Side, Sides, WriteResult};
use eyre::Result;

/// Artifacts keyed by side and relative path.
#[derive(Debug, Default)]
pub struct ArtifactSet {
    artifacts: BTreeMap<(Side, PathBuf), Artifact>,
}

impl ArtifactSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_artifacts(artifacts: impl IntoIterator<Item = Artifact>) -> Self {
        let mut set = Self::new();
        set.extend(artifacts);
        set
    }

    /// Add an artifact. A later artifact for the same path replaces the earlier one.
    pub fn push(&mut self, artifact: Artifact) {
        let key = (artifact.side(), artifact.path().to_path_buf());
        if let Some(previous) = self.artifacts.insert(key, artifact) {
            tracing::warn!(
                path = %previous.path().display(),
                generator = previous.generator(),
                "artifact produced twice; keeping the later one"
            );
        }
    }

    pub fn extend(&mut self, artifacts: impl IntoIterator<Item = Artifact>) {
        for artifact in artifacts {
            self.push(artifact);
        }
    }

    /// Artifacts in write order.
    pub fn entries(&self) -> impl Iterator<Item = &Artifact> {
        self.artifacts.values()
    }

    /// Keep only artifacts for the given sides.
    pub fn retain_sides(&mut self, sides: Sides) {
        self.artifacts.retain(|(side, _), _| sides.contains(*side));
    }

    /// Turn every artifact into an [`Overwrite::IfMissing`] write, so files
    /// already on disk (hand-edited ones included) are left alone.
    pub fn keep_existing(self) -> Self {
        let artifacts = self
            .artifacts
            .into_iter()
            .map(|(key, artifact)| (key, artifact.with_overwrite(Overwrite::IfMissing)))
            .collect();
        Self { artifacts }
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    /// What would be written, without touching the filesystem.
    pub fn preview(&self) -> Vec<PreviewEntry> {
        self.entries()
            .map(|artifact| PreviewEntry {
                path: artifact.path().display().to_string(),
                content: artifact.content().to_string(),
                side: artifact.side(),
                generator: artifact.generator().to_string(),
            })
            .collect()
    }

    /// Write every artifact under `base`.
    pub fn write_all(&self, base: &Path) -> Result<WriteStats> {
        let mut stats = WriteStats::default();

        for artifact in self.entries() {
            let path = artifact.path().display().to_string();
            match artifact.write(base)? {
                WriteResult::Written => {
                    tracing::debug!(%path, "wrote artifact");
                    stats.written += 1;
                    stats.written_paths.push(path);
                }
                WriteResult::Skipped => {
                    tracing::debug!(%path, "artifact exists; skipped");
                    stats.skipped += 1;
                    stats.skipped_paths.push(path);
                }
            }
        }

        Ok(stats)
    }
}

/// A preview entry for displaying what would be generated.
#[derive(Debug, Clone)]
pub struct PreviewEntry {
    /// Relative path from the output root.
    pub path: String,
    pub content: String,
    pub side: Side,
    /// Identifier of the generator kind that produced the file.
    pub generator: String,
}

/// Statistics from a write operation.
#[derive(Debug, Default)]
pub struct WriteStats {
    /// Number of files written.
    pub written: usize,
    /// Number of files skipped (already existed).
    pub skipped: usize,
    /// Paths of written files.
    pub written_paths: Vec<String>,
    /// Paths of skipped files.
    pub skipped_paths: Vec<String>,
}

impl WriteStats {
    /// Total number of files processed.
    pub fn total(&self) -> usize {
        self.written + self.skipped
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn lang(content: &str) -> Artifact {
        Artifact::new(
            "assets/demo/lang/en_us.json",
            content,
            Side::Presentation,
            "lang",
        )
    }

    fn tag(path: &str) -> Artifact {
        Artifact::new(path, "{}", Side::Authoritative, "tags")
    }

    #[test]
    fn test_ordering_by_side_then_path() {
        let set = ArtifactSet::from_artifacts([
            lang("{}"),
            tag("data/demo/tags/item/b.json"),
            tag("data/demo/tags/block/a.json"),
        ]);

        let paths: Vec<_> = set.preview().into_iter().map(|p| p.path).collect();
        assert_eq!(
            paths,
            vec![
                "data/demo/tags/block/a.json",
                "data/demo/tags/item/b.json",
                "assets/demo/lang/en_us.json",
            ]
        );
    }

    #[test]
    fn test_later_artifact_replaces_same_path() {
        let set = ArtifactSet::from_artifacts([lang("first"), lang("second")]);

        assert_eq!(set.len(), 1);
        assert_eq!(set.preview()[0].content, "second");
    }

    #[test]
    fn test_retain_sides() {
        let mut set = ArtifactSet::from_artifacts([lang("{}"), tag("data/demo/tags/block/a.json")]);
        set.retain_sides(Sides::only(Side::Presentation));

        assert_eq!(set.len(), 1);
        assert_eq!(set.preview()[0].generator, "lang");
    }

    #[test]
    fn test_write_all() {
        let temp = TempDir::new().unwrap();
        let set = ArtifactSet::from_artifacts([lang("{}"), tag("data/demo/tags/block/a.json")]);

        let stats = set.write_all(temp.path()).unwrap();

        assert_eq!(stats.written, 2);
        assert_eq!(stats.total(), 2);
        assert!(temp.path().join("assets/demo/lang/en_us.json").exists());
        assert!(temp.path().join("data/demo/tags/block/a.json").exists());
    }

    #[test]
    fn test_keep_existing_skips_files_on_disk() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("assets/demo/lang/en_us.json");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "hand edited").unwrap();

        let set = ArtifactSet::from_artifacts([
            lang("generated"),
            tag("data/demo/tags/block/a.json"),
        ])
        .keep_existing();
        let stats = set.write_all(temp.path()).unwrap();

        assert_eq!(stats.skipped_paths, ["assets/demo/lang/en_us.json"]);
        assert_eq!(stats.written_paths, ["data/demo/tags/block/a.json"]);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hand edited");
        assert!(set.entries().all(|a| a.overwrite() == Overwrite::IfMissing));
    }
}
