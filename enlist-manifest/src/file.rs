use std::path::{Path, PathBuf};

use crate::{Manifest, Result};

/// An enlist.toml file with both raw content and parsed manifest.
pub struct EnlistToml {
    path: PathBuf,
    content: String,
    manifest: Manifest,
}

impl EnlistToml {
    /// Open and parse an enlist.toml file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let content = std::fs::read_to_string(&path).map_err(|e| {
            Box::new(crate::Error::Io {
                path: path.clone(),
                source: e,
            })
        })?;
        let filename = path.display().to_string();
        let manifest = Manifest::from_str_with_filename(&content, &filename)?;

        Ok(Self {
            path,
            content,
            manifest,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// The output root, resolved against the manifest's directory.
    pub fn output_dir(&self) -> PathBuf {
        let base = self.path.parent().unwrap_or_else(|| Path::new("."));
        base.join(&self.manifest.output.dir)
    }
}
