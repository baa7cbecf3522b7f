//! Bake operation - register entries and write their data files.

use std::path::Path;

use enlist_core::Sides;
use enlist_datagen::ArtifactSet;
use enlist_manifest::Manifest;
use eyre::{Context, Result};

use super::pipeline;
use crate::reports::{BakeReport, GenerationResult, PreviewFile, PreviewResult, WrittenResult};

/// Options for the bake operation.
pub struct BakeOptions<'a> {
    /// Output root for generated files.
    pub output_dir: &'a Path,
    /// Sides to generate.
    pub sides: Sides,
    /// Whether to preview without writing files.
    pub dry_run: bool,
    /// Leave files that already exist untouched.
    pub keep_existing: bool,
}

/// Execute the bake operation.
pub fn bake(manifest: &Manifest, opts: BakeOptions) -> Result<BakeReport> {
    let run = pipeline::run(manifest, opts.sides, false)?;

    let mut artifacts = ArtifactSet::from_artifacts(run.output.artifacts);
    if opts.keep_existing {
        artifacts = artifacts.keep_existing();
    }
    let result = if opts.dry_run {
        let files = artifacts
            .preview()
            .into_iter()
            .map(|entry| PreviewFile {
                path: entry.path,
                content: entry.content,
            })
            .collect();
        GenerationResult::Preview(PreviewResult { files })
    } else {
        let stats = artifacts
            .write_all(opts.output_dir)
            .wrap_err("Failed to write generated files")?;
        GenerationResult::Written(WrittenResult {
            output_dir: opts.output_dir.to_path_buf(),
            written: stats.written_paths,
            skipped: stats.skipped_paths,
        })
    };

    Ok(BakeReport {
        namespace: manifest.namespace().to_string(),
        registered: run.registered.published,
        by_kind: run.registered.by_kind.into_iter().collect(),
        generators: run.output.generators,
        skipped: run
            .registered
            .skipped
            .iter()
            .map(ToString::to_string)
            .collect(),
        failures: run.output.failures.iter().map(ToString::to_string).collect(),
        result,
    })
}
