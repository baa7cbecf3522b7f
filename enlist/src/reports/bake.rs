//! Bake command report data structures.

use std::path::PathBuf;

use super::output::{Output, Report};

/// Report data from a bake run.
#[derive(Debug)]
pub struct BakeReport {
    /// Registrar namespace.
    pub namespace: String,

    /// Number of entries published to the host.
    pub registered: usize,

    /// Entries published per kind, in walk order.
    pub by_kind: Vec<(String, usize)>,

    /// Generator kinds that ran.
    pub generators: Vec<String>,

    /// Registration failures skipped because of `skip_errors`.
    pub skipped: Vec<String>,

    /// Data callbacks or generators that failed.
    pub failures: Vec<String>,

    /// Generation result (files written or preview).
    pub result: GenerationResult,
}

/// Result of generation.
#[derive(Debug)]
pub enum GenerationResult {
    /// Files were written to disk.
    Written(WrittenResult),
    /// Dry-run preview.
    Preview(PreviewResult),
}

/// Result when files were written to disk.
#[derive(Debug)]
pub struct WrittenResult {
    pub output_dir: PathBuf,
    /// Files written, relative to the output directory.
    pub written: Vec<String>,
    /// Files left untouched because they already existed.
    pub skipped: Vec<String>,
}

/// Result of a dry-run preview.
#[derive(Debug)]
pub struct PreviewResult {
    /// Files that would be generated.
    pub files: Vec<PreviewFile>,
}

/// A file in preview mode.
#[derive(Debug)]
pub struct PreviewFile {
    pub path: String,
    pub content: String,
}

impl Report for BakeReport {
    fn render(&self, out: &mut dyn Output) {
        for skipped in &self.skipped {
            out.warning(skipped);
        }
        for failure in &self.failures {
            out.error(failure);
        }

        match &self.result {
            GenerationResult::Written(written) => self.render_written(out, written),
            GenerationResult::Preview(preview) => self.render_preview(out, preview),
        }
    }
}

impl BakeReport {
    fn render_summary(&self, out: &mut dyn Output) {
        out.section(&format!(
            "Registered {} entries in '{}'",
            self.registered, self.namespace
        ));
        for (kind, count) in &self.by_kind {
            out.list_item(&format!("{kind}: {count}"));
        }
        out.newline();
    }

    fn render_written(&self, out: &mut dyn Output, written: &WrittenResult) {
        self.render_summary(out);

        out.section(&format!("Generated ({})", self.generators.join(", ")));
        for path in &written.written {
            out.added_item(path);
        }
        for path in &written.skipped {
            out.skipped_item(path);
        }
        out.newline();

        out.key_value("Output", &written.output_dir.display().to_string());
    }

    fn render_preview(&self, out: &mut dyn Output, preview: &PreviewResult) {
        for file in &preview.files {
            out.divider(&file.path);
            out.preformatted(&file.content);
        }

        out.divider("Summary");
        self.render_summary(out);
        out.preformatted(&format!("{} files would be generated", preview.files.len()));
    }
}
