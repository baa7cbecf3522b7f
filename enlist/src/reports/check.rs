//! Check command report data structures.

use std::path::PathBuf;

use super::output::{Output, Report};

/// Report data from a check run.
#[derive(Debug)]
pub struct CheckReport {
    /// Path to the config file.
    pub config_path: PathBuf,
    pub namespace: String,
    /// Number of entries the host received.
    pub registered: usize,
    /// Entries per kind, in first-use order.
    pub by_kind: Vec<(String, usize)>,
    /// Number of files a bake would write.
    pub artifacts: usize,
    /// Registration and generation failures.
    pub errors: Vec<String>,
}

impl CheckReport {
    /// Whether the check passed (no errors).
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

impl Report for CheckReport {
    fn render(&self, out: &mut dyn Output) {
        for error in &self.errors {
            out.error(error);
        }

        if !self.is_valid() {
            out.newline();
            out.preformatted(&format!(
                "✗ {} has {} error(s)",
                self.config_path.display(),
                self.errors.len()
            ));
            return;
        }

        out.preformatted(&format!("✓ {} is valid", self.config_path.display()));
        out.newline();
        out.section(&format!(
            "{} entries in '{}'",
            self.registered, self.namespace
        ));
        for (kind, count) in &self.by_kind {
            out.list_item(&format!("{kind}: {count}"));
        }
        out.key_value("Files to generate", &self.artifacts.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::RecordingOutput;

    #[test]
    fn test_render_invalid() {
        let report = CheckReport {
            config_path: PathBuf::from("enlist.toml"),
            namespace: "demo".into(),
            registered: 0,
            by_kind: Vec::new(),
            artifacts: 0,
            errors: vec!["error: construction failed (kind `block`, entry `demo:torch`)".into()],
        };

        let mut out = RecordingOutput::default();
        report.render(&mut out);

        insta::assert_snapshot!(out.text(), @r"
        error: construction failed (kind `block`, entry `demo:torch`)

        ✗ enlist.toml has 1 error(s)
        ");
    }

    #[test]
    fn test_render_valid() {
        let report = CheckReport {
            config_path: PathBuf::from("enlist.toml"),
            namespace: "demo".into(),
            registered: 2,
            by_kind: vec![("block".into(), 1), ("item".into(), 1)],
            artifacts: 1,
            errors: Vec::new(),
        };

        let mut out = RecordingOutput::default();
        report.render(&mut out);

        assert!(report.is_valid());
        insta::assert_snapshot!(out.text(), @r"
        ✓ enlist.toml is valid

        2 entries in 'demo':
          - block: 1
          - item: 1
        Files to generate: 1
        ");
    }
}
