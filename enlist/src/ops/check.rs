//! Check operation - run both signals without writing anything.

use std::path::Path;

use enlist_core::Sides;
use enlist_manifest::Manifest;
use eyre::Result;

use super::pipeline;
use crate::reports::CheckReport;

/// Execute the check operation.
///
/// Registration failures are collected rather than raised so that every
/// broken entry shows up in one report.
pub fn check(manifest: &Manifest, config_path: &Path) -> Result<CheckReport> {
    let run = pipeline::run(manifest, Sides::all(), true)?;

    let mut errors: Vec<String> = run
        .registered
        .skipped
        .iter()
        .map(ToString::to_string)
        .collect();
    errors.extend(run.output.failures.iter().map(ToString::to_string));

    Ok(CheckReport {
        config_path: config_path.to_path_buf(),
        namespace: manifest.namespace().to_string(),
        registered: run.host.len(),
        by_kind: run
            .kinds
            .iter()
            .map(|kind| (kind.name().to_string(), run.host.ids(kind.key()).len()))
            .collect(),
        artifacts: run.output.artifacts.len(),
        errors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_valid_manifest() {
        let manifest: Manifest = r#"
[registrar]
namespace = "demo"

[[entries]]
name = "torch"
kind = "block"
tags = ["lights"]
"#
        .parse()
        .unwrap();

        let report = check(&manifest, Path::new("enlist.toml")).unwrap();

        assert!(report.is_valid());
        assert_eq!(report.registered, 1);
        assert_eq!(report.artifacts, 2);
    }
}
