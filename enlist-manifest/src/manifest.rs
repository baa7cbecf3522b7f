//! Manifest types and parsing for enlist.toml files.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    str::FromStr,
};

use enlist_core::{IdError, ResourceId, Sides};
use enlist_registry::RegistrarConfig;
use serde::Deserialize;

use crate::{
    Error, Result,
    error::SourceContext,
    validate::{find_assignment_span, find_quoted_span, is_kind_name},
};

/// Root manifest for enlist.toml
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Registrar settings
    pub registrar: RegistrarConfig,

    /// Group for entries that do not set one
    #[serde(default)]
    pub default_group: Option<String>,

    /// Where and what to generate
    #[serde(default)]
    pub output: OutputConfig,

    /// Entries to declare, in declaration order
    #[serde(default)]
    pub entries: Vec<EntrySpec>,
}

/// One `[[entries]]` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntrySpec {
    pub name: String,
    pub kind: String,
    /// English display name. Derived from the name when absent.
    #[serde(default)]
    pub lang: Option<String>,
    /// Tags to add the entry to; bare paths use the registrar namespace.
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub group: Option<String>,
    /// Kind of the same-named entry this one is nested under.
    #[serde(default)]
    pub parent: Option<String>,
}

/// The `[output]` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Output root, relative to the manifest.
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    #[serde(default)]
    pub sides: Sides,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("generated")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            sides: Sides::all(),
        }
    }
}

/// Resolve `value` to an id, defaulting the namespace when it has none.
pub fn resolve_id(value: &str, namespace: &str) -> std::result::Result<ResourceId, IdError> {
    if value.contains(':') {
        value.parse()
    } else {
        ResourceId::new(namespace, value)
    }
}

impl Manifest {
    pub fn namespace(&self) -> &str {
        &self.registrar.namespace
    }

    pub fn default_group_id(&self) -> std::result::Result<Option<ResourceId>, IdError> {
        self.default_group
            .as_deref()
            .map(|group| resolve_id(group, self.namespace()))
            .transpose()
    }

    /// Kind names in first-use order.
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = Vec::new();
        for entry in &self.entries {
            if !kinds.contains(&entry.kind.as_str()) {
                kinds.push(&entry.kind);
            }
        }
        kinds
    }

    /// Entries that are not nested under another entry.
    pub fn roots(&self) -> impl Iterator<Item = &EntrySpec> {
        self.entries.iter().filter(|entry| !entry.is_child())
    }

    /// Entries nested directly under `parent`.
    pub fn children_of<'a>(&'a self, parent: &'a EntrySpec) -> impl Iterator<Item = &'a EntrySpec> {
        self.entries.iter().filter(move |entry| {
            entry.name == parent.name && entry.parent.as_deref() == Some(parent.kind.as_str())
        })
    }
}

impl EntrySpec {
    pub fn is_child(&self) -> bool {
        self.parent.is_some()
    }

    pub fn tag_ids(&self, namespace: &str) -> std::result::Result<Vec<ResourceId>, IdError> {
        self.tags
            .iter()
            .map(|tag| resolve_id(tag, namespace))
            .collect()
    }

    pub fn group_id(&self, namespace: &str) -> std::result::Result<Option<ResourceId>, IdError> {
        self.group
            .as_deref()
            .map(|group| resolve_id(group, namespace))
            .transpose()
    }
}

impl FromStr for Manifest {
    type Err = Box<Error>;

    fn from_str(s: &str) -> Result<Self> {
        parse_manifest(s, "enlist.toml")
    }
}

impl Manifest {
    /// Parse an enlist.toml file from the given path.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Box::new(Error::Io {
                path: path.to_path_buf(),
                source: e,
            })
        })?;
        parse_manifest(&content, &path.display().to_string())
    }

    /// Parse an enlist.toml from a string with a custom filename for error reporting.
    pub fn from_str_with_filename(content: &str, filename: &str) -> Result<Self> {
        parse_manifest(content, filename)
    }
}

/// Parse a manifest from content with the given filename for error reporting.
pub fn parse_manifest(content: &str, filename: &str) -> Result<Manifest> {
    let source_ctx = SourceContext::new(content, filename);
    let manifest: Manifest = toml::from_str(content).map_err(|e| source_ctx.parse_error(e))?;
    validate_manifest(&manifest, &source_ctx)?;
    Ok(manifest)
}

/// Counts how often a value has been seen, to pick the matching span.
#[derive(Default)]
struct Occurrences<'a>(HashMap<&'a str, usize>);

impl<'a> Occurrences<'a> {
    fn next(&mut self, value: &'a str) -> usize {
        let count = self.0.entry(value).or_default();
        let nth = *count;
        *count += 1;
        nth
    }
}

/// An entry already validated, for duplicate and parent checks.
struct Declared<'a> {
    name: &'a str,
    kind: &'a str,
    is_child: bool,
    span: Option<miette::SourceSpan>,
}

fn validate_manifest(manifest: &Manifest, ctx: &SourceContext) -> Result<()> {
    let src = ctx.src();
    let namespace = manifest.namespace();

    ResourceId::new(namespace, "probe").map_err(|err| {
        ctx.invalid_id_error(
            namespace,
            "namespace",
            reason(&err),
            find_assignment_span(src, "namespace", namespace, 0),
        )
    })?;

    if let Some(group) = &manifest.default_group {
        resolve_id(group, namespace).map_err(|err| {
            ctx.invalid_id_error(
                group,
                "group",
                reason(&err),
                find_assignment_span(src, "default_group", group, 0),
            )
        })?;
    }

    let mut names = Occurrences::default();
    let mut parents = Occurrences::default();
    let mut declared: Vec<Declared<'_>> = Vec::new();

    for entry in &manifest.entries {
        let name_span = find_assignment_span(src, "name", &entry.name, names.next(&entry.name));

        ResourceId::new(namespace, entry.name.as_str()).map_err(|err| {
            ctx.invalid_id_error(&entry.name, "entry name", reason(&err), name_span)
        })?;

        if !is_kind_name(&entry.kind) {
            return Err(ctx.validation_error(
                format!(
                    "invalid kind `{}`: use lowercase letters, digits and `_`",
                    entry.kind
                ),
                find_assignment_span(src, "kind", &entry.kind, 0),
            ));
        }

        if let Some(first) = declared
            .iter()
            .find(|d| d.name == entry.name && d.kind == entry.kind)
        {
            return Err(ctx.duplicate_entry_error(
                &entry.name,
                &entry.kind,
                first.span,
                name_span,
            ));
        }

        if let Some(parent) = &entry.parent {
            let parent_span = find_assignment_span(src, "parent", parent, parents.next(parent));
            let found = declared
                .iter()
                .find(|d| d.name == entry.name && d.kind == parent.as_str());
            match found {
                None => return Err(ctx.unknown_parent_error(&entry.name, parent, parent_span)),
                Some(parent_entry) if parent_entry.is_child => {
                    return Err(ctx.validation_error(
                        format!(
                            "entry '{}' of kind `{}` is itself nested; only one level of nesting is supported",
                            entry.name, parent
                        ),
                        parent_span,
                    ));
                }
                Some(_) => {}
            }
        }

        if entry.lang.as_deref().is_some_and(|lang| lang.trim().is_empty()) {
            return Err(ctx.validation_error(
                format!("lang of entry '{}' is empty", entry.name),
                name_span,
            ));
        }

        for tag in &entry.tags {
            resolve_id(tag, namespace).map_err(|err| {
                ctx.invalid_id_error(tag, "tag", reason(&err), find_quoted_span(src, tag, 0))
            })?;
        }

        if let Some(group) = &entry.group {
            resolve_id(group, namespace).map_err(|err| {
                ctx.invalid_id_error(
                    group,
                    "group",
                    reason(&err),
                    find_assignment_span(src, "group", group, 0),
                )
            })?;
        }

        declared.push(Declared {
            name: &entry.name,
            kind: &entry.kind,
            is_child: entry.is_child(),
            span: name_span,
        });
    }

    Ok(())
}

fn reason(err: &IdError) -> String {
    let message = err.to_string();
    let mut chars = message.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"
[registrar]
namespace = "demo"
strict = true

[output]
dir = "out"

[output.sides]
presentation = false

[[entries]]
name = "torch"
kind = "block"
lang = "Wall Torch"
tags = ["lights", "minecraft:wall_post_override"]
group = "demo:lighting"

[[entries]]
name = "torch"
kind = "item"
parent = "block"

[[entries]]
name = "polished_andesite"
kind = "block"
"#;

    #[test]
    fn test_parse_manifest() {
        let manifest: Manifest = MANIFEST.parse().unwrap();

        assert_eq!(manifest.registrar, RegistrarConfig::new("demo").strict(true));
        assert_eq!(manifest.output.dir, PathBuf::from("out"));
        assert!(manifest.output.sides.authoritative);
        assert!(!manifest.output.sides.presentation);
        assert_eq!(manifest.entries.len(), 3);
        assert_eq!(manifest.kinds(), ["block", "item"]);
    }

    #[test]
    fn test_defaults() {
        let manifest: Manifest = "[registrar]\nnamespace = \"demo\"".parse().unwrap();

        assert_eq!(manifest.output, OutputConfig::default());
        assert!(manifest.entries.is_empty());
        assert!(!manifest.registrar.skip_errors);
    }

    #[test]
    fn test_roots_and_children() {
        let manifest: Manifest = MANIFEST.parse().unwrap();

        let roots: Vec<_> = manifest.roots().map(|e| e.name.as_str()).collect();
        assert_eq!(roots, ["torch", "polished_andesite"]);

        let torch = &manifest.entries[0];
        let children: Vec<_> = manifest.children_of(torch).map(|e| e.kind.as_str()).collect();
        assert_eq!(children, ["item"]);
        assert_eq!(manifest.children_of(&manifest.entries[2]).count(), 0);
    }

    #[test]
    fn test_resolve_ids() {
        let manifest: Manifest = MANIFEST.parse().unwrap();
        let torch = &manifest.entries[0];

        let tags: Vec<_> = torch
            .tag_ids("demo")
            .unwrap()
            .into_iter()
            .map(|id| id.to_string())
            .collect();
        assert_eq!(tags, ["demo:lights", "minecraft:wall_post_override"]);
        assert_eq!(
            torch.group_id("demo").unwrap().map(|id| id.to_string()),
            Some("demo:lighting".to_string())
        );
        assert_eq!(manifest.entries[1].group_id("demo").unwrap(), None);
    }

    #[test]
    fn test_parse_error() {
        let err = parse_manifest("[registrar]\nnamespace = ", "enlist.toml").unwrap_err();
        assert!(matches!(*err, Error::Parse { .. }));
    }

    #[test]
    fn test_unknown_field_is_a_parse_error() {
        let src = "[registrar]\nnamespace = \"demo\"\n\n[[entries]]\nname = \"torch\"\nkind = \"block\"\nlight = 14\n";
        let err = parse_manifest(src, "enlist.toml").unwrap_err();
        assert!(matches!(*err, Error::Parse { .. }));
    }

    #[test]
    fn test_invalid_namespace() {
        let err = parse_manifest("[registrar]\nnamespace = \"Demo\"", "enlist.toml").unwrap_err();
        assert!(matches!(*err, Error::InvalidId { ref field, .. } if field == "namespace"));
    }

    #[test]
    fn test_invalid_kind() {
        let src = "[registrar]\nnamespace = \"demo\"\n\n[[entries]]\nname = \"torch\"\nkind = \"Block\"\n";
        let err = parse_manifest(src, "enlist.toml").unwrap_err();
        insta::assert_snapshot!(err.to_string(), @"invalid kind `Block`: use lowercase letters, digits and `_`");
    }

    #[test]
    fn test_invalid_tag() {
        let src = "[registrar]\nnamespace = \"demo\"\n\n[[entries]]\nname = \"torch\"\nkind = \"block\"\ntags = [\"Lights\"]\n";
        let err = parse_manifest(src, "enlist.toml").unwrap_err();
        match *err {
            Error::InvalidId { value, span, .. } => {
                assert_eq!(value, "Lights");
                let span = span.unwrap();
                assert_eq!(&src[span.offset()..span.offset() + span.len()], "Lights");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_duplicate_entry_points_at_both() {
        let src = "[registrar]\nnamespace = \"demo\"\n\n[[entries]]\nname = \"torch\"\nkind = \"block\"\n\n[[entries]]\nname = \"torch\"\nkind = \"block\"\n";
        let err = parse_manifest(src, "enlist.toml").unwrap_err();
        insta::assert_snapshot!(err.to_string(), @"entry 'torch' of kind `block` is declared twice");
        match *err {
            Error::DuplicateEntry {
                first_span,
                second_span,
                ..
            } => {
                assert!(first_span.unwrap().offset() < second_span.unwrap().offset());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parent_must_come_first() {
        let src = "[registrar]\nnamespace = \"demo\"\n\n[[entries]]\nname = \"torch\"\nkind = \"item\"\nparent = \"block\"\n\n[[entries]]\nname = \"torch\"\nkind = \"block\"\n";
        let err = parse_manifest(src, "enlist.toml").unwrap_err();
        insta::assert_snapshot!(err.to_string(), @"entry 'torch' has no parent of kind `block`");
    }

    #[test]
    fn test_nesting_is_one_level() {
        let src = "[registrar]\nnamespace = \"demo\"\n\n[[entries]]\nname = \"torch\"\nkind = \"block\"\n\n[[entries]]\nname = \"torch\"\nkind = \"item\"\nparent = \"block\"\n\n[[entries]]\nname = \"torch\"\nkind = \"model\"\nparent = \"item\"\n";
        let err = parse_manifest(src, "enlist.toml").unwrap_err();
        assert!(err.to_string().contains("only one level of nesting"));
    }

    #[test]
    fn test_default_group() {
        let manifest: Manifest = "default_group = \"lighting\"\n\n[registrar]\nnamespace = \"demo\""
            .parse()
            .unwrap();
        assert_eq!(
            manifest.default_group_id().unwrap().map(|id| id.to_string()),
            Some("demo:lighting".to_string())
        );
    }

    #[test]
    fn test_empty_lang() {
        let src = "[registrar]\nnamespace = \"demo\"\n\n[[entries]]\nname = \"torch\"\nkind = \"block\"\nlang = \" \"\n";
        let err = parse_manifest(src, "enlist.toml").unwrap_err();
        assert!(matches!(*err, Error::Validation { .. }));
    }
}
