//! The `tags` generator kind: tag membership lists.

use std::collections::BTreeMap;

use enlist_core::{Artifact, ResourceId, Side};
use enlist_registry::{Builder, DataGenerator, GeneratorKind, register_generator};
use indexmap::IndexSet;
use serde::Serialize;

thread_local! {
    static TAGS: GeneratorKind<TagsGenerator> =
        register_generator("tags", Side::Authoritative, |_, _| TagsGenerator::new());
}

/// The `tags` generator kind, registered on first access.
pub fn tags_kind() -> GeneratorKind<TagsGenerator> {
    TAGS.with(Clone::clone)
}

#[derive(Serialize)]
struct TagFile<'a> {
    replace: bool,
    values: Vec<&'a str>,
}

/// Collects tag members, grouped by object kind and tag id.
///
/// Each (kind, tag) pair becomes one file at
/// `data/<tag namespace>/tags/<kind>/<tag path>.json`. Members keep the order
/// they were added in and are never duplicated.
#[derive(Debug, Default)]
pub struct TagsGenerator {
    tags: BTreeMap<(String, ResourceId), IndexSet<String>>,
}

impl TagsGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, kind: &str, tag: &ResourceId, member: impl Into<String>) {
        self.tags
            .entry((kind.to_string(), tag.clone()))
            .or_default()
            .insert(member.into());
    }

    pub fn members(&self, kind: &str, tag: &ResourceId) -> Vec<&str> {
        self.tags
            .get(&(kind.to_string(), tag.clone()))
            .map(|members| members.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Number of tag files this generator will write.
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl DataGenerator for TagsGenerator {
    fn finish(self) -> eyre::Result<Vec<Artifact>> {
        let mut artifacts = Vec::with_capacity(self.tags.len());

        for ((kind, tag), members) in &self.tags {
            let file = TagFile {
                replace: false,
                values: members.iter().map(String::as_str).collect(),
            };
            let path = format!(
                "{}/{}/tags/{}/{}.json",
                Side::Authoritative.root_dir(),
                tag.namespace(),
                kind,
                tag.path()
            );
            let content = serde_json::to_string_pretty(&file)?;
            artifacts.push(Artifact::new(
                path,
                format!("{content}\n"),
                Side::Authoritative,
                "tags",
            ));
        }

        Ok(artifacts)
    }
}

/// Tag membership for every builder.
pub trait TagsExt: Builder {
    /// Add the entry to each of `tags`, under its kind's tag folder.
    ///
    /// Replaces any tags set earlier on the same entry.
    fn tags<I>(self, tags: I) -> Self
    where
        I: IntoIterator<Item = ResourceId>,
    {
        let tags: Vec<ResourceId> = tags.into_iter().collect();
        self.data(&tags_kind(), move |ctx, generator: &mut TagsGenerator| {
            let id = ctx.id()?.to_string();
            for tag in &tags {
                generator.add(ctx.kind().name(), tag, id.as_str());
            }
            Ok(())
        })
    }
}

impl<B: Builder> TagsExt for B {}
