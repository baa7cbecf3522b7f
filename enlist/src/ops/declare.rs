//! Declaring manifest entries on a registrar.
//!
//! Root entries go through an authoring session so they pick up the
//! manifest's default group. Nested entries are opened with
//! [`SimpleBuilder::child`] on their parent's builder and inherit its group.
//! Both get their names and tags through [`LangExt`]/[`TagsExt`].

use enlist_core::ResourceId;
use enlist_datagen::{LangExt, TagsExt};
use enlist_manifest::{EntrySpec, Manifest};
use enlist_registry::{BuildContext, Builder, ObjectKind, Registrar, SimpleBuilder};
use eyre::Result;

/// The object every manifest entry constructs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentEntry {
    pub id: ResourceId,
    pub kind: String,
    pub group: Option<ResourceId>,
    /// Kind of the same-named entry this one is nested under.
    pub parent: Option<String>,
}

/// Object kinds created for one manifest, in first-use order.
#[derive(Debug, Default)]
pub struct ContentKinds {
    kinds: Vec<ObjectKind<ContentEntry>>,
}

impl ContentKinds {
    pub fn get(&self, name: &str) -> Option<&ObjectKind<ContentEntry>> {
        self.kinds.iter().find(|kind| kind.name() == name)
    }

    fn get_or_create(&mut self, name: &str) -> ObjectKind<ContentEntry> {
        if let Some(kind) = self.get(name) {
            return kind.clone();
        }
        let kind = ObjectKind::new(name);
        self.kinds.push(kind.clone());
        kind
    }

    pub fn iter(&self) -> impl Iterator<Item = &ObjectKind<ContentEntry>> {
        self.kinds.iter()
    }
}

/// Declare every manifest entry on `registrar`.
pub fn declare(registrar: &Registrar, manifest: &Manifest) -> Result<ContentKinds> {
    let namespace = manifest.namespace();
    let mut kinds = ContentKinds::default();
    for name in manifest.kinds() {
        kinds.get_or_create(name);
    }

    let mut session = registrar.session();
    if let Some(group) = manifest.default_group_id()? {
        session.set_default_group(move || group);
    }

    for entry in manifest.roots() {
        let kind = kinds.get_or_create(&entry.kind);
        let builder = session
            .open(entry.name.as_str())
            .simple(&kind, factory(entry))?;
        let mut builder = with_data(with_group(builder, entry, namespace)?, entry, namespace)?;

        for child in manifest.children_of(entry) {
            let child_kind = kinds.get_or_create(&child.kind);
            let nested = builder.child(&child_kind, factory(child));
            let nested = with_data(with_group(nested, child, namespace)?, child, namespace)?;
            builder = nested.build()?;
        }

        builder.build()?;
    }

    tracing::info!(
        entries = manifest.entries.len(),
        kinds = kinds.kinds.len(),
        "declared manifest entries"
    );
    Ok(kinds)
}

fn factory(entry: &EntrySpec) -> impl FnOnce(&BuildContext) -> eyre::Result<ContentEntry> + 'static {
    let kind = entry.kind.clone();
    let parent = entry.parent.clone();
    move |ctx: &BuildContext| {
        Ok(ContentEntry {
            id: ctx.id.clone(),
            kind,
            group: ctx.group.clone(),
            parent,
        })
    }
}

fn with_group<P>(
    builder: SimpleBuilder<ContentEntry, P>,
    entry: &EntrySpec,
    namespace: &str,
) -> Result<SimpleBuilder<ContentEntry, P>> {
    Ok(match entry.group_id(namespace)? {
        Some(group) => builder.group(group),
        None => builder,
    })
}

fn with_data<B: Builder>(builder: B, entry: &EntrySpec, namespace: &str) -> Result<B> {
    let builder = match &entry.lang {
        Some(name) => builder.lang(name),
        None => builder.default_lang(),
    };

    let tags = entry.tag_ids(namespace)?;
    Ok(if tags.is_empty() {
        builder
    } else {
        builder.tags(tags)
    })
}

#[cfg(test)]
mod tests {
    use enlist_registry::MemoryRegistry;

    use super::*;

    const MANIFEST: &str = r#"
default_group = "building"

[registrar]
namespace = "demo"

[[entries]]
name = "torch"
kind = "block"
group = "lighting"

[[entries]]
name = "torch"
kind = "item"
parent = "block"

[[entries]]
name = "andesite"
kind = "block"
"#;

    fn registered() -> (ContentKinds, MemoryRegistry) {
        let manifest: Manifest = MANIFEST.parse().unwrap();
        let registrar = Registrar::with_config(manifest.registrar.clone()).unwrap();
        let kinds = declare(&registrar, &manifest).unwrap();

        let mut host = MemoryRegistry::new();
        registrar.register_all(&mut host).unwrap();
        (kinds, host)
    }

    fn id(s: &str) -> ResourceId {
        s.parse().unwrap()
    }

    #[test]
    fn test_kinds_in_first_use_order() {
        let (kinds, _) = registered();
        let names: Vec<_> = kinds.iter().map(|k| k.name()).collect();
        assert_eq!(names, ["block", "item"]);
    }

    #[test]
    fn test_groups() {
        let (kinds, host) = registered();
        let blocks = kinds.get("block").unwrap();
        let items = kinds.get("item").unwrap();

        let torch = host.get(blocks, &id("demo:torch")).unwrap();
        assert_eq!(torch.group, Some(id("demo:lighting")));

        // Nested entries inherit the parent's group.
        let item = host.get(items, &id("demo:torch")).unwrap();
        assert_eq!(item.group, Some(id("demo:lighting")));
        assert_eq!(item.parent.as_deref(), Some("block"));

        let andesite = host.get(blocks, &id("demo:andesite")).unwrap();
        assert_eq!(andesite.group, Some(id("demo:building")));
    }
}
