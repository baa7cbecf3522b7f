//! The `lang` generator kind: English display names.

use std::collections::BTreeMap;

use enlist_core::{Artifact, Side, to_english_name};
use enlist_registry::{Builder, DataGenerator, GeneratorKind, register_generator};

thread_local! {
    static LANG: GeneratorKind<LangGenerator> =
        register_generator("lang", Side::Presentation, |_, session| {
            LangGenerator::new(session.namespace())
        });
}

/// The `lang` generator kind, registered on first access.
pub fn lang_kind() -> GeneratorKind<LangGenerator> {
    LANG.with(Clone::clone)
}

/// Collects translation keys and their English display names.
///
/// Produces a single `assets/<namespace>/lang/en_us.json` with keys in sorted
/// order, or nothing when no translation was added.
#[derive(Debug, Default)]
pub struct LangGenerator {
    namespace: String,
    entries: BTreeMap<String, String>,
}

impl LangGenerator {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            entries: BTreeMap::new(),
        }
    }

    /// Add a translation. Adding the same key again keeps the last value.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        if let Some(previous) = self.entries.insert(key.clone(), value.into()) {
            tracing::debug!(%key, %previous, "translation replaced");
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn path(&self) -> String {
        format!(
            "{}/{}/lang/en_us.json",
            Side::Presentation.root_dir(),
            self.namespace
        )
    }
}

impl DataGenerator for LangGenerator {
    fn finish(self) -> eyre::Result<Vec<Artifact>> {
        if self.entries.is_empty() {
            return Ok(Vec::new());
        }

        let content = serde_json::to_string_pretty(&self.entries)?;
        Ok(vec![Artifact::new(
            self.path(),
            format!("{content}\n"),
            Side::Presentation,
            "lang",
        )])
    }
}

/// Display-name methods for every builder.
///
/// The translation key is `<kind>.<namespace>.<path>`, e.g.
/// `block.demo.polished_andesite`. Both methods set the entry's `lang`
/// callback, so the last one called wins.
pub trait LangExt: Builder {
    /// Use `name` as the entry's English name.
    fn lang(self, name: &str) -> Self {
        let name = name.to_string();
        self.data(&lang_kind(), move |ctx, lang: &mut LangGenerator| {
            let key = ctx.id()?.translation_key(ctx.kind().name());
            lang.add(key, name.as_str());
            Ok(())
        })
    }

    /// Derive the English name from the entry name.
    fn default_lang(self) -> Self {
        self.data(&lang_kind(), |ctx, lang: &mut LangGenerator| {
            let key = ctx.id()?.translation_key(ctx.kind().name());
            lang.add(key, to_english_name(ctx.name()));
            Ok(())
        })
    }
}

impl<B: Builder> LangExt for B {}
