//! Authoring, registering and generating a small content set.

use enlist_core::{ResourceId, Side, Sides};
use enlist_datagen::{ArtifactSet, LangExt, LangGenerator, TagsExt, lang_kind, tags_kind};
use enlist_registry::{
    Builder, GenerateSignal, GenerationSession, MemoryRegistry, ObjectKind, Registrar,
};
use tempfile::TempDir;

#[derive(Debug)]
struct Block {
    light: u8,
}

#[derive(Debug)]
struct Item {
    places: ResourceId,
}

fn id(s: &str) -> ResourceId {
    s.parse().unwrap()
}

struct Kinds {
    blocks: ObjectKind<Block>,
    items: ObjectKind<Item>,
}

fn author(registrar: &Registrar) -> Kinds {
    let blocks = ObjectKind::<Block>::new("block");
    let items = ObjectKind::<Item>::new("item");
    let mut session = registrar.session();

    session
        .open("polished_andesite")
        .simple(&blocks, |_| Ok(Block { light: 0 }))
        .unwrap()
        .default_lang()
        .build()
        .unwrap()
        .open("torch")
        .simple(&blocks, |_| Ok(Block { light: 14 }))
        .unwrap()
        .lang("Wall Torch")
        .tags([id("demo:lights"), id("minecraft:wall_post_override")])
        .child(&items, |ctx| {
            Ok(Item {
                places: ctx.id.clone(),
            })
        })
        .build()
        .unwrap()
        .build()
        .unwrap()
        .open("lantern")
        .simple(&blocks, |_| Ok(Block { light: 15 }))
        .unwrap()
        .tags([id("demo:lights")])
        .build()
        .unwrap();

    registrar.add_data_generator(&lang_kind(), |lang: &mut LangGenerator| {
        lang.add("itemGroup.demo", "Demo");
        Ok(())
    });

    Kinds { blocks, items }
}

fn run(sides: Sides) -> (Kinds, MemoryRegistry, ArtifactSet) {
    let registrar = Registrar::new("demo").unwrap();
    let kinds = author(&registrar);

    let mut host = MemoryRegistry::new();
    registrar.register_all(&mut host).unwrap();

    let signal = GenerateSignal::new(sides, GenerationSession::new("demo"));
    let output = registrar.generate(&signal).unwrap();
    assert!(!output.has_failures(), "{:?}", output.failures);

    (kinds, host, ArtifactSet::from_artifacts(output.artifacts))
}

#[test]
fn test_registers_blocks_and_items() {
    let (kinds, host, _) = run(Sides::all());

    assert_eq!(host.len(), 4);
    let blocks: Vec<_> = host
        .ids(kinds.blocks.key())
        .into_iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(blocks, ["demo:polished_andesite", "demo:torch", "demo:lantern"]);

    let torch = host.get(&kinds.blocks, &id("demo:torch")).unwrap();
    assert_eq!(torch.light, 14);
    let item = host.get(&kinds.items, &id("demo:torch")).unwrap();
    assert_eq!(item.places, id("demo:torch"));
}

#[test]
fn test_generates_lang_and_tags() {
    let (_, _, artifacts) = run(Sides::all());

    let preview = artifacts.preview();
    let paths: Vec<_> = preview.iter().map(|p| p.path.as_str()).collect();
    assert_eq!(
        paths,
        [
            "data/demo/tags/block/lights.json",
            "data/minecraft/tags/block/wall_post_override.json",
            "assets/demo/lang/en_us.json",
        ]
    );

    let lang = preview.last().unwrap();
    insta::assert_snapshot!(lang.content.trim_end(), @r#"
    {
      "block.demo.polished_andesite": "Polished Andesite",
      "block.demo.torch": "Wall Torch",
      "itemGroup.demo": "Demo"
    }
    "#);

    let lights = &preview[0];
    insta::assert_snapshot!(lights.content.trim_end(), @r#"
    {
      "replace": false,
      "values": [
        "demo:torch",
        "demo:lantern"
      ]
    }
    "#);
}

#[test]
fn test_presentation_only_skips_tags() {
    let (_, _, artifacts) = run(Sides::only(Side::Presentation));

    assert_eq!(artifacts.len(), 1);
    assert_eq!(artifacts.preview()[0].generator, "lang");
}

#[test]
fn test_writes_under_output_root() {
    let temp = TempDir::new().unwrap();
    let (_, _, artifacts) = run(Sides::all());

    let stats = artifacts.write_all(temp.path()).unwrap();

    assert_eq!(stats.written, 3);
    let lang = std::fs::read_to_string(temp.path().join("assets/demo/lang/en_us.json")).unwrap();
    assert!(lang.contains("\"Wall Torch\""));
}

#[test]
fn test_tags_kind_is_authoritative() {
    assert_eq!(tags_kind().side(), Side::Authoritative);
    assert_eq!(lang_kind().side(), Side::Presentation);
}
