//! Register-phase behavior of the registrar.

use std::{cell::Cell, rc::Rc};

use enlist_core::ResourceId;
use enlist_registry::{
    Builder, Error, MemoryRegistry, ObjectKind, Phase, RegisterSink, Registrar, RegistrarConfig,
};
use eyre::eyre;

#[derive(Debug, PartialEq)]
struct Block(&'static str);

#[derive(Debug, PartialEq)]
struct Item(&'static str);

fn counting(
    calls: &Rc<Cell<u32>>,
    value: &'static str,
) -> impl FnOnce(&ResourceId) -> eyre::Result<Block> + 'static {
    let calls = Rc::clone(calls);
    move |_: &ResourceId| {
        calls.set(calls.get() + 1);
        Ok(Block(value))
    }
}

#[test]
fn test_torch_resolves_to_cached_object() {
    let registrar = Registrar::new("demo").unwrap();
    let blocks = ObjectKind::<Block>::new("block");
    let calls = Rc::new(Cell::new(0));

    registrar
        .declare("torch", &blocks, counting(&calls, "X"))
        .unwrap();
    let handle = registrar.get("torch", &blocks).unwrap();
    assert!(matches!(handle.get(), Err(Error::NotYetPresent { .. })));

    let mut host = MemoryRegistry::new();
    registrar.register_all(&mut host).unwrap();

    let first = handle.get().unwrap();
    let second = registrar.get("torch", &blocks).unwrap().get().unwrap();
    assert_eq!(*first, Block("X"));
    assert!(Rc::ptr_eq(&first, &second));
    assert_eq!(calls.get(), 1);
    assert_eq!(
        host.get(&blocks, handle.id()).as_deref(),
        Some(&Block("X"))
    );
}

#[test]
fn test_redeclare_last_write_wins() {
    let registrar = Registrar::new("demo").unwrap();
    let blocks = ObjectKind::<Block>::new("block");
    let first_calls = Rc::new(Cell::new(0));
    let second_calls = Rc::new(Cell::new(0));

    let early = registrar
        .declare("torch", &blocks, counting(&first_calls, "first"))
        .unwrap();
    registrar
        .declare("torch", &blocks, counting(&second_calls, "second"))
        .unwrap();

    registrar.register_all(&mut MemoryRegistry::new()).unwrap();

    assert_eq!(*registrar.get("torch", &blocks).unwrap().get().unwrap(), Block("second"));
    assert_eq!(*early.get().unwrap(), Block("second"));
    assert_eq!(first_calls.get(), 0);
    assert_eq!(second_calls.get(), 1);
    assert_eq!(registrar.len(), 1);
}

#[test]
fn test_strict_mode_rejects_duplicates() {
    let registrar = Registrar::with_config(RegistrarConfig::new("demo").strict(true)).unwrap();
    let blocks = ObjectKind::<Block>::new("block");

    registrar.declare("torch", &blocks, |_| Ok(Block("a"))).unwrap();
    let err = registrar
        .declare("torch", &blocks, |_| Ok(Block("b")))
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "duplicate registration 'torch' of kind `block` (strict mode)"
    );
}

#[test]
fn test_get_all_is_a_snapshot() {
    let registrar = Registrar::new("demo").unwrap();
    let blocks = ObjectKind::<Block>::new("block");

    registrar.declare("a", &blocks, |_| Ok(Block("a"))).unwrap();
    let snapshot = registrar.get_all(&blocks);
    registrar.declare("b", &blocks, |_| Ok(Block("b"))).unwrap();

    let names: Vec<_> = snapshot.iter().map(|h| h.name().to_string()).collect();
    assert_eq!(names, vec!["a"]);
    assert_eq!(registrar.get_all(&blocks).len(), 2);
}

#[test]
fn test_lookup_unknown_is_error() {
    let registrar = Registrar::new("demo").unwrap();
    let blocks = ObjectKind::<Block>::new("block");

    let err = registrar.get("torch", &blocks).unwrap_err();
    assert!(matches!(err, Error::UnknownRegistration { .. }));
    assert!(!registrar.is_registered(&blocks));
}

#[test]
fn test_failure_aborts_kind_but_not_other_kinds() {
    let registrar = Registrar::new("demo").unwrap();
    let blocks = ObjectKind::<Block>::new("block");
    let items = ObjectKind::<Item>::new("item");

    let stone = registrar.declare("stone", &blocks, |_| Ok(Block("stone"))).unwrap();
    let torch = registrar
        .declare("torch", &blocks, |_| Err(eyre!("no light level")))
        .unwrap();
    let lamp = registrar.declare("lamp", &blocks, |_| Ok(Block("lamp"))).unwrap();
    let stick = registrar.declare("stick", &items, |_| Ok(Item("stick"))).unwrap();

    let mut host = MemoryRegistry::new();
    let err = registrar.register_all(&mut host).unwrap_err();

    let Error::RegistrationFailed { failures } = err else {
        panic!("expected RegistrationFailed");
    };
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].kind, "block");
    assert_eq!(failures[0].entry.as_deref(), Some("demo:torch"));

    assert!(stone.is_present());
    assert!(!torch.is_present());
    assert!(!lamp.is_present());
    assert!(stick.is_present());
    assert_eq!(host.len(), 2);
}

#[test]
fn test_skip_errors_reports_instead_of_failing() {
    let config = RegistrarConfig::new("demo").skip_errors(true);
    let registrar = Registrar::with_config(config).unwrap();
    let blocks = ObjectKind::<Block>::new("block");

    registrar
        .declare("torch", &blocks, |_| Err(eyre!("no light level")))
        .unwrap();
    registrar.declare("stone", &blocks, |_| Ok(Block("stone"))).unwrap();

    let report = registrar.register_all(&mut MemoryRegistry::new()).unwrap();

    assert_eq!(report.published, 0);
    assert_eq!(report.skipped.len(), 1);
    assert!(report.skipped[0].message.contains("no light level"));
}

#[test]
fn test_host_rejection_is_a_failure() {
    let registrar = Registrar::new("demo").unwrap();
    let blocks = ObjectKind::<Block>::new("block");
    let torch = registrar.declare("torch", &blocks, |_| Ok(Block("t"))).unwrap();

    let mut host = MemoryRegistry::new();
    host.publish(blocks.key(), torch.id(), Rc::new(Block("already")))
        .unwrap();

    let err = registrar.register_all(&mut host).unwrap_err();
    assert!(err.to_string().contains("host rejected entry"));
    assert!(!torch.is_present());
}

#[test]
fn test_register_walk_order_and_report() {
    let registrar = Registrar::new("demo").unwrap();
    let blocks = ObjectKind::<Block>::new("block");
    let items = ObjectKind::<Item>::new("item");

    registrar.declare("stick", &items, |_| Ok(Item("stick"))).unwrap();
    registrar.declare("torch", &blocks, |_| Ok(Block("torch"))).unwrap();
    registrar.declare("lamp", &blocks, |_| Ok(Block("lamp"))).unwrap();

    let mut host = MemoryRegistry::new();
    let report = registrar.register_all(&mut host).unwrap();

    assert_eq!(report.published, 3);
    let by_kind: Vec<_> = report.by_kind.iter().map(|(k, n)| (k.as_str(), *n)).collect();
    assert_eq!(by_kind, vec![("item", 1), ("block", 2)]);
    let block_ids: Vec<_> = host.ids(blocks.key()).iter().map(|id| id.path()).collect();
    assert_eq!(block_ids, vec!["torch", "lamp"]);
}

#[test]
fn test_thunk_can_resolve_earlier_kind() {
    let registrar = Registrar::new("demo").unwrap();
    let blocks = ObjectKind::<Block>::new("block");
    let items = ObjectKind::<Item>::new("item");

    let torch = registrar.declare("torch", &blocks, |_| Ok(Block("torch"))).unwrap();
    let lookup = registrar.clone();
    let block_kind = blocks.clone();
    registrar
        .declare("torch", &items, move |_| {
            let block = lookup.get("torch", &block_kind)?.get()?;
            Ok(Item(block.0))
        })
        .unwrap();

    registrar.register_all(&mut MemoryRegistry::new()).unwrap();

    assert!(torch.is_present());
    assert_eq!(*registrar.get("torch", &items).unwrap().get().unwrap(), Item("torch"));
}

#[test]
fn test_kind_callbacks_run_after_kind() {
    let registrar = Registrar::new("demo").unwrap();
    let blocks = ObjectKind::<Block>::new("block");
    let torch = registrar.declare("torch", &blocks, |_| Ok(Block("t"))).unwrap();
    let seen = Rc::new(Cell::new(false));

    let flag = Rc::clone(&seen);
    let handle = torch.clone();
    registrar.after_kind_registered(&blocks, move || {
        flag.set(handle.is_present());
        Ok(())
    });

    registrar.register_all(&mut MemoryRegistry::new()).unwrap();
    assert!(seen.get());
}

#[test]
fn test_phases_run_once() {
    let registrar = Registrar::new("demo").unwrap();
    let blocks = ObjectKind::<Block>::new("block");

    assert_eq!(registrar.phase(), Phase::Authoring);
    registrar.register_all(&mut MemoryRegistry::new()).unwrap();
    assert_eq!(registrar.phase(), Phase::Registered);

    let err = registrar.register_all(&mut MemoryRegistry::new()).unwrap_err();
    assert!(matches!(err, Error::PhaseAlreadyRan("register")));

    let err = registrar
        .simple("torch", &blocks, |_| Ok(Block("late")))
        .register()
        .unwrap_err();
    assert!(matches!(err, Error::LateRegistration { .. }));
}
