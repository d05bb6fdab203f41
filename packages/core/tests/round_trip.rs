//! Whole-store round trips through a real backing file.

use bitstore_core::{write_all_bits, BitKind, Bytes, Error, Store};

fn rendered(store: &Store) -> String {
    write_all_bits(store.arena(), store.roots())
}

/// Build one tree exercising every kind and both structural shapes.
fn build_sample(store: &mut Store) {
    store.init("flag", true).unwrap();
    store.append("age", 30).unwrap();
    store.append("population", 8_000_000_000i64).unwrap();
    store.append("wide", -1i128).unwrap();
    store.append("ratio", 0.5f32).unwrap();
    store.append("pi", std::f64::consts::PI).unwrap();
    store.append("initial", 'R').unwrap();
    store.append("greeting", "olá\n\"mundo\"").unwrap();
    store
        .append("blob", Bytes::from_static(&[0x00, 0xff, 0x42]))
        .unwrap();

    store.declare("people", BitKind::Container).unwrap();
    store.append_in("people", "alice", 7).unwrap();
    store
        .declare_in("people", "address", BitKind::Container)
        .unwrap();
    store
        .append_in("people.address", "city", "Lisbon")
        .unwrap();

    store.declare("scores", BitKind::Array).unwrap();
    store.iterate("scores", 1).unwrap();
    store.iterate("scores", 2).unwrap();
}

#[test]
fn push_then_pull_reproduces_the_tree() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.bits");

    let mut original = Store::new();
    build_sample(&mut original);
    original.connect(&path).unwrap();
    original.push().unwrap();

    let mut restored = Store::new();
    restored.connect(&path).unwrap();
    restored.pull().unwrap();

    assert_eq!(rendered(&restored), rendered(&original));
    assert_eq!(restored.get::<i32>("age").unwrap(), 30);
    assert_eq!(restored.get::<String>("greeting").unwrap(), "olá\n\"mundo\"");
    assert_eq!(
        restored.get_in::<String>("people.address", "city").unwrap(),
        "Lisbon"
    );
    assert_eq!(restored.get_at::<i32>("scores", 1).unwrap(), 2);
    assert_eq!(
        restored.get::<Bytes>("blob").unwrap(),
        Bytes::from_static(&[0x00, 0xff, 0x42])
    );
}

#[test]
fn typed_crud_scenario() {
    let mut store = Store::new();

    store.init("age", 30).unwrap();
    assert_eq!(store.get::<i32>("age").unwrap(), 30);

    store.declare("people", BitKind::Container).unwrap();
    store.append_in("people", "alice", 7).unwrap();
    assert_eq!(store.get_in::<i32>("people", "alice").unwrap(), 7);

    store.declare("scores", BitKind::Array).unwrap();
    store.iterate("scores", 1).unwrap();
    store.iterate("scores", 2).unwrap();
    assert_eq!(store.get_at::<i32>("scores", 0).unwrap(), 1);
    assert_eq!(store.get_at::<i32>("scores", 1).unwrap(), 2);

    // Serialize the whole store, parse it back, and compare.
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scenario.bits");
    store.connect(&path).unwrap();
    store.push().unwrap();

    let mut reparsed = Store::new();
    reparsed.connect(&path).unwrap();
    reparsed.pull().unwrap();
    assert_eq!(rendered(&reparsed), rendered(&store));
}

#[test]
fn pull_replaces_the_previous_tree() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.bits");
    std::fs::write(&path, "i fresh : 1\n").unwrap();

    let mut store = Store::new();
    store.init("stale", 99).unwrap();
    store.connect(&path).unwrap();
    store.pull().unwrap();

    assert!(matches!(
        store.get::<i32>("stale"),
        Err(Error::BitName { .. })
    ));
    assert_eq!(store.get::<i32>("fresh").unwrap(), 1);
    assert_eq!(store.arena().len(), 1);
}

#[test]
fn failed_pull_leaves_the_store_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.bits");
    std::fs::write(&path, "i ok : 1\n# box { s bad : \"unterminated\n").unwrap();

    let mut store = Store::new();
    store.init("previous", 1).unwrap();
    store.connect(&path).unwrap();

    assert!(matches!(store.pull(), Err(Error::Pull(_))));
    assert!(store.is_empty());
    assert_eq!(store.arena().len(), 0);
    // The store stays usable afterwards.
    store.init("again", 2).unwrap();
    assert_eq!(store.get::<i32>("again").unwrap(), 2);
}

#[test]
fn pull_invalidates_old_anchors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.bits");

    let mut store = Store::new();
    store.declare("people", BitKind::Container).unwrap();
    store.connect(&path).unwrap();
    store.push().unwrap();

    store.set_anchor("people").unwrap();
    store.pull().unwrap();
    assert!(matches!(store.anchor(), Err(Error::AnchorName { .. })));
}

#[test]
fn disconnect_keeps_the_tree() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.bits");

    let mut store = Store::new();
    store.init("age", 30).unwrap();
    store.connect(&path).unwrap();
    assert!(store.is_connected());

    assert!(store.disconnect());
    assert!(!store.is_connected());
    assert_eq!(store.get::<i32>("age").unwrap(), 30);
    assert!(matches!(store.push(), Err(Error::Disconnected)));

    // Reconnect and persist after all.
    store.connect(&path).unwrap();
    store.push().unwrap();
    assert!(std::fs::read_to_string(&path).unwrap().contains("i age : 30"));
}

#[test]
fn empty_store_pushes_and_pulls_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.bits");

    let mut store = Store::new();
    store.connect(&path).unwrap();
    store.push().unwrap();
    store.pull().unwrap();
    assert!(store.is_empty());
    assert_eq!(store.count("").unwrap(), 0);
}

#[test]
fn mutation_survives_a_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.bits");

    let mut store = Store::new();
    build_sample(&mut store);
    store.set("age", 31, true).unwrap();
    store.remove("flag", BitKind::Bool).unwrap();
    store.remove_at("scores", 0).unwrap();
    store.connect(&path).unwrap();
    store.push().unwrap();

    let mut restored = Store::new();
    restored.connect(&path).unwrap();
    restored.pull().unwrap();

    assert_eq!(restored.get::<i32>("age").unwrap(), 31);
    assert!(matches!(
        restored.get::<bool>("flag"),
        Err(Error::BitName { .. })
    ));
    assert_eq!(restored.count("scores").unwrap(), 1);
    assert_eq!(restored.get_at::<i32>("scores", 0).unwrap(), 2);
}
