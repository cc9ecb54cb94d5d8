//! Integration tests for `Set` handles.

use std::sync::Arc;

use remora::{Collection, MemoryStore, Record, RecordKey, Set, StoreConnection};

fn seeded(store: &Arc<MemoryStore>, name: &str, members: &[&str]) -> Set {
    let set = Set::new(name, Arc::clone(store) as Arc<dyn StoreConnection>).expect("set");
    set.copy_from(members.iter().map(|member| member.to_string()))
        .expect("seed");
    set
}

// ============================================================================
// Membership
// ============================================================================

#[test]
fn members_are_distinct_and_keep_insertion_order() {
    let store = MemoryStore::shared();
    let set = Set::new("tags", store).expect("set");

    assert!(set.add("b").expect("add"));
    assert!(set.add("a").expect("add"));
    assert!(!set.add("b").expect("duplicate add"));

    assert_eq!(set.data(false).expect("data"), ["b", "a"]);
    assert_eq!(set.count(false).expect("count"), 2);
}

#[test]
fn contains_checks_the_store() {
    let store = MemoryStore::shared();
    let set = seeded(&store, "tags", &["a", "b"]);
    assert!(set.contains("a").expect("contains"));
    assert!(!set.contains("z").expect("contains"));
}

#[test]
fn pop_and_random_hand_out_members() {
    let store = MemoryStore::shared();
    let set = seeded(&store, "single", &["m"]);

    assert_eq!(set.random().expect("random"), Some("m".to_string()));
    assert!(set.contains("m").expect("random does not remove"));

    assert_eq!(set.pop().expect("pop"), Some("m".to_string()));
    assert_eq!(set.pop().expect("pop empty"), None);
    assert!(!set.exists().expect("drained record is gone"));
}

#[test]
fn move_to_transfers_membership() {
    let store = MemoryStore::shared();
    let source = seeded(&store, "src", &["a", "b"]);
    let dest = seeded(&store, "dst", &["x"]);

    assert!(source.move_to(&dest, "a").expect("move"));
    assert_eq!(source.data(false).expect("data"), ["b"]);
    assert_eq!(dest.data(false).expect("data"), ["x", "a"]);

    assert!(!source.move_to(&dest, "missing").expect("absent member"));
}

#[test]
fn move_to_refuses_a_wrong_kind_destination() {
    let store = MemoryStore::shared();
    store.set("plain", b"scalar".to_vec()).expect("seed");

    let source = seeded(&store, "src", &["a"]);
    let blocked = Set::new("plain", Arc::clone(&store) as Arc<dyn StoreConnection>).expect("set");

    assert!(!source.move_to(&blocked, "a").expect("move"));
    assert!(source.contains("a").expect("source untouched"));
}

// ============================================================================
// Set algebra
// ============================================================================

#[test]
fn algebra_accepts_handles_and_plain_names_as_operands() {
    let store = MemoryStore::shared();
    let a = seeded(&store, "a", &["1", "2", "3"]);
    let b = seeded(&store, "b", &["2", "3", "4"]);

    assert_eq!(a.diff(&[&b]).expect("diff"), ["1"]);
    assert_eq!(a.inter(&[&b]).expect("inter"), ["2", "3"]);
    assert_eq!(a.union(&[&b]).expect("union"), ["1", "2", "3", "4"]);

    // A bare record name works wherever a handle does.
    assert_eq!(a.diff(&[&"b"]).expect("diff"), ["1"]);
    assert!(a.diff(&[&b, &"a"]).expect("diff against itself").is_empty());
}

#[test]
fn store_variants_write_the_destination_record() {
    let store = MemoryStore::shared();
    let a = seeded(&store, "a", &["1", "2", "3"]);
    let b = seeded(&store, "b", &["2", "3", "4"]);
    let dest = Set::new("result", Arc::clone(&store) as Arc<dyn StoreConnection>).expect("set");

    assert_eq!(a.inter_store(&dest, &[&b]).expect("inter store"), 2);
    assert_eq!(dest.data(false).expect("data"), ["2", "3"]);

    assert_eq!(a.union_store(&dest, &[&b]).expect("union store"), 4);
    assert_eq!(dest.count(false).expect("count"), 4);

    assert_eq!(a.diff_store(&dest, &[&b]).expect("diff store"), 1);
    assert_eq!(dest.data(false).expect("data"), ["1"]);
}

#[test]
fn an_empty_result_deletes_the_destination() {
    let store = MemoryStore::shared();
    let a = seeded(&store, "a", &["1"]);
    let disjoint = seeded(&store, "disjoint", &["9"]);
    let dest = seeded(&store, "result", &["stale"]);

    assert_eq!(a.inter_store(&dest, &[&disjoint]).expect("inter store"), 0);
    assert!(!dest.exists().expect("destination removed"));
}

#[test]
fn operand_names_resolve_through_record_key() {
    let set = Set::new("named", MemoryStore::shared()).expect("set");
    assert_eq!(set.record_key(), "named");
    assert_eq!("plain".record_key(), "plain");
}
