//! Integration tests for the pattern-based maintenance operations.

use std::time::Duration;

use remora::{MemoryStore, StoreConnection};

#[test]
fn delete_matching_reports_the_removed_count() {
    let store = MemoryStore::shared();
    store.set("session:1", b"a".to_vec()).expect("seed");
    store.set("session:2", b"b".to_vec()).expect("seed");
    store.set_add("session:tags", "x").expect("seed");
    store.set("config", b"keep".to_vec()).expect("seed");

    assert_eq!(store.delete_matching("session:*").expect("delete"), Some(3));
    assert!(!store.exists("session:1").expect("exists"));
    assert!(!store.exists("session:tags").expect("exists"));
    assert!(store.exists("config").expect("exists"));

    assert_eq!(store.delete_matching("session:*").expect("nothing left"), None);
}

#[test]
fn delete_matching_ignores_already_expired_records() {
    let store = MemoryStore::shared();
    store.set("job:1", b"a".to_vec()).expect("seed");
    store.set("job:2", b"b".to_vec()).expect("seed");
    store.expire("job:1", 5).expect("expire");
    store.advance_clock(Duration::from_secs(10));

    assert_eq!(store.delete_matching("job:*").expect("delete"), Some(1));
}

#[test]
fn glob_patterns_support_classes_and_single_characters() {
    let store = MemoryStore::shared();
    store.set("item1", b"a".to_vec()).expect("seed");
    store.set("item2", b"b".to_vec()).expect("seed");
    store.set("itemX", b"c".to_vec()).expect("seed");
    store.set("items", b"d".to_vec()).expect("seed");

    assert_eq!(store.delete_matching("item[0-9]").expect("delete"), Some(2));
    assert_eq!(store.delete_matching("item?").expect("delete"), Some(2));
    assert_eq!(store.delete_matching("item?").expect("delete"), None);
}

#[test]
fn rename_matching_rewrites_key_names_in_place() {
    let store = MemoryStore::shared();
    store.set("v1:users", b"u".to_vec()).expect("seed");
    store.set("v1:orders", b"o".to_vec()).expect("seed");
    store.set("keep", b"k".to_vec()).expect("seed");

    assert_eq!(store.rename_matching("v1:*", "v1:", "v2:").expect("rename"), 2);
    assert!(store.exists("v2:users").expect("exists"));
    assert_eq!(store.get("v2:orders").expect("get"), Some(b"o".to_vec()));
    assert!(!store.exists("v1:users").expect("exists"));
    assert!(store.exists("keep").expect("exists"));
}

#[test]
fn rename_matching_carries_deadlines_and_overwrites_targets() {
    let store = MemoryStore::shared();
    store.set("old:a", b"fresh".to_vec()).expect("seed");
    store.set("new:a", b"stale".to_vec()).expect("seed");
    store.expire("new:a", 99).expect("expire target");

    assert_eq!(store.rename_matching("old:*", "old:", "new:").expect("rename"), 1);
    assert_eq!(store.get("new:a").expect("get"), Some(b"fresh".to_vec()));
    // The overwritten target's deadline does not outlive its value.
    assert_eq!(store.ttl("new:a").expect("ttl"), -1);

    store.set("tmp:b", b"b".to_vec()).expect("seed");
    store.expire("tmp:b", 40).expect("expire source");
    assert_eq!(store.rename_matching("tmp:*", "tmp:", "live:").expect("rename"), 1);
    assert_eq!(store.ttl("live:b").expect("ttl"), 40);
}

#[test]
fn rename_matching_reports_zero_when_nothing_matches() {
    let store = MemoryStore::shared();
    store.set("solo", b"s".to_vec()).expect("seed");
    assert_eq!(store.rename_matching("absent:*", "absent:", "x:").expect("rename"), 0);
}
