//! Integration tests for `HashTable` handles.

use remora::{Collection, EntryAccess, HashTable, MemoryStore, Record, StoreConnection};
use serde_json::json;

#[test]
fn fields_keep_their_insertion_order() {
    let store = MemoryStore::shared();
    let table = HashTable::new("profile", store).expect("table");
    table.set("z", &json!("last name")).expect("set");
    table.set("a", &json!("first name")).expect("set");

    let fields: Vec<String> = table.iter().expect("iter").map(|(field, _)| field).collect();
    assert_eq!(fields, ["z", "a"]);
    assert_eq!(table.count(false).expect("count"), 2);
}

#[test]
fn get_reads_single_fields() {
    let store = MemoryStore::shared();
    let table = HashTable::new("profile", store).expect("table");
    assert_eq!(table.get("name").expect("absent record"), None);

    table.set("name", &json!("Ada")).expect("set");
    assert_eq!(table.get("name").expect("get"), Some(json!("Ada")));
    assert_eq!(table.get("missing").expect("absent field"), None);
}

#[test]
fn set_nx_keeps_the_first_value() {
    let store = MemoryStore::shared();
    let table = HashTable::new("settings", store).expect("table");
    assert!(table.set_nx("mode", &json!("fast")).expect("first write"));
    assert!(!table.set_nx("mode", &json!("slow")).expect("second write"));
    assert_eq!(table.get("mode").expect("get"), Some(json!("fast")));
}

#[test]
fn set_overwrites_without_growing_the_count() {
    let store = MemoryStore::shared();
    let table = HashTable::new("profile", store).expect("table");
    table.set("a", &json!(1)).expect("first write");
    table.set("a", &json!(2)).expect("second write");

    assert_eq!(table.get("a").expect("get"), Some(json!("2")));
    assert_eq!(table.count(false).expect("count"), 1);
    assert_eq!(table.data(false).expect("data").len(), 1);
}

#[test]
fn increments_update_fields_in_place() {
    let store = MemoryStore::shared();
    let table = HashTable::new("stats", store).expect("table");
    assert_eq!(table.increment("count", 5).expect("incr"), 5);
    assert_eq!(table.increment("count", -2).expect("incr"), 3);
    assert_eq!(table.increment_by_float("ratio", 0.5).expect("incr"), 0.5);
    assert_eq!(table.get("count").expect("get"), Some(json!("3")));
}

#[test]
fn removing_the_last_field_drops_the_record() {
    let store = MemoryStore::shared();
    let table = HashTable::new("sparse", store).expect("table");
    table.set("only", &json!("v")).expect("set");

    assert!(table.remove("only").expect("remove"));
    assert!(!table.remove("only").expect("second remove"));
    assert!(!table.exists().expect("exists"));
}

#[test]
fn entry_access_reads_and_writes_fields() {
    let store = MemoryStore::shared();
    let table = HashTable::new("doc", store).expect("table");

    assert!(table.put_entry("name", json!("Ada")).expect("put"));
    assert_eq!(table.entry("name").expect("entry"), Some(json!("Ada")));
    assert!(table.has_entry("name").expect("has"));
    assert!(!table.has_entry("missing").expect("has"));

    assert!(table.remove_entry("name").expect("remove"));
    assert_eq!(table.entry("name").expect("entry"), None);
}

#[test]
fn contains_scans_stored_values_not_field_names() {
    let store = MemoryStore::shared();
    let table = HashTable::new("lookup", store).expect("table");
    table.set("a", &json!("x")).expect("set");

    assert!(table.contains(&json!("x")).expect("contains"));
    assert!(!table.contains(&json!("a")).expect("contains"));
}

#[test]
fn clear_deletes_the_record_and_empties_the_view() {
    let store = MemoryStore::shared();
    let table = HashTable::new("scratch", store).expect("table");
    table.set("a", &json!(1)).expect("set");
    table.set("b", &json!(2)).expect("set");
    assert_eq!(table.count(false).expect("count"), 2);

    table.clear().expect("clear");
    assert_eq!(table.count(false).expect("count"), 0);
    assert!(!table.exists().expect("exists"));
}

#[test]
fn wrong_kind_reads_degrade_and_writes_are_refused() {
    let store = MemoryStore::shared();
    store.set("occupied", b"scalar".to_vec()).expect("seed");

    let table = HashTable::new("occupied", store.clone()).expect("table");
    assert_eq!(table.count(true).expect("count"), 0);
    assert!(table.data(true).expect("data").is_empty());
    assert!(!table.set("f", &json!("v")).expect("set"));
    assert_eq!(store.get("occupied").expect("raw"), Some(b"scalar".to_vec()));
}
