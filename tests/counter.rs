//! Integration tests for `Counter` and `FloatCounter` handles.

use remora::{Counter, FloatCounter, MemoryStore, Record, StoreConnection, StoreError};

#[test]
fn two_handles_share_the_record_not_the_cache() {
    let store = MemoryStore::shared();
    let writer = Counter::new("hits", store.clone()).expect("counter");
    let reader = Counter::new("hits", store.clone()).expect("counter");

    assert_eq!(writer.increment(4).expect("incr"), 4);
    assert_eq!(reader.value(false).expect("first read"), 4);

    assert_eq!(writer.increment(1).expect("incr"), 5);
    assert_eq!(reader.value(false).expect("stale read"), 4);
    assert_eq!(reader.value(true).expect("forced read"), 5);
}

#[test]
fn increment_on_a_collection_record_is_an_error() {
    let store = MemoryStore::shared();
    store.set_add("tags", "a").expect("seed");

    let counter = Counter::new("tags", store).expect("counter");
    assert!(matches!(
        counter.increment(1),
        Err(StoreError::WrongType { .. })
    ));
    // Scalar reads of a collection record degrade to absent.
    assert_eq!(counter.value(true).expect("value"), 0);
}

#[test]
fn clear_resets_to_zero_and_chains() {
    let store = MemoryStore::shared();
    let counter = Counter::new("hits", store).expect("counter");
    counter.increment(7).expect("incr");

    assert_eq!(counter.clear().expect("clear").increment(2).expect("incr"), 2);
    assert!(counter.exists().expect("exists"));
    counter.clear().expect("clear");
    assert_eq!(counter.value(false).expect("value"), 0);
}

#[test]
fn float_counter_moves_in_fractions() {
    let store = MemoryStore::shared();
    let counter = FloatCounter::new("load", store).expect("counter");

    assert_eq!(counter.increment(1.5).expect("incr"), 1.5);
    assert_eq!(counter.decrement(2.0).expect("decr"), -0.5);
    assert_eq!(counter.value(true).expect("value"), -0.5);
}

#[test]
fn decrement_refuses_the_unnegatable_amount() {
    let store = MemoryStore::shared();
    let counter = Counter::new("hits", store).expect("counter");
    assert!(matches!(
        counter.decrement(i64::MIN),
        Err(StoreError::Backend(_))
    ));
}
