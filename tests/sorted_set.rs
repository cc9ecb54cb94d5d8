//! Integration tests for `SortedSet` handles.

use std::sync::Arc;

use remora::{EntryAccess, MemoryStore, Record, ScoreBound, SortedSet, StoreConnection, StoreError};

fn seeded(store: &Arc<MemoryStore>, name: &str, entries: &[(&str, f64)]) -> SortedSet {
    let zset = SortedSet::new(name, Arc::clone(store) as Arc<dyn StoreConnection>)
        .expect("sorted set");
    for (member, score) in entries {
        zset.add(member, *score).expect("seed");
    }
    zset
}

// ============================================================================
// Ranking
// ============================================================================

#[test]
fn ranks_order_by_score_then_member() {
    let store = MemoryStore::shared();
    let zset = seeded(&store, "board", &[("b", 2.0), ("a", 2.0), ("c", 1.0)]);

    assert_eq!(zset.range(0, -1).expect("range"), ["c", "a", "b"]);
    assert_eq!(zset.range(1, 2).expect("range"), ["a", "b"]);
    assert_eq!(
        zset.range_with_scores(0, 0).expect("range"),
        [("c".to_string(), 1.0)]
    );
}

#[test]
fn first_and_last_expose_the_extremes() {
    let store = MemoryStore::shared();
    let zset = seeded(&store, "board", &[("low", 1.0), ("high", 9.0)]);

    assert_eq!(zset.first().expect("first"), Some("low".to_string()));
    assert_eq!(zset.last().expect("last"), Some("high".to_string()));
    assert_eq!(
        zset.first_with_score().expect("first"),
        Some(("low".to_string(), 1.0))
    );
    assert_eq!(
        zset.last_with_score().expect("last"),
        Some(("high".to_string(), 9.0))
    );
    assert_eq!(zset.min_score().expect("min"), Some(1.0));
    assert_eq!(zset.max_score().expect("max"), Some(9.0));

    let empty = SortedSet::new("void", store).expect("sorted set");
    assert_eq!(empty.first().expect("first"), None);
    assert_eq!(empty.max_score().expect("max"), None);
}

#[test]
fn score_ranges_respect_inclusive_and_exclusive_bounds() {
    let store = MemoryStore::shared();
    let zset = seeded(
        &store,
        "board",
        &[("a", 1.0), ("b", 2.0), ("c", 3.0), ("d", 4.0)],
    );

    assert_eq!(
        zset.range_by_score(ScoreBound::Incl(2.0), ScoreBound::Incl(3.0))
            .expect("range"),
        ["b", "c"]
    );
    assert_eq!(
        zset.range_by_score(ScoreBound::Excl(2.0), ScoreBound::PosInf)
            .expect("range"),
        ["c", "d"]
    );
    assert_eq!(
        zset.range_by_score(ScoreBound::NegInf, ScoreBound::Excl(2.0))
            .expect("range"),
        ["a"]
    );
    assert_eq!(
        zset.rev_range_by_score(ScoreBound::Incl(3.0), ScoreBound::NegInf)
            .expect("rev range"),
        ["c", "b", "a"]
    );
}

// ============================================================================
// Scores
// ============================================================================

#[test]
fn add_updates_scores_in_place() {
    let store = MemoryStore::shared();
    let zset = SortedSet::new("board", store).expect("sorted set");

    assert!(zset.add("m", 1.0).expect("first add"));
    assert!(!zset.add("m", 5.0).expect("rescore"));
    assert_eq!(zset.score("m").expect("score"), Some(5.0));
    assert_eq!(zset.score("missing").expect("score"), None);
}

#[test]
fn increment_and_decrement_start_from_zero() {
    let store = MemoryStore::shared();
    let zset = SortedSet::new("board", store).expect("sorted set");

    assert_eq!(zset.increment("m", 2.5).expect("incr"), Some(2.5));
    assert_eq!(zset.decrement("m", 0.5).expect("decr"), Some(2.0));
    assert_eq!(zset.score("m").expect("score"), Some(2.0));
}

#[test]
fn increment_is_refused_in_band_on_a_wrong_kind_record() {
    let store = MemoryStore::shared();
    store.set("plain", b"x".to_vec()).expect("seed");

    let zset = SortedSet::new("plain", store).expect("sorted set");
    assert_eq!(zset.increment("m", 1.0).expect("incr"), None);
}

// ============================================================================
// Stored intersections and unions
// ============================================================================

#[test]
fn store_variants_apply_weights_and_sum_scores() {
    let store = MemoryStore::shared();
    let a = seeded(&store, "a", &[("x", 1.0), ("y", 2.0)]);
    let b = seeded(&store, "b", &[("y", 10.0), ("z", 5.0)]);
    let dest = SortedSet::new("merged", store.clone()).expect("sorted set");

    let merged = a
        .union_store(&dest, &[&b], Some(&[2.0, 1.0]))
        .expect("union store");
    assert_eq!(merged, 3);
    assert_eq!(dest.range(0, -1).expect("range"), ["x", "z", "y"]);
    assert_eq!(dest.score("y").expect("score"), Some(14.0));

    let common = a.inter_store(&dest, &[&b], None).expect("inter store");
    assert_eq!(common, 1);
    assert_eq!(
        dest.range_with_scores(0, -1).expect("range"),
        [("y".to_string(), 12.0)]
    );
}

#[test]
fn store_variants_refuse_wrong_kind_records() {
    let store = MemoryStore::shared();
    store.set("plain", b"x".to_vec()).expect("seed");

    let a = seeded(&store, "a", &[("x", 1.0)]);
    let dest = seeded(&store, "dest", &[("keep", 7.0)]);

    // A wrong-kind operand errors out before the destination is touched.
    assert!(matches!(
        a.inter_store(&dest, &[&"plain"], None),
        Err(StoreError::WrongType { .. })
    ));
    assert_eq!(dest.score("keep").expect("score"), Some(7.0));

    // A wrong-kind destination blocks the write and survives intact.
    let blocked = SortedSet::new("plain", store.clone()).expect("sorted set");
    assert!(matches!(
        a.union_store(&blocked, &[&dest], None),
        Err(StoreError::WrongType { .. })
    ));
    assert_eq!(store.get("plain").expect("raw"), Some(b"x".to_vec()));
}

// ============================================================================
// Entry access
// ============================================================================

#[test]
fn entry_access_maps_members_to_scores() {
    let store = MemoryStore::shared();
    let zset = SortedSet::new("board", store).expect("sorted set");

    assert!(zset.put_entry("m", 3.0).expect("put"));
    assert_eq!(zset.entry("m").expect("entry"), Some(3.0));
    assert!(zset.has_entry("m").expect("has"));
    assert!(!zset.has_entry("nope").expect("has"));

    assert!(zset.remove_entry("m").expect("remove"));
    assert!(!zset.exists().expect("last member dropped the record"));
}
