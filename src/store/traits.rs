//! The command surface a remote key-value store must provide.
//!
//! Handles never talk to a server directly; they issue commands through this
//! trait. The shipped implementation is `MemoryStore`. A networked client
//! implements the same trait outside this crate.

use crate::error::Result;

/// What the remote store holds under a scalar key, a hash field, or a list
/// position: an opaque byte string. Encoding and decoding happen above the
/// store, in the handle's value pipeline.
pub type RawValue = Vec<u8>;

/// Where to insert relative to a pivot element in a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Before,
    After,
}

/// One endpoint of a score range on an ordered set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScoreBound {
    NegInf,
    PosInf,
    Incl(f64),
    Excl(f64),
}

impl ScoreBound {
    /// Whether `score` lies at or above this bound when it is the range minimum.
    pub fn allows_as_min(&self, score: f64) -> bool {
        match *self {
            ScoreBound::NegInf => true,
            ScoreBound::PosInf => false,
            ScoreBound::Incl(min) => score >= min,
            ScoreBound::Excl(min) => score > min,
        }
    }

    /// Whether `score` lies at or below this bound when it is the range maximum.
    pub fn allows_as_max(&self, score: f64) -> bool {
        match *self {
            ScoreBound::NegInf => false,
            ScoreBound::PosInf => true,
            ScoreBound::Incl(max) => score <= max,
            ScoreBound::Excl(max) => score < max,
        }
    }
}

/// Synchronous command interface to the remote store.
///
/// Keys are used exactly as given; no prefixing or escaping happens here.
/// Expected refusals (wrong record kind, missing pivot, out-of-range index,
/// duplicate set-if-absent) come back in-band as `Ok(false)` / `Ok(None)` /
/// `Ok(0)` rather than as errors. The atomic increments and the ordered-set
/// store variants are the exception: a store that cannot apply them returns
/// `Err(StoreError::WrongType)`. Bulk reads against a record of another
/// kind degrade to an empty result.
///
/// Set and ordered-set members are UTF-8 strings; scalar, hash and list
/// values are binary-safe `RawValue`s.
pub trait StoreConnection: Send + Sync {
    // ------------------------------------------------------------------
    // Key lifecycle
    // ------------------------------------------------------------------

    fn exists(&self, key: &str) -> Result<bool>;

    /// Set a time-to-live in seconds. `false` when the key does not exist.
    fn expire(&self, key: &str, seconds: u64) -> Result<bool>;

    /// Drop a pending expiry. `false` when the key has none.
    fn persist(&self, key: &str) -> Result<bool>;

    /// Remaining seconds, `-1` for no timeout, `-2` for a missing key.
    fn ttl(&self, key: &str) -> Result<i64>;

    fn delete(&self, key: &str) -> Result<bool>;

    // ------------------------------------------------------------------
    // Scalars
    // ------------------------------------------------------------------

    fn get(&self, key: &str) -> Result<Option<RawValue>>;

    /// Unconditional write. Replaces a record of any kind and clears its expiry.
    fn set(&self, key: &str, value: RawValue) -> Result<bool>;

    /// Write only when the key is absent. `false` when it already exists.
    fn set_nx(&self, key: &str, value: RawValue) -> Result<bool>;

    /// Atomic integer add. The key is created at zero when absent.
    fn incr_by(&self, key: &str, by: i64) -> Result<i64>;

    /// Atomic float add. The key is created at zero when absent.
    fn incr_by_float(&self, key: &str, by: f64) -> Result<f64>;

    // ------------------------------------------------------------------
    // Hashes
    // ------------------------------------------------------------------

    fn hash_get(&self, key: &str, field: &str) -> Result<Option<RawValue>>;

    fn hash_set(&self, key: &str, field: &str, value: RawValue) -> Result<bool>;

    /// Write only when the field is absent. `false` when it already exists.
    fn hash_set_nx(&self, key: &str, field: &str, value: RawValue) -> Result<bool>;

    /// Remove one field. `false` when the field was absent.
    fn hash_delete(&self, key: &str, field: &str) -> Result<bool>;

    fn hash_len(&self, key: &str) -> Result<usize>;

    /// All fields in storage order.
    fn hash_get_all(&self, key: &str) -> Result<Vec<(String, RawValue)>>;

    /// Atomic integer add on one field. The field is created at zero when absent.
    fn hash_incr_by(&self, key: &str, field: &str, by: i64) -> Result<i64>;

    /// Atomic float add on one field. The field is created at zero when absent.
    fn hash_incr_by_float(&self, key: &str, field: &str, by: f64) -> Result<f64>;

    // ------------------------------------------------------------------
    // Lists
    // ------------------------------------------------------------------

    fn list_push_front(&self, key: &str, value: RawValue) -> Result<bool>;

    fn list_push_back(&self, key: &str, value: RawValue) -> Result<bool>;

    /// Append several values. Returns the new length, `None` when refused.
    fn list_push_back_many(&self, key: &str, values: &[RawValue]) -> Result<Option<usize>>;

    fn list_pop_front(&self, key: &str) -> Result<Option<RawValue>>;

    fn list_pop_back(&self, key: &str) -> Result<Option<RawValue>>;

    /// Overwrite the element at `index` (negative counts from the tail).
    /// `false` when the index is out of range.
    fn list_set(&self, key: &str, index: i64, value: RawValue) -> Result<bool>;

    /// Elements from `start` through `stop` inclusive, negative indices
    /// counting from the tail.
    fn list_range(&self, key: &str, start: i64, stop: i64) -> Result<Vec<RawValue>>;

    /// Keep only `start` through `stop` inclusive.
    fn list_trim(&self, key: &str, start: i64, stop: i64) -> Result<bool>;

    fn list_len(&self, key: &str) -> Result<usize>;

    /// Insert `value` next to the first element equal to `pivot`.
    /// Returns the new length, `0` when the key is absent, `-1` when the
    /// pivot is not found or the store refuses.
    fn list_insert(
        &self,
        key: &str,
        place: Placement,
        pivot: &[u8],
        value: RawValue,
    ) -> Result<i64>;

    /// Remove elements equal to `value`: the first `count` from the head
    /// when positive, from the tail when negative, all when zero.
    /// Returns how many were removed.
    fn list_remove(&self, key: &str, value: &[u8], count: i64) -> Result<usize>;

    // ------------------------------------------------------------------
    // Sets
    // ------------------------------------------------------------------

    /// `false` when the member was already present or the store refuses.
    fn set_add(&self, key: &str, member: &str) -> Result<bool>;

    /// `false` when the member was absent.
    fn set_remove(&self, key: &str, member: &str) -> Result<bool>;

    fn set_card(&self, key: &str) -> Result<usize>;

    fn set_members(&self, key: &str) -> Result<Vec<String>>;

    /// An arbitrary member, left in place.
    fn set_random_member(&self, key: &str) -> Result<Option<String>>;

    /// Remove and return an arbitrary member.
    fn set_pop(&self, key: &str) -> Result<Option<String>>;

    fn set_is_member(&self, key: &str, member: &str) -> Result<bool>;

    /// Members of the first key not present in any of the rest.
    fn set_diff(&self, keys: &[&str]) -> Result<Vec<String>>;

    /// Like `set_diff`, but the result replaces `dest`. Returns its size.
    /// An empty result deletes `dest`.
    fn set_diff_store(&self, dest: &str, keys: &[&str]) -> Result<usize>;

    fn set_inter(&self, keys: &[&str]) -> Result<Vec<String>>;

    fn set_inter_store(&self, dest: &str, keys: &[&str]) -> Result<usize>;

    fn set_union(&self, keys: &[&str]) -> Result<Vec<String>>;

    fn set_union_store(&self, dest: &str, keys: &[&str]) -> Result<usize>;

    /// Atomically move `member` from `source` to `dest`. `false` when the
    /// member is not in `source` or the store refuses.
    fn set_move(&self, source: &str, dest: &str, member: &str) -> Result<bool>;

    // ------------------------------------------------------------------
    // Ordered sets
    // ------------------------------------------------------------------

    /// Upsert a member with a score. `false` when the member already existed
    /// (its score is still updated) or the store refuses.
    fn zset_add(&self, key: &str, member: &str, score: f64) -> Result<bool>;

    /// `false` when the member was absent.
    fn zset_remove(&self, key: &str, member: &str) -> Result<bool>;

    fn zset_card(&self, key: &str) -> Result<usize>;

    fn zset_score(&self, key: &str, member: &str) -> Result<Option<f64>>;

    /// Atomic score add. Returns the new score, `None` when refused.
    /// The member is created at score zero when absent.
    fn zset_incr_by(&self, key: &str, member: &str, by: f64) -> Result<Option<f64>>;

    /// Members with scores from rank `start` through `stop` inclusive,
    /// ordered by ascending score then member, negative ranks counting
    /// from the end.
    fn zset_range(&self, key: &str, start: i64, stop: i64) -> Result<Vec<(String, f64)>>;

    /// Members with scores inside `[min, max]`, ascending.
    fn zset_range_by_score(
        &self,
        key: &str,
        min: ScoreBound,
        max: ScoreBound,
    ) -> Result<Vec<(String, f64)>>;

    /// Members with scores inside `[min, max]`, descending.
    fn zset_rev_range_by_score(
        &self,
        key: &str,
        max: ScoreBound,
        min: ScoreBound,
    ) -> Result<Vec<(String, f64)>>;

    /// Intersect the ordered sets under `keys`, scores weighted per key and
    /// summed, and replace `dest` with the result. Returns its size.
    /// Missing weights default to 1. An empty result deletes `dest`.
    /// A wrong-kind record under any source or under `dest` is
    /// `Err(StoreError::WrongType)`, raised before `dest` is touched.
    fn zset_inter_store(&self, dest: &str, keys: &[&str], weights: Option<&[f64]>)
        -> Result<usize>;

    /// Union counterpart of `zset_inter_store`.
    fn zset_union_store(&self, dest: &str, keys: &[&str], weights: Option<&[f64]>)
        -> Result<usize>;

    // ------------------------------------------------------------------
    // Bulk maintenance
    // ------------------------------------------------------------------

    /// Delete every key matching a glob pattern. Returns how many were
    /// deleted, `None` when nothing matched.
    fn delete_matching(&self, pattern: &str) -> Result<Option<u64>>;

    /// Rename every key matching a glob pattern, replacing occurrences of
    /// the literal `from` with `to` in each name. A rename onto an existing
    /// key overwrites it. Returns how many keys matched.
    fn rename_matching(&self, pattern: &str, from: &str, to: &str) -> Result<u64>;
}
