//! Ordered-set records: distinct raw members ranked by a float score.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::codec::Codec;
use crate::entity::{Entity, Record, RecordKey};
use crate::error::{Result, StoreError};
use crate::store::traits::{ScoreBound, StoreConnection};

use super::cache::CollectionCache;
use super::traits::{Collection, EntryAccess};

/// Handle over an ordered-set record. Members are stored verbatim and
/// ranked by score; like `Set`, attaching a codec is refused.
///
/// The cached snapshot keeps the store's order: ascending score, ties
/// broken by member.
pub struct SortedSet {
    entity: Entity,
    cache: CollectionCache<IndexMap<String, f64>>,
}

impl SortedSet {
    pub fn new(name: impl Into<String>, store: Arc<dyn StoreConnection>) -> Result<Self> {
        Ok(Self {
            entity: Entity::new(name, store)?,
            cache: CollectionCache::new(),
        })
    }

    /// Always fails: ordered-set members never go through a codec.
    pub fn with_codec(
        _name: impl Into<String>,
        _store: Arc<dyn StoreConnection>,
        _codec: Arc<dyn Codec>,
    ) -> Result<Self> {
        Err(StoreError::CodecForbidden {
            kind: "sorted set",
        })
    }

    /// Upsert a member with a score. `false` when the member already
    /// existed; its score is updated either way.
    pub fn add(&self, member: &str, score: f64) -> Result<bool> {
        self.cache.invalidate();
        self.entity
            .store()
            .zset_add(self.entity.name(), member, score)
    }

    /// Remove one member. `false` when it was absent.
    pub fn remove(&self, member: &str) -> Result<bool> {
        self.cache.invalidate();
        self.entity.store().zset_remove(self.entity.name(), member)
    }

    /// Atomically add to a member's score and return the new score as the
    /// store reports it, `None` when the store refuses. An absent member
    /// starts from zero.
    pub fn increment(&self, member: &str, by: f64) -> Result<Option<f64>> {
        self.cache.invalidate();
        self.entity
            .store()
            .zset_incr_by(self.entity.name(), member, by)
    }

    /// Counterpart of `increment`.
    pub fn decrement(&self, member: &str, by: f64) -> Result<Option<f64>> {
        self.increment(member, -by)
    }

    /// One member's score, straight from the store.
    pub fn score(&self, member: &str) -> Result<Option<f64>> {
        self.entity.store().zset_score(self.entity.name(), member)
    }

    /// Members from rank `start` through `stop` inclusive, ascending.
    pub fn range(&self, start: i64, stop: i64) -> Result<Vec<String>> {
        let entries = self
            .entity
            .store()
            .zset_range(self.entity.name(), start, stop)?;
        Ok(entries.into_iter().map(|(member, _)| member).collect())
    }

    /// Like `range`, keeping the scores.
    pub fn range_with_scores(&self, start: i64, stop: i64) -> Result<Vec<(String, f64)>> {
        self.entity
            .store()
            .zset_range(self.entity.name(), start, stop)
    }

    /// Members whose scores fall inside `[min, max]`, ascending.
    pub fn range_by_score(&self, min: ScoreBound, max: ScoreBound) -> Result<Vec<String>> {
        let entries = self
            .entity
            .store()
            .zset_range_by_score(self.entity.name(), min, max)?;
        Ok(entries.into_iter().map(|(member, _)| member).collect())
    }

    /// Members whose scores fall inside `[min, max]`, descending.
    pub fn rev_range_by_score(&self, max: ScoreBound, min: ScoreBound) -> Result<Vec<String>> {
        let entries = self
            .entity
            .store()
            .zset_rev_range_by_score(self.entity.name(), max, min)?;
        Ok(entries.into_iter().map(|(member, _)| member).collect())
    }

    /// The lowest-ranked member.
    pub fn first(&self) -> Result<Option<String>> {
        Ok(self.first_with_score()?.map(|(member, _)| member))
    }

    /// The lowest-ranked member with its score.
    pub fn first_with_score(&self) -> Result<Option<(String, f64)>> {
        let entries = self.entity.store().zset_range(self.entity.name(), 0, 0)?;
        Ok(entries.into_iter().next())
    }

    /// The highest-ranked member.
    pub fn last(&self) -> Result<Option<String>> {
        Ok(self.last_with_score()?.map(|(member, _)| member))
    }

    /// The highest-ranked member with its score.
    pub fn last_with_score(&self) -> Result<Option<(String, f64)>> {
        let entries = self.entity.store().zset_range(self.entity.name(), -1, -1)?;
        Ok(entries.into_iter().next())
    }

    /// The lowest score in the record.
    pub fn min_score(&self) -> Result<Option<f64>> {
        Ok(self.first_with_score()?.map(|(_, score)| score))
    }

    /// The highest score in the record.
    pub fn max_score(&self) -> Result<Option<f64>> {
        Ok(self.last_with_score()?.map(|(_, score)| score))
    }

    /// Intersect this record with the operands, weighting and summing
    /// scores, and store the result into `dest`. The destination drops its
    /// cache first and comes back with its count pinned to the result size.
    pub fn inter_store(
        &self,
        dest: &SortedSet,
        others: &[&dyn RecordKey],
        weights: Option<&[f64]>,
    ) -> Result<usize> {
        dest.cache.invalidate();
        let keys = self.operand_keys(others);
        let size = self
            .entity
            .store()
            .zset_inter_store(dest.entity.name(), &keys, weights)?;
        dest.cache.prime_count(size);
        Ok(size)
    }

    /// Union counterpart of `inter_store`.
    pub fn union_store(
        &self,
        dest: &SortedSet,
        others: &[&dyn RecordKey],
        weights: Option<&[f64]>,
    ) -> Result<usize> {
        dest.cache.invalidate();
        let keys = self.operand_keys(others);
        let size = self
            .entity
            .store()
            .zset_union_store(dest.entity.name(), &keys, weights)?;
        dest.cache.prime_count(size);
        Ok(size)
    }

    /// Iterate one snapshot of members with scores, lowest rank first.
    /// Mutations made after this call are not reflected; call again for a
    /// fresh view.
    pub fn iter(&self) -> Result<impl Iterator<Item = (String, f64)>> {
        Ok(self.data(false)?.into_iter())
    }

    /// This record's name first, then the operands' names, in call order.
    fn operand_keys<'a>(&'a self, others: &'a [&'a dyn RecordKey]) -> Vec<&'a str> {
        let mut keys = Vec::with_capacity(others.len() + 1);
        keys.push(self.entity.name());
        keys.extend(others.iter().map(|other| other.record_key()));
        keys
    }
}

impl Record for SortedSet {
    fn entity(&self) -> &Entity {
        &self.entity
    }

    fn entity_mut(&mut self) -> &mut Entity {
        &mut self.entity
    }
}

impl RecordKey for SortedSet {
    fn record_key(&self) -> &str {
        self.entity.name()
    }
}

impl Collection for SortedSet {
    type Data = IndexMap<String, f64>;
    /// `contains` matches against stored scores, not members. Use
    /// `score(member)` for membership.
    type Item = f64;

    fn cache(&self) -> &CollectionCache<Self::Data> {
        &self.cache
    }

    fn fetch_count(&self) -> Result<usize> {
        self.entity.store().zset_card(self.entity.name())
    }

    fn fetch_data(&self) -> Result<Self::Data> {
        let entries = self
            .entity
            .store()
            .zset_range(self.entity.name(), 0, -1)?;
        Ok(entries.into_iter().collect())
    }

    fn data_len(data: &Self::Data) -> usize {
        data.len()
    }

    fn data_contains(data: &Self::Data, item: &f64) -> bool {
        data.values().any(|score| score == item)
    }
}

impl EntryAccess for SortedSet {
    type EntryKey = str;
    type Entry = f64;

    fn entry(&self, member: &str) -> Result<Option<f64>> {
        Ok(self.data(false)?.get(member).copied())
    }

    fn put_entry(&self, member: &str, score: f64) -> Result<bool> {
        self.add(member, score)
    }

    fn remove_entry(&self, member: &str) -> Result<bool> {
        self.remove(member)
    }
}
