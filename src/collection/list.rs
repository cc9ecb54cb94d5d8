//! List records: ordered sequences of encoded values.

use std::sync::Arc;

use serde_json::Value;

use crate::codec::Codec;
use crate::entity::{Entity, Record};
use crate::error::{Result, StoreError};
use crate::store::traits::{Placement, StoreConnection};

use super::cache::CollectionCache;
use super::traits::{Collection, EntryAccess};

/// Handle over a list record. Values are encoded through the handle's
/// pipeline, including the pivots of the relative inserts.
pub struct List {
    entity: Entity,
    cache: CollectionCache<Vec<Value>>,
}

impl List {
    pub fn new(name: impl Into<String>, store: Arc<dyn StoreConnection>) -> Result<Self> {
        Ok(Self {
            entity: Entity::new(name, store)?,
            cache: CollectionCache::new(),
        })
    }

    /// Open a list whose values go through `codec` in both directions.
    pub fn with_codec(
        name: impl Into<String>,
        store: Arc<dyn StoreConnection>,
        codec: Arc<dyn Codec>,
    ) -> Result<Self> {
        Ok(Self {
            entity: Entity::with_codec(name, store, codec)?,
            cache: CollectionCache::new(),
        })
    }

    /// Append to the tail. `false` when the store refuses.
    pub fn push(&self, value: &Value) -> Result<bool> {
        self.cache.invalidate();
        let raw = self.entity.encode(value)?;
        self.entity.store().list_push_back(self.entity.name(), raw)
    }

    /// Prepend to the head. `false` when the store refuses.
    pub fn push_front(&self, value: &Value) -> Result<bool> {
        self.cache.invalidate();
        let raw = self.entity.encode(value)?;
        self.entity.store().list_push_front(self.entity.name(), raw)
    }

    /// Append several values in one command. Returns the new length,
    /// `None` when the store refuses.
    pub fn push_many(&self, values: &[Value]) -> Result<Option<usize>> {
        self.cache.invalidate();
        let raws = self.entity.encode_seq(values)?;
        self.entity
            .store()
            .list_push_back_many(self.entity.name(), &raws)
    }

    /// Remove and return the tail element.
    pub fn pop(&self) -> Result<Option<Value>> {
        self.cache.invalidate();
        let raw = self.entity.store().list_pop_back(self.entity.name())?;
        self.entity.decode(raw)
    }

    /// Remove and return the head element.
    pub fn pop_front(&self) -> Result<Option<Value>> {
        self.cache.invalidate();
        let raw = self.entity.store().list_pop_front(self.entity.name())?;
        self.entity.decode(raw)
    }

    /// Overwrite the element at `index` (negative counts from the tail).
    /// `false` when the index is out of range.
    pub fn set(&self, index: i64, value: &Value) -> Result<bool> {
        self.cache.invalidate();
        let raw = self.entity.encode(value)?;
        self.entity
            .store()
            .list_set(self.entity.name(), index, raw)
    }

    /// Insert `value` just before the first element equal to `pivot`.
    /// Returns the new length, `-1` when the pivot is absent.
    pub fn insert_before(&self, pivot: &Value, value: &Value) -> Result<i64> {
        self.insert(Placement::Before, pivot, value)
    }

    /// Insert `value` just after the first element equal to `pivot`.
    /// Returns the new length, `-1` when the pivot is absent.
    pub fn insert_after(&self, pivot: &Value, value: &Value) -> Result<i64> {
        self.insert(Placement::After, pivot, value)
    }

    fn insert(&self, place: Placement, pivot: &Value, value: &Value) -> Result<i64> {
        self.cache.invalidate();
        let pivot = self.entity.encode(pivot)?;
        let raw = self.entity.encode(value)?;
        self.entity
            .store()
            .list_insert(self.entity.name(), place, &pivot, raw)
    }

    /// Remove elements equal to `value`: the first `occurrences` from the
    /// head when positive, from the tail when negative, all when zero.
    /// Returns how many were removed.
    pub fn remove_item(&self, value: &Value, occurrences: i64) -> Result<usize> {
        self.cache.invalidate();
        let raw = self.entity.encode(value)?;
        self.entity
            .store()
            .list_remove(self.entity.name(), &raw, occurrences)
    }

    /// Decoded elements from `start` through `stop` inclusive, straight
    /// from the store.
    pub fn range(&self, start: i64, stop: i64) -> Result<Vec<Value>> {
        let raws = self
            .entity
            .store()
            .list_range(self.entity.name(), start, stop)?;
        self.entity.decode_seq(raws)
    }

    /// Keep only `start` through `stop` inclusive.
    pub fn trim(&self, start: i64, stop: i64) -> Result<bool> {
        self.cache.invalidate();
        self.entity
            .store()
            .list_trim(self.entity.name(), start, stop)
    }

    /// Replace the whole list with `items`. Returns how many were appended.
    pub fn copy_from<I>(&self, items: I) -> Result<usize>
    where
        I: IntoIterator<Item = Value>,
    {
        self.clear()?;
        let mut copied = 0;
        for item in items {
            if self.push(&item)? {
                copied += 1;
            }
        }
        Ok(copied)
    }

    /// Iterate one snapshot of the elements. Mutations made after this call
    /// are not reflected; call again for a fresh view.
    pub fn iter(&self) -> Result<impl Iterator<Item = Value>> {
        Ok(self.data(false)?.into_iter())
    }
}

impl Record for List {
    fn entity(&self) -> &Entity {
        &self.entity
    }

    fn entity_mut(&mut self) -> &mut Entity {
        &mut self.entity
    }
}

impl Collection for List {
    type Data = Vec<Value>;
    type Item = Value;

    fn cache(&self) -> &CollectionCache<Self::Data> {
        &self.cache
    }

    fn fetch_count(&self) -> Result<usize> {
        self.entity.store().list_len(self.entity.name())
    }

    fn fetch_data(&self) -> Result<Self::Data> {
        let raws = self
            .entity
            .store()
            .list_range(self.entity.name(), 0, -1)?;
        self.entity.decode_seq(raws)
    }

    fn data_len(data: &Self::Data) -> usize {
        data.len()
    }

    fn data_contains(data: &Self::Data, item: &Value) -> bool {
        data.iter().any(|value| value == item)
    }
}

impl EntryAccess for List {
    type EntryKey = usize;
    type Entry = Value;

    fn entry(&self, index: &usize) -> Result<Option<Value>> {
        Ok(self.data(false)?.get(*index).cloned())
    }

    fn put_entry(&self, index: &usize, value: Value) -> Result<bool> {
        self.set(*index as i64, &value)
    }

    /// Lists have no keyed removal command.
    fn remove_entry(&self, _index: &usize) -> Result<bool> {
        Err(StoreError::NotSupported {
            kind: "list",
            op: "remove_entry",
        })
    }
}
