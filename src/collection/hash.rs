//! Hash records mapping fields to encoded values.

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::codec::Codec;
use crate::entity::{Entity, Record};
use crate::error::{Result, StoreError};
use crate::store::traits::StoreConnection;

use super::cache::CollectionCache;
use super::traits::{Collection, EntryAccess};

/// Handle over a hash record: named fields, each holding one encoded value.
pub struct HashTable {
    entity: Entity,
    cache: CollectionCache<IndexMap<String, Value>>,
}

impl HashTable {
    pub fn new(name: impl Into<String>, store: Arc<dyn StoreConnection>) -> Result<Self> {
        Ok(Self {
            entity: Entity::new(name, store)?,
            cache: CollectionCache::new(),
        })
    }

    /// Open a hash whose values go through `codec` in both directions.
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

    /// Upsert one field. `false` when the store refuses.
    pub fn set(&self, field: &str, value: &Value) -> Result<bool> {
        self.cache.invalidate();
        let raw = self.entity.encode(value)?;
        self.entity.store().hash_set(self.entity.name(), field, raw)
    }

    /// Write one field only if it is absent. `false` when it already exists.
    pub fn set_nx(&self, field: &str, value: &Value) -> Result<bool> {
        self.cache.invalidate();
        let raw = self.entity.encode(value)?;
        self.entity
            .store()
            .hash_set_nx(self.entity.name(), field, raw)
    }

    /// Read one field straight from the store, bypassing the cache.
    /// An absent field is `None`, never an error.
    pub fn get(&self, field: &str) -> Result<Option<Value>> {
        let raw = self.entity.store().hash_get(self.entity.name(), field)?;
        self.entity.decode(raw)
    }

    /// Atomically add to an integer field and return the result.
    /// Fails with `CodecConflict` before reaching the store when a codec is
    /// attached: the stored text would not be the codec's output.
    pub fn increment(&self, field: &str, by: i64) -> Result<i64> {
        if self.entity.codec().is_some() {
            return Err(StoreError::CodecConflict { op: "increment" });
        }
        self.cache.invalidate();
        self.entity
            .store()
            .hash_incr_by(self.entity.name(), field, by)
    }

    /// Float counterpart of `increment`, under the same codec guard.
    pub fn increment_by_float(&self, field: &str, by: f64) -> Result<f64> {
        if self.entity.codec().is_some() {
            return Err(StoreError::CodecConflict {
                op: "increment_by_float",
            });
        }
        self.cache.invalidate();
        self.entity
            .store()
            .hash_incr_by_float(self.entity.name(), field, by)
    }

    /// Remove one field. `false` when the field was absent.
    pub fn remove(&self, field: &str) -> Result<bool> {
        self.cache.invalidate();
        self.entity.store().hash_delete(self.entity.name(), field)
    }

    /// Iterate one snapshot of the fields. Mutations made after this call
    /// are not reflected; call again for a fresh view.
    pub fn iter(&self) -> Result<impl Iterator<Item = (String, Value)>> {
        Ok(self.data(false)?.into_iter())
    }
}

impl Record for HashTable {
    fn entity(&self) -> &Entity {
        &self.entity
    }

    fn entity_mut(&mut self) -> &mut Entity {
        &mut self.entity
    }
}

impl Collection for HashTable {
    type Data = IndexMap<String, Value>;
    type Item = Value;

    fn cache(&self) -> &CollectionCache<Self::Data> {
        &self.cache
    }

    fn fetch_count(&self) -> Result<usize> {
        self.entity.store().hash_len(self.entity.name())
    }

    fn fetch_data(&self) -> Result<Self::Data> {
        let entries = self.entity.store().hash_get_all(self.entity.name())?;
        self.entity.decode_map(entries)
    }

    fn data_len(data: &Self::Data) -> usize {
        data.len()
    }

    fn data_contains(data: &Self::Data, item: &Value) -> bool {
        data.values().any(|value| value == item)
    }
}

impl EntryAccess for HashTable {
    type EntryKey = str;
    type Entry = Value;

    fn entry(&self, field: &str) -> Result<Option<Value>> {
        Ok(self.data(false)?.get(field).cloned())
    }

    fn put_entry(&self, field: &str, value: Value) -> Result<bool> {
        self.set(field, &value)
    }

    fn remove_entry(&self, field: &str) -> Result<bool> {
        self.remove(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::json::JsonCodec;
    use crate::store::memory::MemoryStore;

    #[test]
    fn increment_refuses_when_codec_attached() {
        let store = MemoryStore::shared();
        let hash = HashTable::with_codec("guard", store.clone(), Arc::new(JsonCodec)).unwrap();
        assert!(matches!(
            hash.increment("n", 1),
            Err(StoreError::CodecConflict { .. })
        ));
        assert!(matches!(
            hash.increment_by_float("n", 0.5),
            Err(StoreError::CodecConflict { .. })
        ));
        // The guard fires before any command reaches the store.
        assert_eq!(store.command_count(), 0);
    }

    #[test]
    fn increment_without_codec_reaches_the_store() {
        let store = MemoryStore::shared();
        let hash = HashTable::new("plain", store).unwrap();
        assert_eq!(hash.increment("n", 2).unwrap(), 2);
        assert_eq!(hash.increment("n", 3).unwrap(), 5);
    }
}
