//! Set records holding distinct raw string members.

use std::sync::Arc;

use crate::codec::Codec;
use crate::entity::{Entity, Record, RecordKey};
use crate::error::{Result, StoreError};
use crate::store::traits::StoreConnection;

use super::cache::CollectionCache;
use super::traits::{Collection, EntryAccess};

/// Handle over a set record. Members are stored verbatim; a codec would
/// break the store-side algebra commands, so attaching one is refused.
pub struct Set {
    entity: Entity,
    cache: CollectionCache<Vec<String>>,
}

impl Set {
    pub fn new(name: impl Into<String>, store: Arc<dyn StoreConnection>) -> Result<Self> {
        Ok(Self {
            entity: Entity::new(name, store)?,
            cache: CollectionCache::new(),
        })
    }

    /// Always fails: set members never go through a codec.
    pub fn with_codec(
        _name: impl Into<String>,
        _store: Arc<dyn StoreConnection>,
        _codec: Arc<dyn Codec>,
    ) -> Result<Self> {
        Err(StoreError::CodecForbidden { kind: "set" })
    }

    /// Add one member. `false` when it was already present.
    pub fn add(&self, member: &str) -> Result<bool> {
        self.cache.invalidate();
        self.entity.store().set_add(self.entity.name(), member)
    }

    /// Remove one member. `false` when it was absent.
    pub fn remove(&self, member: &str) -> Result<bool> {
        self.cache.invalidate();
        self.entity.store().set_remove(self.entity.name(), member)
    }

    /// Remove and return an arbitrary member.
    pub fn pop(&self) -> Result<Option<String>> {
        self.cache.invalidate();
        self.entity.store().set_pop(self.entity.name())
    }

    /// An arbitrary member, left in place.
    pub fn random(&self) -> Result<Option<String>> {
        self.entity.store().set_random_member(self.entity.name())
    }

    /// Atomically move `member` into `dest`. Both handles drop their caches
    /// whether or not the move happens.
    pub fn move_to(&self, dest: &Set, member: &str) -> Result<bool> {
        self.cache.invalidate();
        dest.cache.invalidate();
        self.entity
            .store()
            .set_move(self.entity.name(), dest.entity.name(), member)
    }

    /// Members of this set absent from every operand.
    pub fn diff(&self, others: &[&dyn RecordKey]) -> Result<Vec<String>> {
        let keys = self.operand_keys(others);
        self.entity.store().set_diff(&keys)
    }

    /// Store the difference into `dest`, replacing it. Returns the size.
    pub fn diff_store(&self, dest: &Set, others: &[&dyn RecordKey]) -> Result<usize> {
        dest.cache.invalidate();
        let keys = self.operand_keys(others);
        self.entity.store().set_diff_store(dest.entity.name(), &keys)
    }

    /// Members common to this set and every operand.
    pub fn inter(&self, others: &[&dyn RecordKey]) -> Result<Vec<String>> {
        let keys = self.operand_keys(others);
        self.entity.store().set_inter(&keys)
    }

    /// Store the intersection into `dest`, replacing it. Returns the size.
    pub fn inter_store(&self, dest: &Set, others: &[&dyn RecordKey]) -> Result<usize> {
        dest.cache.invalidate();
        let keys = self.operand_keys(others);
        self.entity
            .store()
            .set_inter_store(dest.entity.name(), &keys)
    }

    /// Members of this set or any operand.
    pub fn union(&self, others: &[&dyn RecordKey]) -> Result<Vec<String>> {
        let keys = self.operand_keys(others);
        self.entity.store().set_union(&keys)
    }

    /// Store the union into `dest`, replacing it. Returns the size.
    pub fn union_store(&self, dest: &Set, others: &[&dyn RecordKey]) -> Result<usize> {
        dest.cache.invalidate();
        let keys = self.operand_keys(others);
        self.entity
            .store()
            .set_union_store(dest.entity.name(), &keys)
    }

    /// Replace the whole set with `members`. Returns how many were added.
    pub fn copy_from<I>(&self, members: I) -> Result<usize>
    where
        I: IntoIterator<Item = String>,
    {
        self.clear()?;
        let mut copied = 0;
        for member in members {
            if self.add(&member)? {
                copied += 1;
            }
        }
        Ok(copied)
    }

    /// Iterate one snapshot of the members. Mutations made after this call
    /// are not reflected; call again for a fresh view.
    pub fn iter(&self) -> Result<impl Iterator<Item = String>> {
        Ok(self.data(false)?.into_iter())
    }

    /// This set's name first, then the operands' names, in call order.
    fn operand_keys<'a>(&'a self, others: &'a [&'a dyn RecordKey]) -> Vec<&'a str> {
        let mut keys = Vec::with_capacity(others.len() + 1);
        keys.push(self.entity.name());
        keys.extend(others.iter().map(|other| other.record_key()));
        keys
    }
}

impl Record for Set {
    fn entity(&self) -> &Entity {
        &self.entity
    }

    fn entity_mut(&mut self) -> &mut Entity {
        &mut self.entity
    }
}

impl RecordKey for Set {
    fn record_key(&self) -> &str {
        self.entity.name()
    }
}

impl Collection for Set {
    type Data = Vec<String>;
    type Item = str;

    fn cache(&self) -> &CollectionCache<Self::Data> {
        &self.cache
    }

    fn fetch_count(&self) -> Result<usize> {
        self.entity.store().set_card(self.entity.name())
    }

    fn fetch_data(&self) -> Result<Self::Data> {
        self.entity.store().set_members(self.entity.name())
    }

    fn data_len(data: &Self::Data) -> usize {
        data.len()
    }

    fn data_contains(data: &Self::Data, item: &str) -> bool {
        data.iter().any(|member| member == item)
    }

    /// Membership goes to the store directly rather than through the cache.
    fn contains(&self, member: &str) -> Result<bool> {
        self.entity
            .store()
            .set_is_member(self.entity.name(), member)
    }
}

impl EntryAccess for Set {
    type EntryKey = usize;
    type Entry = String;

    fn entry(&self, index: &usize) -> Result<Option<String>> {
        Ok(self.data(false)?.get(*index).cloned())
    }

    /// Sets have no positional write command.
    fn put_entry(&self, _index: &usize, _member: String) -> Result<bool> {
        Err(StoreError::NotSupported {
            kind: "set",
            op: "put_entry",
        })
    }

    /// Remove the member sitting at `index` in the current snapshot.
    /// `false` when the index is out of range.
    fn remove_entry(&self, index: &usize) -> Result<bool> {
        let data = self.data(false)?;
        match data.get(*index) {
            Some(member) => self.remove(member),
            None => Ok(false),
        }
    }
}
