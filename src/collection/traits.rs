//! Shared surface of the container handles.

use tracing::debug;

use crate::entity::Record;
use crate::error::Result;

use super::cache::CollectionCache;

/// A record handle over one of the store's container kinds, with a lazy
/// per-handle cache of its count and data.
///
/// `count` and `data` come from the cache and only reach the store when
/// nothing is loaded or the caller forces a refresh. Two handles on the same
/// name do not coordinate: after another handle (or process) mutates the
/// record, a loaded cache keeps serving its old snapshot until this handle
/// mutates, invalidates, or force-refreshes.
pub trait Collection: Record {
    /// Snapshot type held by the cache.
    type Data: Clone;
    /// What `contains` compares against.
    type Item: ?Sized;

    fn cache(&self) -> &CollectionCache<Self::Data>;

    /// Issue the store's count command for this kind.
    fn fetch_count(&self) -> Result<usize>;

    /// Issue the store's bulk read for this kind and decode it.
    fn fetch_data(&self) -> Result<Self::Data>;

    fn data_len(data: &Self::Data) -> usize;

    /// Value-equality scan of a loaded snapshot.
    fn data_contains(data: &Self::Data, item: &Self::Item) -> bool;

    /// Number of elements, from the cache when loaded. An absent record
    /// counts zero.
    fn count(&self, force_refresh: bool) -> Result<usize> {
        self.cache()
            .count_with(force_refresh, || self.fetch_count())
    }

    /// Full decoded snapshot, from the cache when loaded. An absent record
    /// yields an empty container.
    fn data(&self, force_refresh: bool) -> Result<Self::Data> {
        self.cache()
            .data_with(force_refresh, Self::data_len, || self.fetch_data())
    }

    /// Forget cached state without touching the store.
    fn invalidate(&self) {
        self.cache().invalidate();
    }

    /// Whether `item` occurs in the collection, judged against `data()`.
    fn contains(&self, item: &Self::Item) -> Result<bool> {
        Ok(Self::data_contains(&self.data(false)?, item))
    }

    /// Invalidate and delete the record. Returns the handle for chaining.
    fn clear(&self) -> Result<&Self>
    where
        Self: Sized,
    {
        debug!(record = self.entity().name(), "clearing record");
        self.invalidate();
        self.entity().store().delete(self.entity().name())?;
        Ok(self)
    }
}

/// Keyed element access over a collection handle.
///
/// `entry` reads through `data()`, so an unknown key or index is `None` and
/// never an error. Writes and removals delegate to the kind's own commands;
/// kinds that have no such command fail with `StoreError::NotSupported`.
pub trait EntryAccess: Collection {
    /// The lookup key: a field name, an index, or a member.
    type EntryKey: ?Sized;
    /// The element produced by a lookup.
    type Entry;

    fn entry(&self, key: &Self::EntryKey) -> Result<Option<Self::Entry>>;

    fn has_entry(&self, key: &Self::EntryKey) -> Result<bool> {
        Ok(self.entry(key)?.is_some())
    }

    fn put_entry(&self, key: &Self::EntryKey, value: Self::Entry) -> Result<bool>;

    fn remove_entry(&self, key: &Self::EntryKey) -> Result<bool>;
}
