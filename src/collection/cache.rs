//! Lazily filled count and data for one collection handle.

use parking_lot::Mutex;

use crate::error::Result;

/// Cached view of a remote collection, private to one handle.
///
/// `None` means not loaded; an empty loaded container is `Some(empty)` and
/// the two are never confused. Handles invalidate before every mutating
/// command, so the cache is clear even when the store refuses the mutation
/// or the call fails.
pub struct CollectionCache<D> {
    state: Mutex<CacheState<D>>,
}

struct CacheState<D> {
    count: Option<usize>,
    data: Option<D>,
}

impl<D: Clone> CollectionCache<D> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(CacheState {
                count: None,
                data: None,
            }),
        }
    }

    /// Forget everything. The next read fetches from the store.
    pub fn invalidate(&self) {
        let mut state = self.state.lock();
        state.count = None;
        state.data = None;
    }

    /// The cached count, fetching through `fetch` when unloaded or forced.
    pub fn count_with<F>(&self, force: bool, fetch: F) -> Result<usize>
    where
        F: FnOnce() -> Result<usize>,
    {
        let mut state = self.state.lock();
        if !force {
            if let Some(count) = state.count {
                return Ok(count);
            }
        }
        let count = fetch()?;
        state.count = Some(count);
        Ok(count)
    }

    /// The cached data, fetching through `fetch` when unloaded or forced.
    /// A fetch fills the count from the same snapshot via `len`.
    pub fn data_with<F, L>(&self, force: bool, len: L, fetch: F) -> Result<D>
    where
        F: FnOnce() -> Result<D>,
        L: Fn(&D) -> usize,
    {
        let mut state = self.state.lock();
        if !force {
            if let Some(data) = &state.data {
                return Ok(data.clone());
            }
        }
        let data = fetch()?;
        state.count = Some(len(&data));
        state.data = Some(data.clone());
        Ok(data)
    }

    /// Drop the data and pin the count to a value reported by the store.
    pub fn prime_count(&self, count: usize) {
        let mut state = self.state.lock();
        state.count = Some(count);
        state.data = None;
    }
}

impl<D: Clone> Default for CollectionCache<D> {
    fn default() -> Self {
        Self::new()
    }
}
