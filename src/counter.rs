//! Scalar counter records driven through atomic increments.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::codec::Codec;
use crate::entity::{Entity, Record};
use crate::error::{Result, StoreError};
use crate::store::traits::StoreConnection;

/// Handle over an integer counter record.
///
/// The last value seen is cached; increments refresh it from the store's
/// own arithmetic, so the cache tracks the remote value exactly until
/// another handle writes the record.
pub struct Counter {
    entity: Entity,
    cached: Mutex<Option<i64>>,
}

impl Counter {
    pub fn new(name: impl Into<String>, store: Arc<dyn StoreConnection>) -> Result<Self> {
        Ok(Self {
            entity: Entity::new(name, store)?,
            cached: Mutex::new(None),
        })
    }

    /// Always fails: counters live as bare numeric text in the store.
    pub fn with_codec(
        _name: impl Into<String>,
        _store: Arc<dyn StoreConnection>,
        _codec: Arc<dyn Codec>,
    ) -> Result<Self> {
        Err(StoreError::CodecForbidden { kind: "counter" })
    }

    /// The current value. An absent record reads as zero; a record whose
    /// payload is not an integer fails with `Decode`.
    pub fn value(&self, force_refresh: bool) -> Result<i64> {
        let mut cached = self.cached.lock();
        if !force_refresh {
            if let Some(value) = *cached {
                return Ok(value);
            }
        }
        let value = match self.entity.store().get(self.entity.name())? {
            None => 0,
            Some(raw) => parse_integer(&raw)?,
        };
        *cached = Some(value);
        Ok(value)
    }

    /// Atomically add `by` and return the new value.
    pub fn increment(&self, by: i64) -> Result<i64> {
        let mut cached = self.cached.lock();
        *cached = None;
        let value = self.entity.store().incr_by(self.entity.name(), by)?;
        *cached = Some(value);
        Ok(value)
    }

    /// Counterpart of `increment`.
    pub fn decrement(&self, by: i64) -> Result<i64> {
        let by = by
            .checked_neg()
            .ok_or_else(|| StoreError::Backend("decrement amount out of range".into()))?;
        self.increment(by)
    }

    /// Delete the record; the next read starts from zero again.
    pub fn clear(&self) -> Result<&Self> {
        *self.cached.lock() = None;
        self.entity.store().delete(self.entity.name())?;
        Ok(self)
    }
}

impl Record for Counter {
    fn entity(&self) -> &Entity {
        &self.entity
    }

    fn entity_mut(&mut self) -> &mut Entity {
        &mut self.entity
    }
}

/// Handle over a float counter record. Same shape as `Counter` with the
/// store's float arithmetic underneath.
pub struct FloatCounter {
    entity: Entity,
    cached: Mutex<Option<f64>>,
}

impl FloatCounter {
    pub fn new(name: impl Into<String>, store: Arc<dyn StoreConnection>) -> Result<Self> {
        Ok(Self {
            entity: Entity::new(name, store)?,
            cached: Mutex::new(None),
        })
    }

    /// Always fails: counters live as bare numeric text in the store.
    pub fn with_codec(
        _name: impl Into<String>,
        _store: Arc<dyn StoreConnection>,
        _codec: Arc<dyn Codec>,
    ) -> Result<Self> {
        Err(StoreError::CodecForbidden { kind: "counter" })
    }

    /// The current value. An absent record reads as zero; a record whose
    /// payload is not numeric fails with `Decode`.
    pub fn value(&self, force_refresh: bool) -> Result<f64> {
        let mut cached = self.cached.lock();
        if !force_refresh {
            if let Some(value) = *cached {
                return Ok(value);
            }
        }
        let value = match self.entity.store().get(self.entity.name())? {
            None => 0.0,
            Some(raw) => parse_float(&raw)?,
        };
        *cached = Some(value);
        Ok(value)
    }

    /// Atomically add `by` and return the new value.
    pub fn increment(&self, by: f64) -> Result<f64> {
        let mut cached = self.cached.lock();
        *cached = None;
        let value = self
            .entity
            .store()
            .incr_by_float(self.entity.name(), by)?;
        *cached = Some(value);
        Ok(value)
    }

    /// Counterpart of `increment`.
    pub fn decrement(&self, by: f64) -> Result<f64> {
        self.increment(-by)
    }

    /// Delete the record; the next read starts from zero again.
    pub fn clear(&self) -> Result<&Self> {
        *self.cached.lock() = None;
        self.entity.store().delete(self.entity.name())?;
        Ok(self)
    }
}

impl Record for FloatCounter {
    fn entity(&self) -> &Entity {
        &self.entity
    }

    fn entity_mut(&mut self) -> &mut Entity {
        &mut self.entity
    }
}

fn parse_integer(raw: &[u8]) -> Result<i64> {
    let text = std::str::from_utf8(raw)
        .map_err(|_| StoreError::Decode("counter payload is not utf-8".into()))?;
    text.parse()
        .map_err(|_| StoreError::Decode(format!("counter payload is not an integer: {text:?}")))
}

fn parse_float(raw: &[u8]) -> Result<f64> {
    let text = std::str::from_utf8(raw)
        .map_err(|_| StoreError::Decode("counter payload is not utf-8".into()))?;
    text.parse()
        .map_err(|_| StoreError::Decode(format!("counter payload is not numeric: {text:?}")))
}
