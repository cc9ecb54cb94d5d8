//! Handle for a plain scalar record holding one value.

use std::sync::Arc;

use serde_json::Value;

use crate::codec::Codec;
use crate::entity::{Entity, Record};
use crate::error::Result;
use crate::store::traits::StoreConnection;

/// Handle over a scalar record. Reads and writes go straight to the
/// store; there is nothing to cache, a scalar has no parts.
pub struct Key {
    entity: Entity,
}

impl Key {
    pub fn new(name: impl Into<String>, store: Arc<dyn StoreConnection>) -> Result<Self> {
        Ok(Self {
            entity: Entity::new(name, store)?,
        })
    }

    pub fn with_codec(
        name: impl Into<String>,
        store: Arc<dyn StoreConnection>,
        codec: Arc<dyn Codec>,
    ) -> Result<Self> {
        Ok(Self {
            entity: Entity::with_codec(name, store, codec)?,
        })
    }

    /// The stored value, `None` when the record is absent.
    pub fn get(&self) -> Result<Option<Value>> {
        let raw = self.entity.store().get(self.entity.name())?;
        self.entity.decode(raw)
    }

    /// Write the value, replacing whatever was there. `false` when the
    /// store refuses the write.
    pub fn set(&self, value: &Value) -> Result<bool> {
        let raw = self.entity.encode(value)?;
        self.entity.store().set(self.entity.name(), raw)
    }

    /// Write the value only when no record exists under this name yet.
    pub fn set_nx(&self, value: &Value) -> Result<bool> {
        let raw = self.entity.encode(value)?;
        self.entity.store().set_nx(self.entity.name(), raw)
    }
}

impl Record for Key {
    fn entity(&self) -> &Entity {
        &self.entity
    }

    fn entity_mut(&mut self) -> &mut Entity {
        &mut self.entity
    }
}
