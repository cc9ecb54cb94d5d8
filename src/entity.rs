//! Name, store connection and value pipeline shared by every handle.

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::codec::Codec;
use crate::error::{Result, StoreError};
use crate::store::traits::{RawValue, StoreConnection};

// ============================================================================
// Entity
// ============================================================================

/// The part every record handle carries: an immutable name, a shared store
/// connection, and an optional codec for the values that pass through.
///
/// Without a codec, encoding renders scalars as their canonical text
/// (strings pass through as-is, booleans as `1`/`0`, null as the empty
/// string) and compound values as compact JSON; decoding requires the
/// stored bytes to be UTF-8 and hands them back as a string value. With a
/// codec attached, both directions go through it. Malformed stored data
/// surfaces as `StoreError::Decode` either way.
pub struct Entity {
    name: String,
    store: Arc<dyn StoreConnection>,
    codec: Option<Arc<dyn Codec>>,
}

impl Entity {
    pub fn new(name: impl Into<String>, store: Arc<dyn StoreConnection>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(StoreError::EmptyName);
        }
        Ok(Self {
            name,
            store,
            codec: None,
        })
    }

    pub fn with_codec(
        name: impl Into<String>,
        store: Arc<dyn StoreConnection>,
        codec: Arc<dyn Codec>,
    ) -> Result<Self> {
        let mut entity = Self::new(name, store)?;
        entity.codec = Some(codec);
        Ok(entity)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn store(&self) -> &dyn StoreConnection {
        self.store.as_ref()
    }

    /// Replace the store connection. The name and any codec stay; cached
    /// state on the owning handle is left alone.
    pub fn bind_store(&mut self, store: Arc<dyn StoreConnection>) {
        self.store = store;
    }

    pub fn codec(&self) -> Option<&Arc<dyn Codec>> {
        self.codec.as_ref()
    }

    // -----------------------------------------------------------------------
    // Value pipeline
    // -----------------------------------------------------------------------

    /// Encode one value for storage. Total without a codec.
    pub fn encode(&self, value: &Value) -> Result<RawValue> {
        match &self.codec {
            Some(codec) => codec.encode(value),
            None => Ok(raw_encode(value)),
        }
    }

    /// Decode one stored value. The absent sentinel passes through unchanged.
    pub fn decode(&self, raw: Option<RawValue>) -> Result<Option<Value>> {
        match raw {
            None => Ok(None),
            Some(bytes) => self.decode_value(&bytes).map(Some),
        }
    }

    pub fn encode_seq(&self, values: &[Value]) -> Result<Vec<RawValue>> {
        values.iter().map(|value| self.encode(value)).collect()
    }

    pub fn decode_seq(&self, raws: Vec<RawValue>) -> Result<Vec<Value>> {
        raws.iter().map(|raw| self.decode_value(raw)).collect()
    }

    pub fn decode_map(&self, entries: Vec<(String, RawValue)>) -> Result<IndexMap<String, Value>> {
        let mut map = IndexMap::with_capacity(entries.len());
        for (field, raw) in entries {
            map.insert(field, self.decode_value(&raw)?);
        }
        Ok(map)
    }

    fn decode_value(&self, bytes: &[u8]) -> Result<Value> {
        match &self.codec {
            Some(codec) => codec.decode(bytes),
            None => match std::str::from_utf8(bytes) {
                Ok(text) => Ok(Value::String(text.to_owned())),
                Err(_) => Err(StoreError::Decode("stored bytes are not utf-8".into())),
            },
        }
    }
}

fn raw_encode(value: &Value) -> RawValue {
    match value {
        Value::Null => Vec::new(),
        Value::Bool(true) => b"1".to_vec(),
        Value::Bool(false) => b"0".to_vec(),
        Value::Number(n) => n.to_string().into_bytes(),
        Value::String(s) => s.clone().into_bytes(),
        compound => compound.to_string().into_bytes(),
    }
}

// ============================================================================
// Record
// ============================================================================

/// Lifecycle operations shared by every handle, provided on top of the
/// handle's `Entity`. None of these touch the handle's cache.
pub trait Record {
    fn entity(&self) -> &Entity;
    fn entity_mut(&mut self) -> &mut Entity;

    /// The record name, used verbatim as the store key.
    fn name(&self) -> &str {
        self.entity().name()
    }

    /// Point the handle at another store connection.
    fn bind_store(&mut self, store: Arc<dyn StoreConnection>) {
        self.entity_mut().bind_store(store);
    }

    fn exists(&self) -> Result<bool> {
        self.entity().store().exists(self.entity().name())
    }

    /// Ask the store to expire this record after `seconds`.
    fn expire(&self, seconds: u64) -> Result<bool> {
        self.entity().store().expire(self.entity().name(), seconds)
    }

    /// Cancel a pending expiry.
    fn persist(&self) -> Result<bool> {
        self.entity().store().persist(self.entity().name())
    }

    /// Remaining seconds, `-1` for no timeout, `-2` when the record is absent.
    fn ttl(&self) -> Result<i64> {
        self.entity().store().ttl(self.entity().name())
    }

    /// Remove the record from the store. The handle stays usable.
    fn delete(&self) -> Result<bool> {
        self.entity().store().delete(self.entity().name())
    }
}

/// An operand for the set algebra commands: either a plain record name or a
/// handle standing in for its own name.
pub trait RecordKey {
    fn record_key(&self) -> &str;
}

impl RecordKey for &str {
    fn record_key(&self) -> &str {
        self
    }
}

impl RecordKey for String {
    fn record_key(&self) -> &str {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;
    use serde_json::json;

    fn entity(name: &str) -> Entity {
        Entity::new(name, MemoryStore::shared()).unwrap()
    }

    #[test]
    fn empty_name_is_rejected() {
        assert!(matches!(
            Entity::new("", MemoryStore::shared()),
            Err(StoreError::EmptyName)
        ));
    }

    #[test]
    fn raw_encoding_of_scalars() {
        let e = entity("raw");
        assert_eq!(e.encode(&Value::Null).unwrap(), b"".to_vec());
        assert_eq!(e.encode(&json!(true)).unwrap(), b"1".to_vec());
        assert_eq!(e.encode(&json!(false)).unwrap(), b"0".to_vec());
        assert_eq!(e.encode(&json!(42)).unwrap(), b"42".to_vec());
        assert_eq!(e.encode(&json!(2.5)).unwrap(), b"2.5".to_vec());
        assert_eq!(e.encode(&json!("plain")).unwrap(), b"plain".to_vec());
    }

    #[test]
    fn raw_encoding_of_compound_values_is_json_text() {
        let e = entity("raw");
        assert_eq!(e.encode(&json!([1, 2])).unwrap(), b"[1,2]".to_vec());
        assert_eq!(e.encode(&json!({"a": 1})).unwrap(), br#"{"a":1}"#.to_vec());
    }

    #[test]
    fn decode_passes_absent_through() {
        let e = entity("raw");
        assert_eq!(e.decode(None).unwrap(), None);
        assert_eq!(
            e.decode(Some(b"text".to_vec())).unwrap(),
            Some(json!("text"))
        );
    }

    #[test]
    fn decode_without_codec_requires_utf8() {
        let e = entity("raw");
        assert!(matches!(
            e.decode(Some(vec![0xff, 0xfe])),
            Err(StoreError::Decode(_))
        ));
    }

    #[test]
    fn decode_seq_without_codec_yields_strings() {
        let e = entity("raw");
        let decoded = e
            .decode_seq(vec![b"a".to_vec(), b"b".to_vec()])
            .unwrap();
        assert_eq!(decoded, vec![json!("a"), json!("b")]);
    }

    #[test]
    fn codec_round_trip_through_pipeline() {
        let e = Entity::with_codec(
            "enc",
            MemoryStore::shared(),
            Arc::new(crate::codec::json::JsonCodec),
        )
        .unwrap();
        let value = json!({"n": 1});
        let raw = e.encode(&value).unwrap();
        assert_eq!(e.decode(Some(raw)).unwrap(), Some(value));
    }
}
