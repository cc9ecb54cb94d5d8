//! MessagePack codec backed by rmp-serde.

use serde_json::Value;

use crate::error::{Result, StoreError};
use crate::store::traits::RawValue;

use super::Codec;

/// Stores values as MessagePack. Compact and fast, not human-readable.
#[derive(Debug, Default, Clone, Copy)]
pub struct MsgPackCodec;

impl Codec for MsgPackCodec {
    fn encode(&self, value: &Value) -> Result<RawValue> {
        rmp_serde::to_vec(value).map_err(|e| StoreError::Encode(e.to_string()))
    }

    fn decode(&self, raw: &[u8]) -> Result<Value> {
        rmp_serde::from_slice(raw).map_err(|e| StoreError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn round_trips_compound_values() {
        let codec = MsgPackCodec;
        let value = json!({"id": 7, "tags": ["a", "b"], "score": 1.25});
        let raw = codec.encode(&value).unwrap();
        assert_eq!(codec.decode(&raw).unwrap(), value);
    }

    #[test]
    fn encodes_tighter_than_json() {
        let value = json!({"name": "abcdefgh", "count": 12345});
        let packed = MsgPackCodec.encode(&value).unwrap();
        let text = serde_json::to_vec(&value).unwrap();
        assert!(packed.len() < text.len());
    }

    #[test]
    fn rejects_truncated_input() {
        let codec = MsgPackCodec;
        let mut raw = codec.encode(&json!(["a", "b", "c"])).unwrap();
        raw.truncate(raw.len() - 2);
        assert!(matches!(codec.decode(&raw), Err(StoreError::Decode(_))));
    }
}
