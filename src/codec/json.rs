//! JSON codec backed by serde_json.

use serde_json::Value;

use crate::error::{Result, StoreError};
use crate::store::traits::RawValue;

use super::Codec;

/// Stores values as compact JSON text. Readable from the store's own
/// tooling, at the cost of a larger encoding than `MsgPackCodec`.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode(&self, value: &Value) -> Result<RawValue> {
        serde_json::to_vec(value).map_err(|e| StoreError::Encode(e.to_string()))
    }

    fn decode(&self, raw: &[u8]) -> Result<Value> {
        serde_json::from_slice(raw).map_err(|e| StoreError::Decode(e.to_string()))
    }
}
