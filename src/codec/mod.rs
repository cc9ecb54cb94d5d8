//! Value codecs: how structured values become the byte strings a store holds.

pub mod json;
pub mod msgpack;

use serde_json::Value;

use crate::error::Result;
use crate::store::traits::RawValue;

/// Encodes values for storage and decodes them on the way back.
///
/// A codec sees one value at a time; sequence and map handling live in the
/// record handle's pipeline. Decoding bytes the codec did not produce fails
/// with `StoreError::Decode`.
pub trait Codec: Send + Sync {
    fn encode(&self, value: &Value) -> Result<RawValue>;
    fn decode(&self, raw: &[u8]) -> Result<Value>;
}
