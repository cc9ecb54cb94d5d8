//! Typed handles for remote key-value collections with lazy local caching.
//!
//! Each handle names one record in a [`StoreConnection`] and mirrors it
//! locally:
//! - `Key`, `Counter`, `FloatCounter` for scalar records
//! - `HashTable`, `List`, `Set`, `SortedSet` for collection records
//!
//! Collection handles cache the record's count and contents and drop the
//! cache before every write they issue. Caches are per handle and never
//! coordinated: two handles over the same record see each other's writes
//! only after their own cache is refreshed or force-refreshed. Values on
//! keys, hash tables and lists pass through an optional [`Codec`]; sets,
//! sorted sets and counters store their payloads verbatim.

pub mod codec;
pub mod collection;
pub mod counter;
pub mod entity;
pub mod error;
pub mod key;
pub mod store;

pub use codec::json::JsonCodec;
pub use codec::msgpack::MsgPackCodec;
pub use codec::Codec;
pub use collection::cache::CollectionCache;
pub use collection::hash::HashTable;
pub use collection::list::List;
pub use collection::set::Set;
pub use collection::sorted_set::SortedSet;
pub use collection::traits::{Collection, EntryAccess};
pub use counter::{Counter, FloatCounter};
pub use entity::{Entity, Record, RecordKey};
pub use error::{Result, StoreError};
pub use key::Key;
pub use store::memory::MemoryStore;
pub use store::traits::{Placement, RawValue, ScoreBound, StoreConnection};
