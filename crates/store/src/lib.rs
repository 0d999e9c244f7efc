//! Parley store - durable JSON record collections
//!
//! Each record collection is one JSON array document on disk. Reads recover
//! from missing or corrupt documents by returning an empty collection;
//! writes are full read-modify-write cycles under a per-document exclusive
//! lock, flushed atomically via a temp file and rename. Record ids come from
//! persisted monotonic counters, never from collection length.

pub mod collections;
pub mod document;
pub mod ids;

pub use collections::RecordStore;
pub use document::{JsonDocument, StoreError};
pub use ids::IdAllocator;
