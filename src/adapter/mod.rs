//! Adapter Module
//!
//! Backing store abstraction used by the cache client.
//!
//! # Implementations
//! - [`MemoryAdapter`] - bounded in-process store with eviction
//! - [`EncodedAdapter`] - bridges any byte-level [`ByteStore`] through the entry codec

mod encoded;
mod memory;

use async_trait::async_trait;

use crate::cache::CacheEntry;

pub use encoded::{ByteStore, EncodedAdapter};
pub use memory::MemoryAdapter;

/// Capability interface for a cache backing store.
///
/// Any implementation can be swapped in without touching the client.
#[async_trait]
pub trait Adapter: Send + Sync {
    /// Returns the entry stored under `key`, recording the access on it.
    async fn get(&self, key: &str) -> Option<CacheEntry>;

    /// Stores `entry` under `key` until `entry.expires_at`.
    async fn set(&self, key: &str, entry: CacheEntry);

    /// Frees the entry stored under `key`, if any.
    async fn release(&self, key: &str);
}
