//! In-memory adapter backed by a [`BoundedStore`].

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::Adapter;
use crate::cache::{current_timestamp_ms, BoundedStore, CacheEntry, CacheStats, EvictionPolicy};
use crate::config::Config;
use crate::error::Result;

/// Thread-safe bounded store shared across request tasks.
///
/// Every operation, including `get`, takes the same exclusive lock because a
/// hit updates recency and frequency bookkeeping.
#[derive(Debug, Clone)]
pub struct MemoryAdapter {
    store: Arc<Mutex<BoundedStore>>,
}

impl MemoryAdapter {
    /// Creates an adapter over a new empty store.
    ///
    /// # Errors
    /// `CacheError::InvalidCapacity` when `capacity` is below 2.
    pub fn new(capacity: usize, policy: EvictionPolicy) -> Result<Self> {
        Ok(Self::from_store(BoundedStore::new(capacity, policy)?))
    }

    /// Wraps an existing store.
    pub fn from_store(store: BoundedStore) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
        }
    }

    /// Creates an adapter from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.capacity, config.policy)
    }

    /// Returns a snapshot of the store statistics.
    pub async fn stats(&self) -> CacheStats {
        self.store.lock().await.stats()
    }

    pub async fn len(&self) -> usize {
        self.store.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.store.lock().await.is_empty()
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.store.lock().await.contains(key)
    }
}

#[async_trait]
impl Adapter for MemoryAdapter {
    async fn get(&self, key: &str) -> Option<CacheEntry> {
        let now = current_timestamp_ms();
        self.store.lock().await.get(key, now)
    }

    async fn set(&self, key: &str, entry: CacheEntry) {
        self.store.lock().await.set(key.to_string(), entry);
    }

    async fn release(&self, key: &str) {
        self.store.lock().await.release(key);
    }
}
