//! Byte-level backing stores.
//!
//! Remote key-value services only see opaque bytes. [`EncodedAdapter`] turns
//! such a store into an [`Adapter`] using the entry codec, so entries written
//! through one byte store are readable through any other.

use async_trait::async_trait;
use tracing::debug;

use super::Adapter;
use crate::cache::{codec, current_timestamp_ms, CacheEntry};

/// Contract for a store holding encoded entries.
#[async_trait]
pub trait ByteStore: Send + Sync {
    /// Returns the bytes stored under `key`.
    async fn get(&self, key: &str) -> Option<Vec<u8>>;

    /// Stores `value` under `key` until `expires_at` (Unix milliseconds).
    async fn set(&self, key: &str, value: Vec<u8>, expires_at: u64);

    /// Frees `key`.
    async fn release(&self, key: &str);
}

/// Adapter over a [`ByteStore`].
#[derive(Debug, Clone)]
pub struct EncodedAdapter<S> {
    inner: S,
}

impl<S: ByteStore> EncodedAdapter<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: ByteStore> Adapter for EncodedAdapter<S> {
    async fn get(&self, key: &str) -> Option<CacheEntry> {
        let bytes = self.inner.get(key).await?;

        let mut entry = codec::decode(&bytes);
        if !entry.is_usable() {
            debug!(key, "stored bytes did not decode to a usable entry, releasing");
            self.inner.release(key).await;
            return None;
        }

        // The store cannot update bookkeeping inside opaque bytes, so write
        // the touched entry back.
        entry.touch(current_timestamp_ms());
        self.inner
            .set(key, codec::encode(&entry), entry.expires_at)
            .await;

        Some(entry)
    }

    async fn set(&self, key: &str, entry: CacheEntry) {
        self.inner
            .set(key, codec::encode(&entry), entry.expires_at)
            .await;
    }

    async fn release(&self, key: &str) {
        self.inner.release(key).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeMap, HashMap};
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct MapStore {
        records: Mutex<HashMap<String, (Vec<u8>, u64)>>,
    }

    #[async_trait]
    impl ByteStore for MapStore {
        async fn get(&self, key: &str) -> Option<Vec<u8>> {
            let records = self.records.lock().unwrap();
            records.get(key).map(|(bytes, _)| bytes.clone())
        }

        async fn set(&self, key: &str, value: Vec<u8>, expires_at: u64) {
            let mut records = self.records.lock().unwrap();
            records.insert(key.to_string(), (value, expires_at));
        }

        async fn release(&self, key: &str) {
            self.records.lock().unwrap().remove(key);
        }
    }

    fn entry(body: &str) -> CacheEntry {
        CacheEntry::new(
            body.as_bytes().to_vec(),
            BTreeMap::new(),
            Duration::from_secs(60),
            current_timestamp_ms(),
        )
    }

    #[tokio::test]
    async fn test_set_writes_encoded_bytes_with_expiry() {
        let adapter = EncodedAdapter::new(MapStore::default());
        let stored = entry("value 1");

        adapter.set("k", stored.clone()).await;

        let records = adapter.inner().records.lock().unwrap();
        let (bytes, expires_at) = &records["k"];
        assert_eq!(codec::decode(bytes), stored);
        assert_eq!(*expires_at, stored.expires_at);
    }

    #[tokio::test]
    async fn test_get_persists_touched_bookkeeping() {
        let adapter = EncodedAdapter::new(MapStore::default());
        adapter.set("k", entry("value 1")).await;

        adapter.get("k").await.unwrap();
        let second = adapter.get("k").await.unwrap();

        assert_eq!(second.access_count, 3);
        let bytes = adapter.inner().get("k").await.unwrap();
        assert_eq!(codec::decode(&bytes).access_count, 3);
    }

    #[tokio::test]
    async fn test_get_treats_garbage_as_miss() {
        let adapter = EncodedAdapter::new(MapStore::default());
        adapter.inner().set("k", b"garbage".to_vec(), 1).await;

        assert!(adapter.get("k").await.is_none());
        assert!(
            adapter.inner().get("k").await.is_none(),
            "Undecodable record should be released"
        );
    }

    #[tokio::test]
    async fn test_release() {
        let adapter = EncodedAdapter::new(MapStore::default());
        adapter.set("k", entry("value 1")).await;

        adapter.release("k").await;

        assert!(adapter.get("k").await.is_none());
    }
}
