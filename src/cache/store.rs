//! Bounded Store Module
//!
//! Capacity-limited key to entry mapping with policy-driven eviction.

use std::collections::HashMap;

use tracing::debug;

use crate::cache::{CacheEntry, CacheStats, EvictionPolicy, MIN_CAPACITY};
use crate::error::{CacheError, Result};

// == Bounded Store ==
/// Holds at most `capacity` typed records.
///
/// Not synchronized on its own; share it through
/// [`MemoryAdapter`](crate::adapter::MemoryAdapter), which serializes every
/// operation behind one exclusive lock.
#[derive(Debug)]
pub struct BoundedStore {
    /// Key to entry records
    records: HashMap<String, CacheEntry>,
    /// Victim selection rule
    policy: EvictionPolicy,
    /// Maximum number of records
    capacity: usize,
    /// Activity counters
    stats: CacheStats,
}

impl BoundedStore {
    // == Constructor ==
    /// Creates an empty store.
    ///
    /// # Errors
    /// `CacheError::InvalidCapacity` when `capacity` is below 2.
    pub fn new(capacity: usize, policy: EvictionPolicy) -> Result<Self> {
        if capacity < MIN_CAPACITY {
            return Err(CacheError::InvalidCapacity(capacity));
        }

        Ok(Self {
            records: HashMap::with_capacity(capacity),
            policy,
            capacity,
            stats: CacheStats::new(),
        })
    }

    // == Get ==
    /// Looks up a record and records the hit on it at `now`.
    ///
    /// A hit is a mutation: `last_access` and `access_count` are updated in
    /// place before the copy is returned. An expired record is still returned
    /// so the caller can release it, but it counts as a miss.
    pub fn get(&mut self, key: &str, now: u64) -> Option<CacheEntry> {
        match self.records.get_mut(key) {
            Some(entry) => {
                if entry.is_expired_at(now) {
                    self.stats.record_miss();
                } else {
                    self.stats.record_hit();
                }
                entry.touch(now);
                Some(entry.clone())
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Set ==
    /// Inserts or overwrites a record.
    ///
    /// Overwriting an existing key never evicts. Inserting a new key into a
    /// full store evicts exactly one victim first.
    ///
    /// Returns the evicted key, if any.
    pub fn set(&mut self, key: String, entry: CacheEntry) -> Option<String> {
        let mut evicted = None;

        if !self.records.contains_key(&key) && self.records.len() >= self.capacity {
            evicted = self.evict();
        }

        self.records.insert(key, entry);
        self.stats.set_total_entries(self.records.len());

        evicted
    }

    // == Release ==
    /// Removes a record. Absence is not an error.
    ///
    /// Returns true if a record was removed.
    pub fn release(&mut self, key: &str) -> bool {
        let removed = self.records.remove(key).is_some();
        if removed {
            self.stats.record_release();
            self.stats.set_total_entries(self.records.len());
        }
        removed
    }

    // == Evict ==
    fn evict(&mut self) -> Option<String> {
        let victim = self.policy.select_victim(&self.records)?.to_string();
        self.records.remove(&victim);
        self.stats.record_eviction();
        debug!(key = %victim, policy = %self.policy, "evicted cache record");
        Some(victim)
    }

    /// Reads a record without touching its bookkeeping.
    #[cfg(test)]
    pub(crate) fn peek(&self, key: &str) -> Option<&CacheEntry> {
        self.records.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.records.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn policy(&self) -> EvictionPolicy {
        self.policy
    }

    // == Stats ==
    /// Returns a snapshot of the store statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.records.len());
        stats
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::time::Duration;

    const TTL: Duration = Duration::from_secs(300);

    fn entry(body: &str, now: u64) -> CacheEntry {
        CacheEntry::new(body.as_bytes().to_vec(), BTreeMap::new(), TTL, now)
    }

    #[test]
    fn test_store_new() {
        let store = BoundedStore::new(2, EvictionPolicy::Lru).unwrap();
        assert!(store.is_empty());
        assert_eq!(store.capacity(), 2);
        assert_eq!(store.policy(), EvictionPolicy::Lru);
    }

    #[test]
    fn test_store_rejects_small_capacity() {
        assert_eq!(
            BoundedStore::new(1, EvictionPolicy::Lru).unwrap_err(),
            CacheError::InvalidCapacity(1)
        );
        assert!(BoundedStore::new(0, EvictionPolicy::Mfu).is_err());
    }

    #[test]
    fn test_store_set_and_get() {
        let mut store = BoundedStore::new(4, EvictionPolicy::Lru).unwrap();

        store.set("key1".to_string(), entry("value1", 1));
        let found = store.get("key1", 2).unwrap();

        assert_eq!(found.payload, b"value1");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_get_updates_bookkeeping() {
        let mut store = BoundedStore::new(4, EvictionPolicy::Lru).unwrap();
        store.set("key1".to_string(), entry("value1", 1));

        store.get("key1", 5);
        let found = store.get("key1", 9).unwrap();

        assert_eq!(found.last_access, 9);
        assert_eq!(found.access_count, 3);
        assert_eq!(store.peek("key1").unwrap().access_count, 3);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let mut store = BoundedStore::new(4, EvictionPolicy::Lru).unwrap();
        assert!(store.get("nonexistent", 1).is_none());
        assert_eq!(store.stats().misses, 1);
    }

    #[test]
    fn test_store_release() {
        let mut store = BoundedStore::new(4, EvictionPolicy::Lru).unwrap();

        store.set("key1".to_string(), entry("value1", 1));
        assert!(store.release("key1"));

        assert!(store.is_empty());
        assert!(store.get("key1", 2).is_none());
    }

    #[test]
    fn test_store_release_nonexistent() {
        let mut store = BoundedStore::new(4, EvictionPolicy::Lru).unwrap();
        assert!(!store.release("nonexistent"));
        assert_eq!(store.stats().releases, 0);
    }

    #[test]
    fn test_store_overwrite_at_capacity_does_not_evict() {
        let mut store = BoundedStore::new(2, EvictionPolicy::Lru).unwrap();

        store.set("a".to_string(), entry("1", 1));
        store.set("b".to_string(), entry("2", 2));
        let evicted = store.set("a".to_string(), entry("3", 3));

        assert!(evicted.is_none());
        assert_eq!(store.len(), 2);
        assert_eq!(store.peek("a").unwrap().payload, b"3");
        assert_eq!(store.stats().evictions, 0);
    }

    #[test]
    fn test_store_lru_scenario() {
        let mut store = BoundedStore::new(2, EvictionPolicy::Lru).unwrap();

        store.set("A".to_string(), entry("a", 1));
        store.set("B".to_string(), entry("b", 2));
        store.get("A", 3);
        let evicted = store.set("C".to_string(), entry("c", 4));

        assert_eq!(evicted.as_deref(), Some("B"));
        assert!(store.contains("A"));
        assert!(store.contains("C"));
        assert!(!store.contains("B"));
    }

    #[test]
    fn test_store_mru_evicts_just_used() {
        let mut store = BoundedStore::new(3, EvictionPolicy::Mru).unwrap();

        store.set("a".to_string(), entry("1", 1));
        store.set("b".to_string(), entry("2", 2));
        store.set("c".to_string(), entry("3", 3));
        store.get("a", 10);

        assert_eq!(store.set("d".to_string(), entry("4", 11)).as_deref(), Some("a"));
    }

    #[test]
    fn test_store_lfu_evicts_least_used() {
        let mut store = BoundedStore::new(3, EvictionPolicy::Lfu).unwrap();

        store.set("a".to_string(), entry("1", 1));
        store.set("b".to_string(), entry("2", 2));
        store.set("c".to_string(), entry("3", 3));
        store.get("a", 4);
        store.get("c", 5);

        assert_eq!(store.set("d".to_string(), entry("4", 6)).as_deref(), Some("b"));
    }

    #[test]
    fn test_store_mfu_evicts_most_used() {
        let mut store = BoundedStore::new(3, EvictionPolicy::Mfu).unwrap();

        store.set("a".to_string(), entry("1", 1));
        store.set("b".to_string(), entry("2", 2));
        store.set("c".to_string(), entry("3", 3));
        store.get("b", 4);
        store.get("b", 5);
        store.get("c", 6);

        assert_eq!(store.set("d".to_string(), entry("4", 7)).as_deref(), Some("b"));
        assert!(store.contains("a"));
        assert!(store.contains("c"));
    }

    #[test]
    fn test_store_tie_break_is_lexicographic() {
        let mut store = BoundedStore::new(2, EvictionPolicy::Lru).unwrap();

        store.set("k2".to_string(), entry("2", 7));
        store.set("k1".to_string(), entry("1", 7));

        assert_eq!(store.set("k3".to_string(), entry("3", 8)).as_deref(), Some("k1"));
    }

    #[test]
    fn test_store_stats() {
        let mut store = BoundedStore::new(2, EvictionPolicy::Lru).unwrap();

        store.set("a".to_string(), entry("1", 1));
        store.set("b".to_string(), entry("2", 2));
        store.get("a", 3);
        store.get("missing", 3);
        store.set("c".to_string(), entry("3", 4));
        store.release("c");

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.evictions, 1);
        assert_eq!(stats.releases, 1);
        assert_eq!(stats.total_entries, 1);
    }

    #[test]
    fn test_store_expired_lookup_counts_as_miss() {
        let mut store = BoundedStore::new(2, EvictionPolicy::Lru).unwrap();
        store.set("a".to_string(), entry("1", 1_000));

        let found = store.get("a", 1_000 + TTL.as_millis() as u64);

        assert!(found.is_some(), "Expired record is still handed back");
        let stats = store.stats();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hit_rate(), 0.0);
    }
}
