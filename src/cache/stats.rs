//! Cache Statistics Module
//!
//! Tracks store activity: hits, misses, evictions and releases.

use serde::Serialize;

// == Cache Stats ==
/// Tracks bounded store metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Number of lookups that found an unexpired record
    pub hits: u64,
    /// Number of lookups that found nothing or an expired record
    pub misses: u64,
    /// Number of records removed by the eviction policy
    pub evictions: u64,
    /// Number of records removed by explicit release
    pub releases: u64,
    /// Current number of records in the store
    pub total_entries: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the store hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn record_release(&mut self) {
        self.releases += 1;
    }

    // == Update Entry Count ==
    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}
