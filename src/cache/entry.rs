//! Cache Entry Module
//!
//! Defines the cached representation of one HTTP response.

use std::collections::BTreeMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

// == Cache Entry ==
/// A cached response with expiration and access bookkeeping.
///
/// All timestamps are Unix milliseconds. The zero value (`Default`) is what the
/// codec yields for malformed input; check [`CacheEntry::is_usable`] before
/// serving it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Cached response body
    pub payload: Vec<u8>,
    /// Cached response headers, values kept in their original order
    pub metadata: BTreeMap<String, Vec<String>>,
    /// Absolute expiry, the entry is stale once `now >= expires_at`
    pub expires_at: u64,
    /// Last time the entry was created or served (recency policies)
    pub last_access: u64,
    /// Number of uses, starting at 1 on creation (frequency policies)
    pub access_count: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a fresh entry at `now` that expires after `ttl`.
    ///
    /// The write that populates the entry counts as its first use.
    pub fn new(
        payload: Vec<u8>,
        metadata: BTreeMap<String, Vec<String>>,
        ttl: Duration,
        now: u64,
    ) -> Self {
        let ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);

        Self {
            payload,
            metadata,
            expires_at: now.saturating_add(ttl_ms),
            last_access: now,
            access_count: 1,
        }
    }

    // == Is Expired ==
    /// Checks if the entry is stale at `now`.
    ///
    /// Boundary condition: an entry is expired when `now >= expires_at`.
    pub fn is_expired_at(&self, now: u64) -> bool {
        now >= self.expires_at
    }

    /// Checks if the entry is stale against the wall clock.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(current_timestamp_ms())
    }

    // == Is Usable ==
    /// Returns false for the zero-value entry produced by a failed decode.
    pub fn is_usable(&self) -> bool {
        self.expires_at != 0
    }

    // == Touch ==
    /// Records a read hit at `now`.
    pub fn touch(&mut self, now: u64) {
        self.last_access = now;
        self.access_count = self.access_count.saturating_add(1);
    }

    /// Returns remaining TTL in milliseconds at `now`, 0 once expired.
    pub fn ttl_remaining_ms(&self, now: u64) -> u64 {
        self.expires_at.saturating_sub(now)
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
///
/// A clock set before the epoch reads as 0.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or_default()
}
