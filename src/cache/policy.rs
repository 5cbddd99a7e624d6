//! Eviction Policy Module
//!
//! Selects which record a full store gives up to make room for a new key.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cache::CacheEntry;
use crate::error::CacheError;

// == Eviction Policy ==
/// Victim selection rule, fixed for the lifetime of a store.
///
/// Ranks come from the entry's own `last_access` / `access_count` fields.
/// Ties on the ranking value go to the lexicographically smallest key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvictionPolicy {
    /// Least recently used: oldest `last_access`
    #[default]
    Lru,
    /// Most recently used: newest `last_access`
    Mru,
    /// Least frequently used: smallest `access_count`
    Lfu,
    /// Most frequently used: largest `access_count`
    Mfu,
}

impl EvictionPolicy {
    // == Compare ==
    /// Orders two entries so that `Less` means `a` is the better victim.
    fn compare(self, a: &CacheEntry, b: &CacheEntry) -> Ordering {
        match self {
            EvictionPolicy::Lru => a.last_access.cmp(&b.last_access),
            EvictionPolicy::Mru => b.last_access.cmp(&a.last_access),
            EvictionPolicy::Lfu => a.access_count.cmp(&b.access_count),
            EvictionPolicy::Mfu => b.access_count.cmp(&a.access_count),
        }
    }

    // == Select Victim ==
    /// Returns the key this policy would evict, or None for an empty set.
    ///
    /// Linear in the number of records.
    pub fn select_victim<'a, I>(self, records: I) -> Option<&'a str>
    where
        I: IntoIterator<Item = (&'a String, &'a CacheEntry)>,
    {
        records
            .into_iter()
            .fold(None, |best: Option<(&'a String, &'a CacheEntry)>, (key, entry)| {
                let Some((best_key, best_entry)) = best else {
                    return Some((key, entry));
                };
                match self.compare(entry, best_entry).then_with(|| key.cmp(best_key)) {
                    Ordering::Less => Some((key, entry)),
                    _ => Some((best_key, best_entry)),
                }
            })
            .map(|(key, _)| key.as_str())
    }

    /// Lowercase policy name.
    pub fn as_str(self) -> &'static str {
        match self {
            EvictionPolicy::Lru => "lru",
            EvictionPolicy::Mru => "mru",
            EvictionPolicy::Lfu => "lfu",
            EvictionPolicy::Mfu => "mfu",
        }
    }
}

impl fmt::Display for EvictionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EvictionPolicy {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lru" => Ok(EvictionPolicy::Lru),
            "mru" => Ok(EvictionPolicy::Mru),
            "lfu" => Ok(EvictionPolicy::Lfu),
            "mfu" => Ok(EvictionPolicy::Mfu),
            _ => Err(CacheError::UnknownPolicy(s.to_string())),
        }
    }
}
