//! Entry Codec
//!
//! Converts cache entries to and from opaque byte blobs for byte-level
//! backing stores.

use tracing::debug;

use crate::cache::CacheEntry;

/// Encodes an entry into bytes.
///
/// Header names are kept in a sorted map, so equal entries encode to equal bytes.
pub fn encode(entry: &CacheEntry) -> Vec<u8> {
    // Serializing plain data with string keys cannot fail.
    serde_json::to_vec(entry).unwrap_or_default()
}

/// Decodes bytes into an entry.
///
/// Malformed or empty input yields the zero-value entry instead of an error.
/// Callers detect it with [`CacheEntry::is_usable`].
pub fn decode(bytes: &[u8]) -> CacheEntry {
    match serde_json::from_slice(bytes) {
        Ok(entry) => entry,
        Err(err) => {
            debug!(error = %err, len = bytes.len(), "discarding undecodable cache entry");
            CacheEntry::default()
        }
    }
}
