//! Cache Module
//!
//! Entry model, entry codec and the bounded in-memory store with pluggable
//! eviction policies.

pub mod codec;
mod entry;
mod policy;
mod stats;
mod store;


// Re-export public types
pub use entry::{current_timestamp_ms, CacheEntry};
pub use policy::EvictionPolicy;
pub use stats::CacheStats;
pub use store::BoundedStore;

// == Public Constants ==
/// Smallest capacity a bounded store accepts
pub const MIN_CAPACITY: usize = 2;

/// Default maximum cacheable payload size in bytes
pub const MAX_PAYLOAD_SIZE: usize = 1024 * 1024; // 1 MB
