//! Error types for the response cache
//!
//! Provides unified error handling using thiserror.

use std::time::Duration;

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the response cache.
///
/// Configuration variants are raised at construction time only. Key generation
/// failures are recovered by the coordinator, which bypasses the cache for that
/// request instead of surfacing the error to the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// No backing adapter was supplied to the client builder
    #[error("cache client adapter is not set")]
    MissingAdapter,

    /// TTL must be strictly positive
    #[error("cache client ttl {0:?} is invalid")]
    InvalidTtl(Duration),

    /// Bounded store capacity below the minimum of 2
    #[error("store capacity {0} is invalid, must be at least 2")]
    InvalidCapacity(usize),

    /// Unrecognized eviction policy name
    #[error("unknown eviction policy: {0}")]
    UnknownPolicy(String),

    /// Cache key could not be derived from the request
    #[error("key generation failed: {0}")]
    KeyGeneration(String),
}

// == Result Type Alias ==
/// Convenience Result type for the response cache.
pub type Result<T> = std::result::Result<T, CacheError>;
