//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment variables.

use std::env;

use crate::cache::{EvictionPolicy, MAX_PAYLOAD_SIZE};

/// Cache and server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
/// Range checks (capacity, TTL) happen in the constructors that consume the config.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of cached responses held in memory
    pub capacity: usize,
    /// Time-to-live in seconds for cached responses
    pub ttl_secs: u64,
    /// Eviction policy of the bounded store
    pub policy: EvictionPolicy,
    /// Query parameter that forces a refresh, None disables it
    pub refresh_key: Option<String>,
    /// Largest response body that will be cached, in bytes
    pub max_payload_size: usize,
    /// HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_CAPACITY` - Maximum cached responses (default: 1000)
    /// - `CACHE_TTL` - TTL in seconds (default: 300)
    /// - `EVICTION_POLICY` - One of lru, mru, lfu, mfu (default: lru)
    /// - `REFRESH_KEY` - Refresh query parameter (default: unset)
    /// - `MAX_PAYLOAD_SIZE` - Largest cacheable body in bytes (default: 1 MB)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            capacity: parse_var("CACHE_CAPACITY").unwrap_or(defaults.capacity),
            ttl_secs: parse_var("CACHE_TTL").unwrap_or(defaults.ttl_secs),
            policy: parse_var("EVICTION_POLICY").unwrap_or(defaults.policy),
            refresh_key: env::var("REFRESH_KEY").ok().filter(|key| !key.is_empty()),
            max_payload_size: parse_var("MAX_PAYLOAD_SIZE").unwrap_or(defaults.max_payload_size),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: 1000,
            ttl_secs: 300,
            policy: EvictionPolicy::Lru,
            refresh_key: None,
            max_payload_size: MAX_PAYLOAD_SIZE,
            server_port: 3000,
        }
    }
}
