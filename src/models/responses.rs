//! Response DTOs for the demo server
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::CacheStats;

/// Response body for the origin time endpoint (GET /time)
#[derive(Debug, Clone, Serialize)]
pub struct TimeResponse {
    /// How many times the origin handler has run
    pub served: u64,
    /// Time the origin produced the response, RFC 3339
    pub timestamp: String,
}

impl TimeResponse {
    pub fn now(served: u64) -> Self {
        Self {
            served,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Number of store hits
    pub hits: u64,
    /// Number of store misses
    pub misses: u64,
    /// Number of policy evictions
    pub evictions: u64,
    /// Number of explicit releases (refresh, staleness)
    pub releases: u64,
    /// Current number of cached responses
    pub total_entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            releases: stats.releases,
            total_entries: stats.total_entries,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
