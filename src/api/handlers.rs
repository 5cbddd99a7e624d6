//! API Handlers
//!
//! Origin handlers sitting behind the response cache, plus the uncached
//! stats and health endpoints.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::adapter::MemoryAdapter;
use crate::client::CacheClient;
use crate::config::Config;
use crate::error::Result;
use crate::models::{HealthResponse, StatsResponse, TimeResponse};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Response cache wrapping the origin routes
    pub client: CacheClient,
    /// Bounded store behind the client, kept for statistics
    pub store: MemoryAdapter,
    /// Number of origin invocations
    pub origin_calls: Arc<AtomicU64>,
}

impl AppState {
    /// Creates a new AppState around a client and the store it writes to.
    pub fn new(client: CacheClient, store: MemoryAdapter) -> Self {
        Self {
            client,
            store,
            origin_calls: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// # Errors
    /// Fails on invalid capacity or TTL.
    pub fn from_config(config: &Config) -> Result<Self> {
        let store = MemoryAdapter::from_config(config)?;
        let client = CacheClient::builder()
            .config(config)
            .adapter(store.clone())
            .build()?;
        Ok(Self::new(client, store))
    }

    fn record_origin_call(&self) -> u64 {
        self.origin_calls.fetch_add(1, Ordering::SeqCst) + 1
    }
}

/// Handler for GET /time
///
/// Origin handler; the counter shows whether a response came from the cache.
pub async fn time_handler(State(state): State<AppState>) -> Json<TimeResponse> {
    Json(TimeResponse::now(state.record_origin_call()))
}

/// Handler for POST /echo
///
/// Origin handler returning the request body unchanged.
pub async fn echo_handler(State(state): State<AppState>, body: Bytes) -> Bytes {
    state.record_origin_call();
    body
}

/// Handler for GET /status/:code
///
/// Origin handler answering with the requested status code.
pub async fn status_handler(
    State(state): State<AppState>,
    Path(code): Path<u16>,
) -> (StatusCode, String) {
    let served = state.record_origin_call();
    match StatusCode::from_u16(code) {
        Ok(status) => (status, format!("status {} (origin call {})", code, served)),
        Err(_) => (
            StatusCode::BAD_REQUEST,
            format!("invalid status code {}", code),
        ),
    }
}

/// Handler for GET /stats
///
/// Returns current store statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::from(state.store.stats().await))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
