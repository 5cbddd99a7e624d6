//! API Routes
//!
//! Configures the Axum router: origin routes behind the cache middleware,
//! stats and health outside it.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    echo_handler, health_handler, stats_handler, status_handler, time_handler, AppState,
};
use crate::client::cache_layer;

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /time` - Origin, cached
/// - `POST /echo` - Origin, cached only if the client's predicate allows POST
/// - `GET /status/:code` - Origin, cached when `code < 400`
/// - `GET /stats` - Store statistics
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - Cache: wraps the origin routes only
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let origin = Router::new()
        .route("/time", get(time_handler))
        .route("/echo", post(echo_handler))
        .route("/status/:code", get(status_handler))
        .layer(middleware::from_fn_with_state(
            state.client.clone(),
            cache_layer,
        ));

    Router::new()
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .merge(origin)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
