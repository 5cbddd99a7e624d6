//! API Module
//!
//! Demo HTTP surface: origin handlers behind the response cache.
//!
//! # Endpoints
//! - `GET /time` - Origin response with an invocation counter
//! - `POST /echo` - Origin echo of the request body
//! - `GET /status/:code` - Origin response with the given status
//! - `GET /stats` - Cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
