//! Cache Client
//!
//! Coordinates the request/response protocol around an origin handler:
//! cacheability, key derivation, refresh, freshness checks and write-back.
//!
//! # Protocol
//! 1. Requests rejected by the cacheability predicate go straight to the origin.
//! 2. A request carrying the refresh parameter releases its key and is treated
//!    as a miss.
//! 3. A fresh hit is served from the adapter; a stale hit is released.
//! 4. On a miss the origin response is fully buffered. Status codes below 400
//!    are written back with the configured TTL. The response is always
//!    forwarded to the caller.

pub mod key;

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    extract::{Request, State},
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

use crate::adapter::Adapter;
use crate::cache::{current_timestamp_ms, CacheEntry, MAX_PAYLOAD_SIZE};
use crate::config::Config;
use crate::error::{CacheError, Result};

/// Decides whether a request takes part in caching.
pub type CacheablePredicate = Arc<dyn Fn(&Request) -> bool + Send + Sync>;

/// Derives the cache key from a request with its body buffered.
pub type KeyFn = Arc<dyn Fn(&axum::http::Request<Bytes>) -> Result<String> + Send + Sync>;

// == Cache Client ==
/// HTTP response cache in front of an origin handler.
///
/// Cheap to clone; clones share the same adapter.
#[derive(Clone)]
pub struct CacheClient {
    adapter: Arc<dyn Adapter>,
    cacheable: CacheablePredicate,
    key_fn: KeyFn,
    ttl: Duration,
    refresh_key: Option<String>,
    max_payload_size: usize,
}

impl fmt::Debug for CacheClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheClient")
            .field("ttl", &self.ttl)
            .field("refresh_key", &self.refresh_key)
            .field("max_payload_size", &self.max_payload_size)
            .finish_non_exhaustive()
    }
}

impl CacheClient {
    pub fn builder() -> CacheClientBuilder {
        CacheClientBuilder::default()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn refresh_key(&self) -> Option<&str> {
        self.refresh_key.as_deref()
    }

    // == Serve ==
    /// Answers `request` from the cache or from `origin`.
    ///
    /// Failures inside the cache layer degrade to calling the origin directly;
    /// they are never reported to the caller.
    pub async fn serve<F, Fut>(&self, request: Request, origin: F) -> Response
    where
        F: FnOnce(Request) -> Fut,
        Fut: Future<Output = Response>,
    {
        if !(self.cacheable)(&request) {
            return origin(request).await;
        }

        let (mut parts, body) = request.into_parts();
        let (uri, is_refresh) = key::normalize_uri(&parts.uri, self.refresh_key());
        parts.uri = uri;

        let body = match axum::body::to_bytes(body, usize::MAX).await {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(error = %err, uri = %parts.uri, "request body unreadable, bypassing cache");
                return origin(Request::from_parts(parts, Body::empty())).await;
            }
        };
        let buffered = axum::http::Request::from_parts(parts, body);

        let key = match (self.key_fn)(&buffered) {
            Ok(key) => key,
            Err(err) => {
                warn!(error = %err, "cache key generation failed, bypassing cache");
                return origin(buffered.map(Body::from)).await;
            }
        };

        if is_refresh {
            debug!(key = %key, "refresh requested, releasing cached response");
            self.adapter.release(&key).await;
        } else if let Some(entry) = self.adapter.get(&key).await {
            if entry.is_usable() && !entry.is_expired() {
                debug!(
                    key = %key,
                    hits = entry.access_count,
                    ttl_remaining_ms = entry.ttl_remaining_ms(current_timestamp_ms()),
                    "serving cached response"
                );
                return cached_response(entry);
            }

            debug!(key = %key, "cached response is stale, releasing");
            self.adapter.release(&key).await;
        } else {
            debug!(key = %key, "cache miss");
        }

        let response = origin(buffered.map(Body::from)).await;
        self.write_back(key, response).await
    }

    // == Write Back ==
    /// Buffers the origin response, caches it when successful and forwards it.
    async fn write_back(&self, key: String, response: Response) -> Response {
        let (parts, body) = response.into_parts();
        let payload = match axum::body::to_bytes(body, usize::MAX).await {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(error = %err, key = %key, "origin body failed, response not cached");
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        };

        if parts.status.as_u16() >= 400 {
            debug!(key = %key, status = %parts.status, "origin error, response not cached");
        } else if payload.len() > self.max_payload_size {
            debug!(key = %key, size = payload.len(), "payload too large, response not cached");
        } else {
            let entry = CacheEntry::new(
                payload.to_vec(),
                capture_headers(&parts.headers),
                self.ttl,
                current_timestamp_ms(),
            );
            self.adapter.set(&key, entry).await;
            debug!(key = %key, status = %parts.status, "cached origin response");
        }

        Response::from_parts(parts, Body::from(payload))
    }
}

// == Middleware ==
/// Axum middleware running every request through a [`CacheClient`].
///
/// ```ignore
/// let app = Router::new()
///     .route("/", get(handler))
///     .layer(axum::middleware::from_fn_with_state(client, cache_layer));
/// ```
pub async fn cache_layer(
    State(client): State<CacheClient>,
    request: Request,
    next: Next,
) -> Response {
    client.serve(request, |request| next.run(request)).await
}

/// Converts response headers into entry metadata, skipping non-UTF-8 values.
fn capture_headers(headers: &HeaderMap) -> BTreeMap<String, Vec<String>> {
    let mut metadata: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, value) in headers {
        if let Ok(value) = value.to_str() {
            metadata
                .entry(name.as_str().to_string())
                .or_default()
                .push(value.to_string());
        }
    }
    metadata
}

/// Builds a response from a cached entry.
fn cached_response(entry: CacheEntry) -> Response {
    let mut response = Response::new(Body::from(entry.payload));
    let headers = response.headers_mut();

    for (name, values) in &entry.metadata {
        let Ok(name) = HeaderName::try_from(name.as_str()) else {
            continue;
        };
        for value in values {
            if let Ok(value) = HeaderValue::from_str(value) {
                headers.append(name.clone(), value);
            }
        }
    }

    response
}

// == Builder ==
/// Validating builder for [`CacheClient`].
///
/// The adapter and a positive TTL are required. Cacheability defaults to
/// `GET`-only and keys default to [`key::generate_key`]. Refresh is disabled
/// unless a refresh key is set.
#[derive(Default)]
pub struct CacheClientBuilder {
    adapter: Option<Arc<dyn Adapter>>,
    cacheable: Option<CacheablePredicate>,
    key_fn: Option<KeyFn>,
    ttl: Option<Duration>,
    refresh_key: Option<String>,
    max_payload_size: Option<usize>,
}

impl CacheClientBuilder {
    /// Applies the TTL, refresh key and payload limit from configuration.
    pub fn config(self, config: &Config) -> Self {
        let builder = self
            .ttl(Duration::from_secs(config.ttl_secs))
            .max_payload_size(config.max_payload_size);
        match &config.refresh_key {
            Some(refresh_key) => builder.refresh_key(refresh_key.clone()),
            None => builder,
        }
    }

    pub fn adapter<A: Adapter + 'static>(mut self, adapter: A) -> Self {
        self.adapter = Some(Arc::new(adapter));
        self
    }

    pub fn shared_adapter(mut self, adapter: Arc<dyn Adapter>) -> Self {
        self.adapter = Some(adapter);
        self
    }

    pub fn cacheable<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Request) -> bool + Send + Sync + 'static,
    {
        self.cacheable = Some(Arc::new(predicate));
        self
    }

    pub fn key_fn<F>(mut self, key_fn: F) -> Self
    where
        F: Fn(&axum::http::Request<Bytes>) -> Result<String> + Send + Sync + 'static,
    {
        self.key_fn = Some(Arc::new(key_fn));
        self
    }

    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Sets the query parameter that forces a refresh. Empty disables it.
    pub fn refresh_key(mut self, refresh_key: impl Into<String>) -> Self {
        let refresh_key = refresh_key.into();
        self.refresh_key = (!refresh_key.is_empty()).then_some(refresh_key);
        self
    }

    pub fn max_payload_size(mut self, max_payload_size: usize) -> Self {
        self.max_payload_size = Some(max_payload_size);
        self
    }

    /// Validates the settings and builds the client.
    ///
    /// # Errors
    /// - `CacheError::MissingAdapter` when no adapter was set
    /// - `CacheError::InvalidTtl` when the TTL is missing or zero
    pub fn build(self) -> Result<CacheClient> {
        let adapter = self.adapter.ok_or(CacheError::MissingAdapter)?;

        let ttl = self.ttl.unwrap_or_default();
        if ttl.is_zero() {
            return Err(CacheError::InvalidTtl(ttl));
        }

        let cacheable: CacheablePredicate = match self.cacheable {
            Some(cacheable) => cacheable,
            None => Arc::new(key::is_cacheable::<Body>),
        };
        let key_fn: KeyFn = match self.key_fn {
            Some(key_fn) => key_fn,
            None => Arc::new(key::generate_key),
        };

        Ok(CacheClient {
            adapter,
            cacheable,
            key_fn,
            ttl,
            refresh_key: self.refresh_key,
            max_payload_size: self.max_payload_size.unwrap_or(MAX_PAYLOAD_SIZE),
        })
    }
}
