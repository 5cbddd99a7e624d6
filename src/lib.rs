//! HTTP Response Cache - caching middleware for axum services
//!
//! Serves repeated requests from a bounded in-memory store (LRU, MRU, LFU or
//! MFU eviction) or any other adapter instead of re-running the handler.

pub mod adapter;
pub mod api;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod models;

pub use adapter::{Adapter, ByteStore, EncodedAdapter, MemoryAdapter};
pub use api::AppState;
pub use cache::{BoundedStore, CacheEntry, EvictionPolicy};
pub use client::{cache_layer, CacheClient, CacheClientBuilder};
pub use config::Config;
pub use error::{CacheError, Result};
