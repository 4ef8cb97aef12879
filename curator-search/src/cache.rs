//! In-memory cache of successful query responses.
//!
//! Keyed by the (lowercased query, search options) pair. Uses [`moka`] for
//! async-friendly caching with a TTL and automatic eviction. Each
//! [`ResponseCache`] is owned by the engine that created it; a TTL of zero
//! disables caching entirely.

use std::time::Duration;

use moka::future::Cache;

use crate::types::{Recency, SearchApiResponse, SearchOptions};

/// Maximum number of cached responses.
const MAX_CACHE_ENTRIES: u64 = 500;

/// Composite cache key: normalised query plus every option that changes
/// what a provider returns.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Lowercased, trimmed query string.
    query: String,
    max_results: usize,
    language: Option<String>,
    region: Option<String>,
    recency: Option<Recency>,
    /// Lowercased provider hints, in order.
    preferred: Vec<String>,
}

impl CacheKey {
    /// Build a deterministic cache key from a query and its options.
    pub fn new(query: &str, options: &SearchOptions) -> Self {
        Self {
            query: query.trim().to_lowercase(),
            max_results: options.max_results,
            language: options.language.as_deref().map(str::to_lowercase),
            region: options.region.as_deref().map(str::to_lowercase),
            recency: options.recency,
            preferred: options
                .preferred
                .iter()
                .map(|p| p.trim().to_lowercase())
                .collect(),
        }
    }
}

/// TTL cache of successful responses.
#[derive(Clone)]
pub struct ResponseCache {
    inner: Option<Cache<CacheKey, SearchApiResponse>>,
}

impl ResponseCache {
    /// Create a cache whose entries live for `ttl_seconds`. Zero disables it.
    pub fn new(ttl_seconds: u64) -> Self {
        if ttl_seconds == 0 {
            return Self::disabled();
        }
        let cache = Cache::builder()
            .max_capacity(MAX_CACHE_ENTRIES)
            .time_to_live(Duration::from_secs(ttl_seconds))
            .build();
        Self { inner: Some(cache) }
    }

    /// A cache that never stores anything.
    pub fn disabled() -> Self {
        Self { inner: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    /// Look up a cached response. Returns `None` on miss or when disabled.
    pub async fn get(&self, key: &CacheKey) -> Option<SearchApiResponse> {
        match &self.inner {
            Some(cache) => cache.get(key).await,
            None => None,
        }
    }

    /// Store a response. Failed responses are never cached.
    pub async fn insert(&self, key: CacheKey, response: SearchApiResponse) {
        if !response.success {
            return;
        }
        if let Some(cache) = &self.inner {
            cache.insert(key, response).await;
        }
    }
}

impl std::fmt::Debug for ResponseCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseCache")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}
