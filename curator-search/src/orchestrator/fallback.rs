//! Single-provider fallback search: pick, call once, dedup, score, rank.
//!
//! Providers are kept in preference order. For each query the engine picks
//! the first provider that has credentials and spare rate-limit budget, calls
//! it exactly once, and never cascades to another provider when that call
//! fails. A failed call yields an empty `success = false` response.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::cache::{CacheKey, ResponseCache};
use crate::config::{PipelineConfig, RateLimits};
use crate::error::SearchError;
use crate::provider::{guarded_collect, ContentProvider};
use crate::providers::default_providers;
use crate::rate_limit::RateLimiter;
use crate::types::{ProviderKind, SearchApiResponse, SearchOptions};

use super::dedup::deduplicate;
use super::scoring::RelevanceScorer;

/// Picks one provider per query and turns its results into a ranked response.
pub struct FallbackSearchEngine {
    providers: Vec<Arc<dyn ContentProvider>>,
    limiter: Arc<RateLimiter>,
    rate_limits: RateLimits,
    scorer: RelevanceScorer,
    cache: ResponseCache,
    timeout: Duration,
}

impl FallbackSearchEngine {
    /// Build an engine over the default providers (Google, SerpApi,
    /// DuckDuckGo, NewsAPI) configured from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if `config` is invalid, or
    /// [`SearchError::Http`] if an HTTP client cannot be built.
    pub fn new(config: &PipelineConfig, limiter: Arc<RateLimiter>) -> Result<Self, SearchError> {
        config.validate()?;
        let providers = default_providers(config)?;
        Ok(Self::with_providers(providers, limiter, config))
    }

    /// Build an engine over an explicit preference-ordered provider list.
    pub fn with_providers(
        providers: Vec<Arc<dyn ContentProvider>>,
        limiter: Arc<RateLimiter>,
        config: &PipelineConfig,
    ) -> Self {
        Self {
            providers,
            limiter,
            rate_limits: config.rate_limits.clone(),
            scorer: RelevanceScorer::new(config.trusted_domains.iter().cloned()),
            cache: ResponseCache::new(config.cache_ttl_seconds),
            timeout: Duration::from_secs(config.timeout_seconds),
        }
    }

    /// The shared rate limiter.
    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    /// Providers in the order they are considered for `preferred` hints.
    ///
    /// Providers named by a hint come first, in hint order; the rest keep
    /// their configured order. Unknown hints are ignored.
    pub fn preference_order(&self, preferred: &[String]) -> Vec<Arc<dyn ContentProvider>> {
        let mut ordered: Vec<Arc<dyn ContentProvider>> = Vec::with_capacity(self.providers.len());
        for kind in preferred.iter().filter_map(|hint| ProviderKind::from_id(hint)) {
            for provider in self.providers.iter().filter(|p| p.kind() == kind) {
                if !ordered.iter().any(|o| Arc::ptr_eq(o, provider)) {
                    ordered.push(Arc::clone(provider));
                }
            }
        }
        for provider in &self.providers {
            if !ordered.iter().any(|o| Arc::ptr_eq(o, provider)) {
                ordered.push(Arc::clone(provider));
            }
        }
        ordered
    }

    /// The provider that would answer a query with these hints right now.
    ///
    /// Skips providers without credentials and providers whose rate-limit
    /// window is full.
    pub fn select_provider(&self, preferred: &[String]) -> Option<Arc<dyn ContentProvider>> {
        self.preference_order(preferred).into_iter().find(|provider| {
            let kind = provider.kind();
            if !provider.is_available() {
                tracing::debug!(provider = %kind, "skipping provider without credentials");
                return false;
            }
            let limit = self.rate_limits.for_provider(kind);
            if let Some(next) = self.limiter.next_available_at(provider.rate_limit_key(), limit) {
                let wait_ms = next.saturating_duration_since(Instant::now()).as_millis() as u64;
                tracing::debug!(provider = %kind, wait_ms, "skipping rate-limited provider");
                return false;
            }
            true
        })
    }

    /// Run one query through one provider and return a ranked response.
    ///
    /// Never fails: every problem is logged and reported as an empty
    /// `success = false` response. Processing time is always measured.
    pub async fn search_with_query(&self, query: &str, options: &SearchOptions) -> SearchApiResponse {
        let started = Instant::now();
        let query = query.trim();
        if query.is_empty() {
            tracing::debug!("ignoring empty query");
            return SearchApiResponse::failed(query, None, started.elapsed());
        }

        let key = CacheKey::new(query, options);
        if let Some(mut cached) = self.cache.get(&key).await {
            tracing::trace!(query, "cache hit");
            cached.query = query.to_string();
            cached.processing_time = started.elapsed();
            return cached;
        }

        let Some(provider) = self.select_provider(&options.preferred) else {
            tracing::warn!("no provider available for query");
            return SearchApiResponse::failed(query, None, started.elapsed());
        };
        let kind = provider.kind();
        tracing::debug!(provider = %kind, "provider selected");

        let items = match guarded_collect(
            provider.as_ref(),
            &self.limiter,
            query,
            options,
            self.timeout,
        )
        .await
        {
            Ok(items) => items,
            Err(_) => return SearchApiResponse::failed(query, Some(kind), started.elapsed()),
        };

        let mut ranked = self.scorer.score(deduplicate(items), query);
        ranked.truncate(options.max_results);

        let response = SearchApiResponse::succeeded(query, ranked, kind, started.elapsed());
        self.cache.insert(key, response.clone()).await;
        response
    }
}

impl std::fmt::Debug for FallbackSearchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kinds: Vec<ProviderKind> = self.providers.iter().map(|p| p.kind()).collect();
        f.debug_struct("FallbackSearchEngine")
            .field("providers", &kinds)
            .field("timeout", &self.timeout)
            .field("cache", &self.cache)
            .finish()
    }
}
