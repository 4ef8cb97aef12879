//! # curator-search
//!
//! Multi-provider content collection for article curation.
//!
//! Turns a batch of prioritised search queries into ranked, deduplicated
//! lists of source material. Four providers are supported: Google Custom
//! Search, SerpApi, the DuckDuckGo Instant Answer API and NewsAPI.
//!
//! ## Design
//!
//! - One provider per query: the first in preference order that has
//!   credentials and spare rate-limit budget. A failed call is reported, not
//!   retried elsewhere.
//! - Sliding-window rate limiting per provider, counted before each call
//! - Results deduplicated by normalised URL and ranked by keyword overlap,
//!   trusted-domain bonus and provider position
//! - Batches run in concurrent groups with a pause between groups
//! - Optional in-memory response cache with TTL
//!
//! ## Security
//!
//! - Credentials come from config or environment and are redacted from
//!   `Debug` output
//! - Query text is logged only at trace level

pub mod cache;
pub mod config;
pub mod error;
pub mod http;
pub mod orchestrator;
pub mod provider;
pub mod providers;
pub mod rate_limit;
pub mod types;

use std::collections::HashMap;
use std::sync::Arc;

pub use config::{PipelineConfig, ProviderCredentials, RateLimits};
pub use error::{Result, SearchError};
pub use orchestrator::batch::{BatchOptions, BatchScheduler};
pub use orchestrator::dedup::Deduplicator;
pub use orchestrator::fallback::FallbackSearchEngine;
pub use orchestrator::scoring::RelevanceScorer;
pub use provider::ContentProvider;
pub use rate_limit::{RateLimitConfig, RateLimiter};
pub use types::{
    ContentMetadata, ContentType, ProviderKind, RawContent, Recency, SearchApiResponse,
    SearchOptions, SearchQuery,
};

/// Run a batch of queries against the default providers.
///
/// Builds a fresh engine and rate limiter from `config`. Long-lived callers
/// should keep a [`BatchScheduler`] instead so rate-limit state and the
/// cache survive between batches.
///
/// # Errors
///
/// Returns [`SearchError::Config`] if `config` is invalid. Provider failures
/// never surface here; they appear as `success = false` responses.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> curator_search::Result<()> {
/// use curator_search::{PipelineConfig, SearchQuery};
///
/// let config = PipelineConfig::default().with_env_credentials();
/// let queries = vec![SearchQuery::new("rust async runtimes").with_priority(5)];
/// let responses = curator_search::search_multiple_queries(queries, &config).await?;
/// for (query, response) in &responses {
///     println!("{query}: {} results", response.total_results);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn search_multiple_queries(
    queries: Vec<SearchQuery>,
    config: &PipelineConfig,
) -> Result<HashMap<String, SearchApiResponse>> {
    let engine = FallbackSearchEngine::new(config, Arc::new(RateLimiter::new()))?;
    let scheduler = BatchScheduler::new(Arc::new(engine));
    Ok(scheduler
        .search_multiple_queries(queries, &BatchOptions::from_config(config))
        .await)
}
