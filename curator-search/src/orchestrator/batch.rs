//! Batch execution of prioritised queries in paced concurrent groups.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use crate::config::PipelineConfig;
use crate::types::{Recency, SearchApiResponse, SearchOptions, SearchQuery};

use super::fallback::FallbackSearchEngine;

/// How a batch is dispatched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOptions {
    pub max_results_per_query: usize,
    /// Queries per group. Zero is treated as one.
    pub concurrency: usize,
    /// Delay between groups. Not applied after the last group.
    pub pause: Duration,
    pub language: Option<String>,
    pub region: Option<String>,
    pub recency: Option<Recency>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            max_results_per_query: 10,
            concurrency: 3,
            pause: Duration::from_millis(1000),
            language: None,
            region: None,
            recency: None,
        }
    }
}

impl BatchOptions {
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            max_results_per_query: config.max_results,
            concurrency: config.concurrency,
            pause: Duration::from_millis(config.batch_pause_ms),
            ..Default::default()
        }
    }

    fn search_options(&self, query: &SearchQuery) -> SearchOptions {
        SearchOptions {
            max_results: self.max_results_per_query,
            language: self.language.clone(),
            region: self.region.clone(),
            recency: self.recency,
            preferred: query.sources.clone(),
        }
    }
}

/// Runs many queries through one [`FallbackSearchEngine`].
#[derive(Debug, Clone)]
pub struct BatchScheduler {
    engine: Arc<FallbackSearchEngine>,
}

impl BatchScheduler {
    pub fn new(engine: Arc<FallbackSearchEngine>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &Arc<FallbackSearchEngine> {
        &self.engine
    }

    /// Run every query and key each response by its query text.
    ///
    /// Queries with the same trimmed text are collapsed; the one with the
    /// highest priority is dispatched and the rest are dropped with a warning.
    pub async fn search_multiple_queries(
        &self,
        queries: Vec<SearchQuery>,
        options: &BatchOptions,
    ) -> HashMap<String, SearchApiResponse> {
        self.run(queries, options)
            .await
            .into_iter()
            .map(|(query, response)| (query.query, response))
            .collect()
    }

    /// Run every query and return `(query, response)` pairs in dispatch order.
    ///
    /// Dispatch order is priority descending, ties keeping input order.
    /// Queries run in groups of `options.concurrency`; each group completes
    /// before the next starts, with `options.pause` between groups. Individual
    /// failures surface as `success = false` responses.
    pub async fn run(
        &self,
        queries: Vec<SearchQuery>,
        options: &BatchOptions,
    ) -> Vec<(SearchQuery, SearchApiResponse)> {
        let queries = prioritise(queries);
        let group_size = options.concurrency.max(1);
        let group_count = queries.len().div_ceil(group_size);
        tracing::info!(
            queries = queries.len(),
            groups = group_count,
            concurrency = group_size,
            "starting query batch"
        );

        let mut responses = Vec::with_capacity(queries.len());
        for (index, group) in queries.chunks(group_size).enumerate() {
            if index > 0 && !options.pause.is_zero() {
                tokio::time::sleep(options.pause).await;
            }
            let calls = group.iter().map(|query| {
                let search = options.search_options(query);
                async move { self.engine.search_with_query(&query.query, &search).await }
            });
            let outcomes = futures::future::join_all(calls).await;
            tracing::debug!(
                group = index + 1,
                succeeded = outcomes.iter().filter(|r| r.success).count(),
                size = group.len(),
                "query group finished"
            );
            responses.extend(group.iter().cloned().zip(outcomes));
        }

        let failed = responses.iter().filter(|(_, r)| !r.success).count();
        tracing::info!(total = responses.len(), failed, "query batch finished");
        responses
    }
}

/// Trim query text, sort by priority descending (stable), and drop later
/// duplicates of the same text.
fn prioritise(queries: Vec<SearchQuery>) -> Vec<SearchQuery> {
    let mut queries: Vec<SearchQuery> = queries
        .into_iter()
        .map(|mut q| {
            q.query = q.query.trim().to_string();
            q
        })
        .collect();
    queries.sort_by(|a, b| b.priority.cmp(&a.priority));

    let mut seen = HashSet::new();
    queries.retain(|q| {
        let fresh = seen.insert(q.query.clone());
        if !fresh {
            tracing::warn!(priority = q.priority, "dropping duplicate query text");
        }
        fresh
    });
    queries
}
