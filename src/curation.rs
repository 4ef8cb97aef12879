//! Hand-off from collected sources to article generation.
//!
//! [`Curator`] runs a query batch, merges the successful results of every
//! query into one ranked source list, and passes it to an
//! [`ArticleGenerator`]. The generator is the seam where a language model (or
//! any other writer) plugs in; storing the article is the caller's business.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use curator_search::{
    BatchOptions, BatchScheduler, Deduplicator, FallbackSearchEngine, RateLimiter, RawContent,
    SearchQuery,
};
use serde::{Deserialize, Serialize};

use crate::config::CuratorConfig;
use crate::error::{CuratorError, Result};

/// One collected source, in the shape a generator consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDigest {
    pub title: String,
    pub url: String,
    pub summary: String,
    pub source_name: String,
    /// Relevance score in `[0, 1]`.
    pub score: f64,
    pub published_at: Option<DateTime<Utc>>,
}

impl From<&RawContent> for SourceDigest {
    fn from(item: &RawContent) -> Self {
        Self {
            title: item.title.clone(),
            url: item.url.clone(),
            summary: item.summary.clone(),
            source_name: item.source_name.clone(),
            score: item.relevance_score(),
            published_at: item.published_at,
        }
    }
}

/// A generated article draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedArticle {
    pub title: String,
    /// Markdown body.
    pub body: String,
    /// URLs of the sources the article draws on.
    pub sources: Vec<String>,
}

/// Writes an article about `topic` from ranked sources.
#[async_trait]
pub trait ArticleGenerator: Send + Sync {
    /// # Errors
    ///
    /// Implementations report any failure; the curator wraps it in
    /// [`CuratorError::Generation`].
    async fn generate(&self, topic: &str, sources: &[SourceDigest])
    -> anyhow::Result<GeneratedArticle>;
}

/// Collects sources for a batch of queries and hands them to a generator.
pub struct Curator<G> {
    scheduler: BatchScheduler,
    batch: BatchOptions,
    max_sources: usize,
    generator: G,
}

impl<G: ArticleGenerator> Curator<G> {
    /// Build a curator over the default providers.
    ///
    /// # Errors
    ///
    /// Returns [`CuratorError::Config`] or [`CuratorError::Search`] if the
    /// configuration is invalid.
    pub fn new(config: &CuratorConfig, generator: G) -> Result<Self> {
        config.validate()?;
        let engine = FallbackSearchEngine::new(&config.search, Arc::new(RateLimiter::new()))?;
        Ok(Self::with_scheduler(
            BatchScheduler::new(Arc::new(engine)),
            config.batch_options(),
            config.max_sources,
            generator,
        ))
    }

    /// Build a curator around an existing scheduler.
    pub fn with_scheduler(
        scheduler: BatchScheduler,
        batch: BatchOptions,
        max_sources: usize,
        generator: G,
    ) -> Self {
        Self {
            scheduler,
            batch,
            max_sources: max_sources.max(1),
            generator,
        }
    }

    pub fn scheduler(&self) -> &BatchScheduler {
        &self.scheduler
    }

    /// Run the batch and merge every successful result into one list.
    ///
    /// Results are deduplicated across queries by normalised URL (the
    /// earliest dispatched query keeps the item), sorted by score descending,
    /// and capped at `max_sources`.
    pub async fn collect(&self, queries: Vec<SearchQuery>) -> Vec<SourceDigest> {
        self.collect_with_topic(queries).await.1
    }

    /// Collect sources and generate an article about the highest-priority
    /// query.
    ///
    /// # Errors
    ///
    /// Returns [`CuratorError::NoSources`] without calling the generator when
    /// nothing was collected, or [`CuratorError::Generation`] if the
    /// generator fails.
    pub async fn collect_and_generate(&self, queries: Vec<SearchQuery>) -> Result<GeneratedArticle> {
        let (topic, sources) = self.collect_with_topic(queries).await;
        let Some(topic) = topic.filter(|_| !sources.is_empty()) else {
            tracing::warn!("no sources collected, skipping generation");
            return Err(CuratorError::NoSources);
        };

        tracing::info!(sources = sources.len(), "generating article");
        self.generator
            .generate(&topic, &sources)
            .await
            .map_err(|e| CuratorError::Generation(format!("{e:#}")))
    }

    async fn collect_with_topic(
        &self,
        queries: Vec<SearchQuery>,
    ) -> (Option<String>, Vec<SourceDigest>) {
        let responses = self.scheduler.run(queries, &self.batch).await;
        let topic = responses.first().map(|(query, _)| query.query.clone());

        let mut seen = Deduplicator::new();
        let mut merged: Vec<RawContent> = Vec::new();
        for (_, response) in responses.into_iter().filter(|(_, r)| r.success) {
            merged.extend(seen.retain_new(response.results));
        }
        merged.sort_by(|a, b| {
            b.relevance_score()
                .partial_cmp(&a.relevance_score())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        merged.truncate(self.max_sources);

        tracing::debug!(sources = merged.len(), "merged batch results");
        (topic, merged.iter().map(SourceDigest::from).collect())
    }
}
