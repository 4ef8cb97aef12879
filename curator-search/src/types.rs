//! Core types for collected content, queries, and provider identification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::orchestrator::url_normalize::extract_domain;

/// Supported content providers, in their default preference order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderKind {
    /// Google Custom Search JSON API. Needs an API key and a search engine id.
    #[serde(rename = "google")]
    Google,
    /// SerpApi's Google proxy. Needs one API key.
    #[serde(rename = "serpapi")]
    SerpApi,
    /// DuckDuckGo Instant Answer API. Free, always available, few results.
    #[serde(rename = "duckduckgo")]
    DuckDuckGo,
    /// NewsAPI `everything` endpoint. Needs one API key.
    #[serde(rename = "news")]
    NewsApi,
}

impl ProviderKind {
    /// Returns the human-readable name of this provider.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Google => "Google",
            Self::SerpApi => "SerpApi",
            Self::DuckDuckGo => "DuckDuckGo",
            Self::NewsApi => "NewsAPI",
        }
    }

    /// Short identifier used in query source hints and configuration.
    pub fn id(&self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::SerpApi => "serpapi",
            Self::DuckDuckGo => "duckduckgo",
            Self::NewsApi => "news",
        }
    }

    /// Parse a source hint. Case-insensitive; `newsapi` is accepted for news.
    pub fn from_id(id: &str) -> Option<Self> {
        match id.trim().to_ascii_lowercase().as_str() {
            "google" => Some(Self::Google),
            "serpapi" => Some(Self::SerpApi),
            "duckduckgo" | "ddg" => Some(Self::DuckDuckGo),
            "news" | "newsapi" => Some(Self::NewsApi),
            _ => None,
        }
    }

    /// Key under which calls to this provider are tracked by the rate limiter.
    pub fn rate_limit_key(&self) -> &'static str {
        match self {
            Self::Google => "provider:google",
            Self::SerpApi => "provider:serpapi",
            Self::DuckDuckGo => "provider:duckduckgo",
            Self::NewsApi => "provider:news",
        }
    }

    /// Returns all provider variants in default preference order.
    pub fn all() -> &'static [ProviderKind] {
        &[Self::Google, Self::SerpApi, Self::DuckDuckGo, Self::NewsApi]
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What kind of content a [`RawContent`] item is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Web,
    News,
    Rss,
    Github,
    Reddit,
    /// A DuckDuckGo instant-answer abstract.
    Abstract,
    /// A DuckDuckGo related topic.
    Related,
}

/// Per-item metadata attached by the adapter and the relevance scorer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentMetadata {
    /// Host of the item's URL, without a leading `www.`.
    pub domain: String,
    /// Relevance in `[0, 1]`. Set from the adapter's base score and then
    /// rewritten by the scorer.
    pub(crate) relevance_score: f64,
    /// Provider-specific fields (image URL, author, display link, ...).
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ContentMetadata {
    /// The current relevance score.
    pub fn relevance_score(&self) -> f64 {
        self.relevance_score
    }
}

/// One item collected from a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawContent {
    pub title: String,
    /// Natural identity of the item; deduplication keys on its normalised form.
    pub url: String,
    /// Snippet or description text.
    pub summary: String,
    pub published_at: Option<DateTime<Utc>>,
    /// Display name of the source (provider or publication).
    pub source_name: String,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub metadata: ContentMetadata,
}

impl RawContent {
    /// Build an item with its domain derived from `url` and a zero base score.
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        summary: impl Into<String>,
        source_name: impl Into<String>,
        content_type: ContentType,
    ) -> Self {
        let url = url.into();
        let domain = extract_domain(&url);
        Self {
            title: title.into(),
            url,
            summary: summary.into(),
            published_at: None,
            source_name: source_name.into(),
            content_type,
            metadata: ContentMetadata {
                domain,
                relevance_score: 0.0,
                extra: serde_json::Map::new(),
            },
        }
    }

    /// Set the adapter-assigned base score, clamped into `[0, 1]`.
    pub fn with_base_score(mut self, score: f64) -> Self {
        self.metadata.relevance_score = clamp_unit(score);
        self
    }

    pub fn with_published_at(mut self, published_at: Option<DateTime<Utc>>) -> Self {
        self.published_at = published_at;
        self
    }

    /// Attach a provider-specific metadata field. `None` values are skipped.
    pub fn with_extra(mut self, key: &str, value: Option<String>) -> Self {
        if let Some(value) = value {
            self.metadata
                .extra
                .insert(key.to_string(), serde_json::Value::String(value));
        }
        self
    }

    /// The current relevance score.
    pub fn relevance_score(&self) -> f64 {
        self.metadata.relevance_score
    }
}

/// Clamp a score into `[0, 1]`, mapping NaN to zero.
pub(crate) fn clamp_unit(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 1.0)
    }
}

/// A weighted query submitted to a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub query: String,
    #[serde(default)]
    pub category: String,
    /// Higher is more urgent; dispatched first.
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub reasoning: String,
    /// Preferred provider hints, e.g. `["news"]`.
    #[serde(default)]
    pub sources: Vec<String>,
}

impl SearchQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            category: String::new(),
            priority: 0,
            reasoning: String::new(),
            sources: Vec::new(),
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_sources(mut self, sources: &[&str]) -> Self {
        self.sources = sources.iter().map(|s| (*s).to_string()).collect();
        self
    }
}

/// How far back results may reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recency {
    Day,
    Week,
    Month,
    Year,
}

impl Recency {
    /// Single-letter unit used by Google-style date restrictions.
    pub fn unit(&self) -> char {
        match self {
            Self::Day => 'd',
            Self::Week => 'w',
            Self::Month => 'm',
            Self::Year => 'y',
        }
    }

    /// Length of the window.
    pub fn duration(&self) -> chrono::Duration {
        match self {
            Self::Day => chrono::Duration::days(1),
            Self::Week => chrono::Duration::weeks(1),
            Self::Month => chrono::Duration::days(30),
            Self::Year => chrono::Duration::days(365),
        }
    }
}

/// Per-query options for [`crate::FallbackSearchEngine::search_with_query`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchOptions {
    pub max_results: usize,
    /// ISO 639-1 language code, e.g. `en`.
    pub language: Option<String>,
    /// ISO 3166 country code, e.g. `us`.
    pub region: Option<String>,
    pub recency: Option<Recency>,
    /// Provider ids moved to the front of the preference order.
    pub preferred: Vec<String>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_results: 10,
            language: None,
            region: None,
            recency: None,
            preferred: Vec::new(),
        }
    }
}

/// The outcome of one query. Always structurally valid, possibly empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchApiResponse {
    pub success: bool,
    pub results: Vec<RawContent>,
    pub total_results: usize,
    pub query: String,
    pub processing_time: Duration,
    /// The provider that answered, if one was called.
    pub provider: Option<ProviderKind>,
}

impl SearchApiResponse {
    /// A successful response. `total_results` mirrors the result count.
    pub fn succeeded(
        query: &str,
        results: Vec<RawContent>,
        provider: ProviderKind,
        processing_time: Duration,
    ) -> Self {
        Self {
            success: true,
            total_results: results.len(),
            results,
            query: query.to_string(),
            processing_time,
            provider: Some(provider),
        }
    }

    /// A failed, empty response.
    pub fn failed(query: &str, provider: Option<ProviderKind>, processing_time: Duration) -> Self {
        Self {
            success: false,
            results: Vec::new(),
            total_results: 0,
            query: query.to_string(),
            processing_time,
            provider,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_content_derives_domain() {
        let item = RawContent::new(
            "Example",
            "https://www.Example.com/page",
            "An example page",
            "Google",
            ContentType::Web,
        );
        assert_eq!(item.metadata.domain, "example.com");
        assert!((item.relevance_score() - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn base_score_is_clamped() {
        let item = RawContent::new("t", "https://a.com", "", "x", ContentType::Web);
        assert!((item.clone().with_base_score(1.7).relevance_score() - 1.0).abs() < f64::EPSILON);
        assert!((item.clone().with_base_score(-0.3).relevance_score()).abs() < f64::EPSILON);
        assert!((item.with_base_score(f64::NAN).relevance_score()).abs() < f64::EPSILON);
    }

    #[test]
    fn raw_content_serialises_type_and_flattened_extra() {
        let item = RawContent::new("t", "https://a.com", "s", "NewsAPI", ContentType::News)
            .with_extra("image_url", Some("https://a.com/i.png".into()))
            .with_extra("author", None);
        let json = serde_json::to_value(&item).expect("serialize");
        assert_eq!(json["type"], "news");
        assert_eq!(json["metadata"]["image_url"], "https://a.com/i.png");
        assert!(json["metadata"].get("author").is_none());
    }

    #[test]
    fn provider_ids_round_trip() {
        for kind in ProviderKind::all() {
            assert_eq!(ProviderKind::from_id(kind.id()), Some(*kind));
        }
        assert_eq!(ProviderKind::from_id("NewsAPI"), Some(ProviderKind::NewsApi));
        assert_eq!(ProviderKind::from_id("reddit"), None);
    }

    #[test]
    fn provider_serde_uses_ids() {
        let json = serde_json::to_string(&ProviderKind::NewsApi).expect("serialize");
        assert_eq!(json, "\"news\"");
    }

    #[test]
    fn provider_display() {
        assert_eq!(ProviderKind::Google.to_string(), "Google");
        assert_eq!(ProviderKind::SerpApi.to_string(), "SerpApi");
        assert_eq!(ProviderKind::DuckDuckGo.to_string(), "DuckDuckGo");
        assert_eq!(ProviderKind::NewsApi.to_string(), "NewsAPI");
    }

    #[test]
    fn rate_limit_keys_are_distinct() {
        use std::collections::HashSet;
        let keys: HashSet<_> = ProviderKind::all()
            .iter()
            .map(|k| k.rate_limit_key())
            .collect();
        assert_eq!(keys.len(), ProviderKind::all().len());
    }

    #[test]
    fn search_query_deserialises_with_defaults() {
        let query: SearchQuery =
            serde_json::from_str(r#"{"query": "rust async"}"#).expect("deserialize");
        assert_eq!(query.query, "rust async");
        assert_eq!(query.priority, 0);
        assert!(query.sources.is_empty());
    }

    #[test]
    fn recency_units() {
        assert_eq!(Recency::Day.unit(), 'd');
        assert_eq!(Recency::Year.unit(), 'y');
        assert_eq!(Recency::Week.duration(), chrono::Duration::days(7));
    }

    #[test]
    fn failed_response_is_empty() {
        let response = SearchApiResponse::failed("q", None, Duration::from_millis(3));
        assert!(!response.success);
        assert!(response.results.is_empty());
        assert_eq!(response.total_results, 0);
        assert_eq!(response.query, "q");
    }
}
