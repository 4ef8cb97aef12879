//! Pipeline configuration with sensible defaults.
//!
//! [`PipelineConfig`] holds provider credentials, base URLs, per-provider rate
//! limits, and the batching constants. Every field has a default so a partial
//! TOML file deserialises cleanly.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::SearchError;
use crate::rate_limit::RateLimitConfig;
use crate::types::ProviderKind;

/// Developer-community domains that earn the trusted-domain bonus.
pub const DEFAULT_TRUSTED_DOMAINS: &[&str] = &[
    "dev.to",
    "github.com",
    "stackoverflow.com",
    "medium.com",
    "hashnode.com",
    "developer.mozilla.org",
    "docs.rs",
    "rust-lang.org",
    "news.ycombinator.com",
    "reddit.com",
];

/// Optional API keys per provider. A missing key makes the provider
/// unavailable; it is never an error.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderCredentials {
    pub google_api_key: Option<String>,
    /// Programmable Search Engine id (`cx`).
    pub google_cse_id: Option<String>,
    pub serpapi_api_key: Option<String>,
    pub news_api_key: Option<String>,
}

impl ProviderCredentials {
    /// Read credentials from `GOOGLE_API_KEY`, `GOOGLE_CSE_ID`,
    /// `SERPAPI_API_KEY`, and `NEWS_API_KEY`. Blank values count as absent.
    pub fn from_env() -> Self {
        Self {
            google_api_key: env_key("GOOGLE_API_KEY"),
            google_cse_id: env_key("GOOGLE_CSE_ID"),
            serpapi_api_key: env_key("SERPAPI_API_KEY"),
            news_api_key: env_key("NEWS_API_KEY"),
        }
    }

    /// Fill every absent key from `other`.
    pub fn or(self, other: Self) -> Self {
        Self {
            google_api_key: self.google_api_key.or(other.google_api_key),
            google_cse_id: self.google_cse_id.or(other.google_cse_id),
            serpapi_api_key: self.serpapi_api_key.or(other.serpapi_api_key),
            news_api_key: self.news_api_key.or(other.news_api_key),
        }
    }
}

fn env_key(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Returns the key when it is present and not blank.
pub(crate) fn present(key: &Option<String>) -> Option<&str> {
    key.as_deref().map(str::trim).filter(|k| !k.is_empty())
}

impl fmt::Debug for ProviderCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn redact(key: &Option<String>) -> &'static str {
            if present(key).is_some() {
                "<redacted>"
            } else {
                "<unset>"
            }
        }
        f.debug_struct("ProviderCredentials")
            .field("google_api_key", &redact(&self.google_api_key))
            .field("google_cse_id", &redact(&self.google_cse_id))
            .field("serpapi_api_key", &redact(&self.serpapi_api_key))
            .field("news_api_key", &redact(&self.news_api_key))
            .finish()
    }
}

/// Base URLs for each provider. Overridable for proxies and test servers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderEndpoints {
    pub google: String,
    pub serpapi: String,
    pub duckduckgo: String,
    pub news: String,
}

impl Default for ProviderEndpoints {
    fn default() -> Self {
        Self {
            google: "https://www.googleapis.com".into(),
            serpapi: "https://serpapi.com".into(),
            duckduckgo: "https://api.duckduckgo.com".into(),
            news: "https://newsapi.org".into(),
        }
    }
}

/// Rate-limit ceilings per provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimits {
    pub google: RateLimitConfig,
    pub serpapi: RateLimitConfig,
    pub duckduckgo: RateLimitConfig,
    pub news: RateLimitConfig,
}

impl Default for RateLimits {
    fn default() -> Self {
        Self {
            google: RateLimitConfig::new(100, 3_600_000),
            serpapi: RateLimitConfig::new(100, 3_600_000),
            duckduckgo: RateLimitConfig::new(60, 60_000),
            news: RateLimitConfig::new(100, 3_600_000),
        }
    }
}

impl RateLimits {
    /// The ceiling for one provider.
    pub fn for_provider(&self, kind: ProviderKind) -> RateLimitConfig {
        match kind {
            ProviderKind::Google => self.google,
            ProviderKind::SerpApi => self.serpapi,
            ProviderKind::DuckDuckGo => self.duckduckgo,
            ProviderKind::NewsApi => self.news,
        }
    }
}

/// Configuration for the collection pipeline.
///
/// Use [`Default::default()`] for sensible defaults, or construct with
/// field overrides for custom behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Per-provider call timeout in seconds.
    pub timeout_seconds: u64,
    /// Maximum results per query after deduplication and ranking.
    pub max_results: usize,
    /// Queries dispatched concurrently per batch group.
    pub concurrency: usize,
    /// Pause between batch groups in milliseconds.
    pub batch_pause_ms: u64,
    /// How long to cache successful responses in seconds. 0 disables caching.
    pub cache_ttl_seconds: u64,
    /// Domains that earn the trusted-domain relevance bonus.
    pub trusted_domains: Vec<String>,
    /// Custom User-Agent for unauthenticated providers. If `None`, rotates
    /// through a built-in list of browser User-Agents.
    pub user_agent: Option<String>,
    pub credentials: ProviderCredentials,
    pub endpoints: ProviderEndpoints,
    pub rate_limits: RateLimits,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            credentials: ProviderCredentials::default(),
            endpoints: ProviderEndpoints::default(),
            rate_limits: RateLimits::default(),
            timeout_seconds: 10,
            max_results: 10,
            concurrency: 3,
            batch_pause_ms: 1000,
            cache_ttl_seconds: 600,
            trusted_domains: DEFAULT_TRUSTED_DOMAINS
                .iter()
                .map(|d| (*d).to_string())
                .collect(),
            user_agent: None,
        }
    }
}

impl PipelineConfig {
    /// Overlay credentials from the environment. Environment values win;
    /// keys absent from the environment keep their configured value.
    pub fn with_env_credentials(mut self) -> Self {
        self.credentials = ProviderCredentials::from_env().or(self.credentials);
        self
    }

    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `max_results`, `timeout_seconds` and `concurrency` must be greater than 0
    /// - every rate limit needs a non-zero ceiling and window
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.max_results == 0 {
            return Err(SearchError::Config(
                "max_results must be greater than 0".into(),
            ));
        }
        if self.timeout_seconds == 0 {
            return Err(SearchError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.concurrency == 0 {
            return Err(SearchError::Config(
                "concurrency must be greater than 0".into(),
            ));
        }
        for kind in ProviderKind::all() {
            let limit = self.rate_limits.for_provider(*kind);
            if limit.max_requests == 0 || limit.window_ms == 0 {
                return Err(SearchError::Config(format!(
                    "rate limit for {} needs non-zero max_requests and window_ms",
                    kind.id()
                )));
            }
        }
        Ok(())
    }
}
