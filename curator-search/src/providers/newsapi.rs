//! NewsAPI `everything` endpoint.
//!
//! Needs one API key. Removed articles (NewsAPI's `[Removed]` placeholders)
//! are dropped, and descriptions are cleaned: markup stripped, the
//! `[+N chars]` suffix removed, and the text truncated to
//! [`MAX_DESCRIPTION_CHARS`] characters.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use scraper::Html;
use serde::Deserialize;
use std::time::Duration;

use crate::config::{present, PipelineConfig};
use crate::error::SearchError;
use crate::http;
use crate::orchestrator::scoring::base_score;
use crate::provider::ContentProvider;
use crate::types::{ContentType, ProviderKind, RawContent, SearchOptions};

/// Descriptions longer than this are cut and suffixed with `...`.
pub const MAX_DESCRIPTION_CHARS: usize = 300;

const MAX_PAGE_SIZE: usize = 100;
const WEIGHT: f64 = 0.5;
const REMOVED_TITLE: &str = "[Removed]";
const REMOVED_URL_MARKER: &str = "removed.com";

/// NewsAPI adapter.
pub struct NewsApiProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl NewsApiProvider {
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &PipelineConfig) -> Result<Self, SearchError> {
        Ok(Self {
            client: http::build_client(
                Duration::from_secs(config.timeout_seconds),
                http::CLIENT_USER_AGENT,
            )?,
            base_url: config.endpoints.news.clone(),
            api_key: config.credentials.news_api_key.clone(),
        })
    }

    /// Point the adapter at a different server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewsResponse {
    #[serde(default)]
    status: String,
    code: Option<String>,
    message: Option<String>,
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Article {
    #[serde(default)]
    source: ArticleSource,
    author: Option<String>,
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    url_to_image: Option<String>,
    published_at: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ArticleSource {
    name: Option<String>,
}

#[async_trait]
impl ContentProvider for NewsApiProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::NewsApi
    }

    fn is_available(&self) -> bool {
        present(&self.api_key).is_some()
    }

    async fn collect(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Vec<RawContent>, SearchError> {
        let Some(key) = present(&self.api_key) else {
            return Err(SearchError::Unavailable("NewsAPI needs an API key".into()));
        };
        let page_size = options.max_results.clamp(1, MAX_PAGE_SIZE);

        let mut params: Vec<(&str, String)> = vec![
            ("q", query.to_string()),
            ("pageSize", page_size.to_string()),
            ("sortBy", "publishedAt".to_string()),
        ];
        if let Some(language) = &options.language {
            params.push(("language", language.clone()));
        }
        if let Some(recency) = options.recency {
            let from = Utc::now() - recency.duration();
            params.push(("from", from.format("%Y-%m-%dT%H:%M:%SZ").to_string()));
        }

        let request = self
            .client
            .get(format!("{}/v2/everything", self.base_url.trim_end_matches('/')))
            .header("X-Api-Key", key)
            .query(&params);
        let response: NewsResponse = http::send_json(ProviderKind::NewsApi, request).await?;

        if response.status == "error" {
            return Err(classify_api_error(
                response.code.as_deref().unwrap_or_default(),
                response.message.as_deref().unwrap_or_default(),
            ));
        }
        Ok(map_articles(response.articles, page_size))
    }
}

/// Map NewsAPI's error codes onto the failure taxonomy.
fn classify_api_error(code: &str, message: &str) -> SearchError {
    let detail = format!("NewsAPI {code}: {message}");
    match code {
        "apiKeyInvalid" | "apiKeyMissing" | "apiKeyDisabled" => SearchError::Auth(detail),
        "apiKeyExhausted" | "rateLimited" => SearchError::QuotaExceeded(detail),
        _ => SearchError::Http(detail),
    }
}

fn map_articles(articles: Vec<Article>, max_results: usize) -> Vec<RawContent> {
    articles
        .into_iter()
        .filter_map(|article| {
            let title = article.title.as_deref().unwrap_or_default().trim().to_string();
            let url = article.url.as_deref().unwrap_or_default().trim().to_string();
            if is_removed(&title, &url) {
                return None;
            }
            Some((title, url, article))
        })
        .take(max_results)
        .enumerate()
        .map(|(position, (title, url, article))| {
            let source_name = article
                .source
                .name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| ProviderKind::NewsApi.name().to_string());
            let summary = clean_description(article.description.as_deref().unwrap_or_default());
            let published_at = article.published_at.as_deref().and_then(parse_published_at);
            RawContent::new(title, url, summary, source_name, ContentType::News)
                .with_base_score(base_score(WEIGHT, position))
                .with_published_at(published_at)
                .with_extra("image_url", article.url_to_image)
                .with_extra("author", article.author)
        })
        .collect()
}

/// Whether an article is one of NewsAPI's removed-content placeholders.
fn is_removed(title: &str, url: &str) -> bool {
    title.is_empty() || url.is_empty() || title == REMOVED_TITLE || url.contains(REMOVED_URL_MARKER)
}

fn parse_published_at(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Strip markup and the `[+N chars]` suffix, collapse whitespace, and
/// truncate to [`MAX_DESCRIPTION_CHARS`] characters.
pub fn clean_description(raw: &str) -> String {
    let text: String = Html::parse_fragment(raw).root_element().text().collect();
    let text = strip_char_count_suffix(&text);
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() <= MAX_DESCRIPTION_CHARS {
        return collapsed;
    }
    let truncated: String = collapsed.chars().take(MAX_DESCRIPTION_CHARS).collect();
    format!("{}...", truncated.trim_end())
}

/// Remove a trailing `[+1234 chars]` marker.
fn strip_char_count_suffix(text: &str) -> &str {
    let trimmed = text.trim_end();
    let Some(body) = trimmed.strip_suffix(" chars]") else {
        return trimmed;
    };
    match body.rfind("[+") {
        Some(start) if body[start + 2..].chars().all(|c| c.is_ascii_digit()) => {
            trimmed[..start].trim_end()
        }
        _ => trimmed,
    }
}
