//! SerpApi Google results.
//!
//! Needs one API key. SerpApi sometimes reports problems as a JSON `error`
//! field on an otherwise successful response, so the body is inspected as
//! well as the status.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use crate::config::{present, PipelineConfig};
use crate::error::SearchError;
use crate::http;
use crate::orchestrator::scoring::base_score;
use crate::provider::ContentProvider;
use crate::types::{ContentType, ProviderKind, RawContent, SearchOptions};

const MAX_PER_REQUEST: usize = 100;
const WEIGHT: f64 = 0.5;

/// SerpApi adapter.
///
/// Priority 2 provider: used when Google credentials are absent.
pub struct SerpApiProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl SerpApiProvider {
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &PipelineConfig) -> Result<Self, SearchError> {
        Ok(Self {
            client: http::build_client(
                Duration::from_secs(config.timeout_seconds),
                http::CLIENT_USER_AGENT,
            )?,
            base_url: config.endpoints.serpapi.clone(),
            api_key: config.credentials.serpapi_api_key.clone(),
        })
    }

    /// Point the adapter at a different server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Debug, Deserialize)]
struct SerpApiResponse {
    error: Option<String>,
    #[serde(default)]
    organic_results: Vec<OrganicResult>,
}

#[derive(Debug, Deserialize)]
struct OrganicResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
    date: Option<String>,
    displayed_link: Option<String>,
}

#[async_trait]
impl ContentProvider for SerpApiProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::SerpApi
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
            return Err(SearchError::Unavailable("SerpApi needs an API key".into()));
        };
        let num = options.max_results.clamp(1, MAX_PER_REQUEST);

        let mut params: Vec<(&str, String)> = vec![
            ("engine", "google".to_string()),
            ("q", query.to_string()),
            ("num", num.to_string()),
            ("api_key", key.to_string()),
        ];
        if let Some(language) = &options.language {
            params.push(("hl", language.clone()));
        }
        if let Some(region) = &options.region {
            params.push(("gl", region.clone()));
        }
        if let Some(recency) = options.recency {
            params.push(("tbs", format!("qdr:{}", recency.unit())));
        }

        let request = self
            .client
            .get(format!("{}/search.json", self.base_url.trim_end_matches('/')))
            .query(&params);
        let response: SerpApiResponse = http::send_json(ProviderKind::SerpApi, request).await?;

        if let Some(message) = response.error {
            return classify_body_error(&message);
        }
        Ok(map_results(response.organic_results, num))
    }
}

/// Interpret an `error` field on a 200 response.
fn classify_body_error(message: &str) -> Result<Vec<RawContent>, SearchError> {
    let lower = message.to_lowercase();
    if lower.contains("hasn't returned any results") {
        Ok(Vec::new())
    } else if lower.contains("run out of searches") || lower.contains("limit") {
        Err(SearchError::QuotaExceeded(format!("SerpApi: {message}")))
    } else if lower.contains("api key") {
        Err(SearchError::Auth(format!("SerpApi: {message}")))
    } else {
        Err(SearchError::Http(format!("SerpApi: {message}")))
    }
}

fn map_results(results: Vec<OrganicResult>, max_results: usize) -> Vec<RawContent> {
    results
        .into_iter()
        .filter(|r| !r.link.trim().is_empty())
        .take(max_results)
        .enumerate()
        .map(|(position, r)| {
            RawContent::new(
                r.title.trim(),
                r.link.trim(),
                r.snippet.trim(),
                ProviderKind::SerpApi.name(),
                ContentType::Web,
            )
            .with_base_score(base_score(WEIGHT, position))
            .with_extra("date", r.date)
            .with_extra("displayed_link", r.displayed_link)
        })
        .collect()
}
