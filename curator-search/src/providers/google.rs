//! Google Custom Search JSON API.
//!
//! Needs both an API key and a Programmable Search Engine id (`cx`). The
//! API returns at most 10 items per request.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use crate::config::{present, PipelineConfig};
use crate::error::SearchError;
use crate::http;
use crate::orchestrator::scoring::base_score;
use crate::provider::ContentProvider;
use crate::types::{ContentType, ProviderKind, RawContent, SearchOptions};

/// Hard ceiling on `num` imposed by the API.
const MAX_PER_REQUEST: usize = 10;
const WEIGHT: f64 = 0.5;

/// Google Custom Search adapter.
///
/// Priority 1 provider when both credentials are configured.
pub struct GoogleProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    cse_id: Option<String>,
}

impl GoogleProvider {
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &PipelineConfig) -> Result<Self, SearchError> {
        Ok(Self {
            client: http::build_client(
                Duration::from_secs(config.timeout_seconds),
                http::CLIENT_USER_AGENT,
            )?,
            base_url: config.endpoints.google.clone(),
            api_key: config.credentials.google_api_key.clone(),
            cse_id: config.credentials.google_cse_id.clone(),
        })
    }

    /// Point the adapter at a different server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Debug, Deserialize)]
struct GoogleResponse {
    #[serde(default)]
    items: Vec<GoogleItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
    display_link: Option<String>,
}

#[async_trait]
impl ContentProvider for GoogleProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Google
    }

    fn is_available(&self) -> bool {
        present(&self.api_key).is_some() && present(&self.cse_id).is_some()
    }

    async fn collect(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Vec<RawContent>, SearchError> {
        let (Some(key), Some(cx)) = (present(&self.api_key), present(&self.cse_id)) else {
            return Err(SearchError::Unavailable("Google needs an API key and cx".into()));
        };
        let num = options.max_results.clamp(1, MAX_PER_REQUEST);

        let mut params: Vec<(&str, String)> = vec![
            ("key", key.to_string()),
            ("cx", cx.to_string()),
            ("q", query.to_string()),
            ("num", num.to_string()),
        ];
        if let Some(language) = &options.language {
            params.push(("lr", format!("lang_{language}")));
        }
        if let Some(region) = &options.region {
            params.push(("gl", region.clone()));
        }
        if let Some(recency) = options.recency {
            params.push(("dateRestrict", format!("{}1", recency.unit())));
        }

        let request = self
            .client
            .get(format!("{}/customsearch/v1", self.base_url.trim_end_matches('/')))
            .query(&params);
        let response: GoogleResponse = http::send_json(ProviderKind::Google, request).await?;

        Ok(map_items(response.items, num))
    }
}

fn map_items(items: Vec<GoogleItem>, max_results: usize) -> Vec<RawContent> {
    items
        .into_iter()
        .filter(|item| !item.link.trim().is_empty())
        .take(max_results)
        .enumerate()
        .map(|(position, item)| {
            RawContent::new(
                item.title.trim(),
                item.link.trim(),
                item.snippet.trim(),
                ProviderKind::Google.name(),
                ContentType::Web,
            )
            .with_base_score(base_score(WEIGHT, position))
            .with_extra("display_link", item.display_link)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderCredentials;
    use crate::types::Recency;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(key: Option<&str>, cx: Option<&str>) -> PipelineConfig {
        PipelineConfig {
            credentials: ProviderCredentials {
                google_api_key: key.map(str::to_string),
                google_cse_id: cx.map(str::to_string),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn needs_both_credentials() {
        let both = GoogleProvider::new(&config(Some("k"), Some("cx"))).expect("provider");
        let key_only = GoogleProvider::new(&config(Some("k"), None)).expect("provider");
        let cx_only = GoogleProvider::new(&config(None, Some("cx"))).expect("provider");
        assert!(both.is_available());
        assert!(!key_only.is_available());
        assert!(!cx_only.is_available());
    }

    #[tokio::test]
    async fn maps_items_and_sends_parameters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/customsearch/v1"))
            .and(query_param("key", "k"))
            .and(query_param("cx", "cx"))
            .and(query_param("q", "rust async"))
            .and(query_param("num", "10"))
            .and(query_param("lr", "lang_en"))
            .and(query_param("dateRestrict", "w1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "searchInformation": {"totalResults": "2"},
                "items": [
                    {"title": "Async Rust", "link": "https://rust-lang.github.io/async-book/",
                     "snippet": "The async book", "displayLink": "rust-lang.github.io"},
                    {"title": "No link"},
                    {"title": "Tokio", "link": "https://tokio.rs", "snippet": "Runtime"}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = GoogleProvider::new(&config(Some("k"), Some("cx")))
            .expect("provider")
            .with_base_url(server.uri());
        let options = SearchOptions {
            max_results: 25,
            language: Some("en".into()),
            recency: Some(Recency::Week),
            ..Default::default()
        };
        let items = provider.collect("rust async", &options).await.expect("results");

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "Async Rust");
        assert_eq!(items[0].metadata.domain, "rust-lang.github.io");
        assert_eq!(items[0].content_type, ContentType::Web);
        assert_eq!(items[0].metadata.extra["display_link"], "rust-lang.github.io");
        assert!(items[0].relevance_score() > items[1].relevance_score());
    }

    #[tokio::test]
    async fn missing_items_means_no_results() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/customsearch/v1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "searchInformation": {"totalResults": "0"}
            })))
            .mount(&server)
            .await;

        let provider = GoogleProvider::new(&config(Some("k"), Some("cx")))
            .expect("provider")
            .with_base_url(server.uri());
        let items = provider
            .collect("nothing", &SearchOptions::default())
            .await
            .expect("results");
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn forbidden_is_auth_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "error": {"code": 403, "message": "API key not valid"}
            })))
            .mount(&server)
            .await;

        let provider = GoogleProvider::new(&config(Some("bad"), Some("cx")))
            .expect("provider")
            .with_base_url(server.uri());
        let err = provider
            .collect("rust", &SearchOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "auth");
    }

    #[tokio::test]
    async fn rate_limited_is_quota_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let provider = GoogleProvider::new(&config(Some("k"), Some("cx")))
            .expect("provider")
            .with_base_url(server.uri());
        let err = provider
            .collect("rust", &SearchOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "quota");
    }

    #[tokio::test]
    async fn malformed_payload_is_parse_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let provider = GoogleProvider::new(&config(Some("k"), Some("cx")))
            .expect("provider")
            .with_base_url(server.uri());
        let err = provider
            .collect("rust", &SearchOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "parse");
    }
}
