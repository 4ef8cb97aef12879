//! DuckDuckGo Instant Answer API: the free, unauthenticated fallback.
//!
//! Always available, but the API only exposes an abstract and a list of
//! related topics rather than full web results, so at most
//! [`MAX_RESULTS`] items are returned regardless of the requested limit.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use crate::config::PipelineConfig;
use crate::error::SearchError;
use crate::http;
use crate::orchestrator::scoring::base_score;
use crate::provider::ContentProvider;
use crate::types::{ContentType, ProviderKind, RawContent, SearchOptions};

/// Result ceiling reflecting what the Instant Answer API can return.
pub const MAX_RESULTS: usize = 5;

const ABSTRACT_WEIGHT: f64 = 0.5;
const RELATED_WEIGHT: f64 = 0.4;

/// DuckDuckGo Instant Answer adapter.
///
/// Priority 3 provider: needs no credentials, so it answers whenever the
/// keyed providers are unconfigured.
pub struct DuckDuckGoProvider {
    client: reqwest::Client,
    base_url: String,
}

impl DuckDuckGoProvider {
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &PipelineConfig) -> Result<Self, SearchError> {
        let user_agent = match config.user_agent {
            Some(ref custom) => custom.as_str(),
            None => http::random_user_agent(),
        };
        Ok(Self {
            client: http::build_client(Duration::from_secs(config.timeout_seconds), user_agent)?,
            base_url: config.endpoints.duckduckgo.clone(),
        })
    }

    /// Point the adapter at a different server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct InstantAnswer {
    #[serde(rename = "Heading")]
    heading: String,
    #[serde(rename = "AbstractText")]
    abstract_text: String,
    #[serde(rename = "AbstractURL")]
    abstract_url: String,
    #[serde(rename = "AbstractSource")]
    abstract_source: String,
    #[serde(rename = "Image")]
    image: String,
    #[serde(rename = "RelatedTopics")]
    related_topics: Vec<RelatedTopic>,
}

/// A related topic is either a single link or a named group of links.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RelatedTopic {
    Group {
        #[serde(rename = "Topics")]
        topics: Vec<RelatedTopic>,
    },
    Link {
        #[serde(rename = "Text", default)]
        text: String,
        #[serde(rename = "FirstURL", default)]
        first_url: String,
    },
}

#[async_trait]
impl ContentProvider for DuckDuckGoProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::DuckDuckGo
    }

    fn is_available(&self) -> bool {
        true
    }

    async fn collect(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Vec<RawContent>, SearchError> {
        let mut params: Vec<(&str, String)> = vec![
            ("q", query.to_string()),
            ("format", "json".to_string()),
            ("no_html", "1".to_string()),
            ("skip_disambig", "1".to_string()),
        ];
        if let Some(region) = &options.region {
            let language = options.language.as_deref().unwrap_or("en");
            params.push(("kl", format!("{}-{}", region.to_lowercase(), language.to_lowercase())));
        }

        let request = self
            .client
            .get(format!("{}/", self.base_url.trim_end_matches('/')))
            .query(&params);
        let answer: InstantAnswer = http::send_json(ProviderKind::DuckDuckGo, request).await?;

        Ok(map_answer(answer, options.max_results.min(MAX_RESULTS)))
    }
}

/// Map an instant answer into at most `limit` items: the abstract first,
/// then related topics with nested groups flattened.
fn map_answer(answer: InstantAnswer, limit: usize) -> Vec<RawContent> {
    let source = ProviderKind::DuckDuckGo.name();
    let mut items = Vec::new();

    if !answer.abstract_url.trim().is_empty() && !answer.abstract_text.trim().is_empty() {
        let title = if answer.heading.trim().is_empty() {
            answer.abstract_source.trim()
        } else {
            answer.heading.trim()
        };
        let image = Some(answer.image.trim().to_string()).filter(|i| !i.is_empty());
        let abstract_source = Some(answer.abstract_source.trim().to_string()).filter(|s| !s.is_empty());
        items.push(
            RawContent::new(
                title,
                answer.abstract_url.trim(),
                answer.abstract_text.trim(),
                source,
                ContentType::Abstract,
            )
            .with_base_score(base_score(ABSTRACT_WEIGHT, 0))
            .with_extra("abstract_source", abstract_source)
            .with_extra("image_url", image),
        );
    }

    let mut links = Vec::new();
    flatten_topics(answer.related_topics, &mut links);
    for (position, (text, url)) in links.into_iter().enumerate() {
        let title = text.split(" - ").next().unwrap_or(&text).trim().to_string();
        items.push(
            RawContent::new(title, url, text.trim(), source, ContentType::Related)
                .with_base_score(base_score(RELATED_WEIGHT, position)),
        );
    }

    items.truncate(limit);
    items
}

fn flatten_topics(topics: Vec<RelatedTopic>, out: &mut Vec<(String, String)>) {
    for topic in topics {
        match topic {
            RelatedTopic::Group { topics } => flatten_topics(topics, out),
            RelatedTopic::Link { text, first_url } => {
                if !first_url.trim().is_empty() && !text.trim().is_empty() {
                    out.push((text, first_url.trim().to_string()));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_answer() -> serde_json::Value {
        json!({
            "Heading": "Rust (programming language)",
            "AbstractText": "Rust is a general-purpose programming language.",
            "AbstractURL": "https://en.wikipedia.org/wiki/Rust_(programming_language)",
            "AbstractSource": "Wikipedia",
            "Image": "",
            "RelatedTopics": [
                {"Text": "Cargo - The Rust package manager", "FirstURL": "https://duckduckgo.com/Cargo"},
                {"Name": "Tools", "Topics": [
                    {"Text": "Clippy - A collection of lints", "FirstURL": "https://duckduckgo.com/Clippy"},
                    {"Text": "Rustfmt", "FirstURL": "https://duckduckgo.com/Rustfmt"}
                ]},
                {"Text": "", "FirstURL": ""},
                {"Text": "Crates.io - Registry", "FirstURL": "https://duckduckgo.com/Crates"},
                {"Text": "Miri - Interpreter", "FirstURL": "https://duckduckgo.com/Miri"},
                {"Text": "Rustup - Installer", "FirstURL": "https://duckduckgo.com/Rustup"}
            ]
        })
    }

    fn provider(server: &MockServer) -> DuckDuckGoProvider {
        DuckDuckGoProvider::new(&PipelineConfig::default())
            .expect("provider")
            .with_base_url(server.uri())
    }

    #[test]
    fn always_available() {
        let provider = DuckDuckGoProvider::new(&PipelineConfig::default()).expect("provider");
        assert!(provider.is_available());
    }

    #[tokio::test]
    async fn caps_results_at_five() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .and(query_param("q", "rust"))
            .and(query_param("format", "json"))
            .and(query_param("no_html", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_answer()))
            .expect(1)
            .mount(&server)
            .await;

        let options = SearchOptions {
            max_results: 50,
            ..Default::default()
        };
        let items = provider(&server).collect("rust", &options).await.expect("results");
        assert_eq!(items.len(), MAX_RESULTS);
    }

    #[tokio::test]
    async fn abstract_first_then_flattened_related() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_answer()))
            .mount(&server)
            .await;

        let items = provider(&server)
            .collect("rust", &SearchOptions::default())
            .await
            .expect("results");

        assert_eq!(items[0].content_type, ContentType::Abstract);
        assert_eq!(items[0].title, "Rust (programming language)");
        assert_eq!(items[0].metadata.domain, "en.wikipedia.org");
        assert_eq!(items[0].metadata.extra["abstract_source"], "Wikipedia");
        assert!(items[0].metadata.extra.get("image_url").is_none());

        let related: Vec<_> = items[1..].iter().map(|i| i.title.as_str()).collect();
        assert_eq!(related, ["Cargo", "Clippy", "Rustfmt", "Crates.io"]);
        assert!(items[1..].iter().all(|i| i.content_type == ContentType::Related));
    }

    #[tokio::test]
    async fn respects_smaller_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_answer()))
            .mount(&server)
            .await;

        let options = SearchOptions {
            max_results: 2,
            ..Default::default()
        };
        let items = provider(&server).collect("rust", &options).await.expect("results");
        assert_eq!(items.len(), 2);
    }

    #[tokio::test]
    async fn empty_answer_yields_no_results() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Heading": "", "AbstractText": "", "AbstractURL": "", "RelatedTopics": []
            })))
            .mount(&server)
            .await;

        let items = provider(&server)
            .collect("qqq", &SearchOptions::default())
            .await
            .expect("results");
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn server_error_is_transport_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = provider(&server)
            .collect("rust", &SearchOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "transport");
    }
}
