//! End-to-end curation tests: TOML config, real provider adapters against a
//! mock server, cross-query merge, and generator hand-off.

use async_trait::async_trait;
use curator::curator_search::{ProviderCredentials, SearchQuery};
use curator::{ArticleGenerator, Curator, CuratorConfig, CuratorError, GeneratedArticle, SourceDigest};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Renders a bullet list of sources.
struct ListGenerator;

#[async_trait]
impl ArticleGenerator for ListGenerator {
    async fn generate(
        &self,
        topic: &str,
        sources: &[SourceDigest],
    ) -> anyhow::Result<GeneratedArticle> {
        let body = sources
            .iter()
            .map(|s| format!("- [{}]({}) ({:.2})", s.title, s.url, s.score))
            .collect::<Vec<_>>()
            .join("\n");
        Ok(GeneratedArticle {
            title: format!("Roundup: {topic}"),
            body,
            sources: sources.iter().map(|s| s.url.clone()).collect(),
        })
    }
}

fn config_for(server: &MockServer, max_sources: usize) -> CuratorConfig {
    let toml_src = format!(
        r#"
max_sources = {max_sources}

[search]
batch_pause_ms = 0
cache_ttl_seconds = 0

[search.endpoints]
google = "{uri}"
serpapi = "{uri}"
duckduckgo = "{uri}"
news = "{uri}"
"#,
        uri = server.uri()
    );
    let mut config: CuratorConfig = toml::from_str(&toml_src).expect("config parses");
    config.search.credentials = ProviderCredentials {
        serpapi_api_key: Some("serp-key".into()),
        ..Default::default()
    };
    config
}

async fn mount_serpapi(server: &MockServer, query: &str, links: &[(&str, &str)]) {
    let organic: Vec<_> = links
        .iter()
        .enumerate()
        .map(|(i, (title, link))| {
            json!({"position": i + 1, "title": title, "link": link, "snippet": title})
        })
        .collect();
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .and(query_param("q", query))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "organic_results": organic
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn collects_merges_and_generates() {
    let server = MockServer::start().await;
    mount_serpapi(
        &server,
        "rust async",
        &[
            ("Rust async book", "https://rust-lang.org/async"),
            ("Shared overview", "https://blog.example.com/overview"),
        ],
    )
    .await;
    mount_serpapi(
        &server,
        "tokio runtime",
        &[
            ("Tokio runtime internals", "https://github.com/tokio-rs/tokio"),
            ("Shared overview", "https://blog.example.com/overview/#top"),
        ],
    )
    .await;

    let config = config_for(&server, 10);
    let curator = Curator::new(&config, ListGenerator).expect("curator");
    let article = curator
        .collect_and_generate(vec![
            SearchQuery::new("tokio runtime").with_priority(2),
            SearchQuery::new("rust async").with_priority(5),
        ])
        .await
        .expect("article");

    assert_eq!(article.title, "Roundup: rust async");
    assert_eq!(article.sources.len(), 3);
    assert_eq!(
        article
            .sources
            .iter()
            .filter(|u| u.contains("blog.example.com"))
            .count(),
        1
    );
}

#[tokio::test]
async fn all_queries_failing_reports_no_sources() {
    let server = MockServer::start().await;
    Mock::given(path("/search.json"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "Invalid API key."})))
        .mount(&server)
        .await;

    let config = config_for(&server, 10);
    let curator = Curator::new(&config, ListGenerator).expect("curator");
    let err = curator
        .collect_and_generate(vec![SearchQuery::new("anything")])
        .await
        .unwrap_err();

    assert!(matches!(err, CuratorError::NoSources));
}

#[test]
fn invalid_config_is_rejected_before_any_call() {
    let config = CuratorConfig {
        max_sources: 0,
        ..Default::default()
    };
    let err = Curator::new(&config, ListGenerator).err().expect("invalid");
    assert!(matches!(err, CuratorError::Config(_)));
}
