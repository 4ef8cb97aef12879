//! Batch collection CLI.
//!
//! Reads a JSON array of queries, runs them through the provider fallback
//! pipeline, and prints the per-query responses as pretty JSON on stdout.
//! Diagnostics go to stderr.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use curator::CuratorConfig;
use curator_search::{BatchScheduler, FallbackSearchEngine, RateLimiter, SearchQuery};
use tracing_subscriber::EnvFilter;

/// How often expired rate-limit entries are swept.
const SWEEP_INTERVAL: Duration = Duration::from_secs(300);

/// Collect ranked sources for a batch of search queries.
#[derive(Parser)]
#[command(name = "curator-collect", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON file holding an array of queries.
    #[arg(short, long)]
    queries: PathBuf,

    /// Queries dispatched per group.
    #[arg(long)]
    concurrency: Option<usize>,

    /// Maximum results per query.
    #[arg(long)]
    max_results: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("curator=info,curator_search=info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match cli.config {
        Some(ref path) => CuratorConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => CuratorConfig::load_or_default(&CuratorConfig::default_config_path())?,
    };
    if let Some(concurrency) = cli.concurrency {
        config.search.concurrency = concurrency;
    }
    if let Some(max_results) = cli.max_results {
        config.search.max_results = max_results;
    }
    config.validate()?;

    let raw = std::fs::read_to_string(&cli.queries)
        .with_context(|| format!("reading queries from {}", cli.queries.display()))?;
    let queries: Vec<SearchQuery> =
        serde_json::from_str(&raw).context("queries file must be a JSON array of queries")?;

    let limiter = Arc::new(RateLimiter::new());
    let sweeper = limiter.spawn_sweeper(SWEEP_INTERVAL);
    let engine = FallbackSearchEngine::new(&config.search, limiter)?;
    let scheduler = BatchScheduler::new(Arc::new(engine));

    let results = scheduler
        .search_multiple_queries(queries, &config.batch_options())
        .await;
    sweeper.abort();

    let failed = results.values().filter(|r| !r.success).count();
    tracing::info!(queries = results.len(), failed, "collection finished");

    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}
