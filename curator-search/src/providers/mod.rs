//! Content provider implementations.
//!
//! Each module provides a struct implementing
//! [`crate::provider::ContentProvider`] for one external API.

pub mod duckduckgo;
pub mod google;
pub mod newsapi;
pub mod serpapi;

pub use duckduckgo::DuckDuckGoProvider;
pub use google::GoogleProvider;
pub use newsapi::NewsApiProvider;
pub use serpapi::SerpApiProvider;

use std::sync::Arc;

use crate::config::PipelineConfig;
use crate::error::SearchError;
use crate::provider::ContentProvider;

/// Build every provider from `config` in default preference order:
/// Google, SerpApi, DuckDuckGo, NewsAPI.
///
/// Providers without credentials are still included; they report themselves
/// unavailable and selection skips them.
///
/// # Errors
///
/// Returns [`SearchError::Http`] if an HTTP client cannot be constructed.
pub fn default_providers(
    config: &PipelineConfig,
) -> Result<Vec<Arc<dyn ContentProvider>>, SearchError> {
    Ok(vec![
        Arc::new(GoogleProvider::new(config)?),
        Arc::new(SerpApiProvider::new(config)?),
        Arc::new(DuckDuckGoProvider::new(config)?),
        Arc::new(NewsApiProvider::new(config)?),
    ])
}
