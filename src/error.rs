//! Error types for the curation host.

use curator_search::SearchError;

/// Errors raised while loading configuration or producing an article.
#[derive(Debug, thiserror::Error)]
pub enum CuratorError {
    /// Configuration file or value error.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Collection pipeline could not be built.
    #[error("search error: {0}")]
    Search(#[from] SearchError),

    /// Every query came back empty, so there is nothing to write about.
    #[error("no sources collected for any query")]
    NoSources,

    /// The article generator failed.
    #[error("generation error: {0}")]
    Generation(String),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, CuratorError>;
