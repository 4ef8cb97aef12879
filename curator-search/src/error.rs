//! Error types for the curator-search crate.
//!
//! Errors never cross the fallback engine or batch scheduler boundary; they
//! exist so adapters can report what went wrong and the guarded call path can
//! log it with a stable classification. No API keys or sensitive data appear
//! in error messages.

/// Errors that can occur while talking to a content provider.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// Transport failure: connection error, non-2xx status, unreadable body.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The provider did not answer within the configured call timeout.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// The provider rejected our credentials.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The provider reported that our quota or rate limit is exhausted.
    #[error("quota exceeded: {0}")]
    QuotaExceeded(String),

    /// The provider answered with a payload we could not decode.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid pipeline configuration.
    #[error("config error: {0}")]
    Config(String),

    /// The provider is missing the credentials it needs.
    #[error("provider unavailable: {0}")]
    Unavailable(String),
}

impl SearchError {
    /// Short classification label, used as a structured logging field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Http(_) => "transport",
            Self::Timeout(_) => "timeout",
            Self::Auth(_) => "auth",
            Self::QuotaExceeded(_) => "quota",
            Self::Parse(_) => "parse",
            Self::Config(_) => "config",
            Self::Unavailable(_) => "unavailable",
        }
    }
}

/// Convenience type alias for curator-search results.
pub type Result<T> = std::result::Result<T, SearchError>;
