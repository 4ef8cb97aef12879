//! The capability every content provider implements, and the guarded call
//! path that wraps it.
//!
//! Each provider (Google, SerpApi, DuckDuckGo, NewsAPI) implements
//! [`ContentProvider`]. Selection code only ever sees this trait: whether a
//! provider is available and how to collect from it. [`guarded_collect`] adds
//! the pieces every call needs: pessimistic rate-limit accounting, the call
//! timeout, and failure classification for logs.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::SearchError;
use crate::rate_limit::RateLimiter;
use crate::types::{ProviderKind, RawContent, SearchOptions};

/// A pluggable content provider.
///
/// Implementors own their credentials, build their own requests, and map the
/// provider's wire format into [`RawContent`]. All implementations must be
/// `Send + Sync` so one instance can serve concurrent queries.
#[async_trait]
pub trait ContentProvider: Send + Sync {
    /// Which provider this is.
    fn kind(&self) -> ProviderKind;

    /// Whether the credentials this provider needs are present.
    fn is_available(&self) -> bool;

    /// Query the provider and map its response.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] if the request fails, times out, is rejected,
    /// or the response cannot be decoded.
    async fn collect(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Vec<RawContent>, SearchError>;

    /// Key under which this provider's calls are rate-limited.
    fn rate_limit_key(&self) -> &str {
        self.kind().rate_limit_key()
    }
}

/// Call `provider` once with accounting, timeout, and failure logging.
///
/// The call is tracked against the provider's rate-limit key before the
/// request goes out, so a failed call still counts against quota.
///
/// # Errors
///
/// Returns [`SearchError::Unavailable`] without tracking anything if the
/// provider lacks credentials, [`SearchError::Timeout`] if `timeout` elapses,
/// or whatever the provider reported.
pub async fn guarded_collect(
    provider: &dyn ContentProvider,
    limiter: &RateLimiter,
    query: &str,
    options: &SearchOptions,
    timeout: Duration,
) -> Result<Vec<RawContent>, SearchError> {
    let kind = provider.kind();
    if !provider.is_available() {
        return Err(SearchError::Unavailable(format!(
            "{kind} is missing credentials"
        )));
    }

    limiter.track(provider.rate_limit_key());
    tracing::trace!(%kind, query, "provider call");

    let outcome = match tokio::time::timeout(timeout, provider.collect(query, options)).await {
        Ok(outcome) => outcome,
        Err(_) => Err(SearchError::Timeout(format!(
            "{kind} exceeded {}s limit",
            timeout.as_secs_f64()
        ))),
    };

    match &outcome {
        Ok(items) => tracing::debug!(%kind, count = items.len(), "provider returned results"),
        Err(err) => log_failure(kind, err),
    }
    outcome
}

fn log_failure(kind: ProviderKind, err: &SearchError) {
    match err {
        SearchError::Auth(_) => {
            tracing::error!(provider = %kind, kind = err.kind(), error = %err, "provider rejected credentials");
        }
        SearchError::QuotaExceeded(_) => {
            tracing::warn!(provider = %kind, kind = err.kind(), quota_exceeded = true, error = %err, "provider quota exhausted");
        }
        _ => {
            tracing::warn!(provider = %kind, kind = err.kind(), error = %err, "provider call failed");
        }
    }
}
