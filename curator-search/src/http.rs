//! Shared HTTP plumbing for provider requests.
//!
//! Builds [`reqwest::Client`]s with the configured timeout and User-Agent,
//! and turns provider responses into decoded JSON or a classified
//! [`SearchError`].

use rand::seq::SliceRandom;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::error::SearchError;
use crate::types::ProviderKind;

/// User-Agent sent to keyed APIs.
pub const CLIENT_USER_AGENT: &str = concat!("curator-search/", env!("CARGO_PKG_VERSION"));

/// Realistic browser User-Agent strings, rotated for unauthenticated providers.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0",
];

/// Longest slice of an error body carried into an error message.
const MAX_ERROR_BODY: usize = 200;

/// Build a [`reqwest::Client`] with the given timeout and User-Agent.
///
/// # Errors
///
/// Returns [`SearchError::Http`] if the client cannot be constructed.
pub fn build_client(timeout: Duration, user_agent: &str) -> Result<reqwest::Client, SearchError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(user_agent)
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()
        .map_err(|e| SearchError::Http(format!("failed to build HTTP client: {e}")))
}

/// Select a random browser User-Agent string from the rotation list.
pub fn random_user_agent() -> &'static str {
    let mut rng = rand::thread_rng();
    USER_AGENTS
        .choose(&mut rng)
        .copied()
        // SAFETY: USER_AGENTS is a non-empty const array, choose only returns None on empty slices
        .unwrap_or(USER_AGENTS[0])
}

/// Send `request` and decode a JSON body of type `T`.
///
/// Non-2xx statuses are classified with [`classify_status`].
///
/// # Errors
///
/// Returns [`SearchError::Timeout`] or [`SearchError::Http`] for transport
/// failures, a classified error for non-2xx statuses, or
/// [`SearchError::Parse`] when the body does not decode.
pub async fn send_json<T: DeserializeOwned>(
    provider: ProviderKind,
    request: reqwest::RequestBuilder,
) -> Result<T, SearchError> {
    let response = request.send().await.map_err(|e| transport_error(provider, &e))?;
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| transport_error(provider, &e))?;

    if !status.is_success() {
        return Err(classify_status(provider, status, &body));
    }

    tracing::trace!(%provider, bytes = body.len(), "response received");
    serde_json::from_str(&body)
        .map_err(|e| SearchError::Parse(format!("{provider} returned malformed JSON: {e}")))
}

/// Map a non-2xx status to an error kind.
///
/// - 401 / 403: [`SearchError::Auth`]
/// - 429, or a 402 from a plan-limited API: [`SearchError::QuotaExceeded`]
/// - anything else: [`SearchError::Http`]
pub fn classify_status(provider: ProviderKind, status: StatusCode, body: &str) -> SearchError {
    let detail = body_excerpt(body);
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            SearchError::Auth(format!("{provider} returned {status}: {detail}"))
        }
        StatusCode::TOO_MANY_REQUESTS | StatusCode::PAYMENT_REQUIRED => {
            SearchError::QuotaExceeded(format!("{provider} returned {status}: {detail}"))
        }
        _ => SearchError::Http(format!("{provider} returned {status}: {detail}")),
    }
}

fn transport_error(provider: ProviderKind, err: &reqwest::Error) -> SearchError {
    if err.is_timeout() {
        SearchError::Timeout(format!("{provider} request timed out"))
    } else {
        SearchError::Http(format!("{provider} request failed: {err}"))
    }
}

fn body_excerpt(body: &str) -> String {
    body.trim().chars().take(MAX_ERROR_BODY).collect()
}
