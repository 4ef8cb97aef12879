//! URL normalisation for deduplication and domain extraction.
//!
//! Canonicalises URLs so that equivalent pages (differing only in
//! query-parameter order, tracking parameters, fragments, trailing slashes,
//! or capitalisation) compare as equal.

use url::Url;

/// Tracking query parameters that are stripped during normalisation.
const TRACKING_PARAMS: &[&str] = &[
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "fbclid",
    "gclid",
    "mc_cid",
    "mc_eid",
    "ref",
];

/// Normalise a URL into a deduplication key.
///
/// 1. Remove the fragment.
/// 2. Remove default ports (`:80` for HTTP, `:443` for HTTPS).
/// 3. Strip tracking parameters and sort the rest by key.
/// 4. Remove a trailing slash from the path (unless the path is `"/"`).
/// 5. Case-fold the whole result.
///
/// Input that cannot be parsed as a URL is trimmed and case-folded.
///
/// # Examples
///
/// ```
/// use curator_search::orchestrator::url_normalize::normalize_url;
///
/// let a = normalize_url("https://Example.COM/Path/?b=2&a=1#section");
/// let b = normalize_url("https://example.com/path?a=1&b=2&utm_source=feed");
/// assert_eq!(a, b);
/// ```
pub fn normalize_url(raw: &str) -> String {
    let Ok(mut parsed) = Url::parse(raw.trim()) else {
        return raw.trim().to_lowercase();
    };

    parsed.set_fragment(None);

    if is_default_port(&parsed) {
        let _ = parsed.set_port(None);
    }

    let mut params: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(key, _)| !TRACKING_PARAMS.contains(&key.to_lowercase().as_str()))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    params.sort();

    if params.is_empty() {
        parsed.set_query(None);
    } else {
        parsed
            .query_pairs_mut()
            .clear()
            .extend_pairs(params.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    }

    let path = parsed.path().to_string();
    if path.len() > 1 && path.ends_with('/') {
        parsed.set_path(&path[..path.len() - 1]);
    }

    parsed.to_string().to_lowercase()
}

/// Host of `raw` in lower case without a leading `www.`.
///
/// Returns an empty string when `raw` has no parseable host.
pub fn extract_domain(raw: &str) -> String {
    Url::parse(raw.trim())
        .ok()
        .and_then(|u| u.host_str().map(str::to_lowercase))
        .map(|host| host.strip_prefix("www.").map(str::to_string).unwrap_or(host))
        .unwrap_or_default()
}

/// Returns `true` if the URL uses the default port for its scheme.
fn is_default_port(url: &Url) -> bool {
    matches!(
        (url.scheme(), url.port()),
        ("http", Some(80)) | ("https", Some(443))
    )
}
