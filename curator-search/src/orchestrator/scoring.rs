//! Relevance scoring: term overlap plus domain trust on top of the
//! adapter's position-decayed base score.
//!
//! ```text
//! base  = provider_weight / (1 + position * 0.1)          (adapter side)
//! score = min(1, base + title_bonus + snippet_bonus + domain_bonus)
//!
//! title_bonus   = (query terms found in title   / query terms) * 0.3
//! snippet_bonus = (query terms found in snippet / query terms) * 0.2
//! domain_bonus  = 0.2 if the domain contains a trusted domain
//! ```

use crate::config::DEFAULT_TRUSTED_DOMAINS;
use crate::types::{clamp_unit, RawContent};

const TITLE_WEIGHT: f64 = 0.3;
const SNIPPET_WEIGHT: f64 = 0.2;
const TRUSTED_DOMAIN_BONUS: f64 = 0.2;

/// Base score an adapter assigns to the result at `position` (0-based).
///
/// - Position 0 gets the full weight
/// - Position 9 gets roughly half of it
pub fn base_score(weight: f64, position: usize) -> f64 {
    clamp_unit(weight / (1.0 + position as f64 * 0.1))
}

/// Scores and ranks results against a query.
#[derive(Debug, Clone)]
pub struct RelevanceScorer {
    trusted_domains: Vec<String>,
}

impl Default for RelevanceScorer {
    fn default() -> Self {
        Self::new(DEFAULT_TRUSTED_DOMAINS.iter().map(|d| (*d).to_string()))
    }
}

impl RelevanceScorer {
    /// Create a scorer with the given trusted-domain allowlist.
    pub fn new(trusted_domains: impl IntoIterator<Item = String>) -> Self {
        Self {
            trusted_domains: trusted_domains
                .into_iter()
                .map(|d| d.trim().to_lowercase())
                .filter(|d| !d.is_empty())
                .collect(),
        }
    }

    /// Final score for one result. Always within `[0, 1]`.
    pub fn score_one(&self, item: &RawContent, terms: &[String]) -> f64 {
        let title_bonus = term_overlap(&item.title, terms) * TITLE_WEIGHT;
        let snippet_bonus = term_overlap(&item.summary, terms) * SNIPPET_WEIGHT;
        let domain_bonus = if self.is_trusted(&item.metadata.domain) {
            TRUSTED_DOMAIN_BONUS
        } else {
            0.0
        };
        clamp_unit(item.relevance_score() + title_bonus + snippet_bonus + domain_bonus)
    }

    /// Rewrite every result's relevance score and sort descending.
    ///
    /// The sort is stable: equal scores keep provider-return order.
    pub fn score(&self, mut results: Vec<RawContent>, query: &str) -> Vec<RawContent> {
        let terms = query_terms(query);
        for item in &mut results {
            item.metadata.relevance_score = self.score_one(item, &terms);
        }
        results.sort_by(|a, b| {
            b.relevance_score()
                .partial_cmp(&a.relevance_score())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results
    }

    fn is_trusted(&self, domain: &str) -> bool {
        let domain = domain.to_lowercase();
        !domain.is_empty() && self.trusted_domains.iter().any(|t| domain.contains(t.as_str()))
    }
}

/// Lower-cased whitespace-separated query terms.
pub fn query_terms(query: &str) -> Vec<String> {
    query.split_whitespace().map(str::to_lowercase).collect()
}

/// Fraction of `terms` found in `text`, case-insensitively. Zero terms score 0.
fn term_overlap(text: &str, terms: &[String]) -> f64 {
    if terms.is_empty() {
        return 0.0;
    }
    let haystack = text.to_lowercase();
    let found = terms.iter().filter(|t| haystack.contains(t.as_str())).count();
    found as f64 / terms.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ContentType;

    fn make_item(title: &str, url: &str, snippet: &str, base: f64) -> RawContent {
        RawContent::new(title, url, snippet, "Google", ContentType::Web).with_base_score(base)
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn base_score_decays_with_position() {
        assert!(approx(base_score(0.5, 0), 0.5));
        assert!(approx(base_score(0.5, 5), 0.5 / 1.5));
        let scores: Vec<f64> = (0..10).map(|p| base_score(0.5, p)).collect();
        assert!(scores.windows(2).all(|w| w[1] < w[0]));
    }

    #[test]
    fn title_and_snippet_bonuses_are_proportional() {
        let scorer = RelevanceScorer::new(Vec::new());
        let terms = query_terms("rust async runtime");
        let item = make_item(
            "Rust Async Book",
            "https://example.com",
            "an async runtime primer",
            0.1,
        );
        // Title matches 2/3 terms, snippet 2/3 terms.
        let expected = 0.1 + (2.0 / 3.0) * 0.3 + (2.0 / 3.0) * 0.2;
        assert!(approx(scorer.score_one(&item, &terms), expected));
    }

    #[test]
    fn trusted_domain_bonus_applies_on_substring() {
        let scorer = RelevanceScorer::default();
        let terms = query_terms("unrelated");
        let trusted = make_item("x", "https://gist.github.com/a", "", 0.1);
        let untrusted = make_item("x", "https://example.org/a", "", 0.1);
        assert!(approx(scorer.score_one(&trusted, &terms), 0.3));
        assert!(approx(scorer.score_one(&untrusted, &terms), 0.1));
    }

    #[test]
    fn scores_are_clamped_to_one() {
        let scorer = RelevanceScorer::default();
        let item = make_item("rust", "https://dev.to/rust", "rust", 0.9);
        let scored = scorer.score(vec![item], "rust");
        assert!(approx(scored[0].relevance_score(), 1.0));
    }

    #[test]
    fn empty_query_leaves_base_plus_domain() {
        let scorer = RelevanceScorer::default();
        let scored = scorer.score(vec![make_item("t", "https://example.com", "s", 0.4)], "   ");
        assert!(approx(scored[0].relevance_score(), 0.4));
    }

    #[test]
    fn trusted_title_match_outranks_untrusted_non_match() {
        let scorer = RelevanceScorer::default();
        let untrusted = make_item(
            "A Guide To Something Else",
            "https://random-blog.example/post",
            "Some text",
            0.5,
        );
        let trusted = make_item(
            "TypeScript Generics Explained",
            "https://dev.to/someone/typescript-generics",
            "Some text",
            0.5,
        );
        let ranked = scorer.score(vec![untrusted, trusted], "typescript generics");
        assert_eq!(ranked[0].title, "TypeScript Generics Explained");
        assert!(ranked[0].relevance_score() > ranked[1].relevance_score());
    }

    #[test]
    fn stable_sort_preserves_provider_order_on_ties() {
        let scorer = RelevanceScorer::new(Vec::new());
        let items = vec![
            make_item("first", "https://a.com", "", 0.3),
            make_item("second", "https://b.com", "", 0.3),
            make_item("third", "https://c.com", "", 0.3),
        ];
        let ranked = scorer.score(items, "nothing");
        let titles: Vec<_> = ranked.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, ["first", "second", "third"]);
    }

    #[test]
    fn all_scores_within_unit_interval() {
        let scorer = RelevanceScorer::default();
        let items: Vec<_> = (0..20)
            .map(|i| {
                make_item(
                    "rust tokio rust",
                    &format!("https://github.com/{i}"),
                    "rust tokio",
                    base_score(1.0, i),
                )
            })
            .collect();
        for item in scorer.score(items, "rust tokio") {
            let score = item.relevance_score();
            assert!((0.0..=1.0).contains(&score), "score out of range: {score}");
        }
    }

    #[test]
    fn results_sorted_descending() {
        let scorer = RelevanceScorer::new(Vec::new());
        let ranked = scorer.score(
            vec![
                make_item("c", "https://c.com", "", 0.1),
                make_item("a", "https://a.com", "", 0.7),
                make_item("b", "https://b.com", "", 0.4),
            ],
            "zzz",
        );
        assert!(ranked
            .windows(2)
            .all(|w| w[0].relevance_score() >= w[1].relevance_score()));
        assert_eq!(ranked[0].title, "a");
    }
}
