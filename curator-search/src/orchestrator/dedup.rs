//! Result deduplication by normalised URL.
//!
//! The first occurrence of a URL wins and later duplicates are dropped
//! silently, so provider ordering is preserved. A [`Deduplicator`] remembers
//! what it has seen and can be fed several result lists in turn to merge
//! them.

use std::collections::HashSet;

use crate::types::RawContent;

use super::url_normalize::normalize_url;

/// Stateful URL deduplicator.
#[derive(Debug, Default)]
pub struct Deduplicator {
    seen: HashSet<String>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep the items whose normalised URL has not been seen yet, in order.
    pub fn retain_new(&mut self, items: Vec<RawContent>) -> Vec<RawContent> {
        items
            .into_iter()
            .filter(|item| self.seen.insert(normalize_url(&item.url)))
            .collect()
    }

    /// Number of distinct URLs seen so far.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// Deduplicate one result list by normalised URL, keeping first occurrences.
pub fn deduplicate(items: Vec<RawContent>) -> Vec<RawContent> {
    Deduplicator::new().retain_new(items)
}
