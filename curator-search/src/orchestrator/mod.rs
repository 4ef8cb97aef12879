//! Query orchestration: provider selection, batching, dedup, scoring.
//!
//! [`fallback::FallbackSearchEngine`] answers one query from one provider
//! and ranks the result. [`batch::BatchScheduler`] runs many queries through
//! it in paced concurrent groups.

pub mod batch;
pub mod dedup;
pub mod fallback;
pub mod scoring;
pub mod url_normalize;
