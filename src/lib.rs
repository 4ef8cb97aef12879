//! Curator: collect ranked source material and hand it to article generation.
//!
//! The collection pipeline lives in [`curator_search`]. This crate adds TOML
//! configuration with environment credentials, the [`Curator`] hand-off to an
//! [`ArticleGenerator`], and the `curator-collect` binary.

pub mod config;
pub mod curation;
pub mod error;

pub use config::CuratorConfig;
pub use curation::{ArticleGenerator, Curator, GeneratedArticle, SourceDigest};
pub use curator_search;
pub use error::{CuratorError, Result};
