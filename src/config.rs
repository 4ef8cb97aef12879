//! Configuration for the curator host.
//!
//! The TOML file carries a `[search]` table for the collection pipeline and a
//! few host-level settings. Credentials from the environment override the
//! file, so keys never need to be written to disk.

use std::path::{Path, PathBuf};

use curator_search::{BatchOptions, PipelineConfig};
use serde::{Deserialize, Serialize};

use crate::error::{CuratorError, Result};

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CuratorConfig {
    /// Upper bound on sources handed to the article generator.
    pub max_sources: usize,
    /// Collection pipeline settings.
    pub search: PipelineConfig,
}

impl Default for CuratorConfig {
    fn default() -> Self {
        Self {
            max_sources: 20,
            search: PipelineConfig::default(),
        }
    }
}

impl CuratorConfig {
    /// Load configuration from a TOML file, falling back to defaults for
    /// missing fields, then overlay environment credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or fails
    /// validation.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self =
            toml::from_str(&content).map_err(|e| CuratorError::Config(e.to_string()))?;
        let config = config.with_env_credentials();
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if it exists, otherwise start from defaults. Environment
    /// credentials are applied either way.
    ///
    /// # Errors
    ///
    /// Same as [`CuratorConfig::from_file`] when the file exists.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::from_file(path)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default().with_env_credentials())
        }
    }

    /// Overlay `GOOGLE_API_KEY`, `GOOGLE_CSE_ID`, `SERPAPI_API_KEY`, and
    /// `NEWS_API_KEY` on top of the configured credentials.
    pub fn with_env_credentials(mut self) -> Self {
        self.search = self.search.with_env_credentials();
        self
    }

    /// # Errors
    ///
    /// Returns [`CuratorError::Config`] if `max_sources` is zero, or
    /// [`CuratorError::Search`] if the pipeline settings are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.max_sources == 0 {
            return Err(CuratorError::Config(
                "max_sources must be greater than 0".into(),
            ));
        }
        self.search.validate()?;
        Ok(())
    }

    /// Batch dispatch settings derived from the pipeline config.
    pub fn batch_options(&self) -> BatchOptions {
        BatchOptions::from_config(&self.search)
    }

    /// Returns the default config file path: `~/.config/curator/config.toml`.
    pub fn default_config_path() -> PathBuf {
        if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(config).join("curator").join("config.toml")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("curator")
                .join("config.toml")
        } else {
            PathBuf::from("/tmp/curator-config/config.toml")
        }
    }
}
