//! Engine configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Reconciliation settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReconcileConfig {
    /// Most standard items a customer may remove
    pub max_removed_items: usize,
    /// Largest price gap, in minor units, between a removed item and its swap
    pub swap_price_tolerance: u64,
}

impl ReconcileConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With removal limit
    #[inline]
    #[must_use]
    pub fn with_max_removed_items(mut self, max: usize) -> Self {
        self.max_removed_items = max;
        self
    }

    /// With swap price tolerance
    #[inline]
    #[must_use]
    pub fn with_swap_price_tolerance(mut self, tolerance: u64) -> Self {
        self.swap_price_tolerance = tolerance;
        self
    }

    /// Parse from a TOML document
    ///
    /// Missing keys take their defaults.
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] on malformed TOML or unknown keys
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Load from a TOML file
    ///
    /// # Errors
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Parse`] if it is not a valid config
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            max_removed_items: 2,
            swap_price_tolerance: 50,
        }
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file unreadable
    #[error("io error reading {path}: {source}")]
    Io {
        /// Config path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Config document invalid
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}
