//! Limits applied when walking trees.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AstError, Result};

/// Environment variable overriding [`AstConfig::max_depth`].
pub const MAX_DEPTH_ENV: &str = "GM_MAX_DEPTH";

const DEFAULT_MAX_DEPTH: usize = 512;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AstConfig {
    /// Deepest node the checker will visit. The root is at depth 1.
    pub max_depth: usize,
}

impl Default for AstConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl AstConfig {
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Defaults, overridden by `GM_MAX_DEPTH` when it is set.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(raw) = lookup(MAX_DEPTH_ENV) {
            config.max_depth = raw.trim().parse().map_err(|_| {
                AstError::InvalidConfig(format!("{MAX_DEPTH_ENV} must be an integer, got {raw:?}"))
            })?;
            debug!(max_depth = config.max_depth, "max depth taken from environment");
        }
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| AstError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            return Err(AstError::InvalidConfig(
                "max_depth must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
