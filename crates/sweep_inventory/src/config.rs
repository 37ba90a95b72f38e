//! Run configuration file.
//!
//! ```yaml
//! concurrency: 10
//! max_attempts: 5
//! retry_backoff_ms: 500
//! exclude:
//!   - type: exact
//!     value: prod-vpc
//!   - type: type_scoped
//!     resource_type: s3-bucket
//!     filters:
//!       - type: regex
//!         property: env
//!         pattern: "^prod"
//! ```
//!
//! Every key is optional. Missing values fall back to the cleaner defaults.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sweep_core::{CleanerConfig, Filter};
use tracing::debug;

use crate::error::{InventoryError, InventoryResult};

/// Settings read from a run configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Number of deletion workers per round
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<usize>,
    /// Give up once a resource has failed this many attempts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,
    /// Pause before retrying after a round with failures, in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_backoff_ms: Option<u64>,
    /// Resources matching any of these filters are kept
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<Filter>,
}

impl RunConfig {
    /// Parse a run configuration from YAML text.
    ///
    /// Malformed filters (including invalid regexes) are reported as
    /// configuration errors.
    pub fn from_yaml_str(content: &str) -> InventoryResult<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: RunConfig = serde_yaml::from_str(content)
            .map_err(|e| InventoryError::InvalidConfiguration(e.to_string()))?;
        config.to_cleaner_config(false).validate().map_err(|e| {
            InventoryError::InvalidConfiguration(e.to_string())
        })?;
        Ok(config)
    }

    /// Read a run configuration file.
    pub fn load(path: impl AsRef<Path>) -> InventoryResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(InventoryError::NotFound(path.to_path_buf()));
        }
        debug!("Reading run configuration from {:?}", path);

        let content = fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Override the concurrency when `concurrency` is set.
    pub fn with_concurrency(mut self, concurrency: Option<usize>) -> Self {
        if concurrency.is_some() {
            self.concurrency = concurrency;
        }
        self
    }

    /// Override the attempt cap when `max_attempts` is set.
    pub fn with_max_attempts(mut self, max_attempts: Option<u32>) -> Self {
        if max_attempts.is_some() {
            self.max_attempts = max_attempts;
        }
        self
    }

    /// Build the cleaner configuration for a run.
    pub fn to_cleaner_config(&self, dry_run: bool) -> CleanerConfig {
        let mut config = CleanerConfig::new()
            .dry_run(dry_run)
            .excludes(self.exclude.iter().cloned());
        if let Some(concurrency) = self.concurrency {
            config = config.concurrency(concurrency);
        }
        if let Some(max_attempts) = self.max_attempts {
            config = config.max_attempts(max_attempts);
        }
        if let Some(ms) = self.retry_backoff_ms {
            config = config.retry_backoff(Duration::from_millis(ms));
        }
        config
    }
}
