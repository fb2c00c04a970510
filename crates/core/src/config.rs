//! Global uniqueness defaults.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Default lifetime of a dedup record (30 minutes).
pub const DEFAULT_EXPIRATION: Duration = Duration::from_secs(30 * 60);

/// Default prefix for dedup record keys.
pub const DEFAULT_KEY_PREFIX: &str = "unique_jobs";

/// Process-wide uniqueness defaults.
///
/// Built once and handed to the coordinator at construction; per-job-type
/// options and request overrides are resolved against it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniqueJobsConfig {
    /// Record lifetime when a job type does not set its own.
    pub default_expiration: Duration,
    /// Whether to consult the retry set when neither the job type nor the
    /// request says otherwise.
    pub checks_retry_queue: bool,
    /// Prefix for dedup record keys.
    pub key_prefix: String,
    /// Global switch for argument reducers; when off, full args are fingerprinted.
    pub unique_args_enabled: bool,
}

impl Default for UniqueJobsConfig {
    fn default() -> Self {
        Self {
            default_expiration: DEFAULT_EXPIRATION,
            checks_retry_queue: false,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            unique_args_enabled: true,
        }
    }
}

impl UniqueJobsConfig {
    pub fn with_default_expiration(mut self, expiration: Duration) -> Self {
        self.default_expiration = expiration;
        self
    }

    pub fn with_checks_retry_queue(mut self, checks: bool) -> Self {
        self.checks_retry_queue = checks;
        self
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    pub fn with_unique_args_enabled(mut self, enabled: bool) -> Self {
        self.unique_args_enabled = enabled;
        self
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.default_expiration.as_secs() == 0 {
            return Err(ConfigError::invalid(
                "default_expiration",
                "must be at least one second",
            ));
        }
        if self.key_prefix.trim().is_empty() {
            return Err(ConfigError::invalid("key_prefix", "must not be empty"));
        }
        Ok(())
    }
}
