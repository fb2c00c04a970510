//! Configuration error model.

use thiserror::Error;

/// Result type used by configuration building and resolution.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration-level error.
///
/// None of these are fatal for a uniqueness decision: callers that hit one
/// treat uniqueness as disabled for the affected job type.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A value failed validation (e.g. zero expiration, empty prefix).
    #[error("invalid configuration value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },

    /// A named argument filter was not registered for the job type.
    #[error("unknown args filter '{name}' for job type '{job_type}'")]
    UnknownArgsFilter { job_type: String, name: String },
}

impl ConfigError {
    pub fn invalid(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            reason: reason.into(),
        }
    }

    pub fn unknown_filter(job_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self::UnknownArgsFilter {
            job_type: job_type.into(),
            name: name.into(),
        }
    }
}
