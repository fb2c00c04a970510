//! Per-job-type uniqueness options and argument reducers.
//!
//! Argument filters come in two shapes: a filter registered by name for a job
//! type, or an arbitrary callable. Both are resolved into a single
//! [`ArgsReducer`] when the options are built, so nothing is looked up by
//! name on the decision path.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value as JsonValue;
use tracing::warn;

use crate::config::UniqueJobsConfig;
use crate::error::{ConfigError, ConfigResult};
use crate::request::JobRequest;

/// Argument filter: maps the full argument list to the list used for fingerprinting.
pub type ArgsFilterFn = Arc<dyn Fn(&[JsonValue]) -> Vec<JsonValue> + Send + Sync>;

/// Declared argument filter, before resolution.
#[derive(Clone)]
pub enum UniqueArgs {
    /// Filter registered under this name for the job type.
    Named(String),
    /// Arbitrary callable.
    Callable(ArgsFilterFn),
}

impl core::fmt::Debug for UniqueArgs {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            UniqueArgs::Named(name) => f.debug_tuple("Named").field(name).finish(),
            UniqueArgs::Callable(_) => f.write_str("Callable(..)"),
        }
    }
}

/// Resolved argument reducer. The default is the identity.
#[derive(Clone, Default)]
pub struct ArgsReducer(Option<ArgsFilterFn>);

impl ArgsReducer {
    pub fn identity() -> Self {
        Self(None)
    }

    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&[JsonValue]) -> Vec<JsonValue> + Send + Sync + 'static,
    {
        Self(Some(Arc::new(f)))
    }

    pub fn is_identity(&self) -> bool {
        self.0.is_none()
    }

    /// Apply the reducer. The result is used as-is; nothing is sorted or normalized.
    pub fn apply(&self, args: &[JsonValue]) -> Vec<JsonValue> {
        match &self.0 {
            Some(f) => f(args),
            None => args.to_vec(),
        }
    }
}

impl core::fmt::Debug for ArgsReducer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.is_identity() {
            f.write_str("ArgsReducer(identity)")
        } else {
            f.write_str("ArgsReducer(fn)")
        }
    }
}

/// Named argument filters, keyed by `(job type, filter name)`.
#[derive(Default, Clone)]
pub struct ArgsFilterRegistry {
    filters: HashMap<(String, String), ArgsFilterFn>,
}

impl ArgsFilterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, job_type: impl Into<String>, name: impl Into<String>, filter: F)
    where
        F: Fn(&[JsonValue]) -> Vec<JsonValue> + Send + Sync + 'static,
    {
        self.filters
            .insert((job_type.into(), name.into()), Arc::new(filter));
    }

    /// Resolve a declared filter for a job type.
    pub fn resolve(&self, job_type: &str, declared: &UniqueArgs) -> ConfigResult<ArgsReducer> {
        match declared {
            UniqueArgs::Callable(f) => Ok(ArgsReducer(Some(f.clone()))),
            UniqueArgs::Named(name) => self
                .filters
                .get(&(job_type.to_string(), name.clone()))
                .map(|f| ArgsReducer(Some(f.clone())))
                .ok_or_else(|| ConfigError::unknown_filter(job_type, name.as_str())),
        }
    }
}

/// Uniqueness options for one job type.
#[derive(Debug, Clone, Default)]
pub struct UniqueOptions {
    /// `unique` flag; the request may also enable uniqueness on its own.
    pub unique: Option<bool>,
    /// Record lifetime; the global default applies when unset.
    pub expiration: Option<Duration>,
    /// Resolved argument reducer.
    pub args_reducer: ArgsReducer,
    /// Exclude the queue from the fingerprint.
    pub unique_on_all_queues: bool,
    /// Retry-set check; falls back to the request, then the global default.
    pub checks_retry_queue: Option<bool>,
}

impl UniqueOptions {
    pub fn builder() -> UniqueOptionsBuilder {
        UniqueOptionsBuilder::default()
    }

    /// Uniqueness on, everything else defaulted.
    pub fn enabled() -> Self {
        Self {
            unique: Some(true),
            ..Default::default()
        }
    }

    /// Resolve against a request and the global defaults.
    ///
    /// Returns `None` when uniqueness is disabled for this submission.
    pub fn resolve(
        &self,
        request: &JobRequest,
        config: &UniqueJobsConfig,
    ) -> Option<ResolvedUniqueness> {
        let enabled = self.unique.unwrap_or(false) || request.unique().unwrap_or(false);
        if !enabled {
            return None;
        }

        let args_reducer = if config.unique_args_enabled {
            self.args_reducer.clone()
        } else {
            ArgsReducer::identity()
        };

        Some(ResolvedUniqueness {
            expiration: self.expiration.unwrap_or(config.default_expiration),
            args_reducer,
            unique_on_all_queues: self.unique_on_all_queues,
            checks_retry_queue: self
                .checks_retry_queue
                .or(request.checks_retry_queue())
                .unwrap_or(config.checks_retry_queue),
        })
    }
}

/// Builder for [`UniqueOptions`]; named filters are resolved in [`build`](Self::build).
#[derive(Debug, Clone, Default)]
pub struct UniqueOptionsBuilder {
    unique: Option<bool>,
    expiration: Option<Duration>,
    args_filter: Option<UniqueArgs>,
    unique_on_all_queues: bool,
    checks_retry_queue: Option<bool>,
}

impl UniqueOptionsBuilder {
    pub fn unique(mut self, unique: bool) -> Self {
        self.unique = Some(unique);
        self
    }

    pub fn expiration(mut self, expiration: Duration) -> Self {
        self.expiration = Some(expiration);
        self
    }

    pub fn args_filter_named(mut self, name: impl Into<String>) -> Self {
        self.args_filter = Some(UniqueArgs::Named(name.into()));
        self
    }

    pub fn args_filter_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&[JsonValue]) -> Vec<JsonValue> + Send + Sync + 'static,
    {
        self.args_filter = Some(UniqueArgs::Callable(Arc::new(f)));
        self
    }

    pub fn unique_on_all_queues(mut self, on: bool) -> Self {
        self.unique_on_all_queues = on;
        self
    }

    pub fn checks_retry_queue(mut self, checks: bool) -> Self {
        self.checks_retry_queue = Some(checks);
        self
    }

    pub fn build(self, job_type: &str, filters: &ArgsFilterRegistry) -> ConfigResult<UniqueOptions> {
        if let Some(expiration) = self.expiration {
            if expiration.as_secs() == 0 {
                return Err(ConfigError::invalid(
                    "unique_expiration_seconds",
                    "must be at least one second",
                ));
            }
        }

        let args_reducer = match &self.args_filter {
            Some(declared) => filters.resolve(job_type, declared)?,
            None => ArgsReducer::identity(),
        };

        Ok(UniqueOptions {
            unique: self.unique,
            expiration: self.expiration,
            args_reducer,
            unique_on_all_queues: self.unique_on_all_queues,
            checks_retry_queue: self.checks_retry_queue,
        })
    }
}

/// Effective settings for one decision.
#[derive(Debug, Clone)]
pub struct ResolvedUniqueness {
    pub expiration: Duration,
    pub args_reducer: ArgsReducer,
    pub unique_on_all_queues: bool,
    pub checks_retry_queue: bool,
}

/// Uniqueness options by job type.
///
/// Unknown job types get empty options, so uniqueness then depends only on
/// the request's own `unique` flag.
#[derive(Default, Clone)]
pub struct WorkerRegistry {
    filters: ArgsFilterRegistry,
    workers: HashMap<String, UniqueOptions>,
}

impl WorkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filters(filters: ArgsFilterRegistry) -> Self {
        Self {
            filters,
            workers: HashMap::new(),
        }
    }

    pub fn filters_mut(&mut self) -> &mut ArgsFilterRegistry {
        &mut self.filters
    }

    /// Build and register options for a job type.
    ///
    /// On error the job type is left unregistered (uniqueness disabled) and
    /// the error is returned for the caller to report.
    pub fn register(
        &mut self,
        job_type: impl Into<String>,
        builder: UniqueOptionsBuilder,
    ) -> ConfigResult<()> {
        let job_type = job_type.into();
        match builder.build(&job_type, &self.filters) {
            Ok(options) => {
                self.workers.insert(job_type, options);
                Ok(())
            }
            Err(e) => {
                warn!(job_type = %job_type, error = %e, "uniqueness disabled: invalid options");
                self.workers.remove(&job_type);
                Err(e)
            }
        }
    }

    pub fn options_for(&self, job_type: &str) -> UniqueOptions {
        self.workers.get(job_type).cloned().unwrap_or_default()
    }
}
