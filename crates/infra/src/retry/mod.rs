//! Retry-set reconciliation.
//!
//! Jobs that failed are parked in an externally owned retry collection until
//! the queuing pipeline re-submits them. The reconciler answers two distinct
//! questions about that collection:
//!
//! - `has_pending_retry`: is *any* failed instance of this fingerprint parked?
//! - `find_retry_for`: is there a parked entry for this fingerprint *and* job id,
//!   i.e. is the current submission the retry's own re-entry?

pub mod in_memory;
#[cfg(feature = "redis")]
pub mod redis;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use jobguard_core::{Fingerprint, JobId, JobRequest};

pub use in_memory::InMemoryRetrySet;
#[cfg(feature = "redis")]
pub use redis::RedisRetrySet;

/// A failed job parked for retry.
///
/// Decoded from payloads written by the queue, so every field is optional and
/// `failed_at` accepts epoch seconds as well as RFC 3339.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryEntry {
    /// Fingerprint the job was enqueued with.
    #[serde(default)]
    pub unique_hash: Option<Fingerprint>,
    #[serde(default)]
    pub jid: Option<JobId>,
    /// Epoch seconds or RFC 3339 on input, depending on the writer.
    #[serde(
        default,
        deserialize_with = "jobguard_core::timestamp::deserialize_optional"
    )]
    pub failed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// The original submission, when the collection keeps it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job: Option<JobRequest>,
}

impl RetryEntry {
    pub fn new(unique_hash: Option<Fingerprint>, jid: Option<JobId>) -> Self {
        Self {
            unique_hash,
            jid,
            failed_at: None,
            error_message: None,
            job: None,
        }
    }

    pub fn with_failure(mut self, failed_at: DateTime<Utc>, error: impl Into<String>) -> Self {
        self.failed_at = Some(failed_at);
        self.error_message = Some(error.into());
        self
    }

    pub fn with_job(mut self, job: JobRequest) -> Self {
        self.job = Some(job);
        self
    }
}

#[derive(Debug, Error)]
pub enum RetrySetError {
    #[error("retry set connection error: {0}")]
    Connection(String),

    #[error("retry set command error: {0}")]
    Command(String),

    #[error("retry entry deserialization error: {0}")]
    Deserialization(String),
}

/// Read access to the retry collection.
pub trait RetrySet: Send + Sync {
    /// First entry, in collection order, for which `predicate` returns true.
    fn find(
        &self,
        predicate: &mut dyn FnMut(&RetryEntry) -> bool,
    ) -> Result<Option<RetryEntry>, RetrySetError>;
}

impl<R> RetrySet for Arc<R>
where
    R: RetrySet + ?Sized,
{
    fn find(
        &self,
        predicate: &mut dyn FnMut(&RetryEntry) -> bool,
    ) -> Result<Option<RetryEntry>, RetrySetError> {
        (**self).find(predicate)
    }
}

/// Read-only queries over a retry collection it is given but does not own.
#[derive(Debug, Clone)]
pub struct RetryReconciler<R> {
    retries: R,
}

impl<R: RetrySet> RetryReconciler<R> {
    pub fn new(retries: R) -> Self {
        Self { retries }
    }

    /// Whether any parked entry carries `fingerprint`, regardless of job id.
    pub fn has_pending_retry(&self, fingerprint: &Fingerprint) -> Result<bool, RetrySetError> {
        let found = self
            .retries
            .find(&mut |entry| entry.unique_hash.as_ref() == Some(fingerprint))?;
        Ok(found.is_some())
    }

    /// The parked entry for `fingerprint` with job id `jid`, if any.
    ///
    /// A request without a job id matches entries without one.
    pub fn find_retry_for(
        &self,
        fingerprint: &Fingerprint,
        jid: Option<&JobId>,
    ) -> Result<Option<RetryEntry>, RetrySetError> {
        self.retries.find(&mut |entry| {
            entry.unique_hash.as_ref() == Some(fingerprint) && entry.jid.as_ref() == jid
        })
    }
}
