//! Job queue boundary.
//!
//! The queue itself is an external collaborator: it stores admitted jobs,
//! runs them and parks failures in a retry set. This module defines the
//! narrow push interface the uniqueness client needs, plus an in-memory
//! implementation for tests/dev.

pub mod in_memory;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use jobguard_core::{Fingerprint, JobId, JobRequest};

pub use in_memory::InMemoryJobQueue;

/// A job as persisted by the queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnqueuedJob {
    request: JobRequest,
    jid: JobId,
    /// Fingerprint the job was admitted under, so the retry path can find it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    unique_hash: Option<Fingerprint>,
    enqueued_at: DateTime<Utc>,
}

impl EnqueuedJob {
    /// Wrap a request, assigning a job id if it has none.
    pub fn new(request: JobRequest, unique_hash: Option<Fingerprint>, enqueued_at: DateTime<Utc>) -> Self {
        let (request, jid) = match request.jid().cloned() {
            Some(jid) => (request, jid),
            None => {
                let jid = JobId::generate();
                (request.with_jid(jid.clone()), jid)
            }
        };
        Self {
            request,
            jid,
            unique_hash,
            enqueued_at,
        }
    }

    pub fn jid(&self) -> &JobId {
        &self.jid
    }

    pub fn request(&self) -> &JobRequest {
        &self.request
    }

    pub fn unique_hash(&self) -> Option<&Fingerprint> {
        self.unique_hash.as_ref()
    }

    pub fn enqueued_at(&self) -> DateTime<Utc> {
        self.enqueued_at
    }
}

/// Job queue error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum JobQueueError {
    #[error("job already exists: {0}")]
    AlreadyExists(JobId),
    #[error("storage error: {0}")]
    Storage(String),
}

/// Accepts admitted jobs.
pub trait JobQueue: Send + Sync {
    /// Enqueue immediately, or schedule when the request carries a run time.
    fn push(&self, job: EnqueuedJob) -> Result<JobId, JobQueueError>;
}

impl<Q> JobQueue for Arc<Q>
where
    Q: JobQueue + ?Sized,
{
    fn push(&self, job: EnqueuedJob) -> Result<JobId, JobQueueError> {
        (**self).push(job)
    }
}
