//! Queuing-pipeline integration.
//!
//! `UniqueJobsClient` sits in front of a [`JobQueue`]: every push goes
//! through the coordinator first, admitted jobs are enqueued with their
//! fingerprint attached, and rejected duplicates are dropped without an
//! error reaching the submitter.

use tracing::{debug, instrument};

use jobguard_core::{JobId, JobRequest, WorkerRegistry};

use crate::coordinator::{Admission, UniquenessCoordinator, UniquenessError};
use crate::dedup_store::DedupStore;
use crate::queue::{EnqueuedJob, JobQueue, JobQueueError};
use crate::retry::RetrySet;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Uniqueness(#[from] UniquenessError),

    #[error(transparent)]
    Queue(#[from] JobQueueError),
}

/// Producer-side entry point: uniqueness check in front of a job queue.
///
/// ## Push flow
///
/// 1. Assign a job id when the request carries none.
/// 2. Look up the job type's options in the [`WorkerRegistry`]; unknown
///    types get empty options, leaving only the request's own `unique` flag.
/// 3. Ask the [`UniquenessCoordinator`] for a decision.
/// 4. Admitted jobs go to the queue with their fingerprint attached as
///    `unique_hash`; rejected ones are dropped and `push` returns `Ok(None)`.
///
/// ## Errors
///
/// Only infrastructure failures surface as [`ClientError`]. Duplicates are
/// an expected outcome, not an error.
pub struct UniqueJobsClient<S, R, Q> {
    coordinator: UniquenessCoordinator<S, R>,
    registry: WorkerRegistry,
    queue: Q,
}

impl<S, R, Q> UniqueJobsClient<S, R, Q>
where
    S: DedupStore,
    R: RetrySet,
    Q: JobQueue,
{
    pub fn new(coordinator: UniquenessCoordinator<S, R>, registry: WorkerRegistry, queue: Q) -> Self {
        Self {
            coordinator,
            registry,
            queue,
        }
    }

    pub fn coordinator(&self) -> &UniquenessCoordinator<S, R> {
        &self.coordinator
    }

    pub fn registry_mut(&mut self) -> &mut WorkerRegistry {
        &mut self.registry
    }

    pub fn queue(&self) -> &Q {
        &self.queue
    }

    /// Submit a job.
    ///
    /// Returns the job id when the job was handed to the queue, `None` when
    /// it was dropped as a duplicate.
    #[instrument(
        skip(self, request),
        fields(job_type = %request.job_type(), queue = %request.queue()),
        err
    )]
    pub fn push(&self, request: JobRequest) -> Result<Option<JobId>, ClientError> {
        let request = match request.jid() {
            Some(_) => request,
            None => request.with_jid(JobId::generate()),
        };
        let options = self.registry.options_for(request.job_type());

        match self.coordinator.decide(&request, &options)? {
            Admission::Admitted { fingerprint } => {
                let now = self.coordinator.clock().now();
                let jid = self.queue.push(EnqueuedJob::new(request, fingerprint, now))?;
                Ok(Some(jid))
            }
            rejected => {
                debug!(jid = ?request.jid(), outcome = ?rejected, "submission dropped");
                Ok(None)
            }
        }
    }
}
