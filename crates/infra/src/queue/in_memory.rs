use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};

use jobguard_core::{JobId, JobRequest};

use super::{EnqueuedJob, JobQueue, JobQueueError};
use crate::retry::{InMemoryRetrySet, RetryEntry};

#[derive(Debug, Default)]
struct Inner {
    queues: HashMap<String, VecDeque<EnqueuedJob>>,
    /// Kept sorted by run time.
    schedule: Vec<EnqueuedJob>,
    known: HashSet<JobId>,
}

/// In-memory queue, schedule and retry set for tests/dev.
///
/// Stands in for the external job queue so the whole submission pipeline can
/// run in one process.
///
/// ## Layout
///
/// - Named FIFO queues for immediate jobs.
/// - One schedule, ordered by run time, for jobs pushed with `at`.
/// - A shared [`InMemoryRetrySet`] where failed jobs are parked. Hand the same
///   set to the coordinator so it sees what the queue parks.
///
/// ## Lifecycle helpers
///
/// - [`pop`](Self::pop): a worker taking the next job.
/// - [`due_scheduled`](Self::due_scheduled): the scheduler moving due jobs
///   back in as immediate requests.
/// - [`park_for_retry`](Self::park_for_retry) and
///   [`take_retries`](Self::take_retries): a failure and the retry poller
///   re-submitting it with its job id and failure marker.
///
/// Job ids are unique across queue, schedule and retries: pushing a job id the
/// queue still holds fails with [`JobQueueError::AlreadyExists`].
#[derive(Debug)]
pub struct InMemoryJobQueue {
    inner: RwLock<Inner>,
    retries: Arc<InMemoryRetrySet>,
}

impl InMemoryJobQueue {
    pub fn new() -> Self {
        Self::with_retry_set(Arc::new(InMemoryRetrySet::new()))
    }

    /// Queue that parks failures into `retries`.
    pub fn with_retry_set(retries: Arc<InMemoryRetrySet>) -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            retries,
        }
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    pub fn retry_set(&self) -> Arc<InMemoryRetrySet> {
        self.retries.clone()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Inner>, JobQueueError> {
        self.inner
            .read()
            .map_err(|_| JobQueueError::Storage("lock poisoned".to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Inner>, JobQueueError> {
        self.inner
            .write()
            .map_err(|_| JobQueueError::Storage("lock poisoned".to_string()))
    }

    pub fn queue_len(&self, queue: &str) -> usize {
        self.read()
            .map(|inner| inner.queues.get(queue).map_or(0, VecDeque::len))
            .unwrap_or(0)
    }

    pub fn scheduled_len(&self) -> usize {
        self.read().map(|inner| inner.schedule.len()).unwrap_or(0)
    }

    pub fn retry_len(&self) -> usize {
        self.retries.len()
    }

    /// Take the oldest job from `queue`.
    pub fn pop(&self, queue: &str) -> Result<Option<EnqueuedJob>, JobQueueError> {
        let mut inner = self.write()?;
        let job = inner.queues.get_mut(queue).and_then(VecDeque::pop_front);
        if let Some(job) = &job {
            inner.known.remove(job.jid());
        }
        Ok(job)
    }

    /// Remove scheduled jobs due at `now` and return them as immediate
    /// requests, ready to be pushed again.
    pub fn due_scheduled(&self, now: DateTime<Utc>) -> Result<Vec<JobRequest>, JobQueueError> {
        let mut inner = self.write()?;
        let split = inner
            .schedule
            .iter()
            .position(|job| job.request().at().is_some_and(|at| at > now))
            .unwrap_or(inner.schedule.len());
        let due: Vec<EnqueuedJob> = inner.schedule.drain(..split).collect();
        for job in &due {
            inner.known.remove(job.jid());
        }
        Ok(due
            .into_iter()
            .map(|job| job.request.into_immediate())
            .collect())
    }

    /// Park a failed job in the retry set with its failure marker.
    pub fn park_for_retry(
        &self,
        job: EnqueuedJob,
        error: impl Into<String>,
        failed_at: DateTime<Utc>,
    ) -> Result<(), JobQueueError> {
        let entry = RetryEntry::new(job.unique_hash.clone(), Some(job.jid.clone()))
            .with_failure(failed_at, error)
            .with_job(job.request.with_failed_at(failed_at));
        self.retries
            .add(entry)
            .map_err(|e| JobQueueError::Storage(e.to_string()))
    }

    /// Remove every parked job and return the requests to re-submit, each
    /// carrying its original job id and failure marker.
    pub fn take_retries(&self) -> Result<Vec<JobRequest>, JobQueueError> {
        let entries = self
            .retries
            .drain()
            .map_err(|e| JobQueueError::Storage(e.to_string()))?;
        Ok(entries.into_iter().filter_map(|e| e.job).collect())
    }
}

impl Default for InMemoryJobQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl JobQueue for InMemoryJobQueue {
    fn push(&self, job: EnqueuedJob) -> Result<JobId, JobQueueError> {
        let mut inner = self.write()?;
        let jid = job.jid().clone();
        if !inner.known.insert(jid.clone()) {
            return Err(JobQueueError::AlreadyExists(jid));
        }

        match job.request().at() {
            Some(at) => {
                let idx = inner
                    .schedule
                    .partition_point(|j| j.request().at().is_some_and(|other| other <= at));
                inner.schedule.insert(idx, job);
            }
            None => {
                inner
                    .queues
                    .entry(job.request().queue().to_string())
                    .or_default()
                    .push_back(job);
            }
        }
        Ok(jid)
    }
}
