//! Job submission requests.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::id::JobId;

/// One submission attempt of a background job.
///
/// Requests are immutable once built; the `with_*` methods consume and return
/// the request so they can only be used while constructing it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRequest {
    #[serde(rename = "class")]
    job_type: String,
    queue: String,
    #[serde(default)]
    args: Vec<JsonValue>,
    /// Scheduled execution time; absent means "run now".
    #[serde(
        default,
        deserialize_with = "crate::timestamp::deserialize_optional",
        skip_serializing_if = "Option::is_none"
    )]
    at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    jid: Option<JobId>,
    /// Set when this request re-submits a previously failed job.
    #[serde(
        default,
        deserialize_with = "crate::timestamp::deserialize_optional",
        skip_serializing_if = "Option::is_none"
    )]
    failed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    unique: Option<bool>,
    #[serde(
        default,
        rename = "unique_job_checks_retry_queue",
        skip_serializing_if = "Option::is_none"
    )]
    checks_retry_queue: Option<bool>,
}

impl JobRequest {
    pub fn new(job_type: impl Into<String>, queue: impl Into<String>, args: Vec<JsonValue>) -> Self {
        Self {
            job_type: job_type.into(),
            queue: queue.into(),
            args,
            at: None,
            jid: None,
            failed_at: None,
            unique: None,
            checks_retry_queue: None,
        }
    }

    /// Schedule the request for a specific time.
    pub fn scheduled_at(mut self, at: DateTime<Utc>) -> Self {
        self.at = Some(at);
        self
    }

    /// Schedule the request `delay` after `now`.
    pub fn scheduled_in(self, now: DateTime<Utc>, delay: Duration) -> Self {
        self.scheduled_at(now + delay)
    }

    pub fn with_jid(mut self, jid: impl Into<JobId>) -> Self {
        self.jid = Some(jid.into());
        self
    }

    /// Mark the request as the re-submission of a failed job.
    pub fn with_failed_at(mut self, failed_at: DateTime<Utc>) -> Self {
        self.failed_at = Some(failed_at);
        self
    }

    /// Request-level `unique` flag (enables uniqueness even if the job type does not).
    pub fn with_unique(mut self, unique: bool) -> Self {
        self.unique = Some(unique);
        self
    }

    /// Request-level override of the retry-queue check.
    pub fn with_checks_retry_queue(mut self, checks: bool) -> Self {
        self.checks_retry_queue = Some(checks);
        self
    }

    /// Same request, run immediately (what the scheduler does when it pops a due job).
    pub fn into_immediate(mut self) -> Self {
        self.at = None;
        self
    }

    pub fn job_type(&self) -> &str {
        &self.job_type
    }

    pub fn queue(&self) -> &str {
        &self.queue
    }

    pub fn args(&self) -> &[JsonValue] {
        &self.args
    }

    pub fn at(&self) -> Option<DateTime<Utc>> {
        self.at
    }

    pub fn is_scheduled(&self) -> bool {
        self.at.is_some()
    }

    pub fn jid(&self) -> Option<&JobId> {
        self.jid.as_ref()
    }

    pub fn failed_at(&self) -> Option<DateTime<Utc>> {
        self.failed_at
    }

    pub fn has_failed(&self) -> bool {
        self.failed_at.is_some()
    }

    pub fn unique(&self) -> Option<bool> {
        self.unique
    }

    pub fn checks_retry_queue(&self) -> Option<bool> {
        self.checks_retry_queue
    }
}
