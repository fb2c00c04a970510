//! Redis sorted-set retry collection.
//!
//! Members are JSON job payloads scored by retry time. Scans page through the
//! set with `ZRANGE` so large retry sets are never loaded at once.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::instrument;

use super::{RetryEntry, RetrySet, RetrySetError};

/// Default sorted-set key holding parked jobs.
const DEFAULT_RETRY_KEY: &str = "retry";

/// Members fetched per `ZRANGE` round trip.
const PAGE_SIZE: isize = 50;

/// Reader (and test writer) for the queue's retry sorted set.
///
/// Members are whole job payloads as the queue wrote them; only the fields
/// of [`RetryEntry`] are read, and unknown fields are ignored.
#[derive(Debug, Clone)]
pub struct RedisRetrySet {
    client: Arc<redis::Client>,
    key: String,
}

impl RedisRetrySet {
    /// Create a retry set reader.
    ///
    /// * `redis_url` - Redis connection URL (e.g., "redis://localhost:6379")
    /// * `key` - sorted-set key (default: "retry")
    pub fn new(redis_url: impl AsRef<str>, key: Option<String>) -> Result<Self, RetrySetError> {
        let client = redis::Client::open(redis_url.as_ref())
            .map_err(|e| RetrySetError::Connection(e.to_string()))?;
        Ok(Self {
            client: Arc::new(client),
            key: key.unwrap_or_else(|| DEFAULT_RETRY_KEY.to_string()),
        })
    }

    fn connection(&self) -> Result<redis::Connection, RetrySetError> {
        self.client
            .get_connection()
            .map_err(|e| RetrySetError::Connection(e.to_string()))
    }

    /// Park an entry to be retried at `retry_at`.
    pub fn add(&self, entry: &RetryEntry, retry_at: DateTime<Utc>) -> Result<(), RetrySetError> {
        let payload = serde_json::to_string(entry)
            .map_err(|e| RetrySetError::Deserialization(e.to_string()))?;
        let mut conn = self.connection()?;
        let _: i64 = redis::cmd("ZADD")
            .arg(&self.key)
            .arg(retry_at.timestamp_millis() as f64 / 1000.0)
            .arg(payload)
            .query(&mut conn)
            .map_err(|e| RetrySetError::Command(format!("ZADD failed: {e}")))?;
        Ok(())
    }

    pub fn len(&self) -> Result<usize, RetrySetError> {
        let mut conn = self.connection()?;
        redis::cmd("ZCARD")
            .arg(&self.key)
            .query(&mut conn)
            .map_err(|e| RetrySetError::Command(format!("ZCARD failed: {e}")))
    }
}

impl RetrySet for RedisRetrySet {
    #[instrument(skip(self, predicate), fields(key = %self.key), err)]
    fn find(
        &self,
        predicate: &mut dyn FnMut(&RetryEntry) -> bool,
    ) -> Result<Option<RetryEntry>, RetrySetError> {
        let mut conn = self.connection()?;
        let mut start: isize = 0;

        loop {
            let page: Vec<String> = redis::cmd("ZRANGE")
                .arg(&self.key)
                .arg(start)
                .arg(start + PAGE_SIZE - 1)
                .query(&mut conn)
                .map_err(|e| RetrySetError::Command(format!("ZRANGE failed: {e}")))?;

            for member in &page {
                let entry: RetryEntry = serde_json::from_str(member)
                    .map_err(|e| RetrySetError::Deserialization(e.to_string()))?;
                if predicate(&entry) {
                    return Ok(Some(entry));
                }
            }

            if (page.len() as isize) < PAGE_SIZE {
                return Ok(None);
            }
            start += PAGE_SIZE;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobguard_core::{Fingerprint, JobId};

    #[test]
    #[ignore = "requires a running Redis (REDIS_URL)"]
    fn finds_entries_across_pages() {
        let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());
        let key = format!("jobguard_test:retry:{}", JobId::generate());
        let set = RedisRetrySet::new(url, Some(key)).unwrap();
        let fp = Fingerprint::from("unique_jobs:paged");

        for i in 0..120 {
            let entry = RetryEntry::new(Some(fp.clone()), Some(JobId::from(format!("jid-{i}"))));
            set.add(&entry, Utc::now()).unwrap();
        }

        assert_eq!(set.len().unwrap(), 120);
        let found = set
            .find(&mut |e| e.jid.as_ref().map(JobId::as_str) == Some("jid-119"))
            .unwrap();
        assert!(found.is_some());
        assert!(set.find(&mut |e| e.jid.is_none()).unwrap().is_none());
    }
}
