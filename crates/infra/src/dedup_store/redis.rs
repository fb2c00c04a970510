//! Redis-backed dedup store.
//!
//! Each watch takes its own connection: `WATCH`, `GET` and the
//! `MULTI`/`SETEX`/`EXEC` transaction must run on the same connection for
//! Redis to abort the `EXEC` when the key changes. A nil `EXEC` reply is the
//! abort.

use std::sync::Arc;

use redis::Commands;
use tracing::instrument;

use jobguard_core::Fingerprint;

use super::r#trait::{CommitOutcome, DedupStore, DedupStoreError, WatchedKey, WriteOp};

/// Dedup store over a shared Redis instance.
///
/// ## Transactions
///
/// [`watch`](DedupStore::watch) opens a fresh connection and issues `WATCH`.
/// The returned [`RedisWatch`] reads with `GET` and commits with
/// `MULTI`/`SETEX`/`EXEC` on that same connection, so Redis itself detects a
/// concurrent write and replies nil to `EXEC`.
///
/// ## Values
///
/// Values are stored as integers (1 queued, 2 scheduled). Anything that does
/// not parse as an integer reads as 0, i.e. no claim.
#[derive(Debug, Clone)]
pub struct RedisDedupStore {
    client: Arc<redis::Client>,
}

impl RedisDedupStore {
    /// Create a store for `redis_url` (e.g. "redis://localhost:6379").
    pub fn new(redis_url: impl AsRef<str>) -> Result<Self, DedupStoreError> {
        let client = redis::Client::open(redis_url.as_ref())
            .map_err(|e| DedupStoreError::Connection(e.to_string()))?;
        Ok(Self {
            client: Arc::new(client),
        })
    }

    fn connection(&self) -> Result<redis::Connection, DedupStoreError> {
        self.client
            .get_connection()
            .map_err(|e| DedupStoreError::Connection(e.to_string()))
    }

    /// Remaining lifetime of `key` in seconds; `None` when the key is missing
    /// or has no expiry.
    pub fn ttl(&self, key: &Fingerprint) -> Result<Option<i64>, DedupStoreError> {
        let mut conn = self.connection()?;
        let ttl: i64 = conn
            .ttl(key.as_str())
            .map_err(|e| DedupStoreError::Command(format!("TTL failed: {e}")))?;
        Ok((ttl >= 0).then_some(ttl))
    }
}

impl DedupStore for RedisDedupStore {
    type Watch = RedisWatch;

    #[instrument(skip(self), fields(key = %key), err)]
    fn watch(&self, key: &Fingerprint) -> Result<Self::Watch, DedupStoreError> {
        let mut conn = self.connection()?;
        redis::cmd("WATCH")
            .arg(key.as_str())
            .query::<()>(&mut conn)
            .map_err(|e| DedupStoreError::Command(format!("WATCH failed: {e}")))?;

        Ok(RedisWatch {
            conn,
            key: key.clone(),
        })
    }
}

/// Watch held on a dedicated Redis connection.
pub struct RedisWatch {
    conn: redis::Connection,
    key: Fingerprint,
}

impl WatchedKey for RedisWatch {
    fn key(&self) -> &Fingerprint {
        &self.key
    }

    fn get(&mut self) -> Result<Option<i64>, DedupStoreError> {
        let raw: Option<String> = self
            .conn
            .get(self.key.as_str())
            .map_err(|e| DedupStoreError::Command(format!("GET failed: {e}")))?;

        // Non-numeric values read as 0, i.e. no claim.
        Ok(raw.map(|v| v.trim().parse::<i64>().unwrap_or(0)))
    }

    fn unwatch(mut self) -> Result<(), DedupStoreError> {
        redis::cmd("UNWATCH")
            .query::<()>(&mut self.conn)
            .map_err(|e| DedupStoreError::Command(format!("UNWATCH failed: {e}")))
    }

    #[instrument(skip(self, ops), fields(key = %self.key), err)]
    fn commit_if_unchanged(mut self, ops: Vec<WriteOp>) -> Result<CommitOutcome, DedupStoreError> {
        let mut pipe = redis::pipe();
        pipe.atomic();
        for op in &ops {
            match op {
                WriteOp::SetWithExpiry { key, value, ttl } => {
                    pipe.cmd("SETEX")
                        .arg(key.as_str())
                        .arg(ttl.as_secs().max(1))
                        .arg(*value)
                        .ignore();
                }
            }
        }

        let reply: Option<()> = pipe
            .query(&mut self.conn)
            .map_err(|e| DedupStoreError::Command(format!("EXEC failed: {e}")))?;

        Ok(match reply {
            Some(()) => CommitOutcome::Committed,
            None => CommitOutcome::Aborted,
        })
    }
}
