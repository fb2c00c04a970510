use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use jobguard_core::Fingerprint;

/// Claim recorded under a fingerprint.
///
/// Stored as the integers `1` and `2`; anything else reads as no claim.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DedupState {
    /// An identical job is waiting to run now.
    Queued,
    /// An identical job is waiting to run later.
    Scheduled,
}

impl DedupState {
    pub fn as_raw(self) -> i64 {
        match self {
            DedupState::Queued => 1,
            DedupState::Scheduled => 2,
        }
    }

    pub fn from_raw(raw: Option<i64>) -> Option<Self> {
        match raw {
            Some(1) => Some(DedupState::Queued),
            Some(2) => Some(DedupState::Scheduled),
            _ => None,
        }
    }
}

/// Write performed inside a conditional commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    /// Create or overwrite `key` with `value`, expiring after `ttl` (whole seconds).
    SetWithExpiry {
        key: Fingerprint,
        value: i64,
        ttl: Duration,
    },
}

impl WriteOp {
    pub fn set_with_expiry(key: Fingerprint, value: i64, ttl: Duration) -> Self {
        Self::SetWithExpiry { key, value, ttl }
    }
}

/// Result of a conditional commit.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed,
    /// The watched key changed after the watch began; nothing was written.
    Aborted,
}

/// Dedup store failure. Optimistic aborts are not errors; see [`CommitOutcome`].
#[derive(Debug, Error)]
pub enum DedupStoreError {
    #[error("dedup store connection error: {0}")]
    Connection(String),

    #[error("dedup store command error: {0}")]
    Command(String),

    #[error("dedup store lock poisoned")]
    Poisoned,
}

/// Shared key-value store holding dedup records.
///
/// Implementations must make [`WatchedKey::commit_if_unchanged`] atomic with
/// respect to the watch: if the key is written by anyone else between
/// [`watch`](DedupStore::watch) and the commit, the commit aborts.
pub trait DedupStore: Send + Sync {
    type Watch: WatchedKey;

    /// Start watching `key`.
    fn watch(&self, key: &Fingerprint) -> Result<Self::Watch, DedupStoreError>;
}

/// An active watch on one key.
///
/// Dropping a watch without committing leaves the store untouched.
pub trait WatchedKey {
    fn key(&self) -> &Fingerprint;

    /// Current raw value of the watched key.
    fn get(&mut self) -> Result<Option<i64>, DedupStoreError>;

    /// Release the watch without writing.
    fn unwatch(self) -> Result<(), DedupStoreError>;

    /// Apply `ops` atomically if the watched key is unchanged.
    fn commit_if_unchanged(self, ops: Vec<WriteOp>) -> Result<CommitOutcome, DedupStoreError>;
}

impl<S> DedupStore for Arc<S>
where
    S: DedupStore,
{
    type Watch = S::Watch;

    fn watch(&self, key: &Fingerprint) -> Result<Self::Watch, DedupStoreError> {
        (**self).watch(key)
    }
}
