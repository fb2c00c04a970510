use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};

use jobguard_core::{Clock, Fingerprint, SystemClock};

use super::r#trait::{CommitOutcome, DedupStore, DedupStoreError, WatchedKey, WriteOp};

#[derive(Debug, Clone)]
struct Record {
    value: i64,
    expires_at: DateTime<Utc>,
    /// Store-wide write sequence number of the write that produced this record.
    revision: u64,
}

#[derive(Debug, Default)]
struct Inner {
    records: HashMap<Fingerprint, Record>,
    next_revision: u64,
    writes: u64,
}

impl Inner {
    /// Revision a watch observes: the live record's revision, or 0 when the
    /// key is missing or expired.
    fn revision(&self, key: &Fingerprint, now: DateTime<Utc>) -> u64 {
        self.live(key, now).map_or(0, |r| r.revision)
    }

    fn set(&mut self, key: Fingerprint, value: i64, ttl: Duration, now: DateTime<Utc>) {
        // Expired records read as missing, so dropping them is unobservable.
        self.records.retain(|_, r| r.expires_at > now);

        let secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX).min(i64::MAX / 1000);
        let ttl = chrono::Duration::seconds(secs);
        self.next_revision += 1;
        self.writes += 1;
        self.records.insert(
            key,
            Record {
                value,
                expires_at: now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC),
                revision: self.next_revision,
            },
        );
    }

    fn live(&self, key: &Fingerprint, now: DateTime<Utc>) -> Option<&Record> {
        self.records.get(key).filter(|r| r.expires_at > now)
    }
}

/// In-memory dedup store.
///
/// Intended for tests/dev. Handles are cheap to clone and share state, so
/// several "processes" can be simulated against one store.
///
/// ## Optimistic concurrency
///
/// Every write stamps the record with a store-wide revision. A watch
/// remembers the revision of the live record it saw (0 for a missing or
/// expired key) and its commit aborts when that revision has changed, which
/// mirrors Redis `WATCH`/`EXEC`.
///
/// ## Expiry
///
/// Expiry follows the injected [`Clock`]. Expired records read as missing and
/// are dropped on the next write.
#[derive(Clone)]
pub struct InMemoryDedupStore {
    inner: Arc<RwLock<Inner>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryDedupStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner::default())),
            clock,
        }
    }

    /// Unconditional write, as another producer would do it.
    pub fn set_with_expiry(
        &self,
        key: &Fingerprint,
        value: i64,
        ttl: Duration,
    ) -> Result<(), DedupStoreError> {
        let now = self.clock.now();
        let mut inner = self.inner.write().map_err(|_| DedupStoreError::Poisoned)?;
        inner.set(key.clone(), value, ttl, now);
        Ok(())
    }

    /// Live value of `key`, if any.
    pub fn value(&self, key: &Fingerprint) -> Option<i64> {
        let now = self.clock.now();
        let inner = self.inner.read().ok()?;
        inner.live(key, now).map(|r| r.value)
    }

    /// Remaining lifetime of `key`, if it holds a live record.
    pub fn ttl(&self, key: &Fingerprint) -> Option<chrono::Duration> {
        let now = self.clock.now();
        let inner = self.inner.read().ok()?;
        inner.live(key, now).map(|r| r.expires_at - now)
    }

    /// Number of live records.
    pub fn len(&self) -> usize {
        let now = self.clock.now();
        self.inner
            .read()
            .map(|inner| inner.records.values().filter(|r| r.expires_at > now).count())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total writes ever applied.
    pub fn write_count(&self) -> u64 {
        self.inner.read().map(|inner| inner.writes).unwrap_or(0)
    }
}

impl Default for InMemoryDedupStore {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for InMemoryDedupStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InMemoryDedupStore").finish_non_exhaustive()
    }
}

impl DedupStore for InMemoryDedupStore {
    type Watch = InMemoryWatch;

    fn watch(&self, key: &Fingerprint) -> Result<Self::Watch, DedupStoreError> {
        let now = self.clock.now();
        let inner = self.inner.read().map_err(|_| DedupStoreError::Poisoned)?;
        Ok(InMemoryWatch {
            store: self.clone(),
            key: key.clone(),
            revision: inner.revision(key, now),
        })
    }
}

/// Watch on an [`InMemoryDedupStore`] key.
#[derive(Debug)]
pub struct InMemoryWatch {
    store: InMemoryDedupStore,
    key: Fingerprint,
    revision: u64,
}

impl WatchedKey for InMemoryWatch {
    fn key(&self) -> &Fingerprint {
        &self.key
    }

    fn get(&mut self) -> Result<Option<i64>, DedupStoreError> {
        let now = self.store.clock.now();
        let inner = self.store.inner.read().map_err(|_| DedupStoreError::Poisoned)?;
        Ok(inner.live(&self.key, now).map(|r| r.value))
    }

    fn unwatch(self) -> Result<(), DedupStoreError> {
        Ok(())
    }

    fn commit_if_unchanged(self, ops: Vec<WriteOp>) -> Result<CommitOutcome, DedupStoreError> {
        let now = self.store.clock.now();
        let mut inner = self.store.inner.write().map_err(|_| DedupStoreError::Poisoned)?;

        if inner.revision(&self.key, now) != self.revision {
            return Ok(CommitOutcome::Aborted);
        }

        for op in ops {
            match op {
                WriteOp::SetWithExpiry { key, value, ttl } => inner.set(key, value, ttl, now),
            }
        }
        Ok(CommitOutcome::Committed)
    }
}
