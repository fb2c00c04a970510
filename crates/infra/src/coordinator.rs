//! Uniqueness decision protocol.
//!
//! `UniquenessCoordinator::decide` is the single entry point the queuing
//! pipeline calls before admitting a job:
//!
//! ```text
//! request
//!   ↓
//! 1. Resolve options (disabled ⇒ admit, no store access)
//!   ↓
//! 2. Fingerprint
//!   ↓
//! 3. WATCH fingerprint, read claim
//!   ↓
//! 4. Reject if claimed (queued, or scheduled while scheduling again)
//!    unless this is the retried version of a parked job
//!   ↓
//! 5. Reject if a different instance is parked for retry
//!   ↓
//! 6. Conditional SETEX (abort ⇒ reject)
//! ```
//!
//! There is no in-process locking and no internal retry: one optimistic
//! attempt per call. A lost race is reported as [`Admission::Conflict`],
//! which callers treat like a duplicate.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, instrument};

use jobguard_core::{
    Clock, Fingerprint, FingerprintGenerator, JobRequest, ResolvedUniqueness, SystemClock,
    UniqueJobsConfig, UniqueOptions,
};

use crate::dedup_store::{CommitOutcome, DedupState, DedupStore, DedupStoreError, WatchedKey, WriteOp};
use crate::retry::{RetryReconciler, RetrySet, RetrySetError};

/// Outcome of one uniqueness decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// Admit the job. `fingerprint` is `None` when uniqueness is disabled.
    Admitted { fingerprint: Option<Fingerprint> },
    /// An identical job is already waiting to run.
    Duplicate { fingerprint: Fingerprint },
    /// A failed instance of this job is parked for retry and will re-submit itself.
    PendingRetry { fingerprint: Fingerprint },
    /// Another producer claimed the fingerprint between our read and commit.
    Conflict { fingerprint: Fingerprint },
}

impl Admission {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Admission::Admitted { .. })
    }

    pub fn fingerprint(&self) -> Option<&Fingerprint> {
        match self {
            Admission::Admitted { fingerprint } => fingerprint.as_ref(),
            Admission::Duplicate { fingerprint }
            | Admission::PendingRetry { fingerprint }
            | Admission::Conflict { fingerprint } => Some(fingerprint),
        }
    }
}

/// Failure to reach a decision. The submission carries no duplicate
/// suppression guarantee; the caller decides whether to fail or admit.
#[derive(Debug, Error)]
pub enum UniquenessError {
    #[error(transparent)]
    Store(#[from] DedupStoreError),

    #[error(transparent)]
    RetrySet(#[from] RetrySetError),
}

/// Decides whether a job submission may be enqueued.
///
/// The coordinator owns nothing but configuration: the dedup store and the
/// retry collection are shared with every other producer process, and the
/// only coordination between processes is the store's conditional commit.
///
/// ## Decision
///
/// For each submission [`decide`](Self::decide):
///
/// 1. Resolves the effective options (type options, request overrides,
///    global defaults). Disabled uniqueness admits without touching any store.
/// 2. Watches the fingerprint and reads its claim value (1 queued, 2 scheduled).
/// 3. Rejects when the claim blocks this submission, unless the submission is
///    the re-entry of a job parked for retry.
/// 4. With retry checking on, rejects while another instance is parked.
/// 5. Writes the claim with its expiry in a conditional commit; an abort
///    means another producer won and the submission is rejected.
///
/// ## Expiry
///
/// Claims live for the configured expiration. Scheduled claims additionally
/// live until their run time, and never less than one second.
///
/// ## Errors
///
/// Store failures always propagate. Retry collection failures propagate only
/// when retry checking is on; otherwise the collection is never queried.
pub struct UniquenessCoordinator<S, R> {
    store: S,
    retries: RetryReconciler<R>,
    config: UniqueJobsConfig,
    fingerprints: FingerprintGenerator,
    clock: Arc<dyn Clock>,
}

impl<S, R> UniquenessCoordinator<S, R>
where
    S: DedupStore,
    R: RetrySet,
{
    pub fn new(store: S, retries: R, config: UniqueJobsConfig) -> Self {
        let fingerprints = FingerprintGenerator::new(config.key_prefix.clone());
        Self {
            store,
            retries: RetryReconciler::new(retries),
            config,
            fingerprints,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &UniqueJobsConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Fingerprint `request` would be claimed under, or `None` when
    /// uniqueness is disabled for it.
    pub fn fingerprint_for(&self, request: &JobRequest, options: &UniqueOptions) -> Option<Fingerprint> {
        options
            .resolve(request, &self.config)
            .map(|resolved| self.fingerprints.for_request(request, &resolved))
    }

    /// Decide whether to admit `request`.
    #[instrument(
        skip(self, request, options),
        fields(job_type = %request.job_type(), queue = %request.queue()),
        err
    )]
    pub fn decide(
        &self,
        request: &JobRequest,
        options: &UniqueOptions,
    ) -> Result<Admission, UniquenessError> {
        let Some(resolved) = options.resolve(request, &self.config) else {
            return Ok(Admission::Admitted { fingerprint: None });
        };

        let fingerprint = self.fingerprints.for_request(request, &resolved);
        self.claim(request, &resolved, fingerprint)
    }

    fn claim(
        &self,
        request: &JobRequest,
        resolved: &ResolvedUniqueness,
        fingerprint: Fingerprint,
    ) -> Result<Admission, UniquenessError> {
        let mut watch = self.store.watch(&fingerprint)?;
        let state = DedupState::from_raw(watch.get()?);

        let blocked = match state {
            Some(DedupState::Queued) => true,
            Some(DedupState::Scheduled) => request.is_scheduled(),
            None => false,
        };

        // Computed at most once, and only when a branch needs it.
        let mut retried: Option<bool> = None;

        if blocked {
            let is_retried = self.is_retried_version(request, resolved, &fingerprint)?;
            retried = Some(is_retried);
            if !is_retried {
                watch.unwatch()?;
                debug!(fingerprint = %fingerprint, state = ?state, "duplicate job rejected");
                return Ok(Admission::Duplicate { fingerprint });
            }
        }

        if resolved.checks_retry_queue && self.retries.has_pending_retry(&fingerprint)? {
            let is_retried = match retried {
                Some(r) => r,
                None => self.is_retried_version(request, resolved, &fingerprint)?,
            };
            if !is_retried {
                watch.unwatch()?;
                debug!(fingerprint = %fingerprint, "job rejected: failed instance parked for retry");
                return Ok(Admission::PendingRetry { fingerprint });
            }
        }

        let value = if request.is_scheduled() {
            DedupState::Scheduled
        } else {
            DedupState::Queued
        };
        let ttl = self.record_ttl(request, resolved);

        let outcome = watch.commit_if_unchanged(vec![WriteOp::set_with_expiry(
            fingerprint.clone(),
            value.as_raw(),
            ttl,
        )])?;

        match outcome {
            CommitOutcome::Committed => {
                debug!(fingerprint = %fingerprint, ttl_secs = ttl.as_secs(), "job admitted");
                Ok(Admission::Admitted {
                    fingerprint: Some(fingerprint),
                })
            }
            CommitOutcome::Aborted => {
                info!(fingerprint = %fingerprint, "concurrent claim won the race; job rejected");
                Ok(Admission::Conflict { fingerprint })
            }
        }
    }

    /// Whether `request` is the re-entry of a job parked for retry: a parked
    /// entry with the same fingerprint and job id, or the request's own
    /// failure marker. Always false when retry checking is off.
    fn is_retried_version(
        &self,
        request: &JobRequest,
        resolved: &ResolvedUniqueness,
        fingerprint: &Fingerprint,
    ) -> Result<bool, RetrySetError> {
        if !resolved.checks_retry_queue {
            return Ok(false);
        }
        if self.retries.find_retry_for(fingerprint, request.jid())?.is_some() {
            return Ok(true);
        }
        Ok(request.has_failed())
    }

    /// Expiration, extended by the time left until a scheduled run.
    fn record_ttl(&self, request: &JobRequest, resolved: &ResolvedUniqueness) -> Duration {
        let base = i64::try_from(resolved.expiration.as_secs()).unwrap_or(i64::MAX);
        let secs = match request.at() {
            Some(at) => base.saturating_add((at - self.clock.now()).num_seconds()),
            None => base,
        };
        Duration::from_secs(secs.max(1) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dedup_store::InMemoryDedupStore;
    use crate::retry::{InMemoryRetrySet, RetryEntry};
    use chrono::Utc;
    use jobguard_core::{ArgsFilterRegistry, JobId, ManualClock};
    use proptest::prelude::*;
    use serde_json::json;

    type Coordinator = UniquenessCoordinator<InMemoryDedupStore, Arc<InMemoryRetrySet>>;

    fn setup(config: UniqueJobsConfig) -> (Coordinator, InMemoryDedupStore, Arc<InMemoryRetrySet>, Arc<ManualClock>) {
        let clock = ManualClock::arc(Utc::now());
        let store = InMemoryDedupStore::with_clock(clock.clone());
        let retries = Arc::new(InMemoryRetrySet::new());
        let coordinator =
            UniquenessCoordinator::new(store.clone(), retries.clone(), config).with_clock(clock.clone());
        (coordinator, store, retries, clock)
    }

    fn request() -> JobRequest {
        JobRequest::new("QueueWorker", "customqueue", vec![json!(1), json!(2)])
    }

    fn retry_checking() -> UniqueOptions {
        UniqueOptions::builder()
            .unique(true)
            .checks_retry_queue(true)
            .build("QueueWorker", &ArgsFilterRegistry::new())
            .unwrap()
    }

    #[test]
    fn first_submission_admitted_then_duplicates_rejected() {
        let (coordinator, store, _, _) = setup(UniqueJobsConfig::default());
        let options = UniqueOptions::enabled();

        let first = coordinator.decide(&request(), &options).unwrap();
        assert!(first.is_admitted());
        let fp = first.fingerprint().cloned().unwrap();
        assert_eq!(store.value(&fp), Some(1));

        let second = coordinator.decide(&request(), &options).unwrap();
        assert_eq!(second, Admission::Duplicate { fingerprint: fp });
        assert_eq!(store.write_count(), 1);
    }

    #[test]
    fn disabled_uniqueness_never_touches_store() {
        let (coordinator, store, _, _) = setup(UniqueJobsConfig::default());

        for _ in 0..5 {
            let admission = coordinator.decide(&request(), &UniqueOptions::default()).unwrap();
            assert_eq!(admission, Admission::Admitted { fingerprint: None });
        }
        assert_eq!(store.write_count(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn request_flag_enables_uniqueness() {
        let (coordinator, _, _, _) = setup(UniqueJobsConfig::default());
        let req = request().with_unique(true);

        assert!(coordinator.decide(&req, &UniqueOptions::default()).unwrap().is_admitted());
        assert!(!coordinator.decide(&req, &UniqueOptions::default()).unwrap().is_admitted());
    }

    #[test]
    fn scheduled_claim_does_not_block_immediate_run() {
        let (coordinator, store, _, clock) = setup(UniqueJobsConfig::default());
        let options = UniqueOptions::enabled();
        let scheduled = request().scheduled_in(clock.now(), chrono::Duration::hours(1));

        let first = coordinator.decide(&scheduled, &options).unwrap();
        assert!(first.is_admitted());
        assert_eq!(store.value(first.fingerprint().unwrap()), Some(2));

        let again = coordinator.decide(&scheduled, &options).unwrap();
        assert!(matches!(again, Admission::Duplicate { .. }));

        let immediate = coordinator.decide(&scheduled.into_immediate(), &options).unwrap();
        assert!(immediate.is_admitted());
        assert_eq!(store.value(immediate.fingerprint().unwrap()), Some(1));
    }

    #[test]
    fn scheduled_value_does_not_block_immediate_under_same_key() {
        let (coordinator, store, _, _) = setup(UniqueJobsConfig::default());
        let options = UniqueOptions::enabled();
        let fp = coordinator.fingerprint_for(&request(), &options).unwrap();
        store
            .set_with_expiry(&fp, DedupState::Scheduled.as_raw(), Duration::from_secs(60))
            .unwrap();

        let admission = coordinator.decide(&request(), &options).unwrap();
        assert!(admission.is_admitted());
        assert_eq!(store.value(&fp), Some(1));
    }

    #[test]
    fn queued_ttl_is_configured_expiration() {
        let (coordinator, store, _, _) = setup(UniqueJobsConfig::default());
        let options = UniqueOptions::builder()
            .unique(true)
            .expiration(Duration::from_secs(3600))
            .build("QueueWorker", &ArgsFilterRegistry::new())
            .unwrap();

        let fp = coordinator.decide(&request(), &options).unwrap().fingerprint().cloned().unwrap();
        assert_eq!(store.ttl(&fp), Some(chrono::Duration::seconds(3600)));
    }

    #[test]
    fn scheduled_ttl_extends_until_run_time() {
        let config = UniqueJobsConfig::default();
        let expiration = config.default_expiration.as_secs() as i64;
        let (coordinator, store, _, clock) = setup(config);
        let req = request().scheduled_in(clock.now(), chrono::Duration::minutes(15));

        let fp = coordinator
            .decide(&req, &UniqueOptions::enabled())
            .unwrap()
            .fingerprint()
            .cloned()
            .unwrap();

        let ttl = store.ttl(&fp).unwrap().num_seconds();
        assert!((ttl - (expiration + 15 * 60)).abs() <= 2);
    }

    #[test]
    fn past_schedule_still_gets_positive_ttl() {
        let (coordinator, store, _, clock) = setup(
            UniqueJobsConfig::default().with_default_expiration(Duration::from_secs(10)),
        );
        let req = request().scheduled_at(clock.now() - chrono::Duration::hours(1));

        let fp = coordinator
            .decide(&req, &UniqueOptions::enabled())
            .unwrap()
            .fingerprint()
            .cloned()
            .unwrap();
        assert_eq!(store.ttl(&fp), Some(chrono::Duration::seconds(1)));
    }

    #[test]
    fn expired_record_no_longer_blocks() {
        let (coordinator, _, _, clock) = setup(
            UniqueJobsConfig::default().with_default_expiration(Duration::from_secs(60)),
        );
        let options = UniqueOptions::enabled();

        assert!(coordinator.decide(&request(), &options).unwrap().is_admitted());
        clock.advance(chrono::Duration::seconds(61));
        assert!(coordinator.decide(&request(), &options).unwrap().is_admitted());
    }

    #[test]
    fn parked_retry_blocks_new_submissions() {
        let (coordinator, store, retries, _) = setup(UniqueJobsConfig::default());
        let options = retry_checking();
        let fp = coordinator.fingerprint_for(&request(), &options).unwrap();
        retries
            .add(RetryEntry::new(Some(fp.clone()), Some(JobId::from("asdf1234"))))
            .unwrap();

        let admission = coordinator
            .decide(&request().with_jid("fresh"), &options)
            .unwrap();
        assert_eq!(admission, Admission::PendingRetry { fingerprint: fp });
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn retry_reentry_bypasses_existing_claim() {
        let (coordinator, _, retries, _) = setup(UniqueJobsConfig::default());
        let options = retry_checking();
        let req = request().with_jid("asdf1234");
        assert!(coordinator.decide(&req, &options).unwrap().is_admitted());

        let fp = coordinator.fingerprint_for(&req, &options).unwrap();
        retries
            .add(RetryEntry::new(Some(fp), Some(JobId::from("asdf1234"))))
            .unwrap();

        assert!(coordinator.decide(&req, &options).unwrap().is_admitted());
        let other = coordinator.decide(&request().with_jid("other"), &options).unwrap();
        assert!(matches!(other, Admission::Duplicate { .. }));
    }

    #[test]
    fn failure_marker_counts_as_retried_version() {
        let (coordinator, _, _, clock) = setup(UniqueJobsConfig::default());
        let options = retry_checking();
        assert!(coordinator.decide(&request().with_jid("a"), &options).unwrap().is_admitted());

        let resubmitted = request().with_jid("a").with_failed_at(clock.now());
        assert!(coordinator.decide(&resubmitted, &options).unwrap().is_admitted());
    }

    #[test]
    fn failure_marker_ignored_when_retry_checking_off() {
        let (coordinator, _, retries, clock) = setup(UniqueJobsConfig::default());
        let options = UniqueOptions::enabled();
        let fp = coordinator.fingerprint_for(&request(), &options).unwrap();
        retries
            .add(RetryEntry::new(Some(fp), Some(JobId::from("a"))))
            .unwrap();

        assert!(coordinator.decide(&request().with_jid("b"), &options).unwrap().is_admitted());
        let resubmitted = request().with_jid("a").with_failed_at(clock.now());
        assert!(matches!(
            coordinator.decide(&resubmitted, &options).unwrap(),
            Admission::Duplicate { .. }
        ));
    }

    /// Store whose reads are immediately followed by another producer's claim.
    struct RacingStore(InMemoryDedupStore);

    struct RacingWatch {
        inner: crate::dedup_store::InMemoryWatch,
        store: InMemoryDedupStore,
    }

    impl DedupStore for RacingStore {
        type Watch = RacingWatch;

        fn watch(&self, key: &Fingerprint) -> Result<Self::Watch, DedupStoreError> {
            Ok(RacingWatch {
                inner: self.0.watch(key)?,
                store: self.0.clone(),
            })
        }
    }

    impl WatchedKey for RacingWatch {
        fn key(&self) -> &Fingerprint {
            self.inner.key()
        }

        fn get(&mut self) -> Result<Option<i64>, DedupStoreError> {
            let value = self.inner.get()?;
            let key = self.inner.key().clone();
            self.store.set_with_expiry(&key, 1, Duration::from_secs(60))?;
            Ok(value)
        }

        fn unwatch(self) -> Result<(), DedupStoreError> {
            self.inner.unwatch()
        }

        fn commit_if_unchanged(self, ops: Vec<WriteOp>) -> Result<CommitOutcome, DedupStoreError> {
            self.inner.commit_if_unchanged(ops)
        }
    }

    #[test]
    fn lost_race_is_a_conflict() {
        let store = InMemoryDedupStore::new();
        let coordinator = UniquenessCoordinator::new(
            RacingStore(store.clone()),
            Arc::new(InMemoryRetrySet::new()),
            UniqueJobsConfig::default(),
        );

        let admission = coordinator.decide(&request(), &UniqueOptions::enabled()).unwrap();
        assert!(matches!(admission, Admission::Conflict { .. }));
        assert!(!admission.is_admitted());
        // Only the racing producer's write landed.
        assert_eq!(store.write_count(), 1);
    }

    #[test]
    fn concurrent_producers_admit_exactly_once() {
        let (coordinator, _, _, _) = setup(UniqueJobsConfig::default());
        let coordinator = Arc::new(coordinator);
        let options = UniqueOptions::enabled();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let coordinator = coordinator.clone();
                let options = options.clone();
                std::thread::spawn(move || coordinator.decide(&request(), &options).unwrap())
            })
            .collect();

        let admitted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(Admission::is_admitted)
            .count();
        assert_eq!(admitted, 1);
    }

    /// Store whose connection is gone; fails at `watch` or at `get`.
    struct FailingStore {
        fail_on_get: bool,
    }

    struct FailingWatch {
        key: Fingerprint,
    }

    impl DedupStore for FailingStore {
        type Watch = FailingWatch;

        fn watch(&self, key: &Fingerprint) -> Result<Self::Watch, DedupStoreError> {
            if self.fail_on_get {
                Ok(FailingWatch { key: key.clone() })
            } else {
                Err(DedupStoreError::Connection("connection refused".to_string()))
            }
        }
    }

    impl WatchedKey for FailingWatch {
        fn key(&self) -> &Fingerprint {
            &self.key
        }

        fn get(&mut self) -> Result<Option<i64>, DedupStoreError> {
            Err(DedupStoreError::Connection("connection reset".to_string()))
        }

        fn unwatch(self) -> Result<(), DedupStoreError> {
            Ok(())
        }

        fn commit_if_unchanged(self, _ops: Vec<WriteOp>) -> Result<CommitOutcome, DedupStoreError> {
            Err(DedupStoreError::Connection("connection reset".to_string()))
        }
    }

    /// Retry set that counts scans and optionally fails them.
    #[derive(Default)]
    struct CountingRetrySet {
        fail: bool,
        scans: std::sync::atomic::AtomicUsize,
    }

    impl CountingRetrySet {
        fn scans(&self) -> usize {
            self.scans.load(std::sync::atomic::Ordering::SeqCst)
        }
    }

    impl RetrySet for CountingRetrySet {
        fn find(
            &self,
            _predicate: &mut dyn FnMut(&RetryEntry) -> bool,
        ) -> Result<Option<RetryEntry>, RetrySetError> {
            self.scans.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            if self.fail {
                Err(RetrySetError::Connection("connection refused".to_string()))
            } else {
                Ok(None)
            }
        }
    }

    #[test]
    fn store_failures_propagate() {
        for fail_on_get in [false, true] {
            let coordinator = UniquenessCoordinator::new(
                FailingStore { fail_on_get },
                Arc::new(InMemoryRetrySet::new()),
                UniqueJobsConfig::default(),
            );
            let err = coordinator
                .decide(&request(), &UniqueOptions::enabled())
                .unwrap_err();
            assert!(matches!(err, UniquenessError::Store(DedupStoreError::Connection(_))));
        }
    }

    #[test]
    fn disabled_uniqueness_skips_a_broken_store() {
        let coordinator = UniquenessCoordinator::new(
            FailingStore { fail_on_get: false },
            Arc::new(InMemoryRetrySet::new()),
            UniqueJobsConfig::default(),
        );
        let admission = coordinator.decide(&request(), &UniqueOptions::default()).unwrap();
        assert_eq!(admission, Admission::Admitted { fingerprint: None });
    }

    #[test]
    fn retry_set_failures_propagate_when_checking() {
        let retries = Arc::new(CountingRetrySet {
            fail: true,
            ..Default::default()
        });
        let store = InMemoryDedupStore::new();
        let coordinator =
            UniquenessCoordinator::new(store.clone(), retries.clone(), UniqueJobsConfig::default());

        let err = coordinator.decide(&request(), &retry_checking()).unwrap_err();
        assert!(matches!(err, UniquenessError::RetrySet(RetrySetError::Connection(_))));
        assert!(retries.scans() >= 1);
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn retry_set_untouched_when_checking_off() {
        let retries = Arc::new(CountingRetrySet {
            fail: true,
            ..Default::default()
        });
        let coordinator = UniquenessCoordinator::new(
            InMemoryDedupStore::new(),
            retries.clone(),
            UniqueJobsConfig::default(),
        );
        let options = UniqueOptions::enabled();

        // Fresh claim, then a duplicate: neither path may scan the retry set.
        assert!(coordinator.decide(&request(), &options).unwrap().is_admitted());
        assert!(matches!(
            coordinator.decide(&request(), &options).unwrap(),
            Admission::Duplicate { .. }
        ));
        assert_eq!(retries.scans(), 0);
    }

    #[test]
    fn retry_scans_happen_only_with_checking_on() {
        let retries = Arc::new(CountingRetrySet::default());
        let coordinator = UniquenessCoordinator::new(
            InMemoryDedupStore::new(),
            retries.clone(),
            UniqueJobsConfig::default(),
        );

        assert!(coordinator.decide(&request(), &retry_checking()).unwrap().is_admitted());
        assert_eq!(retries.scans(), 1);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 64,
            ..ProptestConfig::default()
        })]

        /// Property: N submissions of one fingerprint admit exactly one.
        #[test]
        fn idempotent_admission(n in 1usize..40) {
            let (coordinator, _, _, _) = setup(UniqueJobsConfig::default());
            let options = UniqueOptions::enabled();
            let admitted = (0..n)
                .filter(|_| coordinator.decide(&request(), &options).unwrap().is_admitted())
                .count();
            prop_assert_eq!(admitted, 1);
        }
    }
}
