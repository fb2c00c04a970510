//! Submit one job request against the Redis dedup store and print the
//! admission outcome.
//!
//! Reads `{"request": {...}, "options": {...}}` from stdin. Useful for
//! checking what a producer would do with a payload without enqueuing it.

use std::io::Read;
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;
use serde_json::json;

use jobguard_core::{ArgsFilterRegistry, JobRequest, UniqueOptions};
use jobguard_infra::coordinator::{Admission, UniquenessCoordinator};
use jobguard_infra::dedup_store::RedisDedupStore;
use jobguard_infra::retry::RedisRetrySet;

#[derive(Debug, Deserialize)]
struct CheckInput {
    request: JobRequest,
    #[serde(default)]
    options: OptionsInput,
}

#[derive(Debug, Default, Deserialize)]
struct OptionsInput {
    unique: Option<bool>,
    expiration_secs: Option<u64>,
    #[serde(default)]
    unique_on_all_queues: bool,
    checks_retry_queue: Option<bool>,
}

impl OptionsInput {
    fn build(self, job_type: &str) -> anyhow::Result<UniqueOptions> {
        let mut builder = UniqueOptions::builder().unique_on_all_queues(self.unique_on_all_queues);
        if let Some(unique) = self.unique {
            builder = builder.unique(unique);
        }
        if let Some(secs) = self.expiration_secs {
            builder = builder.expiration(Duration::from_secs(secs));
        }
        if let Some(checks) = self.checks_retry_queue {
            builder = builder.checks_retry_queue(checks);
        }
        builder
            .build(job_type, &ArgsFilterRegistry::new())
            .context("invalid uniqueness options")
    }
}

fn main() -> anyhow::Result<()> {
    jobguard_observability::init();

    let config = jobguard_infra::config::from_env();
    let redis_url = jobguard_infra::config::redis_url();

    let mut raw = String::new();
    std::io::stdin()
        .read_to_string(&mut raw)
        .context("failed to read stdin")?;
    let input: CheckInput = serde_json::from_str(&raw).context("invalid check input")?;
    let options = input.options.build(input.request.job_type())?;

    let store = RedisDedupStore::new(&redis_url).context("failed to open dedup store")?;
    let retries = RedisRetrySet::new(&redis_url, None).context("failed to open retry set")?;
    let coordinator = UniquenessCoordinator::new(store, retries, config);

    tracing::info!(redis_url = %redis_url, job_type = %input.request.job_type(), "checking job");

    let admission = coordinator.decide(&input.request, &options)?;
    let outcome = match &admission {
        Admission::Admitted { .. } => "admitted",
        Admission::Duplicate { .. } => "duplicate",
        Admission::PendingRetry { .. } => "pending_retry",
        Admission::Conflict { .. } => "conflict",
    };
    let report = json!({
        "outcome": outcome,
        "fingerprint": admission.fingerprint().map(|fp| fp.as_str()),
    });
    println!("{report}");

    Ok(())
}
