//! Deterministic job identity.
//!
//! A fingerprint is `"{prefix}:{sha256(json)}"` over the job type, the queue
//! (unless uniqueness spans all queues) and the reduced arguments. Scheduled
//! requests get [`SCHEDULED_SUFFIX`] so "run later" and "run now" claims live
//! under distinct keys.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sha2::{Digest, Sha256};

use crate::options::{ArgsReducer, ResolvedUniqueness};
use crate::request::JobRequest;

/// Suffix distinguishing scheduled claims.
pub const SCHEDULED_SUFFIX: &str = "_scheduled";

/// Identity string of a job submission; also the dedup record key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_scheduled(&self) -> bool {
        self.0.ends_with(SCHEDULED_SUFFIX)
    }
}

impl core::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Fingerprint {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Fingerprint {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl AsRef<str> for Fingerprint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Serialize)]
struct FingerprintInput<'a> {
    class: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    queue: Option<&'a str>,
    unique_args: Vec<JsonValue>,
}

/// Pure fingerprint derivation.
#[derive(Debug, Clone)]
pub struct FingerprintGenerator {
    key_prefix: String,
}

impl FingerprintGenerator {
    pub fn new(key_prefix: impl Into<String>) -> Self {
        Self {
            key_prefix: key_prefix.into(),
        }
    }

    /// Fingerprint of the unscheduled identity.
    ///
    /// The serialization is serde_json over a fixed field order; object keys
    /// inside arguments come out sorted, so equal values hash equally.
    pub fn fingerprint(
        &self,
        job_type: &str,
        queue: &str,
        args: &[JsonValue],
        reducer: &ArgsReducer,
        cross_queue: bool,
    ) -> Fingerprint {
        let input = FingerprintInput {
            class: job_type,
            queue: (!cross_queue).then_some(queue),
            unique_args: reducer.apply(args),
        };
        // Serializing `Value`s and `&str`s into a string cannot fail.
        let json = serde_json::to_string(&input).unwrap_or_default();
        let digest = Sha256::digest(json.as_bytes());
        Fingerprint(format!("{}:{}", self.key_prefix, hex::encode(digest)))
    }

    /// Fingerprint of a request under its resolved settings, with the
    /// scheduled suffix when the request carries a run time.
    pub fn for_request(&self, request: &JobRequest, resolved: &ResolvedUniqueness) -> Fingerprint {
        let base = self.fingerprint(
            request.job_type(),
            request.queue(),
            request.args(),
            &resolved.args_reducer,
            resolved.unique_on_all_queues,
        );
        if request.is_scheduled() {
            Fingerprint(format!("{}{}", base.0, SCHEDULED_SUFFIX))
        } else {
            base
        }
    }
}
