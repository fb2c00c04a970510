//! `jobguard-core` — uniqueness building blocks for background jobs.
//!
//! This crate contains the **pure** parts of duplicate suppression: the job
//! request model, fingerprint derivation, per-job-type uniqueness options and
//! the global configuration object. Store access and orchestration live in
//! `jobguard-infra`.

pub mod clock;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod id;
pub mod options;
pub mod request;
pub mod timestamp;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::UniqueJobsConfig;
pub use error::{ConfigError, ConfigResult};
pub use fingerprint::{Fingerprint, FingerprintGenerator, SCHEDULED_SUFFIX};
pub use id::JobId;
pub use options::{
    ArgsFilterFn, ArgsFilterRegistry, ArgsReducer, ResolvedUniqueness, UniqueArgs, UniqueOptions,
    WorkerRegistry,
};
pub use request::JobRequest;
