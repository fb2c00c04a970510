//! Infrastructure for job uniqueness: dedup store adapters, retry-set
//! reconciliation, the decision coordinator and queuing-pipeline integration.

pub mod client;
pub mod config;
pub mod coordinator;
pub mod dedup_store;
pub mod queue;
pub mod retry;


pub use client::{ClientError, UniqueJobsClient};
pub use coordinator::{Admission, UniquenessCoordinator, UniquenessError};
