//! Process-wide logging setup shared by the jobguard binaries.

/// Initialize logging with the format named by `JOBGUARD_LOG_FORMAT`.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    tracing::init();
}

/// Subscriber configuration (filters, output format).
pub mod tracing;

pub use crate::tracing::LogFormat;
