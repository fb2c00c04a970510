//! Dedup record storage with optimistic transactions.
//!
//! The store offers exactly the primitives the uniqueness protocol needs:
//! watch a key, read it, then either drop the watch or commit a write that
//! only lands if nobody touched the key in between. Mutual exclusion is
//! store-mediated so it holds across processes and machines.

pub mod in_memory;
#[cfg(feature = "redis")]
pub mod redis;
pub mod r#trait;

pub use in_memory::{InMemoryDedupStore, InMemoryWatch};
#[cfg(feature = "redis")]
pub use redis::{RedisDedupStore, RedisWatch};
pub use r#trait::{CommitOutcome, DedupState, DedupStore, DedupStoreError, WatchedKey, WriteOp};
