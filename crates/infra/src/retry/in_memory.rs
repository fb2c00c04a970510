use std::sync::RwLock;

use jobguard_core::JobId;

use super::{RetryEntry, RetrySet, RetrySetError};

/// In-memory retry collection for tests/dev.
///
/// Entries keep insertion order, which stands in for retry-time order.
#[derive(Debug, Default)]
pub struct InMemoryRetrySet {
    entries: RwLock<Vec<RetryEntry>>,
}

impl InMemoryRetrySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, entry: RetryEntry) -> Result<(), RetrySetError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| RetrySetError::Command("lock poisoned".to_string()))?;
        entries.push(entry);
        Ok(())
    }

    /// Remove and return the first entry for `jid`.
    pub fn remove(&self, jid: &JobId) -> Result<Option<RetryEntry>, RetrySetError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| RetrySetError::Command("lock poisoned".to_string()))?;
        let position = entries.iter().position(|e| e.jid.as_ref() == Some(jid));
        Ok(position.map(|i| entries.remove(i)))
    }

    /// Remove and return every entry.
    pub fn drain(&self) -> Result<Vec<RetryEntry>, RetrySetError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| RetrySetError::Command("lock poisoned".to_string()))?;
        Ok(std::mem::take(&mut *entries))
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RetrySet for InMemoryRetrySet {
    fn find(
        &self,
        predicate: &mut dyn FnMut(&RetryEntry) -> bool,
    ) -> Result<Option<RetryEntry>, RetrySetError> {
        let entries = self
            .entries
            .read()
            .map_err(|_| RetrySetError::Command("lock poisoned".to_string()))?;
        Ok(entries.iter().find(|e| predicate(e)).cloned())
    }
}
