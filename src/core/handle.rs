use crate::core::{Block, Blockchain, CancelToken, MiningOutcome};
use crate::error::{LedgerError, Result};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Shared, cloneable handle to one ledger instance.
///
/// Appends take the write lock for the whole read-tip, mine, push sequence,
/// so concurrent callers are serialised and can never link two blocks to the
/// same tip. Readers and validators share the read lock.
#[derive(Debug, Clone)]
pub struct LedgerHandle {
    inner: Arc<RwLock<Blockchain>>,
}

impl LedgerHandle {
    pub fn new(blockchain: Blockchain) -> LedgerHandle {
        LedgerHandle {
            inner: Arc::new(RwLock::new(blockchain)),
        }
    }

    pub fn append(&self, payload: &str) -> Result<Block> {
        self.write()?.append(payload)
    }

    pub fn append_cancellable(&self, payload: &str, cancel: &CancelToken) -> Result<MiningOutcome> {
        self.write()?.append_cancellable(payload, cancel)
    }

    pub fn validate(&self) -> Result<bool> {
        Ok(self.read()?.validate())
    }

    pub fn tip(&self) -> Result<Option<Block>> {
        Ok(self.read()?.tip().cloned())
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }

    /// Copy of the current block sequence
    pub fn snapshot(&self) -> Result<Vec<Block>> {
        Ok(self.read()?.blocks().to_vec())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Blockchain>> {
        self.inner
            .read()
            .map_err(|_| LedgerError::Storage("Ledger lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Blockchain>> {
        self.inner
            .write()
            .map_err(|_| LedgerError::Storage("Ledger lock poisoned".to_string()))
    }
}
