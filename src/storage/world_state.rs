use crate::error::{LedgerError, Result};
use sled::{Db, Tree};
use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;

const WORLD_STATE_TREE: &str = "world_state";

/// Key-value backend the asset store reads and writes through.
///
/// A `put_state` followed by `get_state` on the same key, with no other writer
/// in between, must return the written bytes.
pub trait WorldState: Send + Sync {
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>>;

    fn put_state(&self, key: &str, value: &[u8]) -> Result<()>;
}

/// ( K -> asset id, V -> encoded record )
#[derive(Debug, Default)]
pub struct MemoryState {
    inner: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryState {
    pub fn new() -> MemoryState {
        MemoryState::default()
    }

    pub fn len(&self) -> usize {
        match self.inner.read() {
            Ok(state) => state.len(),
            Err(_) => {
                log::error!("Failed to acquire read lock on world state");
                0
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl WorldState for MemoryState {
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let state = self
            .inner
            .read()
            .map_err(|_| {
                LedgerError::Storage("Failed to acquire read lock on world state".to_string())
            })?;
        Ok(state.get(key).cloned())
    }

    fn put_state(&self, key: &str, value: &[u8]) -> Result<()> {
        let mut state = self
            .inner
            .write()
            .map_err(|_| {
                LedgerError::Storage("Failed to acquire write lock on world state".to_string())
            })?;
        state.insert(key.to_string(), value.to_vec());
        Ok(())
    }
}

/// World state kept in one sled tree
#[derive(Clone)]
pub struct SledState {
    tree: Tree,
}

impl SledState {
    pub fn open(path: &Path) -> Result<SledState> {
        let db = sled::open(path)
            .map_err(|e| LedgerError::Storage(format!("Failed to open database: {e}")))?;
        SledState::from_db(&db)
    }

    pub fn from_db(db: &Db) -> Result<SledState> {
        let tree = db
            .open_tree(WORLD_STATE_TREE)
            .map_err(|e| LedgerError::Storage(format!("Failed to open world state tree: {e}")))?;
        Ok(SledState { tree })
    }

    pub fn flush(&self) -> Result<()> {
        self.tree
            .flush()
            .map_err(|e| LedgerError::Storage(format!("Failed to flush world state: {e}")))?;
        Ok(())
    }
}

impl WorldState for SledState {
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let value = self
            .tree
            .get(key)
            .map_err(|e| LedgerError::Storage(format!("Failed to read state for {key}: {e}")))?;
        Ok(value.map(|v| v.to_vec()))
    }

    fn put_state(&self, key: &str, value: &[u8]) -> Result<()> {
        self.tree
            .insert(key, value)
            .map_err(|e| LedgerError::Storage(format!("Failed to write state for {key}: {e}")))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_state_put_then_get() {
        let state = MemoryState::new();
        assert_eq!(state.get_state("p1").unwrap(), None);

        state.put_state("p1", b"record").unwrap();
        assert_eq!(state.get_state("p1").unwrap(), Some(b"record".to_vec()));
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn test_memory_state_last_writer_wins() {
        let state = MemoryState::new();
        state.put_state("p1", b"first").unwrap();
        state.put_state("p1", b"second").unwrap();
        assert_eq!(state.get_state("p1").unwrap(), Some(b"second".to_vec()));
    }

    #[test]
    fn test_sled_state_visible_through_shared_db() {
        let dir = tempfile::tempdir().unwrap();
        let db = sled::open(dir.path()).unwrap();

        let writer = SledState::from_db(&db).unwrap();
        writer.put_state("p1", b"record").unwrap();
        writer.flush().unwrap();

        let reader = SledState::from_db(&db).unwrap();
        assert_eq!(reader.get_state("p1").unwrap(), Some(b"record".to_vec()));
        assert_eq!(reader.get_state("p2").unwrap(), None);
    }
}
