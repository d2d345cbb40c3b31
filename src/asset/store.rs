// The asset state machine. Records live in a WorldState backend; this type
// only knows how to read, check and overwrite them.

use crate::asset::Asset;
use crate::error::{LedgerError, Result};
use crate::storage::WorldState;
use log::{debug, info};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

pub struct AssetStore<S: WorldState> {
    state: S,
    // one mutex per id in use, so read-modify-write on a key never interleaves;
    // an entry is dropped once no caller holds or waits on it
    key_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl<S: WorldState> AssetStore<S> {
    pub fn new(state: S) -> AssetStore<S> {
        AssetStore {
            state,
            key_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn get_state(&self) -> &S {
        &self.state
    }

    pub fn exists(&self, id: &str) -> Result<bool> {
        Ok(self.state.get_state(id)?.is_some())
    }

    /// Create a manufactured asset. Fails if the id is already taken.
    pub fn create(&self, id: &str, description: &str) -> Result<Asset> {
        self.with_key_lock(id, || {
            if self.exists(id)? {
                return Err(LedgerError::AlreadyExists(id.to_string()));
            }

            let asset = Asset::new(id, description);
            self.put(&asset)?;
            info!("Created asset {id}");
            Ok(asset)
        })
    }

    pub fn read(&self, id: &str) -> Result<Asset> {
        let bytes = self
            .state
            .get_state(id)?
            .ok_or_else(|| LedgerError::NotFound(id.to_string()))?;
        Asset::from_bytes(&bytes)
    }

    /// Hand an asset to `new_owner` with `new_status`. Id and description are kept.
    pub fn transfer(&self, id: &str, new_owner: &str, new_status: &str) -> Result<Asset> {
        self.with_key_lock(id, || {
            let mut asset = self.read(id)?;
            asset.owner = new_owner.to_string();
            asset.status = new_status.to_string();
            self.put(&asset)?;
            info!("Transferred asset {id} to {new_owner} ({new_status})");
            Ok(asset)
        })
    }

    /// Write seed records. Stops at the first id that already exists.
    pub fn init_ledger(&self, seed: &[Asset]) -> Result<()> {
        for asset in seed {
            self.with_key_lock(&asset.id, || {
                if self.exists(&asset.id)? {
                    return Err(LedgerError::AlreadyExists(asset.id.clone()));
                }
                self.put(asset)
            })?;
        }
        info!("Seeded {} assets", seed.len());
        Ok(())
    }

    fn put(&self, asset: &Asset) -> Result<()> {
        let bytes = asset.to_bytes()?;
        debug!("Writing {} bytes for asset {}", bytes.len(), asset.id);
        self.state.put_state(&asset.id, &bytes)
    }

    // Run `f` holding the mutex for `id`, then drop the table entry if unused
    fn with_key_lock<T>(&self, id: &str, f: impl FnOnce() -> Result<T>) -> Result<T> {
        let lock = self.lock_table()?.entry(id.to_string()).or_default().clone();

        let result = match lock.lock() {
            Ok(_guard) => f(),
            Err(_) => Err(LedgerError::Storage(format!("Lock for {id} poisoned"))),
        };

        let mut locks = self.lock_table()?;
        // the table's copy and ours; anything more is another caller on this id
        if Arc::strong_count(&lock) == 2 {
            locks.remove(id);
        }
        result
    }

    fn lock_table(&self) -> Result<MutexGuard<'_, HashMap<String, Arc<Mutex<()>>>>> {
        self.key_locks
            .lock()
            .map_err(|_| LedgerError::Storage("Key lock table poisoned".to_string()))
    }

    #[cfg(test)]
    fn lock_table_len(&self) -> usize {
        self.key_locks.lock().unwrap().len()
    }
}

/// Illustrative seed set for a fresh world state
pub fn default_seed() -> Vec<Asset> {
    vec![
        Asset::new("product1", "Smartphone"),
        Asset::new("product2", "Tablet"),
    ]
}
