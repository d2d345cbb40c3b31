// Asset mutations paired with their audit blocks. The block is mined before
// the world state is touched and saved right after the write, so a search
// that is cancelled or runs dry leaves both state and chain as they were.

use crate::asset::{Asset, AssetStore, AuditEvent};
use crate::core::{Block, Blockchain, CancelToken, MiningOutcome};
use crate::error::{LedgerError, Result};
use crate::storage::{ChainStore, WorldState};
use log::{info, warn};
use std::sync::{Mutex, MutexGuard};

/// What became of an audited mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditOutcome<T> {
    /// State written and its audit block stored
    Recorded { value: T, block: Block },
    /// Mining stopped before a seal; nothing was written
    Cancelled { attempts: u64 },
    /// No nonce met the difficulty; nothing was written
    Exhausted,
}

pub struct AuditedAssetStore<S: WorldState> {
    assets: AssetStore<S>,
    chain_store: ChainStore,
    // held for the whole mine-write-save sequence
    blockchain: Mutex<Blockchain>,
}

impl<S: WorldState> AuditedAssetStore<S> {
    /// Load the audit chain (starting one at `difficulty` if the store is empty).
    ///
    /// A chain store that cannot be read fails here, before any asset is touched.
    pub fn open(
        assets: AssetStore<S>,
        chain_store: ChainStore,
        difficulty: u32,
    ) -> Result<AuditedAssetStore<S>> {
        let blockchain = chain_store.load_or_create(difficulty)?;
        Ok(AuditedAssetStore {
            assets,
            chain_store,
            blockchain: Mutex::new(blockchain),
        })
    }

    pub fn assets(&self) -> &AssetStore<S> {
        &self.assets
    }

    /// Copy of the audit chain as last saved by this store
    pub fn chain(&self) -> Result<Blockchain> {
        Ok(self.lock_chain()?.clone())
    }

    pub fn create(
        &self,
        id: &str,
        description: &str,
        cancel: &CancelToken,
    ) -> Result<AuditOutcome<Asset>> {
        self.record(
            cancel,
            |assets| {
                if assets.exists(id)? {
                    return Err(LedgerError::AlreadyExists(id.to_string()));
                }
                Ok(AuditEvent::Created {
                    asset: Asset::new(id, description),
                })
            },
            |assets| assets.create(id, description),
        )
    }

    pub fn transfer(
        &self,
        id: &str,
        new_owner: &str,
        new_status: &str,
        cancel: &CancelToken,
    ) -> Result<AuditOutcome<Asset>> {
        self.record(
            cancel,
            |assets| {
                let mut asset = assets.read(id)?;
                asset.owner = new_owner.to_string();
                asset.status = new_status.to_string();
                Ok(AuditEvent::Transferred { asset })
            },
            |assets| assets.transfer(id, new_owner, new_status),
        )
    }

    /// Seed `seed` as one audited mutation. Refused outright if any id is taken.
    pub fn init_ledger(&self, seed: &[Asset], cancel: &CancelToken) -> Result<AuditOutcome<()>> {
        self.record(
            cancel,
            |assets| {
                for asset in seed {
                    if assets.exists(&asset.id)? {
                        return Err(LedgerError::AlreadyExists(asset.id.clone()));
                    }
                }
                Ok(AuditEvent::Seeded {
                    ids: seed.iter().map(|asset| asset.id.clone()).collect(),
                })
            },
            |assets| assets.init_ledger(seed),
        )
    }

    // prepare: check preconditions and describe the event, no writes
    // write: apply the mutation once its block is sealed
    fn record<T>(
        &self,
        cancel: &CancelToken,
        prepare: impl FnOnce(&AssetStore<S>) -> Result<AuditEvent>,
        write: impl FnOnce(&AssetStore<S>) -> Result<T>,
    ) -> Result<AuditOutcome<T>> {
        let mut blockchain = self.lock_chain()?;
        let event = prepare(&self.assets)?;

        let mut candidate = blockchain.clone();
        let block = match candidate.append_cancellable(&event.to_payload()?, cancel)? {
            MiningOutcome::Sealed(block) => block,
            MiningOutcome::Cancelled { attempts } => {
                warn!("Audit mining cancelled after {attempts} attempts, asset state untouched");
                return Ok(AuditOutcome::Cancelled { attempts });
            }
            MiningOutcome::Exhausted => {
                warn!("Audit mining exhausted the nonce space, asset state untouched");
                return Ok(AuditOutcome::Exhausted);
            }
        };

        let value = write(&self.assets)?;

        self.chain_store.save_chain(&candidate).map_err(|e| {
            LedgerError::Unaudited(format!("block {} not saved: {e}", block.get_index()))
        })?;
        info!("Audit record stored in block {}", block.get_index());

        *blockchain = candidate;
        Ok(AuditOutcome::Recorded { value, block })
    }

    fn lock_chain(&self) -> Result<MutexGuard<'_, Blockchain>> {
        self.blockchain
            .lock()
            .map_err(|_| LedgerError::Storage("Audit chain lock poisoned".to_string()))
    }
}
