// Sled-backed persistence for a sealed chain. Blocks are keyed by their
// big-endian index; the tip marker records how many are stored. The
// difficulty lives in the same tree and is written together with block 0.

use crate::core::{Block, Blockchain};
use crate::error::{LedgerError, Result};
use log::info;
use sled::{Db, Tree};
use std::path::Path;

const BLOCKS_TREE: &str = "blocks";
const DIFFICULTY_KEY: &str = "difficulty";
const TIP_INDEX_KEY: &str = "tip_index";

pub struct ChainStore {
    db: Db,
}

impl ChainStore {
    pub fn open(path: &Path) -> Result<ChainStore> {
        let db = sled::open(path)
            .map_err(|e| LedgerError::Storage(format!("Failed to open database: {e}")))?;
        Ok(ChainStore::from_db(db))
    }

    /// Store over an already open database. Several stores may share one `Db`.
    pub fn from_db(db: Db) -> ChainStore {
        ChainStore { db }
    }

    fn blocks_tree(&self) -> Result<Tree> {
        self.db
            .open_tree(BLOCKS_TREE)
            .map_err(|e| LedgerError::Storage(format!("Failed to open blocks tree: {e}")))
    }

    /// Difficulty recorded with the stored genesis block, if any
    pub fn stored_difficulty(&self) -> Result<Option<u32>> {
        let bytes = self
            .blocks_tree()?
            .get(DIFFICULTY_KEY)
            .map_err(|e| LedgerError::Storage(format!("Failed to read difficulty: {e}")))?;

        match bytes {
            Some(bytes) => {
                let raw = <[u8; 4]>::try_from(&bytes[..]).map_err(|_| {
                    LedgerError::Serialization("Stored difficulty is not 4 bytes".to_string())
                })?;
                Ok(Some(u32::from_be_bytes(raw)))
            }
            None => Ok(None),
        }
    }

    // One block plus the tip marker, and the difficulty when given, in one transaction
    fn save_block(&self, tree: &Tree, block: &Block, difficulty: Option<u32>) -> Result<()> {
        let key = block.get_index().to_be_bytes();
        let block_data = block.serialize()?;
        let difficulty = difficulty.map(u32::to_be_bytes);

        tree.transaction(|tx_db| {
            tx_db.insert(&key[..], block_data.as_slice())?;
            tx_db.insert(TIP_INDEX_KEY, &key[..])?;
            if let Some(difficulty) = &difficulty {
                tx_db.insert(DIFFICULTY_KEY, &difficulty[..])?;
            }
            Ok(())
        })
        .map_err(|e: sled::transaction::TransactionError| {
            LedgerError::Storage(format!("Failed to save block {}: {e}", block.get_index()))
        })?;

        Ok(())
    }

    fn read_block(&self, tree: &Tree, index: u64) -> Result<Block> {
        let bytes = tree
            .get(index.to_be_bytes())
            .map_err(|e| LedgerError::Storage(format!("Failed to read block {index}: {e}")))?
            .ok_or_else(|| LedgerError::InvalidChain(format!("Block {index} is missing")))?;
        Block::deserialize(bytes.as_ref())
    }

    /// Persist every block of `blockchain` not yet stored.
    ///
    /// `blockchain` must extend the stored chain: same difficulty, at least as
    /// long, and holding the stored tip block at the same position.
    pub fn save_chain(&self, blockchain: &Blockchain) -> Result<()> {
        let tree = self.blocks_tree()?;
        let stored_len = self.block_count()?;

        if stored_len > 0 {
            if let Some(stored) = self.stored_difficulty()? {
                if stored != blockchain.difficulty() {
                    return Err(LedgerError::PreconditionViolation(format!(
                        "Store holds a chain at difficulty {stored}, not {}",
                        blockchain.difficulty()
                    )));
                }
            }

            let stored_tip = self.read_block(&tree, stored_len as u64 - 1)?;
            match blockchain.blocks().get(stored_len - 1) {
                Some(block) if block.get_hash() == stored_tip.get_hash() => {}
                Some(_) => {
                    return Err(LedgerError::PreconditionViolation(format!(
                        "Chain does not extend the stored chain at block {}",
                        stored_tip.get_index()
                    )));
                }
                None => {
                    return Err(LedgerError::PreconditionViolation(format!(
                        "Chain of {} blocks is behind the {stored_len} stored",
                        blockchain.len()
                    )));
                }
            }
        }

        for (position, block) in blockchain.blocks().iter().enumerate().skip(stored_len) {
            let difficulty = (position == 0).then_some(blockchain.difficulty());
            self.save_block(&tree, block, difficulty)?;
        }
        self.db
            .flush()
            .map_err(|e| LedgerError::Storage(format!("Failed to flush database: {e}")))?;
        Ok(())
    }

    /// Number of stored blocks, read from the tip marker.
    pub fn block_count(&self) -> Result<usize> {
        let tip = self
            .blocks_tree()?
            .get(TIP_INDEX_KEY)
            .map_err(|e| LedgerError::Storage(format!("Failed to read tip index: {e}")))?;

        match tip {
            Some(bytes) => {
                let raw = <[u8; 8]>::try_from(&bytes[..]).map_err(|_| {
                    LedgerError::Serialization("Stored tip index is not 8 bytes".to_string())
                })?;
                usize::try_from(u64::from_be_bytes(raw) + 1)
                    .map_err(|e| LedgerError::Serialization(format!("Tip index overflow: {e}")))
            }
            None => Ok(0),
        }
    }

    /// Load the stored chain and verify it end to end.
    ///
    /// Returns `Ok(None)` when nothing has been stored yet.
    pub fn load(&self) -> Result<Option<Blockchain>> {
        let Some(difficulty) = self.stored_difficulty()? else {
            return Ok(None);
        };

        let count = self.block_count()?;
        let tree = self.blocks_tree()?;
        let mut blocks = Vec::with_capacity(count);
        for index in 0..count as u64 {
            blocks.push(self.read_block(&tree, index)?);
        }

        let blockchain = Blockchain::from_blocks(blocks, difficulty)?;
        info!(
            "Loaded {} blocks at difficulty {difficulty}",
            blockchain.len()
        );
        Ok(Some(blockchain))
    }

    /// Load the stored chain, or start and persist a new one at `difficulty`.
    pub fn load_or_create(&self, difficulty: u32) -> Result<Blockchain> {
        if let Some(blockchain) = self.load()? {
            return Ok(blockchain);
        }
        let blockchain = Blockchain::new(difficulty)?;
        self.save_chain(&blockchain)?;
        Ok(blockchain)
    }

    // Overwrite a stored block in place, bypassing every check
    #[cfg(test)]
    pub(crate) fn overwrite_block(&self, block: &Block) -> Result<()> {
        self.blocks_tree()?
            .insert(&block.get_index().to_be_bytes()[..], block.serialize()?)
            .map_err(|e| LedgerError::Storage(e.to_string()))?;
        Ok(())
    }
}
