//! Test utilities for ledger testing

use crate::asset::{Asset, AssetStore};
use crate::core::{Block, Blockchain, CancelToken, ProofOfWork};
use crate::error::{LedgerError, Result};
use crate::storage::{ChainStore, MemoryState};
use tempfile::TempDir;

/// Test configuration for ledger testing
pub struct TestConfig {
    pub difficulty: u32,
    pub blocks: usize,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            difficulty: 1, // Easy difficulty for fast testing
            blocks: 3,
        }
    }
}

/// Create a temporary directory for testing
pub fn create_temp_dir() -> Result<TempDir> {
    tempfile::tempdir().map_err(|e| LedgerError::Io(e.to_string()))
}

/// Create a chain store in a fresh temporary directory
pub fn create_test_chain_store() -> Result<(ChainStore, TempDir)> {
    let temp_dir = create_temp_dir()?;
    let store = ChainStore::open(&temp_dir.path().join("test_chain"))?;
    Ok((store, temp_dir))
}

/// Genesis plus `config.blocks` mined blocks
pub fn create_test_ledger(config: &TestConfig) -> Result<Blockchain> {
    let mut blockchain = Blockchain::new(config.difficulty)?;
    for i in 0..config.blocks {
        blockchain.append(&format!("test payload {i}"))?;
    }
    Ok(blockchain)
}

/// In-memory asset store pre-loaded with `count` assets
pub fn create_test_asset_store(count: usize) -> Result<AssetStore<MemoryState>> {
    let store = AssetStore::new(MemoryState::new());
    let seed: Vec<Asset> = (0..count)
        .map(|i| Asset::new(&format!("product{i}"), &format!("Test item {i}")))
        .collect();
    store.init_ledger(&seed)?;
    Ok(store)
}

/// Mine `fork_length` blocks that branch off the block at `fork_point`
pub fn create_fork_blocks(
    blockchain: &Blockchain,
    fork_point: u64,
    fork_length: usize,
) -> Result<Vec<Block>> {
    let base = blockchain.get_block(fork_point).ok_or_else(|| {
        LedgerError::PreconditionViolation(format!("No block at index {fork_point}"))
    })?;

    let mut fork_blocks = Vec::new();
    let mut prev_hash = base.get_hash().to_vec();
    for i in 0..fork_length as u64 {
        let candidate = Block::new_candidate(fork_point + i + 1, &format!("fork {i}"), prev_hash)?;
        let block = ProofOfWork::new_proof_of_work(candidate, blockchain.difficulty())
            .run(&CancelToken::new())
            .into_block()
            .ok_or_else(|| LedgerError::PreconditionViolation("Fork mining stopped".to_string()))?;

        prev_hash = block.get_hash().to_vec();
        fork_blocks.push(block);
    }

    Ok(fork_blocks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_test_ledger() {
        let blockchain = create_test_ledger(&TestConfig::default()).unwrap();
        assert_eq!(blockchain.len(), 4);
        assert!(blockchain.validate());
    }

    #[test]
    fn test_create_test_chain_store() {
        let (store, _temp_dir) = create_test_chain_store().unwrap();
        let blockchain = store.load_or_create(0).unwrap();
        assert_eq!(blockchain.len(), 1);
    }

    #[test]
    fn test_create_test_asset_store() {
        let store = create_test_asset_store(3).unwrap();
        assert!(store.exists("product2").unwrap());
        assert!(!store.exists("product3").unwrap());
    }

    #[test]
    fn test_fork_blocks_cannot_extend_original_tip() {
        let blockchain = create_test_ledger(&TestConfig::default()).unwrap();
        let fork = create_fork_blocks(&blockchain, 1, 2).unwrap();

        let mut spliced = blockchain.blocks().to_vec();
        spliced.extend(fork.clone());
        assert!(matches!(
            Blockchain::from_blocks(spliced, blockchain.difficulty()),
            Err(LedgerError::InvalidChain(_))
        ));

        // the fork on its own base is a consistent chain
        let mut branch = blockchain.blocks()[..2].to_vec();
        branch.extend(fork);
        assert!(Blockchain::from_blocks(branch, blockchain.difficulty()).is_ok());
    }
}
