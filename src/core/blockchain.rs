// The ledger proper: an ordered, append-only run of sealed blocks.
// Index 0 is always the genesis block; every later block is mined at the
// ledger's fixed difficulty and links to its predecessor by hash.

use crate::core::{Block, CancelToken, MiningOutcome, ProofOfWork};
use crate::error::{LedgerError, Result};
use log::{info, warn};

/// Most leading zero bytes a SHA-256 digest can carry
pub const MAX_DIFFICULTY: u32 = 32;

#[derive(Debug, Clone)]
pub struct Blockchain {
    blocks: Vec<Block>,
    difficulty: u32,
}

impl Blockchain {
    /// A chain holding only a fresh genesis block.
    pub fn new(difficulty: u32) -> Result<Blockchain> {
        let mut blockchain = Blockchain::new_empty(difficulty)?;
        let genesis = Blockchain::create_genesis()?;
        info!("Created genesis block: {}", genesis.get_hash_hex());
        blockchain.blocks.push(genesis);
        Ok(blockchain)
    }

    /// A chain with no blocks at all. Appending to it is a precondition violation.
    pub fn new_empty(difficulty: u32) -> Result<Blockchain> {
        if difficulty > MAX_DIFFICULTY {
            return Err(LedgerError::Config(format!(
                "Difficulty {difficulty} exceeds maximum of {MAX_DIFFICULTY}"
            )));
        }
        Ok(Blockchain {
            blocks: Vec::new(),
            difficulty,
        })
    }

    /// Rebuild a chain from existing blocks, rejecting it unless it verifies.
    pub fn from_blocks(blocks: Vec<Block>, difficulty: u32) -> Result<Blockchain> {
        let mut blockchain = Blockchain::new_empty(difficulty)?;
        blockchain.blocks = blocks;
        blockchain.verify()?;
        Ok(blockchain)
    }

    pub fn create_genesis() -> Result<Block> {
        Block::new_genesis()
    }

    /// Mine `payload` onto the tip. Blocks the caller until a nonce is found.
    pub fn append(&mut self, payload: &str) -> Result<Block> {
        match self.append_cancellable(payload, &CancelToken::new())? {
            MiningOutcome::Sealed(block) => Ok(block),
            MiningOutcome::Cancelled { .. } => Err(LedgerError::PreconditionViolation(
                "Mining was cancelled".to_string(),
            )),
            MiningOutcome::Exhausted => Err(LedgerError::PreconditionViolation(format!(
                "Nonce space exhausted at difficulty {}",
                self.difficulty
            ))),
        }
    }

    /// Mine `payload` onto the tip unless `cancel` fires first.
    ///
    /// Only a sealed block is pushed; on any other outcome the chain is unchanged.
    pub fn append_cancellable(
        &mut self,
        payload: &str,
        cancel: &CancelToken,
    ) -> Result<MiningOutcome> {
        let tip = self.tip().ok_or_else(|| {
            LedgerError::PreconditionViolation(
                "Cannot append to a chain without a genesis block".to_string(),
            )
        })?;

        let candidate =
            Block::new_candidate(tip.get_index() + 1, payload, tip.get_hash().to_vec())?;
        let outcome = ProofOfWork::new_proof_of_work(candidate, self.difficulty).run(cancel);

        if let MiningOutcome::Sealed(block) = &outcome {
            info!(
                "Appended block {} with hash {}",
                block.get_index(),
                block.get_hash_hex()
            );
            self.blocks.push(block.clone());
        }
        Ok(outcome)
    }

    /// Walk the whole chain and report the first broken invariant.
    pub fn verify(&self) -> Result<()> {
        let genesis = self
            .blocks
            .first()
            .ok_or_else(|| LedgerError::InvalidChain("Chain has no genesis block".to_string()))?;

        if genesis.get_index() != 0 || !genesis.get_previous_hash().is_empty() {
            return Err(LedgerError::InvalidChain(
                "Genesis block must have index 0 and an empty previous hash".to_string(),
            ));
        }
        if !genesis.has_consistent_hash() {
            return Err(LedgerError::InvalidChain(
                "Genesis block hash does not match its contents".to_string(),
            ));
        }

        for pair in self.blocks.windows(2) {
            let (previous, current) = (&pair[0], &pair[1]);
            let index = current.get_index();

            if index != previous.get_index() + 1 {
                return Err(LedgerError::InvalidChain(format!(
                    "Block {index} does not follow block {}",
                    previous.get_index()
                )));
            }
            if current.get_previous_hash() != previous.get_hash() {
                return Err(LedgerError::InvalidChain(format!(
                    "Block {index} does not link to the hash of its predecessor"
                )));
            }
            if !current.has_consistent_hash() {
                return Err(LedgerError::InvalidChain(format!(
                    "Block {index} hash does not match its contents"
                )));
            }
            if !current.meets_difficulty(self.difficulty) {
                return Err(LedgerError::InvalidChain(format!(
                    "Block {index} does not meet difficulty {}",
                    self.difficulty
                )));
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> bool {
        match self.verify() {
            Ok(()) => true,
            Err(e) => {
                warn!("Chain validation failed: {e}");
                false
            }
        }
    }

    pub fn tip(&self) -> Option<&Block> {
        self.blocks.last()
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn get_block(&self, index: u64) -> Option<&Block> {
        usize::try_from(index).ok().and_then(|i| self.blocks.get(i))
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    #[cfg(test)]
    pub(crate) fn blocks_mut(&mut self) -> &mut Vec<Block> {
        &mut self.blocks
    }
}
