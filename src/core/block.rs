use crate::core::hasher::{calculate_hash, meets_difficulty};
use crate::error::Result;
use crate::utils::{current_timestamp, deserialize, serialize};
use data_encoding::HEXLOWER;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Payload carried by every genesis block
pub const GENESIS_PAYLOAD: &str = "Genesis Block";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub struct Block {
    index: u64,
    timestamp: String,
    payload: String,
    previous_hash: Vec<u8>,
    nonce: u64,
    hash: Vec<u8>, // empty until sealed
}

impl Block {
    /// Build an unsealed candidate that links to `previous_hash`.
    ///
    /// The nonce starts at zero and the hash stays empty until a
    /// [`ProofOfWork`](crate::core::ProofOfWork) seals the block.
    pub fn new_candidate(index: u64, payload: &str, previous_hash: Vec<u8>) -> Result<Block> {
        Ok(Block {
            index,
            timestamp: current_timestamp()?,
            payload: payload.to_string(),
            previous_hash,
            nonce: 0,
            hash: Vec::new(),
        })
    }

    /// The index-0 block. Its hash is computed directly, without mining.
    pub fn new_genesis() -> Result<Block> {
        let mut block = Block::new_candidate(0, GENESIS_PAYLOAD, Vec::new())?;
        block.hash = block.calculate_hash().to_vec();
        Ok(block)
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Block> {
        deserialize::<Block>(bytes)
    }

    pub fn serialize(&self) -> Result<Vec<u8>> {
        serialize(self)
    }

    /// Recompute the hash from the block's own recorded fields.
    pub fn calculate_hash(&self) -> [u8; 32] {
        self.hash_with_nonce(self.nonce)
    }

    pub(crate) fn hash_with_nonce(&self, nonce: u64) -> [u8; 32] {
        calculate_hash(
            self.index,
            &self.timestamp,
            self.payload.as_bytes(),
            &self.previous_hash,
            nonce,
        )
    }

    /// Called by the miner once a satisfying nonce is found.
    pub(crate) fn seal(&mut self, nonce: u64, hash: [u8; 32]) {
        self.nonce = nonce;
        self.hash = hash.to_vec();
    }

    pub fn is_sealed(&self) -> bool {
        !self.hash.is_empty()
    }

    /// True when the stored hash equals the hash of the recorded fields.
    pub fn has_consistent_hash(&self) -> bool {
        self.is_sealed() && self.hash.as_slice() == self.calculate_hash().as_slice()
    }

    pub fn meets_difficulty(&self, difficulty: u32) -> bool {
        meets_difficulty(&self.hash, difficulty)
    }

    pub fn is_genesis(&self) -> bool {
        self.index == 0
    }

    pub fn get_index(&self) -> u64 {
        self.index
    }

    pub fn get_timestamp(&self) -> &str {
        self.timestamp.as_str()
    }

    pub fn get_payload(&self) -> &str {
        self.payload.as_str()
    }

    pub fn get_previous_hash(&self) -> &[u8] {
        &self.previous_hash
    }

    pub fn get_nonce(&self) -> u64 {
        self.nonce
    }

    pub fn get_hash(&self) -> &[u8] {
        &self.hash
    }

    pub fn get_hash_hex(&self) -> String {
        HEXLOWER.encode(&self.hash)
    }

    pub fn get_previous_hash_hex(&self) -> String {
        HEXLOWER.encode(&self.previous_hash)
    }

    // Post-construction tampering, used to check that verification catches it
    #[cfg(test)]
    pub(crate) fn set_payload(&mut self, payload: &str) {
        self.payload = payload.to_string();
    }

    #[cfg(test)]
    pub(crate) fn set_nonce(&mut self, nonce: u64) {
        self.nonce = nonce;
    }

    #[cfg(test)]
    pub(crate) fn set_previous_hash(&mut self, previous_hash: Vec<u8>) {
        self.previous_hash = previous_hash;
    }

    #[cfg(test)]
    pub(crate) fn set_index(&mut self, index: u64) {
        self.index = index;
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Index: {}", self.index)?;
        writeln!(f, "Timestamp: {}", self.timestamp)?;
        writeln!(f, "Data: {}", self.payload)?;
        writeln!(f, "PreviousHash: {}", self.get_previous_hash_hex())?;
        writeln!(f, "Hash: {}", self.get_hash_hex())?;
        write!(f, "Nonce: {}", self.nonce)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genesis_block_shape() {
        let genesis = Block::new_genesis().unwrap();

        assert_eq!(genesis.get_index(), 0);
        assert!(genesis.get_previous_hash().is_empty());
        assert_eq!(genesis.get_payload(), GENESIS_PAYLOAD);
        assert_eq!(genesis.get_nonce(), 0);
        assert_eq!(genesis.get_hash().len(), 32);
        assert!(genesis.has_consistent_hash());
    }

    #[test]
    fn test_candidate_is_unsealed() {
        let candidate = Block::new_candidate(1, "A", vec![1; 32]).unwrap();

        assert!(!candidate.is_sealed());
        assert!(!candidate.has_consistent_hash());
        assert_eq!(candidate.get_nonce(), 0);
    }

    #[test]
    fn test_tampered_payload_breaks_hash() {
        let mut genesis = Block::new_genesis().unwrap();
        genesis.set_payload("Rewritten history");
        assert!(!genesis.has_consistent_hash());
    }

    #[test]
    fn test_block_bincode_round_trip() {
        let genesis = Block::new_genesis().unwrap();
        let bytes = genesis.serialize().unwrap();
        assert_eq!(Block::deserialize(&bytes).unwrap(), genesis);
    }

    #[test]
    fn test_display_lists_fields() {
        let genesis = Block::new_genesis().unwrap();
        let printed = genesis.to_string();
        assert!(printed.contains("Index: 0"));
        assert!(printed.contains("Data: Genesis Block"));
        assert!(printed.contains(&genesis.get_hash_hex()));
    }
}
