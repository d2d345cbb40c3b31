//! # Asset Chain
//!
//! An append-only, hash-linked block ledger secured by proof-of-work, with a
//! key-value asset ledger whose mutations are recorded on that chain.
//!
//! ## Layout
//! - `core/`: hasher, blocks, the proof-of-work miner and the blockchain
//! - `asset/`: asset records, the create/read/transfer state machine, audited mutations
//! - `storage/`: world-state backends (memory, sled) and the sled chain store
//! - `config/`: difficulty, data directory and log level
//! - `utils/`: SHA-256, timestamps, bincode helpers
//! - `cli/`: argument parsing for the binary
//!
//! Any party holding the blocks can check the whole history with
//! [`Blockchain::validate`]: every hash is recomputed from the block's fields,
//! every link is compared against the predecessor's hash, and every
//! non-genesis hash must carry `difficulty` leading zero bytes.

pub mod asset;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod storage;
pub mod utils;

#[cfg(test)]
pub mod testnet;

pub use crate::asset::{
    default_seed, Asset, AssetStore, AuditEvent, AuditOutcome, AuditedAssetStore,
};
pub use crate::cli::{Command, Opt};
pub use crate::config::{Config, GLOBAL_CONFIG};
pub use crate::core::{
    Block, Blockchain, CancelToken, LedgerHandle, MiningOutcome, ProofOfWork, GENESIS_PAYLOAD,
};
pub use crate::error::{LedgerError, Result};
pub use crate::storage::{ChainStore, MemoryState, SledState, WorldState};
pub use crate::utils::{current_timestamp, sha256_digest};
