//! Core ledger functionality
//!
//! This module contains the content-addressing hasher, blocks, the
//! proof-of-work miner, and the blockchain that owns the chain invariants.

pub mod block;
pub mod blockchain;
pub mod handle;
pub mod hasher;
pub mod proof_of_work;

pub use block::{Block, GENESIS_PAYLOAD};
pub use blockchain::{Blockchain, MAX_DIFFICULTY};
pub use handle::LedgerHandle;
pub use hasher::{calculate_hash, meets_difficulty};
pub use proof_of_work::{CancelToken, MiningOutcome, ProofOfWork, SearchStep};
