//! Data storage and persistence
//!
//! This module holds the world-state backends the asset store writes
//! through and the sled adapter that persists a sealed chain.

pub mod chain_store;
pub mod world_state;

pub use chain_store::ChainStore;
pub use world_state::{MemoryState, SledState, WorldState};
