//! Utility functions and helpers
//!
//! Hashing, timestamps, and the bincode helpers shared by the ledger and its
//! persistence adapter.

pub mod crypto;
pub mod serialization;

pub use crypto::{current_timestamp, sha256_digest, DIGEST_LEN};

pub use serialization::{deserialize, serialize};
