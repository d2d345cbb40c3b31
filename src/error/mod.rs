//! Error handling for the ledger
//!
//! Every fallible operation in the crate returns [`LedgerError`]. Mining
//! cancellation is not an error and is reported through
//! [`MiningOutcome`](crate::core::MiningOutcome) instead.

use std::fmt;

/// Result type alias for ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Error types for ledger and asset store operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Operation invoked on a ledger that cannot support it (e.g. append on an empty chain)
    PreconditionViolation(String),
    /// Asset id not present in the world state
    NotFound(String),
    /// Asset id already present in the world state
    AlreadyExists(String),
    /// Key-value backend read/write failure
    Storage(String),
    /// Malformed bytes on decode, or encode failure
    Serialization(String),
    /// A chain failed one of its structural invariants
    InvalidChain(String),
    /// An asset mutation reached the world state but its audit block was not stored
    Unaudited(String),
    /// Configuration errors
    Config(String),
    /// File I/O errors
    Io(String),
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerError::PreconditionViolation(msg) => write!(f, "Precondition violated: {msg}"),
            LedgerError::NotFound(id) => write!(f, "Asset not found: {id}"),
            LedgerError::AlreadyExists(id) => write!(f, "Asset already exists: {id}"),
            LedgerError::Storage(msg) => write!(f, "Storage error: {msg}"),
            LedgerError::Serialization(msg) => write!(f, "Serialization error: {msg}"),
            LedgerError::InvalidChain(msg) => write!(f, "Invalid chain: {msg}"),
            LedgerError::Unaudited(msg) => {
                write!(f, "State written without an audit record: {msg}")
            }
            LedgerError::Config(msg) => write!(f, "Configuration error: {msg}"),
            LedgerError::Io(msg) => write!(f, "I/O error: {msg}"),
        }
    }
}

impl std::error::Error for LedgerError {}

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        LedgerError::Io(err.to_string())
    }
}

impl From<sled::Error> for LedgerError {
    fn from(err: sled::Error) -> Self {
        LedgerError::Storage(err.to_string())
    }
}

impl From<bincode::error::EncodeError> for LedgerError {
    fn from(err: bincode::error::EncodeError) -> Self {
        LedgerError::Serialization(err.to_string())
    }
}

impl From<bincode::error::DecodeError> for LedgerError {
    fn from(err: bincode::error::DecodeError) -> Self {
        LedgerError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for LedgerError {
    fn from(err: toml::de::Error) -> Self {
        LedgerError::Config(err.to_string())
    }
}
