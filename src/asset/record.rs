use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Owner assigned to every newly created asset
pub const DEFAULT_OWNER: &str = "Manufacturer";
/// Status assigned to every newly created asset
pub const DEFAULT_STATUS: &str = "Manufactured";

/// One tracked item in the world state.
///
/// `status` is free-form: any caller-supplied value is accepted on transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub id: String,
    pub description: String,
    pub owner: String,
    pub status: String,
}

impl Asset {
    /// A freshly manufactured asset
    pub fn new(id: &str, description: &str) -> Asset {
        Asset {
            id: id.to_string(),
            description: description.to_string(),
            owner: DEFAULT_OWNER.to_string(),
            status: DEFAULT_STATUS.to_string(),
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Asset> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
