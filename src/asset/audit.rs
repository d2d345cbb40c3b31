use crate::asset::Asset;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// An asset mutation as recorded on the chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum AuditEvent {
    Created { asset: Asset },
    Transferred { asset: Asset },
    Seeded { ids: Vec<String> },
}

impl AuditEvent {
    /// Ledger payload for this event
    pub fn to_payload(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_payload(payload: &str) -> Result<AuditEvent> {
        Ok(serde_json::from_str(payload)?)
    }
}
