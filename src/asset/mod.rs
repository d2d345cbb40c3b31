//! Asset ledger
//!
//! Key-value state machine tracking items by id: create, read, transfer and
//! existence checks over a [`WorldState`](crate::storage::WorldState) backend,
//! plus the audit events recorded on the chain for each mutation.
//! [`AuditedAssetStore`] ties the two together: no mutation is written
//! unless its audit block has been sealed.

pub mod audit;
pub mod audited;
pub mod record;
pub mod store;

pub use audit::AuditEvent;
pub use audited::{AuditOutcome, AuditedAssetStore};
pub use record::{Asset, DEFAULT_OWNER, DEFAULT_STATUS};
pub use store::{default_seed, AssetStore};
