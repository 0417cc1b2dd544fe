//! Vault module — one encrypted file per record.
//!
//! This module provides:
//! - the `Record` entity, its kinds and well-known keys (`record`)
//! - backup rotation into `backups/` (`backup`)
//! - search over loaded records (`search`)
//! - the `Vault` orchestrator and its `VaultInfo` summary (`store`, `info`)
//! - filesystem, locking and worker-pool helpers (`files`, `locks`, `pool`)

pub mod backup;
pub mod files;
pub mod info;
pub mod locks;
pub mod pool;
pub mod record;
pub mod search;
pub mod store;

// Re-export the most commonly used items.
pub use info::{format_size, VaultInfo};
pub use record::{FieldKind, Record, RecordKind, WellKnownKey};
pub use store::{Vault, DEFAULT_VAULT_NAME};
