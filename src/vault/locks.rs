//! Per-record writer locks.
//!
//! Writers of the same record id are serialized so the backup-then-replace
//! sequence of one writer never interleaves with another's.  Writers of
//! different ids only contend on the table itself, briefly.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
pub struct RecordLocks {
    table: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl RecordLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// The lock slot for `id`, created on first use.
    ///
    /// Slots nobody holds or waits on are dropped here, so the table only
    /// grows with the number of concurrent writers.
    pub fn slot(&self, id: &str) -> Arc<Mutex<()>> {
        // A panicking writer cannot corrupt a map of unit mutexes.
        let mut table = self.table.lock().unwrap_or_else(|p| p.into_inner());
        table.retain(|_, slot| Arc::strong_count(slot) > 1);
        Arc::clone(table.entry(id.to_string()).or_default())
    }

    /// Number of slots currently tracked.
    pub fn len(&self) -> usize {
        self.table.lock().unwrap_or_else(|p| p.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Hold `slot` for the duration of the returned guard.
pub fn hold(slot: &Mutex<()>) -> MutexGuard<'_, ()> {
    slot.lock().unwrap_or_else(|p| p.into_inner())
}
