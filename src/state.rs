use parking_lot::RwLock;
use std::sync::Arc;

use crate::location::LocationRecord;

/// Single-slot holder for the latest validated fix.
///
/// Cloning the store shares the slot. The line processor is the only writer;
/// HTTP handlers read snapshots. A replacement swaps the whole record, so a
/// reader observes either the previous fix or the new one.
#[derive(Debug, Clone, Default)]
pub struct LocationStore {
    slot: Arc<RwLock<Option<Arc<LocationRecord>>>>,
}

impl LocationStore {
    /// Create an empty store (no fix observed yet).
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the latest fix, if any.
    pub fn latest(&self) -> Option<Arc<LocationRecord>> {
        self.slot.read().clone()
    }

    /// Replace the current fix wholesale.
    pub fn replace(&self, record: LocationRecord) {
        *self.slot.write() = Some(Arc::new(record));
    }

    pub fn is_empty(&self) -> bool {
        self.slot.read().is_none()
    }
}
