//! In-memory implementation of `StakeEventStore`
//!
//! This implementation is primarily for testing and development.

use std::collections::BTreeMap;

use parking_lot::RwLock;
use supernet_types::StakeTransferEvent;

use crate::staking::{StakeEventStore, StakingStoreResult};

/// In-memory stake event store.
///
/// Events are kept in a single `parking_lot::RwLock`, so an append is atomic
/// with respect to concurrent reads.
#[derive(Debug, Default)]
pub struct InMemoryStakeEventStore {
    events: RwLock<BTreeMap<u64, Vec<StakeTransferEvent>>>,
}

impl InMemoryStakeEventStore {
    /// Create a new in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of epochs with at least one recorded event.
    pub fn epoch_count(&self) -> usize {
        self.events.read().len()
    }

    /// Clear all data (for testing)
    pub fn clear(&self) {
        self.events.write().clear();
    }
}

impl StakeEventStore for InMemoryStakeEventStore {
    fn append(&self, epoch: u64, events: &[StakeTransferEvent]) -> StakingStoreResult<()> {
        if events.is_empty() {
            return Ok(());
        }

        let mut stored = self.events.write();
        stored.entry(epoch).or_default().extend_from_slice(events);
        Ok(())
    }

    fn read(&self, epoch: u64) -> StakingStoreResult<Vec<StakeTransferEvent>> {
        let stored = self.events.read();
        Ok(stored.get(&epoch).cloned().unwrap_or_default())
    }
}
