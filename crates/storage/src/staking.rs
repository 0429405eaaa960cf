//! Stake event storage trait.
//!
//! This module provides the `StakeEventStore` trait that persists the stake
//! transfer events observed in finalized blocks, keyed by the epoch whose
//! validator set they affect.

use supernet_types::StakeTransferEvent;

use crate::error::StorageError;

/// Result type for stake event storage operations.
pub type StakingStoreResult<T> = Result<T, StorageError>;

/// Trait for epoch-keyed stake event storage.
///
/// ## Implementation Notes
///
/// - `append` for an epoch must be atomic: either all events of the call are
///   recorded or none are
/// - `read` returns a consistent snapshot in append order
/// - An `append` that returned `Ok` must be visible to every later `read` of
///   the same epoch
pub trait StakeEventStore: Send + Sync {
    /// Append events to the bucket of `epoch`.
    ///
    /// Appending an empty slice is a successful no-op.
    fn append(&self, epoch: u64, events: &[StakeTransferEvent]) -> StakingStoreResult<()>;

    /// Read all events recorded for `epoch`, in append order.
    ///
    /// Returns an empty vector if nothing was recorded.
    fn read(&self, epoch: u64) -> StakingStoreResult<Vec<StakeTransferEvent>>;
}
