//! Storage layer for the Supernet stake engine
//!
//! This crate provides the durable, epoch-keyed store for stake transfer
//! events observed in finalized blocks.
//!
//! # Architecture
//!
//! - [`StakeEventStore`]: trait consumed by the stake manager
//! - [`InMemoryStakeEventStore`]: in-memory implementation for testing
//! - [`RocksStakeEventStore`]: RocksDB-backed implementation for production
//!
//! # Usage
//!
//! ```ignore
//! use supernet_storage::{RocksStakeEventStore, StakeEventStore};
//!
//! let store = RocksStakeEventStore::open("/path/to/stake-events")?;
//! store.append(epoch, &events)?;
//! let events = store.read(epoch)?;
//! ```

#![deny(clippy::unwrap_used)]

pub mod error;
pub mod memory;
pub mod rocks;
pub mod staking;

pub use error::StorageError;
pub use memory::InMemoryStakeEventStore;
pub use rocks::{EpochEventKey, RocksStakeEventStore};
pub use staking::{StakeEventStore, StakingStoreResult};
