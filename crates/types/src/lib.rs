//! Core chain types for the Supernet stake-accounting engine.
//!
//! This crate provides the data structures that flow from block finalization
//! into validator set computation: finalized blocks, their transaction
//! receipts and logs, and the stake transfer events extracted from them.

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]

pub mod receipt;
pub mod staking;

pub use receipt::{FullBlock, Log, Receipt, RECEIPT_STATUS_FAILED, RECEIPT_STATUS_SUCCESS};
pub use staking::StakeTransferEvent;

// Re-export commonly used external types
pub use alloy_primitives::{Address, Bytes, B256, U256};
