//! Stake accounting and validator set delta computation for Supernet.
//!
//! This crate observes stake `Transfer` events in finalized blocks, records
//! them per epoch and, at every epoch boundary, derives the deterministic
//! changes to the validator set.
//!
//! # Architecture
//!
//! - [`TransferEventExtractor`]: pulls stake events out of block receipts
//! - [`StakeCounter`]: accumulates stakes and ranks candidates
//! - [`ValidatorInfoResolver`]: fetches registration data of new validators
//! - [`SupernetStakeManager`]: ties the above together behind [`StakeManager`]

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]

pub mod bitmap;
pub mod config;
#[allow(missing_docs)]
pub mod contracts;
pub mod epoch;
pub mod error;
pub mod event_extractor;
pub mod stake_counter;
pub mod stake_manager;
pub mod validator_info;
pub mod validator_set;

pub use bitmap::Bitmap;
pub use config::{
    StakeManagerConfig, DEFAULT_CALL_TIMEOUT_MS, DEFAULT_MAX_VALIDATOR_SET_SIZE,
    DEFAULT_VALIDATOR_SET_CONTRACT,
};
pub use epoch::{EpochConfig, DEFAULT_EPOCH_LENGTH};
pub use error::StakeError;
pub use event_extractor::{transfer_log, TransferEventExtractor};
pub use stake_counter::{ExpandedValidatorMetadata, StakeCounter, StakeInfo};
pub use stake_manager::{NoopStakeManager, PostBlockRequest, StakeManager, SupernetStakeManager};
pub use validator_info::{ContractCaller, JsonRpcContractCaller, ValidatorInfoResolver};
pub use validator_set::{AccountSet, ValidatorMetadata, ValidatorSetDelta};
