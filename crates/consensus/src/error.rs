//! Stake engine error types

use std::time::Duration;

use alloy_primitives::{Address, U256};
use supernet_crypto::BlsError;
use supernet_storage::StorageError;
use thiserror::Error;

/// Errors that can occur while recording stake events or computing a
/// validator set delta.
#[derive(Debug, Error)]
pub enum StakeError {
    /// Invalid configuration provided.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A log matched the transfer event signature but could not be decoded.
    #[error("failed to decode transfer event log: {0}")]
    LogDecode(String),

    /// The stake event store failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Reading the events of an epoch failed.
    #[error("failed to get transfer events for epoch {epoch}: {source}")]
    ReadEvents {
        /// Epoch whose events were requested.
        epoch: u64,
        /// Underlying storage failure.
        source: StorageError,
    },

    /// The read-only contract call failed.
    #[error("failed to invoke getValidator on the supernet manager: {0}")]
    ContractCall(String),

    /// The read-only contract call did not complete in time.
    #[error("contract call timed out after {0:?}")]
    CallTimeout(Duration),

    /// The call response is not valid hex.
    #[error("unable to decode hex response: {0}")]
    HexDecode(String),

    /// The call response does not have the expected ABI shape.
    #[error("unable to decode getValidator response: {0}")]
    AbiDecode(String),

    /// The registered BLS key is not a valid public key.
    #[error("failed to unmarshal BLS public key: {0}")]
    BlsKey(#[from] BlsError),

    /// Resolving a new validator failed.
    #[error("could not retrieve validator data for {address}: {source}")]
    ValidatorInfo {
        /// Address of the new validator.
        address: Address,
        /// Underlying failure.
        source: Box<StakeError>,
    },

    /// An epoch unstaked from an address that neither held nor received stake.
    #[error("unstake for untracked validator {0}")]
    UnknownValidatorUnstake(Address),

    /// An epoch's unstakes burned more than the address held.
    #[error("unstake of {amount} from {address} exceeds its stake of {stake}")]
    StakeUnderflow {
        /// Validator address.
        address: Address,
        /// Starting stake plus everything minted in the epoch.
        stake: U256,
        /// Total burned in the epoch.
        amount: U256,
    },

    /// Accumulated stake of an address does not fit in 256 bits.
    #[error("stake of {0} overflows")]
    StakeOverflow(Address),

    /// A removal bit addresses a position outside the validator set.
    #[error("removed index {index} out of range for validator set of size {len}")]
    RemovedIndexOutOfRange {
        /// Offending index.
        index: usize,
        /// Size of the validator set.
        len: usize,
    },

    /// An updated validator is not part of the validator set.
    #[error("validator {0} is marked as updated but not found in the validator set")]
    UpdatedValidatorNotFound(Address),

    /// An added validator is already part of the validator set.
    #[error("validator {0} is already present in the validator set")]
    AddedValidatorExists(Address),
}

/// Result type for stake engine operations.
pub type Result<T> = std::result::Result<T, StakeError>;
