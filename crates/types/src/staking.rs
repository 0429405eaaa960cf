//! Stake transfer events.
//!
//! The validator set contract is a non-transferable stake token: staking mints
//! tokens to the validator and unstaking burns them. A `Transfer` log from the
//! zero address is therefore a stake and a `Transfer` log to the zero address
//! is an unstake.

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// A parsed `Transfer(from, to, value)` event of the validator set contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StakeTransferEvent {
    /// Sender of the tokens (zero address on mint).
    pub from: Address,
    /// Recipient of the tokens (zero address on burn).
    pub to: Address,
    /// Amount transferred.
    pub value: U256,
}

impl StakeTransferEvent {
    /// Create a new transfer event.
    pub fn new(from: Address, to: Address, value: U256) -> Self {
        Self { from, to, value }
    }

    /// Stake of `value` minted to `validator`.
    pub fn stake(validator: Address, value: U256) -> Self {
        Self::new(Address::ZERO, validator, value)
    }

    /// Stake of `value` burned from `validator`.
    pub fn unstake(validator: Address, value: U256) -> Self {
        Self::new(validator, Address::ZERO, value)
    }

    /// Tokens were minted to `to`.
    pub fn is_stake(&self) -> bool {
        self.from == Address::ZERO
    }

    /// Tokens were burned from `from`.
    pub fn is_unstake(&self) -> bool {
        self.to == Address::ZERO
    }
}
