//! Validator sets and the deltas applied to them at epoch boundaries.

use std::fmt::{self, Display};

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use supernet_crypto::BlsPublicKey;

use crate::bitmap::Bitmap;
use crate::error::StakeError;

/// Validator entry with voting power and BLS public key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorMetadata {
    /// Validator account address.
    pub address: Address,
    /// Registered BLS public key.
    pub bls_key: BlsPublicKey,
    /// Voting power, equal to the validator's stake.
    pub voting_power: U256,
    /// Whether the validator is active.
    pub is_active: bool,
}

impl ValidatorMetadata {
    /// Create an active validator entry.
    pub fn new(address: Address, bls_key: BlsPublicKey, voting_power: U256) -> Self {
        Self {
            address,
            bls_key,
            voting_power,
            is_active: true,
        }
    }
}

impl Display for ValidatorMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Address={}; Is Active={}; Voting Power={}",
            self.address, self.is_active, self.voting_power
        )
    }
}

/// Ordered validator set. A validator's position is the index used by
/// [`Bitmap`] removals.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSet(Vec<ValidatorMetadata>);

impl AccountSet {
    /// Build from an ordered validator list.
    pub fn new(validators: Vec<ValidatorMetadata>) -> Self {
        Self(validators)
    }

    /// Accessor for underlying list.
    pub fn as_slice(&self) -> &[ValidatorMetadata] {
        &self.0
    }

    /// Iterate validators in set order.
    pub fn iter(&self) -> std::slice::Iter<'_, ValidatorMetadata> {
        self.0.iter()
    }

    /// Append a validator.
    pub fn push(&mut self, validator: ValidatorMetadata) {
        self.0.push(validator);
    }

    /// Number of validators.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the validator set is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `address` is part of the set.
    pub fn contains(&self, address: &Address) -> bool {
        self.index_of(address).is_some()
    }

    /// Position of `address` in the set.
    pub fn index_of(&self, address: &Address) -> Option<usize> {
        self.0.iter().position(|v| &v.address == address)
    }

    /// Addresses in set order.
    pub fn get_addresses(&self) -> Vec<Address> {
        self.0.iter().map(|v| v.address).collect()
    }

    /// Sum of all voting powers, `None` on overflow.
    pub fn total_voting_power(&self) -> Option<U256> {
        self.0
            .iter()
            .try_fold(U256::ZERO, |acc, v| acc.checked_add(v.voting_power))
    }

    /// Produce the set that results from applying `delta`.
    ///
    /// Removals are applied first by original index, then updates replace the
    /// entry with the same address, then additions are appended in order.
    pub fn apply_delta(&self, delta: &ValidatorSetDelta) -> Result<AccountSet, StakeError> {
        if let Some(index) = delta.removed.iter_set().find(|i| *i >= self.0.len()) {
            return Err(StakeError::RemovedIndexOutOfRange {
                index,
                len: self.0.len(),
            });
        }

        let mut validators: Vec<ValidatorMetadata> = self
            .0
            .iter()
            .enumerate()
            .filter(|(i, _)| !delta.removed.is_set(*i))
            .map(|(_, v)| v.clone())
            .collect();

        for updated in delta.updated.iter() {
            let entry = validators
                .iter_mut()
                .find(|v| v.address == updated.address)
                .ok_or(StakeError::UpdatedValidatorNotFound(updated.address))?;
            *entry = updated.clone();
        }

        for added in delta.added.iter() {
            if validators.iter().any(|v| v.address == added.address) {
                return Err(StakeError::AddedValidatorExists(added.address));
            }
            validators.push(added.clone());
        }

        Ok(AccountSet(validators))
    }
}

impl From<Vec<ValidatorMetadata>> for AccountSet {
    fn from(validators: Vec<ValidatorMetadata>) -> Self {
        Self(validators)
    }
}

impl<'a> IntoIterator for &'a AccountSet {
    type Item = &'a ValidatorMetadata;
    type IntoIter = std::slice::Iter<'a, ValidatorMetadata>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Display for AccountSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for validator in &self.0 {
            writeln!(f, "{validator}")?;
        }
        Ok(())
    }
}

/// Changes to apply to a validator set at an epoch boundary.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorSetDelta {
    /// Validators joining the set, in rank order.
    pub added: AccountSet,
    /// Existing validators whose voting power changed.
    pub updated: AccountSet,
    /// Original indices of validators leaving the set.
    pub removed: Bitmap,
}

impl ValidatorSetDelta {
    /// True if the delta changes nothing.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.updated.is_empty() && self.removed.is_empty()
    }
}

impl Display for ValidatorSetDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "added={} updated={} removed={:?}",
            self.added.len(),
            self.updated.len(),
            self.removed.iter_set().collect::<Vec<_>>()
        )
    }
}
