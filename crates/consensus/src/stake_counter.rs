//! Per-epoch stake accumulator.
//!
//! A [`StakeCounter`] is seeded from the current validator set. The stake and
//! unstake amounts of an epoch are summed per address, and the unknown-address
//! and underflow checks run once on the net result, so the outcome does not
//! depend on the order of the events. Settled stakes are finally ranked into a
//! capped, deterministic list of [`StakeInfo`] entries.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use alloy_primitives::{Address, U256};

use crate::error::StakeError;
use crate::validator_set::{AccountSet, ValidatorMetadata};

/// Address and accumulated stake of a ranked candidate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StakeInfo {
    /// Candidate address.
    pub address: Address,
    /// Accumulated stake.
    pub stake: U256,
}

/// Current validator together with its position in the current set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpandedValidatorMetadata {
    /// Validator entry.
    pub metadata: ValidatorMetadata,
    /// Index in the current validator set.
    pub index: usize,
}

/// Stake accumulator for a single validator set update.
#[derive(Debug)]
pub struct StakeCounter {
    /// Settled stakes.
    stake_map: HashMap<Address, U256>,
    /// Minted since the last settle.
    minted: BTreeMap<Address, U256>,
    /// Burned since the last settle.
    burned: BTreeMap<Address, U256>,
    current_validator_set: HashMap<Address, ExpandedValidatorMetadata>,
}

impl StakeCounter {
    /// Seed the counter with every current validator's voting power.
    pub fn new(current_validator_set: AccountSet) -> Self {
        let mut stake_map = HashMap::with_capacity(current_validator_set.len());
        let mut current = HashMap::with_capacity(current_validator_set.len());

        for (index, metadata) in current_validator_set.iter().enumerate() {
            stake_map.insert(metadata.address, metadata.voting_power);
            current.insert(
                metadata.address,
                ExpandedValidatorMetadata {
                    metadata: metadata.clone(),
                    index,
                },
            );
        }

        Self {
            stake_map,
            minted: BTreeMap::new(),
            burned: BTreeMap::new(),
            current_validator_set: current,
        }
    }

    /// Record `amount` minted to `address`.
    ///
    /// # Errors
    ///
    /// Fails if the epoch's minted total for `address` overflows.
    pub fn add_stake(&mut self, address: Address, amount: U256) -> Result<(), StakeError> {
        accumulate(&mut self.minted, address, amount)
    }

    /// Record `amount` burned from `address`.
    ///
    /// Nothing is checked against the tracked stake until [`Self::settle`].
    ///
    /// # Errors
    ///
    /// Fails if the epoch's burned total for `address` overflows.
    pub fn remove_stake(&mut self, address: Address, amount: U256) -> Result<(), StakeError> {
        accumulate(&mut self.burned, address, amount)
    }

    /// Fold the recorded amounts into the tracked stakes.
    ///
    /// Addresses are checked in ascending order and nothing is committed
    /// unless every address settles.
    ///
    /// # Errors
    ///
    /// - [`StakeError::UnknownValidatorUnstake`] if an address was only burned
    ///   from and holds no tracked stake
    /// - [`StakeError::StakeUnderflow`] if an address burned more than it held
    ///   plus what it was minted
    /// - [`StakeError::StakeOverflow`] if held plus minted overflows
    pub fn settle(&mut self) -> Result<(), StakeError> {
        let touched: BTreeSet<Address> = self
            .minted
            .keys()
            .chain(self.burned.keys())
            .copied()
            .collect();

        let mut settled = Vec::with_capacity(touched.len());
        for address in touched {
            let held = self.stake_map.get(&address).copied();
            let minted = self.minted.get(&address).copied();
            let burned = self.burned.get(&address).copied().unwrap_or(U256::ZERO);

            if held.is_none() && minted.is_none() {
                return Err(StakeError::UnknownValidatorUnstake(address));
            }

            let available = held
                .unwrap_or(U256::ZERO)
                .checked_add(minted.unwrap_or(U256::ZERO))
                .ok_or(StakeError::StakeOverflow(address))?;
            let stake = available
                .checked_sub(burned)
                .ok_or(StakeError::StakeUnderflow {
                    address,
                    stake: available,
                    amount: burned,
                })?;
            settled.push((address, stake));
        }

        self.stake_map.extend(settled);
        self.minted.clear();
        self.burned.clear();
        Ok(())
    }

    /// Settle, then rank tracked stakes by descending stake, then ascending
    /// address.
    ///
    /// Entries beyond `max_size` are dropped from the result and stop being
    /// tracked.
    pub fn sort_by_stake(&mut self, max_size: usize) -> Result<Vec<StakeInfo>, StakeError> {
        self.settle()?;

        let mut infos: Vec<StakeInfo> = self
            .stake_map
            .iter()
            .map(|(address, stake)| StakeInfo {
                address: *address,
                stake: *stake,
            })
            .collect();

        infos.sort_by(compare_stake_infos);

        if infos.len() > max_size {
            for dropped in infos.drain(max_size..) {
                self.stake_map.remove(&dropped.address);
            }
        }

        Ok(infos)
    }

    /// Whether `address` is still tracked.
    pub fn contains(&self, address: &Address) -> bool {
        self.stake_map.contains_key(address)
    }

    /// Settled stake of `address`.
    pub fn stake_of(&self, address: &Address) -> Option<U256> {
        self.stake_map.get(address).copied()
    }

    /// Current validator entry for `address`.
    pub fn current_validator(&self, address: &Address) -> Option<&ExpandedValidatorMetadata> {
        self.current_validator_set.get(address)
    }

    /// Current validators that are no longer tracked.
    pub fn untracked_current_validators(&self) -> impl Iterator<Item = &ExpandedValidatorMetadata> {
        self.current_validator_set
            .iter()
            .filter(|(address, _)| !self.stake_map.contains_key(*address))
            .map(|(_, v)| v)
    }
}

fn accumulate(
    totals: &mut BTreeMap<Address, U256>,
    address: Address,
    amount: U256,
) -> Result<(), StakeError> {
    let total = totals.entry(address).or_insert(U256::ZERO);
    *total = total
        .checked_add(amount)
        .ok_or(StakeError::StakeOverflow(address))?;
    Ok(())
}

fn compare_stake_infos(a: &StakeInfo, b: &StakeInfo) -> Ordering {
    b.stake
        .cmp(&a.stake)
        .then_with(|| a.address.as_slice().cmp(b.address.as_slice()))
}
