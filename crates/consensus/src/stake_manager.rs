//! Stake manager: turns stake transfer events into validator set deltas.
//!
//! ## Flow
//!
//! 1. On every finalized block, [`StakeManager::post_block`] extracts the
//!    `Transfer` events of the validator set contract and stores them under
//!    the epoch they apply to. Events of an epoch-ending block apply to the
//!    next epoch.
//! 2. At the epoch boundary, [`StakeManager::update_validator_set`] replays
//!    the stored events on top of the current validator set, ranks the
//!    resulting stakes, caps the set and classifies every entry as added,
//!    updated or removed.
//!
//! Every node derives the same delta from the same blocks: ranking uses an
//! explicit total order (stake descending, address ascending) and removals
//! are addressed by the validator's index in the current set.

use std::sync::Arc;

use alloy_primitives::U256;
use async_trait::async_trait;
use supernet_storage::StakeEventStore;
use supernet_types::FullBlock;
use tracing::{debug, info, Level};

use crate::bitmap::Bitmap;
use crate::config::StakeManagerConfig;
use crate::epoch::EpochConfig;
use crate::error::StakeError;
use crate::event_extractor::TransferEventExtractor;
use crate::stake_counter::StakeCounter;
use crate::validator_info::{ContractCaller, ValidatorInfoResolver};
use crate::validator_set::{AccountSet, ValidatorSetDelta};

/// A finalized block handed to the stake manager.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PostBlockRequest {
    /// Block with its receipts.
    pub full_block: FullBlock,
    /// Epoch the block belongs to.
    pub epoch: u64,
    /// Whether the block is the last one of its epoch.
    pub is_epoch_ending_block: bool,
}

impl PostBlockRequest {
    /// Create a request.
    pub fn new(full_block: FullBlock, epoch: u64, is_epoch_ending_block: bool) -> Self {
        Self {
            full_block,
            epoch,
            is_epoch_ending_block,
        }
    }

    /// Derive epoch and epoch-ending flag from the block number.
    pub fn from_height(epoch_config: &EpochConfig, full_block: FullBlock) -> Self {
        let height = full_block.number;
        Self {
            epoch: epoch_config.epoch_for_height(height),
            is_epoch_ending_block: epoch_config.is_epoch_ending_block(height),
            full_block,
        }
    }

    /// Epoch the block's stake events apply to.
    pub fn target_epoch(&self) -> u64 {
        if self.is_epoch_ending_block {
            self.epoch + 1
        } else {
            self.epoch
        }
    }
}

/// Stake accounting interface used at block finalization and epoch change.
#[async_trait]
pub trait StakeManager: Send + Sync {
    /// Record the stake events of a finalized block.
    fn post_block(&self, request: &PostBlockRequest) -> Result<(), StakeError>;

    /// Compute the changes to `current_validator_set` caused by the stake
    /// events recorded for `epoch`.
    async fn update_validator_set(
        &self,
        epoch: u64,
        current_validator_set: &AccountSet,
    ) -> Result<ValidatorSetDelta, StakeError>;
}

/// Stake manager that records nothing and never changes the validator set.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopStakeManager;

#[async_trait]
impl StakeManager for NoopStakeManager {
    fn post_block(&self, _request: &PostBlockRequest) -> Result<(), StakeError> {
        Ok(())
    }

    async fn update_validator_set(
        &self,
        _epoch: u64,
        _current_validator_set: &AccountSet,
    ) -> Result<ValidatorSetDelta, StakeError> {
        Ok(ValidatorSetDelta::default())
    }
}

/// Stake manager of a supernet child chain.
pub struct SupernetStakeManager {
    config: StakeManagerConfig,
    store: Arc<dyn StakeEventStore>,
    extractor: TransferEventExtractor,
    resolver: ValidatorInfoResolver,
}

impl SupernetStakeManager {
    /// Create a stake manager.
    ///
    /// # Errors
    ///
    /// Returns [`StakeError::InvalidConfig`] if `config` does not validate.
    pub fn new(
        config: StakeManagerConfig,
        store: Arc<dyn StakeEventStore>,
        caller: Arc<dyn ContractCaller>,
    ) -> Result<Self, StakeError> {
        config.validate()?;

        let extractor = TransferEventExtractor::new(config.validator_set_contract);
        let resolver = ValidatorInfoResolver::new(
            caller,
            config.caller_address,
            config.supernet_manager_contract,
            config.call_timeout(),
        );

        Ok(Self {
            config,
            store,
            extractor,
            resolver,
        })
    }

    /// Configuration in use.
    pub fn config(&self) -> &StakeManagerConfig {
        &self.config
    }
}

impl std::fmt::Debug for SupernetStakeManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupernetStakeManager")
            .field("config", &self.config)
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl StakeManager for SupernetStakeManager {
    fn post_block(&self, request: &PostBlockRequest) -> Result<(), StakeError> {
        let epoch = request.target_epoch();

        let events = self
            .extractor
            .extract(epoch, &request.full_block.receipts)?;

        if events.is_empty() {
            return Ok(());
        }

        self.store.append(epoch, &events)?;

        debug!(
            block = request.full_block.number,
            epoch,
            events = events.len(),
            "Stored stake transfer events"
        );
        Ok(())
    }

    async fn update_validator_set(
        &self,
        epoch: u64,
        current_validator_set: &AccountSet,
    ) -> Result<ValidatorSetDelta, StakeError> {
        info!(epoch, "Calculating validator set update");

        let events = self
            .store
            .read(epoch)
            .map_err(|source| StakeError::ReadEvents { epoch, source })?;

        if events.is_empty() {
            info!(epoch, "No stake transfer events, validator set unchanged");
            return Ok(ValidatorSetDelta::default());
        }

        let mut counter = StakeCounter::new(current_validator_set.clone());

        for event in &events {
            if event.is_stake() {
                counter.add_stake(event.to, event.value)?;
            } else if event.is_unstake() {
                counter.remove_stake(event.from, event.value)?;
            } else {
                debug!(
                    epoch,
                    from = %event.from,
                    to = %event.to,
                    "Transfer event is neither stake nor unstake"
                );
            }
        }

        // Per-address checks run on the epoch's net amounts, after all events
        let ranked = counter.sort_by_stake(self.config.max_validator_set_size)?;

        let mut removed = Bitmap::new();
        for dropped in counter.untracked_current_validators() {
            debug!(
                validator = %dropped.metadata.address,
                "Validator removed from validator set since it fell outside the cap"
            );
            removed.set(dropped.index);
        }

        let mut updated = AccountSet::default();
        let mut added = AccountSet::default();

        for stake_info in &ranked {
            match counter.current_validator(&stake_info.address) {
                Some(current) if stake_info.stake == U256::ZERO => {
                    removed.set(current.index);
                    debug!(
                        validator = %stake_info.address,
                        "Validator removed from validator set since it unstaked all"
                    );
                }
                Some(current) if stake_info.stake != current.metadata.voting_power => {
                    let mut metadata = current.metadata.clone();
                    metadata.voting_power = stake_info.stake;
                    debug!(
                        validator = %stake_info.address,
                        voting_power = %stake_info.stake,
                        "Validator updated its stake and remains in validator set"
                    );
                    updated.push(metadata);
                }
                Some(current) => {
                    debug!(
                        validator = %stake_info.address,
                        voting_power = %current.metadata.voting_power,
                        "Validator did not change its stake and remains in validator set"
                    );
                }
                None if stake_info.stake == U256::ZERO => {
                    debug!(
                        validator = %stake_info.address,
                        "New address netted out to zero stake, not added"
                    );
                }
                None => {
                    let metadata = self
                        .resolver
                        .resolve(stake_info.address, stake_info.stake)
                        .await
                        .map_err(|e| StakeError::ValidatorInfo {
                            address: stake_info.address,
                            source: Box::new(e),
                        })?;
                    debug!(
                        validator = %stake_info.address,
                        voting_power = %metadata.voting_power,
                        "New validator added to validator set"
                    );
                    added.push(metadata);
                }
            }
        }

        let delta = ValidatorSetDelta {
            added,
            updated,
            removed,
        };

        info!(epoch, %delta, "Calculating validator set update finished");

        if tracing::enabled!(Level::DEBUG) {
            let next = current_validator_set.apply_delta(&delta)?;
            debug!(epoch, validator_set = %next, "New validator set");
        }

        Ok(delta)
    }
}
