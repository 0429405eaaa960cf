//! Epoch arithmetic over block heights.

use serde::{Deserialize, Serialize};

use crate::error::StakeError;

/// Default number of blocks per epoch.
pub const DEFAULT_EPOCH_LENGTH: u64 = 100;

/// Configuration for epoch-based validator set changes.
///
/// Epochs are numbered from 0. The epoch length is never zero: construction
/// and deserialization both reject it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawEpochConfig")]
pub struct EpochConfig {
    /// Number of blocks per epoch.
    ///
    /// Validator set changes take effect at epoch boundaries.
    /// Default: 100 blocks.
    epoch_length: u64,
}

/// Unvalidated wire form of [`EpochConfig`].
#[derive(Deserialize)]
#[serde(default)]
struct RawEpochConfig {
    epoch_length: u64,
}

impl Default for RawEpochConfig {
    fn default() -> Self {
        Self {
            epoch_length: DEFAULT_EPOCH_LENGTH,
        }
    }
}

impl TryFrom<RawEpochConfig> for EpochConfig {
    type Error = StakeError;

    fn try_from(raw: RawEpochConfig) -> Result<Self, Self::Error> {
        Self::new(raw.epoch_length)
    }
}

impl Default for EpochConfig {
    fn default() -> Self {
        Self {
            epoch_length: DEFAULT_EPOCH_LENGTH,
        }
    }
}

impl EpochConfig {
    /// Create a new epoch configuration.
    ///
    /// # Errors
    ///
    /// Returns [`StakeError::InvalidConfig`] if `epoch_length` is zero.
    pub fn new(epoch_length: u64) -> Result<Self, StakeError> {
        if epoch_length == 0 {
            return Err(StakeError::InvalidConfig(
                "epoch_length must be greater than zero".to_string(),
            ));
        }
        Ok(Self { epoch_length })
    }

    /// Number of blocks per epoch.
    pub fn epoch_length(&self) -> u64 {
        self.epoch_length
    }

    /// Calculate the epoch number for a given height.
    ///
    /// Epoch 0 contains heights 1..=epoch_length
    /// Epoch 1 contains heights (epoch_length+1)..=(2*epoch_length)
    /// etc.
    #[inline]
    pub fn epoch_for_height(&self, height: u64) -> u64 {
        if height == 0 {
            return 0;
        }
        (height - 1) / self.epoch_length
    }

    /// Get the first height of an epoch.
    #[inline]
    pub fn epoch_start_height(&self, epoch: u64) -> u64 {
        epoch * self.epoch_length + 1
    }

    /// Get the last height of an epoch.
    #[inline]
    pub fn epoch_end_height(&self, epoch: u64) -> u64 {
        (epoch + 1) * self.epoch_length
    }

    /// Check if a height is the last block of its epoch.
    #[inline]
    pub fn is_epoch_ending_block(&self, height: u64) -> bool {
        height > 0 && height % self.epoch_length == 0
    }
}
