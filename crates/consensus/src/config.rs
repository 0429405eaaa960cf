//! Stake manager configuration.

use std::path::Path;
use std::time::Duration;

use alloy_primitives::{address, Address};
use serde::{Deserialize, Serialize};

use crate::error::StakeError;

/// Address of the validator set (stake token) contract on the child chain.
pub const DEFAULT_VALIDATOR_SET_CONTRACT: Address =
    address!("0000000000000000000000000000000000000101");

/// Default upper bound on the number of validators in a set.
pub const DEFAULT_MAX_VALIDATOR_SET_SIZE: usize = 100;

/// Default timeout for a single `getValidator` contract call, in milliseconds.
pub const DEFAULT_CALL_TIMEOUT_MS: u64 = 5_000;

/// Configuration of the stake manager.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StakeManagerConfig {
    /// Contract emitting the stake `Transfer` events.
    pub validator_set_contract: Address,
    /// Contract answering `getValidator` registration lookups.
    pub supernet_manager_contract: Address,
    /// Sender of the read-only registration lookups.
    pub caller_address: Address,
    /// Maximum number of validators kept after ranking.
    pub max_validator_set_size: usize,
    /// Timeout for a single registration lookup.
    pub call_timeout_ms: u64,
}

impl Default for StakeManagerConfig {
    fn default() -> Self {
        Self {
            validator_set_contract: DEFAULT_VALIDATOR_SET_CONTRACT,
            supernet_manager_contract: Address::ZERO,
            caller_address: Address::ZERO,
            max_validator_set_size: DEFAULT_MAX_VALIDATOR_SET_SIZE,
            call_timeout_ms: DEFAULT_CALL_TIMEOUT_MS,
        }
    }
}

impl StakeManagerConfig {
    /// Create a new config for the given supernet manager contract.
    pub fn new(supernet_manager_contract: Address) -> Self {
        Self {
            supernet_manager_contract,
            ..Default::default()
        }
    }

    /// Set the validator set contract.
    pub fn with_validator_set_contract(mut self, address: Address) -> Self {
        self.validator_set_contract = address;
        self
    }

    /// Set the sender of registration lookups.
    pub fn with_caller_address(mut self, address: Address) -> Self {
        self.caller_address = address;
        self
    }

    /// Set the validator set size cap.
    pub fn with_max_validator_set_size(mut self, size: usize) -> Self {
        self.max_validator_set_size = size;
        self
    }

    /// Set the registration lookup timeout.
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Registration lookup timeout.
    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }

    /// Check the configuration for values the stake manager cannot work with.
    pub fn validate(&self) -> Result<(), StakeError> {
        if self.max_validator_set_size == 0 {
            return Err(StakeError::InvalidConfig(
                "max_validator_set_size must be greater than zero".to_string(),
            ));
        }
        if self.call_timeout_ms == 0 {
            return Err(StakeError::InvalidConfig(
                "call_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.validator_set_contract == Address::ZERO {
            return Err(StakeError::InvalidConfig(
                "validator_set_contract must not be the zero address".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse and validate a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, StakeError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| StakeError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StakeError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            StakeError::InvalidConfig(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_json_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StakeManagerConfig::default();
        assert_eq!(config.validator_set_contract, DEFAULT_VALIDATOR_SET_CONTRACT);
        assert_eq!(config.max_validator_set_size, 100);
        assert_eq!(config.call_timeout(), Duration::from_secs(5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let manager = Address::repeat_byte(0xaa);
        let config = StakeManagerConfig::new(manager)
            .with_validator_set_contract(Address::repeat_byte(0x01))
            .with_caller_address(Address::repeat_byte(0x02))
            .with_max_validator_set_size(4)
            .with_call_timeout(Duration::from_millis(250));

        assert_eq!(config.supernet_manager_contract, manager);
        assert_eq!(config.validator_set_contract, Address::repeat_byte(0x01));
        assert_eq!(config.caller_address, Address::repeat_byte(0x02));
        assert_eq!(config.max_validator_set_size, 4);
        assert_eq!(config.call_timeout(), Duration::from_millis(250));
    }

    #[test]
    fn test_zero_max_size_rejected() {
        let config = StakeManagerConfig::default().with_max_validator_set_size(0);
        assert!(matches!(config.validate(), Err(StakeError::InvalidConfig(_))));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = StakeManagerConfig::default().with_call_timeout(Duration::ZERO);
        assert!(matches!(config.validate(), Err(StakeError::InvalidConfig(_))));
    }

    #[test]
    fn test_from_json_partial() {
        let json = r#"{
            "supernet_manager_contract": "0x00000000000000000000000000000000000000aa",
            "max_validator_set_size": 7
        }"#;
        let config = StakeManagerConfig::from_json_str(json).unwrap();
        assert_eq!(config.supernet_manager_contract, Address::with_last_byte(0xaa));
        assert_eq!(config.max_validator_set_size, 7);
        assert_eq!(config.call_timeout_ms, DEFAULT_CALL_TIMEOUT_MS);
    }

    #[test]
    fn test_from_json_invalid() {
        assert!(StakeManagerConfig::from_json_str("{ not json").is_err());
        assert!(StakeManagerConfig::from_json_str(r#"{"max_validator_set_size": 0}"#).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stake.json");
        let config = StakeManagerConfig::new(Address::repeat_byte(0x33));
        std::fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();

        assert_eq!(StakeManagerConfig::load(&path).unwrap(), config);
        assert!(StakeManagerConfig::load(dir.path().join("missing.json")).is_err());
    }
}
