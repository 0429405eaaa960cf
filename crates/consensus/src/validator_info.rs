//! Registration lookups for validators joining the set.
//!
//! New validators are not known to the child chain beyond their stake; their
//! BLS key lives in the supernet manager contract and is fetched with a
//! read-only `getValidator` call.

use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolCall;
use async_trait::async_trait;
use jsonrpsee::core::client::ClientT;
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};
use jsonrpsee::rpc_params;
use supernet_crypto::BlsPublicKey;
use tracing::debug;

use crate::contracts::ICustomSupernetManager;
use crate::error::StakeError;
use crate::validator_set::ValidatorMetadata;

/// Read-only contract call capability.
#[async_trait]
pub trait ContractCaller: Send + Sync {
    /// Execute `input` against `to` as `from` and return the hex-encoded
    /// return data.
    async fn call(&self, from: Address, to: Address, input: Bytes) -> Result<String, StakeError>;
}

/// Resolves the registration record of new validators.
#[derive(Clone)]
pub struct ValidatorInfoResolver {
    caller: Arc<dyn ContractCaller>,
    from: Address,
    supernet_manager: Address,
    timeout: Duration,
}

impl ValidatorInfoResolver {
    /// Create a resolver querying `supernet_manager` as `from`.
    pub fn new(
        caller: Arc<dyn ContractCaller>,
        from: Address,
        supernet_manager: Address,
        timeout: Duration,
    ) -> Self {
        Self {
            caller,
            from,
            supernet_manager,
            timeout,
        }
    }

    /// Fetch the BLS key of `address` and build its validator entry with
    /// `stake` as voting power.
    pub async fn resolve(&self, address: Address, stake: U256) -> Result<ValidatorMetadata, StakeError> {
        let input = ICustomSupernetManager::getValidatorCall { validator: address }.abi_encode();

        let response = tokio::time::timeout(
            self.timeout,
            self.caller.call(self.from, self.supernet_manager, input.into()),
        )
        .await
        .map_err(|_| StakeError::CallTimeout(self.timeout))??;

        let bytes = decode_hex_response(&response)?;
        let validator = ICustomSupernetManager::getValidatorCall::abi_decode_returns(&bytes)
            .map_err(|e| StakeError::AbiDecode(e.to_string()))?;

        let bls_key = BlsPublicKey::from_big_int_limbs(&validator.blsKey)?;

        debug!(
            validator = %address,
            registered_stake = %validator.stake,
            is_whitelisted = validator.isWhitelisted,
            "Resolved new validator"
        );

        Ok(ValidatorMetadata {
            address,
            bls_key,
            voting_power: stake,
            is_active: true,
        })
    }
}

impl std::fmt::Debug for ValidatorInfoResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatorInfoResolver")
            .field("from", &self.from)
            .field("supernet_manager", &self.supernet_manager)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

fn decode_hex_response(response: &str) -> Result<Vec<u8>, StakeError> {
    let trimmed = response
        .strip_prefix("0x")
        .or_else(|| response.strip_prefix("0X"))
        .unwrap_or(response);
    hex::decode(trimmed).map_err(|e| StakeError::HexDecode(e.to_string()))
}

/// [`ContractCaller`] backed by `eth_call` over JSON-RPC HTTP.
#[derive(Debug, Clone)]
pub struct JsonRpcContractCaller {
    client: HttpClient,
}

impl JsonRpcContractCaller {
    /// Connect to the JSON-RPC endpoint at `url`.
    pub fn new(url: &str, request_timeout: Duration) -> Result<Self, StakeError> {
        let client = HttpClientBuilder::default()
            .request_timeout(request_timeout)
            .build(url)
            .map_err(|e| StakeError::ContractCall(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ContractCaller for JsonRpcContractCaller {
    async fn call(&self, from: Address, to: Address, input: Bytes) -> Result<String, StakeError> {
        let request = serde_json::json!({
            "from": from,
            "to": to,
            "data": input,
        });

        self.client
            .request("eth_call", rpc_params![request, "latest"])
            .await
            .map_err(|e| StakeError::ContractCall(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_sol_types::SolValue;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use supernet_crypto::BlsKeyPair;

    /// Caller answering every request with a fixed response.
    struct FixedCaller(Result<String, String>);

    #[async_trait]
    impl ContractCaller for FixedCaller {
        async fn call(&self, _from: Address, _to: Address, _input: Bytes) -> Result<String, StakeError> {
            self.0.clone().map_err(StakeError::ContractCall)
        }
    }

    /// Caller that never answers.
    struct StalledCaller;

    #[async_trait]
    impl ContractCaller for StalledCaller {
        async fn call(&self, _from: Address, _to: Address, _input: Bytes) -> Result<String, StakeError> {
            std::future::pending().await
        }
    }

    fn resolver(caller: impl ContractCaller + 'static) -> ValidatorInfoResolver {
        ValidatorInfoResolver::new(
            Arc::new(caller),
            Address::repeat_byte(0xcc),
            Address::repeat_byte(0xdd),
            Duration::from_millis(100),
        )
    }

    /// `getValidator` return data: the parameter encoding of `(Validator)`.
    fn encoded_validator(limbs: [U256; 4]) -> String {
        let validator = ICustomSupernetManager::Validator {
            blsKey: limbs,
            stake: U256::from(1),
            isWhitelisted: true,
            isActive: true,
        };
        format!("0x{}", hex::encode((validator,).abi_encode_params()))
    }

    #[tokio::test]
    async fn test_resolve_new_validator() {
        let keypair = BlsKeyPair::generate(&mut StdRng::seed_from_u64(1));
        let response = encoded_validator(keypair.public_key.to_big_int_limbs());

        let metadata = resolver(FixedCaller(Ok(response)))
            .resolve(Address::repeat_byte(7), U256::from(80))
            .await
            .unwrap();

        assert_eq!(metadata.address, Address::repeat_byte(7));
        assert_eq!(metadata.bls_key, keypair.public_key);
        assert_eq!(metadata.voting_power, U256::from(80));
        assert!(metadata.is_active);
    }

    #[tokio::test]
    async fn test_resolve_decodes_declared_return_shape() {
        let keypair = BlsKeyPair::generate(&mut StdRng::seed_from_u64(3));
        let limbs = keypair.public_key.to_big_int_limbs();
        let validator = ICustomSupernetManager::Validator {
            blsKey: limbs,
            stake: U256::from(1_000),
            isWhitelisted: false,
            isActive: true,
        };
        let returns = (validator,).abi_encode_params();
        // Seven static words: four key limbs, stake and two flags
        assert_eq!(returns.len(), 7 * 32);

        let decoded =
            ICustomSupernetManager::getValidatorCall::abi_decode_returns(&returns).unwrap();
        assert_eq!(decoded.stake, U256::from(1_000));
        assert_eq!(decoded.blsKey, limbs);
        assert!(!decoded.isWhitelisted);

        let metadata = resolver(FixedCaller(Ok(format!("0x{}", hex::encode(&returns)))))
            .resolve(Address::repeat_byte(7), U256::from(5))
            .await
            .unwrap();
        assert_eq!(metadata.bls_key, keypair.public_key);
        assert_eq!(metadata.voting_power, U256::from(5));
    }

    #[tokio::test]
    async fn test_resolve_accepts_unprefixed_hex() {
        let keypair = BlsKeyPair::generate(&mut StdRng::seed_from_u64(2));
        let response = encoded_validator(keypair.public_key.to_big_int_limbs());
        let unprefixed = response.trim_start_matches("0x").to_string();

        let metadata = resolver(FixedCaller(Ok(unprefixed)))
            .resolve(Address::repeat_byte(7), U256::from(1))
            .await
            .unwrap();
        assert_eq!(metadata.bls_key, keypair.public_key);
    }

    #[tokio::test]
    async fn test_resolve_errors() {
        let call_failed = resolver(FixedCaller(Err("connection refused".into())))
            .resolve(Address::ZERO, U256::from(1))
            .await;
        assert!(matches!(call_failed, Err(StakeError::ContractCall(_))));

        let bad_hex = resolver(FixedCaller(Ok("0xzz".into())))
            .resolve(Address::ZERO, U256::from(1))
            .await;
        assert!(matches!(bad_hex, Err(StakeError::HexDecode(_))));

        let short = resolver(FixedCaller(Ok("0x0102".into())))
            .resolve(Address::ZERO, U256::from(1))
            .await;
        assert!(matches!(short, Err(StakeError::AbiDecode(_))));

        let bad_key = resolver(FixedCaller(Ok(encoded_validator([U256::MAX; 4]))))
            .resolve(Address::ZERO, U256::from(1))
            .await;
        assert!(matches!(bad_key, Err(StakeError::BlsKey(_))));
    }

    #[tokio::test]
    async fn test_resolve_timeout() {
        let result = resolver(StalledCaller)
            .resolve(Address::ZERO, U256::from(1))
            .await;
        assert!(matches!(result, Err(StakeError::CallTimeout(_))));
    }

    #[test]
    fn test_decode_hex_response() {
        assert_eq!(decode_hex_response("0x0aff").unwrap(), vec![0x0a, 0xff]);
        assert_eq!(decode_hex_response("0aff").unwrap(), vec![0x0a, 0xff]);
        assert!(decode_hex_response("0x").unwrap().is_empty());
        assert!(decode_hex_response("0xabc").is_err());
    }

    #[tokio::test]
    async fn test_json_rpc_caller_rejects_bad_url() {
        assert!(JsonRpcContractCaller::new("not a url", Duration::from_secs(1)).is_err());
        assert!(JsonRpcContractCaller::new("http://127.0.0.1:8545", Duration::from_secs(1)).is_ok());
    }
}
