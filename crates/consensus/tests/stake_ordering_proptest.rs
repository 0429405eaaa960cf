//! Property tests: the outcome of a validator set update, delta or error,
//! depends on the multiset of stake events only, not on the order in which
//! they were observed.

use std::sync::Arc;

use alloy_sol_types::{SolCall, SolValue};
use async_trait::async_trait;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use supernet_consensus::contracts::ICustomSupernetManager;
use supernet_consensus::{
    transfer_log, AccountSet, ContractCaller, PostBlockRequest, StakeError, StakeManager,
    StakeManagerConfig, SupernetStakeManager, ValidatorMetadata, ValidatorSetDelta,
};
use supernet_crypto::{BlsKeyPair, BlsPublicKey};
use supernet_storage::InMemoryStakeEventStore;
use supernet_types::{Address, Bytes, FullBlock, Receipt, StakeTransferEvent, U256};

fn bls_key(id: u8) -> BlsPublicKey {
    BlsKeyPair::generate(&mut StdRng::seed_from_u64(id as u64)).public_key
}

/// Every address is registered with its deterministic key.
struct RegisteredEverywhere;

#[async_trait]
impl ContractCaller for RegisteredEverywhere {
    async fn call(&self, _from: Address, _to: Address, input: Bytes) -> Result<String, StakeError> {
        let call = ICustomSupernetManager::getValidatorCall::abi_decode(&input)
            .map_err(|e| StakeError::ContractCall(e.to_string()))?;
        let validator = ICustomSupernetManager::Validator {
            blsKey: bls_key(call.validator[0]).to_big_int_limbs(),
            stake: U256::ZERO,
            isWhitelisted: true,
            isActive: true,
        };
        Ok(format!("0x{}", hex::encode(validator.abi_encode())))
    }
}

fn current_set() -> AccountSet {
    [(1u8, 100u64), (2, 50), (3, 75)]
        .iter()
        .map(|(id, power)| {
            ValidatorMetadata::new(Address::repeat_byte(*id), bls_key(*id), U256::from(*power))
        })
        .collect::<Vec<_>>()
        .into()
}

/// Delta, or the rendered error, for `events` posted one per block.
fn compute_delta(
    events: &[StakeTransferEvent],
    max_size: usize,
) -> Result<ValidatorSetDelta, String> {
    let config = StakeManagerConfig::new(Address::repeat_byte(0xee))
        .with_max_validator_set_size(max_size);
    let contract = config.validator_set_contract;
    let manager = SupernetStakeManager::new(
        config,
        Arc::new(InMemoryStakeEventStore::new()),
        Arc::new(RegisteredEverywhere),
    )
    .unwrap();

    // One event per block to exercise appends across blocks
    for (i, event) in events.iter().enumerate() {
        let block = FullBlock::new(
            i as u64 + 1,
            vec![Receipt::success(vec![transfer_log(contract, event)])],
        );
        manager
            .post_block(&PostBlockRequest::new(block, 0, false))
            .unwrap();
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    runtime
        .block_on(manager.update_validator_set(0, &current_set()))
        .map_err(|e| e.to_string())
}

/// Stakes and unstakes freely interleaved over addresses 1..=6, so some
/// inputs underflow or unstake from addresses that never held stake.
fn stake_events() -> impl Strategy<Value = Vec<StakeTransferEvent>> {
    let stake = (1u8..=6, 1u64..200)
        .prop_map(|(id, v)| StakeTransferEvent::stake(Address::repeat_byte(id), U256::from(v)));
    let unstake = (1u8..=6, 1u64..200)
        .prop_map(|(id, v)| StakeTransferEvent::unstake(Address::repeat_byte(id), U256::from(v)));

    prop::collection::vec(prop_oneof![3 => stake, 1 => unstake], 1..16)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn delta_is_order_independent(
        (events, shuffled) in stake_events().prop_flat_map(|events| {
            let shuffled = Just(events.clone()).prop_shuffle();
            (Just(events), shuffled)
        }),
        max_size in 1usize..8,
    ) {
        prop_assert_eq!(compute_delta(&events, max_size), compute_delta(&shuffled, max_size));
    }

    #[test]
    fn applied_set_respects_cap(events in stake_events(), max_size in 1usize..8) {
        let current = current_set();
        let Ok(delta) = compute_delta(&events, max_size) else {
            return Ok(());
        };
        let next = current.apply_delta(&delta).unwrap();

        prop_assert!(next.len() <= max_size);
        prop_assert!(next.iter().all(|v| v.voting_power > U256::ZERO));
    }
}
