//! Stake transfer event extraction from block receipts.

use alloy_primitives::{Address, Bytes};
use alloy_sol_types::SolEvent;
use supernet_types::{Log, Receipt, StakeTransferEvent};
use tracing::{debug, trace};

use crate::contracts::IValidatorSet;
use crate::error::StakeError;

/// Topics of a `Transfer` log: signature plus two indexed addresses.
const TRANSFER_TOPIC_COUNT: usize = 3;

/// Size of the non-indexed `value` word.
const TRANSFER_DATA_SIZE: usize = 32;

/// Scans receipts for `Transfer` logs of the validator set contract.
#[derive(Clone, Copy, Debug)]
pub struct TransferEventExtractor {
    validator_set_contract: Address,
}

impl TransferEventExtractor {
    /// Create an extractor for logs emitted by `validator_set_contract`.
    pub fn new(validator_set_contract: Address) -> Self {
        Self {
            validator_set_contract,
        }
    }

    /// Contract whose logs are considered.
    pub fn validator_set_contract(&self) -> Address {
        self.validator_set_contract
    }

    /// Extract transfer events in receipt order, then log order.
    ///
    /// Failed receipts, logs of other contracts and logs with a different
    /// signature are skipped. A log carrying the `Transfer` signature that
    /// cannot be decoded aborts the extraction.
    pub fn extract(
        &self,
        epoch: u64,
        receipts: &[Receipt],
    ) -> Result<Vec<StakeTransferEvent>, StakeError> {
        let mut events = Vec::new();

        for receipt in receipts.iter().filter(|r| r.is_success()) {
            for log in &receipt.logs {
                if log.address != self.validator_set_contract {
                    continue;
                }

                if log.signature() != Some(&IValidatorSet::Transfer::SIGNATURE_HASH) {
                    trace!(epoch, "Skipping non-transfer log of validator set contract");
                    continue;
                }

                let event = decode_transfer_log(log)?;
                debug!(
                    epoch,
                    from = %event.from,
                    to = %event.to,
                    value = %event.value,
                    "Extracted stake transfer event"
                );
                events.push(event);
            }
        }

        Ok(events)
    }
}

fn decode_transfer_log(log: &Log) -> Result<StakeTransferEvent, StakeError> {
    if log.topics.len() != TRANSFER_TOPIC_COUNT {
        return Err(StakeError::LogDecode(format!(
            "expected {TRANSFER_TOPIC_COUNT} topics, got {}",
            log.topics.len()
        )));
    }
    if log.data.len() != TRANSFER_DATA_SIZE {
        return Err(StakeError::LogDecode(format!(
            "expected {TRANSFER_DATA_SIZE} data bytes, got {}",
            log.data.len()
        )));
    }

    let transfer = IValidatorSet::Transfer::decode_raw_log(log.topics.iter().copied(), &log.data)
        .map_err(|e| StakeError::LogDecode(e.to_string()))?;

    Ok(StakeTransferEvent::new(transfer.from, transfer.to, transfer.value))
}

/// Build the `Transfer` log `contract` emits for `event`.
pub fn transfer_log(contract: Address, event: &StakeTransferEvent) -> Log {
    Log::new(
        contract,
        vec![
            IValidatorSet::Transfer::SIGNATURE_HASH,
            event.from.into_word(),
            event.to.into_word(),
        ],
        Bytes::copy_from_slice(&event.value.to_be_bytes::<32>()),
    )
}
