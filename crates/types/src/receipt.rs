//! Finalized blocks, transaction receipts and logs.
//!
//! Only the parts of a receipt the stake engine reads are modelled here:
//! the execution status and the ordered logs.

use alloy_primitives::{Address, Bytes, B256};
use serde::{Deserialize, Serialize};

/// Receipt status of a reverted transaction.
pub const RECEIPT_STATUS_FAILED: u64 = 0;

/// Receipt status of a successfully executed transaction.
pub const RECEIPT_STATUS_SUCCESS: u64 = 1;

/// Log entry emitted during transaction execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Log {
    /// Address that emitted the log.
    pub address: Address,

    /// Topics (indexed parameters). `topics[0]` is the event signature.
    pub topics: Vec<B256>,

    /// Data (non-indexed parameters).
    pub data: Bytes,
}

impl Log {
    /// Create a new log entry.
    pub fn new(address: Address, topics: Vec<B256>, data: Bytes) -> Self {
        Self {
            address,
            topics,
            data,
        }
    }

    /// The event signature topic, if any.
    pub fn signature(&self) -> Option<&B256> {
        self.topics.first()
    }
}

/// Transaction receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// Status: 1 for success, 0 for failure.
    pub status: u64,

    /// Logs emitted by this transaction, in emission order.
    pub logs: Vec<Log>,
}

impl Receipt {
    /// Create a successful receipt carrying the given logs.
    pub fn success(logs: Vec<Log>) -> Self {
        Self {
            status: RECEIPT_STATUS_SUCCESS,
            logs,
        }
    }

    /// Create a failed receipt carrying the given logs.
    pub fn failed(logs: Vec<Log>) -> Self {
        Self {
            status: RECEIPT_STATUS_FAILED,
            logs,
        }
    }

    /// Whether the transaction executed successfully.
    pub fn is_success(&self) -> bool {
        self.status == RECEIPT_STATUS_SUCCESS
    }
}

/// A finalized block together with its receipts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FullBlock {
    /// Block number.
    pub number: u64,

    /// Receipts in transaction order.
    pub receipts: Vec<Receipt>,
}

impl FullBlock {
    /// Create a new block.
    pub fn new(number: u64, receipts: Vec<Receipt>) -> Self {
        Self { number, receipts }
    }
}
