//! RocksDB-based implementation of `StakeEventStore`.
//!
//! Events live in the `stake_events` column family under an
//! [`EpochEventKey`] of `(epoch, sequence)`, both big-endian, so one epoch is
//! a contiguous key range iterated in append order. Each append is a single
//! synced write batch.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use rocksdb::{
    ColumnFamily, ColumnFamilyDescriptor, Direction, IteratorMode, Options, WriteBatch,
    WriteOptions, DB,
};
use supernet_types::StakeTransferEvent;
use tracing::debug;

use crate::error::StorageError;
use crate::staking::{StakeEventStore, StakingStoreResult};

/// Column family holding the stake events.
pub const CF_STAKE_EVENTS: &str = "stake_events";

/// Helper to convert database errors to storage errors.
fn db_err(e: impl std::fmt::Display) -> StorageError {
    StorageError::Database(e.to_string())
}

/// Key for the stake events table: (epoch, sequence within the epoch)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct EpochEventKey {
    /// Epoch the event belongs to
    pub epoch: u64,
    /// Position of the event in the epoch's append order
    pub sequence: u64,
}

impl EpochEventKey {
    /// Encoded key length.
    pub const LEN: usize = 16;

    /// Create a new epoch-event key
    pub fn new(epoch: u64, sequence: u64) -> Self {
        Self { epoch, sequence }
    }

    /// Big-endian encoding; byte order matches `(epoch, sequence)` order.
    pub fn encode(self) -> [u8; Self::LEN] {
        let mut buf = [0u8; Self::LEN];
        buf[..8].copy_from_slice(&self.epoch.to_be_bytes());
        buf[8..].copy_from_slice(&self.sequence.to_be_bytes());
        buf
    }

    /// Decode a key written by [`EpochEventKey::encode`].
    pub fn decode(value: &[u8]) -> StakingStoreResult<Self> {
        let bytes: [u8; Self::LEN] = value.try_into().map_err(|_| {
            StorageError::Deserialization(format!("invalid event key length {}", value.len()))
        })?;
        let mut epoch = [0u8; 8];
        let mut sequence = [0u8; 8];
        epoch.copy_from_slice(&bytes[..8]);
        sequence.copy_from_slice(&bytes[8..]);
        Ok(Self {
            epoch: u64::from_be_bytes(epoch),
            sequence: u64::from_be_bytes(sequence),
        })
    }
}

/// RocksDB-backed stake event store.
pub struct RocksStakeEventStore {
    db: DB,
    path: PathBuf,
    /// Serializes sequence allocation across concurrent appends.
    write_lock: Mutex<()>,
}

impl std::fmt::Debug for RocksStakeEventStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RocksStakeEventStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl RocksStakeEventStore {
    /// Open or create a store at `path`.
    pub fn open(path: impl AsRef<Path>) -> StakingStoreResult<Self> {
        let path = path.as_ref().to_path_buf();

        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);
        let cf_descriptors = vec![ColumnFamilyDescriptor::new(
            CF_STAKE_EVENTS,
            Options::default(),
        )];
        let db = DB::open_cf_descriptors(&opts, &path, cf_descriptors).map_err(db_err)?;

        debug!(path = %path.display(), "Opened stake event store");

        Ok(Self {
            db,
            path,
            write_lock: Mutex::new(()),
        })
    }

    /// Directory holding the database.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn events_cf(&self) -> StakingStoreResult<&ColumnFamily> {
        self.db
            .cf_handle(CF_STAKE_EVENTS)
            .ok_or_else(|| StorageError::Database("missing stake_events column family".into()))
    }

    /// Sequence number the next event of `epoch` is stored under.
    fn next_sequence(&self, cf: &ColumnFamily, epoch: u64) -> StakingStoreResult<u64> {
        let last = EpochEventKey::new(epoch, u64::MAX).encode();
        let mut iter = self
            .db
            .iterator_cf(cf, IteratorMode::From(&last, Direction::Reverse));

        match iter.next().transpose().map_err(db_err)? {
            Some((key, _)) => {
                let key = EpochEventKey::decode(&key)?;
                if key.epoch != epoch {
                    return Ok(0);
                }
                key.sequence.checked_add(1).ok_or_else(|| {
                    StorageError::Database(format!("event sequence exhausted for epoch {epoch}"))
                })
            }
            None => Ok(0),
        }
    }
}

impl StakeEventStore for RocksStakeEventStore {
    fn append(&self, epoch: u64, events: &[StakeTransferEvent]) -> StakingStoreResult<()> {
        if events.is_empty() {
            return Ok(());
        }

        let _guard = self.write_lock.lock();
        let cf = self.events_cf()?;
        let first = self.next_sequence(cf, epoch)?;

        let mut batch = WriteBatch::default();
        for (offset, event) in (0u64..).zip(events) {
            let sequence = first.checked_add(offset).ok_or_else(|| {
                StorageError::Database(format!("event sequence exhausted for epoch {epoch}"))
            })?;
            let value = bincode::serialize(event)
                .map_err(|e| StorageError::Serialization(e.to_string()))?;
            batch.put_cf(cf, EpochEventKey::new(epoch, sequence).encode(), value);
        }

        let mut write_opts = WriteOptions::default();
        write_opts.set_sync(true);
        self.db.write_opt(batch, &write_opts).map_err(db_err)?;

        debug!(epoch, appended = events.len(), first_sequence = first, "Stored stake events");
        Ok(())
    }

    fn read(&self, epoch: u64) -> StakingStoreResult<Vec<StakeTransferEvent>> {
        let cf = self.events_cf()?;
        let start = EpochEventKey::new(epoch, 0).encode();

        let mut events = Vec::new();
        for entry in self
            .db
            .iterator_cf(cf, IteratorMode::From(&start, Direction::Forward))
        {
            let (key, value) = entry.map_err(db_err)?;
            if EpochEventKey::decode(&key)?.epoch != epoch {
                break;
            }
            let event = bincode::deserialize(&value)
                .map_err(|e| StorageError::Deserialization(e.to_string()))?;
            events.push(event);
        }

        Ok(events)
    }
}
