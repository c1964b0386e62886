//! # Outbound Ports (Driven Ports)
//!
//! What the contract needs from its host: a keyed record store and a clock.
//!
//! Production: the ledger platform's state database and private data
//! collections. Testing and the local runtime: `InMemoryAssetRegistry`.

use shared_types::Timestamp;
use thiserror::Error;

/// Keyed record store, one key space per partition.
///
/// The ledger serializes commits per key; operations read first, stage every
/// write in a [`WriteBatch`], and commit once after all checks passed.
pub trait AssetRegistry: Send + Sync {
    /// Read one record.
    fn get(&self, partition: &str, key: &str) -> Result<Option<Vec<u8>>, RegistryError>;

    /// Records with `start <= key < end`, in key order. An empty `end` is
    /// unbounded.
    fn range(
        &self,
        partition: &str,
        start: &str,
        end: &str,
    ) -> Result<Vec<(String, Vec<u8>)>, RegistryError>;

    /// Apply a batch atomically: all writes or none.
    fn commit(&self, batch: WriteBatch) -> Result<(), RegistryError>;

    /// Write a single record.
    fn put(&self, partition: &str, key: &str, value: Vec<u8>) -> Result<(), RegistryError> {
        let mut batch = WriteBatch::new();
        batch.put(partition, key, value);
        self.commit(batch)
    }

    /// Delete a single record.
    fn delete(&self, partition: &str, key: &str) -> Result<(), RegistryError> {
        let mut batch = WriteBatch::new();
        batch.delete(partition, key);
        self.commit(batch)
    }
}

/// One staged write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    Put {
        partition: String,
        key: String,
        value: Vec<u8>,
    },
    Delete {
        partition: String,
        key: String,
    },
}

/// Writes of one operation, applied together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, partition: &str, key: &str, value: Vec<u8>) {
        self.ops.push(WriteOp::Put {
            partition: partition.to_string(),
            key: key.to_string(),
            value,
        });
    }

    pub fn delete(&mut self, partition: &str, key: &str) {
        self.ops.push(WriteOp::Delete {
            partition: partition.to_string(),
            key: key.to_string(),
        });
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Consume the batch, yielding writes in staging order.
    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }
}

/// Registry failures. Callers report them as data errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Registry unavailable: {0}")]
    Unavailable(String),

    #[error("Commit rejected: {0}")]
    CommitRejected(String),
}

/// Source of the invocation timestamp when the caller supplies none.
pub trait TimeSource: Send + Sync {
    fn now(&self) -> Timestamp;
}
