use crate::ports::outbound::{AssetRegistry, RegistryError, WriteBatch, WriteOp};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::ops::Bound;

type Partitions = BTreeMap<String, BTreeMap<String, Vec<u8>>>;

/// In-memory registry for tests and the local runtime.
///
/// Commits take the write lock, so a batch is applied as a whole or, when
/// it fails validation, not at all.
#[derive(Debug, Default)]
pub struct InMemoryAssetRegistry {
    partitions: RwLock<Partitions>,
}

impl InMemoryAssetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every partition, for comparing before and after.
    #[must_use]
    pub fn snapshot(&self) -> Partitions {
        self.partitions.read().clone()
    }

    /// Number of records in `partition`.
    #[must_use]
    pub fn len(&self, partition: &str) -> usize {
        self.partitions.read().get(partition).map_or(0, BTreeMap::len)
    }
}

impl AssetRegistry for InMemoryAssetRegistry {
    fn get(&self, partition: &str, key: &str) -> Result<Option<Vec<u8>>, RegistryError> {
        Ok(self
            .partitions
            .read()
            .get(partition)
            .and_then(|records| records.get(key))
            .cloned())
    }

    fn range(
        &self,
        partition: &str,
        start: &str,
        end: &str,
    ) -> Result<Vec<(String, Vec<u8>)>, RegistryError> {
        let partitions = self.partitions.read();
        let Some(records) = partitions.get(partition) else {
            return Ok(Vec::new());
        };
        if !end.is_empty() && end <= start {
            return Ok(Vec::new());
        }
        let upper = if end.is_empty() {
            Bound::Unbounded
        } else {
            Bound::Excluded(end.to_string())
        };
        Ok(records
            .range((Bound::Included(start.to_string()), upper))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn commit(&self, batch: WriteBatch) -> Result<(), RegistryError> {
        let ops = batch.into_ops();
        if ops.iter().any(|op| match op {
            WriteOp::Put { key, .. } | WriteOp::Delete { key, .. } => key.is_empty(),
        }) {
            return Err(RegistryError::CommitRejected("empty key".into()));
        }

        let mut partitions = self.partitions.write();
        for op in ops {
            match op {
                WriteOp::Put {
                    partition,
                    key,
                    value,
                } => {
                    partitions.entry(partition).or_default().insert(key, value);
                }
                WriteOp::Delete { partition, key } => {
                    if let Some(records) = partitions.get_mut(&partition) {
                        records.remove(&key);
                    }
                }
            }
        }
        Ok(())
    }
}
