//! Local mirror of the watched pod collection.
//!
//! Records are replaced whole under a write lock, so readers either see the
//! previous record or the new one, never a mix.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::types::ContainerRecord;

/// Outcome of [`MirrorStore::upsert`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Upsert {
    Inserted,
    Replaced(ContainerRecord),
    Unchanged,
}

/// Concurrent identity -> record cache. One writer, many readers.
#[derive(Debug, Default)]
pub struct MirrorStore {
    records: RwLock<BTreeMap<String, ContainerRecord>>,
}

impl MirrorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a record. Identical records are left in place.
    pub async fn upsert(&self, record: ContainerRecord) -> Upsert {
        let mut records = self.records.write().await;

        match records.entry(record.id.clone()) {
            Entry::Vacant(slot) => {
                debug!(id = %slot.key(), "Inserted record into mirror");
                slot.insert(record);
                Upsert::Inserted
            }
            Entry::Occupied(slot) if *slot.get() == record => Upsert::Unchanged,
            Entry::Occupied(mut slot) => {
                debug!(id = %slot.key(), "Replaced record in mirror");
                Upsert::Replaced(slot.insert(record))
            }
        }
    }

    /// Remove a record, returning it when it was present.
    pub async fn remove(&self, id: &str) -> Option<ContainerRecord> {
        self.records.write().await.remove(id)
    }

    /// Point-in-time copy of every record, ordered by identity.
    pub async fn snapshot(&self) -> Vec<ContainerRecord> {
        self.records.read().await.values().cloned().collect()
    }

    pub async fn get(&self, id: &str) -> Option<ContainerRecord> {
        self.records.read().await.get(id).cloned()
    }

    pub async fn ids(&self) -> Vec<String> {
        self.records.read().await.keys().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}
