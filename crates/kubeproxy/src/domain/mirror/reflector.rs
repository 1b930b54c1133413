//! Applies watch events to the mirror store and forwards the resulting
//! mutations to the dispatcher, one at a time and in receipt order.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;
use tracing::info;

use super::store::MirrorStore;
use super::store::Upsert;
use crate::domain::dispatcher::EventDispatcher;
use crate::domain::types::ContainerRecord;
use crate::domain::types::ResourceEvent;
use crate::domain::types::WatchEvent;

pub struct Reflector {
    store: Arc<MirrorStore>,
    dispatcher: Arc<EventDispatcher>,
}

impl Reflector {
    pub fn new(store: Arc<MirrorStore>, dispatcher: Arc<EventDispatcher>) -> Self {
        Self { store, dispatcher }
    }

    pub fn store(&self) -> &Arc<MirrorStore> {
        &self.store
    }

    /// Apply one watch event. Returns the mutations that were dispatched.
    pub async fn apply(&self, event: WatchEvent) -> Vec<ResourceEvent> {
        let mutations = match event {
            WatchEvent::Applied(record) => self.apply_one(record).await.into_iter().collect(),
            WatchEvent::Deleted(record) => self.delete_one(&record.id).await.into_iter().collect(),
            WatchEvent::Restarted(records) => self.reconcile(records).await,
        };

        for mutation in &mutations {
            self.dispatcher.dispatch(mutation).await;
        }

        mutations
    }

    async fn apply_one(&self, record: ContainerRecord) -> Option<ResourceEvent> {
        match self.store.upsert(record.clone()).await {
            Upsert::Inserted => Some(ResourceEvent::Created(record)),
            Upsert::Replaced(old) => Some(ResourceEvent::Updated { old, new: record }),
            Upsert::Unchanged => None,
        }
    }

    async fn delete_one(&self, id: &str) -> Option<ResourceEvent> {
        match self.store.remove(id).await {
            Some(removed) => Some(ResourceEvent::Deleted(removed)),
            None => {
                debug!(id, "Delete for unknown record ignored");
                None
            }
        }
    }

    /// Converge the store onto a full listing.
    ///
    /// Records missing from `records` become deletes, new ones become creates,
    /// changed ones become updates. Identical records produce nothing.
    async fn reconcile(&self, records: Vec<ContainerRecord>) -> Vec<ResourceEvent> {
        let listed: HashSet<&str> = records.iter().map(|r| r.id.as_str()).collect();
        let mut mutations = Vec::new();

        for id in self.store.ids().await {
            if !listed.contains(id.as_str()) {
                mutations.extend(self.delete_one(&id).await);
            }
        }

        for record in records.iter().cloned() {
            mutations.extend(self.apply_one(record).await);
        }

        info!(
            listed = records.len(),
            mutations = mutations.len(),
            "Reconciled mirror against full listing"
        );
        mutations
    }
}
