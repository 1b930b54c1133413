//! Maps mirror mutations to lifecycle notifications.

use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::debug;
use tracing::info;

use crate::domain::types::ContainerRecord;
use crate::domain::types::LifecycleAction;
use crate::domain::types::Notification;
use crate::domain::types::ResourceEvent;

/// Delivers notifications downstream.
///
/// Delivery is best effort: implementations log failures and never report
/// them back to the caller.
pub trait NotificationSink: Send + Sync {
    fn send<'a>(&'a self, notification: &'a Notification) -> BoxFuture<'a, ()>;
}

/// Turns raw resource events into at most one notification each.
pub struct EventDispatcher {
    sink: Arc<dyn NotificationSink>,
}

impl EventDispatcher {
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self { sink }
    }

    /// The notification an event maps to. Updates are not actionable downstream.
    pub fn notification_for(event: &ResourceEvent) -> Option<Notification> {
        match event {
            ResourceEvent::Created(record) => Some(Notification::new(
                LifecycleAction::CreateContainer,
                record.clone(),
            )),
            ResourceEvent::Updated { .. } => None,
            ResourceEvent::Deleted(record) => Some(Notification::new(
                LifecycleAction::DestroyContainer,
                record.clone(),
            )),
        }
    }

    /// Send the notification for `event`, if any. No deduplication happens here.
    pub async fn dispatch(&self, event: &ResourceEvent) {
        let Some(notification) = Self::notification_for(event) else {
            debug!(id = event.id(), "Update suppressed");
            return;
        };

        info!(
            id = %notification.record.id,
            action = %notification.action,
            "Dispatching lifecycle notification"
        );
        self.sink.send(&notification).await;
    }

    /// Send one `containerInfos` notification per record, in order.
    ///
    /// Returns the number of notifications handed to the sink.
    pub async fn announce_all(&self, records: Vec<ContainerRecord>) -> usize {
        let count = records.len();
        for record in records {
            debug!(id = %record.id, "Announcing container");
            let notification = Notification::new(LifecycleAction::ContainerInfos, record);
            self.sink.send(&notification).await;
        }
        info!(count, "Announced all containers");
        count
    }
}

#[cfg(test)]
mod tests {
    use similar_asserts::assert_eq;

    use super::*;
    use crate::testing::RecordingSink;

    fn dispatcher() -> (EventDispatcher, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::default());
        (EventDispatcher::new(sink.clone()), sink)
    }

    #[tokio::test]
    async fn create_and_delete_map_to_lifecycle_actions() {
        let (dispatcher, sink) = dispatcher();
        let pod = ContainerRecord::named("pod-1");

        dispatcher.dispatch(&ResourceEvent::Created(pod.clone())).await;
        dispatcher.dispatch(&ResourceEvent::Deleted(pod.clone())).await;

        assert_eq!(
            sink.actions(),
            vec![
                (LifecycleAction::CreateContainer, "pod-1".to_string()),
                (LifecycleAction::DestroyContainer, "pod-1".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn updates_never_notify() {
        let (dispatcher, sink) = dispatcher();
        let old = ContainerRecord::named("pod-1");
        let new = old.clone().with_running(true).with_image("nginx", "latest");

        dispatcher.dispatch(&ResourceEvent::Updated { old, new }).await;

        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn duplicate_creates_are_not_deduplicated() {
        let (dispatcher, sink) = dispatcher();
        let pod = ContainerRecord::named("pod-1");

        dispatcher.dispatch(&ResourceEvent::Created(pod.clone())).await;
        dispatcher.dispatch(&ResourceEvent::Created(pod)).await;

        assert_eq!(sink.len(), 2);
    }

    #[tokio::test]
    async fn announce_all_sends_container_infos_per_record() {
        let (dispatcher, sink) = dispatcher();
        let records = vec![
            ContainerRecord::named("a").with_running(false),
            ContainerRecord::named("b").with_running(true),
        ];

        let sent = dispatcher.announce_all(records).await;

        assert_eq!(sent, 2);
        let notifications = sink.notifications();
        assert_eq!(notifications.len(), 2);
        for notification in &notifications {
            assert_eq!(notification.action, LifecycleAction::ContainerInfos);
            assert!(notification.form_fields().contains(&("running", "true")));
        }
        let ids: Vec<_> = notifications.iter().map(|n| n.record.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn announce_all_with_empty_snapshot_sends_nothing() {
        let (dispatcher, sink) = dispatcher();
        assert_eq!(dispatcher.announce_all(Vec::new()).await, 0);
        assert!(sink.is_empty());
    }
}
