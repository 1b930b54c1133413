//! In-memory doubles shared by unit tests.

use std::sync::Mutex;

use futures::future::BoxFuture;
use futures::FutureExt;

use crate::domain::dispatcher::NotificationSink;
use crate::domain::types::LifecycleAction;
use crate::domain::types::Notification;

/// Sink that keeps every notification it is handed.
#[derive(Debug, Default)]
pub(crate) struct RecordingSink {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingSink {
    pub(crate) fn notifications(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }

    pub(crate) fn actions(&self) -> Vec<(LifecycleAction, String)> {
        self.notifications()
            .into_iter()
            .map(|n| (n.action, n.record.id))
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }
}

impl NotificationSink for RecordingSink {
    fn send<'a>(&'a self, notification: &'a Notification) -> BoxFuture<'a, ()> {
        async move {
            self.sent.lock().unwrap().push(notification.clone());
        }
        .boxed()
    }
}
