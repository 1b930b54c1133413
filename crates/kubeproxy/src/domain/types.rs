//! Core data types shared by the mirror, the dispatcher and the notifier.

use std::fmt;

/// One observed pod, reduced to what the downstream plugin understands.
///
/// `id` is the sole key used by the mirror store and by reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContainerRecord {
    pub id: String,
    pub name: String,
    pub image_repo: String,
    pub image_tag: String,
    pub running: bool,
}

impl ContainerRecord {
    /// Record whose identity and display name are both `name`.
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: name.clone(),
            name,
            ..Default::default()
        }
    }

    pub fn with_image(mut self, image_repo: impl Into<String>, image_tag: impl Into<String>) -> Self {
        self.image_repo = image_repo.into();
        self.image_tag = image_tag.into();
        self
    }

    pub fn with_running(mut self, running: bool) -> Self {
        self.running = running;
        self
    }
}

/// Event produced by the watch stream, already converted to records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// Object was added or modified.
    Applied(ContainerRecord),
    /// Object was deleted.
    Deleted(ContainerRecord),
    /// Full listing, emitted when the stream (re)starts.
    Restarted(Vec<ContainerRecord>),
}

/// Mutation applied to the mirror store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceEvent {
    Created(ContainerRecord),
    Updated {
        old: ContainerRecord,
        new: ContainerRecord,
    },
    Deleted(ContainerRecord),
}

impl ResourceEvent {
    pub fn id(&self) -> &str {
        match self {
            ResourceEvent::Created(record) | ResourceEvent::Deleted(record) => &record.id,
            ResourceEvent::Updated { new, .. } => &new.id,
        }
    }
}

/// Lifecycle action understood by the game-server plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleAction {
    CreateContainer,
    DestroyContainer,
    ContainerInfos,
}

impl LifecycleAction {
    /// Wire name sent as the `action` form field.
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleAction::CreateContainer => "createContainer",
            LifecycleAction::DestroyContainer => "destroyContainer",
            LifecycleAction::ContainerInfos => "containerInfos",
        }
    }
}

impl fmt::Display for LifecycleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single outbound notification. Built, sent once, then dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub action: LifecycleAction,
    pub record: ContainerRecord,
}

impl Notification {
    pub fn new(action: LifecycleAction, record: ContainerRecord) -> Self {
        Self { action, record }
    }

    /// Form fields in wire order.
    ///
    /// `destroyContainer` only carries the identity; `running` is only sent
    /// with `containerInfos` and is always `true` there.
    pub fn form_fields(&self) -> Vec<(&'static str, &str)> {
        let mut fields = vec![("action", self.action.as_str()), ("id", self.record.id.as_str())];

        if self.action == LifecycleAction::DestroyContainer {
            return fields;
        }

        fields.push(("name", self.record.name.as_str()));
        fields.push(("imageRepo", self.record.image_repo.as_str()));
        fields.push(("imageTag", self.record.image_tag.as_str()));

        if self.action == LifecycleAction::ContainerInfos {
            fields.push(("running", "true"));
        }

        fields
    }

    /// `application/x-www-form-urlencoded` body.
    pub fn encode(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.form_fields())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use similar_asserts::assert_eq;

    use super::*;

    #[test]
    fn action_wire_names() {
        assert_eq!(LifecycleAction::CreateContainer.to_string(), "createContainer");
        assert_eq!(LifecycleAction::DestroyContainer.to_string(), "destroyContainer");
        assert_eq!(LifecycleAction::ContainerInfos.to_string(), "containerInfos");
        for action in [
            LifecycleAction::CreateContainer,
            LifecycleAction::DestroyContainer,
            LifecycleAction::ContainerInfos,
        ] {
            assert_eq!(action.to_string(), action.as_str());
        }
    }

    #[test]
    fn create_notification_carries_image_fields() {
        let record = ContainerRecord::named("pod-1").with_image("nginx", "1.25");
        let notification = Notification::new(LifecycleAction::CreateContainer, record);

        assert_eq!(
            notification.encode(),
            "action=createContainer&id=pod-1&name=pod-1&imageRepo=nginx&imageTag=1.25"
        );
    }

    #[test]
    fn destroy_notification_only_carries_identity() {
        let record = ContainerRecord::named("pod-1").with_image("nginx", "1.25");
        let notification = Notification::new(LifecycleAction::DestroyContainer, record);

        assert_eq!(notification.encode(), "action=destroyContainer&id=pod-1");
    }

    #[test]
    fn container_infos_always_reports_running() {
        let record = ContainerRecord::named("pod-1").with_running(false);
        let notification = Notification::new(LifecycleAction::ContainerInfos, record);

        assert_eq!(
            notification.form_fields().last().copied(),
            Some(("running", "true"))
        );
        assert_eq!(
            notification.encode(),
            "action=containerInfos&id=pod-1&name=pod-1&imageRepo=&imageTag=&running=true"
        );
    }

    #[test]
    fn encode_escapes_reserved_characters() {
        let record = ContainerRecord::named("a b&c").with_image("registry:5000/app", "v1");
        let notification = Notification::new(LifecycleAction::CreateContainer, record);

        assert_eq!(
            notification.encode(),
            "action=createContainer&id=a+b%26c&name=a+b%26c&imageRepo=registry%3A5000%2Fapp&imageTag=v1"
        );
    }

    #[test]
    fn event_identity() {
        let a = ContainerRecord::named("a");
        assert_eq!(ResourceEvent::Created(a.clone()).id(), "a");
        assert_eq!(ResourceEvent::Deleted(a.clone()).id(), "a");
        assert_eq!(
            ResourceEvent::Updated {
                old: a.clone(),
                new: a.with_running(true)
            }
            .id(),
            "a"
        );
    }
}
