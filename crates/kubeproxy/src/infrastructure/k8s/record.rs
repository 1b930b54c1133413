//! Conversion from Kubernetes pods to mirror records.

use k8s_openapi::api::core::v1::Pod;

use crate::domain::types::ContainerRecord;

const RUNNING_PHASE: &str = "Running";

impl From<&Pod> for ContainerRecord {
    fn from(pod: &Pod) -> Self {
        let name = pod
            .metadata
            .name
            .clone()
            .unwrap_or_else(|| "unknown".to_string());

        let image = pod
            .spec
            .as_ref()
            .and_then(|spec| spec.containers.first())
            .and_then(|container| container.image.as_deref())
            .unwrap_or_default();
        let (image_repo, image_tag) = split_repo_and_tag(image);

        let running = pod
            .status
            .as_ref()
            .and_then(|status| status.phase.as_deref())
            == Some(RUNNING_PHASE);

        ContainerRecord::named(name)
            .with_image(image_repo, image_tag)
            .with_running(running)
    }
}

/// How record identities are derived from pods.
///
/// Pod names are only unique within a namespace, so a cluster-wide watch
/// qualifies the identity with the namespace. The display name stays the
/// bare pod name either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityScope {
    Namespace,
    Cluster,
}

impl IdentityScope {
    pub fn for_namespace(namespace: Option<&str>) -> Self {
        match namespace {
            Some(_) => IdentityScope::Namespace,
            None => IdentityScope::Cluster,
        }
    }

    pub fn record(self, pod: &Pod) -> ContainerRecord {
        let record = ContainerRecord::from(pod);
        match self {
            IdentityScope::Namespace => record,
            IdentityScope::Cluster => {
                let namespace = pod.metadata.namespace.as_deref().unwrap_or_default();
                ContainerRecord {
                    id: format!("{namespace}/{}", record.name),
                    ..record
                }
            }
        }
    }
}

/// Split `repo[:tag]` into its parts.
///
/// A colon belonging to a registry port (`host:5000/app`) is not a tag
/// separator. Digest references are kept whole in the repo.
pub fn split_repo_and_tag(image: &str) -> (&str, &str) {
    if image.contains('@') {
        return (image, "");
    }

    match image.rsplit_once(':') {
        Some((repo, tag)) if !tag.contains('/') => (repo, tag),
        _ => (image, ""),
    }
}
