//! Kubernetes integration module.
//!
//! - [`ResourceWatcher`]: list + watch + periodic resync of pods into the mirror
//! - [`record`]: conversion from [`k8s_openapi`] pods to mirror records
//! - [`KubernetesError`]: failures talking to the API server

pub mod record;
pub mod types;
pub mod watcher;

pub use types::KubernetesError;
pub use watcher::ResourceWatcher;
