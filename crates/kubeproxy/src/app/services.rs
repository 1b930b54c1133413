use std::sync::Arc;

use crate::app::pool::TaskPool;
use crate::domain::mirror::MirrorStore;
use crate::domain::mirror::Reflector;
use crate::domain::EventDispatcher;
use crate::infrastructure::k8s::ResourceWatcher;

/// Application dependencies - simple struct with Arc-wrapped services
pub struct ApplicationServices {
    pub store: Arc<MirrorStore>,
    pub dispatcher: Arc<EventDispatcher>,
    pub reflector: Arc<Reflector>,
    pub watcher: Arc<ResourceWatcher>,
    pub pool: TaskPool,
}
