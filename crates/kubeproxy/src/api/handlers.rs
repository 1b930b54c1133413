//! Control-surface handlers.
//!
//! Every handler answers `OK` straight away and leaves the real work to the
//! background pool, so a slow API server or command never blocks the caller.

use std::sync::Arc;

use poem::handler;
use poem::web::Data;
use poem::web::Query;
use serde::Deserialize;
use tracing::info;
use tracing::warn;

use crate::app::pool::TaskPool;
use crate::domain::mirror::MirrorStore;
use crate::domain::EventDispatcher;
use crate::infrastructure::exec;

const OK: &str = "OK";

/// Query parameters for command execution
#[derive(Debug, Deserialize)]
pub struct ExecQuery {
    pub cmd: String,
}

/// Announce every mirrored container downstream as `containerInfos`.
#[handler]
pub async fn list_containers(
    store: Data<&Arc<MirrorStore>>,
    dispatcher: Data<&Arc<EventDispatcher>>,
    pool: Data<&TaskPool>,
) -> &'static str {
    let store = store.0.clone();
    let dispatcher = dispatcher.0.clone();

    pool.submit("list-containers", async move {
        let records = store.snapshot().await;
        info!(count = records.len(), "Listing containers");
        dispatcher.announce_all(records).await;
    });

    OK
}

/// Run a local command. Failures are only logged.
#[handler]
pub async fn exec_command(query: Query<ExecQuery>, pool: Data<&TaskPool>) -> &'static str {
    let Query(ExecQuery { cmd }) = query;

    pool.submit("exec", async move {
        if let Err(e) = exec::run_command(&cmd).await {
            warn!(cmd = %cmd, "Command failed: {e:?}");
        }
    });

    OK
}

#[handler]
pub async fn healthz() -> &'static str {
    OK
}
