use std::fmt::Display;
use std::time::Duration;

use error_stack::Report;
use futures::Stream;
use futures::StreamExt;
use k8s_openapi::api::core::v1::Pod;
use kube::runtime::watcher;
use kube::Api;
use kube::Client;
use tokio::select;
use tokio::time::sleep;
use tokio::time::sleep_until;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::error;
use tracing::info;
use tracing::warn;

use crate::domain::mirror::Reflector;
use crate::domain::types::WatchEvent;
use crate::infrastructure::k8s::record::IdentityScope;
use crate::infrastructure::k8s::types::KubernetesError;

const RETRY_DELAY: Duration = Duration::from_secs(5);

/// Why a single watch stream stopped being consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StreamExit {
    Cancelled,
    ResyncDue,
    Ended,
}

/// Error yielded by a watch stream.
pub(crate) trait WatchFailure: Display {
    /// Reopening the stream cannot fix this failure.
    fn is_permanent(&self) -> bool;
}

impl WatchFailure for watcher::Error {
    fn is_permanent(&self) -> bool {
        let response = match self {
            watcher::Error::InitialListFailed(kube::Error::Api(response))
            | watcher::Error::WatchStartFailed(kube::Error::Api(response))
            | watcher::Error::WatchFailed(kube::Error::Api(response)) => response,
            watcher::Error::WatchError(response) => response,
            _ => return false,
        };
        // Missing credentials or RBAC grants do not heal on retry.
        matches!(response.code, 401 | 403)
    }
}

/// Keeps the mirror in sync with the pods of one namespace (or all of them).
///
/// Each stream starts with a full listing, so the mirror is reconciled
/// every time the stream is opened: at startup, after a failure, and every
/// `resync_period`.
pub struct ResourceWatcher {
    client: Client,
    namespace: Option<String>,
    resync_period: Duration,
}

impl ResourceWatcher {
    pub fn new(client: Client, namespace: Option<String>, resync_period: Duration) -> Self {
        Self {
            client,
            namespace,
            resync_period,
        }
    }

    /// Watch pods until cancelled.
    ///
    /// Transient stream failures are logged and the stream is reopened after
    /// a short delay. A rejection by the API server (401/403) ends the loop
    /// with an error, since the mirror can no longer be trusted.
    #[tracing::instrument(skip(self, reflector, cancellation_token), fields(namespace = ?self.namespace))]
    pub async fn run(
        &self,
        reflector: &Reflector,
        cancellation_token: CancellationToken,
    ) -> Result<(), Report<KubernetesError>> {
        info!(resync_period = ?self.resync_period, "Starting pod watcher");

        let api = self.api();
        watch_loop(
            reflector,
            &cancellation_token,
            self.resync_period,
            IdentityScope::for_namespace(self.namespace.as_deref()),
            || watcher::watcher(api.clone(), watcher::Config::default()).boxed(),
        )
        .await
    }

    fn api(&self) -> Api<Pod> {
        match &self.namespace {
            Some(ns) => Api::namespaced(self.client.clone(), ns),
            None => Api::all(self.client.clone()),
        }
    }
}

/// Open streams with `open` and feed them into the reflector until
/// cancelled or rejected.
pub(crate) async fn watch_loop<F, S, E>(
    reflector: &Reflector,
    cancellation_token: &CancellationToken,
    resync_period: Duration,
    scope: IdentityScope,
    mut open: F,
) -> Result<(), Report<KubernetesError>>
where
    F: FnMut() -> S,
    S: Stream<Item = Result<watcher::Event<Pod>, E>> + Unpin,
    E: WatchFailure,
{
    loop {
        let stream = open();
        let resync_at = Instant::now() + resync_period;

        match consume(reflector, stream, resync_at, scope, cancellation_token).await {
            Ok(StreamExit::Cancelled) => break,
            Ok(StreamExit::ResyncDue) => {
                info!("Resync period elapsed, relisting pods");
                continue;
            }
            Ok(StreamExit::Ended) => {
                warn!("Pod watch stream ended unexpectedly, restarting...");
            }
            Err(e) if matches!(e.current_context(), KubernetesError::WatchRejected { .. }) => {
                error!("Pod watch cannot recover: {e:?}");
                return Err(e);
            }
            Err(e) => {
                error!("Pod watch failed: {e:?}");
            }
        }

        select! {
            _ = cancellation_token.cancelled() => break,
            _ = sleep(RETRY_DELAY) => {}
        }
    }

    info!("Pod watcher shutdown requested");
    Ok(())
}

/// Feed watch events into the reflector until the stream stops, the resync
/// deadline passes or cancellation is requested.
///
/// The deadline and cancellation are only checked between events, so an
/// event that has been received is always fully applied and dispatched.
pub(crate) async fn consume<S, E>(
    reflector: &Reflector,
    mut stream: S,
    resync_at: Instant,
    scope: IdentityScope,
    cancellation_token: &CancellationToken,
) -> Result<StreamExit, Report<KubernetesError>>
where
    S: Stream<Item = Result<watcher::Event<Pod>, E>> + Unpin,
    E: WatchFailure,
{
    loop {
        let next = select! {
            biased;
            _ = cancellation_token.cancelled() => return Ok(StreamExit::Cancelled),
            _ = sleep_until(resync_at) => return Ok(StreamExit::ResyncDue),
            next = stream.next() => next,
        };

        match next {
            Some(Ok(event)) => {
                reflector.apply(to_watch_event(event, scope)).await;
            }
            Some(Err(e)) => {
                let message = format!("Watch stream error: {e}");
                let error = if e.is_permanent() {
                    KubernetesError::WatchRejected { message }
                } else {
                    KubernetesError::WatchFailed { message }
                };
                return Err(Report::new(error));
            }
            None => return Ok(StreamExit::Ended),
        }
    }
}

fn to_watch_event(event: watcher::Event<Pod>, scope: IdentityScope) -> WatchEvent {
    match event {
        watcher::Event::Applied(pod) => WatchEvent::Applied(scope.record(&pod)),
        watcher::Event::Deleted(pod) => WatchEvent::Deleted(scope.record(&pod)),
        watcher::Event::Restarted(pods) => {
            WatchEvent::Restarted(pods.iter().map(|pod| scope.record(pod)).collect())
        }
    }
}
