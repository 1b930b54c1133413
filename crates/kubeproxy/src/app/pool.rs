//! Bounded pool for fire-and-forget control-surface work.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::select;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::debug;
use tracing::warn;

/// Runs background jobs with a concurrency limit.
///
/// Jobs still waiting for a slot are dropped on cancellation; jobs already
/// running are left to finish and can be awaited with [`TaskPool::drain`].
#[derive(Clone)]
pub struct TaskPool {
    tracker: TaskTracker,
    permits: Arc<Semaphore>,
    cancellation_token: CancellationToken,
}

impl TaskPool {
    pub fn new(max_concurrent: usize, cancellation_token: CancellationToken) -> Self {
        Self {
            tracker: TaskTracker::new(),
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
            cancellation_token,
        }
    }

    /// Queue a job. Returns false when the pool no longer accepts work.
    pub fn submit<F>(&self, job: &'static str, work: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.tracker.is_closed() || self.cancellation_token.is_cancelled() {
            warn!(job, "Background job rejected, shutting down");
            return false;
        }

        let permits = self.permits.clone();
        let token = self.cancellation_token.clone();
        self.tracker.spawn(async move {
            let _permit = select! {
                biased;
                _ = token.cancelled() => {
                    debug!(job, "Queued background job dropped on shutdown");
                    return;
                }
                permit = permits.acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => return,
                },
            };

            debug!(job, "Background job started");
            work.await;
            debug!(job, "Background job finished");
        });
        true
    }

    /// Jobs queued or running.
    pub fn len(&self) -> usize {
        self.tracker.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracker.is_empty()
    }

    /// Stop accepting jobs and wait for the remaining ones.
    ///
    /// Returns false when `timeout` elapsed first.
    pub async fn drain(&self, timeout: Duration) -> bool {
        self.tracker.close();
        match tokio::time::timeout(timeout, self.tracker.wait()).await {
            Ok(()) => true,
            Err(_) => {
                warn!(remaining = self.tracker.len(), "Background jobs did not drain in time");
                false
            }
        }
    }
}
