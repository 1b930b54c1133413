use std::time::Duration;

use anyhow::anyhow;
use anyhow::Result;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::api::ControlServer;
use crate::app::core::Application;

/// Task manager, responsible for starting and managing all background tasks
pub struct Tasks {
    tasks: Vec<(&'static str, JoinHandle<Result<()>>)>,
    cancellation_token: CancellationToken,
}

impl Tasks {
    pub fn new(cancellation_token: CancellationToken) -> Self {
        Self {
            tasks: Vec::new(),
            cancellation_token,
        }
    }

    /// Start all background tasks
    pub fn spawn_all_tasks(&mut self, app: &Application) {
        let watcher_task = self.spawn_watcher_task(app);
        self.tasks.push(("pod watcher", watcher_task));

        let control_server_task = self.spawn_control_server_task(app);
        self.tasks.push(("control server", control_server_task));
    }

    /// Wait for a shutdown signal or for any task to exit.
    ///
    /// A task exiting before shutdown was requested is fatal: the mirror or
    /// the control surface can no longer be trusted.
    pub async fn wait_for_completion(&mut self, timeout: Duration) -> Result<()> {
        let outcome = tokio::select! {
            signal = shutdown_signal() => {
                signal?;
                tracing::info!("Shutdown signal received, cancelling all tasks");
                Ok(())
            }
            _ = self.cancellation_token.cancelled() => Ok(()),
            (result, index, _remaining) = futures::future::select_all(
                self.tasks.iter_mut().map(|(_, handle)| handle)
            ) => {
                let name = self.tasks[index].0;
                self.tasks.remove(index);
                match result {
                    Ok(Ok(())) => Err(anyhow!("{name} task exited unexpectedly")),
                    Ok(Err(e)) => Err(e.context(format!("{name} task failed"))),
                    Err(e) => Err(anyhow!("{name} task panicked: {e}")),
                }
            }
        };

        self.cancellation_token.cancel();
        self.wait_for_tasks_with_timeout(timeout).await;
        outcome
    }

    async fn wait_for_tasks_with_timeout(&mut self, timeout: Duration) {
        tokio::time::timeout(timeout, async {
            for (name, task) in &mut self.tasks {
                match task.await {
                    Ok(Ok(())) => tracing::info!("{name} task completed"),
                    Ok(Err(e)) => tracing::error!("{name} task failed during shutdown: {e:#}"),
                    Err(e) => tracing::error!("{name} task panicked during shutdown: {e}"),
                }
            }
        })
        .await
        .unwrap_or_else(|_| {
            tracing::warn!("Task shutdown timed out after {:?}", timeout);
        });
    }

    fn spawn_watcher_task(&self, app: &Application) -> JoinHandle<Result<()>> {
        let watcher = app.services().watcher.clone();
        let reflector = app.services().reflector.clone();
        let token = self.cancellation_token.clone();

        tokio::spawn(async move {
            tracing::info!("Starting Kubernetes pod watcher task");
            watcher
                .run(&reflector, token)
                .await
                .map_err(|e| anyhow!("{e:?}"))
        })
    }

    fn spawn_control_server_task(&self, app: &Application) -> JoinHandle<Result<()>> {
        let services = app.services();
        let server = ControlServer::new(
            services.store.clone(),
            services.dispatcher.clone(),
            services.pool.clone(),
            app.daemon_args().listen_addr.clone(),
        );
        let token = self.cancellation_token.clone();

        tokio::spawn(async move {
            server.run(token).await.map_err(|e| anyhow!("{e:?}"))
        })
    }
}

async fn shutdown_signal() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;

        tokio::select! {
            _ = sigterm.recv() => {
                tracing::info!("Received SIGTERM, initiating graceful shutdown");
            }
            _ = sigint.recv() => {
                tracing::info!("Received SIGINT, initiating graceful shutdown");
            }
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        tracing::info!("Received Ctrl+C, initiating graceful shutdown");
    }
    Ok(())
}
