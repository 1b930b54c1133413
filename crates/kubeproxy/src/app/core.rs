use std::time::Duration;

use anyhow::Result;
use tokio_util::sync::CancellationToken;

use crate::app::services::ApplicationServices;
use crate::app::tasks::Tasks;
use crate::config::DaemonArgs;

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

/// Application core structure with explicit dependencies
pub struct Application {
    services: ApplicationServices,
    daemon_args: DaemonArgs,
    cancellation_token: CancellationToken,
}

impl Application {
    /// Create new application with explicit service dependencies
    pub fn new(
        services: ApplicationServices,
        daemon_args: DaemonArgs,
        cancellation_token: CancellationToken,
    ) -> Self {
        Self {
            services,
            daemon_args,
            cancellation_token,
        }
    }

    /// Get access to services
    pub fn services(&self) -> &ApplicationServices {
        &self.services
    }

    /// Get daemon arguments
    pub fn daemon_args(&self) -> &DaemonArgs {
        &self.daemon_args
    }

    /// Run application, start all tasks and wait for completion
    pub async fn run(&self) -> Result<()> {
        tracing::info!("Starting all application tasks...");

        let mut tasks = Tasks::new(self.cancellation_token.clone());
        tasks.spawn_all_tasks(self);

        let result = tasks.wait_for_completion(SHUTDOWN_TIMEOUT).await;
        if let Err(e) = &result {
            tracing::error!("Error during task execution: {e:#}");
        }

        tracing::info!("Application run completed");
        result
    }

    /// Gracefully shutdown application, letting in-flight background jobs finish
    pub async fn shutdown(&self) -> Result<()> {
        tracing::info!("Shutting down application...");

        self.cancellation_token.cancel();
        self.services.pool.drain(SHUTDOWN_TIMEOUT).await;

        tracing::info!(
            mirrored = self.services.store.len().await,
            "Application shutdown completed"
        );
        Ok(())
    }
}
