use std::sync::Arc;

use anyhow::Context;
use anyhow::Result;
use tokio_util::sync::CancellationToken;

use crate::app::core::Application;
use crate::app::pool::TaskPool;
use crate::app::services::ApplicationServices;
use crate::config::DaemonArgs;
use crate::domain::mirror::MirrorStore;
use crate::domain::mirror::Reflector;
use crate::domain::EventDispatcher;
use crate::infrastructure::k8s::ResourceWatcher;
use crate::infrastructure::kube_client;
use crate::infrastructure::notifier::HttpNotifier;

/// Application builder
pub struct ApplicationBuilder {
    daemon_args: DaemonArgs,
}

impl ApplicationBuilder {
    /// Create new application builder
    pub fn new(daemon_args: DaemonArgs) -> Self {
        Self { daemon_args }
    }

    /// Build complete application
    ///
    /// Failing to create the Kubernetes client is fatal.
    pub async fn build(self) -> Result<Application> {
        tracing::info!("Building application components...");

        let client = kube_client::init_kube_client(
            self.daemon_args.kubeconfig.clone(),
            self.daemon_args.kube_master_url.clone(),
        )
        .await
        .map_err(|e| anyhow::anyhow!("{e:?}"))
        .context("Failed to create a Kubernetes client")?;

        let notifier = HttpNotifier::new(self.daemon_args.notifier_config())
            .map_err(|e| anyhow::anyhow!("{e:?}"))
            .context("Failed to create the notification client")?;
        tracing::info!(endpoint = notifier.endpoint(), "Notification sink configured");

        let cancellation_token = CancellationToken::new();
        let store = Arc::new(MirrorStore::new());
        let dispatcher = Arc::new(EventDispatcher::new(Arc::new(notifier)));
        let reflector = Arc::new(Reflector::new(store.clone(), dispatcher.clone()));
        let watcher = Arc::new(ResourceWatcher::new(
            client,
            self.daemon_args.watched_namespace(),
            self.daemon_args.resync_period(),
        ));
        let pool = TaskPool::new(
            self.daemon_args.max_background_jobs(),
            cancellation_token.clone(),
        );

        let services = ApplicationServices {
            store,
            dispatcher,
            reflector,
            watcher,
            pool,
        };

        Ok(Application::new(services, self.daemon_args, cancellation_token))
    }
}
