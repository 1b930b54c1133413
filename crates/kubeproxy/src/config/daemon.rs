use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::infrastructure::notifier::NotifierConfig;

#[derive(Debug, Clone, Parser)]
pub struct DaemonArgs {
    #[arg(
        long,
        env = "KUBE_CFG_FILE",
        value_hint = clap::ValueHint::FilePath,
        help = "Path to kubeconfig file (defaults to cluster config or ~/.kube/config)"
    )]
    pub kubeconfig: Option<PathBuf>,

    #[arg(
        long,
        env = "KUBE_MASTER_URL",
        help = "URL of the Kubernetes master; environment variables in it are expanded. Overrides the server of --kubeconfig"
    )]
    pub kube_master_url: Option<String>,

    #[arg(
        long,
        env = "KUBEPROXY_NAMESPACE",
        default_value = "default",
        help = "Namespace whose pods are mirrored (empty for all namespaces)"
    )]
    pub namespace: String,

    #[arg(
        long = "resync-period",
        env = "KUBEPROXY_RESYNC_PERIOD_SECS",
        default_value = "1800",
        value_parser = clap::value_parser!(u64).range(1..),
        help = "Seconds between forced full relists of the pod collection"
    )]
    pub resync_period_secs: u64,

    #[arg(
        long,
        env = "KUBEPROXY_LISTEN_ADDR",
        default_value = "127.0.0.1:8000",
        help = "Control surface listen address; client mode sends its request here"
    )]
    pub listen_addr: String,

    #[arg(
        long,
        env = "KUBEPROXY_NOTIFY_URL",
        default_value = "http://127.0.0.1:8080/webadmin/Docker/Docker",
        help = "Endpoint receiving lifecycle notifications"
    )]
    pub notify_url: String,

    #[arg(long, env = "KUBEPROXY_NOTIFY_USER", default_value = "admin")]
    pub notify_user: String,

    #[arg(
        long,
        env = "KUBEPROXY_NOTIFY_PASSWORD",
        default_value = "admin",
        hide_env_values = true
    )]
    pub notify_password: String,

    #[arg(
        long = "notify-timeout",
        env = "KUBEPROXY_NOTIFY_TIMEOUT_SECS",
        default_value = "10",
        value_parser = clap::value_parser!(u64).range(1..),
        help = "Seconds before a notification request is abandoned"
    )]
    pub notify_timeout_secs: u64,

    #[arg(
        long,
        env = "KUBEPROXY_MAX_BACKGROUND_JOBS",
        default_value = "16",
        value_parser = clap::value_parser!(u64).range(1..),
        help = "Maximum control-surface jobs running at once"
    )]
    pub max_background_jobs: u64,
}

impl DaemonArgs {
    /// Namespace to watch; `None` watches all namespaces.
    pub fn watched_namespace(&self) -> Option<String> {
        Some(self.namespace.trim())
            .filter(|ns| !ns.is_empty())
            .map(str::to_string)
    }

    pub fn resync_period(&self) -> Duration {
        Duration::from_secs(self.resync_period_secs)
    }

    pub fn notifier_config(&self) -> NotifierConfig {
        NotifierConfig {
            endpoint: self.notify_url.clone(),
            username: self.notify_user.clone(),
            password: self.notify_password.clone(),
            timeout: Duration::from_secs(self.notify_timeout_secs),
        }
    }

    pub fn max_background_jobs(&self) -> usize {
        usize::try_from(self.max_background_jobs).unwrap_or(usize::MAX)
    }
}
