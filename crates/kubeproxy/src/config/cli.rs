use clap::Parser;
use utils::version;

use crate::config::daemon::DaemonArgs;

/// Mirrors Kubernetes pods into a game-server plugin.
///
/// Without arguments, runs the daemon. With a single PATH, sends
/// `GET http://<listen-addr>/<PATH>` to a running daemon and exits.
#[derive(Parser)]
#[command(version = &**version::VERSION)]
pub struct Cli {
    /// Control-surface path to request from a running daemon, e.g. `containers`
    pub request: Option<String>,

    #[command(flatten)]
    pub daemon: DaemonArgs,
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use clap::CommandFactory;
    use similar_asserts::assert_eq;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_arguments_runs_daemon_with_defaults() {
        let cli = Cli::try_parse_from(["kubeproxy"]).unwrap();

        assert!(cli.request.is_none());
        assert_eq!(cli.daemon.listen_addr, "127.0.0.1:8000");
        assert_eq!(cli.daemon.watched_namespace(), Some("default".to_string()));
        assert_eq!(cli.daemon.resync_period(), Duration::from_secs(30 * 60));
        assert_eq!(cli.daemon.max_background_jobs(), 16);

        let notifier = cli.daemon.notifier_config();
        assert_eq!(
            notifier.endpoint,
            "http://127.0.0.1:8080/webadmin/Docker/Docker"
        );
        assert_eq!(notifier.username, "admin");
        assert_eq!(notifier.password, "admin");
        assert_eq!(notifier.timeout, Duration::from_secs(10));
    }

    #[test]
    fn single_argument_is_client_request() {
        let cli = Cli::try_parse_from(["kubeproxy", "containers"]).unwrap();
        assert_eq!(cli.request.as_deref(), Some("containers"));
    }

    #[test]
    fn extra_arguments_are_rejected() {
        assert!(Cli::try_parse_from(["kubeproxy", "containers", "extra"]).is_err());
    }

    #[test]
    fn empty_namespace_watches_everything() {
        let cli = Cli::try_parse_from(["kubeproxy", "--namespace", ""]).unwrap();
        assert_eq!(cli.daemon.watched_namespace(), None);
    }

    #[test]
    fn zero_resync_period_is_rejected() {
        assert!(Cli::try_parse_from(["kubeproxy", "--resync-period", "0"]).is_err());
    }
}
