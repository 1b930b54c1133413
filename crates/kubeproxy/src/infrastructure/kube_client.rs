use std::env;
use std::path::PathBuf;

use error_stack::Report;
use error_stack::ResultExt;
use kube::config::KubeConfigOptions;
use kube::config::Kubeconfig;
use kube::Client;
use kube::Config;
use tracing::info;

use crate::infrastructure::k8s::KubernetesError;

/// Build the Kubernetes client.
///
/// An explicit kubeconfig wins, with `master_url` overriding its cluster
/// server. A master URL alone is used as a plain, unauthenticated endpoint.
/// With neither, the in-cluster or `~/.kube/config` defaults apply.
pub async fn init_kube_client(
    kubeconfig: Option<PathBuf>,
    master_url: Option<String>,
) -> Result<Client, Report<KubernetesError>> {
    let master = master_url
        .filter(|url| !url.trim().is_empty())
        .map(|url| master_config(&url))
        .transpose()?;

    let config = match (kubeconfig, master) {
        (Some(kubeconfig_path), master) => {
            let kubeconfig = Kubeconfig::read_from(&kubeconfig_path).change_context(
                KubernetesError::ConnectionFailed {
                    message: format!(
                        "Failed to read kubeconfig file: {}",
                        kubeconfig_path.display()
                    ),
                },
            )?;

            let mut config = Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                .await
                .change_context(KubernetesError::ConnectionFailed {
                    message: format!(
                        "Failed to create config from kubeconfig: {}",
                        kubeconfig_path.display()
                    ),
                })?;

            if let Some(master) = master {
                config.cluster_url = master.cluster_url;
            }
            config
        }
        (None, Some(master)) => master,
        (None, None) => {
            // Use default configuration (in-cluster or ~/.kube/config)
            Config::infer()
                .await
                .change_context(KubernetesError::ConnectionFailed {
                    message: "Failed to infer Kubernetes configuration".to_string(),
                })?
        }
    };

    info!(cluster_url = %config.cluster_url, "Using Kubernetes master");

    Client::try_from(config).change_context(KubernetesError::ConnectionFailed {
        message: "Failed to create Kubernetes client".to_string(),
    })
}

/// Plain config for a master URL, after expanding environment variables in it.
fn master_config(raw: &str) -> Result<Config, Report<KubernetesError>> {
    let expanded = expand_env(raw);
    let invalid = || KubernetesError::InvalidMasterUrl {
        url: raw.to_string(),
    };

    let parsed = url::Url::parse(&expanded).change_context_lazy(invalid)?;
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(Report::new(invalid()).attach_printable("URL has no host"));
    }

    let cluster_url: http::Uri = expanded
        .trim_end_matches('/')
        .parse::<http::Uri>()
        .change_context_lazy(invalid)?;
    Ok(Config::new(cluster_url))
}

/// Replace `$VAR` and `${VAR}` with their values; unset variables expand to "".
pub(crate) fn expand_env(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }

        let name: String = if chars.peek() == Some(&'{') {
            chars.next();
            chars.by_ref().take_while(|&c| c != '}').collect()
        } else {
            let mut name = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_ascii_alphanumeric() || c == '_' {
                    name.push(c);
                    chars.next();
                } else {
                    break;
                }
            }
            if name.is_empty() {
                out.push('$');
                continue;
            }
            name
        };

        out.push_str(&env::var(&name).unwrap_or_default());
    }

    out
}

#[cfg(test)]
mod tests {
    use similar_asserts::assert_eq;

    use super::*;

    #[test]
    fn expand_env_replaces_both_forms() {
        env::set_var("KUBEPROXY_TEST_MASTER_HOST", "10.0.0.1");
        env::set_var("KUBEPROXY_TEST_MASTER_PORT", "6443");

        assert_eq!(
            expand_env("https://$KUBEPROXY_TEST_MASTER_HOST:${KUBEPROXY_TEST_MASTER_PORT}"),
            "https://10.0.0.1:6443"
        );
    }

    #[test]
    fn expand_env_drops_unset_variables() {
        assert_eq!(expand_env("http://${KUBEPROXY_TEST_UNSET_VAR}host"), "http://host");
    }

    #[test]
    fn expand_env_keeps_lone_dollar() {
        assert_eq!(expand_env("cost: $ 5"), "cost: $ 5");
        assert_eq!(expand_env("no variables"), "no variables");
    }

    #[test]
    fn master_config_accepts_valid_url() {
        let config = master_config("http://127.0.0.1:8080/").unwrap();
        assert!(config
            .cluster_url
            .to_string()
            .starts_with("http://127.0.0.1:8080"));
    }

    #[test]
    fn master_config_rejects_missing_scheme_or_host() {
        for raw in ["127.0.0.1:8080", "not a url", "http://", "unix:/var/run/k8s.sock"] {
            let err = master_config(raw).unwrap_err();
            assert!(
                matches!(
                    err.current_context(),
                    KubernetesError::InvalidMasterUrl { .. }
                ),
                "expected {raw} to be rejected"
            );
        }
    }
}
