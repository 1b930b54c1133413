use anyhow::Result;
use clap::Parser;
use kubeproxy::cmd::run_client;
use kubeproxy::cmd::run_daemon;
use kubeproxy::config::Cli;
use kubeproxy::logging;

/// Sets up global panic hooks.
fn setup_global_hooks() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        default_hook(panic_info);
        tracing::error!("Thread panicked: {}", panic_info);
    }));
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_global_hooks();

    let cli = Cli::parse();
    let _guard = logging::init()?;

    match cli.request {
        Some(path) => run_client(&path, &cli.daemon.listen_addr).await,
        None => run_daemon(cli.daemon).await,
    }
}
