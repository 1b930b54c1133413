//! Command layer - Entry points for the daemon and the one-shot client

pub mod client;
pub mod daemon;

pub use client::run_client;
pub use daemon::run_daemon;
