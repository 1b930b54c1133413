pub mod api;
pub mod app;
pub mod cmd;
pub mod config;
pub mod domain;
pub mod infrastructure;

#[cfg(test)]
mod testing;

pub use infrastructure::logging;
