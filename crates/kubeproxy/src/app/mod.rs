//! Application module
//!
//! Wires the mirror, dispatcher, watcher and control surface together and
//! manages their lifecycle.

pub mod builder;
pub mod core;
pub mod pool;
pub mod services;
pub mod tasks;

// Re-export main types
pub use builder::ApplicationBuilder;
pub use core::Application;
pub use pool::TaskPool;
pub use services::ApplicationServices;
