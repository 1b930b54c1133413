//! Event-sourced local mirror of the watched pod collection.
//!
//! - [`MirrorStore`]: concurrent identity -> record cache
//! - [`Reflector`]: applies watch events to the store and drives the dispatcher

pub mod reflector;
pub mod store;

pub use reflector::Reflector;
pub use store::MirrorStore;
pub use store::Upsert;
