pub mod dispatcher;
pub mod mirror;
pub mod types;

pub use dispatcher::EventDispatcher;
pub use dispatcher::NotificationSink;
