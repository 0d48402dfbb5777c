//! Core types and traits for the live-reload notification channel

/// Conditional debug logging macros
/// These macros only compile in code when the `debug-logging` feature is enabled
#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        tracing::trace!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {};
}

pub mod client;
pub mod endpoint;
pub mod errors;
pub mod event;
pub mod lifecycle;
pub mod notification;
pub mod policy;
pub mod prelude;
pub mod reaction;
pub mod transport;

pub use client::{ClientExit, NotificationClient};
pub use endpoint::{Endpoint, DEFAULT_PATH};
pub use errors::LiveReloadError;
pub use event::LifecycleEvent;
pub use lifecycle::{ConnectionState, Directive, Lifecycle};
pub use notification::{Notification, Payload};
pub use policy::ReconnectPolicy;
pub use reaction::{noop_reaction, reaction_fn, ReactionCallback};
pub use transport::{Connection, Transport, TransportInfo};
