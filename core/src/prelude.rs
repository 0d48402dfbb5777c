//! Prelude module for convenient imports
//!
//! ```
//! use livereload_core::prelude::*;
//!
//! // NotificationClient, ReconnectPolicy, Endpoint, Transport, Connection,
//! // LifecycleEvent, Notification, reaction_fn, LiveReloadError, ...
//! ```

pub use crate::client::{ClientExit, NotificationClient};
pub use crate::endpoint::Endpoint;
pub use crate::errors::LiveReloadError;
pub use crate::event::LifecycleEvent;
pub use crate::lifecycle::ConnectionState;
pub use crate::notification::{Notification, Payload};
pub use crate::policy::ReconnectPolicy;
pub use crate::reaction::{noop_reaction, reaction_fn, ReactionCallback};
pub use crate::transport::{Connection, Transport, TransportInfo};
