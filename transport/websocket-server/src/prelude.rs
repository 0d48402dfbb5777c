//! Prelude module for convenient imports

pub use crate::config::ServerConfig;
pub use crate::connection::{ClientId, ClientMetadata, ConnectionManager};
pub use crate::message::ServerMessage;
pub use crate::server::LiveReloadServer;

pub use livereload_core::prelude::*;
