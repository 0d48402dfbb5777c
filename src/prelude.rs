//! Prelude module for convenient imports

pub use livereload_config::{ClientConfig, LiveReloadConfig};

pub use livereload_core::prelude::*;

pub use livereload_server::{LiveReloadServer, ServerConfig, ServerMessage};
pub use livereload_websocket::{WebSocketConfig, WebSocketTransport};
