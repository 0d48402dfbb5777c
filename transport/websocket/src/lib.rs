//! WebSocket transport for the live-reload notification client
//!
//! Implements [`livereload_core::Transport`] on top of tokio-tungstenite:
//! - text and binary frames become notifications
//! - ping/pong frames are handled by the protocol layer and skipped
//! - a close frame or end of stream ends the connection
//! - configurable handshake headers, timeout and message size limit

mod config;
pub mod prelude;
mod transport;

pub use config::WebSocketConfig;
pub use transport::{WebSocketConnection, WebSocketTransport};
