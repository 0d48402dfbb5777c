//! # livereload
//!
//! A live-reload notification channel: a resilient client that keeps one
//! connection to a development server open, and the server that tells pages
//! to reload.
//!
//! ## Features
//!
//! - **Explicit lifecycle**: `Idle`, `Connecting`, `Open`, `Failed`, `Closed`
//! - **Exponential backoff**: `min(max, base * multiplier^attempt)`, reset on every open
//! - **Pluggable transport and reaction**: WebSocket out of the box
//! - **Dev server**: static files, script injection, broadcast on `SIGHUP`
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use livereload::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), LiveReloadError> {
//!     let endpoint = Endpoint::from_page("http://localhost:4000/", "/ws")?;
//!     let transport = Arc::new(WebSocketTransport::new(WebSocketConfig::default()));
//!
//!     let client = NotificationClient::new(
//!         endpoint,
//!         ReconnectPolicy::default(),
//!         transport,
//!         reaction_fn(|notification| async move {
//!             println!("reload #{}", notification.sequence());
//!             Ok(())
//!         }),
//!     )?;
//!
//!     client.start()?;
//!     client.wait().await
//! }
//! ```

pub mod prelude;

// Re-export all public types from submodules
pub use livereload_config::{ClientConfig, LiveReloadConfig};

pub use livereload_core::{
    noop_reaction, reaction_fn, ClientExit, Connection, ConnectionState, Endpoint,
    LifecycleEvent, LiveReloadError, Notification, NotificationClient, Payload,
    ReactionCallback, ReconnectPolicy, Transport, TransportInfo,
};

pub use livereload_server::{
    ClientId, ClientMetadata, ConnectionManager, LiveReloadServer, ServerConfig, ServerMessage,
};
pub use livereload_websocket::{WebSocketConfig, WebSocketConnection, WebSocketTransport};
