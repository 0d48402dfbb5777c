//! Prelude module for convenient imports
//!
//! ```
//! use livereload_websocket::prelude::*;
//!
//! let transport = WebSocketTransport::new(WebSocketConfig::default());
//! ```

pub use crate::config::WebSocketConfig;
pub use crate::transport::{WebSocketConnection, WebSocketTransport};
