//! Live-reload dev server
//!
//! Serves a directory over HTTP and pushes `{"type":"reload"}` to every page
//! connected to the notification endpoint.
//!
//! - HTML responses get the browser client injected before `</body>`
//! - paths escaping the served directory are answered with 404
//! - `SIGHUP` (unix) triggers a reload
//! - static mode turns injection, the endpoint and `SIGHUP` handling off and
//!   serves the directory with `tower_http::services::ServeDir`

pub mod config;
pub mod connection;
pub mod handlers;
pub mod inject;
pub mod message;
pub mod prelude;
pub mod server;
pub mod signal;

pub use config::ServerConfig;
pub use connection::{ClientId, ClientMetadata, ConnectionManager};
pub use message::ServerMessage;
pub use server::LiveReloadServer;
