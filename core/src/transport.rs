//! Transport traits for pluggable notification channels

use async_trait::async_trait;

use crate::endpoint::Endpoint;
use crate::errors::LiveReloadError;
use crate::notification::Payload;

/// Transport metadata
#[derive(Debug, Clone)]
pub struct TransportInfo {
    /// Transport name (e.g., "websocket")
    pub name: String,
    /// Transport version
    pub version: String,
}

/// Opens connections to a notification endpoint
#[async_trait]
pub trait Transport: Send + Sync {
    /// Get transport information
    fn info(&self) -> TransportInfo;

    /// Establish a connection. An `Err` is a failed open and counts as a
    /// dropped connection for reconnect purposes.
    async fn connect(&self, endpoint: &Endpoint) -> Result<Box<dyn Connection>, LiveReloadError>;
}

/// One live connection
#[async_trait]
pub trait Connection: Send {
    /// Next message in arrival order.
    ///
    /// `None` means the peer closed the connection; `Some(Err(_))` is a
    /// transport error. Either one ends the connection.
    async fn next(&mut self) -> Option<Result<Payload, LiveReloadError>>;

    /// Close the connection gracefully (best effort)
    async fn close(&mut self) -> Result<(), LiveReloadError> {
        Ok(())
    }
}
