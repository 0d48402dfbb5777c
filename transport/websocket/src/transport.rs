//! WebSocket transport implementation

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::http::{HeaderName, HeaderValue};
use tokio_tungstenite::tungstenite::protocol::WebSocketConfig as ProtocolConfig;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{connect_async_with_config, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info};

use crate::config::WebSocketConfig;
use livereload_core::{Connection, Endpoint, LiveReloadError, Payload, Transport, TransportInfo};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// WebSocket transport
///
/// Stateless: every `connect` performs a fresh handshake. Reconnect timing
/// belongs to the client, not the transport.
#[derive(Debug, Clone, Default)]
pub struct WebSocketTransport {
    config: WebSocketConfig,
}

impl WebSocketTransport {
    /// Create a new WebSocket transport
    pub fn new(config: WebSocketConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WebSocketConfig {
        &self.config
    }

    /// Handshake request for `endpoint` carrying the configured headers
    pub(crate) fn request(&self, endpoint: &Endpoint) -> Result<Request, LiveReloadError> {
        let mut request = endpoint
            .as_str()
            .into_client_request()
            .map_err(|e| LiveReloadError::InvalidEndpoint(e.to_string()))?;

        for (name, value) in &self.config.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                LiveReloadError::ConfigError(format!("Invalid header name '{}': {}", name, e))
            })?;
            let header_value = HeaderValue::from_str(value).map_err(|e| {
                LiveReloadError::ConfigError(format!("Invalid value for header '{}': {}", name, e))
            })?;
            request.headers_mut().insert(header_name, header_value);
        }

        Ok(request)
    }

    fn protocol_config(&self) -> ProtocolConfig {
        ProtocolConfig::default()
            .max_message_size(Some(self.config.max_message_size))
            .max_frame_size(Some(self.config.max_message_size))
    }
}

#[async_trait]
impl Transport for WebSocketTransport {
    fn info(&self) -> TransportInfo {
        TransportInfo {
            name: "websocket".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    async fn connect(&self, endpoint: &Endpoint) -> Result<Box<dyn Connection>, LiveReloadError> {
        let request = self.request(endpoint)?;
        let handshake = connect_async_with_config(request, Some(self.protocol_config()), false);

        let (stream, response) = tokio::time::timeout(self.config.connect_timeout(), handshake)
            .await
            .map_err(|_| {
                LiveReloadError::ConnectionError(format!(
                    "WebSocket handshake with {} timed out after {}s",
                    endpoint, self.config.connect_timeout_seconds
                ))
            })?
            .map_err(|e| {
                LiveReloadError::ConnectionError(format!(
                    "WebSocket connection to {} failed: {}",
                    endpoint, e
                ))
            })?;

        info!(url = %endpoint, status = %response.status(), "Connected to WebSocket server");

        Ok(Box::new(WebSocketConnection {
            stream,
            url: endpoint.to_string(),
        }))
    }
}

/// One open WebSocket
pub struct WebSocketConnection {
    stream: WsStream,
    url: String,
}

#[async_trait]
impl Connection for WebSocketConnection {
    async fn next(&mut self) -> Option<Result<Payload, LiveReloadError>> {
        loop {
            match self.stream.next().await? {
                Ok(Message::Text(text)) => return Some(Ok(Payload::Text(text.to_string()))),
                Ok(Message::Binary(data)) => return Some(Ok(Payload::Binary(data.to_vec()))),
                Ok(Message::Close(frame)) => {
                    info!(url = %self.url, frame = ?frame, "WebSocket connection closed");
                    return None;
                }
                Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_)) => {
                    // Ignore control frames
                }
                Err(e) => {
                    return Some(Err(LiveReloadError::ConnectionError(format!(
                        "WebSocket read error: {}",
                        e
                    ))))
                }
            }
        }
    }

    async fn close(&mut self) -> Result<(), LiveReloadError> {
        debug!(url = %self.url, "Closing WebSocket connection");

        match self.stream.close(None).await {
            Ok(()) | Err(WsError::ConnectionClosed) | Err(WsError::AlreadyClosed) => Ok(()),
            Err(e) => Err(LiveReloadError::ConnectionError(format!(
                "Failed to close WebSocket: {}",
                e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_carries_configured_headers() {
        let transport = WebSocketTransport::new(
            WebSocketConfig::default().with_header("X-Dev-Token", "secret"),
        );
        let endpoint = Endpoint::parse("ws://localhost:4000/ws").unwrap();

        let request = transport.request(&endpoint).unwrap();

        assert_eq!(request.uri().to_string(), "ws://localhost:4000/ws");
        assert_eq!(request.headers()["x-dev-token"], "secret");
        assert!(request.headers().contains_key("sec-websocket-key"));
    }

    #[test]
    fn test_invalid_header_is_config_error() {
        let transport =
            WebSocketTransport::new(WebSocketConfig::default().with_header("bad header", "x"));
        let endpoint = Endpoint::parse("ws://localhost:4000/ws").unwrap();

        assert!(matches!(
            transport.request(&endpoint),
            Err(LiveReloadError::ConfigError(_))
        ));
    }

    #[tokio::test]
    async fn test_connect_refused_is_connection_error() {
        // bind then drop to get a port with nothing listening
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let transport = WebSocketTransport::default();
        let endpoint = Endpoint::parse(&format!("ws://127.0.0.1:{}/ws", port)).unwrap();

        let result = transport.connect(&endpoint).await;
        assert!(matches!(result, Err(LiveReloadError::ConnectionError(_))));
    }
}
