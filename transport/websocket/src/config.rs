//! WebSocket configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// WebSocket connection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebSocketConfig {
    /// Handshake timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,

    /// Maximum message size in bytes
    #[serde(default = "default_max_message_size")]
    pub max_message_size: usize,

    /// Custom headers for WebSocket handshake
    #[serde(default)]
    pub headers: Vec<(String, String)>,
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_max_message_size() -> usize {
    1024 * 1024 // 1MB
}

impl Default for WebSocketConfig {
    fn default() -> Self {
        Self {
            connect_timeout_seconds: default_connect_timeout(),
            max_message_size: default_max_message_size(),
            headers: Vec::new(),
        }
    }
}

impl WebSocketConfig {
    /// Set the handshake timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout_seconds = timeout.as_secs().max(1);
        self
    }

    /// Set the maximum accepted message size
    pub fn with_max_message_size(mut self, bytes: usize) -> Self {
        self.max_message_size = bytes;
        self
    }

    /// Add a header sent with the handshake request
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_json() {
        let config: WebSocketConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, WebSocketConfig::default());
        assert_eq!(config.connect_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_builders() {
        let config = WebSocketConfig::default()
            .with_connect_timeout(Duration::from_millis(200))
            .with_max_message_size(4096)
            .with_header("Authorization", "Bearer dev");

        // sub-second timeouts round up to one second
        assert_eq!(config.connect_timeout_seconds, 1);
        assert_eq!(config.max_message_size, 4096);
        assert_eq!(
            config.headers,
            vec![("Authorization".to_string(), "Bearer dev".to_string())]
        );
    }
}
