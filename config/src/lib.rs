//! Unified configuration for the live-reload client and dev server
//!
//! Individual component configurations live in their own crates; this crate
//! ties them together and loads them from JSON.
//!
//! ```
//! use livereload_config::LiveReloadConfig;
//!
//! let config = LiveReloadConfig::from_json_str(r#"{
//!     "client": { "page_url": "http://localhost:4000/", "reconnect": { "max_attempts": 10 } },
//!     "server": { "port": 4000, "root": "./site" }
//! }"#).unwrap();
//!
//! assert_eq!(config.client.endpoint().unwrap().to_string(), "ws://localhost:4000/ws");
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use livereload_core::{Endpoint, LiveReloadError, ReconnectPolicy, DEFAULT_PATH};
use livereload_server::ServerConfig;
use livereload_websocket::WebSocketConfig;

/// Notification client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// URL of the page being watched; the endpoint is derived from it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_url: Option<String>,

    /// Path of the notification endpoint on the page's server
    #[serde(default = "default_path")]
    pub path: String,

    #[serde(default)]
    pub reconnect: ReconnectPolicy,

    #[serde(default)]
    pub websocket: WebSocketConfig,
}

fn default_path() -> String {
    DEFAULT_PATH.to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            page_url: None,
            path: default_path(),
            reconnect: ReconnectPolicy::default(),
            websocket: WebSocketConfig::default(),
        }
    }
}

impl ClientConfig {
    pub fn with_page_url(mut self, url: impl Into<String>) -> Self {
        self.page_url = Some(url.into());
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_reconnect(mut self, policy: ReconnectPolicy) -> Self {
        self.reconnect = policy;
        self
    }

    /// Notification endpoint for the configured page
    pub fn endpoint(&self) -> Result<Endpoint, LiveReloadError> {
        let page = self.page_url.as_deref().ok_or_else(|| {
            LiveReloadError::ConfigError("client.page_url is not set".to_string())
        })?;
        Endpoint::from_page(page, &self.path)
    }

    pub fn validate(&self) -> Result<(), LiveReloadError> {
        self.reconnect.validate()?;
        if self.page_url.is_some() {
            self.endpoint()?;
        }
        Ok(())
    }
}

/// Unified live-reload configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LiveReloadConfig {
    #[serde(default)]
    pub client: ClientConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

impl LiveReloadConfig {
    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> Result<Self, LiveReloadError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LiveReloadError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            LiveReloadError::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), LiveReloadError> {
        self.client.validate()?;
        self.server.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = LiveReloadConfig::from_json_str("{}").unwrap();

        assert_eq!(config, LiveReloadConfig::default());
        assert_eq!(config.client.path, "/ws");
        assert_eq!(config.server.port, 4000);
    }

    #[test]
    fn test_client_section() {
        let config = LiveReloadConfig::from_json_str(
            r#"{
                "client": {
                    "page_url": "https://example.test/app/index.html",
                    "path": "/live",
                    "reconnect": { "base_delay_ms": 250, "max_delay_ms": 10000, "max_attempts": 0 },
                    "websocket": { "max_message_size": 2048 }
                }
            }"#,
        )
        .unwrap();

        assert_eq!(
            config.client.endpoint().unwrap().to_string(),
            "wss://example.test/live"
        );
        assert_eq!(config.client.reconnect.base_delay(), Duration::from_millis(250));
        assert_eq!(config.client.reconnect.max_attempts(), Some(0));
        assert_eq!(config.client.websocket.max_message_size, 2048);
    }

    #[test]
    fn test_missing_page_url() {
        let config = LiveReloadConfig::default();
        assert!(matches!(
            config.client.endpoint(),
            Err(LiveReloadError::ConfigError(_))
        ));
    }

    #[test]
    fn test_invalid_documents_are_rejected() {
        assert!(matches!(
            LiveReloadConfig::from_json_str("not json"),
            Err(LiveReloadError::SerializationError(_))
        ));
        assert!(matches!(
            LiveReloadConfig::from_json_str(r#"{"client": {"page_url": "ftp://nope/"}}"#),
            Err(LiveReloadError::InvalidEndpoint(_))
        ));
        assert!(matches!(
            LiveReloadConfig::from_json_str(r#"{"client": {"reconnect": {"multiplier": 0.5}}}"#),
            Err(LiveReloadError::ConfigError(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"server": {{"static_only": true, "port": 8080}}}}"#).unwrap();

        let config = LiveReloadConfig::from_file(file.path()).unwrap();
        assert!(config.server.static_only);
        assert_eq!(config.server.port, 8080);

        assert!(LiveReloadConfig::from_file("/no/such/livereload.json").is_err());
    }
}
