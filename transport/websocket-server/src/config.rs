//! Dev server configuration

use livereload_core::{LiveReloadError, ReconnectPolicy, DEFAULT_PATH};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

/// Dev server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address on which to listen for requests
    #[serde(default = "default_addr")]
    pub addr: IpAddr,

    /// Port on which to listen for requests
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory served to the browser
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Plain static server: no script injection, no notification endpoint,
    /// no SIGHUP handling
    #[serde(default)]
    pub static_only: bool,

    /// Path of the notification endpoint
    #[serde(default = "default_ws_path")]
    pub ws_path: String,

    /// Reload notifications buffered per page before it is considered lagging
    #[serde(default = "default_broadcast_buffer")]
    pub broadcast_buffer_size: usize,

    /// Reconnect policy rendered into the injected browser script
    #[serde(default)]
    pub reconnect: ReconnectPolicy,
}

fn default_addr() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    4000
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_ws_path() -> String {
    DEFAULT_PATH.to_string()
}

fn default_broadcast_buffer() -> usize {
    16
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            port: default_port(),
            root: default_root(),
            static_only: false,
            ws_path: default_ws_path(),
            broadcast_buffer_size: default_broadcast_buffer(),
            reconnect: ReconnectPolicy::default(),
        }
    }
}

impl ServerConfig {
    /// Create new configuration serving `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    pub fn with_addr(mut self, addr: IpAddr) -> Self {
        self.addr = addr;
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_static_only(mut self, static_only: bool) -> Self {
        self.static_only = static_only;
        self
    }

    pub fn with_ws_path(mut self, path: impl Into<String>) -> Self {
        self.ws_path = path.into();
        self
    }

    pub fn with_broadcast_buffer(mut self, size: usize) -> Self {
        self.broadcast_buffer_size = size;
        self
    }

    pub fn with_reconnect(mut self, policy: ReconnectPolicy) -> Self {
        self.reconnect = policy;
        self
    }

    /// Socket address to bind
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.addr, self.port)
    }

    pub fn validate(&self) -> Result<(), LiveReloadError> {
        if !self.ws_path.starts_with('/') || self.ws_path.len() < 2 {
            return Err(LiveReloadError::ConfigError(format!(
                "notification path must start with '/' and name a route, got '{}'",
                self.ws_path
            )));
        }
        if self.broadcast_buffer_size == 0 {
            return Err(LiveReloadError::ConfigError(
                "broadcast buffer size must be greater than zero".to_string(),
            ));
        }
        self.reconnect.validate()
    }
}
