//! Live-reload dev server

use axum::{routing::get, Router};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use livereload_core::LiveReloadError;

use crate::config::ServerConfig;
use crate::connection::ConnectionManager;
use crate::handlers::{serve_index, serve_path, websocket_handler};
use crate::inject::client_script;
use crate::signal::reload_on_sighup;

/// Shared handler state
pub struct AppState {
    pub(crate) config: ServerConfig,
    pub(crate) manager: Arc<ConnectionManager>,
    /// Rendered browser client; `None` in static mode
    pub(crate) script: Option<String>,
}

/// Serves a directory and pushes reload notifications to connected pages.
///
/// # Example
///
/// ```rust,no_run
/// use livereload_server::prelude::*;
///
/// # async fn example() -> Result<(), LiveReloadError> {
/// let server = LiveReloadServer::new(ServerConfig::new("./site").with_port(8080))?;
/// let listener = server.bind().await?;
///
/// // from a file watcher, a build hook, ...
/// server.reload();
///
/// server.serve(listener).await?;
/// # Ok(())
/// # }
/// ```
pub struct LiveReloadServer {
    state: Arc<AppState>,
}

impl LiveReloadServer {
    pub fn new(config: ServerConfig) -> Result<Self, LiveReloadError> {
        config.validate()?;

        let manager = Arc::new(ConnectionManager::new(config.broadcast_buffer_size));
        let script = (!config.static_only).then(|| client_script(&config.ws_path, &config.reconnect));

        Ok(Self {
            state: Arc::new(AppState {
                config,
                manager,
                script,
            }),
        })
    }

    pub fn config(&self) -> &ServerConfig {
        &self.state.config
    }

    /// Get connection manager
    pub fn connection_manager(&self) -> Arc<ConnectionManager> {
        self.state.manager.clone()
    }

    /// Notify every connected page; returns how many were notified
    pub fn reload(&self) -> usize {
        self.state.manager.notify_reload()
    }

    /// Stop serving: closes page sockets and ends `serve`
    pub fn shutdown(&self) {
        info!("Shutting down live-reload server");
        self.state.manager.shutdown();
    }

    /// Static mode hands the root to `ServeDir` (ranges, conditional
    /// requests); live mode serves through the injecting handlers.
    pub fn router(&self) -> Router {
        let config = &self.state.config;

        let router = if config.static_only {
            Router::new().fallback_service(ServeDir::new(&config.root))
        } else {
            Router::new()
                .route("/", get(serve_index))
                .route("/{*path}", get(serve_path))
                .route(&config.ws_path, get(websocket_handler))
                .with_state(self.state.clone())
        };

        router.layer(TraceLayer::new_for_http())
    }

    /// Bind the configured address
    pub async fn bind(&self) -> Result<TcpListener, LiveReloadError> {
        let addr = self.state.config.socket_addr();
        TcpListener::bind(addr)
            .await
            .map_err(|e| LiveReloadError::ServerError(format!("Failed to bind {}: {}", addr, e)))
    }

    /// Serve on `listener` until `shutdown` is called
    pub async fn serve(&self, listener: TcpListener) -> Result<(), LiveReloadError> {
        let config = &self.state.config;

        let is_dir = tokio::fs::metadata(&config.root)
            .await
            .is_ok_and(|meta| meta.is_dir());
        if !is_dir {
            return Err(LiveReloadError::ConfigError(format!(
                "{} is not a directory",
                config.root.display()
            )));
        }

        let local_addr = listener.local_addr()?;
        info!(
            root = %config.root.display(),
            static_only = config.static_only,
            "Listening at http://{}",
            local_addr
        );

        if !config.static_only {
            let manager = self.state.manager.clone();
            tokio::spawn(async move {
                if let Err(e) = reload_on_sighup(manager).await {
                    error!(error = %e, "SIGHUP reload trigger failed");
                }
            });
        }

        let shutdown = self.state.manager.shutdown_token();
        axum::serve(listener, self.router())
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await
            .map_err(|e| LiveReloadError::ServerError(e.to_string()))?;

        info!("Server stopped");
        Ok(())
    }

    /// Bind and serve
    pub async fn run(&self) -> Result<(), LiveReloadError> {
        let listener = self.bind().await?;
        self.serve(listener).await
    }
}
