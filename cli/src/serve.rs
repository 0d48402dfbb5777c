use std::sync::Arc;

use livereload_core::LiveReloadError;
use livereload_server::{LiveReloadServer, ServerConfig};
use tracing::info;

use crate::cli::ServeArgs;

pub fn server_config(args: ServeArgs, mut config: ServerConfig) -> ServerConfig {
    config.root = args.directory;
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(addr) = args.addr {
        config.addr = addr;
    }
    if args.static_only {
        config.static_only = true;
    }
    config
}

pub async fn run(args: ServeArgs, config: ServerConfig) -> Result<(), LiveReloadError> {
    let server = Arc::new(LiveReloadServer::new(server_config(args, config))?);
    let listener = server.bind().await?;

    let on_interrupt = server.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl-C");
            on_interrupt.shutdown();
        }
    });

    server.serve(listener).await
}
