//! SIGHUP reload trigger

use std::sync::Arc;

use livereload_core::LiveReloadError;

use crate::connection::ConnectionManager;

/// Broadcast a reload every time the process receives SIGHUP, until the
/// manager shuts down.
#[cfg(unix)]
pub async fn reload_on_sighup(manager: Arc<ConnectionManager>) -> Result<(), LiveReloadError> {
    use tokio::signal::unix::{signal, SignalKind};
    use tracing::{error, info};

    let mut hangup = signal(SignalKind::hangup())?;
    let shutdown = manager.shutdown_token();

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            received = hangup.recv() => {
                if received.is_none() {
                    error!("Done listening for signals");
                    break;
                }
                info!("Received SIGHUP signal");
                manager.notify_reload();
            }
        }
    }

    Ok(())
}

#[cfg(not(unix))]
pub async fn reload_on_sighup(manager: Arc<ConnectionManager>) -> Result<(), LiveReloadError> {
    tracing::warn!("SIGHUP reload trigger is only available on unix");
    manager.shutdown_token().cancelled().await;
    Ok(())
}
