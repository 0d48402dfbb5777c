//! Page connection management

use futures_util::{SinkExt, StreamExt};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use uuid::Uuid;

use axum::extract::ws::{Message, WebSocket};
use livereload_core::debug_log;

use crate::message::ServerMessage;

/// Client identifier
pub type ClientId = Uuid;

/// Connected page metadata
#[derive(Debug, Clone)]
pub struct ClientMetadata {
    pub id: ClientId,
    pub connected_at: chrono::DateTime<chrono::Utc>,
}

impl ClientMetadata {
    pub fn new(id: ClientId) -> Self {
        Self {
            id,
            connected_at: chrono::Utc::now(),
        }
    }
}

/// Tracks connected pages and fans reload notifications out to them
pub struct ConnectionManager {
    clients: RwLock<HashMap<ClientId, ClientMetadata>>,
    reload_tx: broadcast::Sender<ServerMessage>,
    shutdown: CancellationToken,
}

impl ConnectionManager {
    pub fn new(broadcast_buffer: usize) -> Self {
        let (reload_tx, _) = broadcast::channel(broadcast_buffer.max(1));

        Self {
            clients: RwLock::new(HashMap::new()),
            reload_tx,
            shutdown: CancellationToken::new(),
        }
    }

    /// Get active connection count
    pub async fn connection_count(&self) -> usize {
        self.clients.read().await.len()
    }

    /// Get all connected pages
    pub async fn clients(&self) -> Vec<ClientMetadata> {
        self.clients.read().await.values().cloned().collect()
    }

    /// Tell every connected page to reload. Returns how many pages were
    /// notified; pages connecting later do not see this notification.
    pub fn notify_reload(&self) -> usize {
        match self.reload_tx.send(ServerMessage::Reload) {
            Ok(receivers) => {
                info!(pages = receivers, "Reload notification sent");
                receivers
            }
            Err(_) => {
                info!("Reload requested but no pages are connected");
                0
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ServerMessage> {
        self.reload_tx.subscribe()
    }

    /// Close every page connection and stop accepting reload triggers
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    async fn register(&self, metadata: ClientMetadata) {
        let mut clients = self.clients.write().await;
        let client_id = metadata.id;
        clients.insert(client_id, metadata);

        info!(
            client_id = %client_id,
            total_connections = clients.len(),
            "Page connected"
        );
    }

    async fn unregister(&self, client_id: &ClientId) {
        let mut clients = self.clients.write().await;
        if clients.remove(client_id).is_some() {
            info!(
                client_id = %client_id,
                total_connections = clients.len(),
                "Page disconnected"
            );
        }
    }
}

/// Drive one page's notification socket until the page leaves or the
/// server shuts down
pub async fn handle_socket(socket: WebSocket, client_id: ClientId, manager: Arc<ConnectionManager>) {
    // subscribe first: reloads sent before this point belong to older pages
    let mut reloads = manager.subscribe();
    let shutdown = manager.shutdown_token();
    manager.register(ClientMetadata::new(client_id)).await;

    let (mut ws_sender, mut ws_receiver) = socket.split();

    loop {
        let message = tokio::select! {
            _ = shutdown.cancelled() => {
                let _ = ws_sender.send(Message::Close(None)).await;
                break;
            }
            incoming = ws_receiver.next() => match incoming {
                Some(Ok(Message::Close(_frame))) => {
                    debug_log!(client_id = %client_id, frame = ?_frame, "Page initiated close");
                    break;
                }
                Some(Ok(_)) => continue,
                Some(Err(e)) => {
                    warn!(client_id = %client_id, error = %e, "WebSocket error");
                    break;
                }
                None => break,
            },
            reload = reloads.recv() => match reload {
                Ok(message) => message,
                Err(broadcast::error::RecvError::Lagged(_skipped)) => {
                    // one reload covers any number of missed ones
                    debug_log!(client_id = %client_id, skipped = _skipped, "Coalescing lagged reloads");
                    ServerMessage::Reload
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
        };

        let json = match message.to_json() {
            Ok(json) => json,
            Err(e) => {
                error!(client_id = %client_id, error = %e, "Failed to serialize message");
                continue;
            }
        };

        if let Err(e) = ws_sender.send(Message::Text(json.into())).await {
            warn!(client_id = %client_id, error = %e, "Failed to send reload to page");
            break;
        }
        debug_log!(client_id = %client_id, "Sent reload message to page");
    }

    manager.unregister(&client_id).await;
}
