//! WebSocket transport tests against a scripted tokio-tungstenite server

use futures_util::SinkExt;
use std::future::Future;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::time::{timeout, Duration};
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{accept_async, accept_hdr_async, WebSocketStream};

use livereload::prelude::*;

/// Accept one connection and hand it to `script`
async fn scripted_server<F, Fut>(script: F) -> Endpoint
where
    F: FnOnce(WebSocketStream<TcpStream>) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let ws = accept_async(stream).await.unwrap();
        script(ws).await;
    });

    Endpoint::parse(&format!("ws://{}/ws", addr)).unwrap()
}

async fn next(connection: &mut Box<dyn Connection>) -> Option<Result<Payload, LiveReloadError>> {
    timeout(Duration::from_secs(5), connection.next())
        .await
        .expect("timed out waiting for message")
}

#[tokio::test]
async fn test_frames_map_to_payloads() {
    let endpoint = scripted_server(|mut ws| async move {
        ws.send(Message::Ping(vec![1, 2, 3].into())).await.unwrap();
        ws.send(Message::Text(r#"{"type":"reload"}"#.into())).await.unwrap();
        ws.send(Message::Pong(Vec::new().into())).await.unwrap();
        ws.send(Message::Binary(vec![0xde, 0xad].into())).await.unwrap();
        ws.close(None).await.unwrap();
    })
    .await;

    let transport = WebSocketTransport::new(WebSocketConfig::default());
    let mut connection = transport.connect(&endpoint).await.unwrap();

    assert_eq!(
        next(&mut connection).await.unwrap().unwrap(),
        Payload::Text(r#"{"type":"reload"}"#.to_string())
    );
    assert_eq!(
        next(&mut connection).await.unwrap().unwrap(),
        Payload::Binary(vec![0xde, 0xad])
    );
    assert!(next(&mut connection).await.is_none());
}

#[tokio::test]
async fn test_dropped_server_ends_connection() {
    let endpoint = scripted_server(|ws| async move {
        drop(ws);
    })
    .await;

    let transport = WebSocketTransport::default();
    let mut connection = transport.connect(&endpoint).await.unwrap();

    // abrupt close is either end-of-stream or a read error
    match next(&mut connection).await {
        None | Some(Err(LiveReloadError::ConnectionError(_))) => {}
        other => panic!("unexpected message after drop: {other:?}"),
    }
}

#[tokio::test]
async fn test_oversized_message_is_an_error() {
    let endpoint = scripted_server(|mut ws| async move {
        let _ = ws.send(Message::Text("x".repeat(4096).into())).await;
        tokio::time::sleep(Duration::from_millis(200)).await;
    })
    .await;

    let transport = WebSocketTransport::new(WebSocketConfig::default().with_max_message_size(1024));
    let mut connection = transport.connect(&endpoint).await.unwrap();

    assert!(matches!(
        next(&mut connection).await,
        Some(Err(LiveReloadError::ConnectionError(_)))
    ));
}

#[tokio::test]
async fn test_handshake_headers_are_sent() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (header_tx, header_rx) = oneshot::channel();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let callback = |request: &Request, response: Response| -> Result<Response, ErrorResponse> {
            let token = request
                .headers()
                .get("x-dev-token")
                .and_then(|value| value.to_str().ok())
                .map(str::to_string);
            let _ = header_tx.send(token);
            Ok(response)
        };
        let mut ws = accept_hdr_async(stream, callback).await.unwrap();
        let _ = ws.close(None).await;
    });

    let endpoint = Endpoint::parse(&format!("ws://{}/ws", addr)).unwrap();
    let transport =
        WebSocketTransport::new(WebSocketConfig::default().with_header("X-Dev-Token", "s3cret"));
    let mut connection = transport.connect(&endpoint).await.unwrap();

    let token = timeout(Duration::from_secs(5), header_rx).await.unwrap().unwrap();
    assert_eq!(token.as_deref(), Some("s3cret"));

    let _ = connection.close().await;
}

#[tokio::test]
async fn test_close_is_graceful() {
    let endpoint = scripted_server(|mut ws| async move {
        use futures_util::StreamExt;
        // drain until the client closes
        while let Some(Ok(_)) = ws.next().await {}
    })
    .await;

    let transport = WebSocketTransport::default();
    let mut connection = transport.connect(&endpoint).await.unwrap();

    connection.close().await.unwrap();
}
