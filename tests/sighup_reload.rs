//! SIGHUP triggers a reload on every connected page.
//!
//! Lives in its own test binary: signals are process wide.
#![cfg(unix)]

use futures_util::StreamExt;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use tokio::signal::unix::{signal, SignalKind};
use tokio::time::{timeout, Duration};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use livereload::prelude::*;

fn send_sighup() {
    let status = std::process::Command::new("kill")
        .args(["-HUP", &std::process::id().to_string()])
        .status()
        .expect("run kill");
    assert!(status.success());
}

#[tokio::test]
async fn test_sighup_reloads_connected_pages() {
    // installs the process handler so SIGHUP can never terminate the test
    let _hangup = signal(SignalKind::hangup()).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let server = Arc::new(
        LiveReloadServer::new(
            ServerConfig::new(dir.path())
                .with_addr(IpAddr::V4(Ipv4Addr::LOCALHOST))
                .with_port(0),
        )
        .unwrap(),
    );
    let listener = server.bind().await.unwrap();
    let addr = listener.local_addr().unwrap();

    let serving = server.clone();
    let task = tokio::spawn(async move { serving.serve(listener).await });

    let (mut page, _) = connect_async(format!("ws://{}/ws", addr)).await.unwrap();

    let manager = server.connection_manager();
    timeout(Duration::from_secs(5), async {
        while manager.connection_count().await != 1 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("page never registered");

    // the listener starts asynchronously; keep signalling until it answers
    let reload = timeout(Duration::from_secs(10), async {
        loop {
            send_sighup();
            let received = timeout(Duration::from_millis(200), page.next()).await;
            if let Ok(Some(Ok(Message::Text(text)))) = received {
                return text.to_string();
            }
        }
    })
    .await
    .expect("SIGHUP never produced a reload");

    assert_eq!(reload, r#"{"type":"reload"}"#);

    server.shutdown();
    timeout(Duration::from_secs(5), task)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
}
