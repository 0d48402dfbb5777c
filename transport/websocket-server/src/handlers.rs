//! Axum handlers: notification endpoint and static files

use axum::{
    body::Body,
    extract::{ws::WebSocketUpgrade, Path as UrlPath, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use std::path::{Component, Path};
use std::sync::Arc;
use tokio::fs;
use tokio_util::io::ReaderStream;
use tracing::{error, info};
use uuid::Uuid;

use livereload_core::debug_log;

use crate::connection::handle_socket;
use crate::inject::inject_script;
use crate::server::AppState;

/// WebSocket upgrade handler for the notification endpoint
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Response {
    let client_id = Uuid::new_v4();
    info!(client_id = %client_id, "WebSocket upgrade request");

    let manager = state.manager.clone();
    ws.on_upgrade(move |socket| handle_socket(socket, client_id, manager))
}

pub async fn serve_index(State(state): State<Arc<AppState>>) -> Response {
    serve_file(&state, Path::new("")).await
}

pub async fn serve_path(
    UrlPath(path): UrlPath<String>,
    State(state): State<Arc<AppState>>,
) -> Response {
    serve_file(&state, Path::new(&path)).await
}

/// Only plain relative paths may reach the filesystem
pub(crate) fn validate_path(path: &Path) -> bool {
    path.components()
        .all(|component| matches!(component, Component::CurDir | Component::Normal(_)))
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "404: Page not found.").into_response()
}

pub(crate) async fn serve_file(state: &AppState, relative: &Path) -> Response {
    if !validate_path(relative) {
        debug_log!(path = %relative.display(), "Rejected path outside the served directory");
        return not_found();
    }

    let mut full_path = state.config.root.join(relative);
    if fs::metadata(&full_path).await.is_ok_and(|meta| meta.is_dir()) {
        full_path.push("index.html");
    }

    let mime = mime_guess::from_path(&full_path).first_or_octet_stream();

    let body = match (&state.script, mime.essence_str()) {
        (Some(script), "text/html") => match fs::read_to_string(&full_path).await {
            Ok(html) => Body::from(inject_script(&html, script)),
            Err(e) => return read_failed(&full_path, e),
        },
        _ => match fs::File::open(&full_path).await {
            Ok(file) => Body::from_stream(ReaderStream::new(file)),
            Err(e) => return read_failed(&full_path, e),
        },
    };

    let mut response = Response::new(body);
    if let Ok(content_type) = HeaderValue::from_str(mime.as_ref()) {
        response.headers_mut().insert(header::CONTENT_TYPE, content_type);
    }
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-cache, no-store, must-revalidate"),
    );

    response
}

fn read_failed(full_path: &Path, e: std::io::Error) -> Response {
    if e.kind() != std::io::ErrorKind::NotFound {
        error!(
            error = %e,
            full_path = %full_path.display(),
            "Error when reading file at path"
        );
    }
    not_found()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use crate::connection::ConnectionManager;
    use crate::inject::client_script;
    use tempfile::TempDir;

    fn site() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("index.html"),
            "<html><body><h1>home</h1></body></html>",
        )
        .unwrap();
        std::fs::write(dir.path().join("style.css"), "body { color: red; }").unwrap();
        std::fs::create_dir(dir.path().join("docs")).unwrap();
        std::fs::write(dir.path().join("docs").join("index.html"), "<p>docs</p>").unwrap();
        dir
    }

    fn state(root: &Path, static_only: bool) -> AppState {
        let config = ServerConfig::new(root).with_static_only(static_only);
        let script = (!static_only).then(|| client_script(&config.ws_path, &config.reconnect));
        AppState {
            manager: Arc::new(ConnectionManager::new(config.broadcast_buffer_size)),
            config,
            script,
        }
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_validate_path() {
        assert!(validate_path(Path::new("")));
        assert!(validate_path(Path::new("docs/index.html")));
        assert!(validate_path(Path::new("./style.css")));
        assert!(!validate_path(Path::new("../secret")));
        assert!(!validate_path(Path::new("docs/../../secret")));
        assert!(!validate_path(Path::new("/etc/passwd")));
    }

    #[tokio::test]
    async fn test_index_is_served_with_script() {
        let dir = site();
        let state = state(dir.path(), false);

        let response = serve_file(&state, Path::new("")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/html");
        assert_eq!(
            response.headers()[header::CACHE_CONTROL],
            "no-cache, no-store, must-revalidate"
        );

        let body = body_text(response).await;
        assert!(body.starts_with("<html><body><h1>home</h1><script>"));
        assert!(body.ends_with("</script></body></html>"));
        assert!(body.contains("new WebSocket(url)"));
    }

    #[tokio::test]
    async fn test_directory_serves_nested_index() {
        let dir = site();
        let state = state(dir.path(), false);

        let body = body_text(serve_file(&state, Path::new("docs")).await).await;
        assert!(body.starts_with("<p>docs</p><script>"));
    }

    #[tokio::test]
    async fn test_html_untouched_without_script() {
        let dir = site();
        let state = state(dir.path(), true);

        let body = body_text(serve_file(&state, Path::new("index.html")).await).await;
        assert_eq!(body, "<html><body><h1>home</h1></body></html>");
    }

    #[tokio::test]
    async fn test_other_files_are_streamed() {
        let dir = site();
        let state = state(dir.path(), false);

        let response = serve_file(&state, Path::new("style.css")).await;
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/css");
        assert_eq!(body_text(response).await, "body { color: red; }");
    }

    #[tokio::test]
    async fn test_missing_and_escaping_paths_are_not_found() {
        let dir = site();
        let state = state(dir.path(), false);

        for path in ["missing.html", "../index.html", "/etc/passwd"] {
            let response = serve_file(&state, Path::new(path)).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "path {path}");
        }
    }
}
