//! Notification endpoint addressing

use http::uri::Authority;
use http::Uri;
use std::fmt;
use std::str::FromStr;

use crate::errors::LiveReloadError;

/// Default path of the notification channel on the dev server
pub const DEFAULT_PATH: &str = "/ws";

/// Address of the notification server (`ws://host:port/path`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    uri: Uri,
}

impl Endpoint {
    /// Derive the endpoint from the page the client runs on.
    ///
    /// The page's host and port are kept, its path, query and fragment are
    /// replaced by `path`, and `http`/`https` become `ws`/`wss`.
    ///
    /// ```
    /// use livereload_core::Endpoint;
    ///
    /// let endpoint = Endpoint::from_page("https://localhost:4000/docs/index.html", "/ws").unwrap();
    /// assert_eq!(endpoint.as_str(), "wss://localhost:4000/ws");
    /// ```
    pub fn from_page(page: &str, path: &str) -> Result<Self, LiveReloadError> {
        let page = parse_uri(page)?;

        let scheme = match page.scheme_str() {
            Some("http") | Some("ws") => "ws",
            Some("https") | Some("wss") => "wss",
            Some(other) => {
                return Err(LiveReloadError::InvalidEndpoint(format!(
                    "unsupported page scheme: {other}"
                )))
            }
            None => {
                return Err(LiveReloadError::InvalidEndpoint(format!(
                    "page URL has no scheme: {page}"
                )))
            }
        };

        let authority = page.authority().cloned().ok_or_else(|| {
            LiveReloadError::InvalidEndpoint(format!("page URL has no host: {page}"))
        })?;

        Self::build(scheme, authority, path)
    }

    /// Parse a `ws://` or `wss://` URL directly
    pub fn parse(url: &str) -> Result<Self, LiveReloadError> {
        let uri = parse_uri(url)?;

        match uri.scheme_str() {
            Some("ws") | Some("wss") => {}
            _ => {
                return Err(LiveReloadError::InvalidEndpoint(format!(
                    "expected a ws:// or wss:// URL, got {url}"
                )))
            }
        }
        if uri.authority().is_none() {
            return Err(LiveReloadError::InvalidEndpoint(format!(
                "URL has no host: {url}"
            )));
        }

        Ok(Self { uri })
    }

    fn build(scheme: &str, authority: Authority, path: &str) -> Result<Self, LiveReloadError> {
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };

        let uri = Uri::builder()
            .scheme(scheme)
            .authority(authority)
            .path_and_query(path)
            .build()
            .map_err(invalid)?;

        Ok(Self { uri })
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn host(&self) -> &str {
        self.uri.host().unwrap_or_default()
    }

    pub fn port(&self) -> Option<u16> {
        self.uri.port_u16()
    }

    pub fn path(&self) -> &str {
        self.uri.path()
    }

    pub fn is_secure(&self) -> bool {
        self.uri.scheme_str() == Some("wss")
    }

    /// Full URL, e.g. `ws://localhost:4000/ws`
    pub fn as_str(&self) -> String {
        self.uri.to_string()
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.uri)
    }
}

impl FromStr for Endpoint {
    type Err = LiveReloadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn parse_uri(raw: &str) -> Result<Uri, LiveReloadError> {
    // fragments never reach the server
    let without_fragment = raw.split('#').next().unwrap_or_default();
    Uri::from_str(without_fragment.trim()).map_err(invalid)
}

fn invalid(err: impl fmt::Display) -> LiveReloadError {
    LiveReloadError::InvalidEndpoint(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_page_maps_to_ws() {
        let endpoint = Endpoint::from_page("http://127.0.0.1:4000/index.html?x=1#top", "/ws")
            .unwrap();

        assert_eq!(endpoint.as_str(), "ws://127.0.0.1:4000/ws");
        assert_eq!(endpoint.host(), "127.0.0.1");
        assert_eq!(endpoint.port(), Some(4000));
        assert_eq!(endpoint.path(), "/ws");
        assert!(!endpoint.is_secure());
    }

    #[test]
    fn test_https_page_maps_to_wss() {
        let endpoint = Endpoint::from_page("https://example.dev/", "livereload").unwrap();

        assert_eq!(endpoint.as_str(), "wss://example.dev/livereload");
        assert!(endpoint.is_secure());
        assert_eq!(endpoint.port(), None);
    }

    #[test]
    fn test_unsupported_scheme_is_rejected() {
        let err = Endpoint::from_page("file:///tmp/index.html", "/ws").unwrap_err();
        assert!(matches!(err, LiveReloadError::InvalidEndpoint(_)));

        assert!(Endpoint::from_page("/index.html", "/ws").is_err());
    }

    #[test]
    fn test_parse_requires_ws_scheme() {
        let endpoint: Endpoint = "ws://localhost:8080/ws".parse().unwrap();
        assert_eq!(endpoint.to_string(), "ws://localhost:8080/ws");

        assert!(Endpoint::parse("http://localhost:8080/ws").is_err());
    }
}
