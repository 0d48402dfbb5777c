//! Error types for the live-reload channel

use thiserror::Error;

use crate::lifecycle::ConnectionState;

#[derive(Debug, Error)]
pub enum LiveReloadError {
    /// Transport failed to establish or dropped. Recovered by reconnecting.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Client already started (current state: {0})")]
    AlreadyStarted(ConnectionState),

    #[error("Invalid state transition: cannot {event} from {from}")]
    InvalidStateTransition {
        from: ConnectionState,
        event: &'static str,
    },

    #[error("Gave up reconnecting after {attempts} attempts")]
    ReconnectExhausted { attempts: u32 },

    #[error("Reaction error: {0}")]
    ReactionError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl LiveReloadError {
    /// Whether the error is recovered locally by the reconnect loop.
    pub fn is_transient(&self) -> bool {
        matches!(self, LiveReloadError::ConnectionError(_))
    }
}

/// I/O and serialization errors keep their kind and message, not their source.
impl Clone for LiveReloadError {
    fn clone(&self) -> Self {
        match self {
            Self::ConnectionError(msg) => Self::ConnectionError(msg.clone()),
            Self::AlreadyStarted(state) => Self::AlreadyStarted(*state),
            Self::InvalidStateTransition { from, event } => Self::InvalidStateTransition {
                from: *from,
                event: *event,
            },
            Self::ReconnectExhausted { attempts } => Self::ReconnectExhausted {
                attempts: *attempts,
            },
            Self::ReactionError(msg) => Self::ReactionError(msg.clone()),
            Self::ConfigError(msg) => Self::ConfigError(msg.clone()),
            Self::InvalidEndpoint(msg) => Self::InvalidEndpoint(msg.clone()),
            Self::SerializationError(e) => Self::SerializationError(serde_json::Error::io(
                std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()),
            )),
            Self::Io(e) => Self::Io(std::io::Error::new(e.kind(), e.to_string())),
            Self::ServerError(msg) => Self::ServerError(msg.clone()),
            Self::InternalError(msg) => Self::InternalError(msg.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_connection_errors_are_transient() {
        assert!(LiveReloadError::ConnectionError("refused".to_string()).is_transient());
        assert!(!LiveReloadError::ConfigError("bad header".to_string()).is_transient());
        assert!(!LiveReloadError::InvalidEndpoint("ftp://x".to_string()).is_transient());
        assert!(!LiveReloadError::ReconnectExhausted { attempts: 3 }.is_transient());
    }

    #[test]
    fn test_clone_keeps_variant_and_message() {
        let config = LiveReloadError::ConfigError("Invalid header name".to_string());
        assert!(matches!(config.clone(), LiveReloadError::ConfigError(ref m) if m == "Invalid header name"));

        let io = LiveReloadError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "missing",
        ));
        match io.clone() {
            LiveReloadError::Io(e) => {
                assert_eq!(e.kind(), std::io::ErrorKind::NotFound);
                assert_eq!(e.to_string(), "missing");
            }
            other => panic!("unexpected clone: {other:?}"),
        }
    }
}
