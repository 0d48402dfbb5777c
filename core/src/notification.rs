//! Notifications received over the channel

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::errors::LiveReloadError;

/// Raw message body as delivered by the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Text(String),
    Binary(Vec<u8>),
}

impl Payload {
    pub fn len(&self) -> usize {
        match self {
            Payload::Text(text) => text.len(),
            Payload::Binary(data) => data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Payload::Text(text) => text.as_bytes(),
            Payload::Binary(data) => data,
        }
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Text(text)
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Text(text.to_string())
    }
}

impl From<Vec<u8>> for Payload {
    fn from(data: Vec<u8>) -> Self {
        Payload::Binary(data)
    }
}

/// A received notification.
///
/// The client never looks inside the payload; it only numbers notifications
/// in arrival order and stamps them.
#[derive(Debug, Clone)]
pub struct Notification {
    sequence: u64,
    received_at: DateTime<Utc>,
    payload: Payload,
}

impl Notification {
    pub fn new(sequence: u64, payload: impl Into<Payload>) -> Self {
        Self {
            sequence,
            received_at: Utc::now(),
            payload: payload.into(),
        }
    }

    /// Position in arrival order, starting at 1 for each client
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn received_at(&self) -> DateTime<Utc> {
        self.received_at
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn into_payload(self) -> Payload {
        self.payload
    }

    /// Text body, if the notification arrived as text
    pub fn as_text(&self) -> Option<&str> {
        match &self.payload {
            Payload::Text(text) => Some(text),
            Payload::Binary(_) => None,
        }
    }

    /// Parse the body as JSON
    pub fn as_json(&self) -> Result<Value, LiveReloadError> {
        serde_json::from_slice(self.payload.as_bytes()).map_err(Into::into)
    }
}
