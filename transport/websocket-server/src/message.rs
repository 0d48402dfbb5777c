//! Messages sent from the dev server to connected pages

use serde::{Deserialize, Serialize};

/// Server-to-page message, serialized as `{"type": "..."}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Reload the page
    Reload,
}

impl ServerMessage {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
