//! Observable lifecycle events

use serde::Serialize;
use std::time::Duration;

/// Transition reported by a running client.
///
/// Every connectivity transition has its own variant so subscribers can tell
/// them apart without parsing log lines.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LifecycleEvent {
    /// A transport connection is being opened
    Connecting { attempt: u32 },
    /// The connection is open
    Connected,
    /// The connection failed or dropped
    Disconnected { reason: String },
    /// A reconnect is scheduled after `delay`
    Reconnecting {
        attempt: u32,
        #[serde(with = "millis")]
        delay: Duration,
    },
    /// Reconnect attempts exhausted; the client is closed
    GaveUp { attempts: u32 },
    /// The transport failed with an error reconnecting cannot fix; the client is closed
    Aborted { error: String },
    /// `stop()` was called
    Stopped,
    /// The reaction failed for the notification with this sequence number
    ReactionFailed { sequence: u64, error: String },
}

impl LifecycleEvent {
    /// Short name used in log lines
    pub fn name(&self) -> &'static str {
        match self {
            LifecycleEvent::Connecting { .. } => "connecting",
            LifecycleEvent::Connected => "connected",
            LifecycleEvent::Disconnected { .. } => "disconnected",
            LifecycleEvent::Reconnecting { .. } => "reconnecting",
            LifecycleEvent::GaveUp { .. } => "gave_up",
            LifecycleEvent::Aborted { .. } => "aborted",
            LifecycleEvent::Stopped => "stopped",
            LifecycleEvent::ReactionFailed { .. } => "reaction_failed",
        }
    }

    /// Whether no further events follow this one
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            LifecycleEvent::GaveUp { .. } | LifecycleEvent::Aborted { .. } | LifecycleEvent::Stopped
        )
    }
}

mod millis {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(delay: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(delay.as_millis() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_serialization() {
        let event = LifecycleEvent::Reconnecting {
            attempt: 2,
            delay: Duration::from_millis(200),
        };

        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({"event": "reconnecting", "attempt": 2, "delay": 200})
        );
        assert_eq!(event.name(), "reconnecting");
        assert!(!event.is_terminal());
        assert!(LifecycleEvent::GaveUp { attempts: 3 }.is_terminal());

        let aborted = LifecycleEvent::Aborted {
            error: "Configuration error: bad header".to_string(),
        };
        assert!(aborted.is_terminal());
        assert_eq!(
            serde_json::to_value(&aborted).unwrap(),
            json!({"event": "aborted", "error": "Configuration error: bad header"})
        );
    }
}
