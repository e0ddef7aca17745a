//! Events module for controller notifications
//!
//! Broadcast to observers alongside the callback hooks, for logging and
//! for UIs that prefer a stream over callbacks.

use serde::{Deserialize, Serialize};

use crate::error::ErrorKind;
use crate::intent::Intent;

/// Why listening stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// `stop_listening()` or toggle
    Requested,
    /// Non-continuous session ended naturally
    SessionEnded,
    /// Recognizer or restart failure
    Error,
    /// Torn down by `reinitialize()`
    Reinitialized,
}

/// Events emitted by the controller during transitions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControllerEvent {
    /// Capture session started
    ListeningStarted,

    /// Capture session stopped
    ListeningStopped { reason: StopReason },

    /// Wake-word accepted, command window open
    Activated { wake_word: String },

    /// Command parsed and answered
    CommandResolved { intent: Intent },

    /// Command window closed without a command
    CommandTimeout,

    /// Grace delay after a command elapsed
    ReturnedToIdle,

    /// Recognizer restarted after a natural end
    Restarted { attempt: u32 },

    /// Error surfaced in the snapshot
    Error { kind: ErrorKind },
}

impl std::fmt::Display for ControllerEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ControllerEvent::ListeningStarted => write!(f, "LISTENING_STARTED"),
            ControllerEvent::ListeningStopped { reason } => {
                write!(f, "LISTENING_STOPPED ({:?})", reason)
            }
            ControllerEvent::Activated { wake_word } => write!(f, "ACTIVATED ({})", wake_word),
            ControllerEvent::CommandResolved { intent } => write!(
                f,
                "COMMAND_RESOLVED ({})",
                intent.action.as_deref().unwrap_or("unknown")
            ),
            ControllerEvent::CommandTimeout => write!(f, "COMMAND_TIMEOUT"),
            ControllerEvent::ReturnedToIdle => write!(f, "RETURNED_TO_IDLE"),
            ControllerEvent::Restarted { attempt } => write!(f, "RESTARTED (attempt {})", attempt),
            ControllerEvent::Error { kind } => write!(f, "ERROR ({})", kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = ControllerEvent::Error {
            kind: ErrorKind::PermissionDenied,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"error""#));
        assert!(json.contains("not-allowed"));
    }

    #[test]
    fn test_event_deserialization() {
        let json = r#"{"type":"listening_stopped","reason":"session_ended"}"#;
        let event: ControllerEvent = serde_json::from_str(json).unwrap();
        assert_eq!(
            event,
            ControllerEvent::ListeningStopped {
                reason: StopReason::SessionEnded
            }
        );
    }

    #[test]
    fn test_display() {
        let intent = Intent {
            action: None,
            response: String::new(),
            original_command: "hmm".into(),
        };
        assert_eq!(
            ControllerEvent::CommandResolved { intent }.to_string(),
            "COMMAND_RESOLVED (unknown)"
        );
    }
}
