//! Session state and phase transitions
//!
//! Handles transitions between Stopped, ListeningIdle, AwaitingCommand
//! and ProcessingCommand. The flags in `SessionState` are what callers
//! observe; the phase tells the controller which timer governs.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ErrorKind;

/// Controller phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Not listening
    #[default]
    Stopped,
    /// Listening for a wake-word
    ListeningIdle,
    /// Wake-word accepted, command window open
    AwaitingCommand,
    /// Command handled, waiting out the grace delay
    ProcessingCommand,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Stopped => write!(f, "Stopped"),
            Phase::ListeningIdle => write!(f, "ListeningIdle"),
            Phase::AwaitingCommand => write!(f, "AwaitingCommand"),
            Phase::ProcessingCommand => write!(f, "ProcessingCommand"),
        }
    }
}

/// Mutable session data owned by one controller
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub listening: bool,
    pub activated: bool,
    pub processing: bool,
    pub transcript: String,
    pub error: Option<ErrorKind>,
}

/// Observable state handed to callers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub is_listening: bool,
    pub is_activated: bool,
    pub is_supported: bool,
    pub is_processing: bool,
    pub transcript: String,
    pub error: Option<String>,
}

/// Keeps the phase and the state flags consistent
#[derive(Debug, Default)]
pub struct SessionMachine {
    state: SessionState,
    phase: Phase,
    /// Time when the current non-Stopped phase was entered
    phase_entered_at: Option<Instant>,
}

impl SessionMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn snapshot(&self, is_supported: bool) -> Snapshot {
        Snapshot {
            is_listening: self.state.listening,
            is_activated: self.state.activated,
            is_supported,
            is_processing: self.state.processing,
            transcript: self.state.transcript.clone(),
            error: self.state.error.as_ref().map(ToString::to_string),
        }
    }

    pub fn set_transcript(&mut self, transcript: &str) {
        self.state.transcript = transcript.to_string();
    }

    /// Started listening; clears any previous error
    pub fn listening(&mut self) {
        self.state.listening = true;
        self.state.activated = false;
        self.state.processing = false;
        self.state.error = None;
        self.transition_to(Phase::ListeningIdle);
    }

    /// Wake-word accepted
    pub fn activate(&mut self) {
        self.state.activated = true;
        self.state.processing = true;
        self.transition_to(Phase::AwaitingCommand);
    }

    /// Command received and being answered
    pub fn begin_command(&mut self) {
        self.state.processing = true;
        self.transition_to(Phase::ProcessingCommand);
    }

    /// Back to waiting for a wake-word
    pub fn return_to_idle(&mut self) {
        self.state.activated = false;
        self.state.processing = false;
        let next = if self.state.listening {
            Phase::ListeningIdle
        } else {
            Phase::Stopped
        };
        self.transition_to(next);
    }

    /// Stopped, optionally because of an error
    pub fn stop(&mut self, error: Option<ErrorKind>) {
        self.state.listening = false;
        self.state.activated = false;
        self.state.processing = false;
        if error.is_some() {
            self.state.error = error;
        }
        self.transition_to(Phase::Stopped);
    }

    fn transition_to(&mut self, new_phase: Phase) {
        let old_phase = self.phase;
        if old_phase == new_phase {
            return;
        }

        let duration_ms = self
            .phase_entered_at
            .map(|t| t.elapsed().as_millis() as u64)
            .unwrap_or(0);

        info!(
            from = %old_phase,
            to = %new_phase,
            duration_ms = duration_ms,
            "phase transition"
        );

        self.phase = new_phase;
        self.phase_entered_at = if new_phase != Phase::Stopped {
            Some(Instant::now())
        } else {
            None
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let machine = SessionMachine::new();
        assert_eq!(machine.phase(), Phase::Stopped);
        assert_eq!(machine.snapshot(true), Snapshot {
            is_supported: true,
            ..Snapshot::default()
        });
    }

    #[test]
    fn test_activation_cycle() {
        let mut machine = SessionMachine::new();

        machine.listening();
        assert_eq!(machine.phase(), Phase::ListeningIdle);

        machine.activate();
        assert_eq!(machine.phase(), Phase::AwaitingCommand);
        assert!(machine.state().activated && machine.state().processing);

        machine.begin_command();
        assert_eq!(machine.phase(), Phase::ProcessingCommand);

        machine.return_to_idle();
        assert_eq!(machine.phase(), Phase::ListeningIdle);
        assert!(!machine.state().activated && !machine.state().processing);
        assert!(machine.state().listening);
    }

    #[test]
    fn test_stop_from_any_phase() {
        let mut machine = SessionMachine::new();
        machine.listening();
        machine.activate();

        machine.stop(Some(ErrorKind::PermissionDenied));
        let snapshot = machine.snapshot(true);
        assert!(!snapshot.is_listening && !snapshot.is_activated && !snapshot.is_processing);
        assert_eq!(snapshot.error.as_deref(), Some("not-allowed"));
        assert_eq!(machine.phase(), Phase::Stopped);

        // listening again clears the error
        machine.listening();
        assert_eq!(machine.snapshot(true).error, None);
    }

    #[test]
    fn test_idle_after_stop_stays_stopped() {
        let mut machine = SessionMachine::new();
        machine.listening();
        machine.activate();
        machine.stop(None);
        machine.return_to_idle();
        assert_eq!(machine.phase(), Phase::Stopped);
    }
}
