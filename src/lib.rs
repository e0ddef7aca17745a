//! dharti-voice: hands-free voice command controller
//!
//! Listens continuously for a wake-word, opens a bounded command window,
//! maps the spoken command to an intent and answers out loud. The speech
//! capabilities are supplied by the host:
//! - `SpeechRecognizer` for continuous speech-to-text
//! - `SpeechSynthesizer` for text-to-speech
//!
//! Everything else (rendering, routing, prediction calls) stays with the
//! caller, which observes state snapshots and receives intents through
//! callbacks.

pub mod activation;
pub mod capture;
pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod feedback;
pub mod intent;
pub mod state;
pub mod timer;

#[cfg(test)]
pub(crate) mod testing;

pub use config::ControllerConfig;
pub use controller::{ControlRequest, ControllerHandle, ControllerHooks, VoiceController};
pub use error::{CaptureError, ConfigError, ErrorKind, SynthesisError};
pub use events::{ControllerEvent, StopReason};
pub use intent::{Intent, IntentEntry, KeywordTable, Language};
pub use state::{Phase, Snapshot};
