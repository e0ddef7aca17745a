//! Capture module wrapping the speech-to-text capability
//!
//! The session owns the recognizer and the microphone; the controller
//! decides when to start, stop and restart it.

mod microphone;
mod recognizer;
mod session;

pub use microphone::{Microphone, MicrophoneGuard};
pub use recognizer::{
    RecognitionResult, RecognizerEvent, RecognizerFactory, RecognizerOptions, RecognizerSink,
    SessionEvent, SpeechRecognizer, Transcript,
};
pub use session::CaptureSession;
