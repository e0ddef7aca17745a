//! State machine module for the listening session
//!
//! Four phases:
//! - Stopped: not listening (initial, and after stop or a fatal error)
//! - ListeningIdle: listening for a wake-word
//! - AwaitingCommand: wake-word accepted, command window open
//! - ProcessingCommand: command answered, grace delay before idle

mod machine;

pub use machine::{Phase, SessionMachine, SessionState, Snapshot};
