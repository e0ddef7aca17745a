//! Feedback module wrapping the text-to-speech capability

mod synthesizer;

pub use synthesizer::{select_voice, FeedbackSynthesizer, SpeechSynthesizer, Utterance, Voice};
