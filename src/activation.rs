//! Wake-word detection over transcripts
//!
//! Matching is a case-insensitive substring test against every configured
//! wake-word. Accepted activations are rate limited by a cooldown so the
//! stream of interim results repeating the same wake-word only activates
//! once.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info};

use crate::intent::normalize;

/// Outcome of offering a transcript to the detector
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detection {
    /// No wake-word in the transcript
    None,
    /// Wake-word found but the cooldown has not elapsed
    Cooldown { wake_word: String },
    /// Wake-word found and accepted
    Activated { wake_word: String },
}

/// Scans transcripts for wake-words and enforces the re-activation cooldown
#[derive(Debug, Clone)]
pub struct ActivationDetector {
    wake_words: Vec<String>,
    cooldown: Duration,
    last_activation: Option<Instant>,
}

impl ActivationDetector {
    pub fn new<I, S>(wake_words: I, cooldown: Duration) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = wake_words
            .into_iter()
            .map(|w| normalize(w.as_ref()))
            .filter(|w| !w.is_empty())
            .collect();
        normalized.dedup();

        debug!(wake_words = ?normalized, ?cooldown, "activation detector initialized");

        Self {
            wake_words: normalized,
            cooldown,
            last_activation: None,
        }
    }

    /// First wake-word contained in the transcript
    pub fn find_wake_word(&self, transcript: &str) -> Option<&str> {
        let normalized = normalize(transcript);
        self.wake_words
            .iter()
            .find(|w| normalized.contains(w.as_str()))
            .map(String::as_str)
    }

    /// Check a transcript and, if eligible, record the activation
    pub fn detect(&mut self, transcript: &str) -> Detection {
        self.detect_at(transcript, Instant::now())
    }

    fn detect_at(&mut self, transcript: &str, now: Instant) -> Detection {
        let Some(wake_word) = self.find_wake_word(transcript).map(str::to_string) else {
            return Detection::None;
        };

        if !self.cooldown_elapsed(now) {
            debug!(%wake_word, "wake word inside cooldown, dropped");
            return Detection::Cooldown { wake_word };
        }

        self.last_activation = Some(now);
        info!(%wake_word, "wake word detected");
        Detection::Activated { wake_word }
    }

    /// Strictly more than the cooldown since the last accepted activation
    pub fn cooldown_elapsed(&self, now: Instant) -> bool {
        match self.last_activation {
            Some(last) => now.saturating_duration_since(last) > self.cooldown,
            None => true,
        }
    }

    /// Transcript with every wake-word removed, normalized
    pub fn strip_wake_words(&self, transcript: &str) -> String {
        let mut text = normalize(transcript);
        for wake_word in &self.wake_words {
            text = text.replace(wake_word.as_str(), " ");
        }
        text.split_whitespace()
            .filter(|w| !w.chars().all(|c| c.is_ascii_punctuation()))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn wake_words(&self) -> &[String] {
        &self.wake_words
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }
}
