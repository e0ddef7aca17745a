//! Best-effort spoken feedback on top of the text-to-speech capability

use tracing::{debug, warn};

use crate::error::SynthesisError;
use crate::intent::Language;

/// A voice offered by the platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    pub name: String,
    /// BCP-47 tag, e.g. "hi-IN"
    pub lang: String,
}

impl Voice {
    pub fn new(name: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lang: lang.into(),
        }
    }

    fn speaks(&self, language: Language) -> bool {
        self.lang
            .parse::<Language>()
            .map(|l| l == language)
            .unwrap_or(false)
    }
}

/// What gets handed to the platform for playback
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub lang: String,
    pub rate: f32,
    pub pitch: f32,
    pub voice: Option<Voice>,
}

/// Text-to-speech capability
pub trait SpeechSynthesizer: Send {
    /// Voices currently available
    fn voices(&self) -> Vec<Voice>;

    /// Begin playing an utterance; must not block until playback ends
    fn speak(&mut self, utterance: Utterance) -> Result<(), SynthesisError>;

    /// Stop whatever is playing
    fn cancel(&mut self);
}

/// Pick a voice for `language`: "natural" first, then "female", then any
/// voice of the language. `None` means the platform default.
pub fn select_voice(voices: &[Voice], language: Language) -> Option<Voice> {
    let candidates: Vec<&Voice> = voices.iter().filter(|v| v.speaks(language)).collect();

    let tagged = |tag: &str| {
        candidates
            .iter()
            .find(|v| v.name.to_lowercase().contains(tag))
            .copied()
    };

    tagged("natural")
        .or_else(|| tagged("female"))
        .or_else(|| candidates.first().copied())
        .cloned()
}

/// Speaks controller feedback, at most one utterance in flight
pub struct FeedbackSynthesizer {
    synthesizer: Box<dyn SpeechSynthesizer>,
    language: Language,
    rate: f32,
    pitch: f32,
    speaking: bool,
}

impl FeedbackSynthesizer {
    pub fn new(synthesizer: Box<dyn SpeechSynthesizer>, language: Language, rate: f32, pitch: f32) -> Self {
        Self {
            synthesizer,
            language,
            rate,
            pitch,
            speaking: false,
        }
    }

    /// Cancel anything in flight and speak `text`. Failures are logged and
    /// swallowed.
    pub fn speak(&mut self, text: &str) {
        self.cancel();

        if text.trim().is_empty() {
            return;
        }

        let voice = select_voice(&self.synthesizer.voices(), self.language);
        let utterance = Utterance {
            text: text.to_string(),
            lang: self.language.tag().to_string(),
            rate: self.rate,
            pitch: self.pitch,
            voice,
        };

        debug!(
            text,
            voice = utterance.voice.as_ref().map(|v| v.name.as_str()),
            "speaking feedback"
        );

        match self.synthesizer.speak(utterance) {
            Ok(()) => self.speaking = true,
            Err(e) => warn!(error = %e, "speech synthesis failed, feedback dropped"),
        }
    }

    /// Cancel any in-flight utterance
    pub fn cancel(&mut self) {
        if self.speaking {
            self.synthesizer.cancel();
            self.speaking = false;
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingSynthesizer;

    fn voices() -> Vec<Voice> {
        vec![
            Voice::new("Google English", "en-US"),
            Voice::new("Microsoft Heera Female", "en-IN"),
            Voice::new("Microsoft Neerja Online (Natural)", "en-IN"),
            Voice::new("Lekha", "hi-IN"),
        ]
    }

    #[test]
    fn test_prefers_natural_then_female() {
        let chosen = select_voice(&voices(), Language::English).unwrap();
        assert!(chosen.name.contains("Natural"));

        let without_natural: Vec<_> = voices()
            .into_iter()
            .filter(|v| !v.name.contains("Natural"))
            .collect();
        let chosen = select_voice(&without_natural, Language::English).unwrap();
        assert_eq!(chosen.name, "Microsoft Heera Female");
    }

    #[test]
    fn test_falls_back_to_language_then_default() {
        assert_eq!(select_voice(&voices(), Language::Hindi).unwrap().name, "Lekha");
        assert_eq!(select_voice(&voices(), Language::Marathi), None);
    }

    #[test]
    fn test_new_utterance_cancels_previous() {
        let synth = RecordingSynthesizer::new();
        let mut feedback = FeedbackSynthesizer::new(Box::new(synth.clone()), Language::Hindi, 1.0, 1.0);

        feedback.speak("पहला");
        feedback.speak("दूसरा");

        assert_eq!(synth.spoken(), ["पहला", "दूसरा"]);
        assert_eq!(synth.cancels(), 1);
        assert_eq!(synth.utterances()[1].lang, "hi-IN");
    }

    #[test]
    fn test_failures_are_swallowed() {
        let synth = RecordingSynthesizer::new();
        synth.fail_with(SynthesisError::Unavailable);
        let mut feedback = FeedbackSynthesizer::new(Box::new(synth.clone()), Language::English, 1.0, 1.0);

        feedback.speak("hello");
        feedback.cancel();

        assert!(synth.spoken().is_empty());
        assert_eq!(synth.cancels(), 0);
    }
}
