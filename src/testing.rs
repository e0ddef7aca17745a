//! Scripted capability fakes shared by the unit tests

use std::sync::{Arc, Mutex};

use crate::capture::{RecognitionResult, RecognizerOptions, RecognizerSink, SpeechRecognizer};
use crate::error::{CaptureError, ErrorKind, SynthesisError};
use crate::feedback::{SpeechSynthesizer, Utterance, Voice};

#[derive(Default)]
struct RecognizerInner {
    supported: bool,
    starts: usize,
    stops: usize,
    sink: Option<RecognizerSink>,
    options: Option<RecognizerOptions>,
    fail_next_start: Option<CaptureError>,
    fail_all_starts: bool,
}

/// Recognizer whose events are pushed by the test
#[derive(Clone)]
pub struct FakeRecognizer {
    inner: Arc<Mutex<RecognizerInner>>,
}

impl FakeRecognizer {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(RecognizerInner {
                supported: true,
                ..RecognizerInner::default()
            })),
        }
    }

    pub fn unsupported() -> Self {
        let fake = Self::new();
        fake.inner.lock().unwrap().supported = false;
        fake
    }

    pub fn starts(&self) -> usize {
        self.inner.lock().unwrap().starts
    }

    pub fn stops(&self) -> usize {
        self.inner.lock().unwrap().stops
    }

    pub fn last_sink_epoch(&self) -> Option<u64> {
        self.inner.lock().unwrap().sink.as_ref().map(RecognizerSink::epoch)
    }

    pub fn last_options(&self) -> Option<RecognizerOptions> {
        self.inner.lock().unwrap().options.clone()
    }

    pub fn fail_next_start(&self, error: CaptureError) {
        self.inner.lock().unwrap().fail_next_start = Some(error);
    }

    /// Every later start fails, as when permission is revoked mid-session
    pub fn fail_all_starts(&self) {
        self.inner.lock().unwrap().fail_all_starts = true;
    }

    fn sink(&self) -> RecognizerSink {
        self.inner
            .lock()
            .unwrap()
            .sink
            .clone()
            .expect("recognizer was never started")
    }

    pub fn say_final(&self, text: &str) {
        self.sink().result(0, vec![RecognitionResult::final_(text)]);
    }

    /// One event carrying several final results
    pub fn say_finals(&self, segments: &[&str]) {
        let results = segments.iter().map(|s| RecognitionResult::final_(*s)).collect();
        self.sink().result(0, results);
    }

    pub fn say_interim(&self, text: &str) {
        self.sink().result(0, vec![RecognitionResult::interim(text)]);
    }

    pub fn error(&self, kind: ErrorKind) {
        self.sink().error(kind);
    }

    pub fn end(&self) {
        self.sink().end();
    }
}

impl SpeechRecognizer for FakeRecognizer {
    fn is_supported(&self) -> bool {
        self.inner.lock().unwrap().supported
    }

    fn start(&mut self, options: &RecognizerOptions, sink: RecognizerSink) -> Result<(), CaptureError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(error) = inner.fail_next_start.take() {
            return Err(error);
        }
        if inner.fail_all_starts {
            return Err(CaptureError::PermissionDenied);
        }
        inner.starts += 1;
        inner.sink = Some(sink);
        inner.options = Some(options.clone());
        Ok(())
    }

    fn stop(&mut self) {
        self.inner.lock().unwrap().stops += 1;
    }
}

#[derive(Default)]
struct SynthesizerInner {
    voices: Vec<Voice>,
    utterances: Vec<Utterance>,
    cancels: usize,
    failure: Option<String>,
}

/// Synthesizer that records what it was asked to say
#[derive(Clone, Default)]
pub struct RecordingSynthesizer {
    inner: Arc<Mutex<SynthesizerInner>>,
}

impl RecordingSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_voices(voices: Vec<Voice>) -> Self {
        let synth = Self::new();
        synth.inner.lock().unwrap().voices = voices;
        synth
    }

    pub fn fail_with(&self, error: SynthesisError) {
        self.inner.lock().unwrap().failure = Some(error.to_string());
    }

    pub fn utterances(&self) -> Vec<Utterance> {
        self.inner.lock().unwrap().utterances.clone()
    }

    pub fn spoken(&self) -> Vec<String> {
        self.utterances().into_iter().map(|u| u.text).collect()
    }

    pub fn last_spoken(&self) -> Option<String> {
        self.spoken().pop()
    }

    pub fn cancels(&self) -> usize {
        self.inner.lock().unwrap().cancels
    }
}

impl SpeechSynthesizer for RecordingSynthesizer {
    fn voices(&self) -> Vec<Voice> {
        self.inner.lock().unwrap().voices.clone()
    }

    fn speak(&mut self, utterance: Utterance) -> Result<(), SynthesisError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(reason) = inner.failure.clone() {
            return Err(SynthesisError::Failed(reason));
        }
        inner.utterances.push(utterance);
        Ok(())
    }

    fn cancel(&mut self) {
        self.inner.lock().unwrap().cancels += 1;
    }
}
