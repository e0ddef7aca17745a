//! Contract for the external continuous speech-to-text capability
//!
//! Platform backends implement `SpeechRecognizer` and report everything
//! they hear through the `RecognizerSink` handed to `start()`.

use tokio::sync::mpsc;
use tracing::warn;

use crate::error::{CaptureError, ErrorKind};
use crate::intent::Language;

/// One hypothesis from the recognizer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionResult {
    pub transcript: String,
    pub is_final: bool,
}

impl RecognitionResult {
    pub fn interim(transcript: impl Into<String>) -> Self {
        Self {
            transcript: transcript.into(),
            is_final: false,
        }
    }

    pub fn final_(transcript: impl Into<String>) -> Self {
        Self {
            transcript: transcript.into(),
            is_final: true,
        }
    }
}

/// Events emitted by a running recognizer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognizerEvent {
    /// New or updated results; entries before `result_index` are unchanged
    Result {
        result_index: usize,
        results: Vec<RecognitionResult>,
    },
    /// Recognition error reported by the platform
    Error(ErrorKind),
    /// The platform ended the session
    End,
}

/// Transcript text assembled from one result event
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    pub final_text: String,
    pub interim_text: String,
}

impl Transcript {
    /// Join the changed results into final and interim text, one space
    /// between segments
    pub fn assemble(result_index: usize, results: &[RecognitionResult]) -> Self {
        let mut finals = Vec::new();
        let mut interims = Vec::new();

        for result in results.iter().skip(result_index) {
            let text = result.transcript.trim();
            if text.is_empty() {
                continue;
            }
            if result.is_final {
                finals.push(text);
            } else {
                interims.push(text);
            }
        }

        Self {
            final_text: finals.join(" "),
            interim_text: interims.join(" "),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.final_text.is_empty() && self.interim_text.is_empty()
    }

    /// Final text if present, otherwise the interim hypothesis
    pub fn best(&self) -> &str {
        if self.final_text.is_empty() {
            &self.interim_text
        } else {
            &self.final_text
        }
    }
}

/// Options the recognizer is started with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognizerOptions {
    pub language: Language,
    pub continuous: bool,
    pub interim_results: bool,
}

/// Recognizer event tagged with the capture session that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEvent {
    pub epoch: u64,
    pub event: RecognizerEvent,
}

/// Where a recognizer delivers its events
#[derive(Debug, Clone)]
pub struct RecognizerSink {
    epoch: u64,
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl RecognizerSink {
    pub fn new(epoch: u64, tx: mpsc::UnboundedSender<SessionEvent>) -> Self {
        Self { epoch, tx }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Deliver an event. Returns false once the controller is gone.
    pub fn emit(&self, event: RecognizerEvent) -> bool {
        let sent = self
            .tx
            .send(SessionEvent {
                epoch: self.epoch,
                event,
            })
            .is_ok();
        if !sent {
            warn!(epoch = self.epoch, "recognizer event dropped - controller closed");
        }
        sent
    }

    pub fn result(&self, result_index: usize, results: Vec<RecognitionResult>) -> bool {
        self.emit(RecognizerEvent::Result {
            result_index,
            results,
        })
    }

    pub fn error(&self, kind: ErrorKind) -> bool {
        self.emit(RecognizerEvent::Error(kind))
    }

    pub fn end(&self) -> bool {
        self.emit(RecognizerEvent::End)
    }
}

/// Continuous speech-to-text capability
pub trait SpeechRecognizer: Send {
    /// Whether the platform offers recognition at all
    fn is_supported(&self) -> bool;

    /// Begin streaming; events go to `sink` until `stop()` or an `End`
    fn start(&mut self, options: &RecognizerOptions, sink: RecognizerSink) -> Result<(), CaptureError>;

    /// Stop streaming. Must be safe to call when not started.
    fn stop(&mut self);
}

/// Builds fresh recognizers, used by `reinitialize()`
pub type RecognizerFactory = Box<dyn FnMut() -> Box<dyn SpeechRecognizer> + Send>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assemble_skips_unchanged_results() {
        let results = vec![
            RecognitionResult::final_("old words"),
            RecognitionResult::final_(" capture"),
            RecognitionResult::interim(" photo"),
        ];
        let transcript = Transcript::assemble(1, &results);
        assert_eq!(transcript.final_text, "capture");
        assert_eq!(transcript.interim_text, "photo");
        assert_eq!(transcript.best(), "capture");
    }

    #[test]
    fn test_assemble_separates_segments() {
        let results = vec![
            RecognitionResult::final_("hey"),
            RecognitionResult::final_("dharti "),
            RecognitionResult::final_(""),
            RecognitionResult::interim(" capture"),
            RecognitionResult::interim("photo"),
        ];
        let transcript = Transcript::assemble(0, &results);
        assert_eq!(transcript.final_text, "hey dharti");
        assert_eq!(transcript.interim_text, "capture photo");
    }

    #[test]
    fn test_best_falls_back_to_interim() {
        let transcript = Transcript::assemble(0, &[RecognitionResult::interim("dhar")]);
        assert_eq!(transcript.best(), "dhar");
        assert!(!transcript.is_empty());
    }

    #[test]
    fn test_sink_tags_epoch() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sink = RecognizerSink::new(7, tx);
        assert!(sink.end());
        let event = rx.try_recv().unwrap();
        assert_eq!(event.epoch, 7);
        assert_eq!(event.event, RecognizerEvent::End);
    }
}
