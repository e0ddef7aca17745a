//! Console stand-ins for the speech capabilities
//!
//! Lines typed on stdin play the part of the recognizer and feedback is
//! printed instead of spoken. Line syntax:
//! - `text`: final transcript
//! - `~text`: interim transcript
//! - `!end`: natural end of the recognition session
//! - `!error <code>`: recognizer error, e.g. `!error not-allowed`
//! - `!start`, `!stop`, `!toggle`, `!reinit`: control surface

use std::sync::{Arc, Mutex, PoisonError};

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, trace, warn};

use dharti_voice::capture::{RecognitionResult, RecognizerOptions, RecognizerSink, SpeechRecognizer};
use dharti_voice::error::SynthesisError;
use dharti_voice::feedback::{SpeechSynthesizer, Utterance, Voice};
use dharti_voice::{CaptureError, ControlRequest, ControllerHandle, ErrorKind};

/// One parsed stdin line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleLine {
    Final(String),
    Interim(String),
    End,
    Error(ErrorKind),
    Control(ControlRequest),
    Empty,
}

impl ConsoleLine {
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(ConsoleLine::Empty);
        }

        if let Some(command) = line.strip_prefix('!') {
            let mut parts = command.splitn(2, char::is_whitespace);
            let verb = parts.next().unwrap_or_default();
            let arg = parts.next().map(str::trim).unwrap_or_default();
            return match verb {
                "end" => Ok(ConsoleLine::End),
                "error" if !arg.is_empty() => Ok(ConsoleLine::Error(ErrorKind::from(arg.to_string()))),
                "start" => Ok(ConsoleLine::Control(ControlRequest::Start)),
                "stop" => Ok(ConsoleLine::Control(ControlRequest::Stop)),
                "toggle" => Ok(ConsoleLine::Control(ControlRequest::Toggle)),
                "reinit" => Ok(ConsoleLine::Control(ControlRequest::Reinitialize)),
                "say" if !arg.is_empty() => Ok(ConsoleLine::Control(ControlRequest::Speak(arg.to_string()))),
                _ => Err(format!("unknown console command: !{}", command)),
            };
        }

        match line.strip_prefix('~') {
            Some(interim) => Ok(ConsoleLine::Interim(interim.trim().to_string())),
            None => Ok(ConsoleLine::Final(line.to_string())),
        }
    }
}

/// Shared slot for the sink of the currently started console recognizer
#[derive(Debug, Clone, Default)]
pub struct ConsoleInput {
    sink: Arc<Mutex<Option<RecognizerSink>>>,
}

impl ConsoleInput {
    pub fn new() -> Self {
        Self::default()
    }

    fn set(&self, sink: Option<RecognizerSink>) -> Option<RecognizerSink> {
        let mut slot = self.sink.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *slot, sink)
    }

    fn current(&self) -> Option<RecognizerSink> {
        self.sink
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Read stdin until EOF, feeding the recognizer and the control surface
    pub async fn read_lines(&self, handle: ControllerHandle) -> Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        while let Some(line) = lines.next_line().await? {
            let parsed = match ConsoleLine::parse(&line) {
                Ok(parsed) => parsed,
                Err(message) => {
                    warn!("{}", message);
                    continue;
                }
            };

            match parsed {
                ConsoleLine::Empty => {}
                ConsoleLine::Control(request) => {
                    handle.send(request);
                }
                ConsoleLine::End => match self.set(None) {
                    Some(sink) => {
                        sink.end();
                    }
                    None => debug!("not listening, end ignored"),
                },
                other => match self.current() {
                    Some(sink) => emit(&sink, other),
                    None => debug!("not listening, line ignored"),
                },
            }
        }

        info!("stdin closed");
        Ok(())
    }
}

fn emit(sink: &RecognizerSink, line: ConsoleLine) {
    match line {
        ConsoleLine::Final(text) => {
            sink.result(0, vec![RecognitionResult::final_(text)]);
        }
        ConsoleLine::Interim(text) => {
            sink.result(0, vec![RecognitionResult::interim(text)]);
        }
        ConsoleLine::Error(kind) => {
            sink.error(kind);
        }
        ConsoleLine::End | ConsoleLine::Control(_) | ConsoleLine::Empty => {}
    }
}

/// Recognizer that listens to the console
pub struct ConsoleRecognizer {
    input: ConsoleInput,
}

impl ConsoleRecognizer {
    pub fn new(input: ConsoleInput) -> Self {
        Self { input }
    }
}

impl SpeechRecognizer for ConsoleRecognizer {
    fn is_supported(&self) -> bool {
        true
    }

    fn start(&mut self, options: &RecognizerOptions, sink: RecognizerSink) -> Result<(), CaptureError> {
        info!(language = options.language.tag(), "listening on stdin");
        self.input.set(Some(sink));
        Ok(())
    }

    fn stop(&mut self) {
        if self.input.set(None).is_some() {
            debug!("console recognizer stopped");
        }
    }
}

/// Synthesizer that prints instead of speaking
pub struct ConsoleSynthesizer;

impl SpeechSynthesizer for ConsoleSynthesizer {
    fn voices(&self) -> Vec<Voice> {
        vec![
            Voice::new("Console Natural", "en-IN"),
            Voice::new("Console Natural", "hi-IN"),
            Voice::new("Console Natural", "mr-IN"),
        ]
    }

    fn speak(&mut self, utterance: Utterance) -> Result<(), SynthesisError> {
        println!("[{}] {}", utterance.lang, utterance.text);
        Ok(())
    }

    fn cancel(&mut self) {
        trace!("console speech cancelled");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_transcripts() {
        assert_eq!(
            ConsoleLine::parse(" capture photo "),
            Ok(ConsoleLine::Final("capture photo".into()))
        );
        assert_eq!(ConsoleLine::parse("~dhar"), Ok(ConsoleLine::Interim("dhar".into())));
        assert_eq!(ConsoleLine::parse("   "), Ok(ConsoleLine::Empty));
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(ConsoleLine::parse("!end"), Ok(ConsoleLine::End));
        assert_eq!(
            ConsoleLine::parse("!error not-allowed"),
            Ok(ConsoleLine::Error(ErrorKind::PermissionDenied))
        );
        assert_eq!(
            ConsoleLine::parse("!toggle"),
            Ok(ConsoleLine::Control(ControlRequest::Toggle))
        );
        assert_eq!(
            ConsoleLine::parse("!say hello"),
            Ok(ConsoleLine::Control(ControlRequest::Speak("hello".into())))
        );
        assert!(ConsoleLine::parse("!error").is_err());
        assert!(ConsoleLine::parse("!dance").is_err());
    }

    #[test]
    fn test_recognizer_owns_sink_while_started() {
        let input = ConsoleInput::new();
        let mut recognizer = ConsoleRecognizer::new(input.clone());
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        let options = RecognizerOptions {
            language: dharti_voice::Language::English,
            continuous: true,
            interim_results: true,
        };

        recognizer.start(&options, RecognizerSink::new(1, tx)).unwrap();
        assert!(input.current().is_some());

        recognizer.stop();
        assert!(input.current().is_none());
    }
}
