//! The hands-free voice controller
//!
//! All transitions happen on one task: recognizer events, timer firings
//! and control requests are queued and handled one at a time. Every
//! transition cancels the timers of the phase it leaves.

use tokio::sync::{broadcast, mpsc, watch};
use tracing::{debug, info, trace, warn};

use crate::activation::{ActivationDetector, Detection};
use crate::capture::{
    CaptureSession, Microphone, RecognizerEvent, RecognizerFactory, RecognizerOptions,
    RecognizerSink, RecognitionResult, SessionEvent, SpeechRecognizer, Transcript,
};
use crate::config::ControllerConfig;
use crate::error::{CaptureError, ConfigError, ErrorKind, SynthesisError};
use crate::events::{ControllerEvent, StopReason};
use crate::feedback::{FeedbackSynthesizer, SpeechSynthesizer, Utterance, Voice};
use crate::intent::{CommandParser, KeywordTable};
use crate::state::{Phase, SessionMachine, SessionState, Snapshot};
use crate::timer::{TimerFired, TimerRole, TimerSlot};

use super::handle::{ControlRequest, ControllerHandle};
use super::hooks::ControllerHooks;

/// Everything besides recognizer events that the controller reacts to
#[derive(Debug)]
pub(crate) enum Input {
    Control(ControlRequest),
    Timer(TimerFired),
}

/// Builds a `VoiceController`
pub struct ControllerBuilder {
    config: ControllerConfig,
    factory: Option<RecognizerFactory>,
    synthesizer: Option<Box<dyn SpeechSynthesizer>>,
    table: KeywordTable,
    microphone: Microphone,
    hooks: ControllerHooks,
}

impl ControllerBuilder {
    /// Factory for recognizers; called once now and again on every
    /// `reinitialize()`
    pub fn recognizer<F, R>(mut self, mut factory: F) -> Self
    where
        F: FnMut() -> R + Send + 'static,
        R: SpeechRecognizer + 'static,
    {
        self.factory = Some(Box::new(move || -> Box<dyn SpeechRecognizer> {
            Box::new(factory())
        }));
        self
    }

    pub fn synthesizer(mut self, synthesizer: impl SpeechSynthesizer + 'static) -> Self {
        self.synthesizer = Some(Box::new(synthesizer));
        self
    }

    /// Replace the default farming keyword table
    pub fn keyword_table(mut self, table: KeywordTable) -> Self {
        self.table = table;
        self
    }

    /// Share a microphone with other controllers
    pub fn microphone(mut self, microphone: Microphone) -> Self {
        self.microphone = microphone;
        self
    }

    pub fn hooks(mut self, hooks: ControllerHooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn build(self) -> Result<VoiceController, ConfigError> {
        self.config.validate()?;

        let config = self.config;
        let mut factory = self.factory;
        let recognizer: Box<dyn SpeechRecognizer> = match factory.as_mut() {
            Some(make) => make(),
            None => Box::new(Unavailable),
        };
        let synthesizer: Box<dyn SpeechSynthesizer> = match self.synthesizer {
            Some(synthesizer) => synthesizer,
            None => Box::new(Unavailable),
        };

        let (input_tx, input_rx) = mpsc::unbounded_channel();
        let (session_tx, session_rx) = mpsc::unbounded_channel();
        let (event_tx, _) = broadcast::channel(64);

        let options = RecognizerOptions {
            language: config.language,
            continuous: config.continuous,
            interim_results: config.interim_results,
        };
        let capture = CaptureSession::new(
            recognizer,
            self.microphone,
            options,
            session_tx,
            config.max_restarts,
        );
        let supported = capture.is_supported();
        if !supported {
            warn!("speech recognition unsupported - voice control disabled");
        }

        let machine = SessionMachine::new();
        let (snapshot_tx, _) = watch::channel(machine.snapshot(supported));

        Ok(VoiceController {
            detector: ActivationDetector::new(&config.activation_keywords, config.cooldown()),
            parser: CommandParser::new(self.table, config.language),
            feedback: FeedbackSynthesizer::new(
                synthesizer,
                config.language,
                config.speech_rate,
                config.speech_pitch,
            ),
            machine,
            supported,
            capture,
            factory,
            command_window: TimerSlot::new(TimerRole::CommandWindow),
            grace: TimerSlot::new(TimerRole::Grace),
            restart: TimerSlot::new(TimerRole::Restart),
            hooks: self.hooks,
            input_tx,
            input_rx,
            session_rx,
            snapshot_tx,
            event_tx,
            config,
        })
    }
}

/// Wake-word activated voice command controller
pub struct VoiceController {
    config: ControllerConfig,
    machine: SessionMachine,
    supported: bool,
    capture: CaptureSession,
    factory: Option<RecognizerFactory>,
    detector: ActivationDetector,
    parser: CommandParser,
    feedback: FeedbackSynthesizer,
    command_window: TimerSlot,
    grace: TimerSlot,
    restart: TimerSlot,
    hooks: ControllerHooks,
    input_tx: mpsc::UnboundedSender<Input>,
    input_rx: mpsc::UnboundedReceiver<Input>,
    session_rx: mpsc::UnboundedReceiver<SessionEvent>,
    snapshot_tx: watch::Sender<Snapshot>,
    event_tx: broadcast::Sender<ControllerEvent>,
}

impl VoiceController {
    pub fn builder(config: ControllerConfig) -> ControllerBuilder {
        ControllerBuilder {
            config,
            factory: None,
            synthesizer: None,
            table: KeywordTable::agriculture(),
            microphone: Microphone::new(),
            hooks: ControllerHooks::new(),
        }
    }

    pub fn handle(&self) -> ControllerHandle {
        ControllerHandle::new(
            self.input_tx.clone(),
            self.snapshot_tx.subscribe(),
            self.event_tx.clone(),
        )
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ControllerEvent> {
        self.event_tx.subscribe()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.machine.snapshot(self.supported)
    }

    pub fn state(&self) -> &SessionState {
        self.machine.state()
    }

    pub fn phase(&self) -> Phase {
        self.machine.phase()
    }

    pub fn is_supported(&self) -> bool {
        self.supported
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Run until a `Shutdown` request arrives
    pub async fn run(mut self) {
        info!(language = %self.config.language, "voice controller started");

        while self.step().await {}

        self.stop_listening();
        info!("voice controller stopped");
    }

    /// Wait for and handle one input. Returns false on shutdown.
    pub async fn step(&mut self) -> bool {
        tokio::select! {
            biased;
            Some(input) = self.input_rx.recv() => self.handle_input(input),
            Some(event) = self.session_rx.recv() => {
                self.handle_session_event(event);
                true
            }
            else => false,
        }
    }

    fn handle_input(&mut self, input: Input) -> bool {
        match input {
            Input::Control(request) => {
                debug!(?request, "control request");
                match request {
                    ControlRequest::Start => self.start_listening(),
                    ControlRequest::Stop => self.stop_listening(),
                    ControlRequest::Toggle => self.toggle_listening(),
                    ControlRequest::Speak(text) => self.speak(&text),
                    ControlRequest::Reinitialize => self.reinitialize(),
                    ControlRequest::Shutdown => return false,
                }
            }
            Input::Timer(fired) => self.handle_timer(fired),
        }
        true
    }

    // ---- control surface ----

    /// Start the capture session. No-op if already listening or unsupported.
    pub fn start_listening(&mut self) {
        if !self.supported {
            debug!("start ignored - recognition unsupported");
            return;
        }
        if self.machine.state().listening {
            return;
        }

        match self.capture.start() {
            Ok(()) => {
                self.machine.listening();
                self.emit(ControllerEvent::ListeningStarted);
            }
            Err(e) => {
                warn!(error = %e, "failed to start listening");
                self.fail(e.kind());
            }
        }
        self.publish();
    }

    /// Stop everything: timers, speech and the capture session
    pub fn stop_listening(&mut self) {
        let was_listening = self.machine.state().listening;

        self.cancel_timers();
        self.feedback.cancel();
        self.capture.stop();
        self.machine.stop(None);

        if was_listening {
            self.emit(ControllerEvent::ListeningStopped {
                reason: StopReason::Requested,
            });
        }
        self.publish();
    }

    pub fn toggle_listening(&mut self) {
        if self.machine.state().listening {
            self.stop_listening();
        } else {
            self.start_listening();
        }
    }

    /// Speak arbitrary text, cancelling any feedback in flight
    pub fn speak(&mut self, text: &str) {
        self.feedback.speak(text);
    }

    /// Tear down the capture session and build a fresh one, resuming
    /// listening if it was on
    pub fn reinitialize(&mut self) {
        let was_listening = self.machine.state().listening;

        self.cancel_timers();
        self.feedback.cancel();

        match self.factory.as_mut() {
            Some(make) => {
                let recognizer = make();
                self.capture.replace(recognizer);
            }
            None => self.capture.stop(),
        }
        self.supported = self.capture.is_supported();
        self.machine.stop(None);

        if was_listening {
            self.emit(ControllerEvent::ListeningStopped {
                reason: StopReason::Reinitialized,
            });
            self.start_listening();
        }
        self.publish();
    }

    // ---- recognizer events ----

    fn handle_session_event(&mut self, event: SessionEvent) {
        if !self.capture.accepts(&event) {
            trace!(
                epoch = event.epoch,
                current = self.capture.epoch(),
                "event from a stopped session ignored"
            );
            return;
        }

        match event.event {
            RecognizerEvent::Result {
                result_index,
                results,
            } => self.on_result(result_index, &results),
            RecognizerEvent::Error(kind) => self.on_recognizer_error(kind),
            RecognizerEvent::End => self.on_session_end(),
        }
        self.publish();
    }

    fn on_result(&mut self, result_index: usize, results: &[RecognitionResult]) {
        if !self.machine.state().listening {
            return;
        }

        let transcript = Transcript::assemble(result_index, results);
        if transcript.is_empty() {
            return;
        }

        self.capture.note_activity();
        self.machine.set_transcript(transcript.best());
        trace!(
            final_text = %transcript.final_text,
            interim_text = %transcript.interim_text,
            phase = %self.machine.phase(),
            "transcript"
        );

        match self.machine.phase() {
            Phase::Stopped => {}
            Phase::ListeningIdle => self.activate_with_inline_command(&transcript),
            Phase::AwaitingCommand => {
                let heard = transcript.best();
                let wake_word_only = self.detector.find_wake_word(heard).is_some()
                    && self.detector.strip_wake_words(heard).is_empty();

                if wake_word_only {
                    self.try_activate(heard);
                } else if !transcript.final_text.is_empty() {
                    self.handle_command(&transcript.final_text);
                }
            }
            Phase::ProcessingCommand => {
                // only a fresh activation interrupts the grace delay
                if self.detector.find_wake_word(transcript.best()).is_some() {
                    self.activate_with_inline_command(&transcript);
                }
            }
        }
    }

    fn on_recognizer_error(&mut self, kind: ErrorKind) {
        if kind.is_transient() {
            debug!(%kind, "transient recognizer error ignored");
            return;
        }
        if !self.machine.state().listening {
            debug!(%kind, "recognizer error after stop ignored");
            return;
        }

        warn!(%kind, "recognizer error");
        self.fail(kind);
    }

    fn on_session_end(&mut self) {
        if !self.machine.state().listening {
            debug!("session ended after stop");
            return;
        }

        if self.config.continuous {
            debug!(delay = ?self.config.restart_delay(), "session ended, scheduling restart");
            self.restart
                .arm(self.config.restart_delay(), &self.input_tx, Input::Timer);
            return;
        }

        info!("session ended");
        self.cancel_timers();
        self.capture.stop();
        self.machine.stop(None);
        self.emit(ControllerEvent::ListeningStopped {
            reason: StopReason::SessionEnded,
        });
    }

    // ---- activation and commands ----

    /// Activate, then resolve whatever followed the wake-word in the same
    /// final ("dharti, capture photo" in one breath)
    fn activate_with_inline_command(&mut self, transcript: &Transcript) {
        if !self.try_activate(transcript.best()) {
            return;
        }
        let rest = self.detector.strip_wake_words(&transcript.final_text);
        if !rest.is_empty() {
            self.handle_command(&rest);
        }
    }

    fn try_activate(&mut self, transcript: &str) -> bool {
        let wake_word = match self.detector.detect(transcript) {
            Detection::Activated { wake_word } => wake_word,
            Detection::Cooldown { .. } | Detection::None => return false,
        };

        self.grace.cancel();
        self.machine.activate();
        self.hooks.activation();
        self.feedback.speak(self.config.language.acknowledgement());
        self.command_window
            .arm(self.config.command_window(), &self.input_tx, Input::Timer);

        self.emit(ControllerEvent::Activated { wake_word });
        true
    }

    fn handle_command(&mut self, command: &str) {
        self.command_window.cancel();
        self.machine.begin_command();

        let intent = self.parser.parse(command);
        info!(action = ?intent.action, command = %intent.original_command, "command received");

        if intent.is_understood() {
            self.hooks.command(&intent);
        }
        self.hooks.result(&intent);
        self.feedback.speak(&intent.response);

        self.grace.arm(self.config.grace(), &self.input_tx, Input::Timer);
        self.emit(ControllerEvent::CommandResolved { intent });
    }

    // ---- timers ----

    fn handle_timer(&mut self, fired: TimerFired) {
        match fired.role {
            TimerRole::CommandWindow => {
                if self.command_window.accept(fired) {
                    self.on_command_timeout();
                }
            }
            TimerRole::Grace => {
                if self.grace.accept(fired) {
                    self.machine.return_to_idle();
                    self.emit(ControllerEvent::ReturnedToIdle);
                }
            }
            TimerRole::Restart => {
                if self.restart.accept(fired) {
                    self.restart_capture();
                }
            }
        }
        self.publish();
    }

    fn on_command_timeout(&mut self) {
        info!(window = ?self.config.command_window(), "no command received");
        self.machine.return_to_idle();
        self.feedback.speak(self.config.language.no_command());
        self.emit(ControllerEvent::CommandTimeout);
    }

    fn restart_capture(&mut self) {
        if !self.machine.state().listening || !self.capture.is_active() {
            return;
        }

        match self.capture.restart() {
            Ok(attempt) => self.emit(ControllerEvent::Restarted { attempt }),
            Err(e) => {
                warn!(error = %e, "auto-restart failed");
                self.fail(ErrorKind::RestartFailed);
            }
        }
    }

    // ---- helpers ----

    /// Stop listening and surface `kind`
    fn fail(&mut self, kind: ErrorKind) {
        let was_listening = self.machine.state().listening;

        self.cancel_timers();
        self.capture.stop();
        self.machine.stop(Some(kind.clone()));

        self.emit(ControllerEvent::Error { kind });
        if was_listening {
            self.emit(ControllerEvent::ListeningStopped {
                reason: StopReason::Error,
            });
        }
    }

    fn cancel_timers(&mut self) {
        self.command_window.cancel();
        self.grace.cancel();
        self.restart.cancel();
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(self.machine.snapshot(self.supported));
    }

    fn emit(&self, event: ControllerEvent) {
        debug!(%event, "emitting controller event");
        let _ = self.event_tx.send(event);
    }
}

/// Stand-in when no capability was supplied
struct Unavailable;

impl SpeechRecognizer for Unavailable {
    fn is_supported(&self) -> bool {
        false
    }

    fn start(&mut self, _options: &RecognizerOptions, _sink: RecognizerSink) -> Result<(), CaptureError> {
        Err(CaptureError::Unsupported)
    }

    fn stop(&mut self) {}
}

impl SpeechSynthesizer for Unavailable {
    fn voices(&self) -> Vec<Voice> {
        Vec::new()
    }

    fn speak(&mut self, _utterance: Utterance) -> Result<(), SynthesisError> {
        Err(SynthesisError::Unavailable)
    }

    fn cancel(&mut self) {}
}
