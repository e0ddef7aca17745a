//! Capture session: owns the recognizer and the microphone while listening

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::microphone::{Microphone, MicrophoneGuard};
use super::recognizer::{RecognizerOptions, RecognizerSink, SessionEvent, SpeechRecognizer};
use crate::error::CaptureError;

/// Wraps one recognizer instance and its start/stop/restart lifecycle
pub struct CaptureSession {
    recognizer: Box<dyn SpeechRecognizer>,
    microphone: Microphone,
    guard: Option<MicrophoneGuard>,
    options: RecognizerOptions,
    events_tx: mpsc::UnboundedSender<SessionEvent>,
    epoch: u64,
    consecutive_restarts: u32,
    max_restarts: u32,
}

impl CaptureSession {
    pub fn new(
        recognizer: Box<dyn SpeechRecognizer>,
        microphone: Microphone,
        options: RecognizerOptions,
        events_tx: mpsc::UnboundedSender<SessionEvent>,
        max_restarts: u32,
    ) -> Self {
        Self {
            recognizer,
            microphone,
            guard: None,
            options,
            events_tx,
            epoch: 0,
            consecutive_restarts: 0,
            max_restarts,
        }
    }

    pub fn is_supported(&self) -> bool {
        self.recognizer.is_supported()
    }

    /// Holding the microphone, i.e. started and not stopped
    pub fn is_active(&self) -> bool {
        self.guard.is_some()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Every recognizer start opens a new epoch. Events from older epochs
    /// belong to a stream that was stopped, ended or torn down.
    pub fn accepts(&self, event: &SessionEvent) -> bool {
        event.epoch == self.epoch
    }

    /// Acquire the microphone and start the recognizer
    pub fn start(&mut self) -> Result<(), CaptureError> {
        if self.guard.is_some() {
            return Ok(());
        }
        if !self.recognizer.is_supported() {
            return Err(CaptureError::Unsupported);
        }

        let guard = self.microphone.try_acquire()?;
        let sink = self.next_sink();
        self.recognizer.start(&self.options, sink)?;
        self.guard = Some(guard);
        self.consecutive_restarts = 0;

        info!(
            epoch = self.epoch,
            language = %self.options.language,
            continuous = self.options.continuous,
            "capture session started"
        );
        Ok(())
    }

    /// Restart the recognizer after a natural end, keeping the microphone.
    /// Gives up after `max_restarts` attempts without any transcript.
    pub fn restart(&mut self) -> Result<u32, CaptureError> {
        if self.guard.is_none() {
            return Err(CaptureError::Start("capture session is not active".into()));
        }

        if self.consecutive_restarts >= self.max_restarts {
            warn!(attempts = self.consecutive_restarts, "restart limit reached");
            return Err(CaptureError::RestartLimit {
                attempts: self.consecutive_restarts,
            });
        }

        self.consecutive_restarts += 1;
        let attempt = self.consecutive_restarts;
        debug!(attempt, epoch = self.epoch, "restarting recognizer");

        let sink = self.next_sink();
        self.recognizer.start(&self.options, sink)?;
        Ok(attempt)
    }

    /// Any transcript proves the stream is healthy
    pub fn note_activity(&mut self) {
        self.consecutive_restarts = 0;
    }

    /// Stop the recognizer and release the microphone
    pub fn stop(&mut self) {
        self.recognizer.stop();
        if self.guard.take().is_some() {
            info!(epoch = self.epoch, "capture session stopped");
        }
    }

    /// Tear down and swap in a fresh recognizer. The microphone is released
    /// before the caller reacquires it with `start()`.
    pub fn replace(&mut self, recognizer: Box<dyn SpeechRecognizer>) {
        self.stop();
        self.recognizer = recognizer;
        self.consecutive_restarts = 0;
        info!(epoch = self.epoch, "capture session reinitialized");
    }

    fn next_sink(&mut self) -> RecognizerSink {
        self.epoch += 1;
        RecognizerSink::new(self.epoch, self.events_tx.clone())
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        if self.guard.is_some() {
            self.recognizer.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::RecognizerEvent;
    use crate::intent::Language;
    use crate::testing::FakeRecognizer;

    fn options() -> RecognizerOptions {
        RecognizerOptions {
            language: Language::English,
            continuous: true,
            interim_results: true,
        }
    }

    fn session(mic: &Microphone) -> (CaptureSession, FakeRecognizer) {
        let (tx, _rx) = mpsc::unbounded_channel();
        let fake = FakeRecognizer::new();
        let session = CaptureSession::new(Box::new(fake.clone()), mic.clone(), options(), tx, 2);
        (session, fake)
    }

    #[test]
    fn test_start_stop_holds_microphone() {
        let mic = Microphone::new();
        let (mut session, fake) = session(&mic);

        session.start().unwrap();
        assert!(session.is_active());
        assert!(mic.is_held());
        assert_eq!(fake.starts(), 1);

        // second start is a no-op
        session.start().unwrap();
        assert_eq!(fake.starts(), 1);

        session.stop();
        assert!(!mic.is_held());
        assert_eq!(fake.stops(), 1);
    }

    #[test]
    fn test_second_session_cannot_take_microphone() {
        let mic = Microphone::new();
        let (mut first, _) = session(&mic);
        let (mut second, fake) = session(&mic);

        first.start().unwrap();
        assert!(matches!(second.start(), Err(CaptureError::MicrophoneBusy)));
        assert_eq!(fake.starts(), 0);
    }

    #[test]
    fn test_failed_start_releases_microphone() {
        let mic = Microphone::new();
        let (mut session, fake) = session(&mic);
        fake.fail_next_start(CaptureError::PermissionDenied);

        assert!(matches!(session.start(), Err(CaptureError::PermissionDenied)));
        assert!(!mic.is_held());
        assert!(!session.is_active());
    }

    #[test]
    fn test_restart_is_bounded() {
        let mic = Microphone::new();
        let (mut session, _) = session(&mic);
        session.start().unwrap();

        assert_eq!(session.restart().unwrap(), 1);
        assert_eq!(session.restart().unwrap(), 2);
        assert!(matches!(
            session.restart(),
            Err(CaptureError::RestartLimit { attempts: 2 })
        ));

        session.note_activity();
        assert_eq!(session.restart().unwrap(), 1);
    }

    #[test]
    fn test_replace_releases_microphone() {
        let mic = Microphone::new();
        let (mut session, old) = session(&mic);
        session.start().unwrap();

        let fresh = FakeRecognizer::new();
        session.replace(Box::new(fresh.clone()));

        assert!(!mic.is_held());
        assert_eq!(old.stops(), 1);

        session.start().unwrap();
        assert_eq!(fresh.starts(), 1);
        assert_eq!(fresh.last_sink_epoch(), Some(2));
    }

    #[test]
    fn test_every_start_opens_new_epoch() {
        let mic = Microphone::new();
        let (mut session, fake) = session(&mic);

        session.start().unwrap();
        assert_eq!(fake.last_sink_epoch(), Some(1));
        let first_run = SessionEvent {
            epoch: 1,
            event: RecognizerEvent::End,
        };
        assert!(session.accepts(&first_run));

        session.stop();
        session.start().unwrap();
        assert_eq!(session.epoch(), 2);
        assert!(!session.accepts(&first_run));

        session.restart().unwrap();
        assert_eq!(fake.last_sink_epoch(), Some(3));
    }
}
