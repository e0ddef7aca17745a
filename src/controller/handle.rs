//! Cloneable handle for driving a controller running on its own task

use tokio::sync::{broadcast, mpsc, watch};
use tracing::warn;

use crate::events::ControllerEvent;
use crate::state::Snapshot;

use super::voice::Input;

/// Requests accepted by the control surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlRequest {
    Start,
    Stop,
    Toggle,
    Speak(String),
    Reinitialize,
    /// Stop listening and leave the run loop
    Shutdown,
}

/// Sends control requests and observes state
#[derive(Debug, Clone)]
pub struct ControllerHandle {
    input_tx: mpsc::UnboundedSender<Input>,
    snapshot_rx: watch::Receiver<Snapshot>,
    event_tx: broadcast::Sender<ControllerEvent>,
}

impl ControllerHandle {
    pub(crate) fn new(
        input_tx: mpsc::UnboundedSender<Input>,
        snapshot_rx: watch::Receiver<Snapshot>,
        event_tx: broadcast::Sender<ControllerEvent>,
    ) -> Self {
        Self {
            input_tx,
            snapshot_rx,
            event_tx,
        }
    }

    /// Queue a request. Returns false once the controller has shut down.
    pub fn send(&self, request: ControlRequest) -> bool {
        let sent = self.input_tx.send(Input::Control(request)).is_ok();
        if !sent {
            warn!("control request dropped - controller stopped");
        }
        sent
    }

    pub fn start_listening(&self) -> bool {
        self.send(ControlRequest::Start)
    }

    pub fn stop_listening(&self) -> bool {
        self.send(ControlRequest::Stop)
    }

    pub fn toggle_listening(&self) -> bool {
        self.send(ControlRequest::Toggle)
    }

    pub fn speak(&self, text: impl Into<String>) -> bool {
        self.send(ControlRequest::Speak(text.into()))
    }

    pub fn reinitialize(&self) -> bool {
        self.send(ControlRequest::Reinitialize)
    }

    pub fn shutdown(&self) -> bool {
        self.send(ControlRequest::Shutdown)
    }

    /// Latest published state
    pub fn snapshot(&self) -> Snapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// Wait for the next state change; false once the controller is gone
    pub async fn changed(&mut self) -> bool {
        self.snapshot_rx.changed().await.is_ok()
    }

    /// Subscribe to controller events
    pub fn subscribe(&self) -> broadcast::Receiver<ControllerEvent> {
        self.event_tx.subscribe()
    }
}
