//! Single-slot cancellable timers
//!
//! Each timer role owns exactly one slot. Arming a slot aborts whatever it
//! held before, and every arm/cancel bumps a generation so a firing that
//! was already queued for a cancelled timer is recognised as stale.

use std::fmt;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::trace;

/// The timers the controller coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerRole {
    /// Waiting for a command after activation
    CommandWindow,
    /// Delay between speaking a command response and returning to idle
    Grace,
    /// Delay before restarting a naturally ended capture session
    Restart,
}

impl fmt::Display for TimerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimerRole::CommandWindow => write!(f, "command_window"),
            TimerRole::Grace => write!(f, "grace"),
            TimerRole::Restart => write!(f, "restart"),
        }
    }
}

/// Message delivered when a timer runs out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerFired {
    pub role: TimerRole,
    pub generation: u64,
}

/// Holds at most one outstanding timer for a role
#[derive(Debug)]
pub struct TimerSlot {
    role: TimerRole,
    generation: u64,
    handle: Option<JoinHandle<()>>,
}

impl TimerSlot {
    pub fn new(role: TimerRole) -> Self {
        Self {
            role,
            generation: 0,
            handle: None,
        }
    }

    /// Cancel any pending timer and start a new one. When it runs out,
    /// `wrap(TimerFired)` is sent on `tx`.
    pub fn arm<T>(&mut self, after: Duration, tx: &mpsc::UnboundedSender<T>, wrap: fn(TimerFired) -> T)
    where
        T: Send + 'static,
    {
        self.cancel();
        self.generation += 1;

        let fired = TimerFired {
            role: self.role,
            generation: self.generation,
        };
        let tx = tx.clone();

        trace!(role = %self.role, generation = self.generation, ?after, "timer armed");

        self.handle = Some(tokio::spawn(async move {
            tokio::time::sleep(after).await;
            let _ = tx.send(wrap(fired));
        }));
    }

    /// Cancel the pending timer. Returns true if one was outstanding.
    pub fn cancel(&mut self) -> bool {
        match self.handle.take() {
            Some(handle) => {
                handle.abort();
                self.generation += 1;
                trace!(role = %self.role, "timer cancelled");
                true
            }
            None => false,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.handle.is_some()
    }

    /// Consume a firing. Returns false for stale firings, which must be
    /// ignored by the caller.
    pub fn accept(&mut self, fired: TimerFired) -> bool {
        if fired.role != self.role || fired.generation != self.generation || self.handle.is_none() {
            trace!(role = %fired.role, generation = fired.generation, "stale timer firing ignored");
            return false;
        }
        self.handle = None;
        true
    }
}

impl Drop for TimerSlot {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
