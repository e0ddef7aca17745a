//! Caller callbacks fired by the controller

use std::fmt;

use crate::intent::Intent;

type ActivationHook = Box<dyn FnMut() + Send>;
type IntentHook = Box<dyn FnMut(&Intent) + Send>;

/// The three callback hooks; any of them may be left unset
#[derive(Default)]
pub struct ControllerHooks {
    on_activation: Option<ActivationHook>,
    on_command: Option<IntentHook>,
    on_result: Option<IntentHook>,
}

impl ControllerHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called when a wake-word is accepted
    pub fn on_activation<F>(mut self, f: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        self.on_activation = Some(Box::new(f));
        self
    }

    /// Called with intents that matched an action
    pub fn on_command<F>(mut self, f: F) -> Self
    where
        F: FnMut(&Intent) + Send + 'static,
    {
        self.on_command = Some(Box::new(f));
        self
    }

    /// Called with every resolved intent, matched or not
    pub fn on_result<F>(mut self, f: F) -> Self
    where
        F: FnMut(&Intent) + Send + 'static,
    {
        self.on_result = Some(Box::new(f));
        self
    }

    pub(crate) fn activation(&mut self) {
        if let Some(hook) = self.on_activation.as_mut() {
            hook();
        }
    }

    pub(crate) fn command(&mut self, intent: &Intent) {
        if let Some(hook) = self.on_command.as_mut() {
            hook(intent);
        }
    }

    pub(crate) fn result(&mut self, intent: &Intent) {
        if let Some(hook) = self.on_result.as_mut() {
            hook(intent);
        }
    }
}

impl fmt::Debug for ControllerHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerHooks")
            .field("on_activation", &self.on_activation.is_some())
            .field("on_command", &self.on_command.is_some())
            .field("on_result", &self.on_result.is_some())
            .finish()
    }
}
