//! Exclusive microphone ownership
//!
//! Only one capture session may hold the device at a time. Sessions that
//! compete for the same device share a `Microphone` handle; holding the
//! returned guard is holding the device.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::debug;

use crate::error::CaptureError;

/// Shared handle to one physical microphone
#[derive(Debug, Clone, Default)]
pub struct Microphone {
    held: Arc<AtomicBool>,
}

impl Microphone {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the microphone, failing if another session holds it
    pub fn try_acquire(&self) -> Result<MicrophoneGuard, CaptureError> {
        if self.held.swap(true, Ordering::SeqCst) {
            return Err(CaptureError::MicrophoneBusy);
        }
        debug!("microphone acquired");
        Ok(MicrophoneGuard {
            held: Arc::clone(&self.held),
        })
    }

    pub fn is_held(&self) -> bool {
        self.held.load(Ordering::SeqCst)
    }
}

/// Releases the microphone on drop
#[derive(Debug)]
pub struct MicrophoneGuard {
    held: Arc<AtomicBool>,
}

impl Drop for MicrophoneGuard {
    fn drop(&mut self) {
        self.held.store(false, Ordering::SeqCst);
        debug!("microphone released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exclusive() {
        let mic = Microphone::new();
        let guard = mic.try_acquire().unwrap();
        assert!(mic.is_held());
        assert!(matches!(
            mic.clone().try_acquire(),
            Err(CaptureError::MicrophoneBusy)
        ));

        drop(guard);
        assert!(!mic.is_held());
        assert!(mic.try_acquire().is_ok());
    }
}
