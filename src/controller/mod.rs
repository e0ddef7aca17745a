//! Controller module: the control surface over capture, activation,
//! parsing and feedback
//!
//! Drive a `VoiceController` directly, or spawn `run()` and talk to it
//! through a `ControllerHandle`.

mod handle;
mod hooks;
mod voice;


pub use handle::{ControlRequest, ControllerHandle};
pub use hooks::ControllerHooks;
pub use voice::{ControllerBuilder, VoiceController};
