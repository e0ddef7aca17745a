//! dharti-voice: console harness for the hands-free voice controller
//!
//! Runs the controller with stdin standing in for the speech recognizer
//! and stdout for the synthesizer:
//! - Wake-word detection with cooldown
//! - Command window, keyword intents and spoken feedback
//! - Bounded auto-restart on session end
//!
//! Resolved intents are printed as JSON lines for the host app.

mod console;
mod lifecycle;

use anyhow::Result;
use tokio::sync::broadcast;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use dharti_voice::{ControllerConfig, ControllerHooks, VoiceController};

use crate::console::{ConsoleInput, ConsoleRecognizer, ConsoleSynthesizer};
use crate::lifecycle::ShutdownSignal;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .with_writer(std::io::stderr)
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "dharti-voice starting"
    );

    // Load configuration
    let config = ControllerConfig::load()?;
    info!(
        language = %config.language,
        wake_words = ?config.activation_keywords,
        continuous = config.continuous,
        "configuration loaded"
    );

    let shutdown = ShutdownSignal::new();

    let input = ConsoleInput::new();
    let recognizer_input = input.clone();

    let hooks = ControllerHooks::new()
        .on_activation(|| info!("wake word heard, waiting for a command"))
        .on_command(|intent| info!(action = ?intent.action, "dispatching command"))
        .on_result(|intent| match serde_json::to_string(intent) {
            Ok(json) => println!("{}", json),
            Err(e) => warn!(?e, "failed to encode intent"),
        });

    let controller = VoiceController::builder(config)
        .recognizer(move || ConsoleRecognizer::new(recognizer_input.clone()))
        .synthesizer(ConsoleSynthesizer)
        .hooks(hooks)
        .build()?;

    let handle = controller.handle();
    let mut event_rx = handle.subscribe();
    let controller_task = tokio::spawn(controller.run());

    handle.start_listening();

    info!("ready - type what you would say, or !stop / !toggle / !end");

    tokio::select! {
        result = input.read_lines(handle.clone()) => {
            if let Err(e) = result {
                error!(?e, "console input error");
            }
        }

        // Log controller events
        _ = async {
            loop {
                match event_rx.recv().await {
                    Ok(event) => info!(%event, "controller event"),
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(skipped = n, "controller event receiver lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        } => {
            info!("controller event stream closed");
        }

        // Wait for shutdown signal
        result = shutdown.wait() => {
            match result {
                Ok(()) => info!("shutdown signal received"),
                Err(e) => error!(?e, "failed to install signal handlers"),
            }
        }
    }

    // Cleanup
    info!("shutting down...");

    handle.shutdown();
    if let Err(e) = controller_task.await {
        error!(?e, "controller task failed");
    }

    info!("dharti-voice stopped");

    Ok(())
}
