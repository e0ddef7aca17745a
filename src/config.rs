//! Configuration loading and management

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::intent::Language;

/// Voice controller configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Language listened for and spoken back
    pub language: Language,

    /// Wake-words that open the command window
    pub activation_keywords: Vec<String>,

    /// Keep listening across natural session ends
    pub continuous: bool,

    /// Ask the recognizer for interim hypotheses
    pub interim_results: bool,

    /// Minimum time between two accepted activations
    pub cooldown_ms: u64,

    /// How long to wait for a command after activation
    pub command_window_ms: u64,

    /// Delay between answering a command and returning to idle
    pub grace_ms: u64,

    /// Delay before restarting a naturally ended session
    pub restart_delay_ms: u64,

    /// Consecutive restarts without a transcript before giving up
    pub max_restarts: u32,

    /// Speech rate for feedback
    pub speech_rate: f32,

    /// Speech pitch for feedback
    pub speech_pitch: f32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            language: Language::English,
            activation_keywords: vec!["dharti".into(), "धरती".into()],
            continuous: true,
            interim_results: true,
            cooldown_ms: 1000,
            command_window_ms: 15_000,
            grace_ms: 2000,
            restart_delay_ms: 250,
            max_restarts: 5,
            speech_rate: 1.0,
            speech_pitch: 1.0,
        }
    }
}

impl ControllerConfig {
    /// Load from the optional `DHARTI_CONFIG` JSON file, then apply
    /// `DHARTI_*` environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var("DHARTI_CONFIG") {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON config file; missing fields take their defaults
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: display,
            source,
        })
    }

    /// Apply overrides from a key lookup (the environment in production)
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("DHARTI_LANGUAGE") {
            self.language = value.parse()?;
        }
        if let Some(value) = lookup("DHARTI_WAKE_WORDS") {
            self.activation_keywords = value
                .split(',')
                .map(|w| w.trim().to_string())
                .filter(|w| !w.is_empty())
                .collect();
        }
        if let Some(value) = lookup("DHARTI_CONTINUOUS") {
            self.continuous = parse_bool("DHARTI_CONTINUOUS", &value)?;
        }
        if let Some(value) = lookup("DHARTI_COOLDOWN_MS") {
            self.cooldown_ms = parse_value("DHARTI_COOLDOWN_MS", &value)?;
        }
        if let Some(value) = lookup("DHARTI_COMMAND_WINDOW_MS") {
            self.command_window_ms = parse_value("DHARTI_COMMAND_WINDOW_MS", &value)?;
        }
        if let Some(value) = lookup("DHARTI_GRACE_MS") {
            self.grace_ms = parse_value("DHARTI_GRACE_MS", &value)?;
        }
        if let Some(value) = lookup("DHARTI_RESTART_DELAY_MS") {
            self.restart_delay_ms = parse_value("DHARTI_RESTART_DELAY_MS", &value)?;
        }
        if let Some(value) = lookup("DHARTI_MAX_RESTARTS") {
            self.max_restarts = parse_value("DHARTI_MAX_RESTARTS", &value)?;
        }
        Ok(())
    }

    /// Reject configurations the controller cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.activation_keywords.iter().all(|w| w.trim().is_empty()) {
            return Err(ConfigError::NoWakeWords);
        }
        if self.command_window_ms == 0 {
            return Err(ConfigError::ZeroCommandWindow);
        }
        Ok(())
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    pub fn command_window(&self) -> Duration {
        Duration::from_millis(self.command_window_ms)
    }

    pub fn grace(&self) -> Duration {
        Duration::from_millis(self.grace_ms)
    }

    pub fn restart_delay(&self) -> Duration {
        Duration::from_millis(self.restart_delay_ms)
    }
}

fn parse_value<T: FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
        }),
    }
}
