//! Error taxonomy for the voice controller
//!
//! `ErrorKind` is what callers observe in the state snapshot. The other
//! enums are returned by the capability wrappers and folded into an
//! `ErrorKind` by the controller.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Observable error kinds, named after the platform recognizer error codes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum ErrorKind {
    /// Speech capability absent on this platform
    Unsupported,
    /// Recognizer heard nothing; transient
    NoSpeech,
    /// Microphone or recognition service permission refused
    PermissionDenied,
    /// Auto-restart after a natural end failed
    RestartFailed,
    /// Text-to-speech failed; never surfaced in the snapshot
    SynthesisFailure,
    /// Audio capture device unavailable
    AudioCapture,
    /// Recognition service unreachable
    Network,
    /// Session aborted underneath us
    Aborted,
    /// Configured language rejected by the recognizer
    LanguageNotSupported,
    /// Anything else the platform reports
    Other(String),
}

impl ErrorKind {
    /// Platform error code for this kind
    pub fn code(&self) -> &str {
        match self {
            ErrorKind::Unsupported => "unsupported",
            ErrorKind::NoSpeech => "no-speech",
            ErrorKind::PermissionDenied => "not-allowed",
            ErrorKind::RestartFailed => "restart-failed",
            ErrorKind::SynthesisFailure => "synthesis-failed",
            ErrorKind::AudioCapture => "audio-capture",
            ErrorKind::Network => "network",
            ErrorKind::Aborted => "aborted",
            ErrorKind::LanguageNotSupported => "language-not-supported",
            ErrorKind::Other(code) => code,
        }
    }

    /// Absorbed internally, listening continues
    pub fn is_transient(&self) -> bool {
        matches!(self, ErrorKind::NoSpeech)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for ErrorKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s.trim() {
            "unsupported" => ErrorKind::Unsupported,
            "no-speech" => ErrorKind::NoSpeech,
            "not-allowed" | "service-not-allowed" | "permission-denied" => {
                ErrorKind::PermissionDenied
            }
            "restart-failed" => ErrorKind::RestartFailed,
            "synthesis-failed" => ErrorKind::SynthesisFailure,
            "audio-capture" => ErrorKind::AudioCapture,
            "network" => ErrorKind::Network,
            "aborted" => ErrorKind::Aborted,
            "language-not-supported" => ErrorKind::LanguageNotSupported,
            other => ErrorKind::Other(other.to_string()),
        };
        Ok(kind)
    }
}

impl From<String> for ErrorKind {
    fn from(code: String) -> Self {
        match code.parse() {
            Ok(kind) => kind,
            Err(never) => match never {},
        }
    }
}

impl From<ErrorKind> for String {
    fn from(kind: ErrorKind) -> Self {
        kind.code().to_string()
    }
}

/// Errors from the speech-to-text side
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("speech recognition is not supported on this platform")]
    Unsupported,

    #[error("microphone is held by another capture session")]
    MicrophoneBusy,

    #[error("microphone permission denied")]
    PermissionDenied,

    #[error("failed to start recognizer: {0}")]
    Start(String),

    #[error("gave up restarting after {attempts} consecutive attempts")]
    RestartLimit { attempts: u32 },
}

impl CaptureError {
    /// Kind surfaced in the snapshot when starting fails
    pub fn kind(&self) -> ErrorKind {
        match self {
            CaptureError::Unsupported => ErrorKind::Unsupported,
            CaptureError::MicrophoneBusy => ErrorKind::AudioCapture,
            CaptureError::PermissionDenied => ErrorKind::PermissionDenied,
            CaptureError::Start(reason) => ErrorKind::Other(reason.clone()),
            CaptureError::RestartLimit { .. } => ErrorKind::RestartFailed,
        }
    }
}

/// Errors from the text-to-speech side
#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
    #[error("speech synthesis is not available")]
    Unavailable,

    #[error("speech synthesis failed: {0}")]
    Failed(String),
}

/// Invalid configuration values
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },

    #[error("unsupported language: {0}")]
    UnknownLanguage(String),

    #[error("at least one activation keyword is required")]
    NoWakeWords,

    #[error("command window must be longer than zero")]
    ZeroCommandWindow,

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_codes_parse() {
        assert_eq!("no-speech".parse::<ErrorKind>().unwrap(), ErrorKind::NoSpeech);
        assert_eq!(
            "service-not-allowed".parse::<ErrorKind>().unwrap(),
            ErrorKind::PermissionDenied
        );
        assert_eq!(
            "bad-grammar".parse::<ErrorKind>().unwrap(),
            ErrorKind::Other("bad-grammar".into())
        );
    }

    #[test]
    fn test_classification() {
        assert!(ErrorKind::NoSpeech.is_transient());
        assert!(!ErrorKind::PermissionDenied.is_transient());
        assert!(!ErrorKind::Aborted.is_transient());
        assert!(!ErrorKind::Network.is_transient());
    }

    #[test]
    fn test_serializes_as_code() {
        let json = serde_json::to_string(&ErrorKind::PermissionDenied).unwrap();
        assert_eq!(json, r#""not-allowed""#);
    }

    #[test]
    fn test_capture_error_kind() {
        assert_eq!(
            CaptureError::RestartLimit { attempts: 5 }.kind(),
            ErrorKind::RestartFailed
        );
        assert_eq!(CaptureError::PermissionDenied.kind(), ErrorKind::PermissionDenied);
    }
}
