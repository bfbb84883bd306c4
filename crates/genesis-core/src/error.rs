//! Error types for the fallible edges of the engine.
//!
//! World generation has no error type: a generated world that breaks an
//! invariant is a bug, caught by the generation tests.

use thiserror::Error;

/// Configuration loading and validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Errors raised by engine entrypoints. These never escape an event
/// handler; they are logged and the frame loop carries on.
#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    #[error("invalid viewport {width}x{height}")]
    InvalidViewport { width: u32, height: u32 },
}

/// Audio backend failures
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AudioError {
    /// The platform refused to start audio (autoplay policy)
    #[error("audio start blocked: {0}")]
    Blocked(String),

    #[error("audio engine not started")]
    NotStarted,
}

/// Speech recognition failures
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SpeechError {
    #[error("speech recognition not supported")]
    Unsupported,

    #[error("microphone permission denied")]
    PermissionDenied,

    #[error("recognition already started")]
    AlreadyRunning,

    /// Stop requested, or the recognizer ended on its own
    #[error("recognition not running")]
    NotRunning,
}

impl SpeechError {
    /// Whether voice input can never work for this session
    pub fn is_permanent(&self) -> bool {
        matches!(self, SpeechError::Unsupported | SpeechError::PermissionDenied)
    }
}

/// Snapshot encoding errors
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("serialization error: {0}")]
    Encode(#[from] bincode::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = EngineError::InvalidViewport { width: 0, height: 720 };
        assert_eq!(err.to_string(), "invalid viewport 0x720");

        let err = ConfigError::Invalid {
            field: "sim.gaze_charge_rate",
            reason: "must be positive".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid config value for sim.gaze_charge_rate: must be positive"
        );
    }

    #[test]
    fn test_permanent_speech_errors() {
        assert!(SpeechError::PermissionDenied.is_permanent());
        assert!(SpeechError::Unsupported.is_permanent());
        assert!(!SpeechError::AlreadyRunning.is_permanent());
        assert!(!SpeechError::NotRunning.is_permanent());
    }
}
