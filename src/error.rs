//! Error types for flowprompt.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PrompterError {
    // Script input errors
    #[error("Invalid script text: {message}")]
    InvalidInput { message: String },

    // Capability errors (microphone, recognition)
    #[error("{capability} unavailable: {message}")]
    CapabilityUnavailable { capability: String, message: String },

    // Remote analyzer errors
    #[error("Script analysis failed: {message}")]
    Analyzer { message: String },

    // Recognition lifecycle errors
    #[error("Recognition is already active")]
    RecognitionAlreadyActive,

    #[error("Recognition error: {message}")]
    RecognitionTransient { message: String },

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

impl PrompterError {
    /// True for errors the session can recover from without operator action.
    ///
    /// A benign "already active" rejection or a transient recognizer drop is
    /// handled in place; everything else propagates to the caller.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PrompterError::RecognitionAlreadyActive | PrompterError::RecognitionTransient { .. }
        )
    }
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, PrompterError>;

/// Trait for reporting recoverable errors from session components.
pub trait ErrorReporter: Send + Sync {
    /// Reports an error from a named component.
    fn report(&self, source: &str, error: &PrompterError);
}

/// Simple error reporter that logs to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl ErrorReporter for LogReporter {
    fn report(&self, source: &str, error: &PrompterError) {
        eprintln!("[{}] {}", source, error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_invalid_input_display() {
        let error = PrompterError::InvalidInput {
            message: "script must be at least 5 characters".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid script text: script must be at least 5 characters"
        );
    }

    #[test]
    fn test_capability_unavailable_display() {
        let error = PrompterError::CapabilityUnavailable {
            capability: "Microphone".to_string(),
            message: "permission denied".to_string(),
        };
        assert_eq!(error.to_string(), "Microphone unavailable: permission denied");
    }

    #[test]
    fn test_analyzer_display() {
        let error = PrompterError::Analyzer {
            message: "missing API key".to_string(),
        };
        assert_eq!(error.to_string(), "Script analysis failed: missing API key");
    }

    #[test]
    fn test_recognition_already_active_display() {
        let error = PrompterError::RecognitionAlreadyActive;
        assert_eq!(error.to_string(), "Recognition is already active");
    }

    #[test]
    fn test_recognition_transient_display() {
        let error = PrompterError::RecognitionTransient {
            message: "stream ended".to_string(),
        };
        assert_eq!(error.to_string(), "Recognition error: stream ended");
    }

    #[test]
    fn test_transient_classification() {
        assert!(PrompterError::RecognitionAlreadyActive.is_transient());
        assert!(
            PrompterError::RecognitionTransient {
                message: "dropped".to_string()
            }
            .is_transient()
        );
        assert!(
            !PrompterError::InvalidInput {
                message: "too short".to_string()
            }
            .is_transient()
        );
        assert!(
            !PrompterError::CapabilityUnavailable {
                capability: "Microphone".to_string(),
                message: "denied".to_string()
            }
            .is_transient()
        );
    }

    #[test]
    fn test_from_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let error: PrompterError = io_error.into();
        assert!(error.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_toml_error() {
        let toml_error = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let error: PrompterError = toml_error.into();
        assert!(error.to_string().contains("Configuration error"));
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_result() -> Result<i32> {
            Ok(42)
        }
        assert_eq!(returns_result().unwrap(), 42);
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<PrompterError>();
        assert_sync::<PrompterError>();
    }

    #[test]
    fn test_log_reporter_does_not_panic() {
        let reporter = LogReporter;
        let error = PrompterError::RecognitionTransient {
            message: "test error".to_string(),
        };
        reporter.report("recognizer", &error);
    }
}
