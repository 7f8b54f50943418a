//! flowprompt - voice-following teleprompter
//!
//! Chunks a script into prompter-sized phrases and advances the display as
//! live transcription confirms each phrase was spoken.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod align;
pub mod analyzer;
pub mod app;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod defaults;
pub mod error;
pub mod output;
pub mod script;
pub mod session;
pub mod transcript;

// Core pipeline (text → chunks → alignment)
pub use align::{AlignmentEngine, AlignmentEvent, AlignmentStatus};
pub use script::{Chunker, ChunkerConfig, Script, ScriptChunk};
pub use transcript::{TranscriptEvent, normalize};

// Session orchestration and provider seams
pub use session::{
    CaptureProvider, RecognitionProvider, ReviewSink, SessionController, SessionPhase,
};

// Analysis
pub use analyzer::{Analysis, ScriptAnalyzer};

// Error handling
pub use error::{PrompterError, Result};

// Config
pub use config::Config;

/// Build version string with optional git commit hash.
///
/// Returns `MAJOR.MINOR.PATCH+HASH` when built inside a git checkout,
/// plain `MAJOR.MINOR.PATCH` otherwise.
pub fn version_string() -> String {
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", env!("CARGO_PKG_VERSION"), hash),
        _ => env!("CARGO_PKG_VERSION").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_string_starts_with_cargo_version() {
        let ver = version_string();
        assert!(
            ver.starts_with(env!("CARGO_PKG_VERSION")),
            "version_string should start with CARGO_PKG_VERSION, got: {}",
            ver
        );
    }

    #[test]
    fn version_string_contains_plus_when_git_hash_present() {
        let ver = version_string();
        if option_env!("GIT_HASH").is_some_and(|h| !h.is_empty()) {
            assert!(
                ver.contains('+'),
                "With GIT_HASH set, version should contain '+', got: {}",
                ver
            );
        }
    }
}
