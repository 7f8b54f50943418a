//! Transcript normalization and recognizer hypothesis events.
//!
//! Recognizer output is noisy: casing, punctuation, and spacing vary between
//! interim hypotheses. Everything the alignment engine compares goes through
//! [`normalize`] first, on both the script side and the transcript side.

use std::time::Instant;

/// Canonicalize a raw hypothesis string for matching.
///
/// Lowercases, strips every character that is not alphanumeric, underscore,
/// or whitespace, collapses whitespace runs to single spaces, and trims.
/// Total and idempotent: `normalize(normalize(x)) == normalize(x)`.
pub fn normalize(raw: &str) -> String {
    let stripped: String = raw
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect();
    stripped
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// A single recognizer hypothesis, interim or final.
#[derive(Debug, Clone)]
pub struct TranscriptEvent {
    /// The hypothesis text exactly as the recognizer produced it.
    pub raw_text: String,
    /// Whether the recognizer considers this hypothesis final.
    pub is_final: bool,
    /// When the hypothesis was received.
    pub timestamp: Instant,
}

impl TranscriptEvent {
    /// Creates an event stamped with the current time.
    pub fn now(raw_text: impl Into<String>, is_final: bool) -> Self {
        Self {
            raw_text: raw_text.into(),
            is_final,
            timestamp: Instant::now(),
        }
    }
}
