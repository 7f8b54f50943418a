//! Default configuration constants for flowprompt.
//!
//! This module provides shared constants used across different configuration types
//! to ensure consistency and eliminate duplication.

/// Minimum number of characters (after trimming) a script must contain.
///
/// Anything shorter produces no usable chunk sequence and is rejected as
/// invalid input before any session is set up.
pub const MIN_SCRIPT_CHARS: usize = 5;

/// Maximum number of words in a single prompter chunk.
///
/// 12 words is the upper bound for text that stays readable on a single
/// prompter screen at speech pace. Longer sentence units are greedily split
/// into groups of exactly this size.
pub const MAX_WORDS_PER_CHUNK: usize = 12;

/// Assumed reading pace in words per second.
///
/// 2.5 words/s (~150 words/minute) is a moderate, clear speaking pace and
/// drives the per-chunk duration estimate.
pub const WORDS_PER_SECOND: f64 = 2.5;

/// Floor for a chunk's estimated duration in milliseconds.
///
/// Even a single-word chunk must stay on screen long enough to be legible.
pub const MIN_CHUNK_DURATION_MS: u64 = 1500;

/// Number of trailing words of the current chunk used as the advance trigger.
///
/// Matching on the *tail* of the current chunk (rather than the head of the
/// next) tolerates the recognizer lagging behind the speaker and avoids
/// advancing on words that merely resemble the next chunk's opening.
pub const TAIL_PHRASE_WORDS: usize = 3;

/// Countdown length in seconds before capture starts.
pub const COUNTDOWN_SECS: u8 = 3;

/// Number of leading chunks concatenated into the script summary.
pub const SUMMARY_CHUNKS: usize = 3;

/// Consecutive failed recognition restarts before the session gives up.
///
/// The recognizer is expected to stop periodically on its own; a single
/// failed restart is transient. Repeated failures mean recognition is gone
/// for good and the operator has to be told.
pub const MAX_RESTART_FAILURES: u32 = 3;

/// Default model name for the remote script analyzer.
pub const ANALYZER_MODEL: &str = "gemini-2.5-flash";

/// Bounded capacity for provider event channels.
///
/// Recognizer hypotheses arrive at human speech pace; a small buffer is
/// plenty and keeps backpressure visible if a consumer stalls.
pub const EVENT_BUFFER: usize = 64;
