//! Deterministic script chunking.
//!
//! Splits raw free-form text into prompter-sized phrases with per-phrase
//! duration estimates. This is the canonical local algorithm and the fallback
//! for the remote analyzer; both produce the same [`Script`] shape.

use crate::defaults;
use crate::error::{PrompterError, Result};
use crate::script::types::{Script, ScriptChunk};

/// Configuration for the chunking algorithm.
#[derive(Debug, Clone)]
pub struct ChunkerConfig {
    /// Minimum script length in characters (after trimming).
    pub min_chars: usize,
    /// Maximum words per emitted chunk.
    pub max_words_per_chunk: usize,
    /// Assumed reading pace for duration estimates.
    pub words_per_second: f64,
    /// Legibility floor for a chunk's duration estimate.
    pub min_chunk_duration_ms: u64,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            min_chars: defaults::MIN_SCRIPT_CHARS,
            max_words_per_chunk: defaults::MAX_WORDS_PER_CHUNK,
            words_per_second: defaults::WORDS_PER_SECOND,
            min_chunk_duration_ms: defaults::MIN_CHUNK_DURATION_MS,
        }
    }
}

/// Splits raw text into an ordered sequence of prompter chunks.
#[derive(Debug, Clone, Default)]
pub struct Chunker {
    config: ChunkerConfig,
}

impl Chunker {
    /// Creates a chunker with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a chunker with custom configuration.
    pub fn with_config(config: ChunkerConfig) -> Self {
        Self { config }
    }

    /// Chunks `raw` into a script.
    ///
    /// Whitespace runs are collapsed, the text is split into sentence-like
    /// units on terminal punctuation, and units longer than the word
    /// threshold are greedily grouped into sub-chunks of exactly that size
    /// (the final group may be shorter). Word order and single-space joining
    /// are preserved, so joining all chunk texts with single spaces
    /// reconstructs the whitespace-normalized input.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if the trimmed text is shorter than the configured
    /// minimum, or if no chunk survives (punctuation-only input).
    pub fn chunk(&self, raw: &str) -> Result<Script> {
        let collapsed = collapse_whitespace(raw);
        if collapsed.chars().count() < self.config.min_chars {
            return Err(PrompterError::InvalidInput {
                message: format!(
                    "script must be at least {} characters, got {}",
                    self.config.min_chars,
                    collapsed.chars().count()
                ),
            });
        }

        let mut chunks = Vec::new();
        for unit in split_sentence_units(&collapsed) {
            // Units with no word characters (stray punctuation) contribute nothing.
            if !unit.chars().any(is_word_char) {
                continue;
            }
            let words: Vec<&str> = unit.split(' ').collect();
            for group in words.chunks(self.config.max_words_per_chunk) {
                chunks.push(ScriptChunk {
                    text: group.join(" "),
                    estimated_duration_ms: self.estimate_duration(group.len()),
                });
            }
        }

        Script::from_chunks(chunks)
    }

    /// Duration estimate for a chunk of `word_count` words:
    /// `max(floor, word_count / words_per_second * 1000)`.
    fn estimate_duration(&self, word_count: usize) -> u64 {
        let estimate = (word_count as f64 / self.config.words_per_second * 1000.0).round() as u64;
        estimate.max(self.config.min_chunk_duration_ms)
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Collapse whitespace runs to single spaces and trim.
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split collapsed text into sentence-like units.
///
/// A unit ends at a run of terminal punctuation (`.`, `!`, `?`), optionally
/// followed by closing quotes. A trailing fragment without terminal
/// punctuation becomes its own unit. Empty units are dropped.
fn split_sentence_units(text: &str) -> Vec<String> {
    let mut units = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        if matches!(c, '.' | '!' | '?') {
            // Absorb the rest of the punctuation run ("...", "?!").
            while let Some(&next) = chars.peek() {
                if matches!(next, '.' | '!' | '?') {
                    current.push(next);
                    chars.next();
                } else {
                    break;
                }
            }
            // Absorb closing quotes so they stay with their sentence.
            while let Some(&next) = chars.peek() {
                if matches!(next, '"' | '\'' | '”' | '’') {
                    current.push(next);
                    chars.next();
                } else {
                    break;
                }
            }
            let unit = current.trim();
            if !unit.is_empty() {
                units.push(unit.to_string());
            }
            current.clear();
        }
    }

    let rest = current.trim();
    if !rest.is_empty() {
        units.push(rest.to_string());
    }
    units
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(text: &str) -> Script {
        Chunker::new().chunk(text).unwrap()
    }

    #[test]
    fn test_short_input_is_rejected() {
        let result = Chunker::new().chunk("hi");
        assert!(matches!(result, Err(PrompterError::InvalidInput { .. })));
    }

    #[test]
    fn test_whitespace_only_input_is_rejected() {
        let result = Chunker::new().chunk("   \n\t  ");
        assert!(matches!(result, Err(PrompterError::InvalidInput { .. })));
    }

    #[test]
    fn test_punctuation_only_input_produces_no_chunks() {
        let result = Chunker::new().chunk("!!! ... ???");
        assert!(matches!(result, Err(PrompterError::InvalidInput { .. })));
    }

    #[test]
    fn test_single_short_sentence_is_one_chunk() {
        let script = chunk("Hello world.");
        assert_eq!(script.len(), 1);
        assert_eq!(script.get(0).unwrap().text, "Hello world.");
    }

    #[test]
    fn test_long_sentence_splits_at_word_threshold() {
        // 18 words: one group of 12, one of 6.
        let text = "one two three four five six seven eight nine ten \
                    eleven twelve thirteen fourteen fifteen sixteen seventeen eighteen";
        let script = chunk(text);
        assert_eq!(script.len(), 2);
        assert_eq!(script.get(0).unwrap().word_count(), 12);
        assert_eq!(script.get(1).unwrap().word_count(), 6);
        assert!(script.get(0).unwrap().text.starts_with("one two"));
        assert!(script.get(1).unwrap().text.ends_with("eighteen"));
    }

    #[test]
    fn test_exactly_threshold_words_stays_one_chunk() {
        let text = "w1 w2 w3 w4 w5 w6 w7 w8 w9 w10 w11 w12";
        let script = chunk(text);
        assert_eq!(script.len(), 1);
        assert_eq!(script.get(0).unwrap().word_count(), 12);
    }

    #[test]
    fn test_spec_scenario_two_sentences() {
        let text = "Hello world. This is a test of the teleprompter system \
                    that should be split because it is quite long indeed.";
        let script = chunk(text);
        assert!(script.len() >= 2);
        assert_eq!(script.get(0).unwrap().text, "Hello world.");
        let last = script.get(script.len() - 1).unwrap();
        assert!(last.text.contains("indeed."));
    }

    #[test]
    fn test_every_chunk_is_non_empty_and_within_limit() {
        let text = "First sentence here! Second one follows? A third, much longer sentence \
                    with many more words than the limit allows in a single prompter chunk \
                    so it must be divided. Trailing fragment without punctuation";
        let script = chunk(text);
        for c in &script {
            assert!(!c.text.trim().is_empty());
            assert!(c.word_count() <= 12);
        }
    }

    #[test]
    fn test_round_trip_reconstructs_normalized_input() {
        let text = "  Hello   world.  This is a test of the teleprompter system that \
                    should be split because it is quite long indeed.\n\nAnd more. ";
        let script = chunk(text);
        let joined: Vec<String> = script.iter().map(|c| c.text.clone()).collect();
        assert_eq!(joined.join(" "), collapse_whitespace(text));
    }

    #[test]
    fn test_trailing_fragment_becomes_own_unit() {
        let script = chunk("A full sentence. and a trailing fragment");
        assert_eq!(script.len(), 2);
        assert_eq!(script.get(1).unwrap().text, "and a trailing fragment");
    }

    #[test]
    fn test_closing_quote_stays_with_sentence() {
        let script = chunk("He said \"Stop.\" Then he left.");
        assert_eq!(script.len(), 2);
        assert_eq!(script.get(0).unwrap().text, "He said \"Stop.\"");
        assert_eq!(script.get(1).unwrap().text, "Then he left.");
    }

    #[test]
    fn test_ellipsis_is_one_boundary() {
        let script = chunk("Wait for it... here it comes.");
        assert_eq!(script.len(), 2);
        assert_eq!(script.get(0).unwrap().text, "Wait for it...");
    }

    #[test]
    fn test_duration_has_floor() {
        let script = chunk("Okay then.");
        assert_eq!(script.get(0).unwrap().estimated_duration_ms, 1500);
    }

    #[test]
    fn test_duration_matches_pace_above_floor() {
        // 12 words at 2.5 words/s = 4800ms.
        let text = "w1 w2 w3 w4 w5 w6 w7 w8 w9 w10 w11 w12";
        let script = chunk(text);
        assert_eq!(script.get(0).unwrap().estimated_duration_ms, 4800);
    }

    #[test]
    fn test_duration_monotonic_in_word_count() {
        let chunker = Chunker::new();
        let mut previous = 0;
        for wc in 1..=12 {
            let d = chunker.estimate_duration(wc);
            assert!(d >= 1500);
            assert!(d >= previous, "duration decreased at {} words", wc);
            previous = d;
        }
    }

    #[test]
    fn test_custom_max_words() {
        let chunker = Chunker::with_config(ChunkerConfig {
            max_words_per_chunk: 3,
            ..ChunkerConfig::default()
        });
        let script = chunker.chunk("one two three four five six seven").unwrap();
        assert_eq!(script.len(), 3);
        assert_eq!(script.get(0).unwrap().text, "one two three");
        assert_eq!(script.get(2).unwrap().text, "seven");
    }

    #[test]
    fn test_split_sentence_units_drops_empty_units() {
        let units = split_sentence_units("One. . Two.");
        assert_eq!(units, vec!["One.", ".", "Two."]);
        // The bare "." unit carries no word characters and is dropped later.
        let script = chunk("One thing. . Two things.");
        assert_eq!(script.len(), 2);
    }

    #[test]
    fn test_mixed_punctuation_boundaries() {
        let script = chunk("Really?! Yes. Absolutely!");
        assert_eq!(script.len(), 3);
        assert_eq!(script.get(0).unwrap().text, "Really?!");
    }
}
