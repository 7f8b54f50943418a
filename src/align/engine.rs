//! The alignment state machine.
//!
//! Consumes normalized transcript updates against a fixed script and decides
//! when the prompter advances. The engine is total: no operation can fail,
//! invalid calls are no-ops, and the position index never moves backward.
//!
//! Advance policy: the trigger is the trailing words of the *current* chunk
//! appearing in the hypothesis, not the leading words of the next chunk.
//! The trailing-words policy tolerates the recognizer lagging slightly behind
//! the speaker and does not fire on hypotheses that merely resemble the next
//! chunk's opening. Known trade-off, pinned by tests rather than "fixed":
//! very short chunks, or tail words that recur early in the following phrase,
//! can trigger a spurious advance.

use crate::defaults;
use crate::script::Script;
use crate::transcript::{self, TranscriptEvent};

/// Externally visible engine status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignmentStatus {
    /// Pre-start (countdown); transcript events are ignored.
    AwaitingStart,
    /// A chunk is displayed and transcript events are being matched.
    Advancing,
    /// Suspended: position is held and transcript events are ignored.
    Paused,
    /// Terminal: the script has been completed or stopped early.
    Finished,
}

/// Emitted by transition methods; at most one event per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignmentEvent {
    /// The displayed chunk moved forward by one.
    Advanced { from: usize, to: usize },
    /// The session is complete. Emitted exactly once per engine.
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    AwaitingStart,
    At(usize),
    Finished,
}

/// Alignment engine over one script for one session.
#[derive(Debug)]
pub struct AlignmentEngine {
    script: Script,
    position: Position,
    paused: bool,
    tail_words: usize,
}

impl AlignmentEngine {
    /// Creates an engine in the pre-start state.
    pub fn new(script: Script) -> Self {
        Self {
            script,
            position: Position::AwaitingStart,
            paused: false,
            tail_words: defaults::TAIL_PHRASE_WORDS,
        }
    }

    /// Overrides the tail phrase length (default 3 words).
    pub fn with_tail_words(mut self, tail_words: usize) -> Self {
        self.set_tail_words(tail_words);
        self
    }

    /// Setter form of [`with_tail_words`](Self::with_tail_words).
    pub fn set_tail_words(&mut self, tail_words: usize) {
        self.tail_words = tail_words.max(1);
    }

    /// The script this engine aligns against.
    pub fn script(&self) -> &Script {
        &self.script
    }

    /// Current position: -1 before start, `len` when finished.
    ///
    /// Monotonically non-decreasing for the lifetime of the engine.
    pub fn current_index(&self) -> i64 {
        match self.position {
            Position::AwaitingStart => -1,
            Position::At(i) => i as i64,
            Position::Finished => self.script.len() as i64,
        }
    }

    /// The chunk currently displayed, if any.
    pub fn current_chunk(&self) -> Option<&crate::script::ScriptChunk> {
        match self.position {
            Position::At(i) => self.script.get(i),
            _ => None,
        }
    }

    pub fn status(&self) -> AlignmentStatus {
        match self.position {
            Position::AwaitingStart => AlignmentStatus::AwaitingStart,
            Position::Finished => AlignmentStatus::Finished,
            Position::At(_) if self.paused => AlignmentStatus::Paused,
            Position::At(_) => AlignmentStatus::Advancing,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Begins accepting transcript events at chunk 0.
    ///
    /// No-op unless the engine is in the pre-start state.
    pub fn start(&mut self) {
        if self.position == Position::AwaitingStart {
            self.position = Position::At(0);
        }
    }

    /// Processes one recognizer hypothesis.
    ///
    /// Ignored unless advancing and not paused. Advances at most one step per
    /// call: even a hypothesis that matches several chunks ahead moves the
    /// display by one, keeping it causally consistent with what was just
    /// confirmed spoken.
    pub fn on_transcript(&mut self, event: &TranscriptEvent) -> Option<AlignmentEvent> {
        if self.paused {
            return None;
        }
        let Position::At(index) = self.position else {
            return None;
        };
        let chunk = self.script.get(index)?;

        let tail = tail_phrase(&chunk.text, self.tail_words);
        if tail.is_empty() {
            return None;
        }
        let hypothesis = transcript::normalize(&event.raw_text);
        if hypothesis.contains(&tail) {
            self.advance_one()
        } else {
            None
        }
    }

    /// Operator override: advance one step regardless of transcript state.
    ///
    /// Subject to the same terminal check as automatic advance; a no-op
    /// before start and after finish.
    pub fn advance_manually(&mut self) -> Option<AlignmentEvent> {
        match self.position {
            Position::At(_) => self.advance_one(),
            _ => None,
        }
    }

    /// Suspends transcript processing; the position is preserved.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resumes transcript processing.
    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Forces the terminal state (operator-initiated early stop).
    ///
    /// Returns the finish event the first time, None afterwards.
    pub fn finish(&mut self) -> Option<AlignmentEvent> {
        if self.position == Position::Finished {
            return None;
        }
        self.position = Position::Finished;
        Some(AlignmentEvent::Finished)
    }

    fn advance_one(&mut self) -> Option<AlignmentEvent> {
        let Position::At(index) = self.position else {
            return None;
        };
        let next = index + 1;
        if next >= self.script.len() {
            self.position = Position::Finished;
            Some(AlignmentEvent::Finished)
        } else {
            self.position = Position::At(next);
            Some(AlignmentEvent::Advanced {
                from: index,
                to: next,
            })
        }
    }
}

/// The last `max_words` normalized words of `text`, joined by single spaces.
///
/// Shorter chunks yield their full normalized text.
fn tail_phrase(text: &str, max_words: usize) -> String {
    let normalized = transcript::normalize(text);
    let words: Vec<&str> = normalized.split(' ').filter(|w| !w.is_empty()).collect();
    let k = max_words.min(words.len());
    words[words.len() - k..].join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::{Chunker, Script, ScriptChunk};

    fn script(texts: &[&str]) -> Script {
        Script::from_chunks(
            texts
                .iter()
                .map(|t| ScriptChunk::new(*t, 1500).unwrap())
                .collect(),
        )
        .unwrap()
    }

    fn final_event(text: &str) -> TranscriptEvent {
        TranscriptEvent::now(text, true)
    }

    #[test]
    fn test_tail_phrase_of_long_chunk() {
        assert_eq!(tail_phrase("we will win this", 3), "will win this");
    }

    #[test]
    fn test_tail_phrase_of_short_chunk_is_whole_chunk() {
        assert_eq!(tail_phrase("together", 3), "together");
        assert_eq!(tail_phrase("as one", 3), "as one");
    }

    #[test]
    fn test_tail_phrase_normalizes() {
        assert_eq!(tail_phrase("Win, THIS!", 3), "win this");
    }

    #[test]
    fn test_starts_at_minus_one() {
        let engine = AlignmentEngine::new(script(&["a b c", "d e f"]));
        assert_eq!(engine.current_index(), -1);
        assert_eq!(engine.status(), AlignmentStatus::AwaitingStart);
        assert!(engine.current_chunk().is_none());
    }

    #[test]
    fn test_start_moves_to_first_chunk() {
        let mut engine = AlignmentEngine::new(script(&["a b c", "d e f"]));
        engine.start();
        assert_eq!(engine.current_index(), 0);
        assert_eq!(engine.status(), AlignmentStatus::Advancing);
        assert_eq!(engine.current_chunk().unwrap().text, "a b c");
    }

    #[test]
    fn test_start_is_noop_when_already_started() {
        let mut engine = AlignmentEngine::new(script(&["a b c", "d e f"]));
        engine.start();
        engine.advance_manually();
        engine.start();
        assert_eq!(engine.current_index(), 1);
    }

    #[test]
    fn test_transcript_before_start_is_ignored() {
        let mut engine = AlignmentEngine::new(script(&["we will win this"]));
        let result = engine.on_transcript(&final_event("we will win this"));
        assert!(result.is_none());
        assert_eq!(engine.current_index(), -1);
    }

    #[test]
    fn test_spec_scenario_single_advance() {
        // Spec scenario: tail of chunk 0 appears in the hypothesis;
        // exactly one advance, 0 -> 1, not beyond.
        let mut engine = AlignmentEngine::new(script(&["we will win this", "together as one"]));
        engine.start();
        let event = engine.on_transcript(&final_event("we will win this together"));
        assert_eq!(event, Some(AlignmentEvent::Advanced { from: 0, to: 1 }));
        assert_eq!(engine.current_index(), 1);
    }

    #[test]
    fn test_no_advance_without_tail_match() {
        let mut engine = AlignmentEngine::new(script(&["we will win this", "together as one"]));
        engine.start();
        assert!(engine.on_transcript(&final_event("we will")).is_none());
        assert!(engine.on_transcript(&final_event("something else")).is_none());
        assert_eq!(engine.current_index(), 0);
    }

    #[test]
    fn test_next_chunk_opening_does_not_trigger() {
        // The hypothesis resembles the NEXT chunk's opening; trailing-words
        // policy must not fire.
        let mut engine = AlignmentEngine::new(script(&["we will win this", "together as one"]));
        engine.start();
        assert!(engine.on_transcript(&final_event("together as")).is_none());
        assert_eq!(engine.current_index(), 0);
    }

    #[test]
    fn test_match_is_case_and_punctuation_insensitive() {
        let mut engine = AlignmentEngine::new(script(&["We will win this!", "together as one"]));
        engine.start();
        let event = engine.on_transcript(&final_event("...WILL, win THIS"));
        assert_eq!(event, Some(AlignmentEvent::Advanced { from: 0, to: 1 }));
    }

    #[test]
    fn test_at_most_one_advance_per_event() {
        // Hypothesis covers both chunks' tails; only one step happens.
        let mut engine =
            AlignmentEngine::new(script(&["we will win this", "together as one", "final words"]));
        engine.start();
        let event = engine.on_transcript(&final_event("we will win this together as one"));
        assert_eq!(event, Some(AlignmentEvent::Advanced { from: 0, to: 1 }));
        assert_eq!(engine.current_index(), 1);
    }

    #[test]
    fn test_advance_from_last_chunk_finishes() {
        let mut engine = AlignmentEngine::new(script(&["we will win this", "together as one"]));
        engine.start();
        engine.on_transcript(&final_event("we will win this"));
        let event = engine.on_transcript(&final_event("together as one"));
        assert_eq!(event, Some(AlignmentEvent::Finished));
        assert_eq!(engine.status(), AlignmentStatus::Finished);
        assert_eq!(engine.current_index(), 2);
    }

    #[test]
    fn test_transcript_after_finished_is_ignored() {
        let mut engine = AlignmentEngine::new(script(&["only chunk here"]));
        engine.start();
        assert_eq!(
            engine.on_transcript(&final_event("only chunk here")),
            Some(AlignmentEvent::Finished)
        );
        assert!(engine.on_transcript(&final_event("only chunk here")).is_none());
        assert_eq!(engine.current_index(), 1);
    }

    #[test]
    fn test_paused_transcript_is_noop() {
        let mut engine = AlignmentEngine::new(script(&["we will win this", "together as one"]));
        engine.start();
        engine.pause();
        assert_eq!(engine.status(), AlignmentStatus::Paused);
        assert!(engine.on_transcript(&final_event("we will win this")).is_none());
        assert_eq!(engine.current_index(), 0);

        engine.resume();
        assert_eq!(engine.status(), AlignmentStatus::Advancing);
        assert!(engine.on_transcript(&final_event("we will win this")).is_some());
    }

    #[test]
    fn test_manual_advance_steps_forward() {
        let mut engine = AlignmentEngine::new(script(&["a b c", "d e f", "g h i"]));
        engine.start();
        assert_eq!(
            engine.advance_manually(),
            Some(AlignmentEvent::Advanced { from: 0, to: 1 })
        );
        assert_eq!(
            engine.advance_manually(),
            Some(AlignmentEvent::Advanced { from: 1, to: 2 })
        );
        assert_eq!(engine.advance_manually(), Some(AlignmentEvent::Finished));
    }

    #[test]
    fn test_manual_advance_from_finished_is_noop() {
        let mut engine = AlignmentEngine::new(script(&["a b c"]));
        engine.start();
        assert_eq!(engine.advance_manually(), Some(AlignmentEvent::Finished));
        assert!(engine.advance_manually().is_none());
        assert!(engine.advance_manually().is_none());
        assert_eq!(engine.current_index(), 1);
    }

    #[test]
    fn test_manual_advance_before_start_is_noop() {
        let mut engine = AlignmentEngine::new(script(&["a b c"]));
        assert!(engine.advance_manually().is_none());
        assert_eq!(engine.current_index(), -1);
    }

    #[test]
    fn test_manual_advance_works_while_paused() {
        // Pause suspends transcript processing only; the operator override
        // still moves the display.
        let mut engine = AlignmentEngine::new(script(&["a b c", "d e f"]));
        engine.start();
        engine.pause();
        assert_eq!(
            engine.advance_manually(),
            Some(AlignmentEvent::Advanced { from: 0, to: 1 })
        );
    }

    #[test]
    fn test_finish_is_idempotent() {
        let mut engine = AlignmentEngine::new(script(&["a b c", "d e f"]));
        engine.start();
        assert_eq!(engine.finish(), Some(AlignmentEvent::Finished));
        assert!(engine.finish().is_none());
        assert_eq!(engine.current_index(), 2);
    }

    #[test]
    fn test_finish_before_start_terminates() {
        let mut engine = AlignmentEngine::new(script(&["a b c"]));
        assert_eq!(engine.finish(), Some(AlignmentEvent::Finished));
        assert_eq!(engine.status(), AlignmentStatus::Finished);
    }

    #[test]
    fn test_index_is_monotonic_over_mixed_operations() {
        let mut engine =
            AlignmentEngine::new(script(&["we will win this", "together as one", "the end"]));
        let mut last = engine.current_index();
        let mut check = |engine: &AlignmentEngine, last: &mut i64| {
            let idx = engine.current_index();
            assert!(idx >= *last, "index went backward: {} -> {}", last, idx);
            *last = idx;
        };

        engine.start();
        check(&engine, &mut last);
        engine.on_transcript(&final_event("nothing relevant"));
        check(&engine, &mut last);
        engine.on_transcript(&final_event("we will win this"));
        check(&engine, &mut last);
        engine.pause();
        engine.on_transcript(&final_event("together as one"));
        check(&engine, &mut last);
        engine.resume();
        engine.advance_manually();
        check(&engine, &mut last);
        engine.finish();
        check(&engine, &mut last);
        engine.advance_manually();
        check(&engine, &mut last);
    }

    #[test]
    fn test_known_failure_mode_short_chunk_spurious_advance() {
        // Accepted trade-off: a chunk whose tail words recur in surrounding
        // speech can advance early. "so" is chunk 0's full tail; any
        // hypothesis containing "so" fires, even mid-word noise like "also".
        let mut engine = AlignmentEngine::new(script(&["so", "it begins now"]));
        engine.start();
        let event = engine.on_transcript(&final_event("also"));
        assert_eq!(event, Some(AlignmentEvent::Advanced { from: 0, to: 1 }));
    }

    #[test]
    fn test_works_with_chunker_output() {
        let script = Chunker::new()
            .chunk("We will win this. Together as one.")
            .unwrap();
        let mut engine = AlignmentEngine::new(script);
        engine.start();
        assert!(
            engine
                .on_transcript(&final_event("we will win this together"))
                .is_some()
        );
        assert_eq!(engine.current_index(), 1);
    }
}
