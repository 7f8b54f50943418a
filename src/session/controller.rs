//! Session phase state machine.
//!
//! Orchestrates countdown, capture start, transcript forwarding, recognition
//! restarts, operator controls, and the single review handoff. All transition
//! methods are synchronous and invoked by one event dispatcher at a time, so
//! the advance decision is logically atomic without locking.
//!
//! Teardown discipline: every exit path (normal completion, early finish,
//! cancellation, setup failure, drop) stops the recognizer first, then the
//! capture device, releasing the microphone deterministically.

use crate::align::{AlignmentEngine, AlignmentEvent, AlignmentStatus};
use crate::defaults;
use crate::error::{ErrorReporter, LogReporter, PrompterError, Result};
use crate::script::{Script, ScriptChunk};
use crate::session::providers::{CaptureEvent, CaptureProvider, RecognitionProvider, RecognizerEvent};
use crate::session::review::ReviewSink;
use crate::transcript::TranscriptEvent;
use std::sync::Arc;

/// Session phases, in order. `Capturing` subsumes paused/advancing; that
/// split lives in the alignment engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Providers not yet initialized.
    Setup,
    /// Counting down; capture and recognition not yet started.
    Countdown(u8),
    /// Recording and aligning.
    Capturing,
    /// Terminal: torn down, artifact handed off (unless cancelled).
    Completed,
}

/// Drives one prompter session over external providers.
pub struct SessionController {
    engine: AlignmentEngine,
    recognizer: Box<dyn RecognitionProvider>,
    capture: Box<dyn CaptureProvider>,
    review: Box<dyn ReviewSink>,
    reporter: Arc<dyn ErrorReporter>,
    phase: SessionPhase,
    countdown_secs: u8,
    restart_failures: u32,
    max_restart_failures: u32,
    artifact_delivered: bool,
    cancelled: bool,
}

impl SessionController {
    pub fn new(
        script: Script,
        recognizer: Box<dyn RecognitionProvider>,
        capture: Box<dyn CaptureProvider>,
        review: Box<dyn ReviewSink>,
    ) -> Self {
        Self {
            engine: AlignmentEngine::new(script),
            recognizer,
            capture,
            review,
            reporter: Arc::new(LogReporter),
            phase: SessionPhase::Setup,
            countdown_secs: defaults::COUNTDOWN_SECS,
            restart_failures: 0,
            max_restart_failures: defaults::MAX_RESTART_FAILURES,
            artifact_delivered: false,
            cancelled: false,
        }
    }

    /// Sets a custom error reporter.
    pub fn with_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Overrides the countdown length (0 starts capture immediately).
    pub fn with_countdown_secs(mut self, secs: u8) -> Self {
        self.countdown_secs = secs;
        self
    }

    /// Overrides the tail phrase length used for automatic advance.
    pub fn with_tail_words(mut self, tail_words: usize) -> Self {
        self.engine.set_tail_words(tail_words);
        self
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Seconds left on the countdown, if counting down.
    pub fn countdown_remaining(&self) -> Option<u8> {
        match self.phase {
            SessionPhase::Countdown(n) => Some(n),
            _ => None,
        }
    }

    pub fn alignment_status(&self) -> AlignmentStatus {
        self.engine.status()
    }

    pub fn is_paused(&self) -> bool {
        self.engine.is_paused()
    }

    /// Current position in the script (-1 pre-start, len when finished).
    pub fn current_index(&self) -> i64 {
        self.engine.current_index()
    }

    pub fn script(&self) -> &Script {
        self.engine.script()
    }

    pub fn current_chunk(&self) -> Option<&ScriptChunk> {
        self.engine.current_chunk()
    }

    /// The chunk after the current one, for preview rendering.
    pub fn next_chunk(&self) -> Option<&ScriptChunk> {
        let next = self.engine.current_index() + 1;
        usize::try_from(next).ok().and_then(|i| self.script().get(i))
    }

    /// The chunk before the current one, for faded context rendering.
    pub fn previous_chunk(&self) -> Option<&ScriptChunk> {
        let prev = self.engine.current_index() - 1;
        usize::try_from(prev).ok().and_then(|i| self.script().get(i))
    }

    /// Initializes the capture device and enters the countdown.
    ///
    /// A capture failure (permission denied, device missing) aborts the
    /// session before any state exists: no capture, no recognition, no
    /// review handoff.
    pub fn begin(&mut self) -> Result<()> {
        if self.phase != SessionPhase::Setup {
            return Ok(());
        }
        if let Err(e) = self.capture.init() {
            self.cancelled = true;
            self.phase = SessionPhase::Completed;
            return Err(e);
        }
        if self.countdown_secs == 0 {
            self.start_capturing()
        } else {
            self.phase = SessionPhase::Countdown(self.countdown_secs);
            Ok(())
        }
    }

    /// One countdown tick (1-second cadence). Reaching zero starts capture,
    /// recognition, and the alignment engine.
    pub fn tick(&mut self) -> Result<()> {
        let SessionPhase::Countdown(remaining) = self.phase else {
            return Ok(());
        };
        let remaining = remaining.saturating_sub(1);
        if remaining == 0 {
            self.start_capturing()
        } else {
            self.phase = SessionPhase::Countdown(remaining);
            Ok(())
        }
    }

    fn start_capturing(&mut self) -> Result<()> {
        if let Err(e) = self.capture.start() {
            self.teardown();
            return Err(e);
        }
        // A recognizer that cannot start is not fatal: the prompter still
        // works with manual advance as the escape hatch.
        match self.recognizer.start() {
            Ok(()) | Err(PrompterError::RecognitionAlreadyActive) => {}
            Err(e) => self.reporter.report("recognizer", &e),
        }
        self.engine.start();
        self.phase = SessionPhase::Capturing;
        Ok(())
    }

    /// Forwards one recognizer event into the alignment engine.
    ///
    /// Final hypotheses are fed individually; interim hypotheses within one
    /// event are fed as a growing concatenation, matching how recognizers
    /// refine a window of alternatives. An `Ended` notification mid-capture
    /// triggers exactly one restart attempt, with an "already active"
    /// rejection treated as a benign no-op.
    pub fn handle_recognizer_event(&mut self, event: RecognizerEvent) -> Result<()> {
        match event {
            RecognizerEvent::Result { results, .. } => {
                if self.phase != SessionPhase::Capturing {
                    return Ok(());
                }
                let mut interim = String::new();
                for alternative in results {
                    let transcript = if alternative.is_final {
                        TranscriptEvent::now(alternative.transcript, true)
                    } else {
                        interim.push_str(&alternative.transcript);
                        TranscriptEvent::now(interim.clone(), false)
                    };
                    if self.engine.on_transcript(&transcript) == Some(AlignmentEvent::Finished) {
                        self.complete();
                        break;
                    }
                }
                Ok(())
            }
            RecognizerEvent::Ended => self.handle_recognizer_ended(),
            RecognizerEvent::Error { message } => {
                self.reporter
                    .report("recognizer", &PrompterError::RecognitionTransient { message });
                Ok(())
            }
        }
    }

    fn handle_recognizer_ended(&mut self) -> Result<()> {
        if self.phase != SessionPhase::Capturing || self.engine.is_paused() {
            return Ok(());
        }
        match self.recognizer.start() {
            Ok(()) | Err(PrompterError::RecognitionAlreadyActive) => {
                self.restart_failures = 0;
                Ok(())
            }
            Err(e) => {
                self.restart_failures += 1;
                self.reporter.report("recognizer", &e);
                if self.restart_failures >= self.max_restart_failures {
                    let fatal = PrompterError::RecognitionTransient {
                        message: format!(
                            "recognition restart failed {} times in a row",
                            self.restart_failures
                        ),
                    };
                    self.teardown();
                    Err(fatal)
                } else {
                    Ok(())
                }
            }
        }
    }

    /// Handles one capture event. The `Stopped` artifact is handed to the
    /// review sink exactly once; suppressed after cancellation.
    pub fn handle_capture_event(&mut self, event: CaptureEvent) -> Result<()> {
        match event {
            CaptureEvent::Data(_) => Ok(()),
            CaptureEvent::Stopped(artifact) => {
                if self.artifact_delivered || self.cancelled {
                    return Ok(());
                }
                self.artifact_delivered = true;
                self.review.deliver(artifact)
            }
        }
    }

    /// Operator: suspend alignment and recording.
    pub fn pause(&mut self) {
        if self.phase != SessionPhase::Capturing || self.engine.is_paused() {
            return;
        }
        self.engine.pause();
        self.capture.pause();
        self.recognizer.stop();
    }

    /// Operator: resume alignment and recording.
    pub fn resume(&mut self) {
        if self.phase != SessionPhase::Capturing || !self.engine.is_paused() {
            return;
        }
        self.engine.resume();
        self.capture.resume();
        match self.recognizer.start() {
            Ok(()) | Err(PrompterError::RecognitionAlreadyActive) => {}
            Err(e) => self.reporter.report("recognizer", &e),
        }
    }

    /// Operator: advance one chunk manually (override when automatic
    /// detection does not trigger).
    pub fn advance(&mut self) {
        if self.phase != SessionPhase::Capturing {
            return;
        }
        if self.engine.advance_manually() == Some(AlignmentEvent::Finished) {
            self.complete();
        }
    }

    /// Operator: stop early and complete the session.
    pub fn finish(&mut self) {
        if self.phase == SessionPhase::Completed {
            return;
        }
        self.engine.finish();
        self.complete();
    }

    /// Operator: tear down without a review handoff.
    pub fn cancel(&mut self) {
        if self.phase == SessionPhase::Completed {
            return;
        }
        self.cancelled = true;
        self.engine.finish();
        self.teardown();
    }

    fn complete(&mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        // Recognizer first, then capture: stopping capture emits the final
        // artifact event, which must not race a still-live recognizer.
        self.recognizer.stop();
        self.capture.stop();
        self.phase = SessionPhase::Completed;
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        if self.phase != SessionPhase::Completed {
            self.recognizer.stop();
            self.capture.stop();
        }
    }
}
