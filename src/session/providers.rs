//! External capability provider contracts.
//!
//! Capture (microphone + recorder) and speech recognition are external
//! collaborators. These traits specify only what the session needs from
//! them: a start/stop lifecycle plus a stream of discrete events delivered
//! over a channel the session's dispatcher drains. Mock implementations
//! live here too, shared by tests and the CLI rehearsal mode.

use crate::error::{PrompterError, Result};
use crossbeam_channel::Sender;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// One recognition alternative within a result event.
#[derive(Debug, Clone)]
pub struct RecognitionAlternative {
    pub transcript: String,
    pub is_final: bool,
}

/// Events emitted by a recognition provider.
#[derive(Debug, Clone)]
pub enum RecognizerEvent {
    /// A batch of hypotheses. `result_index` is the position of the first
    /// entry within the recognizer's session-wide result list.
    Result {
        result_index: usize,
        results: Vec<RecognitionAlternative>,
    },
    /// The recognizer stopped. May arrive at any time while logically
    /// active; the session restarts it if capture is still in progress.
    Ended,
    /// A provider-level error. Informational; an `Ended` event follows if
    /// the stream actually died.
    Error { message: String },
}

/// Events emitted by a capture provider.
#[derive(Debug)]
pub enum CaptureEvent {
    /// An incremental slice of encoded recording data.
    Data(Vec<u8>),
    /// Capture has stopped and the assembled artifact is final.
    Stopped(RecordingArtifact),
}

/// The assembled recording. Opaque to the core: bytes are never inspected,
/// only handed to the review collaborator at session end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingArtifact {
    data: Vec<u8>,
    mime_type: String,
}

impl RecordingArtifact {
    pub fn new(data: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            data,
            mime_type: mime_type.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

/// Contract for the external speech recognition engine.
///
/// Implementations deliver [`RecognizerEvent`]s on a channel supplied at
/// construction. `start` while already active must be rejected with
/// `RecognitionAlreadyActive`; the session treats that rejection as benign.
pub trait RecognitionProvider: Send {
    /// Begin (or restart) recognition.
    fn start(&mut self) -> Result<()>;

    /// Stop recognition. Idempotent.
    fn stop(&mut self);

    /// Whether recognition is currently active.
    fn is_active(&self) -> bool;
}

/// Contract for the external capture device (microphone + recorder).
///
/// Implementations deliver [`CaptureEvent`]s on a channel supplied at
/// construction; `stop` must eventually produce a `Stopped` event carrying
/// the assembled artifact.
pub trait CaptureProvider: Send {
    /// Acquire the device. Fails with `CapabilityUnavailable` when the
    /// microphone cannot be granted; the session never proceeds without it.
    fn init(&mut self) -> Result<()>;

    /// Begin recording.
    fn start(&mut self) -> Result<()>;

    /// Suspend recording without discarding captured data.
    fn pause(&mut self);

    /// Resume a paused recording.
    fn resume(&mut self);

    /// Stop recording and release the device. Idempotent.
    fn stop(&mut self);
}

/// Scripted recognizer for tests and the CLI rehearsal mode.
///
/// Tracks start/stop calls; events are pushed by the test or the stdin
/// reader through the shared channel, gated on the active flag.
pub struct MockRecognizer {
    active: Arc<AtomicBool>,
    start_count: Arc<AtomicU32>,
    fail_restarts: bool,
}

impl MockRecognizer {
    pub fn new() -> Self {
        Self {
            active: Arc::new(AtomicBool::new(false)),
            start_count: Arc::new(AtomicU32::new(0)),
            fail_restarts: false,
        }
    }

    /// Configure every `start` call to fail with a transient error.
    pub fn with_failing_starts(mut self) -> Self {
        self.fail_restarts = true;
        self
    }

    /// Shared handle to the active flag (for event gating).
    pub fn active_flag(&self) -> Arc<AtomicBool> {
        self.active.clone()
    }

    /// Shared handle to the start-call counter.
    pub fn start_counter(&self) -> Arc<AtomicU32> {
        self.start_count.clone()
    }
}

impl Default for MockRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl RecognitionProvider for MockRecognizer {
    fn start(&mut self) -> Result<()> {
        self.start_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_restarts {
            return Err(PrompterError::RecognitionTransient {
                message: "mock start failure".to_string(),
            });
        }
        if self.active.swap(true, Ordering::SeqCst) {
            return Err(PrompterError::RecognitionAlreadyActive);
        }
        Ok(())
    }

    fn stop(&mut self) {
        self.active.store(false, Ordering::SeqCst);
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

/// In-memory capture provider for tests and the CLI rehearsal mode.
///
/// Buffers whatever `Data` it is fed and emits the assembled artifact on a
/// channel when stopped.
pub struct MemoryCapture {
    event_tx: Sender<CaptureEvent>,
    buffer: Vec<u8>,
    mime_type: String,
    recording: Arc<AtomicBool>,
    paused: Arc<AtomicBool>,
    stopped: bool,
    fail_init: Option<String>,
}

impl MemoryCapture {
    pub fn new(event_tx: Sender<CaptureEvent>) -> Self {
        Self {
            event_tx,
            buffer: Vec::new(),
            mime_type: "audio/webm".to_string(),
            recording: Arc::new(AtomicBool::new(false)),
            paused: Arc::new(AtomicBool::new(false)),
            stopped: false,
            fail_init: None,
        }
    }

    /// Configure `init` to fail, simulating a denied microphone.
    pub fn with_init_failure(mut self, message: &str) -> Self {
        self.fail_init = Some(message.to_string());
        self
    }

    /// Append encoded data to the in-progress recording.
    pub fn feed(&mut self, data: &[u8]) {
        if self.is_recording() && !self.is_paused() {
            self.buffer.extend_from_slice(data);
        }
    }

    /// Shared handle to the recording flag (for observing a boxed provider).
    pub fn recording_flag(&self) -> Arc<AtomicBool> {
        self.recording.clone()
    }

    /// Shared handle to the paused flag.
    pub fn paused_flag(&self) -> Arc<AtomicBool> {
        self.paused.clone()
    }

    pub fn is_recording(&self) -> bool {
        self.recording.load(Ordering::SeqCst) && !self.stopped
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }
}

impl CaptureProvider for MemoryCapture {
    fn init(&mut self) -> Result<()> {
        if let Some(message) = &self.fail_init {
            return Err(PrompterError::CapabilityUnavailable {
                capability: "Microphone".to_string(),
                message: message.clone(),
            });
        }
        Ok(())
    }

    fn start(&mut self) -> Result<()> {
        self.recording.store(true, Ordering::SeqCst);
        self.paused.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn pause(&mut self) {
        if self.recording.load(Ordering::SeqCst) {
            self.paused.store(true, Ordering::SeqCst);
        }
    }

    fn resume(&mut self) {
        if self.recording.load(Ordering::SeqCst) {
            self.paused.store(false, Ordering::SeqCst);
        }
    }

    fn stop(&mut self) {
        if self.stopped || !self.recording.load(Ordering::SeqCst) {
            return;
        }
        self.stopped = true;
        self.recording.store(false, Ordering::SeqCst);
        let artifact =
            RecordingArtifact::new(std::mem::take(&mut self.buffer), self.mime_type.clone());
        // Receiver gone means the session is already torn down.
        let _: std::result::Result<_, _> = self.event_tx.send(CaptureEvent::Stopped(artifact));
    }
}
