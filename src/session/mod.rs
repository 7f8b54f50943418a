//! Session orchestration: countdown, capture, recognition, review handoff.

pub mod controller;
pub mod providers;
pub mod review;

pub use controller::{SessionController, SessionPhase};
pub use providers::{
    CaptureEvent, CaptureProvider, MemoryCapture, MockRecognizer, RecognitionAlternative,
    RecognitionProvider, RecognizerEvent, RecordingArtifact,
};
pub use review::{ChannelReviewSink, DiscardReviewSink, FileReviewSink, ReviewSink};
