//! Review handoff for the finished recording.
//!
//! The session controller owns the artifact until the session completes,
//! then hands it to exactly one of these sinks. Pairs with the capture
//! provider the way a text sink pairs with an audio source.

use crate::error::Result;
use crate::session::providers::RecordingArtifact;
use crossbeam_channel::Sender;
use std::path::PathBuf;

/// Pluggable receiver for the finished recording artifact.
pub trait ReviewSink: Send {
    /// Take ownership of the artifact. Called at most once per session.
    fn deliver(&mut self, artifact: RecordingArtifact) -> Result<()>;

    /// Name for logging/debugging.
    fn name(&self) -> &'static str {
        "review"
    }
}

/// Writes the artifact bytes to a file.
pub struct FileReviewSink {
    path: PathBuf,
    quiet: bool,
}

impl FileReviewSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            quiet: false,
        }
    }

    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }
}

impl ReviewSink for FileReviewSink {
    fn deliver(&mut self, artifact: RecordingArtifact) -> Result<()> {
        let size = artifact.len();
        std::fs::write(&self.path, artifact.into_bytes())?;
        if !self.quiet {
            eprintln!("Recording saved: {} ({} bytes)", self.path.display(), size);
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "file"
    }
}

/// Forwards the artifact over a channel (tests, embedding callers).
pub struct ChannelReviewSink {
    tx: Sender<RecordingArtifact>,
}

impl ChannelReviewSink {
    pub fn new(tx: Sender<RecordingArtifact>) -> Self {
        Self { tx }
    }
}

impl ReviewSink for ChannelReviewSink {
    fn deliver(&mut self, artifact: RecordingArtifact) -> Result<()> {
        // Receiver gone means nobody wants the recording; not an error.
        let _: std::result::Result<_, _> = self.tx.send(artifact);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "channel"
    }
}

/// Discards the artifact (rehearsal without saving).
#[derive(Debug, Default)]
pub struct DiscardReviewSink;

impl ReviewSink for DiscardReviewSink {
    fn deliver(&mut self, _artifact: RecordingArtifact) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "discard"
    }
}
