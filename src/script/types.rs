//! Data types for chunked scripts.

use crate::defaults;
use crate::error::{PrompterError, Result};
use serde::{Deserialize, Serialize};

/// A single prompter-sized phrase with a reading-time estimate.
///
/// Immutable once produced; text is non-empty and trimmed, duration is
/// strictly positive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptChunk {
    /// The phrase text as displayed on the prompter.
    pub text: String,
    /// Estimated reading duration in milliseconds.
    pub estimated_duration_ms: u64,
}

impl ScriptChunk {
    /// Creates a chunk, validating the invariants.
    pub fn new(text: impl Into<String>, estimated_duration_ms: u64) -> Result<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(PrompterError::InvalidInput {
                message: "chunk text must not be empty".to_string(),
            });
        }
        if estimated_duration_ms == 0 {
            return Err(PrompterError::InvalidInput {
                message: "chunk duration must be positive".to_string(),
            });
        }
        Ok(Self {
            text,
            estimated_duration_ms,
        })
    }

    /// Number of words in the chunk text.
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// An ordered, immutable sequence of script chunks (length >= 1).
///
/// The order is fixed for the lifetime of a session; the alignment engine
/// only ever moves forward through it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    chunks: Vec<ScriptChunk>,
}

impl Script {
    /// Creates a script from chunks, rejecting an empty sequence.
    pub fn from_chunks(chunks: Vec<ScriptChunk>) -> Result<Self> {
        if chunks.is_empty() {
            return Err(PrompterError::InvalidInput {
                message: "script must contain at least one chunk".to_string(),
            });
        }
        Ok(Self { chunks })
    }

    /// Number of chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Always false: the constructor rejects empty scripts.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Chunk at `index`, or None past the end.
    pub fn get(&self, index: usize) -> Option<&ScriptChunk> {
        self.chunks.get(index)
    }

    /// Iterator over chunks in display order.
    pub fn iter(&self) -> std::slice::Iter<'_, ScriptChunk> {
        self.chunks.iter()
    }

    /// Sum of per-chunk duration estimates in milliseconds.
    ///
    /// Used only as a default target duration, never enforced.
    pub fn total_duration_ms(&self) -> u64 {
        self.chunks.iter().map(|c| c.estimated_duration_ms).sum()
    }

    /// Short preview of the script: the first few chunks' text, with an
    /// ellipsis marker when more follow. Informational only.
    pub fn summary(&self) -> String {
        let preview: Vec<&str> = self
            .chunks
            .iter()
            .take(defaults::SUMMARY_CHUNKS)
            .map(|c| c.text.as_str())
            .collect();
        let mut summary = preview.join(" ");
        if self.chunks.len() > defaults::SUMMARY_CHUNKS {
            summary.push('…');
        }
        summary
    }

    /// Returns a copy with durations rescaled so the total estimate matches
    /// `target_ms`, keeping the legibility floor per chunk.
    ///
    /// Because of the floor, very aggressive targets may not be reachable;
    /// the result is then the floor-clamped best effort.
    pub fn scaled_to_target(&self, target_ms: u64) -> Self {
        let total = self.total_duration_ms();
        if total == 0 || target_ms == 0 {
            return self.clone();
        }
        let factor = target_ms as f64 / total as f64;
        let chunks = self
            .chunks
            .iter()
            .map(|c| ScriptChunk {
                text: c.text.clone(),
                estimated_duration_ms: ((c.estimated_duration_ms as f64 * factor).round() as u64)
                    .max(defaults::MIN_CHUNK_DURATION_MS),
            })
            .collect();
        Self { chunks }
    }
}

impl<'a> IntoIterator for &'a Script {
    type Item = &'a ScriptChunk;
    type IntoIter = std::slice::Iter<'a, ScriptChunk>;

    fn into_iter(self) -> Self::IntoIter {
        self.chunks.iter()
    }
}
