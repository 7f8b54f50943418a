//! Script model: chunked text with per-chunk duration estimates.
//!
//! A script is produced either by the local [`chunker::Chunker`] or by the
//! remote analyzer; both yield the same shape and are substitutable.

pub mod chunker;
pub mod types;

pub use chunker::{Chunker, ChunkerConfig};
pub use types::{Script, ScriptChunk};
