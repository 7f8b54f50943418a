//! Live transcript-to-script alignment.

pub mod engine;

pub use engine::{AlignmentEngine, AlignmentEvent, AlignmentStatus};
