//! Error types for heap operations.

use thiserror::Error;

/// Errors surfaced by the heap.
///
/// Out of memory is reported only after a collection failed to free a
/// cell, so it is terminal for the session.
#[derive(Debug, Error)]
pub enum HeapError {
    #[error("out of memory: semispace of {capacity} cells is full of live data")]
    OutOfMemory { capacity: usize },

    #[error("invalid heap configuration: {0}")]
    Config(String),
}
