//! Error types for the reader.

use sgc::HeapError;
use thiserror::Error;

use crate::reader::TOKEN_MAX;

/// Errors surfaced while reading.
///
/// `Eof` is the normal end of a session, not a failure; the driver
/// exits cleanly on it. Everything else ends the session with a
/// diagnostic. Recoverable syntax problems never reach this type, they
/// go through the diagnostic handler instead.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("end of input")]
    Eof,

    #[error("token exceeds {TOKEN_MAX} bytes")]
    TokenOverflow,

    #[error("i/o error reading input: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Heap(#[from] HeapError),
}

impl ReadError {
    /// True for the clean end-of-input outcome.
    pub fn is_eof(&self) -> bool {
        matches!(self, ReadError::Eof)
    }
}
