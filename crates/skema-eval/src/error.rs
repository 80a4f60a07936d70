//! Error types for evaluation.

use sgc::HeapError;
use skema_read::ReadError;
use thiserror::Error;

/// Errors surfaced by the evaluator and the primitives.
///
/// These are all session-ending conditions. Recoverable Lisp-level
/// problems (unbound symbols, wrong argument types, unmatched `cond`)
/// are not errors at all; they evaluate to null and execution goes on.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error(transparent)]
    Heap(#[from] HeapError),

    #[error(transparent)]
    Read(#[from] ReadError),

    #[error("i/o error writing output: {0}")]
    Io(#[from] std::io::Error),
}
