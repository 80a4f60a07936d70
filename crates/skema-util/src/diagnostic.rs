//! Diagnostic handler for recoverable errors.
//!
//! The reader can hit malformed input that should not end the session:
//! it reports through a [`Handler`], yields a null result, and the
//! session continues. The driver drains collected diagnostics and
//! decides how to show them. Fatal conditions never come through here;
//! those are typed errors on the `Result` path.

use std::cell::RefCell;
use std::fmt;

/// Diagnostic severity level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    /// The input was malformed and the result replaced with null.
    Error,
    /// The input was odd but fully handled.
    Warning,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Error => f.write_str("error"),
            Level::Warning => f.write_str("warning"),
        }
    }
}

/// A single reported diagnostic.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub level: Level,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.level, self.message)
    }
}

/// Collects diagnostics during a read.
///
/// Interior mutability keeps reporting callable from shared-borrow
/// contexts; the interpreter is single threaded.
#[derive(Default)]
pub struct Handler {
    diagnostics: RefCell<Vec<Diagnostic>>,
}

impl Handler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report a recoverable error.
    pub fn error(&self, message: impl Into<String>) {
        self.diagnostics.borrow_mut().push(Diagnostic {
            level: Level::Error,
            message: message.into(),
        });
    }

    /// Report a warning.
    pub fn warning(&self, message: impl Into<String>) {
        self.diagnostics.borrow_mut().push(Diagnostic {
            level: Level::Warning,
            message: message.into(),
        });
    }

    /// True if any error-level diagnostic has been reported and not
    /// yet drained.
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .borrow()
            .iter()
            .any(|d| d.level == Level::Error)
    }

    /// Number of pending diagnostics of any level.
    pub fn len(&self) -> usize {
        self.diagnostics.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.borrow().is_empty()
    }

    /// Take all pending diagnostics, leaving the handler empty.
    pub fn drain(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.diagnostics.borrow_mut())
    }
}
