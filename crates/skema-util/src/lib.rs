//! skema-util - Foundation types for the Skema interpreter.
//!
//! This crate holds the two process-wide services every other Skema
//! crate leans on:
//!
//! - [`symbol`]: the string interner. Every piece of atom text in a
//!   running interpreter is interned exactly once; a [`Symbol`] is a
//!   compact copyable handle, and symbol equality is index equality.
//! - [`diagnostic`]: a small handler for recoverable reader errors.
//!   Fatal conditions travel as typed errors instead; the handler only
//!   carries the messages a session can continue past.

pub mod diagnostic;
pub mod symbol;

pub use diagnostic::{Diagnostic, Handler, Level};
pub use symbol::Symbol;
