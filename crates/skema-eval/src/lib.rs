//! skema-eval - The Skema evaluator and primitive library.
//!
//! A [`Machine`] bundles everything one interpreter session owns: the
//! garbage-collected heap, the reader over the session input, the
//! output sink, the diagnostic handler, and the table of built-in
//! callables. [`eval`] interprets an expression against an environment
//! held in that machine.
//!
//! The evaluator is a trampoline: tail positions (the chosen `cond`
//! branch, the last form of `begin` and of a lambda body) replace the
//! current expression and environment and restart dispatch in place,
//! so tail-recursive Skema programs run in constant host stack.
//! Subexpressions (operands, tests, `define` values) evaluate through
//! ordinary recursion.
//!
//! Scope is dynamic: applying a lambda builds the call frame on top of
//! the environment at the call site, not the environment where the
//! lambda was created.

pub mod builtins;
pub mod env;
pub mod error;
pub mod eval;
pub mod machine;
pub mod printer;
pub mod value;

pub use error::EvalError;
pub use eval::eval;
pub use machine::{Machine, PrimFn};
