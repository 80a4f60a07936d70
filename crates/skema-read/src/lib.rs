//! skema-read - The S-expression reader.
//!
//! Turns a byte stream into heap-allocated object graphs in two stages:
//!
//! 1. [`cursor::ByteCursor`] wraps any [`std::io::Read`] with
//!    single-byte reads and one-byte pushback.
//! 2. [`reader::Reader`] tokenizes with one token of lookahead and
//!    parses by recursive descent, allocating pairs and atoms as it
//!    goes. Every intermediate reference is registered with the heap's
//!    root registry across the recursive calls that may allocate.
//!
//! End of input is not an error in the usual sense: it is the
//! distinguished [`ReadError::Eof`] outcome, which the driver maps to
//! a clean session exit. Malformed input that the session can survive
//! (a stray `)`, a broken dotted pair) is reported through the
//! diagnostic handler and yields a null result.

pub mod cursor;
pub mod error;
pub mod reader;

pub use cursor::ByteCursor;
pub use error::ReadError;
pub use reader::{Reader, TOKEN_MAX};
