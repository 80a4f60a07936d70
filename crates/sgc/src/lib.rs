//! # SGC - Skema Garbage-Collected Heap
//!
//! SGC is the object heap of the Skema interpreter: a two-space copying
//! collector over fixed-size cells, in the style of Cheney's algorithm.
//!
//! ## Overview
//!
//! Every Skema value is a [`Cell`] living in the heap, named by a
//! [`CellRef`]. Allocation bumps a pointer through the active
//! semispace; when the semispace is full, collection evacuates every
//! live cell into the other semispace and the roles swap. Because
//! collection *moves* cells, every `CellRef` held outside the heap is
//! invalidated by it, and the mutator must route any reference it needs
//! to survive an allocation through the heap's root registry.
//!
//! ## Quick start
//!
//! ```rust
//! use sgc::{Cell, CellRef, Heap, HeapConfig};
//! use skema_util::Symbol;
//!
//! fn main() -> Result<(), sgc::HeapError> {
//!     let mut heap = Heap::new(HeapConfig::default())?;
//!
//!     // Build the list (a) and keep it alive across a collection.
//!     let atom = heap.alloc(Cell::Atom(Symbol::intern("a")))?;
//!     let list = heap.alloc(Cell::Pair(atom, CellRef::NIL))?;
//!     let mark = heap.mark();
//!     let slot = heap.protect(list);
//!
//!     heap.collect_now();
//!
//!     // The registry slot now names the relocated list.
//!     let list = heap.root(slot);
//!     assert!(matches!(heap.get(list), Cell::Pair(_, _)));
//!     heap.release(mark);
//!     Ok(())
//! }
//! ```
//!
//! ## The rooting contract
//!
//! Collection can be triggered by any call to [`Heap::alloc`]. A caller
//! holding cell references in locals across an allocation point must:
//!
//! 1. record the registry depth with [`Heap::mark`],
//! 2. move each local into a registry slot with [`Heap::protect`],
//! 3. read and write those locals only through [`Heap::root`] and
//!    [`Heap::set_root`] after any allocation, and
//! 4. restore the registry with [`Heap::release`] on every exit path.
//!
//! The collector rewrites every registered slot to the relocated
//! address of its referent, so a slot is always valid to read. A bare
//! `CellRef` read before an allocation is stale after it.
//!
//! One narrow exception keeps leaf call sites simple: the fields of the
//! cell currently being passed to `alloc` are treated as roots by the
//! collection that the allocation itself triggers. `alloc(Cell::Pair(a,
//! b))` is therefore safe without protecting `a` and `b` first.
//!
//! ## Modules
//!
//! - [`cell`]: the cell model and references
//! - [`heap`]: allocation and the copying collector
//! - [`roots`]: the root registry
//! - [`config`]: capacity configuration
//! - [`stats`]: collection statistics
//! - [`error`]: error types

pub mod cell;
pub mod config;
pub mod error;
pub mod heap;
pub mod roots;
pub mod stats;

pub use cell::{Cell, CellRef, PrimId};
pub use config::HeapConfig;
pub use error::HeapError;
pub use heap::Heap;
pub use roots::{FrameMark, Slot};
pub use stats::GcStats;
