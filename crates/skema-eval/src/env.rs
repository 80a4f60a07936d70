//! Environments: frame lists searched innermost-first.
//!
//! An environment is an ordinary pair. Its first field is the innermost
//! frame, a list of `(key . value)` pairs with the newest binding at
//! the head; its rest field is the enclosing environment. Binding
//! prepends to the frame by mutating the environment's first field, so
//! every holder of the environment sees the new binding. Rebinding a
//! key shadows instead of replacing, and lookup takes the newest match.

use sgc::{Cell, CellRef, Heap, HeapError};

use crate::value::structural_equal;

/// Look `needle` up, walking environments outward and each frame from
/// its newest binding. Null when unbound.
pub fn lookup(heap: &Heap, needle: CellRef, env: CellRef) -> CellRef {
    let mut scope = env;
    while !scope.is_nil() {
        let entry = find_pair(heap, needle, heap.first(scope));
        if !entry.is_nil() {
            return heap.rest(entry);
        }
        scope = heap.rest(scope);
    }
    CellRef::NIL
}

/// Find the `(key . value)` entry for `needle` in one frame.
fn find_pair(heap: &Heap, needle: CellRef, frame: CellRef) -> CellRef {
    let mut cursor = frame;
    while !cursor.is_nil() {
        let entry = heap.first(cursor);
        if !entry.is_nil() && structural_equal(heap, needle, heap.first(entry)) {
            return entry;
        }
        cursor = heap.rest(cursor);
    }
    CellRef::NIL
}

/// Prepend `key -> value` to the innermost frame of `env`.
pub fn bind(
    heap: &mut Heap,
    env: CellRef,
    key: CellRef,
    value: CellRef,
) -> Result<(), HeapError> {
    let mark = heap.mark();
    let out = bind_protected(heap, env, key, value);
    heap.release(mark);
    out
}

fn bind_protected(
    heap: &mut Heap,
    env: CellRef,
    key: CellRef,
    value: CellRef,
) -> Result<(), HeapError> {
    let env_slot = heap.protect(env);
    // The allocation itself keeps key and value alive.
    let entry = heap.alloc(Cell::Pair(key, value))?;
    let env = heap.root(env_slot);
    let frame = heap.first(env);
    let frame = heap.alloc(Cell::Pair(entry, frame))?;
    let env = heap.root(env_slot);
    heap.set_first(env, frame);
    Ok(())
}
