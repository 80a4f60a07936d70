//! Root registry - the collector's window into mutator locals.
//!
//! The collector cannot see cell references held in host-language
//! locals, so any reference that must survive a collection is moved
//! into a registry slot first. The registry is a stack: a caller
//! records its depth with [`RootSet::mark`], pushes slots with
//! [`RootSet::protect`], and truncates back with [`RootSet::release`]
//! on every exit path. During a collection every slot is rewritten to
//! the relocated address of its referent.
//!
//! Capacity is fixed at construction. Exceeding it means the mutator
//! has broken the balanced mark/release discipline (for example by
//! leaking slots inside a loop), which is a bug, not a recoverable
//! condition; the registry panics rather than growing without bound.

use crate::cell::CellRef;

/// Handle to one registered slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Slot(pub(crate) usize);

/// A recorded registry depth, restored by `release`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameMark(pub(crate) usize);

/// The slot stack.
pub struct RootSet {
    slots: Vec<CellRef>,
    capacity: usize,
}

impl RootSet {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Record the current depth.
    #[inline]
    pub fn mark(&self) -> FrameMark {
        FrameMark(self.slots.len())
    }

    /// Push a slot holding `value`.
    ///
    /// # Panics
    ///
    /// Panics if the registry is full. See the module docs.
    #[inline]
    pub fn protect(&mut self, value: CellRef) -> Slot {
        if self.slots.len() == self.capacity {
            panic!(
                "root registry overflow: {} slots in use, mark/release discipline broken",
                self.capacity
            );
        }
        self.slots.push(value);
        Slot(self.slots.len() - 1)
    }

    /// Truncate the registry back to `mark`, dropping every slot pushed
    /// since. Handles for dropped slots must not be used again.
    #[inline]
    pub fn release(&mut self, mark: FrameMark) {
        debug_assert!(mark.0 <= self.slots.len());
        self.slots.truncate(mark.0);
    }

    /// Read a slot.
    #[inline]
    pub fn get(&self, slot: Slot) -> CellRef {
        self.slots[slot.0]
    }

    /// Overwrite a slot.
    #[inline]
    pub fn set(&mut self, slot: Slot, value: CellRef) {
        self.slots[slot.0] = value;
    }

    /// Number of live slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protect_and_get() {
        let mut roots = RootSet::new(8);
        let slot = roots.protect(CellRef::from_index(3));
        assert_eq!(roots.get(slot), CellRef::from_index(3));
        assert_eq!(roots.len(), 1);
    }

    #[test]
    fn test_set_overwrites() {
        let mut roots = RootSet::new(8);
        let slot = roots.protect(CellRef::NIL);
        roots.set(slot, CellRef::from_index(9));
        assert_eq!(roots.get(slot), CellRef::from_index(9));
    }

    #[test]
    fn test_mark_release_balance() {
        let mut roots = RootSet::new(8);
        let outer = roots.protect(CellRef::from_index(1));
        let mark = roots.mark();
        roots.protect(CellRef::from_index(2));
        roots.protect(CellRef::from_index(3));
        assert_eq!(roots.len(), 3);
        roots.release(mark);
        assert_eq!(roots.len(), 1);
        assert_eq!(roots.get(outer), CellRef::from_index(1));
    }

    #[test]
    fn test_release_is_idempotent_at_mark() {
        let mut roots = RootSet::new(8);
        let mark = roots.mark();
        roots.protect(CellRef::NIL);
        roots.release(mark);
        roots.release(mark);
        assert!(roots.is_empty());
    }

    #[test]
    #[should_panic(expected = "root registry overflow")]
    fn test_overflow_panics() {
        let mut roots = RootSet::new(2);
        roots.protect(CellRef::NIL);
        roots.protect(CellRef::NIL);
        roots.protect(CellRef::NIL);
    }
}
