//! Two-space heap and copying collector.
//!
//! Storage is two equal semispaces. Allocation bumps through the active
//! one; when it is full, [`Heap::collect`] runs Cheney's algorithm:
//! swap the spaces, evacuate every cell reachable from the root
//! registry into the fresh space, then scan the fresh space with a
//! cursor, evacuating the fields of every copied pair until the cursor
//! catches up with the allocation point. An evacuated cell in the old
//! space is overwritten with [`Cell::Forward`] naming its new address,
//! so shared structure and cycles copy exactly once.

use log::debug;

use crate::cell::{Cell, CellRef};
use crate::config::HeapConfig;
use crate::error::HeapError;
use crate::roots::{FrameMark, RootSet, Slot};
use crate::stats::GcStats;

/// Filler for cells that have never been allocated.
const UNALLOCATED: Cell = Cell::Pair(CellRef::NIL, CellRef::NIL);

/// The object heap.
pub struct Heap {
    /// Active semispace; cells below `next` are live or garbage.
    space: Vec<Cell>,
    /// Idle semispace; becomes active on the next collection.
    spare: Vec<Cell>,
    /// Bump pointer into `space`.
    next: usize,
    /// Cells per semispace.
    capacity: usize,
    /// Registered mutator locals, rewritten on every collection.
    roots: RootSet,
    stats: GcStats,
}

impl Heap {
    /// Create a heap from a validated configuration.
    pub fn new(config: HeapConfig) -> Result<Self, HeapError> {
        config.validate()?;
        Ok(Self {
            space: vec![UNALLOCATED; config.heap_cells],
            spare: vec![UNALLOCATED; config.heap_cells],
            next: 0,
            capacity: config.heap_cells,
            roots: RootSet::new(config.root_slots),
            stats: GcStats::default(),
        })
    }

    // ------------------------------------------------------------------
    // Allocation and collection
    // ------------------------------------------------------------------

    /// Allocate one cell, collecting first if the semispace is full.
    ///
    /// The fields of `cell` itself are treated as roots by any
    /// collection this call triggers, so the caller does not need to
    /// protect them. Every *other* reference the caller still holds
    /// must already be in a registry slot.
    pub fn alloc(&mut self, cell: Cell) -> Result<CellRef, HeapError> {
        debug_assert!(!matches!(cell, Cell::Forward(_)));
        let mut cell = cell;
        if self.next == self.capacity {
            self.collect(&mut cell);
        }
        if self.next == self.capacity {
            return Err(HeapError::OutOfMemory {
                capacity: self.capacity,
            });
        }
        let reference = CellRef::from_index(self.next);
        self.space[self.next] = cell;
        self.next += 1;
        Ok(reference)
    }

    /// Run a collection immediately.
    ///
    /// Useful for tests and for shaking out rooting bugs early; the
    /// interpreter itself only collects on demand from `alloc`.
    pub fn collect_now(&mut self) {
        let mut none = UNALLOCATED;
        self.collect(&mut none);
    }

    /// Cheney collection. `pending` is the cell about to be allocated;
    /// its fields are evacuated along with the registry.
    fn collect(&mut self, pending: &mut Cell) {
        let before = self.next;
        std::mem::swap(&mut self.space, &mut self.spare);
        self.next = 0;

        // Evacuate the roots: every registry slot, plus the fields of
        // the pending cell.
        for i in 0..self.roots.len() {
            let slot = Slot(i);
            let mut value = self.roots.get(slot);
            self.evacuate(&mut value);
            self.roots.set(slot, value);
        }
        if let Cell::Pair(first, rest) | Cell::Lambda(first, rest) = pending {
            self.evacuate(first);
            self.evacuate(rest);
        }

        // Scan the fresh space. Everything the copied cells point at is
        // evacuated in turn until the cursor reaches the bump pointer.
        let mut scan = 0;
        while scan < self.next {
            let cell = self.space[scan];
            match cell {
                Cell::Pair(mut first, mut rest) => {
                    self.evacuate(&mut first);
                    self.evacuate(&mut rest);
                    self.space[scan] = Cell::Pair(first, rest);
                }
                Cell::Lambda(mut first, mut rest) => {
                    self.evacuate(&mut first);
                    self.evacuate(&mut rest);
                    self.space[scan] = Cell::Lambda(first, rest);
                }
                Cell::Atom(_) | Cell::Primitive(_) => {}
                Cell::Forward(_) => unreachable!("forwarding marker copied into new space"),
            }
            scan += 1;
        }

        self.stats.collections += 1;
        self.stats.live_after_last = self.next;
        self.stats.high_water = self.stats.high_water.max(before);
        debug!(
            "gc: collection #{} kept {} of {} cells",
            self.stats.collections, self.next, before
        );
    }

    /// Copy one reference's target into the fresh space if it has not
    /// been copied yet, and rewrite the reference either way.
    fn evacuate(&mut self, reference: &mut CellRef) {
        if reference.is_nil() {
            return;
        }
        let old = reference.index();
        let cell = self.spare[old];
        if let Cell::Forward(new) = cell {
            *reference = new;
        } else {
            let new = CellRef::from_index(self.next);
            self.space[self.next] = cell;
            self.next += 1;
            self.spare[old] = Cell::Forward(new);
            self.stats.cells_evacuated += 1;
            *reference = new;
        }
    }

    // ------------------------------------------------------------------
    // Cell access
    // ------------------------------------------------------------------

    /// Read a cell. The reference must not be null.
    #[inline]
    pub fn get(&self, reference: CellRef) -> Cell {
        self.space[reference.index()]
    }

    /// First field of a pair or lambda; null for anything else,
    /// including null itself.
    #[inline]
    pub fn first(&self, reference: CellRef) -> CellRef {
        if reference.is_nil() {
            return CellRef::NIL;
        }
        match self.get(reference) {
            Cell::Pair(first, _) | Cell::Lambda(first, _) => first,
            _ => CellRef::NIL,
        }
    }

    /// Rest field of a pair or lambda; null for anything else.
    #[inline]
    pub fn rest(&self, reference: CellRef) -> CellRef {
        if reference.is_nil() {
            return CellRef::NIL;
        }
        match self.get(reference) {
            Cell::Pair(_, rest) | Cell::Lambda(_, rest) => rest,
            _ => CellRef::NIL,
        }
    }

    /// Overwrite the first field of a pair or lambda. No effect on
    /// other cells.
    pub fn set_first(&mut self, reference: CellRef, value: CellRef) {
        if reference.is_nil() {
            return;
        }
        match &mut self.space[reference.index()] {
            Cell::Pair(first, _) | Cell::Lambda(first, _) => *first = value,
            _ => {}
        }
    }

    /// Overwrite the rest field of a pair or lambda. No effect on
    /// other cells.
    pub fn set_rest(&mut self, reference: CellRef, value: CellRef) {
        if reference.is_nil() {
            return;
        }
        match &mut self.space[reference.index()] {
            Cell::Pair(_, rest) | Cell::Lambda(_, rest) => *rest = value,
            _ => {}
        }
    }

    /// Flip a pair into a lambda in place, keeping both fields.
    pub fn retag_lambda(&mut self, reference: CellRef) {
        if reference.is_nil() {
            return;
        }
        if let Cell::Pair(first, rest) = self.space[reference.index()] {
            self.space[reference.index()] = Cell::Lambda(first, rest);
        }
    }

    // ------------------------------------------------------------------
    // Root registry
    // ------------------------------------------------------------------

    /// Record the registry depth. See the crate docs for the contract.
    #[inline]
    pub fn mark(&self) -> FrameMark {
        self.roots.mark()
    }

    /// Register a mutator local, returning its slot.
    #[inline]
    pub fn protect(&mut self, value: CellRef) -> Slot {
        self.roots.protect(value)
    }

    /// Read a registered local. Always current, even across
    /// collections.
    #[inline]
    pub fn root(&self, slot: Slot) -> CellRef {
        self.roots.get(slot)
    }

    /// Overwrite a registered local.
    #[inline]
    pub fn set_root(&mut self, slot: Slot, value: CellRef) {
        self.roots.set(slot, value);
    }

    /// Drop every slot registered since `mark`.
    #[inline]
    pub fn release(&mut self, mark: FrameMark) {
        self.roots.release(mark);
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    /// Cells allocated in the active semispace, live or not.
    pub fn allocated(&self) -> usize {
        self.next
    }

    /// Cells per semispace.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Registered root slots.
    pub fn root_count(&self) -> usize {
        self.roots.len()
    }

    /// Collection statistics so far.
    pub fn stats(&self) -> &GcStats {
        &self.stats
    }
}
