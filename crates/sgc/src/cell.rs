//! Cell model - the universal Skema object.
//!
//! Every value is one fixed-size [`Cell`]. Pairs and lambdas carry two
//! cell references; atoms carry an interned symbol; primitives carry an
//! opaque callable identity. The empty list is not an allocated object
//! at all but the distinguished null reference [`CellRef::NIL`].

use skema_util::Symbol;

/// A reference to a heap cell, or null.
///
/// Internally an index into the active semispace. References are only
/// meaningful against the heap that produced them, and a moving
/// collection invalidates every reference not held in a registry slot.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRef(u32);

impl CellRef {
    /// The null reference, which is also the empty list.
    pub const NIL: CellRef = CellRef(u32::MAX);

    /// True for the null reference.
    #[inline]
    pub fn is_nil(self) -> bool {
        self.0 == u32::MAX
    }

    #[inline]
    pub(crate) fn from_index(index: usize) -> Self {
        debug_assert!(index < u32::MAX as usize);
        CellRef(index as u32)
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        debug_assert!(!self.is_nil());
        self.0 as usize
    }
}

impl std::fmt::Debug for CellRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_nil() {
            f.write_str("CellRef(nil)")
        } else {
            write!(f, "CellRef({})", self.0)
        }
    }
}

/// Identity of a built-in callable.
///
/// The heap does not know how to call a primitive; it only stores this
/// identity, and the evaluator resolves it against its primitive table.
/// Two primitive cells are the same operation exactly when their ids
/// are equal.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct PrimId(u32);

impl PrimId {
    pub fn new(id: u32) -> Self {
        PrimId(id)
    }

    pub fn as_u32(self) -> u32 {
        self.0
    }
}

/// One heap cell: a tag and up to two fields.
///
/// `Pair` and `Lambda` have identical storage, so retagging the tail of
/// a `lambda` form into a callable is a constant-time tag flip with no
/// copying. `Forward` exists only inside a collection: it overwrites an
/// evacuated cell in the old semispace and records the new address.
/// No `Forward` cell is ever reachable between collections.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Cell {
    /// An ordered pair of cell references.
    Pair(CellRef, CellRef),
    /// A leaf carrying an interned symbol.
    Atom(Symbol),
    /// A leaf carrying a built-in callable identity.
    Primitive(PrimId),
    /// A user-defined callable: (parameter list, body sequence).
    Lambda(CellRef, CellRef),
    /// Forwarding marker, collection-internal.
    Forward(CellRef),
}
