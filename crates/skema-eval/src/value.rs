//! Value helpers: structural equality, list surgery, numeric atoms.

use sgc::{Cell, CellRef, Heap};

/// Structural equality.
///
/// Null equals null; atoms compare by symbol; pairs compare
/// recursively on both fields. Lambdas and primitives are equal only
/// to themselves, which the leading identity check covers.
pub fn structural_equal(heap: &Heap, a: CellRef, b: CellRef) -> bool {
    if a == b {
        return true;
    }
    if a.is_nil() || b.is_nil() {
        return false;
    }
    match (heap.get(a), heap.get(b)) {
        (Cell::Atom(x), Cell::Atom(y)) => x == y,
        (Cell::Pair(a1, a2), Cell::Pair(b1, b2)) => {
            structural_equal(heap, a1, b1) && structural_equal(heap, a2, b2)
        }
        _ => false,
    }
}

/// Reverse a list by rotating its rest fields in place. The argument
/// spine is consumed; the result is the same cells threaded backwards.
pub fn reverse_in_place(heap: &mut Heap, list: CellRef) -> CellRef {
    let mut prev = CellRef::NIL;
    let mut curr = list;
    while !curr.is_nil() {
        let next = heap.rest(curr);
        heap.set_rest(curr, prev);
        prev = curr;
        curr = next;
    }
    prev
}

/// Text of an atom; empty for anything that is not an atom.
pub fn atom_text(heap: &Heap, reference: CellRef) -> &'static str {
    if reference.is_nil() {
        return "";
    }
    match heap.get(reference) {
        Cell::Atom(sym) => sym.as_str(),
        _ => "",
    }
}

/// Signed integer value of an atom's text: optional sign, then as many
/// leading digits as there are. Non-numeric text counts as zero, and
/// overflow wraps at 64 bits.
pub fn int_value(heap: &Heap, reference: CellRef) -> i64 {
    let text = atom_text(heap, reference);
    let bytes = text.as_bytes();
    let (negative, digits) = match bytes {
        [b'-', rest @ ..] => (true, rest),
        [b'+', rest @ ..] => (false, rest),
        rest => (false, rest),
    };
    let mut n: i64 = 0;
    for &b in digits {
        if !b.is_ascii_digit() {
            break;
        }
        n = n.wrapping_mul(10).wrapping_add(i64::from(b - b'0'));
    }
    if negative {
        n.wrapping_neg()
    } else {
        n
    }
}
