//! The primitive library.
//!
//! Every primitive takes the machine and a pre-evaluated argument list
//! in source order. Wrong-typed arguments are not errors: list
//! accessors on non-pairs and arithmetic on non-numbers fall back to
//! null and zero respectively, and the session continues.

use sgc::{Cell, CellRef};
use skema_util::Symbol;

use crate::error::EvalError;
use crate::machine::{Machine, PrimFn};
use crate::value::{int_value, structural_equal};

/// The fixed primitive table, in installation order.
pub static PRIMITIVES: &[(&str, PrimFn)] = &[
    ("car", prim_car),
    ("cdr", prim_cdr),
    ("cons", prim_cons),
    ("list", prim_list),
    ("equal?", prim_equal),
    ("pair?", prim_pair),
    ("null?", prim_null),
    ("+", prim_sum),
    ("-", prim_sub),
    ("*", prim_mul),
    ("display", prim_display),
    ("newline", prim_newline),
    ("read", prim_read),
];

fn prim_car(m: &mut Machine, args: CellRef) -> Result<CellRef, EvalError> {
    let first_arg = m.heap.first(args);
    Ok(m.heap.first(first_arg))
}

fn prim_cdr(m: &mut Machine, args: CellRef) -> Result<CellRef, EvalError> {
    let first_arg = m.heap.first(args);
    Ok(m.heap.rest(first_arg))
}

fn prim_cons(m: &mut Machine, args: CellRef) -> Result<CellRef, EvalError> {
    let first = m.heap.first(args);
    let second = m.heap.first(m.heap.rest(args));
    Ok(m.heap.alloc(Cell::Pair(first, second))?)
}

fn prim_list(_m: &mut Machine, args: CellRef) -> Result<CellRef, EvalError> {
    Ok(args)
}

fn prim_equal(m: &mut Machine, args: CellRef) -> Result<CellRef, EvalError> {
    let reference = m.heap.first(args);
    let mut rest = m.heap.rest(args);
    while !rest.is_nil() {
        if !structural_equal(&m.heap, reference, m.heap.first(rest)) {
            return Ok(CellRef::NIL);
        }
        rest = m.heap.rest(rest);
    }
    Ok(m.truth())
}

fn prim_pair(m: &mut Machine, args: CellRef) -> Result<CellRef, EvalError> {
    let arg = m.heap.first(args);
    if !arg.is_nil() && matches!(m.heap.get(arg), Cell::Pair(_, _)) {
        Ok(m.truth())
    } else {
        Ok(CellRef::NIL)
    }
}

fn prim_null(m: &mut Machine, args: CellRef) -> Result<CellRef, EvalError> {
    if m.heap.first(args).is_nil() {
        Ok(m.truth())
    } else {
        Ok(CellRef::NIL)
    }
}

/// Allocate an atom for a freshly computed integer.
fn number_atom(m: &mut Machine, n: i64) -> Result<CellRef, EvalError> {
    let sym = Symbol::intern(&n.to_string());
    Ok(m.heap.alloc(Cell::Atom(sym))?)
}

fn prim_sum(m: &mut Machine, args: CellRef) -> Result<CellRef, EvalError> {
    let mut sum: i64 = 0;
    let mut cursor = args;
    while !cursor.is_nil() {
        sum = sum.wrapping_add(int_value(&m.heap, m.heap.first(cursor)));
        cursor = m.heap.rest(cursor);
    }
    number_atom(m, sum)
}

fn prim_sub(m: &mut Machine, args: CellRef) -> Result<CellRef, EvalError> {
    let first = int_value(&m.heap, m.heap.first(args));
    let mut cursor = m.heap.rest(args);
    if cursor.is_nil() {
        return number_atom(m, first.wrapping_neg());
    }
    let mut n = first;
    while !cursor.is_nil() {
        n = n.wrapping_sub(int_value(&m.heap, m.heap.first(cursor)));
        cursor = m.heap.rest(cursor);
    }
    number_atom(m, n)
}

fn prim_mul(m: &mut Machine, args: CellRef) -> Result<CellRef, EvalError> {
    let mut product: i64 = 1;
    let mut cursor = args;
    while !cursor.is_nil() {
        product = product.wrapping_mul(int_value(&m.heap, m.heap.first(cursor)));
        cursor = m.heap.rest(cursor);
    }
    number_atom(m, product)
}

fn prim_display(m: &mut Machine, args: CellRef) -> Result<CellRef, EvalError> {
    let value = m.heap.first(args);
    m.write_value(value)?;
    Ok(CellRef::NIL)
}

fn prim_newline(m: &mut Machine, _args: CellRef) -> Result<CellRef, EvalError> {
    m.write_newline()?;
    Ok(CellRef::NIL)
}

fn prim_read(m: &mut Machine, _args: CellRef) -> Result<CellRef, EvalError> {
    Ok(m.read_value()?)
}
