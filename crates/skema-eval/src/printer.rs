//! The printer.
//!
//! Renders a cell to a text sink: null as `()`, atoms verbatim,
//! primitives as `<C@..>` with their identity in hex, lambdas as
//! `<lambda ..>` around their parameter list, and pairs with the usual
//! list notation, falling back to dotted notation when a spine ends in
//! a non-pair.

use std::io::{self, Write};

use sgc::{Cell, CellRef, Heap};

/// Write `obj` to `out`.
pub fn print(heap: &Heap, obj: CellRef, out: &mut dyn Write) -> io::Result<()> {
    if obj.is_nil() {
        return write!(out, "()");
    }
    match heap.get(obj) {
        Cell::Atom(sym) => write!(out, "{}", sym.as_str()),
        Cell::Primitive(id) => write!(out, "<C@{:x}>", id.as_u32()),
        Cell::Lambda(params, _) => {
            write!(out, "<lambda ")?;
            print(heap, params, out)?;
            write!(out, ">")
        }
        Cell::Pair(_, _) => {
            write!(out, "(")?;
            let mut cursor = obj;
            loop {
                print(heap, heap.first(cursor), out)?;
                let rest = heap.rest(cursor);
                if rest.is_nil() {
                    break;
                }
                write!(out, " ")?;
                if !matches!(heap.get(rest), Cell::Pair(_, _)) {
                    write!(out, ". ")?;
                    print(heap, rest, out)?;
                    break;
                }
                cursor = rest;
            }
            write!(out, ")")
        }
        Cell::Forward(_) => unreachable!("printing during a collection"),
    }
}

/// Render to a string, for tests and diagnostics.
pub fn render(heap: &Heap, obj: CellRef) -> String {
    let mut buf = Vec::new();
    // Writing to a Vec cannot fail.
    let _ = print(heap, obj, &mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sgc::{HeapConfig, PrimId};
    use skema_util::Symbol;

    fn heap() -> Heap {
        Heap::new(HeapConfig {
            heap_cells: 512,
            root_slots: 64,
        })
        .expect("valid test config")
    }

    fn atom(heap: &mut Heap, text: &str) -> CellRef {
        heap.alloc(Cell::Atom(Symbol::intern(text))).unwrap()
    }

    fn list(heap: &mut Heap, texts: &[&str]) -> CellRef {
        let mut out = CellRef::NIL;
        for text in texts.iter().rev() {
            let a = atom(heap, text);
            out = heap.alloc(Cell::Pair(a, out)).unwrap();
        }
        out
    }

    #[test]
    fn test_null_prints_as_unit() {
        let h = heap();
        assert_eq!(render(&h, CellRef::NIL), "()");
    }

    #[test]
    fn test_atom_prints_verbatim() {
        let mut h = heap();
        let a = atom(&mut h, "hello-atom");
        assert_eq!(render(&h, a), "hello-atom");
    }

    #[test]
    fn test_flat_list() {
        let mut h = heap();
        let l = list(&mut h, &["1", "2", "3"]);
        assert_eq!(render(&h, l), "(1 2 3)");
    }

    #[test]
    fn test_nested_list() {
        let mut h = heap();
        let inner = list(&mut h, &["b", "c"]);
        let d = atom(&mut h, "d");
        let tail = h.alloc(Cell::Pair(d, CellRef::NIL)).unwrap();
        let mid = h.alloc(Cell::Pair(inner, tail)).unwrap();
        let a = atom(&mut h, "a");
        let l = h.alloc(Cell::Pair(a, mid)).unwrap();
        assert_eq!(render(&h, l), "(a (b c) d)");
    }

    #[test]
    fn test_dotted_pair() {
        let mut h = heap();
        let one = atom(&mut h, "1");
        let two = atom(&mut h, "2");
        let pair = h.alloc(Cell::Pair(one, two)).unwrap();
        assert_eq!(render(&h, pair), "(1 . 2)");
    }

    #[test]
    fn test_dotted_tail() {
        let mut h = heap();
        let c = atom(&mut h, "c");
        let b = atom(&mut h, "b");
        let tail = h.alloc(Cell::Pair(b, c)).unwrap();
        let a = atom(&mut h, "a");
        let l = h.alloc(Cell::Pair(a, tail)).unwrap();
        assert_eq!(render(&h, l), "(a b . c)");
    }

    #[test]
    fn test_empty_list_inside_list() {
        let mut h = heap();
        let nil_tail = h.alloc(Cell::Pair(CellRef::NIL, CellRef::NIL)).unwrap();
        let a = atom(&mut h, "a");
        let l = h.alloc(Cell::Pair(a, nil_tail)).unwrap();
        assert_eq!(render(&h, l), "(a ())");
    }

    #[test]
    fn test_primitive_format() {
        let mut h = heap();
        let p = h.alloc(Cell::Primitive(PrimId::new(0x2a))).unwrap();
        assert_eq!(render(&h, p), "<C@2a>");
    }

    #[test]
    fn test_lambda_format() {
        let mut h = heap();
        let params = list(&mut h, &["n"]);
        let body = list(&mut h, &["n"]);
        let lambda = h.alloc(Cell::Lambda(params, body)).unwrap();
        assert_eq!(render(&h, lambda), "<lambda (n)>");
    }

    #[test]
    fn test_lambda_with_empty_params() {
        let mut h = heap();
        let body = list(&mut h, &["x"]);
        let lambda = h.alloc(Cell::Lambda(CellRef::NIL, body)).unwrap();
        assert_eq!(render(&h, lambda), "<lambda ()>");
    }
}
