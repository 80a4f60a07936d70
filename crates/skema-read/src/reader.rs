//! Tokenizer and recursive-descent parser.
//!
//! The tokenizer works with one byte of lookahead: skip separator
//! bytes, then either take a parenthesis as a one-character token or
//! accumulate a run of atom characters, pushing back the byte that
//! ended the run. Token text is interned, so the parser compares
//! tokens by symbol.
//!
//! The parser is the classic one-token-lookahead scheme for dotted
//! pairs: inside a list, after reading an element, the next token
//! decides whether the list continues, closes, or dots. Pairs are
//! allocated while parsing, so the head of every partially built list
//! is kept in a registry slot across the recursive calls that can
//! trigger a collection.

use std::io::Read;

use sgc::{Cell, CellRef, Heap};
use skema_util::symbol::{TOK_DOT, TOK_LPAREN, TOK_RPAREN};
use skema_util::{Handler, Symbol};

use crate::cursor::ByteCursor;
use crate::error::ReadError;

/// Longest accepted token, in bytes.
pub const TOKEN_MAX: usize = 256;

/// Atom characters: printable ASCII except space and the parentheses.
#[inline]
fn is_atom_byte(byte: u8) -> bool {
    matches!(byte, b'!'..=b'\'' | b'*'..=b'~')
}

/// The S-expression reader.
pub struct Reader<R> {
    cursor: ByteCursor<R>,
    /// Reused token accumulation buffer, capped at `TOKEN_MAX`.
    token: String,
}

impl<R: Read> Reader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            cursor: ByteCursor::new(inner),
            token: String::with_capacity(TOKEN_MAX),
        }
    }

    /// Read one toplevel expression.
    ///
    /// A stray `)` is reported to the handler and yields null.
    pub fn read_value(
        &mut self,
        heap: &mut Heap,
        handler: &Handler,
    ) -> Result<CellRef, ReadError> {
        let token = self.next_token(handler)?;
        if token == TOK_RPAREN {
            handler.error("unexpected `)`");
            return Ok(CellRef::NIL);
        }
        self.read_expr(heap, handler, token)
    }

    /// Produce the next token as an interned symbol.
    pub fn next_token(&mut self, handler: &Handler) -> Result<Symbol, ReadError> {
        loop {
            // Skip separator bytes; end of input here is the clean
            // end of the session.
            let byte = loop {
                match self.cursor.next_byte()? {
                    None => return Err(ReadError::Eof),
                    Some(b) if b.is_ascii_whitespace() => continue,
                    Some(b) => break b,
                }
            };
            match byte {
                b'(' => return Ok(TOK_LPAREN),
                b')' => return Ok(TOK_RPAREN),
                b if is_atom_byte(b) => {
                    self.token.clear();
                    self.token.push(b as char);
                    loop {
                        match self.cursor.next_byte()? {
                            Some(b) if is_atom_byte(b) => {
                                if self.token.len() == TOKEN_MAX {
                                    return Err(ReadError::TokenOverflow);
                                }
                                self.token.push(b as char);
                            }
                            Some(b) => {
                                self.cursor.unread(b);
                                break;
                            }
                            None => break,
                        }
                    }
                    return Ok(Symbol::intern(&self.token));
                }
                other => {
                    // A byte that can start nothing: note it and move on.
                    handler.warning(format!("ignoring unreadable byte 0x{:02x}", other));
                }
            }
        }
    }

    /// Parse one expression whose first token is `token`.
    fn read_expr(
        &mut self,
        heap: &mut Heap,
        handler: &Handler,
        token: Symbol,
    ) -> Result<CellRef, ReadError> {
        if token == TOK_LPAREN {
            let next = self.next_token(handler)?;
            self.read_list(heap, handler, next)
        } else {
            Ok(heap.alloc(Cell::Atom(token))?)
        }
    }

    /// Parse the remainder of a list whose next token is `token`.
    fn read_list(
        &mut self,
        heap: &mut Heap,
        handler: &Handler,
        token: Symbol,
    ) -> Result<CellRef, ReadError> {
        if token == TOK_RPAREN {
            return Ok(CellRef::NIL);
        }
        let mark = heap.mark();
        let out = self.read_list_protected(heap, handler, token);
        heap.release(mark);
        out
    }

    /// Body of `read_list`, with the partial list head in a registry
    /// slot. The caller restores the registry on both exit paths.
    fn read_list_protected(
        &mut self,
        heap: &mut Heap,
        handler: &Handler,
        token: Symbol,
    ) -> Result<CellRef, ReadError> {
        let head = self.read_expr(heap, handler, token)?;
        let head_slot = heap.protect(head);
        let token = self.next_token(handler)?;

        if token == TOK_DOT {
            let token = self.next_token(handler)?;
            let tail = self.read_expr(heap, handler, token)?;
            let head = heap.root(head_slot);
            let pair = heap.alloc(Cell::Pair(head, tail))?;
            let pair_slot = heap.protect(pair);
            let terminator = self.next_token(handler)?;
            if terminator == TOK_RPAREN {
                Ok(heap.root(pair_slot))
            } else {
                handler.error("malformed dotted pair");
                Ok(CellRef::NIL)
            }
        } else {
            let tail = self.read_list(heap, handler, token)?;
            let head = heap.root(head_slot);
            Ok(heap.alloc(Cell::Pair(head, tail))?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sgc::HeapConfig;

    fn heap_of(cells: usize) -> Heap {
        Heap::new(HeapConfig {
            heap_cells: cells,
            root_slots: 256,
        })
        .expect("valid test config")
    }

    fn read_one(source: &str) -> (Heap, Handler, Result<CellRef, ReadError>) {
        let mut heap = heap_of(4096);
        let handler = Handler::new();
        let mut reader = Reader::new(source.as_bytes());
        let result = reader.read_value(&mut heap, &handler);
        (heap, handler, result)
    }

    /// Texts of a proper list of atoms.
    fn texts(heap: &Heap, mut list: CellRef) -> Vec<String> {
        let mut out = Vec::new();
        while !list.is_nil() {
            match heap.get(heap.first(list)) {
                Cell::Atom(sym) => out.push(sym.as_str().to_owned()),
                other => panic!("expected atom, got {:?}", other),
            }
            list = heap.rest(list);
        }
        out
    }

    #[test]
    fn test_reads_an_atom() {
        let (heap, _, result) = read_one("hello");
        let r = result.unwrap();
        assert_eq!(heap.get(r), Cell::Atom(Symbol::intern("hello")));
    }

    #[test]
    fn test_reads_a_number_atom() {
        let (heap, _, result) = read_one("-42");
        match heap.get(result.unwrap()) {
            Cell::Atom(sym) => assert!(sym.is_number()),
            other => panic!("expected atom, got {:?}", other),
        }
    }

    #[test]
    fn test_reads_empty_list() {
        let (_, _, result) = read_one("()");
        assert!(result.unwrap().is_nil());
    }

    #[test]
    fn test_reads_flat_list() {
        let (heap, _, result) = read_one("(a b c)");
        assert_eq!(texts(&heap, result.unwrap()), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_reads_nested_list() {
        let (heap, _, result) = read_one("(a (b c) d)");
        let list = result.unwrap();
        assert_eq!(
            heap.get(heap.first(list)),
            Cell::Atom(Symbol::intern("a"))
        );
        let inner = heap.first(heap.rest(list));
        assert_eq!(texts(&heap, inner), vec!["b", "c"]);
        let third = heap.first(heap.rest(heap.rest(list)));
        assert_eq!(heap.get(third), Cell::Atom(Symbol::intern("d")));
    }

    #[test]
    fn test_reads_dotted_pair() {
        let (heap, handler, result) = read_one("(a . b)");
        let pair = result.unwrap();
        assert_eq!(
            heap.get(heap.first(pair)),
            Cell::Atom(Symbol::intern("a"))
        );
        assert_eq!(
            heap.get(heap.rest(pair)),
            Cell::Atom(Symbol::intern("b"))
        );
        assert!(!handler.has_errors());
    }

    #[test]
    fn test_dotted_tail_of_list() {
        let (heap, _, result) = read_one("(a b . c)");
        let list = result.unwrap();
        let second = heap.rest(list);
        assert_eq!(
            heap.get(heap.rest(second)),
            Cell::Atom(Symbol::intern("c"))
        );
    }

    #[test]
    fn test_malformed_dotted_pair_recovers() {
        let (_, handler, result) = read_one("(a . b c)");
        assert!(result.unwrap().is_nil());
        assert!(handler.has_errors());
    }

    #[test]
    fn test_stray_rparen_recovers() {
        let (_, handler, result) = read_one(")");
        assert!(result.unwrap().is_nil());
        assert!(handler.has_errors());
    }

    #[test]
    fn test_eof_on_empty_input() {
        let (_, _, result) = read_one("   \n\t ");
        assert!(matches!(result, Err(ReadError::Eof)));
    }

    #[test]
    fn test_eof_inside_list() {
        let (_, _, result) = read_one("(a b");
        assert!(matches!(result, Err(ReadError::Eof)));
    }

    #[test]
    fn test_token_overflow() {
        let long = "x".repeat(TOKEN_MAX + 1);
        let (_, _, result) = read_one(&long);
        assert!(matches!(result, Err(ReadError::TokenOverflow)));
    }

    #[test]
    fn test_token_at_cap_is_accepted() {
        let exact = "y".repeat(TOKEN_MAX);
        let (heap, _, result) = read_one(&exact);
        match heap.get(result.unwrap()) {
            Cell::Atom(sym) => assert_eq!(sym.as_str().len(), TOKEN_MAX),
            other => panic!("expected atom, got {:?}", other),
        }
    }

    #[test]
    fn test_dot_inside_atom_is_not_structural() {
        let (heap, _, result) = read_one("(a.b)");
        assert_eq!(texts(&heap, result.unwrap()), vec!["a.b"]);
    }

    #[test]
    fn test_unreadable_byte_is_skipped() {
        let source = b"\x01(a)";
        let mut heap = heap_of(4096);
        let handler = Handler::new();
        let mut reader = Reader::new(&source[..]);
        let result = reader.read_value(&mut heap, &handler).unwrap();
        assert_eq!(texts(&heap, result), vec!["a"]);
        assert_eq!(handler.len(), 1);
        assert!(!handler.has_errors());
    }

    #[test]
    fn test_consecutive_toplevel_reads() {
        let mut heap = heap_of(4096);
        let handler = Handler::new();
        let mut reader = Reader::new("a (b) ".as_bytes());
        let first = reader.read_value(&mut heap, &handler).unwrap();
        assert_eq!(heap.get(first), Cell::Atom(Symbol::intern("a")));
        let second = reader.read_value(&mut heap, &handler).unwrap();
        assert_eq!(texts(&heap, second), vec!["b"]);
        assert!(matches!(
            reader.read_value(&mut heap, &handler),
            Err(ReadError::Eof)
        ));
    }

    #[test]
    fn test_registry_balanced_after_read() {
        let mut heap = heap_of(4096);
        let handler = Handler::new();
        let mut reader = Reader::new("(a (b (c d)) . e)".as_bytes());
        let _ = reader.read_value(&mut heap, &handler).unwrap();
        assert_eq!(heap.root_count(), 0);
    }

    #[test]
    fn test_registry_balanced_after_read_error() {
        let mut heap = heap_of(4096);
        let handler = Handler::new();
        let mut reader = Reader::new("(a (b".as_bytes());
        assert!(reader.read_value(&mut heap, &handler).is_err());
        assert_eq!(heap.root_count(), 0);
    }

    #[test]
    fn test_reading_survives_collections() {
        // A semispace this small forces several collections while the
        // list is still half built; the registry keeps the partial
        // spine alive.
        let mut heap = heap_of(64);
        let handler = Handler::new();
        let words: Vec<String> = (0..20).map(|i| format!("w{}", i)).collect();
        let source = format!("({})", words.join(" "));
        for _ in 0..4 {
            let mut reader = Reader::new(source.as_bytes());
            let list = reader.read_value(&mut heap, &handler).unwrap();
            assert_eq!(texts(&heap, list), words);
        }
        assert!(heap.stats().collections >= 1);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_atom_token_roundtrip(word in "[a-z!$%&*+/<=>?^_~-][a-z0-9!$%&*+/<=>?^_~-]{0,31}") {
                let (heap, _, result) = read_one(&word);
                prop_assert_eq!(
                    heap.get(result.unwrap()),
                    Cell::Atom(Symbol::intern(&word))
                );
            }

            #[test]
            fn prop_flat_list_roundtrip(words in prop::collection::vec("[a-z]{1,8}", 0..16)) {
                let source = format!("({})", words.join(" "));
                let (heap, _, result) = read_one(&source);
                prop_assert_eq!(texts(&heap, result.unwrap()), words);
            }

            #[test]
            fn prop_whitespace_is_insignificant(padding in "[ \t\r\n]{1,8}") {
                let source = format!("({}a{}b{})", padding, padding, padding);
                let (heap, _, result) = read_one(&source);
                prop_assert_eq!(texts(&heap, result.unwrap()), vec!["a", "b"]);
            }
        }
    }
}
