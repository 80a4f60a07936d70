//! String interner backing the [`Symbol`] type.
//!
//! Storage is an insertion-ordered set of leaked string slices, so a
//! symbol's index doubles as an O(1) handle back to its text. The set is
//! hashed with DJB2, the classic multiply-by-33 string hash; hash
//! quality is not a bottleneck here because the working set is the
//! vocabulary of a Lisp program, a few hundred strings at most.
//!
//! The table is a process-wide `LazyLock`, initialized with the
//! interpreter's fixed vocabulary so those symbols have stable indices.
//! Entries are never removed; interned text lives until process exit.

use indexmap::IndexSet;
use std::hash::{BuildHasherDefault, Hasher};
use std::sync::{LazyLock, Mutex};

use super::Symbol;

/// Global string table.
pub static TABLE: LazyLock<StringTable> = LazyLock::new(StringTable::new);

/// Vocabulary interned at table construction, in index order. The
/// `Symbol` constants in the parent module index into this list.
const KNOWN_SYMBOLS: &[&str] = &[
    "quote", "cond", "begin", "or", "define", "lambda", // special forms
    "(", ")", ".", // reader tokens
    "#t", "#f", // boolean atoms
];

/// DJB2 hasher: `h = h * 33 + byte`, seeded with 5381.
pub struct Djb2 {
    state: u64,
}

impl Default for Djb2 {
    fn default() -> Self {
        Self { state: 5381 }
    }
}

impl Hasher for Djb2 {
    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.state = self.state.wrapping_mul(33).wrapping_add(u64::from(b));
        }
    }

    #[inline]
    fn finish(&self) -> u64 {
        self.state
    }
}

/// The interner: text to index and back.
///
/// Interned slices are leaked onto the heap to get a `'static` lifetime;
/// the table itself lives for the whole process, so nothing is lost.
pub struct StringTable {
    set: Mutex<IndexSet<&'static str, BuildHasherDefault<Djb2>>>,
}

impl StringTable {
    fn new() -> Self {
        let mut set = IndexSet::with_capacity_and_hasher(256, BuildHasherDefault::default());
        for &text in KNOWN_SYMBOLS {
            set.insert(text);
        }
        Self { set: Mutex::new(set) }
    }

    /// Intern `text`, returning its canonical symbol.
    pub fn intern(&self, text: &str) -> Symbol {
        let mut set = self.set.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(index) = set.get_index_of(text) {
            return Symbol { index: index as u32 };
        }
        let leaked: &'static str = Box::leak(text.to_owned().into_boxed_str());
        let (index, _) = set.insert_full(leaked);
        Symbol { index: index as u32 }
    }

    /// Text for a symbol. Returns the empty string for a symbol that
    /// was never produced by this table.
    pub fn resolve(&self, symbol: Symbol) -> &'static str {
        let set = self.set.lock().unwrap_or_else(|e| e.into_inner());
        set.get_index(symbol.index as usize).copied().unwrap_or("")
    }

    /// Number of distinct interned strings.
    pub fn len(&self) -> usize {
        self.set.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// True when the table holds no entries. Never the case in practice
    /// because the known vocabulary is interned at construction.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_djb2_known_value() {
        // djb2("a") = 5381 * 33 + 97
        let mut h = Djb2::default();
        h.write(b"a");
        assert_eq!(h.finish(), 5381 * 33 + 97);
    }

    #[test]
    fn test_djb2_differs_by_text() {
        let mut a = Djb2::default();
        a.write(b"car");
        let mut b = Djb2::default();
        b.write(b"cdr");
        assert_ne!(a.finish(), b.finish());
    }

    #[test]
    fn test_known_vocabulary_keeps_reserved_indices() {
        assert_eq!(TABLE.intern("quote").index, 0);
        assert_eq!(TABLE.intern("lambda").index, 5);
        assert_eq!(TABLE.intern("#f").index, 10);
    }

    #[test]
    fn test_intern_is_stable() {
        let a = TABLE.intern("only-interned-here");
        let b = TABLE.intern("only-interned-here");
        assert_eq!(a, b);
    }

    #[test]
    fn test_resolve_unknown_index() {
        let bogus = Symbol { index: u32::MAX };
        assert_eq!(TABLE.resolve(bogus), "");
    }

    #[test]
    fn test_not_empty() {
        assert!(!TABLE.is_empty());
        assert!(TABLE.len() >= KNOWN_SYMBOLS.len());
    }
}
