//! Symbol module - String interning for identifiers and type names.
//!
//! A [`Symbol`] is a compact (4-byte) handle to a string stored in a global
//! table. Interning gives the compiler O(1) name comparison, which the
//! inference engine leans on heavily: every identifier, type-variable name
//! and class name is a `Symbol`, and substitution maps and free-variable
//! sets are keyed by `Symbol`.
//!
//! # Thread Safety
//!
//! The table is fully `Send + Sync`: the forward map is a lock-free
//! `DashMap` and the reverse (index → string) table takes a short write
//! lock only when a new string is first seen. Interned strings are leaked
//! to obtain `'static` lifetime; the set of unique names in a compilation
//! is bounded, so this is a deliberate trade against lifetime plumbing.
//!
//! # Examples
//!
//! ```
//! use ternc_util::symbol::Symbol;
//!
//! let a = Symbol::intern("map");
//! let b = Symbol::intern("map");
//! assert_eq!(a, b);
//! assert_eq!(a.as_str(), "map");
//! ```

use std::fmt;
use std::sync::{LazyLock, RwLock};

use dashmap::DashMap;

/// Builtin names pre-interned at table creation, in index order.
///
/// The `TY_*` / `OP_*` constants below must match this array.
const KNOWN_SYMBOLS: &[&str] = &["Int", "Float", "Bool", "String", "Char", "->", "()", "⊥"];

/// Known symbol for the builtin `Int` type
pub const TY_INT: Symbol = Symbol { index: 0 };
/// Known symbol for the builtin `Float` type
pub const TY_FLOAT: Symbol = Symbol { index: 1 };
/// Known symbol for the builtin `Bool` type
pub const TY_BOOL: Symbol = Symbol { index: 2 };
/// Known symbol for the builtin `String` type
pub const TY_STRING: Symbol = Symbol { index: 3 };
/// Known symbol for the builtin `Char` type
pub const TY_CHAR: Symbol = Symbol { index: 4 };
/// Known symbol for the arrow type operator `->`
pub const OP_ARROW: Symbol = Symbol { index: 5 };
/// Known symbol for the unit type `()`
pub const TY_UNIT: Symbol = Symbol { index: 6 };
/// Known symbol for the bottom type `⊥`
pub const TY_BOTTOM: Symbol = Symbol { index: 7 };

/// End of the reserved index range for known symbols
const RESERVED_SYMBOLS_END: u32 = KNOWN_SYMBOLS.len() as u32;

/// Global string table, initialized on first use.
pub static STRING_TABLE: LazyLock<StringTable> = LazyLock::new(|| {
    let table = StringTable::new();
    for name in KNOWN_SYMBOLS {
        table.intern(name);
    }
    table
});

/// Symbol - an interned string identifier.
///
/// Ordering and hashing use the table index, which is stable for the
/// lifetime of the process. Two symbols are equal iff their strings are.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol {
    /// Index into the global string table
    index: u32,
}

impl Symbol {
    /// Intern a string, returning its symbol.
    ///
    /// Interning the same string twice returns the same symbol.
    ///
    /// # Examples
    ///
    /// ```
    /// use ternc_util::symbol::Symbol;
    ///
    /// assert_eq!(Symbol::intern("x"), Symbol::intern("x"));
    /// assert_ne!(Symbol::intern("x"), Symbol::intern("y"));
    /// ```
    #[inline]
    pub fn intern(string: &str) -> Self {
        STRING_TABLE.intern(string)
    }

    /// Get the string this symbol stands for.
    ///
    /// O(1): an index into the reverse table.
    #[inline]
    pub fn as_str(&self) -> &'static str {
        STRING_TABLE.get(*self).unwrap_or("")
    }

    /// Returns true for pre-interned builtin names (`Int`, `->`, ...).
    #[inline]
    pub fn is_known(&self) -> bool {
        self.index < RESERVED_SYMBOLS_END
    }

    /// Raw index, for serialization or debugging.
    #[inline]
    pub fn as_u32(&self) -> u32 {
        self.index
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.as_str())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The global two-way string table backing [`Symbol`].
///
/// Forward lookups (string → index) go through a lock-free `DashMap` hashed
/// with `ahash`; reverse lookups (index → string) read a vector behind an
/// `RwLock` whose write lock is taken only when a brand-new string is
/// interned.
pub struct StringTable {
    map: DashMap<&'static str, u32, ahash::RandomState>,
    strings: RwLock<Vec<&'static str>>,
}

impl StringTable {
    fn new() -> Self {
        Self {
            map: DashMap::with_capacity_and_hasher(256, ahash::RandomState::new()),
            strings: RwLock::new(Vec::with_capacity(256)),
        }
    }

    /// Intern a string.
    pub fn intern(&self, string: &str) -> Symbol {
        if let Some(index) = self.map.get(string) {
            return Symbol { index: *index };
        }

        let mut strings = self.strings.write().unwrap_or_else(|e| e.into_inner());
        // Another thread may have interned the string while we waited.
        if let Some(index) = self.map.get(string) {
            return Symbol { index: *index };
        }

        let interned: &'static str = Box::leak(string.to_owned().into_boxed_str());
        let index = strings.len() as u32;
        strings.push(interned);
        self.map.insert(interned, index);
        Symbol { index }
    }

    /// Get the string for a symbol, if it names a live table entry.
    pub fn get(&self, symbol: Symbol) -> Option<&'static str> {
        let strings = self.strings.read().unwrap_or_else(|e| e.into_inner());
        strings.get(symbol.index as usize).copied()
    }

    /// Number of unique interned strings.
    pub fn len(&self) -> usize {
        self.strings.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Returns true if nothing has been interned yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

static_assertions::assert_impl_all!(Symbol: Send, Sync);
static_assertions::assert_impl_all!(StringTable: Send, Sync);
