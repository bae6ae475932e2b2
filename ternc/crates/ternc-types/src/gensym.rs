//! Fresh type-variable names.
//!
//! Fresh variables draw names from a process-wide monotonic counter fed
//! through [`alphabetize`], giving `__b, __c, ..` in creation order. The
//! counter is atomic so a host that compiles on several threads can never
//! observe a duplicated gensym.

use std::sync::atomic::{AtomicU64, Ordering};

use ternc_util::{alphabetize, Ident, Location, Symbol};

static NEXT_FRESH: AtomicU64 = AtomicU64::new(1);

/// Produce a fresh, globally unique type-variable name.
pub fn gensym_name() -> Symbol {
    let n = NEXT_FRESH.fetch_add(1, Ordering::Relaxed);
    Symbol::intern(&format!("__{}", alphabetize(n as usize)))
}

/// Produce a fresh type-variable identifier pinned to `loc`.
pub fn gensym(loc: Location) -> Ident {
    Ident::from_symbol(gensym_name(), loc)
}

/// Reset the counter. Only for tests that want reproducible names; never
/// call this while another compilation is in flight.
pub fn reset_fresh_names() {
    NEXT_FRESH.store(1, Ordering::Relaxed);
}
