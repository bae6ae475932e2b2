//! Substitutions.
//!
//! A [`Bindings`] maps type-variable names to types. The solver threads a
//! single accumulated substitution through inference by composing each
//! unification step's bindings into it; everything that holds types
//! (tracked types, the scheme resolver, outstanding constraints, instance
//! requirements) implements [`Rebind`] and is pushed through the same
//! bindings.
//!
//! Composition is not commutative: `compose(a, b)` applies `a` to the
//! range of `b`, then adds the entries of `a` whose names `b` does not
//! bind. Solver-produced substitutions are idempotent under
//! self-composition.

use std::fmt;

use rustc_hash::FxHashMap;
use ternc_util::Symbol;

use crate::ty::TypeRef;

/// Application of a substitution. One name, everywhere: types, schemes,
/// predicates, constraints and the tracked-type table all rebind the same
/// way.
pub trait Rebind {
    fn rebind(&self, bindings: &Bindings) -> Self;
}

/// A mapping from type-variable names to types.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Bindings {
    map: FxHashMap<Symbol, TypeRef>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// A substitution binding a single name.
    pub fn single(name: Symbol, ty: TypeRef) -> Self {
        let mut bindings = Self::new();
        bindings.insert(name, ty);
        bindings
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub fn get(&self, name: Symbol) -> Option<&TypeRef> {
        self.map.get(&name)
    }

    #[inline]
    pub fn contains(&self, name: Symbol) -> bool {
        self.map.contains_key(&name)
    }

    pub fn insert(&mut self, name: Symbol, ty: TypeRef) {
        self.map.insert(name, ty);
    }

    /// A copy of this substitution with one name removed. Lambda binders
    /// shadow incoming bindings through this.
    pub fn without(&self, name: Symbol) -> Bindings {
        let mut map = self.map.clone();
        map.remove(&name);
        Bindings { map }
    }

    /// A copy with every listed name removed; scheme rebinding drops the
    /// quantified names this way.
    pub fn without_all(&self, names: &[Symbol]) -> Bindings {
        let mut map = self.map.clone();
        for name in names {
            map.remove(name);
        }
        Bindings { map }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Symbol, &TypeRef)> {
        self.map.iter()
    }
}

impl fmt::Display for Bindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Sorted for deterministic output.
        let mut entries: Vec<_> = self.map.iter().collect();
        entries.sort_by_key(|(name, _)| name.as_str());
        f.write_str("{")?;
        for (i, (name, ty)) in entries.into_iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", name, ty)?;
        }
        f.write_str("}")
    }
}

/// Compose two substitutions: apply `outer` to the range of `inner`, then
/// add the entries of `outer` that `inner` does not bind.
pub fn compose(outer: &Bindings, inner: &Bindings) -> Bindings {
    if outer.is_empty() {
        return inner.clone();
    }
    if inner.is_empty() {
        return outer.clone();
    }

    let mut map = FxHashMap::default();
    for (name, ty) in inner.iter() {
        map.insert(*name, ty.rebind(outer));
    }
    for (name, ty) in outer.iter() {
        map.entry(*name).or_insert_with(|| ty.clone());
    }
    Bindings { map }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ty::{type_arrow, type_id, type_variable};
    use ternc_util::{internal_loc, Ident};

    fn var(name: &str) -> TypeRef {
        type_variable(Ident::new(name, internal_loc!()))
    }

    fn id(name: &str) -> TypeRef {
        type_id(Ident::new(name, internal_loc!()))
    }

    fn sym(s: &str) -> Symbol {
        Symbol::intern(s)
    }

    #[test]
    fn test_compose_applies_outer_to_inner_range() {
        // inner: b -> (a -> Int), outer: a -> Bool
        let inner = Bindings::single(sym("b"), type_arrow(var("a"), id("Int")));
        let outer = Bindings::single(sym("a"), id("Bool"));

        let composed = compose(&outer, &inner);
        assert_eq!(composed.get(sym("b")).unwrap().repr(), "Bool -> Int");
        assert_eq!(composed.get(sym("a")).unwrap().repr(), "Bool");
    }

    #[test]
    fn test_compose_inner_entry_wins_on_overlap() {
        let inner = Bindings::single(sym("a"), id("Int"));
        let outer = Bindings::single(sym("a"), id("Bool"));
        let composed = compose(&outer, &inner);
        // inner's entry (rebound through outer) shadows outer's own.
        assert_eq!(composed.get(sym("a")).unwrap().repr(), "Int");
    }

    #[test]
    fn test_compose_is_not_commutative() {
        let a = Bindings::single(sym("x"), var("y"));
        let b = Bindings::single(sym("y"), id("Int"));
        let ab = compose(&a, &b);
        let ba = compose(&b, &a);
        assert_ne!(
            ab.get(sym("x")).map(|t| t.repr()),
            ba.get(sym("x")).map(|t| t.repr())
        );
    }

    #[test]
    fn test_compose_with_empty_is_identity() {
        let sigma = Bindings::single(sym("a"), id("Int"));
        assert_eq!(compose(&sigma, &Bindings::new()), sigma);
        assert_eq!(compose(&Bindings::new(), &sigma), sigma);
    }

    #[test]
    fn test_solved_form_self_compose_is_idempotent() {
        // A solved-form substitution (no domain variable appears in any
        // range) composed with itself is itself.
        let mut sigma = Bindings::new();
        sigma.insert(sym("a"), id("Int"));
        sigma.insert(sym("b"), type_arrow(id("Int"), id("Bool")));
        let twice = compose(&sigma, &sigma);
        assert_eq!(twice, sigma);
    }

    #[test]
    fn test_without() {
        let mut sigma = Bindings::new();
        sigma.insert(sym("a"), id("Int"));
        sigma.insert(sym("b"), id("Bool"));
        let dropped = sigma.without(sym("a"));
        assert!(!dropped.contains(sym("a")));
        assert!(dropped.contains(sym("b")));
        // original untouched
        assert!(sigma.contains(sym("a")));
    }

    #[test]
    fn test_display_is_sorted() {
        let mut sigma = Bindings::new();
        sigma.insert(sym("zz"), id("Int"));
        sigma.insert(sym("aa"), id("Bool"));
        assert_eq!(sigma.to_string(), "{aa: Bool, zz: Int}");
    }
}
