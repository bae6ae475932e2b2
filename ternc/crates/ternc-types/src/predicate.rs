//! Class predicates.
//!
//! A [`ClassPredicate`] is the obligation `(ClassName, Type)` - "this type
//! must be an instance of that class". Schemes carry predicates over their
//! quantified variables; during solving the unifier turns predicates on
//! bound variables into instance requirements for the downstream
//! type-class resolver.
//!
//! Predicates order by `(class name, type repr)` so `ClassPredicates`
//! sets iterate and display deterministically.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

use rustc_hash::FxHashMap;
use ternc_util::{Ident, Symbol};

use crate::subst::{Bindings, Rebind};
use crate::ty::{TypeAtPrec, TypeExt, TypeRef};

/// The obligation that a type belongs to a class.
#[derive(Clone, Debug)]
pub struct ClassPredicate {
    /// The class name; its location is where the obligation arose.
    pub class: Ident,
    pub ty: TypeRef,
}

/// An ordered set of predicates.
pub type ClassPredicates = BTreeSet<ClassPredicate>;

impl ClassPredicate {
    pub fn new(class: Ident, ty: TypeRef) -> Self {
        Self { class, ty }
    }

    /// Free variables of the type component.
    pub fn ftvs(&self) -> BTreeSet<Symbol> {
        self.ty.ftvs()
    }

    pub fn remap_vars(&self, mapping: &FxHashMap<Symbol, Symbol>) -> Self {
        Self {
            class: self.class,
            ty: self.ty.remap_vars(mapping),
        }
    }
}

impl Rebind for ClassPredicate {
    fn rebind(&self, bindings: &Bindings) -> Self {
        Self {
            class: self.class,
            ty: self.ty.rebind(bindings),
        }
    }
}

impl PartialEq for ClassPredicate {
    fn eq(&self, other: &Self) -> bool {
        self.class == other.class && self.ty == other.ty
    }
}

impl Eq for ClassPredicate {}

impl PartialOrd for ClassPredicate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ClassPredicate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.class
            .as_str()
            .cmp(other.class.as_str())
            .then_with(|| self.ty.repr().cmp(&other.ty.repr()))
    }
}

impl fmt::Display for ClassPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The type prints at application-argument precedence, so composite
        // types come out parenthesized: `Eq (List a)`.
        write!(f, "{} {}", self.class, TypeAtPrec(&self.ty, 8))
    }
}

/// Rebind every predicate in a set.
pub fn rebind_predicates(predicates: &ClassPredicates, bindings: &Bindings) -> ClassPredicates {
    predicates.iter().map(|p| p.rebind(bindings)).collect()
}

/// Rename variables in every predicate in a set.
pub fn remap_predicates(
    predicates: &ClassPredicates,
    mapping: &FxHashMap<Symbol, Symbol>,
) -> ClassPredicates {
    predicates.iter().map(|p| p.remap_vars(mapping)).collect()
}

/// The union of the free variables of every predicate in a set.
pub fn predicates_ftvs(predicates: &ClassPredicates) -> BTreeSet<Symbol> {
    let mut ftvs = BTreeSet::new();
    for predicate in predicates {
        ftvs.extend(predicate.ftvs());
    }
    ftvs
}
