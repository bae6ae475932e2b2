//! Robinson unification.
//!
//! [`unify`] finds the most general substitution making two types equal,
//! or fails with a located error. Variables carry class predicates:
//! unifying two variables unions their predicate sets onto one fresh
//! variable, and binding a predicated variable to a concrete type turns
//! each predicate into an [`InstanceRequirement`] for the downstream
//! type-class resolver.
//!
//! Recursion depth is bounded: every composite type caches its nesting
//! depth at construction, and each unification step rejects operands past
//! the bound in O(1) before any recursive walk (the occurs check
//! included), so pathological types report `MaximumRecursion` instead of
//! blowing the stack.

use std::fmt;

use ternc_types::{
    check_type_depth, compose, fresh_variable_with_preds, Bindings, Rebind, Type, TypeAtPrec,
    TypeRef, TypeVariable,
};
use ternc_util::{best_location, Error, ErrorKind, Ident, Result};

pub use ternc_types::MAX_TYPE_DEPTH;

/// An obligation, recorded during solving, that a type must belong to a
/// class. The class ident's location is the introduction site.
#[derive(Clone, Debug)]
pub struct InstanceRequirement {
    pub class: Ident,
    pub ty: TypeRef,
}

impl Rebind for InstanceRequirement {
    fn rebind(&self, bindings: &Bindings) -> Self {
        Self {
            class: self.class,
            ty: self.ty.rebind(bindings),
        }
    }
}

impl fmt::Display for InstanceRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.class, TypeAtPrec(&self.ty, 8))
    }
}

/// A successful unification: the substitution plus any predicate
/// obligations it discharged onto concrete types.
#[derive(Clone, Debug, Default)]
pub struct Unification {
    pub bindings: Bindings,
    pub requirements: Vec<InstanceRequirement>,
}

/// Unify two types, producing their most general unifier.
pub fn unify(a: &TypeRef, b: &TypeRef) -> Result<Unification> {
    unify_at_depth(a, b, 0)
}

/// Unify two lists pairwise, threading each pair's substitution into the
/// remaining pairs.
pub fn unify_many(left: &[TypeRef], right: &[TypeRef]) -> Result<Unification> {
    unify_many_at_depth(left, right, 0)
}

fn unify_at_depth(a: &TypeRef, b: &TypeRef, depth: usize) -> Result<Unification> {
    if depth > MAX_TYPE_DEPTH {
        return Err(Error::new(
            best_location(a.location(), b.location()),
            ErrorKind::MaximumRecursion,
        ));
    }
    check_type_depth(a)?;
    check_type_depth(b)?;

    if a == b {
        return Ok(Unification::default());
    }

    tracing::trace!("unify({}, {})", a, b);

    match (&**a, &**b) {
        (Type::Variable(tv), _) => bind(tv, b),
        (_, Type::Variable(tv)) => bind(tv, a),
        (
            Type::Apply { func: f1, arg: a1, .. },
            Type::Apply { func: f2, arg: a2, .. },
        ) => unify_many_at_depth(
            &[f1.clone(), a1.clone()],
            &[f2.clone(), a2.clone()],
            depth + 1,
        ),
        (Type::Tuple { dims: d1, .. }, Type::Tuple { dims: d2, .. }) => {
            if d1.len() != d2.len() {
                return Err(Error::new(
                    best_location(a.location(), b.location()),
                    ErrorKind::ArityMismatch {
                        expected: d1.len(),
                        actual: d2.len(),
                    },
                ));
            }
            unify_many_at_depth(d1, d2, depth + 1)
        }
        _ => Err(Error::new(
            best_location(a.location(), b.location()),
            ErrorKind::TypeMismatch {
                expected: a.repr(),
                actual: b.repr(),
            },
        )),
    }
}

/// Bind a variable to a type.
///
/// Variable-to-variable binding routes both names to one fresh variable
/// carrying the union of their predicate sets; binding to anything else
/// discharges the variable's predicates as instance requirements.
fn bind(tv: &TypeVariable, ty: &TypeRef) -> Result<Unification> {
    // Bound depth before the occurs check: `ftvs` is a recursive walk.
    check_type_depth(ty)?;
    if ty.ftvs().contains(&tv.name.name) {
        return Err(Error::new(
            ty.location(),
            ErrorKind::InfiniteType {
                name: tv.name.name,
                ty: ty.repr(),
            },
        ));
    }

    let mut unification = Unification::default();
    if let Type::Variable(other) = &**ty {
        let mut preds = tv.preds.clone();
        preds.extend(other.preds.iter().copied());
        let fresh = fresh_variable_with_preds(ty.location(), preds);
        tracing::trace!("binding {} and {} to fresh {}", tv.name, other.name, fresh);
        unification.bindings.insert(other.name.name, fresh.clone());
        unification.bindings.insert(tv.name.name, fresh);
    } else {
        for class in &tv.preds {
            unification.requirements.push(InstanceRequirement {
                class: Ident::from_symbol(*class, tv.name.loc),
                ty: ty.clone(),
            });
        }
        unification.bindings.insert(tv.name.name, ty.clone());
    }
    Ok(unification)
}

fn unify_many_at_depth(left: &[TypeRef], right: &[TypeRef], depth: usize) -> Result<Unification> {
    if left.is_empty() && right.is_empty() {
        return Ok(Unification::default());
    }
    if left.len() != right.len() {
        let loc = best_location(left[0].location(), right[0].location());
        return Err(Error::new(
            loc,
            ErrorKind::ArityMismatch {
                expected: left.len(),
                actual: right.len(),
            },
        ));
    }

    let first = unify_at_depth(&left[0], &right[0], depth)?;
    let left_rest = rebind_tail(&left[1..], &first.bindings);
    let right_rest = rebind_tail(&right[1..], &first.bindings);
    let rest = unify_many_at_depth(&left_rest, &right_rest, depth)?;
    Ok(compose_unifications(rest, first))
}

fn rebind_tail(types: &[TypeRef], bindings: &Bindings) -> Vec<TypeRef> {
    types.iter().map(|t| t.rebind(bindings)).collect()
}

/// Compose two successful unifications: `outer` was computed after (and
/// under) `inner`. Requirements keep chronological order, with `inner`'s
/// rewritten through `outer`'s bindings.
fn compose_unifications(outer: Unification, inner: Unification) -> Unification {
    let bindings = compose(&outer.bindings, &inner.bindings);
    let mut requirements: Vec<InstanceRequirement> = inner
        .requirements
        .iter()
        .map(|r| r.rebind(&outer.bindings))
        .collect();
    requirements.extend(outer.requirements);
    Unification {
        bindings,
        requirements,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use ternc_types::{type_arrow, type_id, type_tuple, type_variable, type_variable_with_preds};
    use ternc_util::{internal_loc, Location, Symbol};

    fn loc() -> Location {
        internal_loc!()
    }

    fn var(name: &str) -> TypeRef {
        type_variable(Ident::new(name, loc()))
    }

    fn id(name: &str) -> TypeRef {
        type_id(Ident::new(name, loc()))
    }

    fn sym(s: &str) -> Symbol {
        Symbol::intern(s)
    }

    #[test]
    fn test_unify_equal_types_is_empty() {
        let u = unify(&id("Int"), &id("Int")).unwrap();
        assert!(u.bindings.is_empty());
        assert!(u.requirements.is_empty());
    }

    #[test]
    fn test_unify_var_with_concrete() {
        let u = unify(&var("a"), &id("Int")).unwrap();
        assert_eq!(u.bindings.get(sym("a")).unwrap().repr(), "Int");
    }

    #[test]
    fn test_unify_is_sound() {
        // If unify succeeds, both sides rebind to the same type.
        let a = type_arrow(var("a"), id("Int"));
        let b = type_arrow(id("Bool"), var("b"));
        let u = unify(&a, &b).unwrap();
        assert_eq!(a.rebind(&u.bindings).repr(), b.rebind(&u.bindings).repr());
        assert_eq!(a.rebind(&u.bindings).repr(), "Bool -> Int");
    }

    #[test]
    fn test_occurs_check() {
        let a = var("a");
        let arrow = type_arrow(a.clone(), a.clone());
        let err = unify(&a, &arrow).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InfiniteType { name, .. } if name == sym("a")));
    }

    #[test]
    fn test_mismatched_ids_fail() {
        let err = unify(&id("Int"), &id("Bool")).unwrap_err();
        assert_eq!(
            err.kind,
            ErrorKind::TypeMismatch {
                expected: "Int".into(),
                actual: "Bool".into()
            }
        );
    }

    #[test]
    fn test_tuple_arity_mismatch() {
        let t2 = type_tuple(vec![id("Int"), id("Int")], loc());
        let t3 = type_tuple(vec![id("Int"), id("Int"), id("Int")], loc());
        let err = unify(&t2, &t3).unwrap_err();
        assert_eq!(
            err.kind,
            ErrorKind::ArityMismatch {
                expected: 2,
                actual: 3
            }
        );
    }

    #[test]
    fn test_tuple_pairwise() {
        let t1 = type_tuple(vec![var("a"), id("Bool")], loc());
        let t2 = type_tuple(vec![id("Int"), var("b")], loc());
        let u = unify(&t1, &t2).unwrap();
        assert_eq!(t1.rebind(&u.bindings).repr(), "(Int, Bool)");
    }

    #[test]
    fn test_var_var_unions_predicates() {
        let eq = sym("Eq");
        let ord = sym("Ord");
        let a = type_variable_with_preds(Ident::new("a", loc()), [eq].into_iter().collect());
        let b = type_variable_with_preds(Ident::new("b", loc()), [ord].into_iter().collect());
        let u = unify(&a, &b).unwrap();
        // Both names now map to one fresh variable with both predicates.
        let bound_a = a.rebind(&u.bindings);
        let bound_b = b.rebind(&u.bindings);
        assert_eq!(bound_a.repr(), bound_b.repr());
        let pm = bound_a.predicate_map();
        let preds: &BTreeSet<Symbol> = pm.values().next().unwrap();
        assert!(preds.contains(&eq));
        assert!(preds.contains(&ord));
        assert!(u.requirements.is_empty());
    }

    #[test]
    fn test_binding_predicated_var_emits_requirements() {
        let eq = sym("Eq");
        let a = type_variable_with_preds(Ident::new("a", loc()), [eq].into_iter().collect());
        let u = unify(&a, &id("Int")).unwrap();
        assert_eq!(u.requirements.len(), 1);
        assert_eq!(u.requirements[0].to_string(), "Eq Int");
    }

    #[test]
    fn test_unify_many_threads_substitutions() {
        // [a, a] ~ [Int, b]  must also bind b := Int through the tail
        // rebinding.
        let u = unify_many(
            &[var("a"), var("a")],
            &[id("Int"), var("b")],
        )
        .unwrap();
        assert_eq!(var("a").rebind(&u.bindings).repr(), "Int");
        assert_eq!(var("b").rebind(&u.bindings).repr(), "Int");
    }

    #[test]
    fn test_arrow_unification_through_applications() {
        // a -> Int  ~  Bool -> b, exercised through the Apply encoding.
        let a = type_arrow(var("a"), var("a"));
        let b = type_arrow(id("Int"), var("c"));
        let u = unify(&a, &b).unwrap();
        assert_eq!(b.rebind(&u.bindings).repr(), "Int -> Int");
    }

    #[test]
    fn test_arrow_vs_tuple_mismatch() {
        let arrow = type_arrow(id("Int"), id("Int"));
        let tuple = type_tuple(vec![id("Int"), id("Int")], loc());
        let err = unify(&arrow, &tuple).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::TypeMismatch { .. }));
    }

    #[test]
    fn test_depth_guard() {
        // Two structurally different towers deep enough to trip the guard.
        let mut a = var("bottom_a");
        let mut b = id("Bottom");
        for _ in 0..(MAX_TYPE_DEPTH + 8) {
            a = type_tuple(vec![a], loc());
            b = type_tuple(vec![b], loc());
        }
        let err = unify(&a, &b).unwrap_err();
        assert_eq!(err.kind, ErrorKind::MaximumRecursion);
    }

    #[test]
    fn test_depth_guard_on_variable_binding() {
        // A bare variable against an already-too-deep type must take the
        // bind path and still report the bound, not walk the tree.
        let mut deep = id("Leaf");
        for _ in 0..(MAX_TYPE_DEPTH + 8) {
            deep = type_tuple(vec![deep], loc());
        }
        let err = unify(&var("a"), &deep).unwrap_err();
        assert_eq!(err.kind, ErrorKind::MaximumRecursion);

        let err = unify(&deep, &var("a")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::MaximumRecursion);
    }

    #[test]
    fn test_literal_types() {
        let l1 = ternc_types::type_literal("3", loc());
        let l2 = ternc_types::type_literal("3", loc());
        let l3 = ternc_types::type_literal("4", loc());
        assert!(unify(&l1, &l2).unwrap().bindings.is_empty());
        assert!(unify(&l1, &l3).is_err());
    }
}
