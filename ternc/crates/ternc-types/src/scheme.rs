//! Polymorphic type schemes.
//!
//! A [`Scheme`] is `∀ vs. predicates ⇒ τ`: a type quantified over a list
//! of variable names, with class predicates over those names. Schemes are
//! what the resolver stores for every bound identifier; uses instantiate
//! them with fresh variables, and generalization creates them from
//! inferred types.
//!
//! Scheme equality is α-equivalence: normalize both sides (renaming the
//! quantifiers to `a, b, ..`) and compare canonical strings.

use std::collections::BTreeSet;
use std::fmt;

use rustc_hash::FxHashMap;
use ternc_util::{alphabetize, Ident, Location, Symbol};

use crate::gensym::gensym_name;
use crate::predicate::{predicates_ftvs, remap_predicates, ClassPredicate, ClassPredicates};
use crate::subst::{Bindings, Rebind};
use crate::ty::{fresh_variable_with_preds, type_variable, TypeExt, TypeRef};

/// `∀ vars. predicates ⇒ ty`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scheme {
    /// Quantified variable names, in quantification order.
    pub vars: Vec<Symbol>,
    /// Class predicates over the quantified variables.
    pub predicates: ClassPredicates,
    pub ty: TypeRef,
}

impl Scheme {
    pub fn new(vars: Vec<Symbol>, predicates: ClassPredicates, ty: TypeRef) -> Self {
        Self {
            vars,
            predicates,
            ty,
        }
    }

    /// A monomorphic scheme: no quantifiers, no predicates.
    pub fn mono(ty: TypeRef) -> Self {
        Self::new(Vec::new(), ClassPredicates::new(), ty)
    }

    /// Replace each quantified variable with a fresh one, re-attaching the
    /// class names its predicates impose. The result is a use-site type.
    pub fn instantiate(&self, loc: Location) -> TypeRef {
        if self.vars.is_empty() {
            return self.ty.clone();
        }

        let per_var = self.predicate_names_per_var();
        let mut bindings = Bindings::new();
        for var in &self.vars {
            let preds = per_var.get(var).cloned().unwrap_or_default();
            bindings.insert(*var, fresh_variable_with_preds(loc, preds));
        }
        self.ty.rebind(&bindings)
    }

    /// Class names per quantified variable, from this scheme's predicates.
    fn predicate_names_per_var(&self) -> FxHashMap<Symbol, BTreeSet<Symbol>> {
        let mut map: FxHashMap<Symbol, BTreeSet<Symbol>> = FxHashMap::default();
        for predicate in &self.predicates {
            for ftv in predicate.ftvs() {
                map.entry(ftv).or_default().insert(predicate.class.name);
            }
        }
        map
    }

    /// α-rename the quantified variables to `a, b, ..` for equality
    /// checking and display.
    pub fn normalize(&self) -> Scheme {
        let mut mapping = FxHashMap::default();
        let mut new_vars = Vec::with_capacity(self.vars.len());
        for (i, var) in self.vars.iter().enumerate() {
            let new_name = Symbol::intern(&alphabetize(i));
            new_vars.push(new_name);
            mapping.insert(*var, new_name);
        }
        Scheme::new(
            new_vars,
            remap_predicates(&self.predicates, &mapping),
            self.ty.remap_vars(&mapping),
        )
    }

    /// Rename the quantified variables to fresh gensyms, leaving the
    /// structure intact.
    pub fn freshen(&self) -> Scheme {
        if self.vars.is_empty() {
            return self.clone();
        }
        let mut mapping = FxHashMap::default();
        let mut new_vars = Vec::with_capacity(self.vars.len());
        for var in &self.vars {
            let new_name = gensym_name();
            new_vars.push(new_name);
            mapping.insert(*var, new_name);
        }
        Scheme::new(
            new_vars,
            remap_predicates(&self.predicates, &mapping),
            self.ty.remap_vars(&mapping),
        )
    }

    /// Free variables: the body's, minus the quantified names.
    pub fn ftvs(&self) -> BTreeSet<Symbol> {
        let mut ftvs = self.ty.ftvs();
        for var in &self.vars {
            ftvs.remove(var);
        }
        ftvs
    }

    /// Count of quantified variables constrained by at least one
    /// predicate.
    pub fn btvs(&self) -> usize {
        let predicated = predicates_ftvs(&self.predicates);
        self.vars.iter().filter(|v| predicated.contains(v)).count()
    }

    pub fn location(&self) -> Location {
        self.ty.location()
    }
}

impl Rebind for Scheme {
    /// Substitute into the body. The quantified names are removed from the
    /// incoming map first: they are bound here, and whatever the solver
    /// learned about identically-named outer variables must not leak in.
    fn rebind(&self, bindings: &Bindings) -> Scheme {
        if bindings.is_empty() {
            return self.clone();
        }
        let narrowed = bindings.without_all(&self.vars);
        Scheme::new(
            self.vars.clone(),
            self.predicates.clone(),
            self.ty.rebind(&narrowed),
        )
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.vars.is_empty() && self.predicates.is_empty() {
            return write!(f, "{}", self.ty);
        }

        f.write_str("(∀")?;
        for var in &self.vars {
            write!(f, " {}", var)?;
        }
        if !self.predicates.is_empty() {
            f.write_str(" where ")?;
            for (i, predicate) in self.predicates.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}", predicate)?;
            }
        }
        write!(f, " . {})", self.ty)
    }
}

/// α-equivalence of schemes: normalize both and compare canonical strings.
pub fn scheme_equality(a: &Scheme, b: &Scheme) -> bool {
    a.normalize().to_string() == b.normalize().to_string()
}

/// Quantify `ftvs(ty) \ env_ftvs`, lifting the class names attached to
/// each newly quantified variable into scheme predicates.
pub fn generalize(env_ftvs: &BTreeSet<Symbol>, ty: &TypeRef) -> Scheme {
    let predicate_map = ty.predicate_map();
    let mut vars = Vec::new();
    let mut predicates = ClassPredicates::new();

    for name in ty.ftvs() {
        if env_ftvs.contains(&name) {
            continue;
        }
        vars.push(name);
        if let Some(classes) = predicate_map.get(&name) {
            for class in classes {
                predicates.insert(ClassPredicate::new(
                    Ident::from_symbol(*class, ty.location()),
                    type_variable(Ident::from_symbol(name, ty.location())),
                ));
            }
        }
    }

    Scheme::new(vars, predicates, ty.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ty::{type_arrow, type_id, type_variable_with_preds};
    use ternc_util::internal_loc;

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
    fn test_mono_instantiates_to_itself() {
        let scheme = Scheme::mono(type_arrow(id("Int"), id("Int")));
        assert_eq!(scheme.instantiate(loc()).repr(), "Int -> Int");
    }

    #[test]
    fn test_instantiate_freshens_quantified_vars() {
        let scheme = Scheme::new(vec![sym("x")], ClassPredicates::new(), type_arrow(var("x"), var("x")));
        let t1 = scheme.instantiate(loc());
        let t2 = scheme.instantiate(loc());
        // Fresh vars each time, so the two instances differ...
        assert_ne!(t1.repr(), t2.repr());
        // ...but both are arrows from a variable to itself.
        for t in [t1, t2] {
            let ftvs = t.ftvs();
            assert_eq!(ftvs.len(), 1);
            assert!(!ftvs.contains(&sym("x")));
        }
    }

    #[test]
    fn test_instantiate_reattaches_predicates() {
        let eq = sym("Eq");
        let predicates: ClassPredicates =
            [ClassPredicate::new(Ident::new("Eq", loc()), var("x"))].into_iter().collect();
        let scheme = Scheme::new(vec![sym("x")], predicates, type_arrow(var("x"), id("Bool")));
        let instance = scheme.instantiate(loc());
        let pm = instance.predicate_map();
        assert_eq!(pm.len(), 1);
        let (_, preds) = pm.iter().next().unwrap();
        assert!(preds.contains(&eq));
    }

    #[test]
    fn test_normalize_renames_to_alphabet() {
        let scheme = Scheme::new(
            vec![sym("__q"), sym("__p")],
            ClassPredicates::new(),
            type_arrow(var("__q"), var("__p")),
        );
        let normalized = scheme.normalize();
        assert_eq!(normalized.to_string(), "(∀ a b . a -> b)");
    }

    #[test]
    fn test_scheme_equality_is_alpha_equivalence() {
        let s1 = Scheme::new(vec![sym("__m")], ClassPredicates::new(), type_arrow(var("__m"), var("__m")));
        let s2 = Scheme::new(vec![sym("__n")], ClassPredicates::new(), type_arrow(var("__n"), var("__n")));
        assert!(scheme_equality(&s1, &s2));
        assert!(scheme_equality(&s1, &s1.normalize()));

        let s3 = Scheme::new(vec![sym("__n")], ClassPredicates::new(), type_arrow(var("__n"), id("Int")));
        assert!(!scheme_equality(&s1, &s3));
    }

    #[test]
    fn test_freshen_preserves_structure() {
        let scheme = Scheme::new(vec![sym("__z")], ClassPredicates::new(), type_arrow(var("__z"), var("__z")));
        let freshened = scheme.freshen();
        assert_ne!(freshened.vars, scheme.vars);
        assert!(scheme_equality(&scheme, &freshened));
    }

    #[test]
    fn test_generalize_skips_env_vars() {
        // typeof body: a -> b with `a` free in the environment.
        let ty = type_arrow(var("a"), var("b"));
        let env_ftvs: BTreeSet<Symbol> = [sym("a")].into_iter().collect();
        let scheme = generalize(&env_ftvs, &ty);
        assert_eq!(scheme.vars, vec![sym("b")]);
        assert!(scheme.ftvs().contains(&sym("a")));
    }

    #[test]
    fn test_generalize_round_trip_avoids_env_vars() {
        let ty = type_arrow(var("a"), var("b"));
        let env_ftvs: BTreeSet<Symbol> = [sym("a")].into_iter().collect();
        let instance = generalize(&env_ftvs, &ty).instantiate(loc());
        // Instantiated quantifiers are disjoint from the environment.
        assert!(instance.ftvs().is_disjoint(&[sym("b")].into_iter().collect()));
        assert!(instance.ftvs().contains(&sym("a")));
    }

    #[test]
    fn test_generalize_lifts_attached_predicates() {
        let eq = sym("Eq");
        let a = type_variable_with_preds(Ident::new("a", loc()), [eq].into_iter().collect());
        let ty = type_arrow(a.clone(), a);
        let scheme = generalize(&BTreeSet::new(), &ty);
        assert_eq!(scheme.vars, vec![sym("a")]);
        assert_eq!(scheme.predicates.len(), 1);
        assert_eq!(scheme.predicates.iter().next().unwrap().to_string(), "Eq a");
        assert_eq!(scheme.btvs(), 1);
    }

    #[test]
    fn test_rebind_respects_quantifiers() {
        let scheme = Scheme::new(
            vec![sym("q")],
            ClassPredicates::new(),
            type_arrow(var("q"), var("free")),
        );
        let mut bindings = Bindings::new();
        bindings.insert(sym("q"), id("Int"));
        bindings.insert(sym("free"), id("Bool"));
        let rebound = scheme.rebind(&bindings);
        // The quantified `q` is untouched; the free `free` is substituted.
        assert_eq!(rebound.ty.repr(), "q -> Bool");
    }

    #[test]
    fn test_display_mono() {
        assert_eq!(Scheme::mono(id("Int")).to_string(), "Int");
    }

    #[test]
    fn test_display_with_predicates() {
        let predicates: ClassPredicates =
            [ClassPredicate::new(Ident::new("Eq", loc()), var("a"))].into_iter().collect();
        let scheme = Scheme::new(vec![sym("a")], predicates, type_arrow(var("a"), id("Bool")));
        assert_eq!(scheme.to_string(), "(∀ a where Eq a . a -> Bool)");
    }
}
