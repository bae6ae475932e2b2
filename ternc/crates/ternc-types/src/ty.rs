//! The Tern type language.
//!
//! [`Type`] is a tagged sum covering every shape inference works with.
//! Arrows are not a dedicated variant: `a -> b` is the two-step application
//! `((-> a) b)` of the distinguished arrow id, which keeps unification down
//! to a handful of cases. N-ary applications are left-associative chains.
//!
//! Types are immutable and shared by reference ([`TypeRef`] = `Rc<Type>`).
//! Structural equality ignores source locations; the canonical string form
//! produced by `Display` is deterministic and usable as a hash/equality
//! key (`repr`).
//!
//! # Printing
//!
//! The printer is precedence driven: arrows are right-associative at
//! precedence 5, applications left-associative at 7, type lambdas at 6,
//! atoms at 10. Parentheses appear exactly where the parent context
//! requires them:
//!
//! ```
//! use ternc_types::*;
//! use ternc_util::{internal_loc, Ident};
//!
//! let loc = internal_loc!();
//! let a = type_variable(Ident::new("a", loc));
//! let b = type_variable(Ident::new("b", loc));
//! let c = type_variable(Ident::new("c", loc));
//! assert_eq!(type_arrows(vec![a.clone(), b.clone(), c.clone()]).repr(), "a -> b -> c");
//! assert_eq!(type_arrow(type_arrow(a, b), c).repr(), "(a -> b) -> c");
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use ternc_util::symbol::{self, OP_ARROW, TY_BOTTOM};
use ternc_util::{Error, ErrorKind, Ident, Location, Result, Symbol};

use crate::gensym::gensym;
use crate::subst::{Bindings, Rebind};

/// Shared reference to an immutable type.
pub type TypeRef = Rc<Type>;

/// A type variable: a name plus the set of class names it must satisfy.
///
/// Unification preserves and unions predicate sets; binding a predicated
/// variable to a concrete type discharges the predicates into instance
/// requirements.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeVariable {
    pub name: Ident,
    pub preds: BTreeSet<Symbol>,
}

/// Depth guard for type-tree recursion.
pub const MAX_TYPE_DEPTH: usize = 64;

/// The sum of type shapes.
///
/// Composite variants cache their nesting depth at construction (the
/// smart builders maintain it) so the recursion guard is an O(1) field
/// read rather than a walk.
#[derive(Clone, Debug)]
pub enum Type {
    /// A unification variable, possibly carrying class predicates.
    Variable(TypeVariable),
    /// A nominal type constant (`Int`, `Bool`, a user data type name).
    Id(Ident),
    /// Binary application `f a`; n-ary chains are left-associative.
    Apply {
        func: TypeRef,
        arg: TypeRef,
        depth: u32,
    },
    /// Ordered components; the empty tuple is unit.
    Tuple {
        dims: Vec<TypeRef>,
        loc: Location,
        depth: u32,
    },
    /// Type-level abstraction for parameterized data types.
    Lambda {
        param: Ident,
        body: TypeRef,
        depth: u32,
    },
    /// Integer/string literal types (value-indexed type language).
    Literal { text: Symbol, loc: Location },
}

// Structural equality, ignoring source locations.
impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Type::Variable(a), Type::Variable(b)) => a == b,
            (Type::Id(a), Type::Id(b)) => a == b,
            (
                Type::Apply { func: f1, arg: a1, .. },
                Type::Apply { func: f2, arg: a2, .. },
            ) => f1 == f2 && a1 == a2,
            (Type::Tuple { dims: d1, .. }, Type::Tuple { dims: d2, .. }) => d1 == d2,
            (
                Type::Lambda { param: p1, body: b1, .. },
                Type::Lambda { param: p2, body: b2, .. },
            ) => p1 == p2 && b1 == b2,
            (Type::Literal { text: t1, .. }, Type::Literal { text: t2, .. }) => t1 == t2,
            _ => false,
        }
    }
}

impl Eq for Type {}

impl Type {
    /// Nesting depth of the type tree. O(1): composite nodes carry it.
    pub fn depth(&self) -> usize {
        match self {
            Type::Variable(_) | Type::Id(_) | Type::Literal { .. } => 1,
            Type::Apply { depth, .. }
            | Type::Tuple { depth, .. }
            | Type::Lambda { depth, .. } => *depth as usize,
        }
    }

    /// The source position this type is pinned to.
    pub fn location(&self) -> Location {
        match self {
            Type::Variable(tv) => tv.name.loc,
            Type::Id(id) => id.loc,
            Type::Apply { func, .. } => func.location(),
            Type::Tuple { loc, .. } => *loc,
            Type::Lambda { param, .. } => param.loc,
            Type::Literal { loc, .. } => *loc,
        }
    }

    /// Free type-variable names, in a deterministic order.
    ///
    /// A `Lambda` binder is not free within its own body.
    pub fn ftvs(&self) -> BTreeSet<Symbol> {
        match self {
            Type::Variable(tv) => {
                let mut set = BTreeSet::new();
                set.insert(tv.name.name);
                set
            }
            Type::Id(_) | Type::Literal { .. } => BTreeSet::new(),
            Type::Apply { func, arg, .. } => {
                let mut set = func.ftvs();
                set.extend(arg.ftvs());
                set
            }
            Type::Tuple { dims, .. } => {
                let mut set = BTreeSet::new();
                for dim in dims {
                    set.extend(dim.ftvs());
                }
                set
            }
            Type::Lambda { param, body, .. } => {
                let mut set = body.ftvs();
                set.remove(&param.name);
                set
            }
        }
    }

    /// Map each free variable name to the union of class names attached to
    /// its occurrences. Generalization lifts these into scheme predicates.
    pub fn predicate_map(&self) -> FxHashMap<Symbol, BTreeSet<Symbol>> {
        let mut map = FxHashMap::default();
        self.collect_predicates(&mut map);
        map
    }

    fn collect_predicates(&self, map: &mut FxHashMap<Symbol, BTreeSet<Symbol>>) {
        match self {
            Type::Variable(tv) => {
                map.entry(tv.name.name)
                    .or_insert_with(BTreeSet::new)
                    .extend(tv.preds.iter().copied());
            }
            Type::Id(_) | Type::Literal { .. } => {}
            Type::Apply { func, arg, .. } => {
                func.collect_predicates(map);
                arg.collect_predicates(map);
            }
            Type::Tuple { dims, .. } => {
                for dim in dims {
                    dim.collect_predicates(map);
                }
            }
            Type::Lambda { param, body, .. } => {
                // The binder masks only its own body's occurrences, not
                // same-named variables in sibling subtrees.
                let mut inner = FxHashMap::default();
                body.collect_predicates(&mut inner);
                inner.remove(&param.name);
                for (name, preds) in inner {
                    map.entry(name).or_insert_with(BTreeSet::new).extend(preds);
                }
            }
        }
    }

    /// Split `((-> a) b)` into `(a, b)`.
    pub fn arrow_split(&self) -> Option<(&TypeRef, &TypeRef)> {
        if let Type::Apply { func, arg: rhs, .. } = self {
            if let Type::Apply { func: oper, arg: lhs, .. } = &**func {
                if let Type::Id(id) = &**oper {
                    if id.name == OP_ARROW {
                        return Some((lhs, rhs));
                    }
                }
            }
        }
        None
    }

    fn precedence(&self) -> u8 {
        match self {
            _ if self.arrow_split().is_some() => 5,
            Type::Lambda { .. } => 6,
            Type::Apply { .. } => 7,
            _ => 10,
        }
    }

    /// Write this type at the given parent precedence, substituting
    /// through `bindings` as it prints. A bound variable renders as its
    /// binding; a lambda binder shadows any incoming binding of its name.
    pub fn emit(
        &self,
        f: &mut fmt::Formatter<'_>,
        bindings: &Bindings,
        parent_prec: u8,
    ) -> fmt::Result {
        if let Type::Variable(tv) = self {
            if let Some(bound) = bindings.get(tv.name.name) {
                return bound.emit(f, bindings, parent_prec);
            }
        }

        let prec = self.precedence();
        let parens = prec < parent_prec;
        if parens {
            f.write_str("(")?;
        }

        if let Some((lhs, rhs)) = self.arrow_split() {
            // Right-associative: the left operand needs one more level.
            lhs.emit(f, bindings, prec + 1)?;
            f.write_str(" -> ")?;
            rhs.emit(f, bindings, prec)?;
        } else {
            match self {
                Type::Variable(tv) => write!(f, "{}", tv.name)?,
                Type::Id(id) => write!(f, "{}", id)?,
                Type::Apply { func, arg, .. } => {
                    // Left-associative: the argument needs one more level.
                    func.emit(f, bindings, prec)?;
                    f.write_str(" ")?;
                    arg.emit(f, bindings, prec + 1)?;
                }
                Type::Tuple { dims, .. } => {
                    f.write_str("(")?;
                    for (i, dim) in dims.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        dim.emit(f, bindings, 0)?;
                    }
                    if dims.len() == 1 {
                        f.write_str(",")?;
                    }
                    f.write_str(")")?;
                }
                Type::Lambda { param, body, .. } => {
                    write!(f, "Λ{} . ", param)?;
                    let narrowed = bindings.without(param.name);
                    body.emit(f, &narrowed, prec)?;
                }
                Type::Literal { text, .. } => write!(f, "{}", text)?,
            }
        }

        if parens {
            f.write_str(")")?;
        }
        Ok(())
    }

    /// The canonical string form; deterministic, suitable for equality and
    /// hashing.
    pub fn repr(&self) -> String {
        self.to_string()
    }

    /// The canonical string form as seen through a substitution, without
    /// materializing the rebound tree.
    pub fn repr_with(&self, bindings: &Bindings) -> String {
        TypeWithBindings(self, bindings).to_string()
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.emit(f, &Bindings::new(), 0)
    }
}

/// Display adapter rendering a type at a chosen parent precedence.
pub struct TypeAtPrec<'a>(pub &'a Type, pub u8);

impl fmt::Display for TypeAtPrec<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.emit(f, &Bindings::new(), self.1)
    }
}

/// Display adapter rendering a type through a substitution.
pub struct TypeWithBindings<'a>(pub &'a Type, pub &'a Bindings);

impl fmt::Display for TypeWithBindings<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.emit(f, self.1, 0)
    }
}

/// Operations that produce new shared types from existing ones.
pub trait TypeExt {
    /// Pure variable renaming; used by scheme normalization and freshening.
    fn remap_vars(&self, mapping: &FxHashMap<Symbol, Symbol>) -> TypeRef;

    /// Apply this type to an argument: a `Lambda` β-reduces by
    /// substitution, any other shape yields a fresh application node.
    fn apply(&self, arg: &TypeRef) -> TypeRef;
}

impl TypeExt for TypeRef {
    fn remap_vars(&self, mapping: &FxHashMap<Symbol, Symbol>) -> TypeRef {
        if mapping.is_empty() {
            return self.clone();
        }
        match &**self {
            Type::Variable(tv) => match mapping.get(&tv.name.name) {
                Some(new_name) => Rc::new(Type::Variable(TypeVariable {
                    name: Ident::from_symbol(*new_name, tv.name.loc),
                    preds: tv.preds.clone(),
                })),
                None => self.clone(),
            },
            Type::Id(_) | Type::Literal { .. } => self.clone(),
            Type::Apply { func, arg, .. } => {
                type_apply(func.remap_vars(mapping), arg.remap_vars(mapping))
            }
            Type::Tuple { dims, loc, .. } => type_tuple(
                dims.iter().map(|d| d.remap_vars(mapping)).collect(),
                *loc,
            ),
            Type::Lambda { param, body, .. } => {
                let param = match mapping.get(&param.name) {
                    Some(new_name) => Ident::from_symbol(*new_name, param.loc),
                    None => *param,
                };
                type_lambda(param, body.remap_vars(mapping))
            }
        }
    }

    fn apply(&self, arg: &TypeRef) -> TypeRef {
        match &**self {
            Type::Lambda { param, body, .. } => {
                body.rebind(&Bindings::single(param.name, arg.clone()))
            }
            _ => type_apply(self.clone(), arg.clone()),
        }
    }
}

impl Rebind for TypeRef {
    fn rebind(&self, bindings: &Bindings) -> TypeRef {
        if bindings.is_empty() {
            return self.clone();
        }
        match &**self {
            Type::Variable(tv) => match bindings.get(tv.name.name) {
                Some(bound) => bound.clone(),
                None => self.clone(),
            },
            Type::Id(_) | Type::Literal { .. } => self.clone(),
            Type::Apply { func, arg, .. } => {
                type_apply(func.rebind(bindings), arg.rebind(bindings))
            }
            Type::Tuple { dims, loc, .. } => {
                type_tuple(dims.iter().map(|d| d.rebind(bindings)).collect(), *loc)
            }
            Type::Lambda { param, body, .. } => {
                // The binder shadows any incoming binding of the same name.
                let inner = bindings.without(param.name);
                type_lambda(*param, body.rebind(&inner))
            }
        }
    }
}

impl Rebind for Vec<TypeRef> {
    fn rebind(&self, bindings: &Bindings) -> Self {
        self.iter().map(|t| t.rebind(bindings)).collect()
    }
}

/// True if `name` denotes a type variable rather than a nominal constant:
/// variables start with a lowercase letter or underscore; uppercase and
/// `::`-prefixed names are nominal.
pub fn is_type_variable_name(name: &str) -> bool {
    if name.starts_with("::") {
        return false;
    }
    matches!(name.chars().next(), Some(c) if c.is_lowercase() || c == '_')
}

pub fn type_variable(id: Ident) -> TypeRef {
    Rc::new(Type::Variable(TypeVariable {
        name: id,
        preds: BTreeSet::new(),
    }))
}

pub fn type_variable_with_preds(id: Ident, preds: BTreeSet<Symbol>) -> TypeRef {
    Rc::new(Type::Variable(TypeVariable { name: id, preds }))
}

/// A fresh variable with no predicates, named by gensym.
pub fn fresh_variable(loc: Location) -> TypeRef {
    type_variable(gensym(loc))
}

/// A fresh variable carrying the given predicate set.
pub fn fresh_variable_with_preds(loc: Location, preds: BTreeSet<Symbol>) -> TypeRef {
    type_variable_with_preds(gensym(loc), preds)
}

pub fn type_id(id: Ident) -> TypeRef {
    Rc::new(Type::Id(id))
}

pub fn type_apply(func: TypeRef, arg: TypeRef) -> TypeRef {
    let depth = (func.depth().max(arg.depth()) as u32).saturating_add(1);
    Rc::new(Type::Apply { func, arg, depth })
}

/// `a -> b` as the two-step application of the arrow id.
pub fn type_arrow(a: TypeRef, b: TypeRef) -> TypeRef {
    let arrow = type_id(Ident::from_symbol(OP_ARROW, a.location()));
    type_apply(type_apply(arrow, a), b)
}

/// Fold `[t1, .., tn]` into `t1 -> .. -> tn` (right-associative).
///
/// # Panics
///
/// Panics on an empty list; callers always have at least a result type.
pub fn type_arrows(mut types: Vec<TypeRef>) -> TypeRef {
    assert!(!types.is_empty(), "type_arrows needs at least one type");
    let mut result = types.pop().unwrap();
    while let Some(ty) = types.pop() {
        result = type_arrow(ty, result);
    }
    result
}

pub fn type_tuple(dims: Vec<TypeRef>, loc: Location) -> TypeRef {
    let depth = (dims.iter().map(|d| d.depth()).max().unwrap_or(0) as u32).saturating_add(1);
    Rc::new(Type::Tuple { dims, loc, depth })
}

/// The unit type: the empty tuple.
pub fn type_unit(loc: Location) -> TypeRef {
    type_tuple(Vec::new(), loc)
}

/// The bottom type `⊥`, produced by expressions that do not yield a value
/// (e.g. `return`).
pub fn type_bottom(loc: Location) -> TypeRef {
    type_id(Ident::from_symbol(TY_BOTTOM, loc))
}

pub fn type_lambda(param: Ident, body: TypeRef) -> TypeRef {
    let depth = (body.depth() as u32).saturating_add(1);
    Rc::new(Type::Lambda { param, body, depth })
}

pub fn type_literal(text: &str, loc: Location) -> TypeRef {
    Rc::new(Type::Literal {
        text: Symbol::intern(text),
        loc,
    })
}

/// Builtin nominal type at a location.
pub fn builtin(name: Symbol, loc: Location) -> TypeRef {
    debug_assert!(name == symbol::TY_INT
        || name == symbol::TY_FLOAT
        || name == symbol::TY_BOOL
        || name == symbol::TY_STRING
        || name == symbol::TY_CHAR);
    type_id(Ident::from_symbol(name, loc))
}

/// Reject a type nested beyond [`MAX_TYPE_DEPTH`].
///
/// O(1): composite nodes cache their depth at construction. The unifier
/// applies this to both operands of every step before any recursive walk
/// (the occurs check included), and the generator applies it where
/// foreign types enter inference.
pub fn check_type_depth(ty: &TypeRef) -> Result<()> {
    if ty.depth() > MAX_TYPE_DEPTH {
        return Err(Error::new(ty.location(), ErrorKind::MaximumRecursion));
    }
    Ok(())
}

/// Collect the spine of a left-associative application chain:
/// `f a b` unfolds to `[f, a, b]`. A non-application unfolds to itself.
pub fn unfold_apps_lassoc(ty: &TypeRef) -> Vec<TypeRef> {
    fn walk(ty: &TypeRef, out: &mut Vec<TypeRef>) {
        if let Type::Apply { func, arg, .. } = &**ty {
            walk(func, out);
            out.push(arg.clone());
        } else {
            out.push(ty.clone());
        }
    }
    let mut spine = Vec::new();
    walk(ty, &mut spine);
    spine
}

/// Collect the operand spine of a right-associative arrow chain:
/// `a -> b -> c` unfolds to `[a, b, c]`. A non-arrow unfolds to itself.
pub fn unfold_arrows_rassoc(ty: &TypeRef) -> Vec<TypeRef> {
    let mut parts = Vec::new();
    let mut cur = ty.clone();
    loop {
        let split = cur.arrow_split().map(|(lhs, rhs)| (lhs.clone(), rhs.clone()));
        match split {
            Some((lhs, rhs)) => {
                parts.push(lhs);
                cur = rhs;
            }
            None => break,
        }
    }
    parts.push(cur);
    parts
}
