//! ternc-types - The Tern Type Language
//!
//! This crate defines the value representation of types and everything the
//! inference engine manipulates them with:
//!
//! - [`ty`] - the [`Type`](ty::Type) tagged sum (variables with class
//!   predicates, nominal ids, applications, tuples, type-level lambdas,
//!   literal types), smart builders, free-variable computation,
//!   substitution and the canonical precedence-aware printer;
//! - [`subst`] - [`Bindings`](subst::Bindings) (variable → type maps),
//!   non-commutative composition and the [`Rebind`](subst::Rebind) seam;
//! - [`predicate`] - class membership obligations carried alongside types;
//! - [`scheme`] - ∀-quantified [`Scheme`](scheme::Scheme)s with
//!   instantiation, normalization, freshening and generalization;
//! - [`gensym`] - the process-wide fresh-name supply.
//!
//! Types are immutable once constructed and shared by reference
//! (`TypeRef = Rc<Type>`); they never contain cycles, so plain reference
//! counting is sufficient.

pub mod gensym;
pub mod predicate;
pub mod scheme;
pub mod subst;
pub mod ty;

pub use gensym::{gensym, gensym_name, reset_fresh_names};
pub use predicate::{
    predicates_ftvs, rebind_predicates, remap_predicates, ClassPredicate, ClassPredicates,
};
pub use scheme::{generalize, scheme_equality, Scheme};
pub use subst::{compose, Bindings, Rebind};
pub use ty::{
    builtin, check_type_depth, fresh_variable, fresh_variable_with_preds, is_type_variable_name,
    type_apply, type_arrow, type_arrows, type_bottom, type_id, type_lambda, type_literal,
    type_tuple, type_unit, type_variable, type_variable_with_preds, unfold_apps_lassoc,
    unfold_arrows_rassoc, Type, TypeAtPrec, TypeExt, TypeRef, TypeVariable, TypeWithBindings,
    MAX_TYPE_DEPTH,
};
