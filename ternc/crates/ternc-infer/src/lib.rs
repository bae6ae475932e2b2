//! ternc-infer - Constraint-Based Type Inference
//!
//! The inference engine for the Tern compiler: Hindley-Milner with type
//! classes, over an elaborated core expression IR.
//!
//! Data flows leaf to root:
//!
//! ```text
//! ExprArena (from the elaborator)
//!     │
//!     ▼
//! [Constraint Generator] ──▶ Constraints + TrackedTypes
//!     │
//!     ▼
//! [Unifier + Solver] ──▶ Bindings + InstanceRequirements
//!     │
//!     ▼
//! [SCC Checker] ──▶ CheckedModule (schemes, tracked types, requirements)
//! ```
//!
//! The driver hands [`check_module`](check::check_module) a declaration
//! list and an initial [`SchemeResolver`](resolver::SchemeResolver)
//! (builtins plus the data-constructor schemes from a
//! [`DataCtorsMap`](ctors::DataCtorsMap)); it gets back one generalized
//! scheme per declaration, a fully populated tracked-type table for the
//! code generator, and the residual instance requirements for the
//! type-class resolver.

pub mod check;
pub mod constraint;
pub mod ctors;
pub mod expr;
pub mod gen;
pub mod resolver;
pub mod solve;
pub mod tracked;
pub mod unify;

pub use check::{check_module, CheckedModule, Decl};
pub use constraint::{append_constraint, Constraint, Constraints, Context};
pub use ctors::{CtorDecl, CtorInfo, DataCtorsMap, DataTypeDecl};
pub use expr::{Expr, ExprArena, ExprId, ExprKind, Literal, LiteralKind};
pub use gen::{infer, TypeEnv};
pub use resolver::{Binding, SchemeResolver};
pub use solve::solve;
pub use tracked::TrackedTypes;
pub use unify::{unify, unify_many, InstanceRequirement, Unification, MAX_TYPE_DEPTH};
