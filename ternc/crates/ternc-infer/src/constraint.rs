//! Equality constraints.
//!
//! The generator emits `(a ≡ b, context)` triples; the solver consumes
//! them first-in-first-out. The [`Context`] is pure diagnostics: the
//! source location and a human-readable reason that becomes the
//! "while checking that ..." note when unification of the pair fails.

use std::fmt;

use ternc_types::{Bindings, Rebind, TypeRef};
use ternc_util::{debug, Location};

/// Why a constraint exists, and where.
#[derive(Clone, Debug)]
pub struct Context {
    pub location: Location,
    pub message: String,
}

impl Context {
    pub fn new(location: Location, message: impl Into<String>) -> Self {
        Self {
            location,
            message: message.into(),
        }
    }
}

/// `a ≡ b` with its diagnostic rationale.
#[derive(Clone, Debug)]
pub struct Constraint {
    pub a: TypeRef,
    pub b: TypeRef,
    pub context: Context,
}

impl Constraint {
    /// Substitute into both sides, in place.
    pub fn rebind_in_place(&mut self, bindings: &Bindings) {
        self.a = self.a.rebind(bindings);
        self.b = self.b.rebind(bindings);
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} == {} because {}", self.a, self.b, self.context.message)
    }
}

pub type Constraints = Vec<Constraint>;

/// Append a constraint, logging it when `TERNC_SHOW_CONSTRAINTS` is set.
pub fn append_constraint(constraints: &mut Constraints, a: TypeRef, b: TypeRef, context: Context) {
    if debug::show_constraints() {
        tracing::debug!(
            location = %context.location,
            "constraining {} == {} because {}",
            a,
            b,
            context.message
        );
    }
    constraints.push(Constraint { a, b, context });
}
