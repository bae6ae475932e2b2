//! The constraint solver.
//!
//! A straight first-in-first-out loop: unify each constraint, push the
//! resulting bindings through everything that holds types (the tracked
//! types, the scheme resolver, the outstanding instance requirements and
//! the constraints not yet processed), and compose them into the
//! accumulated substitution. The first failure aborts the component,
//! wrapped with the constraint's diagnostic context.
//!
//! Termination: every successful step either shrinks the set of free
//! variables across the working set or consumes a constraint, and the
//! occurs check rules out infinite types.

use ternc_types::{compose, Bindings, Rebind};
use ternc_util::Result;

use crate::constraint::Constraints;
use crate::resolver::SchemeResolver;
use crate::tracked::TrackedTypes;
use crate::unify::{unify, InstanceRequirement};

/// Solve `constraints` in order, returning the accumulated substitution.
///
/// On success the constraints have been rebound in place to their solved
/// forms, `tracked` and `resolver` reflect the final substitution, and
/// newly discharged predicate obligations have been appended to
/// `requirements`.
pub fn solve(
    constraints: &mut Constraints,
    tracked: &mut TrackedTypes,
    resolver: &mut SchemeResolver,
    requirements: &mut Vec<InstanceRequirement>,
) -> Result<Bindings> {
    tracing::debug!("solver({} constraints)", constraints.len());

    let mut accumulated = Bindings::new();
    let mut index = 0;
    while index < constraints.len() {
        let (a, b, context_location, context_message) = {
            let constraint = &constraints[index];
            (
                constraint.a.clone(),
                constraint.b.clone(),
                constraint.context.location,
                constraint.context.message.clone(),
            )
        };

        match unify(&a, &b) {
            Ok(unification) => {
                if !unification.bindings.is_empty() {
                    tracked.rebind_all(&unification.bindings);
                    resolver.rebind(&unification.bindings);
                    for requirement in requirements.iter_mut() {
                        *requirement = requirement.rebind(&unification.bindings);
                    }
                    for constraint in constraints[index + 1..].iter_mut() {
                        constraint.rebind_in_place(&unification.bindings);
                    }
                    accumulated = compose(&unification.bindings, &accumulated);
                }
                requirements.extend(unification.requirements);
                index += 1;
            }
            Err(error) => {
                return Err(error.add_info(
                    context_location,
                    format!("while checking that {}", context_message),
                ));
            }
        }
    }

    Ok(accumulated)
}
