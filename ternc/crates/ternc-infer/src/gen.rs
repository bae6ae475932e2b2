//! The constraint generator.
//!
//! Walks the core expression tree and produces equality constraints with
//! diagnostic contexts, entering every node into the tracked-type table
//! with its freshly generated type. The walk itself never unifies; the
//! one exception is `let`, which solves its value's constraints locally
//! so the binding can be generalized before the body is inferred.

use std::collections::BTreeSet;

use ternc_types::{
    check_type_depth, fresh_variable, generalize, type_arrow, type_bottom, type_id, type_tuple,
    type_unit, Rebind, Scheme, TypeRef,
};
use ternc_util::symbol::{TY_BOOL, TY_CHAR, TY_FLOAT, TY_INT, TY_STRING};
use ternc_util::{Error, ErrorKind, Ident, Result, Symbol};

use crate::constraint::{append_constraint, Constraints, Context};
use crate::expr::{ExprArena, ExprId, ExprKind, LiteralKind};
use crate::resolver::SchemeResolver;
use crate::solve::solve;
use crate::tracked::TrackedTypes;

/// The generator's environment: the scheme resolver for identifier
/// lookups plus the enclosing lambda's return type for `return`
/// statements.
#[derive(Clone, Debug)]
pub struct TypeEnv {
    pub resolver: SchemeResolver,
    pub return_type: Option<TypeRef>,
}

impl TypeEnv {
    pub fn new(resolver: SchemeResolver) -> Self {
        Self {
            resolver,
            return_type: None,
        }
    }

    /// Free variables generalization must not quantify over.
    pub fn ftvs(&self) -> BTreeSet<Symbol> {
        let mut ftvs = self.resolver.ftvs();
        if let Some(return_type) = &self.return_type {
            ftvs.extend(return_type.ftvs());
        }
        ftvs
    }
}

/// Infer the type of `expr`, appending its constraints and recording a
/// tracked type for every node visited.
pub fn infer(
    arena: &ExprArena,
    expr: ExprId,
    env: &TypeEnv,
    constraints: &mut Constraints,
    tracked: &mut TrackedTypes,
) -> Result<TypeRef> {
    let loc = arena[expr].loc;
    let ty = match &arena[expr].kind {
        ExprKind::Var(ident) => env.resolver.resolve(ident.loc, ident.name)?,

        ExprKind::Literal(literal) => {
            let name = match literal.kind {
                LiteralKind::Int => TY_INT,
                LiteralKind::Float => TY_FLOAT,
                LiteralKind::Str => TY_STRING,
                LiteralKind::Char => TY_CHAR,
            };
            type_id(Ident::from_symbol(name, loc))
        }

        ExprKind::Lambda {
            param,
            param_ty,
            ret_ty,
            body,
        } => {
            let param_type = match param_ty {
                Some(annotation) => {
                    check_type_depth(annotation)?;
                    annotation.clone()
                }
                None => fresh_variable(param.loc),
            };
            let return_type = fresh_variable(loc);

            let mut inner = env.clone();
            inner
                .resolver
                .bind_local(*param, Scheme::mono(param_type.clone()));
            inner.return_type = Some(return_type.clone());

            let body_ty = infer(arena, *body, &inner, constraints, tracked)?;

            // A block body reaches the return type only through `return`
            // statements; an expression body is the returned value.
            if !matches!(arena[*body].kind, ExprKind::Block { .. }) {
                append_constraint(
                    constraints,
                    body_ty,
                    return_type.clone(),
                    Context::new(
                        arena[*body].loc,
                        "a function body produces the function's return type",
                    ),
                );
            }
            if let Some(annotation) = ret_ty {
                check_type_depth(annotation)?;
                append_constraint(
                    constraints,
                    return_type.clone(),
                    annotation.clone(),
                    Context::new(
                        annotation.location(),
                        "the return type matches its annotation",
                    ),
                );
            }

            type_arrow(param_type, return_type)
        }

        ExprKind::App { func, arg } => {
            let func_ty = infer(arena, *func, env, constraints, tracked)?;
            let arg_ty = infer(arena, *arg, env, constraints, tracked)?;
            let result = fresh_variable(loc);
            append_constraint(
                constraints,
                func_ty.clone(),
                type_arrow(arg_ty.clone(), result.clone()),
                Context::new(
                    loc,
                    format!(
                        "({} : {}) is applied to ({} : {})",
                        arena.describe(*func),
                        func_ty,
                        arena.describe(*arg),
                        arg_ty
                    ),
                ),
            );
            result
        }

        ExprKind::Let { name, value, body } => {
            // Infer the value against a local constraint set and solve it
            // so the binding can be generalized.
            let mut local_constraints = Constraints::new();
            let value_ty = infer(arena, *value, env, &mut local_constraints, tracked)?;
            let forwarded = local_constraints.clone();

            let mut scratch_resolver = SchemeResolver::new();
            let mut scratch_requirements = Vec::new();
            let sigma = solve(
                &mut local_constraints,
                tracked,
                &mut scratch_resolver,
                &mut scratch_requirements,
            )?;
            // The outer solve re-derives the value's bindings (and its
            // instance requirements) from the forwarded originals, which
            // is what carries the final substitution into the value's
            // tracked types.
            constraints.extend(forwarded);

            let value_ty = value_ty.rebind(&sigma);
            let env_ftvs = {
                let mut rebound = env.clone();
                rebound.resolver.rebind(&sigma);
                rebound.return_type = rebound.return_type.as_ref().map(|rt| rt.rebind(&sigma));
                rebound.ftvs()
            };
            let scheme = generalize(&env_ftvs, &value_ty);
            tracing::debug!("let {} :: {}", name, scheme);

            let mut inner = env.clone();
            inner.resolver.bind_local(*name, scheme);
            infer(arena, *body, &inner, constraints, tracked)?
        }

        ExprKind::Fix { body } => {
            let body_ty = infer(arena, *body, env, constraints, tracked)?;
            let fixed = fresh_variable(loc);
            append_constraint(
                constraints,
                type_arrow(fixed.clone(), fixed.clone()),
                body_ty,
                Context::new(loc, "fixpoint"),
            );
            fixed
        }

        ExprKind::If {
            cond,
            then,
            otherwise,
        } => {
            let cond_ty = infer(arena, *cond, env, constraints, tracked)?;
            let then_ty = infer(arena, *then, env, constraints, tracked)?;
            let otherwise_ty = infer(arena, *otherwise, env, constraints, tracked)?;
            append_constraint(
                constraints,
                cond_ty,
                type_id(Ident::from_symbol(TY_BOOL, arena[*cond].loc)),
                Context::new(arena[*cond].loc, "a conditional's predicate must be a Bool"),
            );
            append_constraint(
                constraints,
                then_ty.clone(),
                otherwise_ty,
                Context::new(
                    arena[*otherwise].loc,
                    "both branches of a conditional must match",
                ),
            );
            then_ty
        }

        ExprKind::Block { statements } => {
            for (index, statement) in statements.iter().enumerate() {
                infer(arena, *statement, env, constraints, tracked)?;
                let is_return = matches!(arena[*statement].kind, ExprKind::Return { .. });
                if is_return && index + 1 != statements.len() {
                    return Err(Error::new(
                        arena[statements[index + 1]].loc,
                        ErrorKind::UnreachableCode,
                    ));
                }
            }
            type_unit(loc)
        }

        ExprKind::Return { value } => {
            let value_ty = infer(arena, *value, env, constraints, tracked)?;
            let return_type = env.return_type.clone().ok_or_else(|| {
                Error::new(
                    loc,
                    ErrorKind::Internal("return outside of a function".into()),
                )
            })?;
            append_constraint(
                constraints,
                value_ty.clone(),
                return_type,
                Context::new(
                    loc,
                    format!("returning ({} : {})", arena.describe(*value), value_ty),
                ),
            );
            type_bottom(loc)
        }

        ExprKind::Tuple { dims } => {
            let mut dim_types = Vec::with_capacity(dims.len());
            for dim in dims {
                dim_types.push(infer(arena, *dim, env, constraints, tracked)?);
            }
            type_tuple(dim_types, loc)
        }

        ExprKind::As {
            expr: inner,
            ty,
            unchecked,
        } => {
            check_type_depth(ty)?;
            let inner_ty = infer(arena, *inner, env, constraints, tracked)?;
            if !*unchecked {
                append_constraint(
                    constraints,
                    inner_ty,
                    ty.clone(),
                    Context::new(
                        loc,
                        format!("casting {} to {}", arena.describe(*inner), ty),
                    ),
                );
            }
            ty.clone()
        }
    };

    tracked.insert(expr, ty.clone());
    Ok(ty)
}
