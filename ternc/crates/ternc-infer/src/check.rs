//! Module checking: SCC-scheduled top-level inference.
//!
//! Top-level declarations may refer to each other in any order, including
//! mutually recursively. The checker builds the reference graph over the
//! declared names, groups it into strongly-connected components with
//! Tarjan's algorithm, and processes the components dependencies-first.
//!
//! Per component: seed the resolver with a fresh variable for every
//! member, generate constraints for each right-hand side into one shared
//! set, solve, generalize each member's final type against the outer
//! environment, and publish the schemes for the components that follow.

use indexmap::IndexMap;
use ternc_util::graph::{strongly_connected_components, Graph};
use ternc_util::{Error, ErrorKind, FxHashMap, FxHashSet, Result, Symbol};

use ternc_types::{fresh_variable, generalize, Scheme};

use crate::constraint::{append_constraint, Constraints, Context};
use crate::expr::{ExprArena, ExprId};
use crate::gen::{infer, TypeEnv};
use crate::resolver::SchemeResolver;
use crate::solve::solve;
use crate::tracked::TrackedTypes;
use crate::unify::InstanceRequirement;

/// A top-level declaration: a name and its right-hand side.
#[derive(Clone, Copy, Debug)]
pub struct Decl {
    pub name: ternc_util::Ident,
    pub expr: ExprId,
}

/// Everything the code generator needs from inference.
#[derive(Debug)]
pub struct CheckedModule {
    /// Per-declaration generalized scheme, in inference order.
    pub schemes: IndexMap<Symbol, Scheme>,
    /// Every expression node's final type.
    pub tracked: TrackedTypes,
    /// Residual predicate obligations for the type-class resolver.
    pub requirements: Vec<InstanceRequirement>,
    /// The components, dependencies first; useful for diagnostics.
    pub sccs: Vec<Vec<Symbol>>,
}

/// Infer all declarations against an initial resolver (builtins and data
/// constructor schemes).
pub fn check_module(
    arena: &ExprArena,
    decls: &[Decl],
    mut resolver: SchemeResolver,
) -> Result<CheckedModule> {
    let mut by_name: FxHashMap<Symbol, &Decl> = FxHashMap::default();
    for decl in decls {
        if resolver.contains(decl.name.name) || by_name.insert(decl.name.name, decl).is_some() {
            return Err(Error::new(
                decl.name.loc,
                ErrorKind::DuplicateBinding(decl.name.name),
            ));
        }
    }

    // Reference graph over the declared names only.
    let mut graph = Graph::new();
    for decl in decls {
        graph.add_vertex(decl.name.name);
        for referenced in arena.free_names(decl.expr) {
            if by_name.contains_key(&referenced) {
                graph.add_edge(decl.name.name, referenced);
            }
        }
    }
    let sccs = strongly_connected_components(&graph);

    let mut tracked = TrackedTypes::new();
    let mut requirements: Vec<InstanceRequirement> = Vec::new();
    let mut schemes: IndexMap<Symbol, Scheme> = IndexMap::new();

    for scc in &sccs {
        tracing::debug!("inferring component {:?}", scc);

        // 1. Seed every member with a fresh placeholder variable.
        for name in scc {
            let decl = by_name[name];
            resolver.seed(decl.name, fresh_variable(decl.name.loc));
        }

        // 2. Generate constraints for each right-hand side, tying the
        //    seed to the inferred type.
        let mut constraints = Constraints::new();
        for name in scc {
            let decl = by_name[name];
            let env = TypeEnv::new(resolver.clone());
            let inferred = infer(arena, decl.expr, &env, &mut constraints, &mut tracked)?;
            let seed = resolver.resolve(decl.name.loc, *name)?;
            append_constraint(
                &mut constraints,
                seed,
                inferred,
                Context::new(
                    decl.name.loc,
                    format!("`{}` has the type of its definition", name),
                ),
            );
        }

        // 3. Solve the component's constraints.
        solve(&mut constraints, &mut tracked, &mut resolver, &mut requirements)?;

        // 4. Generalize against the outer environment and publish.
        let members: FxHashSet<Symbol> = scc.iter().copied().collect();
        let outer_ftvs = resolver.ftvs_excluding(&members);
        for name in scc {
            let decl = by_name[name];
            let final_ty = resolver.resolve(decl.name.loc, *name)?;
            let scheme = generalize(&outer_ftvs, &final_ty);
            tracing::debug!("{} :: {}", name, scheme);
            resolver.publish(*name, scheme.clone());
            schemes.insert(*name, scheme);
        }
    }

    Ok(CheckedModule {
        schemes,
        tracked,
        requirements,
        sccs,
    })
}
