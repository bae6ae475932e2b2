//! The core expression IR.
//!
//! This is the elaborated tree the parser/elaborator hands to inference:
//! lambda calculus plus let, fix, conditionals, blocks/returns, tuples and
//! casts. `match` never reaches this crate - the elaborator expands it into
//! nested conditionals and data-constructor tests beforehand.
//!
//! Nodes live in an [`ExprArena`] and are addressed by [`ExprId`]; the
//! tracked-type table is keyed by the same ids. The arena's builder
//! methods double as the construction API for tests and for the driver.

use ternc_util::{define_idx, FxHashSet, Ident, IndexVec, Location, Symbol};

use ternc_types::TypeRef;

define_idx!(ExprId);

/// The kind of a literal; each maps to a fixed nominal type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LiteralKind {
    Int,
    Float,
    Str,
    Char,
}

/// A literal token: its kind plus the source text, kept for diagnostics.
#[derive(Clone, Debug)]
pub struct Literal {
    pub kind: LiteralKind,
    pub text: Symbol,
}

/// An expression node.
#[derive(Clone, Debug)]
pub struct Expr {
    pub kind: ExprKind,
    pub loc: Location,
}

#[derive(Clone, Debug)]
pub enum ExprKind {
    Var(Ident),
    Literal(Literal),
    Lambda {
        param: Ident,
        /// Parameter annotation; a fresh variable when absent.
        param_ty: Option<TypeRef>,
        /// Return-type annotation, constrained against the inferred one.
        ret_ty: Option<TypeRef>,
        body: ExprId,
    },
    App {
        func: ExprId,
        arg: ExprId,
    },
    Let {
        name: Ident,
        value: ExprId,
        body: ExprId,
    },
    Fix {
        body: ExprId,
    },
    If {
        cond: ExprId,
        then: ExprId,
        otherwise: ExprId,
    },
    Block {
        statements: Vec<ExprId>,
    },
    Return {
        value: ExprId,
    },
    Tuple {
        dims: Vec<ExprId>,
    },
    As {
        expr: ExprId,
        ty: TypeRef,
        /// An unchecked cast emits no equality constraint.
        unchecked: bool,
    },
}

/// Owns every expression node of a compilation session.
#[derive(Debug, Default)]
pub struct ExprArena {
    exprs: IndexVec<ExprId, Expr>,
}

impl ExprArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.exprs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exprs.is_empty()
    }

    pub fn alloc(&mut self, kind: ExprKind, loc: Location) -> ExprId {
        self.exprs.push(Expr { kind, loc })
    }

    pub fn get(&self, id: ExprId) -> &Expr {
        &self.exprs[id]
    }

    // Builders, one per node kind.

    pub fn var(&mut self, name: &str, loc: Location) -> ExprId {
        self.alloc(ExprKind::Var(Ident::new(name, loc)), loc)
    }

    pub fn literal(&mut self, kind: LiteralKind, text: &str, loc: Location) -> ExprId {
        self.alloc(
            ExprKind::Literal(Literal {
                kind,
                text: Symbol::intern(text),
            }),
            loc,
        )
    }

    pub fn int(&mut self, text: &str, loc: Location) -> ExprId {
        self.literal(LiteralKind::Int, text, loc)
    }

    pub fn float(&mut self, text: &str, loc: Location) -> ExprId {
        self.literal(LiteralKind::Float, text, loc)
    }

    pub fn string(&mut self, text: &str, loc: Location) -> ExprId {
        self.literal(LiteralKind::Str, text, loc)
    }

    pub fn char_lit(&mut self, text: &str, loc: Location) -> ExprId {
        self.literal(LiteralKind::Char, text, loc)
    }

    pub fn lambda(&mut self, param: &str, body: ExprId, loc: Location) -> ExprId {
        self.alloc(
            ExprKind::Lambda {
                param: Ident::new(param, loc),
                param_ty: None,
                ret_ty: None,
                body,
            },
            loc,
        )
    }

    pub fn lambda_annotated(
        &mut self,
        param: &str,
        param_ty: Option<TypeRef>,
        ret_ty: Option<TypeRef>,
        body: ExprId,
        loc: Location,
    ) -> ExprId {
        self.alloc(
            ExprKind::Lambda {
                param: Ident::new(param, loc),
                param_ty,
                ret_ty,
                body,
            },
            loc,
        )
    }

    pub fn app(&mut self, func: ExprId, arg: ExprId, loc: Location) -> ExprId {
        self.alloc(ExprKind::App { func, arg }, loc)
    }

    pub fn let_(&mut self, name: &str, value: ExprId, body: ExprId, loc: Location) -> ExprId {
        self.alloc(
            ExprKind::Let {
                name: Ident::new(name, loc),
                value,
                body,
            },
            loc,
        )
    }

    pub fn fix(&mut self, body: ExprId, loc: Location) -> ExprId {
        self.alloc(ExprKind::Fix { body }, loc)
    }

    pub fn if_(&mut self, cond: ExprId, then: ExprId, otherwise: ExprId, loc: Location) -> ExprId {
        self.alloc(
            ExprKind::If {
                cond,
                then,
                otherwise,
            },
            loc,
        )
    }

    pub fn block(&mut self, statements: Vec<ExprId>, loc: Location) -> ExprId {
        self.alloc(ExprKind::Block { statements }, loc)
    }

    pub fn ret(&mut self, value: ExprId, loc: Location) -> ExprId {
        self.alloc(ExprKind::Return { value }, loc)
    }

    pub fn tuple(&mut self, dims: Vec<ExprId>, loc: Location) -> ExprId {
        self.alloc(ExprKind::Tuple { dims }, loc)
    }

    pub fn as_(&mut self, expr: ExprId, ty: TypeRef, unchecked: bool, loc: Location) -> ExprId {
        self.alloc(ExprKind::As { expr, ty, unchecked }, loc)
    }

    /// The free term names of an expression; feeds the top-level reference
    /// graph.
    pub fn free_names(&self, id: ExprId) -> FxHashSet<Symbol> {
        let mut free = FxHashSet::default();
        let mut bound = Vec::new();
        self.collect_free(id, &mut bound, &mut free);
        free
    }

    fn collect_free(&self, id: ExprId, bound: &mut Vec<Symbol>, free: &mut FxHashSet<Symbol>) {
        match &self.exprs[id].kind {
            ExprKind::Var(ident) => {
                if !bound.contains(&ident.name) {
                    free.insert(ident.name);
                }
            }
            ExprKind::Literal(_) => {}
            ExprKind::Lambda { param, body, .. } => {
                bound.push(param.name);
                self.collect_free(*body, bound, free);
                bound.pop();
            }
            ExprKind::App { func, arg } => {
                self.collect_free(*func, bound, free);
                self.collect_free(*arg, bound, free);
            }
            ExprKind::Let { name, value, body } => {
                self.collect_free(*value, bound, free);
                bound.push(name.name);
                self.collect_free(*body, bound, free);
                bound.pop();
            }
            ExprKind::Fix { body } => self.collect_free(*body, bound, free),
            ExprKind::If {
                cond,
                then,
                otherwise,
            } => {
                self.collect_free(*cond, bound, free);
                self.collect_free(*then, bound, free);
                self.collect_free(*otherwise, bound, free);
            }
            ExprKind::Block { statements } => {
                for statement in statements {
                    self.collect_free(*statement, bound, free);
                }
            }
            ExprKind::Return { value } => self.collect_free(*value, bound, free),
            ExprKind::Tuple { dims } => {
                for dim in dims {
                    self.collect_free(*dim, bound, free);
                }
            }
            ExprKind::As { expr, .. } => self.collect_free(*expr, bound, free),
        }
    }

    /// A compact, source-like rendering used in constraint contexts and
    /// error messages.
    pub fn describe(&self, id: ExprId) -> String {
        match &self.exprs[id].kind {
            ExprKind::Var(ident) => ident.to_string(),
            ExprKind::Literal(literal) => literal.text.to_string(),
            ExprKind::Lambda { param, body, .. } => {
                format!("λ{} . {}", param, self.describe(*body))
            }
            ExprKind::App { func, arg } => {
                format!("({} {})", self.describe(*func), self.describe(*arg))
            }
            ExprKind::Let { name, value, body } => format!(
                "let {} = {} in {}",
                name,
                self.describe(*value),
                self.describe(*body)
            ),
            ExprKind::Fix { body } => format!("fix {}", self.describe(*body)),
            ExprKind::If {
                cond,
                then,
                otherwise,
            } => format!(
                "if {} then {} else {}",
                self.describe(*cond),
                self.describe(*then),
                self.describe(*otherwise)
            ),
            ExprKind::Block { statements } => format!("{{{} statements}}", statements.len()),
            ExprKind::Return { value } => format!("return {}", self.describe(*value)),
            ExprKind::Tuple { dims } => {
                let parts: Vec<String> = dims.iter().map(|d| self.describe(*d)).collect();
                format!("({})", parts.join(", "))
            }
            ExprKind::As { expr, ty, .. } => format!("({} as {})", self.describe(*expr), ty),
        }
    }
}

impl std::ops::Index<ExprId> for ExprArena {
    type Output = Expr;

    fn index(&self, id: ExprId) -> &Expr {
        &self.exprs[id]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ternc_util::internal_loc;

    fn loc() -> Location {
        internal_loc!()
    }

    #[test]
    fn test_free_names_of_identity() {
        let mut arena = ExprArena::new();
        let x = arena.var("x", loc());
        let lam = arena.lambda("x", x, loc());
        assert!(arena.free_names(lam).is_empty());
    }

    #[test]
    fn test_free_names_sees_through_binders() {
        let mut arena = ExprArena::new();
        let f = arena.var("f", loc());
        let x = arena.var("x", loc());
        let app = arena.app(f, x, loc());
        let lam = arena.lambda("x", app, loc());
        let free = arena.free_names(lam);
        assert_eq!(free.len(), 1);
        assert!(free.contains(&Symbol::intern("f")));
    }

    #[test]
    fn test_let_binds_body_not_value() {
        let mut arena = ExprArena::new();
        // let y = y in y : the value's y is free, the body's is bound.
        let value = arena.var("y", loc());
        let body = arena.var("y", loc());
        let e = arena.let_("y", value, body, loc());
        let free = arena.free_names(e);
        assert!(free.contains(&Symbol::intern("y")));
    }

    #[test]
    fn test_describe() {
        let mut arena = ExprArena::new();
        let x = arena.var("x", loc());
        let one = arena.int("1", loc());
        let app = arena.app(x, one, loc());
        let lam = arena.lambda("x", app, loc());
        assert_eq!(arena.describe(lam), "λx . (x 1)");
    }

    #[test]
    fn test_arena_indexing() {
        let mut arena = ExprArena::new();
        let id = arena.int("42", loc());
        match &arena[id].kind {
            ExprKind::Literal(lit) => {
                assert_eq!(lit.kind, LiteralKind::Int);
                assert_eq!(lit.text.as_str(), "42");
            }
            other => panic!("expected a literal, got {:?}", other),
        }
    }
}
