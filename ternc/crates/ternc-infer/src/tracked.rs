//! Tracked types.
//!
//! Every expression node is entered here with its freshly generated type
//! during constraint generation; the solver then pushes each successful
//! unification's bindings through the whole table, so that after solving
//! every node carries its final type. The code generator reads this table.

use ternc_types::{Bindings, Rebind, TypeRef};
use ternc_util::FxHashMap;

use crate::expr::ExprId;

/// Expression node → inferred type, updated in place by the solver.
#[derive(Clone, Debug, Default)]
pub struct TrackedTypes {
    map: FxHashMap<ExprId, TypeRef>,
}

impl TrackedTypes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: ExprId, ty: TypeRef) {
        self.map.insert(id, ty);
    }

    pub fn get(&self, id: ExprId) -> Option<&TypeRef> {
        self.map.get(&id)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ExprId, &TypeRef)> {
        self.map.iter()
    }

    /// Apply a substitution to every entry, in place.
    pub fn rebind_all(&mut self, bindings: &Bindings) {
        if bindings.is_empty() {
            return;
        }
        for ty in self.map.values_mut() {
            *ty = ty.rebind(bindings);
        }
    }
}
