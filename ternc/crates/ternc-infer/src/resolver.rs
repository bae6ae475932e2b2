//! The scheme resolver.
//!
//! A mutable mapping from names to polymorphic schemes. The constraint
//! generator looks identifiers up here (getting a fresh instantiation per
//! use site), the SCC driver seeds it with placeholder variables for the
//! names currently being inferred, and the solver rebinds every stored
//! entry after each successful unification step.
//!
//! A name whose scheme is still being inferred is stored as a
//! [`Binding::Seed`]: a re-entrant resolve during its own SCC returns the
//! seeded fresh variable, which is what permits mutual recursion.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use ternc_util::{Error, ErrorKind, FxHashSet, Ident, Location, Result, Symbol};

use ternc_types::{Bindings, Rebind, Scheme, TypeRef};

/// One resolver entry.
#[derive(Clone, Debug)]
pub enum Binding {
    /// A finished, generalized scheme.
    Scheme(Scheme),
    /// The placeholder type for a name whose scheme is being inferred.
    Seed(TypeRef),
}

/// Name → scheme (or in-flight placeholder), insertion-ordered.
#[derive(Clone, Debug, Default)]
pub struct SchemeResolver {
    entries: IndexMap<Symbol, Binding>,
}

impl SchemeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: Symbol) -> bool {
        self.entries.contains_key(&name)
    }

    /// Look a name up and produce its use-site type: schemes instantiate
    /// with fresh variables, seeds return the placeholder itself.
    pub fn resolve(&self, loc: Location, name: Symbol) -> Result<TypeRef> {
        match self.entries.get(&name) {
            Some(Binding::Scheme(scheme)) => Ok(scheme.instantiate(loc)),
            Some(Binding::Seed(ty)) => Ok(ty.clone()),
            None => Err(Error::new(loc, ErrorKind::UnboundVariable(name))),
        }
    }

    /// Insert a top-level binding; duplicates are rejected.
    pub fn extend(&mut self, id: Ident, scheme: Scheme) -> Result<()> {
        if self.entries.contains_key(&id.name) {
            return Err(Error::new(id.loc, ErrorKind::DuplicateBinding(id.name)));
        }
        self.entries.insert(id.name, Binding::Scheme(scheme));
        Ok(())
    }

    /// Insert a subscope binding (lambda parameter, let binding),
    /// shadowing any outer entry of the same name.
    pub fn bind_local(&mut self, id: Ident, scheme: Scheme) {
        self.entries.insert(id.name, Binding::Scheme(scheme));
    }

    /// Seed a name with its placeholder variable for the duration of its
    /// SCC's inference.
    pub fn seed(&mut self, id: Ident, ty: TypeRef) {
        self.entries.insert(id.name, Binding::Seed(ty));
    }

    /// Replace a seed with the finished scheme.
    pub fn publish(&mut self, name: Symbol, scheme: Scheme) {
        self.entries.insert(name, Binding::Scheme(scheme));
    }

    /// The finished scheme for a name, if one has been published.
    pub fn lookup_scheme(&self, name: Symbol) -> Option<&Scheme> {
        match self.entries.get(&name) {
            Some(Binding::Scheme(scheme)) => Some(scheme),
            _ => None,
        }
    }

    /// Apply a substitution to every stored entry. The solver calls this
    /// after each successful unification step.
    pub fn rebind(&mut self, bindings: &Bindings) {
        if bindings.is_empty() {
            return;
        }
        for binding in self.entries.values_mut() {
            match binding {
                Binding::Scheme(scheme) => *scheme = scheme.rebind(bindings),
                Binding::Seed(ty) => *ty = ty.rebind(bindings),
            }
        }
    }

    /// The free variables of the environment: what generalization must
    /// not quantify over.
    pub fn ftvs(&self) -> BTreeSet<Symbol> {
        let mut ftvs = BTreeSet::new();
        for binding in self.entries.values() {
            match binding {
                Binding::Scheme(scheme) => ftvs.extend(scheme.ftvs()),
                Binding::Seed(ty) => ftvs.extend(ty.ftvs()),
            }
        }
        ftvs
    }

    /// Environment free variables, ignoring the named entries; the SCC
    /// driver excludes the component being generalized.
    pub fn ftvs_excluding(&self, excluded: &FxHashSet<Symbol>) -> BTreeSet<Symbol> {
        let mut ftvs = BTreeSet::new();
        for (name, binding) in &self.entries {
            if excluded.contains(name) {
                continue;
            }
            match binding {
                Binding::Scheme(scheme) => ftvs.extend(scheme.ftvs()),
                Binding::Seed(ty) => ftvs.extend(ty.ftvs()),
            }
        }
        ftvs
    }
}
