//! The data-constructor table.
//!
//! For every algebraic data type `T a b = C1 .. | C2 ..` this maps each
//! constructor name to its scheme (`∀ a b . field1 -> .. -> T a b`) and a
//! dense integer tag used for runtime discrimination, plus the Λ-prefixed
//! type constructor (`Λa . Λb . T a b`) the type language β-reduces when
//! it is applied.
//!
//! The elaborator builds one table per module and installs the
//! constructor schemes into the initial resolver.

use indexmap::IndexMap;
use ternc_util::{Error, ErrorKind, Ident, Location, Result, Symbol};

use ternc_types::{
    check_type_depth, type_apply, type_arrows, type_id, type_lambda, type_variable,
    ClassPredicates, Scheme, TypeRef,
};

use crate::resolver::SchemeResolver;

/// A constructor declaration: name plus field types. Field types may
/// reference the data type's parameters as type variables.
#[derive(Clone, Debug)]
pub struct CtorDecl {
    pub name: Ident,
    pub fields: Vec<TypeRef>,
}

/// A data type declaration `T p1 .. pn = C1 .. | C2 ..`.
#[derive(Clone, Debug)]
pub struct DataTypeDecl {
    pub name: Ident,
    pub params: Vec<Ident>,
    pub ctors: Vec<CtorDecl>,
}

/// Everything known about one constructor.
#[derive(Clone, Debug)]
pub struct CtorInfo {
    /// The data type this constructor belongs to.
    pub adt: Symbol,
    /// Dense tag, in declaration order within the data type.
    pub tag: u32,
    /// Number of fields.
    pub arity: usize,
    pub scheme: Scheme,
}

/// Constructor name → info, plus per-ADT bookkeeping.
#[derive(Clone, Debug, Default)]
pub struct DataCtorsMap {
    ctors: IndexMap<Symbol, CtorInfo>,
    adts: IndexMap<Symbol, Vec<Symbol>>,
    type_constructors: IndexMap<Symbol, TypeRef>,
}

impl DataCtorsMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a data type and all of its constructors.
    pub fn add_data_type(&mut self, decl: &DataTypeDecl) -> Result<()> {
        if self.adts.contains_key(&decl.name.name) {
            return Err(Error::new(
                decl.name.loc,
                ErrorKind::DuplicateBinding(decl.name.name),
            ));
        }

        // The saturated result type `T p1 .. pn`.
        let mut result = type_id(decl.name);
        for param in &decl.params {
            result = type_apply(result, type_variable(*param));
        }

        // The Λ-prefixed type constructor, applied by substitution.
        let mut type_constructor = result.clone();
        for param in decl.params.iter().rev() {
            type_constructor = type_lambda(*param, type_constructor);
        }

        let quantified: Vec<Symbol> = decl.params.iter().map(|p| p.name).collect();
        let mut ctor_names = Vec::with_capacity(decl.ctors.len());
        for (tag, ctor) in decl.ctors.iter().enumerate() {
            if self.ctors.contains_key(&ctor.name.name) {
                return Err(Error::new(
                    ctor.name.loc,
                    ErrorKind::DuplicateBinding(ctor.name.name),
                ));
            }
            for field in &ctor.fields {
                check_type_depth(field)?;
            }

            let mut parts = ctor.fields.clone();
            parts.push(result.clone());
            let scheme = Scheme::new(quantified.clone(), ClassPredicates::new(), type_arrows(parts));

            self.ctors.insert(
                ctor.name.name,
                CtorInfo {
                    adt: decl.name.name,
                    tag: tag as u32,
                    arity: ctor.fields.len(),
                    scheme,
                },
            );
            ctor_names.push(ctor.name.name);
        }

        self.adts.insert(decl.name.name, ctor_names);
        self.type_constructors.insert(decl.name.name, type_constructor);
        Ok(())
    }

    pub fn ctor_info(&self, loc: Location, name: Symbol) -> Result<&CtorInfo> {
        self.ctors
            .get(&name)
            .ok_or_else(|| Error::new(loc, ErrorKind::UnboundVariable(name)))
    }

    /// The constructor's scheme; unknown names are `UnboundVariable`.
    pub fn ctor_scheme(&self, loc: Location, name: Symbol) -> Result<&Scheme> {
        Ok(&self.ctor_info(loc, name)?.scheme)
    }

    /// The constructor's dense tag within its data type.
    pub fn ctor_tag(&self, loc: Location, name: Symbol) -> Result<u32> {
        Ok(self.ctor_info(loc, name)?.tag)
    }

    /// Constructor names of a data type, in declaration order.
    pub fn ctors_of(&self, adt: Symbol) -> Option<&[Symbol]> {
        self.adts.get(&adt).map(Vec::as_slice)
    }

    /// The Λ-prefixed type constructor for a data type.
    pub fn type_constructor(&self, adt: Symbol) -> Option<&TypeRef> {
        self.type_constructors.get(&adt)
    }

    /// Publish every constructor scheme into a resolver; this is how the
    /// initial environment learns the ADT constructors.
    pub fn install(&self, resolver: &mut SchemeResolver) -> Result<()> {
        for (name, info) in &self.ctors {
            resolver.extend(
                Ident::from_symbol(*name, info.scheme.location()),
                info.scheme.clone(),
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ternc_types::{scheme_equality, type_arrow, TypeExt};
    use ternc_util::internal_loc;

    fn loc() -> Location {
        internal_loc!()
    }

    fn sym(s: &str) -> Symbol {
        Symbol::intern(s)
    }

    /// `Maybe a = Nothing | Just a`
    fn maybe_decl() -> DataTypeDecl {
        let a = Ident::new("a", loc());
        DataTypeDecl {
            name: Ident::new("Maybe", loc()),
            params: vec![a],
            ctors: vec![
                CtorDecl {
                    name: Ident::new("Nothing", loc()),
                    fields: vec![],
                },
                CtorDecl {
                    name: Ident::new("Just", loc()),
                    fields: vec![type_variable(a)],
                },
            ],
        }
    }

    #[test]
    fn test_ctor_schemes() {
        let mut map = DataCtorsMap::new();
        map.add_data_type(&maybe_decl()).unwrap();

        let nothing = map.ctor_scheme(loc(), sym("Nothing")).unwrap();
        assert_eq!(nothing.normalize().to_string(), "(∀ a . Maybe a)");

        let just = map.ctor_scheme(loc(), sym("Just")).unwrap();
        assert_eq!(just.normalize().to_string(), "(∀ a . a -> Maybe a)");
    }

    #[test]
    fn test_tags_are_dense_in_declaration_order() {
        let mut map = DataCtorsMap::new();
        map.add_data_type(&maybe_decl()).unwrap();
        assert_eq!(map.ctor_tag(loc(), sym("Nothing")).unwrap(), 0);
        assert_eq!(map.ctor_tag(loc(), sym("Just")).unwrap(), 1);
        assert_eq!(map.ctor_info(loc(), sym("Just")).unwrap().arity, 1);
        assert_eq!(
            map.ctors_of(sym("Maybe")).unwrap().to_vec(),
            vec![sym("Nothing"), sym("Just")]
        );
    }

    #[test]
    fn test_type_constructor_beta_reduces() {
        let mut map = DataCtorsMap::new();
        map.add_data_type(&maybe_decl()).unwrap();
        let tycon = map.type_constructor(sym("Maybe")).unwrap();
        assert_eq!(tycon.repr(), "Λa . Maybe a");

        let applied = tycon.apply(&type_id(Ident::new("Int", loc())));
        assert_eq!(applied.repr(), "Maybe Int");
    }

    #[test]
    fn test_unknown_ctor_is_unbound() {
        let map = DataCtorsMap::new();
        let err = map.ctor_scheme(loc(), sym("Mystery")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnboundVariable(sym("Mystery")));
    }

    #[test]
    fn test_duplicate_ctor_rejected() {
        let mut map = DataCtorsMap::new();
        map.add_data_type(&maybe_decl()).unwrap();

        let clash = DataTypeDecl {
            name: Ident::new("Option", loc()),
            params: vec![],
            ctors: vec![CtorDecl {
                name: Ident::new("Just", loc()),
                fields: vec![],
            }],
        };
        let err = map.add_data_type(&clash).unwrap_err();
        assert_eq!(err.kind, ErrorKind::DuplicateBinding(sym("Just")));
    }

    #[test]
    fn test_install_publishes_schemes() {
        let mut map = DataCtorsMap::new();
        map.add_data_type(&maybe_decl()).unwrap();

        let mut resolver = SchemeResolver::new();
        map.install(&mut resolver).unwrap();

        let instance = resolver.resolve(loc(), sym("Just")).unwrap();
        // An instantiation of ∀a. a -> Maybe a.
        let a = instance.ftvs();
        assert_eq!(a.len(), 1);

        let expected = {
            let v = Ident::new("a", loc());
            Scheme::new(
                vec![sym("a")],
                ClassPredicates::new(),
                type_arrow(type_variable(v), type_apply(type_id(Ident::new("Maybe", loc())), type_variable(v))),
            )
        };
        assert!(scheme_equality(
            resolver.lookup_scheme(sym("Just")).unwrap(),
            &expected
        ));
    }

    #[test]
    fn test_unparameterized_data_type() {
        let mut map = DataCtorsMap::new();
        let decl = DataTypeDecl {
            name: Ident::new("Color", loc()),
            params: vec![],
            ctors: vec![
                CtorDecl { name: Ident::new("Red", loc()), fields: vec![] },
                CtorDecl { name: Ident::new("Green", loc()), fields: vec![] },
                CtorDecl { name: Ident::new("Blue", loc()), fields: vec![] },
            ],
        };
        map.add_data_type(&decl).unwrap();
        assert_eq!(map.ctor_scheme(loc(), sym("Red")).unwrap().to_string(), "Color");
        assert_eq!(map.ctor_tag(loc(), sym("Blue")).unwrap(), 2);
        assert_eq!(map.type_constructor(sym("Color")).unwrap().repr(), "Color");
    }
}
