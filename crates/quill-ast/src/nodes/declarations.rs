//! Declaration node types.

use quill_source::types::SourceAnn;
use serde::{Deserialize, Serialize};

use super::binders::Binder;
use super::expressions::{Expr, GuardedExpr};
use super::modules::DeclarationRef;
use crate::kinds::Kind;
use crate::names::{ClassName, ConstructorName, Ident, ModuleName, ProperName, Qualified, TypeName};
use crate::types::{Constraint, Type};

/// A type parameter: its name and an optional kind annotation.
pub type TypeParameter = (String, Option<Kind>);

/// A data constructor: its name and the types of its fields.
pub type DataConstructor = (ProperName<ConstructorName>, Vec<Type>);

/// How a value-level name was introduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    /// Compiler-introduced; not exported and invisible to imports.
    Private,
    /// Written by the user.
    Public,
    /// A foreign import.
    External,
}

/// Whether a data declaration introduces a `data` type or a `newtype`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataDeclType {
    /// An ordinary algebraic data type.
    Data,
    /// A newtype, with exactly one constructor of one field.
    Newtype,
}

/// Associativity of a user-defined operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Associativity {
    /// Left-associative (`infixl`).
    Left,
    /// Right-associative (`infixr`).
    Right,
    /// Non-associative (`infix`).
    None,
}

/// The fixity of a user-defined operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fixity {
    /// How the operator associates
    pub associativity: Associativity,
    /// The binding precedence
    pub precedence: u32,
}

/// A functional dependency between class parameters, as positions into the
/// class's parameter list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionalDependency {
    /// The parameters that determine
    pub determiners: Vec<usize>,
    /// The parameters they determine
    pub determined: Vec<usize>,
}

/// What an import declaration brings into scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportKind {
    /// Everything the module exports.
    Implicit,
    /// Only the listed names.
    Explicit(Vec<DeclarationRef>),
    /// Everything except the listed names.
    Hiding(Vec<DeclarationRef>),
}

/// The body of a type class instance declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeInstanceBody {
    /// A compiler-derived instance. These are expanded into explicit
    /// instances before type class desugaring runs.
    Derived,
    /// Instance members given explicitly.
    Explicit(Vec<Declaration>),
    /// A newtype-derived instance carrying an opaque, caller-provided
    /// dictionary expression.
    NewtypeWithDictionary(Box<Expr>),
}

/// A top-level or let-bound declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    /// An algebraic data type declaration.
    Data {
        /// `data` or `newtype`
        decl_type: DataDeclType,
        /// The type's name
        name: ProperName<TypeName>,
        /// Its type parameters
        params: Vec<TypeParameter>,
        /// Its constructors
        constructors: Vec<DataConstructor>,
    },
    /// A group of mutually recursive data declarations.
    DataBindingGroup(Vec<Declaration>),
    /// A type synonym and its expansion.
    TypeSynonym {
        /// The synonym's name
        name: ProperName<TypeName>,
        /// Its type parameters
        params: Vec<TypeParameter>,
        /// The type it abbreviates
        body: Type,
    },
    /// A type signature for a value.
    TypeSignature {
        /// The value the signature belongs to
        ident: Ident,
        /// The declared type
        ty: Type,
    },
    /// A value binding.
    Value {
        /// The bound name
        ident: Ident,
        /// How the name was introduced
        name_kind: NameKind,
        /// Binders for the parameters, if written in equation style
        binders: Vec<Binder>,
        /// The guarded right-hand sides
        rhs: Vec<GuardedExpr>,
    },
    /// A group of mutually recursive value bindings.
    BindingGroup(Vec<(Ident, NameKind, Expr)>),
    /// A foreign value import.
    ForeignValue {
        /// The imported name
        ident: Ident,
        /// Its declared type
        ty: Type,
    },
    /// A foreign data type import.
    ForeignData {
        /// The imported type's name
        name: ProperName<TypeName>,
        /// Its declared kind
        kind: Kind,
    },
    /// A foreign type class instance import.
    ForeignInstance {
        /// The instance's name
        ident: Ident,
        /// Constraints on the instance
        constraints: Vec<Constraint>,
        /// The class the instance belongs to
        class: Qualified<ProperName<ClassName>>,
        /// The instance's type arguments
        args: Vec<Type>,
    },
    /// An operator fixity declaration.
    Fixity {
        /// Associativity and precedence
        fixity: Fixity,
        /// The operator
        op: String,
    },
    /// A module import.
    Import {
        /// The imported module
        module: ModuleName,
        /// What the import brings into scope
        kind: ImportKind,
        /// The local alias, for qualified imports
        qualified_as: Option<ModuleName>,
    },
    /// A type class declaration.
    TypeClass {
        /// The class's name
        name: ProperName<ClassName>,
        /// Its type parameters
        params: Vec<TypeParameter>,
        /// Its superclass constraints
        constraints: Vec<Constraint>,
        /// Its functional dependencies
        dependencies: Vec<FunctionalDependency>,
        /// Its member signatures
        members: Vec<Declaration>,
    },
    /// A type class instance declaration.
    TypeInstance {
        /// The instance's name
        ident: Ident,
        /// Constraints the instance requires
        constraints: Vec<Constraint>,
        /// The class the instance belongs to
        class: Qualified<ProperName<ClassName>>,
        /// The instance's type arguments
        args: Vec<Type>,
        /// The instance's body
        body: TypeInstanceBody,
    },
    /// A declaration wrapped with its source annotation.
    Positioned(SourceAnn, Box<Declaration>),
}

impl Declaration {
    /// Strips position wrappers.
    #[must_use]
    pub fn unwrap_positioned(&self) -> &Self {
        match self {
            Self::Positioned(_, inner) => inner.unwrap_positioned(),
            other => other,
        }
    }

    /// Returns true if this is a type class declaration, looking through
    /// position wrappers.
    #[must_use]
    pub fn is_type_class(&self) -> bool {
        matches!(self.unwrap_positioned(), Self::TypeClass { .. })
    }

    /// The identifier a value or type-signature declaration introduces,
    /// looking through position wrappers.
    #[must_use]
    pub fn ident(&self) -> Option<&Ident> {
        match self.unwrap_positioned() {
            Self::Value { ident, .. }
            | Self::TypeSignature { ident, .. }
            | Self::ForeignValue { ident, .. }
            | Self::ForeignInstance { ident, .. }
            | Self::TypeInstance { ident, .. } => Some(ident),
            _ => None,
        }
    }
}
