//! Persisted module summaries.
//!
//! When a module is compiled, the facts later compilations need (exported
//! values and their types, synonyms, and type classes) are written out as
//! an externs file. Reading externs back is how separate compilation sees
//! across module boundaries without re-parsing source.
//!
//! The driver owns serialization; this crate only defines the record.

use serde::{Deserialize, Serialize};

use crate::names::{ClassName, Ident, ModuleName, ProperName, TypeName};
use crate::nodes::{FunctionalDependency, TypeParameter};
use crate::types::{Constraint, Type};

/// One declaration in a persisted module summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExternsDeclaration {
    /// A type class, with everything needed to desugar its instances in
    /// other modules.
    Class {
        /// The class's name
        name: ProperName<ClassName>,
        /// Its type parameters
        params: Vec<TypeParameter>,
        /// Its member signatures
        members: Vec<(Ident, Type)>,
        /// Its superclass constraints
        constraints: Vec<Constraint>,
        /// Its functional dependencies
        dependencies: Vec<FunctionalDependency>,
    },
    /// An exported value and its type.
    Value {
        /// The exported name
        ident: Ident,
        /// Its type
        ty: Type,
    },
    /// An exported type synonym.
    TypeSynonym {
        /// The synonym's name
        name: ProperName<TypeName>,
        /// Its type parameters
        params: Vec<TypeParameter>,
        /// The type it abbreviates
        body: Type,
    },
}

/// The persisted summary of a previously compiled module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternsFile {
    /// The compiled module's name
    pub module_name: ModuleName,
    /// Its exported declarations
    pub declarations: Vec<ExternsDeclaration>,
}
