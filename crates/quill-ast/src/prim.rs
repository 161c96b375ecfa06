//! Names reserved by the compiler under the `Prim` module.
//!
//! `Prim` is implicitly imported into every module and cannot be shadowed.
//! It owns the built-in type constructors and the handful of identifiers
//! that desugaring is allowed to synthesize references to.

use crate::names::{ClassName, ModuleName, ProperName, Qualified, TypeName};

/// The name of the reserved primitive module.
pub const PRIM: &str = "Prim";

/// The identifier used for parameters introduced by desugaring that nothing
/// reads.
pub const UNUSED: &str = "__unused";

/// The identifier standing in for record fields whose values are filled in
/// by a later update.
pub const UNDEFINED: &str = "undefined";

/// The reserved `Prim` module name.
#[must_use]
pub fn module() -> ModuleName { ModuleName::from_dotted(PRIM) }

/// `Prim.Function`, the constructor of function types.
#[must_use]
pub fn function() -> Qualified<ProperName<TypeName>> {
    Qualified::new(module(), ProperName::new("Function"))
}

/// `Prim.Partial`, the class tracking partiality, solved by the
/// exhaustivity checker rather than by instance lookup.
#[must_use]
pub fn partial() -> Qualified<ProperName<ClassName>> {
    Qualified::new(module(), ProperName::new("Partial"))
}
