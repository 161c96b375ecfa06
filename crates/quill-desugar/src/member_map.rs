//! Class metadata and the symbol table the pass threads through modules.

use quill_ast::externs::{ExternsDeclaration, ExternsFile};
use quill_ast::names::{ClassName, Ident, ModuleName, ProperName};
use quill_ast::nodes::{FunctionalDependency, TypeParameter};
use quill_ast::prim;
use quill_ast::types::{Constraint, Type};
use rustc_hash::FxHashMap;

/// Everything the pass needs to know about one type class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeClassData {
    /// The class's type parameters
    pub params: Vec<TypeParameter>,
    /// The class's member signatures
    pub members: Vec<(Ident, Type)>,
    /// The class's superclass constraints
    pub constraints: Vec<Constraint>,
    /// The class's functional dependencies
    pub dependencies: Vec<FunctionalDependency>,
}

/// Class metadata for every class visible to the pass, keyed by the owning
/// module and the class name.
pub type MemberMap = FxHashMap<(ModuleName, ProperName<ClassName>), TypeClassData>;

/// The classes baked into the compiler under the reserved `Prim` module.
fn primitive_classes() -> MemberMap {
    let mut map = MemberMap::default();
    drop(map.insert(
        (prim::module(), prim::partial().item),
        TypeClassData {
            params: Vec::new(),
            members: Vec::new(),
            constraints: Vec::new(),
            dependencies: Vec::new(),
        },
    ));
    map
}

/// Builds the initial member map from the primitive classes and the class
/// declarations of previously compiled modules.
///
/// Externs entries override primitive entries with the same key; the order
/// of the externs themselves does not matter, since each module's classes
/// are keyed under its own name.
#[must_use]
pub fn initial_member_map(externs: &[ExternsFile]) -> MemberMap {
    let mut map = primitive_classes();
    for file in externs {
        for decl in &file.declarations {
            if let ExternsDeclaration::Class { name, params, members, constraints, dependencies } =
                decl
            {
                drop(map.insert(
                    (file.module_name.clone(), name.clone()),
                    TypeClassData {
                        params: params.clone(),
                        members: members.clone(),
                        constraints: constraints.clone(),
                        dependencies: dependencies.clone(),
                    },
                ));
            }
        }
    }
    map
}
