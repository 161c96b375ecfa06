//! Lowering of type class declarations.
//!
//! A class becomes a record type synonym (the dictionary type) whose
//! fields are the class's members followed by one thunk slot per
//! superclass, plus one private accessor function per member that projects
//! the member's field out of a dictionary.

use quill_ast::names::{ClassName, Ident, ModuleName, ProperName, Qualified};
use quill_ast::nodes::{
    Declaration,
    Expr,
    FunctionalDependency,
    GuardedExpr,
    NameKind,
    TypeParameter,
};
use quill_ast::types::{Constraint, Type};

use crate::member_map::{MemberMap, TypeClassData};

/// The dictionary field storing the superclass at the given position.
///
/// The label only uses the superclass's proper name; the positional index
/// already makes it unique within one dictionary row, and it must stay
/// stable across compilations because externs refer to it.
#[must_use]
pub fn superclass_name(class: &Qualified<ProperName<ClassName>>, index: usize) -> String {
    format!("{}{}", class.item.as_str(), index)
}

/// Records a class in the member map and produces its replacement
/// declarations: the dictionary type synonym and one accessor per member.
///
/// The original class declaration is kept by the caller, so downstream
/// phases can still see superclass relationships and member ownership.
pub(crate) fn desugar_class(
    member_map: &mut MemberMap,
    module_name: &ModuleName,
    name: &ProperName<ClassName>,
    params: &[TypeParameter],
    constraints: &[Constraint],
    dependencies: &[FunctionalDependency],
    members: &[Declaration],
) -> Vec<Declaration> {
    let member_signatures: Vec<(Ident, Type)> =
        members.iter().map(member_to_name_and_type).collect();

    drop(member_map.insert(
        (module_name.clone(), name.clone()),
        TypeClassData {
            params: params.to_vec(),
            members: member_signatures.clone(),
            constraints: constraints.to_vec(),
            dependencies: dependencies.to_vec(),
        },
    ));

    let mut declarations = vec![dictionary_synonym(name, params, constraints, &member_signatures)];
    declarations.extend(
        member_signatures
            .iter()
            .map(|(ident, ty)| member_accessor(module_name, name, params, ident, ty)),
    );
    declarations
}

/// The dictionary type synonym: a record of the member types followed by
/// one `{} -> Superclass args` thunk per superclass constraint.
fn dictionary_synonym(
    name: &ProperName<ClassName>,
    params: &[TypeParameter],
    constraints: &[Constraint],
    members: &[(Ident, Type)],
) -> Declaration {
    let mut fields: Vec<(String, Type)> = members
        .iter()
        .map(|(ident, ty)| (ident.as_str().to_owned(), ty.clone()))
        .collect();

    for (index, constraint) in constraints.iter().enumerate() {
        let superclass = Type::Constructor(constraint.class.clone().map(ProperName::coerce));
        let applied = Type::apply_all(superclass, constraint.args.iter().cloned());
        fields.push((
            superclass_name(&constraint.class, index),
            Type::function(Type::unit_record(), applied),
        ));
    }

    Declaration::TypeSynonym {
        name: name.clone().coerce(),
        params: params.to_vec(),
        body: Type::record_from_fields(fields),
    }
}

/// The accessor for one class member: a private value whose body projects
/// the member out of a dictionary, typed at the member's signature with the
/// class itself added as a leading constraint.
fn member_accessor(
    module_name: &ModuleName,
    class_name: &ProperName<ClassName>,
    params: &[TypeParameter],
    ident: &Ident,
    ty: &Type,
) -> Declaration {
    let class = Qualified::new(module_name.clone(), class_name.clone());
    let class_constraint = Constraint::new(
        class.clone(),
        params.iter().map(|(var, _)| Type::Var(var.clone())).collect(),
    );
    let accessor_ty = Type::Constrained(vec![class_constraint], Box::new(ty.clone()))
        .quantify()
        .move_quantifiers_to_front();

    Declaration::Value {
        ident: ident.clone(),
        name_kind: NameKind::Private,
        binders: Vec::new(),
        rhs: vec![GuardedExpr::unconditional(Expr::TypedValue {
            // The checker would wrap a re-checked accessor in an extra
            // abstraction.
            check: false,
            expr: Box::new(Expr::TypeClassDictionaryAccessor {
                class,
                member: ident.clone(),
            }),
            ty: accessor_ty,
        })],
    }
}

/// Projects a class member declaration to its name and declared type.
///
/// ## Panics
///
/// Panics if the declaration is not a type signature; class bodies contain
/// only member signatures once parsing has run.
pub(crate) fn member_to_name_and_type(decl: &Declaration) -> (Ident, Type) {
    match decl.unwrap_positioned() {
        Declaration::TypeSignature { ident, ty } => (ident.clone(), ty.clone()),
        other => panic!("invalid declaration in type class body: {other:?}"),
    }
}
