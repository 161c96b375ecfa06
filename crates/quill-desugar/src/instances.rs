//! Lowering of type class instance declarations.
//!
//! An instance becomes a private value binding the instance's name to a
//! dictionary record. Members may reference one another through the
//! dictionary, so the record cannot always be built in one literal: members
//! are scheduled into layers, the first layer forming the initial record
//! and every later layer applying a record update, so each member only
//! reads fields that already hold their final values.

use quill_ast::names::{ClassName, Ident, ModuleName, ProperName, Qualified};
use quill_ast::nodes::{
    Binder,
    CaseAlternative,
    Declaration,
    DoNotationElement,
    Expr,
    GuardedExpr,
    Literal,
    NameKind,
};
use quill_ast::prim;
use quill_ast::traversals::everything_with_context_on_values;
use quill_ast::types::{Constraint, Type};
use rustc_hash::FxHashSet;

use crate::classes::superclass_name;
use crate::error::DesugarError;
use crate::member_map::MemberMap;

/// One instance member on its way into the dictionary: its name, the other
/// members it reads at dictionary scope, and its implementation.
type Member = (Ident, Vec<Ident>, Expr);

/// Builds the dictionary value declaration for an explicit instance.
///
/// `members` must already be case-desugared: plain value declarations with
/// no binders and a single unguarded right-hand side. Any error raised here
/// is wrapped with the instance's class and type arguments as context.
pub(crate) fn type_instance_dictionary(
    member_map: &MemberMap,
    ident: &Ident,
    constraints: &[Constraint],
    class: &Qualified<ProperName<ClassName>>,
    args: &[Type],
    members: Vec<Declaration>,
) -> Result<Declaration, DesugarError> {
    build_dictionary(member_map, ident, constraints, class, args, members).map_err(|source| {
        DesugarError::ErrorInInstance {
            class: class.clone(),
            tys: args.to_vec(),
            source: Box::new(source),
        }
    })
}

fn build_dictionary(
    member_map: &MemberMap,
    ident: &Ident,
    constraints: &[Constraint],
    class: &Qualified<ProperName<ClassName>>,
    args: &[Type],
    members: Vec<Declaration>,
) -> Result<Declaration, DesugarError> {
    let (class_module, class_name) = class.qualify();
    let Some(class_data) = member_map.get(&(class_module.clone(), class_name.clone())) else {
        return Err(DesugarError::UnknownClass { class: class.clone() });
    };

    // The class's member signatures at this instance's types.
    let substitution: Vec<(String, Type)> = class_data
        .params
        .iter()
        .map(|(var, _)| var.clone())
        .zip(args.iter().cloned())
        .collect();
    let member_types: Vec<(Ident, Type)> = class_data
        .members
        .iter()
        .map(|(member, ty)| (member.clone(), ty.substitute(&substitution)))
        .collect();

    // Every class member must be implemented.
    let implemented: FxHashSet<&Ident> = members.iter().filter_map(Declaration::ident).collect();
    if let Some((missing, _)) =
        class_data.members.iter().find(|(member, _)| !implemented.contains(member))
    {
        return Err(DesugarError::MissingClassMember { ident: missing.clone() });
    }

    // ...and nothing else may be.
    let values: Vec<(Ident, Expr)> = members
        .into_iter()
        .map(|decl| member_to_name_and_value(&member_types, decl))
        .collect::<Result<_, DesugarError>>()?;

    let superclass_fields: Vec<(String, Expr)> = class_data
        .constraints
        .iter()
        .enumerate()
        .map(|(index, constraint)| {
            let substituted = constraint.substitute(&substitution);
            (
                superclass_name(&constraint.class, index),
                Expr::Abs {
                    param: Ident::new(prim::UNUSED),
                    body: Box::new(Expr::DeferredDictionary {
                        class: substituted.class,
                        args: substituted.args,
                    }),
                },
            )
        })
        .collect();

    let member_names: FxHashSet<Ident> = values.iter().map(|(name, _)| name.clone()).collect();
    let entries: Vec<Member> = values
        .into_iter()
        .map(|(name, expr)| {
            let deps = immediate_dependencies(class_module, &member_names, &expr);
            (name, deps, expr)
        })
        .collect();

    let dictionary = schedule_dictionary(class, entries, superclass_fields)?;

    let dict_ty = Type::apply_all(
        Type::Constructor(class.clone().map(ProperName::coerce)),
        args.iter().cloned(),
    );
    let instance_ty =
        Type::Constrained(constraints.to_vec(), Box::new(dict_ty)).quantify();

    Ok(Declaration::Value {
        ident: ident.clone(),
        name_kind: NameKind::Private,
        binders: Vec::new(),
        rhs: vec![GuardedExpr::unconditional(Expr::TypedValue {
            check: true,
            expr: Box::new(dictionary),
            ty: instance_ty,
        })],
    })
}

/// Builds the replacement value declaration for a newtype-derived instance:
/// the caller-provided dictionary expression, coerced to the instance type.
/// The expression itself is taken on trust; the type checker sees only the
/// annotation.
pub(crate) fn newtype_instance_value(
    ident: &Ident,
    constraints: &[Constraint],
    class: &Qualified<ProperName<ClassName>>,
    args: &[Type],
    dictionary: Expr,
) -> Declaration {
    let dict_ty = Type::apply_all(
        Type::Constructor(class.clone().map(ProperName::coerce)),
        args.iter().cloned(),
    );
    let instance_ty = if constraints.is_empty() {
        dict_ty
    } else {
        Type::Constrained(constraints.to_vec(), Box::new(dict_ty))
    }
    .quantify();

    Declaration::Value {
        ident: ident.clone(),
        name_kind: NameKind::Private,
        binders: Vec::new(),
        rhs: vec![GuardedExpr::unconditional(Expr::TypedValue {
            check: true,
            expr: Box::new(dictionary),
            ty: instance_ty,
        })],
    }
}

/// Extracts a case-desugared instance member's name and implementation,
/// rejecting members the class does not declare.
///
/// ## Panics
///
/// Panics if the declaration is not a plain value declaration with a single
/// unguarded right-hand side; case desugaring establishes that shape before
/// this runs.
fn member_to_name_and_value(
    member_types: &[(Ident, Type)],
    decl: Declaration,
) -> Result<(Ident, Expr), DesugarError> {
    match decl {
        Declaration::Positioned(_, inner) => member_to_name_and_value(member_types, *inner),
        Declaration::Value { ident, binders, mut rhs, .. } => {
            if !member_types.iter().any(|(member, _)| *member == ident) {
                return Err(DesugarError::ExtraneousClassMember { ident });
            }
            assert!(
                binders.is_empty() && rhs.len() == 1 && rhs[0].guard.is_none(),
                "instance member '{ident}' was not case-desugared"
            );
            let GuardedExpr { expr, .. } = rhs.pop().expect("checked above");
            Ok((ident, expr))
        }
        other => panic!("invalid declaration in type instance body: {other:?}"),
    }
}

/// The other members of this instance that a member's implementation reads
/// at the immediate dictionary scope.
///
/// References under a lambda do not count: they only run once the
/// dictionary exists, so they never constrain construction order. A
/// reference counts when it is a variable qualified to the class's module
/// whose identifier is one of the instance's members.
fn immediate_dependencies(
    class_module: &ModuleName,
    member_names: &FxHashSet<Ident>,
    value: &Expr,
) -> Vec<Ident> {
    let mut fold = everything_with_context_on_values(
        |mut left: Vec<Ident>, mut right: Vec<Ident>| {
            left.append(&mut right);
            left
        },
        |in_scope: bool, _decl: &Declaration| (in_scope, Vec::new()),
        |in_scope: bool, expr: &Expr| match expr {
            Expr::Abs { .. } => (false, Vec::new()),
            Expr::Var(name) if in_scope => match &name.module {
                Some(module) if module == class_module && member_names.contains(&name.item) => {
                    (in_scope, vec![name.item.clone()])
                }
                _ => (in_scope, Vec::new()),
            },
            _ => (in_scope, Vec::new()),
        },
        |in_scope: bool, _binder: &Binder| (in_scope, Vec::new()),
        |in_scope: bool, _alt: &CaseAlternative| (in_scope, Vec::new()),
        |in_scope: bool, _element: &DoNotationElement| (in_scope, Vec::new()),
    );
    fold.expr(true, value)
}

/// Splits the entries whose dependencies are all already provided from
/// those still waiting, preserving order within both halves.
fn add_layer(provided: &FxHashSet<Ident>, entries: Vec<Member>) -> (Vec<Member>, Vec<Member>) {
    entries.into_iter().partition(|(_, deps, _)| deps.iter().all(|dep| provided.contains(dep)))
}

/// Builds the dictionary expression by scheduling members in dependency
/// layers: an initial record literal holding the first layer, the
/// superclass thunks and placeholder slots for everything else, then one
/// record update per later layer.
fn schedule_dictionary(
    class: &Qualified<ProperName<ClassName>>,
    entries: Vec<Member>,
    superclass_fields: Vec<(String, Expr)>,
) -> Result<Expr, DesugarError> {
    let mut provided = FxHashSet::default();

    let (ready, mut remaining) = add_layer(&provided, entries);
    if ready.is_empty() && !remaining.is_empty() {
        return Err(unschedulable(remaining));
    }
    provided.extend(ready.iter().map(|(name, _, _)| name.clone()));

    let mut fields: Vec<(String, Expr)> = Vec::new();
    for (name, _, expr) in ready {
        fields.push((name.as_str().to_owned(), expr));
    }
    fields.extend(superclass_fields);
    for (name, _, _) in &remaining {
        // Overwritten by an update below, once the member is schedulable.
        fields.push((
            name.as_str().to_owned(),
            Expr::Var(Qualified::unqualified(Ident::new(prim::UNDEFINED))),
        ));
    }

    let mut dictionary = Expr::TypeClassDictionaryConstructorApp {
        class: class.clone(),
        dictionary: Box::new(Expr::Literal(Literal::Object(fields))),
    };

    while !remaining.is_empty() {
        let (layer, rest) = add_layer(&provided, remaining);
        if layer.is_empty() {
            return Err(unschedulable(rest));
        }
        log::trace!(
            "instance dictionary layer: {}",
            layer.iter().map(|(name, _, _)| name.as_str()).collect::<Vec<_>>().join(", ")
        );
        provided.extend(layer.iter().map(|(name, _, _)| name.clone()));
        dictionary = Expr::ObjectUpdate {
            record: Box::new(dictionary),
            updates: layer
                .into_iter()
                .map(|(name, _, expr)| (name.as_str().to_owned(), expr))
                .collect(),
        };
        remaining = rest;
    }

    Ok(dictionary)
}

fn unschedulable(entries: Vec<Member>) -> DesugarError {
    DesugarError::OverlappingNamesInLet {
        names: entries.into_iter().map(|(name, _, _)| name).collect(),
    }
}
