//! Export augmentation for synthesized instances.
//!
//! A desugared instance is added to its module's export list only when
//! everything its head mentions is visible to importers: the class itself
//! and every type constructor in the instance's type arguments. A name is
//! visible when another module owns it (imports resolved it, so that module
//! exports it) or when this module's export list carries the matching
//! entry.

use quill_ast::names::{ClassName, Ident, ModuleName, ProperName, Qualified, TypeName};
use quill_ast::nodes::DeclarationRef;
use quill_ast::types::Type;
use quill_source::types::SourceSpan;

/// Computes the export-list entry for a desugared instance, if its class
/// and every type constructor in its type arguments are visible.
pub(crate) fn instance_ref(
    module_name: &ModuleName,
    exports: &[DeclarationRef],
    ident: &Ident,
    class: &Qualified<ProperName<ClassName>>,
    args: &[Type],
) -> Option<DeclarationRef> {
    let class_visible = is_visible(module_name, class, || {
        exports.iter().any(|entry| entry.exports_class(&class.item))
    });
    let args_visible = args.iter().all(|ty| {
        type_constructors(ty).into_iter().all(|ctor| {
            is_visible(module_name, ctor, || {
                exports.iter().any(|entry| entry.exports_type(&ctor.item))
            })
        })
    });

    (class_visible && args_visible).then(|| DeclarationRef::TypeInstance {
        span: SourceSpan::generated(),
        ident: ident.clone(),
    })
}

/// A name owned by another module is always visible here; a local name is
/// visible when the export list says so.
fn is_visible<T>(
    module_name: &ModuleName,
    name: &Qualified<T>,
    exported_locally: impl FnOnce() -> bool,
) -> bool {
    if name.module.is_some() && !name.is_qualified_to(module_name) {
        true
    } else {
        exported_locally()
    }
}

/// All type constructors mentioned anywhere in a type.
fn type_constructors(ty: &Type) -> Vec<&Qualified<ProperName<TypeName>>> {
    ty.everything(
        &mut |mut left, mut right: Vec<_>| {
            left.append(&mut right);
            left
        },
        &mut |ty| match ty {
            Type::Constructor(name) => vec![name],
            _ => Vec::new(),
        },
    )
}
