//! Type class desugaring for the Quill compiler.
//!
//! This crate lowers type class and instance declarations into ordinary
//! record-valued definitions, so that no later phase needs to know type
//! classes exist:
//!
//! - each class becomes a record type synonym (its dictionary type) plus
//!   one accessor function per member;
//! - each instance becomes a value declaration constructing a dictionary
//!   record, with members scheduled in dependency order;
//! - instances whose class and head types are visible from the module's
//!   export list are appended to that list.
//!
//! ## Architecture
//!
//! - **Member map** ([`member_map`]): class metadata, seeded from the
//!   primitive classes and previously compiled externs
//! - **Class lowering**: dictionary synonyms and member accessors
//! - **Instance lowering**: dictionary synthesis and member scheduling
//! - **Error handling** ([`error`]): the desugaring error types
//! - **Name supply** ([`supply`]): fresh identifiers for collaborator phases
//!
//! The pass is a pure, deterministic transformation: one member map and one
//! name supply are threaded through the modules in order, and the first
//! error aborts the module being transformed.

pub mod error;
pub mod member_map;
pub mod supply;

mod classes;
mod exports;
mod instances;

use quill_ast::externs::ExternsFile;
use quill_ast::names::ModuleName;
use quill_ast::nodes::{Declaration, DeclarationRef, Module, TypeInstanceBody};

pub use classes::superclass_name;

use crate::error::{DesugarError, MultipleErrors};
use crate::member_map::{MemberMap, initial_member_map};
use crate::supply::NameSupply;

/// The case-declaration desugarer, supplied by the caller.
///
/// It lowers guarded equations and multi-binder value declarations into
/// plain value declarations with a single unguarded right-hand side; this
/// pass only schedules its use on instance members and never inspects how
/// it works.
pub type CaseDesugar =
    fn(&mut NameSupply, Vec<Declaration>) -> Result<Vec<Declaration>, DesugarError>;

/// The state threaded through type class desugaring: accumulated class
/// metadata, the fresh name supply, and the case desugarer collaborator.
#[derive(Debug)]
pub struct TypeClassDesugarer {
    member_map: MemberMap,
    supply: NameSupply,
    desugar_cases: CaseDesugar,
}

impl TypeClassDesugarer {
    /// Creates a desugarer whose member map holds the primitive classes and
    /// the classes of the given previously compiled modules.
    #[must_use]
    pub fn new(externs: &[ExternsFile], desugar_cases: CaseDesugar) -> Self {
        Self { member_map: initial_member_map(externs), supply: NameSupply::new(), desugar_cases }
    }

    /// Read access to the accumulated class metadata.
    #[must_use]
    pub const fn member_map(&self) -> &MemberMap { &self.member_map }

    /// Desugars every module in order, threading class metadata across
    /// modules so instances can see classes declared earlier in the batch.
    ///
    /// ## Errors
    ///
    /// Returns the first error raised while transforming a module; that
    /// module's transformation is aborted.
    pub fn desugar_modules(&mut self, modules: Vec<Module>) -> Result<Vec<Module>, MultipleErrors> {
        modules
            .into_iter()
            .map(|module| self.desugar_module(module).map_err(MultipleErrors::of))
            .collect()
    }

    /// Desugars one module.
    ///
    /// ## Errors
    ///
    /// Returns the first error raised by an instance in the module.
    ///
    /// ## Panics
    ///
    /// Panics if the module's export list has not been elaborated; export
    /// elaboration runs before this pass.
    pub fn desugar_module(&mut self, module: Module) -> Result<Module, DesugarError> {
        let Module { span, comments, name, mut declarations, exports } = module;
        let Some(mut exports) = exports else {
            panic!("exports should have been elaborated before type class desugaring")
        };
        log::debug!("desugaring type classes in module {name}");

        // Instances may precede their class in the source, but class
        // metadata has to be recorded before any instance is reached. The
        // sort is stable, so declarations otherwise keep their order.
        declarations.sort_by_key(|decl| !decl.is_type_class());

        let mut new_refs = Vec::new();
        let mut desugared = Vec::with_capacity(declarations.len());
        for declaration in declarations {
            let (new_ref, mut replacements) =
                self.desugar_declaration(&name, &exports, declaration)?;
            new_refs.extend(new_ref);
            desugared.append(&mut replacements);
        }
        exports.extend(new_refs);

        Ok(Module { span, comments, name, declarations: desugared, exports: Some(exports) })
    }

    /// Desugars one declaration, returning an optional new export entry and
    /// the declarations replacing it.
    ///
    /// ## Panics
    ///
    /// Panics on derived instance bodies; derived instances are expanded
    /// into explicit ones before this pass runs.
    fn desugar_declaration(
        &mut self,
        module_name: &ModuleName,
        exports: &[DeclarationRef],
        declaration: Declaration,
    ) -> Result<(Option<DeclarationRef>, Vec<Declaration>), DesugarError> {
        match declaration {
            Declaration::TypeClass { name, params, constraints, dependencies, members } => {
                let derived = classes::desugar_class(
                    &mut self.member_map,
                    module_name,
                    &name,
                    &params,
                    &constraints,
                    &dependencies,
                    &members,
                );
                let mut replacements = vec![Declaration::TypeClass {
                    name,
                    params,
                    constraints,
                    dependencies,
                    members,
                }];
                replacements.extend(derived);
                Ok((None, replacements))
            }
            Declaration::TypeInstance { ident, constraints, class, args, body } => match body {
                TypeInstanceBody::Derived => {
                    panic!("derived instances should have been desugared before this pass")
                }
                TypeInstanceBody::Explicit(members) => {
                    let desugared_members = (self.desugar_cases)(&mut self.supply, members.clone())?;
                    let dictionary = instances::type_instance_dictionary(
                        &self.member_map,
                        &ident,
                        &constraints,
                        &class,
                        &args,
                        desugared_members,
                    )?;
                    let new_ref = exports::instance_ref(module_name, exports, &ident, &class, &args);
                    let original = Declaration::TypeInstance {
                        ident,
                        constraints,
                        class,
                        args,
                        body: TypeInstanceBody::Explicit(members),
                    };
                    Ok((new_ref, vec![original, dictionary]))
                }
                TypeInstanceBody::NewtypeWithDictionary(dictionary) => {
                    let value = instances::newtype_instance_value(
                        &ident,
                        &constraints,
                        &class,
                        &args,
                        (*dictionary).clone(),
                    );
                    let new_ref = exports::instance_ref(module_name, exports, &ident, &class, &args);
                    let original = Declaration::TypeInstance {
                        ident,
                        constraints,
                        class,
                        args,
                        body: TypeInstanceBody::NewtypeWithDictionary(dictionary),
                    };
                    Ok((new_ref, vec![original, value]))
                }
            },
            Declaration::Positioned(ann, inner) => {
                let (new_ref, replacements) = self
                    .desugar_declaration(module_name, exports, *inner)
                    .map_err(|source| DesugarError::WithPosition {
                        span: ann.span,
                        source: Box::new(source),
                    })?;
                Ok((
                    new_ref,
                    replacements
                        .into_iter()
                        .map(|decl| Declaration::Positioned(ann.clone(), Box::new(decl)))
                        .collect(),
                ))
            }
            other => Ok((None, vec![other])),
        }
    }
}

/// Desugars type classes across a batch of modules, given the externs of
/// previously compiled modules and the case desugarer collaborator.
///
/// ## Errors
///
/// Returns the errors of the first module whose transformation failed.
pub fn desugar_type_classes(
    externs: &[ExternsFile],
    modules: Vec<Module>,
    desugar_cases: CaseDesugar,
) -> Result<Vec<Module>, MultipleErrors> {
    TypeClassDesugarer::new(externs, desugar_cases).desugar_modules(modules)
}
