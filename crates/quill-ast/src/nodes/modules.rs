//! Modules and export lists.

use quill_source::types::{Comment, SourceSpan};

use super::declarations::Declaration;
use crate::names::{ClassName, ConstructorName, Ident, ModuleName, ProperName, TypeName};

/// One entry in a module's export list (or in an explicit import list).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclarationRef {
    /// A type, optionally with some or all of its constructors.
    Type {
        /// Where the entry was written
        span: SourceSpan,
        /// The exported type
        name: ProperName<TypeName>,
        /// The exported constructors; `None` exports all of them
        constructors: Option<Vec<ProperName<ConstructorName>>>,
    },
    /// An exported value.
    Value {
        /// Where the entry was written
        span: SourceSpan,
        /// The exported value
        ident: Ident,
    },
    /// An exported type class.
    TypeClass {
        /// Where the entry was written
        span: SourceSpan,
        /// The exported class
        name: ProperName<ClassName>,
    },
    /// An exported type class instance.
    TypeInstance {
        /// Where the entry was written, or the generated span for instances
        /// exported by desugaring
        span: SourceSpan,
        /// The exported instance
        ident: Ident,
    },
    /// A module re-export.
    Module {
        /// Where the entry was written
        span: SourceSpan,
        /// The re-exported module
        name: ModuleName,
    },
}

impl DeclarationRef {
    /// Returns true if this entry exports the given type class.
    #[must_use]
    pub fn exports_class(&self, class: &ProperName<ClassName>) -> bool {
        matches!(self, Self::TypeClass { name, .. } if name == class)
    }

    /// Returns true if this entry exports the given type.
    #[must_use]
    pub fn exports_type(&self, ty: &ProperName<TypeName>) -> bool {
        matches!(self, Self::Type { name, .. } if name == ty)
    }
}

/// A parsed module.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    /// The span of the whole module
    pub span: SourceSpan,
    /// Comments preceding the module header
    pub comments: Vec<Comment>,
    /// The module's name
    pub name: ModuleName,
    /// The module's declarations
    pub declarations: Vec<Declaration>,
    /// The export list. `None` only before export elaboration has run;
    /// every later phase requires an explicit list.
    pub exports: Option<Vec<DeclarationRef>>,
}

impl Module {
    /// Creates a module with an elaborated export list.
    #[must_use]
    pub const fn new(
        span: SourceSpan,
        comments: Vec<Comment>,
        name: ModuleName,
        declarations: Vec<Declaration>,
        exports: Vec<DeclarationRef>,
    ) -> Self {
        Self { span, comments, name, declarations, exports: Some(exports) }
    }
}
