//! Desugaring error types and reporting.
//!
//! Recoverable problems in the input program surface as [`DesugarError`];
//! the public entry points aggregate them into [`MultipleErrors`].
//! Violated compiler invariants (derived instances reaching this stage,
//! unqualified names, missing export lists) are bugs, not user errors, and
//! panic instead.

use quill_ast::names::{ClassName, Ident, ProperName, Qualified};
use quill_ast::types::Type;
use quill_source::types::SourceSpan;
use thiserror::Error;

/// Errors raised while desugaring type classes and instances.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DesugarError {
    /// An instance referenced a class this compilation knows nothing about.
    #[error("Unknown type class '{class}'")]
    UnknownClass {
        /// The unresolved class
        class: Qualified<ProperName<ClassName>>,
    },

    /// An instance left out a member its class requires.
    #[error("Member '{ident}' has not been implemented")]
    MissingClassMember {
        /// The missing member
        ident: Ident,
    },

    /// An instance defined a member its class does not declare.
    #[error("'{ident}' is not a member of the type class")]
    ExtraneousClassMember {
        /// The extraneous member
        ident: Ident,
    },

    /// Instance members reference each other in a cycle, so no order exists
    /// in which the dictionary's fields can be constructed.
    #[error("The names {} cannot be defined multiple times in the same binding group", render_names(.names))]
    OverlappingNamesInLet {
        /// The members that could not be scheduled
        names: Vec<Ident>,
    },

    /// Context attached to any error raised while desugaring an instance.
    #[error("Error in type class instance {class}{}: {source}", render_instance_args(.tys))]
    ErrorInInstance {
        /// The instance's class
        class: Qualified<ProperName<ClassName>>,
        /// The instance's type arguments
        tys: Vec<Type>,
        /// The underlying error
        source: Box<DesugarError>,
    },

    /// Context attaching the position of the declaration being desugared.
    #[error("at {span}: {source}")]
    WithPosition {
        /// The position of the offending declaration
        span: SourceSpan,
        /// The underlying error
        source: Box<DesugarError>,
    },
}

impl DesugarError {
    /// Strips context wrappers, returning the error that started the
    /// failure.
    #[must_use]
    pub fn unwrap_context(&self) -> &Self {
        match self {
            Self::ErrorInInstance { source, .. } | Self::WithPosition { source, .. } => {
                source.unwrap_context()
            }
            other => other,
        }
    }
}

fn render_names(names: &[Ident]) -> String {
    names.iter().map(|n| format!("'{n}'")).collect::<Vec<_>>().join(", ")
}

fn render_instance_args(tys: &[Type]) -> String {
    tys.iter().map(|ty| format!(" {ty}")).collect::<String>()
}

/// The collection of errors produced by a failed desugaring run.
///
/// The pass fails fast, so at most one error per module survives, but the
/// aggregate shape matches what the driver reports to users.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", render_errors(.errors))]
pub struct MultipleErrors {
    errors: Vec<DesugarError>,
}

impl MultipleErrors {
    /// Wraps a single error.
    #[must_use]
    pub fn of(error: DesugarError) -> Self { Self { errors: vec![error] } }

    /// The collected errors, in the order they were raised.
    #[must_use]
    pub fn errors(&self) -> &[DesugarError] { &self.errors }
}

fn render_errors(errors: &[DesugarError]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n")
}

impl From<DesugarError> for MultipleErrors {
    fn from(error: DesugarError) -> Self { Self::of(error) }
}
