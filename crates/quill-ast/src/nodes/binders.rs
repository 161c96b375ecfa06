//! Binder (pattern) node types.

use quill_source::types::SourceAnn;

use super::expressions::NumericLiteral;
use crate::names::{ConstructorName, Ident, ProperName, Qualified};

/// A pattern in a case alternative or on the left-hand side of a value
/// declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum Binder {
    /// The wildcard binder, matching anything and binding nothing.
    Null,
    /// Matches a boolean literal.
    Boolean(bool),
    /// Matches a string literal.
    String(String),
    /// Matches a numeric literal.
    Numeric(NumericLiteral),
    /// Binds a variable.
    Var(Ident),
    /// Matches a data constructor applied to argument binders.
    Constructor {
        /// The constructor to match
        ctor: Qualified<ProperName<ConstructorName>>,
        /// Binders for the constructor's arguments
        args: Vec<Binder>,
    },
    /// Matches an object whose labelled fields match the nested binders.
    Object(Vec<(String, Binder)>),
    /// Matches an array of a fixed length.
    Array(Vec<Binder>),
    /// Matches the head and tail of a non-empty array.
    Cons(Box<Binder>, Box<Binder>),
    /// Binds a name to the value matched by a nested binder (`name@binder`).
    Named(Ident, Box<Binder>),
    /// A binder wrapped with its source annotation.
    Positioned(SourceAnn, Box<Binder>),
}

impl Binder {
    /// Strips position wrappers.
    #[must_use]
    pub fn unwrap_positioned(&self) -> &Self {
        match self {
            Self::Positioned(_, inner) => inner.unwrap_positioned(),
            other => other,
        }
    }
}
