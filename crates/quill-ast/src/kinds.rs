//! The kind language classifying types.

use serde::{Deserialize, Serialize};

/// The kind of a type.
///
/// Kinds are checked elsewhere in the pipeline; the desugaring phases only
/// store and compare them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kind {
    /// The kind of ordinary types.
    Star,
    /// The kind of rows whose elements have the given kind.
    Row(Box<Kind>),
    /// The kind of type constructors.
    FunKind(Box<Kind>, Box<Kind>),
    /// An unknown kind, solved during kind checking.
    KindVar(String),
}
