//! Names and qualified names.
//!
//! Quill distinguishes three categories of names. Identifiers name ordinary
//! values. Proper names (upper-case in the surface syntax) name types, type
//! classes, data constructors and module segments; they are tagged at the
//! type level with the kind of entity they refer to, so a class name cannot
//! be passed where a type name is expected. Qualified names pair a name with
//! the module that owns it.

use std::fmt;
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

/// An identifier naming an ordinary value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ident(String);

impl Ident {
    /// Creates a new identifier.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self { Self(name.into()) }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

impl From<&str> for Ident {
    fn from(name: &str) -> Self { Self::new(name) }
}

/// Tag for proper names that refer to type classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassName;

/// Tag for proper names that refer to types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeName;

/// Tag for proper names that refer to data constructors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConstructorName;

/// Tag for proper names that are module name segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Namespace;

/// An upper-case name, tagged with the kind of entity it refers to.
///
/// The tag is phantom: it exists only at the type level, so reinterpreting a
/// name under another tag (via [`ProperName::coerce`]) is free. The one
/// place that needs this is dictionary synonym generation, where a class
/// name becomes the name of a type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProperName<K> {
    name: String,
    #[serde(skip)]
    _tag: PhantomData<K>,
}

impl<K> ProperName<K> {
    /// Creates a new proper name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self { Self { name: name.into(), _tag: PhantomData } }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str { &self.name }

    /// Reinterprets this name under a different tag.
    #[must_use]
    pub fn coerce<K2>(self) -> ProperName<K2> { ProperName { name: self.name, _tag: PhantomData } }
}

impl<K> fmt::Display for ProperName<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.name) }
}

/// A module name: a non-empty sequence of proper-name segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModuleName(Vec<ProperName<Namespace>>);

impl ModuleName {
    /// Creates a module name from its segments.
    ///
    /// ## Panics
    ///
    /// Panics if no segments are given; module names are never empty.
    #[must_use]
    pub fn new(segments: Vec<ProperName<Namespace>>) -> Self {
        assert!(!segments.is_empty(), "module names must have at least one segment");
        Self(segments)
    }

    /// Parses a dotted module name such as `Data.Functor`.
    ///
    /// ## Panics
    ///
    /// Panics if the name is empty.
    #[must_use]
    pub fn from_dotted(name: &str) -> Self {
        Self::new(name.split('.').map(ProperName::new).collect())
    }

    /// Returns the segments of this module name.
    #[must_use]
    pub fn segments(&self) -> &[ProperName<Namespace>] { &self.0 }
}

impl fmt::Display for ModuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

/// A name, optionally qualified by the module that owns it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Qualified<T> {
    /// The owning module, if the name is qualified
    pub module: Option<ModuleName>,
    /// The name itself
    pub item: T,
}

impl<T> Qualified<T> {
    /// Creates a name qualified by the given module.
    #[must_use]
    pub const fn new(module: ModuleName, item: T) -> Self { Self { module: Some(module), item } }

    /// Creates an unqualified name.
    #[must_use]
    pub const fn unqualified(item: T) -> Self { Self { module: None, item } }

    /// Applies a function to the name, keeping the qualifier.
    #[must_use]
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Qualified<U> {
        Qualified { module: self.module, item: f(self.item) }
    }

    /// Returns true if this name is owned by the given module.
    #[must_use]
    pub fn is_qualified_to(&self, module: &ModuleName) -> bool {
        self.module.as_ref() == Some(module)
    }
}

impl<T: fmt::Display> Qualified<T> {
    /// Splits a qualified name into its owning module and the name itself.
    ///
    /// ## Panics
    ///
    /// Panics if the name is unqualified: every name reaching the desugaring
    /// stage has been fully qualified by name resolution, so an unqualified
    /// name here is a compiler bug.
    #[must_use]
    pub fn qualify(&self) -> (&ModuleName, &T) {
        match &self.module {
            Some(module) => (module, &self.item),
            None => panic!("name '{}' was not qualified during name resolution", self.item),
        }
    }
}

impl<T: fmt::Display> fmt::Display for Qualified<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.module {
            Some(module) => write!(f, "{}.{}", module, self.item),
            None => write!(f, "{}", self.item),
        }
    }
}
