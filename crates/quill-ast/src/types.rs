//! The type language and operations over it.
//!
//! Types appear in signatures, synonyms, data constructor fields and the
//! annotations desugaring synthesizes. Record types are built from rows:
//! an ordered sequence of labelled fields closed by the empty row.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::names::{ClassName, ProperName, Qualified, TypeName};
use crate::prim;

/// Extra data attached to a constraint by the exhaustivity checker to
/// direct how a `Prim.Partial` constraint is solved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConstraintData {
    /// The binders still uncovered by a partial pattern match.
    Partial {
        /// Textual renderings of the uncovered binders
        binders: Vec<Vec<String>>,
        /// Whether the list of binders was truncated
        truncated: bool,
    },
}

/// A constraint: a class applied to type arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Constraint {
    /// The constrained class
    pub class: Qualified<ProperName<ClassName>>,
    /// The type arguments the class is applied to
    pub args: Vec<Type>,
    /// Optional data used to solve the constraint
    pub data: Option<ConstraintData>,
}

impl Constraint {
    /// Creates a constraint with no solving data.
    #[must_use]
    pub const fn new(class: Qualified<ProperName<ClassName>>, args: Vec<Type>) -> Self {
        Self { class, args, data: None }
    }

    /// Substitutes type variables in the constraint's arguments.
    #[must_use]
    pub fn substitute(&self, substitutions: &[(String, Type)]) -> Self {
        Self {
            class: self.class.clone(),
            args: self.args.iter().map(|ty| ty.substitute(substitutions)).collect(),
            data: self.data.clone(),
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.class)?;
        for arg in &self.args {
            write!(f, " {}", Atom(arg))?;
        }
        Ok(())
    }
}

/// A type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    /// A type variable.
    Var(String),
    /// A named type constructor.
    Constructor(Qualified<ProperName<TypeName>>),
    /// An application of one type to another.
    App(Box<Type>, Box<Type>),
    /// A type constrained by a (possibly empty) list of class constraints.
    Constrained(Vec<Constraint>, Box<Type>),
    /// A non-empty row: a labelled field and the rest of the row.
    RowCons(String, Box<Type>, Box<Type>),
    /// The empty row.
    RowEmpty,
    /// A record over the given row.
    Record(Box<Type>),
    /// Universal quantification over one type variable.
    ForAll(String, Box<Type>),
}

impl Type {
    /// Applies a constructor type to a sequence of arguments.
    #[must_use]
    pub fn apply_all(ctor: Self, args: impl IntoIterator<Item = Self>) -> Self {
        args.into_iter().fold(ctor, |f, arg| Self::App(Box::new(f), Box::new(arg)))
    }

    /// The function type from `from` to `to`.
    #[must_use]
    pub fn function(from: Self, to: Self) -> Self {
        Self::apply_all(Self::Constructor(prim::function()), [from, to])
    }

    /// Builds a row from labelled fields and a tail.
    #[must_use]
    pub fn row_from_fields(fields: Vec<(String, Self)>, tail: Self) -> Self {
        fields
            .into_iter()
            .rev()
            .fold(tail, |rest, (label, ty)| Self::RowCons(label, Box::new(ty), Box::new(rest)))
    }

    /// A record type over the given labelled fields, with a closed row.
    #[must_use]
    pub fn record_from_fields(fields: Vec<(String, Self)>) -> Self {
        Self::Record(Box::new(Self::row_from_fields(fields, Self::RowEmpty)))
    }

    /// The empty record type `{}`.
    #[must_use]
    pub fn unit_record() -> Self { Self::Record(Box::new(Self::RowEmpty)) }

    /// Substitutes named type variables, respecting `forall` shadowing: a
    /// variable bound by an inner quantifier is never replaced.
    #[must_use]
    pub fn substitute(&self, substitutions: &[(String, Self)]) -> Self {
        match self {
            Self::Var(name) => substitutions
                .iter()
                .find(|(var, _)| var == name)
                .map_or_else(|| self.clone(), |(_, ty)| ty.clone()),
            Self::Constructor(_) | Self::RowEmpty => self.clone(),
            Self::App(func, arg) => Self::App(
                Box::new(func.substitute(substitutions)),
                Box::new(arg.substitute(substitutions)),
            ),
            Self::Constrained(constraints, body) => Self::Constrained(
                constraints.iter().map(|c| c.substitute(substitutions)).collect(),
                Box::new(body.substitute(substitutions)),
            ),
            Self::RowCons(label, ty, rest) => Self::RowCons(
                label.clone(),
                Box::new(ty.substitute(substitutions)),
                Box::new(rest.substitute(substitutions)),
            ),
            Self::Record(row) => Self::Record(Box::new(row.substitute(substitutions))),
            Self::ForAll(var, body) => {
                if substitutions.iter().any(|(name, _)| name == var) {
                    let remaining: Vec<(String, Self)> = substitutions
                        .iter()
                        .filter(|(name, _)| name != var)
                        .cloned()
                        .collect();
                    Self::ForAll(var.clone(), Box::new(body.substitute(&remaining)))
                } else {
                    Self::ForAll(var.clone(), Box::new(body.substitute(substitutions)))
                }
            }
        }
    }

    /// A left-to-right fold over this type and every type nested inside it,
    /// including constraint arguments.
    pub fn everything<'a, R>(
        &'a self,
        combine: &mut impl FnMut(R, R) -> R,
        f: &mut impl FnMut(&'a Self) -> R,
    ) -> R {
        let mut acc = f(self);
        match self {
            Self::Var(_) | Self::Constructor(_) | Self::RowEmpty => {}
            Self::App(func, arg) => {
                let sub = func.everything(combine, f);
                acc = combine(acc, sub);
                let sub = arg.everything(combine, f);
                acc = combine(acc, sub);
            }
            Self::Constrained(constraints, body) => {
                for constraint in constraints {
                    for arg in &constraint.args {
                        let sub = arg.everything(combine, f);
                        acc = combine(acc, sub);
                    }
                }
                let sub = body.everything(combine, f);
                acc = combine(acc, sub);
            }
            Self::RowCons(_, ty, rest) => {
                let sub = ty.everything(combine, f);
                acc = combine(acc, sub);
                let sub = rest.everything(combine, f);
                acc = combine(acc, sub);
            }
            Self::Record(row) => {
                let sub = row.everything(combine, f);
                acc = combine(acc, sub);
            }
            Self::ForAll(_, body) => {
                let sub = body.everything(combine, f);
                acc = combine(acc, sub);
            }
        }
        acc
    }

    /// Every type variable mentioned in this type, in first-occurrence
    /// order, without duplicates.
    #[must_use]
    pub fn used_type_variables(&self) -> Vec<String> {
        let mut vars: Vec<String> = Vec::new();
        let all = self.everything(
            &mut |mut left: Vec<String>, mut right| {
                left.append(&mut right);
                left
            },
            &mut |ty| match ty {
                Self::Var(name) => vec![name.clone()],
                _ => Vec::new(),
            },
        );
        for var in all {
            if !vars.contains(&var) {
                vars.push(var);
            }
        }
        vars
    }

    /// Universally quantifies every type variable used in this type, the
    /// first-mentioned variable outermost.
    #[must_use]
    pub fn quantify(self) -> Self {
        let vars = self.used_type_variables();
        vars.into_iter().rev().fold(self, |ty, var| Self::ForAll(var, Box::new(ty)))
    }

    /// Lifts nested quantifiers and constraints to the front of the type:
    /// all quantifiers outermost, then all constraints, then the body.
    #[must_use]
    pub fn move_quantifiers_to_front(self) -> Self {
        fn strip(
            vars: &mut Vec<String>,
            constraints: &mut Vec<Vec<Constraint>>,
            ty: Type,
        ) -> Type {
            match ty {
                Type::ForAll(var, body) => {
                    vars.push(var);
                    strip(vars, constraints, *body)
                }
                Type::Constrained(cs, body) => {
                    constraints.push(cs);
                    strip(vars, constraints, *body)
                }
                other => other,
            }
        }

        let mut vars = Vec::new();
        let mut constraints = Vec::new();
        let body = strip(&mut vars, &mut constraints, self);
        let constrained = constraints
            .into_iter()
            .rev()
            .fold(body, |ty, cs| Self::Constrained(cs, Box::new(ty)));
        vars.into_iter().rev().fold(constrained, |ty, var| Self::ForAll(var, Box::new(ty)))
    }

    /// Splits `Prim.Function` applications into argument and result.
    fn as_function(&self) -> Option<(&Self, &Self)> {
        if let Self::App(outer, result) = self
            && let Self::App(ctor, arg) = outer.as_ref()
            && let Self::Constructor(name) = ctor.as_ref()
            && *name == prim::function()
        {
            return Some((arg, result));
        }
        None
    }
}

/// Renders a type with parentheses when it would not parse as an atom.
struct Atom<'a>(&'a Type);

impl fmt::Display for Atom<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Type::Var(_) | Type::Constructor(_) | Type::Record(_) | Type::RowEmpty => {
                write!(f, "{}", self.0)
            }
            _ => write!(f, "({})", self.0),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Var(name) => write!(f, "{name}"),
            Self::Constructor(name) => write!(f, "{name}"),
            Self::App(func, arg) => match self.as_function() {
                Some((from, to)) => write!(f, "{} -> {}", Atom(from), to),
                None => write!(f, "{} {}", func, Atom(arg)),
            },
            Self::Constrained(constraints, body) => {
                match constraints.as_slice() {
                    [] => write!(f, "()")?,
                    [constraint] => write!(f, "{constraint}")?,
                    many => {
                        write!(f, "(")?;
                        for (i, constraint) in many.iter().enumerate() {
                            if i > 0 {
                                write!(f, ", ")?;
                            }
                            write!(f, "{constraint}")?;
                        }
                        write!(f, ")")?;
                    }
                }
                write!(f, " => {body}")
            }
            Self::RowCons(..) => {
                write!(f, "( ")?;
                fmt_row(self, f)?;
                write!(f, " )")
            }
            Self::RowEmpty => write!(f, "()"),
            Self::Record(row) => match row.as_ref() {
                Self::RowEmpty => write!(f, "{{}}"),
                row => {
                    write!(f, "{{ ")?;
                    fmt_row(row, f)?;
                    write!(f, " }}")
                }
            },
            Self::ForAll(..) => {
                write!(f, "forall")?;
                let mut body = self;
                while let Self::ForAll(var, inner) = body {
                    write!(f, " {var}")?;
                    body = inner;
                }
                write!(f, ". {body}")
            }
        }
    }
}

/// Renders the fields of a row, followed by `| tail` for open rows.
fn fmt_row(mut row: &Type, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut first = true;
    loop {
        match row {
            Type::RowCons(label, ty, rest) => {
                if !first {
                    write!(f, ", ")?;
                }
                first = false;
                write!(f, "{label} :: {ty}")?;
                row = rest;
            }
            Type::RowEmpty => return Ok(()),
            tail => return write!(f, " | {tail}"),
        }
    }
}
