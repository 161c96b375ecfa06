//! Generic traversals over the declaration / expression / binder family.
//!
//! The AST is a family of mutually recursive sum types, and almost every
//! desugaring phase is "rewrite or summarize some nodes, leave the rest
//! alone". The combinators here capture that shape once, so passes only
//! supply per-node functions:
//!
//! - [`everywhere_on_values`]: total bottom-up rewrite
//! - [`everywhere_on_values_top_down_m`]: fallible top-down rewrite
//! - [`everything_on_values`]: left-to-right monoidal fold
//! - [`everything_with_context_on_values`]: fold threading a context downward
//! - [`accum_types`]: fold over every type mentioned in the tree
//!
//! All traversals visit children in source order and never reorder
//! siblings.

use std::marker::PhantomData;

use crate::nodes::{
    Binder,
    CaseAlternative,
    Declaration,
    DoNotationElement,
    Expr,
    GuardedExpr,
    Literal,
    TypeInstanceBody,
};
use crate::types::Type;

/// Applies a fallible function to the first component of a pair.
pub fn map_fst<A, B, C, E>(pair: (A, B), f: impl FnOnce(A) -> Result<C, E>) -> Result<(C, B), E> {
    Ok((f(pair.0)?, pair.1))
}

/// Applies a fallible function to the second component of a pair.
pub fn map_snd<A, B, C, E>(pair: (A, B), f: impl FnOnce(B) -> Result<C, E>) -> Result<(A, C), E> {
    Ok((pair.0, f(pair.1)?))
}

/// Applies a fallible function under an `Option`.
pub fn map_opt<T, U, E>(
    value: Option<T>,
    f: impl FnOnce(T) -> Result<U, E>,
) -> Result<Option<U>, E> {
    value.map(f).transpose()
}

// ============================================================================
// Bottom-up rewriting
// ============================================================================

/// A total bottom-up rewrite of declarations, expressions and binders.
///
/// Children are rebuilt first; the per-node function then runs on the
/// rebuilt node. Rewriting with the identity on all three node kinds
/// returns the input unchanged.
#[derive(Debug)]
pub struct EverywhereOnValues<FD, FE, FB> {
    on_declaration: FD,
    on_expr: FE,
    on_binder: FB,
}

/// Builds a bottom-up rewrite from per-node functions.
pub fn everywhere_on_values<FD, FE, FB>(
    on_declaration: FD,
    on_expr: FE,
    on_binder: FB,
) -> EverywhereOnValues<FD, FE, FB>
where
    FD: FnMut(Declaration) -> Declaration,
    FE: FnMut(Expr) -> Expr,
    FB: FnMut(Binder) -> Binder,
{
    EverywhereOnValues { on_declaration, on_expr, on_binder }
}

impl<FD, FE, FB> EverywhereOnValues<FD, FE, FB>
where
    FD: FnMut(Declaration) -> Declaration,
    FE: FnMut(Expr) -> Expr,
    FB: FnMut(Binder) -> Binder,
{
    /// Rewrites a declaration and everything under it.
    pub fn declaration(&mut self, decl: Declaration) -> Declaration {
        let decl = match decl {
            Declaration::DataBindingGroup(decls) => Declaration::DataBindingGroup(
                decls.into_iter().map(|d| self.declaration(d)).collect(),
            ),
            Declaration::Value { ident, name_kind, binders, rhs } => Declaration::Value {
                ident,
                name_kind,
                binders: binders.into_iter().map(|b| self.binder(b)).collect(),
                rhs: rhs.into_iter().map(|g| self.guarded(g)).collect(),
            },
            Declaration::BindingGroup(bindings) => Declaration::BindingGroup(
                bindings.into_iter().map(|(ident, kind, expr)| (ident, kind, self.expr(expr))).collect(),
            ),
            Declaration::TypeClass { name, params, constraints, dependencies, members } => {
                Declaration::TypeClass {
                    name,
                    params,
                    constraints,
                    dependencies,
                    members: members.into_iter().map(|d| self.declaration(d)).collect(),
                }
            }
            Declaration::TypeInstance { ident, constraints, class, args, body } => {
                Declaration::TypeInstance {
                    ident,
                    constraints,
                    class,
                    args,
                    body: match body {
                        TypeInstanceBody::Explicit(members) => TypeInstanceBody::Explicit(
                            members.into_iter().map(|d| self.declaration(d)).collect(),
                        ),
                        opaque => opaque,
                    },
                }
            }
            Declaration::Positioned(ann, inner) => {
                Declaration::Positioned(ann, Box::new(self.declaration(*inner)))
            }
            other => other,
        };
        (self.on_declaration)(decl)
    }

    /// Rewrites an expression and everything under it.
    pub fn expr(&mut self, expr: Expr) -> Expr {
        let expr = match expr {
            Expr::Literal(lit) => Expr::Literal(self.literal(lit)),
            Expr::UnaryMinus(inner) => Expr::UnaryMinus(Box::new(self.expr(*inner))),
            Expr::BinaryNoParens { op, left, right } => Expr::BinaryNoParens {
                op,
                left: Box::new(self.expr(*left)),
                right: Box::new(self.expr(*right)),
            },
            Expr::Parens(inner) => Expr::Parens(Box::new(self.expr(*inner))),
            Expr::Accessor { field, record } => {
                Expr::Accessor { field, record: Box::new(self.expr(*record)) }
            }
            Expr::ObjectUpdate { record, updates } => Expr::ObjectUpdate {
                record: Box::new(self.expr(*record)),
                updates: updates.into_iter().map(|(label, e)| (label, self.expr(e))).collect(),
            },
            Expr::Abs { param, body } => Expr::Abs { param, body: Box::new(self.expr(*body)) },
            Expr::App(func, arg) => {
                Expr::App(Box::new(self.expr(*func)), Box::new(self.expr(*arg)))
            }
            Expr::IfThenElse(cond, then, otherwise) => Expr::IfThenElse(
                Box::new(self.expr(*cond)),
                Box::new(self.expr(*then)),
                Box::new(self.expr(*otherwise)),
            ),
            Expr::Case { scrutinees, alternatives } => Expr::Case {
                scrutinees: scrutinees.into_iter().map(|e| self.expr(e)).collect(),
                alternatives: alternatives
                    .into_iter()
                    .map(|alt| self.case_alternative(alt))
                    .collect(),
            },
            Expr::TypedValue { check, expr, ty } => {
                Expr::TypedValue { check, expr: Box::new(self.expr(*expr)), ty }
            }
            Expr::Let { declarations, body } => Expr::Let {
                declarations: declarations.into_iter().map(|d| self.declaration(d)).collect(),
                body: Box::new(self.expr(*body)),
            },
            Expr::Do(elements) => {
                Expr::Do(elements.into_iter().map(|el| self.do_element(el)).collect())
            }
            Expr::TypeClassDictionaryConstructorApp { class, dictionary } => {
                Expr::TypeClassDictionaryConstructorApp {
                    class,
                    dictionary: Box::new(self.expr(*dictionary)),
                }
            }
            Expr::Positioned(ann, inner) => Expr::Positioned(ann, Box::new(self.expr(*inner))),
            other => other,
        };
        (self.on_expr)(expr)
    }

    /// Rewrites a binder and everything under it.
    pub fn binder(&mut self, binder: Binder) -> Binder {
        let binder = match binder {
            Binder::Constructor { ctor, args } => Binder::Constructor {
                ctor,
                args: args.into_iter().map(|b| self.binder(b)).collect(),
            },
            Binder::Object(fields) => Binder::Object(
                fields.into_iter().map(|(label, b)| (label, self.binder(b))).collect(),
            ),
            Binder::Array(items) => {
                Binder::Array(items.into_iter().map(|b| self.binder(b)).collect())
            }
            Binder::Cons(head, tail) => {
                Binder::Cons(Box::new(self.binder(*head)), Box::new(self.binder(*tail)))
            }
            Binder::Named(ident, inner) => Binder::Named(ident, Box::new(self.binder(*inner))),
            Binder::Positioned(ann, inner) => {
                Binder::Positioned(ann, Box::new(self.binder(*inner)))
            }
            other => other,
        };
        (self.on_binder)(binder)
    }

    fn case_alternative(&mut self, alt: CaseAlternative) -> CaseAlternative {
        CaseAlternative {
            binders: alt.binders.into_iter().map(|b| self.binder(b)).collect(),
            guard: alt.guard.map(|g| self.expr(g)),
            result: self.expr(alt.result),
        }
    }

    fn do_element(&mut self, element: DoNotationElement) -> DoNotationElement {
        match element {
            DoNotationElement::Value(expr) => DoNotationElement::Value(self.expr(expr)),
            DoNotationElement::Bind(binder, expr) => {
                DoNotationElement::Bind(self.binder(binder), self.expr(expr))
            }
            DoNotationElement::Let(decls) => DoNotationElement::Let(
                decls.into_iter().map(|d| self.declaration(d)).collect(),
            ),
            DoNotationElement::Positioned(ann, inner) => {
                DoNotationElement::Positioned(ann, Box::new(self.do_element(*inner)))
            }
        }
    }

    fn guarded(&mut self, guarded: GuardedExpr) -> GuardedExpr {
        GuardedExpr { guard: guarded.guard.map(|g| self.expr(g)), expr: self.expr(guarded.expr) }
    }

    fn literal(&mut self, lit: Literal<Expr>) -> Literal<Expr> {
        match lit {
            Literal::Array(items) => {
                Literal::Array(items.into_iter().map(|e| self.expr(e)).collect())
            }
            Literal::Object(fields) => Literal::Object(
                fields.into_iter().map(|(label, e)| (label, self.expr(e))).collect(),
            ),
            other => other,
        }
    }
}

// ============================================================================
// Top-down fallible rewriting
// ============================================================================

/// A fallible top-down rewrite of declarations, expressions and binders.
///
/// The per-node function runs first; the traversal then descends into
/// whatever it returned. Visitation order is deterministic: parents before
/// children, siblings left to right. The first error aborts the traversal.
#[derive(Debug)]
pub struct EverywhereOnValuesTopDownM<FD, FE, FB, E> {
    on_declaration: FD,
    on_expr: FE,
    on_binder: FB,
    _error: PhantomData<fn() -> E>,
}

/// Builds a fallible top-down rewrite from per-node functions.
pub fn everywhere_on_values_top_down_m<FD, FE, FB, E>(
    on_declaration: FD,
    on_expr: FE,
    on_binder: FB,
) -> EverywhereOnValuesTopDownM<FD, FE, FB, E>
where
    FD: FnMut(Declaration) -> Result<Declaration, E>,
    FE: FnMut(Expr) -> Result<Expr, E>,
    FB: FnMut(Binder) -> Result<Binder, E>,
{
    EverywhereOnValuesTopDownM { on_declaration, on_expr, on_binder, _error: PhantomData }
}

impl<FD, FE, FB, E> EverywhereOnValuesTopDownM<FD, FE, FB, E>
where
    FD: FnMut(Declaration) -> Result<Declaration, E>,
    FE: FnMut(Expr) -> Result<Expr, E>,
    FB: FnMut(Binder) -> Result<Binder, E>,
{
    /// Rewrites a declaration and everything under it.
    ///
    /// ## Errors
    ///
    /// Propagates the first error returned by a per-node function.
    pub fn declaration(&mut self, decl: Declaration) -> Result<Declaration, E> {
        Ok(match (self.on_declaration)(decl)? {
            Declaration::DataBindingGroup(decls) => Declaration::DataBindingGroup(
                decls.into_iter().map(|d| self.declaration(d)).collect::<Result<_, E>>()?,
            ),
            Declaration::Value { ident, name_kind, binders, rhs } => Declaration::Value {
                ident,
                name_kind,
                binders: binders
                    .into_iter()
                    .map(|b| self.binder(b))
                    .collect::<Result<_, E>>()?,
                rhs: rhs.into_iter().map(|g| self.guarded(g)).collect::<Result<_, E>>()?,
            },
            Declaration::BindingGroup(bindings) => Declaration::BindingGroup(
                bindings
                    .into_iter()
                    .map(|(ident, kind, expr)| Ok((ident, kind, self.expr(expr)?)))
                    .collect::<Result<_, E>>()?,
            ),
            Declaration::TypeClass { name, params, constraints, dependencies, members } => {
                Declaration::TypeClass {
                    name,
                    params,
                    constraints,
                    dependencies,
                    members: members
                        .into_iter()
                        .map(|d| self.declaration(d))
                        .collect::<Result<_, E>>()?,
                }
            }
            Declaration::TypeInstance { ident, constraints, class, args, body } => {
                Declaration::TypeInstance {
                    ident,
                    constraints,
                    class,
                    args,
                    body: match body {
                        TypeInstanceBody::Explicit(members) => TypeInstanceBody::Explicit(
                            members
                                .into_iter()
                                .map(|d| self.declaration(d))
                                .collect::<Result<_, E>>()?,
                        ),
                        opaque => opaque,
                    },
                }
            }
            Declaration::Positioned(ann, inner) => {
                Declaration::Positioned(ann, Box::new(self.declaration(*inner)?))
            }
            other => other,
        })
    }

    /// Rewrites an expression and everything under it.
    ///
    /// ## Errors
    ///
    /// Propagates the first error returned by a per-node function.
    pub fn expr(&mut self, expr: Expr) -> Result<Expr, E> {
        Ok(match (self.on_expr)(expr)? {
            Expr::Literal(lit) => Expr::Literal(self.literal(lit)?),
            Expr::UnaryMinus(inner) => Expr::UnaryMinus(Box::new(self.expr(*inner)?)),
            Expr::BinaryNoParens { op, left, right } => Expr::BinaryNoParens {
                op,
                left: Box::new(self.expr(*left)?),
                right: Box::new(self.expr(*right)?),
            },
            Expr::Parens(inner) => Expr::Parens(Box::new(self.expr(*inner)?)),
            Expr::Accessor { field, record } => {
                Expr::Accessor { field, record: Box::new(self.expr(*record)?) }
            }
            Expr::ObjectUpdate { record, updates } => Expr::ObjectUpdate {
                record: Box::new(self.expr(*record)?),
                updates: updates
                    .into_iter()
                    .map(|pair| map_snd(pair, |e| self.expr(e)))
                    .collect::<Result<_, E>>()?,
            },
            Expr::Abs { param, body } => Expr::Abs { param, body: Box::new(self.expr(*body)?) },
            Expr::App(func, arg) => {
                Expr::App(Box::new(self.expr(*func)?), Box::new(self.expr(*arg)?))
            }
            Expr::IfThenElse(cond, then, otherwise) => Expr::IfThenElse(
                Box::new(self.expr(*cond)?),
                Box::new(self.expr(*then)?),
                Box::new(self.expr(*otherwise)?),
            ),
            Expr::Case { scrutinees, alternatives } => Expr::Case {
                scrutinees: scrutinees
                    .into_iter()
                    .map(|e| self.expr(e))
                    .collect::<Result<_, E>>()?,
                alternatives: alternatives
                    .into_iter()
                    .map(|alt| self.case_alternative(alt))
                    .collect::<Result<_, E>>()?,
            },
            Expr::TypedValue { check, expr, ty } => {
                Expr::TypedValue { check, expr: Box::new(self.expr(*expr)?), ty }
            }
            Expr::Let { declarations, body } => Expr::Let {
                declarations: declarations
                    .into_iter()
                    .map(|d| self.declaration(d))
                    .collect::<Result<_, E>>()?,
                body: Box::new(self.expr(*body)?),
            },
            Expr::Do(elements) => Expr::Do(
                elements.into_iter().map(|el| self.do_element(el)).collect::<Result<_, E>>()?,
            ),
            Expr::TypeClassDictionaryConstructorApp { class, dictionary } => {
                Expr::TypeClassDictionaryConstructorApp {
                    class,
                    dictionary: Box::new(self.expr(*dictionary)?),
                }
            }
            Expr::Positioned(ann, inner) => Expr::Positioned(ann, Box::new(self.expr(*inner)?)),
            other => other,
        })
    }

    /// Rewrites a binder and everything under it.
    ///
    /// ## Errors
    ///
    /// Propagates the first error returned by a per-node function.
    pub fn binder(&mut self, binder: Binder) -> Result<Binder, E> {
        Ok(match (self.on_binder)(binder)? {
            Binder::Constructor { ctor, args } => Binder::Constructor {
                ctor,
                args: args.into_iter().map(|b| self.binder(b)).collect::<Result<_, E>>()?,
            },
            Binder::Object(fields) => Binder::Object(
                fields
                    .into_iter()
                    .map(|pair| map_snd(pair, |b| self.binder(b)))
                    .collect::<Result<_, E>>()?,
            ),
            Binder::Array(items) => Binder::Array(
                items.into_iter().map(|b| self.binder(b)).collect::<Result<_, E>>()?,
            ),
            Binder::Cons(head, tail) => {
                Binder::Cons(Box::new(self.binder(*head)?), Box::new(self.binder(*tail)?))
            }
            Binder::Named(ident, inner) => Binder::Named(ident, Box::new(self.binder(*inner)?)),
            Binder::Positioned(ann, inner) => {
                Binder::Positioned(ann, Box::new(self.binder(*inner)?))
            }
            other => other,
        })
    }

    fn case_alternative(&mut self, alt: CaseAlternative) -> Result<CaseAlternative, E> {
        Ok(CaseAlternative {
            binders: alt.binders.into_iter().map(|b| self.binder(b)).collect::<Result<_, E>>()?,
            guard: map_opt(alt.guard, |g| self.expr(g))?,
            result: self.expr(alt.result)?,
        })
    }

    fn do_element(&mut self, element: DoNotationElement) -> Result<DoNotationElement, E> {
        Ok(match element {
            DoNotationElement::Value(expr) => DoNotationElement::Value(self.expr(expr)?),
            DoNotationElement::Bind(binder, expr) => {
                DoNotationElement::Bind(self.binder(binder)?, self.expr(expr)?)
            }
            DoNotationElement::Let(decls) => DoNotationElement::Let(
                decls.into_iter().map(|d| self.declaration(d)).collect::<Result<_, E>>()?,
            ),
            DoNotationElement::Positioned(ann, inner) => {
                DoNotationElement::Positioned(ann, Box::new(self.do_element(*inner)?))
            }
        })
    }

    fn guarded(&mut self, guarded: GuardedExpr) -> Result<GuardedExpr, E> {
        Ok(GuardedExpr {
            guard: map_opt(guarded.guard, |g| self.expr(g))?,
            expr: self.expr(guarded.expr)?,
        })
    }

    fn literal(&mut self, lit: Literal<Expr>) -> Result<Literal<Expr>, E> {
        Ok(match lit {
            Literal::Array(items) => Literal::Array(
                items.into_iter().map(|e| self.expr(e)).collect::<Result<_, E>>()?,
            ),
            Literal::Object(fields) => Literal::Object(
                fields
                    .into_iter()
                    .map(|pair| map_snd(pair, |e| self.expr(e)))
                    .collect::<Result<_, E>>()?,
            ),
            other => other,
        })
    }
}

// ============================================================================
// Monoidal folding
// ============================================================================

/// A left-to-right fold over declarations, expressions, binders, case
/// alternatives and do-notation elements.
///
/// Each node contributes the result of its per-node function; contributions
/// are combined parent-first, children in source order.
#[derive(Debug)]
pub struct EverythingOnValues<R, C, FD, FE, FB, FA, FO> {
    combine: C,
    on_declaration: FD,
    on_expr: FE,
    on_binder: FB,
    on_case_alternative: FA,
    on_do_element: FO,
    _result: PhantomData<fn() -> R>,
}

/// Builds a fold from a combining function and per-node functions.
pub fn everything_on_values<R, C, FD, FE, FB, FA, FO>(
    combine: C,
    on_declaration: FD,
    on_expr: FE,
    on_binder: FB,
    on_case_alternative: FA,
    on_do_element: FO,
) -> EverythingOnValues<R, C, FD, FE, FB, FA, FO>
where
    C: FnMut(R, R) -> R,
    FD: FnMut(&Declaration) -> R,
    FE: FnMut(&Expr) -> R,
    FB: FnMut(&Binder) -> R,
    FA: FnMut(&CaseAlternative) -> R,
    FO: FnMut(&DoNotationElement) -> R,
{
    EverythingOnValues {
        combine,
        on_declaration,
        on_expr,
        on_binder,
        on_case_alternative,
        on_do_element,
        _result: PhantomData,
    }
}

impl<R, C, FD, FE, FB, FA, FO> EverythingOnValues<R, C, FD, FE, FB, FA, FO>
where
    C: FnMut(R, R) -> R,
    FD: FnMut(&Declaration) -> R,
    FE: FnMut(&Expr) -> R,
    FB: FnMut(&Binder) -> R,
    FA: FnMut(&CaseAlternative) -> R,
    FO: FnMut(&DoNotationElement) -> R,
{
    /// Folds over a declaration and everything under it.
    pub fn declaration(&mut self, decl: &Declaration) -> R {
        let mut acc = (self.on_declaration)(decl);
        match decl {
            Declaration::DataBindingGroup(decls) => {
                for d in decls {
                    let sub = self.declaration(d);
                    acc = (self.combine)(acc, sub);
                }
            }
            Declaration::Value { binders, rhs, .. } => {
                for b in binders {
                    let sub = self.binder(b);
                    acc = (self.combine)(acc, sub);
                }
                for guarded in rhs {
                    if let Some(guard) = &guarded.guard {
                        let sub = self.expr(guard);
                        acc = (self.combine)(acc, sub);
                    }
                    let sub = self.expr(&guarded.expr);
                    acc = (self.combine)(acc, sub);
                }
            }
            Declaration::BindingGroup(bindings) => {
                for (_, _, expr) in bindings {
                    let sub = self.expr(expr);
                    acc = (self.combine)(acc, sub);
                }
            }
            Declaration::TypeClass { members, .. } => {
                for d in members {
                    let sub = self.declaration(d);
                    acc = (self.combine)(acc, sub);
                }
            }
            Declaration::TypeInstance {
                body: TypeInstanceBody::Explicit(members), ..
            } => {
                for d in members {
                    let sub = self.declaration(d);
                    acc = (self.combine)(acc, sub);
                }
            }
            Declaration::Positioned(_, inner) => {
                let sub = self.declaration(inner);
                acc = (self.combine)(acc, sub);
            }
            _ => {}
        }
        acc
    }

    /// Folds over an expression and everything under it.
    pub fn expr(&mut self, expr: &Expr) -> R {
        let mut acc = (self.on_expr)(expr);
        match expr {
            Expr::Literal(Literal::Array(items)) => {
                for e in items {
                    let sub = self.expr(e);
                    acc = (self.combine)(acc, sub);
                }
            }
            Expr::Literal(Literal::Object(fields)) => {
                for (_, e) in fields {
                    let sub = self.expr(e);
                    acc = (self.combine)(acc, sub);
                }
            }
            Expr::UnaryMinus(inner)
            | Expr::Parens(inner)
            | Expr::Accessor { record: inner, .. }
            | Expr::Abs { body: inner, .. }
            | Expr::TypedValue { expr: inner, .. }
            | Expr::TypeClassDictionaryConstructorApp { dictionary: inner, .. }
            | Expr::Positioned(_, inner) => {
                let sub = self.expr(inner);
                acc = (self.combine)(acc, sub);
            }
            Expr::BinaryNoParens { left, right, .. } => {
                let sub = self.expr(left);
                acc = (self.combine)(acc, sub);
                let sub = self.expr(right);
                acc = (self.combine)(acc, sub);
            }
            Expr::ObjectUpdate { record, updates } => {
                let sub = self.expr(record);
                acc = (self.combine)(acc, sub);
                for (_, e) in updates {
                    let sub = self.expr(e);
                    acc = (self.combine)(acc, sub);
                }
            }
            Expr::App(func, arg) => {
                let sub = self.expr(func);
                acc = (self.combine)(acc, sub);
                let sub = self.expr(arg);
                acc = (self.combine)(acc, sub);
            }
            Expr::IfThenElse(cond, then, otherwise) => {
                for e in [cond, then, otherwise] {
                    let sub = self.expr(e);
                    acc = (self.combine)(acc, sub);
                }
            }
            Expr::Case { scrutinees, alternatives } => {
                for e in scrutinees {
                    let sub = self.expr(e);
                    acc = (self.combine)(acc, sub);
                }
                for alt in alternatives {
                    let sub = self.case_alternative(alt);
                    acc = (self.combine)(acc, sub);
                }
            }
            Expr::Let { declarations, body } => {
                for d in declarations {
                    let sub = self.declaration(d);
                    acc = (self.combine)(acc, sub);
                }
                let sub = self.expr(body);
                acc = (self.combine)(acc, sub);
            }
            Expr::Do(elements) => {
                for el in elements {
                    let sub = self.do_element(el);
                    acc = (self.combine)(acc, sub);
                }
            }
            _ => {}
        }
        acc
    }

    /// Folds over a binder and everything under it.
    pub fn binder(&mut self, binder: &Binder) -> R {
        let mut acc = (self.on_binder)(binder);
        match binder {
            Binder::Constructor { args, .. } | Binder::Array(args) => {
                for b in args {
                    let sub = self.binder(b);
                    acc = (self.combine)(acc, sub);
                }
            }
            Binder::Object(fields) => {
                for (_, b) in fields {
                    let sub = self.binder(b);
                    acc = (self.combine)(acc, sub);
                }
            }
            Binder::Cons(head, tail) => {
                let sub = self.binder(head);
                acc = (self.combine)(acc, sub);
                let sub = self.binder(tail);
                acc = (self.combine)(acc, sub);
            }
            Binder::Named(_, inner) | Binder::Positioned(_, inner) => {
                let sub = self.binder(inner);
                acc = (self.combine)(acc, sub);
            }
            _ => {}
        }
        acc
    }

    /// Folds over a case alternative and everything under it.
    pub fn case_alternative(&mut self, alt: &CaseAlternative) -> R {
        let mut acc = (self.on_case_alternative)(alt);
        for b in &alt.binders {
            let sub = self.binder(b);
            acc = (self.combine)(acc, sub);
        }
        if let Some(guard) = &alt.guard {
            let sub = self.expr(guard);
            acc = (self.combine)(acc, sub);
        }
        let sub = self.expr(&alt.result);
        (self.combine)(acc, sub)
    }

    /// Folds over a do-notation element and everything under it.
    pub fn do_element(&mut self, element: &DoNotationElement) -> R {
        let mut acc = (self.on_do_element)(element);
        match element {
            DoNotationElement::Value(expr) => {
                let sub = self.expr(expr);
                acc = (self.combine)(acc, sub);
            }
            DoNotationElement::Bind(binder, expr) => {
                let sub = self.binder(binder);
                acc = (self.combine)(acc, sub);
                let sub = self.expr(expr);
                acc = (self.combine)(acc, sub);
            }
            DoNotationElement::Let(decls) => {
                for d in decls {
                    let sub = self.declaration(d);
                    acc = (self.combine)(acc, sub);
                }
            }
            DoNotationElement::Positioned(_, inner) => {
                let sub = self.do_element(inner);
                acc = (self.combine)(acc, sub);
            }
        }
        acc
    }
}

// ============================================================================
// Context-threading fold
// ============================================================================

/// A fold that threads a context downward while summarizing upward.
///
/// Each per-node function receives the context established by the node's
/// ancestors and returns the context its children should see alongside its
/// own contribution. Sibling contributions are combined left to right.
#[derive(Debug)]
pub struct EverythingWithContextOnValues<S, R, C, FD, FE, FB, FA, FO> {
    combine: C,
    on_declaration: FD,
    on_expr: FE,
    on_binder: FB,
    on_case_alternative: FA,
    on_do_element: FO,
    _marker: PhantomData<fn(S) -> R>,
}

/// Builds a context-threading fold from a combining function and per-node
/// functions.
pub fn everything_with_context_on_values<S, R, C, FD, FE, FB, FA, FO>(
    combine: C,
    on_declaration: FD,
    on_expr: FE,
    on_binder: FB,
    on_case_alternative: FA,
    on_do_element: FO,
) -> EverythingWithContextOnValues<S, R, C, FD, FE, FB, FA, FO>
where
    S: Clone,
    C: FnMut(R, R) -> R,
    FD: FnMut(S, &Declaration) -> (S, R),
    FE: FnMut(S, &Expr) -> (S, R),
    FB: FnMut(S, &Binder) -> (S, R),
    FA: FnMut(S, &CaseAlternative) -> (S, R),
    FO: FnMut(S, &DoNotationElement) -> (S, R),
{
    EverythingWithContextOnValues {
        combine,
        on_declaration,
        on_expr,
        on_binder,
        on_case_alternative,
        on_do_element,
        _marker: PhantomData,
    }
}

impl<S, R, C, FD, FE, FB, FA, FO> EverythingWithContextOnValues<S, R, C, FD, FE, FB, FA, FO>
where
    S: Clone,
    C: FnMut(R, R) -> R,
    FD: FnMut(S, &Declaration) -> (S, R),
    FE: FnMut(S, &Expr) -> (S, R),
    FB: FnMut(S, &Binder) -> (S, R),
    FA: FnMut(S, &CaseAlternative) -> (S, R),
    FO: FnMut(S, &DoNotationElement) -> (S, R),
{
    /// Folds over a declaration and everything under it.
    pub fn declaration(&mut self, context: S, decl: &Declaration) -> R {
        let (context, mut acc) = (self.on_declaration)(context, decl);
        match decl {
            Declaration::DataBindingGroup(decls) => {
                for d in decls {
                    let sub = self.declaration(context.clone(), d);
                    acc = (self.combine)(acc, sub);
                }
            }
            Declaration::Value { binders, rhs, .. } => {
                for b in binders {
                    let sub = self.binder(context.clone(), b);
                    acc = (self.combine)(acc, sub);
                }
                for guarded in rhs {
                    if let Some(guard) = &guarded.guard {
                        let sub = self.expr(context.clone(), guard);
                        acc = (self.combine)(acc, sub);
                    }
                    let sub = self.expr(context.clone(), &guarded.expr);
                    acc = (self.combine)(acc, sub);
                }
            }
            Declaration::BindingGroup(bindings) => {
                for (_, _, expr) in bindings {
                    let sub = self.expr(context.clone(), expr);
                    acc = (self.combine)(acc, sub);
                }
            }
            Declaration::TypeClass { members, .. } => {
                for d in members {
                    let sub = self.declaration(context.clone(), d);
                    acc = (self.combine)(acc, sub);
                }
            }
            Declaration::TypeInstance {
                body: TypeInstanceBody::Explicit(members), ..
            } => {
                for d in members {
                    let sub = self.declaration(context.clone(), d);
                    acc = (self.combine)(acc, sub);
                }
            }
            Declaration::Positioned(_, inner) => {
                let sub = self.declaration(context, inner);
                acc = (self.combine)(acc, sub);
            }
            _ => {}
        }
        acc
    }

    /// Folds over an expression and everything under it.
    pub fn expr(&mut self, context: S, expr: &Expr) -> R {
        let (context, mut acc) = (self.on_expr)(context, expr);
        match expr {
            Expr::Literal(Literal::Array(items)) => {
                for e in items {
                    let sub = self.expr(context.clone(), e);
                    acc = (self.combine)(acc, sub);
                }
            }
            Expr::Literal(Literal::Object(fields)) => {
                for (_, e) in fields {
                    let sub = self.expr(context.clone(), e);
                    acc = (self.combine)(acc, sub);
                }
            }
            Expr::UnaryMinus(inner)
            | Expr::Parens(inner)
            | Expr::Accessor { record: inner, .. }
            | Expr::Abs { body: inner, .. }
            | Expr::TypedValue { expr: inner, .. }
            | Expr::TypeClassDictionaryConstructorApp { dictionary: inner, .. }
            | Expr::Positioned(_, inner) => {
                let sub = self.expr(context, inner);
                acc = (self.combine)(acc, sub);
            }
            Expr::BinaryNoParens { left, right, .. } => {
                let sub = self.expr(context.clone(), left);
                acc = (self.combine)(acc, sub);
                let sub = self.expr(context, right);
                acc = (self.combine)(acc, sub);
            }
            Expr::ObjectUpdate { record, updates } => {
                let sub = self.expr(context.clone(), record);
                acc = (self.combine)(acc, sub);
                for (_, e) in updates {
                    let sub = self.expr(context.clone(), e);
                    acc = (self.combine)(acc, sub);
                }
            }
            Expr::App(func, arg) => {
                let sub = self.expr(context.clone(), func);
                acc = (self.combine)(acc, sub);
                let sub = self.expr(context, arg);
                acc = (self.combine)(acc, sub);
            }
            Expr::IfThenElse(cond, then, otherwise) => {
                for e in [cond, then, otherwise] {
                    let sub = self.expr(context.clone(), e);
                    acc = (self.combine)(acc, sub);
                }
            }
            Expr::Case { scrutinees, alternatives } => {
                for e in scrutinees {
                    let sub = self.expr(context.clone(), e);
                    acc = (self.combine)(acc, sub);
                }
                for alt in alternatives {
                    let sub = self.case_alternative(context.clone(), alt);
                    acc = (self.combine)(acc, sub);
                }
            }
            Expr::Let { declarations, body } => {
                for d in declarations {
                    let sub = self.declaration(context.clone(), d);
                    acc = (self.combine)(acc, sub);
                }
                let sub = self.expr(context, body);
                acc = (self.combine)(acc, sub);
            }
            Expr::Do(elements) => {
                for el in elements {
                    let sub = self.do_element(context.clone(), el);
                    acc = (self.combine)(acc, sub);
                }
            }
            _ => {}
        }
        acc
    }

    /// Folds over a binder and everything under it.
    pub fn binder(&mut self, context: S, binder: &Binder) -> R {
        let (context, mut acc) = (self.on_binder)(context, binder);
        match binder {
            Binder::Constructor { args, .. } | Binder::Array(args) => {
                for b in args {
                    let sub = self.binder(context.clone(), b);
                    acc = (self.combine)(acc, sub);
                }
            }
            Binder::Object(fields) => {
                for (_, b) in fields {
                    let sub = self.binder(context.clone(), b);
                    acc = (self.combine)(acc, sub);
                }
            }
            Binder::Cons(head, tail) => {
                let sub = self.binder(context.clone(), head);
                acc = (self.combine)(acc, sub);
                let sub = self.binder(context, tail);
                acc = (self.combine)(acc, sub);
            }
            Binder::Named(_, inner) | Binder::Positioned(_, inner) => {
                let sub = self.binder(context, inner);
                acc = (self.combine)(acc, sub);
            }
            _ => {}
        }
        acc
    }

    /// Folds over a case alternative and everything under it.
    pub fn case_alternative(&mut self, context: S, alt: &CaseAlternative) -> R {
        let (context, mut acc) = (self.on_case_alternative)(context, alt);
        for b in &alt.binders {
            let sub = self.binder(context.clone(), b);
            acc = (self.combine)(acc, sub);
        }
        if let Some(guard) = &alt.guard {
            let sub = self.expr(context.clone(), guard);
            acc = (self.combine)(acc, sub);
        }
        let sub = self.expr(context, &alt.result);
        (self.combine)(acc, sub)
    }

    /// Folds over a do-notation element and everything under it.
    pub fn do_element(&mut self, context: S, element: &DoNotationElement) -> R {
        let (context, mut acc) = (self.on_do_element)(context, element);
        match element {
            DoNotationElement::Value(expr) => {
                let sub = self.expr(context, expr);
                acc = (self.combine)(acc, sub);
            }
            DoNotationElement::Bind(binder, expr) => {
                let sub = self.binder(context.clone(), binder);
                acc = (self.combine)(acc, sub);
                let sub = self.expr(context, expr);
                acc = (self.combine)(acc, sub);
            }
            DoNotationElement::Let(decls) => {
                for d in decls {
                    let sub = self.declaration(context.clone(), d);
                    acc = (self.combine)(acc, sub);
                }
            }
            DoNotationElement::Positioned(_, inner) => {
                let sub = self.do_element(context, inner);
                acc = (self.combine)(acc, sub);
            }
        }
        acc
    }
}

// ============================================================================
// Type harvesting
// ============================================================================

/// A fold over every type mentioned in a declaration or expression:
/// signatures, synonym bodies, data constructor fields, foreign signatures,
/// constraints, type annotations and dictionary placeholders.
#[derive(Debug)]
pub struct AccumTypes<R, C, F> {
    combine: C,
    on_type: F,
    _result: PhantomData<fn() -> R>,
}

/// Builds a type-harvesting fold from a combining function and a per-type
/// function.
pub fn accum_types<R, C, F>(combine: C, on_type: F) -> AccumTypes<R, C, F>
where
    R: Default,
    C: FnMut(R, R) -> R,
    F: FnMut(&Type) -> R,
{
    AccumTypes { combine, on_type, _result: PhantomData }
}

impl<R, C, F> AccumTypes<R, C, F>
where
    R: Default,
    C: FnMut(R, R) -> R,
    F: FnMut(&Type) -> R,
{
    /// Folds over every type mentioned in a declaration.
    pub fn declaration(&mut self, decl: &Declaration) -> R {
        let mut acc = R::default();
        match decl {
            Declaration::Data { constructors, .. } => {
                for (_, fields) in constructors {
                    for ty in fields {
                        acc = self.ty(acc, ty);
                    }
                }
            }
            Declaration::DataBindingGroup(decls) => {
                for d in decls {
                    let sub = self.declaration(d);
                    acc = (self.combine)(acc, sub);
                }
            }
            Declaration::TypeSynonym { body, .. } => acc = self.ty(acc, body),
            Declaration::TypeSignature { ty, .. } | Declaration::ForeignValue { ty, .. } => {
                acc = self.ty(acc, ty);
            }
            Declaration::Value { rhs, .. } => {
                for guarded in rhs {
                    if let Some(guard) = &guarded.guard {
                        let sub = self.expr(guard);
                        acc = (self.combine)(acc, sub);
                    }
                    let sub = self.expr(&guarded.expr);
                    acc = (self.combine)(acc, sub);
                }
            }
            Declaration::BindingGroup(bindings) => {
                for (_, _, expr) in bindings {
                    let sub = self.expr(expr);
                    acc = (self.combine)(acc, sub);
                }
            }
            Declaration::ForeignInstance { constraints, args, .. } => {
                acc = self.constraints(acc, constraints);
                for ty in args {
                    acc = self.ty(acc, ty);
                }
            }
            Declaration::TypeClass { constraints, members, .. } => {
                acc = self.constraints(acc, constraints);
                for d in members {
                    let sub = self.declaration(d);
                    acc = (self.combine)(acc, sub);
                }
            }
            Declaration::TypeInstance { constraints, args, body, .. } => {
                acc = self.constraints(acc, constraints);
                for ty in args {
                    acc = self.ty(acc, ty);
                }
                if let TypeInstanceBody::Explicit(members) = body {
                    for d in members {
                        let sub = self.declaration(d);
                        acc = (self.combine)(acc, sub);
                    }
                }
            }
            Declaration::Positioned(_, inner) => {
                let sub = self.declaration(inner);
                acc = (self.combine)(acc, sub);
            }
            Declaration::ForeignData { .. }
            | Declaration::Fixity { .. }
            | Declaration::Import { .. } => {}
        }
        acc
    }

    /// Folds over every type mentioned in an expression.
    pub fn expr(&mut self, expr: &Expr) -> R {
        let mut acc = R::default();
        match expr {
            Expr::Literal(Literal::Array(items)) => {
                for e in items {
                    let sub = self.expr(e);
                    acc = (self.combine)(acc, sub);
                }
            }
            Expr::Literal(Literal::Object(fields)) => {
                for (_, e) in fields {
                    let sub = self.expr(e);
                    acc = (self.combine)(acc, sub);
                }
            }
            Expr::UnaryMinus(inner)
            | Expr::Parens(inner)
            | Expr::Accessor { record: inner, .. }
            | Expr::Abs { body: inner, .. }
            | Expr::TypeClassDictionaryConstructorApp { dictionary: inner, .. }
            | Expr::Positioned(_, inner) => {
                let sub = self.expr(inner);
                acc = (self.combine)(acc, sub);
            }
            Expr::BinaryNoParens { left, right, .. } => {
                let sub = self.expr(left);
                acc = (self.combine)(acc, sub);
                let sub = self.expr(right);
                acc = (self.combine)(acc, sub);
            }
            Expr::ObjectUpdate { record, updates } => {
                let sub = self.expr(record);
                acc = (self.combine)(acc, sub);
                for (_, e) in updates {
                    let sub = self.expr(e);
                    acc = (self.combine)(acc, sub);
                }
            }
            Expr::App(func, arg) => {
                let sub = self.expr(func);
                acc = (self.combine)(acc, sub);
                let sub = self.expr(arg);
                acc = (self.combine)(acc, sub);
            }
            Expr::IfThenElse(cond, then, otherwise) => {
                for e in [cond, then, otherwise] {
                    let sub = self.expr(e);
                    acc = (self.combine)(acc, sub);
                }
            }
            Expr::Case { scrutinees, alternatives } => {
                for e in scrutinees {
                    let sub = self.expr(e);
                    acc = (self.combine)(acc, sub);
                }
                for alt in alternatives {
                    if let Some(guard) = &alt.guard {
                        let sub = self.expr(guard);
                        acc = (self.combine)(acc, sub);
                    }
                    let sub = self.expr(&alt.result);
                    acc = (self.combine)(acc, sub);
                }
            }
            Expr::TypedValue { expr: inner, ty, .. } => {
                let sub = self.expr(inner);
                acc = (self.combine)(acc, sub);
                acc = self.ty(acc, ty);
            }
            Expr::Let { declarations, body } => {
                for d in declarations {
                    let sub = self.declaration(d);
                    acc = (self.combine)(acc, sub);
                }
                let sub = self.expr(body);
                acc = (self.combine)(acc, sub);
            }
            Expr::Do(elements) => {
                for el in elements {
                    let sub = self.do_element(el);
                    acc = (self.combine)(acc, sub);
                }
            }
            Expr::TypeClassDictionary(constraint) => {
                for ty in &constraint.args {
                    acc = self.ty(acc, ty);
                }
            }
            Expr::SuperClassDictionary { args, .. } | Expr::DeferredDictionary { args, .. } => {
                for ty in args {
                    acc = self.ty(acc, ty);
                }
            }
            Expr::Literal(_)
            | Expr::Var(_)
            | Expr::Constructor(_)
            | Expr::TypeClassDictionaryAccessor { .. } => {}
        }
        acc
    }

    fn do_element(&mut self, element: &DoNotationElement) -> R {
        let mut acc = R::default();
        match element {
            DoNotationElement::Value(expr) | DoNotationElement::Bind(_, expr) => {
                let sub = self.expr(expr);
                acc = (self.combine)(acc, sub);
            }
            DoNotationElement::Let(decls) => {
                for d in decls {
                    let sub = self.declaration(d);
                    acc = (self.combine)(acc, sub);
                }
            }
            DoNotationElement::Positioned(_, inner) => {
                let sub = self.do_element(inner);
                acc = (self.combine)(acc, sub);
            }
        }
        acc
    }

    fn constraints(&mut self, mut acc: R, constraints: &[crate::types::Constraint]) -> R {
        for constraint in constraints {
            for ty in &constraint.args {
                acc = self.ty(acc, ty);
            }
        }
        acc
    }

    fn ty(&mut self, acc: R, ty: &Type) -> R {
        let sub = (self.on_type)(ty);
        (self.combine)(acc, sub)
    }
}
