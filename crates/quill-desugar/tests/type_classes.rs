//! End-to-end tests for type class and instance desugaring.

use quill_ast::externs::{ExternsDeclaration, ExternsFile};
use quill_ast::names::{ClassName, Ident, ModuleName, ProperName, Qualified};
use quill_ast::nodes::{
    Declaration,
    DeclarationRef,
    Expr,
    GuardedExpr,
    Literal,
    Module,
    NameKind,
    NumericLiteral,
    TypeInstanceBody,
};
use quill_ast::prim;
use quill_ast::types::{Constraint, Type};
use quill_desugar::error::{DesugarError, MultipleErrors};
use quill_desugar::supply::NameSupply;
use quill_desugar::{TypeClassDesugarer, desugar_type_classes};
use quill_source::types::{SourceAnn, SourceSpan};

fn mn(name: &str) -> ModuleName {
    ModuleName::from_dotted(name)
}

fn qualified_class(module: &str, name: &str) -> Qualified<ProperName<ClassName>> {
    Qualified::new(mn(module), ProperName::new(name))
}

fn tycon(module: &str, name: &str) -> Type {
    Type::Constructor(Qualified::new(mn(module), ProperName::new(name)))
}

fn tv(name: &str) -> Type {
    Type::Var(name.to_owned())
}

fn string_ty() -> Type {
    tycon("Prim", "String")
}

fn int_ty() -> Type {
    tycon("Prim", "Int")
}

fn sig(name: &str, ty: Type) -> Declaration {
    Declaration::TypeSignature { ident: Ident::new(name), ty }
}

fn member_value(name: &str, expr: Expr) -> Declaration {
    Declaration::Value {
        ident: Ident::new(name),
        name_kind: NameKind::Public,
        binders: Vec::new(),
        rhs: vec![GuardedExpr::unconditional(expr)],
    }
}

fn local(name: &str) -> Expr {
    Expr::Var(Qualified::unqualified(Ident::new(name)))
}

/// A reference to another instance member, as name resolution leaves it:
/// qualified to the class's module.
fn member_ref(module: &str, name: &str) -> Expr {
    Expr::Var(Qualified::new(mn(module), Ident::new(name)))
}

fn lam(param: &str, body: Expr) -> Expr {
    Expr::Abs { param: Ident::new(param), body: Box::new(body) }
}

fn int(value: i64) -> Expr {
    Expr::Literal(Literal::Numeric(NumericLiteral::Integer(value)))
}

fn str_lit(value: &str) -> Expr {
    Expr::Literal(Literal::String(value.to_owned()))
}

fn class_decl(
    name: &str,
    params: &[&str],
    constraints: Vec<Constraint>,
    members: Vec<Declaration>,
) -> Declaration {
    Declaration::TypeClass {
        name: ProperName::new(name),
        params: params.iter().map(|p| ((*p).to_owned(), None)).collect(),
        constraints,
        dependencies: Vec::new(),
        members,
    }
}

fn instance(
    name: &str,
    class: Qualified<ProperName<ClassName>>,
    args: Vec<Type>,
    members: Vec<Declaration>,
) -> Declaration {
    Declaration::TypeInstance {
        ident: Ident::new(name),
        constraints: Vec::new(),
        class,
        args,
        body: TypeInstanceBody::Explicit(members),
    }
}

fn class_export(name: &str) -> DeclarationRef {
    DeclarationRef::TypeClass { span: SourceSpan::generated(), name: ProperName::new(name) }
}

fn type_export(name: &str) -> DeclarationRef {
    DeclarationRef::Type {
        span: SourceSpan::generated(),
        name: ProperName::new(name),
        constructors: None,
    }
}

fn module(name: &str, declarations: Vec<Declaration>, exports: Vec<DeclarationRef>) -> Module {
    Module::new(SourceSpan::generated(), Vec::new(), mn(name), declarations, exports)
}

fn passthrough(
    _supply: &mut NameSupply,
    members: Vec<Declaration>,
) -> Result<Vec<Declaration>, DesugarError> {
    Ok(members)
}

fn desugar_one(input: Module) -> Result<Module, MultipleErrors> {
    desugar_type_classes(&[], vec![input], passthrough)
        .map(|mut modules| modules.pop().expect("one module in, one module out"))
}

fn find_synonym<'a>(output: &'a Module, name: &str) -> (&'a Vec<(String, Option<quill_ast::kinds::Kind>)>, &'a Type) {
    output
        .declarations
        .iter()
        .find_map(|decl| match decl.unwrap_positioned() {
            Declaration::TypeSynonym { name: n, params, body } if n.as_str() == name => {
                Some((params, body))
            }
            _ => None,
        })
        .unwrap_or_else(|| panic!("no type synonym named {name}"))
}

fn find_value<'a>(output: &'a Module, name: &str) -> (NameKind, &'a Expr) {
    output
        .declarations
        .iter()
        .find_map(|decl| match decl.unwrap_positioned() {
            Declaration::Value { ident, name_kind, binders, rhs } if ident.as_str() == name => {
                assert!(binders.is_empty(), "desugared values bind no parameters");
                assert_eq!(rhs.len(), 1, "desugared values have one right-hand side");
                assert!(rhs[0].guard.is_none(), "desugared values are unguarded");
                Some((*name_kind, &rhs[0].expr))
            }
            _ => None,
        })
        .unwrap_or_else(|| panic!("no value named {name}"))
}

fn foo_class() -> Declaration {
    class_decl("Foo", &["a"], Vec::new(), vec![sig("foo", Type::function(tv("a"), tv("a")))])
}

// ----------------------------------------------------------------------------
// Classes
// ----------------------------------------------------------------------------

#[test]
fn a_class_becomes_a_synonym_and_accessors() {
    let input = module("Main", vec![foo_class()], vec![class_export("Foo")]);
    let output = desugar_one(input).expect("class desugars");

    // The original class declaration survives for downstream phases.
    assert!(output.declarations.iter().any(Declaration::is_type_class));

    let (params, body) = find_synonym(&output, "Foo");
    assert_eq!(params, &vec![("a".to_owned(), None)]);
    assert_eq!(
        body,
        &Type::record_from_fields(vec![(
            "foo".to_owned(),
            Type::function(tv("a"), tv("a")),
        )])
    );

    let (kind, accessor) = find_value(&output, "foo");
    assert_eq!(kind, NameKind::Private);
    let expected_ty = Type::ForAll(
        "a".to_owned(),
        Box::new(Type::Constrained(
            vec![Constraint::new(qualified_class("Main", "Foo"), vec![tv("a")])],
            Box::new(Type::function(tv("a"), tv("a"))),
        )),
    );
    assert_eq!(
        accessor,
        &Expr::TypedValue {
            check: false,
            expr: Box::new(Expr::TypeClassDictionaryAccessor {
                class: qualified_class("Main", "Foo"),
                member: Ident::new("foo"),
            }),
            ty: expected_ty,
        }
    );
}

#[test]
fn every_member_gets_its_own_private_accessor() {
    let two_members = class_decl(
        "Pair",
        &["a"],
        Vec::new(),
        vec![sig("first", tv("a")), sig("second", tv("a"))],
    );
    let input = module("Main", vec![two_members], vec![class_export("Pair")]);
    let output = desugar_one(input).expect("class desugars");

    for member in ["first", "second"] {
        let (kind, _) = find_value(&output, member);
        assert_eq!(kind, NameKind::Private, "accessor for {member} must be private");
    }
}

#[test]
fn superclasses_become_thunk_fields_after_the_members() {
    let sub_class = class_decl(
        "Sub",
        &["a"],
        vec![Constraint::new(qualified_class("Main", "Foo"), vec![tv("a")])],
        vec![sig("sub", tv("a"))],
    );
    let input = module(
        "Main",
        vec![foo_class(), sub_class],
        vec![class_export("Foo"), class_export("Sub")],
    );
    let output = desugar_one(input).expect("classes desugar");

    let (_, body) = find_synonym(&output, "Sub");
    let foo_applied = Type::apply_all(tycon("Main", "Foo"), [tv("a")]);
    assert_eq!(
        body,
        &Type::record_from_fields(vec![
            ("sub".to_owned(), tv("a")),
            ("Foo0".to_owned(), Type::function(Type::unit_record(), foo_applied)),
        ])
    );
}

#[test]
fn positioned_classes_keep_their_annotation_on_every_replacement() {
    let ann = SourceAnn::generated();
    let input = module(
        "Main",
        vec![Declaration::Positioned(ann.clone(), Box::new(foo_class()))],
        vec![class_export("Foo")],
    );
    let output = desugar_one(input).expect("class desugars");

    assert_eq!(output.declarations.len(), 3);
    for decl in &output.declarations {
        assert!(
            matches!(decl, Declaration::Positioned(a, _) if *a == ann),
            "every replacement declaration keeps the class's annotation"
        );
    }
}

// ----------------------------------------------------------------------------
// Instances
// ----------------------------------------------------------------------------

#[test]
fn an_instance_becomes_a_dictionary_value_and_an_export() {
    let inst = instance(
        "fooString",
        qualified_class("Main", "Foo"),
        vec![string_ty()],
        vec![member_value("foo", lam("s", local("s")))],
    );
    let input = module("Main", vec![foo_class(), inst], vec![class_export("Foo")]);
    let output = desugar_one(input).expect("instance desugars");

    let (kind, dictionary) = find_value(&output, "fooString");
    assert_eq!(kind, NameKind::Private);

    let expected_dict = Expr::TypeClassDictionaryConstructorApp {
        class: qualified_class("Main", "Foo"),
        dictionary: Box::new(Expr::Literal(Literal::Object(vec![(
            "foo".to_owned(),
            lam("s", local("s")),
        )]))),
    };
    let expected_ty = Type::Constrained(
        Vec::new(),
        Box::new(Type::apply_all(tycon("Main", "Foo"), [string_ty()])),
    );
    assert_eq!(
        dictionary,
        &Expr::TypedValue { check: true, expr: Box::new(expected_dict), ty: expected_ty }
    );

    // The export list keeps its old entries as a prefix and gains the
    // instance.
    let exports = output.exports.as_deref().expect("exports survive");
    assert_eq!(exports[0], class_export("Foo"));
    assert_eq!(
        exports[1],
        DeclarationRef::TypeInstance {
            span: SourceSpan::generated(),
            ident: Ident::new("fooString"),
        }
    );
}

#[test]
fn instance_dictionaries_carry_superclass_thunks() {
    let sub_class = class_decl(
        "Sub",
        &["a"],
        vec![Constraint::new(qualified_class("Main", "Foo"), vec![tv("a")])],
        vec![sig("sub", tv("a"))],
    );
    let inst = instance(
        "subString",
        qualified_class("Main", "Sub"),
        vec![string_ty()],
        vec![member_value("sub", str_lit(""))],
    );
    let input = module(
        "Main",
        vec![foo_class(), sub_class, inst],
        vec![class_export("Foo"), class_export("Sub")],
    );
    let output = desugar_one(input).expect("instance desugars");

    let (_, dictionary) = find_value(&output, "subString");
    let Expr::TypedValue { expr, .. } = dictionary else {
        panic!("dictionary values are typed");
    };
    let Expr::TypeClassDictionaryConstructorApp { dictionary: record, .. } = expr.as_ref() else {
        panic!("dictionary is a constructor application");
    };
    let Expr::Literal(Literal::Object(fields)) = record.as_ref() else {
        panic!("dictionary body is a record literal");
    };

    assert_eq!(fields.len(), 2);
    assert_eq!(fields[0], ("sub".to_owned(), str_lit("")));
    // The superclass slot is a thunk returning a deferred dictionary at the
    // instance's types.
    assert_eq!(
        fields[1],
        (
            "Foo0".to_owned(),
            Expr::Abs {
                param: Ident::new(prim::UNUSED),
                body: Box::new(Expr::DeferredDictionary {
                    class: qualified_class("Main", "Foo"),
                    args: vec![string_ty()],
                }),
            }
        )
    );
}

#[test]
fn member_types_are_specialized_before_the_membership_check() {
    // A class whose member type mentions the parameter twice; the instance
    // must still typecheck against the substituted signature downstream,
    // but here we only care that desugaring accepts it.
    let both = class_decl(
        "Both",
        &["a"],
        Vec::new(),
        vec![sig("both", Type::function(tv("a"), Type::function(tv("a"), tv("a"))))],
    );
    let inst = instance(
        "bothInt",
        qualified_class("Main", "Both"),
        vec![int_ty()],
        vec![member_value("both", lam("x", lam("y", local("x"))))],
    );
    let input = module("Main", vec![both, inst], vec![class_export("Both")]);
    assert!(desugar_one(input).is_ok());
}

// ----------------------------------------------------------------------------
// Membership errors
// ----------------------------------------------------------------------------

#[test]
fn missing_members_are_reported_with_instance_context() {
    let bar = class_decl("Bar", &["a"], Vec::new(), vec![sig("x", tv("a")), sig("y", tv("a"))]);
    let inst = instance(
        "barInt",
        qualified_class("Main", "Bar"),
        vec![int_ty()],
        vec![member_value("x", int(0))],
    );
    let input = module("Main", vec![bar, inst], vec![class_export("Bar")]);

    let errors = desugar_one(input).expect_err("member y is missing");
    let [error] = errors.errors() else { panic!("exactly one error") };
    assert_eq!(
        error,
        &DesugarError::ErrorInInstance {
            class: qualified_class("Main", "Bar"),
            tys: vec![int_ty()],
            source: Box::new(DesugarError::MissingClassMember { ident: Ident::new("y") }),
        }
    );
}

#[test]
fn extraneous_members_are_reported_with_instance_context() {
    let bar = class_decl("Bar", &["a"], Vec::new(), vec![sig("x", tv("a"))]);
    let inst = instance(
        "barInt",
        qualified_class("Main", "Bar"),
        vec![int_ty()],
        vec![member_value("x", int(0)), member_value("z", int(1))],
    );
    let input = module("Main", vec![bar, inst], vec![class_export("Bar")]);

    let errors = desugar_one(input).expect_err("member z is extraneous");
    assert_eq!(
        errors.errors()[0].unwrap_context(),
        &DesugarError::ExtraneousClassMember { ident: Ident::new("z") }
    );
}

#[test]
fn unknown_classes_are_reported() {
    let inst = instance("mysteryInt", qualified_class("Main", "Mystery"), vec![int_ty()], vec![]);
    let input = module("Main", vec![inst], vec![]);

    let errors = desugar_one(input).expect_err("the class does not exist");
    assert_eq!(
        errors.errors()[0].unwrap_context(),
        &DesugarError::UnknownClass { class: qualified_class("Main", "Mystery") }
    );
}

#[test]
fn instance_errors_render_the_class_and_its_types() {
    let error = DesugarError::ErrorInInstance {
        class: qualified_class("Main", "Bar"),
        tys: vec![int_ty()],
        source: Box::new(DesugarError::MissingClassMember { ident: Ident::new("y") }),
    };
    assert_eq!(
        error.to_string(),
        "Error in type class instance Main.Bar Prim.Int: Member 'y' has not been implemented"
    );
}

// ----------------------------------------------------------------------------
// Member scheduling
// ----------------------------------------------------------------------------

fn chain_class() -> Declaration {
    class_decl(
        "Chain",
        &["t"],
        Vec::new(),
        vec![sig("a", tv("t")), sig("b", tv("t")), sig("c", tv("t"))],
    )
}

#[test]
fn dependent_members_are_layered_with_record_updates() {
    let b_impl = Expr::App(Box::new(member_ref("Main", "a")), Box::new(int(1)));
    let c_impl = Expr::App(Box::new(member_ref("Main", "b")), Box::new(member_ref("Main", "a")));
    let inst = instance(
        "chainInt",
        qualified_class("Main", "Chain"),
        vec![int_ty()],
        vec![
            member_value("a", int(1)),
            member_value("b", b_impl.clone()),
            member_value("c", c_impl.clone()),
        ],
    );
    let input = module("Main", vec![chain_class(), inst], vec![class_export("Chain")]);
    let output = desugar_one(input).expect("the chain schedules");

    let (_, dictionary) = find_value(&output, "chainInt");
    let Expr::TypedValue { expr, .. } = dictionary else { panic!("dictionary values are typed") };

    let undefined = Expr::Var(Qualified::unqualified(Ident::new(prim::UNDEFINED)));
    let expected = Expr::ObjectUpdate {
        record: Box::new(Expr::ObjectUpdate {
            record: Box::new(Expr::TypeClassDictionaryConstructorApp {
                class: qualified_class("Main", "Chain"),
                dictionary: Box::new(Expr::Literal(Literal::Object(vec![
                    ("a".to_owned(), int(1)),
                    ("b".to_owned(), undefined.clone()),
                    ("c".to_owned(), undefined),
                ]))),
            }),
            updates: vec![("b".to_owned(), b_impl)],
        }),
        updates: vec![("c".to_owned(), c_impl)],
    };
    assert_eq!(expr.as_ref(), &expected);
}

#[test]
fn references_under_lambdas_do_not_constrain_scheduling() {
    // `a` reads `b` only once called, so both members land in the first
    // layer and no updates are needed.
    let inst = instance(
        "chainInt",
        qualified_class("Main", "Chain"),
        vec![int_ty()],
        vec![
            member_value("a", lam("u", member_ref("Main", "b"))),
            member_value("b", int(2)),
            member_value("c", int(3)),
        ],
    );
    let input = module("Main", vec![chain_class(), inst], vec![class_export("Chain")]);
    let output = desugar_one(input).expect("lambda references do not block scheduling");

    let (_, dictionary) = find_value(&output, "chainInt");
    let Expr::TypedValue { expr, .. } = dictionary else { panic!("dictionary values are typed") };
    assert!(
        matches!(expr.as_ref(), Expr::TypeClassDictionaryConstructorApp { .. }),
        "one layer means no record updates"
    );
}

#[test]
fn mutually_recursive_members_cannot_be_scheduled() {
    let two = class_decl("Two", &["t"], Vec::new(), vec![sig("a", tv("t")), sig("b", tv("t"))]);
    let inst = instance(
        "twoInt",
        qualified_class("Main", "Two"),
        vec![int_ty()],
        vec![
            member_value("a", member_ref("Main", "b")),
            member_value("b", member_ref("Main", "a")),
        ],
    );
    let input = module("Main", vec![two, inst], vec![class_export("Two")]);

    let errors = desugar_one(input).expect_err("the members form a cycle");
    assert_eq!(
        errors.errors()[0].unwrap_context(),
        &DesugarError::OverlappingNamesInLet {
            names: vec![Ident::new("a"), Ident::new("b")],
        }
    );
}

// ----------------------------------------------------------------------------
// Export visibility
// ----------------------------------------------------------------------------

#[test]
fn instances_of_unexported_classes_are_not_exported() {
    let inst = instance(
        "fooString",
        qualified_class("Main", "Foo"),
        vec![string_ty()],
        vec![member_value("foo", lam("s", local("s")))],
    );
    // `Foo` is local and absent from the export list.
    let input = module("Main", vec![foo_class(), inst], vec![]);
    let output = desugar_one(input).expect("instance desugars");
    assert_eq!(output.exports.as_deref(), Some(&[][..]));
}

#[test]
fn instances_mentioning_unexported_local_types_are_not_exported() {
    let inst = instance(
        "fooSecret",
        qualified_class("Main", "Foo"),
        vec![tycon("Main", "Secret")],
        vec![member_value("foo", lam("s", local("s")))],
    );
    let input = module("Main", vec![foo_class(), inst], vec![class_export("Foo")]);
    let output = desugar_one(input).expect("instance desugars");

    let exports = output.exports.as_deref().expect("exports survive");
    assert_eq!(exports, &[class_export("Foo")], "no instance export is added");
}

#[test]
fn exporting_the_mentioned_type_makes_the_instance_exportable() {
    let inst = instance(
        "fooSecret",
        qualified_class("Main", "Foo"),
        vec![tycon("Main", "Secret")],
        vec![member_value("foo", lam("s", local("s")))],
    );
    let input = module(
        "Main",
        vec![foo_class(), inst],
        vec![class_export("Foo"), type_export("Secret")],
    );
    let output = desugar_one(input).expect("instance desugars");

    let exports = output.exports.as_deref().expect("exports survive");
    assert_eq!(exports.len(), 3);
    assert!(matches!(
        &exports[2],
        DeclarationRef::TypeInstance { ident, .. } if ident.as_str() == "fooSecret"
    ));
}

// ----------------------------------------------------------------------------
// Externs and cross-module instances
// ----------------------------------------------------------------------------

fn show_externs() -> ExternsFile {
    ExternsFile {
        module_name: mn("Data.Show"),
        declarations: vec![ExternsDeclaration::Class {
            name: ProperName::new("Show"),
            params: vec![("a".to_owned(), None)],
            members: vec![(Ident::new("show"), Type::function(tv("a"), string_ty()))],
            constraints: Vec::new(),
            dependencies: Vec::new(),
        }],
    }
}

#[test]
fn instances_of_previously_compiled_classes_desugar() {
    let inst = instance(
        "showInt",
        qualified_class("Data.Show", "Show"),
        vec![int_ty()],
        vec![member_value("show", lam("n", str_lit("<int>")))],
    );
    let input = module("Main", vec![inst], vec![]);

    let output = desugar_type_classes(&[show_externs()], vec![input], passthrough)
        .map(|mut modules| modules.pop().expect("one module"))
        .expect("externs provide the class");

    let (_, dictionary) = find_value(&output, "showInt");
    assert!(matches!(dictionary, Expr::TypedValue { check: true, .. }));

    // Both the class and Prim.Int are owned elsewhere, so the instance is
    // visible by construction and gets exported.
    let exports = output.exports.as_deref().expect("exports survive");
    assert_eq!(exports.len(), 1);
}

#[test]
fn the_primitive_partial_class_is_preseeded() {
    let desugarer = TypeClassDesugarer::new(&[], passthrough);
    assert!(
        desugarer.member_map().contains_key(&(prim::module(), ProperName::new("Partial"))),
        "Prim.Partial is always available"
    );
}

#[test]
fn classes_desugared_earlier_in_the_batch_are_visible_later() {
    let provider = module("Data.Foo", vec![foo_class()], vec![class_export("Foo")]);
    let consumer = module(
        "Main",
        vec![instance(
            "fooString",
            qualified_class("Data.Foo", "Foo"),
            vec![string_ty()],
            vec![member_value("foo", lam("s", local("s")))],
        )],
        vec![],
    );

    let outputs = desugar_type_classes(&[], vec![provider, consumer], passthrough)
        .expect("the class is recorded before the consumer runs");
    assert_eq!(outputs.len(), 2);
}

// ----------------------------------------------------------------------------
// Newtype instances
// ----------------------------------------------------------------------------

#[test]
fn newtype_instances_wrap_the_given_dictionary() {
    let inst = Declaration::TypeInstance {
        ident: Ident::new("fooWrapped"),
        constraints: Vec::new(),
        class: qualified_class("Main", "Foo"),
        args: vec![string_ty()],
        body: TypeInstanceBody::NewtypeWithDictionary(Box::new(local("underlying"))),
    };
    let input = module("Main", vec![foo_class(), inst], vec![class_export("Foo")]);
    let output = desugar_one(input).expect("newtype instance desugars");

    let (kind, value) = find_value(&output, "fooWrapped");
    assert_eq!(kind, NameKind::Private);
    // No constraints, so the annotation is the bare dictionary type.
    assert_eq!(
        value,
        &Expr::TypedValue {
            check: true,
            expr: Box::new(local("underlying")),
            ty: Type::apply_all(tycon("Main", "Foo"), [string_ty()]),
        }
    );
}

#[test]
fn constrained_newtype_instances_keep_their_constraints() {
    let constraint = Constraint::new(qualified_class("Main", "Foo"), vec![tv("a")]);
    let inst = Declaration::TypeInstance {
        ident: Ident::new("fooNested"),
        constraints: vec![constraint.clone()],
        class: qualified_class("Main", "Foo"),
        args: vec![tv("a")],
        body: TypeInstanceBody::NewtypeWithDictionary(Box::new(local("underlying"))),
    };
    let input = module("Main", vec![foo_class(), inst], vec![class_export("Foo")]);
    let output = desugar_one(input).expect("newtype instance desugars");

    let (_, value) = find_value(&output, "fooNested");
    let expected_ty = Type::ForAll(
        "a".to_owned(),
        Box::new(Type::Constrained(
            vec![constraint],
            Box::new(Type::apply_all(tycon("Main", "Foo"), [tv("a")])),
        )),
    );
    assert!(matches!(value, Expr::TypedValue { ty, .. } if *ty == expected_ty));
}

// ----------------------------------------------------------------------------
// Ordering and pass-through
// ----------------------------------------------------------------------------

#[test]
fn classes_are_processed_before_instances_wherever_they_appear() {
    // The instance textually precedes its class.
    let inst = instance(
        "fooString",
        qualified_class("Main", "Foo"),
        vec![string_ty()],
        vec![member_value("foo", lam("s", local("s")))],
    );
    let input = module("Main", vec![inst, foo_class()], vec![class_export("Foo")]);
    assert!(desugar_one(input).is_ok(), "sorting lets the instance see its class");
}

#[test]
fn the_classes_first_sort_is_stable() {
    let input = module(
        "Main",
        vec![
            member_value("one", int(1)),
            foo_class(),
            member_value("two", int(2)),
            class_decl("Later", &["a"], Vec::new(), vec![sig("later", tv("a"))]),
        ],
        vec![class_export("Foo"), class_export("Later")],
    );
    let output = desugar_one(input).expect("module desugars");

    let class_names: Vec<&str> = output
        .declarations
        .iter()
        .filter_map(|decl| match decl.unwrap_positioned() {
            Declaration::TypeClass { name, .. } => Some(name.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(class_names, vec!["Foo", "Later"], "class order is preserved");

    let value_names: Vec<&str> = output
        .declarations
        .iter()
        .filter_map(|decl| match decl.unwrap_positioned() {
            Declaration::Value { ident, name_kind: NameKind::Public, .. } => Some(ident.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(value_names, vec!["one", "two"], "non-class order is preserved");

    let first_value = output
        .declarations
        .iter()
        .position(|decl| matches!(decl, Declaration::Value { name_kind: NameKind::Public, .. }))
        .expect("values survive");
    let last_class = output
        .declarations
        .iter()
        .rposition(Declaration::is_type_class)
        .expect("classes survive");
    assert!(last_class < first_value, "classes come first");
}

#[test]
fn declarations_without_classes_or_instances_pass_through_unchanged() {
    let declarations = vec![
        member_value("one", int(1)),
        Declaration::TypeSignature { ident: Ident::new("one"), ty: int_ty() },
        member_value("two", lam("x", local("x"))),
    ];
    let input = module("Main", declarations.clone(), vec![]);
    let output = desugar_one(input).expect("nothing to desugar");
    assert_eq!(output.declarations, declarations);
    assert_eq!(output.exports.as_deref(), Some(&[][..]));
}

// ----------------------------------------------------------------------------
// Internal invariants
// ----------------------------------------------------------------------------

#[test]
#[should_panic(expected = "derived instances")]
fn derived_instances_reaching_the_pass_are_a_bug() {
    let inst = Declaration::TypeInstance {
        ident: Ident::new("derivedFoo"),
        constraints: Vec::new(),
        class: qualified_class("Main", "Foo"),
        args: vec![string_ty()],
        body: TypeInstanceBody::Derived,
    };
    let input = module("Main", vec![foo_class(), inst], vec![]);
    let _ = desugar_one(input);
}

#[test]
#[should_panic(expected = "exports should have been elaborated")]
fn modules_without_export_lists_are_a_bug() {
    let input = Module {
        span: SourceSpan::generated(),
        comments: Vec::new(),
        name: mn("Main"),
        declarations: Vec::new(),
        exports: None,
    };
    let _ = TypeClassDesugarer::new(&[], passthrough).desugar_module(input);
}
