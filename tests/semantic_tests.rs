//! End-to-end semantic checks: every program here is compiled through the
//! full pipeline and either succeeds or fails with a specific error kind.

use wtscript::registry::{TypeRegistry, Value};
use wtscript::syntax::build::{class, enumeration, expr, func, interface, stmt, ty};
use wtscript::syntax::{BinaryOp, Expr, Stmt};
use wtscript::{Bundle, CompilationError, Config, ErrorKind, MemoryLoader, Script, Span};

fn print(e: Expr) -> Stmt {
    stmt::expr(expr::call(expr::var("print"), vec![e]))
}

fn run_with(config: Config, body: Vec<Stmt>) -> Result<String, (Bundle, CompilationError)> {
    let mut loader = MemoryLoader::new().with(Script::new("/main.wts", body));
    let mut bundle = Bundle::new(config);
    bundle.append_entry("/main.wts");
    match bundle.compile(&mut loader) {
        Ok(out) => Ok(out),
        Err(err) => Err((bundle, err)),
    }
}

fn run(body: Vec<Stmt>) -> Result<String, (Bundle, CompilationError)> {
    run_with(Config::new().compact(true), body)
}

#[track_caller]
fn ok(body: Vec<Stmt>) -> String {
    match run(body) {
        Ok(out) => out,
        Err((bundle, err)) => panic!("unexpected error: {}", bundle.render_error(&err)),
    }
}

#[track_caller]
fn fail(body: Vec<Stmt>) -> CompilationError {
    match run(body) {
        Ok(out) => panic!("expected an error, got output {out:?}"),
        Err((_, err)) => err,
    }
}

// =============================================================================
// Check
// =============================================================================

#[test]
fn test_check_is_reflexive_and_any_accepts_everything() {
    let registry = TypeRegistry::with_builtins();
    let span = Span::default();
    let values = [
        Value::int(),
        Value::string(),
        Value::LiteralInt(3),
        Value::array(Value::number()),
        Value::tuple(vec![Value::int(), Value::boolean()]),
    ];
    for value in &values {
        registry.check(value, value, span).unwrap();
        registry.check(&Value::Any, value, span).unwrap();
        assert!(registry.check(value, &Value::Any, span).is_err());
    }
}

#[test]
fn test_literals_narrow() {
    let registry = TypeRegistry::with_builtins();
    let span = Span::default();
    registry.check(&Value::LiteralInt(3), &Value::LiteralInt(3), span).unwrap();
    assert!(registry.check(&Value::LiteralInt(3), &Value::LiteralInt(4), span).is_err());
    assert!(registry.check(&Value::LiteralInt(3), &Value::int(), span).is_err());
    registry.check(&Value::int(), &Value::LiteralInt(3), span).unwrap();
}

// =============================================================================
// Names
// =============================================================================

#[test]
fn test_undefined_identifier() {
    let err = fail(vec![print(expr::var(("missing", 1, 7)))]);
    assert_eq!(err.kind, ErrorKind::UndefinedIdentifier { name: "missing".into() });
    assert_eq!((err.span.line, err.span.col), (1, 7));
}

#[test]
fn test_redeclaration_points_at_both() {
    let err = fail(vec![
        stmt::let_(("x", 1, 5), None, Some(expr::int(1))),
        stmt::let_(("x", 2, 5), None, Some(expr::int(2))),
        print(expr::var("x")),
    ]);
    assert!(matches!(err.kind, ErrorKind::DuplicateDeclaration { .. }));
    assert_eq!(err.span.line, 2);
    assert_eq!(err.notes[0].span.line, 1);
}

#[test]
fn test_builtins_can_not_be_shadowed() {
    let err = fail(vec![stmt::export(stmt::let_("print", None, Some(expr::int(1))))]);
    assert_eq!(err.kind, ErrorKind::DuplicateDeclaration { name: "print".into() });
}

// =============================================================================
// Usage
// =============================================================================

#[test]
fn test_unread_binding_is_reported() {
    let (bundle, err) = run(vec![stmt::let_(("x", 1, 5), None, Some(expr::int(5)))]).unwrap_err();
    assert_eq!(err.kind, ErrorKind::UnusedDeclaration { name: "x".into() });
    assert_eq!(
        bundle.render_error(&err),
        "/main.wts:1:5: 'x' declared but not used"
    );
}

#[test]
fn test_read_binding_is_accepted() {
    let out = ok(vec![
        stmt::let_("x", None, Some(expr::int(5))),
        print(expr::var("x")),
    ]);
    assert_eq!(out, "let a=5;console.log(a);");
}

#[test]
fn test_unused_check_is_configurable() {
    let body = vec![stmt::let_("x", None, Some(expr::int(5)))];
    let out = run_with(Config::new().compact(true).check_unused(false), body).unwrap();
    assert_eq!(out, "let a=5;");
}

#[test]
fn test_unreachable_code() {
    let err = fail(vec![
        func::function("f")
            .body(vec![stmt::throw(expr::string("no")), print(expr::int(1))])
            .stmt(),
        stmt::expr(expr::call(expr::var("f"), vec![])),
    ]);
    assert_eq!(err.message(), "unreachable statement after throw statement");
}

// =============================================================================
// Overloads
// =============================================================================

/// `function f(a: Int, b: Int = 0): Int`, called with `args`.
fn call_with_optional(args: Vec<Expr>) -> Vec<Stmt> {
    vec![
        func::function("f")
            .param("a", ty::named("Int"))
            .param_default("b", ty::named("Int"), expr::int(0))
            .returns(ty::named("Int"))
            .body(vec![stmt::ret(Some(expr::add(expr::var("a"), expr::var("b"))))])
            .stmt(),
        print(expr::call(expr::var("f"), args)),
    ]
}

#[test]
fn test_optional_parameters_add_overloads() {
    ok(call_with_optional(vec![expr::int(3)]));
    ok(call_with_optional(vec![expr::int(3), expr::int(4)]));
}

#[test]
fn test_no_overload_matches() {
    let err = fail(call_with_optional(vec![expr::string("a")]));
    assert!(matches!(err.kind, ErrorKind::OverloadMismatch { .. }));
    // one note per rejected overload
    assert!(err.notes.len() >= 2);

    let err = fail(call_with_optional(vec![expr::int(3), expr::int(4), expr::int(5)]));
    assert!(matches!(err.kind, ErrorKind::OverloadMismatch { .. }));
}

#[test]
fn test_return_type_is_checked() {
    let err = fail(vec![
        func::function("f")
            .returns(ty::named("Int"))
            .body(vec![stmt::ret(Some(expr::string("x")))])
            .stmt(),
        print(expr::call(expr::var("f"), vec![])),
    ]);
    assert!(matches!(err.kind, ErrorKind::TypeMismatch { .. }));
}

// =============================================================================
// Interfaces
// =============================================================================

fn named_interface() -> Stmt {
    stmt::export(
        interface::interface("Named")
            .method("name", vec![], Some(ty::named("String")))
            .stmt(),
    )
}

fn name_method() -> wtscript::syntax::Function {
    func::anonymous()
        .returns(ty::named("String"))
        .body(vec![stmt::ret(Some(expr::string("thing")))])
        .build()
}

#[test]
fn test_conforming_class() {
    ok(vec![
        named_interface(),
        stmt::export(
            class::class("Thing")
                .implements(ty::named("Named"))
                .method("name", name_method())
                .stmt(),
        ),
    ]);
}

#[test]
fn test_missing_member_breaks_conformance() {
    let err = fail(vec![
        named_interface(),
        stmt::export(class::class("Thing").implements(ty::named("Named")).stmt()),
    ]);
    assert_eq!(
        err.kind,
        ErrorKind::ConformanceViolation {
            interface: "Named".into(),
            prototype: "Thing".into(),
            reason: "missing method 'name'".into(),
        }
    );
}

#[test]
fn test_instances_check_against_interfaces() {
    ok(vec![
        named_interface(),
        class::class("Thing")
            .implements(ty::named("Named"))
            .method("name", name_method())
            .stmt(),
        stmt::const_("n", Some(ty::named("Named")), expr::new(expr::var("Thing"), vec![])),
        print(expr::method_call(expr::var("n"), "name", vec![])),
    ]);
}

fn universal_thing(implements: &str) -> Stmt {
    stmt::export(
        class::class("Thing")
            .universal("Thing")
            .implements(ty::named(implements))
            .property("id", ty::named("Int"), Some(expr::int(0)))
            .stmt(),
    )
}

#[test]
fn test_universal_classes_register_with_their_interface() {
    let out = ok(vec![
        stmt::export(interface::interface("Record").universal().stmt()),
        universal_thing("Record"),
    ]);
    assert!(out.contains("class Record{static __implementations__=[];}"));
    assert!(out.ends_with("Record.__implementations__.push(Thing);"));
    assert_eq!(out.matches(".__implementations__.push(").count(), 1);
}

#[test]
fn test_universal_classes_register_with_extended_interfaces() {
    let out = ok(vec![
        stmt::export(interface::interface("Record").universal().stmt()),
        stmt::export(
            interface::interface("Entity")
                .universal()
                .extends(ty::named("Record"))
                .stmt(),
        ),
        universal_thing("Entity"),
    ]);
    assert!(out.ends_with(
        "Entity.__implementations__.push(Thing);Record.__implementations__.push(Thing);"
    ));
    assert_eq!(out.matches(".__implementations__.push(").count(), 2);
}

#[test]
fn test_plain_interfaces_pass_universal_ancestors_along() {
    let out = ok(vec![
        stmt::export(interface::interface("Record").universal().stmt()),
        stmt::export(interface::interface("Entity").extends(ty::named("Record")).stmt()),
        universal_thing("Entity"),
    ]);
    assert!(out.ends_with("Record.__implementations__.push(Thing);"));
    assert!(!out.contains("Entity.__implementations__"));

    let err = fail(vec![
        stmt::export(interface::interface("Record").universal().stmt()),
        stmt::export(interface::interface("Entity").extends(ty::named("Record")).stmt()),
        stmt::export(class::class("Thing").implements(ty::named("Entity")).stmt()),
    ]);
    assert!(matches!(err.kind, ErrorKind::Semantic { .. }));
}

// =============================================================================
// Abstractness
// =============================================================================

fn shape() -> Stmt {
    stmt::export(
        class::class("Shape")
            .as_abstract()
            .abstract_method("area", vec![], Some(ty::named("Number")))
            .stmt(),
    )
}

#[test]
fn test_abstract_class_needs_abstract_members() {
    let err = fail(vec![stmt::export(class::class("Empty").as_abstract().stmt())]);
    assert!(matches!(err.kind, ErrorKind::AbstractnessViolation { .. }));
}

#[test]
fn test_concrete_subclass_implements_everything() {
    ok(vec![
        shape(),
        stmt::export(
            class::class("Unit")
                .extends(ty::named("Shape"))
                .method(
                    "area",
                    func::anonymous()
                        .returns(ty::named("Number"))
                        .body(vec![stmt::ret(Some(expr::float(1.0)))])
                        .build(),
                )
                .stmt(),
        ),
    ]);
}

#[test]
fn test_unimplemented_abstract_member() {
    let err = fail(vec![
        shape(),
        stmt::export(class::class("Blob").extends(ty::named("Shape")).stmt()),
    ]);
    assert!(matches!(err.kind, ErrorKind::AbstractnessViolation { .. }));
    assert_eq!(err.notes[0].message, "declared abstract here");
}

#[test]
fn test_abstract_classes_can_not_be_constructed() {
    let err = fail(vec![shape(), print(expr::new(expr::var("Shape"), vec![]))]);
    assert!(matches!(err.kind, ErrorKind::AbstractnessViolation { .. }));
}

// =============================================================================
// Enums
// =============================================================================

#[test]
fn test_enum_members_are_typed() {
    let out = ok(vec![
        stmt::export(
            enumeration::enumeration("Level", ty::named("Int"))
                .member("Low", None)
                .member("High", None)
                .stmt(),
        ),
        stmt::const_("limit", Some(ty::named("Int")), expr::member(expr::var("Level"), "High")),
        print(expr::binary(BinaryOp::Add, expr::var("limit"), expr::int(1))),
    ]);
    assert!(out.contains("static get High(){return 1;}"));
    assert!(out.ends_with("const a=Level.High;console.log(a+1);"));
}

#[test]
fn test_enum_names_are_reserved() {
    let err = fail(vec![stmt::export(
        enumeration::enumeration("Bad", ty::named("Int"))
            .member("values", None)
            .stmt(),
    )]);
    assert_eq!(err.message(), "enum member name 'values' is reserved");
}
