//! Whole-program tests for the bundle: dependency discovery, ordering,
//! dead-file elimination, output naming and determinism.

use wtscript::syntax::build::{class, expr, func, stmt, ty};
use wtscript::syntax::{Expr, Stmt};
use wtscript::{Bundle, CompilationError, Config, ErrorKind, MemoryLoader, Script};

fn print(e: Expr) -> Stmt {
    stmt::expr(expr::call(expr::var("print"), vec![e]))
}

fn loader(files: Vec<(&str, Vec<Stmt>)>) -> MemoryLoader {
    let mut loader = MemoryLoader::new();
    for (path, body) in files {
        loader.add(Script::new(path, body));
    }
    loader
}

fn compile(config: Config, entries: &[&str], mut files: MemoryLoader) -> Result<(Bundle, String), (Bundle, CompilationError)> {
    let mut bundle = Bundle::new(config);
    for entry in entries {
        bundle.append_entry(*entry);
    }
    match bundle.compile(&mut files) {
        Ok(out) => Ok((bundle, out)),
        Err(err) => Err((bundle, err)),
    }
}

/// A small shop: a universal item class, a cart that totals items, and an
/// entry point using both.
fn shop() -> MemoryLoader {
    loader(vec![
        (
            "/shop/item.wts",
            vec![stmt::export(
                class::class("Item")
                    .universal("ShopItem")
                    .property("price", ty::named("Int"), Some(expr::int(0)))
                    .property("name", ty::named("String"), Some(expr::string("")))
                    .stmt(),
            )],
        ),
        (
            "/shop/cart.wts",
            vec![
                stmt::import_names(&["Item"], "./item"),
                stmt::export(
                    func::function("total")
                        .param("items", ty::array(ty::named("Item")))
                        .returns(ty::named("Int"))
                        .body(vec![
                            stmt::let_("sum", Some(ty::named("Int")), Some(expr::int(0))),
                            stmt::for_(
                                Some(stmt::let_("i", Some(ty::named("Int")), Some(expr::int(0)))),
                                Some(expr::binary(
                                    wtscript::syntax::BinaryOp::Lt,
                                    expr::var("i"),
                                    expr::member(expr::var("items"), "length"),
                                )),
                                Some(expr::assign_op(
                                    wtscript::syntax::AssignOp::Add,
                                    expr::var("i"),
                                    expr::int(1),
                                )),
                                vec![stmt::expr(expr::assign_op(
                                    wtscript::syntax::AssignOp::Add,
                                    expr::var("sum"),
                                    expr::member(expr::index(expr::var("items"), expr::var("i")), "price"),
                                ))],
                            ),
                            stmt::ret(Some(expr::var("sum"))),
                        ])
                        .stmt(),
                ),
            ],
        ),
        (
            "/shop/main.wts",
            vec![
                stmt::import_names(&["Item"], "./item"),
                stmt::import_names(&["total"], "./cart"),
                stmt::const_("apple", None, expr::new(expr::var("Item"), vec![])),
                print(expr::call(
                    expr::var("total"),
                    vec![expr::array(vec![expr::var("apple")])],
                )),
            ],
        ),
    ])
}

// =============================================================================
// Ordering
// =============================================================================

#[test]
fn test_dependencies_are_emitted_first() {
    let (bundle, _) = compile(Config::default(), &["/shop/main.wts"], shop()).unwrap();
    assert_eq!(
        bundle.emission_order(),
        ["/shop/item.wts", "/shop/cart.wts", "/shop/main.wts"]
    );
    let deps = bundle.dependencies();
    assert_eq!(deps["/shop/main.wts"], ["/shop/item.wts", "/shop/cart.wts"]);
    assert!(deps["/shop/item.wts"].is_empty());
}

#[test]
fn test_output_is_deterministic() {
    for compact in [false, true] {
        let (_, first) = compile(Config::new().compact(compact), &["/shop/main.wts"], shop()).unwrap();
        let (_, second) = compile(Config::new().compact(compact), &["/shop/main.wts"], shop()).unwrap();
        assert_eq!(first, second);
    }
}

#[test]
fn test_universal_class_keeps_its_name() {
    let (_, out) = compile(Config::new().compact(true), &["/shop/main.wts"], shop()).unwrap();
    assert!(out.starts_with("class ShopItem{static __propertyTypes__={price:\"Int\",name:\"String\"};"));
    assert!(out.contains("new ShopItem()"));
}

// =============================================================================
// Cycles
// =============================================================================

#[test]
fn test_mutual_imports_are_a_cycle() {
    let files = loader(vec![
        (
            "/a.wts",
            vec![
                stmt::import_names(&["b"], "./b"),
                stmt::export(stmt::const_("a", None, expr::int(1))),
                print(expr::var("b")),
            ],
        ),
        (
            "/b.wts",
            vec![
                stmt::import_names(&["a"], "./a"),
                stmt::export(stmt::const_("b", None, expr::var("a"))),
            ],
        ),
    ]);
    let (bundle, err) = compile(Config::default(), &["/a.wts"], files).unwrap_err();
    let ErrorKind::CircularDependency { cycle } = &err.kind else {
        panic!("expected a cycle, got {}", bundle.render_error(&err));
    };
    assert!(cycle.contains(&"/a.wts".to_string()));
    assert!(cycle.contains(&"/b.wts".to_string()));
    assert_eq!(cycle.first(), cycle.last());
}

#[test]
fn test_longer_cycle_is_reported_in_order() {
    let files = loader(vec![
        ("/main.wts", vec![stmt::import(&[], "./x")]),
        ("/x.wts", vec![stmt::import(&[], "./y")]),
        ("/y.wts", vec![stmt::import(&[], "./z")]),
        ("/z.wts", vec![stmt::import(&[], "./x")]),
    ]);
    let (_, err) = compile(Config::default(), &["/main.wts"], files).unwrap_err();
    assert_eq!(
        err.message(),
        "circular dependency: /x.wts -> /y.wts -> /z.wts -> /x.wts"
    );
}

// =============================================================================
// Dead-file elimination
// =============================================================================

fn aggregate_project() -> MemoryLoader {
    loader(vec![
        (
            "/e.wts",
            vec![stmt::import_names(&["X"], "./f"), print(expr::var("X"))],
        ),
        (
            "/f.wts",
            vec![
                stmt::export(stmt::const_("X", None, expr::int(1))),
                stmt::export_from(&[("Y", "Y")], "./g"),
            ],
        ),
        (
            "/g.wts",
            // never analysed, so the bad initializer goes unnoticed
            vec![stmt::export(stmt::const_(
                "Y",
                Some(ty::named("Int")),
                expr::string("unused"),
            ))],
        ),
    ])
}

#[test]
fn test_unneeded_files_are_hidden() {
    let (bundle, out) = compile(Config::new().compact(true), &["/e.wts"], aggregate_project()).unwrap();
    assert!(!bundle.is_hidden("/e.wts"));
    assert!(!bundle.is_hidden("/f.wts"));
    assert!(bundle.is_hidden("/g.wts"));
    assert_eq!(bundle.emission_order(), ["/f.wts", "/e.wts"]);
    assert_eq!(out, "const a=1;console.log(a);");
}

#[test]
fn test_needed_aggregate_source_is_kept() {
    let files = loader(vec![
        (
            "/e.wts",
            vec![stmt::import_names(&["Y"], "./f"), print(expr::var("Y"))],
        ),
        (
            "/f.wts",
            vec![
                stmt::export(stmt::const_("X", None, expr::int(1))),
                stmt::export_from(&[("Y", "Y")], "./g"),
            ],
        ),
        ("/g.wts", vec![stmt::export(stmt::const_("Y", None, expr::int(2)))]),
    ]);
    let (bundle, out) = compile(Config::new().compact(true), &["/e.wts"], files).unwrap();
    assert!(!bundle.is_hidden("/g.wts"));
    assert!(bundle.is_hidden("/f.wts"));
    assert_eq!(out, "const a=2;console.log(a);");
}

// =============================================================================
// Naming
// =============================================================================

#[test]
fn test_module_level_names_are_unique_across_files() {
    let files = loader(vec![
        (
            "/main.wts",
            vec![
                stmt::import_names(&["count"], "./lib"),
                stmt::let_("local", None, Some(expr::var("count"))),
                print(expr::var("local")),
            ],
        ),
        (
            "/lib.wts",
            vec![
                stmt::let_("local", None, Some(expr::int(1))),
                stmt::export(stmt::const_("count", None, expr::var("local"))),
            ],
        ),
    ]);
    let (_, out) = compile(Config::default(), &["/main.wts"], files).unwrap();
    assert_eq!(
        out,
        "// target: browser\n\
         let local = 1;\n\
         const count = local;\n\
         let local1 = count;\n\
         console.log(local1);\n"
    );
}

#[test]
fn test_entry_exports_keep_their_names() {
    let files = loader(vec![(
        "/main.wts",
        vec![
            stmt::let_("helper", None, Some(expr::int(2))),
            stmt::export(
                func::function("main")
                    .returns(ty::named("Int"))
                    .body(vec![stmt::ret(Some(expr::var("helper")))])
                    .stmt(),
            ),
        ],
    )]);
    let (_, out) = compile(Config::new().compact(true), &["/main.wts"], files).unwrap();
    assert_eq!(out, "let a=2;function main(){return a;}");
}

#[test]
fn test_universal_name_collision_is_reported_in_both_files() {
    let files = loader(vec![
        (
            "/main.wts",
            vec![
                stmt::import(&[("A", "A")], "./a"),
                stmt::import(&[("B", "B")], "./b"),
                print(expr::new(expr::var("A"), vec![])),
                print(expr::new(expr::var("B"), vec![])),
            ],
        ),
        (
            "/a.wts",
            vec![stmt::export(class::class(("A", 1, 8)).universal("Shared").stmt())],
        ),
        (
            "/b.wts",
            vec![stmt::export(class::class(("B", 2, 8)).universal("Shared").stmt())],
        ),
    ]);
    let (bundle, err) = compile(Config::default(), &["/main.wts"], files).unwrap_err();
    assert_eq!(err.kind, ErrorKind::NameCollision { name: "Shared".into() });
    assert_eq!(
        bundle.render_error(&err),
        "/b.wts:2:8: 'Shared' must be unique project wide\n  note at /a.wts:1:8: previous usage"
    );
}

// =============================================================================
// Loading
// =============================================================================

#[test]
fn test_foreign_imports_are_reported() {
    let files = loader(vec![(
        "/page.wts",
        vec![stmt::import(&[], "./page.wtt"), print(expr::int(1))],
    )]);
    let (bundle, out) = compile(Config::new().compact(true), &["/page.wts"], files).unwrap();
    assert_eq!(out, "console.log(1);");
    let foreign = bundle.foreign_dependencies();
    assert_eq!(foreign.len(), 1);
    assert_eq!(foreign[0].1.path, "/page.wtt");
}

#[test]
fn test_missing_export_is_not_found() {
    let files = loader(vec![
        (
            "/main.wts",
            vec![stmt::import_names(&["missing"], "./lib"), print(expr::var("missing"))],
        ),
        ("/lib.wts", vec![stmt::export(stmt::const_("present", None, expr::int(1)))]),
    ]);
    let (_, err) = compile(Config::default(), &["/main.wts"], files).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_wildcard_reexports_are_searched() {
    let files = loader(vec![
        (
            "/main.wts",
            vec![stmt::import_names(&["deep"], "./index"), print(expr::var("deep"))],
        ),
        (
            "/index.wts",
            vec![stmt::export_all("./one"), stmt::export_all("./two")],
        ),
        ("/one.wts", vec![stmt::export(stmt::const_("shallow", None, expr::int(1)))]),
        ("/two.wts", vec![stmt::export(stmt::const_("deep", None, expr::int(2)))]),
    ]);
    let (bundle, out) = compile(Config::new().compact(true), &["/main.wts"], files).unwrap();
    assert!(bundle.is_hidden("/one.wts"));
    assert_eq!(out, "const a=2;console.log(a);");
}
