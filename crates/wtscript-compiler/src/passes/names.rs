//! Output naming - give every binding the identifier it is emitted under.
//!
//! Fixed names come first: exports of entry modules keep their export name,
//! and universal classes take their universal name. Both must be unique
//! project wide. Every other binding then gets a generated name from the
//! [`Namespace`], with one namespace node per function.

use wtscript_core::{CompilationError, CompileResult, ErrorKind, Span, VarId};
use wtscript_registry::VarKind;
use wtscript_syntax::{Function, Ident, Stmt, Visitor};

use crate::context::{CompilationContext, OUTPUT_GLOBALS};
use crate::namespace::{Namespace, NodeId, Owner};

pub struct UniqueNames<'a> {
    ctx: &'a mut CompilationContext,
    namespace: &'a mut Namespace,
    node: NodeId,
}

impl<'a> UniqueNames<'a> {
    pub fn new(ctx: &'a mut CompilationContext, namespace: &'a mut Namespace) -> Self {
        let node = namespace.root();
        Self {
            ctx,
            namespace,
            node,
        }
    }

    /// Reserve the emitted names of every global, so generated names never
    /// shadow them. Globals keep their names.
    pub fn reserve_globals(&mut self) {
        for (_, var) in self.ctx.globals() {
            let name = self.ctx.variables.name(var);
            let head = name.split('.').next().unwrap_or(name);
            self.namespace.reserve(head);
        }
        for name in OUTPUT_GLOBALS {
            self.namespace.reserve(name);
        }
    }

    /// Give `var` a name that must be unique project wide.
    pub fn claim_fixed(&mut self, var: VarId, name: &str) -> CompileResult<()> {
        if self.namespace.name_of(var).is_some() {
            return Ok(());
        }
        let root = self.namespace.root();
        let variable = self.ctx.variables.get(var);
        let mut span = variable.span;
        if let Some(file) = variable.file {
            span = span.in_file(file);
        }
        match self.namespace.owner(root, name) {
            None => {
                tracing::trace!(name, "fixed name");
                self.namespace.claim(root, var, name);
                self.ctx.variables.rename(var, name);
                Ok(())
            }
            Some(Owner::Var(previous)) => {
                let previous = self.ctx.variables.get(previous);
                let mut previous_span = previous.span;
                if let Some(file) = previous.file {
                    previous_span = previous_span.in_file(file);
                }
                Err(name_collision(name, span).with_note("previous usage", previous_span))
            }
            Some(Owner::Reserved) => Err(name_collision(name, span)),
        }
    }

    /// Claim the universal names of every universal class in `body`,
    /// including nested ones.
    pub fn claim_universal(&mut self, body: &[Stmt]) -> CompileResult<()> {
        let mut finder = UniversalClasses::default();
        finder.visit_block(body)?;
        for (var, name) in finder.found {
            self.claim_fixed(var, &name)?;
        }
        Ok(())
    }

    /// Name every binding declared in a module body.
    pub fn rename_module(&mut self, body: &[Stmt]) -> CompileResult<()> {
        self.node = self.namespace.root();
        self.visit_block(body)
    }

    fn assign(&mut self, ident: &Ident) {
        let Some(var) = ident.binding() else {
            return;
        };
        let variable = self.ctx.variables.get(var);
        if matches!(
            variable.kind,
            VarKind::Builtin | VarKind::Define | VarKind::This | VarKind::Super
        ) {
            return;
        }
        if self.namespace.name_of(var).is_some() {
            return;
        }
        let original = variable.original.clone();
        let name = self.namespace.unique(self.node, var, &original);
        self.ctx.variables.rename(var, name);
    }
}

fn name_collision(name: &str, span: Span) -> CompilationError {
    CompilationError::new(
        ErrorKind::NameCollision {
            name: name.to_string(),
        },
        span,
    )
}

impl Visitor for UniqueNames<'_> {
    type Error = CompilationError;

    fn visit_stmt(&mut self, stmt: &Stmt) -> CompileResult<()> {
        match stmt {
            Stmt::Var(decl) => {
                for declarator in &decl.decls {
                    self.assign(&declarator.name);
                }
            }
            Stmt::Function(func) => {
                if let Some(name) = &func.name {
                    self.assign(name);
                }
            }
            Stmt::Class(class) => self.assign(&class.name),
            Stmt::Interface(interface) => self.assign(&interface.name),
            Stmt::Enum(decl) => self.assign(&decl.name),
            Stmt::Try {
                catch: Some(catch), ..
            } => {
                if let Some(param) = &catch.param {
                    self.assign(param);
                }
            }
            _ => {}
        }
        stmt.walk(self)
    }

    fn visit_function(&mut self, func: &Function) -> CompileResult<()> {
        let parent = self.node;
        self.node = self.namespace.child(parent);
        // a named function expression binds its name inside its own scope
        if let Some(name) = &func.name {
            self.assign(name);
        }
        for param in &func.params {
            self.assign(&param.name);
        }
        let result = func.walk(self);
        self.node = parent;
        result
    }
}

/// Collects universal class declarations at any depth.
#[derive(Default)]
struct UniversalClasses {
    found: Vec<(VarId, String)>,
}

impl Visitor for UniversalClasses {
    type Error = CompilationError;

    fn visit_stmt(&mut self, stmt: &Stmt) -> CompileResult<()> {
        if let Stmt::Class(class) = stmt
            && let Some(name) = &class.universal_name
            && let Some(var) = class.name.binding()
        {
            self.found.push((var, name.clone()));
        }
        stmt.walk(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wtscript_core::{Config, FileId};
    use wtscript_syntax::build::{class, expr, func, stmt, ty};

    use crate::namespace::NameGenerator;
    use crate::passes::NameResolver;

    fn resolve(config: Config, modules: &[&[Stmt]]) -> CompilationContext {
        let mut ctx = CompilationContext::new(config);
        for (i, body) in modules.iter().enumerate() {
            NameResolver::new(&mut ctx, FileId::new(i as u32 + 1))
                .resolve_module(body)
                .unwrap();
        }
        ctx
    }

    fn rename(config: Config, modules: &[&[Stmt]]) -> CompilationContext {
        let mut ctx = resolve(config, modules);
        let mut namespace = Namespace::new(NameGenerator::new(ctx.config.compact));
        let mut names = UniqueNames::new(&mut ctx, &mut namespace);
        names.reserve_globals();
        for body in modules {
            names.rename_module(body).unwrap();
        }
        ctx
    }

    fn name_of<'c>(ctx: &'c CompilationContext, ident: &Ident) -> &'c str {
        ctx.variables.name(ident.binding().unwrap())
    }

    fn declared(stmt: &Stmt) -> &Ident {
        match stmt {
            Stmt::Var(decl) => &decl.decls[0].name,
            Stmt::Function(func) => func.name.as_ref().unwrap(),
            Stmt::Class(class) => &class.name,
            other => panic!("no declaration in {other:?}"),
        }
    }

    fn param(stmt: &Stmt, index: usize) -> &Ident {
        match stmt {
            Stmt::Function(func) => &func.params[index].name,
            other => panic!("not a function: {other:?}"),
        }
    }

    #[test]
    fn readable_names_are_kept() {
        let body = vec![
            stmt::let_("x", None, Some(expr::int(1))),
            func::function("f")
                .param("a", ty::named("Int"))
                .body(vec![stmt::let_("b", None, Some(expr::var("a")))])
                .stmt(),
        ];
        let ctx = rename(Config::default(), &[&body]);
        assert_eq!(name_of(&ctx, declared(&body[0])), "x");
        assert_eq!(name_of(&ctx, declared(&body[1])), "f");
        assert_eq!(name_of(&ctx, param(&body[1], 0)), "a");
    }

    #[test]
    fn module_level_names_share_one_scope() {
        let first = vec![stmt::let_("x", None, Some(expr::int(1)))];
        let second = vec![stmt::let_("x", None, Some(expr::int(2)))];
        let ctx = rename(Config::default(), &[&first, &second]);
        assert_eq!(name_of(&ctx, declared(&first[0])), "x");
        assert_eq!(name_of(&ctx, declared(&second[0])), "x1");
    }

    #[test]
    fn compact_names() {
        let body = vec![
            func::function("f")
                .param("p", ty::named("Int"))
                .body(vec![stmt::let_("q", None, Some(expr::var("p")))])
                .stmt(),
            stmt::let_("y", None, Some(expr::int(1))),
        ];
        let ctx = rename(Config::new().compact(true), &[&body]);
        assert_eq!(name_of(&ctx, declared(&body[0])), "a");
        assert_eq!(name_of(&ctx, param(&body[0], 0)), "b");
        // b and c are used inside f, which can see y
        assert_eq!(name_of(&ctx, declared(&body[1])), "d");
    }

    #[test]
    fn output_globals_are_not_shadowed() {
        let body = vec![stmt::let_("window", None, Some(expr::int(1)))];
        let ctx = rename(Config::default(), &[&body]);
        assert_eq!(name_of(&ctx, declared(&body[0])), "window1");
    }

    #[test]
    fn renaming_is_idempotent() {
        let body = vec![stmt::let_("x", None, Some(expr::int(1)))];
        let mut ctx = resolve(Config::new().compact(true), &[&body]);
        let mut namespace = Namespace::new(NameGenerator::new(true));
        let mut names = UniqueNames::new(&mut ctx, &mut namespace);
        names.rename_module(&body).unwrap();
        names.rename_module(&body).unwrap();
        assert_eq!(name_of(&ctx, declared(&body[0])), "a");
    }

    #[test]
    fn fixed_names() {
        let body = vec![
            func::function("main").stmt(),
            stmt::let_("x", None, Some(expr::int(1))),
        ];
        let mut ctx = resolve(Config::new().compact(true), &[&body]);
        let mut namespace = Namespace::new(NameGenerator::new(true));
        let mut names = UniqueNames::new(&mut ctx, &mut namespace);
        let main = declared(&body[0]).binding().unwrap();
        names.claim_fixed(main, "main").unwrap();
        names.rename_module(&body).unwrap();
        assert_eq!(name_of(&ctx, declared(&body[0])), "main");
        assert_eq!(name_of(&ctx, declared(&body[1])), "a");
    }

    #[test]
    fn universal_names_are_unique_project_wide() {
        let first = vec![class::class(("A", 1, 7)).universal("Point").stmt()];
        let second = vec![class::class(("B", 3, 7)).universal("Point").stmt()];
        let mut ctx = resolve(Config::default(), &[&first, &second]);
        let mut namespace = Namespace::new(NameGenerator::new(false));
        let mut names = UniqueNames::new(&mut ctx, &mut namespace);
        names.claim_universal(&first).unwrap();
        let err = names.claim_universal(&second).unwrap_err();

        assert_eq!(err.kind, ErrorKind::NameCollision { name: "Point".into() });
        assert_eq!(err.span.file, FileId::new(2));
        assert_eq!(err.notes[0].message, "previous usage");
        assert_eq!(err.notes[0].span.file, FileId::new(1));
        assert_eq!(name_of(&ctx, declared(&first[0])), "Point");
    }

    #[test]
    fn fixed_names_can_not_take_reserved_words() {
        let body = vec![class::class("A").universal("Array").stmt()];
        let mut ctx = resolve(Config::default(), &[&body]);
        let mut namespace = Namespace::new(NameGenerator::new(false));
        let mut names = UniqueNames::new(&mut ctx, &mut namespace);
        names.reserve_globals();
        let err = names.claim_universal(&body).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::NameCollision { .. }));
    }
}
