//! Statements and function bodies.

use rustc_hash::FxHashSet;
use wtscript_core::{CompilationError, CompileResult, TypeHash};
use wtscript_registry::Value;
use wtscript_syntax::{ExportDecl, Function, Stmt, VarDecl, VarKind};

use super::returns::all_paths_return;
use super::{FunctionFrame, TypeEvaluator};

/// How a function body relates to a class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum FunctionRole {
    Plain,
    Method,
    Constructor(TypeHash),
}

impl TypeEvaluator<'_> {
    pub(super) fn eval_block(&mut self, stmts: &[Stmt]) -> CompileResult<()> {
        self.hoist(stmts)?;
        for stmt in stmts {
            self.eval_stmt(stmt)?;
        }
        Ok(())
    }

    /// Give every function and type declared in the block its value.
    fn hoist(&mut self, stmts: &[Stmt]) -> CompileResult<()> {
        let mut classes = Vec::new();
        for stmt in stmts {
            match stmt.unexported() {
                Stmt::Function(func) => {
                    if let Some(var) = func.name.as_ref().and_then(|name| name.binding()) {
                        let value = self.function_value(func)?;
                        self.set_value(var, value);
                    }
                }
                Stmt::Class(class) => {
                    self.declare_class(class)?;
                    classes.push(class);
                }
                Stmt::Interface(interface) => self.declare_interface(interface)?,
                Stmt::Enum(decl) => self.declare_enum(decl)?,
                _ => {}
            }
        }
        // constructors are inherited, so class values wait for every parent in the block
        for class in classes {
            self.declare_class_value(class)?;
        }
        Ok(())
    }

    fn eval_stmt(&mut self, stmt: &Stmt) -> CompileResult<()> {
        match stmt {
            Stmt::Var(decl) => self.eval_var(decl),
            Stmt::Function(func) => self.eval_function(func, FunctionRole::Plain),
            Stmt::Class(class) => self.check_class(class),
            Stmt::Interface(interface) => self.check_interface_decl(interface),
            Stmt::Enum(_) => Ok(()),
            Stmt::Expr(expr) => self.eval_expr_stmt(expr),
            Stmt::Return { value, span } => {
                let constructor = self.frame().is_some_and(|frame| frame.constructor.is_some());
                let expected = self.frame().and_then(|frame| frame.ret.clone());
                match (value, expected) {
                    (Some(value), _) if constructor => Err(CompilationError::invalid(
                        "constructor can't return a value",
                        value.span(),
                    )),
                    (Some(value), Some(expected)) => {
                        let have = self.eval_expr(value)?;
                        self.ctx.registry.check(&expected, &have, value.span())
                    }
                    (Some(value), None) => {
                        Err(CompilationError::mismatch("unexpected return value", value.span()))
                    }
                    (None, Some(expected)) => Err(CompilationError::mismatch(
                        format!("expected return value of type {}", self.describe(&expected)),
                        *span,
                    )),
                    (None, None) => Ok(()),
                }
            }
            Stmt::If {
                branches,
                otherwise,
                ..
            } => {
                for branch in branches {
                    self.eval_expr(&branch.cond)?;
                    self.eval_block(&branch.body)?;
                }
                match otherwise {
                    Some(otherwise) => self.eval_block(otherwise),
                    None => Ok(()),
                }
            }
            Stmt::While { cond, body, .. } => {
                self.eval_expr(cond)?;
                self.eval_block(body)
            }
            Stmt::For {
                init,
                cond,
                step,
                body,
                ..
            } => {
                if let Some(init) = init {
                    self.eval_stmt(init)?;
                }
                if let Some(cond) = cond {
                    self.eval_expr(cond)?;
                }
                if let Some(step) = step {
                    self.eval_expr_stmt(step)?;
                }
                self.eval_block(body)
            }
            Stmt::Switch { subject, cases, .. } => {
                let subject = self.eval_expr(subject)?.widen();
                for case in cases {
                    if let Some(test) = &case.test {
                        let value = self.eval_expr(test)?;
                        self.ctx.registry.check(&subject, &value, test.span())?;
                    }
                    self.eval_block(&case.body)?;
                }
                Ok(())
            }
            Stmt::Block { body, .. } => self.eval_block(body),
            Stmt::Break { .. } | Stmt::Continue { .. } | Stmt::Import(_) => Ok(()),
            Stmt::Throw { value, .. } => self.eval_expr(value).map(|_| ()),
            Stmt::Try {
                body,
                catch,
                finally,
                ..
            } => {
                self.eval_block(body)?;
                if let Some(catch) = catch {
                    if let Some(var) = catch.param.as_ref().and_then(|param| param.binding()) {
                        self.set_value(var, Value::Any);
                    }
                    self.eval_block(&catch.body)?;
                }
                match finally {
                    Some(finally) => self.eval_block(finally),
                    None => Ok(()),
                }
            }
            Stmt::Export(ExportDecl::Declaration { stmt, .. }) => self.eval_stmt(stmt),
            Stmt::Export(_) => Ok(()),
        }
    }

    /// `let`/`const` keep the value of their annotation. Without one, `const`
    /// keeps the exact initializer value and `let`/`var` widen it.
    fn eval_var(&mut self, decl: &VarDecl) -> CompileResult<()> {
        for declarator in &decl.decls {
            let Some(var) = declarator.name.binding() else {
                continue;
            };
            let init = match &declarator.init {
                Some(init) => Some((self.eval_expr(init)?, init.span())),
                None if decl.kind == VarKind::Const => {
                    return Err(CompilationError::semantic(
                        format!("const '{}' must be initialized", declarator.name.name),
                        declarator.name.span,
                    ));
                }
                None => None,
            };

            let value = match (&declarator.ty, init) {
                (Some(ty), init) => {
                    let want = self.type_value(ty)?;
                    if let Some((have, span)) = init {
                        self.ctx.registry.check(&want, &have, span)?;
                    }
                    want
                }
                (None, Some((have, _))) if decl.kind == VarKind::Const => have.peel().clone(),
                (None, Some((have, _))) => have.widen(),
                (None, None) => Value::Any,
            };
            tracing::trace!(name = %declarator.name.name, value = %self.describe(&value), "declared");
            self.set_value(var, value);
        }
        Ok(())
    }

    /// Evaluate a function body in its own frame.
    pub(super) fn eval_function(&mut self, func: &Function, role: FunctionRole) -> CompileResult<()> {
        let params = self.param_values(func)?;
        for (param, value) in func.params.iter().zip(&params) {
            if let Some(default) = &param.default {
                let have = self.eval_expr(default)?;
                self.ctx.registry.check(value, &have, default.span())?;
            }
            if let Some(var) = param.name.binding() {
                self.set_value(var, value.clone());
            }
        }

        let ret = self.return_value(func.ret.as_ref())?;
        let constructor = match role {
            FunctionRole::Constructor(_) => Some(FxHashSet::default()),
            FunctionRole::Plain | FunctionRole::Method => None,
        };
        let needs_return = ret.is_some();
        self.frames.push(FunctionFrame { ret, constructor });
        let result = self.eval_block(&func.body);
        let frame = self.frames.pop();
        result?;

        if needs_return && !all_paths_return(&func.body) {
            return Err(CompilationError::mismatch(
                "not all code paths return a value",
                func.span,
            ));
        }
        if let (FunctionRole::Constructor(class), Some(FunctionFrame { constructor: Some(touched), .. })) =
            (role, frame)
        {
            self.check_initialized(class, &touched)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use wtscript_core::{ErrorKind, Span};
    use wtscript_registry::Value;
    use wtscript_syntax::build::{expr, func, stmt, ty};
    use wtscript_syntax::Stmt;

    use super::super::test_support::eval;

    fn value_of(body: &[Stmt], index: usize) -> Value {
        let ctx = eval(body).unwrap();
        let Stmt::Var(decl) = &body[index] else {
            panic!("not a declaration")
        };
        ctx.value_of(decl.decls[0].name.binding().unwrap())
    }

    #[test]
    fn let_widens_const_keeps_literal() {
        let body = vec![stmt::let_("x", None, Some(expr::int(5)))];
        assert_eq!(value_of(&body, 0), Value::int());

        let body = vec![stmt::const_("x", None, expr::int(5))];
        assert_eq!(value_of(&body, 0), Value::LiteralInt(5));
    }

    #[test]
    fn annotation_is_checked_against_initializer() {
        let body = vec![stmt::let_("x", Some(ty::named("Int")), Some(expr::string("a")))];
        let err = eval(&body).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::TypeMismatch { .. }));
    }

    #[test]
    fn const_needs_initializer() {
        let body = vec![stmt::decl(
            wtscript_syntax::VarKind::Const,
            ("c", 2, 7),
            Some(ty::named("Int")),
            None,
        )];
        let err = eval(&body).unwrap_err();
        assert_eq!(err.message(), "const 'c' must be initialized");
        assert_eq!(err.span, Span::new(2, 7, 1));
    }

    #[test]
    fn return_values_are_checked() {
        let ok = vec![
            func::function("f")
                .returns(ty::named("Int"))
                .body(vec![stmt::ret(Some(expr::int(1)))])
                .stmt(),
        ];
        eval(&ok).unwrap();

        let wrong = vec![
            func::function("f")
                .returns(ty::named("Int"))
                .body(vec![stmt::ret(Some(expr::string("x")))])
                .stmt(),
        ];
        assert!(matches!(eval(&wrong).unwrap_err().kind, ErrorKind::TypeMismatch { .. }));

        let void = vec![func::function("f").body(vec![stmt::ret(Some(expr::int(1)))]).stmt()];
        assert_eq!(eval(&void).unwrap_err().message(), "unexpected return value");
    }

    #[test]
    fn missing_return_path() {
        let body = vec![
            func::function("f")
                .param("c", ty::named("Boolean"))
                .returns(ty::named("Int"))
                .body(vec![stmt::if_(expr::var("c"), vec![stmt::ret(Some(expr::int(1)))])])
                .stmt(),
        ];
        assert_eq!(eval(&body).unwrap_err().message(), "not all code paths return a value");
    }

    #[test]
    fn default_parameters_are_checked() {
        let body = vec![
            func::function("f")
                .param_default("n", ty::named("Int"), expr::string("x"))
                .stmt(),
        ];
        assert!(matches!(eval(&body).unwrap_err().kind, ErrorKind::TypeMismatch { .. }));
    }

    #[test]
    fn switch_cases_match_subject() {
        let body = vec![
            stmt::let_("x", None, Some(expr::int(1))),
            stmt::switch(
                expr::var("x"),
                vec![(Some(expr::int(1)), vec![stmt::break_()]), (Some(expr::string("a")), vec![])],
            ),
        ];
        assert!(matches!(eval(&body).unwrap_err().kind, ErrorKind::TypeMismatch { .. }));
    }
}
