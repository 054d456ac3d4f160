//! Usage analysis - report bindings that are never read and statements that
//! can never run.
//!
//! Blocks are walked backward, so every read of a binding is seen before the
//! statement that declares it. Reads are collected into one set; declarations
//! are tracked per function and checked when the function (or module) is
//! left, which also covers reads from closures declared before the binding.

use rustc_hash::FxHashSet;
use wtscript_core::{CompilationError, CompileResult, VarId};
use wtscript_syntax::{AssignOp, Direction, Expr, ExportDecl, Function, Ident, Stmt, Visitor};

use crate::context::CompilationContext;

pub struct UsageResolver<'a> {
    ctx: &'a CompilationContext,
    check_unused: bool,
    /// Declarations waiting for a read, one list per open function.
    tracked: Vec<Vec<VarId>>,
    used: FxHashSet<VarId>,
}

impl<'a> UsageResolver<'a> {
    pub fn new(ctx: &'a CompilationContext) -> Self {
        Self {
            ctx,
            check_unused: ctx.config.check_unused,
            tracked: Vec::new(),
            used: FxHashSet::default(),
        }
    }

    /// Analyse a module body. Module level bindings that are not exported are
    /// tracked like function locals.
    pub fn resolve_module(&mut self, body: &[Stmt]) -> CompileResult<()> {
        self.tracked.push(Vec::new());
        self.visit_block(body)?;
        self.close()
    }

    fn track(&mut self, ident: &Ident) {
        if !self.check_unused {
            return;
        }
        if let Some(var) = ident.binding()
            && let Some(frame) = self.tracked.last_mut()
        {
            frame.push(var);
        }
    }

    fn read(&mut self, ident: &Ident) {
        if let Some(var) = ident.binding() {
            self.used.insert(var);
        }
    }

    /// Leave a function, reporting its first unread binding in source order.
    fn close(&mut self) -> CompileResult<()> {
        let tracked = self.tracked.pop().unwrap_or_default();
        let unused = tracked
            .into_iter()
            .filter(|var| !self.used.contains(var))
            .map(|var| self.ctx.variables.get(var))
            .min_by_key(|var| (var.span.line, var.span.col));
        match unused {
            Some(var) => {
                tracing::trace!(name = %var.original, "unused declaration");
                Err(CompilationError::unused(var.original.as_str(), var.span))
            }
            None => Ok(()),
        }
    }

    /// Walk a plain assignment target. The stored-to binding is not read, but
    /// an object or index it goes through is.
    fn visit_target(&mut self, target: &Expr) -> CompileResult<()> {
        match target {
            Expr::Ident(_) => Ok(()),
            other => self.visit_expr(other),
        }
    }
}

fn terminator_name(stmt: &Stmt) -> &'static str {
    match stmt {
        Stmt::Return { .. } => "return",
        Stmt::Throw { .. } => "throw",
        Stmt::Break { .. } => "break",
        _ => "continue",
    }
}

impl Visitor for UsageResolver<'_> {
    type Error = CompilationError;

    fn direction(&self) -> Direction {
        Direction::Backward
    }

    fn visit_block(&mut self, stmts: &[Stmt]) -> CompileResult<()> {
        if let Some(pos) = stmts.iter().position(Stmt::is_terminator)
            && let Some(next) = stmts.get(pos + 1)
        {
            return Err(CompilationError::invalid(
                format!(
                    "unreachable statement after {} statement",
                    terminator_name(&stmts[pos])
                ),
                next.span(),
            ));
        }
        for stmt in stmts.iter().rev() {
            self.visit_stmt(stmt)?;
        }
        Ok(())
    }

    fn visit_stmt(&mut self, stmt: &Stmt) -> CompileResult<()> {
        match stmt {
            Stmt::Var(decl) => {
                for declarator in &decl.decls {
                    self.track(&declarator.name);
                }
                stmt.walk(self)
            }
            Stmt::Export(ExportDecl::Declaration { stmt: inner, .. }) => match &**inner {
                // exported bindings are read by other modules
                Stmt::Var(_) => inner.walk(self),
                other => self.visit_stmt(other),
            },
            Stmt::Export(ExportDecl::Names { names, .. }) => {
                for name in names {
                    self.read(&name.local);
                }
                Ok(())
            }
            other => other.walk(self),
        }
    }

    fn visit_expr(&mut self, expr: &Expr) -> CompileResult<()> {
        match expr {
            Expr::Ident(ident) | Expr::This(ident) | Expr::Super(ident) => {
                self.read(ident);
                Ok(())
            }
            Expr::Assign {
                op: AssignOp::Assign,
                target,
                value,
                ..
            } => {
                self.visit_target(target)?;
                self.visit_expr(value)
            }
            other => other.walk(self),
        }
    }

    fn visit_function(&mut self, func: &Function) -> CompileResult<()> {
        self.tracked.push(Vec::new());
        func.walk(self)?;
        self.close()
    }
}
