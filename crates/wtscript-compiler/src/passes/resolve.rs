//! Name resolution - bind every identifier to the variable it refers to.
//!
//! Each block is resolved in two steps. The hoist step declares everything
//! that can be referenced before its statement: functions, classes, interfaces
//! and enums in the block itself, and every `var` of a function body in the
//! function's frame. The sequential step then walks the statements in order,
//! declaring `let`/`const` as they are reached and binding every identifier by
//! walking the scope chain outward.
//!
//! Classes, interfaces and enums are registered in the type registry here,
//! with their members left for type evaluation.

use wtscript_core::{CompilationError, CompileResult, FileId, TypeHash, VarId, primitives};
use wtscript_registry::{ClassEntry, EnumEntry, InterfaceEntry, Value, VarKind, Variable};
use wtscript_syntax::{
    ClassDecl, ClassMemberKind, Expr, ExportDecl, Function, Ident, InterfaceModifiers, Stmt,
    TypeExpr, VarKind as DeclKind, Visitor,
};

use crate::context::CompilationContext;
use crate::scope::{FrameKind, ScopeChain};

/// Type names that are not bindings.
pub(crate) const RESERVED_TYPES: &[&str] = &["any", "void"];

pub struct NameResolver<'a> {
    ctx: &'a mut CompilationContext,
    scope: ScopeChain,
    file: FileId,
}

impl<'a> NameResolver<'a> {
    pub fn new(ctx: &'a mut CompilationContext, file: FileId) -> Self {
        let globals: Vec<(String, VarId)> = ctx
            .globals()
            .map(|(name, var)| (name.to_string(), var))
            .collect();
        let scope = ScopeChain::new(globals.iter().map(|(name, var)| (name.as_str(), *var)));
        Self { ctx, scope, file }
    }

    /// Bind an imported name in the module frame.
    pub fn import(&mut self, local: &Ident, var: VarId) -> CompileResult<()> {
        self.scope.declare(local, var, &self.ctx.variables)
    }

    /// Resolve a module body.
    pub fn resolve_module(&mut self, body: &[Stmt]) -> CompileResult<()> {
        self.hoist_vars(body)?;
        self.visit_block(body)
    }

    // ==========================================================================
    // Declarations
    // ==========================================================================

    fn new_var(&mut self, ident: &Ident, kind: VarKind) -> VarId {
        self.ctx
            .variables
            .add(Variable::new(ident.name.as_str(), kind, ident.span).in_file(self.file))
    }

    fn declare(&mut self, ident: &Ident, kind: VarKind) -> CompileResult<VarId> {
        let var = self.new_var(ident, kind);
        self.scope.declare(ident, var, &self.ctx.variables)?;
        Ok(var)
    }

    /// Declare every `var` of a function body, including those in nested
    /// blocks, in the function frame.
    fn hoist_vars(&mut self, stmts: &[Stmt]) -> CompileResult<()> {
        for stmt in stmts {
            match stmt {
                Stmt::Var(decl) if decl.kind == DeclKind::Var => {
                    for declarator in &decl.decls {
                        let var = self.new_var(&declarator.name, VarKind::Var);
                        self.scope.declare_hoisted(&declarator.name, var, &self.ctx.variables)?;
                    }
                }
                Stmt::Export(ExportDecl::Declaration { stmt, .. }) => {
                    self.hoist_vars(std::slice::from_ref(&**stmt))?;
                }
                Stmt::If {
                    branches,
                    otherwise,
                    ..
                } => {
                    for branch in branches {
                        self.hoist_vars(&branch.body)?;
                    }
                    if let Some(otherwise) = otherwise {
                        self.hoist_vars(otherwise)?;
                    }
                }
                Stmt::While { body, .. } | Stmt::Block { body, .. } => self.hoist_vars(body)?,
                Stmt::For { init, body, .. } => {
                    if let Some(init) = init {
                        self.hoist_vars(std::slice::from_ref(&**init))?;
                    }
                    self.hoist_vars(body)?;
                }
                Stmt::Switch { cases, .. } => {
                    for case in cases {
                        self.hoist_vars(&case.body)?;
                    }
                }
                Stmt::Try {
                    body,
                    catch,
                    finally,
                    ..
                } => {
                    self.hoist_vars(body)?;
                    if let Some(catch) = catch {
                        self.hoist_vars(&catch.body)?;
                    }
                    if let Some(finally) = finally {
                        self.hoist_vars(finally)?;
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Declare the functions and types of a block ahead of its statements.
    fn hoist_declarations(&mut self, stmts: &[Stmt]) -> CompileResult<()> {
        for stmt in stmts {
            match stmt.unexported() {
                Stmt::Function(Function { name: Some(name), .. }) => {
                    self.declare(name, VarKind::Function)?;
                }
                Stmt::Class(class) => {
                    let var = self.declare(&class.name, VarKind::Class)?;
                    let hash = self.type_hash(&class.name);
                    let mut entry = ClassEntry::new(class.name.name.as_str(), hash)
                        .with_span(class.name.span)
                        .with_variable(var);
                    entry.is_abstract = class.is_abstract();
                    entry.is_final = class.is_final();
                    entry.universal_name = class.universal_name.clone();
                    self.register(var, hash, entry.into())?;
                }
                Stmt::Interface(interface) => {
                    let var = self.declare(&interface.name, VarKind::Interface)?;
                    let hash = self.type_hash(&interface.name);
                    let mut entry = InterfaceEntry::new(interface.name.name.as_str(), hash)
                        .with_span(interface.name.span)
                        .with_variable(var);
                    entry.is_universal = interface.modifiers.contains(InterfaceModifiers::UNIVERSAL);
                    entry.is_rpc = interface.modifiers.contains(InterfaceModifiers::RPC);
                    self.register(var, hash, entry.into())?;
                }
                Stmt::Enum(decl) => {
                    let var = self.declare(&decl.name, VarKind::Enum)?;
                    let hash = self.type_hash(&decl.name);
                    // the backing primitive is set once the parent annotation is evaluated
                    let entry = EnumEntry::new(decl.name.name.as_str(), hash, primitives::INT)
                        .with_span(decl.name.span)
                        .with_variable(var);
                    self.register(var, hash, entry.into())?;
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn type_hash(&self, ident: &Ident) -> TypeHash {
        TypeHash::from_declaration(self.file, &ident.name, ident.span.line, ident.span.col)
    }

    fn register(
        &mut self,
        var: VarId,
        hash: TypeHash,
        entry: wtscript_registry::TypeEntry,
    ) -> CompileResult<()> {
        self.ctx.registry.register(entry)?;
        self.ctx.variables.get_mut(var).object = Some(hash);
        Ok(())
    }

    // ==========================================================================
    // Types
    // ==========================================================================

    fn resolve_type(&mut self, ty: &TypeExpr) -> CompileResult<()> {
        match ty {
            TypeExpr::Named { name, args, .. } => {
                if !RESERVED_TYPES.contains(&name.name.as_str()) {
                    self.bind(name)?;
                }
                for arg in args {
                    self.resolve_type(arg)?;
                }
            }
            TypeExpr::Tuple { items, .. } => {
                for item in items {
                    self.resolve_type(item)?;
                }
            }
            TypeExpr::Function { params, ret, .. } => {
                for param in params {
                    self.resolve_type(param)?;
                }
                if let Some(ret) = ret {
                    self.resolve_type(ret)?;
                }
            }
        }
        Ok(())
    }

    fn resolve_optional_type(&mut self, ty: &Option<TypeExpr>) -> CompileResult<()> {
        match ty {
            Some(ty) => self.resolve_type(ty),
            None => Ok(()),
        }
    }

    // ==========================================================================
    // Bodies
    // ==========================================================================

    fn bind(&mut self, ident: &Ident) -> CompileResult<VarId> {
        let var = self
            .scope
            .lookup(&ident.name)
            .ok_or_else(|| CompilationError::undefined(&ident.name, ident.span))?;
        ident.bind(var);
        Ok(var)
    }

    fn resolve_function(&mut self, func: &Function, method: bool, named_expr: bool) -> CompileResult<()> {
        for param in &func.params {
            self.resolve_optional_type(&param.ty)?;
        }
        self.resolve_optional_type(&func.ret)?;

        self.scope.push(FrameKind::Function {
            arrow: func.is_arrow,
            is_async: func.is_async,
            method,
        });
        let result = self.resolve_function_body(func, named_expr);
        self.scope.pop();
        result
    }

    fn resolve_function_body(&mut self, func: &Function, named_expr: bool) -> CompileResult<()> {
        if named_expr && let Some(name) = &func.name {
            self.declare(name, VarKind::Function)?;
        }
        for param in &func.params {
            self.declare(&param.name, VarKind::Param)?;
        }
        self.hoist_vars(&func.body)?;
        func.walk(self)
    }

    fn resolve_class(&mut self, class: &ClassDecl) -> CompileResult<()> {
        if let Some(parent) = &class.parent {
            self.resolve_type(parent)?;
        }
        for interface in &class.implements {
            self.resolve_type(interface)?;
        }

        let hash = class
            .name
            .binding()
            .and_then(|var| self.ctx.variables.get(var).object)
            .ok_or_else(|| CompilationError::undefined(&class.name.name, class.name.span))?;

        self.scope.push(FrameKind::Class);
        let this = self.ctx.variables.add(
            Variable::new("this", VarKind::This, class.span)
                .in_file(self.file)
                .with_value(Value::This(hash)),
        );
        self.scope.insert("this", this);
        if class.parent.is_some() {
            let parent = self
                .ctx
                .variables
                .add(Variable::new("super", VarKind::Super, class.span).in_file(self.file));
            self.scope.insert("super", parent);
        }

        let result = self.resolve_class_members(class);
        self.scope.pop();
        result
    }

    fn resolve_class_members(&mut self, class: &ClassDecl) -> CompileResult<()> {
        if let Some(ctor) = &class.constructor {
            self.resolve_function(ctor, true, false)?;
        }
        for member in &class.members {
            match &member.kind {
                ClassMemberKind::Method(func) => {
                    self.resolve_function(func, !member.is_static(), false)?;
                }
                ClassMemberKind::Property { ty, init } => {
                    self.resolve_optional_type(ty)?;
                    if let Some(init) = init {
                        self.visit_expr(init)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn scoped_block(&mut self, kind: FrameKind, body: &[Stmt]) -> CompileResult<()> {
        self.scope.push(kind);
        let result = self.visit_block(body);
        self.scope.pop();
        result
    }
}

impl Visitor for NameResolver<'_> {
    type Error = CompilationError;

    fn visit_block(&mut self, stmts: &[Stmt]) -> CompileResult<()> {
        self.hoist_declarations(stmts)?;
        for stmt in stmts {
            self.visit_stmt(stmt)?;
        }
        Ok(())
    }

    fn visit_stmt(&mut self, stmt: &Stmt) -> CompileResult<()> {
        match stmt {
            Stmt::Var(decl) => {
                for declarator in &decl.decls {
                    self.resolve_optional_type(&declarator.ty)?;
                    if let Some(init) = &declarator.init {
                        self.visit_expr(init)?;
                    }
                    let kind = match decl.kind {
                        DeclKind::Var => continue,
                        DeclKind::Let => VarKind::Let,
                        DeclKind::Const => VarKind::Const,
                    };
                    self.declare(&declarator.name, kind)?;
                }
                Ok(())
            }
            Stmt::Function(func) => self.resolve_function(func, false, false),
            Stmt::Class(class) => self.resolve_class(class),
            Stmt::Interface(interface) => {
                for parent in &interface.parents {
                    self.resolve_type(parent)?;
                }
                for member in &interface.members {
                    for param in &member.params {
                        self.resolve_type(param)?;
                    }
                    self.resolve_optional_type(&member.ret)?;
                }
                Ok(())
            }
            Stmt::Enum(decl) => {
                self.resolve_type(&decl.parent)?;
                stmt.walk(self)
            }
            Stmt::Return { span, .. } => {
                if !self.scope.in_function() {
                    return Err(CompilationError::invalid("return outside function", *span));
                }
                stmt.walk(self)
            }
            Stmt::If {
                branches,
                otherwise,
                ..
            } => {
                for branch in branches {
                    self.visit_expr(&branch.cond)?;
                    self.scoped_block(FrameKind::Branch, &branch.body)?;
                }
                if let Some(otherwise) = otherwise {
                    self.scoped_block(FrameKind::Branch, otherwise)?;
                }
                Ok(())
            }
            Stmt::While { cond, body, .. } => {
                self.visit_expr(cond)?;
                self.scoped_block(FrameKind::Loop, body)
            }
            Stmt::For {
                init,
                cond,
                step,
                body,
                ..
            } => {
                self.scope.push(FrameKind::Loop);
                let result = (|| {
                    if let Some(init) = init {
                        self.visit_stmt(init)?;
                    }
                    if let Some(cond) = cond {
                        self.visit_expr(cond)?;
                    }
                    if let Some(step) = step {
                        self.visit_expr(step)?;
                    }
                    self.visit_block(body)
                })();
                self.scope.pop();
                result
            }
            Stmt::Switch { subject, cases, .. } => {
                self.visit_expr(subject)?;
                for case in cases {
                    self.scope.push(FrameKind::Case);
                    let result = match &case.test {
                        Some(test) => self.visit_expr(test),
                        None => Ok(()),
                    }
                    .and_then(|()| self.visit_block(&case.body));
                    self.scope.pop();
                    result?;
                }
                Ok(())
            }
            Stmt::Block { body, .. } => self.scoped_block(FrameKind::Block, body),
            Stmt::Break { span } => {
                if !self.scope.can_break() {
                    return Err(CompilationError::invalid("break outside loop or switch", *span));
                }
                Ok(())
            }
            Stmt::Continue { span } => {
                if !self.scope.can_continue() {
                    return Err(CompilationError::invalid("continue outside loop", *span));
                }
                Ok(())
            }
            Stmt::Try {
                body,
                catch,
                finally,
                ..
            } => {
                self.scoped_block(FrameKind::Block, body)?;
                if let Some(catch) = catch {
                    self.scope.push(FrameKind::Block);
                    let result = match &catch.param {
                        Some(param) => self.declare(param, VarKind::Param).map(|_| ()),
                        None => Ok(()),
                    }
                    .and_then(|()| self.visit_block(&catch.body));
                    self.scope.pop();
                    result?;
                }
                if let Some(finally) = finally {
                    self.scoped_block(FrameKind::Block, finally)?;
                }
                Ok(())
            }
            Stmt::Import(_) | Stmt::Export(ExportDecl::Aggregate { .. }) => Ok(()),
            Stmt::Export(ExportDecl::Declaration { stmt, .. }) => self.visit_stmt(stmt),
            Stmt::Export(ExportDecl::Names { names, .. }) => {
                for name in names {
                    self.bind(&name.local)?;
                }
                Ok(())
            }
            Stmt::Expr(_) | Stmt::Throw { .. } => stmt.walk(self),
        }
    }

    fn visit_expr(&mut self, expr: &Expr) -> CompileResult<()> {
        match expr {
            Expr::Ident(ident) | Expr::This(ident) | Expr::Super(ident) => {
                self.bind(ident)?;
                Ok(())
            }
            Expr::Function(func) => self.resolve_function(func, false, true),
            Expr::Await { span, .. } if !self.scope.in_async() => {
                Err(CompilationError::invalid("await outside async function", *span))
            }
            _ => expr.walk(self),
        }
    }

    fn visit_function(&mut self, func: &Function) -> CompileResult<()> {
        self.resolve_function(func, false, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wtscript_core::{Config, ErrorKind, Span};
    use wtscript_syntax::build::{class, expr, func, stmt, ty};

    fn resolve(body: &[Stmt]) -> (CompilationContext, CompileResult<()>) {
        let mut ctx = CompilationContext::new(Config::default());
        let result = NameResolver::new(&mut ctx, FileId::new(1)).resolve_module(body);
        (ctx, result)
    }

    fn ident_of(stmt: &Stmt) -> &Ident {
        match stmt {
            Stmt::Expr(Expr::Call { args, .. }) => match &args[0] {
                Expr::Ident(ident) => ident,
                other => panic!("unexpected {other:?}"),
            },
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn binds_identifiers_to_declarations() {
        let body = vec![
            stmt::let_("x", None, Some(expr::int(1))),
            stmt::expr(expr::call(expr::var("print"), vec![expr::var("x")])),
        ];
        let (ctx, result) = resolve(&body);
        result.unwrap();

        let Stmt::Var(decl) = &body[0] else { unreachable!() };
        let declared = decl.decls[0].name.binding().unwrap();
        assert_eq!(ident_of(&body[1]).binding(), Some(declared));
        assert_eq!(ctx.variables.get(declared).kind, VarKind::Let);
        assert_eq!(ctx.variables.get(declared).file, Some(FileId::new(1)));
    }

    #[test]
    fn undefined_identifier() {
        let body = vec![stmt::expr(expr::var(("nope", 3, 7)))];
        let (_, result) = resolve(&body);
        let err = result.unwrap_err();
        assert!(matches!(err.kind, ErrorKind::UndefinedIdentifier { .. }));
        assert_eq!(err.span, Span::new(3, 7, 4));
    }

    #[test]
    fn functions_and_classes_hoist() {
        let body = vec![
            stmt::expr(expr::call(expr::var("f"), vec![])),
            stmt::expr(expr::new(expr::var("A"), vec![])),
            func::function("f").stmt(),
            class::class("A").stmt(),
        ];
        let (ctx, result) = resolve(&body);
        result.unwrap();
        let Stmt::Class(class) = &body[3] else { unreachable!() };
        let var = class.name.binding().unwrap();
        let hash = ctx.variables.get(var).object.unwrap();
        assert_eq!(ctx.registry.type_name(hash), "A");
    }

    #[test]
    fn let_does_not_hoist() {
        let body = vec![
            stmt::expr(expr::call(expr::var("print"), vec![expr::var("x")])),
            stmt::let_("x", None, Some(expr::int(1))),
        ];
        let (_, result) = resolve(&body);
        assert!(matches!(result.unwrap_err().kind, ErrorKind::UndefinedIdentifier { .. }));
    }

    #[test]
    fn var_hoists_out_of_blocks() {
        let body = vec![
            stmt::block(vec![stmt::var("v", None, Some(expr::int(1)))]),
            stmt::expr(expr::call(expr::var("print"), vec![expr::var("v")])),
        ];
        let (_, result) = resolve(&body);
        result.unwrap();
    }

    #[test]
    fn redeclaration_is_rejected() {
        let body = vec![
            stmt::let_(("x", 1, 5), None, Some(expr::int(1))),
            func::function("f")
                .body(vec![stmt::let_(("x", 2, 9), None, Some(expr::int(2)))])
                .stmt(),
        ];
        let (_, result) = resolve(&body);
        let err = result.unwrap_err();
        assert!(matches!(err.kind, ErrorKind::DuplicateDeclaration { .. }));
        assert_eq!(err.notes[0].span, Span::new(1, 5, 1));
    }

    #[test]
    fn jumps_outside_loops() {
        let (_, result) = resolve(&[stmt::break_()]);
        assert!(matches!(result.unwrap_err().kind, ErrorKind::InvalidStatement { .. }));

        let (_, result) = resolve(&[stmt::while_(expr::boolean(true), vec![stmt::continue_()])]);
        result.unwrap();

        let (_, result) = resolve(&[stmt::ret(None)]);
        assert!(matches!(result.unwrap_err().kind, ErrorKind::InvalidStatement { .. }));
    }

    #[test]
    fn await_needs_async() {
        let body = vec![
            func::function("f")
                .body(vec![stmt::expr(expr::await_(expr::var("print")))])
                .stmt(),
        ];
        let (_, result) = resolve(&body);
        assert!(matches!(result.unwrap_err().kind, ErrorKind::InvalidStatement { .. }));

        let body = vec![
            func::function("f")
                .async_()
                .body(vec![stmt::expr(expr::await_(expr::var("print")))])
                .stmt(),
        ];
        resolve(&body).1.unwrap();
    }

    #[test]
    fn this_inside_methods_only() {
        let body = vec![
            class::class("A")
                .property("x", ty::named("Int"), Some(expr::int(1)))
                .method(
                    "get",
                    func::anonymous()
                        .returns(ty::named("Int"))
                        .body(vec![stmt::ret(Some(expr::this_member("x")))])
                        .build(),
                )
                .stmt(),
        ];
        resolve(&body).1.unwrap();

        let (_, result) = resolve(&[stmt::expr(expr::this())]);
        assert!(matches!(result.unwrap_err().kind, ErrorKind::UndefinedIdentifier { .. }));
    }

    #[test]
    fn super_needs_a_parent() {
        let body = vec![
            class::class("A")
                .constructor(func::anonymous().body(vec![stmt::expr(expr::call(expr::super_(), vec![]))]).build())
                .stmt(),
        ];
        let (_, result) = resolve(&body);
        assert!(matches!(result.unwrap_err().kind, ErrorKind::UndefinedIdentifier { .. }));
    }

    #[test]
    fn type_annotations_bind() {
        let body = vec![
            class::class("A").stmt(),
            stmt::let_("a", Some(ty::named("A")), None),
            stmt::let_("b", Some(ty::named("Missing")), None),
        ];
        let (_, result) = resolve(&body);
        let err = result.unwrap_err();
        assert_eq!(err.kind, ErrorKind::UndefinedIdentifier { name: "Missing".into() });
    }
}
