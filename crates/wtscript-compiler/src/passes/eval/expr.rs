//! Expressions.

use wtscript_core::{CompilationError, CompileResult, Span, TypeHash, primitives};
use wtscript_registry::{Instance, TypeEntry, Value, VarKind};
use wtscript_syntax::{AssignOp, BinaryOp, Expr, Ident, UnaryOp};

use super::TypeEvaluator;
use super::stmt::FunctionRole;

impl TypeEvaluator<'_> {
    /// Evaluate an expression whose value is used.
    pub(super) fn eval_expr(&mut self, expr: &Expr) -> CompileResult<Value> {
        match expr {
            Expr::Int { value, .. } => Ok(Value::LiteralInt(*value)),
            Expr::Float { .. } => Ok(Value::number()),
            Expr::Str { value, .. } => Ok(Value::literal_string(value)),
            Expr::Bool { value, .. } => Ok(Value::LiteralBool(*value)),
            Expr::Null { .. } => Ok(Value::Any),
            Expr::Ident(ident) | Expr::This(ident) => self.eval_ident(ident),
            Expr::Super(ident) => Ok(Value::instance(self.super_class(ident)?)),
            Expr::Array { items, .. } => Ok(Value::array_literal(self.eval_args(items)?)),
            Expr::Member {
                object,
                property,
                property_span,
                ..
            } => self.eval_member(object, property, *property_span),
            Expr::Index { object, index, span } => {
                let container = self.eval_expr(object)?;
                let index_value = self.eval_expr(index)?;
                self.index_value(&container, &index_value, index.span(), *span)
            }
            Expr::Call { callee, args, span } => self
                .eval_call(callee, args, *span)?
                .ok_or_else(|| CompilationError::mismatch("void value used in expression", *span)),
            Expr::New { class, args, span } => self.eval_new(class, args, *span),
            Expr::Unary { op, operand, span } => {
                let value = self.eval_expr(operand)?;
                self.unary(*op, &value, *span)
            }
            Expr::Binary { op, lhs, rhs, span } => {
                let lhs = self.eval_expr(lhs)?;
                let rhs = self.eval_expr(rhs)?;
                self.binary(*op, &lhs, &rhs, *span)
            }
            Expr::Assign {
                op,
                target,
                value,
                span,
            } => self.eval_assign(*op, target, value, *span),
            Expr::Conditional {
                cond,
                then,
                otherwise,
                ..
            } => {
                self.eval_expr(cond)?;
                let then = self.eval_expr(then)?;
                let otherwise = self.eval_expr(otherwise)?;
                Ok(Value::common(&[then, otherwise]).unwrap_or(Value::Any))
            }
            Expr::Function(func) => {
                let value = self.function_value(func)?;
                if let Some(var) = func.name.as_ref().and_then(|name| name.binding()) {
                    self.set_value(var, value.clone());
                }
                self.eval_function(func, FunctionRole::Plain)?;
                Ok(value)
            }
            Expr::Await { operand, span } => {
                let value = self.eval_expr(operand)?;
                match value.peel() {
                    Value::Any => Ok(Value::Any),
                    _ => match value.instance_of() {
                        Some(instance) if instance.interface == primitives::PROMISE => {
                            Ok(instance.arg().cloned().unwrap_or(Value::Any))
                        }
                        _ => Err(CompilationError::mismatch(
                            format!("await expects a Promise, got {}", self.describe(&value)),
                            *span,
                        )),
                    },
                }
            }
        }
    }

    /// Evaluate an expression statement, where a void call is allowed.
    pub(super) fn eval_expr_stmt(&mut self, expr: &Expr) -> CompileResult<()> {
        match expr {
            Expr::Call { callee, args, span } => self.eval_call(callee, args, *span).map(|_| ()),
            other => self.eval_expr(other).map(|_| ()),
        }
    }

    fn eval_args(&mut self, args: &[Expr]) -> CompileResult<Vec<Value>> {
        args.iter().map(|arg| self.eval_expr(arg)).collect()
    }

    fn eval_ident(&self, ident: &Ident) -> CompileResult<Value> {
        let var = ident
            .binding()
            .ok_or_else(|| CompilationError::undefined(&ident.name, ident.span))?;
        let variable = self.ctx.variables.get(var);
        if variable.kind == VarKind::Interface {
            return Err(CompilationError::semantic(
                format!("'{}' is a type, not a value", ident.name),
                ident.span,
            ));
        }
        Ok(self.ctx.value_of(var).located(ident.span))
    }

    /// The parent of the innermost class body.
    fn super_class(&self, ident: &Ident) -> CompileResult<TypeHash> {
        self.classes
            .last()
            .and_then(|&class| self.ctx.registry.class(class))
            .and_then(|class| class.parent)
            .ok_or_else(|| CompilationError::undefined("super", ident.span))
    }

    // ==========================================================================
    // Members
    // ==========================================================================

    fn eval_member(&mut self, object: &Expr, property: &str, span: Span) -> CompileResult<Value> {
        let receiver = matches!(object, Expr::This(_) | Expr::Super(_));
        let value = self.eval_expr(object)?;
        self.member_value(&value, property, receiver, span)
    }

    /// Read `name` from `value`. Private members are only visible through
    /// `this`.
    pub(super) fn member_value(
        &self,
        value: &Value,
        name: &str,
        receiver: bool,
        span: Span,
    ) -> CompileResult<Value> {
        let registry = &self.ctx.registry;
        let member = match value.peel() {
            Value::Any => return Ok(Value::Any),
            Value::Class(class) => registry.static_member(class.interface, name),
            Value::Enum(hash) => registry.static_member(*hash, name),
            Value::Tuple(tuple) if !tuple.literal => {
                return match name {
                    "length" => Ok(Value::LiteralInt(tuple.items.len() as i64)),
                    _ => Err(self.no_member(value, name, span)),
                };
            }
            _ => match value.instance_of() {
                Some(instance) => {
                    return self.instance_member_value(&instance, value, name, receiver, span);
                }
                None => None,
            },
        };
        member
            .map(|member| member.value)
            .ok_or_else(|| self.no_member(value, name, span))
    }

    fn instance_member_value(
        &self,
        instance: &Instance,
        value: &Value,
        name: &str,
        receiver: bool,
        span: Span,
    ) -> CompileResult<Value> {
        let registry = &self.ctx.registry;
        match registry.instance_member(instance, name) {
            Some(member) if member.is_private && !receiver => Err(CompilationError::semantic(
                format!("'{name}' is private"),
                span,
            )),
            Some(member) => Ok(member.value),
            None if registry.any_member(instance, name).is_some() => Err(CompilationError::semantic(
                format!("'{name}' of {} can't be read", self.describe(value)),
                span,
            )),
            None => Err(self.no_member(value, name, span)),
        }
    }

    fn no_member(&self, value: &Value, name: &str, span: Span) -> CompilationError {
        CompilationError::semantic(
            format!("{} has no member '{name}'", self.describe(value)),
            span,
        )
    }

    /// The item read by `container[index]`.
    fn index_value(
        &self,
        container: &Value,
        index: &Value,
        index_span: Span,
        span: Span,
    ) -> CompileResult<Value> {
        let registry = &self.ctx.registry;
        match container.peel() {
            Value::Any => Ok(Value::Any),
            Value::Tuple(tuple) => {
                if let Value::LiteralInt(i) = index.peel() {
                    return usize::try_from(*i)
                        .ok()
                        .and_then(|i| tuple.items.get(i).cloned())
                        .ok_or_else(|| {
                            CompilationError::mismatch(
                                format!("index {i} out of range for {}", self.describe(container)),
                                index_span,
                            )
                        });
                }
                registry.check(&Value::int(), index, index_span)?;
                Ok(Value::common(&tuple.items).unwrap_or(Value::Any))
            }
            _ => match container.instance_of() {
                Some(instance) if instance.interface == primitives::ARRAY => {
                    registry.check(&Value::int(), index, index_span)?;
                    Ok(instance.arg().cloned().unwrap_or(Value::Any))
                }
                Some(instance) if registry.inherits(instance.interface, primitives::STRING) => {
                    registry.check(&Value::int(), index, index_span)?;
                    Ok(Value::string())
                }
                _ => Err(CompilationError::mismatch(
                    format!("{} can't be indexed", self.describe(container)),
                    span,
                )),
            },
        }
    }

    // ==========================================================================
    // Calls
    // ==========================================================================

    /// Evaluate a call. `None` is a void result.
    fn eval_call(&mut self, callee: &Expr, args: &[Expr], span: Span) -> CompileResult<Option<Value>> {
        if let Expr::Super(ident) = callee {
            let parent = self.super_class(ident)?;
            if !self.frame().is_some_and(|frame| frame.constructor.is_some()) {
                return Err(CompilationError::invalid("super() outside constructor", span));
            }
            let args = self.eval_args(args)?;
            let constructors = self.ctx.registry.constructors(parent);
            self.ctx.registry.resolve_constructor(&constructors, &args, span)?;
            return Ok(None);
        }

        let function = self.eval_expr(callee)?;
        let args = self.eval_args(args)?;
        let registry = &self.ctx.registry;
        match function.peel() {
            Value::Any => Ok(Some(Value::Any)),
            Value::Function(func) => registry.resolve_call(func, &args, span),
            // primitive conversions: String(x), Number(x)
            Value::Class(class)
                if matches!(registry.get(class.interface), Some(TypeEntry::Primitive(_))) =>
            {
                Ok(Some(Value::instance(class.interface)))
            }
            Value::Class(class) => Err(CompilationError::semantic(
                format!(
                    "class {} must be instantiated with new",
                    registry.type_name(class.interface)
                ),
                span,
            )),
            _ => Err(CompilationError::mismatch(
                format!("{} is not callable", self.describe(&function)),
                span,
            )),
        }
    }

    fn eval_new(&mut self, class: &Expr, args: &[Expr], span: Span) -> CompileResult<Value> {
        let value = self.eval_expr(class)?;
        let args = self.eval_args(args)?;
        let registry = &self.ctx.registry;
        match value.peel() {
            Value::Any => Ok(Value::Any),
            Value::Class(class) => {
                if registry.class(class.interface).is_some_and(|entry| entry.is_abstract) {
                    return Err(CompilationError::abstractness(
                        format!(
                            "can't instantiate abstract class {}",
                            registry.type_name(class.interface)
                        ),
                        span,
                    ));
                }
                registry.resolve_constructor(&class.constructors, &args, span)?;
                Ok(Value::instance(class.interface))
            }
            Value::Enum(hash) => Err(CompilationError::semantic(
                format!("enum {} can't be instantiated", registry.type_name(*hash)),
                span,
            )),
            _ => Err(CompilationError::mismatch(
                format!("{} is not a class", self.describe(&value)),
                span,
            )),
        }
    }

    // ==========================================================================
    // Operators
    // ==========================================================================

    fn inherits(&self, value: &Value, base: TypeHash) -> bool {
        value
            .interface()
            .is_some_and(|hash| self.ctx.registry.inherits(hash, base))
    }

    fn is_numeric(&self, value: &Value) -> bool {
        self.inherits(value, primitives::NUMBER)
    }

    fn unary(&self, op: UnaryOp, value: &Value, span: Span) -> CompileResult<Value> {
        match op {
            UnaryOp::Not => Ok(Value::boolean()),
            UnaryOp::TypeOf => Ok(Value::string()),
            _ if value.is_any() => Ok(Value::Any),
            _ if !self.is_numeric(value) => Err(CompilationError::mismatch(
                format!(
                    "operator {} not defined for {}",
                    op.as_str().trim(),
                    self.describe(value)
                ),
                span,
            )),
            UnaryOp::Neg => match value.peel() {
                Value::LiteralInt(v) => Ok(Value::LiteralInt(v.wrapping_neg())),
                _ if self.inherits(value, primitives::INT) => Ok(Value::int()),
                _ => Ok(Value::number()),
            },
            UnaryOp::Plus if self.inherits(value, primitives::INT) => Ok(Value::int()),
            UnaryOp::Plus => Ok(Value::number()),
            UnaryOp::BitNot => Ok(Value::int()),
        }
    }

    pub(super) fn binary(&self, op: BinaryOp, lhs: &Value, rhs: &Value, span: Span) -> CompileResult<Value> {
        let mismatch = || {
            CompilationError::mismatch(
                format!(
                    "operator {} not defined for {} and {}",
                    op.as_str(),
                    self.describe(lhs),
                    self.describe(rhs)
                ),
                span,
            )
        };
        let numeric = self.is_numeric(lhs) && self.is_numeric(rhs);
        let ints = self.inherits(lhs, primitives::INT) && self.inherits(rhs, primitives::INT);
        let any = lhs.is_any() || rhs.is_any();

        match op {
            BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => {
                let strings =
                    self.inherits(lhs, primitives::STRING) && self.inherits(rhs, primitives::STRING);
                if any || numeric || strings {
                    Ok(Value::boolean())
                } else {
                    Err(mismatch())
                }
            }
            _ if op.is_comparison() => Ok(Value::boolean()),
            BinaryOp::And | BinaryOp::Or => {
                Ok(Value::common(&[lhs.clone(), rhs.clone()]).unwrap_or(Value::Any))
            }
            _ if any => Ok(Value::Any),
            BinaryOp::Add
                if self.inherits(lhs, primitives::STRING) || self.inherits(rhs, primitives::STRING) =>
            {
                Ok(Value::string())
            }
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Rem if numeric => {
                Ok(if ints { Value::int() } else { Value::number() })
            }
            BinaryOp::Div if numeric => Ok(Value::number()),
            BinaryOp::BitAnd | BinaryOp::BitOr | BinaryOp::BitXor | BinaryOp::Shl | BinaryOp::Shr
                if numeric =>
            {
                Ok(Value::int())
            }
            _ => Err(mismatch()),
        }
    }

    // ==========================================================================
    // Assignment
    // ==========================================================================

    fn eval_assign(&mut self, op: AssignOp, target: &Expr, value: &Expr, span: Span) -> CompileResult<Value> {
        let have = self.eval_expr(value)?;
        let want = self.assign_target(target)?;
        let have = match op.binary() {
            Some(binary) => {
                let current = self.eval_expr(target)?;
                self.binary(binary, &current, &have, span)?
            }
            None => have,
        };
        self.ctx.registry.check(&want, &have, value.span())?;
        Ok(have)
    }

    /// The value a store to `target` must satisfy.
    fn assign_target(&mut self, target: &Expr) -> CompileResult<Value> {
        match target {
            Expr::Ident(ident) => {
                let var = ident
                    .binding()
                    .ok_or_else(|| CompilationError::undefined(&ident.name, ident.span))?;
                let variable = self.ctx.variables.get(var);
                let assignable = matches!(
                    variable.kind,
                    VarKind::Var | VarKind::Let | VarKind::Const | VarKind::Param
                );
                if variable.constant || !assignable {
                    return Err(CompilationError::semantic(
                        format!("can't assign to constant '{}'", ident.name),
                        ident.span,
                    ));
                }
                Ok(self.ctx.value_of(var))
            }
            Expr::Member {
                object,
                property,
                property_span,
                ..
            } => {
                let receiver = matches!(**object, Expr::This(_));
                if receiver
                    && let Some(frame) = self.frames.last_mut()
                    && let Some(touched) = &mut frame.constructor
                {
                    touched.insert(property.clone());
                }
                let constructing = receiver && self.frame().is_some_and(|f| f.constructor.is_some());
                let value = self.eval_expr(object)?;
                self.writable_value(&value, property, receiver, constructing, *property_span)
            }
            Expr::Index { object, index, span } => {
                let container = self.eval_expr(object)?;
                let index_value = self.eval_expr(index)?;
                self.index_value(&container, &index_value, index.span(), *span)
            }
            other => Err(CompilationError::invalid("invalid assignment target", other.span())),
        }
    }

    /// The value accepted by `value.name = ..`. Constructors may initialize
    /// constant properties through `this`.
    fn writable_value(
        &self,
        value: &Value,
        name: &str,
        receiver: bool,
        constructing: bool,
        span: Span,
    ) -> CompileResult<Value> {
        let registry = &self.ctx.registry;
        let read_only = || CompilationError::semantic(format!("'{name}' is read-only"), span);
        match value.peel() {
            Value::Any => Ok(Value::Any),
            Value::Class(class) => match registry.static_member(class.interface, name) {
                Some(member) if member.is_writable() => Ok(member.value),
                Some(_) => Err(read_only()),
                None => Err(self.no_member(value, name, span)),
            },
            Value::Enum(_) => Err(read_only()),
            _ => {
                let Some(instance) = value.instance_of() else {
                    return Err(self.no_member(value, name, span));
                };
                let member = if constructing {
                    registry
                        .any_member(&instance, name)
                        .filter(|m| m.is_writable() || m.kind == wtscript_registry::MemberKind::Property)
                } else {
                    registry.writable_member(&instance, name)
                };
                match member {
                    Some(member) if member.is_private && !receiver => Err(CompilationError::semantic(
                        format!("'{name}' is private"),
                        span,
                    )),
                    Some(member) => Ok(member.value),
                    None if registry.any_member(&instance, name).is_some() => Err(read_only()),
                    None => Err(self.no_member(value, name, span)),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use wtscript_core::ErrorKind;
    use wtscript_registry::Value;
    use wtscript_syntax::build::{class, expr, func, stmt, ty};
    use wtscript_syntax::{BinaryOp, Stmt};

    use super::super::test_support::eval;

    fn value_of(body: &[Stmt], index: usize) -> Value {
        let ctx = eval(body).unwrap();
        let Stmt::Var(decl) = &body[index] else {
            panic!("not a declaration")
        };
        ctx.value_of(decl.decls[0].name.binding().unwrap())
    }

    fn kind(body: &[Stmt]) -> ErrorKind {
        eval(body).unwrap_err().kind
    }

    #[test]
    fn arithmetic() {
        let body = vec![stmt::let_("x", None, Some(expr::add(expr::int(1), expr::int(2))))];
        assert_eq!(value_of(&body, 0), Value::int());

        let body = vec![stmt::let_("x", None, Some(expr::add(expr::int(1), expr::float(2.5))))];
        assert_eq!(value_of(&body, 0), Value::number());

        let body = vec![stmt::let_(
            "x",
            None,
            Some(expr::binary(BinaryOp::Div, expr::int(1), expr::int(2))),
        )];
        assert_eq!(value_of(&body, 0), Value::number());

        let body = vec![stmt::let_("x", None, Some(expr::add(expr::string("a"), expr::int(2))))];
        assert_eq!(value_of(&body, 0), Value::string());

        let body = vec![stmt::let_(
            "x",
            None,
            Some(expr::binary(BinaryOp::Sub, expr::string("a"), expr::int(2))),
        )];
        assert!(matches!(kind(&body), ErrorKind::TypeMismatch { .. }));
    }

    #[test]
    fn comparisons_are_boolean() {
        let body = vec![stmt::let_(
            "b",
            None,
            Some(expr::binary(BinaryOp::Lt, expr::int(1), expr::int(2))),
        )];
        assert_eq!(value_of(&body, 0), Value::boolean());
    }

    #[test]
    fn builtin_members() {
        let body = vec![stmt::let_(
            "n",
            None,
            Some(expr::member(expr::string("abc"), "length")),
        )];
        assert_eq!(value_of(&body, 0), Value::int());

        let body = vec![stmt::let_(
            "n",
            None,
            Some(expr::member(expr::string("abc"), "nope")),
        )];
        assert_eq!(eval(&body).unwrap_err().message(), "String(\"abc\") has no member 'nope'");
    }

    #[test]
    fn array_items() {
        let body = vec![
            stmt::let_("xs", Some(ty::array(ty::named("String"))), Some(expr::array(vec![]))),
            stmt::let_("s", None, Some(expr::index(expr::var("xs"), expr::int(0)))),
        ];
        assert_eq!(value_of(&body, 1), Value::string());

        let body = vec![
            stmt::let_("xs", None, Some(expr::array(vec![expr::int(1), expr::int(2)]))),
            stmt::let_("n", None, Some(expr::index(expr::var("xs"), expr::string("a")))),
        ];
        assert!(matches!(kind(&body), ErrorKind::TypeMismatch { .. }));
    }

    #[test]
    fn overloaded_calls() {
        let f = || {
            func::function("f")
                .param("a", ty::named("Int"))
                .param_default("b", ty::named("Int"), expr::int(0))
                .returns(ty::named("Int"))
                .body(vec![stmt::ret(Some(expr::var("a")))])
                .stmt()
        };
        let call = |args| vec![f(), stmt::expr(expr::call(expr::var("f"), args))];

        eval(&call(vec![expr::int(3)])).unwrap();
        eval(&call(vec![expr::int(3), expr::int(4)])).unwrap();
        assert!(matches!(
            kind(&call(vec![expr::string("a")])),
            ErrorKind::OverloadMismatch { .. }
        ));
        assert!(matches!(
            kind(&call(vec![expr::int(3), expr::int(4), expr::int(5)])),
            ErrorKind::OverloadMismatch { .. }
        ));
    }

    #[test]
    fn void_results_are_statements_only() {
        let body = vec![
            func::function("f").stmt(),
            stmt::let_("x", None, Some(expr::call(expr::var("f"), vec![]))),
        ];
        assert_eq!(eval(&body).unwrap_err().message(), "void value used in expression");
    }

    #[test]
    fn constants_are_not_assignable() {
        let body = vec![
            stmt::const_("c", None, expr::int(1)),
            stmt::expr(expr::assign(expr::var("c"), expr::int(2))),
        ];
        assert_eq!(eval(&body).unwrap_err().message(), "can't assign to constant 'c'");
    }

    #[test]
    fn assignment_checks_target_type() {
        let body = vec![
            stmt::let_("x", None, Some(expr::int(1))),
            stmt::expr(expr::assign(expr::var("x"), expr::string("a"))),
        ];
        assert!(matches!(kind(&body), ErrorKind::TypeMismatch { .. }));

        let body = vec![
            stmt::let_("x", None, Some(expr::int(1))),
            stmt::expr(expr::assign_op(wtscript_syntax::AssignOp::Add, expr::var("x"), expr::int(2))),
        ];
        eval(&body).unwrap();
    }

    #[test]
    fn abstract_classes_cannot_be_instantiated() {
        let body = vec![
            class::class("Shape")
                .as_abstract()
                .abstract_method("area", vec![], Some(ty::named("Number")))
                .stmt(),
            stmt::expr(expr::new(expr::var("Shape"), vec![])),
        ];
        assert!(matches!(kind(&body), ErrorKind::AbstractnessViolation { .. }));
    }

    #[test]
    fn interfaces_are_not_values() {
        let body = vec![
            wtscript_syntax::build::interface::interface("I").stmt(),
            stmt::let_("x", None, Some(expr::var("I"))),
        ];
        assert_eq!(eval(&body).unwrap_err().message(), "'I' is a type, not a value");
    }

    #[test]
    fn await_unwraps_promises() {
        let body = vec![
            func::function("f")
                .async_()
                .returns(ty::named("Int"))
                .body(vec![stmt::ret(Some(expr::int(1)))])
                .stmt(),
            func::function("g")
                .async_()
                .returns(ty::named("Int"))
                .body(vec![stmt::ret(Some(expr::await_(expr::call(expr::var("f"), vec![]))))])
                .stmt(),
        ];
        eval(&body).unwrap();

        let body = vec![
            func::function("g")
                .async_()
                .body(vec![stmt::expr(expr::await_(expr::int(1)))])
                .stmt(),
        ];
        assert!(matches!(kind(&body), ErrorKind::TypeMismatch { .. }));
    }

    #[test]
    fn private_members_need_this() {
        let body = vec![
            class::class("A")
                .member(
                    "secret",
                    wtscript_syntax::MemberModifiers::PRIVATE,
                    wtscript_syntax::ClassMemberKind::Property {
                        ty: Some(ty::named("Int")),
                        init: Some(expr::int(1)),
                    },
                )
                .stmt(),
            stmt::let_("a", None, Some(expr::new(expr::var("A"), vec![]))),
            stmt::let_("s", None, Some(expr::member(expr::var("a"), "secret"))),
        ];
        assert_eq!(eval(&body).unwrap_err().message(), "'secret' is private");
    }
}
