//! Type annotations and function signatures.

use wtscript_core::{CompilationError, CompileResult, TypeHash, primitives};
use wtscript_registry::{Overload, TypeEntry, Value};
use wtscript_syntax::{Function, Ident, TypeExpr};

use super::TypeEvaluator;

impl TypeEvaluator<'_> {
    /// The value an annotation stands for.
    pub(super) fn type_value(&self, ty: &TypeExpr) -> CompileResult<Value> {
        match ty {
            TypeExpr::Named { name, args, span } => {
                match name.name.as_str() {
                    "any" => return Ok(Value::Any),
                    "void" => {
                        return Err(CompilationError::semantic("void is not a value type", *span));
                    }
                    _ => {}
                }
                let hash = self.type_hash(name)?;
                let args = args
                    .iter()
                    .map(|arg| self.type_value(arg))
                    .collect::<CompileResult<Vec<_>>>()?;

                let expected = match self.ctx.registry.get(hash) {
                    Some(TypeEntry::Primitive(primitive)) => primitive.type_params,
                    _ => 0,
                };
                if !args.is_empty() && args.len() != expected {
                    return Err(CompilationError::mismatch(
                        format!(
                            "{} expects {expected} type argument(s), got {}",
                            self.ctx.registry.type_name(hash),
                            args.len()
                        ),
                        *span,
                    ));
                }
                Ok(Value::generic(hash, args))
            }
            TypeExpr::Tuple { items, .. } => Ok(Value::tuple(
                items
                    .iter()
                    .map(|item| self.type_value(item))
                    .collect::<CompileResult<Vec<_>>>()?,
            )),
            TypeExpr::Function { params, ret, .. } => {
                let params = params
                    .iter()
                    .map(|param| self.type_value(param))
                    .collect::<CompileResult<Vec<_>>>()?;
                let ret = self.return_value(ret.as_deref())?;
                Ok(Value::simple_function(params, ret))
            }
        }
    }

    /// A return annotation, `None` for void or no annotation.
    pub(super) fn return_value(&self, ty: Option<&TypeExpr>) -> CompileResult<Option<Value>> {
        match ty {
            None => Ok(None),
            Some(ty) if ty.name() == Some("void") => Ok(None),
            Some(ty) => self.type_value(ty).map(Some),
        }
    }

    pub(super) fn optional_type_value(&self, ty: Option<&TypeExpr>) -> CompileResult<Value> {
        match ty {
            Some(ty) => self.type_value(ty),
            None => Ok(Value::Any),
        }
    }

    /// The declaration a type name refers to.
    pub(super) fn type_hash(&self, name: &Ident) -> CompileResult<TypeHash> {
        let var = name
            .binding()
            .ok_or_else(|| CompilationError::undefined(&name.name, name.span))?;
        self.ctx
            .variables
            .get(var)
            .object
            .ok_or_else(|| CompilationError::semantic(format!("'{}' is not a type", name.name), name.span))
    }

    /// The declaration a named annotation refers to, for `extends` and
    /// `implements` clauses.
    pub(super) fn named_type(&self, ty: &TypeExpr) -> CompileResult<TypeHash> {
        match ty {
            TypeExpr::Named { name, .. } => self.type_hash(name),
            other => Err(CompilationError::semantic("expected a type name", other.span())),
        }
    }

    /// Parameter values of a function, `any` for unannotated ones.
    pub(super) fn param_values(&self, func: &Function) -> CompileResult<Vec<Value>> {
        func.params
            .iter()
            .map(|param| self.optional_type_value(param.ty.as_ref()))
            .collect()
    }

    /// The return value callers see. Async functions return a promise of
    /// their declared value.
    pub(super) fn call_return(&self, func: &Function) -> CompileResult<Option<Value>> {
        let ret = self.return_value(func.ret.as_ref())?;
        if func.is_async {
            return Ok(Some(match ret {
                Some(ret) => Value::promise(ret),
                None => Value::instance(primitives::PROMISE),
            }));
        }
        Ok(ret)
    }

    /// The value of a function: one overload per accepted arity.
    pub(super) fn function_value(&self, func: &Function) -> CompileResult<Value> {
        let params = self.param_values(func)?;
        let ret = self.call_return(func)?;
        Ok(Value::function(Overload::with_optional(
            params,
            func.required_params(),
            ret,
        )))
    }
}

#[cfg(test)]
mod tests {
    use wtscript_core::{ErrorKind, primitives};
    use wtscript_registry::Value;
    use wtscript_syntax::build::{expr, func, stmt, ty};
    use wtscript_syntax::Stmt;

    use super::super::test_support::eval;

    fn declared(body: &[Stmt], index: usize) -> Value {
        let ctx = eval(body).unwrap();
        let Stmt::Var(decl) = body[index].unexported() else {
            panic!("not a declaration")
        };
        ctx.value_of(decl.decls[0].name.binding().unwrap())
    }

    #[test]
    fn annotations_become_instances() {
        let body = vec![stmt::let_("xs", Some(ty::array(ty::named("Int"))), None)];
        assert_eq!(declared(&body, 0), Value::array(Value::int()));

        let body = vec![stmt::let_(
            "t",
            Some(ty::tuple(vec![ty::named("Int"), ty::named("String")])),
            None,
        )];
        assert_eq!(declared(&body, 0), Value::tuple(vec![Value::int(), Value::string()]));
    }

    #[test]
    fn wrong_type_argument_count() {
        let body = vec![stmt::let_("x", Some(ty::generic("Int", vec![ty::named("Int")])), None)];
        assert!(matches!(eval(&body).unwrap_err().kind, ErrorKind::TypeMismatch { .. }));
    }

    #[test]
    fn values_are_not_types() {
        let body = vec![
            stmt::let_("a", None, Some(expr::int(1))),
            stmt::let_("b", Some(ty::named("a")), None),
        ];
        let err = eval(&body).unwrap_err();
        assert_eq!(err.message(), "'a' is not a type");
    }

    #[test]
    fn async_functions_return_promises() {
        let body = vec![
            func::function("f")
                .async_()
                .returns(ty::named("Int"))
                .body(vec![stmt::ret(Some(expr::int(1)))])
                .stmt(),
            stmt::let_("p", None, Some(expr::call(expr::var("f"), vec![]))),
            stmt::expr(expr::call(expr::var("print"), vec![expr::var("p")])),
        ];
        assert_eq!(declared(&body, 1), Value::promise(Value::int()));

        let body = vec![
            func::function("g").async_().stmt(),
            stmt::let_("p", None, Some(expr::call(expr::var("g"), vec![]))),
        ];
        assert_eq!(declared(&body, 1), Value::instance(primitives::PROMISE));
    }
}
