//! Call-site overload resolution.

use wtscript_core::{CompilationError, CompileResult, Span};

use crate::{FunctionValue, Overload, TypeRegistry, Value};

impl Overload {
    /// Expand a parameter list whose trailing parameters have defaults into one
    /// overload per accepted arity, shortest first.
    ///
    /// ```
    /// use wtscript_registry::{Overload, Value};
    ///
    /// let overloads = Overload::with_optional(vec![Value::int(), Value::int()], 1, Some(Value::int()));
    /// assert_eq!(overloads.len(), 2);
    /// assert_eq!(overloads[0].params.len(), 1);
    /// ```
    pub fn with_optional(params: Vec<Value>, required: usize, ret: Option<Value>) -> Vec<Overload> {
        let required = required.min(params.len());
        (required..=params.len())
            .map(|arity| Overload::new(params[..arity].to_vec(), ret.clone()))
            .collect()
    }
}

impl TypeRegistry {
    /// Pick the overload of `func` accepting `args`.
    ///
    /// Overloads are scanned in declared order and the first exact-arity
    /// structural match wins. Returns that overload's return value, `None` for
    /// void.
    ///
    /// A function with a single overload reports that overload's own
    /// diagnostic. Otherwise the error carries one note per rejected overload.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn resolve_call(
        &self,
        func: &FunctionValue,
        args: &[Value],
        span: Span,
    ) -> CompileResult<Option<Value>> {
        if let [only] = func.overloads.as_slice() {
            self.accepts(&only.params, args, span)?;
            return Ok(only.ret.clone());
        }

        let mut rejected = Vec::with_capacity(func.overloads.len());
        for overload in &func.overloads {
            match self.accepts(&overload.params, args, span) {
                Ok(()) => return Ok(overload.ret.clone()),
                Err(err) => rejected.push(err),
            }
        }
        Err(self.no_match(args, rejected, span))
    }

    /// Pick the constructor overload accepting `args`.
    pub fn resolve_constructor(
        &self,
        constructors: &[Vec<Value>],
        args: &[Value],
        span: Span,
    ) -> CompileResult<()> {
        if let [only] = constructors {
            return self.accepts(only, args, span);
        }

        let mut rejected = Vec::with_capacity(constructors.len());
        for params in constructors {
            match self.accepts(params, args, span) {
                Ok(()) => return Ok(()),
                Err(err) => rejected.push(err),
            }
        }
        Err(self.no_match(args, rejected, span))
    }

    fn accepts(&self, params: &[Value], args: &[Value], span: Span) -> CompileResult<()> {
        if params.len() != args.len() {
            return Err(CompilationError::overload(
                format!(
                    "expected {} argument(s), got {}",
                    params.len(),
                    args.len()
                ),
                span,
            ));
        }
        for (param, arg) in params.iter().zip(args) {
            self.check(param, arg, span)?;
        }
        Ok(())
    }

    fn no_match(&self, args: &[Value], rejected: Vec<CompilationError>, span: Span) -> CompilationError {
        let shown: Vec<String> = args.iter().map(|arg| self.describe(arg)).collect();
        let mut err = CompilationError::overload(
            format!("no overload accepts ({})", shown.join(", ")),
            span,
        );
        for reason in rejected {
            err = err.merge(reason);
        }
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wtscript_core::ErrorKind;

    fn optional_add() -> FunctionValue {
        FunctionValue {
            overloads: Overload::with_optional(
                vec![Value::int(), Value::int()],
                1,
                Some(Value::int()),
            ),
        }
    }

    #[test]
    fn optional_trailing_parameter_accepts_both_arities() {
        let registry = TypeRegistry::with_builtins();
        let f = optional_add();
        let span = Span::default();

        assert_eq!(
            registry.resolve_call(&f, &[Value::LiteralInt(3)], span).unwrap(),
            Some(Value::int())
        );
        assert!(
            registry
                .resolve_call(&f, &[Value::LiteralInt(3), Value::LiteralInt(4)], span)
                .is_ok()
        );
    }

    #[test]
    fn rejects_wrong_types_and_arity_with_a_note_per_overload() {
        let registry = TypeRegistry::with_builtins();
        let f = optional_add();
        let span = Span::default();

        let err = registry
            .resolve_call(&f, &[Value::literal_string("a")], span)
            .unwrap_err();
        assert!(matches!(err.kind, ErrorKind::OverloadMismatch { .. }));
        assert_eq!(err.notes.len(), 2);

        let three = [Value::LiteralInt(3), Value::LiteralInt(4), Value::LiteralInt(5)];
        assert!(registry.resolve_call(&f, &three, span).is_err());
    }

    #[test]
    fn single_overload_surfaces_its_own_diagnostic() {
        let registry = TypeRegistry::with_builtins();
        let f = FunctionValue {
            overloads: vec![Overload::new(vec![Value::string()], None)],
        };
        let err = registry
            .resolve_call(&f, &[Value::int()], Span::default())
            .unwrap_err();
        assert!(matches!(err.kind, ErrorKind::TypeMismatch { .. }));
        assert!(err.notes.is_empty());
        assert_eq!(
            registry.resolve_call(&f, &[Value::string()], Span::default()).unwrap(),
            None
        );
    }

    #[test]
    fn first_matching_overload_wins() {
        let registry = TypeRegistry::with_builtins();
        let f = FunctionValue {
            overloads: vec![
                Overload::new(vec![Value::number()], Some(Value::number())),
                Overload::new(vec![Value::int()], Some(Value::int())),
            ],
        };
        let ret = registry.resolve_call(&f, &[Value::int()], Span::default()).unwrap();
        assert_eq!(ret, Some(Value::number()));
    }

    #[test]
    fn constructors() {
        let registry = TypeRegistry::with_builtins();
        let ctors = vec![vec![], vec![Value::string()]];
        let span = Span::default();
        registry.resolve_constructor(&ctors, &[], span).unwrap();
        registry.resolve_constructor(&ctors, &[Value::literal_string("x")], span).unwrap();
        assert!(registry.resolve_constructor(&ctors, &[Value::int()], span).is_err());
    }
}
