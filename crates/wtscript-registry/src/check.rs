//! Structural compatibility: `check(want, have)` succeeds when `have` is
//! usable wherever `want` is expected.

use wtscript_core::{CompilationError, CompileResult, Span, TypeHash, primitives};

use crate::entries::{MemberKind, TypeEntry};
use crate::{FunctionValue, Instance, Overload, TypeRegistry, Value};

impl TypeRegistry {
    /// Check that `have` can be used where `want` is expected.
    ///
    /// `have`'s own position, if it carries one, takes precedence over `span`
    /// in the diagnostic.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn check(&self, want: &Value, have: &Value, span: Span) -> CompileResult<()> {
        let span = have.location().unwrap_or(span);
        match (want.peel(), have.peel()) {
            (Value::Any, _) => Ok(()),
            (_, Value::Any) => Err(self.expected(want, have, span)),

            (Value::LiteralInt(a), Value::LiteralInt(b)) if a == b => Ok(()),
            (Value::LiteralBool(a), Value::LiteralBool(b)) if a == b => Ok(()),
            (Value::LiteralString(a), Value::LiteralString(b)) if a == b => Ok(()),
            (w, _) if w.is_literal() => Err(self.expected(want, have, span)),

            (Value::Instance(w), _) => self.check_instance(w, want, have, span),
            (Value::This(class), _) => {
                self.check_instance(&Instance::new(*class), want, have, span)
            }

            (Value::Function(w), Value::Function(h)) => self.check_function(w, h, span),

            (Value::Class(w), Value::Class(h)) if self.inherits(h.interface, w.interface) => Ok(()),

            (Value::Enum(a), Value::Enum(b)) if a == b => Ok(()),

            (Value::Tuple(w), Value::Tuple(h)) if w.items.len() == h.items.len() => {
                for (w, h) in w.items.iter().zip(h.items.iter()) {
                    self.check(w, h, span)?;
                }
                Ok(())
            }

            _ => Err(self.expected(want, have, span)),
        }
    }

    fn expected(&self, want: &Value, have: &Value, span: Span) -> CompilationError {
        CompilationError::mismatch(
            format!(
                "expected {}, got {}",
                self.describe(want.peel()),
                self.describe(have.peel())
            ),
            span,
        )
    }

    fn check_instance(
        &self,
        want: &Instance,
        want_value: &Value,
        have: &Value,
        span: Span,
    ) -> CompileResult<()> {
        // Tuples are usable as arrays of a common item type.
        if let Value::Tuple(tuple) = have.peel()
            && want.interface == primitives::ARRAY
        {
            if let Some(item) = want.arg() {
                for have_item in &tuple.items {
                    self.check(item, have_item, span)?;
                }
            }
            return Ok(());
        }

        let Some(mut have_instance) = have.instance_of() else {
            return Err(self.expected(want_value, have, span));
        };

        if want.interface == have_instance.interface {
            return self.check_args(want, &have_instance, span);
        }

        // Enum instances stand in for their primitive, never the reverse.
        if let Some(entry) = self.enumeration(have_instance.interface) {
            have_instance = Instance::new(entry.parent);
        }

        match self.get(want.interface) {
            Some(TypeEntry::Enum(_)) => Err(self.expected(want_value, have, span)),
            Some(TypeEntry::Interface(_)) => {
                if self.interface(have_instance.interface).is_some() {
                    if have_instance.interface == want.interface
                        || self
                            .interface_ancestors(have_instance.interface)
                            .contains(&want.interface)
                    {
                        return Ok(());
                    }
                    return Err(self.expected(want_value, have, span));
                }
                self.check_interface(want.interface, have_instance.interface, span)
            }
            _ if want.interface == primitives::OBJECT => Ok(()),
            _ if self.inherits(have_instance.interface, want.interface) => {
                self.check_args(want, &have_instance, span)
            }
            _ => Err(self.expected(want_value, have, span)),
        }
    }

    /// Type arguments are compared only when both sides carry the same number.
    fn check_args(&self, want: &Instance, have: &Instance, span: Span) -> CompileResult<()> {
        if want.args.len() != have.args.len() {
            return Ok(());
        }
        for (w, h) in want.args.iter().zip(have.args.iter()) {
            self.check(w, h, span)?;
        }
        Ok(())
    }

    /// Every overload of `want` needs a structurally compatible overload in `have`.
    fn check_function(
        &self,
        want: &FunctionValue,
        have: &FunctionValue,
        span: Span,
    ) -> CompileResult<()> {
        for overload in &want.overloads {
            let mut rejected = Vec::new();
            let found = have.overloads.iter().any(|candidate| {
                match self.check_overload(overload, candidate, span) {
                    Ok(()) => true,
                    Err(err) => {
                        rejected.push(err);
                        false
                    }
                }
            });
            if !found {
                let mut err = CompilationError::mismatch(
                    format!(
                        "function {} is not compatible with {}",
                        self.describe(&Value::Function(have.clone().into())),
                        self.describe(&Value::function(vec![overload.clone()])),
                    ),
                    span,
                );
                for reason in rejected {
                    err = err.merge(reason);
                }
                return Err(err);
            }
        }
        Ok(())
    }

    fn check_overload(&self, want: &Overload, have: &Overload, span: Span) -> CompileResult<()> {
        if want.params.len() != have.params.len() {
            return Err(CompilationError::mismatch(
                format!(
                    "expected {} parameter(s), got {}",
                    want.params.len(),
                    have.params.len()
                ),
                span,
            ));
        }
        for (w, h) in want.params.iter().zip(have.params.iter()) {
            self.check(w, h, span)?;
        }
        match (&want.ret, &have.ret) {
            (None, None) => Ok(()),
            (Some(w), Some(h)) => self.check(w, h, span),
            (Some(_), None) => Err(CompilationError::mismatch("expected a return value, got void", span)),
            (None, Some(_)) => Err(CompilationError::mismatch("expected void, got a return value", span)),
        }
    }

    // ==========================================================================
    // Interface conformance
    // ==========================================================================

    /// Check that `prototype` provides every member `interface` requires.
    ///
    /// Successful checks are cached per `(interface, prototype)` pair.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn check_interface(
        &self,
        interface: TypeHash,
        prototype: TypeHash,
        span: Span,
    ) -> CompileResult<()> {
        if self.conformance.borrow().contains(&(interface, prototype)) {
            return Ok(());
        }
        tracing::trace!(
            interface = self.type_name(interface),
            prototype = self.type_name(prototype),
            "checking conformance"
        );

        let receiver = Instance::new(prototype);
        let fail = |reason: String| {
            CompilationError::conformance(
                self.type_name(interface),
                self.type_name(prototype),
                reason,
                span,
            )
        };

        for signature in self.interface_signatures(interface) {
            let name = signature.name.as_str();
            match signature.kind {
                // a data property is required the way a getter is
                MemberKind::Getter | MemberKind::Property => {
                    let member = self
                        .instance_member(&receiver, name)
                        .ok_or_else(|| fail(format!("missing getter '{name}'")))?;
                    let want = signature.ret.clone().unwrap_or(Value::Any);
                    self.check(&want, &member.value, span)
                        .map_err(|err| fail(format!("getter '{name}' has the wrong type")).merge(err))?;
                }
                MemberKind::Setter => {
                    let member = self
                        .writable_member(&receiver, name)
                        .ok_or_else(|| fail(format!("missing setter '{name}'")))?;
                    let arg = signature.params.first().cloned().unwrap_or(Value::Any);
                    self.check(&member.value, &arg, span)
                        .map_err(|err| fail(format!("setter '{name}' has the wrong type")).merge(err))?;
                }
                MemberKind::Method => {
                    let member = self
                        .instance_member(&receiver, name)
                        .filter(|m| m.kind == MemberKind::Method)
                        .ok_or_else(|| fail(format!("missing method '{name}'")))?;
                    let want =
                        Value::simple_function(signature.params.clone(), signature.ret.clone());
                    self.check(&want, &member.value, span)
                        .map_err(|err| fail(format!("method '{name}' has the wrong signature")).merge(err))?;
                }
            }
        }

        self.conformance.borrow_mut().insert((interface, prototype));
        Ok(())
    }
}
