//! Type evaluation - give every expression a [`Value`] and check every rule
//! that depends on it.
//!
//! Runs after name resolution, so every identifier is bound. Blocks are
//! evaluated in two steps, mirroring resolution: the hoist step gives
//! functions, classes, interfaces and enums their values and registry
//! members, then the sequential step evaluates statements in order.
//!
//! The pass is split by concern:
//!
//! - [`types`]: type annotations to values, function signatures
//! - [`expr`]: expressions, member access, calls, operators
//! - [`stmt`]: statements and function bodies
//! - [`decl`]: classes, interfaces and enums
//! - [`returns`]: "not all code paths return a value"

mod decl;
mod expr;
mod returns;
mod stmt;
mod types;

use rustc_hash::FxHashSet;
use wtscript_core::{FileId, TypeHash, VarId};
use wtscript_registry::Value;
use wtscript_syntax::Stmt;

use crate::context::CompilationContext;
use wtscript_core::CompileResult;

pub use returns::all_paths_return;

/// Per-function evaluation state.
#[derive(Debug, Default)]
struct FunctionFrame {
    /// Declared return value, `None` for void. For async functions this is
    /// the value inside the promise.
    ret: Option<Value>,
    /// Set inside constructors: properties assigned through `this`.
    constructor: Option<FxHashSet<String>>,
}

pub struct TypeEvaluator<'a> {
    ctx: &'a mut CompilationContext,
    file: FileId,
    frames: Vec<FunctionFrame>,
    /// Enclosing class bodies, innermost last.
    classes: Vec<TypeHash>,
}

impl<'a> TypeEvaluator<'a> {
    pub fn new(ctx: &'a mut CompilationContext, file: FileId) -> Self {
        Self {
            ctx,
            file,
            frames: Vec::new(),
            classes: Vec::new(),
        }
    }

    /// Evaluate a module body.
    pub fn eval_module(&mut self, body: &[Stmt]) -> CompileResult<()> {
        tracing::trace!(file = %self.file, statements = body.len(), "evaluating module");
        self.eval_block(body)
    }

    fn frame(&self) -> Option<&FunctionFrame> {
        self.frames.last()
    }

    fn set_value(&mut self, var: VarId, value: Value) {
        self.ctx.variables.set_value(var, value);
    }

    fn describe(&self, value: &Value) -> String {
        self.ctx.describe(value)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use wtscript_core::{CompileResult, Config, FileId};
    use wtscript_syntax::Stmt;

    use super::TypeEvaluator;
    use crate::context::CompilationContext;
    use crate::passes::NameResolver;

    /// Resolve and evaluate one module.
    pub fn eval(body: &[Stmt]) -> CompileResult<CompilationContext> {
        let mut ctx = CompilationContext::new(Config::default());
        NameResolver::new(&mut ctx, FileId::new(1)).resolve_module(body)?;
        TypeEvaluator::new(&mut ctx, FileId::new(1)).eval_module(body)?;
        Ok(ctx)
    }
}
