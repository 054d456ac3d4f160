//! Scope frames for name resolution.
//!
//! A [`ScopeChain`] is a stack of frames. The bottom frame holds the globals,
//! the next one the module's own top-level names. Every function, class and
//! block pushes a frame of its own kind.
//!
//! Names can't be shadowed: declaring a name that is already visible anywhere
//! in the chain is a duplicate declaration.

use rustc_hash::FxHashMap;
use wtscript_core::{CompilationError, CompileResult, VarId};
use wtscript_registry::Variables;
use wtscript_syntax::Ident;

// ============================================================================
// Types
// ============================================================================

/// What introduced a frame. Decides where `var` hoists to, where `this`
/// lookups stop, and which jump statements are allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Global,
    Module,
    Function {
        /// Arrow functions see the enclosing `this`.
        arrow: bool,
        is_async: bool,
        /// Instance methods and constructors see the class `this`.
        method: bool,
    },
    Class,
    Block,
    Loop,
    Branch,
    Case,
}

impl FrameKind {
    /// Frames that own `var` declarations.
    fn is_function(self) -> bool {
        matches!(self, FrameKind::Function { .. } | FrameKind::Module | FrameKind::Global)
    }
}

#[derive(Debug)]
struct Frame {
    kind: FrameKind,
    names: FxHashMap<String, VarId>,
}

impl Frame {
    fn new(kind: FrameKind) -> Self {
        Self {
            kind,
            names: FxHashMap::default(),
        }
    }
}

// ============================================================================
// ScopeChain
// ============================================================================

#[derive(Debug)]
pub struct ScopeChain {
    frames: Vec<Frame>,
}

impl ScopeChain {
    /// Create a chain holding `globals`, with an empty module frame on top.
    pub fn new<'a>(globals: impl IntoIterator<Item = (&'a str, VarId)>) -> Self {
        let mut global = Frame::new(FrameKind::Global);
        for (name, var) in globals {
            global.names.insert(name.to_string(), var);
        }
        Self {
            frames: vec![global, Frame::new(FrameKind::Module)],
        }
    }

    pub fn push(&mut self, kind: FrameKind) {
        self.frames.push(Frame::new(kind));
    }

    pub fn pop(&mut self) {
        if self.frames.len() > 2 {
            self.frames.pop();
        }
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    // ==========================================================================
    // Lookup
    // ==========================================================================

    /// Find the variable a name refers to.
    ///
    /// `this` and `super` are not visible through ordinary function frames,
    /// only through methods and arrow functions.
    pub fn lookup(&self, name: &str) -> Option<VarId> {
        let receiver = name == "this" || name == "super";
        for frame in self.frames.iter().rev() {
            if let Some(&var) = frame.names.get(name) {
                return Some(var);
            }
            if receiver
                && let FrameKind::Function {
                    arrow: false,
                    method: false,
                    ..
                } = frame.kind
            {
                return None;
            }
        }
        None
    }

    /// Whether `break` is allowed here.
    pub fn can_break(&self) -> bool {
        self.innermost_jump_target(|kind| matches!(kind, FrameKind::Loop | FrameKind::Case))
    }

    /// Whether `continue` is allowed here.
    pub fn can_continue(&self) -> bool {
        self.innermost_jump_target(|kind| matches!(kind, FrameKind::Loop))
    }

    fn innermost_jump_target(&self, accept: impl Fn(FrameKind) -> bool) -> bool {
        for frame in self.frames.iter().rev() {
            if accept(frame.kind) {
                return true;
            }
            if frame.kind.is_function() || frame.kind == FrameKind::Class {
                return false;
            }
        }
        false
    }

    /// Whether the innermost function is `async`.
    pub fn in_async(&self) -> bool {
        self.frames.iter().rev().find_map(|frame| match frame.kind {
            FrameKind::Function { is_async, .. } => Some(is_async),
            FrameKind::Module | FrameKind::Global | FrameKind::Class => Some(false),
            _ => None,
        }) == Some(true)
    }

    /// Whether any function frame is open.
    pub fn in_function(&self) -> bool {
        self.frames
            .iter()
            .any(|frame| matches!(frame.kind, FrameKind::Function { .. }))
    }

    // ==========================================================================
    // Declaration
    // ==========================================================================

    /// Declare `ident` in the innermost frame and bind it.
    pub fn declare(&mut self, ident: &Ident, var: VarId, vars: &Variables) -> CompileResult<()> {
        let index = self.frames.len() - 1;
        self.declare_at(index, ident, var, vars)
    }

    /// Declare `ident` in the innermost function (or module) frame and bind it.
    pub fn declare_hoisted(
        &mut self,
        ident: &Ident,
        var: VarId,
        vars: &Variables,
    ) -> CompileResult<()> {
        let index = self
            .frames
            .iter()
            .rposition(|frame| frame.kind.is_function())
            .unwrap_or(self.frames.len() - 1);
        self.declare_at(index, ident, var, vars)
    }

    /// Bind a name without the duplicate check, for implicit receivers.
    pub fn insert(&mut self, name: &str, var: VarId) {
        if let Some(frame) = self.frames.last_mut() {
            frame.names.insert(name.to_string(), var);
        }
    }

    fn declare_at(
        &mut self,
        index: usize,
        ident: &Ident,
        var: VarId,
        vars: &Variables,
    ) -> CompileResult<()> {
        let visible = self
            .frames
            .iter()
            .rev()
            .find_map(|frame| frame.names.get(&ident.name).copied());
        if let Some(previous) = visible {
            return Err(CompilationError::duplicate(
                &ident.name,
                ident.span,
                vars.get(previous).span,
            ));
        }
        tracing::trace!(name = %ident.name, %var, depth = index, "declare");
        self.frames[index].names.insert(ident.name.clone(), var);
        ident.bind(var);
        Ok(())
    }
}
