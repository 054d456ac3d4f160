//! Type annotations.

use wtscript_core::Span;

use crate::Ident;

/// A type expression as written in source.
///
/// Named types bind their name like any other identifier. The names `any`
/// and `void` are reserved and never bound.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    /// `Int`, `Array<String>`, `Point`
    Named {
        name: Ident,
        args: Vec<TypeExpr>,
        span: Span,
    },
    /// `[Int, String]`
    Tuple { items: Vec<TypeExpr>, span: Span },
    /// `(Int, String) => Boolean`, with `None` meaning a void return
    Function {
        params: Vec<TypeExpr>,
        ret: Option<Box<TypeExpr>>,
        span: Span,
    },
}

impl TypeExpr {
    pub fn span(&self) -> Span {
        match self {
            TypeExpr::Named { span, .. }
            | TypeExpr::Tuple { span, .. }
            | TypeExpr::Function { span, .. } => *span,
        }
    }

    /// The bare name of a named type, if this is one.
    pub fn name(&self) -> Option<&str> {
        match self {
            TypeExpr::Named { name, .. } => Some(&name.name),
            _ => None,
        }
    }
}
