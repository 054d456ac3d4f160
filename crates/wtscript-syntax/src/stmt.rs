//! Statements, functions and declarations.

use bitflags::bitflags;
use wtscript_core::{Lang, Span};

use crate::{Expr, Ident, TypeExpr};

// ============================================================================
// Functions
// ============================================================================

/// A function parameter. A default value makes the parameter optional, which
/// adds an overload without it.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: Ident,
    pub ty: Option<TypeExpr>,
    pub default: Option<Expr>,
}

/// A function declaration, function expression, arrow function, method or
/// constructor.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    /// Absent for anonymous function expressions, methods and constructors.
    pub name: Option<Ident>,
    pub params: Vec<Param>,
    /// `None` means the function returns nothing.
    pub ret: Option<TypeExpr>,
    pub body: Vec<Stmt>,
    pub is_async: bool,
    pub is_arrow: bool,
    pub span: Span,
}

impl Function {
    /// Number of parameters that must be supplied.
    pub fn required_params(&self) -> usize {
        self.params
            .iter()
            .position(|p| p.default.is_some())
            .unwrap_or(self.params.len())
    }
}

// ============================================================================
// Variable Declarations
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarKind {
    /// Function scoped and hoisted.
    Var,
    Let,
    Const,
}

impl VarKind {
    pub fn as_str(self) -> &'static str {
        match self {
            VarKind::Var => "var",
            VarKind::Let => "let",
            VarKind::Const => "const",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Declarator {
    pub name: Ident,
    pub ty: Option<TypeExpr>,
    pub init: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub kind: VarKind,
    pub decls: Vec<Declarator>,
    pub span: Span,
}

// ============================================================================
// Classes
// ============================================================================

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ClassModifiers: u8 {
        const ABSTRACT = 1 << 0;
        const FINAL = 1 << 1;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MemberModifiers: u8 {
        const STATIC = 1 << 0;
        const ABSTRACT = 1 << 1;
        const GETTER = 1 << 2;
        const SETTER = 1 << 3;
        const PRIVATE = 1 << 4;
        const OVERRIDE = 1 << 5;
        const CONST = 1 << 6;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClassMemberKind {
    Method(Function),
    Property {
        ty: Option<TypeExpr>,
        init: Option<Expr>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassMember {
    pub name: String,
    pub modifiers: MemberModifiers,
    pub kind: ClassMemberKind,
    pub span: Span,
}

impl ClassMember {
    pub fn is_static(&self) -> bool {
        self.modifiers.contains(MemberModifiers::STATIC)
    }

    pub fn is_abstract(&self) -> bool {
        self.modifiers.contains(MemberModifiers::ABSTRACT)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub name: Ident,
    pub parent: Option<TypeExpr>,
    pub implements: Vec<TypeExpr>,
    pub modifiers: ClassModifiers,
    /// Externally fixed name of a universal class.
    pub universal_name: Option<String>,
    pub constructor: Option<Function>,
    pub members: Vec<ClassMember>,
    pub span: Span,
}

impl ClassDecl {
    pub fn is_abstract(&self) -> bool {
        self.modifiers.contains(ClassModifiers::ABSTRACT)
    }

    pub fn is_final(&self) -> bool {
        self.modifiers.contains(ClassModifiers::FINAL)
    }
}

// ============================================================================
// Interfaces and Enums
// ============================================================================

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct InterfaceModifiers: u8 {
        const UNIVERSAL = 1 << 0;
        const RPC = 1 << 1;
    }
}

/// A required member. `GETTER` and `SETTER` in `modifiers` select the
/// accessor forms, anything else is an ordinary method.
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceMember {
    pub name: String,
    pub modifiers: MemberModifiers,
    pub params: Vec<TypeExpr>,
    pub ret: Option<TypeExpr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceDecl {
    pub name: Ident,
    pub parents: Vec<TypeExpr>,
    pub modifiers: InterfaceModifiers,
    pub members: Vec<InterfaceMember>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumMember {
    pub name: String,
    /// Omitted values count up from the previous `Int` member, or repeat the
    /// member name for `String` enums.
    pub value: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumDecl {
    pub name: Ident,
    pub parent: TypeExpr,
    pub members: Vec<EnumMember>,
    pub span: Span,
}

// ============================================================================
// Imports and Exports
// ============================================================================

/// `imported as local`
#[derive(Debug, Clone, PartialEq)]
pub struct ImportName {
    pub imported: String,
    pub local: Ident,
}

/// `import {a, b as c} from "./x"`, or `import "./x"` when `names` is empty.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportDecl {
    pub source: String,
    pub source_span: Span,
    pub lang: Lang,
    pub names: Vec<ImportName>,
    pub span: Span,
}

/// `local as exported`
#[derive(Debug, Clone, PartialEq)]
pub struct ExportName {
    pub local: Ident,
    pub exported: String,
}

/// `imported as exported` inside `export {..} from`
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateName {
    pub imported: String,
    pub exported: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExportDecl {
    /// `export function f() {}`, `export let x = 1`, ...
    Declaration { stmt: Box<Stmt>, span: Span },
    /// `export {a, b as c}`
    Names { names: Vec<ExportName>, span: Span },
    /// `export {a as b} from "./x"`, or `export * from "./x"` when `names` is `None`.
    Aggregate {
        source: String,
        source_span: Span,
        names: Option<Vec<AggregateName>>,
        span: Span,
    },
}

// ============================================================================
// Statements
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct IfBranch {
    pub cond: Expr,
    pub body: Vec<Stmt>,
}

/// A `case` clause, or `default` when `test` is `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct Case {
    pub test: Option<Expr>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Catch {
    pub param: Option<Ident>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Var(VarDecl),
    Function(Function),
    Class(ClassDecl),
    Interface(InterfaceDecl),
    Enum(EnumDecl),
    Expr(Expr),
    Return {
        value: Option<Expr>,
        span: Span,
    },
    /// `if .. else if .. else`
    If {
        branches: Vec<IfBranch>,
        otherwise: Option<Vec<Stmt>>,
        span: Span,
    },
    While {
        cond: Expr,
        body: Vec<Stmt>,
        span: Span,
    },
    For {
        init: Option<Box<Stmt>>,
        cond: Option<Expr>,
        step: Option<Expr>,
        body: Vec<Stmt>,
        span: Span,
    },
    Switch {
        subject: Expr,
        cases: Vec<Case>,
        span: Span,
    },
    Block {
        body: Vec<Stmt>,
        span: Span,
    },
    Break {
        span: Span,
    },
    Continue {
        span: Span,
    },
    Throw {
        value: Expr,
        span: Span,
    },
    Try {
        body: Vec<Stmt>,
        catch: Option<Catch>,
        finally: Option<Vec<Stmt>>,
        span: Span,
    },
    Import(ImportDecl),
    Export(ExportDecl),
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Var(decl) => decl.span,
            Stmt::Function(func) => func.span,
            Stmt::Class(class) => class.span,
            Stmt::Interface(interface) => interface.span,
            Stmt::Enum(decl) => decl.span,
            Stmt::Expr(expr) => expr.span(),
            Stmt::Import(import) => import.span,
            Stmt::Export(
                ExportDecl::Declaration { span, .. }
                | ExportDecl::Names { span, .. }
                | ExportDecl::Aggregate { span, .. },
            ) => *span,
            Stmt::Return { span, .. }
            | Stmt::If { span, .. }
            | Stmt::While { span, .. }
            | Stmt::For { span, .. }
            | Stmt::Switch { span, .. }
            | Stmt::Block { span, .. }
            | Stmt::Break { span }
            | Stmt::Continue { span }
            | Stmt::Throw { span, .. }
            | Stmt::Try { span, .. } => *span,
        }
    }

    /// Whether control never falls through to the next statement of the block.
    pub fn is_terminator(&self) -> bool {
        matches!(
            self,
            Stmt::Return { .. } | Stmt::Throw { .. } | Stmt::Break { .. } | Stmt::Continue { .. }
        )
    }

    /// The declaration wrapped by `export`, or the statement itself.
    pub fn unexported(&self) -> &Stmt {
        match self {
            Stmt::Export(ExportDecl::Declaration { stmt, .. }) => stmt,
            other => other,
        }
    }
}
