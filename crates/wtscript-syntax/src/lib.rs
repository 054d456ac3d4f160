//! Syntax tree consumed by the wtscript compiler.
//!
//! The lexer and parser live outside this workspace. They produce a [`Script`]
//! per file, built from the owned node types in this crate. The compiler never
//! mutates the tree except through the binding slot in every [`Ident`], which
//! name resolution fills with the [`VarId`](wtscript_core::VarId) the identifier
//! refers to.
//!
//! # Modules
//!
//! - [`ident`]: identifiers and their binding slot
//! - [`types`]: type annotations
//! - [`expr`]: expressions and operators
//! - [`stmt`]: statements, functions, and declarations
//! - [`visit`]: forward and backward traversal
//! - [`build`]: programmatic construction, used by embedders and tests

pub mod build;
pub mod expr;
pub mod ident;
pub mod stmt;
pub mod types;
pub mod visit;

mod script;

pub use expr::{AssignOp, BinaryOp, Expr, UnaryOp};
pub use ident::Ident;
pub use script::Script;
pub use stmt::{
    AggregateName, Case, Catch, ClassDecl, ClassMember, ClassMemberKind, ClassModifiers,
    Declarator, EnumDecl, EnumMember, ExportDecl, ExportName, Function, IfBranch, ImportDecl,
    ImportName, InterfaceDecl, InterfaceMember, InterfaceModifiers, MemberModifiers, Param, Stmt,
    VarDecl, VarKind,
};
pub use types::TypeExpr;
pub use visit::{Direction, Visitor};
