//! Whole-program type and variable tables.
//!
//! - [`Value`]: the closed set of compile-time values an expression can have
//! - [`TypeRegistry`]: every built-in and declared type, keyed by [`TypeHash`],
//!   with compatibility checking ([`TypeRegistry::check`]), interface
//!   conformance and overload resolution
//! - [`Variables`]: the arena of every [`Variable`] in the program
//!
//! Values, entries and variables refer to each other through [`TypeHash`] and
//! [`VarId`] handles, never through shared pointers, so classes that mention
//! themselves and interfaces implemented by prototypes that reference them back
//! need no special handling.
//!
//! [`TypeHash`]: wtscript_core::TypeHash
//! [`VarId`]: wtscript_core::VarId

mod builtins;
mod check;
pub mod entries;
mod overload;
mod registry;
mod value;
mod variable;

pub use entries::{
    ClassEntry, EnumEntry, EnumMemberEntry, InterfaceEntry, MemberEntry, MemberKind,
    PrimitiveEntry, Signature, TypeEntry,
};
pub use registry::TypeRegistry;
pub use value::{ClassValue, FunctionValue, Instance, Overload, TupleValue, Value};
pub use variable::{VarKind, Variable, Variables};
