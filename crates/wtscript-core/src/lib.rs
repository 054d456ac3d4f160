//! Core types shared by every wtscript crate.
//!
//! This crate holds the pieces that the syntax tree, the type registry and the
//! compiler passes all need to agree on:
//!
//! - [`Span`] and [`FileId`]: where something came from
//! - [`VarId`]: handle into the whole-program variable arena
//! - [`TypeHash`]: deterministic identity of a declared or built-in type
//! - [`CompilationError`]: the single error type every pass returns
//! - [`Config`]: the immutable compiler configuration threaded through the pipeline

mod config;
mod error;
mod ids;
mod lang;
mod span;
mod type_hash;

pub use config::{Config, Target};
pub use error::{CompilationError, CompileResult, ErrorKind, Note};
pub use ids::{FileId, VarId};
pub use lang::Lang;
pub use span::Span;
pub use type_hash::{TypeHash, hash_constants, primitives};
