//! wtscript compiler
//!
//! Whole-program semantic analysis and code generation for wtscript.
//!
//! ## Pipeline
//!
//! - **Dependencies**: load every file the entries reach, order them and hide
//!   files nothing needs
//! - **Names**: bind identifiers to variables, declare types
//! - **Types**: evaluate every expression, check declarations and calls
//! - **Usage**: unused declarations and unreachable statements
//! - **Output names**: fixed names first, then unique generated names
//! - **Emit**: one JavaScript text for the whole program
//!
//! ## Modules
//!
//! - [`bundle`]: the driver owning modules and running the passes
//! - [`context`]: variables, types and built-in globals shared by the passes
//! - [`emit`]: output generation
//! - [`module`]: per-file import and export tables
//! - [`namespace`]: output identifier allocation
//! - [`passes`]: the passes themselves
//! - [`scope`]: lexical scopes during name resolution

pub mod bundle;
pub mod context;
pub mod emit;
pub mod module;
pub mod namespace;
pub mod passes;
pub mod scope;

pub use bundle::{Bundle, MemoryLoader, SourceLoader};
pub use context::CompilationContext;
pub use emit::Emitter;
pub use module::{Dependency, Module, ModuleMap};
pub use namespace::{NameGenerator, Namespace};

pub use wtscript_core::{CompilationError, CompileResult};
