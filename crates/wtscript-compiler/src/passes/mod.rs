//! Compiler passes, in pipeline order.
//!
//! - [`resolve`]: bind every identifier to a variable, declare types
//! - [`eval`]: evaluate and check every expression and declaration
//! - [`usage`]: reverse-order liveness, unused and unreachable code
//! - [`names`]: assign universal and unique output names
//!
//! Each pass runs over one module at a time and returns the first error it
//! meets.

pub mod eval;
pub mod names;
pub mod resolve;
pub mod usage;

pub use eval::TypeEvaluator;
pub use names::UniqueNames;
pub use resolve::NameResolver;
pub use usage::UsageResolver;
