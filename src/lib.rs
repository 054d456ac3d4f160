//! wtscript - a typed superset of JavaScript, compiled whole-program.
//!
//! This crate is the facade over the workspace:
//!
//! - [`core`]: spans, ids, errors and [`Config`]
//! - [`syntax`]: the syntax tree handed over by the parser, and its builders
//! - [`registry`]: the value model, types and variables
//! - [`compiler`]: the passes, the [`Bundle`] driver and the emitter
//!
//! # Example
//!
//! ```
//! use wtscript::syntax::build::{expr, stmt};
//! use wtscript::{Config, MemoryLoader, Script};
//!
//! let loader = MemoryLoader::new().with(Script::new(
//!     "/app/main.wts",
//!     vec![stmt::expr(expr::call(expr::var("print"), vec![expr::int(42)]))],
//! ));
//!
//! let output = wtscript::compile(Config::new().compact(true), ["/app/main.wts"], loader).unwrap();
//! assert_eq!(output, "console.log(42);");
//! ```

pub use wtscript_compiler as compiler;
pub use wtscript_core as core;
pub use wtscript_registry as registry;
pub use wtscript_syntax as syntax;

pub use wtscript_compiler::{Bundle, CompilationContext, MemoryLoader, SourceLoader};
pub use wtscript_core::{CompilationError, CompileResult, Config, ErrorKind, Span, Target};
pub use wtscript_syntax::Script;

/// Compile the program reachable from `entries` in one call.
///
/// Front ends that want per-pass control or dependency information use
/// [`Bundle`] directly.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn compile<I, S>(config: Config, entries: I, mut loader: impl SourceLoader) -> CompileResult<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut bundle = Bundle::new(config);
    for entry in entries {
        bundle.append_entry(entry);
    }
    let output = bundle.compile(&mut loader)?;
    tracing::info!(bytes = output.len(), modules = bundle.emission_order().len(), "compiled");
    Ok(output)
}
