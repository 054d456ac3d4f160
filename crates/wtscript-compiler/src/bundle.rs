//! The whole-program driver.
//!
//! A [`Bundle`] owns every module, the shared [`CompilationContext`] and the
//! output [`Namespace`]. Front ends append entry files and run the passes in
//! order:
//!
//! ```text
//! resolve_dependencies -> resolve_names -> eval_types -> resolve_usage -> unique_names -> write
//! ```
//!
//! Each pass runs over every module that is not hidden, in emission order,
//! and stops at the first error. [`Bundle::compile`] runs them all.
//!
//! # Example
//!
//! ```
//! use wtscript_compiler::bundle::{Bundle, MemoryLoader};
//! use wtscript_core::Config;
//! use wtscript_syntax::Script;
//! use wtscript_syntax::build::{expr, stmt};
//!
//! let mut loader = MemoryLoader::new();
//! loader.add(Script::new(
//!     "/main.wts",
//!     vec![stmt::expr(expr::call(expr::var("print"), vec![expr::string("hi")]))],
//! ));
//!
//! let mut bundle = Bundle::new(Config::new().compact(true));
//! bundle.append_entry("/main.wts");
//! let output = bundle.compile(&mut loader).unwrap();
//! assert_eq!(output, "console.log(\"hi\");");
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write;

use petgraph::algo::{all_simple_paths, tarjan_scc};
use petgraph::graph::{DiGraph, NodeIndex};
use wtscript_core::{CompilationError, CompileResult, Config, ErrorKind, FileId, Lang, Span};
use wtscript_syntax::{Script, Stmt};

use crate::context::CompilationContext;
use crate::emit::Emitter;
use crate::module::{Dependency, Module, ModuleMap, resolve_path};
use crate::namespace::{NameGenerator, Namespace};
use crate::passes::{NameResolver, TypeEvaluator, UniqueNames, UsageResolver};

// ============================================================================
// Loading
// ============================================================================

/// Supplies parsed files to the bundle.
pub trait SourceLoader {
    /// The parsed file at an absolute path, `None` if there is none.
    fn load(&mut self, path: &str) -> Option<Script>;
}

/// A [`SourceLoader`] over scripts held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    scripts: BTreeMap<String, Script>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a script under its own path.
    pub fn add(&mut self, script: Script) -> &mut Self {
        self.scripts.insert(script.path.clone(), script);
        self
    }

    pub fn with(mut self, script: Script) -> Self {
        self.add(script);
        self
    }
}

impl SourceLoader for MemoryLoader {
    fn load(&mut self, path: &str) -> Option<Script> {
        self.scripts.get(path).cloned()
    }
}

// ============================================================================
// Bundle
// ============================================================================

#[derive(Debug)]
pub struct Bundle {
    ctx: CompilationContext,
    entries: Vec<String>,
    modules: ModuleMap,
    /// Paths by file id. Id 0 stands for "no file".
    files: Vec<String>,
    /// Every module, dependencies first.
    order: Vec<String>,
    namespace: Namespace,
}

impl Bundle {
    pub fn new(config: Config) -> Self {
        let namespace = Namespace::new(NameGenerator::new(config.compact));
        Self {
            ctx: CompilationContext::new(config),
            entries: Vec::new(),
            modules: ModuleMap::new(),
            files: vec![String::new()],
            order: Vec::new(),
            namespace,
        }
    }

    /// Add an entry file by absolute path.
    pub fn append_entry(&mut self, path: impl Into<String>) {
        let path = path.into();
        if !self.entries.contains(&path) {
            self.entries.push(path);
        }
    }

    pub fn config(&self) -> &Config {
        &self.ctx.config
    }

    pub fn context(&self) -> &CompilationContext {
        &self.ctx
    }

    pub fn module(&self, path: &str) -> Option<&Module> {
        self.modules.get(path)
    }

    /// Run every pass and return the output text.
    pub fn compile(&mut self, loader: &mut impl SourceLoader) -> CompileResult<String> {
        self.resolve_dependencies(loader)?;
        self.resolve_names()?;
        self.eval_types()?;
        self.resolve_usage()?;
        self.unique_names()?;
        Ok(self.write())
    }

    // ==========================================================================
    // Dependencies
    // ==========================================================================

    /// Load every file the entries reach, fix the emission order and hide
    /// files no entry needs.
    ///
    /// A file that can't be loaded is an import-not-found error at the
    /// import that asked for it. Mutual imports are a circular dependency
    /// error carrying one offending cycle.
    #[tracing::instrument(skip_all)]
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn resolve_dependencies(&mut self, loader: &mut impl SourceLoader) -> CompileResult<()> {
        tracing::info!(entries = self.entries.len(), "resolving dependencies");

        let mut pending: BTreeMap<String, Option<(FileId, Span)>> = self
            .entries
            .iter()
            .filter(|path| !self.modules.contains_key(*path))
            .map(|path| (path.clone(), None))
            .collect();

        while let Some((path, requested)) = pending.pop_first() {
            let Some(mut script) = loader.load(&path) else {
                let span = requested
                    .map(|(file, span)| span.in_file(file))
                    .unwrap_or_default();
                return Err(CompilationError::not_found(format!("file {path}"), span));
            };
            script.path = path.clone();

            let file = FileId::new(self.files.len() as u32);
            self.files.push(path.clone());
            let module = Module::new(file, script)?;
            for dep in module.script_dependencies() {
                if dep.path != path && !self.modules.contains_key(&dep.path) {
                    pending
                        .entry(dep.path.clone())
                        .or_insert(Some((file, dep.span)));
                }
            }
            tracing::debug!(path = %path, %file, "loaded module");
            self.modules.insert(path, module);
        }

        self.order = self.place()?;
        self.hide_unreachable();
        Ok(())
    }

    /// Emission order: repeatedly place every file whose dependencies are
    /// already placed, scanning in path order.
    fn place(&self) -> CompileResult<Vec<String>> {
        let mut placed: Vec<String> = Vec::with_capacity(self.modules.len());
        let mut done: BTreeSet<&str> = BTreeSet::new();
        while placed.len() < self.modules.len() {
            let before = placed.len();
            for (path, module) in &self.modules {
                if done.contains(path.as_str()) {
                    continue;
                }
                if module
                    .script_dependencies()
                    .all(|dep| done.contains(dep.path.as_str()))
                {
                    done.insert(path);
                    placed.push(path.clone());
                }
            }
            if placed.len() == before {
                return Err(self.cycle_error(&done));
            }
        }
        Ok(placed)
    }

    /// Reconstruct one import cycle among the files that could not be placed.
    fn cycle_error(&self, placed: &BTreeSet<&str>) -> CompilationError {
        let mut graph: DiGraph<&str, Span> = DiGraph::new();
        let mut nodes: BTreeMap<&str, NodeIndex> = BTreeMap::new();
        for path in self.modules.keys().filter(|p| !placed.contains(p.as_str())) {
            nodes.insert(path, graph.add_node(path));
        }
        for (&path, &from) in &nodes {
            for dep in self.modules[path].script_dependencies() {
                if let Some(&to) = nodes.get(dep.path.as_str()) {
                    graph.add_edge(from, to, dep.span);
                }
            }
        }

        let looping = tarjan_scc(&graph)
            .into_iter()
            .filter(|scc| scc.len() > 1 || graph.contains_edge(scc[0], scc[0]))
            .filter_map(|scc| scc.iter().copied().min_by_key(|&n| graph[n]))
            .min_by_key(|&n| graph[n]);

        let Some(start) = looping else {
            let stuck = nodes.keys().map(|p| p.to_string()).collect();
            return CompilationError::new(ErrorKind::CircularDependency { cycle: stuck }, Span::default());
        };

        let closing = graph
            .neighbors_directed(start, petgraph::Direction::Incoming)
            .filter(|&n| n == start || all_simple_paths::<Vec<_>, _>(&graph, start, n, 0, None).next().is_some())
            .min_by_key(|&n| graph[n])
            .unwrap_or(start);
        let mut path: Vec<NodeIndex> = if closing == start {
            vec![start]
        } else {
            all_simple_paths::<Vec<_>, _>(&graph, start, closing, 0, None)
                .next()
                .unwrap_or_else(|| vec![start, closing])
        };
        path.push(start);

        let span = graph
            .find_edge(path[0], path[1])
            .map(|edge| graph[edge])
            .unwrap_or_default()
            .in_file(self.modules[graph[start]].file());
        let cycle = path.iter().map(|&n| graph[n].to_string()).collect();
        CompilationError::new(ErrorKind::CircularDependency { cycle }, span)
    }

    /// Hide every file outside the entries' dependency closure.
    fn hide_unreachable(&mut self) {
        let mut needed: BTreeSet<String> = BTreeSet::new();
        for entry in &self.entries {
            if let Some(module) = self.modules.get(entry) {
                needed.extend(module.symbol_dependencies(&self.modules, None));
            }
        }
        for (path, module) in self.modules.iter_mut() {
            if !needed.contains(path) {
                tracing::debug!(path = %path, "hiding module");
                module.hide();
            }
        }
    }

    /// Paths of the modules the passes run over, in emission order.
    fn visible(&self) -> Vec<String> {
        self.order
            .iter()
            .filter(|path| self.modules.get(*path).is_some_and(|m| !m.is_hidden()))
            .cloned()
            .collect()
    }

    // ==========================================================================
    // Passes
    // ==========================================================================

    /// Bind imports and every identifier of every visible module.
    #[tracing::instrument(skip_all)]
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn resolve_names(&mut self) -> CompileResult<()> {
        let visible = self.visible();
        tracing::info!(modules = visible.len(), "resolving names");
        self.ctx.declare_defines()?;

        for path in &visible {
            let Some(module) = self.modules.get(path) else {
                continue;
            };
            let file = module.file();
            tracing::debug!(path = %path, "resolving module names");
            resolve_module_names(&mut self.ctx, &self.modules, module).map_err(|err| err.in_file(file))?;

            if let Some(module) = self.modules.get_mut(path) {
                module.bind_exports();
            }
            if let Some(module) = self.modules.get(path) {
                module
                    .check_aggregates(&self.modules)
                    .map_err(|err| err.in_file(file))?;
            }
        }
        Ok(())
    }

    #[tracing::instrument(skip_all)]
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn eval_types(&mut self) -> CompileResult<()> {
        let visible = self.visible();
        tracing::info!(modules = visible.len(), "evaluating types");
        for path in &visible {
            let Some(module) = self.modules.get(path) else {
                continue;
            };
            let file = module.file();
            TypeEvaluator::new(&mut self.ctx, file)
                .eval_module(&module.script().body)
                .map_err(|err| err.in_file(file))?;
        }
        Ok(())
    }

    #[tracing::instrument(skip_all)]
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn resolve_usage(&mut self) -> CompileResult<()> {
        let visible = self.visible();
        tracing::info!(modules = visible.len(), check_unused = self.ctx.config.check_unused, "resolving usage");
        for path in &visible {
            let Some(module) = self.modules.get(path) else {
                continue;
            };
            let file = module.file();
            UsageResolver::new(&self.ctx)
                .resolve_module(&module.script().body)
                .map_err(|err| err.in_file(file))?;
        }
        Ok(())
    }

    /// Assign output names: entry exports first, then universal classes,
    /// then everything else.
    #[tracing::instrument(skip_all)]
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn unique_names(&mut self) -> CompileResult<()> {
        let visible = self.visible();
        tracing::info!(modules = visible.len(), compact = self.ctx.config.compact, "assigning names");

        let mut names = UniqueNames::new(&mut self.ctx, &mut self.namespace);
        names.reserve_globals();

        for entry in &self.entries {
            let Some(module) = self.modules.get(entry) else {
                continue;
            };
            for (name, var) in module.exports() {
                if let Some(var) = var {
                    names.claim_fixed(var, name)?;
                }
            }
        }
        for path in &visible {
            if let Some(module) = self.modules.get(path) {
                names.claim_universal(&module.script().body)?;
            }
        }
        for path in &visible {
            if let Some(module) = self.modules.get(path) {
                let file = module.file();
                names
                    .rename_module(&module.script().body)
                    .map_err(|err| err.in_file(file))?;
            }
        }
        Ok(())
    }

    /// Emit the output text.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn write(&self) -> String {
        let mut emitter = Emitter::new(&self.ctx);
        emitter.header();
        emitter.defines();
        for path in self.visible() {
            if let Some(module) = self.modules.get(&path) {
                emitter.module(&module.script().body);
            }
        }
        emitter.finish()
    }

    // ==========================================================================
    // Queries
    // ==========================================================================

    /// Direct script dependencies of every loaded file.
    pub fn dependencies(&self) -> BTreeMap<&str, Vec<&str>> {
        self.modules
            .iter()
            .map(|(path, module)| {
                let deps = module.script_dependencies().map(|dep| dep.path.as_str()).collect();
                (path.as_str(), deps)
            })
            .collect()
    }

    /// Imports of templates, stylesheets and other files this compiler
    /// doesn't load, with the importing path.
    pub fn foreign_dependencies(&self) -> Vec<(&str, &Dependency)> {
        self.modules
            .iter()
            .flat_map(|(path, module)| {
                module
                    .dependencies()
                    .iter()
                    .filter(|dep| dep.lang != Lang::Script)
                    .map(move |dep| (path.as_str(), dep))
            })
            .collect()
    }

    pub fn is_hidden(&self, path: &str) -> bool {
        self.modules.get(path).is_some_and(Module::is_hidden)
    }

    /// Visible modules in the order they are emitted.
    pub fn emission_order(&self) -> Vec<&str> {
        self.order
            .iter()
            .filter(|path| !self.is_hidden(path))
            .map(String::as_str)
            .collect()
    }

    /// Render an error with file paths instead of file ids.
    pub fn render_error(&self, err: &CompilationError) -> String {
        let mut out = format!("{}: {}", self.locate(err.span), err.kind);
        for note in &err.notes {
            let _ = write!(out, "\n  note at {}: {}", self.locate(note.span), note.message);
        }
        out
    }

    fn locate(&self, span: Span) -> String {
        match self
            .files
            .get(span.file.index() as usize)
            .filter(|path| !path.is_empty())
        {
            Some(path) => format!("{path}:{}:{}", span.line, span.col),
            None => format!("{}:{}", span.line, span.col),
        }
    }
}

/// Bind the module's imports, then resolve its body.
fn resolve_module_names(ctx: &mut CompilationContext, modules: &ModuleMap, module: &Module) -> CompileResult<()> {
    let mut resolver = NameResolver::new(ctx, module.file());
    for stmt in &module.script().body {
        let Stmt::Import(decl) = stmt else {
            continue;
        };
        if decl.lang != Lang::Script {
            continue;
        }
        let path = resolve_path(module.path(), &decl.source, decl.lang);
        let target = modules
            .get(&path)
            .ok_or_else(|| CompilationError::not_found(format!("file {path}"), decl.source_span))?;
        for name in &decl.names {
            let var = target.exported_variable(modules, &name.imported, name.local.span)?;
            resolver.import(&name.local, var)?;
        }
    }
    resolver.resolve_module(&module.script().body)
}
