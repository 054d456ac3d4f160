//! One compiled file: its import, export and re-export tables.
//!
//! Tables are filled from the top-level statements when the module is created,
//! before any name is resolved, so the dependency resolver can compute
//! per-export reachability without looking inside declarations.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

use wtscript_core::{CompilationError, CompileResult, FileId, Lang, Span, VarId};
use wtscript_syntax::{ExportDecl, Ident, Script, Stmt};

/// All modules of a bundle, keyed by absolute path.
pub type ModuleMap = BTreeMap<String, Module>;

/// A direct dependency edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub path: String,
    pub lang: Lang,
    /// Position of the path literal in the importing file.
    pub span: Span,
}

#[derive(Debug, Clone)]
struct ImportEntry {
    path: String,
    imported: String,
    span: Span,
}

#[derive(Debug, Clone)]
struct ExportEntry {
    span: Span,
    var: Option<VarId>,
}

#[derive(Debug, Clone)]
struct AggregateEntry {
    path: String,
    imported: String,
    span: Span,
    var: Option<VarId>,
}

#[derive(Debug)]
pub struct Module {
    path: String,
    file: FileId,
    script: Script,
    dependencies: Vec<Dependency>,
    /// Local name to import.
    imports: BTreeMap<String, ImportEntry>,
    /// `import "./x"`
    side_effects: Vec<ImportEntry>,
    exports: BTreeMap<String, ExportEntry>,
    /// Named re-exports, and wildcard ones keyed `*<path>`. Wildcard hits are
    /// memoized as named entries.
    aggregates: RefCell<BTreeMap<String, AggregateEntry>>,
    hidden: bool,
}

impl Module {
    /// Build the module tables from a parsed file.
    pub fn new(file: FileId, script: Script) -> CompileResult<Self> {
        let mut module = Self {
            path: script.path.clone(),
            file,
            script: Script::new(String::new(), Vec::new()),
            dependencies: Vec::new(),
            imports: BTreeMap::new(),
            side_effects: Vec::new(),
            exports: BTreeMap::new(),
            aggregates: RefCell::new(BTreeMap::new()),
            hidden: false,
        };
        for stmt in &script.body {
            module.scan(stmt).map_err(|err| err.in_file(file))?;
        }
        module.script = script;
        Ok(module)
    }

    fn scan(&mut self, stmt: &Stmt) -> CompileResult<()> {
        match stmt {
            Stmt::Import(decl) => {
                let path = resolve_path(&self.path, &decl.source, decl.lang);
                self.add_dependency(&path, decl.lang, decl.source_span);
                if decl.names.is_empty() {
                    self.side_effects.push(ImportEntry {
                        path,
                        imported: String::new(),
                        span: decl.span,
                    });
                    return Ok(());
                }
                if decl.lang != Lang::Script {
                    return Err(CompilationError::semantic(
                        format!("names can't be imported from a .{} file", decl.lang),
                        decl.source_span,
                    ));
                }
                for name in &decl.names {
                    if let Some(other) = self.imports.get(&name.local.name) {
                        return Err(CompilationError::semantic(
                            format!("'{}' already imported", name.local.name),
                            name.local.span,
                        )
                        .with_note("imported here", other.span));
                    }
                    self.imports.insert(
                        name.local.name.clone(),
                        ImportEntry {
                            path: path.clone(),
                            imported: name.imported.clone(),
                            span: name.local.span,
                        },
                    );
                }
            }
            Stmt::Export(ExportDecl::Declaration { stmt, .. }) => {
                for ident in declared_names(stmt) {
                    self.add_export(&ident.name, ident.span)?;
                }
            }
            Stmt::Export(ExportDecl::Names { names, .. }) => {
                for name in names {
                    self.add_export(&name.exported, name.local.span)?;
                }
            }
            Stmt::Export(ExportDecl::Aggregate {
                source,
                source_span,
                names,
                span,
            }) => {
                let path = resolve_path(&self.path, source, Lang::Script);
                self.add_dependency(&path, Lang::Script, *source_span);
                match names {
                    Some(names) => {
                        for name in names {
                            self.add_aggregate(&name.exported, &name.imported, &path, name.span)?;
                        }
                    }
                    None => {
                        self.aggregates.get_mut().insert(
                            format!("*{path}"),
                            AggregateEntry {
                                path,
                                imported: "*".to_string(),
                                span: *span,
                                var: None,
                            },
                        );
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn add_dependency(&mut self, path: &str, lang: Lang, span: Span) {
        if !self.dependencies.iter().any(|dep| dep.path == path) {
            self.dependencies.push(Dependency {
                path: path.to_string(),
                lang,
                span,
            });
        }
    }

    fn add_export(&mut self, name: &str, span: Span) -> CompileResult<()> {
        if let Some(other) = self.exports.get(name) {
            return Err(CompilationError::semantic(
                format!("exported variable name '{name}' already used"),
                span,
            )
            .with_note("exported here", other.span));
        }
        if let Some(other) = self.aggregates.get_mut().get(name) {
            return Err(CompilationError::semantic(
                format!("'{name}' already exported as aggregate"),
                span,
            )
            .with_note("exported here", other.span));
        }
        self.exports.insert(name.to_string(), ExportEntry { span, var: None });
        Ok(())
    }

    fn add_aggregate(&mut self, name: &str, imported: &str, path: &str, span: Span) -> CompileResult<()> {
        if let Some(other) = self.exports.get(name) {
            return Err(CompilationError::semantic(format!("'{name}' already exported"), span)
                .with_note("exported here", other.span));
        }
        let aggregates = self.aggregates.get_mut();
        if let Some(other) = aggregates.get(name) {
            return Err(CompilationError::semantic(
                format!("'{name}' already exported as aggregate"),
                span,
            )
            .with_note("exported here", other.span));
        }
        aggregates.insert(
            name.to_string(),
            AggregateEntry {
                path: path.to_string(),
                imported: imported.to_string(),
                span,
                var: None,
            },
        );
        Ok(())
    }

    // ==========================================================================
    // Accessors
    // ==========================================================================

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn file(&self) -> FileId {
        self.file
    }

    pub fn script(&self) -> &Script {
        &self.script
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub(crate) fn hide(&mut self) {
        self.hidden = true;
    }

    /// Direct dependencies in statement order, each path once.
    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    /// Direct dependencies compiled by this crate.
    pub fn script_dependencies(&self) -> impl Iterator<Item = &Dependency> {
        self.dependencies.iter().filter(|dep| dep.lang == Lang::Script)
    }

    /// Explicit exports and their variables, in name order. Variables are
    /// available once names are resolved.
    pub fn exports(&self) -> impl Iterator<Item = (&str, Option<VarId>)> {
        self.exports.iter().map(|(name, entry)| (name.as_str(), entry.var))
    }

    pub fn exports_name(&self, name: &str) -> bool {
        self.exports.contains_key(name)
    }

    // ==========================================================================
    // Reachability
    // ==========================================================================

    /// Paths needed to define export `name`, or the whole file for `None`.
    pub fn symbol_dependencies(&self, modules: &ModuleMap, name: Option<&str>) -> BTreeSet<String> {
        let mut walk = Reachability::new(modules);
        walk.symbol(self, name);
        walk.paths
    }

    /// Paths needed by this file's imports, without re-exports that nothing asks for.
    pub fn minimal_dependencies(&self, modules: &ModuleMap) -> BTreeSet<String> {
        let mut walk = Reachability::new(modules);
        walk.imports(self);
        walk.paths
    }

    // ==========================================================================
    // Export lookup
    // ==========================================================================

    /// The variable behind export `name`, following re-exports.
    ///
    /// A name this module doesn't export at all is an import-not-found error,
    /// which lets wildcard searches keep looking in sibling re-exports.
    pub fn exported_variable(&self, modules: &ModuleMap, name: &str, span: Span) -> CompileResult<VarId> {
        if let Some(entry) = self.exports.get(name) {
            return entry.var.ok_or_else(|| {
                CompilationError::semantic(format!("'{name}' used before {} is resolved", self.path), span)
            });
        }

        let named = self.aggregates.borrow().get(name).cloned();
        if let Some(aggregate) = named {
            if let Some(var) = aggregate.var {
                return Ok(var);
            }
            let target = modules
                .get(&aggregate.path)
                .ok_or_else(|| CompilationError::not_found(format!("module {}", aggregate.path), aggregate.span))?;
            let var = target.exported_variable(modules, &aggregate.imported, aggregate.span)?;
            if let Some(entry) = self.aggregates.borrow_mut().get_mut(name) {
                entry.var = Some(var);
            }
            return Ok(var);
        }

        let wildcards: Vec<AggregateEntry> = self
            .aggregates
            .borrow()
            .iter()
            .filter(|(key, _)| key.starts_with('*'))
            .map(|(_, aggregate)| aggregate.clone())
            .collect();

        let mut found: Option<(VarId, AggregateEntry)> = None;
        for aggregate in wildcards {
            let Some(target) = modules.get(&aggregate.path) else {
                return Err(CompilationError::not_found(format!("module {}", aggregate.path), aggregate.span));
            };
            match target.exported_variable(modules, name, aggregate.span) {
                Ok(var) => {
                    if let Some((_, previous)) = &found {
                        return Err(CompilationError::semantic(format!("'{name}' exported twice"), aggregate.span)
                            .with_note("also exported by this module", previous.span));
                    }
                    found = Some((var, aggregate));
                }
                Err(err) if err.is_not_found() => continue,
                Err(err) => return Err(err),
            }
        }

        match found {
            Some((var, aggregate)) => {
                self.aggregates.borrow_mut().insert(
                    name.to_string(),
                    AggregateEntry {
                        path: aggregate.path,
                        imported: name.to_string(),
                        span: aggregate.span,
                        var: Some(var),
                    },
                );
                Ok(var)
            }
            None => Err(CompilationError::not_found(format!("'{name}' in {}", self.path), span)),
        }
    }

    /// Resolve every named re-export, so a missing one is reported even when
    /// nothing imports it. Re-exports from hidden modules are skipped, since
    /// those are never resolved.
    pub fn check_aggregates(&self, modules: &ModuleMap) -> CompileResult<()> {
        let named: Vec<(String, String, Span)> = self
            .aggregates
            .borrow()
            .iter()
            .filter(|(key, _)| !key.starts_with('*'))
            .map(|(key, aggregate)| (key.clone(), aggregate.path.clone(), aggregate.span))
            .collect();
        for (name, path, span) in named {
            if modules.get(&path).is_some_and(Module::is_hidden) {
                continue;
            }
            self.exported_variable(modules, &name, span)?;
        }
        Ok(())
    }

    /// Record the variables behind explicit exports. Runs after the module's
    /// names are resolved.
    pub fn bind_exports(&mut self) {
        let mut bound = Vec::new();
        for stmt in &self.script.body {
            match stmt {
                Stmt::Export(ExportDecl::Declaration { stmt, .. }) => {
                    for ident in declared_names(stmt) {
                        bound.push((ident.name.clone(), ident.binding()));
                    }
                }
                Stmt::Export(ExportDecl::Names { names, .. }) => {
                    for name in names {
                        bound.push((name.exported.clone(), name.local.binding()));
                    }
                }
                _ => {}
            }
        }
        for (name, var) in bound {
            if let Some(entry) = self.exports.get_mut(&name) {
                entry.var = var;
            }
        }
    }
}

/// Identifiers a declaration statement introduces.
pub(crate) fn declared_names(stmt: &Stmt) -> Vec<&Ident> {
    match stmt {
        Stmt::Var(decl) => decl.decls.iter().map(|d| &d.name).collect(),
        Stmt::Function(func) => func.name.iter().collect(),
        Stmt::Class(class) => vec![&class.name],
        Stmt::Interface(interface) => vec![&interface.name],
        Stmt::Enum(decl) => vec![&decl.name],
        _ => Vec::new(),
    }
}

/// Resolve an import source against the importing file.
///
/// Relative sources are joined to the importer's directory, `.` and `..`
/// segments are folded, and the language extension is appended when the last
/// segment has none.
///
/// ```
/// use wtscript_compiler::module::resolve_path;
/// use wtscript_core::Lang;
///
/// assert_eq!(resolve_path("/app/src/main.wts", "../lib/util", Lang::Script), "/app/lib/util.wts");
/// assert_eq!(resolve_path("/app/main.wts", "/abs/x.wts", Lang::Script), "/abs/x.wts");
/// ```
pub fn resolve_path(importer: &str, source: &str, lang: Lang) -> String {
    let joined = if source.starts_with('/') {
        source.to_string()
    } else {
        let dir = importer.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("");
        format!("{dir}/{source}")
    };

    let mut segments: Vec<&str> = Vec::new();
    for segment in joined.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    let mut path = format!("/{}", segments.join("/"));
    let has_extension = segments.last().is_some_and(|last| last.contains('.'));
    if !has_extension {
        path.push('.');
        path.push_str(lang.extension());
    }
    path
}

/// Reachability walk over the module graph. Each file, and each name looked
/// up in a file, is expanded once.
struct Reachability<'a> {
    modules: &'a ModuleMap,
    seen: BTreeSet<(String, Option<String>)>,
    paths: BTreeSet<String>,
}

impl<'a> Reachability<'a> {
    fn new(modules: &'a ModuleMap) -> Self {
        Self {
            modules,
            seen: BTreeSet::new(),
            paths: BTreeSet::new(),
        }
    }

    fn symbol(&mut self, module: &Module, name: Option<&str>) {
        let modules = self.modules;
        // a local export needs the whole file
        let name = name.filter(|name| !module.exports.contains_key(*name));
        if !self.seen.insert((module.path.clone(), name.map(str::to_string))) {
            return;
        }
        let Some(name) = name else {
            self.paths.insert(module.path.clone());
            self.imports(module);
            return;
        };

        let aggregates = module.aggregates.borrow();
        if let Some(aggregate) = aggregates.get(name) {
            if let Some(next) = modules.get(&aggregate.path) {
                self.symbol(next, Some(aggregate.imported.as_str()));
            }
            return;
        }
        for (_, aggregate) in aggregates.iter().filter(|(key, _)| key.starts_with('*')) {
            if let Some(next) = modules.get(&aggregate.path) {
                self.symbol(next, Some(name));
            }
        }
    }

    fn imports(&mut self, module: &Module) {
        let modules = self.modules;
        for import in module.imports.values() {
            if let Some(next) = modules.get(&import.path) {
                self.symbol(next, Some(import.imported.as_str()));
            }
        }
        for import in &module.side_effects {
            if let Some(next) = modules.get(&import.path) {
                self.symbol(next, None);
            }
        }
    }
}
