//! Whole-program state shared by every pass.
//!
//! The context owns the variable arena, the type registry and the global
//! bindings (built-in prototypes, built-in functions and command line defines)
//! that every module sees below its own scope.

use rustc_hash::FxHashMap;
use wtscript_core::{CompilationError, CompileResult, Config, ErrorKind, Span, TypeHash, VarId, primitives};
use wtscript_registry::{TypeRegistry, Value, VarKind, Variable, Variables};

/// Built-in prototypes visible as globals: source name, output name, type.
const BUILTIN_TYPES: &[(&str, &str, TypeHash)] = &[
    ("Object", "Object", primitives::OBJECT),
    ("Number", "Number", primitives::NUMBER),
    ("Int", "Number", primitives::INT),
    ("Boolean", "Boolean", primitives::BOOLEAN),
    ("String", "String", primitives::STRING),
    ("Array", "Array", primitives::ARRAY),
    ("Promise", "Promise", primitives::PROMISE),
];

/// Host objects without a static type.
const BUILTIN_OBJECTS: &[&str] = &["console", "JSON", "Math"];

/// Names the output language reserves besides the globals above.
pub(crate) const OUTPUT_GLOBALS: &[&str] = &[
    "undefined", "NaN", "Infinity", "Error", "window", "self", "globalThis", "require",
];

/// Program-wide tables threaded through every pass.
#[derive(Debug)]
pub struct CompilationContext {
    pub config: Config,
    pub variables: Variables,
    pub registry: TypeRegistry,
    globals: Vec<VarId>,
    global_names: FxHashMap<String, VarId>,
}

impl CompilationContext {
    /// Create a context with the built-in globals declared.
    ///
    /// Command line defines are declared separately by [`declare_defines`],
    /// since they can collide with built-ins.
    ///
    /// [`declare_defines`]: CompilationContext::declare_defines
    pub fn new(config: Config) -> Self {
        let mut ctx = Self {
            config,
            variables: Variables::new(),
            registry: TypeRegistry::with_builtins(),
            globals: Vec::new(),
            global_names: FxHashMap::default(),
        };

        for &(name, output, hash) in BUILTIN_TYPES {
            let value = Value::class(hash, ctx.registry.constructors(hash));
            let mut var = Variable::new(name, VarKind::Builtin, Span::default())
                .with_value(value)
                .with_object(hash);
            var.name = output.to_string();
            ctx.add_global(var);
        }

        let mut print = Variable::new("print", VarKind::Builtin, Span::default())
            .with_value(Value::simple_function(vec![Value::Any], None));
        print.name = "console.log".to_string();
        ctx.add_global(print);

        for &name in BUILTIN_OBJECTS {
            ctx.add_global(Variable::new(name, VarKind::Builtin, Span::default()).with_value(Value::Any));
        }

        ctx
    }

    fn add_global(&mut self, var: Variable) -> VarId {
        let name = var.original.clone();
        let id = self.variables.add(var);
        self.globals.push(id);
        self.global_names.insert(name, id);
        id
    }

    /// Declare every command line define as a global string constant.
    pub fn declare_defines(&mut self) -> CompileResult<()> {
        let defines: Vec<(String, String)> = self
            .config
            .defines
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        for (name, value) in defines {
            if self.global_names.contains_key(&name) {
                return Err(CompilationError::new(
                    ErrorKind::DuplicateDeclaration { name },
                    Span::default(),
                )
                .with_note("cmd define already defined", Span::default()));
            }
            let var = Variable::new(name.as_str(), VarKind::Define, Span::default())
                .with_value(Value::literal_string(&value));
            self.add_global(var);
        }
        Ok(())
    }

    /// Global bindings in declaration order.
    pub fn globals(&self) -> impl Iterator<Item = (&str, VarId)> {
        self.globals
            .iter()
            .map(|&id| (self.variables.get(id).original.as_str(), id))
    }

    pub fn global(&self, name: &str) -> Option<VarId> {
        self.global_names.get(name).copied()
    }

    /// The value of a variable, `any` when it has none yet.
    pub fn value_of(&self, var: VarId) -> Value {
        self.variables.get(var).value.clone().unwrap_or(Value::Any)
    }

    pub fn describe(&self, value: &Value) -> String {
        self.registry.describe(value)
    }
}
