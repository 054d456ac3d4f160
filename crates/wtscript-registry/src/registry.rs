//! TypeRegistry - storage and queries for every type in the program.
//!
//! Types are stored by [`TypeHash`] and iterated in registration order, so any
//! query that walks the registry is deterministic.
//!
//! # Example
//!
//! ```
//! use wtscript_core::{TypeHash, primitives};
//! use wtscript_registry::{ClassEntry, TypeRegistry};
//!
//! let mut registry = TypeRegistry::with_builtins();
//! let point = TypeHash(7);
//! registry.register(ClassEntry::new("Point", point).into()).unwrap();
//!
//! assert_eq!(registry.type_name(point), "Point");
//! assert!(registry.get(primitives::INT).is_some());
//! ```

use std::cell::RefCell;

use rustc_hash::{FxHashMap, FxHashSet};
use wtscript_core::{CompilationError, CompileResult, Span, TypeHash, primitives};

use crate::builtins;
use crate::entries::{
    ClassEntry, EnumEntry, InterfaceEntry, MemberEntry, MemberKind, Signature, TypeEntry,
};
use crate::{Instance, Value};

/// Whole-program type table.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: FxHashMap<TypeHash, TypeEntry>,
    /// Registration order.
    order: Vec<TypeHash>,
    /// `(interface, prototype)` pairs known to conform.
    pub(crate) conformance: RefCell<FxHashSet<(TypeHash, TypeHash)>>,
    /// Universal interface to the universal classes registered against it.
    implementations: FxHashMap<TypeHash, Vec<TypeHash>>,
}

impl TypeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in prototypes registered.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for entry in builtins::prototypes() {
            registry.insert(entry.into());
        }
        registry
    }

    // ==========================================================================
    // Registration
    // ==========================================================================

    /// Register a type. A hash that is already taken is a duplicate declaration.
    pub fn register(&mut self, entry: TypeEntry) -> CompileResult<()> {
        let hash = entry.type_hash();
        if let Some(existing) = self.types.get(&hash) {
            return Err(CompilationError::duplicate(
                entry.name(),
                entry.span(),
                existing.span(),
            ));
        }
        self.insert(entry);
        Ok(())
    }

    fn insert(&mut self, entry: TypeEntry) {
        let hash = entry.type_hash();
        self.order.push(hash);
        self.types.insert(hash, entry);
    }

    /// Record that a universal class implements a universal interface.
    pub fn register_implementation(&mut self, interface: TypeHash, class: TypeHash) {
        let list = self.implementations.entry(interface).or_default();
        if !list.contains(&class) {
            list.push(class);
        }
    }

    /// Universal classes registered against a universal interface.
    pub fn implementations(&self, interface: TypeHash) -> &[TypeHash] {
        self.implementations
            .get(&interface)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    // ==========================================================================
    // Lookup
    // ==========================================================================

    pub fn get(&self, hash: TypeHash) -> Option<&TypeEntry> {
        self.types.get(&hash)
    }

    pub fn get_mut(&mut self, hash: TypeHash) -> Option<&mut TypeEntry> {
        self.types.get_mut(&hash)
    }

    pub fn contains(&self, hash: TypeHash) -> bool {
        self.types.contains_key(&hash)
    }

    pub fn class(&self, hash: TypeHash) -> Option<&ClassEntry> {
        self.get(hash).and_then(TypeEntry::as_class)
    }

    pub fn class_mut(&mut self, hash: TypeHash) -> Option<&mut ClassEntry> {
        self.get_mut(hash).and_then(TypeEntry::as_class_mut)
    }

    pub fn interface(&self, hash: TypeHash) -> Option<&InterfaceEntry> {
        self.get(hash).and_then(TypeEntry::as_interface)
    }

    pub fn interface_mut(&mut self, hash: TypeHash) -> Option<&mut InterfaceEntry> {
        self.get_mut(hash).and_then(TypeEntry::as_interface_mut)
    }

    pub fn enumeration(&self, hash: TypeHash) -> Option<&EnumEntry> {
        self.get(hash).and_then(TypeEntry::as_enum)
    }

    pub fn enumeration_mut(&mut self, hash: TypeHash) -> Option<&mut EnumEntry> {
        self.get_mut(hash).and_then(TypeEntry::as_enum_mut)
    }

    /// Display name of a type.
    pub fn type_name(&self, hash: TypeHash) -> &str {
        self.get(hash).map(TypeEntry::name).unwrap_or("<unknown>")
    }

    /// All types in registration order.
    pub fn types(&self) -> impl Iterator<Item = &TypeEntry> {
        self.order.iter().filter_map(|hash| self.types.get(hash))
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    // ==========================================================================
    // Inheritance
    // ==========================================================================

    /// Ancestors of a prototype, nearest first, excluding the prototype itself.
    ///
    /// Stops on a repeated ancestor, so a malformed cycle can't loop.
    pub fn parent_chain(&self, hash: TypeHash) -> Vec<TypeHash> {
        let mut chain = Vec::new();
        let mut current = hash;
        while let Some(entry) = self.get(current)
            && let Some(parent) = entry.parent()
            && parent != hash
            && !chain.contains(&parent)
        {
            chain.push(parent);
            current = parent;
        }
        chain
    }

    /// Whether `have` is `want` or inherits from it.
    pub fn inherits(&self, have: TypeHash, want: TypeHash) -> bool {
        have == want || self.parent_chain(have).contains(&want)
    }

    /// Every interface `hash` extends, transitively, nearest first, without duplicates.
    pub fn interface_ancestors(&self, hash: TypeHash) -> Vec<TypeHash> {
        let mut out = Vec::new();
        let mut stack: Vec<TypeHash> = self
            .interface(hash)
            .map(|i| i.parents.iter().rev().map(|(h, _)| *h).collect())
            .unwrap_or_default();
        while let Some(next) = stack.pop() {
            if next == hash || out.contains(&next) {
                continue;
            }
            out.push(next);
            if let Some(interface) = self.interface(next) {
                stack.extend(interface.parents.iter().rev().map(|(h, _)| *h));
            }
        }
        out
    }

    /// Required members of an interface including inherited ones.
    ///
    /// Own members come first. A member inherited through several paths is listed once.
    pub fn interface_signatures(&self, hash: TypeHash) -> Vec<&Signature> {
        let mut out: Vec<&Signature> = Vec::new();
        let sources = std::iter::once(hash).chain(self.interface_ancestors(hash));
        for source in sources {
            if let Some(interface) = self.interface(source) {
                for member in &interface.members {
                    if !out.iter().any(|m| m.name == member.name && m.kind == member.kind) {
                        out.push(member);
                    }
                }
            }
        }
        out
    }

    /// Interfaces a prototype declares, through its own `implements` list, its
    /// ancestors' lists, and the interfaces those extend.
    pub fn declared_interfaces(&self, hash: TypeHash) -> Vec<TypeHash> {
        let mut out = Vec::new();
        for class in std::iter::once(hash).chain(self.parent_chain(hash)) {
            let Some(entry) = self.class(class) else {
                continue;
            };
            for (interface, _) in &entry.interfaces {
                for item in std::iter::once(*interface).chain(self.interface_ancestors(*interface)) {
                    if !out.contains(&item) {
                        out.push(item);
                    }
                }
            }
        }
        out
    }

    /// Constructor overloads of a prototype. Classes without their own
    /// constructor inherit the nearest ancestor's, and fall back to a single
    /// empty argument list.
    pub fn constructors(&self, hash: TypeHash) -> Vec<Vec<Value>> {
        for current in std::iter::once(hash).chain(self.parent_chain(hash)) {
            match self.get(current) {
                Some(TypeEntry::Class(class)) => {
                    if let Some(ctors) = &class.constructors {
                        return ctors.clone();
                    }
                }
                Some(TypeEntry::Primitive(primitive)) => return primitive.constructors.clone(),
                _ => {}
            }
        }
        vec![Vec::new()]
    }

    /// Every interface a class implements: each declared one followed by its
    /// ancestors, without duplicates. Ancestors carry the span of the
    /// declaration that brought them in.
    pub fn class_interfaces(&self, hash: TypeHash) -> Vec<(TypeHash, Span)> {
        let mut out: Vec<(TypeHash, Span)> = Vec::new();
        let Some(class) = self.class(hash) else {
            return out;
        };
        for &(declared, span) in &class.interfaces {
            for interface in std::iter::once(declared).chain(self.interface_ancestors(declared)) {
                if !out.iter().any(|(h, _)| *h == interface) {
                    out.push((interface, span));
                }
            }
        }
        out
    }

    // ==========================================================================
    // Members
    // ==========================================================================

    /// Readable instance member `name` of an instance, searching ancestors.
    pub fn instance_member(&self, instance: &Instance, name: &str) -> Option<MemberEntry> {
        self.find_instance_member(instance, name, |m| m.kind.is_readable())
    }

    /// Member accepting `obj.name = v`, searching ancestors.
    pub fn writable_member(&self, instance: &Instance, name: &str) -> Option<MemberEntry> {
        self.find_instance_member(instance, name, MemberEntry::is_writable)
    }

    /// Any instance member called `name`, readable or not.
    pub fn any_member(&self, instance: &Instance, name: &str) -> Option<MemberEntry> {
        self.find_instance_member(instance, name, |_| true)
    }

    fn find_instance_member(
        &self,
        instance: &Instance,
        name: &str,
        accept: impl Fn(&MemberEntry) -> bool,
    ) -> Option<MemberEntry> {
        let hash = instance.interface;
        for current in std::iter::once(hash).chain(self.parent_chain(hash)) {
            let found = match self.get(current)? {
                TypeEntry::Class(class) => class
                    .members
                    .iter()
                    .find(|m| !m.is_static && m.name == name && accept(m))
                    .cloned(),
                TypeEntry::Primitive(primitive) => {
                    let generic = if current == hash {
                        builtins::generic_member(current, &instance.args, name)
                    } else {
                        builtins::generic_member(current, &[], name)
                    };
                    generic.filter(|m| accept(m)).or_else(|| {
                        primitive
                            .members
                            .iter()
                            .find(|m| !m.is_static && m.name == name && accept(m))
                            .cloned()
                    })
                }
                TypeEntry::Interface(interface) => self
                    .interface_signatures(interface.type_hash)
                    .into_iter()
                    .find(|s| s.name == name)
                    .map(signature_member)
                    .filter(|m| accept(m)),
                TypeEntry::Enum(_) => None,
            };
            if found.is_some() {
                return found;
            }
        }
        None
    }

    /// Static member `name` of a class or enum, searching ancestors.
    pub fn static_member(&self, hash: TypeHash, name: &str) -> Option<MemberEntry> {
        if let Some(entry) = self.enumeration(hash) {
            return builtins::enum_static_member(entry, name);
        }
        std::iter::once(hash)
            .chain(self.parent_chain(hash))
            .filter_map(|current| self.class(current))
            .find_map(|class| class.find_static(name).cloned())
    }

    // ==========================================================================
    // Universality
    // ==========================================================================

    /// Whether values of this type are plain data that can cross a process or
    /// storage boundary.
    pub fn is_universal(&self, value: &Value) -> bool {
        match value.peel() {
            Value::LiteralInt(_) | Value::LiteralBool(_) | Value::LiteralString(_) => true,
            Value::Instance(instance) => match self.get(instance.interface) {
                Some(TypeEntry::Primitive(primitive)) => {
                    primitive.is_universal
                        && (primitive.type_params == 0
                            || (instance.args.len() == primitive.type_params
                                && instance.args.iter().all(|arg| self.is_universal(arg))))
                }
                Some(TypeEntry::Class(class)) => class.is_universal(),
                Some(TypeEntry::Interface(interface)) => interface.is_universal,
                Some(TypeEntry::Enum(_)) => true,
                None => false,
            },
            Value::Tuple(tuple) => tuple.items.iter().all(|item| self.is_universal(item)),
            _ => false,
        }
    }

    /// Whether `hash` is one of the numeric built-ins.
    pub fn is_numeric(&self, hash: TypeHash) -> bool {
        self.inherits(hash, primitives::NUMBER)
    }
}

/// View an interface signature as the member a prototype would provide.
fn signature_member(signature: &Signature) -> MemberEntry {
    match signature.kind {
        MemberKind::Getter => {
            MemberEntry::getter(&signature.name, signature.ret.clone().unwrap_or(Value::Any))
        }
        MemberKind::Setter => MemberEntry::setter(
            &signature.name,
            signature.params.first().cloned().unwrap_or(Value::Any),
        ),
        _ => MemberEntry::method(
            &signature.name,
            Value::simple_function(signature.params.clone(), signature.ret.clone()),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entries::{InterfaceEntry, Signature};
    use wtscript_core::{ErrorKind, Span};

    fn class(name: &str, hash: u64) -> ClassEntry {
        ClassEntry::new(name, TypeHash(hash))
    }

    #[test]
    fn builtins_are_registered() {
        let registry = TypeRegistry::with_builtins();
        for hash in primitives::ALL {
            assert!(registry.contains(hash), "{}", registry.type_name(hash));
        }
        assert_eq!(registry.type_name(primitives::INT), "Int");
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = TypeRegistry::new();
        registry
            .register(class("A", 1).with_span(Span::new(1, 1, 1)).into())
            .unwrap();
        let err = registry
            .register(class("A", 1).with_span(Span::new(5, 1, 1)).into())
            .unwrap_err();
        assert!(matches!(err.kind, ErrorKind::DuplicateDeclaration { .. }));
        assert_eq!(err.notes[0].span, Span::new(1, 1, 1));
    }

    #[test]
    fn parent_chain_and_inherits() {
        let mut registry = TypeRegistry::new();
        registry.register(class("A", 1).into()).unwrap();
        registry.register(class("B", 2).with_parent(TypeHash(1)).into()).unwrap();
        registry.register(class("C", 3).with_parent(TypeHash(2)).into()).unwrap();

        assert_eq!(registry.parent_chain(TypeHash(3)), vec![TypeHash(2), TypeHash(1)]);
        assert!(registry.inherits(TypeHash(3), TypeHash(1)));
        assert!(!registry.inherits(TypeHash(1), TypeHash(3)));
    }

    #[test]
    fn class_interfaces_include_ancestors_once() {
        let mut registry = TypeRegistry::new();
        registry.register(InterfaceEntry::new("Base", TypeHash(10)).into()).unwrap();
        registry
            .register(InterfaceEntry::new("Left", TypeHash(11)).with_parent(TypeHash(10)).into())
            .unwrap();
        registry
            .register(InterfaceEntry::new("Right", TypeHash(12)).with_parent(TypeHash(10)).into())
            .unwrap();
        registry
            .register(
                class("Both", 20)
                    .with_interface(TypeHash(11))
                    .with_interface(TypeHash(12))
                    .into(),
            )
            .unwrap();

        let interfaces: Vec<TypeHash> = registry
            .class_interfaces(TypeHash(20))
            .into_iter()
            .map(|(hash, _)| hash)
            .collect();
        assert_eq!(interfaces, vec![TypeHash(11), TypeHash(10), TypeHash(12)]);
    }

    #[test]
    fn parent_chain_survives_cycles() {
        let mut registry = TypeRegistry::new();
        registry.register(class("A", 1).with_parent(TypeHash(2)).into()).unwrap();
        registry.register(class("B", 2).with_parent(TypeHash(1)).into()).unwrap();
        assert_eq!(registry.parent_chain(TypeHash(1)), vec![TypeHash(2)]);
    }

    #[test]
    fn int_is_a_number() {
        let registry = TypeRegistry::with_builtins();
        assert!(registry.inherits(primitives::INT, primitives::NUMBER));
        assert!(registry.is_numeric(primitives::INT));
        assert!(!registry.is_numeric(primitives::STRING));
    }

    #[test]
    fn inherited_members_are_found() {
        let mut registry = TypeRegistry::with_builtins();
        registry
            .register(class("A", 1).with_member(MemberEntry::property("x", Value::int())).into())
            .unwrap();
        registry.register(class("B", 2).with_parent(TypeHash(1)).into()).unwrap();

        let member = registry.instance_member(&Instance::new(TypeHash(2)), "x");
        assert_eq!(member.map(|m| m.value), Some(Value::int()));
        assert!(registry.instance_member(&Instance::new(TypeHash(2)), "y").is_none());
    }

    #[test]
    fn interface_signatures_include_parents_once() {
        let mut registry = TypeRegistry::new();
        registry
            .register(
                InterfaceEntry::new("Named", TypeHash(10))
                    .with_member(Signature::getter("name", Value::string()))
                    .into(),
            )
            .unwrap();
        registry
            .register(InterfaceEntry::new("Left", TypeHash(11)).with_parent(TypeHash(10)).into())
            .unwrap();
        registry
            .register(InterfaceEntry::new("Right", TypeHash(12)).with_parent(TypeHash(10)).into())
            .unwrap();
        registry
            .register(
                InterfaceEntry::new("Both", TypeHash(13))
                    .with_parent(TypeHash(11))
                    .with_parent(TypeHash(12))
                    .into(),
            )
            .unwrap();

        let signatures = registry.interface_signatures(TypeHash(13));
        assert_eq!(signatures.len(), 1);
        assert_eq!(
            registry.interface_ancestors(TypeHash(13)),
            vec![TypeHash(11), TypeHash(10), TypeHash(12)]
        );
    }

    #[test]
    fn constructors_are_inherited() {
        let mut registry = TypeRegistry::with_builtins();
        registry
            .register(class("A", 1).with_constructor(vec![Value::int()]).into())
            .unwrap();
        registry.register(class("B", 2).with_parent(TypeHash(1)).into()).unwrap();
        registry.register(class("C", 3).into()).unwrap();

        assert_eq!(registry.constructors(TypeHash(2)), vec![vec![Value::int()]]);
        assert_eq!(registry.constructors(TypeHash(3)), vec![Vec::<Value>::new()]);
    }

    #[test]
    fn universality() {
        let mut registry = TypeRegistry::with_builtins();
        registry.register(class("Plain", 1).into()).unwrap();
        registry.register(class("Data", 2).universal("Data").into()).unwrap();

        assert!(registry.is_universal(&Value::int()));
        assert!(registry.is_universal(&Value::array(Value::string())));
        assert!(!registry.is_universal(&Value::instance(primitives::ARRAY)));
        assert!(!registry.is_universal(&Value::promise(Value::int())));
        assert!(!registry.is_universal(&Value::instance(TypeHash(1))));
        assert!(registry.is_universal(&Value::instance(TypeHash(2))));
        assert!(!registry.is_universal(&Value::Any));
    }

    #[test]
    fn implementations_keep_registration_order() {
        let mut registry = TypeRegistry::new();
        registry.register_implementation(TypeHash(9), TypeHash(2));
        registry.register_implementation(TypeHash(9), TypeHash(1));
        registry.register_implementation(TypeHash(9), TypeHash(2));
        assert_eq!(registry.implementations(TypeHash(9)), &[TypeHash(2), TypeHash(1)]);
        assert!(registry.implementations(TypeHash(8)).is_empty());
    }
}
