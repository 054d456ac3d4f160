//! Class type entry.

use wtscript_core::{Span, TypeHash, VarId};

use super::{MemberEntry, MemberKind};
use crate::Value;

/// Registry entry for a declared class.
///
/// Registered empty when the class name is hoisted, then filled in when the
/// declaration itself is resolved, so classes can be referenced before their
/// declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassEntry {
    pub name: String,
    pub type_hash: TypeHash,
    pub span: Span,
    pub variable: Option<VarId>,

    // === Inheritance ===
    pub parent: Option<TypeHash>,
    /// Explicitly implemented interfaces, in declaration order.
    pub interfaces: Vec<(TypeHash, Span)>,

    // === Members ===
    pub members: Vec<MemberEntry>,
    /// Own constructor overloads. `None` inherits the parent's.
    pub constructors: Option<Vec<Vec<Value>>>,

    // === Modifiers ===
    pub is_abstract: bool,
    pub is_final: bool,
    /// Externally fixed name of a universal class.
    pub universal_name: Option<String>,
}

impl ClassEntry {
    pub fn new(name: impl Into<String>, type_hash: TypeHash) -> Self {
        Self {
            name: name.into(),
            type_hash,
            span: Span::default(),
            variable: None,
            parent: None,
            interfaces: Vec::new(),
            members: Vec::new(),
            constructors: None,
            is_abstract: false,
            is_final: false,
            universal_name: None,
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn with_variable(mut self, var: VarId) -> Self {
        self.variable = Some(var);
        self
    }

    pub fn with_parent(mut self, parent: TypeHash) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_interface(mut self, interface: TypeHash) -> Self {
        self.interfaces.push((interface, Span::default()));
        self
    }

    pub fn with_member(mut self, member: MemberEntry) -> Self {
        self.members.push(member);
        self
    }

    pub fn with_constructor(mut self, params: Vec<Value>) -> Self {
        self.constructors.get_or_insert_with(Vec::new).push(params);
        self
    }

    pub fn as_abstract(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn as_final(mut self) -> Self {
        self.is_final = true;
        self
    }

    pub fn universal(mut self, name: impl Into<String>) -> Self {
        self.universal_name = Some(name.into());
        self
    }

    pub fn is_universal(&self) -> bool {
        self.universal_name.is_some()
    }

    /// Own instance member readable as `name`.
    pub fn find_member(&self, name: &str) -> Option<&MemberEntry> {
        self.members
            .iter()
            .find(|m| !m.is_static && m.name == name && m.kind.is_readable())
    }

    /// Own instance member accepting `obj.name = v`.
    pub fn find_writable(&self, name: &str) -> Option<&MemberEntry> {
        self.members
            .iter()
            .find(|m| !m.is_static && m.name == name && m.is_writable())
    }

    pub fn find_static(&self, name: &str) -> Option<&MemberEntry> {
        self.members
            .iter()
            .find(|m| m.is_static && m.name == name && m.kind != MemberKind::Setter)
    }

    /// Own abstract members, in declaration order.
    pub fn abstract_members(&self) -> impl Iterator<Item = &MemberEntry> {
        self.members.iter().filter(|m| m.is_abstract)
    }

    /// Non-static properties, in declaration order.
    pub fn properties(&self) -> impl Iterator<Item = &MemberEntry> {
        self.members
            .iter()
            .filter(|m| !m.is_static && m.kind == MemberKind::Property)
    }
}
