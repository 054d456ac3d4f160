//! Interface type entry.

use wtscript_core::{Span, TypeHash, VarId};

use super::Signature;

/// Registry entry for a declared interface.
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceEntry {
    pub name: String,
    pub type_hash: TypeHash,
    pub span: Span,
    pub variable: Option<VarId>,
    /// Extended interfaces, in declaration order.
    pub parents: Vec<(TypeHash, Span)>,
    /// Own required members. Inherited ones live on the parents.
    pub members: Vec<Signature>,
    /// Values are plain data that can cross a process or storage boundary.
    pub is_universal: bool,
    /// Members can be called remotely.
    pub is_rpc: bool,
}

impl InterfaceEntry {
    pub fn new(name: impl Into<String>, type_hash: TypeHash) -> Self {
        Self {
            name: name.into(),
            type_hash,
            span: Span::default(),
            variable: None,
            parents: Vec::new(),
            members: Vec::new(),
            is_universal: false,
            is_rpc: false,
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
        self.parents.push((parent, Span::default()));
        self
    }

    pub fn with_member(mut self, member: Signature) -> Self {
        self.members.push(member);
        self
    }

    pub fn universal(mut self) -> Self {
        self.is_universal = true;
        self
    }

    pub fn rpc(mut self) -> Self {
        self.is_rpc = true;
        self
    }

    pub fn find_member(&self, name: &str) -> Option<&Signature> {
        self.members.iter().find(|m| m.name == name)
    }
}
