//! Enum type entry.

use wtscript_core::{Span, TypeHash, VarId};

use crate::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct EnumMemberEntry {
    pub name: String,
    /// Literal value of the backing primitive.
    pub value: Value,
    pub span: Span,
}

/// Registry entry for a declared enum.
///
/// An enum is a sealed prototype extending a primitive. Its instances are
/// accepted where the primitive is expected, but only an instance of the same
/// enum is accepted where the enum is expected.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumEntry {
    pub name: String,
    pub type_hash: TypeHash,
    pub span: Span,
    pub variable: Option<VarId>,
    /// Backing primitive.
    pub parent: TypeHash,
    pub members: Vec<EnumMemberEntry>,
}

impl EnumEntry {
    pub fn new(name: impl Into<String>, type_hash: TypeHash, parent: TypeHash) -> Self {
        Self {
            name: name.into(),
            type_hash,
            span: Span::default(),
            variable: None,
            parent,
            members: Vec::new(),
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

    pub fn with_member(mut self, name: impl Into<String>, value: Value) -> Self {
        self.members.push(EnumMemberEntry {
            name: name.into(),
            value,
            span: Span::default(),
        });
        self
    }

    pub fn find_member(&self, name: &str) -> Option<&EnumMemberEntry> {
        self.members.iter().find(|m| m.name == name)
    }
}
