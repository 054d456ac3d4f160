//! Built-in prototype entry.

use wtscript_core::TypeHash;

use super::MemberEntry;
use crate::Value;

/// Registry entry for a built-in prototype such as `Int` or `Array`.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveEntry {
    pub name: String,
    pub type_hash: TypeHash,
    pub parent: Option<TypeHash>,
    /// Members that don't depend on type arguments.
    pub members: Vec<MemberEntry>,
    pub constructors: Vec<Vec<Value>>,
    /// Number of type arguments the prototype takes.
    pub type_params: usize,
    pub is_universal: bool,
}

impl PrimitiveEntry {
    pub fn new(name: impl Into<String>, type_hash: TypeHash) -> Self {
        Self {
            name: name.into(),
            type_hash,
            parent: None,
            members: Vec::new(),
            constructors: Vec::new(),
            type_params: 0,
            is_universal: false,
        }
    }

    pub fn with_parent(mut self, parent: TypeHash) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_member(mut self, member: MemberEntry) -> Self {
        self.members.push(member);
        self
    }

    pub fn with_constructor(mut self, params: Vec<Value>) -> Self {
        self.constructors.push(params);
        self
    }

    pub fn with_type_params(mut self, count: usize) -> Self {
        self.type_params = count;
        self
    }

    pub fn universal(mut self) -> Self {
        self.is_universal = true;
        self
    }

    pub fn find_member(&self, name: &str) -> Option<&MemberEntry> {
        self.members
            .iter()
            .find(|m| !m.is_static && m.name == name && m.kind.is_readable())
    }
}
