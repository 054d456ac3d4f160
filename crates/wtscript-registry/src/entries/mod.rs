//! Registry entries for every kind of type.
//!
//! - [`ClassEntry`]: declared classes
//! - [`InterfaceEntry`]: declared interfaces
//! - [`EnumEntry`]: declared enums
//! - [`PrimitiveEntry`]: the built-in prototypes
//!
//! Classes, enums and primitives are prototypes: they can be instantiated and
//! take part in single inheritance. Interfaces only describe required members.

mod class;
mod enum_entry;
mod interface;
mod member;
mod primitive;

pub use class::ClassEntry;
pub use enum_entry::{EnumEntry, EnumMemberEntry};
pub use interface::InterfaceEntry;
pub use member::{MemberEntry, MemberKind, Signature};
pub use primitive::PrimitiveEntry;

use wtscript_core::{Span, TypeHash, VarId};

/// A registered type.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeEntry {
    Class(ClassEntry),
    Interface(InterfaceEntry),
    Enum(EnumEntry),
    Primitive(PrimitiveEntry),
}

impl TypeEntry {
    pub fn name(&self) -> &str {
        match self {
            TypeEntry::Class(e) => &e.name,
            TypeEntry::Interface(e) => &e.name,
            TypeEntry::Enum(e) => &e.name,
            TypeEntry::Primitive(e) => &e.name,
        }
    }

    pub fn type_hash(&self) -> TypeHash {
        match self {
            TypeEntry::Class(e) => e.type_hash,
            TypeEntry::Interface(e) => e.type_hash,
            TypeEntry::Enum(e) => e.type_hash,
            TypeEntry::Primitive(e) => e.type_hash,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            TypeEntry::Class(e) => e.span,
            TypeEntry::Interface(e) => e.span,
            TypeEntry::Enum(e) => e.span,
            TypeEntry::Primitive(_) => Span::default(),
        }
    }

    /// The variable naming this type, `None` for built-ins.
    pub fn variable(&self) -> Option<VarId> {
        match self {
            TypeEntry::Class(e) => e.variable,
            TypeEntry::Interface(e) => e.variable,
            TypeEntry::Enum(e) => e.variable,
            TypeEntry::Primitive(_) => None,
        }
    }

    pub fn is_prototype(&self) -> bool {
        !matches!(self, TypeEntry::Interface(_))
    }

    /// The parent prototype, for prototypes.
    pub fn parent(&self) -> Option<TypeHash> {
        match self {
            TypeEntry::Class(e) => e.parent,
            TypeEntry::Enum(e) => Some(e.parent),
            TypeEntry::Primitive(e) => e.parent,
            TypeEntry::Interface(_) => None,
        }
    }

    pub fn as_class(&self) -> Option<&ClassEntry> {
        match self {
            TypeEntry::Class(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_class_mut(&mut self) -> Option<&mut ClassEntry> {
        match self {
            TypeEntry::Class(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_interface(&self) -> Option<&InterfaceEntry> {
        match self {
            TypeEntry::Interface(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_interface_mut(&mut self) -> Option<&mut InterfaceEntry> {
        match self {
            TypeEntry::Interface(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&EnumEntry> {
        match self {
            TypeEntry::Enum(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_enum_mut(&mut self) -> Option<&mut EnumEntry> {
        match self {
            TypeEntry::Enum(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_primitive(&self) -> Option<&PrimitiveEntry> {
        match self {
            TypeEntry::Primitive(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ClassEntry> for TypeEntry {
    fn from(entry: ClassEntry) -> Self {
        TypeEntry::Class(entry)
    }
}

impl From<InterfaceEntry> for TypeEntry {
    fn from(entry: InterfaceEntry) -> Self {
        TypeEntry::Interface(entry)
    }
}

impl From<EnumEntry> for TypeEntry {
    fn from(entry: EnumEntry) -> Self {
        TypeEntry::Enum(entry)
    }
}

impl From<PrimitiveEntry> for TypeEntry {
    fn from(entry: PrimitiveEntry) -> Self {
        TypeEntry::Primitive(entry)
    }
}
