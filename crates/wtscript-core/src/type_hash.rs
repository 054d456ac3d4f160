//! Deterministic hash-based type identity.
//!
//! [`TypeHash`] is a 64-bit hash that identifies a built-in or declared type.
//! Built-in types hash their name only. Declared types also mix in the file and
//! declaration position, so two classes named `Node` in different modules (or
//! in different function bodies) never collide, while two runs over the same
//! input always produce the same identities.
//!
//! # Examples
//!
//! ```
//! use wtscript_core::{FileId, TypeHash, primitives};
//!
//! assert_eq!(TypeHash::from_name("Int"), primitives::INT);
//!
//! let a = TypeHash::from_declaration(FileId::new(0), "Node", 3, 1);
//! let b = TypeHash::from_declaration(FileId::new(1), "Node", 3, 1);
//! assert_ne!(a, b);
//! ```

use std::fmt;
use xxhash_rust::const_xxh64;
use xxhash_rust::xxh64::xxh64;

use crate::FileId;

/// Domain-specific mixing constants for hash computation.
pub mod hash_constants {
    /// Separator constant for path components.
    pub const SEP: u64 = 0x4bc94d6bd06053ad;

    /// Domain marker for type hashes
    pub const TYPE: u64 = 0x2fac10b63a6cc57c;

    /// Domain marker for declared (file-local) type hashes
    pub const DECLARATION: u64 = 0x5ea77ffbcdf5f302;

    /// Position mixing constant for the declaring line.
    pub const LINE: u64 = 0x9e3779b97f4a7c15;

    /// Position mixing constant for the declaring column.
    pub const COL: u64 = 0xbf58476d1ce4e5b9;
}

/// A deterministic 64-bit hash identifying a type.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TypeHash(pub u64);

impl TypeHash {
    /// Empty/invalid hash constant.
    pub const EMPTY: TypeHash = TypeHash(0);

    /// Create a type hash from a built-in type name.
    #[inline]
    pub const fn from_name(name: &str) -> Self {
        TypeHash(hash_constants::TYPE ^ const_xxh64::xxh64(name.as_bytes(), 0))
    }

    /// Create the hash of a type declared in source.
    pub fn from_declaration(file: FileId, name: &str, line: u32, col: u32) -> Self {
        let mut hash = hash_constants::DECLARATION ^ xxh64(name.as_bytes(), 0);
        hash = hash.rotate_left(5) ^ (u64::from(file.index())).wrapping_mul(hash_constants::SEP);
        hash = hash.rotate_left(5) ^ (u64::from(line)).wrapping_mul(hash_constants::LINE);
        hash = hash.rotate_left(5) ^ (u64::from(col)).wrapping_mul(hash_constants::COL);
        TypeHash(hash)
    }

    /// Check if this is the empty hash.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl Default for TypeHash {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl fmt::Debug for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeHash({:#018x})", self.0)
    }
}

impl fmt::Display for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

/// Well-known hashes for the built-in prototypes.
pub mod primitives {
    use super::TypeHash;

    /// Root of the built-in prototype chain.
    pub const OBJECT: TypeHash = TypeHash::from_name("Object");
    pub const NUMBER: TypeHash = TypeHash::from_name("Number");
    /// `Int` extends `Number`.
    pub const INT: TypeHash = TypeHash::from_name("Int");
    pub const BOOLEAN: TypeHash = TypeHash::from_name("Boolean");
    pub const STRING: TypeHash = TypeHash::from_name("String");
    /// Takes one type argument.
    pub const ARRAY: TypeHash = TypeHash::from_name("Array");
    /// Takes one type argument, unwrapped by `await`.
    pub const PROMISE: TypeHash = TypeHash::from_name("Promise");

    /// All built-in prototypes, in registration order.
    pub const ALL: [TypeHash; 7] = [OBJECT, NUMBER, INT, BOOLEAN, STRING, ARRAY, PROMISE];
}
