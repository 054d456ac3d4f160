//! Handles into the whole-program tables.
//!
//! Files and variables are stored in arenas owned by the bundle and the
//! variable table. Everything else refers to them through these small copyable
//! indices, so cyclic references (modules importing each other, classes naming
//! themselves) never need shared ownership.

use std::fmt;

/// Identifies a source file (one module) inside a bundle.
///
/// # Example
///
/// ```
/// use wtscript_core::FileId;
///
/// let file = FileId::new(0);
/// assert_eq!(file.index(), 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct FileId(u32);

impl FileId {
    /// Create a new file ID with the given index.
    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Get the underlying index.
    #[inline]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "file_{}", self.0)
    }
}

impl From<u32> for FileId {
    fn from(index: u32) -> Self {
        Self::new(index)
    }
}

impl From<FileId> for u32 {
    fn from(id: FileId) -> Self {
        id.0
    }
}

/// Identifies a [`Variable`](../wtscript_registry/struct.Variable.html) in the
/// whole-program variable arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(u32);

impl VarId {
    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "var_{}", self.0)
    }
}

impl From<u32> for VarId {
    fn from(index: u32) -> Self {
        Self::new(index)
    }
}
