//! Identifiers.

use std::cell::Cell;
use std::fmt;

use wtscript_core::{Span, VarId};

/// A name in source together with the variable it resolves to.
///
/// The binding is empty until name resolution runs. It is stored in a
/// [`Cell`] so passes can bind through a shared reference to the tree.
#[derive(Clone, PartialEq, Eq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
    binding: Cell<Option<VarId>>,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
            binding: Cell::new(None),
        }
    }

    /// Record the variable this identifier refers to.
    #[inline]
    pub fn bind(&self, var: VarId) {
        self.binding.set(Some(var));
    }

    /// The bound variable, if name resolution has run.
    #[inline]
    pub fn binding(&self) -> Option<VarId> {
        self.binding.get()
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.binding.get() {
            Some(var) => write!(f, "{}@{:?}->{}", self.name, self.span, var),
            None => write!(f, "{}@{:?}", self.name, self.span),
        }
    }
}

impl From<&str> for Ident {
    fn from(name: &str) -> Self {
        Ident::new(name, Span::default())
    }
}

impl From<(&str, u32, u32)> for Ident {
    fn from((name, line, col): (&str, u32, u32)) -> Self {
        Ident::new(name, Span::new(line, col, name.len() as u32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_through_shared_ref() {
        let ident = Ident::from("x");
        assert_eq!(ident.binding(), None);
        let shared = &ident;
        shared.bind(VarId::new(3));
        assert_eq!(ident.binding(), Some(VarId::new(3)));
    }

    #[test]
    fn positioned_ident() {
        let ident = Ident::from(("count", 2, 7));
        assert_eq!(ident.span, Span::new(2, 7, 5));
    }
}
