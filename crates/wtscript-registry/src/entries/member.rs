//! Members of prototypes and required members of interfaces.

use wtscript_core::Span;

use crate::Value;

/// Access form of a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Method,
    Property,
    Getter,
    Setter,
}

impl MemberKind {
    /// Whether reading `obj.name` yields this member.
    pub fn is_readable(self) -> bool {
        !matches!(self, MemberKind::Setter)
    }
}

/// A member of a class or primitive.
///
/// `value` is the function value for methods, the stored type for
/// properties, the returned type for getters and the accepted type for
/// setters.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberEntry {
    pub name: String,
    pub kind: MemberKind,
    pub value: Value,
    pub is_static: bool,
    pub is_abstract: bool,
    pub is_private: bool,
    pub is_override: bool,
    /// Properties only: read-only after construction.
    pub is_const: bool,
    /// Properties only: has an initializer.
    pub has_init: bool,
    pub span: Span,
}

impl MemberEntry {
    pub fn new(name: impl Into<String>, kind: MemberKind, value: Value) -> Self {
        Self {
            name: name.into(),
            kind,
            value,
            is_static: false,
            is_abstract: false,
            is_private: false,
            is_override: false,
            is_const: false,
            has_init: false,
            span: Span::default(),
        }
    }

    pub fn method(name: impl Into<String>, value: Value) -> Self {
        Self::new(name, MemberKind::Method, value)
    }

    pub fn property(name: impl Into<String>, value: Value) -> Self {
        Self::new(name, MemberKind::Property, value)
    }

    pub fn getter(name: impl Into<String>, value: Value) -> Self {
        Self::new(name, MemberKind::Getter, value)
    }

    pub fn setter(name: impl Into<String>, value: Value) -> Self {
        Self::new(name, MemberKind::Setter, value)
    }

    pub fn as_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn as_abstract(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Whether `obj.name = v` may store into this member.
    pub fn is_writable(&self) -> bool {
        match self.kind {
            MemberKind::Setter => true,
            MemberKind::Property => !self.is_const,
            MemberKind::Method | MemberKind::Getter => false,
        }
    }
}

/// A required member of an interface: ordered parameters plus an optional return.
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    pub name: String,
    /// `Method`, `Getter` or `Setter`. A `Property` is required like a getter.
    pub kind: MemberKind,
    pub params: Vec<Value>,
    pub ret: Option<Value>,
    pub span: Span,
}

impl Signature {
    pub fn method(name: impl Into<String>, params: Vec<Value>, ret: Option<Value>) -> Self {
        Self {
            name: name.into(),
            kind: MemberKind::Method,
            params,
            ret,
            span: Span::default(),
        }
    }

    pub fn getter(name: impl Into<String>, ret: Value) -> Self {
        Self {
            name: name.into(),
            kind: MemberKind::Getter,
            params: Vec::new(),
            ret: Some(ret),
            span: Span::default(),
        }
    }

    pub fn setter(name: impl Into<String>, param: Value) -> Self {
        Self {
            name: name.into(),
            kind: MemberKind::Setter,
            params: vec![param],
            ret: None,
            span: Span::default(),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }
}
