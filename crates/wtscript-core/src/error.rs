//! The error type returned by every compiler pass.
//!
//! A [`CompilationError`] is an [`ErrorKind`] at a primary [`Span`], plus any
//! number of [`Note`]s pointing at related source positions ("previously
//! declared here", "also exported by this module", one note per rejected
//! overload, ...).
//!
//! ```text
//! at 4:5: 'x' already defined
//!   note at 2:5: previously declared here
//! ```
//!
//! Passes are fail-fast: the first error aborts the pass and is returned to the
//! caller with `?`.

use std::fmt;

use thiserror::Error;

use crate::{FileId, Span};

/// Convenience alias used throughout the compiler.
pub type CompileResult<T> = Result<T, CompilationError>;

// ============================================================================
// Error Kinds
// ============================================================================

/// What went wrong, independent of where.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    /// An identifier did not resolve through the scope chain.
    #[error("undefined identifier '{name}'")]
    UndefinedIdentifier { name: String },

    /// A name was declared where it is already visible.
    #[error("'{name}' already defined")]
    DuplicateDeclaration { name: String },

    /// A structural `Check` failed.
    #[error("{message}")]
    TypeMismatch { message: String },

    /// No overload accepted the call. Per-overload reasons are attached as notes.
    #[error("{message}")]
    OverloadMismatch { message: String },

    /// Missing implementation of an abstract member, or an abstract class without any.
    #[error("{message}")]
    AbstractnessViolation { message: String },

    /// A prototype does not satisfy an interface it declares.
    #[error("{prototype} doesn't implement {interface}: {reason}")]
    ConformanceViolation {
        interface: String,
        prototype: String,
        reason: String,
    },

    /// Modules import each other.
    #[error("circular dependency: {}", .cycle.join(" -> "))]
    CircularDependency { cycle: Vec<String> },

    /// An import target or an imported name is absent.
    #[error("{what} not found")]
    ImportNotFound { what: String },

    /// A tracked declaration was never read.
    #[error("'{name}' declared but not used")]
    UnusedDeclaration { name: String },

    /// A fixed (universal or entry point) name was claimed twice.
    #[error("'{name}' must be unique project wide")]
    NameCollision { name: String },

    /// A statement appears where it can't run or can't be used.
    #[error("{message}")]
    InvalidStatement { message: String },

    /// Any other semantic rule violation.
    #[error("{message}")]
    Semantic { message: String },
}

// ============================================================================
// Notes
// ============================================================================

/// A secondary source position attached to an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub message: String,
    pub span: Span,
}

impl Note {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "note at {}: {}", self.span, self.message)
    }
}

// ============================================================================
// Compilation Error
// ============================================================================

/// An error with its primary position and contextual notes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("at {span}: {kind}{}", render_notes(.notes))]
pub struct CompilationError {
    pub kind: ErrorKind,
    pub span: Span,
    pub notes: Vec<Note>,
}

fn render_notes(notes: &[Note]) -> String {
    notes.iter().map(|note| format!("\n  {note}")).collect()
}

impl CompilationError {
    pub fn new(kind: ErrorKind, span: Span) -> Self {
        Self {
            kind,
            span,
            notes: Vec::new(),
        }
    }

    pub fn undefined(name: impl Into<String>, span: Span) -> Self {
        Self::new(ErrorKind::UndefinedIdentifier { name: name.into() }, span)
    }

    /// A duplicate declaration pointing back at the first one.
    pub fn duplicate(name: impl Into<String>, span: Span, previous: Span) -> Self {
        Self::new(ErrorKind::DuplicateDeclaration { name: name.into() }, span)
            .with_note("previously declared here", previous)
    }

    pub fn mismatch(message: impl Into<String>, span: Span) -> Self {
        Self::new(
            ErrorKind::TypeMismatch {
                message: message.into(),
            },
            span,
        )
    }

    pub fn overload(message: impl Into<String>, span: Span) -> Self {
        Self::new(
            ErrorKind::OverloadMismatch {
                message: message.into(),
            },
            span,
        )
    }

    pub fn abstractness(message: impl Into<String>, span: Span) -> Self {
        Self::new(
            ErrorKind::AbstractnessViolation {
                message: message.into(),
            },
            span,
        )
    }

    pub fn conformance(
        interface: impl Into<String>,
        prototype: impl Into<String>,
        reason: impl Into<String>,
        span: Span,
    ) -> Self {
        Self::new(
            ErrorKind::ConformanceViolation {
                interface: interface.into(),
                prototype: prototype.into(),
                reason: reason.into(),
            },
            span,
        )
    }

    pub fn not_found(what: impl Into<String>, span: Span) -> Self {
        Self::new(ErrorKind::ImportNotFound { what: what.into() }, span)
    }

    pub fn unused(name: impl Into<String>, span: Span) -> Self {
        Self::new(ErrorKind::UnusedDeclaration { name: name.into() }, span)
    }

    pub fn invalid(message: impl Into<String>, span: Span) -> Self {
        Self::new(
            ErrorKind::InvalidStatement {
                message: message.into(),
            },
            span,
        )
    }

    pub fn semantic(message: impl Into<String>, span: Span) -> Self {
        Self::new(
            ErrorKind::Semantic {
                message: message.into(),
            },
            span,
        )
    }

    /// Attach a note.
    pub fn with_note(mut self, message: impl Into<String>, span: Span) -> Self {
        self.notes.push(Note::new(message, span));
        self
    }

    /// Fold another error into this one: its message becomes a note, followed by its own notes.
    pub fn merge(mut self, other: CompilationError) -> Self {
        self.notes.push(Note::new(other.kind.to_string(), other.span));
        self.notes.extend(other.notes);
        self
    }

    /// Move the primary position, keeping the message.
    pub fn at(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Attribute every position that doesn't name a file yet to `file`.
    pub fn in_file(mut self, file: FileId) -> Self {
        let stamp = |span: Span| {
            if span.file == FileId::default() {
                span.in_file(file)
            } else {
                span
            }
        };
        self.span = stamp(self.span);
        for note in &mut self.notes {
            note.span = stamp(note.span);
        }
        self
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn span(&self) -> Span {
        self.span
    }

    /// Whether this is an import-not-found error. Wildcard re-export searches
    /// keep looking after these.
    pub fn is_not_found(&self) -> bool {
        matches!(self.kind, ErrorKind::ImportNotFound { .. })
    }

    /// The bare message without position or notes.
    pub fn message(&self) -> String {
        self.kind.to_string()
    }
}
