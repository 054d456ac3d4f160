//! Source location tracking for error reporting.
//!
//! Provides [`Span`] to track where declarations, expressions and errors occur
//! in a source file.

use std::fmt;

use crate::FileId;

/// A span of source code, represented by its file and starting position.
///
/// Similar to Rust compiler diagnostics, we track the line:column
/// where a token starts for debugging and error reporting. The file is kept
/// alongside so diagnostics spanning several modules can be told apart.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// File the span belongs to.
    pub file: FileId,
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed, byte-based).
    pub col: u32,
    /// Length in bytes (for additional context).
    pub len: u32,
}

impl Span {
    /// Create a new span from a line, column, and length in the default file.
    #[inline]
    pub fn new(line: u32, col: u32, len: u32) -> Self {
        Self {
            file: FileId::default(),
            line,
            col,
            len,
        }
    }

    /// Create a zero-length span at a position.
    #[inline]
    pub fn point(line: u32, col: u32) -> Self {
        Self::new(line, col, 0)
    }

    /// Move this span into another file.
    #[inline]
    pub fn in_file(self, file: FileId) -> Self {
        Self { file, ..self }
    }

    /// Whether this span is empty (zero length).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The length of this span in bytes.
    #[inline]
    pub fn len(&self) -> u32 {
        self.len
    }

    /// Merge two spans into one that starts at the first span and extends to cover both.
    ///
    /// The resulting span keeps the file of `self`.
    #[inline]
    pub fn merge(self, other: Span) -> Span {
        if self.line == other.line {
            let start_col = self.col.min(other.col);
            let end_col = (other.col + other.len).max(self.col + self.len);
            Span {
                file: self.file,
                line: self.line,
                col: start_col,
                len: end_col - start_col,
            }
        } else {
            // multi-line spans are approximated
            Span {
                file: self.file,
                line: self.line,
                col: self.col,
                len: self.len + other.len,
            }
        }
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.col)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_basics() {
        let span = Span::new(1, 5, 10);
        assert_eq!(span.len(), 10);
        assert!(!span.is_empty());

        let empty = Span::point(1, 5);
        assert!(empty.is_empty());
    }

    #[test]
    fn span_display() {
        let span = Span::new(3, 15, 5).in_file(FileId::new(2));
        assert_eq!(format!("{}", span), "3:15");
        assert_eq!(format!("{:?}", span), "file_2:3:15");
    }

    #[test]
    fn span_merge_same_line() {
        let span1 = Span::new(1, 5, 3);
        let span2 = Span::new(1, 10, 3);
        let merged = span1.merge(span2);

        assert_eq!(merged.line, 1);
        assert_eq!(merged.col, 5);
        assert_eq!(merged.len, 8);
    }

    #[test]
    fn span_merge_keeps_file() {
        let a = Span::new(1, 1, 2).in_file(FileId::new(4));
        let b = Span::new(1, 4, 2).in_file(FileId::new(9));
        assert_eq!(a.merge(b).file, FileId::new(4));
    }

    #[test]
    fn span_merge_different_lines() {
        let span1 = Span::new(1, 5, 10);
        let span2 = Span::new(3, 10, 5);
        let merged = span1.merge(span2);

        assert_eq!(merged.line, 1);
        assert_eq!(merged.col, 5);
        assert_eq!(merged.len, 15);
    }
}
