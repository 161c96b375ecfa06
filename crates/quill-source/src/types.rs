//! Type definitions for source code positions and annotations.
//!
//! This module defines the core types used for representing source code
//! positions and spans in the Quill compiler. It provides the foundation for
//! accurate source tracking, which is essential for quality error messages
//! and diagnostics.
//!
//! Key types include:
//!
//! - `Position`: a specific location in source code with line, column, and byte offset
//! - `SourceSpan`: a range within a single source file
//! - `Comment`: a lexed comment carried alongside the syntax it precedes
//! - `SourceAnn`: the span/comments pair attached to every declaration

use std::fmt;
use std::ops::Range;

/// A unique identifier for a source file.
///
/// `FileID` is a newtype wrapper around `usize` that uniquely identifies a
/// source file within the compilation session. File IDs are assigned by the
/// driver when source files are loaded; the ID `0` is reserved for spans the
/// compiler generates itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FileID(usize);

impl FileID {
    /// Creates a new `FileID` with the given value.
    #[must_use]
    pub const fn new(id: usize) -> Self { Self(id) }

    /// Returns the inner value of the `FileID`.
    #[must_use]
    pub const fn value(&self) -> usize { self.0 }
}

impl fmt::Display for FileID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "file:{}", self.0) }
}

/// A position in a source file.
///
/// Positions are 1-indexed for line and column, following common editor
/// conventions. The `offset` is 0-indexed, representing the byte offset from
/// the start of the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
    /// Byte offset from the start of the file (0-indexed)
    pub offset: usize,
}

impl Position {
    /// Creates a new position with the given line, column, and byte offset.
    #[must_use]
    pub const fn new(line: usize, column: usize, offset: usize) -> Self {
        Self { line, column, offset }
    }

    /// Returns true if this position precedes the other position.
    #[must_use]
    pub const fn precedes(&self, other: &Self) -> bool { self.offset < other.offset }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A span in a source file, representing a range between two positions.
///
/// Spans are used to track the location of language constructs in the source
/// code. They are essential for error reporting, as they allow the compiler
/// to point to specific parts of the source code when reporting errors or
/// warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceSpan {
    /// Starting position of the span
    pub start: Position,
    /// Ending position of the span (exclusive)
    pub end: Position,
    /// File identifier
    pub file_id: FileID,
}

impl SourceSpan {
    /// Creates a new span with the given start and end positions and file ID.
    #[must_use]
    pub const fn new(start: Position, end: Position, file_id: FileID) -> Self {
        Self { start, end, file_id }
    }

    /// The span carried by code the compiler generates itself.
    ///
    /// Generated spans live in the reserved file `0` and never point at real
    /// source text.
    #[must_use]
    pub const fn generated() -> Self {
        Self { start: Position::new(0, 0, 0), end: Position::new(0, 0, 0), file_id: FileID::new(0) }
    }

    /// Returns true if this span was produced by the compiler rather than
    /// read from a source file.
    #[must_use]
    pub const fn is_generated(&self) -> bool { self.file_id.value() == 0 }

    /// Returns the byte range of this span.
    #[must_use]
    pub const fn byte_range(&self) -> Range<usize> { self.start.offset..self.end.offset }

    /// Creates a new span that encompasses both input spans.
    ///
    /// Both spans must be in the same file.
    ///
    /// ## Panics
    ///
    /// Panics if the spans are from different files.
    #[must_use]
    pub fn combine(&self, other: &Self) -> Self {
        assert_eq!(self.file_id, other.file_id, "Cannot combine spans from different files");

        let start = if self.start.precedes(&other.start) { self.start } else { other.start };
        let end = if self.end.precedes(&other.end) { other.end } else { self.end };

        Self { start, end, file_id: self.file_id }
    }
}

impl Default for SourceSpan {
    fn default() -> Self { Self::generated() }
}

impl fmt::Display for SourceSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.file_id, self.start, self.end)
    }
}

/// A comment attached to a piece of syntax.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Comment {
    /// A line comment, without its leading marker or trailing newline.
    Line(String),
    /// A block comment, without its delimiters.
    Block(String),
}

/// The source annotation attached to every declaration: where the syntax
/// came from and the comments that preceded it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceAnn {
    /// The span of the annotated syntax
    pub span: SourceSpan,
    /// The comments preceding the annotated syntax
    pub comments: Vec<Comment>,
}

impl SourceAnn {
    /// Creates a new annotation with the given span and comments.
    #[must_use]
    pub const fn new(span: SourceSpan, comments: Vec<Comment>) -> Self { Self { span, comments } }

    /// The annotation carried by code the compiler generates itself.
    #[must_use]
    pub const fn generated() -> Self { Self { span: SourceSpan::generated(), comments: Vec::new() } }
}

impl From<SourceSpan> for SourceAnn {
    fn from(span: SourceSpan) -> Self { Self::new(span, Vec::new()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combine_takes_the_outermost_positions() {
        let file = FileID::new(1);
        let a = SourceSpan::new(Position::new(1, 1, 0), Position::new(1, 5, 4), file);
        let b = SourceSpan::new(Position::new(1, 3, 2), Position::new(2, 1, 10), file);

        let combined = a.combine(&b);
        assert_eq!(combined.start, a.start);
        assert_eq!(combined.end, b.end);
        assert_eq!(combined.byte_range(), 0..10);
    }

    #[test]
    fn generated_spans_are_recognizable() {
        assert!(SourceSpan::generated().is_generated());

        let real = SourceSpan::new(Position::new(1, 1, 0), Position::new(1, 2, 1), FileID::new(3));
        assert!(!real.is_generated());
    }
}
