//! Spans and position resolution
//!
//! A [`Span`] is a byte range in the reassembled document tagged with a
//! [`ColorRole`]. [`SourceMap`] resolves byte offsets to `(line, column)`
//! pairs, where both are 0-indexed and columns count bytes.

use ropey::Rope;

use crate::palette::ColorRole;

/// Byte offset into the document
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position(pub usize);

impl Position {
    pub fn offset(self) -> usize {
        self.0
    }
}

/// A colored region produced by the walker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: Position,
    pub end: Position,
    pub color: ColorRole,
}

impl Span {
    pub fn new(start: Position, end: Position, color: ColorRole) -> Self {
        debug_assert!(start <= end, "span start {:?} after end {:?}", start, end);
        Self { start, end, color }
    }
}

/// A 0-indexed line and byte column
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LineCol {
    pub line: usize,
    pub column: usize,
}

/// A span resolved against its start line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedSpan {
    pub line: usize,
    pub start_col: usize,
    pub end_col: usize,
}

/// Line lookup table for one document
pub struct SourceMap {
    rope: Rope,
}

impl SourceMap {
    pub fn new(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
        }
    }

    /// Number of lines (a trailing newline opens an empty final line)
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Resolve a position; offsets past the end clamp to the end of the text
    pub fn line_col(&self, pos: Position) -> LineCol {
        let offset = pos.offset().min(self.rope.len_bytes());
        let line = self.rope.byte_to_line(offset);
        LineCol {
            line,
            column: offset - self.rope.line_to_byte(line),
        }
    }

    /// Byte length of a line's content, excluding its terminator
    pub fn line_len(&self, line: usize) -> usize {
        if line >= self.rope.len_lines() {
            return 0;
        }
        let slice = self.rope.line(line);
        let mut len = slice.len_bytes();
        if len > 0 && slice.byte(len - 1) == b'\n' {
            len -= 1;
            if len > 0 && slice.byte(len - 1) == b'\r' {
                len -= 1;
            }
        }
        len
    }

    /// Resolve a span to its start line. An end on a later line is clipped
    /// to the end of the start line's content.
    pub fn resolve(&self, span: &Span) -> ResolvedSpan {
        let start = self.line_col(span.start);
        let end = self.line_col(span.end);
        let end_col = if end.line == start.line {
            end.column
        } else {
            self.line_len(start.line).max(start.column)
        };
        ResolvedSpan {
            line: start.line,
            start_col: start.column,
            end_col,
        }
    }
}
