//! Source positions, spans, and line lookup.

use serde::{Deserialize, Serialize};

/// A position in source text. Lines and columns are 1-based; `offset` is the
/// byte offset from the start of the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
    pub offset: u32,
}

impl Position {
    pub fn new(line: u32, column: u32, offset: u32) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }

    /// The position of the first byte of a file.
    pub fn file_start() -> Self {
        Self::new(1, 1, 0)
    }
}

/// A half-open byte range in source text, with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        debug_assert!(start.offset <= end.offset);
        Self { start, end }
    }

    /// Zero-length span at the start of a file.
    pub fn file_start() -> Self {
        Self::new(Position::file_start(), Position::file_start())
    }

    pub fn len(&self) -> u32 {
        self.end.offset - self.start.offset
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `other` lies entirely within this span.
    pub fn contains(&self, other: &Span) -> bool {
        self.start.offset <= other.start.offset && other.end.offset <= self.end.offset
    }

    /// The source text this span covers.
    pub fn slice<'s>(&self, source: &'s str) -> &'s str {
        let start = self.start.offset as usize;
        let end = (self.end.offset as usize).min(source.len());
        if start > end { "" } else { &source[start..end] }
    }
}

/// Byte offsets of line starts, for offset -> line/column conversion and
/// line-based lookups.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<u32>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0u32];
        for (i, b) in source.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i as u32 + 1);
            }
        }
        Self { line_starts }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Convert a byte offset to a 1-based position.
    pub fn position_at(&self, offset: u32) -> Position {
        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        Position {
            line: line_idx as u32 + 1,
            column: offset - self.line_starts[line_idx] + 1,
            offset,
        }
    }

    /// The text of a 1-based line, without its trailing newline.
    pub fn line_text<'s>(&self, source: &'s str, line: u32) -> Option<&'s str> {
        let idx = line.checked_sub(1)? as usize;
        let start = *self.line_starts.get(idx)? as usize;
        let end = self
            .line_starts
            .get(idx + 1)
            .map_or(source.len(), |&next| next as usize);
        Some(source[start..end].trim_end_matches(['\n', '\r']))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_lookup() {
        let source = "line one\nline two\nthird";
        let index = LineIndex::new(source);

        assert_eq!(index.line_count(), 3);
        assert_eq!(index.position_at(0), Position::new(1, 1, 0));
        assert_eq!(index.position_at(9), Position::new(2, 1, 9));
        assert_eq!(index.position_at(14), Position::new(2, 6, 14));
        assert_eq!(index.position_at(18), Position::new(3, 1, 18));
    }

    #[test]
    fn line_text() {
        let source = "alpha\nbeta\n";
        let index = LineIndex::new(source);

        assert_eq!(index.line_text(source, 1), Some("alpha"));
        assert_eq!(index.line_text(source, 2), Some("beta"));
        assert_eq!(index.line_text(source, 9), None);
    }

    #[test]
    fn span_containment() {
        let a = Span::new(Position::new(1, 1, 0), Position::new(1, 11, 10));
        let b = Span::new(Position::new(1, 3, 2), Position::new(1, 6, 5));

        assert!(a.contains(&b));
        assert!(!b.contains(&a));
        assert_eq!(b.len(), 3);
    }

    #[test]
    fn span_slicing() {
        let source = "pragma solidity 0.8.0;";
        let span = Span::new(Position::new(1, 8, 7), Position::new(1, 16, 15));
        assert_eq!(span.slice(source), "solidity");
    }
}
