//! Conversion from byte offsets to line/character positions.
//!
//! The CST layer works in byte offsets ([`TextSize`]/[`TextRange`]); the
//! AST and every editor-facing query work in line/character coordinates.
//! Character counts are byte columns within the line.

use text_size::{TextRange, TextSize};

use super::{Position, Range};

/// Maps byte offsets in a source text to line/character positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    /// Byte offset of the start of each line. Always at least one entry.
    line_starts: Vec<u32>,
    /// Total length of the indexed text in bytes.
    len: u32,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(i as u32 + 1);
            }
        }
        Self {
            line_starts,
            len: text.len() as u32,
        }
    }

    /// Convert a byte offset to a line/character position.
    ///
    /// Offsets past the end of the text clamp to the last position.
    pub fn position(&self, offset: TextSize) -> Position {
        let offset = u32::from(offset).min(self.len);
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next_line) => next_line - 1,
        };
        Position {
            line: line as u32,
            character: offset - self.line_starts[line],
        }
    }

    /// Convert a byte range to a line/character range.
    pub fn range(&self, range: TextRange) -> Range {
        Range {
            start: self.position(range.start()),
            end: self.position(range.end()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_line() {
        let index = LineIndex::new("hello");
        assert_eq!(index.position(TextSize::new(0)), Position::new(0, 0));
        assert_eq!(index.position(TextSize::new(3)), Position::new(0, 3));
        assert_eq!(index.position(TextSize::new(5)), Position::new(0, 5));
    }

    #[test]
    fn test_multiple_lines() {
        let index = LineIndex::new("ab\ncd\n\nef");
        assert_eq!(index.position(TextSize::new(2)), Position::new(0, 2));
        assert_eq!(index.position(TextSize::new(3)), Position::new(1, 0));
        assert_eq!(index.position(TextSize::new(6)), Position::new(2, 0));
        assert_eq!(index.position(TextSize::new(7)), Position::new(3, 0));
        assert_eq!(index.position(TextSize::new(9)), Position::new(3, 2));
    }

    #[test]
    fn test_offset_past_end_clamps() {
        let index = LineIndex::new("ab");
        assert_eq!(index.position(TextSize::new(10)), Position::new(0, 2));
    }

    #[test]
    fn test_range_conversion() {
        let index = LineIndex::new(".decl foo(x: number)\nfoo(1).\n");
        let range = index.range(TextRange::new(TextSize::new(21), TextSize::new(24)));
        assert_eq!(range, Range::from_coords(1, 0, 1, 3));
    }
}
