//! Position tracking for AST nodes.
//!
//! Stores the source location (line/character) of AST nodes for editor
//! features like hover, go-to-definition, and diagnostics.

use std::sync::Arc;

/// A position in source code (0-indexed line and character).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

/// A range in source code (0-indexed).
///
/// The end character on a line is always exclusive. This is the convention
/// of both tree-sitter style front ends and editors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Create a range from line/character coordinates.
    pub fn from_coords(start_line: u32, start_char: u32, end_line: u32, end_char: u32) -> Self {
        Self {
            start: Position::new(start_line, start_char),
            end: Position::new(end_line, end_char),
        }
    }

    /// Create an empty range anchored at a single position.
    pub fn at(position: Position) -> Self {
        Self {
            start: position,
            end: position,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Check if a position falls within this range.
    ///
    /// The end character is exclusive: `covers(p)` holds when
    /// `start <= p < end`.
    pub fn covers(&self, position: Position) -> bool {
        self.start <= position && position < self.end
    }
}

/// A range inside a specific document, the unit returned by definition
/// and reference queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub uri: Arc<str>,
    pub range: Range,
}

impl Location {
    pub fn new(uri: Arc<str>, range: Range) -> Self {
        Self { uri, range }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_ordering() {
        assert!(Position::new(0, 5) < Position::new(1, 0));
        assert!(Position::new(2, 3) < Position::new(2, 4));
        assert_eq!(Position::new(1, 1), Position::new(1, 1));
    }

    #[test]
    fn test_range_covers_end_exclusive() {
        let range = Range::from_coords(0, 2, 0, 5);
        assert!(!range.covers(Position::new(0, 1)));
        assert!(range.covers(Position::new(0, 2)));
        assert!(range.covers(Position::new(0, 4)));
        assert!(!range.covers(Position::new(0, 5)));
    }

    #[test]
    fn test_range_covers_multiline() {
        let range = Range::from_coords(1, 4, 3, 2);
        assert!(range.covers(Position::new(2, 0)));
        assert!(range.covers(Position::new(1, 4)));
        assert!(range.covers(Position::new(3, 1)));
        assert!(!range.covers(Position::new(3, 2)));
        assert!(!range.covers(Position::new(0, 10)));
    }

    #[test]
    fn test_empty_range_covers_nothing() {
        let range = Range::at(Position::new(1, 1));
        assert!(!range.covers(Position::new(1, 1)));
    }
}
