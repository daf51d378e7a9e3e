//! The error-tolerant AST and the CST → AST lowering.

pub mod ast;
pub mod lower;

pub use ast::*;
pub use lower::lower;

use crate::base::LineIndex;

/// Parse and lower a full source text. Total: any input yields a file.
pub fn parse_file(text: &str) -> ast::File {
    let parse = crate::parser::parse(text);
    let line_index = LineIndex::new(text);
    lower(&parse.syntax(), &line_index)
}
