//! Lexing and parsing of Soufflé Datalog into a lossless syntax tree.

pub mod lexer;
pub mod parser;
pub mod syntax_kind;

pub use lexer::{tokenize, Lexer, Token};
pub use parser::SyntaxError;
pub use syntax_kind::{SouffleLanguage, SyntaxElement, SyntaxKind, SyntaxNode, SyntaxToken};

use rowan::GreenNode;

/// The result of parsing: a green tree covering the whole input plus
/// the errors encountered along the way.
#[derive(Debug, Clone)]
pub struct Parse {
    pub green: GreenNode,
    pub errors: Vec<SyntaxError>,
}

impl Parse {
    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green.clone())
    }
}

/// Parse an entire source file. Never fails: malformed input yields a
/// tree with `ERROR` nodes and a non-empty error list.
pub fn parse(input: &str) -> Parse {
    let (green, errors) = parser::Parser::new(input).parse();
    Parse { green, errors }
}
