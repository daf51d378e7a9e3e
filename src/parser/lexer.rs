//! Logos-based lexer for Soufflé Datalog.
//!
//! Fast tokenization using the logos crate.

use logos::Logos;
use text_size::TextSize;

use super::syntax_kind::SyntaxKind;

/// A token with its kind, text, and position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: SyntaxKind,
    pub text: &'a str,
    pub offset: TextSize,
}

/// Lexer wrapping the logos-generated tokenizer.
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, LogosToken>,
    offset: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            inner: LogosToken::lexer(input),
            offset: 0,
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let logos_token = self.inner.next()?;
        let text = self.inner.slice();
        let offset = TextSize::new(self.offset);
        self.offset += text.len() as u32;

        let kind = match logos_token {
            Ok(t) => t.into(),
            Err(()) => SyntaxKind::ERROR,
        };

        Some(Token { kind, text, offset })
    }
}

/// Tokenize an entire string into a Vec.
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    Lexer::new(input).collect()
}

/// Logos token enum - maps to SyntaxKind.
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
pub enum LogosToken {
    // =========================================================================
    // TRIVIA
    // =========================================================================
    #[regex(r"[ \t\r\n]+")]
    Whitespace,

    #[regex(r"//[^\n]*")]
    LineComment,

    // Second alternative matches an unterminated comment running to EOF.
    #[regex(r"/\*([^*]|\*[^/])*\*?\*/")]
    #[regex(r"/\*([^*]|\*[^/])*")]
    BlockComment,

    // =========================================================================
    // DIRECTIVE KEYWORDS (must come before DOT)
    // =========================================================================
    #[token(".decl")]
    DeclKw,

    #[token(".type")]
    TypeKw,

    #[token(".input")]
    InputKw,

    #[token(".output")]
    OutputKw,

    #[token(".printsize")]
    PrintsizeKw,

    #[token("#include")]
    IncludeKw,

    // =========================================================================
    // LITERALS
    // =========================================================================
    #[regex(r"[a-zA-Z_?][a-zA-Z0-9_?]*")]
    Ident,

    #[regex(r"[0-9]+(\.[0-9]+)?|0x[0-9a-fA-F]+|0b[01]+")]
    Number,

    #[regex(r#""([^"\\\n]|\\.)*""#)]
    String,

    // =========================================================================
    // MULTI-CHARACTER PUNCTUATION (must come before single-char)
    // =========================================================================
    #[token(":-")]
    Implies,

    #[token("<:")]
    Subtype,

    #[token("<=")]
    LtEq,

    #[token(">=")]
    GtEq,

    #[token("!=")]
    BangEq,

    // =========================================================================
    // SINGLE-CHARACTER PUNCTUATION
    // =========================================================================
    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token(",")]
    Comma,

    #[token(":")]
    Colon,

    #[token(";")]
    Semicolon,

    #[token(".")]
    Dot,

    #[token("|")]
    Pipe,

    #[token("!")]
    Bang,

    #[token("$")]
    Dollar,

    #[token("=")]
    Eq,

    #[token("<")]
    Lt,

    #[token(">")]
    Gt,

    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    Star,

    #[token("/")]
    Slash,

    #[token("%")]
    Percent,

    #[token("^")]
    Caret,
}

impl From<LogosToken> for SyntaxKind {
    fn from(token: LogosToken) -> Self {
        match token {
            LogosToken::Whitespace => SyntaxKind::WHITESPACE,
            LogosToken::LineComment => SyntaxKind::LINE_COMMENT,
            LogosToken::BlockComment => SyntaxKind::BLOCK_COMMENT,
            LogosToken::DeclKw => SyntaxKind::DECL_KW,
            LogosToken::TypeKw => SyntaxKind::TYPE_KW,
            LogosToken::InputKw => SyntaxKind::INPUT_KW,
            LogosToken::OutputKw => SyntaxKind::OUTPUT_KW,
            LogosToken::PrintsizeKw => SyntaxKind::PRINTSIZE_KW,
            LogosToken::IncludeKw => SyntaxKind::INCLUDE_KW,
            LogosToken::Ident => SyntaxKind::IDENT,
            LogosToken::Number => SyntaxKind::NUMBER,
            LogosToken::String => SyntaxKind::STRING,
            LogosToken::Implies => SyntaxKind::IMPLIES,
            LogosToken::Subtype => SyntaxKind::SUBTYPE,
            LogosToken::LtEq => SyntaxKind::LT_EQ,
            LogosToken::GtEq => SyntaxKind::GT_EQ,
            LogosToken::BangEq => SyntaxKind::BANG_EQ,
            LogosToken::LParen => SyntaxKind::L_PAREN,
            LogosToken::RParen => SyntaxKind::R_PAREN,
            LogosToken::LBracket => SyntaxKind::L_BRACKET,
            LogosToken::RBracket => SyntaxKind::R_BRACKET,
            LogosToken::LBrace => SyntaxKind::L_BRACE,
            LogosToken::RBrace => SyntaxKind::R_BRACE,
            LogosToken::Comma => SyntaxKind::COMMA,
            LogosToken::Colon => SyntaxKind::COLON,
            LogosToken::Semicolon => SyntaxKind::SEMICOLON,
            LogosToken::Dot => SyntaxKind::DOT,
            LogosToken::Pipe => SyntaxKind::PIPE,
            LogosToken::Bang => SyntaxKind::BANG,
            LogosToken::Dollar => SyntaxKind::DOLLAR,
            LogosToken::Eq => SyntaxKind::EQ,
            LogosToken::Lt => SyntaxKind::LT,
            LogosToken::Gt => SyntaxKind::GT,
            LogosToken::Plus => SyntaxKind::PLUS,
            LogosToken::Minus => SyntaxKind::MINUS,
            LogosToken::Star => SyntaxKind::STAR,
            LogosToken::Slash => SyntaxKind::SLASH,
            LogosToken::Percent => SyntaxKind::PERCENT,
            LogosToken::Caret => SyntaxKind::CARET,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<SyntaxKind> {
        tokenize(input)
            .into_iter()
            .map(|t| t.kind)
            .filter(|k| *k != SyntaxKind::WHITESPACE)
            .collect()
    }

    #[test]
    fn test_relation_declaration_tokens() {
        assert_eq!(
            kinds(".decl edge(a: number, b: number)"),
            vec![
                SyntaxKind::DECL_KW,
                SyntaxKind::IDENT,
                SyntaxKind::L_PAREN,
                SyntaxKind::IDENT,
                SyntaxKind::COLON,
                SyntaxKind::IDENT,
                SyntaxKind::COMMA,
                SyntaxKind::IDENT,
                SyntaxKind::COLON,
                SyntaxKind::IDENT,
                SyntaxKind::R_PAREN,
            ]
        );
    }

    #[test]
    fn test_rule_tokens() {
        assert_eq!(
            kinds("path(x, y) :- edge(x, y)."),
            vec![
                SyntaxKind::IDENT,
                SyntaxKind::L_PAREN,
                SyntaxKind::IDENT,
                SyntaxKind::COMMA,
                SyntaxKind::IDENT,
                SyntaxKind::R_PAREN,
                SyntaxKind::IMPLIES,
                SyntaxKind::IDENT,
                SyntaxKind::L_PAREN,
                SyntaxKind::IDENT,
                SyntaxKind::COMMA,
                SyntaxKind::IDENT,
                SyntaxKind::R_PAREN,
                SyntaxKind::DOT,
            ]
        );
    }

    #[test]
    fn test_type_declaration_tokens() {
        assert_eq!(
            kinds(".type T <: symbol"),
            vec![
                SyntaxKind::TYPE_KW,
                SyntaxKind::IDENT,
                SyntaxKind::SUBTYPE,
                SyntaxKind::IDENT,
            ]
        );
    }

    #[test]
    fn test_comments() {
        assert_eq!(
            kinds("// line\n/* block */"),
            vec![SyntaxKind::LINE_COMMENT, SyntaxKind::BLOCK_COMMENT]
        );
    }

    #[test]
    fn test_unterminated_block_comment() {
        assert_eq!(kinds("/* open"), vec![SyntaxKind::BLOCK_COMMENT]);
    }

    #[test]
    fn test_offsets_are_cumulative() {
        let tokens = tokenize("ab cd");
        assert_eq!(u32::from(tokens[0].offset), 0);
        assert_eq!(u32::from(tokens[1].offset), 2);
        assert_eq!(u32::from(tokens[2].offset), 3);
    }

    #[test]
    fn test_unknown_character_is_error_token() {
        assert_eq!(kinds("@"), vec![SyntaxKind::ERROR]);
    }
}
