//! Syntax kinds for the rowan-based CST.
//!
//! This enum defines all possible token and node kinds in the syntax tree.
//! Node kinds follow the Soufflé grammar structure (relation declarations,
//! type declarations, facts, rules, directives).

/// All syntax kinds (tokens and nodes) in Soufflé.
///
/// Tokens are leaf nodes (identifiers, keywords, punctuation).
/// Nodes are composite (declarations, rules, atoms).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
#[allow(non_camel_case_types)]
pub enum SyntaxKind {
    // =========================================================================
    // TRIVIA (whitespace and comments - preserved but not structurally used)
    // =========================================================================
    WHITESPACE = 0,
    LINE_COMMENT,
    BLOCK_COMMENT,

    // =========================================================================
    // LITERALS
    // =========================================================================
    IDENT,  // identifier (also `_` and `?var`)
    NUMBER, // 42, 3.14, 0x2A
    STRING, // "hello"

    // =========================================================================
    // DIRECTIVE KEYWORDS
    // =========================================================================
    DECL_KW,      // .decl
    TYPE_KW,      // .type
    INPUT_KW,     // .input
    OUTPUT_KW,    // .output
    PRINTSIZE_KW, // .printsize
    INCLUDE_KW,   // #include

    // =========================================================================
    // PUNCTUATION AND OPERATORS
    // =========================================================================
    L_PAREN,   // (
    R_PAREN,   // )
    L_BRACKET, // [
    R_BRACKET, // ]
    L_BRACE,   // {
    R_BRACE,   // }
    COMMA,     // ,
    COLON,     // :
    SEMICOLON, // ;
    DOT,       // .
    PIPE,      // |
    BANG,      // !
    DOLLAR,    // $
    IMPLIES,   // :-
    SUBTYPE,   // <:
    EQ,        // =
    BANG_EQ,   // !=
    LT,        // <
    GT,        // >
    LT_EQ,     // <=
    GT_EQ,     // >=
    PLUS,      // +
    MINUS,     // -
    STAR,      // *
    SLASH,     // /
    PERCENT,   // %
    CARET,     // ^

    // =========================================================================
    // NODES
    // =========================================================================
    SOURCE_FILE,
    RELATION_DECL,
    ATTRIBUTE,
    TYPE_DECL,
    SUBTYPE_DECL,
    EQ_TYPE_DECL,
    UNION_TYPE,
    RECORD_TYPE,
    ABSTRACT_DATA_TYPE,
    ADT_BRANCH,
    TYPE_NAME,
    FACT,
    RULE,
    RULE_HEAD,
    SUBSUMPTION_HEAD,
    DISJUNCTION,
    CONJUNCTION,
    CONJUNCTION_CLAUSE,
    NEG,
    BINARY_CONSTRAINT,
    ATOM,
    ARGUMENT,
    CONSTANT,
    VARIABLE,
    RECORD_INIT,
    BRANCH_INIT,
    BINARY_OPERATION,
    QUALIFIED_NAME,
    DIRECTIVE,
    DIRECTIVE_QUALIFIER,
    PREPROC_INCLUDE,
    PATH_SPEC,

    /// Unmatched input, both at token and node level.
    ERROR,

    #[doc(hidden)]
    __LAST,
}

impl SyntaxKind {
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            Self::WHITESPACE | Self::LINE_COMMENT | Self::BLOCK_COMMENT
        )
    }

    /// Directive qualifier keywords (`.input`, `.output`, `.printsize`).
    pub fn is_directive_qualifier(self) -> bool {
        matches!(self, Self::INPUT_KW | Self::OUTPUT_KW | Self::PRINTSIZE_KW)
    }

    /// Operators valid in a binary constraint (`x < y`, `x = y`, ...).
    pub fn is_constraint_op(self) -> bool {
        matches!(
            self,
            Self::EQ | Self::BANG_EQ | Self::LT | Self::GT | Self::LT_EQ | Self::GT_EQ
        )
    }

    /// Operators valid in a binary arithmetic operation inside an argument.
    pub fn is_arith_op(self) -> bool {
        matches!(
            self,
            Self::PLUS | Self::MINUS | Self::STAR | Self::SLASH | Self::PERCENT | Self::CARET
        )
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

impl From<rowan::SyntaxKind> for SyntaxKind {
    fn from(raw: rowan::SyntaxKind) -> Self {
        assert!(raw.0 < SyntaxKind::__LAST as u16);
        // Safety: we control all syntax kinds and check bounds above
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }
}

/// Language definition for rowan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SouffleLanguage {}

impl rowan::Language for SouffleLanguage {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        raw.into()
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

/// Type aliases for convenience
pub type SyntaxNode = rowan::SyntaxNode<SouffleLanguage>;
pub type SyntaxToken = rowan::SyntaxToken<SouffleLanguage>;
pub type SyntaxElement = rowan::SyntaxElement<SouffleLanguage>;
