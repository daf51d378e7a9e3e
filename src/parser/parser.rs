//! Error-tolerant parser producing a rowan green tree.
//!
//! Every input, no matter how broken, parses into exactly one
//! `SOURCE_FILE` node covering the full text. Unexpected tokens are
//! wrapped in `ERROR` nodes and parsing continues at the next
//! recognizable point.

use rowan::{Checkpoint, GreenNode, GreenNodeBuilder};
use text_size::{TextRange, TextSize};

use super::lexer::{tokenize, Token};
use super::syntax_kind::SyntaxKind;

/// An error produced during parsing, with the range it refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub message: String,
    pub range: TextRange,
}

/// Relation qualifiers accepted after the attribute list of a `.decl`.
///
/// Restricting to this set keeps the parser from swallowing a fact
/// that follows an unparenthesized declaration.
const RELATION_QUALIFIERS: &[&str] = &[
    "btree",
    "btree_delete",
    "brie",
    "eqrel",
    "no_magic",
    "no_inline",
    "inline",
    "magic",
    "override",
    "overridable",
    "input",
    "output",
    "printsize",
];

pub struct Parser<'a> {
    tokens: Vec<Token<'a>>,
    pos: usize,
    builder: GreenNodeBuilder<'static>,
    errors: Vec<SyntaxError>,
    text_len: TextSize,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            tokens: tokenize(input),
            pos: 0,
            builder: GreenNodeBuilder::new(),
            errors: Vec::new(),
            text_len: TextSize::of(input),
        }
    }

    pub fn parse(mut self) -> (GreenNode, Vec<SyntaxError>) {
        self.builder.start_node(SyntaxKind::SOURCE_FILE.into());
        loop {
            self.eat_trivia();
            let Some(kind) = self.current() else { break };
            match kind {
                SyntaxKind::DECL_KW => self.relation_decl(),
                SyntaxKind::TYPE_KW => self.type_decl(),
                k if k.is_directive_qualifier() => self.directive(),
                SyntaxKind::INCLUDE_KW => self.preproc_include(),
                SyntaxKind::IDENT | SyntaxKind::DOLLAR => self.fact_or_rule(),
                _ => self.error_recover("expected a declaration, directive, fact, or rule"),
            }
        }
        self.builder.finish_node();
        (self.builder.finish(), self.errors)
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    /// `.decl name(attr: type, ...) qualifiers`
    fn relation_decl(&mut self) {
        self.builder.start_node(SyntaxKind::RELATION_DECL.into());
        self.bump(); // .decl
        self.expect(SyntaxKind::IDENT, "expected relation name");
        if self.eat(SyntaxKind::L_PAREN) {
            self.attribute_list(SyntaxKind::R_PAREN);
            self.expect(SyntaxKind::R_PAREN, "expected ')'");
        } else {
            self.error_here("expected '(' after relation name");
        }
        // Trailing qualifiers like `btree` or `inline`. Only a known set
        // is consumed so a following zero-arity fact stays separate.
        while self.at(SyntaxKind::IDENT) && RELATION_QUALIFIERS.contains(&self.current_text()) {
            self.bump();
        }
        self.builder.finish_node();
    }

    /// Comma-separated `name: type` pairs, until `close` or a statement
    /// boundary.
    fn attribute_list(&mut self, close: SyntaxKind) {
        loop {
            match self.current() {
                None => break,
                Some(k) if k == close => break,
                Some(SyntaxKind::DOT)
                | Some(SyntaxKind::DECL_KW)
                | Some(SyntaxKind::TYPE_KW)
                | Some(SyntaxKind::IMPLIES) => break,
                Some(SyntaxKind::COMMA) => {
                    self.bump();
                }
                Some(SyntaxKind::IDENT) => {
                    self.builder.start_node(SyntaxKind::ATTRIBUTE.into());
                    self.bump(); // attribute name
                    if self.eat(SyntaxKind::COLON) {
                        if self.at(SyntaxKind::IDENT) {
                            self.type_name();
                        } else {
                            self.error_here("expected attribute type");
                        }
                    } else {
                        self.error_here("expected ':' after attribute name");
                    }
                    self.builder.finish_node();
                }
                Some(_) => self.error_recover("expected attribute"),
            }
        }
    }

    /// `.type T <: base` or `.type T = union | record | ADT`
    fn type_decl(&mut self) {
        self.builder.start_node(SyntaxKind::TYPE_DECL.into());
        self.bump(); // .type
        self.expect(SyntaxKind::IDENT, "expected type name");
        match self.current() {
            Some(SyntaxKind::SUBTYPE) => {
                self.builder.start_node(SyntaxKind::SUBTYPE_DECL.into());
                self.bump(); // <:
                if self.at(SyntaxKind::IDENT) {
                    self.type_name();
                } else {
                    self.error_here("expected base type");
                }
                self.builder.finish_node();
            }
            Some(SyntaxKind::EQ) => {
                self.builder.start_node(SyntaxKind::EQ_TYPE_DECL.into());
                self.bump(); // =
                self.type_expr();
                self.builder.finish_node();
            }
            _ => self.error_here("expected '<:' or '=' in type declaration"),
        }
        self.builder.finish_node();
    }

    /// The right-hand side of `.type T = ...`.
    fn type_expr(&mut self) {
        match self.current() {
            Some(SyntaxKind::L_BRACKET) => self.record_type(),
            Some(SyntaxKind::IDENT) => {
                // `Name {` starts an ADT branch, otherwise a union.
                if self.sig(1) == Some(SyntaxKind::L_BRACE) {
                    self.abstract_data_type();
                } else {
                    self.union_type();
                }
            }
            _ => self.error_here("expected a type expression"),
        }
    }

    /// `[a: t, b: u]`
    fn record_type(&mut self) {
        self.builder.start_node(SyntaxKind::RECORD_TYPE.into());
        self.bump(); // [
        self.attribute_list(SyntaxKind::R_BRACKET);
        self.expect(SyntaxKind::R_BRACKET, "expected ']'");
        self.builder.finish_node();
    }

    /// `A | B | C` where each element is a type name.
    fn union_type(&mut self) {
        self.builder.start_node(SyntaxKind::UNION_TYPE.into());
        self.type_name();
        while self.eat(SyntaxKind::PIPE) {
            if self.at(SyntaxKind::IDENT) {
                self.type_name();
            } else {
                self.error_here("expected type name after '|'");
                break;
            }
        }
        self.builder.finish_node();
    }

    /// `A {x: t} | B {}`
    fn abstract_data_type(&mut self) {
        self.builder
            .start_node(SyntaxKind::ABSTRACT_DATA_TYPE.into());
        self.adt_branch();
        while self.eat(SyntaxKind::PIPE) {
            if self.at(SyntaxKind::IDENT) {
                self.adt_branch();
            } else {
                self.error_here("expected branch name after '|'");
                break;
            }
        }
        self.builder.finish_node();
    }

    fn adt_branch(&mut self) {
        self.builder.start_node(SyntaxKind::ADT_BRANCH.into());
        self.expect(SyntaxKind::IDENT, "expected branch name");
        if self.eat(SyntaxKind::L_BRACE) {
            self.attribute_list(SyntaxKind::R_BRACE);
            self.expect(SyntaxKind::R_BRACE, "expected '}'");
        }
        self.builder.finish_node();
    }

    /// A type reference, wrapped in `TYPE_NAME` around a qualified name.
    fn type_name(&mut self) {
        self.builder.start_node(SyntaxKind::TYPE_NAME.into());
        self.qualified_name();
        self.builder.finish_node();
    }

    // =========================================================================
    // Directives
    // =========================================================================

    /// `.input rel1, rel2(IO=file, filename="x")`
    fn directive(&mut self) {
        self.builder.start_node(SyntaxKind::DIRECTIVE.into());
        self.builder
            .start_node(SyntaxKind::DIRECTIVE_QUALIFIER.into());
        self.bump(); // .input / .output / .printsize
        self.builder.finish_node();
        loop {
            if self.at(SyntaxKind::IDENT) {
                self.qualified_name();
            } else {
                self.error_here("expected relation name");
                break;
            }
            // IO parameters are kept in the tree but not analyzed.
            if self.eat(SyntaxKind::L_PAREN) {
                while !self.at(SyntaxKind::R_PAREN) && !self.at_statement_boundary() {
                    self.bump_or_break();
                }
                self.eat(SyntaxKind::R_PAREN);
            }
            if !self.eat(SyntaxKind::COMMA) {
                break;
            }
        }
        self.builder.finish_node();
    }

    /// `#include "path"`
    fn preproc_include(&mut self) {
        self.builder.start_node(SyntaxKind::PREPROC_INCLUDE.into());
        self.bump(); // #include
        if self.at(SyntaxKind::STRING) {
            self.builder.start_node(SyntaxKind::PATH_SPEC.into());
            self.bump();
            self.builder.finish_node();
        } else {
            self.error_here("expected include path");
        }
        self.builder.finish_node();
    }

    // =========================================================================
    // Facts and rules
    // =========================================================================

    /// A statement beginning with an atom. Retroactively wrapped as a
    /// `FACT`, a `RULE` with a plain head, or a `RULE` with a
    /// subsumption head depending on what follows.
    fn fact_or_rule(&mut self) {
        let checkpoint = self.builder.checkpoint();
        self.atom();
        match self.current() {
            Some(SyntaxKind::DOT) => {
                self.builder
                    .start_node_at(checkpoint, SyntaxKind::FACT.into());
                self.bump();
                self.builder.finish_node();
            }
            Some(SyntaxKind::LT_EQ) => {
                // `dominated <= dominating :- body.`
                self.builder
                    .start_node_at(checkpoint, SyntaxKind::SUBSUMPTION_HEAD.into());
                self.bump(); // <=
                if self.at(SyntaxKind::IDENT) || self.at(SyntaxKind::DOLLAR) {
                    self.atom();
                } else {
                    self.error_here("expected atom after '<='");
                }
                self.builder.finish_node();
                self.rule_tail(checkpoint);
            }
            Some(SyntaxKind::COMMA) | Some(SyntaxKind::IMPLIES) => {
                while self.eat(SyntaxKind::COMMA) {
                    if self.at(SyntaxKind::IDENT) || self.at(SyntaxKind::DOLLAR) {
                        self.atom();
                    } else {
                        self.error_here("expected atom after ','");
                        break;
                    }
                }
                self.builder
                    .start_node_at(checkpoint, SyntaxKind::RULE_HEAD.into());
                self.builder.finish_node();
                self.rule_tail(checkpoint);
            }
            _ => {
                self.builder
                    .start_node_at(checkpoint, SyntaxKind::FACT.into());
                self.error_here("expected '.' after fact");
                self.builder.finish_node();
            }
        }
    }

    /// `:- body.` after a rule or subsumption head.
    fn rule_tail(&mut self, checkpoint: Checkpoint) {
        self.builder
            .start_node_at(checkpoint, SyntaxKind::RULE.into());
        self.expect(SyntaxKind::IMPLIES, "expected ':-'");
        self.disjunction();
        self.expect(SyntaxKind::DOT, "expected '.' after rule");
        self.builder.finish_node();
    }

    /// `conjunction ; conjunction ; ...`
    fn disjunction(&mut self) {
        self.builder.start_node(SyntaxKind::DISJUNCTION.into());
        self.conjunction();
        while self.eat(SyntaxKind::SEMICOLON) {
            self.conjunction();
        }
        self.builder.finish_node();
    }

    /// `clause, clause, ...`
    fn conjunction(&mut self) {
        self.builder.start_node(SyntaxKind::CONJUNCTION.into());
        self.conjunction_clause();
        while self.eat(SyntaxKind::COMMA) {
            self.conjunction_clause();
        }
        self.builder.finish_node();
    }

    /// One body element with optional negations in front: an atom, a
    /// binary constraint, or a parenthesized disjunction.
    fn conjunction_clause(&mut self) {
        self.builder
            .start_node(SyntaxKind::CONJUNCTION_CLAUSE.into());
        if self.at(SyntaxKind::BANG) {
            self.builder.start_node(SyntaxKind::NEG.into());
            while self.at(SyntaxKind::BANG) {
                self.bump();
            }
            self.builder.finish_node();
        }
        match self.current() {
            Some(SyntaxKind::L_PAREN) => {
                self.bump();
                self.disjunction();
                self.expect(SyntaxKind::R_PAREN, "expected ')'");
            }
            Some(SyntaxKind::IDENT) if self.atom_call_ahead() => {
                let checkpoint = self.builder.checkpoint();
                self.atom();
                // `f(x) = y` reads the call as the left operand instead.
                if self.current().is_some_and(SyntaxKind::is_constraint_op) {
                    self.builder
                        .start_node_at(checkpoint, SyntaxKind::BINARY_CONSTRAINT.into());
                    self.bump();
                    self.argument_expr();
                    self.builder.finish_node();
                }
            }
            Some(SyntaxKind::IDENT) if !self.operator_after_name() => {
                // A zero-arity atom without parentheses, e.g. `flag`.
                self.atom();
            }
            Some(
                SyntaxKind::IDENT
                | SyntaxKind::NUMBER
                | SyntaxKind::STRING
                | SyntaxKind::MINUS
                | SyntaxKind::L_BRACKET
                | SyntaxKind::DOLLAR,
            ) => {
                let checkpoint = self.builder.checkpoint();
                self.argument_expr();
                if self.current().is_some_and(SyntaxKind::is_constraint_op) {
                    self.builder
                        .start_node_at(checkpoint, SyntaxKind::BINARY_CONSTRAINT.into());
                    self.bump();
                    self.argument_expr();
                    self.builder.finish_node();
                } else {
                    self.error_here("expected a constraint operator");
                }
            }
            _ => self.error_here("expected atom or constraint"),
        }
        self.builder.finish_node();
    }

    /// True when the current identifier is a call, i.e. a possibly
    /// qualified name immediately followed by `(`.
    fn atom_call_ahead(&self) -> bool {
        let mut i = self.next_significant(self.pos);
        // qualified-name segments are adjacency-joined, no trivia between
        loop {
            if self.raw_kind(i) != Some(SyntaxKind::IDENT) {
                return false;
            }
            if self.raw_kind(i + 1) == Some(SyntaxKind::DOT)
                && self.raw_kind(i + 2) == Some(SyntaxKind::IDENT)
            {
                i += 2;
            } else {
                break;
            }
        }
        self.sig_kind_from(i + 1) == Some(SyntaxKind::L_PAREN)
    }

    /// True when the possibly qualified name at the cursor is followed
    /// by a constraint or arithmetic operator, which makes it a
    /// constraint operand rather than a zero-arity atom.
    fn operator_after_name(&self) -> bool {
        let mut i = self.next_significant(self.pos);
        loop {
            if self.raw_kind(i) != Some(SyntaxKind::IDENT) {
                return false;
            }
            if self.raw_kind(i + 1) == Some(SyntaxKind::DOT)
                && self.raw_kind(i + 2) == Some(SyntaxKind::IDENT)
            {
                i += 2;
            } else {
                break;
            }
        }
        self.sig_kind_from(i + 1)
            .is_some_and(|k| k.is_constraint_op() || k.is_arith_op())
    }

    /// `name(arg, arg, ...)` or a bare zero-arity `name`.
    fn atom(&mut self) {
        self.builder.start_node(SyntaxKind::ATOM.into());
        if self.at(SyntaxKind::DOLLAR) {
            // `$Branch(args)` in head position parses as a branch init.
            self.branch_init();
            self.builder.finish_node();
            return;
        }
        self.qualified_name();
        if self.eat(SyntaxKind::L_PAREN) {
            self.argument_list(SyntaxKind::R_PAREN);
            self.expect(SyntaxKind::R_PAREN, "expected ')'");
        }
        self.builder.finish_node();
    }

    /// Comma-separated arguments until `close` or a statement boundary.
    fn argument_list(&mut self, close: SyntaxKind) {
        loop {
            match self.current() {
                None => break,
                Some(k) if k == close => break,
                Some(SyntaxKind::DOT)
                | Some(SyntaxKind::IMPLIES)
                | Some(SyntaxKind::DECL_KW)
                | Some(SyntaxKind::TYPE_KW) => break,
                Some(SyntaxKind::COMMA) => {
                    self.bump();
                }
                Some(_) => {
                    self.builder.start_node(SyntaxKind::ARGUMENT.into());
                    self.argument_expr();
                    self.builder.finish_node();
                    if !self.at(SyntaxKind::COMMA) && !self.at(close) && !self.at_statement_boundary()
                    {
                        self.error_recover("expected ',' in argument list");
                    }
                }
            }
        }
    }

    /// An argument expression with left-associative binary operators.
    fn argument_expr(&mut self) {
        let checkpoint = self.builder.checkpoint();
        self.primary();
        while self.current().is_some_and(SyntaxKind::is_arith_op) {
            self.builder
                .start_node_at(checkpoint, SyntaxKind::BINARY_OPERATION.into());
            self.bump();
            self.primary();
            self.builder.finish_node();
        }
    }

    fn primary(&mut self) {
        match self.current() {
            Some(SyntaxKind::NUMBER) | Some(SyntaxKind::STRING) => {
                self.builder.start_node(SyntaxKind::CONSTANT.into());
                self.bump();
                self.builder.finish_node();
            }
            Some(SyntaxKind::MINUS) => {
                self.builder.start_node(SyntaxKind::CONSTANT.into());
                self.bump();
                if self.at(SyntaxKind::NUMBER) {
                    self.bump();
                } else {
                    self.error_here("expected number after '-'");
                }
                self.builder.finish_node();
            }
            Some(SyntaxKind::IDENT) => {
                self.builder.start_node(SyntaxKind::VARIABLE.into());
                self.qualified_name();
                self.builder.finish_node();
            }
            Some(SyntaxKind::L_BRACKET) => {
                self.builder.start_node(SyntaxKind::RECORD_INIT.into());
                self.bump();
                self.argument_list(SyntaxKind::R_BRACKET);
                self.expect(SyntaxKind::R_BRACKET, "expected ']'");
                self.builder.finish_node();
            }
            Some(SyntaxKind::DOLLAR) => self.branch_init(),
            Some(SyntaxKind::L_PAREN) => {
                self.bump();
                self.argument_expr();
                self.expect(SyntaxKind::R_PAREN, "expected ')'");
            }
            _ => self.error_recover("expected an argument"),
        }
    }

    /// `$Branch` or `$Branch(arg, ...)`
    fn branch_init(&mut self) {
        self.builder.start_node(SyntaxKind::BRANCH_INIT.into());
        self.bump(); // $
        if self.at(SyntaxKind::IDENT) {
            self.qualified_name();
        } else {
            self.error_here("expected branch name after '$'");
        }
        if self.eat(SyntaxKind::L_PAREN) {
            self.argument_list(SyntaxKind::R_PAREN);
            self.expect(SyntaxKind::R_PAREN, "expected ')'");
        }
        self.builder.finish_node();
    }

    /// `a` or `a.b.c`. Segments join only when the dots are adjacent to
    /// both identifiers, so a fact terminator never merges with the
    /// next statement.
    fn qualified_name(&mut self) {
        self.builder.start_node(SyntaxKind::QUALIFIED_NAME.into());
        self.expect(SyntaxKind::IDENT, "expected name");
        while self.raw_kind(self.pos) == Some(SyntaxKind::DOT)
            && self.raw_kind(self.pos + 1) == Some(SyntaxKind::IDENT)
        {
            self.bump_raw(); // .
            self.bump_raw(); // ident
        }
        self.builder.finish_node();
    }

    // =========================================================================
    // Cursor primitives
    // =========================================================================

    /// Kind of the current significant token.
    fn current(&self) -> Option<SyntaxKind> {
        self.sig_kind_from(self.pos)
    }

    fn current_text(&self) -> &str {
        let i = self.next_significant(self.pos);
        self.tokens.get(i).map_or("", |t| t.text)
    }

    /// Kind of the nth significant token ahead of the cursor.
    fn sig(&self, n: usize) -> Option<SyntaxKind> {
        let mut i = self.next_significant(self.pos);
        for _ in 0..n {
            i = self.next_significant(i + 1);
        }
        self.raw_kind(i)
    }

    fn raw_kind(&self, i: usize) -> Option<SyntaxKind> {
        self.tokens.get(i).map(|t| t.kind)
    }

    fn next_significant(&self, from: usize) -> usize {
        let mut i = from;
        while self.raw_kind(i).is_some_and(SyntaxKind::is_trivia) {
            i += 1;
        }
        i
    }

    fn sig_kind_from(&self, from: usize) -> Option<SyntaxKind> {
        self.raw_kind(self.next_significant(from))
    }

    fn at(&self, kind: SyntaxKind) -> bool {
        self.current() == Some(kind)
    }

    fn at_statement_boundary(&self) -> bool {
        matches!(
            self.current(),
            None | Some(SyntaxKind::DOT)
                | Some(SyntaxKind::DECL_KW)
                | Some(SyntaxKind::TYPE_KW)
                | Some(SyntaxKind::INPUT_KW)
                | Some(SyntaxKind::OUTPUT_KW)
                | Some(SyntaxKind::PRINTSIZE_KW)
                | Some(SyntaxKind::INCLUDE_KW)
        )
    }

    /// Flush pending trivia into the tree, then add the next token.
    fn bump(&mut self) {
        self.eat_trivia();
        self.bump_raw();
    }

    /// Add the token at the cursor without skipping trivia first.
    fn bump_raw(&mut self) {
        if let Some(token) = self.tokens.get(self.pos) {
            self.builder.token(token.kind.into(), token.text);
            self.pos += 1;
        }
    }

    /// Move trivia tokens into the tree at the current build position.
    fn eat_trivia(&mut self) {
        while self.raw_kind(self.pos).is_some_and(SyntaxKind::is_trivia) {
            self.bump_raw();
        }
    }

    fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: SyntaxKind, message: &str) {
        if !self.eat(kind) {
            self.error_here(message);
        }
    }

    /// Record an error at the current position without consuming input.
    fn error_here(&mut self, message: &str) {
        let i = self.next_significant(self.pos);
        let range = match self.tokens.get(i) {
            Some(token) => TextRange::at(token.offset, TextSize::of(token.text)),
            None => TextRange::empty(self.text_len),
        };
        self.errors.push(SyntaxError {
            message: message.to_string(),
            range,
        });
    }

    /// Record an error and consume one token into an `ERROR` node so
    /// parsing cannot loop.
    fn error_recover(&mut self, message: &str) {
        self.error_here(message);
        if self.current().is_some() {
            self.builder.start_node(SyntaxKind::ERROR.into());
            self.bump();
            self.builder.finish_node();
        }
    }

    /// Consume one token if any, asserting forward progress in loops.
    fn bump_or_break(&mut self) {
        if self.current().is_some() {
            self.bump();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::parse;
    use super::super::syntax_kind::{SyntaxKind, SyntaxNode};

    fn tree(input: &str) -> SyntaxNode {
        parse(input).syntax()
    }

    fn top_level_kinds(input: &str) -> Vec<SyntaxKind> {
        tree(input).children().map(|n| n.kind()).collect()
    }

    #[test]
    fn test_empty_input() {
        let root = tree("");
        assert_eq!(root.kind(), SyntaxKind::SOURCE_FILE);
        assert_eq!(root.children().count(), 0);
    }

    #[test]
    fn test_relation_decl() {
        assert_eq!(
            top_level_kinds(".decl edge(a: number, b: number)"),
            vec![SyntaxKind::RELATION_DECL]
        );
    }

    #[test]
    fn test_fact_and_rule() {
        assert_eq!(
            top_level_kinds("edge(1, 2).\npath(x, y) :- edge(x, y)."),
            vec![SyntaxKind::FACT, SyntaxKind::RULE]
        );
    }

    #[test]
    fn test_rule_structure() {
        let root = tree("path(x, z) :- path(x, y), edge(y, z).");
        let rule = root.children().next().unwrap();
        assert_eq!(rule.kind(), SyntaxKind::RULE);
        let kinds: Vec<_> = rule.children().map(|n| n.kind()).collect();
        assert_eq!(kinds, vec![SyntaxKind::RULE_HEAD, SyntaxKind::DISJUNCTION]);
        let body = rule.children().nth(1).unwrap();
        let conj = body.children().next().unwrap();
        assert_eq!(conj.kind(), SyntaxKind::CONJUNCTION);
        assert_eq!(conj.children().count(), 2);
    }

    #[test]
    fn test_subsumption_rule() {
        let root = tree("p(x) <= p(y) :- x = y.");
        let rule = root.children().next().unwrap();
        assert_eq!(rule.kind(), SyntaxKind::RULE);
        assert_eq!(
            rule.children().next().unwrap().kind(),
            SyntaxKind::SUBSUMPTION_HEAD
        );
    }

    #[test]
    fn test_subtype_decl() {
        let root = tree(".type Node <: symbol");
        let decl = root.children().next().unwrap();
        assert_eq!(decl.kind(), SyntaxKind::TYPE_DECL);
        assert_eq!(
            decl.children().map(|n| n.kind()).collect::<Vec<_>>(),
            vec![SyntaxKind::SUBTYPE_DECL]
        );
    }

    #[test]
    fn test_union_and_record_and_adt() {
        assert_eq!(
            top_level_kinds(".type U = A | B\n.type R = [x: number]\n.type T = Leaf {} | Pair {a: T, b: T}"),
            vec![
                SyntaxKind::TYPE_DECL,
                SyntaxKind::TYPE_DECL,
                SyntaxKind::TYPE_DECL
            ]
        );
        let root = tree(".type T = Leaf {} | Pair {a: T, b: T}");
        let eq = root
            .children()
            .next()
            .unwrap()
            .children()
            .next()
            .unwrap();
        assert_eq!(eq.kind(), SyntaxKind::EQ_TYPE_DECL);
        let adt = eq.children().next().unwrap();
        assert_eq!(adt.kind(), SyntaxKind::ABSTRACT_DATA_TYPE);
        assert_eq!(adt.children().count(), 2);
    }

    #[test]
    fn test_directive() {
        let root = tree(".output path(IO=file)");
        let dir = root.children().next().unwrap();
        assert_eq!(dir.kind(), SyntaxKind::DIRECTIVE);
        assert_eq!(
            dir.children().next().unwrap().kind(),
            SyntaxKind::DIRECTIVE_QUALIFIER
        );
    }

    #[test]
    fn test_negated_clause() {
        let root = tree("p(x) :- q(x), !r(x).");
        let body = root
            .children()
            .next()
            .unwrap()
            .children()
            .nth(1)
            .unwrap();
        let conj = body.children().next().unwrap();
        let second = conj.children().nth(1).unwrap();
        assert_eq!(second.kind(), SyntaxKind::CONJUNCTION_CLAUSE);
        assert_eq!(
            second.children().next().unwrap().kind(),
            SyntaxKind::NEG
        );
    }

    #[test]
    fn test_fact_dot_does_not_merge_with_next_statement() {
        // `foo.` is a zero-arity fact, not the start of `foo.bar`.
        assert_eq!(
            top_level_kinds("foo. bar(1)."),
            vec![SyntaxKind::FACT, SyntaxKind::FACT]
        );
    }

    #[test]
    fn test_garbage_is_wrapped_in_error_nodes() {
        let root = tree(") ] garbage %%");
        assert_eq!(root.kind(), SyntaxKind::SOURCE_FILE);
        assert!(root
            .children()
            .any(|n| n.kind() == SyntaxKind::ERROR || n.kind() == SyntaxKind::FACT));
    }

    #[test]
    fn test_full_text_coverage() {
        let input = ".decl p(x: number\np(1).\n// trailing";
        let root = tree(input);
        assert_eq!(u32::from(root.text_range().len()), input.len() as u32);
    }

    #[test]
    fn test_truncated_rule_still_parses() {
        let root = tree("path(x, y) :- ");
        assert_eq!(root.children().next().unwrap().kind(), SyntaxKind::RULE);
    }

    #[test]
    fn test_errors_have_positions() {
        let errors = parse(".decl (").errors;
        assert!(!errors.is_empty());
        assert_eq!(errors[0].message, "expected relation name");
    }
}
