//! Lowering of the concrete syntax tree into the error-tolerant AST.
//!
//! Consumes only the node-kind/children/token-text surface of the CST.
//! Lowering is total: every sub-construct that cannot be matched
//! degrades to an error slot, never an abort. Unrecognized arguments
//! lower to absence and are logged at debug level.

use rowan::TextRange;
use smol_str::SmolStr;
use tracing::debug;

use crate::base::{LineIndex, Range};
use crate::parser::{SyntaxKind, SyntaxNode, SyntaxToken};

use super::ast::*;

/// Lower a parsed source file. The line index must be built from the
/// same text the tree was parsed from.
pub fn lower(root: &SyntaxNode, line_index: &LineIndex) -> File {
    debug_assert_eq!(root.kind(), SyntaxKind::SOURCE_FILE);
    let ctx = LowerCtx { line_index };
    ctx.file(root)
}

struct LowerCtx<'a> {
    line_index: &'a LineIndex,
}

impl LowerCtx<'_> {
    /// Node range over significant tokens only, so that a name node's
    /// range is exactly its token span regardless of attached trivia.
    fn range(&self, node: &SyntaxNode) -> Range {
        let mut significant = node
            .descendants_with_tokens()
            .filter_map(|element| element.into_token())
            .filter(|token| !token.kind().is_trivia());
        let range = match significant.next() {
            Some(first) => {
                let start = first.text_range().start();
                let end = significant
                    .last()
                    .map_or_else(|| first.text_range().end(), |last| last.text_range().end());
                TextRange::new(start, end)
            }
            None => node.text_range(),
        };
        self.line_index.range(range)
    }

    fn token_range(&self, token: &SyntaxToken) -> Range {
        self.line_index.range(token.text_range())
    }

    fn error(&self, node: &SyntaxNode, message: &'static str) -> ErrorNode {
        ErrorNode {
            range: self.range(node),
            message,
        }
    }

    fn file(&self, root: &SyntaxNode) -> File {
        let mut relation_declarations = Vec::new();
        let mut type_declarations = Vec::new();
        let mut facts = Vec::new();
        let mut rules = Vec::new();
        let mut directives = Vec::new();
        let mut includes = Vec::new();

        for child in root.children() {
            match child.kind() {
                SyntaxKind::RELATION_DECL => {
                    relation_declarations.push(self.relation_declaration(&child));
                }
                SyntaxKind::TYPE_DECL => type_declarations.push(self.type_declaration(&child)),
                SyntaxKind::FACT => facts.push(self.fact(&child)),
                SyntaxKind::RULE => rules.push(self.rule(&child)),
                SyntaxKind::DIRECTIVE => directives.push(self.directive(&child)),
                SyntaxKind::PREPROC_INCLUDE => includes.push(self.preproc_include(&child)),
                SyntaxKind::ERROR => {}
                kind => debug!(?kind, "unhandled top-level node"),
            }
        }

        let comments = self.comments(root);
        for declaration in &mut relation_declarations {
            for comment in &comments {
                if comment.range().end.line + 1 == declaration.range.start.line {
                    declaration.parse_doc_comment(comment);
                }
            }
        }

        File {
            relation_declarations,
            type_declarations,
            facts,
            rules,
            directives,
            includes,
            comments,
            range: self.line_index.range(root.text_range()),
        }
    }

    // =========================================================================
    // Comments
    // =========================================================================

    /// All comments in the file, with line comments on directly
    /// adjacent lines merged into one block.
    fn comments(&self, root: &SyntaxNode) -> Vec<Comment> {
        let mut line_comments: Vec<(Range, Vec<String>)> = Vec::new();
        let mut comments = Vec::new();

        for token in root
            .descendants_with_tokens()
            .filter_map(|element| element.into_token())
        {
            match token.kind() {
                SyntaxKind::LINE_COMMENT => {
                    let range = self.token_range(&token);
                    match line_comments.last_mut() {
                        Some((merged, lines)) if merged.end.line + 1 == range.start.line => {
                            merged.end = range.end;
                            lines.push(token.text().to_string());
                        }
                        _ => line_comments.push((range, vec![token.text().to_string()])),
                    }
                }
                SyntaxKind::BLOCK_COMMENT => comments.push(Comment::Block {
                    content: token.text().to_string(),
                    range: self.token_range(&token),
                }),
                _ => {}
            }
        }

        comments.extend(
            line_comments
                .into_iter()
                .map(|(range, lines)| Comment::Line { lines, range }),
        );
        comments.sort_by_key(|comment| comment.range().start);
        comments
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    fn relation_declaration(&self, node: &SyntaxNode) -> RelationDeclaration {
        RelationDeclaration {
            name: self.name_token(node, "Missing relation name"),
            attributes: self.attributes(node),
            doc_text: None,
            range: self.range(node),
        }
    }

    fn attributes(&self, node: &SyntaxNode) -> Vec<Attribute> {
        children_of_kind(node, SyntaxKind::ATTRIBUTE)
            .map(|child| self.attribute(&child))
            .collect()
    }

    fn attribute(&self, node: &SyntaxNode) -> Attribute {
        let ty = match child_of_kind(node, SyntaxKind::TYPE_NAME) {
            Some(type_name) => Ok(self.type_reference(&type_name)),
            None => Err(self.error(node, "Missing attribute type")),
        };
        Attribute {
            name: self.name_token(node, "Missing attribute name"),
            ty,
            doc_text: None,
            range: self.range(node),
        }
    }

    fn type_reference(&self, node: &SyntaxNode) -> TypeReference {
        let name = match child_of_kind(node, SyntaxKind::QUALIFIED_NAME) {
            Some(qualified) => Ok(TypeReferenceName {
                parts: self.name_parts(&qualified),
                declaration: None,
                range: self.range(&qualified),
            }),
            None => Err(self.error(node, "Missing type name")),
        };
        TypeReference {
            name,
            range: self.range(node),
        }
    }

    fn type_declaration(&self, node: &SyntaxNode) -> TypeDeclaration {
        let (op, expression) = if let Some(subtype) = child_of_kind(node, SyntaxKind::SUBTYPE_DECL)
        {
            let op = token_of_kind(&subtype, SyntaxKind::SUBTYPE)
                .map(|token| TypeDeclOp {
                    kind: TypeDeclOpKind::Subtype,
                    range: self.token_range(&token),
                })
                .ok_or_else(|| self.error(node, "Missing type declaration operator"));
            let expression = match child_of_kind(&subtype, SyntaxKind::TYPE_NAME) {
                Some(type_name) => {
                    let reference = self.type_reference(&type_name);
                    let range = reference.range;
                    Ok(TypeExpression::Union {
                        types: vec![reference],
                        range,
                    })
                }
                None => Err(self.error(node, "Missing type expression")),
            };
            (op, expression)
        } else if let Some(eq_decl) = child_of_kind(node, SyntaxKind::EQ_TYPE_DECL) {
            let op = token_of_kind(&eq_decl, SyntaxKind::EQ)
                .map(|token| TypeDeclOp {
                    kind: TypeDeclOpKind::Equivalence,
                    range: self.token_range(&token),
                })
                .ok_or_else(|| self.error(node, "Missing type declaration operator"));
            (op, self.type_expression(&eq_decl))
        } else {
            (
                Err(self.error(node, "Missing type declaration operator")),
                Err(self.error(node, "Missing type expression")),
            )
        };

        TypeDeclaration {
            name: self.name_token(node, "Missing type name"),
            op,
            expression,
            range: self.range(node),
        }
    }

    /// The expression inside an `=` type declaration: union, record,
    /// or algebraic data type, whichever child is present.
    fn type_expression(&self, eq_decl: &SyntaxNode) -> Recovered<TypeExpression> {
        if let Some(union) = child_of_kind(eq_decl, SyntaxKind::UNION_TYPE) {
            return Ok(TypeExpression::Union {
                types: children_of_kind(&union, SyntaxKind::TYPE_NAME)
                    .map(|child| self.type_reference(&child))
                    .collect(),
                range: self.range(&union),
            });
        }
        if let Some(record) = child_of_kind(eq_decl, SyntaxKind::RECORD_TYPE) {
            return Ok(TypeExpression::Record {
                attributes: self.attributes(&record),
                range: self.range(&record),
            });
        }
        if let Some(adt) = child_of_kind(eq_decl, SyntaxKind::ABSTRACT_DATA_TYPE) {
            return Ok(TypeExpression::Adt {
                branches: children_of_kind(&adt, SyntaxKind::ADT_BRANCH)
                    .map(|child| self.adt_branch(&child))
                    .collect(),
                range: self.range(&adt),
            });
        }
        Err(self.error(eq_decl, "Missing type expression"))
    }

    fn adt_branch(&self, node: &SyntaxNode) -> AdtBranch {
        AdtBranch {
            name: self.name_token(node, "Missing branch name"),
            attributes: self.attributes(node),
            range: self.range(node),
        }
    }

    // =========================================================================
    // Facts and rules
    // =========================================================================

    fn fact(&self, node: &SyntaxNode) -> Recovered<Atom> {
        match child_of_kind(node, SyntaxKind::ATOM) {
            Some(atom) => Ok(self.atom(&atom, AtomKind::Fact)),
            None => Err(self.error(node, "Missing atom name")),
        }
    }

    fn atom(&self, node: &SyntaxNode, kind: AtomKind) -> Atom {
        let name = match child_of_kind(node, SyntaxKind::QUALIFIED_NAME) {
            Some(qualified) => Ok(RelationReferenceName {
                parts: self.name_parts(&qualified),
                declaration: None,
                range: self.range(&qualified),
            }),
            None => Err(self.error(node, "Missing atom name")),
        };
        Atom {
            kind,
            name,
            arguments: self.arguments(node),
            range: self.range(node),
        }
    }

    fn rule(&self, node: &SyntaxNode) -> Rule {
        let mut heads = Vec::new();
        for child in node.children() {
            match child.kind() {
                SyntaxKind::RULE_HEAD => heads.push(RuleHead::Plain {
                    atoms: children_of_kind(&child, SyntaxKind::ATOM)
                        .map(|atom| Ok(self.atom(&atom, AtomKind::HeadReference)))
                        .collect(),
                    range: self.range(&child),
                }),
                SyntaxKind::SUBSUMPTION_HEAD => {
                    let mut atoms = children_of_kind(&child, SyntaxKind::ATOM);
                    let first = atoms
                        .next()
                        .map(|atom| self.atom(&atom, AtomKind::HeadReference))
                        .ok_or_else(|| self.error(&child, "Missing atom name"));
                    let second = atoms
                        .next()
                        .map(|atom| self.atom(&atom, AtomKind::HeadReference))
                        .ok_or_else(|| self.error(&child, "Missing atom name"));
                    heads.push(RuleHead::Subsumption {
                        first,
                        second,
                        range: self.range(&child),
                    });
                }
                _ => {}
            }
        }
        let body = match child_of_kind(node, SyntaxKind::DISJUNCTION) {
            Some(disjunction) => Ok(self.disjunction(&disjunction)),
            None => Err(self.error(node, "Missing rule body")),
        };
        Rule {
            heads,
            body,
            range: self.range(node),
        }
    }

    fn disjunction(&self, node: &SyntaxNode) -> Disjunction {
        Disjunction {
            conjunctions: children_of_kind(node, SyntaxKind::CONJUNCTION)
                .map(|child| self.conjunction(&child))
                .collect(),
            range: self.range(node),
        }
    }

    fn conjunction(&self, node: &SyntaxNode) -> Conjunction {
        Conjunction {
            clauses: children_of_kind(node, SyntaxKind::CONJUNCTION_CLAUSE)
                .map(|child| self.conjunction_clause(&child))
                .collect(),
            range: self.range(node),
        }
    }

    fn conjunction_clause(&self, node: &SyntaxNode) -> ConjunctionClause {
        // An even number of `!` markers cancels out.
        let negated = child_of_kind(node, SyntaxKind::NEG)
            .map(|neg| {
                neg.children_with_tokens()
                    .filter_map(|element| element.into_token())
                    .filter(|token| token.kind() == SyntaxKind::BANG)
                    .count()
                    % 2
                    == 1
            })
            .unwrap_or(false);

        let inner = node
            .children()
            .find_map(|child| match child.kind() {
                SyntaxKind::ATOM => Some(Clause::Atom(self.atom(&child, AtomKind::BodyReference))),
                SyntaxKind::BINARY_CONSTRAINT => {
                    Some(Clause::Constraint(self.binary_constraint(&child)))
                }
                SyntaxKind::DISJUNCTION => Some(Clause::Nested(self.disjunction(&child))),
                _ => None,
            })
            .ok_or_else(|| self.error(node, "Relation clause expected"));

        ConjunctionClause {
            negated,
            inner,
            range: self.range(node),
        }
    }

    fn binary_constraint(&self, node: &SyntaxNode) -> BinaryConstraint {
        let mut operands = node
            .children()
            .filter(|child| is_argument_kind(child.kind()));
        let lhs = operands
            .next()
            .and_then(|child| self.argument(&child))
            .ok_or_else(|| self.error(node, "Missing left-hand-side of binary constraint"));
        let rhs = operands
            .next()
            .and_then(|child| self.argument(&child))
            .ok_or_else(|| self.error(node, "Missing right-hand-side of binary constraint"));
        let op = node
            .children_with_tokens()
            .filter_map(|element| element.into_token())
            .find(|token| token.kind().is_constraint_op())
            .map(|token| ConstraintOp {
                op: SmolStr::new(token.text()),
                range: self.token_range(&token),
            })
            .ok_or_else(|| self.error(node, "Missing binary constraint operator"));
        BinaryConstraint {
            lhs,
            op,
            rhs,
            range: self.range(node),
        }
    }

    // =========================================================================
    // Arguments
    // =========================================================================

    fn arguments(&self, node: &SyntaxNode) -> Vec<Argument> {
        children_of_kind(node, SyntaxKind::ARGUMENT)
            .filter_map(|slot| {
                let child = slot.children().next()?;
                let argument = self.argument(&child);
                if argument.is_none() {
                    debug!(kind = ?child.kind(), "argument not recognized");
                }
                argument
            })
            .collect()
    }

    /// Lower one argument expression. Returns None for shapes the
    /// analysis does not model; callers treat that as an absent
    /// argument, not an error.
    fn argument(&self, node: &SyntaxNode) -> Option<Argument> {
        let range = self.range(node);
        let kind = match node.kind() {
            SyntaxKind::CONSTANT => {
                let token = node
                    .children_with_tokens()
                    .filter_map(|element| element.into_token())
                    .find(|token| !token.kind().is_trivia())?;
                let constant = match token.kind() {
                    SyntaxKind::STRING => Constant::String(SmolStr::new(token.text())),
                    _ => Constant::Number(SmolStr::new(collect_significant_text(node))),
                };
                ArgumentKind::Constant(constant)
            }
            SyntaxKind::VARIABLE => ArgumentKind::Variable {
                name: SmolStr::new(collect_significant_text(node)),
            },
            SyntaxKind::RECORD_INIT => ArgumentKind::RecordInit {
                arguments: self.arguments(node),
            },
            SyntaxKind::BRANCH_INIT => {
                let name = match child_of_kind(node, SyntaxKind::QUALIFIED_NAME) {
                    Some(qualified) => Ok(BranchInitName {
                        parts: self.name_parts(&qualified),
                        declaration: None,
                        range: self.range(&qualified),
                    }),
                    None => Err(self.error(node, "Missing branch name")),
                };
                ArgumentKind::BranchInit {
                    name,
                    arguments: self.arguments(node),
                }
            }
            SyntaxKind::BINARY_OPERATION => {
                let mut operands = node
                    .children()
                    .filter(|child| is_argument_kind(child.kind()));
                let lhs = operands
                    .next()
                    .and_then(|child| self.argument(&child))
                    .ok_or_else(|| self.error(node, "Missing left-hand-side of binary constraint"));
                let rhs = operands
                    .next()
                    .and_then(|child| self.argument(&child))
                    .ok_or_else(|| {
                        self.error(node, "Missing right-hand-side of binary constraint")
                    });
                let op = node
                    .children_with_tokens()
                    .filter_map(|element| element.into_token())
                    .find(|token| token.kind().is_arith_op())
                    .map(|token| BinaryOperator {
                        op: SmolStr::new(token.text()),
                        range: self.token_range(&token),
                    })
                    .ok_or_else(|| self.error(node, "Missing binary operator"));
                ArgumentKind::BinaryOperation {
                    lhs: Box::new(lhs),
                    op,
                    rhs: Box::new(rhs),
                }
            }
            _ => return None,
        };
        Some(Argument {
            kind,
            ty: ArgType::Unresolved,
            range,
        })
    }

    // =========================================================================
    // Directives and includes
    // =========================================================================

    fn directive(&self, node: &SyntaxNode) -> Directive {
        let qualifier = child_of_kind(node, SyntaxKind::DIRECTIVE_QUALIFIER)
            .and_then(|qualifier| {
                let token = qualifier
                    .children_with_tokens()
                    .filter_map(|element| element.into_token())
                    .find(|token| token.kind().is_directive_qualifier())?;
                let kind = match token.kind() {
                    SyntaxKind::INPUT_KW => DirectiveKind::Input,
                    SyntaxKind::OUTPUT_KW => DirectiveKind::Output,
                    _ => DirectiveKind::Printsize,
                };
                Some(DirectiveQualifier {
                    kind,
                    range: self.token_range(&token),
                })
            })
            .unwrap_or_else(|| DirectiveQualifier {
                kind: DirectiveKind::Input,
                range: self.range(node),
            });

        Directive {
            qualifier,
            relation_names: children_of_kind(node, SyntaxKind::QUALIFIED_NAME)
                .map(|qualified| RelationReferenceName {
                    parts: self.name_parts(&qualified),
                    declaration: None,
                    range: self.range(&qualified),
                })
                .collect(),
            range: self.range(node),
        }
    }

    fn preproc_include(&self, node: &SyntaxNode) -> PreprocInclude {
        let path = child_of_kind(node, SyntaxKind::PATH_SPEC)
            .and_then(|path_spec| token_of_kind(&path_spec, SyntaxKind::STRING))
            .map(|token| PathSpec {
                value: SmolStr::new(token.text().trim_matches('"')),
                range: self.token_range(&token),
            })
            .ok_or_else(|| self.error(node, "Missing path spec"));
        PreprocInclude {
            path,
            range: self.range(node),
        }
    }

    // =========================================================================
    // Names
    // =========================================================================

    fn name_parts(&self, qualified: &SyntaxNode) -> Vec<Identifier> {
        qualified
            .children_with_tokens()
            .filter_map(|element| element.into_token())
            .filter(|token| token.kind() == SyntaxKind::IDENT)
            .map(|token| Identifier {
                value: SmolStr::new(token.text()),
                range: self.token_range(&token),
            })
            .collect()
    }

    /// The first direct identifier token of a declaration-like node,
    /// or an error slot with the given message.
    fn name_token(&self, node: &SyntaxNode, message: &'static str) -> Recovered<Identifier> {
        node.children_with_tokens()
            .filter_map(|element| element.into_token())
            .find(|token| token.kind() == SyntaxKind::IDENT)
            .map(|token| Identifier {
                value: SmolStr::new(token.text()),
                range: self.token_range(&token),
            })
            .ok_or_else(|| self.error(node, message))
    }
}

fn child_of_kind(node: &SyntaxNode, kind: SyntaxKind) -> Option<SyntaxNode> {
    node.children().find(|child| child.kind() == kind)
}

fn children_of_kind(
    node: &SyntaxNode,
    kind: SyntaxKind,
) -> impl Iterator<Item = SyntaxNode> + '_ {
    node.children().filter(move |child| child.kind() == kind)
}

fn token_of_kind(node: &SyntaxNode, kind: SyntaxKind) -> Option<SyntaxToken> {
    node.children_with_tokens()
        .filter_map(|element| element.into_token())
        .find(|token| token.kind() == kind)
}

fn is_argument_kind(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::CONSTANT
            | SyntaxKind::VARIABLE
            | SyntaxKind::RECORD_INIT
            | SyntaxKind::BRANCH_INIT
            | SyntaxKind::BINARY_OPERATION
    )
}

fn collect_significant_text(node: &SyntaxNode) -> String {
    node.descendants_with_tokens()
        .filter_map(|element| element.into_token())
        .filter(|token| !token.kind().is_trivia())
        .map(|token| token.text().to_string())
        .collect()
}
