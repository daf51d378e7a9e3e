//! The error-tolerant AST for Soufflé Datalog.
//!
//! Every syntactic position that can fail to parse is a [`Recovered`]
//! slot holding either the node or an [`ErrorNode`] with a message and
//! range. Lowering is total: any input produces exactly one [`File`].
//!
//! Reference names carry a `declaration` slot written by the resolver,
//! and arguments carry a `ty` slot written by type inference. Both are
//! [`DeclRef`] handles into the workspace rather than aliasing
//! pointers, and are rewritten from scratch on every sync.

use std::sync::Arc;

use smol_str::SmolStr;

use crate::base::{Position, Range};

/// A placeholder for a construct that failed to parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorNode {
    pub range: Range,
    pub message: &'static str,
}

/// The result slot: a node of the expected kind, or the error that
/// took its place. Callers must branch.
pub type Recovered<T> = Result<T, ErrorNode>;

/// Handle to a declaration somewhere in the workspace. Indexes refer
/// to the owning document's declaration lists and stay valid until
/// that document is next synced.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DeclRef {
    Relation {
        uri: Arc<str>,
        index: usize,
    },
    Type {
        uri: Arc<str>,
        index: usize,
    },
    Branch {
        uri: Arc<str>,
        type_index: usize,
        branch_index: usize,
    },
}

impl DeclRef {
    pub fn uri(&self) -> &Arc<str> {
        match self {
            DeclRef::Relation { uri, .. }
            | DeclRef::Type { uri, .. }
            | DeclRef::Branch { uri, .. } => uri,
        }
    }
}

/// The type attached to an argument by inference.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ArgType {
    #[default]
    Unresolved,
    Builtin(BuiltinType),
    Declared(DeclRef),
}

/// The four primitive types of the language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinType {
    Symbol,
    Number,
    Unsigned,
    Float,
}

impl BuiltinType {
    pub const ALL: [BuiltinType; 4] = [
        BuiltinType::Symbol,
        BuiltinType::Number,
        BuiltinType::Unsigned,
        BuiltinType::Float,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BuiltinType::Symbol => "symbol",
            BuiltinType::Number => "number",
            BuiltinType::Unsigned => "unsigned",
            BuiltinType::Float => "float",
        }
    }

    pub fn doc(self) -> &'static str {
        match self {
            BuiltinType::Symbol => "Type `symbol`. Each value is a string.",
            BuiltinType::Number => "Type `number`. Each value is a signed integer.",
            BuiltinType::Unsigned => "Type `unsigned`. Each value is a non-negative integer.",
            BuiltinType::Float => "Type `float`. Each value is a floating-point number.",
        }
    }

    pub fn from_name(name: &str) -> Option<BuiltinType> {
        Self::ALL.into_iter().find(|b| b.name() == name)
    }
}

// =============================================================================
// Names
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    pub value: SmolStr,
    pub range: Range,
}

/// A reference to a relation, in an atom or a directive operand.
/// Dot-qualified; only single-segment names ever resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationReferenceName {
    pub parts: Vec<Identifier>,
    pub declaration: Option<DeclRef>,
    pub range: Range,
}

/// A reference to a type, in an attribute or a type expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeReferenceName {
    pub parts: Vec<Identifier>,
    pub declaration: Option<DeclRef>,
    pub range: Range,
}

/// The name in a `$Branch(...)` constructor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchInitName {
    pub parts: Vec<Identifier>,
    pub declaration: Option<DeclRef>,
    pub range: Range,
}

/// Single qualifying segment, if the name has exactly one.
pub(crate) fn single_part(parts: &[Identifier]) -> Option<&Identifier> {
    match parts {
        [part] => Some(part),
        _ => None,
    }
}

impl RelationReferenceName {
    pub fn single(&self) -> Option<&Identifier> {
        single_part(&self.parts)
    }
}

impl TypeReferenceName {
    pub fn single(&self) -> Option<&Identifier> {
        single_part(&self.parts)
    }

    pub fn dotted(&self) -> String {
        self.parts
            .iter()
            .map(|p| p.value.as_str())
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl BranchInitName {
    pub fn single(&self) -> Option<&Identifier> {
        single_part(&self.parts)
    }
}

// =============================================================================
// Declarations
// =============================================================================

/// `.decl name(attr: type, ...)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationDeclaration {
    pub name: Recovered<Identifier>,
    pub attributes: Vec<Attribute>,
    pub doc_text: Option<Vec<String>>,
    pub range: Range,
}

/// `name: type` inside a relation declaration, record type, or ADT
/// branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: Recovered<Identifier>,
    pub ty: Recovered<TypeReference>,
    pub doc_text: Option<Vec<String>>,
    pub range: Range,
}

/// A type position holding a (possibly qualified) type name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeReference {
    pub name: Recovered<TypeReferenceName>,
    pub range: Range,
}

/// `.type name <: base` or `.type name = expression`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDeclaration {
    pub name: Recovered<Identifier>,
    pub op: Recovered<TypeDeclOp>,
    pub expression: Recovered<TypeExpression>,
    pub range: Range,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDeclOp {
    pub kind: TypeDeclOpKind,
    pub range: Range,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeDeclOpKind {
    /// `<:`
    Subtype,
    /// `=`
    Equivalence,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpression {
    Union {
        types: Vec<TypeReference>,
        range: Range,
    },
    Record {
        attributes: Vec<Attribute>,
        range: Range,
    },
    Adt {
        branches: Vec<AdtBranch>,
        range: Range,
    },
}

impl TypeExpression {
    pub fn range(&self) -> Range {
        match self {
            TypeExpression::Union { range, .. }
            | TypeExpression::Record { range, .. }
            | TypeExpression::Adt { range, .. } => *range,
        }
    }

    pub fn branch_with_name(&self, name: &str) -> Option<(usize, &AdtBranch)> {
        let TypeExpression::Adt { branches, .. } = self else {
            return None;
        };
        branches.iter().enumerate().find(|(_, branch)| {
            matches!(&branch.name, Ok(branch_name) if branch_name.value == name)
        })
    }
}

/// One tagged alternative of an algebraic data type, `Name {a: T}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdtBranch {
    pub name: Recovered<Identifier>,
    pub attributes: Vec<Attribute>,
    pub range: Range,
}

// =============================================================================
// Facts, rules, and clauses
// =============================================================================

/// Where an atom occurred, for passes that care about the distinction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtomKind {
    Fact,
    HeadReference,
    BodyReference,
}

/// A relation name applied to arguments. Shared by facts, rule heads,
/// and rule-body references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Atom {
    pub kind: AtomKind,
    pub name: Recovered<RelationReferenceName>,
    pub arguments: Vec<Argument>,
    pub range: Range,
}

/// `head :- body.`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub heads: Vec<RuleHead>,
    pub body: Recovered<Disjunction>,
    pub range: Range,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleHead {
    /// `a(x), b(x) :- ...`
    Plain {
        atoms: Vec<Recovered<Atom>>,
        range: Range,
    },
    /// `a(x) <= b(x) :- ...`
    Subsumption {
        first: Recovered<Atom>,
        second: Recovered<Atom>,
        range: Range,
    },
}

impl RuleHead {
    pub fn range(&self) -> Range {
        match self {
            RuleHead::Plain { range, .. } | RuleHead::Subsumption { range, .. } => *range,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disjunction {
    pub conjunctions: Vec<Conjunction>,
    pub range: Range,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conjunction {
    pub clauses: Vec<ConjunctionClause>,
    pub range: Range,
}

/// One body element with its negation state. An even number of `!`
/// markers in the source means not negated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConjunctionClause {
    pub negated: bool,
    pub inner: Recovered<Clause>,
    pub range: Range,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clause {
    Atom(Atom),
    Constraint(BinaryConstraint),
    Nested(Disjunction),
}

impl Clause {
    pub fn range(&self) -> Range {
        match self {
            Clause::Atom(atom) => atom.range,
            Clause::Constraint(constraint) => constraint.range,
            Clause::Nested(disjunction) => disjunction.range,
        }
    }
}

/// `lhs op rhs` with a comparison operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryConstraint {
    pub lhs: Recovered<Argument>,
    pub op: Recovered<ConstraintOp>,
    pub rhs: Recovered<Argument>,
    pub range: Range,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintOp {
    pub op: SmolStr,
    pub range: Range,
}

// =============================================================================
// Arguments
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    pub kind: ArgumentKind,
    pub ty: ArgType,
    pub range: Range,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgumentKind {
    Constant(Constant),
    Variable { name: SmolStr },
    RecordInit { arguments: Vec<Argument> },
    BranchInit {
        name: Recovered<BranchInitName>,
        arguments: Vec<Argument>,
    },
    BinaryOperation {
        lhs: Box<Recovered<Argument>>,
        op: Recovered<BinaryOperator>,
        rhs: Box<Recovered<Argument>>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constant {
    String(SmolStr),
    Number(SmolStr),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryOperator {
    pub op: SmolStr,
    pub range: Range,
}

// =============================================================================
// Directives, includes, comments
// =============================================================================

/// `.input name, ...` and friends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub qualifier: DirectiveQualifier,
    pub relation_names: Vec<RelationReferenceName>,
    pub range: Range,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveQualifier {
    pub kind: DirectiveKind,
    pub range: Range,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind {
    Input,
    Output,
    Printsize,
}

/// `#include "path"`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreprocInclude {
    pub path: Recovered<PathSpec>,
    pub range: Range,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSpec {
    pub value: SmolStr,
    pub range: Range,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Comment {
    /// Consecutive `//` lines merged into one block. Stores the raw
    /// line texts including the comment markers.
    Line { lines: Vec<String>, range: Range },
    /// One `/* ... */` comment, raw content included.
    Block { content: String, range: Range },
}

impl Comment {
    pub fn range(&self) -> Range {
        match self {
            Comment::Line { range, .. } | Comment::Block { range, .. } => *range,
        }
    }

    /// The human text of the comment, one entry per line, with comment
    /// markers and `*` margins stripped and blank lines trimmed from
    /// both ends.
    pub fn text(&self) -> Vec<String> {
        let lines: Vec<String> = match self {
            Comment::Line { lines, .. } => lines
                .iter()
                .filter_map(|line| {
                    let rest = line.trim_start().strip_prefix("//")?;
                    Some(rest.trim_start_matches('/').trim_start().to_string())
                })
                .collect(),
            Comment::Block { content, .. } => {
                let mut out = Vec::new();
                for line in content.lines() {
                    if is_block_comment_closer(line) {
                        break;
                    }
                    let mut rest = line.trim_start();
                    if let Some(stripped) = rest.strip_prefix('/') {
                        rest = stripped;
                    }
                    let rest = rest.trim_start_matches('*').trim_start();
                    let rest = match rest.strip_suffix("*/") {
                        Some(stripped) => stripped.trim_end(),
                        None => rest,
                    };
                    out.push(rest.to_string());
                }
                out
            }
        };
        trim_blank_edges(lines)
    }
}

/// `^\s*\*+/` marks the closing line of a block comment.
fn is_block_comment_closer(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with('*') && trimmed.trim_start_matches('*').starts_with('/')
}

fn trim_blank_edges(mut lines: Vec<String>) -> Vec<String> {
    while lines.first().is_some_and(|l| l.is_empty()) {
        lines.remove(0);
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines
}

// =============================================================================
// File
// =============================================================================

/// One lowered source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    pub relation_declarations: Vec<RelationDeclaration>,
    pub type_declarations: Vec<TypeDeclaration>,
    pub facts: Vec<Recovered<Atom>>,
    pub rules: Vec<Rule>,
    pub directives: Vec<Directive>,
    pub includes: Vec<PreprocInclude>,
    pub comments: Vec<Comment>,
    pub range: Range,
}

// =============================================================================
// Doc strings
// =============================================================================

impl Attribute {
    /// `name: type`, or None when either side is an error slot.
    pub fn signature(&self) -> Option<String> {
        let name = self.name.as_ref().ok()?;
        let type_reference = self.ty.as_ref().ok()?;
        let type_name = type_reference.name.as_ref().ok()?;
        Some(format!("{}: {}", name.value, type_name.dotted()))
    }
}

impl RelationDeclaration {
    pub fn name_range(&self) -> Option<Range> {
        self.name.as_ref().ok().map(|name| name.range)
    }

    /// `name(a: t, b: u)`
    pub fn signature(&self) -> Option<String> {
        let name = self.name.as_ref().ok()?;
        let mut builder = String::new();
        builder.push_str(&name.value);
        builder.push('(');
        for (i, attribute) in self.attributes.iter().enumerate() {
            if i != 0 {
                builder.push_str(", ");
            }
            builder.push_str(&attribute.signature()?);
        }
        builder.push(')');
        Some(builder)
    }

    /// Fenced signature, free doc text, then one bullet per documented
    /// attribute.
    pub fn doc(&self) -> Option<String> {
        let signature = self.signature()?;
        let mut doc_lines = vec!["```".to_string(), signature, "```".to_string()];

        if let Some(doc_text) = &self.doc_text {
            doc_lines.push(String::new());
            doc_lines.extend(doc_text.iter().cloned());
        }

        let mut attribute_doc_lines = Vec::new();
        for attribute in &self.attributes {
            let name = attribute.name.as_ref().ok()?;
            if let Some(doc_text) = &attribute.doc_text {
                if !doc_text.is_empty() {
                    attribute_doc_lines.push(format!("* `{}`: {}", name.value, doc_text.join(" ")));
                }
            }
        }
        if !attribute_doc_lines.is_empty() {
            doc_lines.push(String::new());
        }
        doc_lines.extend(attribute_doc_lines);

        Some(doc_lines.join("\n"))
    }

    /// Harvest a preceding comment block as documentation. A line of
    /// the form `@attribute <name> <text>` redirects following text to
    /// that attribute's doc.
    pub fn parse_doc_comment(&mut self, comment: &Comment) {
        if self.name.is_err() || self.attributes.iter().any(|a| a.name.is_err()) {
            return;
        }
        let mut current_attribute: Option<usize> = None;
        for line in comment.text() {
            let (marker, remain) = split_first_word(&line);
            if marker == "@attribute" {
                let (attribute_name, rest) = split_first_word(remain);
                let found = self.attributes.iter().position(|attribute| {
                    matches!(&attribute.name, Ok(name) if name.value == attribute_name)
                });
                if let Some(index) = found {
                    self.attributes[index].doc_text = Some(vec![rest.to_string()]);
                    current_attribute = Some(index);
                }
            } else {
                match current_attribute {
                    Some(index) => self.attributes[index]
                        .doc_text
                        .get_or_insert_with(Vec::new)
                        .push(line),
                    None => self.doc_text.get_or_insert_with(Vec::new).push(line),
                }
            }
        }
    }
}

fn split_first_word(line: &str) -> (&str, &str) {
    line.split_once(' ').unwrap_or((line, ""))
}

impl TypeDeclaration {
    pub fn name_range(&self) -> Option<Range> {
        self.name.as_ref().ok().map(|name| name.range)
    }
}

impl AdtBranch {
    pub fn name_range(&self) -> Option<Range> {
        self.name.as_ref().ok().map(|name| name.range)
    }

    /// `Name {a: t, b: u}`
    pub fn signature(&self) -> Option<String> {
        let name = self.name.as_ref().ok()?;
        let mut builder = String::new();
        builder.push_str(&name.value);
        builder.push_str(" {");
        for (i, attribute) in self.attributes.iter().enumerate() {
            if i != 0 {
                builder.push_str(", ");
            }
            builder.push_str(&attribute.signature()?);
        }
        builder.push('}');
        Some(builder)
    }

    pub fn doc(&self) -> Option<String> {
        let signature = self.signature()?;
        Some(["```", &signature, "```"].join("\n"))
    }
}

// =============================================================================
// Uniform tree view
// =============================================================================

/// A borrowed view over any AST node, used by every position-addressed
/// descent. `children` is sorted by start position; a node's children
/// are always contained in its own range.
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    File(&'a File),
    RelationDeclaration(&'a RelationDeclaration),
    Attribute(&'a Attribute),
    TypeReference(&'a TypeReference),
    TypeReferenceName(&'a TypeReferenceName),
    TypeDeclaration(&'a TypeDeclaration),
    TypeExpression(&'a TypeExpression),
    AdtBranch(&'a AdtBranch),
    Atom(&'a Atom),
    Rule(&'a Rule),
    RuleHead(&'a RuleHead),
    Disjunction(&'a Disjunction),
    Conjunction(&'a Conjunction),
    ConjunctionClause(&'a ConjunctionClause),
    BinaryConstraint(&'a BinaryConstraint),
    RelationReferenceName(&'a RelationReferenceName),
    BranchInitName(&'a BranchInitName),
    Argument(&'a Argument),
    Directive(&'a Directive),
    PreprocInclude(&'a PreprocInclude),
    Comment(&'a Comment),
    Identifier(&'a Identifier),
    Error(&'a ErrorNode),
}

fn recovered<'a, T>(slot: &'a Recovered<T>, wrap: fn(&'a T) -> NodeRef<'a>) -> NodeRef<'a> {
    match slot {
        Ok(node) => wrap(node),
        Err(error) => NodeRef::Error(error),
    }
}

impl<'a> NodeRef<'a> {
    pub fn range(&self) -> Range {
        match self {
            NodeRef::File(n) => n.range,
            NodeRef::RelationDeclaration(n) => n.range,
            NodeRef::Attribute(n) => n.range,
            NodeRef::TypeReference(n) => n.range,
            NodeRef::TypeReferenceName(n) => n.range,
            NodeRef::TypeDeclaration(n) => n.range,
            NodeRef::TypeExpression(n) => n.range(),
            NodeRef::AdtBranch(n) => n.range,
            NodeRef::Atom(n) => n.range,
            NodeRef::Rule(n) => n.range,
            NodeRef::RuleHead(n) => n.range(),
            NodeRef::Disjunction(n) => n.range,
            NodeRef::Conjunction(n) => n.range,
            NodeRef::ConjunctionClause(n) => n.range,
            NodeRef::BinaryConstraint(n) => n.range,
            NodeRef::RelationReferenceName(n) => n.range,
            NodeRef::BranchInitName(n) => n.range,
            NodeRef::Argument(n) => n.range,
            NodeRef::Directive(n) => n.range,
            NodeRef::PreprocInclude(n) => n.range,
            NodeRef::Comment(n) => n.range(),
            NodeRef::Identifier(n) => n.range,
            NodeRef::Error(n) => n.range,
        }
    }

    pub fn children(&self) -> Vec<NodeRef<'a>> {
        let mut children: Vec<NodeRef<'a>> = match *self {
            NodeRef::File(file) => {
                let mut out: Vec<NodeRef<'a>> = Vec::new();
                out.extend(
                    file.relation_declarations
                        .iter()
                        .map(NodeRef::RelationDeclaration),
                );
                out.extend(file.type_declarations.iter().map(NodeRef::TypeDeclaration));
                out.extend(file.facts.iter().map(|f| recovered(f, NodeRef::Atom)));
                out.extend(file.rules.iter().map(NodeRef::Rule));
                out.extend(file.directives.iter().map(NodeRef::Directive));
                out.extend(file.includes.iter().map(NodeRef::PreprocInclude));
                out.extend(file.comments.iter().map(NodeRef::Comment));
                out
            }
            NodeRef::RelationDeclaration(decl) => {
                let mut out = vec![recovered(&decl.name, NodeRef::Identifier)];
                out.extend(decl.attributes.iter().map(NodeRef::Attribute));
                out
            }
            NodeRef::Attribute(attribute) => {
                vec![
                    recovered(&attribute.name, NodeRef::Identifier),
                    recovered(&attribute.ty, NodeRef::TypeReference),
                ]
            }
            NodeRef::TypeReference(type_reference) => {
                vec![recovered(&type_reference.name, NodeRef::TypeReferenceName)]
            }
            NodeRef::TypeDeclaration(decl) => {
                vec![
                    recovered(&decl.name, NodeRef::Identifier),
                    recovered(&decl.expression, NodeRef::TypeExpression),
                ]
            }
            NodeRef::TypeExpression(expression) => match expression {
                TypeExpression::Union { types, .. } => {
                    types.iter().map(NodeRef::TypeReference).collect()
                }
                TypeExpression::Record { attributes, .. } => {
                    attributes.iter().map(NodeRef::Attribute).collect()
                }
                TypeExpression::Adt { branches, .. } => {
                    branches.iter().map(NodeRef::AdtBranch).collect()
                }
            },
            NodeRef::AdtBranch(branch) => {
                let mut out = vec![recovered(&branch.name, NodeRef::Identifier)];
                out.extend(branch.attributes.iter().map(NodeRef::Attribute));
                out
            }
            NodeRef::Atom(atom) => {
                let mut out = vec![recovered(&atom.name, NodeRef::RelationReferenceName)];
                out.extend(atom.arguments.iter().map(NodeRef::Argument));
                out
            }
            NodeRef::Rule(rule) => {
                let mut out: Vec<NodeRef<'a>> = rule.heads.iter().map(NodeRef::RuleHead).collect();
                out.push(recovered(&rule.body, NodeRef::Disjunction));
                out
            }
            NodeRef::RuleHead(head) => match head {
                RuleHead::Plain { atoms, .. } => atoms
                    .iter()
                    .map(|atom| recovered(atom, NodeRef::Atom))
                    .collect(),
                RuleHead::Subsumption { first, second, .. } => {
                    vec![recovered(first, NodeRef::Atom), recovered(second, NodeRef::Atom)]
                }
            },
            NodeRef::Disjunction(disjunction) => disjunction
                .conjunctions
                .iter()
                .map(NodeRef::Conjunction)
                .collect(),
            NodeRef::Conjunction(conjunction) => conjunction
                .clauses
                .iter()
                .map(NodeRef::ConjunctionClause)
                .collect(),
            NodeRef::ConjunctionClause(clause) => match &clause.inner {
                Ok(Clause::Atom(atom)) => vec![NodeRef::Atom(atom)],
                Ok(Clause::Constraint(constraint)) => vec![NodeRef::BinaryConstraint(constraint)],
                Ok(Clause::Nested(disjunction)) => vec![NodeRef::Disjunction(disjunction)],
                Err(error) => vec![NodeRef::Error(error)],
            },
            NodeRef::BinaryConstraint(constraint) => {
                vec![
                    recovered(&constraint.lhs, NodeRef::Argument),
                    recovered(&constraint.rhs, NodeRef::Argument),
                ]
            }
            NodeRef::Argument(argument) => match &argument.kind {
                ArgumentKind::Constant(_) | ArgumentKind::Variable { .. } => Vec::new(),
                ArgumentKind::RecordInit { arguments } => {
                    arguments.iter().map(NodeRef::Argument).collect()
                }
                ArgumentKind::BranchInit { name, arguments } => {
                    let mut out = vec![recovered(name, NodeRef::BranchInitName)];
                    out.extend(arguments.iter().map(NodeRef::Argument));
                    out
                }
                ArgumentKind::BinaryOperation { lhs, rhs, .. } => {
                    vec![recovered(lhs, NodeRef::Argument), recovered(rhs, NodeRef::Argument)]
                }
            },
            NodeRef::Directive(directive) => directive
                .relation_names
                .iter()
                .map(NodeRef::RelationReferenceName)
                .collect(),
            NodeRef::RelationReferenceName(_)
            | NodeRef::TypeReferenceName(_)
            | NodeRef::BranchInitName(_)
            | NodeRef::PreprocInclude(_)
            | NodeRef::Comment(_)
            | NodeRef::Identifier(_)
            | NodeRef::Error(_) => Vec::new(),
        };
        children.sort_by_key(|child| child.range().start);
        children
    }

    /// The first child, in source order, covering the position.
    pub fn child_at(&self, position: Position) -> Option<NodeRef<'a>> {
        self.children()
            .into_iter()
            .find(|child| child.range().covers(position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::Range;

    fn r(line: u32) -> Range {
        Range::from_coords(line, 0, line, 10)
    }

    #[test]
    fn test_block_comment_text_strips_margins() {
        let comment = Comment::Block {
            content: "/**\n * Reachable node pairs.\n *\n * More text.\n */".to_string(),
            range: r(0),
        };
        assert_eq!(
            comment.text(),
            vec!["Reachable node pairs.".to_string(), String::new(), "More text.".to_string()]
        );
    }

    #[test]
    fn test_line_comment_text_strips_markers() {
        let comment = Comment::Line {
            lines: vec!["/// First.".to_string(), "//".to_string(), "// Second.".to_string()],
            range: r(0),
        };
        assert_eq!(
            comment.text(),
            vec!["First.".to_string(), String::new(), "Second.".to_string()]
        );
    }

    fn attribute(line: u32, name: &str, ty: &str) -> Attribute {
        Attribute {
            name: Ok(Identifier {
                value: name.into(),
                range: r(line),
            }),
            ty: Ok(TypeReference {
                name: Ok(TypeReferenceName {
                    parts: vec![Identifier {
                        value: ty.into(),
                        range: r(line),
                    }],
                    declaration: None,
                    range: r(line),
                }),
                range: r(line),
            }),
            doc_text: None,
            range: r(line),
        }
    }

    fn relation(name: &str) -> RelationDeclaration {
        RelationDeclaration {
            name: Ok(Identifier {
                value: name.into(),
                range: r(1),
            }),
            attributes: vec![attribute(1, "a", "number"), attribute(1, "b", "symbol")],
            doc_text: None,
            range: r(1),
        }
    }

    #[test]
    fn test_relation_signature() {
        assert_eq!(
            relation("edge").signature().as_deref(),
            Some("edge(a: number, b: symbol)")
        );
    }

    #[test]
    fn test_relation_doc_without_text_is_fenced_signature() {
        assert_eq!(
            relation("edge").doc().as_deref(),
            Some("```\nedge(a: number, b: symbol)\n```")
        );
    }

    #[test]
    fn test_doc_comment_with_attribute_markers() {
        let mut decl = relation("edge");
        let comment = Comment::Line {
            lines: vec![
                "/// An edge of the graph.".to_string(),
                "/// @attribute a source node".to_string(),
                "/// @attribute b target node".to_string(),
            ],
            range: r(0),
        };
        decl.parse_doc_comment(&comment);
        assert_eq!(
            decl.doc().as_deref(),
            Some(concat!(
                "```\n",
                "edge(a: number, b: symbol)\n",
                "```\n",
                "\n",
                "An edge of the graph.\n",
                "\n",
                "* `a`: source node\n",
                "* `b`: target node"
            ))
        );
    }

    #[test]
    fn test_adt_branch_signature_uses_braces() {
        let branch = AdtBranch {
            name: Ok(Identifier {
                value: "Pair".into(),
                range: r(2),
            }),
            attributes: vec![attribute(2, "x", "number")],
            range: r(2),
        };
        assert_eq!(branch.signature().as_deref(), Some("Pair {x: number}"));
        assert_eq!(branch.doc().as_deref(), Some("```\nPair {x: number}\n```"));
    }

    #[test]
    fn test_signature_degrades_to_none_on_error_slot() {
        let mut decl = relation("edge");
        decl.attributes[0].ty = Err(ErrorNode {
            range: r(1),
            message: "Missing attribute type",
        });
        assert_eq!(decl.signature(), None);
        assert_eq!(decl.doc(), None);
    }

    #[test]
    fn test_builtin_lookup() {
        assert_eq!(BuiltinType::from_name("unsigned"), Some(BuiltinType::Unsigned));
        assert_eq!(BuiltinType::from_name("string"), None);
    }
}
