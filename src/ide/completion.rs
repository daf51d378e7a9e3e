//! Completion heuristics.
//!
//! Suggestions are derived from the raw text around the cursor rather
//! than the syntax tree, which is unreliable mid-edit. The tree is
//! consulted only for the pool of declared names.

use rustc_hash::FxHashSet;

use crate::analysis::Workspace;
use crate::base::Position;
use crate::syntax::{BuiltinType, TypeExpression};

use super::source_util::{token_before, words_in_block, BracketDepths};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionItem {
    pub label: String,
    pub documentation: Option<String>,
}

impl CompletionItem {
    fn new(label: impl Into<String>, documentation: Option<String>) -> Self {
        Self {
            label: label.into(),
            documentation,
        }
    }
}

const DIRECTIVE_ITEMS: &[(&str, &str)] = &[
    ("input", "input directive"),
    ("output", "output directive"),
    ("decl", "relation declaration directive"),
    ("type", "type declaration directive"),
];

pub(crate) fn completions(
    workspace: &Workspace,
    uri: &str,
    position: Position,
    trigger_character: Option<char>,
) -> Vec<CompletionItem> {
    let Some(document) = workspace.document(uri) else {
        return Vec::new();
    };
    let text = &document.text;
    let line = position.line as usize;
    let character = position.character as usize;

    if trigger_character == Some('.') {
        // Only a dot at the start of a statement introduces a
        // directive. Anything else is a fact terminator or a qualified
        // name separator.
        if character == 1 || only_whitespace_before_dot(text, line, character) {
            return DIRECTIVE_ITEMS
                .iter()
                .map(|(label, doc)| CompletionItem::new(*label, Some(doc.to_string())))
                .collect();
        }
        return Vec::new();
    }

    let before = token_before(text, line, character);

    if before.ends_with(':') {
        return type_name_items(workspace);
    }

    let depths = BracketDepths::of(text);
    let after_directive = matches!(before.as_str(), ".input" | ".output" | ".printsize");
    let after_clause_boundary = before.ends_with(',')
        || before.ends_with(":-")
        || before.ends_with('.')
        || before.ends_with(')');
    if depths.is_zero_at(line, character) && (after_directive || after_clause_boundary) {
        return relation_name_items(workspace);
    }

    word_items(workspace, text, line)
}

fn only_whitespace_before_dot(text: &str, line: usize, character: usize) -> bool {
    if character < 2 {
        return false;
    }
    let Some(line_text) = text.lines().nth(line) else {
        return false;
    };
    line_text
        .chars()
        .take(character - 1)
        .all(|c| c.is_whitespace())
}

fn type_name_items(workspace: &Workspace) -> Vec<CompletionItem> {
    let mut items: Vec<CompletionItem> = BuiltinType::ALL
        .iter()
        .map(|builtin| CompletionItem::new(builtin.name(), Some(builtin.doc().to_string())))
        .collect();
    for document in workspace.documents.values() {
        for declaration in &document.file.type_declarations {
            if let Ok(name) = &declaration.name {
                items.push(CompletionItem::new(
                    name.value.as_str(),
                    Some("type".to_string()),
                ));
            }
        }
    }
    items
}

fn relation_name_items(workspace: &Workspace) -> Vec<CompletionItem> {
    let mut items = Vec::new();
    for document in workspace.documents.values() {
        for declaration in &document.file.relation_declarations {
            if let Ok(name) = &declaration.name {
                items.push(CompletionItem::new(name.value.as_str(), declaration.doc()));
            }
        }
    }
    items
}

/// Fallback: identifier-like words from the surrounding block, minus
/// names already offered through the other item pools.
fn word_items(workspace: &Workspace, text: &str, line: usize) -> Vec<CompletionItem> {
    let mut known = FxHashSet::default();
    for builtin in BuiltinType::ALL {
        known.insert(builtin.name().to_string());
    }
    for document in workspace.documents.values() {
        for declaration in &document.file.relation_declarations {
            if let Ok(name) = &declaration.name {
                known.insert(name.value.to_string());
            }
        }
        for declaration in &document.file.type_declarations {
            if let Ok(name) = &declaration.name {
                known.insert(name.value.to_string());
            }
            if let Ok(TypeExpression::Adt { branches, .. }) = &declaration.expression {
                for branch in branches {
                    if let Ok(name) = &branch.name {
                        known.insert(name.value.to_string());
                    }
                }
            }
        }
    }
    let mut words: Vec<String> = words_in_block(text, line)
        .into_iter()
        .filter(|word| !known.contains(word))
        .collect();
    words.sort();
    words
        .into_iter()
        .map(|word| CompletionItem::new(word, None))
        .collect()
}
