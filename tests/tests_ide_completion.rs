//! IDE Tests - Completion Heuristics
//!
//! Completion works on the raw text around the cursor, so the cases
//! here deliberately use half-typed programs.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use rstest::rstest;
use stratum::ide::CompletionItem;
use stratum::{AnalysisContext, Position};

fn context(text: &str) -> AnalysisContext {
    let mut context = AnalysisContext::new();
    context.sync_document(Arc::from("test.dl"), text.into());
    context
}

fn labels(items: &[CompletionItem]) -> Vec<String> {
    items.iter().map(|item| item.label.clone()).collect()
}

// ============================================================================
// Dot trigger: directive keywords
// ============================================================================

#[test]
fn test_dot_at_line_start_offers_directives() {
    let context = context(".decl foo(x: number)\n.");
    let items = context.completions("test.dl", Position::new(1, 1), Some('.'));
    assert_eq!(labels(&items), vec!["input", "output", "decl", "type"]);
    let docs: Vec<_> = items
        .iter()
        .map(|item| item.documentation.as_deref().unwrap())
        .collect();
    assert_eq!(
        docs,
        vec![
            "input directive",
            "output directive",
            "relation declaration directive",
            "type declaration directive",
        ]
    );
}

#[test]
fn test_dot_after_whitespace_offers_directives() {
    let context = context("   .");
    let items = context.completions("test.dl", Position::new(0, 4), Some('.'));
    assert_eq!(items.len(), 4);
}

#[test]
fn test_dot_ending_a_fact_offers_nothing() {
    let context = context(".decl foo(x: number)\nfoo(1).");
    let items = context.completions("test.dl", Position::new(1, 7), Some('.'));
    assert!(items.is_empty());
}

// ============================================================================
// Typed-text heuristics
// ============================================================================

#[rstest]
#[case(".output ", 1, 8)]
#[case(".input ", 1, 7)]
#[case(".printsize ", 1, 11)]
fn test_io_directives_offer_relation_names(
    #[case] line: &str,
    #[case] cursor_line: u32,
    #[case] cursor_char: u32,
) {
    let text = format!(".decl foo(x: number)\n{line}");
    let context = context(&text);
    let items = context.completions(
        "test.dl",
        Position::new(cursor_line, cursor_char),
        None,
    );
    assert_eq!(labels(&items), vec!["foo"]);
}

#[test]
fn test_relation_completion_carries_doc() {
    let context = context("/// Edges.\n.decl edge(a: number, b: number)\n.output ");
    let items = context.completions("test.dl", Position::new(2, 8), None);
    assert_eq!(items.len(), 1);
    assert!(items[0].documentation.as_deref().unwrap().contains("Edges."));
}

#[rstest]
// After a rule-body separator at bracket depth zero.
#[case(".decl edge(a: number, b: number)\npath(x, y) :- ", 1, 14)]
// After a completed clause and comma.
#[case(".decl edge(a: number, b: number)\npath(x, y) :- edge(x, y), ", 1, 26)]
fn test_clause_positions_offer_relation_names(
    #[case] text: &str,
    #[case] cursor_line: u32,
    #[case] cursor_char: u32,
) {
    let context = context(text);
    let items = context.completions(
        "test.dl",
        Position::new(cursor_line, cursor_char),
        None,
    );
    assert!(labels(&items).contains(&"edge".to_string()));
}

#[test]
fn test_colon_offers_builtin_and_declared_types() {
    let context = context(".type id <: symbol\n.decl foo(x: ");
    let items = context.completions("test.dl", Position::new(1, 13), None);
    let labels = labels(&items);
    for builtin in ["symbol", "number", "unsigned", "float"] {
        assert!(labels.contains(&builtin.to_string()), "missing {builtin}");
    }
    assert!(labels.contains(&"id".to_string()));
    let id = items.iter().find(|item| item.label == "id").unwrap();
    assert_eq!(id.documentation.as_deref(), Some("type"));
}

#[test]
fn test_builtin_type_completion_carries_doc() {
    let context = context(".decl foo(x: ");
    let items = context.completions("test.dl", Position::new(0, 13), None);
    let number = items.iter().find(|item| item.label == "number").unwrap();
    assert_eq!(
        number.documentation.as_deref(),
        Some("Type `number`. Each value is a signed integer.")
    );
}

#[test]
fn test_inside_arguments_offers_nearby_words() {
    let context = context(
        ".decl edge(a: number, b: number)\n\
         path(x, y) :- edge(x, y), edge(y, ",
    );
    let items = context.completions("test.dl", Position::new(1, 34), None);
    let labels = labels(&items);
    assert!(labels.contains(&"x".to_string()));
    assert!(labels.contains(&"y".to_string()));
    // Known declaration and type names are offered elsewhere, not here.
    assert!(!labels.contains(&"edge".to_string()));
    assert!(!labels.contains(&"number".to_string()));
}

#[test]
fn test_word_pool_is_limited_to_the_block() {
    let context = context("first(a, b).\n\nsecond(c, ");
    let items = context.completions("test.dl", Position::new(2, 10), None);
    let labels = labels(&items);
    assert!(labels.contains(&"c".to_string()));
    assert!(!labels.contains(&"a".to_string()));
}
