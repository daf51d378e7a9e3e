//! Workspace Tests - Loading From Disk
//!
//! `load_workspace` walks a directory tree, loads every `.dl` file,
//! and resolves across all of them.

#![allow(clippy::unwrap_used)]

use std::fs;

use stratum::{AnalysisContext, Position};

#[test]
fn test_load_workspace_finds_nested_files() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("decls.dl"), ".decl foo(x: number)").unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();
    fs::write(dir.path().join("sub").join("facts.dl"), "foo(1).").unwrap();
    fs::write(dir.path().join("notes.txt"), "not a source file").unwrap();

    let mut context = AnalysisContext::new();
    let uris = context.load_workspace(dir.path()).unwrap();
    assert_eq!(uris.len(), 2);
    assert!(uris.iter().all(|uri| uri.ends_with(".dl")));
}

#[test]
fn test_loaded_files_resolve_across_each_other() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a_decls.dl"), ".decl foo(x: number)").unwrap();
    fs::write(dir.path().join("b_facts.dl"), "foo(1, 2).").unwrap();

    let mut context = AnalysisContext::new();
    let uris = context.load_workspace(dir.path()).unwrap();
    // Sorted path order: declarations load before facts.
    assert!(uris[0].ends_with("a_decls.dl"));

    let facts_uri = uris.iter().find(|uri| uri.ends_with("b_facts.dl")).unwrap();
    let diagnostics = context.diagnostics(facts_uri);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(
        diagnostics[0].message,
        "Number of arguments: have 2, want 1."
    );
}

#[test]
fn test_queries_work_after_loading() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a_decls.dl"), ".decl foo(x: number)").unwrap();
    fs::write(dir.path().join("b_facts.dl"), "foo(1).").unwrap();

    let mut context = AnalysisContext::new();
    let uris = context.load_workspace(dir.path()).unwrap();
    let facts_uri = uris.iter().find(|uri| uri.ends_with("b_facts.dl")).unwrap();
    let location = context.definition(facts_uri, Position::new(0, 1)).unwrap();
    assert!(location.uri.ends_with("a_decls.dl"));
}

#[test]
fn test_missing_directory_is_an_error() {
    let mut context = AnalysisContext::new();
    let result = context.load_workspace(std::path::Path::new("/nonexistent/workspace"));
    assert!(result.is_err());
}
