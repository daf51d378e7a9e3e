//! Semantic checks run after resolution.
//!
//! One diagnostic kind today: arity mismatch between an atom and the
//! relation it resolved to. Atoms whose relation did not resolve are
//! silently skipped.

use crate::base::Range;
use crate::syntax::{Atom, Clause, Disjunction, File, RuleHead};

use super::workspace::Workspace;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub range: Range,
    pub message: String,
    pub severity: Severity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
}

/// Check one document. Diagnostics are fully recomputed, never
/// patched.
pub fn check(workspace: &Workspace, uri: &str) -> Vec<Diagnostic> {
    let Some(document) = workspace.document(uri) else {
        return Vec::new();
    };
    let mut diagnostics = Vec::new();
    for_each_atom(&document.file, &mut |atom| {
        check_arity(workspace, atom, &mut diagnostics);
    });
    diagnostics
}

fn check_arity(workspace: &Workspace, atom: &Atom, diagnostics: &mut Vec<Diagnostic>) {
    let Ok(name) = &atom.name else { return };
    let Some(declaration) = &name.declaration else {
        return;
    };
    let Some(relation) = workspace.relation(declaration) else {
        return;
    };
    let have = atom.arguments.len();
    let want = relation.attributes.len();
    if have != want {
        diagnostics.push(Diagnostic {
            range: atom.range,
            message: format!("Number of arguments: have {have}, want {want}."),
            severity: Severity::Error,
        });
    }
}

/// Immutable counterpart of [`super::infer::for_each_atom_mut`].
fn for_each_atom(file: &File, f: &mut impl FnMut(&Atom)) {
    for fact in file.facts.iter().filter_map(|fact| fact.as_ref().ok()) {
        f(fact);
    }
    for rule in &file.rules {
        for head in &rule.heads {
            match head {
                RuleHead::Plain { atoms, .. } => {
                    for atom in atoms.iter().filter_map(|a| a.as_ref().ok()) {
                        f(atom);
                    }
                }
                RuleHead::Subsumption { first, second, .. } => {
                    if let Ok(atom) = first {
                        f(atom);
                    }
                    if let Ok(atom) = second {
                        f(atom);
                    }
                }
            }
        }
        if let Ok(body) = &rule.body {
            disjunction_atoms(body, f);
        }
    }
}

fn disjunction_atoms(disjunction: &Disjunction, f: &mut impl FnMut(&Atom)) {
    for conjunction in &disjunction.conjunctions {
        for clause in &conjunction.clauses {
            match &clause.inner {
                Ok(Clause::Atom(atom)) => f(atom),
                Ok(Clause::Nested(nested)) => disjunction_atoms(nested, f),
                _ => {}
            }
        }
    }
}
