//! Declaration resolution across the whole workspace.
//!
//! Two phases on every sync: build a name index over all documents in
//! insertion order (first exact match wins), then rewrite the
//! `declaration` slot of every reference name. Only single-segment
//! names resolve; multi-segment qualified names stay `None`, which is
//! a documented limitation rather than an error.

use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use tracing::debug;

use crate::syntax::{
    Argument, ArgumentKind, Atom, BranchInitName, Clause, DeclRef, Disjunction, File,
    RelationReferenceName, RuleHead, TypeExpression, TypeReference, TypeReferenceName,
};

use super::workspace::Workspace;

/// Re-resolve every reference name in the workspace. Idempotent.
pub fn resolve(workspace: &mut Workspace) {
    let index = DeclIndex::build(workspace);
    debug!(
        relations = index.relations.len(),
        types = index.types.len(),
        branches = index.branches.len(),
        "resolving references"
    );
    for document in workspace.documents.values_mut() {
        bind_file(&mut document.file, &index);
    }
}

#[derive(Default)]
struct DeclIndex {
    relations: FxHashMap<SmolStr, DeclRef>,
    types: FxHashMap<SmolStr, DeclRef>,
    branches: FxHashMap<SmolStr, DeclRef>,
}

impl DeclIndex {
    fn build(workspace: &Workspace) -> Self {
        let mut index = DeclIndex::default();
        for (uri, document) in &workspace.documents {
            for (i, declaration) in document.file.relation_declarations.iter().enumerate() {
                if let Ok(name) = &declaration.name {
                    index.relations.entry(name.value.clone()).or_insert(
                        DeclRef::Relation {
                            uri: uri.clone(),
                            index: i,
                        },
                    );
                }
            }
            for (i, declaration) in document.file.type_declarations.iter().enumerate() {
                if let Ok(name) = &declaration.name {
                    index.types.entry(name.value.clone()).or_insert(DeclRef::Type {
                        uri: uri.clone(),
                        index: i,
                    });
                }
                if let Ok(TypeExpression::Adt { branches, .. }) = &declaration.expression {
                    for (j, branch) in branches.iter().enumerate() {
                        if let Ok(name) = &branch.name {
                            index.branches.entry(name.value.clone()).or_insert(
                                DeclRef::Branch {
                                    uri: uri.clone(),
                                    type_index: i,
                                    branch_index: j,
                                },
                            );
                        }
                    }
                }
            }
        }
        index
    }
}

fn bind_file(file: &mut File, index: &DeclIndex) {
    for declaration in &mut file.relation_declarations {
        for attribute in &mut declaration.attributes {
            if let Ok(ty) = &mut attribute.ty {
                bind_type_reference(ty, index);
            }
        }
    }
    for declaration in &mut file.type_declarations {
        if let Ok(expression) = &mut declaration.expression {
            bind_type_expression(expression, index);
        }
    }
    for fact in &mut file.facts {
        if let Ok(atom) = fact {
            bind_atom(atom, index);
        }
    }
    for rule in &mut file.rules {
        for head in &mut rule.heads {
            match head {
                RuleHead::Plain { atoms, .. } => {
                    for atom in atoms.iter_mut().filter_map(|a| a.as_mut().ok()) {
                        bind_atom(atom, index);
                    }
                }
                RuleHead::Subsumption { first, second, .. } => {
                    if let Ok(atom) = first {
                        bind_atom(atom, index);
                    }
                    if let Ok(atom) = second {
                        bind_atom(atom, index);
                    }
                }
            }
        }
        if let Ok(body) = &mut rule.body {
            bind_disjunction(body, index);
        }
    }
    for directive in &mut file.directives {
        for name in &mut directive.relation_names {
            bind_relation_name(name, index);
        }
    }
}

fn bind_type_expression(expression: &mut TypeExpression, index: &DeclIndex) {
    match expression {
        TypeExpression::Union { types, .. } => {
            for reference in types {
                bind_type_reference(reference, index);
            }
        }
        TypeExpression::Record { attributes, .. } => {
            for attribute in attributes {
                if let Ok(ty) = &mut attribute.ty {
                    bind_type_reference(ty, index);
                }
            }
        }
        TypeExpression::Adt { branches, .. } => {
            for branch in branches {
                for attribute in &mut branch.attributes {
                    if let Ok(ty) = &mut attribute.ty {
                        bind_type_reference(ty, index);
                    }
                }
            }
        }
    }
}

fn bind_type_reference(reference: &mut TypeReference, index: &DeclIndex) {
    if let Ok(name) = &mut reference.name {
        bind_type_name(name, index);
    }
}

fn bind_type_name(name: &mut TypeReferenceName, index: &DeclIndex) {
    name.declaration = name
        .single()
        .and_then(|part| index.types.get(&part.value))
        .cloned();
}

fn bind_relation_name(name: &mut RelationReferenceName, index: &DeclIndex) {
    name.declaration = name
        .single()
        .and_then(|part| index.relations.get(&part.value))
        .cloned();
}

fn bind_branch_name(name: &mut BranchInitName, index: &DeclIndex) {
    name.declaration = name
        .single()
        .and_then(|part| index.branches.get(&part.value))
        .cloned();
}

fn bind_atom(atom: &mut Atom, index: &DeclIndex) {
    if let Ok(name) = &mut atom.name {
        bind_relation_name(name, index);
    }
    for argument in &mut atom.arguments {
        bind_argument(argument, index);
    }
}

fn bind_argument(argument: &mut Argument, index: &DeclIndex) {
    match &mut argument.kind {
        ArgumentKind::Constant(_) | ArgumentKind::Variable { .. } => {}
        ArgumentKind::RecordInit { arguments } => {
            for argument in arguments {
                bind_argument(argument, index);
            }
        }
        ArgumentKind::BranchInit { name, arguments } => {
            if let Ok(name) = name {
                bind_branch_name(name, index);
            }
            for argument in arguments {
                bind_argument(argument, index);
            }
        }
        ArgumentKind::BinaryOperation { lhs, rhs, .. } => {
            if let Ok(lhs) = lhs.as_mut() {
                bind_argument(lhs, index);
            }
            if let Ok(rhs) = rhs.as_mut() {
                bind_argument(rhs, index);
            }
        }
    }
}

fn bind_disjunction(disjunction: &mut Disjunction, index: &DeclIndex) {
    for conjunction in &mut disjunction.conjunctions {
        for clause in &mut conjunction.clauses {
            match &mut clause.inner {
                Ok(Clause::Atom(atom)) => bind_atom(atom, index),
                Ok(Clause::Constraint(constraint)) => {
                    if let Ok(lhs) = &mut constraint.lhs {
                        bind_argument(lhs, index);
                    }
                    if let Ok(rhs) = &mut constraint.rhs {
                        bind_argument(rhs, index);
                    }
                }
                Ok(Clause::Nested(nested)) => bind_disjunction(nested, index),
                Err(_) => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn workspace_of(files: &[(&str, &str)]) -> Workspace {
        let mut workspace = Workspace::new();
        for (uri, text) in files {
            workspace.sync(Arc::from(*uri), text.to_string());
        }
        workspace
    }

    fn first_body_atom_decl(workspace: &Workspace, uri: &str) -> Option<DeclRef> {
        let rule = &workspace.document(uri).unwrap().file.rules[0];
        let body = rule.body.as_ref().unwrap();
        let Ok(Clause::Atom(atom)) = &body.conjunctions[0].clauses[0].inner else {
            panic!("expected atom clause");
        };
        atom.name.as_ref().unwrap().declaration.clone()
    }

    #[test]
    fn test_resolves_relation_reference_in_same_file() {
        let mut workspace = workspace_of(&[(
            "a.dl",
            ".decl edge(a: number, b: number)\npath(x, y) :- edge(x, y).",
        )]);
        resolve(&mut workspace);
        assert_eq!(
            first_body_atom_decl(&workspace, "a.dl"),
            Some(DeclRef::Relation {
                uri: Arc::from("a.dl"),
                index: 0,
            })
        );
    }

    #[test]
    fn test_resolves_across_files_first_match_wins() {
        let mut workspace = workspace_of(&[
            ("a.dl", ".decl edge(a: number, b: number)"),
            ("b.dl", ".decl edge(a: symbol)\np(x) :- edge(x, x)."),
        ]);
        resolve(&mut workspace);
        assert_eq!(
            first_body_atom_decl(&workspace, "b.dl"),
            Some(DeclRef::Relation {
                uri: Arc::from("a.dl"),
                index: 0,
            })
        );
    }

    #[test]
    fn test_unresolved_reference_stays_none() {
        let mut workspace = workspace_of(&[("a.dl", "p(x) :- missing(x).")]);
        resolve(&mut workspace);
        assert_eq!(first_body_atom_decl(&workspace, "a.dl"), None);
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let mut workspace = workspace_of(&[(
            "a.dl",
            ".decl edge(a: number, b: number)\n.type T <: number\npath(x, y) :- edge(x, y).",
        )]);
        resolve(&mut workspace);
        let first = workspace.clone();
        resolve(&mut workspace);
        assert_eq!(
            workspace.document("a.dl").unwrap().file,
            first.document("a.dl").unwrap().file
        );
    }

    #[test]
    fn test_type_reference_in_attribute_resolves() {
        let mut workspace =
            workspace_of(&[("a.dl", ".type Node <: symbol\n.decl edge(a: Node)")]);
        resolve(&mut workspace);
        let file = &workspace.document("a.dl").unwrap().file;
        let ty = file.relation_declarations[0].attributes[0]
            .ty
            .as_ref()
            .unwrap();
        assert_eq!(
            ty.name.as_ref().unwrap().declaration,
            Some(DeclRef::Type {
                uri: Arc::from("a.dl"),
                index: 0,
            })
        );
    }

    #[test]
    fn test_branch_init_resolves() {
        let mut workspace = workspace_of(&[(
            "a.dl",
            ".type T = Leaf {} | Pair {a: number, b: number}\nt($Pair(1, 2)).",
        )]);
        resolve(&mut workspace);
        let file = &workspace.document("a.dl").unwrap().file;
        let fact = file.facts[0].as_ref().unwrap();
        let ArgumentKind::BranchInit { name, .. } = &fact.arguments[0].kind else {
            panic!("expected branch init");
        };
        assert_eq!(
            name.as_ref().unwrap().declaration,
            Some(DeclRef::Branch {
                uri: Arc::from("a.dl"),
                type_index: 0,
                branch_index: 1,
            })
        );
    }
}
