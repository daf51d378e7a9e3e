//! Positional type inference.
//!
//! A single linear pass, not unification: for every atom whose name
//! resolved to a relation with matching arity, each argument takes the
//! declared type of the attribute at the same position. Builtin type
//! names become `ArgType::Builtin`; names bound to a type declaration
//! become `ArgType::Declared`; everything else stays unresolved. All
//! `ty` slots are cleared and recomputed on every pass.

use rustc_hash::FxHashMap;

use crate::syntax::{
    ArgType, Atom, BuiltinType, Clause, DeclRef, Disjunction, File, RelationDeclaration,
    RuleHead,
};

use super::workspace::Workspace;

/// Re-infer argument types over the whole workspace. Must run after
/// resolution.
pub fn infer(workspace: &mut Workspace) {
    let signatures = relation_signatures(workspace);
    for document in workspace.documents.values_mut() {
        for_each_atom_mut(&mut document.file, &mut |atom| {
            assign_argument_types(atom, &signatures);
        });
    }
}

/// Declared attribute types per resolved relation.
fn relation_signatures(workspace: &Workspace) -> FxHashMap<DeclRef, Vec<ArgType>> {
    let mut signatures = FxHashMap::default();
    for (uri, document) in &workspace.documents {
        for (index, declaration) in document.file.relation_declarations.iter().enumerate() {
            let key = DeclRef::Relation {
                uri: uri.clone(),
                index,
            };
            signatures.insert(key, attribute_types(declaration));
        }
    }
    signatures
}

fn attribute_types(declaration: &RelationDeclaration) -> Vec<ArgType> {
    declaration
        .attributes
        .iter()
        .map(|attribute| {
            let Ok(reference) = &attribute.ty else {
                return ArgType::Unresolved;
            };
            let Ok(name) = &reference.name else {
                return ArgType::Unresolved;
            };
            if let Some(part) = name.single() {
                if let Some(builtin) = BuiltinType::from_name(&part.value) {
                    return ArgType::Builtin(builtin);
                }
            }
            match &name.declaration {
                Some(decl) => ArgType::Declared(decl.clone()),
                None => ArgType::Unresolved,
            }
        })
        .collect()
}

fn assign_argument_types(atom: &mut Atom, signatures: &FxHashMap<DeclRef, Vec<ArgType>>) {
    for argument in &mut atom.arguments {
        argument.ty = ArgType::Unresolved;
    }
    let Ok(name) = &atom.name else { return };
    let Some(declaration) = &name.declaration else {
        return;
    };
    let Some(types) = signatures.get(declaration) else {
        return;
    };
    // Arity mismatches are the checker's concern, not inference's.
    if types.len() != atom.arguments.len() {
        return;
    }
    for (argument, ty) in atom.arguments.iter_mut().zip(types) {
        argument.ty = ty.clone();
    }
}

/// Apply a closure to every atom in the file: facts, rule heads, and
/// body references, including nested disjunctions.
pub(crate) fn for_each_atom_mut(file: &mut File, f: &mut impl FnMut(&mut Atom)) {
    for fact in &mut file.facts {
        if let Ok(atom) = fact {
            f(atom);
        }
    }
    for rule in &mut file.rules {
        for head in &mut rule.heads {
            match head {
                RuleHead::Plain { atoms, .. } => {
                    for atom in atoms.iter_mut().filter_map(|a| a.as_mut().ok()) {
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
        if let Ok(body) = &mut rule.body {
            disjunction_atoms_mut(body, f);
        }
    }
}

fn disjunction_atoms_mut(disjunction: &mut Disjunction, f: &mut impl FnMut(&mut Atom)) {
    for conjunction in &mut disjunction.conjunctions {
        for clause in &mut conjunction.clauses {
            match &mut clause.inner {
                Ok(Clause::Atom(atom)) => f(atom),
                Ok(Clause::Nested(nested)) => disjunction_atoms_mut(nested, f),
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::super::resolve::resolve;
    use super::*;

    fn analyzed(text: &str) -> Workspace {
        let mut workspace = Workspace::new();
        workspace.sync(Arc::from("a.dl"), text.to_string());
        resolve(&mut workspace);
        infer(&mut workspace);
        workspace
    }

    fn fact_argument_types(workspace: &Workspace) -> Vec<ArgType> {
        let fact = workspace.document("a.dl").unwrap().file.facts[0]
            .as_ref()
            .unwrap();
        fact.arguments.iter().map(|a| a.ty.clone()).collect()
    }

    #[test]
    fn test_builtin_attribute_type() {
        let workspace = analyzed(".decl p(x: number, s: symbol)\np(1, \"a\").");
        assert_eq!(
            fact_argument_types(&workspace),
            vec![
                ArgType::Builtin(BuiltinType::Number),
                ArgType::Builtin(BuiltinType::Symbol),
            ]
        );
    }

    #[test]
    fn test_declared_attribute_type() {
        let workspace = analyzed(".type Node <: symbol\n.decl p(x: Node)\np(\"a\").");
        assert_eq!(
            fact_argument_types(&workspace),
            vec![ArgType::Declared(DeclRef::Type {
                uri: Arc::from("a.dl"),
                index: 0,
            })]
        );
    }

    #[test]
    fn test_arity_mismatch_leaves_arguments_unresolved() {
        let workspace = analyzed(".decl p(x: number)\np(1, 2).");
        assert_eq!(
            fact_argument_types(&workspace),
            vec![ArgType::Unresolved, ArgType::Unresolved]
        );
    }

    #[test]
    fn test_unknown_attribute_type_stays_unresolved() {
        let workspace = analyzed(".decl p(x: Mystery)\np(1).");
        assert_eq!(fact_argument_types(&workspace), vec![ArgType::Unresolved]);
    }

    #[test]
    fn test_rule_body_arguments_are_typed() {
        let workspace = analyzed(".decl edge(a: number, b: number)\np(x) :- edge(x, y).");
        let rule = &workspace.document("a.dl").unwrap().file.rules[0];
        let body = rule.body.as_ref().unwrap();
        let Ok(Clause::Atom(atom)) = &body.conjunctions[0].clauses[0].inner else {
            panic!("expected atom clause");
        };
        assert_eq!(atom.arguments[0].ty, ArgType::Builtin(BuiltinType::Number));
    }
}
