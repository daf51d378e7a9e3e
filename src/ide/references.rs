//! Find-references across the workspace.

use crate::analysis::{DeclRef, Workspace};
use crate::base::{Location, Position, Range};
use crate::syntax::{
    Argument, ArgumentKind, Atom, Clause, Disjunction, File, NodeRef, RuleHead, TypeExpression,
};

/// Every occurrence of the declaration named under `position`: the
/// declaration's own name plus all resolved references to it, across
/// all documents in insertion order.
pub(crate) fn references(workspace: &Workspace, uri: &str, position: Position) -> Vec<Location> {
    let Some(target) = declaration_at(workspace, uri, position) else {
        return Vec::new();
    };
    let mut locations = Vec::new();
    if let Some(location) = workspace.declaration_location(&target) {
        locations.push(location);
    }
    for document in workspace.documents.values() {
        for_each_reference_name(&document.file, &mut |declaration, range| {
            if declaration == Some(&target) {
                locations.push(Location::new(document.uri.clone(), range));
            }
        });
    }
    locations
}

/// The declaration under the cursor: either a declaration whose own
/// name covers the position, or the target of a resolved reference
/// covering it.
fn declaration_at(workspace: &Workspace, uri: &str, position: Position) -> Option<DeclRef> {
    let document = workspace.document(uri)?;
    let file = &document.file;

    for (index, declaration) in file.relation_declarations.iter().enumerate() {
        if declaration
            .name_range()
            .is_some_and(|range| range.covers(position))
        {
            return Some(DeclRef::Relation {
                uri: document.uri.clone(),
                index,
            });
        }
    }
    for (type_index, declaration) in file.type_declarations.iter().enumerate() {
        if declaration
            .name_range()
            .is_some_and(|range| range.covers(position))
        {
            return Some(DeclRef::Type {
                uri: document.uri.clone(),
                index: type_index,
            });
        }
        if let Ok(TypeExpression::Adt { branches, .. }) = &declaration.expression {
            for (branch_index, branch) in branches.iter().enumerate() {
                if branch
                    .name_range()
                    .is_some_and(|range| range.covers(position))
                {
                    return Some(DeclRef::Branch {
                        uri: document.uri.clone(),
                        type_index,
                        branch_index,
                    });
                }
            }
        }
    }

    let mut node = NodeRef::File(file);
    loop {
        match node {
            NodeRef::RelationReferenceName(name) => return name.declaration.clone(),
            NodeRef::TypeReferenceName(name) => return name.declaration.clone(),
            NodeRef::BranchInitName(name) => return name.declaration.clone(),
            _ => node = node.child_at(position)?,
        }
    }
}

/// Visit every reference name in the file with its binding and range.
fn for_each_reference_name(
    file: &File,
    visit: &mut impl FnMut(Option<&DeclRef>, Range),
) {
    for declaration in &file.relation_declarations {
        for attribute in &declaration.attributes {
            if let Ok(type_reference) = &attribute.ty {
                if let Ok(name) = &type_reference.name {
                    visit(name.declaration.as_ref(), name.range);
                }
            }
        }
    }
    for declaration in &file.type_declarations {
        if let Ok(expression) = &declaration.expression {
            visit_type_expression(expression, visit);
        }
    }
    for atom in file.facts.iter().flatten() {
        visit_atom_names(atom, visit);
    }
    for rule in &file.rules {
        for head in &rule.heads {
            match head {
                RuleHead::Plain { atoms, .. } => {
                    for atom in atoms.iter().flatten() {
                        visit_atom_names(atom, visit);
                    }
                }
                RuleHead::Subsumption { first, second, .. } => {
                    for atom in [first, second].into_iter().flatten() {
                        visit_atom_names(atom, visit);
                    }
                }
            }
        }
        if let Ok(body) = &rule.body {
            visit_disjunction(body, visit);
        }
    }
    for directive in &file.directives {
        for name in &directive.relation_names {
            visit(name.declaration.as_ref(), name.range);
        }
    }
}

fn visit_type_expression(
    expression: &TypeExpression,
    visit: &mut impl FnMut(Option<&DeclRef>, Range),
) {
    match expression {
        TypeExpression::Union { types, .. } => {
            for type_reference in types {
                if let Ok(name) = &type_reference.name {
                    visit(name.declaration.as_ref(), name.range);
                }
            }
        }
        TypeExpression::Record { attributes, .. } => {
            for attribute in attributes {
                if let Ok(type_reference) = &attribute.ty {
                    if let Ok(name) = &type_reference.name {
                        visit(name.declaration.as_ref(), name.range);
                    }
                }
            }
        }
        TypeExpression::Adt { branches, .. } => {
            for branch in branches {
                for attribute in &branch.attributes {
                    if let Ok(type_reference) = &attribute.ty {
                        if let Ok(name) = &type_reference.name {
                            visit(name.declaration.as_ref(), name.range);
                        }
                    }
                }
            }
        }
    }
}

fn visit_atom_names(
    atom: &Atom,
    visit: &mut impl FnMut(Option<&DeclRef>, Range),
) {
    if let Ok(name) = &atom.name {
        visit(name.declaration.as_ref(), name.range);
    }
    for argument in &atom.arguments {
        visit_argument_names(argument, visit);
    }
}

fn visit_argument_names(
    argument: &Argument,
    visit: &mut impl FnMut(Option<&DeclRef>, Range),
) {
    match &argument.kind {
        ArgumentKind::RecordInit { arguments } => {
            for argument in arguments {
                visit_argument_names(argument, visit);
            }
        }
        ArgumentKind::BranchInit { name, arguments } => {
            if let Ok(name) = name {
                visit(name.declaration.as_ref(), name.range);
            }
            for argument in arguments {
                visit_argument_names(argument, visit);
            }
        }
        ArgumentKind::BinaryOperation { lhs, rhs, .. } => {
            for side in [&**lhs, &**rhs] {
                if let Ok(argument) = side {
                    visit_argument_names(argument, visit);
                }
            }
        }
        ArgumentKind::Constant(_) | ArgumentKind::Variable { .. } => {}
    }
}

fn visit_disjunction(
    disjunction: &Disjunction,
    visit: &mut impl FnMut(Option<&DeclRef>, Range),
) {
    for conjunction in &disjunction.conjunctions {
        for clause in &conjunction.clauses {
            let Ok(inner) = &clause.inner else { continue };
            match inner {
                Clause::Atom(atom) => visit_atom_names(atom, visit),
                Clause::Constraint(constraint) => {
                    for side in [&constraint.lhs, &constraint.rhs] {
                        if let Ok(argument) = side {
                            visit_argument_names(argument, visit);
                        }
                    }
                }
                Clause::Nested(nested) => visit_disjunction(nested, visit),
            }
        }
    }
}
