//! Definition and type-definition navigation.

use crate::analysis::Workspace;
use crate::base::{Location, Position};
use crate::syntax::{ArgType, ArgumentKind, BuiltinType, NodeRef};

/// Location of the declaration named under `position`.
///
/// Builtin type names have no declaration and yield nothing.
pub(crate) fn definition(
    workspace: &Workspace,
    uri: &str,
    position: Position,
) -> Option<Location> {
    let document = workspace.document(uri)?;
    let mut node = NodeRef::File(&document.file);
    loop {
        match node {
            NodeRef::RelationReferenceName(name) => {
                return workspace.declaration_location(name.declaration.as_ref()?);
            }
            NodeRef::TypeReferenceName(name) => {
                if let Some(single) = name.single() {
                    if BuiltinType::from_name(&single.value).is_some() {
                        return None;
                    }
                }
                return workspace.declaration_location(name.declaration.as_ref()?);
            }
            NodeRef::BranchInitName(name) => {
                return workspace.declaration_location(name.declaration.as_ref()?);
            }
            _ => node = node.child_at(position)?,
        }
    }
}

/// Location of the type declaration behind the argument under
/// `position`, using the positionally inferred argument types.
pub(crate) fn type_definition(
    workspace: &Workspace,
    uri: &str,
    position: Position,
) -> Option<Location> {
    let document = workspace.document(uri)?;
    let mut node = NodeRef::File(&document.file);
    loop {
        match node {
            NodeRef::Atom(atom) => {
                for argument in &atom.arguments {
                    if !argument.range.covers(position) {
                        continue;
                    }
                    if !matches!(
                        argument.kind,
                        ArgumentKind::Constant(_) | ArgumentKind::Variable { .. }
                    ) {
                        continue;
                    }
                    if let ArgType::Declared(declaration) = &argument.ty {
                        return workspace.declaration_location(declaration);
                    }
                }
                return None;
            }
            NodeRef::TypeReferenceName(name) => {
                return workspace.declaration_location(name.declaration.as_ref()?);
            }
            _ => node = node.child_at(position)?,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{infer, resolve, Workspace};
    use crate::base::Range;
    use std::sync::Arc;

    fn workspace(text: &str) -> Workspace {
        let mut workspace = Workspace::new();
        workspace.sync(Arc::from("test.dl"), text.to_string());
        resolve(&mut workspace);
        infer(&mut workspace);
        workspace
    }

    #[test]
    fn test_definition_of_relation_reference() {
        let workspace = workspace(".decl foo(x: number)\nfoo(1).");
        let location = definition(&workspace, "test.dl", Position::new(1, 1)).unwrap();
        assert_eq!(&*location.uri, "test.dl");
        assert_eq!(location.range, Range::from_coords(0, 6, 0, 9));
    }

    #[test]
    fn test_definition_of_builtin_type_is_none() {
        let workspace = workspace(".decl foo(x: number)");
        assert!(definition(&workspace, "test.dl", Position::new(0, 13)).is_none());
    }

    #[test]
    fn test_definition_of_declared_type() {
        let workspace = workspace(".type id <: symbol\n.decl foo(x: id)");
        let location = definition(&workspace, "test.dl", Position::new(1, 13)).unwrap();
        assert_eq!(location.range, Range::from_coords(0, 6, 0, 8));
    }

    #[test]
    fn test_type_definition_of_fact_argument() {
        let workspace = workspace(".type id <: symbol\n.decl foo(x: id)\nfoo(1).");
        let location = type_definition(&workspace, "test.dl", Position::new(2, 4)).unwrap();
        assert_eq!(location.range, Range::from_coords(0, 6, 0, 8));
    }

    #[test]
    fn test_type_definition_of_builtin_argument_is_none() {
        let workspace = workspace(".decl foo(x: number)\nfoo(1).");
        assert!(type_definition(&workspace, "test.dl", Position::new(1, 4)).is_none());
    }

    #[test]
    fn test_type_definition_on_arity_mismatch_is_none() {
        let workspace = workspace(".type id <: symbol\n.decl foo(x: id)\nfoo(1, 2).");
        assert!(type_definition(&workspace, "test.dl", Position::new(2, 4)).is_none());
    }
}
