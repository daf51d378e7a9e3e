//! Hover documentation lookup.

use crate::analysis::Workspace;
use crate::base::{Position, Range};
use crate::syntax::{BuiltinType, NodeRef};

/// Documentation for the name under `position`, with the exact range
/// of that name.
pub(crate) fn hover(
    workspace: &Workspace,
    uri: &str,
    position: Position,
) -> Option<(String, Range)> {
    let document = workspace.document(uri)?;
    let mut node = NodeRef::File(&document.file);
    loop {
        match node {
            NodeRef::TypeReferenceName(name) => {
                let single = name.single()?;
                let builtin = BuiltinType::from_name(&single.value)?;
                return Some((builtin.doc().to_string(), name.range));
            }
            NodeRef::RelationReferenceName(name) => {
                let declaration = name.declaration.as_ref()?;
                let doc = workspace.declaration_doc(declaration).unwrap_or_default();
                return Some((doc, name.range));
            }
            NodeRef::BranchInitName(name) => {
                let declaration = name.declaration.as_ref()?;
                let doc = workspace.declaration_doc(declaration).unwrap_or_default();
                return Some((doc, name.range));
            }
            _ => node = node.child_at(position)?,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{resolve, Workspace};
    use std::sync::Arc;

    fn workspace(text: &str) -> Workspace {
        let mut workspace = Workspace::new();
        workspace.sync(Arc::from("test.dl"), text.to_string());
        resolve(&mut workspace);
        workspace
    }

    #[test]
    fn test_hover_builtin_type() {
        let workspace = workspace(".decl foo(x: number)");
        let (doc, range) = hover(&workspace, "test.dl", Position::new(0, 13)).unwrap();
        assert_eq!(doc, "Type `number`. Each value is a signed integer.");
        assert_eq!(range, Range::from_coords(0, 13, 0, 19));
    }

    #[test]
    fn test_hover_relation_reference() {
        let workspace = workspace("/// Reachable pairs.\n.decl foo(x: number)\nfoo(1).");
        let (doc, _) = hover(&workspace, "test.dl", Position::new(2, 1)).unwrap();
        assert!(doc.contains("Reachable pairs."));
        assert!(doc.contains("foo(x: number)"));
    }

    #[test]
    fn test_hover_undocumented_relation_is_empty() {
        let workspace = workspace(".decl foo(x: number)\nfoo(1).");
        let (doc, _) = hover(&workspace, "test.dl", Position::new(1, 1)).unwrap();
        assert!(doc.contains("foo(x: number)"));
    }

    #[test]
    fn test_hover_on_nothing() {
        let workspace = workspace(".decl foo(x: number)\n\nfoo(1).");
        assert!(hover(&workspace, "test.dl", Position::new(1, 0)).is_none());
    }

    #[test]
    fn test_hover_unresolved_reference() {
        let workspace = workspace("bar(1).");
        assert!(hover(&workspace, "test.dl", Position::new(0, 1)).is_none());
    }

    #[test]
    fn test_hover_range_is_name_only() {
        let workspace = workspace(".decl foo(x: number)\nfoo(1).");
        let (_, range) = hover(&workspace, "test.dl", Position::new(1, 1)).unwrap();
        assert_eq!(range, Range::from_coords(1, 0, 1, 3));
    }
}
