//! Code actions. Currently one: insert a doc comment template above an
//! undocumented relation declaration.

use crate::analysis::Workspace;
use crate::base::{Position, Range};
use crate::syntax::NodeRef;

/// A single text edit: replace `range` with the new text. Insertions
/// use an empty range.
pub type TextEdit = (Range, String);

pub(crate) fn code_actions(
    workspace: &Workspace,
    uri: &str,
    position: Position,
) -> Option<Vec<TextEdit>> {
    let document = workspace.document(uri)?;
    let mut node = NodeRef::File(&document.file);
    loop {
        match node {
            NodeRef::RelationDeclaration(declaration) => {
                if declaration.doc_text.is_some() {
                    return None;
                }
                let mut lines = vec!["///".to_string()];
                for attribute in &declaration.attributes {
                    let name = attribute.name.as_ref().ok()?;
                    lines.push(format!("/// @attribute {}", name.value));
                }
                lines.push(String::new());
                let insert_at = Range::at(declaration.range.start);
                return Some(vec![(insert_at, lines.join("\n"))]);
            }
            _ => node = node.child_at(position)?,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Workspace;
    use std::sync::Arc;

    fn workspace(text: &str) -> Workspace {
        let mut workspace = Workspace::new();
        workspace.sync(Arc::from("test.dl"), text.to_string());
        workspace
    }

    #[test]
    fn test_doc_template_for_undocumented_relation() {
        let workspace = workspace(".decl edge(from: number, to: number)");
        let edits = code_actions(&workspace, "test.dl", Position::new(0, 8)).unwrap();
        assert_eq!(edits.len(), 1);
        let (range, text) = &edits[0];
        assert_eq!(*range, Range::at(Position::new(0, 0)));
        assert_eq!(text, "///\n/// @attribute from\n/// @attribute to\n");
    }

    #[test]
    fn test_no_action_for_documented_relation() {
        let workspace = workspace("/// Already documented.\n.decl edge(from: number)");
        assert!(code_actions(&workspace, "test.dl", Position::new(1, 8)).is_none());
    }

    #[test]
    fn test_no_action_outside_declarations() {
        let workspace = workspace(".decl edge(from: number)\nedge(1).");
        assert!(code_actions(&workspace, "test.dl", Position::new(1, 2)).is_none());
    }
}
