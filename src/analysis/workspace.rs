//! The document store and the global declaration namespace.

use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

use crate::base::Location;
use crate::syntax::{
    parse_file, AdtBranch, DeclRef, File, RelationDeclaration, TypeDeclaration,
};

/// One synced source file: its raw text and its lowered AST.
#[derive(Debug, Clone)]
pub struct Document {
    pub uri: Arc<str>,
    pub text: String,
    pub file: File,
}

/// All open documents, keyed by URI. Declarations in any document are
/// visible from references in every other document. Insertion order is
/// preserved so that first-match-wins resolution and reference
/// collection are deterministic.
#[derive(Debug, Clone, Default)]
pub struct Workspace {
    pub documents: IndexMap<Arc<str>, Document>,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace (or add) a document with new full text and re-lower it.
    /// Resolution and inference are invalidated until rerun.
    pub fn sync(&mut self, uri: Arc<str>, text: String) {
        debug!(uri = %uri, len = text.len(), "sync document");
        let file = parse_file(&text);
        self.documents.insert(
            uri.clone(),
            Document { uri, text, file },
        );
    }

    pub fn document(&self, uri: &str) -> Option<&Document> {
        self.documents.get(uri)
    }

    /// Resolve a declaration handle back to a relation declaration.
    pub fn relation(&self, decl: &DeclRef) -> Option<&RelationDeclaration> {
        let DeclRef::Relation { uri, index } = decl else {
            return None;
        };
        self.documents
            .get(uri.as_ref())?
            .file
            .relation_declarations
            .get(*index)
    }

    pub fn type_declaration(&self, decl: &DeclRef) -> Option<&TypeDeclaration> {
        let DeclRef::Type { uri, index } = decl else {
            return None;
        };
        self.documents
            .get(uri.as_ref())?
            .file
            .type_declarations
            .get(*index)
    }

    pub fn adt_branch(&self, decl: &DeclRef) -> Option<&AdtBranch> {
        let DeclRef::Branch {
            uri,
            type_index,
            branch_index,
        } = decl
        else {
            return None;
        };
        let type_declaration = self
            .documents
            .get(uri.as_ref())?
            .file
            .type_declarations
            .get(*type_index)?;
        let Ok(crate::syntax::TypeExpression::Adt { branches, .. }) = &type_declaration.expression
        else {
            return None;
        };
        branches.get(*branch_index)
    }

    /// Location of the declaration's name token, the canonical
    /// definition target.
    pub fn declaration_location(&self, decl: &DeclRef) -> Option<Location> {
        let range = match decl {
            DeclRef::Relation { .. } => self.relation(decl)?.name_range(),
            DeclRef::Type { .. } => self.type_declaration(decl)?.name_range(),
            DeclRef::Branch { .. } => self.adt_branch(decl)?.name_range(),
        }?;
        Some(Location::new(decl.uri().clone(), range))
    }

    /// Composed doc string of the declaration the handle points at.
    pub fn declaration_doc(&self, decl: &DeclRef) -> Option<String> {
        match decl {
            DeclRef::Relation { .. } => self.relation(decl)?.doc(),
            DeclRef::Branch { .. } => self.adt_branch(decl)?.doc(),
            DeclRef::Type { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uri(s: &str) -> Arc<str> {
        Arc::from(s)
    }

    #[test]
    fn test_sync_replaces_document() {
        let mut workspace = Workspace::new();
        workspace.sync(uri("a.dl"), ".decl p(x: number)".to_string());
        workspace.sync(uri("a.dl"), ".decl q(x: number)".to_string());
        assert_eq!(workspace.documents.len(), 1);
        let file = &workspace.document("a.dl").unwrap().file;
        assert_eq!(
            file.relation_declarations[0].name.as_ref().unwrap().value,
            "q"
        );
    }

    #[test]
    fn test_decl_ref_lookup() {
        let mut workspace = Workspace::new();
        workspace.sync(
            uri("a.dl"),
            ".decl p(x: number)\n.type T = Leaf {} | Pair {a: T, b: T}".to_string(),
        );
        let relation = DeclRef::Relation {
            uri: uri("a.dl"),
            index: 0,
        };
        assert_eq!(
            workspace
                .relation(&relation)
                .unwrap()
                .signature()
                .as_deref(),
            Some("p(x: number)")
        );
        let branch = DeclRef::Branch {
            uri: uri("a.dl"),
            type_index: 0,
            branch_index: 1,
        };
        assert_eq!(
            workspace.adt_branch(&branch).unwrap().signature().as_deref(),
            Some("Pair {a: T, b: T}")
        );
        assert!(workspace.relation(&branch).is_none());
    }

    #[test]
    fn test_stale_decl_ref_fails_soft() {
        let mut workspace = Workspace::new();
        workspace.sync(uri("a.dl"), ".decl p(x: number)".to_string());
        let stale = DeclRef::Relation {
            uri: uri("a.dl"),
            index: 7,
        };
        assert!(workspace.relation(&stale).is_none());
        assert!(workspace.declaration_location(&stale).is_none());
    }
}
