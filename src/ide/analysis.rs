//! The top-level analysis entry point.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::analysis::{check, infer, resolve, Diagnostic, Workspace};
use crate::base::{Location, Position, Range};

use super::code_action::{self, TextEdit};
use super::completion::{self, CompletionItem};
use super::goto;
use super::hover;
use super::references;

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Owns the workspace and keeps its analysis results current.
///
/// Every full-text sync reruns the pipeline: lower the changed
/// document, re-resolve declarations and re-infer argument types over
/// the whole workspace, then check the changed document. Queries never
/// mutate and fail soft: a position that does not land on anything
/// answerable yields `None` or an empty list.
///
/// # Usage
///
/// ```ignore
/// let mut context = AnalysisContext::new();
/// let diagnostics = context.sync_document(uri.clone(), text);
/// let hover = context.hover(&uri, position);
/// ```
#[derive(Debug, Default)]
pub struct AnalysisContext {
    workspace: Workspace,
}

impl AnalysisContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Replace a document's full text and return its diagnostics.
    pub fn sync_document(&mut self, uri: Arc<str>, text: String) -> Vec<Diagnostic> {
        self.workspace.sync(uri.clone(), text);
        resolve(&mut self.workspace);
        infer(&mut self.workspace);
        check(&self.workspace, &uri)
    }

    /// Load every `.dl` file under `root` into the workspace, then run
    /// resolution and inference once. Files are loaded in sorted path
    /// order so cross-file resolution is deterministic. Returns the
    /// loaded URIs.
    pub fn load_workspace(&mut self, root: &Path) -> Result<Vec<Arc<str>>, WorkspaceError> {
        let mut paths = Vec::new();
        collect_source_files(root, &mut paths)?;
        paths.sort();
        let mut uris = Vec::new();
        for path in paths {
            let text = std::fs::read_to_string(&path).map_err(|source| WorkspaceError::Io {
                path: path.clone(),
                source,
            })?;
            let uri: Arc<str> = Arc::from(path.display().to_string());
            self.workspace.sync(uri.clone(), text);
            uris.push(uri);
        }
        resolve(&mut self.workspace);
        infer(&mut self.workspace);
        info!(root = %root.display(), files = uris.len(), "loaded workspace");
        Ok(uris)
    }

    pub fn diagnostics(&self, uri: &str) -> Vec<Diagnostic> {
        check(&self.workspace, uri)
    }

    pub fn hover(&self, uri: &str, position: Position) -> Option<(String, Range)> {
        hover::hover(&self.workspace, uri, position)
    }

    pub fn definition(&self, uri: &str, position: Position) -> Option<Location> {
        goto::definition(&self.workspace, uri, position)
    }

    pub fn type_definition(&self, uri: &str, position: Position) -> Option<Location> {
        goto::type_definition(&self.workspace, uri, position)
    }

    pub fn references(&self, uri: &str, position: Position) -> Vec<Location> {
        references::references(&self.workspace, uri, position)
    }

    pub fn completions(
        &self,
        uri: &str,
        position: Position,
        trigger_character: Option<char>,
    ) -> Vec<CompletionItem> {
        completion::completions(&self.workspace, uri, position, trigger_character)
    }

    pub fn code_actions(&self, uri: &str, position: Position) -> Option<Vec<TextEdit>> {
        code_action::code_actions(&self.workspace, uri, position)
    }
}

fn collect_source_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), WorkspaceError> {
    let entries = std::fs::read_dir(dir).map_err(|source| WorkspaceError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    for entry in entries {
        let entry = entry.map_err(|source| WorkspaceError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_dir() {
            collect_source_files(&path, out)?;
        } else if path.extension().is_some_and(|ext| ext == "dl") {
            out.push(path);
        }
    }
    Ok(())
}
