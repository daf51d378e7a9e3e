//! Position-addressed editor queries on top of the analysis layer.
//!
//! [`AnalysisContext`] is the facade an editor integration talks to:
//! full-text document syncs in, diagnostics and query answers out.

pub mod analysis;
pub mod code_action;
pub mod completion;
pub mod goto;
pub mod hover;
pub mod references;
pub mod source_util;

pub use analysis::{AnalysisContext, WorkspaceError};
pub use code_action::TextEdit;
pub use completion::CompletionItem;
