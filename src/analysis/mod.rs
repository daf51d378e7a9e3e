//! Workspace store, declaration resolution, type inference, and
//! semantic checks.
//!
//! The sync pipeline order is fixed: lower the changed document, then
//! resolve and infer over the whole workspace, then check the changed
//! document. Whole-workspace re-resolution is required because any
//! file's declarations are visible to any other file's references.

pub mod check;
pub mod infer;
pub mod resolve;
pub mod workspace;

pub use check::{check, Diagnostic, Severity};
pub use infer::infer;
pub use resolve::resolve;
pub use workspace::{Document, Workspace};

pub use crate::syntax::DeclRef;
