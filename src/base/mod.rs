//! Foundation types for the stratum analysis core.
//!
//! This module provides fundamental types used throughout the crate:
//! - [`Position`], [`Range`] - Line/column coordinates for tree nodes
//! - [`Location`] - A range inside a specific document
//! - [`LineIndex`] - Byte offset to line/column conversion
//!
//! This module has NO dependencies on other stratum modules.

mod line_index;
mod position;

pub use line_index::LineIndex;
pub use position::{Location, Position, Range};

// Re-export text-size types for convenience
pub use text_size::{TextRange, TextSize};
