//! # stratum-base
//!
//! Core library for Soufflé Datalog parsing, AST, and semantic analysis.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! ide       → editor features (hover, goto-def, references, completion)
//!   ↓
//! analysis  → workspace store, declaration resolution, type inference
//!   ↓
//! syntax    → error-tolerant AST, lowering from the CST
//!   ↓
//! parser    → logos lexer, tolerant recursive-descent parser, rowan CST
//!   ↓
//! base      → primitives (Position, Range, Location, LineIndex)
//! ```

// ============================================================================
// MODULES (dependency order: base → parser → syntax → analysis → ide)
// ============================================================================

/// Foundation types: Position, Range, Location, LineIndex
pub mod base;

/// Parser: logos lexer, tolerant recursive-descent parser, rowan CST
pub mod parser;

/// Syntax: error-tolerant AST types and the CST → AST lowering
pub mod syntax;

/// Analysis: workspace store, declaration resolver, type inference, checks
pub mod analysis;

/// IDE features: hover, goto-definition, find-references, completion
pub mod ide;

// Re-export foundation types
pub use base::{LineIndex, Location, Position, Range};

// Re-export the main entry point
pub use ide::AnalysisContext;
