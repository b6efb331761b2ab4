//! # rakunav-base
//!
//! Static analysis core for Raku: outlines, workspace-wide symbol search,
//! find-references and safe rename, without running the compiler.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! ide     → AnalysisHost, references, rename, goto, symbols, folding
//!   ↓
//! hir     → Elem, DocumentSymbolTable, WorkspaceIndex, Resolver, FileSet
//!   ↓
//! syntax  → line classifier, literal stripping, declaration recognizers
//!   ↓
//! base    → FileId, LineCol, LineIndex, ranges
//!
//! project → configuration, workspace walk, module discovery, index loading
//! ```

/// Foundation types: FileId, positions and ranges
pub mod base;

/// Lexical classification and line-cascade parsing
pub mod syntax;

/// Symbol tables, workspace index and resolution
pub mod hir;

/// Editor features over the symbol model
pub mod ide;

/// Workspace configuration and loading
pub mod project;

pub use base::{FileId, FileRange, LineCol, LineColRange, LineIndex, TextRange, TextSize};
pub use hir::{parse_document, DocumentSymbolTable, Elem, ElemKind, WorkspaceIndex};
pub use ide::{Analysis, AnalysisHost};
pub use project::{AnalysisConfig, IndexConfig};
pub use syntax::{ParseMode, RakuClassifier};
