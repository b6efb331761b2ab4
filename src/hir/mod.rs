//! Symbol model: elems, document tables, the workspace index and resolution.
//!
//! ```text
//! syntax::parse_lines ─► parse_document ─► DocumentSymbolTable
//!                                             │
//!                     WorkspaceIndex ◄────────┘ (indexable kinds only)
//!                                             │
//!            Resolver: table → modules/imports → index
//! ```

mod document;
mod elem;
mod index;
mod resolve;
mod source;

pub use document::{parse_document, parse_document_with, DocumentSymbolTable};
pub use elem::{Elem, ElemKind, Provenance};
pub use index::WorkspaceIndex;
pub use resolve::{ResolveResult, Resolver};
pub use source::{FileError, FileSet};
