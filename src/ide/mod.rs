//! Editor-facing features: the analysis host, navigation, references and
//! rename.
//!
//! Each feature is a plain function over hir data, so it can be tested
//! without a host. [`AnalysisHost`] wires them to documents and the
//! workspace index:
//!
//! ```ignore
//! use rakunav::ide::AnalysisHost;
//!
//! let mut host = AnalysisHost::new();
//! let file = host.open_document(path, "sub greet { }\ngreet();");
//! let edit = host.analysis().rename(file, LineCol::new(1, 0), "welcome")?;
//! ```

mod analysis;
mod cache;
mod folding;
mod goto;
mod position;
mod references;
mod rename;
mod symbols;

pub use analysis::{Analysis, AnalysisHost, SharedClassifier};
pub use cache::ParseCache;
pub use folding::{folding_ranges, FoldingRange};
pub use goto::goto_definition;
pub use position::{symbol_at, SymbolAt};
pub use references::{
    collect_references, deduplicate, find_references, references_to, without_declaration,
    DocumentRef, EditForm, Occurrence, References, SearchContext,
};
pub use rename::{
    apply_edits, normalize_new_name, prepare_rename, rename, PrepareRename, RenameError, TextEdit,
    WorkspaceEdit,
};
pub use symbols::{document_symbols, workspace_symbols, SymbolInfo};
