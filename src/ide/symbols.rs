//! Document and workspace symbol lists.

use smol_str::SmolStr;

use crate::base::FileRange;
use crate::hir::{DocumentSymbolTable, Elem, ElemKind, WorkspaceIndex};

/// A symbol entry for outlines and symbol search.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SymbolInfo {
    pub name: SmolStr,
    pub kind: ElemKind,
    /// Declaration through the end of its block.
    pub range: FileRange,
    /// Enclosing scope, if any.
    pub container: Option<SmolStr>,
}

impl From<&Elem> for SymbolInfo {
    fn from(elem: &Elem) -> Self {
        Self {
            name: elem.name.clone(),
            kind: elem.kind,
            range: FileRange::new(elem.file, elem.extent()),
            container: (!elem.scope.is_empty()).then(|| elem.scope.clone()),
        }
    }
}

/// Outline of one document in line order. Variables are left out.
pub fn document_symbols(table: &DocumentSymbolTable) -> Vec<SymbolInfo> {
    table
        .elems_by_line()
        .into_iter()
        .filter(|elem| !matches!(elem.kind, ElemKind::LocalVar | ElemKind::Import))
        .map(SymbolInfo::from)
        .collect()
}

/// Indexed symbols whose name starts with `query`, without the duplicates
/// that qualified aliases introduce.
pub fn workspace_symbols(index: &WorkspaceIndex, query: &str, limit: usize) -> Vec<SymbolInfo> {
    let mut out: Vec<SymbolInfo> = Vec::new();
    for elem in index.find_by_query(query, usize::MAX) {
        if out.len() >= limit {
            break;
        }
        let info = SymbolInfo::from(elem);
        if !out.contains(&info) {
            out.push(info);
        }
    }
    out
}
