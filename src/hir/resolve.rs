//! Reference resolution: from a symbol used in a document to its declarations.
//!
//! Resolution looks at three tiers in order and stops at the first that
//! yields anything:
//!
//! 1. the document's own symbol table,
//! 2. discovered modules and the document's imports,
//! 3. the workspace index.
//!
//! Results from different tiers are never merged.

use crate::hir::{DocumentSymbolTable, Elem, ElemKind, WorkspaceIndex};
use crate::project::ModuleMap;
use crate::syntax::SymbolName;

// ============================================================================
// RESOLUTION RESULT
// ============================================================================

/// Declarations a symbol resolved to, tagged with the tier that produced them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolveResult {
    Local(Vec<Elem>),
    Module(Vec<Elem>),
    Workspace(Vec<Elem>),
    NotFound,
}

impl ResolveResult {
    pub fn elems(&self) -> &[Elem] {
        match self {
            ResolveResult::Local(elems)
            | ResolveResult::Module(elems)
            | ResolveResult::Workspace(elems) => elems,
            ResolveResult::NotFound => &[],
        }
    }

    pub fn into_elems(self) -> Vec<Elem> {
        match self {
            ResolveResult::Local(elems)
            | ResolveResult::Module(elems)
            | ResolveResult::Workspace(elems) => elems,
            ResolveResult::NotFound => Vec::new(),
        }
    }

    pub fn is_found(&self) -> bool {
        !matches!(self, ResolveResult::NotFound)
    }

    /// The first declaration, e.g. to anchor a rename.
    pub fn primary(&self) -> Option<&Elem> {
        self.elems().first()
    }
}

// ============================================================================
// RESOLVER
// ============================================================================

#[derive(Clone, Copy, Debug)]
pub struct Resolver<'a> {
    table: &'a DocumentSymbolTable,
    index: Option<&'a WorkspaceIndex>,
    modules: Option<&'a ModuleMap>,
}

impl<'a> Resolver<'a> {
    pub fn new(table: &'a DocumentSymbolTable) -> Self {
        Self {
            table,
            index: None,
            modules: None,
        }
    }

    pub fn with_index(mut self, index: &'a WorkspaceIndex) -> Self {
        self.index = Some(index);
        self
    }

    pub fn with_modules(mut self, modules: &'a ModuleMap) -> Self {
        self.modules = Some(modules);
        self
    }

    /// Resolve `symbol` as used on `usage_line`.
    ///
    /// A variable resolves to its nearest declaration at or before the
    /// usage line. Anything else resolves to every same-named declaration,
    /// so all candidates of a multi-dispatch routine come back together.
    pub fn resolve(&self, symbol: &str, usage_line: u32) -> ResolveResult {
        if symbol.is_empty() {
            return ResolveResult::NotFound;
        }
        let local = if SymbolName::parse(symbol).has_sigil() {
            self.nearest_local(symbol, usage_line)
        } else {
            self.all_local(symbol)
        };
        if !local.is_empty() {
            return ResolveResult::Local(local);
        }

        let module = self.module(symbol);
        if !module.is_empty() {
            return ResolveResult::Module(module);
        }

        match self.index.map(|index| index.find_by_name(symbol)) {
            Some(elems) if !elems.is_empty() => ResolveResult::Workspace(elems.to_vec()),
            _ => ResolveResult::NotFound,
        }
    }

    fn nearest_local(&self, symbol: &str, usage_line: u32) -> Vec<Elem> {
        let mut best: Option<&Elem> = None;
        for elem in self.table.get(symbol) {
            if elem.line > usage_line {
                continue;
            }
            // Strictly greater keeps the first of equal lines.
            if best.is_none_or(|b| elem.line > b.line) {
                best = Some(elem);
            }
        }
        best.into_iter().cloned().collect()
    }

    fn all_local(&self, symbol: &str) -> Vec<Elem> {
        let exact = self.table.get(symbol);
        if !exact.is_empty() {
            return exact.to_vec();
        }
        let Some((scope, name)) = SymbolName::parse(symbol).split_qualified() else {
            return Vec::new();
        };
        self.table
            .get(name)
            .iter()
            .filter(|elem| elem.scope == scope)
            .cloned()
            .collect()
    }

    fn module(&self, symbol: &str) -> Vec<Elem> {
        if let Some(elem) = self.modules.and_then(|modules| modules.elem(symbol)) {
            return vec![elem];
        }
        match self.table.imported_line(symbol) {
            Some(line) => vec![Elem::new(symbol, ElemKind::Import, self.table.file(), line)],
            None => Vec::new(),
        }
    }
}
