//! Parse cache for documents that are not open, bounded by symbol count.

use std::sync::Arc;

use lru::LruCache;

use crate::base::FileId;
use crate::hir::DocumentSymbolTable;

/// Least-recently-used cache of symbol tables whose capacity is the total
/// number of elems held, not the number of documents.
#[derive(Debug)]
pub struct ParseCache {
    entries: LruCache<FileId, Arc<DocumentSymbolTable>>,
    symbols: usize,
    budget: usize,
}

impl ParseCache {
    pub fn new(budget: usize) -> Self {
        Self {
            entries: LruCache::unbounded(),
            symbols: 0,
            budget,
        }
    }

    pub fn get(&mut self, file: FileId) -> Option<Arc<DocumentSymbolTable>> {
        self.entries.get(&file).cloned()
    }

    /// Insert `table`, then evict least-recently-used documents until the
    /// cache is within budget. The newest entry is always kept.
    pub fn insert(&mut self, table: Arc<DocumentSymbolTable>) {
        let file = table.file();
        self.symbols += table.len();
        if let Some(old) = self.entries.put(file, table) {
            self.symbols -= old.len();
        }
        while self.symbols > self.budget && self.entries.len() > 1 {
            match self.entries.pop_lru() {
                Some((_, evicted)) => self.symbols -= evicted.len(),
                None => break,
            }
        }
    }

    pub fn remove(&mut self, file: FileId) {
        if let Some(old) = self.entries.pop(&file) {
            self.symbols -= old.len();
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.symbols = 0;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Elems currently held.
    pub fn symbols(&self) -> usize {
        self.symbols
    }
}
