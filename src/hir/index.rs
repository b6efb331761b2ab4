//! The workspace-wide symbol index.
//!
//! Two maps back the index: name → elems across all files, and file → the
//! names that file contributed. The second makes [`WorkspaceIndex::remove_file`]
//! proportional to what the file added rather than to the index size.
//!
//! The index does no locking of its own. Callers serialize
//! `reindex_file`/`remove_file` for the same file.

use std::path::PathBuf;

use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::base::{FileId, FileRange};
use crate::hir::{parse_document, DocumentSymbolTable, Elem, FileSet, Provenance};
use crate::project::{BuildReport, IndexConfig, WorkspaceLoader};
use crate::syntax::ParseMode;

#[derive(Clone, Debug, Default)]
pub struct WorkspaceIndex {
    by_name: FxHashMap<SmolStr, Vec<Elem>>,
    names_by_file: FxHashMap<FileId, Vec<SmolStr>>,
    /// Total number of entries across `by_name`.
    entries: usize,
}

impl WorkspaceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole index with a fresh walk of `roots`.
    pub fn build(
        &mut self,
        files: &FileSet,
        roots: &[PathBuf],
        config: &IndexConfig,
    ) -> BuildReport {
        self.build_cancellable(files, roots, config, &CancellationToken::new())
    }

    /// Like [`build`](Self::build), stopping early once `cancel` fires. What
    /// was indexed before cancellation stays queryable.
    pub fn build_cancellable(
        &mut self,
        files: &FileSet,
        roots: &[PathBuf],
        config: &IndexConfig,
        cancel: &CancellationToken,
    ) -> BuildReport {
        let (index, report) = WorkspaceLoader::new(config.clone()).load(files, roots, cancel);
        *self = index;
        report
    }

    /// Drop both maps.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Re-read and re-parse `file`, replacing its entries. Returns the
    /// number of entries added; an unreadable file ends up with none.
    pub fn reindex_file(&mut self, files: &FileSet, file: FileId) -> usize {
        self.remove_file(file);
        let text = match files.read(file) {
            Ok(text) => text,
            Err(err) => {
                debug!(%file, %err, "skipping unreadable file");
                return 0;
            }
        };
        let table = parse_document(file, &text, ParseMode::WorkspaceIndex);
        self.index_table(&table)
    }

    /// Replace the entries of `table.file()` with the indexable elems of
    /// `table`. Callables inside a scope are also registered under
    /// `scope::name`.
    pub fn index_table(&mut self, table: &DocumentSymbolTable) -> usize {
        let file = table.file();
        self.remove_file(file);

        let mut names: Vec<SmolStr> = Vec::new();
        let mut added = 0;
        for elem in table.elems_by_line() {
            if !elem.kind.is_indexable() {
                continue;
            }
            let entry = elem.clone().with_provenance(Provenance::FromIndex);
            let alias = if entry.kind.is_callable() {
                entry.qualified_name()
            } else {
                None
            };
            if let Some(alias) = alias {
                self.insert(&mut names, alias, entry.clone());
                added += 1;
            }
            self.insert(&mut names, entry.name.clone(), entry);
            added += 1;
        }

        if !names.is_empty() {
            self.names_by_file.insert(file, names);
        }
        debug!(%file, added, "indexed file");
        added
    }

    fn insert(&mut self, names: &mut Vec<SmolStr>, key: SmolStr, elem: Elem) {
        if !names.contains(&key) {
            names.push(key.clone());
        }
        self.by_name.entry(key).or_default().push(elem);
        self.entries += 1;
    }

    /// Drop every entry `file` contributed.
    pub fn remove_file(&mut self, file: FileId) {
        let Some(names) = self.names_by_file.remove(&file) else {
            return;
        };
        let mut removed = 0;
        for name in names {
            if let Some(list) = self.by_name.get_mut(&name) {
                let before = list.len();
                list.retain(|elem| elem.file != file);
                removed += before - list.len();
                if list.is_empty() {
                    self.by_name.remove(&name);
                }
            }
        }
        self.entries -= removed;
        debug!(%file, removed, "removed file from index");
    }

    pub fn find_by_name(&self, name: &str) -> &[Elem] {
        self.by_name.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    /// Entries whose key starts with `prefix` (case-sensitive), ordered by
    /// key, file and line, at most `limit` of them.
    pub fn find_by_query(&self, prefix: &str, limit: usize) -> Vec<&Elem> {
        let mut keys: Vec<&SmolStr> = self
            .by_name
            .keys()
            .filter(|key| key.starts_with(prefix))
            .collect();
        keys.sort();
        keys.into_iter()
            .flat_map(|key| {
                let mut elems: Vec<&Elem> = self.by_name[key].iter().collect();
                elems.sort_by_key(|elem| (elem.file, elem.line));
                elems
            })
            .take(limit)
            .collect()
    }

    /// Declaration lines of every entry under `name`.
    pub fn locations(&self, name: &str) -> Vec<FileRange> {
        self.find_by_name(name).iter().map(Elem::location).collect()
    }

    /// Files with at least one entry under `name`, sorted.
    pub fn files_declaring(&self, name: &str) -> Vec<FileId> {
        let mut files: Vec<FileId> = self.find_by_name(name).iter().map(|e| e.file).collect();
        files.sort();
        files.dedup();
        files
    }

    pub fn contains_file(&self, file: FileId) -> bool {
        self.names_by_file.contains_key(&file)
    }

    /// Number of entries, aliases included.
    pub fn len(&self) -> usize {
        self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    pub fn file_count(&self) -> usize {
        self.names_by_file.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hir::ElemKind;

    fn table(file: u32, text: &str) -> DocumentSymbolTable {
        parse_document(FileId(file), text, ParseMode::WorkspaceIndex)
    }

    fn sorted(elems: &[Elem]) -> Vec<(FileId, u32)> {
        let mut out: Vec<_> = elems.iter().map(|e| (e.file, e.line)).collect();
        out.sort();
        out
    }

    #[test]
    fn test_index_records_declarations_only() {
        let mut index = WorkspaceIndex::new();
        let added = index.index_table(&table(
            0,
            "class Greeter {\n  has $.name;\n  method hi($x) { }\n}\nmy $y = 1;",
        ));
        // Greeter, hi, Greeter::hi
        assert_eq!(added, 3);
        assert_eq!(index.len(), 3);
        assert_eq!(index.find_by_name("hi")[0].provenance, Provenance::FromIndex);
        assert_eq!(index.find_by_name("Greeter::hi")[0].name, "hi");
        assert!(index.find_by_name("$.name").is_empty());
        assert!(index.find_by_name("$y").is_empty());
        assert!(index.find_by_name("$x").is_empty());
    }

    #[test]
    fn test_scopes_are_not_aliased() {
        let mut index = WorkspaceIndex::new();
        index.index_table(&table(0, "module Outer {\n  class Inner { }\n}"));
        assert!(index.find_by_name("Outer::Inner").is_empty());
        assert_eq!(index.find_by_name("Inner")[0].kind, ElemKind::Class);
    }

    #[test]
    fn test_reindex_replaces_previous_entries() {
        let mut index = WorkspaceIndex::new();
        index.index_table(&table(0, "sub a { }\nsub b { }"));
        index.index_table(&table(1, "sub a { }"));
        index.index_table(&table(0, "sub c { }"));

        assert_eq!(sorted(index.find_by_name("a")), vec![(FileId(1), 0)]);
        assert!(index.find_by_name("b").is_empty());
        assert_eq!(index.len(), 2);
        assert_eq!(index.file_count(), 2);
    }

    #[test]
    fn test_remove_then_reindex_round_trip() {
        let mut index = WorkspaceIndex::new();
        let text = "grammar G {\n  token word { \\w+ }\n  rule pair { <word> }\n}";
        index.index_table(&table(0, text));
        index.index_table(&table(1, "sub word { }"));
        let before = sorted(index.find_by_name("word"));

        index.remove_file(FileId(0));
        assert_eq!(sorted(index.find_by_name("word")), vec![(FileId(1), 0)]);
        assert!(index.find_by_name("G").is_empty());

        index.index_table(&table(0, text));
        assert_eq!(sorted(index.find_by_name("word")), before);
    }

    #[test]
    fn test_find_by_query_is_prefix_and_limited() {
        let mut index = WorkspaceIndex::new();
        index.index_table(&table(0, "sub parse-a { }\nsub parse-b { }\nsub other { }"));
        let names: Vec<&str> = index
            .find_by_query("parse", 10)
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(names, vec!["parse-a", "parse-b"]);
        assert_eq!(index.find_by_query("parse", 1).len(), 1);
        assert!(index.find_by_query("Parse", 10).is_empty());
    }

    #[test]
    fn test_reindex_unreadable_file_clears_it() {
        let files = FileSet::new();
        let file = files.file_id(std::path::Path::new("/no/such/file.raku"));
        let mut index = WorkspaceIndex::new();
        index.index_table(&table(file.index(), "sub gone { }"));
        assert_eq!(index.reindex_file(&files, file), 0);
        assert!(index.find_by_name("gone").is_empty());
        assert!(!index.contains_file(file));
    }

    #[test]
    fn test_reindex_reads_overlay() {
        let files = FileSet::new();
        let file = files.file_id(std::path::Path::new("/virtual.raku"));
        files.set_contents(file, "sub from-buffer { }");
        let mut index = WorkspaceIndex::new();
        assert_eq!(index.reindex_file(&files, file), 1);
        assert_eq!(
            index.locations("from-buffer"),
            vec![Elem::new("x", ElemKind::Sub, file, 0).location()]
        );
    }
}
