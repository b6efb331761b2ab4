//! Building a [`WorkspaceIndex`] from workspace folders.

use std::path::PathBuf;

use rayon::prelude::*;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::base::FileId;
use crate::hir::{parse_document, DocumentSymbolTable, FileSet, WorkspaceIndex};
use crate::project::{walk_sources, IndexConfig};
use crate::syntax::ParseMode;

/// Which ceiling stopped a build.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IndexCeiling {
    Files,
    Symbols,
}

/// What a workspace build did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BuildReport {
    pub files_discovered: usize,
    pub files_indexed: usize,
    pub symbols_indexed: usize,
    pub ceiling: Option<IndexCeiling>,
    pub cancelled: bool,
}

/// Walks workspace folders and indexes every source file found.
#[derive(Clone, Debug)]
pub struct WorkspaceLoader {
    config: IndexConfig,
}

impl WorkspaceLoader {
    pub fn new(config: IndexConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Build a fresh index of `roots`.
    ///
    /// Files are inserted one at a time in walk order, so a parallel parse
    /// produces the same index as a sequential one. Unreadable files are
    /// skipped.
    #[tracing::instrument(skip_all, fields(roots = roots.len(), parallel = self.config.parallel))]
    pub fn load(
        &self,
        files: &FileSet,
        roots: &[PathBuf],
        cancel: &CancellationToken,
    ) -> (WorkspaceIndex, BuildReport) {
        info!("building workspace index");
        let walk = walk_sources(roots, &self.config, cancel);
        let mut report = BuildReport {
            files_discovered: walk.files.len(),
            cancelled: walk.cancelled,
            ..BuildReport::default()
        };
        if walk.truncated {
            warn!(max_files = self.config.max_files, "file ceiling reached");
            report.ceiling = Some(IndexCeiling::Files);
        }

        let ids: Vec<FileId> = walk.files.iter().map(|path| files.file_id(path)).collect();
        let mut index = WorkspaceIndex::new();

        if self.config.parallel && !report.cancelled {
            let tables: Vec<Option<DocumentSymbolTable>> = ids
                .par_iter()
                .map(|&file| {
                    if cancel.is_cancelled() {
                        return None;
                    }
                    parse_file(files, file)
                })
                .collect();
            for table in tables {
                if !self.admit(&index, cancel, &mut report) {
                    break;
                }
                if let Some(table) = table {
                    index.index_table(&table);
                    report.files_indexed += 1;
                }
            }
        } else if !report.cancelled {
            for &file in &ids {
                if !self.admit(&index, cancel, &mut report) {
                    break;
                }
                if let Some(table) = parse_file(files, file) {
                    index.index_table(&table);
                    report.files_indexed += 1;
                }
            }
        }

        report.symbols_indexed = index.len();
        info!(
            files = report.files_indexed,
            symbols = report.symbols_indexed,
            cancelled = report.cancelled,
            "workspace index built"
        );
        (index, report)
    }

    /// Whether another file may be added.
    fn admit(
        &self,
        index: &WorkspaceIndex,
        cancel: &CancellationToken,
        report: &mut BuildReport,
    ) -> bool {
        if cancel.is_cancelled() {
            report.cancelled = true;
            return false;
        }
        if index.len() >= self.config.max_symbols {
            warn!(max_symbols = self.config.max_symbols, "symbol ceiling reached");
            report.ceiling = Some(IndexCeiling::Symbols);
            return false;
        }
        true
    }
}

impl Default for WorkspaceLoader {
    fn default() -> Self {
        Self::new(IndexConfig::default())
    }
}

fn parse_file(files: &FileSet, file: FileId) -> Option<DocumentSymbolTable> {
    match files.read(file) {
        Ok(text) => Some(parse_document(file, &text, ParseMode::WorkspaceIndex)),
        Err(err) => {
            tracing::debug!(%file, %err, "skipping unreadable file");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn workspace(count: usize) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..count {
            fs::write(
                dir.path().join(format!("f{i}.raku")),
                format!("sub f{i} {{ }}\nsub g{i} {{ }}"),
            )
            .unwrap();
        }
        dir
    }

    #[test]
    fn test_load_indexes_every_file() {
        let dir = workspace(3);
        let files = FileSet::new();
        let (index, report) = WorkspaceLoader::default().load(
            &files,
            &[dir.path().to_path_buf()],
            &CancellationToken::new(),
        );
        assert_eq!(report.files_indexed, 3);
        assert_eq!(report.symbols_indexed, 6);
        assert_eq!(report.ceiling, None);
        assert_eq!(index.find_by_name("g2").len(), 1);
    }

    #[test]
    fn test_symbol_ceiling_stops_between_files() {
        let dir = workspace(4);
        let files = FileSet::new();
        let loader = WorkspaceLoader::new(IndexConfig::default().with_max_symbols(3));
        let (index, report) =
            loader.load(&files, &[dir.path().to_path_buf()], &CancellationToken::new());
        assert_eq!(report.ceiling, Some(IndexCeiling::Symbols));
        assert_eq!(report.files_indexed, 2);
        assert_eq!(index.len(), 4);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let dir = workspace(8);
        let roots = [dir.path().to_path_buf()];
        let files = FileSet::new();
        let cancel = CancellationToken::new();
        let (sequential, _) = WorkspaceLoader::default().load(&files, &roots, &cancel);
        let parallel_loader = WorkspaceLoader::new(IndexConfig::default().with_parallel(true));
        let (parallel, report) = parallel_loader.load(&files, &roots, &cancel);

        assert_eq!(report.files_indexed, 8);
        assert_eq!(parallel.len(), sequential.len());
        for i in 0..8 {
            let name = format!("f{i}");
            assert_eq!(parallel.find_by_name(&name), sequential.find_by_name(&name));
        }
    }
}
