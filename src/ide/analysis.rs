//! The coordinating layer: documents, index and caches behind one host.
//!
//! [`AnalysisHost`] owns all mutable state and is driven by document and
//! file-system events. [`Analysis`] is a read-only snapshot that answers
//! queries.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::base::{FileId, FileRange, LineCol, LineIndex};
use crate::hir::{
    parse_document_with, DocumentSymbolTable, FileSet, ResolveResult, Resolver, WorkspaceIndex,
};
use crate::ide::cache::ParseCache;
use crate::ide::folding::{folding_ranges, FoldingRange};
use crate::ide::goto::goto_definition;
use crate::ide::references::{find_references, DocumentRef, SearchContext};
use crate::ide::rename::{prepare_rename, rename, PrepareRename, RenameError, WorkspaceEdit};
use crate::ide::symbols::{document_symbols, workspace_symbols, SymbolInfo};
use crate::project::{AnalysisConfig, BuildReport, ModuleMap};
use crate::syntax::{LineClassifier, ParseMode, RakuClassifier};

/// A classifier shared between the host and its snapshots.
pub type SharedClassifier = Arc<dyn LineClassifier + Send + Sync>;

/// An open document: its latest text and the tables parsed from it.
#[derive(Debug)]
struct Document {
    text: Arc<str>,
    line_index: LineIndex,
    navigation: Arc<DocumentSymbolTable>,
    outline: Arc<DocumentSymbolTable>,
}

pub struct AnalysisHost {
    config: AnalysisConfig,
    roots: Vec<PathBuf>,
    files: FileSet,
    index: WorkspaceIndex,
    modules: ModuleMap,
    documents: FxHashMap<FileId, Document>,
    cache: Mutex<ParseCache>,
    classifier: Option<SharedClassifier>,
}

impl AnalysisHost {
    pub fn new() -> Self {
        Self::with_config(AnalysisConfig::default())
    }

    pub fn with_config(config: AnalysisConfig) -> Self {
        Self {
            cache: Mutex::new(ParseCache::new(config.cache_symbol_budget)),
            config,
            roots: Vec::new(),
            files: FileSet::new(),
            index: WorkspaceIndex::new(),
            modules: ModuleMap::new(),
            documents: FxHashMap::default(),
            classifier: Some(Arc::new(RakuClassifier)),
        }
    }

    /// Replace the classifier. `None` disables literal stripping and
    /// reference filtering.
    pub fn set_classifier(&mut self, classifier: Option<SharedClassifier>) {
        self.classifier = classifier;
        self.cache.lock().clear();
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn files(&self) -> &FileSet {
        &self.files
    }

    pub fn index(&self) -> &WorkspaceIndex {
        &self.index
    }

    pub fn modules(&self) -> &ModuleMap {
        &self.modules
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    // ------------------------------------------------------------------------
    // Workspace lifecycle
    // ------------------------------------------------------------------------

    /// Reset and rebuild the index and module map for new workspace folders.
    pub fn set_workspace_folders(&mut self, roots: Vec<PathBuf>) -> BuildReport {
        self.set_workspace_folders_cancellable(roots, &CancellationToken::new())
    }

    pub fn set_workspace_folders_cancellable(
        &mut self,
        roots: Vec<PathBuf>,
        cancel: &CancellationToken,
    ) -> BuildReport {
        self.roots = roots;
        self.cache.lock().clear();
        let report = self
            .index
            .build_cancellable(&self.files, &self.roots, &self.config.index, cancel);

        // Open buffers outside the roots were not walked.
        let open: Vec<FileId> = self.documents.keys().copied().collect();
        for file in open {
            self.reindex_open(file);
        }

        let include_paths = self.config.resolved_include_paths(&self.roots);
        self.modules = ModuleMap::discover(&self.files, &include_paths, &self.config.index);
        info!(
            roots = self.roots.len(),
            modules = self.modules.len(),
            "workspace folders set"
        );
        report
    }

    // ------------------------------------------------------------------------
    // Document lifecycle
    // ------------------------------------------------------------------------

    /// Open a document with its buffer text and index it.
    pub fn open_document(&mut self, path: &Path, text: impl Into<Arc<str>>) -> FileId {
        let file = self.files.file_id(path);
        self.update_document(file, text.into());
        self.reindex_open(file);
        file
    }

    /// New buffer text. The document is reparsed; the index waits for a save.
    pub fn change_document(&mut self, file: FileId, text: impl Into<Arc<str>>) {
        self.update_document(file, text.into());
    }

    /// The buffer was saved: bring the index up to date with it.
    pub fn save_document(&mut self, file: FileId) {
        self.reindex_open(file);
    }

    /// Forget the buffer. The index goes back to what is on disk.
    pub fn close_document(&mut self, file: FileId) {
        self.documents.remove(&file);
        self.files.clear_contents(file);
        let added = self.index.reindex_file(&self.files, file);
        debug!(%file, added, "closed document");
    }

    /// A file changed outside the editor.
    pub fn file_changed_on_disk(&mut self, path: &Path) -> FileId {
        let file = self.files.file_id(path);
        self.cache.lock().remove(file);
        if !self.documents.contains_key(&file) {
            self.index.reindex_file(&self.files, file);
        }
        file
    }

    /// A file was deleted: drop it everywhere.
    pub fn file_deleted(&mut self, path: &Path) {
        let Some(file) = self.files.lookup(path) else {
            return;
        };
        self.index.remove_file(file);
        self.cache.lock().remove(file);
        self.documents.remove(&file);
        self.files.clear_contents(file);
    }

    fn update_document(&mut self, file: FileId, text: Arc<str>) {
        self.files.set_contents(file, text.clone());
        self.cache.lock().remove(file);
        let classifier = self.classifier.as_deref().map(|c| c as &dyn LineClassifier);
        let navigation = parse_document_with(file, &text, ParseMode::Navigation, classifier);
        let outline = parse_document_with(file, &text, ParseMode::Outline, classifier);
        debug!(%file, symbols = navigation.len(), "parsed document");
        self.documents.insert(
            file,
            Document {
                line_index: LineIndex::new(&text),
                text,
                navigation: Arc::new(navigation),
                outline: Arc::new(outline),
            },
        );
    }

    fn reindex_open(&mut self, file: FileId) {
        let Some(doc) = self.documents.get(&file) else {
            self.index.reindex_file(&self.files, file);
            return;
        };
        let classifier = self.classifier.as_deref().map(|c| c as &dyn LineClassifier);
        let table = parse_document_with(file, &doc.text, ParseMode::WorkspaceIndex, classifier);
        self.index.index_table(&table);
    }

    pub fn analysis(&self) -> Analysis<'_> {
        Analysis { host: self }
    }
}

impl Default for AnalysisHost {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// ANALYSIS SNAPSHOT
// ============================================================================

/// Read-only queries over the host's current state.
#[derive(Clone, Copy)]
pub struct Analysis<'a> {
    host: &'a AnalysisHost,
}

impl<'a> Analysis<'a> {
    fn classifier(&self) -> Option<&'a dyn LineClassifier> {
        self.host.classifier.as_deref().map(|c| c as &dyn LineClassifier)
    }

    fn context(&self) -> SearchContext<'a> {
        SearchContext {
            files: &self.host.files,
            index: &self.host.index,
            modules: &self.host.modules,
            classifier: self.classifier(),
        }
    }

    /// Text and navigation table of `file`: the open buffer, else the file
    /// on disk (parsed through the cache).
    fn document(&self, file: FileId) -> Option<(Arc<str>, Arc<DocumentSymbolTable>)> {
        if let Some(doc) = self.host.documents.get(&file) {
            return Some((doc.text.clone(), doc.navigation.clone()));
        }
        let text = match self.host.files.read(file) {
            Ok(text) => text,
            Err(err) => {
                debug!(%file, %err, "document unavailable");
                return None;
            }
        };
        let mut cache = self.host.cache.lock();
        if let Some(table) = cache.get(file) {
            return Some((text, table));
        }
        let table = Arc::new(parse_document_with(
            file,
            &text,
            ParseMode::Navigation,
            self.classifier(),
        ));
        cache.insert(table.clone());
        Some((text, table))
    }

    pub fn file_text(&self, file: FileId) -> Option<Arc<str>> {
        self.document(file).map(|(text, _)| text)
    }

    pub fn line_index(&self, file: FileId) -> Option<LineIndex> {
        match self.host.documents.get(&file) {
            Some(doc) => Some(doc.line_index.clone()),
            None => self.file_text(file).map(|text| LineIndex::new(&text)),
        }
    }

    /// The navigation symbol table (locals and signatures included).
    pub fn symbol_table(&self, file: FileId) -> Option<Arc<DocumentSymbolTable>> {
        self.document(file).map(|(_, table)| table)
    }

    /// The outline table (declarations with block end lines).
    pub fn outline(&self, file: FileId) -> Option<Arc<DocumentSymbolTable>> {
        if let Some(doc) = self.host.documents.get(&file) {
            return Some(doc.outline.clone());
        }
        let text = self.host.files.read(file).ok()?;
        Some(Arc::new(parse_document_with(file, &text, ParseMode::Outline, self.classifier())))
    }

    pub fn resolve(&self, file: FileId, symbol: &str, line: u32) -> ResolveResult {
        let Some((_, table)) = self.document(file) else {
            return ResolveResult::NotFound;
        };
        Resolver::new(&table)
            .with_index(&self.host.index)
            .with_modules(&self.host.modules)
            .resolve(symbol, line)
    }

    pub fn goto_definition(&self, file: FileId, position: LineCol) -> Vec<FileRange> {
        let Some((text, table)) = self.document(file) else {
            return Vec::new();
        };
        goto_definition(&self.context(), DocumentRef { table: &table, text: &text }, position)
    }

    pub fn find_references(
        &self,
        file: FileId,
        position: LineCol,
        include_declaration: bool,
    ) -> Option<Vec<FileRange>> {
        let (text, table) = self.document(file)?;
        find_references(
            &self.context(),
            DocumentRef { table: &table, text: &text },
            position,
            include_declaration,
        )
    }

    pub fn prepare_rename(&self, file: FileId, position: LineCol) -> Option<PrepareRename> {
        let (text, _) = self.document(file)?;
        prepare_rename(&text, position)
    }

    pub fn rename(
        &self,
        file: FileId,
        position: LineCol,
        new_name: &str,
    ) -> Result<Option<WorkspaceEdit>, RenameError> {
        let (text, table) = self.document(file).ok_or(RenameError::UnknownDocument)?;
        rename(
            &self.context(),
            DocumentRef { table: &table, text: &text },
            position,
            new_name,
        )
    }

    pub fn document_symbols(&self, file: FileId) -> Vec<SymbolInfo> {
        self.outline(file)
            .map(|table| document_symbols(&table))
            .unwrap_or_default()
    }

    pub fn workspace_symbols(&self, query: &str, limit: usize) -> Vec<SymbolInfo> {
        workspace_symbols(&self.host.index, query, limit)
    }

    pub fn folding_ranges(&self, file: FileId) -> Vec<FoldingRange> {
        let Some(table) = self.outline(file) else {
            return Vec::new();
        };
        let Some(text) = self.file_text(file) else {
            return Vec::new();
        };
        folding_ranges(&table, &text, self.classifier())
    }
}
