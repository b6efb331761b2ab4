//! Per-document symbol tables.
//!
//! A [`DocumentSymbolTable`] is rebuilt wholesale on every parse and never
//! patched. Names keep their discovery order, and so do the elems recorded
//! under each name.

use indexmap::IndexMap;
use smol_str::SmolStr;

use crate::base::{split_lines, FileId};
use crate::hir::{Elem, ElemKind};
use crate::syntax::{
    parse_lines, Declaration, LineClassifier, ParseMode, RakuClassifier, RecognizedForm,
};

/// Name → elems of one document, plus the modules it imports.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentSymbolTable {
    file: FileId,
    elems: IndexMap<SmolStr, Vec<Elem>>,
    /// Imported module → line of its first `use`/`need`/`require`.
    imported: IndexMap<SmolStr, u32>,
}

impl DocumentSymbolTable {
    pub fn new(file: FileId) -> Self {
        Self {
            file,
            elems: IndexMap::new(),
            imported: IndexMap::new(),
        }
    }

    pub fn file(&self) -> FileId {
        self.file
    }

    /// Record an elem. Elems with an empty name are dropped.
    pub fn push(&mut self, elem: Elem) {
        if elem.name.is_empty() {
            return;
        }
        self.elems.entry(elem.name.clone()).or_default().push(elem);
    }

    /// Record an imported module; the first import of a name wins.
    pub fn add_import(&mut self, module: SmolStr, line: u32) {
        self.imported.entry(module).or_insert(line);
    }

    /// Every elem recorded under `name`, in discovery order.
    pub fn get(&self, name: &str) -> &[Elem] {
        self.elems.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.elems.contains_key(name)
    }

    /// Names and their elems, in discovery order of the names.
    pub fn iter(&self) -> impl Iterator<Item = (&SmolStr, &[Elem])> {
        self.elems.iter().map(|(name, elems)| (name, elems.as_slice()))
    }

    /// Every elem, grouped by name.
    pub fn elems(&self) -> impl Iterator<Item = &Elem> {
        self.elems.values().flatten()
    }

    /// Every elem, ordered by line. Ties keep discovery order.
    pub fn elems_by_line(&self) -> Vec<&Elem> {
        let mut elems: Vec<&Elem> = self.elems().collect();
        elems.sort_by_key(|elem| elem.line);
        elems
    }

    pub fn imported_line(&self, module: &str) -> Option<u32> {
        self.imported.get(module).copied()
    }

    pub fn imports(&self) -> impl Iterator<Item = (&SmolStr, u32)> {
        self.imported.iter().map(|(module, &line)| (module, line))
    }

    /// Total number of elems.
    pub fn len(&self) -> usize {
        self.elems.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.elems.is_empty()
    }

    fn lower(&mut self, decl: Declaration) {
        let Declaration { line, scope, form } = decl;
        match form {
            RecognizedForm::Scope { kind, name, end } => {
                self.push(
                    Elem::new(name, kind.into(), self.file, line)
                        .with_end(end)
                        .with_scope(scope),
                );
            }
            RecognizedForm::Callable {
                kind,
                name,
                end,
                params,
            } => {
                for param in &params {
                    self.push(
                        Elem::new(param.clone(), ElemKind::LocalVar, self.file, line)
                            .with_scope(scope.clone()),
                    );
                }
                self.push(
                    Elem::new(name, kind.into(), self.file, line)
                        .with_end(end)
                        .with_scope(scope)
                        .with_params(params),
                );
            }
            RecognizedForm::Production { kind, name, end } => {
                self.push(
                    Elem::new(name, kind.into(), self.file, line)
                        .with_end(end)
                        .with_scope(scope),
                );
            }
            RecognizedForm::Field { name } => {
                self.push(Elem::new(name, ElemKind::Field, self.file, line).with_scope(scope));
            }
            RecognizedForm::Phaser { name, end } => {
                self.push(
                    Elem::new(name, ElemKind::Phaser, self.file, line)
                        .with_end(end)
                        .with_scope(scope),
                );
            }
            RecognizedForm::Variables { names, type_name } => {
                for name in names {
                    self.push(
                        Elem::new(name, ElemKind::LocalVar, self.file, line)
                            .with_scope(scope.clone())
                            .with_detail(type_name.clone()),
                    );
                }
            }
            RecognizedForm::Import { module } => self.add_import(module, line),
        }
    }
}

/// Parse `text` with the built-in classifier.
pub fn parse_document(file: FileId, text: &str, mode: ParseMode) -> DocumentSymbolTable {
    parse_document_with(file, text, mode, Some(&RakuClassifier))
}

/// Parse `text` with a given classifier; `None` parses unstripped lines.
pub fn parse_document_with(
    file: FileId,
    text: &str,
    mode: ParseMode,
    classifier: Option<&dyn LineClassifier>,
) -> DocumentSymbolTable {
    let lines = split_lines(text);
    let mut table = DocumentSymbolTable::new(file);
    for decl in parse_lines(&lines, mode, classifier) {
        table.lower(decl);
    }
    table
}
