//! Symbol occurrences: the unit every table, index and query deals in.

use smol_str::SmolStr;

use crate::base::{FileId, FileRange, LineColRange};
use crate::syntax::{CallableKind, ProductionKind, ScopeKind};

/// What kind of declaration an [`Elem`] records.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ElemKind {
    Package,
    Class,
    Role,
    Grammar,
    Module,
    Token,
    Rule,
    Field,
    Sub,
    Method,
    LocalVar,
    Phaser,
    Import,
}

impl ElemKind {
    /// Declarations the workspace index records. Variables, fields,
    /// phasers and imports stay document-local.
    pub fn is_indexable(self) -> bool {
        self.is_scope() || self.is_callable() || self.is_production()
    }

    pub fn is_scope(self) -> bool {
        matches!(
            self,
            ElemKind::Package
                | ElemKind::Class
                | ElemKind::Role
                | ElemKind::Grammar
                | ElemKind::Module
        )
    }

    pub fn is_callable(self) -> bool {
        matches!(self, ElemKind::Sub | ElemKind::Method)
    }

    pub fn is_production(self) -> bool {
        matches!(self, ElemKind::Token | ElemKind::Rule)
    }

    /// Lowercase keyword-like label, e.g. for outlines.
    pub fn label(self) -> &'static str {
        match self {
            ElemKind::Package => "package",
            ElemKind::Class => "class",
            ElemKind::Role => "role",
            ElemKind::Grammar => "grammar",
            ElemKind::Module => "module",
            ElemKind::Token => "token",
            ElemKind::Rule => "rule",
            ElemKind::Field => "field",
            ElemKind::Sub => "sub",
            ElemKind::Method => "method",
            ElemKind::LocalVar => "variable",
            ElemKind::Phaser => "phaser",
            ElemKind::Import => "import",
        }
    }
}

impl From<ScopeKind> for ElemKind {
    fn from(kind: ScopeKind) -> Self {
        match kind {
            ScopeKind::Package => ElemKind::Package,
            ScopeKind::Class => ElemKind::Class,
            ScopeKind::Role => ElemKind::Role,
            ScopeKind::Grammar => ElemKind::Grammar,
            ScopeKind::Module => ElemKind::Module,
        }
    }
}

impl From<CallableKind> for ElemKind {
    fn from(kind: CallableKind) -> Self {
        match kind {
            CallableKind::Sub => ElemKind::Sub,
            CallableKind::Method | CallableKind::Submethod => ElemKind::Method,
        }
    }
}

impl From<ProductionKind> for ElemKind {
    fn from(kind: ProductionKind) -> Self {
        match kind {
            ProductionKind::Token => ElemKind::Token,
            ProductionKind::Rule => ElemKind::Rule,
        }
    }
}

/// Where an [`Elem`] came from.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Provenance {
    #[default]
    FromParse,
    FromIndex,
    FromModuleDiscovery,
}

/// One recorded occurrence of a named symbol.
///
/// `line <= line_end` always holds; `line_end` equals `line` when no block
/// boundary was found or computed.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Elem {
    pub name: SmolStr,
    pub kind: ElemKind,
    pub file: FileId,
    pub line: u32,
    pub line_end: u32,
    /// Enclosing package/class/role/grammar/module, empty at top level.
    pub scope: SmolStr,
    pub params: Vec<SmolStr>,
    /// Type name for objects built with `Type.new`.
    pub detail: Option<SmolStr>,
    pub provenance: Provenance,
}

impl Elem {
    pub fn new(name: impl Into<SmolStr>, kind: ElemKind, file: FileId, line: u32) -> Self {
        Self {
            name: name.into(),
            kind,
            file,
            line,
            line_end: line,
            scope: SmolStr::default(),
            params: Vec::new(),
            detail: None,
            provenance: Provenance::FromParse,
        }
    }

    /// Set the last line; values before `line` are ignored.
    pub fn with_end(mut self, line_end: u32) -> Self {
        self.line_end = line_end.max(self.line);
        self
    }

    pub fn with_scope(mut self, scope: impl Into<SmolStr>) -> Self {
        self.scope = scope.into();
        self
    }

    pub fn with_params(mut self, params: Vec<SmolStr>) -> Self {
        self.params = params;
        self
    }

    pub fn with_detail(mut self, detail: Option<SmolStr>) -> Self {
        self.detail = detail;
        self
    }

    pub fn with_provenance(mut self, provenance: Provenance) -> Self {
        self.provenance = provenance;
        self
    }

    /// The declaration line as a whole-line location.
    pub fn location(&self) -> FileRange {
        FileRange::new(self.file, LineColRange::whole_line(self.line))
    }

    /// Lines `line..=line_end`, as a range ending at the start of the next line.
    pub fn extent(&self) -> LineColRange {
        LineColRange::new(
            LineColRange::whole_line(self.line).start,
            LineColRange::whole_line(self.line_end).end,
        )
    }

    pub fn is_multiline(&self) -> bool {
        self.line_end > self.line
    }

    /// `scope::name` for callables inside a scope, when `name` is bare.
    pub fn qualified_name(&self) -> Option<SmolStr> {
        if self.scope.is_empty() || self.name.contains("::") {
            return None;
        }
        Some(SmolStr::from(format!("{}::{}", self.scope, self.name)))
    }
}
