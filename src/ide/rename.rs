//! Safe rename.
//!
//! ```text
//! Validating ─► Resolving ─► Filtering ─► Deduplicating ─► Emitting
//!      │             │
//!      └─► Rejected  └─► nothing to rename (Ok(None))
//! ```
//!
//! Validation failures are the only errors. No edit is produced unless every
//! stage succeeds.

use indexmap::IndexMap;
use smol_str::SmolStr;
use thiserror::Error;
use tracing::debug;

use crate::base::{split_lines, FileId, LineCol, LineColRange, LineIndex};
use crate::ide::position::symbol_at;
use crate::ide::references::{collect_references, DocumentRef, EditForm, SearchContext};
use crate::syntax::keywords::is_reserved;
use crate::syntax::SymbolName;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RenameError {
    #[error("no symbol at the given position")]
    NoSymbol,
    #[error("symbol `{0}` has an empty name")]
    EmptySymbol(SmolStr),
    #[error("`{0}` is a reserved word")]
    Reserved(SmolStr),
    #[error("`{0}` is not a valid name")]
    InvalidNewName(SmolStr),
    #[error("cannot rename `{old}` to `{new}`: sigils differ")]
    SigilMismatch { old: SmolStr, new: SmolStr },
    #[error("document is not open")]
    UnknownDocument,
}

/// A single replacement within one file.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextEdit {
    pub range: LineColRange,
    pub new_text: SmolStr,
}

/// Edits grouped by file, files in ascending id order, edits in position
/// order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorkspaceEdit {
    pub changes: IndexMap<FileId, Vec<TextEdit>>,
}

impl WorkspaceEdit {
    pub fn edits(&self, file: FileId) -> &[TextEdit] {
        self.changes.get(&file).map(Vec::as_slice).unwrap_or_default()
    }

    /// Total number of edits across files.
    pub fn len(&self) -> usize {
        self.changes.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

/// What a client shows before asking for the new name.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PrepareRename {
    pub range: LineColRange,
    pub placeholder: SmolStr,
}

// ============================================================================
// VALIDATION
// ============================================================================

/// Reject symbols that must never be renamed.
fn validate_symbol(symbol: &str) -> Result<(), RenameError> {
    let name = SymbolName::parse(symbol);
    if name.base.is_empty() {
        return Err(RenameError::EmptySymbol(symbol.into()));
    }
    if is_reserved(name.base) {
        return Err(RenameError::Reserved(symbol.into()));
    }
    Ok(())
}

/// An identifier segment: a letter or underscore, then word characters,
/// with hyphens and apostrophes only between letters.
fn is_identifier(segment: &str) -> bool {
    let mut chars = segment.chars().peekable();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first == '_' || unicode_ident::is_xid_start(first)) {
        return false;
    }
    while let Some(c) = chars.next() {
        match c {
            '-' | '\'' => {
                if !chars.peek().is_some_and(|&n| n == '_' || unicode_ident::is_xid_start(n)) {
                    return false;
                }
            }
            c if unicode_ident::is_xid_continue(c) => {}
            _ => return false,
        }
    }
    true
}

/// Check `new_name` against `symbol` and give it the symbol's sigil and
/// twigil. Returns the full new name (`$bar`, `$.bar`, `bar`).
pub fn normalize_new_name(symbol: &str, new_name: &str) -> Result<SmolStr, RenameError> {
    let old = SymbolName::parse(symbol);
    let new = SymbolName::parse(new_name.trim());

    if new.sigil.is_some() && new.sigil != old.sigil {
        return Err(RenameError::SigilMismatch {
            old: symbol.into(),
            new: new_name.into(),
        });
    }
    if new.twigil.is_some() && new.twigil != old.twigil {
        return Err(RenameError::InvalidNewName(new_name.into()));
    }
    if !new.base.split("::").all(is_identifier) {
        return Err(RenameError::InvalidNewName(new_name.into()));
    }
    if is_reserved(new.base) {
        return Err(RenameError::Reserved(new_name.into()));
    }

    let mut normalized = String::new();
    normalized.extend(old.sigil);
    normalized.extend(old.twigil);
    normalized.push_str(new.base);
    Ok(SmolStr::from(normalized))
}

// ============================================================================
// ENTRY POINTS
// ============================================================================

/// The range and text of the renameable symbol at `position`.
pub fn prepare_rename(text: &str, position: LineCol) -> Option<PrepareRename> {
    let line = split_lines(text).get(position.line as usize).copied()?;
    let at = symbol_at(line, position)?;
    validate_symbol(&at.text).ok()?;
    Some(PrepareRename {
        range: at.range,
        placeholder: at.text,
    })
}

/// Rename the symbol at `position` to `new_name` everywhere it is referenced.
///
/// `Ok(None)` means the symbol did not resolve, or nothing was found to
/// rename.
#[tracing::instrument(
    skip_all,
    fields(file = %doc.file(), line = position.line, new_name = %new_name)
)]
pub fn rename(
    ctx: &SearchContext<'_>,
    doc: DocumentRef<'_>,
    position: LineCol,
    new_name: &str,
) -> Result<Option<WorkspaceEdit>, RenameError> {
    let line = split_lines(doc.text)
        .get(position.line as usize)
        .copied()
        .ok_or(RenameError::NoSymbol)?;
    let at = symbol_at(line, position).ok_or(RenameError::NoSymbol)?;
    validate_symbol(&at.text)?;
    let normalized = normalize_new_name(&at.text, new_name)?;
    debug!(symbol = %at.text, %normalized, "validated");

    let Some(refs) = collect_references(ctx, doc, position) else {
        debug!(symbol = %at.text, "nothing to rename");
        return Ok(None);
    };
    if refs.occurrences.is_empty() {
        return Ok(None);
    }

    let new_base = SymbolName::parse(&normalized).base;
    let mut edit = WorkspaceEdit::default();
    for occ in &refs.occurrences {
        let new_text = match occ.form {
            EditForm::Whole => normalized.clone(),
            EditForm::BaseOnly => SmolStr::new(new_base),
        };
        edit.changes.entry(occ.location.file).or_default().push(TextEdit {
            range: occ.edit_range,
            new_text,
        });
    }
    debug!(files = edit.changes.len(), edits = edit.len(), "emitting rename");
    Ok(Some(edit))
}

/// Apply one file's edits to its text. Edits must not overlap; edits
/// outside the text are ignored.
pub fn apply_edits(text: &str, edits: &[TextEdit]) -> String {
    let index = LineIndex::new(text);
    let mut spans: Vec<(usize, usize, &str)> = edits
        .iter()
        .filter_map(|edit| {
            let start = index.offset(edit.range.start)?;
            let end = index.offset(edit.range.end)?;
            let (start, end) = (usize::from(start), usize::from(end));
            (start <= end && end <= text.len()).then_some((start, end, edit.new_text.as_str()))
        })
        .collect();
    spans.sort_by_key(|&(start, end, _)| (start, end));

    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for (start, end, new_text) in spans {
        if start < cursor || !text.is_char_boundary(start) || !text.is_char_boundary(end) {
            continue;
        }
        out.push_str(&text[cursor..start]);
        out.push_str(new_text);
        cursor = end;
    }
    out.push_str(&text[cursor..]);
    out
}
