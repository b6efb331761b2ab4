//! Reference search shared by find-references and rename.
//!
//! The pipeline runs in fixed stages:
//!
//! 1. **resolve** the symbol under the cursor to its declaration,
//! 2. **search** candidate files line by line,
//! 3. **filter** out matches inside strings, comments and patterns,
//! 4. **deduplicate** overlapping matches.
//!
//! Variables are searched in the current document only, from their
//! declaration to the end. Everything else is searched in the files the
//! workspace index says declare it, plus the current document.

use std::ops::Range;

use regex::Regex;
use smol_str::SmolStr;
use tracing::{debug, warn};

use crate::base::{split_lines, FileId, FileRange, LineCol, LineColRange};
use crate::hir::{DocumentSymbolTable, Elem, FileSet, Resolver, WorkspaceIndex};
use crate::ide::position::symbol_at;
use crate::project::ModuleMap;
use crate::syntax::symbol::is_sigil;
use crate::syntax::{classify_lines, LineClassifier, SymbolName};

/// Everything a search may consult beyond the current document.
#[derive(Clone, Copy)]
pub struct SearchContext<'a> {
    pub files: &'a FileSet,
    pub index: &'a WorkspaceIndex,
    pub modules: &'a ModuleMap,
    /// `None` when no classifier is available; matches are then unfiltered.
    pub classifier: Option<&'a dyn LineClassifier>,
}

/// The document the cursor is in.
#[derive(Clone, Copy, Debug)]
pub struct DocumentRef<'a> {
    pub table: &'a DocumentSymbolTable,
    pub text: &'a str,
}

impl DocumentRef<'_> {
    pub fn file(&self) -> FileId {
        self.table.file()
    }
}

// ============================================================================
// OCCURRENCES
// ============================================================================

/// How much of a match an edit replaces.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EditForm {
    /// The whole match: `foo`, `$foo`.
    Whole,
    /// Only the identifier: `foo` in `${foo}`, `$.foo`, `$!foo`.
    BaseOnly,
}

/// One place a symbol is written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Occurrence {
    /// The full match, used for filtering and deduplication.
    pub location: FileRange,
    /// The part an edit replaces.
    pub edit_range: LineColRange,
    pub form: EditForm,
}

impl AsRef<FileRange> for Occurrence {
    fn as_ref(&self) -> &FileRange {
        &self.location
    }
}

/// References found for a symbol, with the declaration they resolved to.
#[derive(Clone, Debug)]
pub struct References {
    /// The symbol as searched for: the written variable, or the resolved
    /// declaration's name for anything else.
    pub symbol: SmolStr,
    pub declaration: Elem,
    pub occurrences: Vec<Occurrence>,
}

// ============================================================================
// SEARCH
// ============================================================================

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

struct Matcher {
    regex: Regex,
    sigiled: bool,
}

impl Matcher {
    fn new(symbol: &SymbolName<'_>) -> Result<Self, regex::Error> {
        let base = regex::escape(symbol.base);
        let pattern = match (symbol.sigil, symbol.twigil) {
            (None, _) => base,
            (Some(sigil), Some(_)) => format!(r"{}[.!]({base})", regex::escape(&sigil.to_string())),
            (Some(sigil), None) => {
                let s = regex::escape(&sigil.to_string());
                format!(r"{s}\{{({base})\}}|{s}[.!]({base})|{s}({base})")
            }
        };
        Ok(Self {
            regex: Regex::new(&pattern)?,
            sigiled: symbol.sigil.is_some(),
        })
    }

    /// Matches in one line as (full match, edit range, form), in order.
    fn find(&self, line: &str) -> Vec<(Range<usize>, Range<usize>, EditForm)> {
        let mut out = Vec::new();
        for caps in self.regex.captures_iter(line) {
            let Some(whole) = caps.get(0) else { continue };
            if !ends_identifier(line, whole.end()) {
                continue;
            }
            if !self.sigiled {
                if !starts_identifier(line, whole.start()) {
                    continue;
                }
                out.push((whole.range(), whole.range(), EditForm::Whole));
                continue;
            }
            // Group 3 (or 1 for twigil-only patterns) is the bare form.
            let bare = caps.len() == 4 && caps.get(3).is_some();
            let form = if bare { EditForm::Whole } else { EditForm::BaseOnly };
            let edit = if bare {
                whole.range()
            } else {
                match caps.iter().skip(1).flatten().next() {
                    Some(base) => base.range(),
                    None => continue,
                }
            };
            out.push((whole.range(), edit, form));
        }
        out
    }
}

/// Nothing identifier-like continues past `end`.
fn ends_identifier(line: &str, end: usize) -> bool {
    let mut rest = line[end..].chars();
    match rest.next() {
        Some(c) if is_identifier_char(c) => false,
        Some('-' | '\'') => !rest.next().is_some_and(|c| c.is_alphabetic() || c == '_'),
        Some(':') => {
            let after = line[end..].strip_prefix("::");
            !after.is_some_and(|a| a.chars().next().is_some_and(is_identifier_char))
        }
        _ => true,
    }
}

/// The bare word at `start` is not the tail of a longer identifier or of a
/// variable.
fn starts_identifier(line: &str, start: usize) -> bool {
    let mut before = line[..start].chars().rev();
    match before.next() {
        Some(c) if is_identifier_char(c) || is_sigil(c) => false,
        Some('-' | '\'') => !before.next().is_some_and(is_identifier_char),
        Some('.' | '!') => !before.next().is_some_and(is_sigil),
        _ => true,
    }
}

fn search_text(
    file: FileId,
    text: &str,
    first_line: u32,
    matcher: &Matcher,
    classifier: Option<&dyn LineClassifier>,
) -> Vec<Occurrence> {
    let lines = split_lines(text);
    let mut found = Vec::new();
    for (index, line) in lines.iter().enumerate().skip(first_line as usize) {
        for (whole, edit, form) in matcher.find(line) {
            let line = index as u32;
            found.push(Occurrence {
                location: FileRange::new(
                    file,
                    LineColRange::on_line(line, whole.start as u32, whole.end as u32),
                ),
                edit_range: LineColRange::on_line(line, edit.start as u32, edit.end as u32),
                form,
            });
        }
    }
    match classifier {
        Some(classifier) if !found.is_empty() => filter_literals(found, &lines, classifier),
        _ => found,
    }
}

/// Drop occurrences overlapping a string, comment or pattern span. If the
/// classifier fails, nothing is dropped.
fn filter_literals(
    found: Vec<Occurrence>,
    lines: &[&str],
    classifier: &dyn LineClassifier,
) -> Vec<Occurrence> {
    let classified = match classify_lines(classifier, lines) {
        Ok(classified) => classified,
        Err(err) => {
            warn!(%err, "reference filtering skipped");
            return found;
        }
    };
    found
        .into_iter()
        .filter(|occ| {
            let range = occ.location.range;
            let Some(spans) = classified.get(range.start.line as usize) else {
                return true;
            };
            !spans.iter().any(|span| {
                !span.class.is_code()
                    && u32::from(span.range.start()) < range.end.col
                    && range.start.col < u32::from(span.range.end())
            })
        })
        .collect()
}

/// Sort by position and collapse matches that start together or overlap,
/// keeping the longer one. Running it on its own output changes nothing.
pub fn deduplicate<T: AsRef<FileRange>>(mut items: Vec<T>) -> Vec<T> {
    items.sort_by_key(|item| *item.as_ref());
    let mut out: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        let current = *item.as_ref();
        if let Some(last) = out.last_mut() {
            let kept = *last.as_ref();
            if kept.file == current.file
                && (kept.range.start == current.range.start || kept.range.overlaps(&current.range))
            {
                if current.range.extent() > kept.range.extent() {
                    *last = item;
                }
                continue;
            }
        }
        out.push(item);
    }
    out
}

// ============================================================================
// ENTRY POINTS
// ============================================================================

/// Resolve the symbol at `position` and collect its filtered, deduplicated
/// occurrences. `None` when there is no symbol there or it does not resolve.
pub fn collect_references(
    ctx: &SearchContext<'_>,
    doc: DocumentRef<'_>,
    position: LineCol,
) -> Option<References> {
    let line_text = split_lines(doc.text).get(position.line as usize).copied()?;
    let at = symbol_at(line_text, position)?;
    references_to(ctx, doc, &at.text, position.line)
}

/// Like [`collect_references`], for a symbol text already known.
pub fn references_to(
    ctx: &SearchContext<'_>,
    doc: DocumentRef<'_>,
    symbol: &str,
    line: u32,
) -> Option<References> {
    let resolved = Resolver::new(doc.table)
        .with_index(ctx.index)
        .with_modules(ctx.modules)
        .resolve(symbol, line);
    let declaration = resolved.primary()?.clone();

    let search_name = if SymbolName::parse(symbol).has_sigil() {
        SmolStr::new(symbol)
    } else {
        declaration.name.clone()
    };
    let name = SymbolName::parse(&search_name);
    if name.base.is_empty() {
        return None;
    }
    let matcher = match Matcher::new(&name) {
        Ok(matcher) => matcher,
        Err(err) => {
            warn!(%err, symbol = %search_name, "cannot build reference pattern");
            return None;
        }
    };

    let mut occurrences = Vec::new();
    if name.has_sigil() {
        occurrences.extend(search_text(
            doc.file(),
            doc.text,
            declaration.line,
            &matcher,
            ctx.classifier,
        ));
    } else {
        let mut candidates = ctx.index.files_declaring(&declaration.name);
        candidates.retain(|&file| file != doc.file());
        occurrences.extend(search_text(doc.file(), doc.text, 0, &matcher, ctx.classifier));
        for file in candidates {
            match ctx.files.read(file) {
                Ok(text) => {
                    occurrences.extend(search_text(file, &text, 0, &matcher, ctx.classifier))
                }
                Err(err) => debug!(%file, %err, "skipping unreadable candidate"),
            }
        }
    }
    let found = occurrences.len();
    let occurrences = deduplicate(occurrences);
    debug!(found, kept = occurrences.len(), "collected references");

    Some(References {
        symbol: search_name,
        declaration,
        occurrences,
    })
}

/// Drop the first occurrence on the declaration's line.
pub fn without_declaration(mut refs: References) -> References {
    let decl = &refs.declaration;
    if let Some(pos) = refs
        .occurrences
        .iter()
        .position(|occ| {
            occ.location.file == decl.file && occ.location.range.start.line == decl.line
        })
    {
        refs.occurrences.remove(pos);
    }
    refs
}

/// Locations of every reference to the symbol at `position`.
#[tracing::instrument(skip_all, fields(file = %doc.file(), line = position.line))]
pub fn find_references(
    ctx: &SearchContext<'_>,
    doc: DocumentRef<'_>,
    position: LineCol,
    include_declaration: bool,
) -> Option<Vec<FileRange>> {
    let mut refs = collect_references(ctx, doc, position)?;
    if !include_declaration {
        refs = without_declaration(refs);
    }
    Some(refs.occurrences.into_iter().map(|occ| occ.location).collect())
}
