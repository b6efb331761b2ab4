//! Go-to-definition.

use crate::base::{split_lines, FileRange, LineCol};
use crate::hir::Resolver;
use crate::ide::position::symbol_at;
use crate::ide::references::{DocumentRef, SearchContext};

/// Declaration lines of the symbol at `position`. Several for multi-dispatch
/// routines, none when the symbol does not resolve.
pub fn goto_definition(
    ctx: &SearchContext<'_>,
    doc: DocumentRef<'_>,
    position: LineCol,
) -> Vec<FileRange> {
    let Some(line) = split_lines(doc.text).get(position.line as usize).copied() else {
        return Vec::new();
    };
    let Some(at) = symbol_at(line, position) else {
        return Vec::new();
    };
    Resolver::new(doc.table)
        .with_index(ctx.index)
        .with_modules(ctx.modules)
        .resolve(&at.text, position.line)
        .elems()
        .iter()
        .map(|elem| elem.location())
        .collect()
}
