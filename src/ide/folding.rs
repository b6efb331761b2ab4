//! Folding ranges: multi-line declarations and comment runs.

use crate::base::split_lines;
use crate::hir::DocumentSymbolTable;
use crate::syntax::{classify_lines, LineClassifier, SpanClass};

/// A collapsible line range.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FoldingRange {
    pub start_line: u32,
    pub end_line: u32,
    /// Comment or POD region rather than a block
    pub is_comment: bool,
}

/// Folding ranges of a document, ordered by start line.
///
/// Blocks come from the outline table's end lines. Runs of two or more
/// comment-only lines fold too when a classifier is available.
pub fn folding_ranges(
    table: &DocumentSymbolTable,
    text: &str,
    classifier: Option<&dyn LineClassifier>,
) -> Vec<FoldingRange> {
    let mut ranges: Vec<FoldingRange> = table
        .elems()
        .filter(|elem| elem.is_multiline())
        .map(|elem| FoldingRange {
            start_line: elem.line,
            end_line: elem.line_end,
            is_comment: false,
        })
        .collect();

    if let Some(classifier) = classifier {
        ranges.extend(comment_runs(text, classifier));
    }

    ranges.sort_by_key(|r| (r.start_line, r.end_line));
    ranges.dedup();
    ranges
}

fn comment_runs(text: &str, classifier: &dyn LineClassifier) -> Vec<FoldingRange> {
    let lines = split_lines(text);
    let Ok(classified) = classify_lines(classifier, &lines) else {
        return Vec::new();
    };
    let is_comment_line = |index: usize| {
        let line = lines[index];
        let mut spans = classified[index]
            .iter()
            .filter(|span| !line[span.range].trim().is_empty())
            .peekable();
        spans.peek().is_some() && spans.all(|span| span.class == SpanClass::Comment)
    };

    let mut runs = Vec::new();
    let mut start: Option<usize> = None;
    for index in 0..=lines.len() {
        let comment = index < lines.len() && is_comment_line(index);
        match (comment, start) {
            (true, None) => start = Some(index),
            (false, Some(first)) => {
                if index - first >= 2 {
                    runs.push(FoldingRange {
                        start_line: first as u32,
                        end_line: (index - 1) as u32,
                        is_comment: true,
                    });
                }
                start = None;
            }
            _ => {}
        }
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::FileId;
    use crate::hir::parse_document;
    use crate::syntax::{ParseMode, RakuClassifier};

    #[test]
    fn test_blocks_and_comment_runs_fold() {
        let text =
            "# one\n# two\nclass A {\n  method m {\n    1;\n  }\n}\n=begin pod\ndocs\n=end pod";
        let table = parse_document(FileId(0), text, ParseMode::Outline);
        let ranges = folding_ranges(&table, text, Some(&RakuClassifier));
        let spans: Vec<(u32, u32, bool)> =
            ranges.iter().map(|r| (r.start_line, r.end_line, r.is_comment)).collect();
        assert_eq!(spans, vec![(0, 1, true), (2, 6, false), (3, 5, false), (7, 9, true)]);
    }

    #[test]
    fn test_single_line_declarations_do_not_fold() {
        let text = "sub a { }\n# lone comment";
        let table = parse_document(FileId(0), text, ParseMode::Outline);
        assert!(folding_ranges(&table, text, Some(&RakuClassifier)).is_empty());
    }
}
