//! Property-based checks for the parser, the workspace index and reference
//! deduplication.
//!
//! Documents are assembled from a pool of realistic Raku lines so that the
//! generated inputs actually hit every recognizer, including unbalanced
//! braces and unterminated strings.
#![cfg(feature = "proptest")]

use proptest::prelude::*;
use rakunav::hir::FileSet;
use rakunav::ide::deduplicate;
use rakunav::syntax::ParseMode;
use rakunav::{parse_document, FileId, FileRange, LineCol, LineColRange, WorkspaceIndex};

// ============================================================================
// PROPTEST STRATEGIES
// ============================================================================

const LINES: &[&str] = &[
    "class Foo {",
    "class Foo::Bar is Foo {",
    "unit module Util;",
    "role Greets;",
    "grammar G {",
    "  token TOP { <word>+ }",
    "  rule pair { <key> '=' <value> }",
    "}",
    "sub greet($name, :$loud = False) {",
    "  method area(--> Num) { pi * $!r ** 2 }",
    "  submethod BUILD(:$!r) { }",
    "  has $.name;",
    "  has @!items is rw;",
    "my $x = 1;",
    "my ($a, $b) = @_;",
    "my $p = Point.new(x => 1);",
    "for @list -> $item {",
    "say \"not a { brace\";",
    "say \"unterminated",
    "# class Commented {",
    "=begin pod",
    "=end pod",
    "use JSON::Fast;",
    "BEGIN { say 1 }",
    "",
];

fn arb_document() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(LINES), 0..40).prop_map(|lines| lines.join("\n"))
}

fn arb_mode() -> impl Strategy<Value = ParseMode> {
    prop_oneof![
        Just(ParseMode::Outline),
        Just(ParseMode::Navigation),
        Just(ParseMode::Refinement),
        Just(ParseMode::WorkspaceIndex),
    ]
}

fn arb_range() -> impl Strategy<Value = FileRange> {
    (0u32..2, 0u32..4, 0u32..12, 1u32..6).prop_map(|(file, line, col, len)| {
        FileRange::new(
            FileId::new(file),
            LineColRange::new(LineCol::new(line, col), LineCol::new(line, col + len)),
        )
    })
}

// ============================================================================
// PROPERTIES
// ============================================================================

proptest! {
    #[test]
    fn parse_is_deterministic(text in arb_document(), mode in arb_mode()) {
        let first = parse_document(FileId::new(0), &text, mode);
        let second = parse_document(FileId::new(0), &text, mode);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn elems_stay_inside_the_document(text in arb_document(), mode in arb_mode()) {
        let line_count = text.split('\n').count() as u32;
        let table = parse_document(FileId::new(0), &text, mode);
        for elem in table.elems() {
            prop_assert!(elem.line < line_count);
            prop_assert!(elem.line_end >= elem.line);
            prop_assert!(elem.line_end < line_count);
        }
    }

    #[test]
    fn deduplicate_is_idempotent(ranges in prop::collection::vec(arb_range(), 0..20)) {
        let once = deduplicate(ranges);
        let twice = deduplicate(once.clone());
        prop_assert_eq!(&once, &twice);
        for pair in once.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            prop_assert!(a.file != b.file || !a.range.overlaps(&b.range));
        }
    }

    #[test]
    fn remove_then_reindex_restores_entries(docs in prop::collection::vec(arb_document(), 1..4)) {
        let files = FileSet::new();
        let ids: Vec<FileId> = (0..docs.len())
            .map(|i| files.file_id(std::path::Path::new(&format!("/virtual/doc{i}.raku"))))
            .collect();
        let mut index = WorkspaceIndex::new();
        for (&file, text) in ids.iter().zip(&docs) {
            files.set_contents(file, text.as_str());
            index.reindex_file(&files, file);
        }
        let snapshot = |index: &WorkspaceIndex| {
            let mut entries: Vec<(String, u32, u32)> = index
                .find_by_query("", usize::MAX)
                .into_iter()
                .map(|e| (e.name.to_string(), e.file.index(), e.line))
                .collect();
            entries.sort();
            entries
        };
        let before = snapshot(&index);
        let len = index.len();

        index.remove_file(ids[0]);
        prop_assert!(!index.contains_file(ids[0]));
        index.reindex_file(&files, ids[0]);

        prop_assert_eq!(snapshot(&index), before);
        prop_assert_eq!(index.len(), len);
    }
}
