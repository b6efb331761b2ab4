//! End-to-end rename and find-references through the analysis host.

use std::path::Path;

use rakunav::ide::{apply_edits, RenameError, WorkspaceEdit};
use rakunav::{AnalysisHost, FileId, LineCol};

fn open(source: &str) -> (AnalysisHost, FileId) {
    let mut host = AnalysisHost::new();
    let file = host.open_document(Path::new("/virtual/main.raku"), source);
    (host, file)
}

fn rename_at(
    source: &str,
    line: u32,
    col: u32,
    new_name: &str,
) -> Result<Option<WorkspaceEdit>, RenameError> {
    let (host, file) = open(source);
    host.analysis().rename(file, LineCol::new(line, col), new_name)
}

#[test]
fn test_rename_sub_and_call_site() {
    let source = "sub foo() { }\nfoo();";
    let edit = rename_at(source, 0, 5, "bar").unwrap().unwrap();
    let edits = edit.edits(FileId(0));

    assert_eq!(edits.len(), 2);
    assert!(edits.iter().all(|e| e.new_text == "bar"));
    assert_eq!(apply_edits(source, edits), "sub bar() { }\nbar();");
}

#[test]
fn test_rename_variable_keeps_sigil() {
    let source = "my $foo = 1;\nmy $bar = $foo + 2;\nsay $foo;";
    let edit = rename_at(source, 0, 4, "baz").unwrap().unwrap();
    let edits = edit.edits(FileId(0));

    assert_eq!(edits.len(), 3);
    assert!(edits.iter().all(|e| e.new_text == "$baz"));
    assert_eq!(
        apply_edits(source, edits),
        "my $baz = 1;\nmy $bar = $baz + 2;\nsay $baz;"
    );
}

#[test]
fn test_rename_skips_string_literal() {
    let source = "sub foo(){}\nmy $msg = \"call foo here\";\nfoo();";
    let edit = rename_at(source, 2, 0, "bar").unwrap().unwrap();
    let edits = edit.edits(FileId(0));

    assert_eq!(edits.len(), 2);
    assert_eq!(
        apply_edits(source, edits),
        "sub bar(){}\nmy $msg = \"call foo here\";\nbar();"
    );
}

#[test]
fn test_rename_skips_comments_and_patterns() {
    let source = "sub word { }\n# word in a comment\nmy $m = $x ~~ /word/;\nword();";
    let edit = rename_at(source, 0, 5, "term").unwrap().unwrap();
    assert_eq!(
        apply_edits(source, edit.edits(FileId(0))),
        "sub term { }\n# word in a comment\nmy $m = $x ~~ /word/;\nterm();"
    );
}

#[test]
fn test_rename_attribute_keeps_twigils() {
    let source = "class Counter {\n  has $.count;\n  method bump { $!count++ }\n  method show { say $.count }\n}";
    let edit = rename_at(source, 1, 8, "total").unwrap().unwrap();
    assert_eq!(
        apply_edits(source, edit.edits(FileId(0))),
        "class Counter {\n  has $.total;\n  method bump { $!total++ }\n  method show { say $.total }\n}"
    );
}

#[test]
fn test_rename_shadowed_variable_starts_at_nearest_declaration() {
    let source = "my $x = 1;\nsay $x;\nmy $x = 2;\nsay $x;";
    let edit = rename_at(source, 3, 5, "y").unwrap().unwrap();
    assert_eq!(
        apply_edits(source, edit.edits(FileId(0))),
        "my $x = 1;\nsay $x;\nmy $y = 2;\nsay $y;"
    );
}

#[test]
fn test_rename_rejections() {
    let source = "sub foo() { }\nmy Str $s = foo();";
    assert_eq!(
        rename_at(source, 0, 5, "123-invalid"),
        Err(RenameError::InvalidNewName("123-invalid".into()))
    );
    assert_eq!(rename_at(source, 1, 4, "Text"), Err(RenameError::Reserved("Str".into())));
    assert_eq!(rename_at(source, 0, 5, "while"), Err(RenameError::Reserved("while".into())));
    assert_eq!(
        rename_at(source, 1, 8, "@s"),
        Err(RenameError::SigilMismatch {
            old: "$s".into(),
            new: "@s".into()
        })
    );
    assert_eq!(rename_at(source, 0, 12, "x"), Err(RenameError::NoSymbol));
}

#[test]
fn test_rename_unresolved_symbol_is_not_an_error() {
    assert_eq!(rename_at("undeclared();", 0, 2, "other"), Ok(None));
}

#[test]
fn test_rename_across_files() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("Lib.rakumod"),
        "unit module Lib;\nsub helper($x) is export { $x }\n",
    )
    .unwrap();
    std::fs::write(dir.path().join("other.raku"), "say 'no helper here';\n").unwrap();

    let mut host = AnalysisHost::new();
    host.set_workspace_folders(vec![dir.path().to_path_buf()]);
    let main = host.open_document(
        &dir.path().join("main.raku"),
        "use Lib;\nsub helper { }\nhelper();",
    );

    let edit = host.analysis().rename(main, LineCol::new(2, 0), "assist").unwrap().unwrap();
    let lib = host
        .files()
        .lookup(&dir.path().join("Lib.rakumod").canonicalize().unwrap())
        .unwrap();

    assert_eq!(edit.edits(main).len(), 2);
    assert_eq!(edit.edits(lib).len(), 1);
    assert_eq!(edit.changes.len(), 2);
}

#[test]
fn test_find_references_with_and_without_declaration() {
    let source = "sub area($r) { }\nsay area(1);\nsay area(2);";
    let (host, file) = open(source);
    let analysis = host.analysis();

    let all = analysis.find_references(file, LineCol::new(1, 5), true).unwrap();
    assert_eq!(all.len(), 3);

    let uses = analysis.find_references(file, LineCol::new(1, 5), false).unwrap();
    let lines: Vec<u32> = uses.iter().map(|r| r.range.start.line).collect();
    assert_eq!(lines, vec![1, 2]);
}

#[test]
fn test_prepare_rename() {
    let (host, file) = open("my $total = 0;\nif $total { }");
    let analysis = host.analysis();

    let prepared = analysis.prepare_rename(file, LineCol::new(1, 5)).unwrap();
    assert_eq!(prepared.placeholder, "$total");
    assert_eq!(analysis.prepare_rename(file, LineCol::new(1, 0)), None);
}
