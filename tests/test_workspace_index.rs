//! Workspace index builds over real directory trees.

use std::fs;
use std::path::Path;

use rakunav::hir::{FileSet, WorkspaceIndex};
use rakunav::project::{IndexCeiling, IndexConfig};
use rakunav::{AnalysisConfig, AnalysisHost, ElemKind};
use tokio_util::sync::CancellationToken;

fn write(root: &Path, relative: &str, text: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

fn sorted_lines(index: &WorkspaceIndex, name: &str) -> Vec<(u32, u32)> {
    let mut out: Vec<_> = index
        .find_by_name(name)
        .iter()
        .map(|e| (e.file.index(), e.line))
        .collect();
    out.sort();
    out
}

#[test]
fn test_build_indexes_declarations_across_files() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "lib/Shape.rakumod", "unit class Shape;\nmethod area { }\n");
    write(
        dir.path(),
        "lib/Shape/Circle.rakumod",
        "use Shape;\nclass Shape::Circle is Shape {\n  method area { }\n}\n",
    );
    write(
        dir.path(),
        "bin/main.raku",
        "use Shape::Circle;\nsub MAIN { say Shape::Circle.new.area }\n",
    );
    write(dir.path(), ".git/hooks/fake.raku", "sub hidden { }\n");
    write(dir.path(), "README.md", "sub not-raku { }\n");

    let files = FileSet::new();
    let mut index = WorkspaceIndex::new();
    let report = index.build(&files, &[dir.path().to_path_buf()], &IndexConfig::default());

    assert_eq!(report.files_discovered, 3);
    assert_eq!(report.files_indexed, 3);
    assert_eq!(report.ceiling, None);
    assert_eq!(report.symbols_indexed, index.len());

    assert_eq!(index.find_by_name("area").len(), 2);
    assert_eq!(index.find_by_name("Shape::area").len(), 1);
    assert_eq!(index.find_by_name("Shape::Circle::area").len(), 1);
    assert_eq!(index.find_by_name("Shape::Circle")[0].kind, ElemKind::Class);
    assert!(index.find_by_name("hidden").is_empty());
    assert!(index.find_by_name("not-raku").is_empty());
    assert_eq!(index.locations("MAIN").len(), 1);
}

#[test]
fn test_file_ceiling_indexes_exactly_up_to_limit() {
    let dir = tempfile::tempdir().unwrap();
    for i in 0..10 {
        write(dir.path(), &format!("f{i:02}.raku"), &format!("sub s{i} {{ }}\n"));
    }
    let files = FileSet::new();
    let mut index = WorkspaceIndex::new();
    let config = IndexConfig::default().with_max_files(4);
    let report = index.build(&files, &[dir.path().to_path_buf()], &config);

    assert_eq!(report.ceiling, Some(IndexCeiling::Files));
    assert_eq!(report.files_indexed, 4);
    assert_eq!(index.file_count(), 4);
    assert_eq!(index.find_by_name("s3").len(), 1);
    assert!(index.find_by_name("s4").is_empty());
}

#[test]
fn test_build_replaces_previous_state() {
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    write(first.path(), "a.raku", "sub only-in-first { }\n");
    write(second.path(), "b.raku", "sub only-in-second { }\n");

    let files = FileSet::new();
    let mut index = WorkspaceIndex::new();
    index.build(&files, &[first.path().to_path_buf()], &IndexConfig::default());
    index.build(&files, &[second.path().to_path_buf()], &IndexConfig::default());

    assert!(index.find_by_name("only-in-first").is_empty());
    assert_eq!(index.find_by_name("only-in-second").len(), 1);
}

#[test]
fn test_cancelled_build_returns_early() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.raku", "sub a { }\n");
    let cancel = CancellationToken::new();
    cancel.cancel();

    let files = FileSet::new();
    let mut index = WorkspaceIndex::new();
    let report = index.build_cancellable(
        &files,
        &[dir.path().to_path_buf()],
        &IndexConfig::default(),
        &cancel,
    );
    assert!(report.cancelled);
    assert!(index.is_empty());
}

#[cfg(unix)]
#[test]
fn test_symlink_cycle_is_walked_once() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "lib/A.rakumod", "unit module A;\nsub a { }\n");
    std::os::unix::fs::symlink(dir.path(), dir.path().join("lib/again")).unwrap();

    let files = FileSet::new();
    let mut index = WorkspaceIndex::new();
    let report = index.build(&files, &[dir.path().to_path_buf()], &IndexConfig::default());
    assert_eq!(report.files_indexed, 1);
    assert_eq!(index.find_by_name("a").len(), 1);
}

#[test]
fn test_vanished_file_is_skipped_on_reindex() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "keep.raku", "sub keep { }\n");
    write(dir.path(), "gone.raku", "sub gone { }\n");

    let files = FileSet::new();
    let mut index = WorkspaceIndex::new();
    index.build(&files, &[dir.path().to_path_buf()], &IndexConfig::default());
    let gone = files.lookup(&dir.path().join("gone.raku").canonicalize().unwrap()).unwrap();

    fs::remove_file(dir.path().join("gone.raku")).unwrap();
    assert_eq!(index.reindex_file(&files, gone), 0);
    assert!(index.find_by_name("gone").is_empty());
    assert_eq!(index.find_by_name("keep").len(), 1);
}

#[test]
fn test_remove_and_reindex_restore_the_index() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.raku", "class Point {\n  method x { }\n}\nsub shared { }\n");
    write(dir.path(), "b.raku", "sub shared { }\n");

    let files = FileSet::new();
    let mut index = WorkspaceIndex::new();
    index.build(&files, &[dir.path().to_path_buf()], &IndexConfig::default());
    let a = files.lookup(&dir.path().join("a.raku").canonicalize().unwrap()).unwrap();

    let names = ["Point", "x", "Point::x", "shared"];
    let before: Vec<_> = names.iter().map(|n| sorted_lines(&index, n)).collect();
    let len = index.len();

    index.remove_file(a);
    assert!(index.find_by_name("Point").is_empty());
    assert_eq!(index.find_by_name("shared").len(), 1);

    index.reindex_file(&files, a);
    let after: Vec<_> = names.iter().map(|n| sorted_lines(&index, n)).collect();
    assert_eq!(before, after);
    assert_eq!(index.len(), len);
}

#[test]
fn test_host_discovers_modules_under_include_paths() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "lib/Text/Wrap.rakumod",
        "unit module Text::Wrap;\nsub wrap-text($t) is export { }\n",
    );
    write(dir.path(), "bin/app.raku", "use Text::Wrap;\nsay wrap-text('x');\n");

    let mut host = AnalysisHost::with_config(AnalysisConfig::default());
    let report = host.set_workspace_folders(vec![dir.path().to_path_buf()]);
    assert_eq!(report.files_indexed, 2);
    assert_eq!(host.modules().len(), 1);

    let app = host
        .files()
        .lookup(&dir.path().join("bin/app.raku").canonicalize().unwrap())
        .unwrap();
    let analysis = host.analysis();
    let module = analysis.resolve(app, "Text::Wrap", 1);
    assert_eq!(module.elems()[0].kind, ElemKind::Module);

    let defs = analysis.goto_definition(app, rakunav::LineCol::new(1, 6));
    assert_eq!(defs.len(), 1);
}
