//! Bounded, symlink-safe directory walk.

use std::path::{Path, PathBuf};

use rustc_hash::FxHashSet;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use crate::project::IndexConfig;

/// Source files found under a set of roots.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WalkOutcome {
    /// Canonical paths, in walk order.
    pub files: Vec<PathBuf>,
    /// The walk stopped at `max_files`.
    pub truncated: bool,
    pub cancelled: bool,
}

/// Walk `roots` depth-first in file-name order, collecting source files.
///
/// Symlinks are followed. Every directory and file is visited at most once
/// by canonical path, so link cycles and links back into the tree end the
/// descent instead of repeating it.
pub fn walk_sources(
    roots: &[PathBuf],
    config: &IndexConfig,
    cancel: &CancellationToken,
) -> WalkOutcome {
    let mut outcome = WalkOutcome::default();
    let mut visited_dirs: FxHashSet<PathBuf> = FxHashSet::default();
    let mut seen_files: FxHashSet<PathBuf> = FxHashSet::default();

    'roots: for root in roots {
        let walker = WalkDir::new(root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| keep_entry(entry, config, &mut visited_dirs));

        for entry in walker {
            if cancel.is_cancelled() {
                outcome.cancelled = true;
                break 'roots;
            }
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    debug!(%err, "skipping walk entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() || !config.is_source_file(entry.path()) {
                continue;
            }
            let Some(path) = canonical(entry.path()) else {
                continue;
            };
            if !seen_files.insert(path.clone()) {
                continue;
            }
            if outcome.files.len() >= config.max_files {
                outcome.truncated = true;
                break 'roots;
            }
            outcome.files.push(path);
        }
    }
    outcome
}

fn keep_entry(entry: &DirEntry, config: &IndexConfig, visited: &mut FxHashSet<PathBuf>) -> bool {
    if !entry.file_type().is_dir() {
        return true;
    }
    if entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| config.is_ignored_dir(name))
    {
        return false;
    }
    match canonical(entry.path()) {
        Some(real) => {
            let first_visit = visited.insert(real);
            if !first_visit {
                debug!(path = %entry.path().display(), "directory already visited");
            }
            first_visit
        }
        None => false,
    }
}

fn canonical(path: &Path) -> Option<PathBuf> {
    match path.canonicalize() {
        Ok(real) => Some(real),
        Err(err) => {
            debug!(path = %path.display(), %err, "cannot resolve path");
            None
        }
    }
}
