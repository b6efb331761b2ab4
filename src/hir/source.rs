//! File set management: path ↔ [`FileId`] and open-buffer overlays.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use thiserror::Error;

use crate::base::FileId;

#[derive(Debug, Error)]
pub enum FileError {
    #[error("cannot read {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("unknown file {0}")]
    UnknownFile(FileId),
}

/// Assigns stable ids to paths and holds the text of open buffers.
///
/// Reads go to the overlay first (an editor buffer may be newer than the
/// disk), then to the file system.
#[derive(Debug, Default)]
pub struct FileSet {
    inner: RwLock<FileSetInner>,
}

#[derive(Debug, Default)]
struct FileSetInner {
    path_to_id: IndexMap<PathBuf, FileId>,
    id_to_path: IndexMap<FileId, PathBuf>,
    /// Open-buffer contents
    overlays: IndexMap<FileId, Arc<str>>,
    next_id: u32,
}

impl FileSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the id for `path`. Ids are never reused.
    pub fn file_id(&self, path: &Path) -> FileId {
        {
            let inner = self.inner.read();
            if let Some(&id) = inner.path_to_id.get(path) {
                return id;
            }
        }

        let mut inner = self.inner.write();
        // Another writer may have won the race.
        if let Some(&id) = inner.path_to_id.get(path) {
            return id;
        }

        let id = FileId::new(inner.next_id);
        inner.next_id += 1;
        inner.path_to_id.insert(path.to_owned(), id);
        inner.id_to_path.insert(id, path.to_owned());
        id
    }

    /// The id of a path seen before, without assigning a new one.
    pub fn lookup(&self, path: &Path) -> Option<FileId> {
        self.inner.read().path_to_id.get(path).copied()
    }

    pub fn path(&self, file: FileId) -> Option<PathBuf> {
        self.inner.read().id_to_path.get(&file).cloned()
    }

    pub fn set_contents(&self, file: FileId, contents: impl Into<Arc<str>>) {
        self.inner.write().overlays.insert(file, contents.into());
    }

    /// The overlay contents, if the file is open.
    pub fn contents(&self, file: FileId) -> Option<Arc<str>> {
        self.inner.read().overlays.get(&file).cloned()
    }

    /// Drop the overlay; later reads go to disk.
    pub fn clear_contents(&self, file: FileId) {
        self.inner.write().overlays.swap_remove(&file);
    }

    /// Current text of `file`: the overlay, else the file on disk.
    pub fn read(&self, file: FileId) -> Result<Arc<str>, FileError> {
        if let Some(text) = self.contents(file) {
            return Ok(text);
        }
        let path = self.path(file).ok_or(FileError::UnknownFile(file))?;
        std::fs::read_to_string(&path)
            .map(Arc::from)
            .map_err(|source| FileError::Unreadable { path, source })
    }

    pub fn len(&self) -> usize {
        self.inner.read().path_to_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn files(&self) -> Vec<FileId> {
        self.inner.read().id_to_path.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_set_id_assignment() {
        let files = FileSet::new();

        let id1 = files.file_id(Path::new("/a.raku"));
        let id2 = files.file_id(Path::new("/b.raku"));
        let id3 = files.file_id(Path::new("/a.raku"));

        assert_ne!(id1, id2);
        assert_eq!(id1, id3);
        assert_eq!(files.lookup(Path::new("/b.raku")), Some(id2));
        assert_eq!(files.lookup(Path::new("/c.raku")), None);
    }

    #[test]
    fn test_overlay_wins_over_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.raku");
        std::fs::write(&path, "sub disk { }").unwrap();

        let files = FileSet::new();
        let id = files.file_id(&path);
        assert_eq!(&*files.read(id).unwrap(), "sub disk { }");

        files.set_contents(id, "sub buffer { }");
        assert_eq!(&*files.read(id).unwrap(), "sub buffer { }");

        files.clear_contents(id);
        assert_eq!(&*files.read(id).unwrap(), "sub disk { }");
    }

    #[test]
    fn test_unreadable_and_unknown_files() {
        let files = FileSet::new();
        let id = files.file_id(Path::new("/definitely/not/here.raku"));
        assert!(matches!(files.read(id), Err(FileError::Unreadable { .. })));
        assert!(matches!(files.read(FileId(99)), Err(FileError::UnknownFile(_))));
    }
}
