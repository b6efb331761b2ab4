//! Module discovery: which file defines `Foo::Bar`.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use smol_str::SmolStr;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::base::FileId;
use crate::hir::{Elem, ElemKind, FileSet, Provenance};
use crate::project::{walk_sources, IndexConfig};

/// Extensions of files that can be loaded as modules.
const MODULE_EXTENSIONS: [&str; 2] = ["rakumod", "pm6"];

/// Module name → defining file, found under the include paths.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ModuleMap {
    modules: IndexMap<SmolStr, FileId>,
}

impl ModuleMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map every module file under `include_paths` to its module name.
    /// Earlier include paths win when two define the same module.
    pub fn discover(files: &FileSet, include_paths: &[PathBuf], config: &IndexConfig) -> Self {
        let mut config = config.clone();
        config.extensions = MODULE_EXTENSIONS.into_iter().map(SmolStr::new_static).collect();

        let mut map = Self::new();
        for root in include_paths {
            let Ok(root) = root.canonicalize() else {
                debug!(path = %root.display(), "include path does not exist");
                continue;
            };
            let outcome =
                walk_sources(std::slice::from_ref(&root), &config, &CancellationToken::new());
            for path in outcome.files {
                if let Some(name) = module_name(&root, &path) {
                    let file = files.file_id(&path);
                    map.modules.entry(name).or_insert(file);
                }
            }
        }
        debug!(modules = map.len(), "discovered modules");
        map
    }

    pub fn insert(&mut self, name: impl Into<SmolStr>, file: FileId) {
        self.modules.entry(name.into()).or_insert(file);
    }

    pub fn get(&self, name: &str) -> Option<FileId> {
        self.modules.get(name).copied()
    }

    /// The module as an elem at the top of its file.
    pub fn elem(&self, name: &str) -> Option<Elem> {
        let file = self.get(name)?;
        Some(
            Elem::new(name, ElemKind::Module, file, 0)
                .with_provenance(Provenance::FromModuleDiscovery),
        )
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SmolStr, FileId)> {
        self.modules.iter().map(|(name, &file)| (name, file))
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

/// `root/Foo/Bar.rakumod` → `Foo::Bar`.
fn module_name(root: &Path, path: &Path) -> Option<SmolStr> {
    let relative = path.strip_prefix(root).ok()?.with_extension("");
    let segments: Vec<&str> = relative
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<_>>()?;
    if segments.is_empty() {
        return None;
    }
    Some(SmolStr::from(segments.join("::")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_module_name_from_path() {
        let root = Path::new("/ws/lib");
        assert_eq!(
            module_name(root, Path::new("/ws/lib/Foo/Bar.rakumod")).as_deref(),
            Some("Foo::Bar")
        );
        assert_eq!(module_name(root, Path::new("/ws/lib/Top.pm6")).as_deref(), Some("Top"));
        assert_eq!(module_name(root, Path::new("/elsewhere/X.rakumod")), None);
    }

    #[test]
    fn test_discover_modules() {
        let dir = tempfile::tempdir().unwrap();
        let lib = dir.path().join("lib");
        fs::create_dir_all(lib.join("JSON")).unwrap();
        fs::write(lib.join("JSON/Tiny.rakumod"), "unit module JSON::Tiny;").unwrap();
        fs::write(lib.join("script.raku"), "say 1;").unwrap();

        let files = FileSet::new();
        let map = ModuleMap::discover(
            &files,
            &[lib.clone(), dir.path().join("missing")],
            &IndexConfig::default(),
        );
        assert_eq!(map.len(), 1);

        let elem = map.elem("JSON::Tiny").unwrap();
        assert_eq!(elem.kind, ElemKind::Module);
        assert_eq!(elem.provenance, Provenance::FromModuleDiscovery);
        assert_eq!(files.path(elem.file).unwrap().file_name().unwrap(), "Tiny.rakumod");
    }
}
