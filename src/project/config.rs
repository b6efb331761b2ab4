//! Indexing and analysis configuration.

use std::path::{Path, PathBuf};

use smol_str::SmolStr;

/// Placeholder in include paths replaced by each workspace root.
pub const WORKSPACE_FOLDER_VAR: &str = "$workspaceFolder";

/// Bounds and filters for the workspace walk and index build.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct IndexConfig {
    /// Files collected by the walk before it stops.
    pub max_files: usize,
    /// Index entries added before the build stops.
    pub max_symbols: usize,
    /// Directory names never descended into.
    pub ignored_dirs: Vec<SmolStr>,
    /// Source file extensions, without the dot.
    pub extensions: Vec<SmolStr>,
    /// Parse collected files on the rayon pool before inserting them.
    pub parallel: bool,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            max_files: 5000,
            max_symbols: 100_000,
            ignored_dirs: [
                ".git",
                ".svn",
                ".hg",
                "node_modules",
                ".idea",
                ".vscode",
                "target",
                "build",
                "dist",
            ]
            .into_iter()
            .map(SmolStr::new_static)
            .collect(),
            extensions: ["raku", "rakumod", "rakutest", "rakudoc", "pm6", "p6", "t6"]
                .into_iter()
                .map(SmolStr::new_static)
                .collect(),
            parallel: false,
        }
    }
}

impl IndexConfig {
    pub fn with_max_files(mut self, max_files: usize) -> Self {
        self.max_files = max_files;
        self
    }

    pub fn with_max_symbols(mut self, max_symbols: usize) -> Self {
        self.max_symbols = max_symbols;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn is_ignored_dir(&self, name: &str) -> bool {
        self.ignored_dirs.iter().any(|d| d == name)
    }

    pub fn is_source_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.extensions
                    .iter()
                    .any(|known| known.eq_ignore_ascii_case(ext))
            })
    }
}

/// Configuration of an [`AnalysisHost`](crate::ide::AnalysisHost).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AnalysisConfig {
    pub index: IndexConfig,
    /// Module include roots, may contain [`WORKSPACE_FOLDER_VAR`].
    pub include_paths: Vec<String>,
    /// Symbols kept in the parse cache of closed documents.
    pub cache_symbol_budget: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            index: IndexConfig::default(),
            include_paths: vec![format!("{WORKSPACE_FOLDER_VAR}/lib")],
            cache_symbol_budget: 50_000,
        }
    }
}

impl AnalysisConfig {
    pub fn with_index(mut self, index: IndexConfig) -> Self {
        self.index = index;
        self
    }

    pub fn with_include_paths(
        mut self,
        paths: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.include_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_cache_symbol_budget(mut self, budget: usize) -> Self {
        self.cache_symbol_budget = budget;
        self
    }

    /// Include paths with the workspace placeholder expanded once per root.
    /// Paths without the placeholder are kept as they are, once.
    pub fn resolved_include_paths(&self, roots: &[PathBuf]) -> Vec<PathBuf> {
        let mut out: Vec<PathBuf> = Vec::new();
        for path in &self.include_paths {
            if path.contains(WORKSPACE_FOLDER_VAR) {
                for root in roots {
                    let expanded =
                        PathBuf::from(path.replace(WORKSPACE_FOLDER_VAR, &root.to_string_lossy()));
                    if !out.contains(&expanded) {
                        out.push(expanded);
                    }
                }
            } else if !out.iter().any(|p| p.as_os_str() == path.as_str()) {
                out.push(PathBuf::from(path));
            }
        }
        out
    }
}
