//! Workspace configuration, walking, module discovery and index loading.

mod config;
mod modules;
mod walk;
mod workspace_loader;

pub use config::{AnalysisConfig, IndexConfig, WORKSPACE_FOLDER_VAR};
pub use modules::ModuleMap;
pub use walk::{walk_sources, WalkOutcome};
pub use workspace_loader::{BuildReport, IndexCeiling, WorkspaceLoader};
