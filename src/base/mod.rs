//! Foundation types shared by every layer of the analyzer.
//!
//! - [`FileId`] - handle for a workspace file or open buffer
//! - [`LineCol`], [`LineIndex`] - line/column positions and conversion
//! - [`LineColRange`], [`FileRange`] - ranges and file locations
//! - [`split_lines`] - the one line-splitting rule every consumer uses
//!
//! This module has NO dependencies on other rakunav modules.

mod file_id;
mod span;

pub use file_id::FileId;
pub use span::{split_lines, FileRange, LineCol, LineColRange, LineIndex, TextRange, TextSize};

pub use text_size;
