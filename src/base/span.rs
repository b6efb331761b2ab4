//! Line/column positions, ranges and file locations.

use std::fmt;

use crate::base::FileId;

pub use text_size::TextRange;
pub use text_size::TextSize;

/// A zero-based position: `line` counts `\n`-separated lines, `col` counts
/// UTF-8 bytes into the line. Shown one-based. Orders by line, then column.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineCol {
    pub line: u32,
    pub col: u32,
}

impl LineCol {
    #[inline]
    pub const fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }
}

impl From<(u32, u32)> for LineCol {
    #[inline]
    fn from((line, col): (u32, u32)) -> Self {
        Self { line, col }
    }
}

impl fmt::Display for LineCol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.col + 1)
    }
}

impl fmt::Debug for LineCol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// A half-open `start..end` range of line/column positions.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineColRange {
    pub start: LineCol,
    pub end: LineCol,
}

impl LineColRange {
    #[inline]
    pub const fn new(start: LineCol, end: LineCol) -> Self {
        Self { start, end }
    }

    /// A range covering `start_col..end_col` of a single line.
    #[inline]
    pub const fn on_line(line: u32, start_col: u32, end_col: u32) -> Self {
        Self {
            start: LineCol::new(line, start_col),
            end: LineCol::new(line, end_col),
        }
    }

    /// A range covering a whole line, up to the start of the next one.
    #[inline]
    pub const fn whole_line(line: u32) -> Self {
        Self {
            start: LineCol::new(line, 0),
            end: LineCol::new(line + 1, 0),
        }
    }

    /// Whether `other` starts before this range ends and vice versa.
    pub fn overlaps(&self, other: &LineColRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains(&self, pos: LineCol) -> bool {
        self.start <= pos && pos < self.end
    }

    /// Size used to prefer the longer of two overlapping matches.
    pub fn extent(&self) -> (u32, u32) {
        (
            self.end.line.saturating_sub(self.start.line),
            self.end.col.saturating_sub(self.start.col),
        )
    }
}

impl fmt::Debug for LineColRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}-{:?}", self.start, self.end)
    }
}

/// A range inside a specific file.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FileRange {
    pub file: FileId,
    pub range: LineColRange,
}

impl FileRange {
    #[inline]
    pub const fn new(file: FileId, range: LineColRange) -> Self {
        Self { file, range }
    }
}

impl AsRef<FileRange> for FileRange {
    fn as_ref(&self) -> &FileRange {
        self
    }
}

impl fmt::Debug for FileRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{:?}", self.file, self.range)
    }
}

/// Split text into lines on `\n`, dropping a trailing `\r` from each line.
///
/// A trailing newline yields a final empty line, so line numbers agree with
/// [`LineIndex`].
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect()
}

/// Byte offset ↔ [`LineCol`] conversion for one text.
#[derive(Clone, Debug)]
pub struct LineIndex {
    line_starts: Vec<TextSize>,
    len: TextSize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let line_starts = std::iter::once(TextSize::from(0))
            .chain(
                text.match_indices('\n')
                    .map(|(offset, _)| TextSize::from(offset as u32 + 1)),
            )
            .collect();
        Self {
            line_starts,
            len: TextSize::of(text),
        }
    }

    pub fn line_col(&self, offset: TextSize) -> LineCol {
        let line = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);
        let col = offset - self.line_starts[line];
        LineCol {
            line: line as u32,
            col: col.into(),
        }
    }

    pub fn offset(&self, pos: LineCol) -> Option<TextSize> {
        self.line_starts
            .get(pos.line as usize)
            .map(|&start| start + TextSize::from(pos.col))
    }

    /// The text of one line, without its line terminator.
    pub fn line_text<'a>(&self, text: &'a str, line: u32) -> Option<&'a str> {
        let start = usize::from(*self.line_starts.get(line as usize)?);
        let end = self
            .line_starts
            .get(line as usize + 1)
            .map(|next| usize::from(*next) - 1)
            .unwrap_or_else(|| usize::from(self.len));
        let slice = text.get(start..end)?;
        Some(slice.strip_suffix('\r').unwrap_or(slice))
    }

    /// Number of lines (a trailing newline starts one more, empty line).
    pub fn len(&self) -> usize {
        self.line_starts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len == TextSize::from(0)
    }
}
