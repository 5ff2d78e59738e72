//! Text Ranges
//!
//! An (offset, length) span over document characters.

use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

/// A span of `length` characters starting at `index`
///
/// A zero-length range is a caret, not a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TextRange {
    pub index: usize,
    pub length: usize,
}

impl TextRange {
    pub const fn new(index: usize, length: usize) -> Self {
        Self { index, length }
    }

    /// Create a caret at an offset
    pub const fn caret(index: usize) -> Self {
        Self { index, length: 0 }
    }

    /// Build from a half-open char range, clamping inverted ranges to a caret
    pub fn from_span(span: Range<usize>) -> Self {
        Self {
            index: span.start,
            length: span.end.saturating_sub(span.start),
        }
    }

    pub fn is_caret(&self) -> bool {
        self.length == 0
    }

    /// One past the last character
    pub fn end(&self) -> usize {
        self.index.saturating_add(self.length)
    }

    pub fn as_char_range(&self) -> Range<usize> {
        self.index..self.end()
    }

    /// Check if a character offset falls inside the range
    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.index && offset < self.end()
    }

    /// Check if another range lies entirely within this one
    pub fn contains_range(&self, other: &TextRange) -> bool {
        other.index >= self.index && other.end() <= self.end()
    }

    /// Check if the two ranges share at least one character
    pub fn overlaps(&self, other: &TextRange) -> bool {
        !self.is_caret()
            && !other.is_caret()
            && self.index < other.end()
            && other.index < self.end()
    }

    /// Restrict the range to a document of `len` characters
    pub fn clamp_to(&self, len: usize) -> TextRange {
        let index = self.index.min(len);
        let end = self.end().min(len);
        TextRange::new(index, end - index)
    }
}

impl fmt::Display for TextRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, +{})", self.index, self.length)
    }
}
